use std::process::ExitCode;

use crate::gfx::{DeviceError, GraphicsContext, GraphicsDevice, ShaderError, TextureError};
use crate::input::Key;
use crate::model::ModelError;
use crate::Config;

#[cfg(windows)]
mod win32;
#[cfg(windows)]
pub use win32::run;

/// The backend the tutorial binaries run on.
#[cfg(windows)]
pub type NativeDevice = crate::gfx::d3d11::Device;
#[cfg(not(windows))]
pub type NativeDevice = crate::gfx::headless::HeadlessDevice;

#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Texture(#[from] TextureError),
    #[cfg(windows)]
    #[error("window system error: {0}")]
    Window(#[from] windows::core::Error),
}

/// A demo driven by the window loop, one [`run_frame`] per iteration.
pub trait Application {
    type Device: GraphicsDevice;

    fn title(&self) -> &str;

    /// Called once with the device before the first frame. An error aborts startup.
    fn initialize(&mut self, device: &Self::Device) -> Result<(), FrameworkError>;

    /// Advances the scene by `dt` seconds.
    fn update(&mut self, dt: f32) -> Result<(), FrameworkError>;

    fn render<C>(&mut self, context: &mut C) -> Result<(), FrameworkError>
    where
        C: GraphicsContext<Device = Self::Device>;

    fn key_changed(&mut self, _key: Key, _pressed: bool) {}
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub update_failed: bool,
    pub render_failed: bool,
}

/// Runs one update and one render. A failing stage is logged and skipped;
/// the next frame runs regardless.
pub fn run_frame<A, C>(app: &mut A, context: &mut C, dt: f32) -> FrameReport
where
    A: Application,
    C: GraphicsContext<Device = A::Device>,
{
    let update_failed = app
        .update(dt)
        .inspect_err(|e| log::error!("Failed to update frame: {e}"))
        .is_err();
    let render_failed = app
        .render(context)
        .inspect_err(|e| log::error!("Failed to render frame: {e}"))
        .is_err();

    FrameReport {
        update_failed,
        render_failed,
    }
}

/// Shared `main` of the tutorial binaries: sets up logging and configuration,
/// builds the application and runs it until its window closes.
pub fn launch<A, F>(make_app: F) -> ExitCode
where
    A: Application<Device = NativeDevice>,
    F: FnOnce(&Config) -> A,
{
    crate::init_logging();

    let mut config = match crate::parse_args(std::env::args_os()) {
        Ok(config) => config,
        // Prints help and usage errors the way clap formats them.
        Err(e) => e.exit(),
    };
    crate::enter_executable_dir(&mut config);

    let mut app = make_app(&config);
    match launch_native(&config, &mut app) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{} stopped: {e}", app.title());
            ExitCode::FAILURE
        }
    }
}

#[cfg(windows)]
fn launch_native<A>(config: &Config, app: &mut A) -> Result<(), FrameworkError>
where
    A: Application<Device = NativeDevice>,
{
    run(config, app)
}

/// Without Direct3D the application is initialized against the recording
/// backend and a single frame is rendered.
#[cfg(not(windows))]
fn launch_native<A>(_config: &Config, app: &mut A) -> Result<(), FrameworkError>
where
    A: Application<Device = NativeDevice>,
{
    use crate::gfx::headless::{HeadlessContext, HeadlessDevice};

    log::warn!("Direct3D 11 is unavailable on this platform, rendering one headless frame");

    let device = HeadlessDevice::new();
    app.initialize(&device)
        .inspect_err(|e| log::error!("Failed to initialize {}: {e}", app.title()))?;

    let mut context = HeadlessContext::new();
    let report = run_frame(app, &mut context, 0.0);
    log::info!(
        "Recorded {} commands and {} draws (update failed: {}, render failed: {})",
        context.commands().len(),
        context.draw_count(),
        report.update_failed,
        report.render_failed
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::gfx::headless::{Command, HeadlessContext, HeadlessDevice};

    #[derive(Default)]
    struct Counter {
        elapsed: f32,
        fail_update: bool,
        keys: Vec<(Key, bool)>,
    }

    impl Application for Counter {
        type Device = HeadlessDevice;

        fn title(&self) -> &str {
            "counter"
        }

        fn initialize(&mut self, _device: &HeadlessDevice) -> Result<(), FrameworkError> {
            Ok(())
        }

        fn update(&mut self, dt: f32) -> Result<(), FrameworkError> {
            if self.fail_update {
                return Err(ShaderError::NotInitialized.into());
            }
            self.elapsed += dt;
            Ok(())
        }

        fn render<C>(&mut self, context: &mut C) -> Result<(), FrameworkError>
        where
            C: GraphicsContext<Device = HeadlessDevice>,
        {
            context.clear(Color::INDIGO);
            Ok(())
        }

        fn key_changed(&mut self, key: Key, pressed: bool) {
            self.keys.push((key, pressed));
        }
    }

    #[test]
    fn frame_updates_then_renders() {
        let mut app = Counter::default();
        let mut context = HeadlessContext::new();

        let report = run_frame(&mut app, &mut context, 0.25);
        assert_eq!(report, FrameReport::default());
        assert_eq!(app.elapsed, 0.25);
        assert_eq!(
            context.commands(),
            &[Command::Clear {
                color: Color::INDIGO
            }]
        );
    }

    #[test]
    fn failed_update_still_renders() {
        let mut app = Counter {
            fail_update: true,
            ..Default::default()
        };
        let mut context = HeadlessContext::new();

        let report = run_frame(&mut app, &mut context, 1.0);
        assert!(report.update_failed);
        assert!(!report.render_failed);
        assert_eq!(context.commands().len(), 1);
    }

    #[test]
    fn key_events_reach_app() {
        let mut app = Counter::default();
        app.key_changed(Key::W, true);
        assert_eq!(app.keys, vec![(Key::W, true)]);
    }
}
