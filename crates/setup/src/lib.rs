//! The first tutorial step: open a window, import a model and clear the screen.

use std::marker::PhantomData;
use std::path::PathBuf;

use common::color::Color;
use common::framework::{Application, FrameworkError};
use common::gfx::{GraphicsContext, GraphicsDevice};
use common::model::{self, MeshData};
use common::Config;

pub const DEFAULT_MODEL: &str = "assets/man.obj";

pub struct SetupApp<D> {
    model_path: PathBuf,
    meshes: Vec<MeshData>,
    _device: PhantomData<fn(&D)>,
}

impl<D: GraphicsDevice> SetupApp<D> {
    pub fn new(config: &Config) -> Self {
        Self {
            model_path: config.model_path_or(DEFAULT_MODEL).to_path_buf(),
            meshes: Vec::new(),
            _device: PhantomData,
        }
    }

    pub fn meshes(&self) -> &[MeshData] {
        &self.meshes
    }
}

impl<D: GraphicsDevice> Application for SetupApp<D> {
    type Device = D;

    fn title(&self) -> &str {
        "Setup"
    }

    fn initialize(&mut self, _device: &D) -> Result<(), FrameworkError> {
        self.meshes = model::load_obj(&self.model_path)?;

        log::info!("Number of meshes found in file: {}", self.meshes.len());
        if let Some(first) = self.meshes.first() {
            log::info!("Number of vertices in first mesh: {}", first.vertex_count());
        }
        Ok(())
    }

    fn update(&mut self, _dt: f32) -> Result<(), FrameworkError> {
        Ok(())
    }

    fn render<C>(&mut self, context: &mut C) -> Result<(), FrameworkError>
    where
        C: GraphicsContext<Device = D>,
    {
        context.clear(Color::BLACK);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::framework::run_frame;
    use common::gfx::headless::{Command, HeadlessContext, HeadlessDevice};
    use common::model::ModelError;

    fn config_with_model(path: &std::path::Path) -> Config {
        let args = ["setup", "--model"].map(String::from).into_iter();
        common::parse_args(args.chain([path.display().to_string()])).unwrap()
    }

    #[test]
    fn imports_model_on_initialize() {
        let dir = std::env::temp_dir().join(format!("setup-import-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("quad.obj");
        std::fs::write(
            &path,
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3\nf 1 3 4\n",
        )
        .unwrap();

        let mut app = SetupApp::<HeadlessDevice>::new(&config_with_model(&path));
        app.initialize(&HeadlessDevice::new()).unwrap();

        assert_eq!(app.meshes().len(), 1);
        assert_eq!(app.meshes()[0].vertex_count(), 4);
        assert_eq!(app.meshes()[0].triangle_count(), 2);
    }

    #[test]
    fn missing_model_aborts_initialize() {
        let path = std::env::temp_dir().join("setup-does-not-exist.obj");
        let mut app = SetupApp::<HeadlessDevice>::new(&config_with_model(&path));

        assert!(matches!(
            app.initialize(&HeadlessDevice::new()),
            Err(FrameworkError::Model(ModelError::Load { .. }))
        ));
    }

    #[test]
    fn frame_clears_to_black() {
        let mut app = SetupApp::<HeadlessDevice>::new(&Config::default());
        let mut context = HeadlessContext::new();

        let report = run_frame(&mut app, &mut context, 0.016);
        assert!(!report.update_failed && !report.render_failed);
        assert_eq!(
            context.commands(),
            &[Command::Clear {
                color: Color::BLACK
            }]
        );
    }
}
