pub mod camera;
pub mod color;
pub mod framework;
pub mod geometry;
pub mod gfx;
pub mod input;
pub mod math;
pub mod model;
pub mod transform;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::Parser;

/// Command line of the tutorial binaries.
#[derive(Parser, Debug)]
#[command(
    about = "Direct3D 11 shader tutorial",
    after_help = "Asset paths are resolved against the current directory. \
        No sample assets ship with the tutorials: setup and textured-model \
        read assets/man.obj and assets/man.png next to the executable unless \
        --model and --texture point elsewhere."
)]
pub struct Args {
    /// Client area width in pixels.
    #[arg(long, default_value_t = 1280, value_parser = parse_extent)]
    width: u32,

    /// Client area height in pixels.
    #[arg(long, default_value_t = 720, value_parser = parse_extent)]
    height: u32,

    /// Do not enable the Direct3D debug layer.
    #[arg(long)]
    no_debug_layer: bool,

    /// Present without waiting for vertical sync.
    #[arg(long)]
    no_vsync: bool,

    /// OBJ model to load.
    #[arg(long)]
    model: Option<PathBuf>,

    /// PNG texture for the textured model.
    #[arg(long)]
    texture: Option<PathBuf>,
}

fn parse_extent(value: &str) -> Result<u32, String> {
    match value.parse::<u32>() {
        Ok(extent) if extent > 0 => Ok(extent),
        Ok(_) => Err("must be greater than zero".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    client_width: u32,
    client_height: u32,

    debug_layer_enabled: bool,
    vsync_enabled: bool,

    model_path: Option<PathBuf>,
    texture_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_width: 1280,
            client_height: 720,
            debug_layer_enabled: cfg!(debug_assertions),
            vsync_enabled: true,
            model_path: None,
            texture_path: None,
        }
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            client_width: args.width,
            client_height: args.height,
            debug_layer_enabled: cfg!(debug_assertions) && !args.no_debug_layer,
            vsync_enabled: !args.no_vsync,
            model_path: args.model,
            texture_path: args.texture,
        }
    }
}

impl Config {
    pub fn client_width(&self) -> u32 {
        self.client_width
    }

    pub fn client_height(&self) -> u32 {
        self.client_height
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.client_width as f32 / self.client_height as f32
    }

    pub fn debug_layer_enabled(&self) -> bool {
        self.debug_layer_enabled
    }

    pub fn vsync_enabled(&self) -> bool {
        self.vsync_enabled
    }

    pub fn model_path(&self) -> Option<&Path> {
        self.model_path.as_deref()
    }

    /// Model file passed with `--model`, or `default` when none was given.
    pub fn model_path_or<'a>(&'a self, default: &'a str) -> &'a Path {
        self.model_path
            .as_deref()
            .unwrap_or_else(|| Path::new(default))
    }

    pub fn texture_path_or<'a>(&'a self, default: &'a str) -> &'a Path {
        self.texture_path
            .as_deref()
            .unwrap_or_else(|| Path::new(default))
    }
}

/// Parses command line arguments. The first item is expected to be the program name.
pub fn parse_args<I, T>(args: I) -> Result<Config, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Args::try_parse_from(args).map(Config::from)
}

/// Resolves relative asset paths against the current directory, then moves
/// into the directory of the executable so that `./cso` is found next to it.
pub fn enter_executable_dir(config: &mut Config) {
    if let Ok(cwd) = std::env::current_dir() {
        config.model_path = config.model_path.take().map(|path| cwd.join(path));
        config.texture_path = config.texture_path.take().map(|path| cwd.join(path));
    }

    let dir = std::env::current_exe()
        .inspect_err(|e| log::warn!("Failed to get the path of this program: {e}"))
        .ok()
        .and_then(|path| path.parent().map(Path::to_path_buf));
    if let Some(dir) = dir {
        if let Err(e) = std::env::set_current_dir(&dir) {
            log::warn!("Failed to change the current working directory: {e}");
        }
    }
}

/// Installs the logger used by the demo binaries. `RUST_LOG` overrides the default `info` filter.
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    let _ = env_logger::Builder::from_env(env).try_init();
}
