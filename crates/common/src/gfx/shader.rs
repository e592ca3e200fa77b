use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use super::constant::SceneConstants;
use super::device::{DeviceError, GraphicsContext, GraphicsDevice, InputElement};

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to read shader bytecode {}: {source}", .path.display())]
    Bytecode {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("shader bytecode {} is empty", .0.display())]
    EmptyBytecode(PathBuf),
    #[error("shader bytecode loader panicked")]
    LoaderPanicked,
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error("shader is not initialized")]
    NotInitialized,
    #[error("no texture has been set")]
    MissingTexture,
}

/// Locations of the precompiled vertex and pixel shader objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderPaths {
    pub vertex: PathBuf,
    pub pixel: PathBuf,
}

impl ShaderPaths {
    /// `./cso/<name>.vs.cso` and `./cso/<name>.ps.cso`, as produced by `fxc`.
    pub fn compiled(name: &str) -> Self {
        let dir = Path::new(".").join("cso");
        Self {
            vertex: dir.join(format!("{name}.vs.cso")),
            pixel: dir.join(format!("{name}.ps.cso")),
        }
    }
}

type Pending = JoinHandle<Result<Vec<u8>, ShaderError>>;

/// Reads both bytecode files on their own threads until [`BytecodeLoad::join`].
pub struct BytecodeLoad {
    vertex: Pending,
    pixel: Pending,
}

impl BytecodeLoad {
    pub fn spawn(paths: &ShaderPaths) -> Self {
        let spawn = |path: PathBuf| std::thread::spawn(move || read_bytecode(&path));
        Self {
            vertex: spawn(paths.vertex.clone()),
            pixel: spawn(paths.pixel.clone()),
        }
    }

    /// Waits for both loads. The vertex shader's error wins if both failed.
    pub fn join(self) -> Result<(Vec<u8>, Vec<u8>), ShaderError> {
        let vertex = self.vertex.join().map_err(|_| ShaderError::LoaderPanicked);
        let pixel = self.pixel.join().map_err(|_| ShaderError::LoaderPanicked);
        Ok((vertex??, pixel??))
    }
}

fn read_bytecode(path: &Path) -> Result<Vec<u8>, ShaderError> {
    let bytecode = std::fs::read(path).map_err(|source| ShaderError::Bytecode {
        path: path.to_path_buf(),
        source,
    })?;
    if bytecode.is_empty() {
        return Err(ShaderError::EmptyBytecode(path.to_path_buf()));
    }
    log::debug!("Read {} bytes of bytecode from {}", bytecode.len(), path.display());
    Ok(bytecode)
}

/// Vertex shader, pixel shader and the input layout validated against the former.
pub struct ShaderProgram<D: GraphicsDevice> {
    vertex_shader: D::VertexShader,
    pixel_shader: D::PixelShader,
    input_layout: D::InputLayout,
}

impl<D: GraphicsDevice> ShaderProgram<D> {
    pub fn create(
        device: &D,
        vs_bytecode: &[u8],
        ps_bytecode: &[u8],
        layout: &[InputElement],
    ) -> Result<Self, DeviceError> {
        let vertex_shader = device.create_vertex_shader(vs_bytecode)?;
        let input_layout = device.create_input_layout(layout, vs_bytecode)?;
        let pixel_shader = device.create_pixel_shader(ps_bytecode)?;
        Ok(Self {
            vertex_shader,
            pixel_shader,
            input_layout,
        })
    }

    /// Loads the bytecode in the background while the constant buffers are
    /// created, then builds the program from it.
    pub fn load(
        device: &D,
        paths: &ShaderPaths,
        layout: &[InputElement],
        constants: &mut SceneConstants<D>,
    ) -> Result<Self, ShaderError> {
        let load = BytecodeLoad::spawn(paths);

        let buffers = constants.create_buffers(device);
        let bytecode = load.join();
        buffers?;

        let (vs_bytecode, ps_bytecode) = bytecode?;
        Ok(Self::create(device, &vs_bytecode, &ps_bytecode, layout)?)
    }

    pub fn bind<C: GraphicsContext<Device = D>>(&self, context: &mut C) {
        context.set_pipeline(&self.vertex_shader, &self.pixel_shader, &self.input_layout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::device::{ResourceKind, VertexFormat};
    use crate::gfx::headless::{Command, HeadlessContext, HeadlessDevice};
    use std::fs;

    const LAYOUT: &[InputElement] = &[InputElement {
        semantic: c"POSITION",
        format: VertexFormat::Float32x4,
        offset: 0,
    }];

    fn fixture(name: &str, vs: &[u8], ps: &[u8]) -> ShaderPaths {
        let dir = std::env::temp_dir().join(format!("common-shader-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let paths = ShaderPaths {
            vertex: dir.join("test.vs.cso"),
            pixel: dir.join("test.ps.cso"),
        };
        fs::write(&paths.vertex, vs).unwrap();
        fs::write(&paths.pixel, ps).unwrap();
        paths
    }

    #[test]
    fn compiled_paths() {
        let paths = ShaderPaths::compiled("MaterialOnlyShader");
        assert_eq!(paths.vertex, Path::new("./cso/MaterialOnlyShader.vs.cso"));
        assert_eq!(paths.pixel, Path::new("./cso/MaterialOnlyShader.ps.cso"));
    }

    #[test]
    fn join_returns_both_files() {
        let paths = fixture("both", b"vertex", b"pixel");
        let (vs, ps) = BytecodeLoad::spawn(&paths).join().unwrap();
        assert_eq!(vs, b"vertex");
        assert_eq!(ps, b"pixel");
    }

    #[test]
    fn missing_and_empty_files_fail() {
        let paths = fixture("empty", b"vertex", b"");
        assert!(matches!(
            BytecodeLoad::spawn(&paths).join(),
            Err(ShaderError::EmptyBytecode(path)) if path == paths.pixel
        ));

        let missing = ShaderPaths {
            pixel: paths.pixel.with_file_name("missing.ps.cso"),
            ..paths
        };
        assert!(matches!(
            BytecodeLoad::spawn(&missing).join(),
            Err(ShaderError::Bytecode { .. })
        ));
    }

    #[test]
    fn load_creates_buffers_and_program() {
        let paths = fixture("load", b"vs", b"ps");
        let device = HeadlessDevice::new();
        let mut constants = SceneConstants::new();

        let program = ShaderProgram::load(&device, &paths, LAYOUT, &mut constants).unwrap();
        assert!(constants.has_buffers());
        assert_eq!(device.created_count(ResourceKind::ConstantBuffer), 5);
        assert_eq!(device.created_count(ResourceKind::InputLayout), 1);

        let mut context = HeadlessContext::new();
        program.bind(&mut context);
        assert!(matches!(context.commands(), [Command::SetPipeline { .. }]));
    }

    #[test]
    fn load_reports_device_failures() {
        let paths = fixture("device", b"vs", b"ps");
        let device = HeadlessDevice::new().failing(ResourceKind::PixelShader);
        let mut constants = SceneConstants::new();

        assert!(matches!(
            ShaderProgram::load(&device, &paths, LAYOUT, &mut constants),
            Err(ShaderError::Device(DeviceError::Create {
                kind: ResourceKind::PixelShader,
                ..
            }))
        ));
    }
}
