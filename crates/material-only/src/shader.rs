//! A lit shader that colors surfaces from their material alone.

use bytemuck::{Pod, Zeroable};
use common::gfx::*;
use common::math::*;
use common::model::MeshData;

#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct MaterialOnlyVertex {
    pub position: Vec3,
    one: f32,
    pub normal: Vec3,
    zero: f32,
}

impl MaterialOnlyVertex {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position,
            one: 1.0,
            normal,
            zero: 0.0,
        }
    }

    pub fn from_mesh(mesh: &MeshData) -> Vec<Self> {
        mesh.positions
            .iter()
            .zip(&mesh.normals)
            .map(|(&position, &normal)| Self::new(position, normal))
            .collect()
    }
}

impl Vertex for MaterialOnlyVertex {
    const LAYOUT: &'static [InputElement] = &[
        InputElement {
            semantic: c"POSITION",
            format: VertexFormat::Float32x4,
            offset: 0,
        },
        InputElement {
            semantic: c"NORMAL",
            format: VertexFormat::Float32x4,
            offset: 16,
        },
    ];
}

pub type MaterialOnlyCall<D> = RenderCall<D, MaterialOnlyVertex>;

pub struct MaterialOnlyShader<D: GraphicsDevice> {
    constants: SceneConstants<D>,
    program: Option<ShaderProgram<D>>,
}

impl<D: GraphicsDevice> Default for MaterialOnlyShader<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: GraphicsDevice> MaterialOnlyShader<D> {
    pub const NAME: &'static str = "MaterialOnlyShader";

    pub fn new() -> Self {
        Self {
            constants: SceneConstants::new(),
            program: None,
        }
    }

    /// Loads `./cso/MaterialOnlyShader.{vs,ps}.cso` and creates the pipeline objects.
    pub fn initialize(&mut self, device: &D) -> Result<(), ShaderError> {
        self.initialize_from(device, &ShaderPaths::compiled(Self::NAME))
    }

    pub fn initialize_from(&mut self, device: &D, paths: &ShaderPaths) -> Result<(), ShaderError> {
        let program =
            ShaderProgram::load(device, paths, MaterialOnlyVertex::LAYOUT, &mut self.constants)
                .inspect_err(|e| log::error!("Failed to initialize {}: {e}", Self::NAME))?;
        self.program = Some(program);

        log::info!("Initialized {}", Self::NAME);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.program.is_some()
    }

    /// Binds the program, uploads whatever parameters changed since the last
    /// render and draws `call`.
    pub fn render<C>(&mut self, context: &mut C, call: &MaterialOnlyCall<D>) -> Result<(), ShaderError>
    where
        C: GraphicsContext<Device = D>,
    {
        let program = self.program.as_ref().ok_or(ShaderError::NotInitialized)?;
        program.bind(context);

        self.constants
            .sync_and_bind(context)
            .inspect_err(|e| log::error!("Failed to update {} constants: {e}", Self::NAME))?;

        call.draw(context);
        Ok(())
    }
}

impl<D: GraphicsDevice> LitShader<D> for MaterialOnlyShader<D> {
    fn constants(&self) -> &SceneConstants<D> {
        &self.constants
    }

    fn constants_mut(&mut self) -> &mut SceneConstants<D> {
        &mut self.constants
    }
}
