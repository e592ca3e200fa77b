//! The material shader extended with one diffuse texture.

use bytemuck::{Pod, Zeroable};
use common::gfx::*;
use common::math::*;
use common::model::MeshData;

#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct TexturedVertex {
    pub position: Vec3,
    one: f32,
    pub normal: Vec3,
    zero: f32,
    pub uv: Vec2,
}

impl TexturedVertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position,
            one: 1.0,
            normal,
            zero: 0.0,
            uv,
        }
    }

    pub fn from_mesh(mesh: &MeshData) -> Vec<Self> {
        mesh.positions
            .iter()
            .zip(&mesh.normals)
            .zip(&mesh.texcoords)
            .map(|((&position, &normal), &uv)| Self::new(position, normal, uv))
            .collect()
    }
}

impl Vertex for TexturedVertex {
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
        InputElement {
            semantic: c"TEXCOORD",
            format: VertexFormat::Float32x2,
            offset: 32,
        },
    ];
}

pub type TexturedCall<D> = RenderCall<D, TexturedVertex>;

pub struct TexturedShader<D: GraphicsDevice> {
    constants: SceneConstants<D>,
    program: Option<ShaderProgram<D>>,
    sampler: Option<D::Sampler>,
    texture: Option<Texture<D>>,
}

impl<D: GraphicsDevice> Default for TexturedShader<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: GraphicsDevice> TexturedShader<D> {
    pub const NAME: &'static str = "TexturedShader";

    pub fn new() -> Self {
        Self {
            constants: SceneConstants::new(),
            program: None,
            sampler: None,
            texture: None,
        }
    }

    pub fn initialize(&mut self, device: &D) -> Result<(), ShaderError> {
        self.initialize_from(device, &ShaderPaths::compiled(Self::NAME))
    }

    pub fn initialize_from(&mut self, device: &D, paths: &ShaderPaths) -> Result<(), ShaderError> {
        let program = ShaderProgram::load(device, paths, TexturedVertex::LAYOUT, &mut self.constants)
            .inspect_err(|e| log::error!("Failed to initialize {}: {e}", Self::NAME))?;
        let sampler = device
            .create_sampler()
            .inspect_err(|e| log::error!("Failed to create the {} sampler: {e}", Self::NAME))?;

        self.program = Some(program);
        self.sampler = Some(sampler);

        log::info!("Initialized {}", Self::NAME);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.program.is_some() && self.sampler.is_some()
    }

    /// Sampled at `t0` by every following render.
    pub fn set_texture(&mut self, texture: &Texture<D>) {
        self.texture = Some(texture.clone());
    }

    pub fn render<C>(&mut self, context: &mut C, call: &TexturedCall<D>) -> Result<(), ShaderError>
    where
        C: GraphicsContext<Device = D>,
    {
        let (Some(program), Some(sampler)) = (&self.program, &self.sampler) else {
            return Err(ShaderError::NotInitialized);
        };
        let texture = self.texture.as_ref().ok_or(ShaderError::MissingTexture)?;

        program.bind(context);
        context.set_ps_texture(0, texture.handle(), sampler);

        self.constants
            .sync_and_bind(context)
            .inspect_err(|e| log::error!("Failed to update {} constants: {e}", Self::NAME))?;

        call.draw(context);
        Ok(())
    }
}

impl<D: GraphicsDevice> LitShader<D> for TexturedShader<D> {
    fn constants(&self) -> &SceneConstants<D> {
        &self.constants
    }

    fn constants_mut(&mut self) -> &mut SceneConstants<D> {
        &mut self.constants
    }
}
