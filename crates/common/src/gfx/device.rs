use std::ffi::CStr;
use std::fmt;

use super::texture::TextureData;
use crate::color::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    VertexBuffer,
    IndexBuffer,
    ConstantBuffer,
    VertexShader,
    PixelShader,
    InputLayout,
    Texture,
    Sampler,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::VertexBuffer => "vertex buffer",
            ResourceKind::IndexBuffer => "index buffer",
            ResourceKind::ConstantBuffer => "constant buffer",
            ResourceKind::VertexShader => "vertex shader",
            ResourceKind::PixelShader => "pixel shader",
            ResourceKind::InputLayout => "input layout",
            ResourceKind::Texture => "texture",
            ResourceKind::Sampler => "sampler",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("failed to create {kind}: {message}")]
    Create { kind: ResourceKind, message: String },
    #[error("failed to map buffer for writing: {0}")]
    Map(String),
    #[error("{size} bytes do not fit into a {capacity} byte buffer")]
    Oversize { size: usize, capacity: usize },
    #[error("cannot create an empty {0}")]
    EmptyData(ResourceKind),
    #[error("{count} elements are too many for one {kind}")]
    TooManyElements { kind: ResourceKind, count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexFormat {
    Float32x2,
    Float32x4,
}

impl VertexFormat {
    pub fn size(self) -> u32 {
        match self {
            VertexFormat::Float32x2 => 8,
            VertexFormat::Float32x4 => 16,
        }
    }
}

/// One attribute of an interleaved vertex, read from input slot 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputElement {
    pub semantic: &'static CStr,
    pub format: VertexFormat,
    pub offset: u32,
}

/// Creates GPU resources. Unlike the context it does not touch pipeline state.
pub trait GraphicsDevice {
    type Buffer: Clone + fmt::Debug;
    type VertexShader: Clone;
    type PixelShader: Clone;
    type InputLayout: Clone;
    type Texture: Clone;
    type Sampler: Clone;

    /// Immutable buffer initialized with `data`.
    fn create_vertex_buffer(&self, data: &[u8], label: &str) -> Result<Self::Buffer, DeviceError>;
    fn create_index_buffer(&self, data: &[u8], label: &str) -> Result<Self::Buffer, DeviceError>;
    /// Dynamic buffer that the CPU rewrites as a whole.
    fn create_constant_buffer(&self, size: usize, label: &str)
        -> Result<Self::Buffer, DeviceError>;

    fn create_vertex_shader(&self, bytecode: &[u8]) -> Result<Self::VertexShader, DeviceError>;
    fn create_pixel_shader(&self, bytecode: &[u8]) -> Result<Self::PixelShader, DeviceError>;
    fn create_input_layout(
        &self,
        elements: &[InputElement],
        vs_bytecode: &[u8],
    ) -> Result<Self::InputLayout, DeviceError>;

    fn create_texture(&self, data: &TextureData) -> Result<Self::Texture, DeviceError>;
    fn create_sampler(&self) -> Result<Self::Sampler, DeviceError>;
}

pub type Buffer<D> = <D as GraphicsDevice>::Buffer;

/// Pipeline binding and draw submission. Not meant to be shared between threads.
pub trait GraphicsContext {
    type Device: GraphicsDevice;

    /// Replaces the whole content of a constant buffer (map, copy, unmap).
    fn update_buffer(&mut self, buffer: &Buffer<Self::Device>, data: &[u8])
        -> Result<(), DeviceError>;

    fn set_pipeline(
        &mut self,
        vertex_shader: &<Self::Device as GraphicsDevice>::VertexShader,
        pixel_shader: &<Self::Device as GraphicsDevice>::PixelShader,
        input_layout: &<Self::Device as GraphicsDevice>::InputLayout,
    );

    fn set_vs_constant_buffers(&mut self, start_slot: u32, buffers: &[&Buffer<Self::Device>]);
    fn set_ps_constant_buffers(&mut self, start_slot: u32, buffers: &[&Buffer<Self::Device>]);

    fn set_ps_texture(
        &mut self,
        slot: u32,
        texture: &<Self::Device as GraphicsDevice>::Texture,
        sampler: &<Self::Device as GraphicsDevice>::Sampler,
    );

    fn set_vertex_buffer(&mut self, buffer: &Buffer<Self::Device>, stride: u32);
    /// Binds 32-bit indices.
    fn set_index_buffer(&mut self, buffer: &Buffer<Self::Device>);

    /// Draws a triangle list from the bound buffers.
    fn draw_indexed(&mut self, index_count: u32);

    fn clear(&mut self, color: Color);
}
