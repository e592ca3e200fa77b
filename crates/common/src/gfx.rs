//! Backend-agnostic building blocks shared by the shader bridges.

pub mod constant;
pub mod device;
pub mod headless;
pub mod light;
pub mod render_call;
pub mod shader;
pub mod texture;

#[cfg(windows)]
pub mod d3d11;

pub use constant::{ConstantBlock, LitShader, SceneConstants};
pub use device::{
    Buffer, DeviceError, GraphicsContext, GraphicsDevice, InputElement, ResourceKind,
    VertexFormat,
};
pub use light::{DirectionalLight, Material};
pub use render_call::{RenderCall, Vertex};
pub use shader::{BytecodeLoad, ShaderError, ShaderPaths, ShaderProgram};
pub use texture::{Texture, TextureData, TextureError};
