pub mod app;
pub mod shader;
pub mod textured_model;

pub use app::UVTexturedDemo;
pub use shader::{TexturedCall, TexturedShader, TexturedVertex};
pub use textured_model::TexturedModel;
