pub mod app;
pub mod debug_icosphere;
pub mod example_cube;
pub mod material_model;
pub mod shader;

pub use app::DrawingMaterialOnlyApp;
pub use debug_icosphere::DebugIcosphere;
pub use example_cube::ExampleCube;
pub use material_model::MaterialModel;
pub use shader::{MaterialOnlyCall, MaterialOnlyShader, MaterialOnlyVertex};

#[cfg(test)]
pub(crate) mod testing {
    use common::gfx::ShaderPaths;

    /// Writes placeholder bytecode the headless backend accepts.
    pub fn fake_bytecode(name: &str) -> ShaderPaths {
        let dir = std::env::temp_dir().join(format!("material-only-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let paths = ShaderPaths {
            vertex: dir.join("MaterialOnlyShader.vs.cso"),
            pixel: dir.join("MaterialOnlyShader.ps.cso"),
        };
        std::fs::write(&paths.vertex, b"vs").unwrap();
        std::fs::write(&paths.pixel, b"ps").unwrap();
        paths
    }
}
