//! A static model whose meshes are drawn with their own material and no texture.

use std::path::Path;

use common::color::Color;
use common::framework::FrameworkError;
use common::gfx::*;
use common::model;
use common::transform::Transform;

use crate::shader::{MaterialOnlyCall, MaterialOnlyShader, MaterialOnlyVertex};

/// Used for meshes that reference no material.
pub const FALLBACK_MATERIAL: Material = Material {
    specular: Color::BLACK,
    diffuse: Color::BROWN,
    ambient: Color::BROWN,
};

struct Part<D: GraphicsDevice> {
    call: MaterialOnlyCall<D>,
    material: Material,
}

pub struct MaterialModel<D: GraphicsDevice> {
    parts: Vec<Part<D>>,
    pub transform: Transform,
}

impl<D: GraphicsDevice> MaterialModel<D> {
    pub fn load(device: &D, path: impl AsRef<Path>, transform: Transform) -> Result<Self, FrameworkError> {
        let meshes = model::load_obj(path)?;

        let parts = meshes
            .iter()
            .map(|mesh| {
                let call = RenderCall::new(device, &MaterialOnlyVertex::from_mesh(mesh), &mesh.indices)
                    .inspect_err(|e| log::error!("Failed to upload {}: {e}", mesh.name))?;
                let material = mesh.material.map_or(FALLBACK_MATERIAL, Material::from);
                Ok(Part { call, material })
            })
            .collect::<Result<Vec<_>, DeviceError>>()?;

        Ok(Self { parts, transform })
    }

    pub fn mesh_count(&self) -> usize {
        self.parts.len()
    }

    /// The model transform is set once; every mesh then sets its material and draws.
    pub fn render<C>(&self, context: &mut C, shader: &mut MaterialOnlyShader<D>) -> Result<(), ShaderError>
    where
        C: GraphicsContext<Device = D>,
    {
        shader.set_model_transform(self.transform.matrix());
        for part in &self.parts {
            shader.set_object_material(part.material);
            shader.render(context, &part.call)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fake_bytecode;
    use common::gfx::headless::{HeadlessContext, HeadlessDevice};
    use common::math::*;
    use std::fs;

    fn road_fixture(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("material-model-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("road.mtl"),
            "newmtl asphalt\nKa 0.1 0.1 0.1\nKd 0.2 0.2 0.2\nKs 0.5 0.5 0.5\nNs 16\n",
        )
        .unwrap();
        fs::write(
            dir.join("road.obj"),
            "mtllib road.mtl\n\
             v -1 0 -1\nv 1 0 -1\nv 1 0 1\nv -1 0 1\n\
             v -1 0 2\nv 1 0 2\nv 1 0 3\n\
             vn 0 1 0\n\
             o curb\nf 5//1 6//1 7//1\n\
             o asphalt\nusemtl asphalt\nf 1//1 2//1 3//1\nf 1//1 3//1 4//1\n",
        )
        .unwrap();
        dir.join("road.obj")
    }

    #[test]
    fn one_draw_per_mesh() {
        let device = HeadlessDevice::new();
        let mut shader = MaterialOnlyShader::new();
        shader.initialize_from(&device, &fake_bytecode("road")).unwrap();

        let road = MaterialModel::load(&device, road_fixture("draw"), Transform::IDENTITY).unwrap();
        assert_eq!(road.mesh_count(), 2);

        let mut context = HeadlessContext::new();
        road.render(&mut context, &mut shader).unwrap();
        assert_eq!(context.draw_count(), 2);

        let last = shader.constants().ps_per_object().get().material;
        assert_eq!(last.diffuse, Color::new(0.2, 0.2, 0.2, 1.0));
    }

    #[test]
    fn materials_come_from_mtl() {
        let device = HeadlessDevice::new();
        let road = MaterialModel::load(&device, road_fixture("mtl"), Transform::from_position(Vec3::Y)).unwrap();

        assert_eq!(road.parts[0].material, FALLBACK_MATERIAL);
        let asphalt = road.parts[1].material;
        assert_eq!(asphalt.diffuse, Color::new(0.2, 0.2, 0.2, 1.0));
        assert_eq!(asphalt.specular.a, 16.0);
    }

    #[test]
    fn missing_file_is_a_model_error() {
        let device = HeadlessDevice::new();
        let path = std::env::temp_dir().join("material-model-missing.obj");
        assert!(matches!(
            MaterialModel::load(&device, path, Transform::IDENTITY),
            Err(FrameworkError::Model(_))
        ));
    }
}
