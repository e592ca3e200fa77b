//! A static model drawn with one texture shared by all of its meshes.

use std::path::Path;

use common::framework::FrameworkError;
use common::gfx::*;
use common::model;
use common::transform::Transform;
use material_only::material_model::FALLBACK_MATERIAL;

use crate::shader::{TexturedCall, TexturedShader, TexturedVertex};

struct Part<D: GraphicsDevice> {
    call: TexturedCall<D>,
    material: Material,
}

pub struct TexturedModel<D: GraphicsDevice> {
    parts: Vec<Part<D>>,
    texture: Texture<D>,
    pub transform: Transform,
}

impl<D: GraphicsDevice> TexturedModel<D> {
    pub fn load(
        device: &D,
        model_path: impl AsRef<Path>,
        texture_path: impl AsRef<Path>,
        transform: Transform,
    ) -> Result<Self, FrameworkError> {
        let meshes = model::load_obj(model_path)?;
        let texture = Texture::new(device, &TextureData::load_png(texture_path)?)?;

        let parts = meshes
            .iter()
            .map(|mesh| {
                let call = RenderCall::new(device, &TexturedVertex::from_mesh(mesh), &mesh.indices)
                    .inspect_err(|e| log::error!("Failed to upload {}: {e}", mesh.name))?;
                let material = mesh.material.map_or(FALLBACK_MATERIAL, Material::from);
                Ok(Part { call, material })
            })
            .collect::<Result<Vec<_>, DeviceError>>()?;

        Ok(Self {
            parts,
            texture,
            transform,
        })
    }

    pub fn mesh_count(&self) -> usize {
        self.parts.len()
    }

    pub fn texture(&self) -> &Texture<D> {
        &self.texture
    }

    pub fn render<C>(&self, context: &mut C, shader: &mut TexturedShader<D>) -> Result<(), ShaderError>
    where
        C: GraphicsContext<Device = D>,
    {
        shader.set_model_transform(self.transform.matrix());
        shader.set_texture(&self.texture);
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
    use crate::testing::{fake_bytecode, man_fixture};
    use common::gfx::headless::{Command, HeadlessContext, HeadlessDevice};
    use common::gfx::TextureError;

    #[test]
    fn loads_meshes_and_texture() {
        let device = HeadlessDevice::new();
        let (model, texture) = man_fixture("load");
        let man = TexturedModel::load(&device, model, texture, Transform::IDENTITY).unwrap();

        assert_eq!(man.mesh_count(), 1);
        assert_eq!(man.texture().size(), (2, 2));
        assert_eq!(man.parts[0].call.index_count(), 6);
        assert_eq!(man.parts[0].material, FALLBACK_MATERIAL);
    }

    #[test]
    fn render_uses_model_texture() {
        let device = HeadlessDevice::new();
        let mut shader = TexturedShader::new();
        shader
            .initialize_from(&device, &fake_bytecode("man-shader", TexturedShader::<HeadlessDevice>::NAME))
            .unwrap();

        let (model, texture) = man_fixture("render");
        let man = TexturedModel::load(&device, model, texture, Transform::IDENTITY).unwrap();

        let mut context = HeadlessContext::new();
        man.render(&mut context, &mut shader).unwrap();

        assert!(context.commands().iter().any(|command| matches!(
            command,
            Command::SetPsTexture { texture, .. } if texture == man.texture().handle()
        )));
        assert_eq!(context.draw_count(), 1);
    }

    #[test]
    fn missing_texture_file_fails_load() {
        let device = HeadlessDevice::new();
        let (model, texture) = man_fixture("no-png");
        std::fs::remove_file(&texture).unwrap();

        assert!(matches!(
            TexturedModel::load(&device, model, texture, Transform::IDENTITY),
            Err(FrameworkError::Texture(TextureError::Io { .. }))
        ));
    }
}
