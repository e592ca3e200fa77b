use std::path::PathBuf;

use common::camera::FreeCamera;
use common::color::Color;
use common::framework::{Application, FrameworkError};
use common::gfx::*;
use common::input::{InputState, Key};
use common::math::*;
use common::transform::Transform;
use common::Config;
use material_only::app::{camera, projection, sun};
use material_only::{DebugIcosphere, MaterialOnlyShader};

use crate::shader::TexturedShader;
use crate::textured_model::TexturedModel;

pub const DEFAULT_MODEL: &str = "assets/man.obj";
pub const DEFAULT_TEXTURE: &str = "assets/man.png";

struct Scene<D: GraphicsDevice> {
    icosphere: DebugIcosphere<D>,
    man: TexturedModel<D>,
}

/// A UV-textured model next to material-only objects, both lit by the same sun.
pub struct UVTexturedDemo<D: GraphicsDevice> {
    material_shader: MaterialOnlyShader<D>,
    textured_shader: TexturedShader<D>,
    material_shader_paths: ShaderPaths,
    textured_shader_paths: ShaderPaths,

    model_path: PathBuf,
    texture_path: PathBuf,

    camera: FreeCamera,
    projection: Mat4,
    input: InputState,

    scene: Option<Scene<D>>,
}

impl<D: GraphicsDevice> UVTexturedDemo<D> {
    pub fn new(config: &Config) -> Self {
        Self {
            material_shader: MaterialOnlyShader::new(),
            textured_shader: TexturedShader::new(),
            material_shader_paths: ShaderPaths::compiled(MaterialOnlyShader::<D>::NAME),
            textured_shader_paths: ShaderPaths::compiled(TexturedShader::<D>::NAME),
            model_path: config.model_path_or(DEFAULT_MODEL).to_path_buf(),
            texture_path: config.texture_path_or(DEFAULT_TEXTURE).to_path_buf(),
            camera: camera(),
            projection: projection(config),
            input: InputState::default(),
            scene: None,
        }
    }

    pub fn with_shader_paths(mut self, material_only: ShaderPaths, textured: ShaderPaths) -> Self {
        self.material_shader_paths = material_only;
        self.textured_shader_paths = textured;
        self
    }

    pub fn textured_shader(&self) -> &TexturedShader<D> {
        &self.textured_shader
    }

    pub fn material_shader(&self) -> &MaterialOnlyShader<D> {
        &self.material_shader
    }
}

impl<D: GraphicsDevice> Application for UVTexturedDemo<D> {
    type Device = D;

    fn title(&self) -> &str {
        "UV textured model"
    }

    fn initialize(&mut self, device: &D) -> Result<(), FrameworkError> {
        self.material_shader
            .initialize_from(device, &self.material_shader_paths)?;
        self.textured_shader
            .initialize_from(device, &self.textured_shader_paths)?;

        let icosphere = DebugIcosphere::new(
            device,
            Material::new(
                Color::RED.with_alpha(0.8),
                Color::RED,
                Color::RED.clamp_and_scale(0.9),
            ),
            Vec3::new(3.0, 1.8, 6.0),
            Vec3::splat(0.5),
            1.1,
        )?;
        let man = TexturedModel::load(
            device,
            &self.model_path,
            &self.texture_path,
            Transform::from_position(Vec3::new(0.0, 0.0, 6.0)),
        )?;
        log::info!("Drawing {} textured meshes", man.mesh_count());

        let light = sun();
        self.material_shader.set_sun_light(light);
        self.material_shader.set_projection_transform(self.projection);
        self.textured_shader.set_sun_light(light);
        self.textured_shader.set_projection_transform(self.projection);

        self.scene = Some(Scene { icosphere, man });
        Ok(())
    }

    fn update(&mut self, dt: f32) -> Result<(), FrameworkError> {
        let scene = self.scene.as_mut().ok_or(ShaderError::NotInitialized)?;
        scene.icosphere.update(dt);

        self.input.drive(&mut self.camera, dt);
        Ok(())
    }

    fn render<C>(&mut self, context: &mut C) -> Result<(), FrameworkError>
    where
        C: GraphicsContext<Device = D>,
    {
        context.clear(Color::INDIGO);

        if self.camera.is_view_dirty() {
            let position = self.camera.position();
            let view = self.camera.view_matrix();
            self.material_shader.set_camera_position(position);
            self.material_shader.set_view_transform(view);
            self.textured_shader.set_camera_position(position);
            self.textured_shader.set_view_transform(view);
        }

        let scene = self.scene.as_ref().ok_or(ShaderError::NotInitialized)?;
        scene.icosphere.render(context, &mut self.material_shader)?;
        scene.man.render(context, &mut self.textured_shader)?;
        Ok(())
    }

    fn key_changed(&mut self, key: Key, pressed: bool) {
        self.input.set(key, pressed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fake_bytecode, man_fixture};
    use common::framework::run_frame;
    use common::gfx::headless::{Command, HeadlessContext, HeadlessDevice};

    fn config(model: &std::path::Path, texture: &std::path::Path) -> Config {
        let args = [
            "textured-model".to_string(),
            "--model".to_string(),
            model.display().to_string(),
            "--texture".to_string(),
            texture.display().to_string(),
        ];
        common::parse_args(args.into_iter()).unwrap()
    }

    fn demo(name: &str) -> UVTexturedDemo<HeadlessDevice> {
        let (model, texture) = man_fixture(name);
        UVTexturedDemo::new(&config(&model, &texture)).with_shader_paths(
            fake_bytecode(name, MaterialOnlyShader::<HeadlessDevice>::NAME),
            fake_bytecode(name, TexturedShader::<HeadlessDevice>::NAME),
        )
    }

    #[test]
    fn both_shaders_share_the_scene() {
        let device = HeadlessDevice::new();
        let mut app = demo("demo-init");
        app.initialize(&device).unwrap();

        assert_eq!(device.created_count(ResourceKind::ConstantBuffer), 10);
        assert_eq!(device.created_count(ResourceKind::Texture), 1);
        assert_eq!(
            app.material_shader().constants().ps_per_scene().get(),
            app.textured_shader().constants().ps_per_scene().get()
        );
    }

    #[test]
    fn frame_draws_sphere_then_man() {
        let device = HeadlessDevice::new();
        let mut app = demo("demo-frame");
        app.initialize(&device).unwrap();

        let mut context = HeadlessContext::new();
        let report = run_frame(&mut app, &mut context, 0.016);
        assert!(!report.update_failed && !report.render_failed);
        assert_eq!(context.draw_count(), 2);

        let texture_bound = context
            .commands()
            .iter()
            .position(|command| matches!(command, Command::SetPsTexture { .. }))
            .unwrap();
        let first_draw = context
            .commands()
            .iter()
            .position(|command| matches!(command, Command::DrawIndexed { .. }))
            .unwrap();
        assert!(first_draw < texture_bound);
    }

    #[test]
    fn missing_texture_aborts_initialize() {
        let device = HeadlessDevice::new();
        let (model, texture) = man_fixture("demo-no-texture");
        let mut app = UVTexturedDemo::new(&config(&model, &texture.with_file_name("nope.png")))
            .with_shader_paths(
                fake_bytecode("demo-no-texture", MaterialOnlyShader::<HeadlessDevice>::NAME),
                fake_bytecode("demo-no-texture", TexturedShader::<HeadlessDevice>::NAME),
            );

        assert!(matches!(
            app.initialize(&device),
            Err(FrameworkError::Texture(_))
        ));
    }
}
