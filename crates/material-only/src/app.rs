use std::path::PathBuf;

use common::camera::FreeCamera;
use common::color::Color;
use common::framework::{Application, FrameworkError};
use common::gfx::*;
use common::input::{InputState, Key};
use common::math::*;
use common::transform::Transform;
use common::Config;

use crate::debug_icosphere::DebugIcosphere;
use crate::example_cube::ExampleCube;
use crate::material_model::MaterialModel;
use crate::shader::MaterialOnlyShader;

pub fn sun() -> DirectionalLight {
    DirectionalLight::new(
        Vec3::new(2.0, -1.6, 3.0).normalize(),
        Color::PURE_WHITE,
        Color::PURE_WHITE,
        Color::PURE_WHITE.clamp_and_scale(0.15),
    )
}

pub fn projection(config: &Config) -> Mat4 {
    Mat4::perspective_lh(85f32.to_radians(), config.aspect_ratio(), 0.1, 100.0)
}

pub fn camera() -> FreeCamera {
    FreeCamera::new(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, 2.0, 1.0), Vec3::Y)
}

struct Scene<D: GraphicsDevice> {
    icosphere: DebugIcosphere<D>,
    cube: ExampleCube<D>,
    road: Option<MaterialModel<D>>,
}

/// Draws a few objects lit by the sun with nothing but their materials.
/// A model passed with `--model` is drawn as well.
pub struct DrawingMaterialOnlyApp<D: GraphicsDevice> {
    shader: MaterialOnlyShader<D>,
    shader_paths: ShaderPaths,
    model_path: Option<PathBuf>,

    camera: FreeCamera,
    projection: Mat4,
    input: InputState,

    scene: Option<Scene<D>>,
}

impl<D: GraphicsDevice> DrawingMaterialOnlyApp<D> {
    pub fn new(config: &Config) -> Self {
        Self {
            shader: MaterialOnlyShader::new(),
            shader_paths: ShaderPaths::compiled(MaterialOnlyShader::<D>::NAME),
            model_path: config.model_path().map(|path| path.to_path_buf()),
            camera: camera(),
            projection: projection(config),
            input: InputState::default(),
            scene: None,
        }
    }

    pub fn with_shader_paths(mut self, paths: ShaderPaths) -> Self {
        self.shader_paths = paths;
        self
    }

    pub fn shader(&self) -> &MaterialOnlyShader<D> {
        &self.shader
    }

    pub fn camera(&self) -> &FreeCamera {
        &self.camera
    }
}

impl<D: GraphicsDevice> Application for DrawingMaterialOnlyApp<D> {
    type Device = D;

    fn title(&self) -> &str {
        "Drawing with materials only"
    }

    fn initialize(&mut self, device: &D) -> Result<(), FrameworkError> {
        self.shader.initialize_from(device, &self.shader_paths)?;

        let icosphere = DebugIcosphere::new(
            device,
            Material::new(
                Color::RED.with_alpha(0.8),
                Color::RED,
                Color::RED.clamp_and_scale(0.9),
            ),
            Vec3::new(0.0, 1.8, 6.0),
            Vec3::ONE,
            1.1,
        )?;
        let cube = ExampleCube::new(
            device,
            Material::new(
                Color::CREAM.with_alpha(8.0),
                Color::BROWN,
                Color::BROWN.clamp_and_scale(0.6),
            ),
            Vec3::new(-4.0, 2.5, 9.0),
        )?;
        let road = self
            .model_path
            .as_ref()
            .map(|path| MaterialModel::load(device, path, Transform::IDENTITY))
            .transpose()?;
        if let Some(road) = &road {
            log::info!("Drawing {} meshes from the model", road.mesh_count());
        }

        self.shader.set_projection_transform(self.projection);
        self.shader.set_sun_light(sun());

        self.scene = Some(Scene {
            icosphere,
            cube,
            road,
        });
        Ok(())
    }

    fn update(&mut self, dt: f32) -> Result<(), FrameworkError> {
        let scene = self.scene.as_mut().ok_or(ShaderError::NotInitialized)?;
        scene.icosphere.update(dt);
        scene.cube.update(dt);

        self.input.drive(&mut self.camera, dt);
        Ok(())
    }

    fn render<C>(&mut self, context: &mut C) -> Result<(), FrameworkError>
    where
        C: GraphicsContext<Device = D>,
    {
        context.clear(Color::INDIGO);

        if self.camera.is_view_dirty() {
            self.shader.set_camera_position(self.camera.position());
            self.shader.set_view_transform(self.camera.view_matrix());
        }

        let scene = self.scene.as_ref().ok_or(ShaderError::NotInitialized)?;
        scene.icosphere.render(context, &mut self.shader)?;
        scene.cube.render(context, &mut self.shader)?;
        if let Some(road) = &scene.road {
            road.render(context, &mut self.shader)?;
        }
        Ok(())
    }

    fn key_changed(&mut self, key: Key, pressed: bool) {
        self.input.set(key, pressed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fake_bytecode;
    use approx::assert_relative_eq;
    use common::framework::run_frame;
    use common::gfx::headless::{Command, HeadlessContext, HeadlessDevice};

    fn app(name: &str) -> (HeadlessDevice, DrawingMaterialOnlyApp<HeadlessDevice>) {
        let device = HeadlessDevice::new();
        let mut app = DrawingMaterialOnlyApp::new(&Config::default()).with_shader_paths(fake_bytecode(name));
        app.initialize(&device).unwrap();
        (device, app)
    }

    #[test]
    fn initialize_sets_scene_constants() {
        let (_device, app) = app("app-init");
        let constants = app.shader().constants();
        assert_eq!(constants.ps_per_scene().get().sun, sun());
        assert_eq!(
            constants.vs_per_frame().get().projection,
            projection(&Config::default())
        );
        assert!(app.scene.is_some());
    }

    #[test]
    fn frames_upload_only_what_changed() {
        let (_device, mut app) = app("app-frames");
        let mut context = HeadlessContext::new();

        let report = run_frame(&mut app, &mut context, 0.016);
        assert!(!report.update_failed && !report.render_failed);
        assert_eq!(context.commands()[0], Command::Clear { color: Color::INDIGO });
        assert_eq!(context.draw_count(), 2);
        // All five blocks for the sphere, then the cube's transform and material.
        assert_eq!(context.buffer_writes().len(), 7);

        context.take_commands();
        run_frame(&mut app, &mut context, 0.016);
        assert_eq!(context.buffer_writes().len(), 4);

        context.take_commands();
        app.key_changed(Key::W, true);
        run_frame(&mut app, &mut context, 0.1);
        assert_eq!(context.buffer_writes().len(), 6);
        assert_relative_eq!(app.camera().position().z, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn missing_shader_aborts_initialize() {
        let device = HeadlessDevice::new();
        let mut app = DrawingMaterialOnlyApp::new(&Config::default())
            .with_shader_paths(ShaderPaths::compiled("Nothing"));

        assert!(matches!(
            app.initialize(&device),
            Err(FrameworkError::Shader(ShaderError::Bytecode { .. }))
        ));

        let mut context = HeadlessContext::new();
        let report = run_frame(&mut app, &mut context, 0.016);
        assert!(report.update_failed && report.render_failed);
        assert_eq!(context.draw_count(), 0);
    }
}
