//! A cube that shows the bare minimum needed to draw with [`MaterialOnlyShader`].
//! It loops through a few keyframes around its center.

use std::f32::consts::FRAC_PI_2;

use common::geometry;
use common::gfx::*;
use common::math::*;
use common::transform::Transform;

use crate::shader::{MaterialOnlyCall, MaterialOnlyShader, MaterialOnlyVertex};

/// Seconds for one trip around the path.
const LOOP_DURATION: f32 = 8.0;

pub struct ExampleCube<D: GraphicsDevice> {
    call: MaterialOnlyCall<D>,
    material: Material,
    keyframes: Vec<Transform>,
    elapsed: f32,
    transform: Transform,
}

impl<D: GraphicsDevice> ExampleCube<D> {
    pub fn new(device: &D, material: Material, center: Vec3) -> Result<Self, DeviceError> {
        let mesh = geometry::cube();
        let call = RenderCall::new(device, &MaterialOnlyVertex::from_mesh(&mesh), &mesh.indices)?;

        let tilt = Quat::from_rotation_x(0.4);
        let keyframes = vec![
            Transform::new(center + Vec3::new(-2.0, 0.0, 0.0), tilt, Vec3::splat(0.5)),
            Transform::new(
                center + Vec3::new(0.0, 1.0, 1.5),
                tilt * Quat::from_rotation_y(FRAC_PI_2),
                Vec3::splat(0.7),
            ),
            Transform::new(
                center + Vec3::new(2.0, 0.0, 0.0),
                Quat::from_rotation_y(2.0 * FRAC_PI_2),
                Vec3::splat(0.5),
            ),
            Transform::new(
                center + Vec3::new(0.0, -0.5, -1.5),
                Quat::from_rotation_y(3.0 * FRAC_PI_2) * tilt,
                Vec3::splat(0.3),
            ),
        ];
        let transform = keyframes[0];

        Ok(Self {
            call,
            material,
            keyframes,
            elapsed: 0.0,
            transform,
        })
    }

    pub fn update(&mut self, dt: f32) {
        self.elapsed = (self.elapsed + dt).rem_euclid(LOOP_DURATION);

        let segment_duration = LOOP_DURATION / self.keyframes.len() as f32;
        let position = self.elapsed / segment_duration;
        let index = (position as usize).min(self.keyframes.len() - 1);
        let next = (index + 1) % self.keyframes.len();

        self.transform = Transform::lerp(
            &self.keyframes[index],
            &self.keyframes[next],
            position - index as f32,
        );
    }

    pub fn render<C>(&self, context: &mut C, shader: &mut MaterialOnlyShader<D>) -> Result<(), ShaderError>
    where
        C: GraphicsContext<Device = D>,
    {
        shader.set_model_transform(self.transform.matrix());
        shader.set_object_material(self.material);
        shader.render(context, &self.call)
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use common::color::Color;
    use common::gfx::headless::HeadlessDevice;

    fn cube() -> ExampleCube<HeadlessDevice> {
        let material = Material::new(Color::CREAM, Color::BROWN, Color::BROWN);
        ExampleCube::new(&HeadlessDevice::new(), material, Vec3::new(0.0, 2.0, 8.0)).unwrap()
    }

    #[test]
    fn passes_through_keyframes() {
        let mut cube = cube();
        let segment = LOOP_DURATION / 4.0;

        cube.update(segment);
        assert_relative_eq!(cube.transform().position.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(cube.transform().position.y, 3.0, epsilon = 1e-4);
        assert_relative_eq!(cube.transform().scale.x, 0.7, epsilon = 1e-4);

        cube.update(segment / 2.0);
        assert_relative_eq!(cube.transform().position.x, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn path_loops() {
        let mut cube = cube();
        let start = *cube.transform();

        cube.update(LOOP_DURATION * 0.9);
        assert!(cube.transform().position.distance(start.position) > 0.1);

        cube.update(LOOP_DURATION * 0.1);
        assert!(cube.transform().matrix().abs_diff_eq(start.matrix(), 1e-3));
    }
}
