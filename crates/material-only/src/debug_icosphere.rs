//! A spinning sphere that is generated instead of loaded from a file.

use std::f32::consts::TAU;

use common::geometry;
use common::gfx::*;
use common::math::*;
use common::transform::Transform;

use crate::shader::{MaterialOnlyCall, MaterialOnlyShader, MaterialOnlyVertex};

const SUBDIVISIONS: u32 = 2;

pub struct DebugIcosphere<D: GraphicsDevice> {
    call: MaterialOnlyCall<D>,
    material: Material,
    rotation_speed: f32,
    rotation_angle: f32,
    transform: Transform,
}

impl<D: GraphicsDevice> DebugIcosphere<D> {
    pub fn new(
        device: &D,
        material: Material,
        position: Vec3,
        scale: Vec3,
        rotation_speed: f32,
    ) -> Result<Self, DeviceError> {
        let mesh = geometry::icosphere(SUBDIVISIONS);
        let call = RenderCall::new(device, &MaterialOnlyVertex::from_mesh(&mesh), &mesh.indices)?;

        Ok(Self {
            call,
            material,
            rotation_speed,
            rotation_angle: 0.0,
            transform: Transform::new(position, Quat::IDENTITY, scale),
        })
    }

    /// Spins about +Y by `rotation_speed` radians per second.
    pub fn update(&mut self, dt: f32) {
        self.rotation_angle = (self.rotation_angle + self.rotation_speed * dt).rem_euclid(TAU);
        self.transform.rotation = Quat::from_rotation_y(self.rotation_angle);
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
