//! Translation, rotation and scale kept apart until a matrix is needed for the GPU.

use std::ops::Mul;

use super::math::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Model matrix: scale, then rotate, then translate.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Exact when the scale is uniform; with non-uniform scale the shear that
    /// a true inverse would need cannot be represented.
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        let scale = self.scale.recip();
        let position = -(scale * (rotation * self.position));
        Self {
            position,
            rotation,
            scale,
        }
    }

    pub fn from_matrix(m: &Mat4) -> Self {
        let (scale, rotation, position) = m.to_scale_rotation_translation();
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Blends `t1` (ratio 0) towards `t2` (ratio 1). Position and scale are
    /// interpolated linearly, rotation spherically.
    pub fn lerp(t1: &Transform, t2: &Transform, ratio: f32) -> Self {
        Self {
            position: t1.position.lerp(t2.position, ratio),
            rotation: t1.rotation.slerp(t2.rotation, ratio),
            scale: t1.scale.lerp(t2.scale, ratio),
        }
    }
}

impl Mul for Transform {
    type Output = Transform;

    /// `parent * child`: the child is expressed in the parent's space.
    fn mul(self, child: Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * (self.scale * child.position),
            rotation: (self.rotation * child.rotation).normalize(),
            scale: self.scale * child.scale,
        }
    }
}
