use bytemuck::{Pod, Zeroable};

use crate::color::Color;
use crate::math::*;
use crate::model::MaterialData;

/// Surface response to light. The alpha of `specular` is the shininess exponent.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Material {
    pub specular: Color,
    pub diffuse: Color,
    pub ambient: Color,
}

impl Material {
    pub fn new(specular: Color, diffuse: Color, ambient: Color) -> Self {
        Self {
            specular,
            diffuse,
            ambient,
        }
    }
}

impl From<MaterialData> for Material {
    fn from(data: MaterialData) -> Self {
        Self::new(data.specular, data.diffuse, data.ambient)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct DirectionalLight {
    pub direction: Vec3,
    _pad: f32,
    pub specular: Color,
    pub diffuse: Color,
    pub ambient: Color,
}

impl DirectionalLight {
    pub fn new(direction: Vec3, specular: Color, diffuse: Color, ambient: Color) -> Self {
        Self {
            direction,
            _pad: 0.0,
            specular,
            diffuse,
            ambient,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_fill_whole_registers() {
        assert_eq!(std::mem::size_of::<Material>(), 48);
        assert_eq!(std::mem::size_of::<DirectionalLight>(), 64);

        let sun = DirectionalLight::new(Vec3::Y, Color::CREAM, Color::CREAM, Color::CREAM);
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&sun));
        assert_eq!(&floats[..4], &[0.0, 1.0, 0.0, 0.0]);
        assert_eq!(&floats[4..8], &Color::CREAM.to_array());
    }
}
