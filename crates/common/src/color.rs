use bytemuck::{Pod, Zeroable};

#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

macro_rules! hex_color {
    ($r:expr, $g:expr, $b:expr) => {
        Color {
            r: $r as f32 / 255.0,
            g: $g as f32 / 255.0,
            b: $b as f32 / 255.0,
            a: 1.0,
        }
    };
}

impl Color {
    // https://coolors.co/151515-4b0082-a63d40-402e2a-e9b872
    pub const BLACK: Color = hex_color!(0x15, 0x15, 0x15);
    pub const INDIGO: Color = hex_color!(0x4b, 0x00, 0x82);
    pub const RED: Color = hex_color!(0xa6, 0x3d, 0x40);
    pub const BROWN: Color = hex_color!(0x40, 0x2e, 0x2a);
    pub const CREAM: Color = hex_color!(0xf9, 0xb8, 0x72);
    pub const PURE_WHITE: Color = hex_color!(0xff, 0xff, 0xff);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        )
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        Self { a: alpha, ..self }
    }

    /// Scales every channel, alpha included, clamping the result to `[0, 1]`.
    pub fn clamp_and_scale(self, factor: f32) -> Self {
        let scale = |c: f32| (c * factor).clamp(0.0, 1.0);
        Self::new(scale(self.r), scale(self.g), scale(self.b), scale(self.a))
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[f32; 4]> for Color {
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Self::new(r, g, b, a)
    }
}
