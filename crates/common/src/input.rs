use super::camera::FreeCamera;

/// Units per second.
pub const MOVE_SPEED: f32 = 10.0;
/// Radians per second.
pub const ROTATE_SPEED: f32 = 1.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    W,
    A,
    S,
    D,
    Left,
    Right,
    Escape,
}

#[derive(Debug, Default, Clone)]
pub struct InputState {
    w: bool,
    a: bool,
    s: bool,
    d: bool,
    left: bool,
    right: bool,
}

impl InputState {
    pub fn set(&mut self, key: Key, pressed: bool) {
        match key {
            Key::W => self.w = pressed,
            Key::A => self.a = pressed,
            Key::S => self.s = pressed,
            Key::D => self.d = pressed,
            Key::Left => self.left = pressed,
            Key::Right => self.right = pressed,
            Key::Escape => {}
        }
    }

    /// Flies the camera for `dt` seconds. Opposite keys held together cancel out.
    pub fn drive(&self, camera: &mut FreeCamera, dt: f32) {
        let step = dt * MOVE_SPEED;
        let turn = dt * ROTATE_SPEED;

        if let Some(direction) = axis(self.w, self.s) {
            camera.move_forward(direction * step);
        }
        if let Some(direction) = axis(self.d, self.a) {
            camera.move_right(direction * step);
        }
        if let Some(direction) = axis(self.right, self.left) {
            camera.rotate_right(direction * turn);
        }
    }
}

fn axis(positive: bool, negative: bool) -> Option<f32> {
    match (positive, negative) {
        (true, false) => Some(1.0),
        (false, true) => Some(-1.0),
        _ => None,
    }
}
