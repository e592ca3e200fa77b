use super::math::*;

/// Parallelism threshold between the new forward axis and up for `rotate_up`.
const MIN_FORWARD_UP_CROSS: f32 = 0.01;

/// Camera freely flown by the player: translate along its own axes, yaw about
/// the up axis and pitch about the right axis.
#[derive(Debug)]
pub struct FreeCamera {
    position: Vec3,
    forward: Vec3,
    up: Vec3,
    right: Vec3,

    view_matrix: Mat4,
    view_dirty: bool,
}

impl FreeCamera {
    pub fn new(position: Vec3, look_at: Vec3, up: Vec3) -> Self {
        let forward = (look_at - position).normalize();
        let up = up.normalize();
        Self {
            position,
            forward,
            up,
            right: up.cross(forward).normalize(),
            view_matrix: Mat4::IDENTITY,
            view_dirty: true,
        }
    }

    /// Rebuilds the cached view matrix if the camera moved since the last call.
    pub fn view_matrix(&mut self) -> Mat4 {
        if self.view_dirty {
            self.view_matrix = Mat4::look_at_lh(self.position, self.position + self.forward, self.up);
            self.view_dirty = false;
        }
        self.view_matrix
    }

    pub fn is_view_dirty(&self) -> bool {
        self.view_dirty
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn move_forward(&mut self, distance: f32) {
        self.translate(self.forward * distance);
    }

    pub fn move_right(&mut self, distance: f32) {
        self.translate(self.right * distance);
    }

    pub fn move_up(&mut self, distance: f32) {
        self.translate(self.up * distance);
    }

    pub fn rotate_right(&mut self, angle: f32) {
        let rotation = Quat::from_axis_angle(self.up, angle);
        self.forward = (rotation * self.forward).normalize();
        self.right = self.up.cross(self.forward).normalize();
        self.view_dirty = true;
    }

    /// Pitches the camera. Ignored when it would leave forward (nearly) parallel to up.
    pub fn rotate_up(&mut self, angle: f32) {
        let rotation = Quat::from_axis_angle(self.right, -angle);
        let forward = (rotation * self.forward).normalize();
        if forward.cross(self.up).length() < MIN_FORWARD_UP_CROSS {
            return;
        }

        self.forward = forward;
        self.right = self.up.cross(self.forward).normalize();
        self.view_dirty = true;
    }

    fn translate(&mut self, offset: Vec3) {
        self.position += offset;
        self.view_dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn camera() -> FreeCamera {
        FreeCamera::new(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, 2.0, 1.0), Vec3::Y)
    }

    #[test]
    fn axes_are_left_handed() {
        let camera = camera();
        assert!(camera.forward().abs_diff_eq(Vec3::Z, 1e-6));
        assert!(camera.right().abs_diff_eq(Vec3::X, 1e-6));
    }

    #[test]
    fn view_matrix_is_cached_until_moved() {
        let mut camera = camera();
        assert!(camera.is_view_dirty());
        let first = camera.view_matrix();
        assert!(!camera.is_view_dirty());
        assert_eq!(camera.view_matrix(), first);

        camera.move_forward(2.0);
        assert!(camera.is_view_dirty());
        let moved = camera.view_matrix();
        assert_ne!(moved, first);
        assert!(camera.position().abs_diff_eq(Vec3::new(0.0, 2.0, 2.0), 1e-6));
    }

    #[test]
    fn rotate_right_yaws_about_up() {
        let mut camera = camera();
        camera.rotate_right(FRAC_PI_2);
        assert!(camera.forward().abs_diff_eq(Vec3::X, 1e-5));
        assert!(camera.right().abs_diff_eq(-Vec3::Z, 1e-5));

        camera.move_right(1.0);
        assert!(camera.position().abs_diff_eq(Vec3::new(0.0, 2.0, -1.0), 1e-5));
    }

    #[test]
    fn rotate_up_pitches_and_refuses_to_flip() {
        let mut camera = camera();
        camera.rotate_up(0.5);
        assert!(camera.forward().y > 0.0);

        let before = camera.forward();
        camera.view_matrix();
        camera.rotate_up(FRAC_PI_2 - 0.5);
        assert_eq!(camera.forward(), before);
        assert!(!camera.is_view_dirty());
    }
}
