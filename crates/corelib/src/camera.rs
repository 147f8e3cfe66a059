use crate::{Mat4, Vec3};

/// Largest pitch magnitude in degrees; keeps the view from flipping over the pole.
pub const PITCH_LIMIT_DEG: f32 = 89.0;

/// Movement keys held during a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveInput {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl MoveInput {
    pub fn any(&self) -> bool {
        self.forward || self.back || self.left || self.right || self.up || self.down
    }
}

/// First-person fly camera (right-handed, Y up). Angles are in degrees.
#[derive(Clone, Copy, Debug)]
pub struct FlyCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    /// World units per second.
    pub speed: f32,
    /// Degrees per mouse count.
    pub sensitivity: f32,
    pub fov_y_rad: f32,
    pub z_near: f32,
    pub z_far: f32,
    front: Vec3,
    right: Vec3,
    up: Vec3,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::new(Vec3::new(4.0, 4.0, 3.0), -90.0, 0.0)
    }
}

impl FlyCamera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut cam = Self {
            position,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG),
            speed: 5.0,
            sensitivity: 0.1,
            fov_y_rad: 45f32.to_radians(),
            z_near: 0.1,
            z_far: 100.0,
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
        };
        cam.update_vectors();
        cam
    }

    #[inline]
    pub fn front(&self) -> Vec3 {
        self.front
    }

    #[inline]
    pub fn right(&self) -> Vec3 {
        self.right
    }

    #[inline]
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Mouse-look from relative motion. Screen Y grows downwards, so it is inverted.
    pub fn look(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch = (self.pitch - dy * self.sensitivity).clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
        self.update_vectors();
    }

    /// Fly along the camera axes for `dt` seconds.
    pub fn advance(&mut self, input: MoveInput, dt: f32) {
        let velocity = self.speed * dt;
        if input.forward {
            self.position += self.front * velocity;
        }
        if input.back {
            self.position -= self.front * velocity;
        }
        if input.left {
            self.position -= self.right * velocity;
        }
        if input.right {
            self.position += self.right * velocity;
        }
        if input.up {
            self.position += self.up * velocity;
        }
        if input.down {
            self.position -= self.up * velocity;
        }
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Projection with wgpu depth range (z in [0,1]).
    #[inline]
    pub fn proj(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_rad, aspect.max(1e-6), self.z_near, self.z_far)
    }

    #[inline]
    pub fn proj_view(&self, aspect: f32) -> Mat4 {
        self.proj(aspect) * self.view()
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        let dir = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos());
        self.front = dir.normalize();
        self.right = self.front.cross(Vec3::Y).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn default_looks_down_negative_z() {
        let cam = FlyCamera::default();
        assert!(approx(cam.front(), Vec3::NEG_Z));
        assert!(approx(cam.right(), Vec3::X));
        assert!(approx(cam.up(), Vec3::Y));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = FlyCamera::default();
        cam.look(0.0, -10_000.0);
        assert_eq!(cam.pitch, PITCH_LIMIT_DEG);
        cam.look(0.0, 10_000.0);
        assert_eq!(cam.pitch, -PITCH_LIMIT_DEG);
        assert!(cam.front().is_finite());
    }

    #[test]
    fn mouse_right_turns_right() {
        let mut cam = FlyCamera::new(Vec3::ZERO, -90.0, 0.0);
        cam.look(900.0, 0.0);
        assert!((cam.yaw - 0.0).abs() < 1e-4);
        assert!(approx(cam.front(), Vec3::X));
    }

    #[test]
    fn wasd_moves_along_camera_axes() {
        let mut cam = FlyCamera::new(Vec3::ZERO, -90.0, 0.0);
        let forward = MoveInput {
            forward: true,
            ..MoveInput::default()
        };
        cam.advance(forward, 1.0);
        assert!(approx(cam.position, Vec3::new(0.0, 0.0, -5.0)));

        let strafe = MoveInput {
            right: true,
            up: true,
            ..MoveInput::default()
        };
        cam.advance(strafe, 0.5);
        assert!(approx(cam.position, Vec3::new(2.5, 2.5, -5.0)));

        cam.advance(MoveInput::default(), 10.0);
        assert!(approx(cam.position, Vec3::new(2.5, 2.5, -5.0)));
    }

    #[test]
    fn proj_view_is_finite() {
        let cam = FlyCamera::default();
        let pv = cam.proj_view(16.0 / 9.0);
        assert!(pv.to_cols_array().iter().all(|f| f.is_finite()));
    }
}
