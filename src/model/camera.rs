use glam::{Mat4, Vec2, Vec3};

use crate::config::SandboxConfig;
use crate::model::raycast::Ray;

/// Just under π/2, keeps `forward` away from the up axis.
const MAX_VIEW_PITCH: f32 = 1.5533;

pub struct Camera {
    pub eye: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    /// Camera at the configured start pose, looking down -Z.
    pub fn new(config: &SandboxConfig, width: u32, height: u32) -> Self {
        let mut camera = Self {
            eye: config.camera_eye,
            yaw: 0.0,
            pitch: 0.0,
            up: Vec3::Y,
            fov_y: config.fov_y_degrees.to_radians(),
            aspect: 1.0,
            z_near: config.z_near,
            z_far: config.z_far,
        };
        camera.set_aspect(width, height);
        camera.set_look_at(config.camera_eye + Vec3::NEG_Z);
        camera
    }

    pub fn forward(&self) -> Vec3 {
        let cy = self.yaw;
        let cp = self.pitch.clamp(-MAX_VIEW_PITCH, MAX_VIEW_PITCH);
        Vec3::new(cy.cos() * cp.cos(), cp.sin(), cy.sin() * cp.cos()).normalize()
    }

    /// Horizontal right vector; independent of pitch.
    pub fn right(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, self.yaw.cos())
    }

    /// Forward flattened onto the xz-plane.
    pub fn ground_forward(&self) -> Vec3 {
        self.up.cross(self.right()).normalize_or_zero()
    }

    pub fn target(&self) -> Vec3 { self.eye + self.forward() }

    /// Zero-sized viewports are ignored so the aspect never becomes NaN or infinite.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target(), self.up)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    pub fn set_look_at(&mut self, target: Vec3) {
        let dir = (target - self.eye).normalize();
        self.yaw = dir.z.atan2(dir.x);
        self.pitch = dir.y.asin().clamp(-1.4, 1.4);
    }

    /// Move parallel to the ground plane, positive is forward.
    pub fn move_forward(&mut self, distance: f32) {
        self.eye += self.ground_forward() * distance;
    }

    /// Strafe parallel to the ground plane, positive is right.
    pub fn move_right(&mut self, distance: f32) {
        self.eye += self.right() * distance;
    }

    /// World-space ray through a point in normalised device coordinates
    /// (`(0, 0)` is the screen centre, `(±1, ±1)` the corners).
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv_view_proj = self.view_proj().inverse();
        let through = inv_view_proj.project_point3(Vec3::new(ndc.x, ndc.y, 0.5));
        Ray::new(self.eye, through - self.eye)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(&SandboxConfig::default(), 800, 600)
    }

    #[test]
    fn test_starts_looking_down_negative_z() {
        let cam = camera();
        assert_eq!(cam.eye, Vec3::new(0.0, 5.0, 10.0));
        assert!(cam.forward().abs_diff_eq(Vec3::NEG_Z, 1e-5));
        assert!(cam.right().abs_diff_eq(Vec3::X, 1e-5));
        assert!((cam.aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_screen_centre_ray_is_forward() {
        let mut cam = camera();
        cam.yaw = 0.7;
        cam.pitch = -0.4;
        let ray = cam.ray_from_ndc(Vec2::ZERO);
        assert_eq!(ray.origin, cam.eye);
        assert!(ray.direction.abs_diff_eq(cam.forward(), 1e-4));
    }

    #[test]
    fn test_off_centre_ray_differs() {
        let cam = camera();
        let ray = cam.ray_from_ndc(Vec2::new(1.0, 0.0));
        assert!(ray.direction.x > 0.1, "right edge of the screen points right");
    }

    #[test]
    fn test_ground_movement_ignores_pitch() {
        let mut cam = camera();
        cam.pitch = -1.2;
        cam.move_forward(1.0);
        assert!(cam.eye.abs_diff_eq(Vec3::new(0.0, 5.0, 9.0), 1e-5));
        cam.move_right(-2.0);
        assert!(cam.eye.abs_diff_eq(Vec3::new(-2.0, 5.0, 9.0), 1e-5));
    }

    #[test]
    fn test_zero_height_resize_ignored() {
        let mut cam = camera();
        cam.set_aspect(1024, 0);
        assert!((cam.aspect - 800.0 / 600.0).abs() < 1e-6);
        cam.set_aspect(1920, 1080);
        assert!((cam.aspect - 1920.0 / 1080.0).abs() < 1e-6);
    }
}
