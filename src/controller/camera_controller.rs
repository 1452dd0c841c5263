use glam::Vec3;

use crate::config::SandboxConfig;
use crate::controller::input::{InputProcessor, InputState};
use crate::model::Camera;

/// Handles camera movement and orientation
pub struct CameraController {
    /// Distance per frame per held key; not scaled by frame time.
    pub move_step: f32,
    pub mouse_sensitivity: f32,
    processor: InputProcessor,
}

impl CameraController {
    pub fn new(config: &SandboxConfig) -> Self {
        Self {
            move_step: config.move_step,
            mouse_sensitivity: config.mouse_sensitivity,
            processor: InputProcessor::new(config.bindings.clone()),
        }
    }

    /// Apply mouse look delta to camera
    pub fn apply_look(&self, camera: &mut Camera, dx: f32, dy: f32) {
        camera.yaw += dx * self.mouse_sensitivity;
        let pi_half = std::f32::consts::FRAC_PI_2;
        camera.pitch = (camera.pitch - dy * self.mouse_sensitivity).clamp(-pi_half, pi_half);
    }

    /// Camera-space direction for this frame: -z forward, +x right.
    pub fn movement_direction(&self, input: &InputState) -> Vec3 {
        let mut direction = Vec3::ZERO;
        if self.processor.is_moving_forward(input) {
            direction.z -= self.move_step;
        }
        if self.processor.is_moving_backward(input) {
            direction.z += self.move_step;
        }
        if self.processor.is_moving_left(input) {
            direction.x -= self.move_step;
        }
        if self.processor.is_moving_right(input) {
            direction.x += self.move_step;
        }
        direction
    }

    /// Translate the camera by the held movement keys. No collision.
    pub fn update_movement(&self, camera: &mut Camera, input: &InputState) {
        let direction = self.movement_direction(input);
        camera.move_right(direction.x);
        camera.move_forward(-direction.z);
    }
}
