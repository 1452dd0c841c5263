use glam::Vec3;

/// Every tunable of the sandbox in one place.
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Columns span `-terrain_radius..=terrain_radius` on x and z.
    pub terrain_radius: i32,
    /// Column heights are drawn from `0..max_column_height`.
    pub max_column_height: u32,
    /// Fixed RNG seed; `None` seeds from the platform.
    pub seed: Option<u64>,

    /// Distance moved per frame per held key.
    pub move_step: f32,
    /// Radians of rotation per pixel of mouse movement.
    pub mouse_sensitivity: f32,

    pub camera_eye: Vec3,
    pub fov_y_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,

    pub sky_color: u32,
    pub ambient_intensity: f32,
    pub sun_intensity: f32,
    /// Directional light position; it shines towards the origin.
    pub sun_position: Vec3,

    pub bindings: KeyBindings,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            terrain_radius: 5,
            max_column_height: 3,
            seed: None,
            move_step: 0.1,
            mouse_sensitivity: 0.002,
            camera_eye: Vec3::new(0.0, 5.0, 10.0),
            fov_y_degrees: 75.0,
            z_near: 0.1,
            z_far: 1000.0,
            sky_color: 0x87ceeb,
            ambient_intensity: 0.6,
            sun_intensity: 0.6,
            sun_position: Vec3::new(10.0, 20.0, 10.0),
            bindings: KeyBindings::default(),
        }
    }
}

impl SandboxConfig {
    /// Defaults, with `BLOCKBOX_SEED` honoured when set to a valid `u64`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var("BLOCKBOX_SEED") {
            match raw.trim().parse::<u64>() {
                Ok(seed) => config.seed = Some(seed),
                Err(err) => tracing::warn!("ignoring BLOCKBOX_SEED={raw:?}: {err}"),
            }
        }
        config
    }
}

/// Key names are matched lowercased, as the browser reports them in `KeyboardEvent.key`.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
    pub release: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "w".to_string(),
            backward: "s".to_string(),
            left: "a".to_string(),
            right: "d".to_string(),
            release: "escape".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_demo_world() {
        let config = SandboxConfig::default();
        assert_eq!(config.terrain_radius, 5);
        assert_eq!(config.max_column_height, 3);
        assert_eq!(config.camera_eye, Vec3::new(0.0, 5.0, 10.0));
        assert_eq!(config.bindings.release, "escape");
    }
}
