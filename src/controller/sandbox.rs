use crate::config::SandboxConfig;
use crate::controller::block_editor::{BlockEdit, BlockEditor};
use crate::controller::camera_controller::CameraController;
use crate::controller::input::{InputEvent, InputProcessor, InputState};
use crate::model::{Camera, TerrainGenerator, World};

/// Whether mouse movement steers the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookLock {
    Unlocked,
    Locked,
}

/// What the host shell has to do after an event was handled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventResponse {
    None,
    /// Grab the pointer (browser pointer lock / native cursor grab).
    EngageLookLock,
    /// Give the pointer back.
    ReleaseLookLock,
    /// Swallow the platform default (context menu).
    SuppressDefault,
    Edited(BlockEdit),
    /// Surface and depth buffer need reconfiguring to the new viewport.
    Resized { width: u32, height: u32 },
}

/// All sandbox state, owned in one place and driven by typed events plus a
/// once-per-frame update.
pub struct Sandbox {
    pub world: World,
    pub camera: Camera,
    pub input: InputState,
    look_lock: LookLock,
    viewport: (u32, u32),
    camera_controller: CameraController,
    block_editor: BlockEditor,
    processor: InputProcessor,
}

impl Sandbox {
    /// Build the sandbox and generate the terrain once.
    pub fn new(config: &SandboxConfig, width: u32, height: u32) -> Self {
        let mut world = World::new();
        TerrainGenerator::from_config(config).generate(&mut world);
        Self::with_world(config, world, width, height)
    }

    pub fn with_world(config: &SandboxConfig, world: World, width: u32, height: u32) -> Self {
        Self {
            world,
            camera: Camera::new(config, width, height),
            input: InputState::new(),
            look_lock: LookLock::Unlocked,
            viewport: (width, height),
            camera_controller: CameraController::new(config),
            block_editor: BlockEditor::default(),
            processor: InputProcessor::new(config.bindings.clone()),
        }
    }

    pub fn look_lock(&self) -> LookLock {
        self.look_lock
    }

    pub fn is_locked(&self) -> bool {
        self.look_lock == LookLock::Locked
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn handle_event(&mut self, event: InputEvent) -> EventResponse {
        match event {
            InputEvent::KeyDown(key) => {
                if self.processor.is_release(&key) && self.is_locked() {
                    self.set_lock(LookLock::Unlocked);
                    return EventResponse::ReleaseLookLock;
                }
                self.input.key_down(&key);
                EventResponse::None
            }
            InputEvent::KeyUp(key) => {
                self.input.key_up(&key);
                EventResponse::None
            }
            InputEvent::MouseMove { dx, dy } => {
                if self.is_locked() {
                    self.input.add_look(dx, dy);
                }
                EventResponse::None
            }
            InputEvent::MouseDown(button) => {
                let edit = self.block_editor.apply(&mut self.world, &self.camera, button);
                EventResponse::Edited(edit)
            }
            // Only a request: the lock is taken once the host reports it.
            InputEvent::Click => {
                if self.is_locked() {
                    return EventResponse::None;
                }
                EventResponse::EngageLookLock
            }
            InputEvent::ContextMenu => EventResponse::SuppressDefault,
            InputEvent::Resize { width, height } => {
                self.resize(width, height);
                EventResponse::Resized { width, height }
            }
            InputEvent::FocusLost => {
                self.input.clear_keys();
                EventResponse::None
            }
            InputEvent::PointerLockChanged { locked } => {
                self.set_lock(if locked { LookLock::Locked } else { LookLock::Unlocked });
                EventResponse::None
            }
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        tracing::debug!("viewport resized to {width}x{height}");
        self.viewport = (width, height);
        self.camera.set_aspect(width, height);
    }

    /// Per-frame update: mouse look and held-key movement, both only while locked.
    pub fn update_frame(&mut self) {
        let (dx, dy) = self.input.consume_look();
        if !self.is_locked() {
            return;
        }
        self.camera_controller.apply_look(&mut self.camera, dx, dy);
        self.camera_controller.update_movement(&mut self.camera, &self.input);
    }

    fn set_lock(&mut self, lock: LookLock) {
        if self.look_lock != lock {
            tracing::info!("look lock: {:?} -> {:?}", self.look_lock, lock);
            self.look_lock = lock;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::input::MouseButton;
    use crate::model::{Block, Material};
    use glam::{IVec3, Vec3};

    fn seeded_config() -> SandboxConfig {
        SandboxConfig { seed: Some(1234), ..SandboxConfig::default() }
    }

    /// Sandbox over a flat 3x3 stone floor with the camera looking straight down at it.
    fn floor_sandbox() -> Sandbox {
        let config = seeded_config();
        let mut world = World::new();
        for x in -1..=1 {
            for z in -1..=1 {
                world.add(Block::new(IVec3::new(x, 0, z), Material::Stone));
            }
        }
        let mut sandbox = Sandbox::with_world(&config, world, 800, 600);
        sandbox.camera.eye = Vec3::new(0.0, 4.0, 0.0);
        sandbox.camera.pitch = -std::f32::consts::FRAC_PI_2;
        sandbox
    }

    /// Click, then the host confirms the pointer is captured.
    fn engage_lock(sandbox: &mut Sandbox) {
        assert_eq!(sandbox.handle_event(InputEvent::Click), EventResponse::EngageLookLock);
        sandbox.handle_event(InputEvent::PointerLockChanged { locked: true });
    }

    #[test]
    fn test_click_engages_lock_once() {
        let mut sandbox = floor_sandbox();
        assert_eq!(sandbox.look_lock(), LookLock::Unlocked);
        assert_eq!(sandbox.handle_event(InputEvent::Click), EventResponse::EngageLookLock);
        assert_eq!(sandbox.look_lock(), LookLock::Unlocked);

        sandbox.handle_event(InputEvent::PointerLockChanged { locked: true });
        assert_eq!(sandbox.look_lock(), LookLock::Locked);
        assert_eq!(sandbox.handle_event(InputEvent::Click), EventResponse::None);
    }

    #[test]
    fn test_refused_lock_request_is_retried() {
        let mut sandbox = floor_sandbox();
        sandbox.camera.pitch = 0.0;
        let start = sandbox.camera.eye;
        let yaw = sandbox.camera.yaw;

        assert_eq!(sandbox.handle_event(InputEvent::Click), EventResponse::EngageLookLock);
        sandbox.handle_event(InputEvent::PointerLockChanged { locked: false });
        assert_eq!(sandbox.look_lock(), LookLock::Unlocked);

        // still unlocked: no steering, and the next click asks again
        sandbox.handle_event(InputEvent::KeyDown("w".to_string()));
        sandbox.handle_event(InputEvent::MouseMove { dx: 40.0, dy: 0.0 });
        sandbox.update_frame();
        assert_eq!(sandbox.camera.eye, start);
        assert_eq!(sandbox.camera.yaw, yaw);
        assert_eq!(sandbox.handle_event(InputEvent::Click), EventResponse::EngageLookLock);
    }

    #[test]
    fn test_unanswered_lock_request_is_retried() {
        let mut sandbox = floor_sandbox();
        assert_eq!(sandbox.handle_event(InputEvent::Click), EventResponse::EngageLookLock);
        assert_eq!(sandbox.handle_event(InputEvent::Click), EventResponse::EngageLookLock);
        assert_eq!(sandbox.look_lock(), LookLock::Unlocked);
    }

    #[test]
    fn test_escape_releases_lock() {
        let mut sandbox = floor_sandbox();
        engage_lock(&mut sandbox);
        let response = sandbox.handle_event(InputEvent::KeyDown("Escape".to_string()));
        assert_eq!(response, EventResponse::ReleaseLookLock);
        assert_eq!(sandbox.look_lock(), LookLock::Unlocked);

        sandbox.handle_event(InputEvent::Click);
        sandbox.handle_event(InputEvent::PointerLockChanged { locked: false });
        assert_eq!(sandbox.look_lock(), LookLock::Unlocked);
    }

    #[test]
    fn test_movement_only_while_locked() {
        let mut sandbox = floor_sandbox();
        sandbox.camera.pitch = 0.0;
        let start = sandbox.camera.eye;

        sandbox.handle_event(InputEvent::KeyDown("W".to_string()));
        sandbox.update_frame();
        assert_eq!(sandbox.camera.eye, start);

        engage_lock(&mut sandbox);
        sandbox.update_frame();
        sandbox.update_frame();
        assert!((sandbox.camera.eye - start).length() > 0.19);

        sandbox.handle_event(InputEvent::KeyUp("w".to_string()));
        let stopped = sandbox.camera.eye;
        sandbox.update_frame();
        assert_eq!(sandbox.camera.eye, stopped);
    }

    #[test]
    fn test_mouse_look_ignored_when_unlocked() {
        let mut sandbox = floor_sandbox();
        let yaw = sandbox.camera.yaw;
        sandbox.handle_event(InputEvent::MouseMove { dx: 50.0, dy: 0.0 });
        sandbox.update_frame();
        assert_eq!(sandbox.camera.yaw, yaw);

        engage_lock(&mut sandbox);
        sandbox.handle_event(InputEvent::MouseMove { dx: 50.0, dy: 0.0 });
        sandbox.update_frame();
        assert!((sandbox.camera.yaw - (yaw + 0.1)).abs() < 1e-5);
    }

    #[test]
    fn test_left_click_removes_one() {
        let mut sandbox = floor_sandbox();
        let response = sandbox.handle_event(InputEvent::MouseDown(MouseButton::Left));
        assert_eq!(
            response,
            EventResponse::Edited(BlockEdit::Removed(Block::new(IVec3::ZERO, Material::Stone)))
        );
        assert_eq!(sandbox.world.len(), 8);
    }

    #[test]
    fn test_right_click_adds_one() {
        let mut sandbox = floor_sandbox();
        let response = sandbox.handle_event(InputEvent::MouseDown(MouseButton::Right));
        assert_eq!(
            response,
            EventResponse::Edited(BlockEdit::Placed(Block::new(IVec3::new(0, 2, 0), Material::Grass)))
        );
        assert_eq!(sandbox.world.len(), 10);
    }

    #[test]
    fn test_click_into_sky_changes_nothing() {
        let mut sandbox = floor_sandbox();
        sandbox.camera.pitch = 0.5;
        for button in [MouseButton::Left, MouseButton::Right] {
            let response = sandbox.handle_event(InputEvent::MouseDown(button));
            assert_eq!(response, EventResponse::Edited(BlockEdit::Missed));
        }
        assert_eq!(sandbox.world.len(), 9);
    }

    #[test]
    fn test_context_menu_suppressed() {
        let mut sandbox = floor_sandbox();
        assert_eq!(sandbox.handle_event(InputEvent::ContextMenu), EventResponse::SuppressDefault);
    }

    #[test]
    fn test_resize_updates_aspect_not_world() {
        let mut sandbox = floor_sandbox();
        let before: Vec<Block> = sandbox.world.blocks().to_vec();

        let response = sandbox.handle_event(InputEvent::Resize { width: 1600, height: 400 });
        assert_eq!(response, EventResponse::Resized { width: 1600, height: 400 });
        assert_eq!(sandbox.viewport(), (1600, 400));
        assert!((sandbox.camera.aspect - 4.0).abs() < 1e-6);
        assert_eq!(sandbox.world.blocks(), before.as_slice());
    }

    #[test]
    fn test_focus_lost_releases_keys() {
        let mut sandbox = floor_sandbox();
        sandbox.handle_event(InputEvent::KeyDown("d".to_string()));
        sandbox.handle_event(InputEvent::FocusLost);
        assert!(!sandbox.input.is_key_pressed("d"));
    }

    #[test]
    fn test_new_generates_terrain() {
        let config = seeded_config();
        let sandbox = Sandbox::new(&config, 640, 480);
        assert!(sandbox.world.len() <= 121 * 2);
        assert!(sandbox.world.blocks().iter().all(|b| {
            (-5..=5).contains(&b.position.x) && (-5..=5).contains(&b.position.z) && (0..2).contains(&b.position.y)
        }));
    }
}
