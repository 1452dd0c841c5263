/// Platform-agnostic input handling
use std::collections::HashSet;

use crate::config::KeyBindings;

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    // Keyboard events
    KeyDown(String),
    KeyUp(String),

    // Mouse events
    MouseMove { dx: f32, dy: f32 },
    MouseDown(MouseButton),
    /// Click on the display surface; asks the host for look-lock.
    Click,
    ContextMenu,

    // Window events
    Resize { width: u32, height: u32 },
    FocusLost,
    PointerLockChanged { locked: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other,
}

impl MouseButton {
    pub fn from_web_button(button: i16) -> Self {
        match button {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            _ => MouseButton::Other,
        }
    }
}

/// Held keys and look movement accumulated between frames.
#[derive(Debug, Default)]
pub struct InputState {
    pressed_keys: HashSet<String>,
    look_delta: (f32, f32),
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: &str) {
        self.pressed_keys.insert(key.to_lowercase());
    }

    pub fn key_up(&mut self, key: &str) {
        self.pressed_keys.remove(&key.to_lowercase());
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    pub fn clear_keys(&mut self) {
        self.pressed_keys.clear();
    }

    pub fn add_look(&mut self, dx: f32, dy: f32) {
        self.look_delta.0 += dx;
        self.look_delta.1 += dy;
    }

    pub fn consume_look(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.look_delta)
    }
}

/// Maps raw key state onto sandbox actions.
#[derive(Clone)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    pub fn is_moving_forward(&self, input: &InputState) -> bool {
        input.is_key_pressed(&self.bindings.forward)
    }

    pub fn is_moving_backward(&self, input: &InputState) -> bool {
        input.is_key_pressed(&self.bindings.backward)
    }

    pub fn is_moving_left(&self, input: &InputState) -> bool {
        input.is_key_pressed(&self.bindings.left)
    }

    pub fn is_moving_right(&self, input: &InputState) -> bool {
        input.is_key_pressed(&self.bindings.right)
    }

    pub fn is_release(&self, key: &str) -> bool {
        key.eq_ignore_ascii_case(&self.bindings.release)
    }
}

impl Default for InputProcessor {
    fn default() -> Self {
        Self::new(KeyBindings::default())
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use web_sys::{KeyboardEvent, MouseEvent};

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let key = e.key();
        if is_down {
            InputEvent::KeyDown(key)
        } else {
            InputEvent::KeyUp(key)
        }
    }

    pub fn mouse_move_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::MouseMove {
            dx: e.movement_x() as f32,
            dy: e.movement_y() as f32,
        }
    }

    pub fn mouse_down_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::MouseDown(MouseButton::from_web_button(e.button()))
    }
}
