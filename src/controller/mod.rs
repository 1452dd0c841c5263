// CONTROLLER: Input, sandbox logic, and per-frame update
pub mod input;
pub mod camera_controller;
pub mod block_editor;
pub mod sandbox;

pub use input::{InputEvent, InputProcessor, InputState, MouseButton};
pub use camera_controller::CameraController;
pub use block_editor::{BlockEdit, BlockEditor};
pub use sandbox::{EventResponse, LookLock, Sandbox};
