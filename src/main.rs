use std::sync::Arc;

use anyhow::Context as _;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::Key,
    window::{CursorGrabMode, Window, WindowId},
};

// Import from the library crate
use blockbox::{
    config::SandboxConfig,
    controller::{EventResponse, InputEvent, MouseButton, Sandbox},
    logging, ui,
    view::{GpuContext, RenderState},
};

/// Everything that only exists once the window is up.
struct AppState {
    window: Arc<Window>,
    gpu: GpuContext,
    render_state: RenderState,
    sandbox: Sandbox,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
}

impl AppState {
    fn new(event_loop: &ActiveEventLoop, config: &SandboxConfig) -> anyhow::Result<Self> {
        let attributes = Window::default_attributes()
            .with_title("blockbox")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        let window = Arc::new(event_loop.create_window(attributes).context("creating window")?);
        let size = window.inner_size();

        let gpu = pollster::block_on(GpuContext::new(window.clone(), size.width, size.height))
            .context("initializing GPU")?;
        let render_state = RenderState::new(&gpu, config);
        let sandbox = Sandbox::new(config, size.width, size.height);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(egui_ctx.clone(), egui::ViewportId::ROOT, &window, None, None, None);

        Ok(Self { window, gpu, render_state, sandbox, egui_ctx, egui_state })
    }

    fn dispatch(&mut self, event: InputEvent) {
        match self.sandbox.handle_event(event) {
            EventResponse::EngageLookLock => {
                // the sandbox only locks once the grab actually took
                let locked = self.grab_cursor(true);
                self.sandbox.handle_event(InputEvent::PointerLockChanged { locked });
            }
            EventResponse::ReleaseLookLock => {
                self.grab_cursor(false);
            }
            EventResponse::Resized { width, height } => {
                self.gpu.resize(width, height);
                self.render_state.resize(self.gpu.device.as_ref(), width, height);
            }
            EventResponse::Edited(edit) => tracing::debug!("edit: {edit:?}"),
            EventResponse::SuppressDefault | EventResponse::None => {}
        }
    }

    /// Returns whether the cursor ended up grabbed.
    fn grab_cursor(&self, grab: bool) -> bool {
        if !grab {
            if let Err(e) = self.window.set_cursor_grab(CursorGrabMode::None) {
                tracing::warn!("cursor release failed: {e}");
            }
            self.window.set_cursor_visible(true);
            return false;
        }

        let grabbed = self
            .window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));
        match grabbed {
            Ok(()) => {
                self.window.set_cursor_visible(false);
                true
            }
            Err(e) => {
                tracing::warn!("cursor grab unavailable: {e}");
                false
            }
        }
    }

    fn redraw(&mut self) {
        self.sandbox.update_frame();
        self.render_state.sync(self.gpu.device.as_ref(), self.gpu.queue.as_ref(), &self.sandbox);

        let raw_input = self.egui_state.take_egui_input(&self.window);
        let (ui_frame, platform_output) = ui::build_ui(&self.egui_ctx, raw_input, &self.sandbox);
        self.egui_state.handle_platform_output(&self.window, platform_output);

        if let Err(e) = self.render_state.draw_frame(&self.gpu, Some(ui_frame)) {
            tracing::warn!("skipping frame: {e}");
        }
    }
}

fn key_name(key: &Key) -> Option<String> {
    match key {
        Key::Character(c) => Some(c.to_string()),
        Key::Named(named) => Some(format!("{named:?}")),
        _ => None,
    }
}

fn mouse_button(button: winit::event::MouseButton) -> MouseButton {
    match button {
        winit::event::MouseButton::Left => MouseButton::Left,
        winit::event::MouseButton::Right => MouseButton::Right,
        winit::event::MouseButton::Middle => MouseButton::Middle,
        _ => MouseButton::Other,
    }
}

struct App {
    config: SandboxConfig,
    state: Option<AppState>,
    error: Option<anyhow::Error>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match AppState::new(event_loop, &self.config) {
            Ok(state) => {
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(e) => {
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(state) = self.state.as_mut() else { return };

        // egui sees everything; the sandbox ignores what egui consumed except redraws
        let consumed = state.egui_state.on_window_event(&state.window, &event).consumed;

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                state.dispatch(InputEvent::Resize { width: size.width, height: size.height });
            }
            WindowEvent::Focused(false) => state.dispatch(InputEvent::FocusLost),
            WindowEvent::KeyboardInput { event: KeyEvent { logical_key, state: key_state, .. }, .. } => {
                if let Some(name) = key_name(&logical_key) {
                    let event = match key_state {
                        ElementState::Pressed => InputEvent::KeyDown(name),
                        ElementState::Released => InputEvent::KeyUp(name),
                    };
                    state.dispatch(event);
                }
            }
            WindowEvent::MouseInput { state: button_state, button, .. } if !consumed => {
                let button = mouse_button(button);
                match button_state {
                    ElementState::Pressed => state.dispatch(InputEvent::MouseDown(button)),
                    // a completed left click is what asks for the look lock
                    ElementState::Released if button == MouseButton::Left => state.dispatch(InputEvent::Click),
                    ElementState::Released => {}
                }
            }
            WindowEvent::RedrawRequested => {
                state.redraw();
                state.window.request_redraw();
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let (Some(state), DeviceEvent::MouseMotion { delta }) = (self.state.as_mut(), event) {
            state.dispatch(InputEvent::MouseMove { dx: delta.0 as f32, dy: delta.1 as f32 });
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }
}

fn main() -> anyhow::Result<()> {
    logging::init();

    let mut app = App { config: SandboxConfig::from_env(), state: None, error: None };
    EventLoop::new()?.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
