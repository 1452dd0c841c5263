use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Window;

use crate::controller::Sandbox;
use crate::ui;
use crate::view::{GpuContext, RenderState};

/// Per-frame work for the browser build: update, sync, draw.
pub struct FrameLoopContext {
    pub sandbox: Rc<RefCell<Sandbox>>,
    pub gpu: GpuContext,
    pub render_state: RenderState,
    pub egui_ctx: egui::Context,
    pub window: Window,
}

impl FrameLoopContext {
    pub fn frame(&mut self) {
        let mut sandbox = self.sandbox.borrow_mut();
        sandbox.update_frame();

        // resize listener only records the new viewport; apply it to the GPU side here
        let (width, height) = sandbox.viewport();
        if (width, height) != (self.gpu.config.width, self.gpu.config.height) {
            self.gpu.resize(width, height);
            self.render_state.resize(self.gpu.device.as_ref(), width, height);
        }

        self.render_state.sync(self.gpu.device.as_ref(), self.gpu.queue.as_ref(), &sandbox);

        let mut raw_input = egui::RawInput::default();
        raw_input.time = self.window.performance().map(|p| p.now() / 1000.0);
        raw_input.screen_rect = Some(egui::Rect::from_min_size(
            egui::Pos2::ZERO,
            egui::vec2(self.render_state.width as f32, self.render_state.height as f32),
        ));
        let (ui_frame, _) = ui::build_ui(&self.egui_ctx, raw_input, &sandbox);
        drop(sandbox);

        if let Err(e) = self.render_state.draw_frame(&self.gpu, Some(ui_frame)) {
            tracing::warn!("skipping frame: {e}");
        }
    }
}

/// Drives a closure from `requestAnimationFrame` until the page unloads.
pub struct RcCellCallback {
    inner: Rc<RefCell<Box<dyn FnMut()>>>,
    window: Window,
}

impl RcCellCallback {
    pub fn new(window: Window, f: impl FnMut() + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Box::new(f))),
            window,
        }
    }

    pub fn start(self) {
        let inner = self.inner.clone();
        let window = self.window.clone();

        let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
        let callback_clone = callback.clone();

        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            inner.borrow_mut().as_mut()();

            // Recursively schedule next frame
            if let Some(cb) = callback_clone.borrow().as_ref() {
                if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    tracing::error!("requestAnimationFrame failed: {e:?}");
                }
            }
        }) as Box<dyn FnMut()>));

        if let Some(cb) = callback.borrow().as_ref() {
            if let Err(e) = self.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                tracing::error!("requestAnimationFrame failed: {e:?}");
            }
        }

        // Leak the closure to keep it alive
        std::mem::forget(callback);
    }
}
