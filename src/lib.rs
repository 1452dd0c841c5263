// Re-export all public modules so they can be used from main.rs
pub mod config;
pub mod error;
pub mod logging;
pub mod ui;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

#[cfg(target_arch = "wasm32")]
pub mod frame_loop;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{JsCast, JsValue, prelude::wasm_bindgen};
    use web_sys::{Document, Event, HtmlCanvasElement, KeyboardEvent, MouseEvent, Window};

    use crate::config::SandboxConfig;
    use crate::controller::input::wasm as web_input;
    use crate::controller::{EventResponse, InputEvent, Sandbox};
    use crate::error::SandboxError;
    use crate::frame_loop::{FrameLoopContext, RcCellCallback};
    use crate::logging;
    use crate::view::{GpuContext, RenderState};

    #[wasm_bindgen(start)]
    pub async fn start() -> Result<(), JsValue> {
        logging::init();
        let (window, document, canvas) = init_canvas()?;
        setup_app(window, document, canvas).await
    }

    /// Main application setup for WASM
    async fn setup_app(window: Window, document: Document, canvas: HtmlCanvasElement) -> Result<(), JsValue> {
        let config = SandboxConfig::default();
        let (width, height) = (canvas.width(), canvas.height());

        let gpu = GpuContext::new(wgpu::SurfaceTarget::Canvas(canvas.clone()), width, height).await?;
        let render_state = RenderState::new(&gpu, &config);
        let sandbox = Rc::new(RefCell::new(Sandbox::new(&config, width, height)));

        setup_input_listeners(&window, &document, &canvas, sandbox.clone())?;

        let mut frame_ctx = FrameLoopContext {
            sandbox,
            gpu,
            render_state,
            egui_ctx: egui::Context::default(),
            window: window.clone(),
        };

        RcCellCallback::new(window, move || frame_ctx.frame()).start();
        tracing::info!("sandbox running at {width}x{height}");
        Ok(())
    }

    /// Feed an event to the sandbox and carry out whatever it asks of the page.
    fn dispatch(
        sandbox: &Rc<RefCell<Sandbox>>,
        document: &Document,
        canvas: &HtmlCanvasElement,
        event: InputEvent,
        raw: &Event,
    ) {
        // borrow ends before touching the DOM
        let response = sandbox.borrow_mut().handle_event(event);
        match response {
            EventResponse::EngageLookLock => canvas.request_pointer_lock(),
            EventResponse::ReleaseLookLock => document.exit_pointer_lock(),
            EventResponse::SuppressDefault => raw.prevent_default(),
            EventResponse::Edited(edit) => tracing::debug!("edit: {edit:?}"),
            EventResponse::Resized { width, height } => {
                canvas.set_width(width);
                canvas.set_height(height);
            }
            EventResponse::None => {}
        }
    }

    fn setup_input_listeners(
        window: &Window,
        document: &Document,
        canvas: &HtmlCanvasElement,
        sandbox: Rc<RefCell<Sandbox>>,
    ) -> Result<(), JsValue> {
        // Keyboard down
        {
            let (sandbox, doc, cv) = (sandbox.clone(), document.clone(), canvas.clone());
            let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                let event = web_input::keyboard_event_to_input(&e, true);
                dispatch(&sandbox, &doc, &cv, event, &e);
            }) as Box<dyn FnMut(KeyboardEvent)>);
            document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
            keydown.forget();
        }

        // Keyboard up
        {
            let (sandbox, doc, cv) = (sandbox.clone(), document.clone(), canvas.clone());
            let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                let event = web_input::keyboard_event_to_input(&e, false);
                dispatch(&sandbox, &doc, &cv, event, &e);
            }) as Box<dyn FnMut(KeyboardEvent)>);
            document.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
            keyup.forget();
        }

        // Focus loss - clear all keys
        {
            let (sandbox, doc, cv) = (sandbox.clone(), document.clone(), canvas.clone());
            let blur = Closure::wrap(Box::new(move |e: Event| {
                dispatch(&sandbox, &doc, &cv, InputEvent::FocusLost, &e);
            }) as Box<dyn FnMut(Event)>);
            window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
            blur.forget();
        }

        // Pointer lock change (covers the browser's own Esc handling)
        {
            let (sandbox, doc, cv) = (sandbox.clone(), document.clone(), canvas.clone());
            let plc = Closure::wrap(Box::new(move |e: Event| {
                let locked = doc.pointer_lock_element().is_some();
                dispatch(&sandbox, &doc, &cv, InputEvent::PointerLockChanged { locked }, &e);
            }) as Box<dyn FnMut(Event)>);
            document.add_event_listener_with_callback("pointerlockchange", plc.as_ref().unchecked_ref())?;
            plc.forget();
        }

        // Refused lock request (e.g. re-click right after Esc)
        {
            let (sandbox, doc, cv) = (sandbox.clone(), document.clone(), canvas.clone());
            let ple = Closure::wrap(Box::new(move |e: Event| {
                tracing::warn!("pointer lock request refused");
                dispatch(&sandbox, &doc, &cv, InputEvent::PointerLockChanged { locked: false }, &e);
            }) as Box<dyn FnMut(Event)>);
            document.add_event_listener_with_callback("pointerlockerror", ple.as_ref().unchecked_ref())?;
            ple.forget();
        }

        // Click anywhere on the page to request pointer lock
        {
            let (sandbox, doc, cv) = (sandbox.clone(), document.clone(), canvas.clone());
            let click = Closure::wrap(Box::new(move |e: MouseEvent| {
                dispatch(&sandbox, &doc, &cv, InputEvent::Click, &e);
            }) as Box<dyn FnMut(MouseEvent)>);
            let body = document.body().ok_or(SandboxError::Dom("body"))?;
            body.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;
            click.forget();
        }

        // Mouse move
        {
            let (sandbox, doc, cv) = (sandbox.clone(), document.clone(), canvas.clone());
            let mm = Closure::wrap(Box::new(move |e: MouseEvent| {
                dispatch(&sandbox, &doc, &cv, web_input::mouse_move_to_input(&e), &e);
            }) as Box<dyn FnMut(MouseEvent)>);
            document.add_event_listener_with_callback("mousemove", mm.as_ref().unchecked_ref())?;
            mm.forget();
        }

        // Mouse down - block removal/placement
        {
            let (sandbox, doc, cv) = (sandbox.clone(), document.clone(), canvas.clone());
            let mousedown = Closure::wrap(Box::new(move |e: MouseEvent| {
                e.prevent_default();
                dispatch(&sandbox, &doc, &cv, web_input::mouse_down_to_input(&e), &e);
            }) as Box<dyn FnMut(MouseEvent)>);
            window.add_event_listener_with_callback("mousedown", mousedown.as_ref().unchecked_ref())?;
            mousedown.forget();
        }

        // Context menu prevention
        {
            let (sandbox, doc, cv) = (sandbox.clone(), document.clone(), canvas.clone());
            let contextmenu = Closure::wrap(Box::new(move |e: MouseEvent| {
                dispatch(&sandbox, &doc, &cv, InputEvent::ContextMenu, &e);
            }) as Box<dyn FnMut(MouseEvent)>);
            window.add_event_listener_with_callback("contextmenu", contextmenu.as_ref().unchecked_ref())?;
            contextmenu.forget();
        }

        // Window resize
        {
            let (sandbox, doc, cv) = (sandbox.clone(), document.clone(), canvas.clone());
            let win = window.clone();
            let resize = Closure::wrap(Box::new(move |e: Event| {
                let (width, height) = viewport_size(&win);
                dispatch(&sandbox, &doc, &cv, InputEvent::Resize { width, height }, &e);
            }) as Box<dyn FnMut(Event)>);
            window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;
            resize.forget();
        }

        Ok(())
    }

    fn viewport_size(window: &Window) -> (u32, u32) {
        let dim = |v: Result<JsValue, JsValue>, fallback: f64| {
            v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback).max(1.0) as u32
        };
        (dim(window.inner_width(), 800.0), dim(window.inner_height(), 600.0))
    }

    /// Full-viewport canvas appended to `<body>`.
    fn init_canvas() -> Result<(Window, Document, HtmlCanvasElement), SandboxError> {
        let window = web_sys::window().ok_or(SandboxError::Dom("window"))?;
        let document = window.document().ok_or(SandboxError::Dom("document"))?;
        let body = document.body().ok_or(SandboxError::Dom("body"))?;
        let canvas = document
            .create_element("canvas")
            .ok()
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
            .ok_or(SandboxError::Dom("canvas"))?;

        let (width, height) = viewport_size(&window);
        canvas.set_width(width);
        canvas.set_height(height);
        let _ = body.set_attribute("style", "margin: 0; overflow: hidden;");
        let _ = canvas.set_attribute("style", "display: block;");
        body.append_child(&canvas).map_err(|_| SandboxError::Dom("body.appendChild"))?;
        Ok((window, document, canvas))
    }
}
