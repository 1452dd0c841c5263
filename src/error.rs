use thiserror::Error;

/// Failures while bringing up the display surface and GPU.
///
/// Nothing after startup is fallible: a raycast that hits nothing is a
/// regular `BlockEdit::Missed`, not an error.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,

    #[error("missing DOM element: {0}")]
    Dom(&'static str),
}

#[cfg(target_arch = "wasm32")]
impl From<SandboxError> for wasm_bindgen::JsValue {
    fn from(err: SandboxError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}
