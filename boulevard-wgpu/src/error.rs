use thiserror::Error;

/// Failures surfaced by the rendering backend. Missing meshes or materials
/// are not errors; those renderables are skipped silently.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no compatible GPU adapter found")]
    NoAdapter,

    #[error("failed to acquire GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("frame plan: pass `{pass}` reads `{resource}` before any pass produced it")]
    GraphViolation {
        pass: &'static str,
        resource: &'static str,
    },

    #[error("output is {actual_w}x{actual_h} but the renderer is sized for {expected_w}x{expected_h}")]
    OutputSizeMismatch {
        expected_w: u32,
        expected_h: u32,
        actual_w: u32,
        actual_h: u32,
    },
}
