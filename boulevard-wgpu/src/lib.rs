//! wgpu deferred renderer: G-buffer geometry pass, shadow maps, SSAO and
//! bloom, Blinn-Phong composition with day/night profiles, tone mapping and
//! overlays. [`renderer::Renderer`] drives everything from a validated
//! per-frame pass plan.

pub mod context;
pub mod error;
pub mod frame_graph;
pub mod passes;
pub mod pipeline;
pub mod render_targets;
pub mod renderer;
pub mod scene;

pub use context::GpuContext;
pub use error::RenderError;
pub use renderer::{FrameParams, Renderer, RendererConfig};
