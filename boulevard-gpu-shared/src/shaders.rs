//! Embedded WGSL sources. Kept in one table so the backend never touches the
//! filesystem for shaders.

/// Fullscreen-triangle vertex stage shared by every screen-space pass.
pub const FULLSCREEN_VERT: &str = include_str!("../shaders/fullscreen.wgsl");
/// G-buffer surface shader (vertex + fragment, 3 MRTs).
pub const SURFACE_SHADER: &str = include_str!("../shaders/surface_gbuffer.wgsl");
/// Shadow depth shader, used by both the directional and spot phases.
pub const SHADOW_DEPTH_SHADER: &str = include_str!("../shaders/shadow_depth.wgsl");
/// SSAO occlusion estimation.
pub const SSAO_FRAG: &str = include_str!("../shaders/ssao.wgsl");
/// 4x4 box blur, scalar and color entry points.
pub const BLUR_FRAG: &str = include_str!("../shaders/blur.wgsl");
/// Bloom brightness extraction.
pub const BLOOM_EXTRACT_FRAG: &str = include_str!("../shaders/bloom_extract.wgsl");
/// Deferred lighting composition.
pub const COMPOSE_FRAG: &str = include_str!("../shaders/compose.wgsl");
/// Bloom add + exposure/gamma tone map.
pub const FINAL_FRAG: &str = include_str!("../shaders/final_composite.wgsl");
/// Quadrant-tiled G-buffer debug view.
pub const DEBUG_VIEW_FRAG: &str = include_str!("../shaders/debug_view.wgsl");
/// Single-texture blit, color and grayscale entry points.
pub const BLIT_FRAG: &str = include_str!("../shaders/blit.wgsl");
/// Light-marker line shader.
pub const MARKER_SHADER: &str = include_str!("../shaders/marker.wgsl");
/// Rain streak overlay.
pub const RAIN_FRAG: &str = include_str!("../shaders/rain.wgsl");
