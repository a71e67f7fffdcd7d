//! Shared GPU data for the boulevard deferred renderer.
//! Uniform layouts, embedded WGSL sources, the day/night light model and the
//! SSAO sample generator live here so that backends and tools agree on them.

pub mod light_space;
pub mod lighting;
pub mod lights;
pub mod shaders;
pub mod ssao;
pub mod uniforms;

/// Number of point lights the composition shader iterates over.
pub const NUM_POINT_LIGHTS: usize = 4;
/// Number of spot lights the composition shader iterates over.
pub const NUM_SPOT_LIGHTS: usize = 4;
/// Number of spot shadow-map array slices. Spot lights beyond this count
/// still light the scene but cast no shadow.
pub const MAX_SHADOW_CASTERS: usize = 4;
/// Hemisphere kernel size for SSAO.
pub const SSAO_KERNEL_SIZE: usize = 32;
/// Side length of the tileable SSAO rotation-noise texture.
pub const SSAO_NOISE_DIM: usize = 4;
