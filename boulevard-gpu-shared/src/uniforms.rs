//! `#[repr(C)]` uniform blocks shared between the CPU and the WGSL shaders.
//!
//! Layout rules: every field is padded to 16 bytes so the structs match WGSL
//! uniform address-space layout exactly. `mat3x3<f32>` has 16-byte column
//! stride in WGSL, hence the `[[f32; 4]; 3]` normal matrix.

use bytemuck::{Pod, Zeroable};

use crate::{MAX_SHADOW_CASTERS, NUM_POINT_LIGHTS, NUM_SPOT_LIGHTS, SSAO_KERNEL_SIZE};

/// Camera state bound once per frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct PerFrameUniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    /// Camera world position, w unused.
    pub view_pos: [f32; 4],
}

/// Per-renderable transform data for the geometry and shadow passes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct PerObjectUniforms {
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of the model's upper 3x3, stored as three
    /// vec4-padded columns.
    pub normal_mat: [[f32; 4]; 3],
}

impl PerObjectUniforms {
    pub fn new(model: glam::Mat4) -> Self {
        let normal = glam::Mat3::from_mat4(model).inverse().transpose();
        Self {
            model: model.to_cols_array_2d(),
            normal_mat: [
                normal.x_axis.extend(0.0).to_array(),
                normal.y_axis.extend(0.0).to_array(),
                normal.z_axis.extend(0.0).to_array(),
            ],
        }
    }
}

/// Material constants for one submesh draw.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MaterialUniforms {
    pub base_color: [f32; 4],
    /// x: shininess exponent, y: emissive flag (0 or 1),
    /// z: 1 when a color map is bound, w unused.
    pub params: [f32; 4],
}

/// Light-space matrix bound for one shadow rendering pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ShadowViewUniforms {
    pub light_matrix: [[f32; 4]; 4],
}

/// Directional light as the composition shader sees it.
/// `coeffs` packs (ambient, diffuse, specular, enabled).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GpuDirLight {
    pub direction: [f32; 4],
    pub color: [f32; 4],
    pub coeffs: [f32; 4],
}

/// Point light slot. `attenuation` packs (linear, quadratic, enabled, unused).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GpuPointLight {
    pub position: [f32; 4],
    pub color: [f32; 4],
    /// (ambient, diffuse, specular, unused)
    pub coeffs: [f32; 4],
    pub attenuation: [f32; 4],
}

/// Spot light slot. `attenuation` packs
/// (linear, quadratic, cos inner cutoff, cos outer cutoff).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GpuSpotLight {
    pub position: [f32; 4],
    pub direction: [f32; 4],
    pub color: [f32; 4],
    /// (ambient, diffuse, specular, enabled)
    pub coeffs: [f32; 4],
    pub attenuation: [f32; 4],
}

/// The full light block for the active profile. Unused slots are zeroed,
/// which makes them contribute nothing to the lighting sum.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LightsUniform {
    pub dir: GpuDirLight,
    pub points: [GpuPointLight; NUM_POINT_LIGHTS],
    pub spots: [GpuSpotLight; NUM_SPOT_LIGHTS],
}

impl Default for LightsUniform {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Shadow lookup data for the composition pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ComposeUniforms {
    pub dir_shadow_matrix: [[f32; 4]; 4],
    pub spot_shadow_matrices: [[[f32; 4]; 4]; MAX_SHADOW_CASTERS],
    /// x: directional shadow enabled (0/1), y: active spot caster count,
    /// z: spot shadow near plane, w: spot shadow far plane.
    pub params: [f32; 4],
}

/// SSAO evaluation parameters, including the hemisphere kernel.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SsaoUniforms {
    pub view: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    /// Hemisphere sample offsets, w unused.
    pub samples: [[f32; 4]; SSAO_KERNEL_SIZE],
    /// x: sample radius, y: depth bias, z: kernel size as f32, w unused.
    pub params: [f32; 4],
}

/// x: brightness threshold for the bloom extract stage.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct BloomExtractUniforms {
    pub params: [f32; 4],
}

/// Final composite knobs. x: gamma, y: exposure, z: bloom enabled (0/1).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ToneMapUniforms {
    pub params: [f32; 4],
}

/// Light-marker overlay: camera matrix plus a flat line color.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct OverlayUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub color: [f32; 4],
}

/// x: elapsed seconds, y: streak intensity.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct RainUniforms {
    pub params: [f32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    // WGSL uniform structs must be 16-byte multiples; these sizes are also
    // what the bind group layouts declare as min_binding_size.
    #[test]
    fn uniform_sizes_match_wgsl_layout() {
        assert_eq!(size_of::<PerFrameUniforms>(), 208);
        assert_eq!(size_of::<PerObjectUniforms>(), 112);
        assert_eq!(size_of::<MaterialUniforms>(), 32);
        assert_eq!(size_of::<ShadowViewUniforms>(), 64);
        assert_eq!(size_of::<GpuDirLight>(), 48);
        assert_eq!(size_of::<GpuPointLight>(), 64);
        assert_eq!(size_of::<GpuSpotLight>(), 80);
        assert_eq!(
            size_of::<LightsUniform>(),
            48 + NUM_POINT_LIGHTS * 64 + NUM_SPOT_LIGHTS * 80
        );
        assert_eq!(size_of::<ComposeUniforms>(), 64 + MAX_SHADOW_CASTERS * 64 + 16);
        assert_eq!(size_of::<SsaoUniforms>(), 128 + SSAO_KERNEL_SIZE * 16 + 16);
    }

    #[test]
    fn normal_matrix_is_inverse_transpose() {
        let model = glam::Mat4::from_scale(glam::Vec3::new(2.0, 1.0, 1.0));
        let obj = PerObjectUniforms::new(model);
        // Non-uniform scale: normal matrix must not equal the model's 3x3.
        assert!((obj.normal_mat[0][0] - 0.5).abs() < 1e-6);
        assert!((obj.normal_mat[1][1] - 1.0).abs() < 1e-6);
    }
}
