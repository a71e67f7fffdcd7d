//! SSAO sample generation: a hemisphere kernel biased toward the origin and
//! a small tileable noise texture of tangent-plane rotation vectors.

use glam::{Vec2, Vec3};
use rand::Rng;

use crate::SSAO_KERNEL_SIZE;

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

/// Generates `count` sample offsets inside the +Z unit hemisphere.
/// Magnitudes follow `lerp(0.1, 1.0, (i/count)^2)`, clustering samples near
/// the shaded point where occlusion matters most.
pub fn generate_kernel<R: Rng>(rng: &mut R, count: usize) -> Vec<Vec3> {
    (0..count)
        .map(|i| {
            let sample = Vec3::new(
                rng.gen::<f32>() * 2.0 - 1.0,
                rng.gen::<f32>() * 2.0 - 1.0,
                rng.gen::<f32>(),
            )
            .normalize()
                * rng.gen::<f32>();
            let scale = lerp(0.1, 1.0, (i as f32 / count as f32).powi(2));
            sample * scale
        })
        .collect()
}

/// Generates `dim * dim` rotation vectors for the tiled noise texture.
/// Only x and y are random; the shader treats them as tangent-plane
/// rotations around the surface normal.
pub fn generate_noise<R: Rng>(rng: &mut R, dim: usize) -> Vec<Vec2> {
    (0..dim * dim)
        .map(|_| {
            Vec2::new(
                rng.gen::<f32>() * 2.0 - 1.0,
                rng.gen::<f32>() * 2.0 - 1.0,
            )
        })
        .collect()
}

/// Kernel packed for [`crate::uniforms::SsaoUniforms::samples`].
pub fn pack_kernel(kernel: &[Vec3]) -> [[f32; 4]; SSAO_KERNEL_SIZE] {
    let mut out = [[0.0; 4]; SSAO_KERNEL_SIZE];
    for (slot, sample) in out.iter_mut().zip(kernel.iter()) {
        *slot = sample.extend(0.0).to_array();
    }
    out
}

/// Noise flattened to Rg32Float texel data.
pub fn noise_texel_data(noise: &[Vec2]) -> Vec<f32> {
    noise.iter().flat_map(|v| [v.x, v.y]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SSAO_NOISE_DIM;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn kernel_stays_in_unit_hemisphere() {
        let mut rng = StdRng::seed_from_u64(7);
        for sample in generate_kernel(&mut rng, SSAO_KERNEL_SIZE) {
            assert!(sample.z >= 0.0, "sample below tangent plane: {sample:?}");
            assert!(sample.length() <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn kernel_magnitude_biased_toward_origin() {
        let mut rng = StdRng::seed_from_u64(7);
        let kernel = generate_kernel(&mut rng, SSAO_KERNEL_SIZE);
        let quarter = SSAO_KERNEL_SIZE / 4;
        let head: f32 = kernel[..quarter].iter().map(|v| v.length()).sum::<f32>() / quarter as f32;
        let tail: f32 = kernel[SSAO_KERNEL_SIZE - quarter..]
            .iter()
            .map(|v| v.length())
            .sum::<f32>()
            / quarter as f32;
        assert!(
            head < tail,
            "early samples ({head}) should sit closer than late ones ({tail})"
        );
        // The scale curve caps the first sample at 0.1 before the random
        // magnitude shrinks it further.
        assert!(kernel[0].length() <= 0.1 + 1e-6);
    }

    #[test]
    fn noise_is_planar_and_bounded() {
        let mut rng = StdRng::seed_from_u64(3);
        let noise = generate_noise(&mut rng, SSAO_NOISE_DIM);
        assert_eq!(noise.len(), SSAO_NOISE_DIM * SSAO_NOISE_DIM);
        for v in &noise {
            assert!(v.x >= -1.0 && v.x <= 1.0);
            assert!(v.y >= -1.0 && v.y <= 1.0);
        }
        assert_eq!(noise_texel_data(&noise).len(), noise.len() * 2);
    }
}
