//! Light-space matrices for the shadow passes.

use glam::{Mat4, Vec3};

/// World position the directional shadow frustum is anchored at.
pub const DIR_LIGHT_EYE: Vec3 = Vec3::new(-20.0, 20.0, -20.0);

/// Spot shadow frustum near plane.
pub const SPOT_SHADOW_NEAR: f32 = 0.1;
/// Spot shadow frustum far plane.
pub const SPOT_SHADOW_FAR: f32 = 10.0;
/// Spot shadow cone: a single wide perspective frustum approximates the
/// light's omnidirectional reach. Fine for street lamps aimed downward;
/// geometry behind the frustum simply casts no shadow.
pub const SPOT_SHADOW_FOV_DEG: f32 = 150.0;

/// View-projection covering the playable area from the sun's direction.
/// Ortho depth is linear in z, so the shadow shader can store window depth
/// as-is.
pub fn directional_light_matrix() -> Mat4 {
    let proj = Mat4::orthographic_rh(-30.0, 30.0, -20.0, 20.0, 1.0, 75.0);
    let view = Mat4::look_at_rh(DIR_LIGHT_EYE, Vec3::ZERO, Vec3::Y);
    proj * view
}

/// View-projection for one spot shadow slice. Returns `None` when the light
/// has no usable orientation (zero/NaN direction or NaN position), which
/// skips the slice rather than rendering garbage.
pub fn spot_light_matrix(position: Vec3, direction: Vec3) -> Option<Mat4> {
    if !position.is_finite() || !direction.is_finite() {
        return None;
    }
    let dir = direction.try_normalize()?;
    // +Y up unless the light points (nearly) straight along it.
    let up = if dir.y.abs() > 0.99 { Vec3::X } else { Vec3::Y };
    let proj = Mat4::perspective_rh(
        SPOT_SHADOW_FOV_DEG.to_radians(),
        1.0,
        SPOT_SHADOW_NEAR,
        SPOT_SHADOW_FAR,
    );
    let view = Mat4::look_at_rh(position, position + dir, up);
    Some(proj * view)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_ndc(m: Mat4, p: Vec3) -> Vec3 {
        let clip = m * p.extend(1.0);
        clip.truncate() / clip.w
    }

    #[test]
    fn directional_frustum_contains_scene_center() {
        let ndc = to_ndc(directional_light_matrix(), Vec3::ZERO);
        assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0);
        assert!(ndc.z >= 0.0 && ndc.z <= 1.0);
    }

    #[test]
    fn directional_frustum_excludes_far_geometry() {
        let ndc = to_ndc(directional_light_matrix(), Vec3::new(500.0, 0.0, 0.0));
        assert!(ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 || !(0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn spot_frustum_contains_lit_point() {
        let m = spot_light_matrix(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y).unwrap();
        let ndc = to_ndc(m, Vec3::new(0.5, 0.0, 0.5));
        assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0);
        assert!(ndc.z >= 0.0 && ndc.z <= 1.0);
    }

    #[test]
    fn spot_point_beyond_far_plane_leaves_frustum() {
        let m = spot_light_matrix(Vec3::new(0.0, 20.0, 0.0), Vec3::NEG_Y).unwrap();
        let ndc = to_ndc(m, Vec3::ZERO);
        assert!(ndc.z > 1.0);
    }

    #[test]
    fn degenerate_directions_are_rejected() {
        assert!(spot_light_matrix(Vec3::ZERO, Vec3::ZERO).is_none());
        assert!(spot_light_matrix(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::NEG_Y).is_none());
    }

    #[test]
    fn straight_down_light_gets_finite_matrix() {
        let m = spot_light_matrix(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y).unwrap();
        assert!(m.to_cols_array().iter().all(|v| v.is_finite()));
    }
}
