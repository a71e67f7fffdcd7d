//! CPU reference for the composition shader's lighting math. The WGSL in
//! `shaders/compose.wgsl` mirrors these functions term for term; scenario
//! tests run against this module instead of a GPU device.

use glam::{Vec2, Vec3};

use crate::lights::{DirLight, PointLight, SpotLight};

/// One shaded G-buffer sample.
#[derive(Debug, Clone, Copy)]
pub struct Surface {
    pub position: Vec3,
    pub normal: Vec3,
    pub albedo: Vec3,
    pub shininess: f32,
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// `1 / (1 + linear*d + quadratic*d^2)`, clamped so a light sitting exactly
/// on the surface cannot blow up.
pub fn attenuation(linear: f32, quadratic: f32, distance: f32) -> f32 {
    let d = distance.max(1e-4);
    1.0 / (1.0 + linear * d + quadratic * d * d)
}

/// Smooth falloff between the inner and outer cone cosines.
pub fn cone_intensity(cut_off: f32, outer_cut_off: f32, cos_theta: f32) -> f32 {
    let epsilon = (cut_off - outer_cut_off).max(1e-4);
    ((cos_theta - outer_cut_off) / epsilon).clamp(0.0, 1.0)
}

/// Maps perspective window depth (0..1) back to a linear 0..1 ramp over
/// [near, far]. Orthographic depth is already linear and never goes through
/// this.
pub fn linearize_depth(window_z: f32, near: f32, far: f32) -> f32 {
    let eye_z = near * far / (far - window_z * (far - near));
    (eye_z - near) / (far - near)
}

/// Whether a light-space NDC point falls inside the shadow map.
pub fn shadow_coord_in_bounds(uv: Vec2, depth: f32) -> bool {
    (0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y) && (0.0..=1.0).contains(&depth)
}

/// Fade toward the edge of the projected spot frustum, so shadows do not
/// cut off with a hard square border.
pub fn frustum_edge_fade(uv: Vec2) -> f32 {
    let d = ((uv.x - 0.5).abs().max((uv.y - 0.5).abs())) * 2.0;
    1.0 - smoothstep(0.8, 1.0, d)
}

fn phong(
    light_dir: Vec3,
    light_color: Vec3,
    coeffs: (f32, f32, f32),
    surface: &Surface,
    view_pos: Vec3,
    occlusion: f32,
    shadow: f32,
) -> Vec3 {
    let (ambient, diffuse, specular) = coeffs;
    let n = surface.normal.normalize_or_zero();
    let view_dir = (view_pos - surface.position).normalize_or_zero();
    let diff = n.dot(light_dir).max(0.0);
    let reflect_dir = (-light_dir).reflect(n);
    let spec = view_dir.dot(reflect_dir).max(0.0).powf(surface.shininess.max(1.0));
    let lit = 1.0 - shadow.clamp(0.0, 1.0);

    light_color
        * (surface.albedo * ambient * occlusion
            + surface.albedo * diffuse * diff * lit
            + specular * spec * lit)
}

/// Directional contribution. Occlusion dims ambient only; shadow removes
/// diffuse and specular only.
pub fn shade_directional(
    light: &DirLight,
    surface: &Surface,
    view_pos: Vec3,
    occlusion: f32,
    shadow: f32,
) -> Vec3 {
    let light_dir = (-light.direction).normalize_or_zero();
    phong(
        light_dir,
        light.color,
        (light.ambient, light.diffuse, light.specular),
        surface,
        view_pos,
        occlusion,
        shadow,
    )
}

pub fn shade_point(
    light: &PointLight,
    surface: &Surface,
    view_pos: Vec3,
    occlusion: f32,
    shadow: f32,
) -> Vec3 {
    let to_light = light.position - surface.position;
    let light_dir = to_light.normalize_or_zero();
    let att = attenuation(light.linear, light.quadratic, to_light.length());
    phong(
        light_dir,
        light.color,
        (light.ambient, light.diffuse, light.specular),
        surface,
        view_pos,
        occlusion,
        shadow,
    ) * att
}

pub fn shade_spot(
    light: &SpotLight,
    surface: &Surface,
    view_pos: Vec3,
    occlusion: f32,
    shadow: f32,
) -> Vec3 {
    let to_light = light.position - surface.position;
    let light_dir = to_light.normalize_or_zero();
    let att = attenuation(light.linear, light.quadratic, to_light.length());
    let cos_theta = light_dir.dot((-light.direction).normalize_or_zero());
    let intensity = cone_intensity(light.cut_off, light.outer_cut_off, cos_theta);
    // The cone clamp gates diffuse and specular; ambient leaks slightly
    // outside the cone, scaled only by distance.
    let cone_shadow = 1.0 - (1.0 - shadow.clamp(0.0, 1.0)) * intensity;
    phong(
        light_dir,
        light.color,
        (light.ambient, light.diffuse, light.specular),
        surface,
        view_pos,
        occlusion,
        cone_shadow,
    ) * att
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lights::{LightProfile, LightRig, SpotLight};

    fn ground() -> Surface {
        Surface {
            position: Vec3::ZERO,
            normal: Vec3::Y,
            albedo: Vec3::new(0.5, 0.5, 0.5),
            shininess: 32.0,
        }
    }

    // Flat plane lit straight down: result is albedo * (ambient + diffuse)
    // plus the full specular highlight, and SSAO only touches the ambient
    // term.
    #[test]
    fn flat_plane_directional_matches_direct_computation() {
        let light = DirLight {
            direction: Vec3::NEG_Y,
            color: Vec3::ONE,
            ambient: 0.3,
            diffuse: 0.6,
            specular: 0.0,
        };
        let surface = ground();
        let out = shade_directional(&light, &surface, Vec3::new(0.0, 10.0, 0.0), 1.0, 0.0);
        let expected = surface.albedo * (0.3 + 0.6);
        assert!((out - expected).length() < 1e-5, "{out:?} vs {expected:?}");

        // Halving the occlusion halves only the ambient term.
        let dimmed = shade_directional(&light, &surface, Vec3::new(0.0, 10.0, 0.0), 0.5, 0.0);
        let expected_dim = surface.albedo * (0.3 * 0.5 + 0.6);
        assert!((dimmed - expected_dim).length() < 1e-5);
    }

    #[test]
    fn shadow_removes_diffuse_and_specular_only() {
        let light = DirLight {
            direction: Vec3::NEG_Y,
            color: Vec3::ONE,
            ambient: 0.3,
            diffuse: 0.6,
            specular: 1.0,
        };
        let surface = ground();
        let shadowed = shade_directional(&light, &surface, Vec3::new(0.0, 10.0, 0.0), 1.0, 1.0);
        let expected = surface.albedo * 0.3;
        assert!((shadowed - expected).length() < 1e-5);
    }

    #[test]
    fn point_light_follows_attenuation_curve() {
        let light = PointLight {
            position: Vec3::new(0.0, 1.0, 0.0),
            linear: 0.09,
            quadratic: 0.032,
            ambient: 0.0,
            diffuse: 1.0,
            specular: 0.0,
            color: Vec3::ONE,
        };
        let view = Vec3::new(0.0, 10.0, 0.0);
        let mut previous = f32::INFINITY;
        for height in [1.0_f32, 2.0, 4.0, 8.0] {
            let light = PointLight {
                position: Vec3::new(0.0, height, 0.0),
                ..light
            };
            let out = shade_point(&light, &ground(), view, 1.0, 0.0);
            let expected = ground().albedo * attenuation(0.09, 0.032, height);
            assert!((out - expected).length() < 1e-5);
            assert!(out.x < previous, "brightness must fall with distance");
            previous = out.x;
        }
    }

    #[test]
    fn attenuation_is_safe_at_zero_distance() {
        let a = attenuation(0.09, 0.032, 0.0);
        assert!(a.is_finite() && a <= 1.0);
    }

    #[test]
    fn cone_falloff_is_smooth_and_bounded() {
        let inner = 12.5f32.to_radians().cos();
        let outer = 15.0f32.to_radians().cos();
        assert_eq!(cone_intensity(inner, outer, 1.0), 1.0);
        assert_eq!(cone_intensity(inner, outer, 20.0f32.to_radians().cos()), 0.0);
        let mid = cone_intensity(inner, outer, 14.0f32.to_radians().cos());
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn degenerate_spot_produces_no_nans() {
        let light = SpotLight {
            direction: Vec3::ZERO,
            ..SpotLight::default()
        };
        let out = shade_spot(&light, &ground(), Vec3::new(0.0, 10.0, 0.0), 1.0, 0.0);
        assert!(out.is_finite());
    }

    #[test]
    fn linearized_depth_recovers_eye_distance() {
        let near = 0.1;
        let far = 10.0;
        let proj = glam::Mat4::perspective_rh(1.0, 1.0, near, far);
        for eye_z in [0.5_f32, 2.0, 6.0, 9.5] {
            let clip = proj * glam::Vec4::new(0.0, 0.0, -eye_z, 1.0);
            let window_z = clip.z / clip.w;
            let linear = linearize_depth(window_z, near, far);
            let expected = (eye_z - near) / (far - near);
            assert!(
                (linear - expected).abs() < 1e-4,
                "eye_z {eye_z}: {linear} vs {expected}"
            );
        }
    }

    #[test]
    fn edge_fade_is_full_in_center_and_zero_at_border() {
        assert_eq!(frustum_edge_fade(Vec2::splat(0.5)), 1.0);
        assert!(frustum_edge_fade(Vec2::new(0.999, 0.5)) < 1e-3);
        let inner = frustum_edge_fade(Vec2::new(0.85, 0.5));
        let outer = frustum_edge_fade(Vec2::new(0.95, 0.5));
        assert!(inner > outer);
    }

    #[test]
    fn shadow_bounds_check() {
        assert!(shadow_coord_in_bounds(Vec2::splat(0.5), 0.5));
        assert!(!shadow_coord_in_bounds(Vec2::new(1.2, 0.5), 0.5));
        assert!(!shadow_coord_in_bounds(Vec2::splat(0.5), 1.2));
    }

    // Day/night swap: the same surface shades bright under the day profile
    // and nearly dark under a night profile whose only spot points away.
    #[test]
    fn profile_swap_changes_shading() {
        let mut rig = LightRig::default();
        rig.set_mut(LightProfile::Day).directional = Some(DirLight::default());
        let mut lamp = SpotLight::default();
        lamp.position = Vec3::new(50.0, 5.0, 50.0);
        rig.set_mut(LightProfile::Night).add_spot(lamp);

        let surface = ground();
        let view = Vec3::new(0.0, 10.0, 0.0);

        rig.set_profile(LightProfile::Day);
        let day: Vec3 = rig
            .active_set()
            .directional
            .map(|dl| shade_directional(&dl, &surface, view, 1.0, 0.0))
            .unwrap_or(Vec3::ZERO);

        rig.set_profile(LightProfile::Night);
        let night: Vec3 = rig
            .active_set()
            .spots()
            .iter()
            .map(|sl| shade_spot(sl, &surface, view, 1.0, 0.0))
            .sum();

        assert!(day.length() > 0.3);
        assert!(night.length() < 0.05, "distant lamp barely reaches: {night:?}");
    }
}
