//! The light model: one directional light plus bounded point/spot arrays,
//! kept in two profiles (day and night) that swap atomically between frames.

use glam::Vec3;

use crate::uniforms::{GpuDirLight, GpuPointLight, GpuSpotLight, LightsUniform};
use crate::{MAX_SHADOW_CASTERS, NUM_POINT_LIGHTS, NUM_SPOT_LIGHTS};

#[derive(Debug, Clone, Copy)]
pub struct DirLight {
    pub direction: Vec3,
    pub color: Vec3,
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
}

impl Default for DirLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(1.0, -1.0, 1.0).normalize(),
            color: Vec3::ONE,
            ambient: 0.5,
            diffuse: 0.8,
            specular: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            color: Vec3::ONE,
            ambient: 0.05,
            diffuse: 1.0,
            specular: 1.0,
            linear: 0.14,
            quadratic: 0.07,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    pub color: Vec3,
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub linear: f32,
    pub quadratic: f32,
    /// Cosine of the inner cone half-angle.
    pub cut_off: f32,
    /// Cosine of the outer cone half-angle.
    pub outer_cut_off: f32,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            direction: Vec3::NEG_Y,
            color: Vec3::ONE,
            ambient: 0.0,
            diffuse: 1.0,
            specular: 1.0,
            linear: 0.09,
            quadratic: 0.032,
            cut_off: 12.5f32.to_radians().cos(),
            outer_cut_off: 15.0f32.to_radians().cos(),
        }
    }
}

/// The lights of one profile. Point/spot counts are clamped to the shader
/// capacities; overflowing adds are dropped with a warning.
#[derive(Debug, Clone, Default)]
pub struct LightSet {
    pub directional: Option<DirLight>,
    points: Vec<PointLight>,
    spots: Vec<SpotLight>,
}

impl LightSet {
    pub fn add_point(&mut self, light: PointLight) -> Option<usize> {
        if self.points.len() >= NUM_POINT_LIGHTS {
            log::warn!(
                "point light capacity ({}) reached, dropping light at {:?}",
                NUM_POINT_LIGHTS,
                light.position
            );
            return None;
        }
        self.points.push(light);
        Some(self.points.len() - 1)
    }

    pub fn add_spot(&mut self, light: SpotLight) -> Option<usize> {
        if self.spots.len() >= NUM_SPOT_LIGHTS {
            log::warn!(
                "spot light capacity ({}) reached, dropping light at {:?}",
                NUM_SPOT_LIGHTS,
                light.position
            );
            return None;
        }
        self.spots.push(light);
        Some(self.spots.len() - 1)
    }

    pub fn points(&self) -> &[PointLight] {
        &self.points
    }

    pub fn spots(&self) -> &[SpotLight] {
        &self.spots
    }

    pub fn point_mut(&mut self, index: usize) -> Option<&mut PointLight> {
        self.points.get_mut(index)
    }

    pub fn spot_mut(&mut self, index: usize) -> Option<&mut SpotLight> {
        self.spots.get_mut(index)
    }

    /// The spots that get a shadow-map slice this frame, in slot order.
    pub fn shadow_casters(&self) -> &[SpotLight] {
        let n = self.spots.len().min(MAX_SHADOW_CASTERS);
        &self.spots[..n]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightProfile {
    Day,
    Night,
}

/// Owns both light profiles plus the tone-mapping knobs. All passes in a
/// frame read lights through [`LightRig::active_set`], so a profile swap
/// between frames can never leave shadow and composition disagreeing.
#[derive(Debug, Clone)]
pub struct LightRig {
    day: LightSet,
    night: LightSet,
    active: LightProfile,
    pub dir_lights_off: bool,
    pub point_lights_off: bool,
    pub spot_lights_off: bool,
    pub gamma: f32,
    pub exposure: f32,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            day: LightSet::default(),
            night: LightSet::default(),
            active: LightProfile::Day,
            dir_lights_off: false,
            point_lights_off: false,
            spot_lights_off: false,
            gamma: 2.2,
            exposure: 1.0,
        }
    }
}

impl LightRig {
    pub fn profile(&self) -> LightProfile {
        self.active
    }

    pub fn set_profile(&mut self, profile: LightProfile) {
        self.active = profile;
    }

    pub fn is_day(&self) -> bool {
        self.active == LightProfile::Day
    }

    pub fn active_set(&self) -> &LightSet {
        match self.active {
            LightProfile::Day => &self.day,
            LightProfile::Night => &self.night,
        }
    }

    pub fn set_mut(&mut self, profile: LightProfile) -> &mut LightSet {
        match profile {
            LightProfile::Day => &mut self.day,
            LightProfile::Night => &mut self.night,
        }
    }

    /// Packs the active profile for the composition shader. Kill switches
    /// and empty slots pack as zeroed lights, which contribute nothing.
    pub fn pack(&self) -> LightsUniform {
        let set = self.active_set();
        let mut out = LightsUniform::default();

        if !self.dir_lights_off {
            if let Some(dl) = &set.directional {
                out.dir = GpuDirLight {
                    direction: dl.direction.extend(0.0).to_array(),
                    color: dl.color.extend(0.0).to_array(),
                    coeffs: [dl.ambient, dl.diffuse, dl.specular, 1.0],
                };
            }
        }
        if !self.point_lights_off {
            for (slot, pl) in out.points.iter_mut().zip(set.points.iter()) {
                *slot = GpuPointLight {
                    position: pl.position.extend(1.0).to_array(),
                    color: pl.color.extend(0.0).to_array(),
                    coeffs: [pl.ambient, pl.diffuse, pl.specular, 0.0],
                    attenuation: [pl.linear, pl.quadratic, 1.0, 0.0],
                };
            }
        }
        if !self.spot_lights_off {
            for (slot, sl) in out.spots.iter_mut().zip(set.spots.iter()) {
                *slot = GpuSpotLight {
                    position: sl.position.extend(1.0).to_array(),
                    direction: sl.direction.extend(0.0).to_array(),
                    color: sl.color.extend(0.0).to_array(),
                    coeffs: [sl.ambient, sl.diffuse, sl.specular, 1.0],
                    attenuation: [sl.linear, sl.quadratic, sl.cut_off, sl.outer_cut_off],
                };
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_clamp_drops_overflow() {
        let mut set = LightSet::default();
        for _ in 0..NUM_POINT_LIGHTS {
            assert!(set.add_point(PointLight::default()).is_some());
        }
        assert!(set.add_point(PointLight::default()).is_none());
        assert_eq!(set.points().len(), NUM_POINT_LIGHTS);
    }

    #[test]
    fn shadow_casters_bounded_by_slices() {
        let mut set = LightSet::default();
        for _ in 0..NUM_SPOT_LIGHTS {
            set.add_spot(SpotLight::default());
        }
        assert!(set.shadow_casters().len() <= MAX_SHADOW_CASTERS);
    }

    #[test]
    fn profile_swap_repacks_whole_block() {
        let mut rig = LightRig::default();
        rig.set_mut(LightProfile::Day).directional = Some(DirLight::default());
        let mut night_spot = SpotLight::default();
        night_spot.position = Vec3::new(3.0, 5.0, -2.0);
        rig.set_mut(LightProfile::Night).add_spot(night_spot);

        rig.set_profile(LightProfile::Day);
        let day = rig.pack();
        assert_eq!(day.dir.coeffs[3], 1.0);
        assert_eq!(day.spots[0].coeffs[3], 0.0);

        rig.set_profile(LightProfile::Night);
        let night = rig.pack();
        assert_eq!(night.dir.coeffs[3], 0.0);
        assert_eq!(night.spots[0].coeffs[3], 1.0);
        assert_eq!(night.spots[0].position[0], 3.0);
    }

    #[test]
    fn kill_switch_zeroes_kind() {
        let mut rig = LightRig::default();
        rig.set_mut(LightProfile::Day).directional = Some(DirLight::default());
        rig.set_mut(LightProfile::Day).add_point(PointLight::default());
        rig.dir_lights_off = true;
        let packed = rig.pack();
        assert_eq!(packed.dir.coeffs, [0.0; 4]);
        assert_eq!(packed.points[0].attenuation[2], 1.0);
    }
}
