//! Explicit per-frame pass plan. Every pass declares the buffers it reads
//! and writes; validation rejects any plan that would read a buffer no
//! earlier pass produced. The renderer executes the validated plan in order,
//! so pass sequencing lives in exactly one place.

use crate::error::RenderError;

/// Frame-lifetime buffers passes exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    GBufferColor,
    GBufferPosition,
    GBufferNormal,
    GBufferDepth,
    DirShadowMap,
    SpotShadowMaps,
    SsaoRaw,
    SsaoBlurred,
    LitHdr,
    BloomExtract,
    BloomBlurred,
    PreOverlay,
    Output,
}

impl Resource {
    fn name(self) -> &'static str {
        match self {
            Resource::GBufferColor => "gbuffer color",
            Resource::GBufferPosition => "gbuffer position",
            Resource::GBufferNormal => "gbuffer normal",
            Resource::GBufferDepth => "gbuffer depth",
            Resource::DirShadowMap => "directional shadow map",
            Resource::SpotShadowMaps => "spot shadow maps",
            Resource::SsaoRaw => "ssao raw",
            Resource::SsaoBlurred => "ssao blurred",
            Resource::LitHdr => "lit hdr",
            Resource::BloomExtract => "bloom extract",
            Resource::BloomBlurred => "bloom blurred",
            Resource::PreOverlay => "pre-overlay image",
            Resource::Output => "output",
        }
    }
}

/// What the renderer encodes for one plan node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    Geometry,
    DebugView,
    DirectionalShadow,
    SpotShadows,
    Ssao,
    SsaoBlur,
    BlitOcclusion,
    BlitDirShadow,
    Compose,
    BloomExtract,
    BloomBlur,
    BlitBloom,
    FinalComposite,
    Rain,
    Markers,
}

impl PassKind {
    fn name(self) -> &'static str {
        match self {
            PassKind::Geometry => "geometry",
            PassKind::DebugView => "debug view",
            PassKind::DirectionalShadow => "directional shadow",
            PassKind::SpotShadows => "spot shadows",
            PassKind::Ssao => "ssao",
            PassKind::SsaoBlur => "ssao blur",
            PassKind::BlitOcclusion => "blit occlusion",
            PassKind::BlitDirShadow => "blit directional shadow",
            PassKind::Compose => "compose",
            PassKind::BloomExtract => "bloom extract",
            PassKind::BloomBlur => "bloom blur",
            PassKind::BlitBloom => "blit bloom",
            PassKind::FinalComposite => "final composite",
            PassKind::Rain => "rain",
            PassKind::Markers => "markers",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PassNode {
    pub kind: PassKind,
    pub reads: Vec<Resource>,
    pub writes: Vec<Resource>,
}

/// Debug/feature switches that shape the frame plan.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameToggles {
    pub show_partial_results: bool,
    pub show_occlusion_results: bool,
    pub show_bloom_results: bool,
    pub show_directional_depth: bool,
    pub bloom_enabled: bool,
    pub rain: bool,
    pub markers: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FramePlan {
    passes: Vec<PassNode>,
}

impl FramePlan {
    pub fn push(&mut self, kind: PassKind, reads: &[Resource], writes: &[Resource]) {
        self.passes.push(PassNode {
            kind,
            reads: reads.to_vec(),
            writes: writes.to_vec(),
        });
    }

    pub fn passes(&self) -> &[PassNode] {
        &self.passes
    }

    /// Checks that every read was produced by an earlier pass in the plan.
    pub fn validate(&self) -> Result<(), RenderError> {
        let mut produced: Vec<Resource> = Vec::new();
        for node in &self.passes {
            for read in &node.reads {
                if !produced.contains(read) {
                    return Err(RenderError::GraphViolation {
                        pass: node.kind.name(),
                        resource: read.name(),
                    });
                }
            }
            for write in &node.writes {
                if !produced.contains(write) {
                    produced.push(*write);
                }
            }
        }
        Ok(())
    }
}

const GBUFFER: [Resource; 4] = [
    Resource::GBufferColor,
    Resource::GBufferPosition,
    Resource::GBufferNormal,
    Resource::GBufferDepth,
];

/// Builds the plan for one frame. Debug toggles short-circuit the plan, so
/// a skipped stage's buffers are never consumed later. The directional
/// shadow is rendered at day only and spot shadows at night only; asking
/// for the directional depth view at night therefore fails validation
/// instead of showing a stale map.
pub fn plan_frame(is_day: bool, spot_caster_count: usize, toggles: &FrameToggles) -> FramePlan {
    let mut plan = FramePlan::default();

    plan.push(PassKind::Geometry, &[], &GBUFFER);

    if toggles.show_partial_results {
        plan.push(PassKind::DebugView, &GBUFFER, &[Resource::Output]);
        return plan;
    }

    if is_day {
        plan.push(PassKind::DirectionalShadow, &[], &[Resource::DirShadowMap]);
    } else if spot_caster_count > 0 {
        plan.push(PassKind::SpotShadows, &[], &[Resource::SpotShadowMaps]);
    }

    if toggles.show_directional_depth {
        plan.push(
            PassKind::BlitDirShadow,
            &[Resource::DirShadowMap],
            &[Resource::Output],
        );
        return plan;
    }

    plan.push(
        PassKind::Ssao,
        &[Resource::GBufferPosition, Resource::GBufferNormal],
        &[Resource::SsaoRaw],
    );
    plan.push(PassKind::SsaoBlur, &[Resource::SsaoRaw], &[Resource::SsaoBlurred]);

    if toggles.show_occlusion_results {
        plan.push(
            PassKind::BlitOcclusion,
            &[Resource::SsaoBlurred],
            &[Resource::Output],
        );
        return plan;
    }

    let mut compose_reads: Vec<Resource> = GBUFFER.to_vec();
    compose_reads.push(Resource::SsaoBlurred);
    if is_day {
        compose_reads.push(Resource::DirShadowMap);
    } else if spot_caster_count > 0 {
        compose_reads.push(Resource::SpotShadowMaps);
    }
    plan.push(PassKind::Compose, &compose_reads, &[Resource::LitHdr]);

    if toggles.bloom_enabled {
        plan.push(
            PassKind::BloomExtract,
            &[Resource::LitHdr],
            &[Resource::BloomExtract],
        );
        plan.push(
            PassKind::BloomBlur,
            &[Resource::BloomExtract],
            &[Resource::BloomBlurred],
        );
    }

    // With bloom disabled this read fails validation, which beats blitting
    // whatever the bloom buffer held last.
    if toggles.show_bloom_results {
        plan.push(
            PassKind::BlitBloom,
            &[Resource::BloomBlurred],
            &[Resource::Output],
        );
        return plan;
    }

    let mut final_reads = vec![Resource::LitHdr];
    if toggles.bloom_enabled {
        final_reads.push(Resource::BloomBlurred);
    }
    if toggles.rain {
        plan.push(PassKind::FinalComposite, &final_reads, &[Resource::PreOverlay]);
        plan.push(PassKind::Rain, &[Resource::PreOverlay], &[Resource::Output]);
    } else {
        plan.push(PassKind::FinalComposite, &final_reads, &[Resource::Output]);
    }

    if toggles.markers {
        plan.push(
            PassKind::Markers,
            &[Resource::GBufferDepth],
            &[Resource::Output],
        );
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(plan: &FramePlan) -> Vec<PassKind> {
        plan.passes().iter().map(|p| p.kind).collect()
    }

    #[test]
    fn day_frame_runs_full_sequence() {
        let toggles = FrameToggles {
            bloom_enabled: true,
            ..Default::default()
        };
        let plan = plan_frame(true, 0, &toggles);
        plan.validate().unwrap();
        assert_eq!(
            kinds(&plan),
            vec![
                PassKind::Geometry,
                PassKind::DirectionalShadow,
                PassKind::Ssao,
                PassKind::SsaoBlur,
                PassKind::Compose,
                PassKind::BloomExtract,
                PassKind::BloomBlur,
                PassKind::FinalComposite,
            ]
        );
    }

    #[test]
    fn night_frame_uses_spot_shadows() {
        let toggles = FrameToggles {
            bloom_enabled: true,
            ..Default::default()
        };
        let plan = plan_frame(false, 2, &toggles);
        plan.validate().unwrap();
        assert!(kinds(&plan).contains(&PassKind::SpotShadows));
        assert!(!kinds(&plan).contains(&PassKind::DirectionalShadow));
    }

    #[test]
    fn partial_results_short_circuits_before_shadows() {
        let toggles = FrameToggles {
            show_partial_results: true,
            bloom_enabled: true,
            ..Default::default()
        };
        let plan = plan_frame(true, 2, &toggles);
        plan.validate().unwrap();
        assert_eq!(kinds(&plan), vec![PassKind::Geometry, PassKind::DebugView]);
    }

    #[test]
    fn occlusion_blit_skips_lighting() {
        let toggles = FrameToggles {
            show_occlusion_results: true,
            bloom_enabled: true,
            ..Default::default()
        };
        let plan = plan_frame(true, 0, &toggles);
        plan.validate().unwrap();
        let ks = kinds(&plan);
        assert_eq!(*ks.last().unwrap(), PassKind::BlitOcclusion);
        assert!(!ks.contains(&PassKind::Compose));
    }

    // The composition pass must only ever read the blurred occlusion buffer.
    #[test]
    fn compose_reads_blurred_occlusion_only() {
        let plan = plan_frame(true, 0, &FrameToggles::default());
        let compose = plan
            .passes()
            .iter()
            .find(|p| p.kind == PassKind::Compose)
            .unwrap();
        assert!(compose.reads.contains(&Resource::SsaoBlurred));
        assert!(!compose.reads.contains(&Resource::SsaoRaw));
    }

    #[test]
    fn directional_depth_view_at_night_is_rejected() {
        let toggles = FrameToggles {
            show_directional_depth: true,
            ..Default::default()
        };
        plan_frame(true, 0, &toggles).validate().unwrap();
        let err = plan_frame(false, 1, &toggles).validate().unwrap_err();
        assert!(matches!(err, RenderError::GraphViolation { .. }));
    }

    #[test]
    fn rain_and_markers_extend_the_plan() {
        let toggles = FrameToggles {
            bloom_enabled: true,
            rain: true,
            markers: true,
            ..Default::default()
        };
        let plan = plan_frame(false, 1, &toggles);
        plan.validate().unwrap();
        let ks = kinds(&plan);
        assert_eq!(
            &ks[ks.len() - 3..],
            &[PassKind::FinalComposite, PassKind::Rain, PassKind::Markers]
        );
    }

    #[test]
    fn bloom_view_without_bloom_is_rejected() {
        let toggles = FrameToggles {
            show_bloom_results: true,
            bloom_enabled: false,
            ..Default::default()
        };
        assert!(plan_frame(true, 0, &toggles).validate().is_err());

        let enabled = FrameToggles {
            show_bloom_results: true,
            bloom_enabled: true,
            ..Default::default()
        };
        let plan = plan_frame(true, 0, &enabled);
        plan.validate().unwrap();
        assert_eq!(*kinds(&plan).last().unwrap(), PassKind::BlitBloom);
    }

    #[test]
    fn hand_built_stale_read_is_caught() {
        let mut plan = FramePlan::default();
        plan.push(PassKind::Compose, &[Resource::SsaoBlurred], &[Resource::LitHdr]);
        assert!(plan.validate().is_err());
    }
}
