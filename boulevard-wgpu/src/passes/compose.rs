//! Lighting composition into the lit HDR target, and the final composite
//! that adds bloom and tone-maps.

use crate::passes::render_fullscreen_effect;

/// Lighting stage. Background fragments discard, so the clear color is the
/// sky color of the active profile.
pub fn render_composition(
    encoder: &mut wgpu::CommandEncoder,
    lit_view: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    inputs_bg: &wgpu::BindGroup,
    lights_bg: &wgpu::BindGroup,
    is_day: bool,
) {
    let sky = if is_day {
        wgpu::Color::WHITE
    } else {
        wgpu::Color::BLACK
    };
    render_fullscreen_effect(
        encoder,
        lit_view,
        pipeline,
        &[inputs_bg, lights_bg],
        sky,
        "Composition Pass",
    );
}

pub fn render_final_composite(
    encoder: &mut wgpu::CommandEncoder,
    output_view: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    render_fullscreen_effect(
        encoder,
        output_view,
        pipeline,
        &[bind_group],
        wgpu::Color::BLACK,
        "Final Composite Pass",
    );
}
