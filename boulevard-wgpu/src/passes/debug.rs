//! Debug surfaces: the quadrant G-buffer view and single-buffer blits.

use crate::passes::render_fullscreen_effect;

pub fn render_debug_view(
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
        "Debug View Pass",
    );
}

/// Stretch-blits one intermediate buffer to the output. The pipeline picks
/// the color or grayscale fragment entry point.
pub fn render_blit(
    encoder: &mut wgpu::CommandEncoder,
    output_view: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
    label: &str,
) {
    render_fullscreen_effect(
        encoder,
        output_view,
        pipeline,
        &[bind_group],
        wgpu::Color::BLACK,
        label,
    );
}
