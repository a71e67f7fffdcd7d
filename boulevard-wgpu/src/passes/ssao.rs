//! SSAO estimation plus the box blur the composition pass depends on.

use crate::passes::render_fullscreen_effect;

pub fn render_ssao(
    encoder: &mut wgpu::CommandEncoder,
    raw_view: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    render_fullscreen_effect(
        encoder,
        raw_view,
        pipeline,
        &[bind_group],
        wgpu::Color::WHITE,
        "SSAO Pass",
    );
}

pub fn render_ssao_blur(
    encoder: &mut wgpu::CommandEncoder,
    blurred_view: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    render_fullscreen_effect(
        encoder,
        blurred_view,
        pipeline,
        &[bind_group],
        wgpu::Color::WHITE,
        "SSAO Blur Pass",
    );
}
