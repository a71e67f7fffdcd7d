//! Bloom: brightness extraction from the lit image, then a box blur.

use crate::passes::render_fullscreen_effect;

pub fn render_bloom_extract(
    encoder: &mut wgpu::CommandEncoder,
    extract_view: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    render_fullscreen_effect(
        encoder,
        extract_view,
        pipeline,
        &[bind_group],
        wgpu::Color::BLACK,
        "Bloom Extract Pass",
    );
}

pub fn render_bloom_blur(
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
        wgpu::Color::BLACK,
        "Bloom Blur Pass",
    );
}
