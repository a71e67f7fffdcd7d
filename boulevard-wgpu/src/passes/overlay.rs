//! Overlays drawn on top of the finished image: light-position markers and
//! the rain effect.

use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::passes::render_fullscreen_effect;

const MARKER_SIZE: f32 = 0.25;

/// Line-list vertices for one wireframe diamond per light position.
pub fn marker_vertices(positions: &[Vec3]) -> Vec<f32> {
    let mut out = Vec::with_capacity(positions.len() * 18);
    for p in positions {
        for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
            let a = *p - axis * MARKER_SIZE;
            let b = *p + axis * MARKER_SIZE;
            out.extend_from_slice(&[a.x, a.y, a.z, b.x, b.y, b.z]);
        }
    }
    out
}

/// Draws the markers over the output, depth-tested against the scene depth.
#[allow(clippy::too_many_arguments)]
pub fn render_markers(
    encoder: &mut wgpu::CommandEncoder,
    output_view: &wgpu::TextureView,
    depth_view: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    overlay_bg: &wgpu::BindGroup,
    device: &wgpu::Device,
    positions: &[Vec3],
) {
    if positions.is_empty() {
        return;
    }
    let vertices = marker_vertices(positions);
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Marker VBO"),
        contents: bytemuck::cast_slice(&vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });

    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Marker Pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: output_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: depth_view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Store,
            }),
        }),
        ..Default::default()
    });

    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, overlay_bg, &[]);
    pass.set_vertex_buffer(0, vertex_buffer.slice(..));
    pass.draw(0..(vertices.len() / 3) as u32, 0..1);
}

pub fn render_rain(
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
        "Rain Pass",
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diamond_has_three_segments_per_light() {
        let verts = marker_vertices(&[Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0)]);
        // 2 lights * 3 segments * 2 endpoints * 3 floats.
        assert_eq!(verts.len(), 36);
        // Second light's first endpoint sits MARKER_SIZE left of it on x.
        assert_eq!(verts[18], 1.0 - MARKER_SIZE);
        assert_eq!(verts[19], 2.0);
    }
}
