//! Geometry pass: render every resolved renderable into the G-buffer MRTs.

use crate::render_targets::GBuffer;
use crate::scene::{DrawItem, MaterialTable};
use boulevard_gpu_shared::uniforms::PerObjectUniforms;

/// Renders the draw list into the G-buffer. The color target clears to the
/// sky color of the active profile (white at day, black at night); position
/// and normal clear to zero alpha, which later passes treat as background.
#[allow(clippy::too_many_arguments)]
pub fn render_geometry_pass(
    encoder: &mut wgpu::CommandEncoder,
    gbuffer: &GBuffer,
    pipeline: &wgpu::RenderPipeline,
    per_frame_bg: &wgpu::BindGroup,
    material_bgl: &wgpu::BindGroupLayout,
    per_object_bgl: &wgpu::BindGroupLayout,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    items: &[DrawItem<'_>],
    materials: &MaterialTable,
    is_day: bool,
    default_texture_view: &wgpu::TextureView,
    default_sampler: &wgpu::Sampler,
) {
    let sky = if is_day {
        wgpu::Color::WHITE
    } else {
        wgpu::Color::BLACK
    };

    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Geometry Pass"),
        color_attachments: &[
            Some(wgpu::RenderPassColorAttachment {
                view: &gbuffer.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(sky),
                    store: wgpu::StoreOp::Store,
                },
            }),
            Some(wgpu::RenderPassColorAttachment {
                view: &gbuffer.position_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            }),
            Some(wgpu::RenderPassColorAttachment {
                view: &gbuffer.normal_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            }),
        ],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: &gbuffer.depth_view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(0),
                store: wgpu::StoreOp::Store,
            }),
        }),
        ..Default::default()
    });

    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, per_frame_bg, &[]);

    for item in items {
        // Create per-item object buffer (can't reuse a single buffer because
        // queue.write_buffer is staged and only the last write would survive).
        let obj_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Per-Object UBO"),
            size: std::mem::size_of::<PerObjectUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&obj_buffer, 0, bytemuck::bytes_of(&item.object));

        let obj_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Geometry Per-Object BG"),
            layout: per_object_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: obj_buffer.as_entire_binding(),
            }],
        });
        pass.set_bind_group(2, &obj_bg, &[]);
        pass.set_vertex_buffer(0, item.mesh.vertex_buffer.slice(..));

        for submesh in &item.mesh.submeshes {
            let material = materials.get(is_day, submesh.material_id);
            let uniforms = material.to_uniforms();

            let mat_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Material UBO"),
                size: std::mem::size_of_val(&uniforms) as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            queue.write_buffer(&mat_buffer, 0, bytemuck::bytes_of(&uniforms));

            let color_view = material
                .color_map
                .as_ref()
                .map(|t| &t.view)
                .unwrap_or(default_texture_view);

            let mat_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Geometry Material BG"),
                layout: material_bgl,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: mat_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(color_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(default_sampler),
                    },
                ],
            });
            pass.set_bind_group(1, &mat_bg, &[]);

            pass.draw(
                submesh.start_vertex..submesh.start_vertex + submesh.vertex_count,
                0..1,
            );
        }
    }
}
