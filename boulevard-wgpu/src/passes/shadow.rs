//! Shadow depth passes: one directional map at day, one array slice per
//! spot caster at night.

use glam::Mat4;

use crate::render_targets::SpotShadowTarget;
use crate::scene::DrawItem;
use boulevard_gpu_shared::uniforms::{PerObjectUniforms, ShadowViewUniforms};

fn draw_casters(
    pass: &mut wgpu::RenderPass<'_>,
    dynamic_pipeline: &wgpu::RenderPipeline,
    terrain_pipeline: &wgpu::RenderPipeline,
    shadow_view_bg: &wgpu::BindGroup,
    per_object_bgl: &wgpu::BindGroupLayout,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    items: &[DrawItem<'_>],
) {
    // Dynamics front-culled first, then terrain back-culled.
    for terrain in [false, true] {
        let pipeline = if terrain {
            terrain_pipeline
        } else {
            dynamic_pipeline
        };
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, shadow_view_bg, &[]);

        for item in items.iter().filter(|i| i.terrain == terrain) {
            // Per-item buffer, same staged-write constraint as the geometry
            // pass.
            let obj_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Shadow Per-Object UBO"),
                size: std::mem::size_of::<PerObjectUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            queue.write_buffer(&obj_buffer, 0, bytemuck::bytes_of(&item.object));

            let obj_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Shadow Per-Object BG"),
                layout: per_object_bgl,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: obj_buffer.as_entire_binding(),
                }],
            });
            pass.set_bind_group(1, &obj_bg, &[]);

            pass.set_vertex_buffer(0, item.mesh.vertex_buffer.slice(..));
            pass.draw(0..item.mesh.vertex_count, 0..1);
        }
    }
}

fn create_shadow_view_bg(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    shadow_view_bgl: &wgpu::BindGroupLayout,
    light_matrix: Mat4,
) -> wgpu::BindGroup {
    let uniforms = ShadowViewUniforms {
        light_matrix: light_matrix.to_cols_array_2d(),
    };
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Shadow View UBO"),
        size: std::mem::size_of::<ShadowViewUniforms>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    queue.write_buffer(&buffer, 0, bytemuck::bytes_of(&uniforms));

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Shadow View BG"),
        layout: shadow_view_bgl,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

/// Renders the directional shadow map. The R32Float target clears to 1.0,
/// the farthest possible depth.
#[allow(clippy::too_many_arguments)]
pub fn render_directional_shadow(
    encoder: &mut wgpu::CommandEncoder,
    color_view: &wgpu::TextureView,
    depth_view: &wgpu::TextureView,
    dynamic_pipeline: &wgpu::RenderPipeline,
    terrain_pipeline: &wgpu::RenderPipeline,
    shadow_view_bgl: &wgpu::BindGroupLayout,
    per_object_bgl: &wgpu::BindGroupLayout,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    light_matrix: Mat4,
    items: &[DrawItem<'_>],
) {
    let shadow_view_bg = create_shadow_view_bg(device, queue, shadow_view_bgl, light_matrix);

    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Directional Shadow Pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: depth_view,
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

    draw_casters(
        &mut pass,
        dynamic_pipeline,
        terrain_pipeline,
        &shadow_view_bg,
        per_object_bgl,
        device,
        queue,
        items,
    );
}

/// Renders one array slice per caster matrix, sharing a single depth
/// buffer across slices.
#[allow(clippy::too_many_arguments)]
pub fn render_spot_shadows(
    encoder: &mut wgpu::CommandEncoder,
    target: &SpotShadowTarget,
    dynamic_pipeline: &wgpu::RenderPipeline,
    terrain_pipeline: &wgpu::RenderPipeline,
    shadow_view_bgl: &wgpu::BindGroupLayout,
    per_object_bgl: &wgpu::BindGroupLayout,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    matrices: &[Mat4],
    items: &[DrawItem<'_>],
) {
    for (slice, matrix) in matrices.iter().enumerate().take(target.layer_views.len()) {
        let shadow_view_bg = create_shadow_view_bg(device, queue, shadow_view_bgl, *matrix);

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Spot Shadow Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target.layer_views[slice],
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &target.depth_view,
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

        draw_casters(
            &mut pass,
            dynamic_pipeline,
            terrain_pipeline,
            &shadow_view_bg,
            per_object_bgl,
            device,
            queue,
            items,
        );
    }
}
