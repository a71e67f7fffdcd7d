//! The per-frame orchestrator: owns every pipeline, target and persistent
//! buffer, plans the frame, validates the plan and encodes it.

use glam::{Mat4, Vec3};
use rand::thread_rng;

use boulevard_gpu_shared::light_space::{
    directional_light_matrix, spot_light_matrix, SPOT_SHADOW_FAR, SPOT_SHADOW_NEAR,
};
use boulevard_gpu_shared::lights::LightRig;
use boulevard_gpu_shared::ssao::{generate_kernel, generate_noise, noise_texel_data, pack_kernel};
use boulevard_gpu_shared::uniforms::{
    BloomExtractUniforms, ComposeUniforms, LightsUniform, OverlayUniforms, PerFrameUniforms,
    RainUniforms, SsaoUniforms, ToneMapUniforms,
};
use boulevard_gpu_shared::{MAX_SHADOW_CASTERS, SSAO_KERNEL_SIZE, SSAO_NOISE_DIM};

use crate::context::GpuContext;
use crate::error::RenderError;
use crate::frame_graph::{plan_frame, FrameToggles, PassKind};
use crate::passes;
use crate::pipeline;
use crate::render_targets::{
    create_bloom_targets, create_default_texture, create_dir_shadow_target, create_gbuffer,
    create_noise_texture, create_render_target, create_spot_shadow_target, create_ssao_targets,
    BloomTargets, GBuffer, RenderTarget, SpotShadowTarget, GBUFFER_FORMAT,
};
use crate::scene::{resolve_draw_list, AssetCache, CameraSnapshot, GpuMesh, MaterialTable, Renderable};

/// Renderer tunables. Capacity constants live in `boulevard-gpu-shared`;
/// these are the knobs a host may want to adjust.
#[derive(Debug, Clone, Copy)]
pub struct RendererConfig {
    pub width: u32,
    pub height: u32,
    pub output_format: wgpu::TextureFormat,
    pub ssao_radius: f32,
    pub ssao_bias: f32,
    pub bloom_enabled: bool,
    pub bloom_threshold: f32,
    pub rain_strength: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            output_format: wgpu::TextureFormat::Rgba8UnormSrgb,
            ssao_radius: 0.5,
            ssao_bias: 0.025,
            bloom_enabled: true,
            bloom_threshold: 1.0,
            rain_strength: 0.35,
        }
    }
}

/// Everything the renderer needs from its collaborators for one frame.
pub struct FrameParams<'a> {
    pub output: &'a wgpu::Texture,
    pub camera: &'a CameraSnapshot,
    pub renderables: &'a [Renderable],
    pub meshes: &'a AssetCache<GpuMesh>,
    pub materials: &'a MaterialTable,
    pub lights: &'a LightRig,
    pub time_seconds: f32,
    pub rain: bool,
    pub show_light_markers: bool,
}

struct BindGroupLayouts {
    per_frame: wgpu::BindGroupLayout,
    material: wgpu::BindGroupLayout,
    per_object: wgpu::BindGroupLayout,
    shadow_view: wgpu::BindGroupLayout,
    ssao: wgpu::BindGroupLayout,
    blur: wgpu::BindGroupLayout,
    bloom_extract: wgpu::BindGroupLayout,
    compose_inputs: wgpu::BindGroupLayout,
    compose_lights: wgpu::BindGroupLayout,
    final_composite: wgpu::BindGroupLayout,
    debug_view: wgpu::BindGroupLayout,
    blit: wgpu::BindGroupLayout,
    overlay: wgpu::BindGroupLayout,
    rain: wgpu::BindGroupLayout,
}

struct Pipelines {
    surface: wgpu::RenderPipeline,
    shadow_dynamic: wgpu::RenderPipeline,
    shadow_terrain: wgpu::RenderPipeline,
    ssao: wgpu::RenderPipeline,
    ssao_blur: wgpu::RenderPipeline,
    bloom_extract: wgpu::RenderPipeline,
    bloom_blur: wgpu::RenderPipeline,
    compose: wgpu::RenderPipeline,
    final_composite: wgpu::RenderPipeline,
    debug_view: wgpu::RenderPipeline,
    blit_color: wgpu::RenderPipeline,
    blit_gray: wgpu::RenderPipeline,
    marker: wgpu::RenderPipeline,
    rain: wgpu::RenderPipeline,
}

fn create_bind_group_layouts(device: &wgpu::Device) -> BindGroupLayouts {
    BindGroupLayouts {
        per_frame: pipeline::create_per_frame_bgl(device),
        material: pipeline::create_material_bgl(device),
        per_object: pipeline::create_per_object_bgl(device),
        shadow_view: pipeline::create_shadow_view_bgl(device),
        ssao: pipeline::create_ssao_bgl(device),
        blur: pipeline::create_blur_bgl(device),
        bloom_extract: pipeline::create_bloom_extract_bgl(device),
        compose_inputs: pipeline::create_compose_inputs_bgl(device),
        compose_lights: pipeline::create_compose_lights_bgl(device),
        final_composite: pipeline::create_final_bgl(device),
        debug_view: pipeline::create_debug_view_bgl(device),
        blit: pipeline::create_blit_bgl(device),
        overlay: pipeline::create_overlay_bgl(device),
        rain: pipeline::create_rain_bgl(device),
    }
}

fn create_pipelines(
    device: &wgpu::Device,
    bgls: &BindGroupLayouts,
    output_format: wgpu::TextureFormat,
) -> Pipelines {
    use boulevard_gpu_shared::shaders;
    use crate::render_targets::R32_FORMAT;

    Pipelines {
        surface: pipeline::create_surface_pipeline(
            device,
            &bgls.per_frame,
            &bgls.material,
            &bgls.per_object,
        ),
        shadow_dynamic: pipeline::create_shadow_pipeline(
            device,
            &bgls.shadow_view,
            &bgls.per_object,
            wgpu::Face::Front,
        ),
        shadow_terrain: pipeline::create_shadow_pipeline(
            device,
            &bgls.shadow_view,
            &bgls.per_object,
            wgpu::Face::Back,
        ),
        ssao: pipeline::create_fullscreen_pipeline(
            device,
            "SSAO Pipeline",
            &[&bgls.ssao],
            shaders::SSAO_FRAG,
            "fs_main",
            R32_FORMAT,
        ),
        ssao_blur: pipeline::create_fullscreen_pipeline(
            device,
            "SSAO Blur Pipeline",
            &[&bgls.blur],
            shaders::BLUR_FRAG,
            "fs_scalar",
            R32_FORMAT,
        ),
        bloom_extract: pipeline::create_fullscreen_pipeline(
            device,
            "Bloom Extract Pipeline",
            &[&bgls.bloom_extract],
            shaders::BLOOM_EXTRACT_FRAG,
            "fs_main",
            GBUFFER_FORMAT,
        ),
        bloom_blur: pipeline::create_fullscreen_pipeline(
            device,
            "Bloom Blur Pipeline",
            &[&bgls.blur],
            shaders::BLUR_FRAG,
            "fs_color",
            GBUFFER_FORMAT,
        ),
        compose: pipeline::create_fullscreen_pipeline(
            device,
            "Composition Pipeline",
            &[&bgls.compose_inputs, &bgls.compose_lights],
            shaders::COMPOSE_FRAG,
            "fs_main",
            GBUFFER_FORMAT,
        ),
        final_composite: pipeline::create_fullscreen_pipeline(
            device,
            "Final Composite Pipeline",
            &[&bgls.final_composite],
            shaders::FINAL_FRAG,
            "fs_main",
            output_format,
        ),
        debug_view: pipeline::create_fullscreen_pipeline(
            device,
            "Debug View Pipeline",
            &[&bgls.debug_view],
            shaders::DEBUG_VIEW_FRAG,
            "fs_main",
            output_format,
        ),
        blit_color: pipeline::create_fullscreen_pipeline(
            device,
            "Blit Color Pipeline",
            &[&bgls.blit],
            shaders::BLIT_FRAG,
            "fs_color",
            output_format,
        ),
        blit_gray: pipeline::create_fullscreen_pipeline(
            device,
            "Blit Gray Pipeline",
            &[&bgls.blit],
            shaders::BLIT_FRAG,
            "fs_gray",
            output_format,
        ),
        marker: pipeline::create_marker_pipeline(device, &bgls.overlay, output_format),
        rain: pipeline::create_fullscreen_pipeline(
            device,
            "Rain Pipeline",
            &[&bgls.rain],
            shaders::RAIN_FRAG,
            "fs_main",
            output_format,
        ),
    }
}

fn create_uniform_buffer(device: &wgpu::Device, label: &str, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

pub struct Renderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: RendererConfig,

    bgls: BindGroupLayouts,
    pipelines: Pipelines,

    gbuffer: GBuffer,
    dir_shadow: RenderTarget,
    spot_shadow: SpotShadowTarget,
    ssao_targets: crate::render_targets::SsaoTargets,
    bloom_targets: BloomTargets,
    lit: RenderTarget,
    pre_overlay: RenderTarget,

    ssao_kernel: [[f32; 4]; SSAO_KERNEL_SIZE],
    #[allow(dead_code)]
    noise_texture: wgpu::Texture,
    noise_view: wgpu::TextureView,
    #[allow(dead_code)]
    default_texture: wgpu::Texture,
    default_texture_view: wgpu::TextureView,
    default_sampler: wgpu::Sampler,

    per_frame_buffer: wgpu::Buffer,
    lights_buffer: wgpu::Buffer,
    compose_buffer: wgpu::Buffer,
    ssao_buffer: wgpu::Buffer,
    extract_buffer: wgpu::Buffer,
    tone_buffer: wgpu::Buffer,
    rain_buffer: wgpu::Buffer,
    overlay_buffer: wgpu::Buffer,

    /// Tile the raw G-buffer quadrants instead of lighting the frame.
    pub show_partial_results: bool,
    /// Show the blurred occlusion buffer.
    pub show_occ_results: bool,
    /// Show the blurred bloom buffer.
    pub show_bloom_results: bool,
    /// Show the directional shadow map (day only).
    pub show_dir_light_depth: bool,
}

impl Renderer {
    /// Takes ownership of the context; the renderer is the device owner for
    /// its lifetime.
    pub fn new(context: GpuContext, config: RendererConfig) -> Self {
        let GpuContext { device, queue } = context;

        let bgls = create_bind_group_layouts(&device);
        let pipelines = create_pipelines(&device, &bgls, config.output_format);

        let gbuffer = create_gbuffer(&device, config.width, config.height);
        let dir_shadow = create_dir_shadow_target(&device);
        let spot_shadow = create_spot_shadow_target(&device);
        let ssao_targets = create_ssao_targets(&device, config.width, config.height);
        let bloom_targets = create_bloom_targets(&device, config.width, config.height);
        let lit = create_render_target(
            &device,
            "Lit HDR",
            config.width,
            config.height,
            GBUFFER_FORMAT,
            false,
        );
        let pre_overlay = create_render_target(
            &device,
            "Pre-Overlay",
            config.width,
            config.height,
            config.output_format,
            false,
        );

        let mut rng = thread_rng();
        let ssao_kernel = pack_kernel(&generate_kernel(&mut rng, SSAO_KERNEL_SIZE));
        let noise = generate_noise(&mut rng, SSAO_NOISE_DIM);
        let (noise_texture, noise_view) =
            create_noise_texture(&device, &queue, &noise_texel_data(&noise));
        let (default_texture, default_texture_view) = create_default_texture(&device, &queue);

        let default_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let per_frame_buffer = create_uniform_buffer(
            &device,
            "Per-Frame UBO",
            std::mem::size_of::<PerFrameUniforms>() as u64,
        );
        let lights_buffer = create_uniform_buffer(
            &device,
            "Lights UBO",
            std::mem::size_of::<LightsUniform>() as u64,
        );
        let compose_buffer = create_uniform_buffer(
            &device,
            "Compose UBO",
            std::mem::size_of::<ComposeUniforms>() as u64,
        );
        let ssao_buffer = create_uniform_buffer(
            &device,
            "SSAO UBO",
            std::mem::size_of::<SsaoUniforms>() as u64,
        );
        let extract_buffer = create_uniform_buffer(
            &device,
            "Bloom Extract UBO",
            std::mem::size_of::<BloomExtractUniforms>() as u64,
        );
        let tone_buffer = create_uniform_buffer(
            &device,
            "Tone Map UBO",
            std::mem::size_of::<ToneMapUniforms>() as u64,
        );
        let rain_buffer = create_uniform_buffer(
            &device,
            "Rain UBO",
            std::mem::size_of::<RainUniforms>() as u64,
        );
        let overlay_buffer = create_uniform_buffer(
            &device,
            "Overlay UBO",
            std::mem::size_of::<OverlayUniforms>() as u64,
        );

        log::info!(
            "renderer initialized at {}x{} ({:?})",
            config.width,
            config.height,
            config.output_format
        );

        Self {
            device,
            queue,
            config,
            bgls,
            pipelines,
            gbuffer,
            dir_shadow,
            spot_shadow,
            ssao_targets,
            bloom_targets,
            lit,
            pre_overlay,
            ssao_kernel,
            noise_texture,
            noise_view,
            default_texture,
            default_texture_view,
            default_sampler,
            per_frame_buffer,
            lights_buffer,
            compose_buffer,
            ssao_buffer,
            extract_buffer,
            tone_buffer,
            rain_buffer,
            overlay_buffer,
            show_partial_results: false,
            show_occ_results: false,
            show_bloom_results: false,
            show_dir_light_depth: false,
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Device handle for callers uploading meshes and textures.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Recreates every viewport-sized target. Shadow maps keep their fixed
    /// resolution. Must be called between frames, never during one.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.config.width && height == self.config.height {
            return;
        }
        self.config.width = width;
        self.config.height = height;

        self.gbuffer = create_gbuffer(&self.device, width, height);
        self.ssao_targets = create_ssao_targets(&self.device, width, height);
        self.bloom_targets = create_bloom_targets(&self.device, width, height);
        self.lit = create_render_target(&self.device, "Lit HDR", width, height, GBUFFER_FORMAT, false);
        self.pre_overlay = create_render_target(
            &self.device,
            "Pre-Overlay",
            width,
            height,
            self.config.output_format,
            false,
        );
        log::debug!("render targets resized to {width}x{height}");
    }

    fn uniform_bg(
        &self,
        label: &str,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        })
    }

    fn texture_bg(
        &self,
        label: &str,
        layout: &wgpu::BindGroupLayout,
        view: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            }],
        })
    }

    /// Renders one frame into `frame.output` following the validated plan.
    pub fn draw(&mut self, frame: &FrameParams<'_>) -> Result<(), RenderError> {
        if frame.output.width() != self.config.width
            || frame.output.height() != self.config.height
        {
            return Err(RenderError::OutputSizeMismatch {
                expected_w: self.config.width,
                expected_h: self.config.height,
                actual_w: frame.output.width(),
                actual_h: frame.output.height(),
            });
        }
        let output_view = frame
            .output
            .create_view(&wgpu::TextureViewDescriptor::default());

        let is_day = frame.lights.is_day();
        let active_set = frame.lights.active_set();

        // Spot casters exist at night only; lights with no usable
        // orientation simply get no slice.
        let spot_matrices: Vec<Mat4> = if !is_day && !frame.lights.spot_lights_off {
            active_set
                .shadow_casters()
                .iter()
                .filter_map(|sl| spot_light_matrix(sl.position, sl.direction))
                .take(MAX_SHADOW_CASTERS)
                .collect()
        } else {
            Vec::new()
        };

        let toggles = FrameToggles {
            show_partial_results: self.show_partial_results,
            show_occlusion_results: self.show_occ_results,
            show_bloom_results: self.show_bloom_results,
            show_directional_depth: self.show_dir_light_depth,
            bloom_enabled: self.config.bloom_enabled,
            rain: frame.rain,
            markers: frame.show_light_markers,
        };
        let plan = plan_frame(is_day, spot_matrices.len(), &toggles);
        plan.validate()?;

        let items = resolve_draw_list(frame.meshes, frame.renderables);
        log::trace!(
            "frame: {} renderables resolved to {} draws, {} passes planned",
            frame.renderables.len(),
            items.len(),
            plan.passes().len()
        );

        self.write_frame_uniforms(frame, &spot_matrices, is_day);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        let per_frame_bg = self.uniform_bg("Per-Frame BG", &self.bgls.per_frame, &self.per_frame_buffer);
        let dir_light_matrix = directional_light_matrix();

        for node in plan.passes() {
            match node.kind {
                PassKind::Geometry => passes::geometry::render_geometry_pass(
                    &mut encoder,
                    &self.gbuffer,
                    &self.pipelines.surface,
                    &per_frame_bg,
                    &self.bgls.material,
                    &self.bgls.per_object,
                    &self.device,
                    &self.queue,
                    &items,
                    frame.materials,
                    is_day,
                    &self.default_texture_view,
                    &self.default_sampler,
                ),
                PassKind::DebugView => {
                    let bg = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some("Debug View BG"),
                        layout: &self.bgls.debug_view,
                        entries: &[
                            wgpu::BindGroupEntry {
                                binding: 0,
                                resource: wgpu::BindingResource::TextureView(&self.gbuffer.color_view),
                            },
                            wgpu::BindGroupEntry {
                                binding: 1,
                                resource: wgpu::BindingResource::TextureView(
                                    &self.gbuffer.position_view,
                                ),
                            },
                            wgpu::BindGroupEntry {
                                binding: 2,
                                resource: wgpu::BindingResource::TextureView(&self.gbuffer.normal_view),
                            },
                            wgpu::BindGroupEntry {
                                binding: 3,
                                resource: wgpu::BindingResource::TextureView(
                                    &self.gbuffer.depth_sample_view,
                                ),
                            },
                        ],
                    });
                    passes::debug::render_debug_view(
                        &mut encoder,
                        &output_view,
                        &self.pipelines.debug_view,
                        &bg,
                    );
                }
                PassKind::DirectionalShadow => {
                    if let Some(depth_view) = self.dir_shadow.depth_view.as_ref() {
                        passes::shadow::render_directional_shadow(
                            &mut encoder,
                            &self.dir_shadow.color_view,
                            depth_view,
                            &self.pipelines.shadow_dynamic,
                            &self.pipelines.shadow_terrain,
                            &self.bgls.shadow_view,
                            &self.bgls.per_object,
                            &self.device,
                            &self.queue,
                            dir_light_matrix,
                            &items,
                        );
                    }
                }
                PassKind::SpotShadows => passes::shadow::render_spot_shadows(
                    &mut encoder,
                    &self.spot_shadow,
                    &self.pipelines.shadow_dynamic,
                    &self.pipelines.shadow_terrain,
                    &self.bgls.shadow_view,
                    &self.bgls.per_object,
                    &self.device,
                    &self.queue,
                    &spot_matrices,
                    &items,
                ),
                PassKind::Ssao => {
                    let bg = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some("SSAO BG"),
                        layout: &self.bgls.ssao,
                        entries: &[
                            wgpu::BindGroupEntry {
                                binding: 0,
                                resource: self.ssao_buffer.as_entire_binding(),
                            },
                            wgpu::BindGroupEntry {
                                binding: 1,
                                resource: wgpu::BindingResource::TextureView(
                                    &self.gbuffer.position_view,
                                ),
                            },
                            wgpu::BindGroupEntry {
                                binding: 2,
                                resource: wgpu::BindingResource::TextureView(&self.gbuffer.normal_view),
                            },
                            wgpu::BindGroupEntry {
                                binding: 3,
                                resource: wgpu::BindingResource::TextureView(&self.noise_view),
                            },
                        ],
                    });
                    passes::ssao::render_ssao(
                        &mut encoder,
                        &self.ssao_targets.raw.color_view,
                        &self.pipelines.ssao,
                        &bg,
                    );
                }
                PassKind::SsaoBlur => {
                    let bg = self.texture_bg(
                        "SSAO Blur BG",
                        &self.bgls.blur,
                        &self.ssao_targets.raw.color_view,
                    );
                    passes::ssao::render_ssao_blur(
                        &mut encoder,
                        &self.ssao_targets.blurred.color_view,
                        &self.pipelines.ssao_blur,
                        &bg,
                    );
                }
                PassKind::BlitOcclusion => {
                    let bg = self.texture_bg(
                        "Occlusion Blit BG",
                        &self.bgls.blit,
                        &self.ssao_targets.blurred.color_view,
                    );
                    passes::debug::render_blit(
                        &mut encoder,
                        &output_view,
                        &self.pipelines.blit_gray,
                        &bg,
                        "Occlusion Blit",
                    );
                }
                PassKind::BlitDirShadow => {
                    let bg = self.texture_bg(
                        "Shadow Blit BG",
                        &self.bgls.blit,
                        &self.dir_shadow.color_view,
                    );
                    passes::debug::render_blit(
                        &mut encoder,
                        &output_view,
                        &self.pipelines.blit_gray,
                        &bg,
                        "Directional Shadow Blit",
                    );
                }
                PassKind::Compose => {
                    let inputs_bg = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some("Compose Inputs BG"),
                        layout: &self.bgls.compose_inputs,
                        entries: &[
                            wgpu::BindGroupEntry {
                                binding: 0,
                                resource: self.per_frame_buffer.as_entire_binding(),
                            },
                            wgpu::BindGroupEntry {
                                binding: 1,
                                resource: wgpu::BindingResource::TextureView(&self.gbuffer.color_view),
                            },
                            wgpu::BindGroupEntry {
                                binding: 2,
                                resource: wgpu::BindingResource::TextureView(
                                    &self.gbuffer.position_view,
                                ),
                            },
                            wgpu::BindGroupEntry {
                                binding: 3,
                                resource: wgpu::BindingResource::TextureView(&self.gbuffer.normal_view),
                            },
                            wgpu::BindGroupEntry {
                                binding: 4,
                                resource: wgpu::BindingResource::TextureView(
                                    &self.gbuffer.depth_sample_view,
                                ),
                            },
                            wgpu::BindGroupEntry {
                                binding: 5,
                                resource: wgpu::BindingResource::TextureView(
                                    &self.ssao_targets.blurred.color_view,
                                ),
                            },
                            wgpu::BindGroupEntry {
                                binding: 6,
                                resource: wgpu::BindingResource::TextureView(
                                    &self.dir_shadow.color_view,
                                ),
                            },
                            wgpu::BindGroupEntry {
                                binding: 7,
                                resource: wgpu::BindingResource::TextureView(
                                    &self.spot_shadow.array_view,
                                ),
                            },
                        ],
                    });
                    let lights_bg = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some("Compose Lights BG"),
                        layout: &self.bgls.compose_lights,
                        entries: &[
                            wgpu::BindGroupEntry {
                                binding: 0,
                                resource: self.lights_buffer.as_entire_binding(),
                            },
                            wgpu::BindGroupEntry {
                                binding: 1,
                                resource: self.compose_buffer.as_entire_binding(),
                            },
                        ],
                    });
                    passes::compose::render_composition(
                        &mut encoder,
                        &self.lit.color_view,
                        &self.pipelines.compose,
                        &inputs_bg,
                        &lights_bg,
                        is_day,
                    );
                }
                PassKind::BloomExtract => {
                    let bg = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some("Bloom Extract BG"),
                        layout: &self.bgls.bloom_extract,
                        entries: &[
                            wgpu::BindGroupEntry {
                                binding: 0,
                                resource: self.extract_buffer.as_entire_binding(),
                            },
                            wgpu::BindGroupEntry {
                                binding: 1,
                                resource: wgpu::BindingResource::TextureView(&self.lit.color_view),
                            },
                        ],
                    });
                    passes::bloom::render_bloom_extract(
                        &mut encoder,
                        &self.bloom_targets.extract.color_view,
                        &self.pipelines.bloom_extract,
                        &bg,
                    );
                }
                PassKind::BloomBlur => {
                    let bg = self.texture_bg(
                        "Bloom Blur BG",
                        &self.bgls.blur,
                        &self.bloom_targets.extract.color_view,
                    );
                    passes::bloom::render_bloom_blur(
                        &mut encoder,
                        &self.bloom_targets.blurred.color_view,
                        &self.pipelines.bloom_blur,
                        &bg,
                    );
                }
                PassKind::BlitBloom => {
                    let bg = self.texture_bg(
                        "Bloom Blit BG",
                        &self.bgls.blit,
                        &self.bloom_targets.blurred.color_view,
                    );
                    passes::debug::render_blit(
                        &mut encoder,
                        &output_view,
                        &self.pipelines.blit_color,
                        &bg,
                        "Bloom Blit",
                    );
                }
                PassKind::FinalComposite => {
                    let target = if frame.rain {
                        &self.pre_overlay.color_view
                    } else {
                        &output_view
                    };
                    let bg = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some("Final Composite BG"),
                        layout: &self.bgls.final_composite,
                        entries: &[
                            wgpu::BindGroupEntry {
                                binding: 0,
                                resource: self.tone_buffer.as_entire_binding(),
                            },
                            wgpu::BindGroupEntry {
                                binding: 1,
                                resource: wgpu::BindingResource::TextureView(&self.lit.color_view),
                            },
                            wgpu::BindGroupEntry {
                                binding: 2,
                                resource: wgpu::BindingResource::TextureView(
                                    &self.bloom_targets.blurred.color_view,
                                ),
                            },
                        ],
                    });
                    passes::compose::render_final_composite(
                        &mut encoder,
                        target,
                        &self.pipelines.final_composite,
                        &bg,
                    );
                }
                PassKind::Rain => {
                    let bg = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some("Rain BG"),
                        layout: &self.bgls.rain,
                        entries: &[
                            wgpu::BindGroupEntry {
                                binding: 0,
                                resource: self.rain_buffer.as_entire_binding(),
                            },
                            wgpu::BindGroupEntry {
                                binding: 1,
                                resource: wgpu::BindingResource::TextureView(
                                    &self.pre_overlay.color_view,
                                ),
                            },
                        ],
                    });
                    passes::overlay::render_rain(
                        &mut encoder,
                        &output_view,
                        &self.pipelines.rain,
                        &bg,
                    );
                }
                PassKind::Markers => {
                    let positions: Vec<Vec3> = active_set
                        .points()
                        .iter()
                        .map(|pl| pl.position)
                        .chain(active_set.spots().iter().map(|sl| sl.position))
                        .collect();
                    let overlay_bg =
                        self.uniform_bg("Overlay BG", &self.bgls.overlay, &self.overlay_buffer);
                    passes::overlay::render_markers(
                        &mut encoder,
                        &output_view,
                        &self.gbuffer.depth_view,
                        &self.pipelines.marker,
                        &overlay_bg,
                        &self.device,
                        &positions,
                    );
                }
            }
        }

        self.queue.submit(Some(encoder.finish()));
        Ok(())
    }

    /// One staged write per persistent uniform buffer, before encoding.
    fn write_frame_uniforms(&self, frame: &FrameParams<'_>, spot_matrices: &[Mat4], is_day: bool) {
        let camera = frame.camera;
        self.queue.write_buffer(
            &self.per_frame_buffer,
            0,
            bytemuck::bytes_of(&camera.to_uniforms()),
        );

        self.queue.write_buffer(
            &self.lights_buffer,
            0,
            bytemuck::bytes_of(&frame.lights.pack()),
        );

        let active_set = frame.lights.active_set();
        let use_dir_shadow =
            is_day && !frame.lights.dir_lights_off && active_set.directional.is_some();
        let mut compose = ComposeUniforms {
            dir_shadow_matrix: directional_light_matrix().to_cols_array_2d(),
            spot_shadow_matrices: [Mat4::IDENTITY.to_cols_array_2d(); MAX_SHADOW_CASTERS],
            params: [
                if use_dir_shadow { 1.0 } else { 0.0 },
                spot_matrices.len() as f32,
                SPOT_SHADOW_NEAR,
                SPOT_SHADOW_FAR,
            ],
        };
        for (slot, matrix) in compose.spot_shadow_matrices.iter_mut().zip(spot_matrices) {
            *slot = matrix.to_cols_array_2d();
        }
        self.queue
            .write_buffer(&self.compose_buffer, 0, bytemuck::bytes_of(&compose));

        let ssao = SsaoUniforms {
            view: camera.view.to_cols_array_2d(),
            view_proj: camera.view_proj().to_cols_array_2d(),
            samples: self.ssao_kernel,
            params: [
                self.config.ssao_radius,
                self.config.ssao_bias,
                SSAO_KERNEL_SIZE as f32,
                0.0,
            ],
        };
        self.queue
            .write_buffer(&self.ssao_buffer, 0, bytemuck::bytes_of(&ssao));

        let extract = BloomExtractUniforms {
            params: [self.config.bloom_threshold, 0.0, 0.0, 0.0],
        };
        self.queue
            .write_buffer(&self.extract_buffer, 0, bytemuck::bytes_of(&extract));

        let tone = ToneMapUniforms {
            params: [
                frame.lights.gamma,
                frame.lights.exposure,
                if self.config.bloom_enabled { 1.0 } else { 0.0 },
                0.0,
            ],
        };
        self.queue
            .write_buffer(&self.tone_buffer, 0, bytemuck::bytes_of(&tone));

        let rain = RainUniforms {
            params: [frame.time_seconds, self.config.rain_strength, 0.0, 0.0],
        };
        self.queue
            .write_buffer(&self.rain_buffer, 0, bytemuck::bytes_of(&rain));

        let overlay = OverlayUniforms {
            view_proj: camera.view_proj().to_cols_array_2d(),
            color: [1.0, 0.9, 0.2, 1.0],
        };
        self.queue
            .write_buffer(&self.overlay_buffer, 0, bytemuck::bytes_of(&overlay));
    }
}
