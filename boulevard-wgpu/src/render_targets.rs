//! Render target creation for the deferred pipeline: G-buffer, shadow maps,
//! SSAO/bloom ping-pong targets, the noise texture and default resources.

use boulevard_gpu_shared::{MAX_SHADOW_CASTERS, SSAO_NOISE_DIM};

/// G-buffer and HDR color format. Not filterable, which is fine: every
/// screen-space pass point-samples via textureLoad.
pub const GBUFFER_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;
/// Scene depth, stencil reserved for future masking.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;
/// Single-channel float format (shadow depth, SSAO).
pub const R32_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R32Float;
/// SSAO rotation noise.
pub const NOISE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rg32Float;

/// Directional shadow map resolution.
pub const DIR_SHADOW_SIZE: u32 = 4096;
/// Spot shadow slice resolution.
pub const SPOT_SHADOW_SIZE: u32 = 1024;

/// G-buffer: albedo+shininess, world position, world normal+emissive flag,
/// shared depth/stencil.
pub struct GBuffer {
    pub color: wgpu::Texture,
    pub color_view: wgpu::TextureView,
    pub position: wgpu::Texture,
    pub position_view: wgpu::TextureView,
    pub normal: wgpu::Texture,
    pub normal_view: wgpu::TextureView,
    pub depth: wgpu::Texture,
    /// Full depth+stencil view, used as a render attachment.
    pub depth_view: wgpu::TextureView,
    /// Depth-aspect-only view, used where the depth is sampled.
    pub depth_sample_view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

/// Single color target, optionally with its own depth.
pub struct RenderTarget {
    pub color_texture: wgpu::Texture,
    pub color_view: wgpu::TextureView,
    pub depth_texture: Option<wgpu::Texture>,
    pub depth_view: Option<wgpu::TextureView>,
    pub width: u32,
    pub height: u32,
}

fn create_color_texture(
    device: &wgpu::Device,
    label: &str,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    })
}

fn create_depth_texture(
    device: &wgpu::Device,
    label: &str,
    width: u32,
    height: u32,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    })
}

pub fn create_gbuffer(device: &wgpu::Device, width: u32, height: u32) -> GBuffer {
    let view_desc = wgpu::TextureViewDescriptor::default();

    let color = create_color_texture(device, "GBuffer Color+Shininess", width, height, GBUFFER_FORMAT);
    let position = create_color_texture(device, "GBuffer Position", width, height, GBUFFER_FORMAT);
    let normal = create_color_texture(device, "GBuffer Normal", width, height, GBUFFER_FORMAT);
    let depth = create_depth_texture(device, "GBuffer Depth", width, height);

    // The composition and debug passes sample the depth aspect only.
    let depth_sample_view = depth.create_view(&wgpu::TextureViewDescriptor {
        aspect: wgpu::TextureAspect::DepthOnly,
        ..Default::default()
    });
    let depth_view = depth.create_view(&view_desc);

    GBuffer {
        color_view: color.create_view(&view_desc),
        color,
        position_view: position.create_view(&view_desc),
        position,
        normal_view: normal.create_view(&view_desc),
        normal,
        depth_view,
        depth_sample_view,
        depth,
        width,
        height,
    }
}

pub fn create_render_target(
    device: &wgpu::Device,
    label: &str,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    with_depth: bool,
) -> RenderTarget {
    let color_texture = create_color_texture(device, label, width, height, format);
    let color_view = color_texture.create_view(&wgpu::TextureViewDescriptor::default());

    let (depth_texture, depth_view) = if with_depth {
        let dt = create_depth_texture(device, &format!("{label} Depth"), width, height);
        let dv = dt.create_view(&wgpu::TextureViewDescriptor::default());
        (Some(dt), Some(dv))
    } else {
        (None, None)
    };

    RenderTarget {
        color_texture,
        color_view,
        depth_texture,
        depth_view,
        width,
        height,
    }
}

/// Directional shadow map: linear depth in an R32Float color target plus a
/// throwaway depth buffer for the depth test.
pub fn create_dir_shadow_target(device: &wgpu::Device) -> RenderTarget {
    create_render_target(
        device,
        "Directional Shadow",
        DIR_SHADOW_SIZE,
        DIR_SHADOW_SIZE,
        R32_FORMAT,
        true,
    )
}

/// Spot shadow maps: one R32Float array layer per caster with per-layer
/// render views, plus one shared depth buffer reused slice by slice.
pub struct SpotShadowTarget {
    pub color: wgpu::Texture,
    /// Sampled by the composition pass.
    pub array_view: wgpu::TextureView,
    /// Render attachment per caster slot.
    pub layer_views: Vec<wgpu::TextureView>,
    pub depth: wgpu::Texture,
    pub depth_view: wgpu::TextureView,
}

pub fn create_spot_shadow_target(device: &wgpu::Device) -> SpotShadowTarget {
    let color = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Spot Shadow Array"),
        size: wgpu::Extent3d {
            width: SPOT_SHADOW_SIZE,
            height: SPOT_SHADOW_SIZE,
            depth_or_array_layers: MAX_SHADOW_CASTERS as u32,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: R32_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });

    let array_view = color.create_view(&wgpu::TextureViewDescriptor {
        label: Some("Spot Shadow Array View"),
        dimension: Some(wgpu::TextureViewDimension::D2Array),
        ..Default::default()
    });

    let layer_views = (0..MAX_SHADOW_CASTERS as u32)
        .map(|layer| {
            color.create_view(&wgpu::TextureViewDescriptor {
                label: Some("Spot Shadow Layer View"),
                dimension: Some(wgpu::TextureViewDimension::D2),
                base_array_layer: layer,
                array_layer_count: Some(1),
                ..Default::default()
            })
        })
        .collect();

    let depth = create_depth_texture(device, "Spot Shadow Depth", SPOT_SHADOW_SIZE, SPOT_SHADOW_SIZE);
    let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

    SpotShadowTarget {
        color,
        array_view,
        layer_views,
        depth,
        depth_view,
    }
}

/// Raw occlusion plus the blurred buffer the composition pass reads.
pub struct SsaoTargets {
    pub raw: RenderTarget,
    pub blurred: RenderTarget,
}

pub fn create_ssao_targets(device: &wgpu::Device, width: u32, height: u32) -> SsaoTargets {
    SsaoTargets {
        raw: create_render_target(device, "SSAO Raw", width, height, R32_FORMAT, false),
        blurred: create_render_target(device, "SSAO Blurred", width, height, R32_FORMAT, false),
    }
}

/// Bloom extract plus the blurred buffer the final composite reads.
pub struct BloomTargets {
    pub extract: RenderTarget,
    pub blurred: RenderTarget,
}

pub fn create_bloom_targets(device: &wgpu::Device, width: u32, height: u32) -> BloomTargets {
    BloomTargets {
        extract: create_render_target(device, "Bloom Extract", width, height, GBUFFER_FORMAT, false),
        blurred: create_render_target(device, "Bloom Blurred", width, height, GBUFFER_FORMAT, false),
    }
}

/// Uploads the tiled SSAO rotation noise as an Rg32Float texture.
pub fn create_noise_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texels: &[f32],
) -> (wgpu::Texture, wgpu::TextureView) {
    let dim = SSAO_NOISE_DIM as u32;
    debug_assert_eq!(texels.len(), (dim * dim * 2) as usize);

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("SSAO Noise"),
        size: wgpu::Extent3d {
            width: dim,
            height: dim,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: NOISE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        bytemuck::cast_slice(texels),
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(dim * 8),
            rows_per_image: Some(dim),
        },
        wgpu::Extent3d {
            width: dim,
            height: dim,
            depth_or_array_layers: 1,
        },
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

/// 1x1 white fallback for solid-color materials.
pub fn create_default_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Default 1x1 White"),
        size: wgpu::Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &[255u8, 255, 255, 255],
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(4),
            rows_per_image: Some(1),
        },
        wgpu::Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
        },
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}
