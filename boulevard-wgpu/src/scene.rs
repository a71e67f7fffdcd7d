//! Scene-side resource types: camera snapshot, GPU meshes with submesh
//! material ranges, the material table with day/night variants, and the
//! explicit asset cache.

use std::collections::HashMap;

use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use boulevard_gpu_shared::uniforms::{MaterialUniforms, PerFrameUniforms, PerObjectUniforms};

/// Immutable camera state for one frame.
#[derive(Debug, Clone, Copy)]
pub struct CameraSnapshot {
    pub view: Mat4,
    pub proj: Mat4,
    pub position: Vec3,
}

impl CameraSnapshot {
    pub fn view_proj(&self) -> Mat4 {
        self.proj * self.view
    }

    pub fn to_uniforms(&self) -> PerFrameUniforms {
        PerFrameUniforms {
            view: self.view.to_cols_array_2d(),
            proj: self.proj.to_cols_array_2d(),
            view_proj: self.view_proj().to_cols_array_2d(),
            view_pos: self.position.extend(1.0).to_array(),
        }
    }
}

/// Vertex range drawn with one material.
#[derive(Debug, Clone, Copy)]
pub struct Submesh {
    pub material_id: u32,
    pub start_vertex: u32,
    pub vertex_count: u32,
}

/// Non-indexed mesh with interleaved position/uv/normal vertices.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub vertex_count: u32,
    pub submeshes: Vec<Submesh>,
}

impl GpuMesh {
    /// Bytes per vertex: position vec3 + uv vec2 + normal vec3.
    pub const VERTEX_STRIDE: u64 = 32;

    /// Uploads interleaved vertex data. `data` length must be a multiple of
    /// 8 floats per vertex.
    pub fn from_vertices(
        device: &wgpu::Device,
        label: &str,
        data: &[f32],
        submeshes: Vec<Submesh>,
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(data),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            vertex_buffer,
            vertex_count: (data.len() / 8) as u32,
            submeshes,
        }
    }
}

/// One object placed in the scene. `mesh` keys into the mesh cache.
#[derive(Debug, Clone)]
pub struct Renderable {
    pub mesh: String,
    pub transform: Mat4,
    pub hidden: bool,
    /// Terrain gets back-face culling in the shadow passes instead of the
    /// front-face culling used for dynamic geometry.
    pub terrain: bool,
}

/// Sampled texture bundle.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

/// CPU-side material description.
pub struct Material {
    pub base_color: [f32; 4],
    pub shininess: f32,
    pub emissive: bool,
    pub color_map: Option<GpuTexture>,
}

impl Material {
    pub fn to_uniforms(&self) -> MaterialUniforms {
        MaterialUniforms {
            base_color: self.base_color,
            params: [
                self.shininess,
                if self.emissive { 1.0 } else { 0.0 },
                if self.color_map.is_some() { 1.0 } else { 0.0 },
                0.0,
            ],
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0, 1.0],
            shininess: 32.0,
            emissive: false,
            color_map: None,
        }
    }
}

/// Day and night variants of one material. Night falls back to day when
/// absent.
pub struct MaterialVariants {
    pub day: Material,
    pub night: Option<Material>,
}

/// Material lookup by id and active profile, with a fallback material for
/// ids no one registered.
pub struct MaterialTable {
    materials: HashMap<u32, MaterialVariants>,
    fallback: Material,
}

impl Default for MaterialTable {
    fn default() -> Self {
        Self {
            materials: HashMap::new(),
            fallback: Material::default(),
        }
    }
}

impl MaterialTable {
    pub fn insert(&mut self, id: u32, variants: MaterialVariants) {
        self.materials.insert(id, variants);
    }

    pub fn get(&self, is_day: bool, id: u32) -> &Material {
        match self.materials.get(&id) {
            Some(v) if is_day => &v.day,
            Some(v) => v.night.as_ref().unwrap_or(&v.day),
            None => &self.fallback,
        }
    }
}

/// Load state of one cached asset.
enum AssetState<T> {
    Loading,
    Ready(T),
}

/// Observable cache state for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Ready,
}

/// Keyed asset cache with explicit load states. Callers check the state
/// before kicking off a load; a key in `Loading` is never re-requested.
pub struct AssetCache<T> {
    entries: HashMap<String, AssetState<T>>,
}

impl<T> Default for AssetCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> AssetCache<T> {
    pub fn state(&self, key: &str) -> LoadState {
        match self.entries.get(key) {
            None => LoadState::Unloaded,
            Some(AssetState::Loading) => LoadState::Loading,
            Some(AssetState::Ready(_)) => LoadState::Ready,
        }
    }

    /// Marks `key` as loading. Returns false when a load is already in
    /// flight or finished, so duplicate requests collapse.
    pub fn begin_load(&mut self, key: &str) -> bool {
        if self.entries.contains_key(key) {
            return false;
        }
        self.entries.insert(key.to_owned(), AssetState::Loading);
        true
    }

    pub fn finish_load(&mut self, key: &str, value: T) {
        self.entries.insert(key.to_owned(), AssetState::Ready(value));
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        match self.entries.get(key) {
            Some(AssetState::Ready(value)) => Some(value),
            _ => None,
        }
    }
}

/// A renderable resolved against the mesh cache, ready to encode.
pub struct DrawItem<'a> {
    pub mesh: &'a GpuMesh,
    pub object: PerObjectUniforms,
    pub terrain: bool,
}

/// Resolves the frame's renderables. Hidden objects and objects whose mesh
/// is not `Ready` are skipped without failing the frame.
pub fn resolve_draw_list<'a>(
    meshes: &'a AssetCache<GpuMesh>,
    renderables: &[Renderable],
) -> Vec<DrawItem<'a>> {
    renderables
        .iter()
        .filter(|r| !r.hidden)
        .filter_map(|r| match meshes.get(&r.mesh) {
            Some(mesh) => Some(DrawItem {
                mesh,
                object: PerObjectUniforms::new(r.transform),
                terrain: r.terrain,
            }),
            None => {
                log::trace!("skipping renderable, mesh `{}` not ready", r.mesh);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_collapses_duplicate_loads() {
        let mut cache: AssetCache<u32> = AssetCache::default();
        assert_eq!(cache.state("tree"), LoadState::Unloaded);
        assert!(cache.begin_load("tree"));
        assert_eq!(cache.state("tree"), LoadState::Loading);
        assert!(!cache.begin_load("tree"));
        cache.finish_load("tree", 7);
        assert_eq!(cache.state("tree"), LoadState::Ready);
        assert!(!cache.begin_load("tree"));
        assert_eq!(cache.get("tree"), Some(&7));
        assert_eq!(cache.get("rock"), None);
    }

    #[test]
    fn unresolved_and_hidden_renderables_are_skipped() {
        let meshes: AssetCache<GpuMesh> = AssetCache::default();
        let renderables = vec![
            Renderable {
                mesh: "missing".into(),
                transform: Mat4::IDENTITY,
                hidden: false,
                terrain: false,
            },
            Renderable {
                mesh: "also-missing".into(),
                transform: Mat4::IDENTITY,
                hidden: true,
                terrain: false,
            },
        ];
        assert!(resolve_draw_list(&meshes, &renderables).is_empty());
    }

    #[test]
    fn material_lookup_falls_back() {
        let mut table = MaterialTable::default();
        table.insert(
            3,
            MaterialVariants {
                day: Material {
                    base_color: [0.2, 0.2, 0.2, 1.0],
                    ..Material::default()
                },
                night: Some(Material {
                    emissive: true,
                    ..Material::default()
                }),
            },
        );
        table.insert(
            4,
            MaterialVariants {
                day: Material::default(),
                night: None,
            },
        );

        assert!(!table.get(true, 3).emissive);
        assert!(table.get(false, 3).emissive);
        // Missing night variant falls back to day; unknown id to the default.
        assert_eq!(table.get(false, 4).base_color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(table.get(true, 99).shininess, 32.0);
    }

    #[test]
    fn camera_uniforms_compose_view_proj() {
        let cam = CameraSnapshot {
            view: Mat4::look_at_rh(Vec3::new(0.0, 2.0, 5.0), Vec3::ZERO, Vec3::Y),
            proj: Mat4::perspective_rh(1.0, 16.0 / 9.0, 0.1, 100.0),
            position: Vec3::new(0.0, 2.0, 5.0),
        };
        let u = cam.to_uniforms();
        let expected = (cam.proj * cam.view).to_cols_array_2d();
        assert_eq!(u.view_proj, expected);
        assert_eq!(u.view_pos[1], 2.0);
    }
}
