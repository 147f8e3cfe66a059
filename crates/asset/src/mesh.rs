//! CPU-side mesh and material records produced by the parsers.

use crate::texture::TextureHandle;

/// Interleaved vertex ready for GPU upload. Values are in object space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// MTL `illum` value. Kept as the raw integer; the viewer only shades one way.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct IlluminationModel(pub i32);

impl IlluminationModel {
    /// Color on, ambient off.
    pub const COLOR: Self = Self(0);
    pub const HIGHLIGHT: Self = Self(2);
}

/// One `newmtl` block of a material library.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
    /// Written by both `d` and `Tr`; no dissolve/transparency distinction.
    pub transparency: f32,
    pub illum: IlluminationModel,
    pub diffuse_map: Option<String>,
    pub normal_map: Option<String>,
    pub specular_map: Option<String>,
}

impl Material {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            ambient: [0.0; 3],
            diffuse: [1.0; 3],
            specular: [0.0; 3],
            shininess: 0.0,
            transparency: 1.0,
            illum: IlluminationModel::COLOR,
            diffuse_map: None,
            normal_map: None,
            specular_map: None,
        }
    }
}

/// Flattened, non-deduplicated mesh: every face-vertex occurrence is its own
/// emitted vertex and `indices` is always `0..n`.
///
/// `texcoords`/`normals` are parallel to `positions` only when the parse used
/// [`AttributePolicy::ZeroFill`](crate::obj::AttributePolicy::ZeroFill) or when
/// every face referenced valid attributes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub material_lib: Option<String>,
    pub active_material: Option<String>,
    pub material: Material,
    pub diffuse_tex: TextureHandle,
}

impl Mesh {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of emitted vertices (one per face-vertex token).
    pub fn vertex_count(&self) -> usize {
        self.indices.len()
    }

    /// `true` when every emitted stream has one entry per index.
    pub fn has_parallel_streams(&self) -> bool {
        let n = self.indices.len();
        self.positions.len() == n && self.texcoords.len() == n && self.normals.len() == n
    }

    /// Interleave the streams for upload.
    ///
    /// A stream whose length differs from `positions` cannot be matched up
    /// per vertex, so it is replaced by zeros for the whole mesh.
    pub fn vertices(&self) -> Vec<MeshVertex> {
        let n = self.positions.len();
        let use_uv = self.texcoords.len() == n;
        let use_normal = self.normals.len() == n;
        if !use_uv && !self.texcoords.is_empty() {
            log::warn!(
                "texcoord stream length {} != position count {}; uploading zero UVs",
                self.texcoords.len(),
                n
            );
        }
        if !use_normal && !self.normals.is_empty() {
            log::warn!(
                "normal stream length {} != position count {}; uploading zero normals",
                self.normals.len(),
                n
            );
        }

        self.positions
            .iter()
            .enumerate()
            .map(|(i, &position)| {
                let normal = if use_normal { self.normals[i] } else { [0.0; 3] };
                let uv = if use_uv { self.texcoords[i] } else { [0.0; 2] };
                MeshVertex::new(position, normal, uv)
            })
            .collect()
    }
}
