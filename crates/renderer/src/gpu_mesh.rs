//! Mesh upload: interleaved vertex buffer, u32 index buffer, material bind group.

use anyhow::{Result, bail};
use asset::{Material, Mesh, MeshVertex};
use bytemuck::{Pod, Zeroable};
use wgpu::{
    BindGroup, BindGroupLayout, Buffer, BufferUsages, Device, Sampler, TextureView,
    VertexBufferLayout, VertexStepMode, util::DeviceExt,
};

/// Vertex: position + normal + uv.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuVertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl GpuVertex {
    pub const LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
        array_stride: std::mem::size_of::<GpuVertex>() as u64,
        step_mode: VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2],
    };
}

impl From<MeshVertex> for GpuVertex {
    fn from(v: MeshVertex) -> Self {
        Self {
            pos: v.position,
            normal: v.normal,
            uv: v.uv,
        }
    }
}

/// Material UBO (matches `Material` in mesh.wgsl).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct MaterialUniform {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
}

impl From<&Material> for MaterialUniform {
    fn from(m: &Material) -> Self {
        let [ar, ag, ab] = m.ambient;
        let [dr, dg, db] = m.diffuse;
        Self {
            ambient: [ar, ag, ab, 1.0],
            diffuse: [dr, dg, db, m.transparency.clamp(0.0, 1.0)],
        }
    }
}

pub struct GpuMesh {
    pub(crate) vertex_buf: Buffer,
    pub(crate) index_buf: Buffer,
    pub(crate) index_count: u32,
    pub(crate) material_bg: BindGroup,
}

/// Vertex and index data exactly as uploaded.
///
/// Emitted vertices are matched to indices by position. If the parser dropped
/// any position reference the two no longer line up, so nothing is returned
/// and the mesh is not drawn.
pub fn build_buffers(mesh: &Mesh) -> (Vec<GpuVertex>, Vec<u32>) {
    if mesh.positions.len() != mesh.indices.len() {
        log::warn!(
            "{} of {} face vertices reference missing positions; mesh skipped",
            mesh.indices.len().abs_diff(mesh.positions.len()),
            mesh.indices.len()
        );
        return (Vec::new(), Vec::new());
    }
    let vertices: Vec<GpuVertex> = mesh.vertices().into_iter().map(GpuVertex::from).collect();
    let indices = mesh.indices.clone();
    if indices.len() % 3 != 0 {
        log::warn!(
            "index count {} is not a multiple of 3; non-triangle faces will draw incorrectly",
            indices.len()
        );
    }
    (vertices, indices)
}

impl GpuMesh {
    pub fn upload(
        device: &Device,
        material_bgl: &BindGroupLayout,
        mesh: &Mesh,
        diffuse_view: &TextureView,
        sampler: &Sampler,
    ) -> Result<Self> {
        let (vertices, indices) = build_buffers(mesh);
        if vertices.is_empty() || indices.is_empty() {
            bail!("mesh has nothing to draw");
        }

        let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh VB"),
            contents: bytemuck::cast_slice(&vertices),
            usage: BufferUsages::VERTEX,
        });
        let index_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh IB"),
            contents: bytemuck::cast_slice(&indices),
            usage: BufferUsages::INDEX,
        });

        let material = MaterialUniform::from(&mesh.material);
        let material_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material UBO"),
            contents: bytemuck::bytes_of(&material),
            usage: BufferUsages::UNIFORM,
        });
        let material_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material BG"),
            layout: material_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: material_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(diffuse_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        Ok(Self {
            vertex_buf,
            index_buf,
            index_count: indices.len() as u32,
            material_bg,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<GpuVertex>(), 32);
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 32);
    }

    #[test]
    fn dropped_position_skips_the_mesh() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\nf 9 1 2\nf 1 2 3\n";
        let mesh = asset::obj::parse_obj_str(src, &asset::ObjOptions::zero_fill()).expect("parse");
        assert_eq!((mesh.positions.len(), mesh.indices.len()), (8, 9));

        let (vertices, indices) = build_buffers(&mesh);
        assert!(vertices.is_empty());
        assert!(indices.is_empty());
    }

    #[test]
    fn complete_mesh_uploads_every_vertex() {
        let mesh = asset::obj::parse_obj_str(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
            &asset::ObjOptions::zero_fill(),
        )
        .expect("parse");
        let (vertices, indices) = build_buffers(&mesh);
        assert_eq!(vertices.len(), 3);
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn material_uniform_carries_transparency() {
        let m = Material {
            transparency: 0.5,
            diffuse: [0.2, 0.4, 0.6],
            ..Material::default()
        };
        let u = MaterialUniform::from(&m);
        assert_eq!(u.diffuse, [0.2, 0.4, 0.6, 0.5]);
    }
}
