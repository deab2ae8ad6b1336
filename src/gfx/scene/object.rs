//! # Transformable objects
//!
//! An [`Object`] owns its meshes, a bounding box computed once from their
//! vertices, and a transform rebuilt from identity every frame it is shown.
//!
//! Each of [`Object::rotate`], [`Object::scale`] and [`Object::translate`]
//! right-multiplies the accumulated matrix. After `reset_transforms`, calling
//! rotate, scale and translate in that order yields `R * S * T`: vertices are
//! translated first, then scaled, then rotated.

use cgmath::{Deg, InnerSpace, Matrix, Matrix4, SquareMatrix, Vector3};
use wgpu::util::DeviceExt;

use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

use super::bounding_box::BoundingBox;
use super::vertex::Vertex3D;

/// Rotation axes shorter than this leave the transform untouched.
const MIN_AXIS_LENGTH: f32 = 1.0e-6;

#[derive(Debug)]
pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            vertex_buffer: None,
            index_buffer: None,
        }
    }

    /// Interleaves flat attribute arrays. Missing texture coordinates become
    /// zero.
    pub fn from_arrays(
        positions: &[f32],
        normals: &[f32],
        tex_coords: &[f32],
        indices: Vec<u32>,
    ) -> Self {
        let vertices = (0..positions.len() / 3)
            .map(|i| Vertex3D {
                position: [positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]],
                normal: [normals[i * 3], normals[i * 3 + 1], normals[i * 3 + 2]],
                tex_coords: if tex_coords.len() >= (i + 1) * 2 {
                    [tex_coords[i * 2], tex_coords[i * 2 + 1]]
                } else {
                    [0.0, 0.0]
                },
            })
            .collect();
        Self::new(vertices, indices)
    }

    /// Area-weighted vertex normals for meshes imported without any.
    pub fn calculate_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
        let mut normals = vec![Vector3::new(0.0f32, 0.0, 0.0); positions.len() / 3];
        let position = |i: usize| {
            Vector3::new(positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2])
        };

        for triangle in indices.chunks_exact(3) {
            let [i0, i1, i2] = [
                triangle[0] as usize,
                triangle[1] as usize,
                triangle[2] as usize,
            ];
            let face = (position(i1) - position(i0)).cross(position(i2) - position(i0));
            for i in [i0, i1, i2] {
                normals[i] += face;
            }
        }

        normals
            .into_iter()
            .flat_map(|n| {
                let n = if n.magnitude2() > 0.0 { n.normalize() } else { n };
                [n.x, n.y, n.z]
            })
            .collect()
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.vertices.iter().map(|v| v.position))
    }

    fn upload(&mut self, device: &wgpu::Device, label: &str) {
        self.vertex_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.index_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }

    fn release(&mut self) {
        if let Some(buffer) = self.vertex_buffer.take() {
            buffer.destroy();
        }
        if let Some(buffer) = self.index_buffer.take() {
            buffer.destroy();
        }
    }
}

/// Per-object uniform block. MUST match `ObjectUniforms` in `ltc.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of `model`, for normals.
    pub normal: [[f32; 4]; 4],
}

impl TransformUniform {
    pub fn from_matrix(model: Matrix4<f32>) -> Self {
        let normal = model
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix4::identity);
        Self {
            model: model.into(),
            normal: normal.into(),
        }
    }
}

type TransformUBO = UniformBuffer<TransformUniform>;

/// Layout of the per-object bind group: one uniform buffer at binding 0.
pub fn transform_bind_group_layout(device: &wgpu::Device) -> BindGroupLayoutWithDesc {
    BindGroupLayoutBuilder::new()
        .next_binding_rendering(binding_types::uniform())
        .create(device, "Object Transform Bind Group Layout")
}

#[derive(Debug)]
struct ObjectGpuResources {
    transform_buffer: TransformUBO,
    transform_bind_group: wgpu::BindGroup,
}

#[derive(Debug)]
pub struct Object {
    name: String,
    meshes: Vec<Mesh>,
    bounding_box: BoundingBox,
    transform: Matrix4<f32>,
    gpu_resources: Option<ObjectGpuResources>,
}

impl Object {
    pub fn new(name: impl Into<String>, meshes: Vec<Mesh>, bounding_box: BoundingBox) -> Self {
        Self {
            name: name.into(),
            meshes,
            bounding_box,
            transform: Matrix4::identity(),
            gpu_resources: None,
        }
    }

    /// Builds an object whose bounding box encloses every mesh vertex.
    /// Returns `None` when the meshes hold no vertices.
    pub fn from_meshes(name: impl Into<String>, meshes: Vec<Mesh>) -> Option<Self> {
        let bounding_box = meshes
            .iter()
            .filter_map(Mesh::bounding_box)
            .reduce(|a, b| a.union(&b))?;
        Some(Self::new(name, meshes, bounding_box))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Model-space bounds, fixed at construction.
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    pub fn transform(&self) -> Matrix4<f32> {
        self.transform
    }

    /// Restores the identity transform.
    pub fn reset_transforms(&mut self) {
        self.transform = Matrix4::identity();
    }

    /// Rotates by `angle_degrees` around the axis `(x, y, z)`. A zero axis
    /// leaves the transform unchanged.
    pub fn rotate(&mut self, x: f32, y: f32, z: f32, angle_degrees: f32) {
        let axis = Vector3::new(x, y, z);
        if axis.magnitude() < MIN_AXIS_LENGTH {
            log::debug!("Ignoring rotation of {} around a zero axis", self.name);
            return;
        }
        self.transform =
            self.transform * Matrix4::from_axis_angle(axis.normalize(), Deg(angle_degrees));
    }

    pub fn scale(&mut self, sx: f32, sy: f32, sz: f32) {
        self.transform = self.transform * Matrix4::from_nonuniform_scale(sx, sy, sz);
    }

    pub fn translate(&mut self, tx: f32, ty: f32, tz: f32) {
        self.transform = self.transform * Matrix4::from_translation(Vector3::new(tx, ty, tz));
    }

    /// Uploads mesh buffers and creates the transform uniform and bind group.
    pub fn init_gpu_resources(&mut self, device: &wgpu::Device, layout: &BindGroupLayoutWithDesc) {
        for mesh in &mut self.meshes {
            mesh.upload(device, &self.name);
        }

        let transform_buffer =
            TransformUBO::new_with_data(device, &TransformUniform::from_matrix(self.transform));
        let transform_bind_group = BindGroupBuilder::new(layout)
            .resource(transform_buffer.binding_resource())
            .create(device, &format!("{} Transform Bind Group", self.name));

        log::debug!(
            "Uploaded {} ({} meshes, {} vertices)",
            self.name,
            self.meshes.len(),
            self.meshes.iter().map(|m| m.vertices.len()).sum::<usize>()
        );

        self.gpu_resources = Some(ObjectGpuResources {
            transform_buffer,
            transform_bind_group,
        });
    }

    /// Syncs the current transform to the GPU if resources exist.
    pub fn update_transform(&mut self, queue: &wgpu::Queue) {
        if let Some(gpu) = &mut self.gpu_resources {
            gpu.transform_buffer
                .update_content(queue, TransformUniform::from_matrix(self.transform));
        }
    }

    pub fn transform_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu_resources.as_ref().map(|gpu| &gpu.transform_bind_group)
    }

    /// Destroys mesh and uniform buffers.
    pub fn release_gpu_resources(&mut self) {
        for mesh in &mut self.meshes {
            mesh.release();
        }
        if let Some(gpu) = self.gpu_resources.take() {
            gpu.transform_buffer.buffer().destroy();
        }
    }
}

pub trait DrawObject {
    fn draw_mesh(&mut self, mesh: &Mesh);
    fn draw_object(&mut self, object: &Object);
}

impl DrawObject for wgpu::RenderPass<'_> {
    fn draw_mesh(&mut self, mesh: &Mesh) {
        let (Some(vertex_buffer), Some(index_buffer)) = (&mesh.vertex_buffer, &mesh.index_buffer)
        else {
            return; // not uploaded
        };

        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.indices.len() as u32, 0, 0..1);
    }

    fn draw_object(&mut self, object: &Object) {
        for mesh in &object.meshes {
            self.draw_mesh(mesh);
        }
    }
}
