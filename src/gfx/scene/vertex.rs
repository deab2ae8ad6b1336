//! # Vertex Data Structures
//!
//! GPU vertex format shared by every imported mesh.

/// A mesh vertex with position, normal and texture coordinates.
///
/// The `#[repr(C)]` layout is uploaded as-is; [`Vertex3D::desc`] describes it
/// to the pipeline.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    /// Model-space position [x, y, z]
    pub position: [f32; 3],
    /// Model-space normal [nx, ny, nz]
    pub normal: [f32; 3],
    /// Texture coordinates with the origin at the top-left
    pub tex_coords: [f32; 2],
}

impl Vertex3D {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    /// Vertex buffer layout:
    /// - location 0: position (Float32x3)
    /// - location 1: normal (Float32x3)
    /// - location 2: texture coordinates (Float32x2)
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex3D>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout() {
        assert_eq!(std::mem::size_of::<Vertex3D>(), 32);
        let desc = Vertex3D::desc();
        assert_eq!(desc.array_stride, 32);
        assert_eq!(desc.attributes[1].offset, 12);
        assert_eq!(desc.attributes[2].offset, 24);
        assert_eq!(desc.attributes[2].shader_location, 2);
    }
}
