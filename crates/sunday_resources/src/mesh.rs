use std::sync::Arc;

use sunday_animation::BoneInfoTable;

use crate::material::Material;
use crate::vertex::SkinnedVertex;

/// One skinned submesh: vertices, triangle indices and its material.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkinnedMesh {
    pub name: String,
    pub vertices: Vec<SkinnedVertex>,
    pub indices: Vec<u32>,
    pub material: Option<Arc<Material>>,
}

impl SkinnedMesh {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        vertices: Vec<SkinnedVertex>,
        indices: Vec<u32>,
        material: Option<Arc<Material>>,
    ) -> Self {
        Self {
            name: name.into(),
            vertices,
            indices,
            material,
        }
    }

    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    #[must_use]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Vertex buffer contents.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index buffer contents (`u32` indices).
    #[must_use]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Everything persisted for a skinned model: submeshes, the bone table and
/// the number of animations that ship with it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkinnedMeshData {
    pub name: String,
    pub skinned_meshes: Vec<SkinnedMesh>,
    pub num_animations: u32,
    pub bone_info: BoneInfoTable,
}

impl SkinnedMeshData {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn has_animations(&self) -> bool {
        self.num_animations > 0
    }

    #[must_use]
    pub fn bone_count(&self) -> u32 {
        self.bone_info.bone_count()
    }

    #[must_use]
    pub fn total_vertex_count(&self) -> usize {
        self.skinned_meshes.iter().map(SkinnedMesh::vertex_count).sum()
    }
}
