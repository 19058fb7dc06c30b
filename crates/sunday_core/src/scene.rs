//! Imported scene description.
//!
//! This is the hand-off format between a file importer (glTF adapter, or any
//! other front end) and the skinning pipeline. It mirrors what a scene import
//! library reports: a node tree, meshes with per-bone weight lists, animation
//! channels with raw keyframes and materials with texture paths.
//!
//! Matrices are row-major ([`RowMajorMatrix`]); the pipeline transposes them
//! on the way in.

use glam::{Quat, Vec2, Vec3};

use crate::math::{ROW_MAJOR_IDENTITY, RowMajorMatrix};

/// A whole imported file.
#[derive(Debug, Clone)]
pub struct ImportedScene {
    pub root: ImportedNode,
    pub meshes: Vec<ImportedMesh>,
    pub materials: Vec<ImportedMaterial>,
    pub animations: Vec<ImportedAnimation>,
}

impl ImportedScene {
    #[must_use]
    pub fn new(root: ImportedNode) -> Self {
        Self {
            root,
            meshes: Vec::new(),
            materials: Vec::new(),
            animations: Vec::new(),
        }
    }

    #[must_use]
    pub fn has_animations(&self) -> bool {
        !self.animations.is_empty()
    }
}

/// One node of the imported hierarchy. Bones and plain pivot nodes alike.
#[derive(Debug, Clone)]
pub struct ImportedNode {
    pub name: String,
    /// Local transform relative to the parent node.
    pub transformation: RowMajorMatrix,
    /// Indices into [`ImportedScene::meshes`].
    pub meshes: Vec<usize>,
    pub children: Vec<ImportedNode>,
}

impl ImportedNode {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transformation: ROW_MAJOR_IDENTITY,
            meshes: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_transformation(mut self, transformation: RowMajorMatrix) -> Self {
        self.transformation = transformation;
        self
    }

    #[must_use]
    pub fn with_meshes(mut self, meshes: Vec<usize>) -> Self {
        self.meshes = meshes;
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: ImportedNode) -> Self {
        self.children.push(child);
        self
    }
}

/// A triangle mesh with optional vertex attributes.
///
/// Attribute arrays are either empty (attribute absent) or as long as
/// `positions`.
#[derive(Debug, Clone, Default)]
pub struct ImportedMesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tangents: Vec<Vec3>,
    pub bitangents: Vec<Vec3>,
    /// First UV set only.
    pub tex_coords: Vec<Vec2>,
    /// Polygon index lists, usually triangles after triangulation.
    pub faces: Vec<Vec<u32>>,
    pub bones: Vec<ImportedBone>,
    pub material_index: Option<usize>,
}

/// A bone as seen from one mesh: its inverse bind matrix and the vertices it
/// moves.
#[derive(Debug, Clone)]
pub struct ImportedBone {
    pub name: String,
    /// Model space to bone space, row-major.
    pub offset_matrix: RowMajorMatrix,
    pub weights: Vec<VertexWeight>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexWeight {
    pub vertex_id: u32,
    pub weight: f32,
}

/// Texture references of an imported material. Empty strings mean "no texture".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedMaterial {
    pub name: String,
    pub albedo: String,
    pub normal: String,
    pub metallic: String,
    pub roughness: String,
    pub ao: String,
}

/// One animation as reported by the importer.
#[derive(Debug, Clone)]
pub struct ImportedAnimation {
    pub name: String,
    /// Duration in ticks.
    pub duration: f64,
    /// Zero when the source file does not specify it.
    pub ticks_per_second: f64,
    pub channels: Vec<ImportedChannel>,
}

/// Keyframes driving a single node.
#[derive(Debug, Clone, Default)]
pub struct ImportedChannel {
    pub node_name: String,
    pub position_keys: Vec<VectorKey>,
    pub rotation_keys: Vec<QuatKey>,
    pub scaling_keys: Vec<VectorKey>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorKey {
    pub time: f64,
    pub value: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuatKey {
    pub time: f64,
    pub value: Quat,
}
