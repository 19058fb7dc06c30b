//! CPU-side mesh and material data of the Sunday engine.

pub mod material;
pub mod mesh;
pub mod vertex;

pub use material::{Material, MaterialData, MaterialParam, ParameterType};
pub use mesh::{SkinnedMesh, SkinnedMeshData};
pub use vertex::{MAX_BONE_INFLUENCE, NO_BONE, SkinnedVertex};
