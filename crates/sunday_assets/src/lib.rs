//! Asset pipeline of the Sunday engine.
//!
//! - [`skinned_model`]: imported scene to [`SkinnedMeshData`](sunday_resources::SkinnedMeshData)
//! - [`mesh_file`]: the binary `.mesh` format baked models are stored in
//! - [`loaders`]: file front ends (glTF behind the `gltf` feature)

pub mod loaders;
pub mod mesh_file;
pub mod options;
pub mod skinned_model;

pub use mesh_file::{
    MESH_FILE_EXTENSION, MeshFileVersion, read_mesh_file, read_skinned_mesh, write_mesh_file,
    write_mesh_file_with_version, write_skinned_mesh,
};
pub use options::{InfluenceOrder, SkinnedImportOptions};
pub use skinned_model::{SkeletonBuilder, SkinnedAsset, bake_skinned_asset, import_skinned_model};

#[cfg(feature = "gltf")]
pub use loaders::load_gltf_scene;
