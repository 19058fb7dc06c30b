//! # Sunday
//!
//! Skeletal animation and skinned mesh pipeline.
//!
//! The engine is split into focused crates, re-exported here:
//!
//! - [`core`]: errors, matrix conventions and the imported scene format
//! - [`animation`]: bone tracks, clips and the per-instance animator
//! - [`resources`]: skinned vertices, meshes and materials
//! - [`assets`]: skinned model import, baking and the `.mesh` file format
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sunday::prelude::*;
//!
//! let scene = load_gltf_scene("character.glb")?;
//! let asset = bake_skinned_asset(&scene, "character", &SkinnedImportOptions::default())?;
//! write_mesh_file("character.mesh", &asset.data)?;
//!
//! let mut animator = Animator::with_clip(Arc::new(asset.clips[0].clone()));
//! animator.update_animation(1.0 / 60.0);
//! let matrices = animator.final_bone_matrices();
//! ```

pub use glam;
pub use sunday_core as core;

pub mod animation {
    pub use sunday_animation::*;
}

pub mod resources {
    pub use sunday_resources::*;
}

pub mod assets {
    pub use sunday_assets::*;
}

pub use sunday_core::{Result, SundayError};

pub mod prelude {
    pub use sunday_animation::{
        AnimationClip, Animator, AnimatorState, BoneInfo, BoneInfoTable, BoneMatrixSink, BoneTrack,
        HierarchyNode, MAX_BONES,
    };
    #[cfg(feature = "gltf")]
    pub use sunday_assets::load_gltf_scene;
    pub use sunday_assets::{
        InfluenceOrder, MeshFileVersion, SkeletonBuilder, SkinnedAsset, SkinnedImportOptions,
        bake_skinned_asset, import_skinned_model, read_mesh_file, write_mesh_file,
    };
    pub use sunday_core::scene::ImportedScene;
    pub use sunday_core::{Result, SundayError};
    pub use sunday_resources::{
        MAX_BONE_INFLUENCE, Material, SkinnedMesh, SkinnedMeshData, SkinnedVertex,
    };
}
