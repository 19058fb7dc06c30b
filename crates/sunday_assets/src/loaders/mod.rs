//! File format front ends producing an [`ImportedScene`](sunday_core::scene::ImportedScene).

#[cfg(feature = "gltf")]
pub mod gltf;

#[cfg(feature = "gltf")]
pub use self::gltf::{ROOT_NODE_NAME, load_gltf_scene};
