//! Skeletal animation for the Sunday engine.
//!
//! Data flows leaves first:
//! - [`BoneTrack`]: keyframes of one bone, sampled into a local transform
//! - [`AnimationClip`]: all tracks of one animation plus the node tree they
//!   compose through
//! - [`Animator`]: per-instance playback state producing the skinning
//!   matrices the renderer uploads every frame

pub mod animator;
pub mod bone;
pub mod clip;
pub mod hierarchy;
pub mod track;
pub mod values;

pub use animator::{Animator, AnimatorState, BoneMatrixSink, bone_matrix_uniform_name};
pub use bone::{BoneInfo, BoneInfoTable, MAX_BONES};
pub use clip::{AnimationClip, DEFAULT_TICKS_PER_SECOND};
pub use hierarchy::HierarchyNode;
pub use track::{BoneTrack, KeyPosition, KeyRotation, KeyScale};
pub use values::{Interpolatable, Keyframe};
