use std::sync::Arc;

use glam::Mat4;

use crate::bone::MAX_BONES;
use crate::clip::AnimationClip;
use crate::hierarchy::HierarchyNode;

/// Receives the per-frame bone matrices, e.g. a shader uniform upload.
pub trait BoneMatrixSink {
    fn upload_bone_matrices(&mut self, matrices: &[Mat4]);
}

/// Name of the `index`-th element of the skinning shader's bone array.
#[must_use]
pub fn bone_matrix_uniform_name(index: usize) -> String {
    format!("finalBonesMatrices[{index}]")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorState {
    /// No clip assigned; updates do nothing.
    Idle,
    /// A clip is assigned and loops.
    Playing,
}

/// Playback cursor over a shared [`AnimationClip`].
///
/// Owns everything that changes per frame: the current time, the local pose
/// of every bone and the final skinning matrices. The clip itself is never
/// written to.
#[derive(Debug, Clone)]
pub struct Animator {
    current_clip: Option<Arc<AnimationClip>>,
    /// Playback position in ticks, always in `[0, duration)`.
    current_time: f32,
    final_bone_matrices: Vec<Mat4>,
    /// Last sampled local transform per bone id.
    local_poses: Vec<Mat4>,
}

impl Default for Animator {
    fn default() -> Self {
        Self::new()
    }
}

impl Animator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            current_clip: None,
            current_time: 0.0,
            final_bone_matrices: vec![Mat4::IDENTITY; MAX_BONES],
            local_poses: vec![Mat4::IDENTITY; MAX_BONES],
        }
    }

    #[must_use]
    pub fn with_clip(clip: Arc<AnimationClip>) -> Self {
        let mut animator = Self::new();
        animator.play_animation(clip);
        animator
    }

    /// Switches to `clip` and rewinds. No blending with the previous clip.
    pub fn play_animation(&mut self, clip: Arc<AnimationClip>) {
        self.ensure_bone_capacity(clip.bone_info_map().bone_count() as usize);
        self.current_clip = Some(clip);
        self.current_time = 0.0;
    }

    /// Advances playback by `dt` seconds, wrapping at the end of the clip, and
    /// recomputes the bone matrices.
    pub fn update_animation(&mut self, dt: f32) {
        let Some(clip) = self.current_clip.clone() else {
            return;
        };

        let advanced = self.current_time + clip.ticks_per_second() * dt;
        self.current_time = wrap_time(advanced, clip.duration());
        self.calculate_bone_transform(clip.root_node(), Mat4::IDENTITY);
    }

    /// Composes `node` and its subtree under `parent_transform`, writing the
    /// skinning matrix of every bone it meets.
    pub fn calculate_bone_transform(&mut self, node: &HierarchyNode, parent_transform: Mat4) {
        let Some(clip) = self.current_clip.clone() else {
            return;
        };

        compose_node(
            &clip,
            node,
            parent_transform,
            self.current_time,
            &mut self.final_bone_matrices,
            &mut self.local_poses,
        );
    }

    /// Skinning matrices indexed by bone id.
    #[inline]
    #[must_use]
    pub fn final_bone_matrices(&self) -> &[Mat4] {
        &self.final_bone_matrices
    }

    /// Raw bytes of [`final_bone_matrices`](Self::final_bone_matrices), ready
    /// for a uniform or storage buffer write.
    #[must_use]
    pub fn final_bone_matrices_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.final_bone_matrices)
    }

    /// Hands the current matrices to a renderer.
    pub fn submit<S: BoneMatrixSink + ?Sized>(&self, sink: &mut S) {
        sink.upload_bone_matrices(&self.final_bone_matrices);
    }

    /// Local transform sampled for `bone_id` during the last update.
    #[must_use]
    pub fn local_pose(&self, bone_id: u32) -> Option<Mat4> {
        self.local_poses.get(bone_id as usize).copied()
    }

    /// Playback position in ticks.
    #[inline]
    #[must_use]
    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    #[must_use]
    pub fn current_clip(&self) -> Option<&Arc<AnimationClip>> {
        self.current_clip.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> AnimatorState {
        if self.current_clip.is_some() {
            AnimatorState::Playing
        } else {
            AnimatorState::Idle
        }
    }

    fn ensure_bone_capacity(&mut self, bone_count: usize) {
        if bone_count > self.final_bone_matrices.len() {
            log::debug!(
                "Growing bone matrix array from {} to {bone_count}",
                self.final_bone_matrices.len()
            );
            self.final_bone_matrices.resize(bone_count, Mat4::IDENTITY);
            self.local_poses.resize(bone_count, Mat4::IDENTITY);
        }
    }
}

/// Loops `time` into `[0, duration)`. A clip without length stays at 0.
fn wrap_time(time: f32, duration: f32) -> f32 {
    if duration <= 0.0 || !time.is_finite() {
        return 0.0;
    }
    let wrapped = time.rem_euclid(duration);
    // rem_euclid can round up to `duration` for tiny negative inputs.
    if wrapped >= duration { 0.0 } else { wrapped }
}

/// Pre-order walk: a parent's global transform is final before any child
/// reads it.
fn compose_node(
    clip: &AnimationClip,
    node: &HierarchyNode,
    parent_transform: Mat4,
    time: f32,
    final_bone_matrices: &mut [Mat4],
    local_poses: &mut [Mat4],
) {
    let node_transform = match clip.find_bone(&node.name) {
        Some(track) => {
            let local = track.local_transform(time);
            if let Some(slot) = local_poses.get_mut(track.id() as usize) {
                *slot = local;
            }
            local
        }
        None => node.transformation,
    };

    let global_transform = parent_transform * node_transform;

    if let Some(info) = clip.bone_info_map().get(&node.name)
        && let Some(slot) = final_bone_matrices.get_mut(info.id as usize)
    {
        *slot = global_transform * info.offset;
    }

    for child in &node.children {
        compose_node(clip, child, global_transform, time, final_bone_matrices, local_poses);
    }
}
