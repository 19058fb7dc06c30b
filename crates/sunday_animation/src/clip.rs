use rustc_hash::FxHashMap;
use sunday_core::{
    errors::{Result, SundayError},
    scene::{ImportedAnimation, ImportedScene},
};

use crate::bone::BoneInfoTable;
use crate::hierarchy::HierarchyNode;
use crate::track::BoneTrack;

/// Rate assumed for sources that do not state their ticks per second.
pub const DEFAULT_TICKS_PER_SECOND: f32 = 25.0;

/// One skeletal animation: a track per animated bone, the node tree the
/// tracks are composed through, and the bone table it was resolved against.
///
/// Read-only after loading. Shared between animators through `Arc`.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    name: String,
    duration: f32,
    ticks_per_second: f32,
    tracks: Vec<BoneTrack>,
    track_lookup: FxHashMap<String, usize>,
    root_node: HierarchyNode,
    bone_info: BoneInfoTable,
}

impl AnimationClip {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        duration: f32,
        ticks_per_second: f32,
        root_node: HierarchyNode,
        tracks: Vec<BoneTrack>,
        bone_info: BoneInfoTable,
    ) -> Self {
        let mut track_lookup = FxHashMap::default();
        for (index, track) in tracks.iter().enumerate() {
            // The first track for a name wins, like a front-to-back search.
            track_lookup.entry(track.name().to_string()).or_insert(index);
        }

        Self {
            name: name.into(),
            duration,
            ticks_per_second,
            tracks,
            track_lookup,
            root_node,
            bone_info,
        }
    }

    /// Builds clip `index` of `scene`.
    ///
    /// Channels targeting bones that `skeleton` does not know yet are given
    /// fresh ids there; the clip keeps its own copy of the extended table.
    pub fn load(scene: &ImportedScene, skeleton: &mut BoneInfoTable, index: usize) -> Result<Self> {
        Self::load_with_default_rate(scene, skeleton, index, DEFAULT_TICKS_PER_SECOND)
    }

    /// Like [`load`](Self::load), using `default_ticks_per_second` when the
    /// source does not specify a rate.
    pub fn load_with_default_rate(
        scene: &ImportedScene,
        skeleton: &mut BoneInfoTable,
        index: usize,
        default_ticks_per_second: f32,
    ) -> Result<Self> {
        let animation = scene
            .animations
            .get(index)
            .ok_or(SundayError::AnimationIndexOutOfBounds {
                index,
                count: scene.animations.len(),
            })?;

        let mut ticks_per_second = animation.ticks_per_second as f32;
        if ticks_per_second <= 0.0 {
            log::warn!(
                "Animation '{}' has no ticks per second, assuming {default_ticks_per_second}",
                animation.name
            );
            ticks_per_second = default_ticks_per_second;
        }

        let duration = animation.duration as f32;
        if duration <= 0.0 {
            log::warn!("Animation '{}' has a non-positive duration ({duration})", animation.name);
        }

        let root_node = HierarchyNode::from_imported(&scene.root);
        let tracks = read_missing_bones(animation, skeleton);

        log::debug!(
            "Loaded animation '{}': {} tracks, {} ticks at {} ticks/s",
            animation.name,
            tracks.len(),
            duration,
            ticks_per_second
        );

        Ok(Self::new(
            animation.name.clone(),
            duration,
            ticks_per_second,
            root_node,
            tracks,
            skeleton.clone(),
        ))
    }

    /// Builds every clip of `scene`, in source order.
    pub fn load_all(scene: &ImportedScene, skeleton: &mut BoneInfoTable) -> Result<Vec<Self>> {
        (0..scene.animations.len())
            .map(|index| Self::load(scene, skeleton, index))
            .collect()
    }

    /// The track animating `name`, if any. Nodes without a track are expected
    /// (static pivots) and keep their bind transform.
    #[must_use]
    pub fn find_bone(&self, name: &str) -> Option<&BoneTrack> {
        self.track_lookup.get(name).map(|&index| &self.tracks[index])
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Duration in ticks.
    #[inline]
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[inline]
    #[must_use]
    pub fn ticks_per_second(&self) -> f32 {
        self.ticks_per_second
    }

    /// Duration in seconds.
    #[must_use]
    pub fn duration_seconds(&self) -> f32 {
        self.duration / self.ticks_per_second
    }

    #[inline]
    #[must_use]
    pub fn root_node(&self) -> &HierarchyNode {
        &self.root_node
    }

    #[inline]
    #[must_use]
    pub fn bone_info_map(&self) -> &BoneInfoTable {
        &self.bone_info
    }

    #[must_use]
    pub fn tracks(&self) -> &[BoneTrack] {
        &self.tracks
    }
}

/// One track per channel, registering channel targets the skeleton lacks.
fn read_missing_bones(
    animation: &ImportedAnimation,
    skeleton: &mut BoneInfoTable,
) -> Vec<BoneTrack> {
    animation
        .channels
        .iter()
        .map(|channel| {
            let bone_name = channel.node_name.as_str();
            if !skeleton.contains(bone_name) {
                log::debug!(
                    "Animation '{}' drives '{bone_name}', which skins no vertex; registering it",
                    animation.name
                );
            }
            let id = skeleton.register_missing(bone_name);
            BoneTrack::new(bone_name, id, channel)
        })
        .collect()
}
