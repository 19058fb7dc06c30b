use std::collections::BTreeMap;

use glam::Mat4;

/// Length of the bone matrix uniform array in the skinning shader.
pub const MAX_BONES: usize = 100;

/// Skinning data of one named bone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneInfo {
    /// Index into the final bone matrix array.
    pub id: u32,
    /// Inverse bind pose: model space to bone space.
    pub offset: Mat4,
}

/// Name to [`BoneInfo`] table of a skeleton.
///
/// Ids are handed out densely in first-seen order, so after any sequence of
/// [`register`](Self::register) calls the ids are exactly `[0, bone_count)`.
/// Ordered by name so that serialized output is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoneInfoTable {
    bones: BTreeMap<String, BoneInfo>,
    bone_count: u32,
}

impl BoneInfoTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a table from stored entries, e.g. when reading a mesh file.
    ///
    /// `bone_count` is taken as stored; entries whose id does not fit are kept
    /// but reported.
    #[must_use]
    pub fn from_parts(bones: BTreeMap<String, BoneInfo>, bone_count: u32) -> Self {
        for (name, info) in &bones {
            if info.id >= bone_count {
                log::warn!(
                    "Bone '{name}' has id {} but the skeleton declares {bone_count} bones",
                    info.id
                );
            }
        }
        Self { bones, bone_count }
    }

    /// Returns the id of `name`, inserting it with `offset` and the next free
    /// id when it is not known yet. An existing entry keeps its offset.
    pub fn register(&mut self, name: &str, offset: Mat4) -> u32 {
        if let Some(info) = self.bones.get(name) {
            return info.id;
        }

        let id = self.bone_count;
        self.bones.insert(name.to_string(), BoneInfo { id, offset });
        self.bone_count += 1;
        id
    }

    /// Registers a bone that only an animation knows about. It never skins a
    /// vertex, so its offset is identity.
    pub fn register_missing(&mut self, name: &str) -> u32 {
        self.register(name, Mat4::IDENTITY)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BoneInfo> {
        self.bones.get(name)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.bones.contains_key(name)
    }

    #[inline]
    #[must_use]
    pub fn bone_count(&self) -> u32 {
        self.bone_count
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoneInfo)> {
        self.bones.iter().map(|(name, info)| (name.as_str(), info))
    }

    #[must_use]
    pub fn as_map(&self) -> &BTreeMap<String, BoneInfo> {
        &self.bones
    }

    /// True when the ids are unique and cover `[0, bone_count)` exactly.
    #[must_use]
    pub fn ids_are_dense(&self) -> bool {
        if self.bones.len() != self.bone_count as usize {
            return false;
        }
        let mut seen = vec![false; self.bones.len()];
        for info in self.bones.values() {
            match seen.get_mut(info.id as usize) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        true
    }
}
