use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Bones that may influence a single vertex.
pub const MAX_BONE_INFLUENCE: usize = 4;

/// Marks an influence slot as unused.
pub const NO_BONE: i32 = -1;

/// Vertex layout of skinned meshes, shared by the GPU buffer and the mesh
/// file.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SkinnedVertex {
    pub position: Vec3,
    pub tex_coords: Vec2,
    pub normal: Vec3,
    pub tangent: Vec3,
    pub bitangent: Vec3,
    /// [`NO_BONE`] in unused slots.
    pub bone_ids: [i32; MAX_BONE_INFLUENCE],
    /// Zero in unused slots. Not renormalized.
    pub weights: [f32; MAX_BONE_INFLUENCE],
}

impl SkinnedVertex {
    /// Size of one vertex in bytes.
    pub const SIZE: usize = std::mem::size_of::<SkinnedVertex>();

    /// A vertex at the origin with no bone influences.
    #[must_use]
    pub fn new() -> Self {
        let mut vertex = Self::zeroed();
        vertex.set_bone_data_to_default();
        vertex
    }

    /// Clears every influence slot.
    pub fn set_bone_data_to_default(&mut self) {
        self.bone_ids = [NO_BONE; MAX_BONE_INFLUENCE];
        self.weights = [0.0; MAX_BONE_INFLUENCE];
    }

    /// Writes `(bone_id, weight)` into the first free slot.
    ///
    /// Nothing happens when `weight` is zero, when `bone_id` already occupies
    /// a slot, or when all slots are taken. Returns whether the influence was
    /// stored.
    pub fn set_bone_data(&mut self, bone_id: i32, weight: f32) -> bool {
        if weight == 0.0 || self.bone_ids.contains(&bone_id) {
            return false;
        }

        match self.bone_ids.iter().position(|&id| id < 0) {
            Some(slot) => {
                self.bone_ids[slot] = bone_id;
                self.weights[slot] = weight;
                true
            }
            None => false,
        }
    }

    /// Number of occupied influence slots.
    #[must_use]
    pub fn influence_count(&self) -> usize {
        self.bone_ids.iter().filter(|&&id| id != NO_BONE).count()
    }

    #[must_use]
    pub fn weight_sum(&self) -> f32 {
        self.weights.iter().sum()
    }
}

impl Default for SkinnedVertex {
    fn default() -> Self {
        Self::new()
    }
}
