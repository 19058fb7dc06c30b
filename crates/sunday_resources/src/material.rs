use glam::Vec3;

/// Texture / parameter slot of a PBR material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterType {
    Albedo = 0,
    Normal,
    Metallic,
    Roughness,
    Ao,
}

impl ParameterType {
    pub const COUNT: usize = 5;

    /// Slot order used by the mesh file.
    pub const ALL: [ParameterType; Self::COUNT] = [
        ParameterType::Albedo,
        ParameterType::Normal,
        ParameterType::Metallic,
        ParameterType::Roughness,
        ParameterType::Ao,
    ];

    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Scalar material parameters used when a slot has no texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialData {
    pub albedo: Vec3,
    pub ao: f32,
    pub normal: Vec3,
    pub metallic: f32,
    pub roughness: f32,
    pub emissive: f32,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            albedo: Vec3::ZERO,
            ao: 1.0,
            normal: Vec3::ZERO,
            metallic: 0.0,
            roughness: 0.9,
            emissive: 1.0,
        }
    }
}

/// A value for one [`ParameterType`] slot. The variant fixes the type, so a
/// roughness can never be set from a vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialParam {
    Albedo(Vec3),
    Normal(Vec3),
    Metallic(f32),
    Roughness(f32),
    Ao(f32),
}

impl MaterialParam {
    #[must_use]
    pub fn parameter_type(&self) -> ParameterType {
        match self {
            MaterialParam::Albedo(_) => ParameterType::Albedo,
            MaterialParam::Normal(_) => ParameterType::Normal,
            MaterialParam::Metallic(_) => ParameterType::Metallic,
            MaterialParam::Roughness(_) => ParameterType::Roughness,
            MaterialParam::Ao(_) => ParameterType::Ao,
        }
    }
}

/// A material as referenced by a skinned mesh: a name and one texture path
/// per slot (empty when the slot is untextured).
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    /// Created by an importer rather than authored.
    pub is_default: bool,
    pub use_normal_map: bool,
    data: MaterialData,
    texture_paths: [String; ParameterType::COUNT],
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            is_default: false,
            use_normal_map: true,
            data: MaterialData::default(),
            texture_paths: Default::default(),
        }
    }
}

impl Material {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// A material whose slots are textured from `paths`, in
    /// [`ParameterType::ALL`] order.
    #[must_use]
    pub fn from_texture_paths(
        name: impl Into<String>,
        paths: [String; ParameterType::COUNT],
    ) -> Self {
        Self {
            name: name.into(),
            texture_paths: paths,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn texture_path(&self, slot: ParameterType) -> &str {
        &self.texture_paths[slot.index()]
    }

    #[must_use]
    pub fn texture_paths(&self) -> &[String; ParameterType::COUNT] {
        &self.texture_paths
    }

    pub fn set_texture_path(&mut self, slot: ParameterType, path: impl Into<String>) {
        self.texture_paths[slot.index()] = path.into();
    }

    #[must_use]
    pub fn has_texture(&self, slot: ParameterType) -> bool {
        !self.texture_paths[slot.index()].is_empty()
    }

    #[must_use]
    pub fn data(&self) -> &MaterialData {
        &self.data
    }

    pub fn set_param(&mut self, param: MaterialParam) {
        match param {
            MaterialParam::Albedo(v) => self.data.albedo = v,
            MaterialParam::Normal(v) => self.data.normal = v,
            MaterialParam::Metallic(v) => self.data.metallic = v,
            MaterialParam::Roughness(v) => self.data.roughness = v,
            MaterialParam::Ao(v) => self.data.ao = v,
        }
    }

    pub fn set_emissive(&mut self, value: f32) {
        self.data.emissive = value;
    }

    /// Drops the texture of `slot` and restores its default scalar value.
    /// Returns whether a texture was removed.
    pub fn reset(&mut self, slot: ParameterType) -> bool {
        let defaults = MaterialData::default();
        self.set_param(match slot {
            ParameterType::Albedo => MaterialParam::Albedo(defaults.albedo),
            ParameterType::Normal => MaterialParam::Normal(defaults.normal),
            ParameterType::Metallic => MaterialParam::Metallic(defaults.metallic),
            ParameterType::Roughness => MaterialParam::Roughness(defaults.roughness),
            ParameterType::Ao => MaterialParam::Ao(defaults.ao),
        });
        !std::mem::take(&mut self.texture_paths[slot.index()]).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_param_targets_its_own_slot() {
        let mut material = Material::new("skin");
        material.set_param(MaterialParam::Roughness(0.4));
        material.set_param(MaterialParam::Albedo(Vec3::new(1.0, 0.5, 0.25)));

        assert_eq!(material.data().roughness, 0.4);
        assert_eq!(material.data().albedo, Vec3::new(1.0, 0.5, 0.25));
        assert_eq!(material.data().metallic, 0.0);
        assert_eq!(MaterialParam::Ao(0.3).parameter_type(), ParameterType::Ao);
    }

    #[test]
    fn reset_drops_texture_and_restores_default() {
        let mut material = Material::new("skin");
        material.set_texture_path(ParameterType::Roughness, "rough.png");
        material.set_param(MaterialParam::Roughness(0.1));

        assert!(material.reset(ParameterType::Roughness));
        assert!(!material.has_texture(ParameterType::Roughness));
        assert_eq!(material.data().roughness, 0.9);
        assert!(!material.reset(ParameterType::Roughness));
    }
}
