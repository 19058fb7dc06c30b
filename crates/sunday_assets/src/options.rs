use serde::Deserialize;
use sunday_animation::DEFAULT_TICKS_PER_SECOND;
use sunday_core::errors::Result;

/// Which bones a vertex keeps when more than four influence it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfluenceOrder {
    /// The first four bones in source enumeration order win.
    #[default]
    SourceOrder,
    /// The four heaviest influences win.
    HeaviestFirst,
}

/// Settings for importing a skinned model.
///
/// ```json
/// { "influence_order": "heaviest_first", "default_ticks_per_second": 30.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SkinnedImportOptions {
    pub influence_order: InfluenceOrder,
    /// Used for clips that do not state their ticks per second.
    pub default_ticks_per_second: f32,
    /// When false, submeshes are stored without materials.
    pub import_materials: bool,
}

impl Default for SkinnedImportOptions {
    fn default() -> Self {
        Self {
            influence_order: InfluenceOrder::SourceOrder,
            default_ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            import_materials: true,
        }
    }
}

impl SkinnedImportOptions {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let json = r#"{ "influence_order": "heaviest_first" }"#;
        let options = SkinnedImportOptions::from_json_str(json).expect("valid options");
        assert_eq!(options.influence_order, InfluenceOrder::HeaviestFirst);
        assert_eq!(options.default_ticks_per_second, DEFAULT_TICKS_PER_SECOND);
        assert!(options.import_materials);
    }

    #[test]
    fn rejects_unknown_influence_order() {
        assert!(SkinnedImportOptions::from_json_str(r#"{ "influence_order": "random" }"#).is_err());
    }
}
