//! Runtime options with TOML preset support.
//!
//! Every tweakable setting (reveal mask, discovery game, camera, display,
//! post-processing, keybindings) is consolidated here. Options serialize
//! to/from TOML so a session can be configured from a file.

mod camera;
mod discovery;
mod display;
mod keybindings;
mod post_processing;
mod reveal;

use std::path::Path;

pub use camera::CameraOptions;
pub use discovery::DiscoveryOptions;
pub use display::DisplayOptions;
pub use keybindings::KeybindingOptions;
pub use post_processing::PostProcessingOptions;
pub use reveal::{MaskSource, RevealOptions, SmoothingMode};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::SkinboneError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[reveal]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Reveal mask and pointer smoothing.
    pub reveal: RevealOptions,
    /// Discovery game parameters.
    pub discovery: DiscoveryOptions,
    /// Camera projection and orbit parameters.
    pub camera: CameraOptions,
    /// Resolution and colors.
    pub display: DisplayOptions,
    /// Bloom and tone parameters.
    pub post_processing: PostProcessingOptions,
    /// Keyboard binding options.
    #[schemars(skip)]
    pub keybindings: KeybindingOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Parse options from a TOML string. Missing fields use defaults.
    pub fn from_toml(content: &str) -> Result<Self, SkinboneError> {
        let mut options: Self = toml::from_str(content)
            .map_err(|e| SkinboneError::OptionsParse(e.to_string()))?;
        options.keybindings.rebuild_reverse_map();
        Ok(options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, SkinboneError> {
        let content =
            std::fs::read_to_string(path).map_err(SkinboneError::Io)?;
        Self::from_toml(&content)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), SkinboneError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SkinboneError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(SkinboneError::Io)?;
        }
        std::fs::write(path, content).map_err(SkinboneError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyAction;
    use crate::scene::AnatomyContext;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed = Options::from_toml(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
[reveal]
base_radius = 0.3
smoothing = "exponential"

[discovery]
initial_context = "fullbody"
"#;
        let opts = Options::from_toml(toml_str).unwrap();
        assert_eq!(opts.reveal.base_radius, 0.3);
        assert_eq!(opts.reveal.smoothing, SmoothingMode::Exponential);
        assert_eq!(opts.discovery.initial_context, AnatomyContext::FullBody);
        // Everything else should be default
        assert_eq!(opts.reveal.expanded_radius, 0.25);
        assert_eq!(opts.discovery.scan_radius, 0.15);
        assert_eq!(opts.display.max_pixel_ratio, 2.0);
    }

    #[test]
    fn invalid_toml_is_an_options_error() {
        let err = Options::from_toml("[reveal]\nbase_radius = \"wide\"")
            .unwrap_err();
        assert!(matches!(err, SkinboneError::OptionsParse(_)));
    }

    #[test]
    fn keybinding_lookup() {
        let opts = Options::default();
        assert_eq!(
            opts.keybindings.lookup("Space"),
            Some(KeyAction::ToggleExpand)
        );
        assert_eq!(
            opts.keybindings.lookup("Digit2"),
            Some(KeyAction::TorsoContext)
        );
        assert_eq!(opts.keybindings.lookup("KeyZ"), None);
    }

    #[test]
    fn custom_bindings_rebuild_reverse_map() {
        let toml_str = r#"
[keybindings.bindings]
toggle_expand = "KeyE"
"#;
        let opts = Options::from_toml(toml_str).unwrap();
        assert_eq!(opts.keybindings.lookup("KeyE"), Some(KeyAction::ToggleExpand));
        assert_eq!(opts.keybindings.lookup("Space"), None);
    }

    #[test]
    fn scale_clamp_bounds() {
        let reveal = RevealOptions::default();
        assert_eq!(reveal.clamp_scale(-5.0), 0.3);
        assert_eq!(reveal.clamp_scale(99.0), 2.0);
        assert_eq!(reveal.clamp_scale(1.2), 1.2);
        assert_eq!(reveal.clamp_scale(f32::NAN), 0.3);
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        assert!(props.contains_key("reveal"));
        assert!(props.contains_key("discovery"));
        assert!(props.contains_key("camera"));
        assert!(props.contains_key("post_processing"));
        assert!(!props.contains_key("keybindings"));

        let reveal = &props["reveal"]["properties"];
        assert!(reveal.get("base_radius").is_some());
        assert!(reveal.get("min_scale").is_none());
    }
}
