use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::scene::AnatomyContext;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Discovery", inline)]
#[serde(default)]
/// Discovery game parameters.
pub struct DiscoveryOptions {
    /// Mask-space distance under which a marker accumulates scan time.
    #[schemars(title = "Scan Radius", range(min = 0.02, max = 0.5), extend("step" = 0.01))]
    pub scan_radius: f32,
    /// World-space radius used when ray-casting clicks against markers.
    #[schemars(skip)]
    pub pick_radius: f32,
    /// Anatomy context active at startup.
    pub initial_context: AnatomyContext,
    /// Optional TOML condition table replacing the built-in one.
    #[schemars(skip)]
    pub conditions_path: Option<String>,
    /// Discoveries faster than this many seconds earn a bonus.
    #[schemars(skip)]
    pub quick_find_seconds: f32,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            scan_radius: 0.15,
            pick_radius: 0.03,
            initial_context: AnatomyContext::Head,
            conditions_path: None,
            quick_find_seconds: 20.0,
        }
    }
}
