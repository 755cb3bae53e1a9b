use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Effects", inline)]
#[serde(default)]
/// Bloom and tone parameters applied in the composite pass.
pub struct PostProcessingOptions {
    /// Whether the bloom chain runs.
    #[schemars(title = "Bloom")]
    pub bloom_enabled: bool,
    /// Blend weight of the blurred highlights.
    #[schemars(title = "Bloom Intensity", range(min = 0.0, max = 1.0), extend("step" = 0.01))]
    pub bloom_intensity: f32,
    /// Luminance above which pixels contribute to bloom.
    #[schemars(title = "Bloom Threshold", range(min = 0.2, max = 2.0), extend("step" = 0.05))]
    pub bloom_threshold: f32,
    /// Width of the soft knee below the threshold.
    #[schemars(skip)]
    pub bloom_knee: f32,
    /// Linear exposure multiplier.
    #[schemars(title = "Exposure", range(min = 0.5, max = 2.0), extend("step" = 0.05))]
    pub exposure: f32,
    /// Output gamma exponent (1 for sRGB surfaces).
    #[schemars(skip)]
    pub gamma: f32,
}

impl Default for PostProcessingOptions {
    fn default() -> Self {
        Self {
            bloom_enabled: true,
            bloom_intensity: 0.35,
            bloom_threshold: 0.8,
            bloom_knee: 0.25,
            exposure: 1.0,
            gamma: 1.0,
        }
    }
}
