use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How the smoothed mask center chases the pointer.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingMode {
    /// A fixed fraction of the remaining distance per frame, regardless of
    /// frame time.
    #[default]
    PerFrame,
    /// The same fraction expressed per reference-rate frame and scaled by
    /// elapsed time, so the motion is frame-rate independent.
    Exponential,
}

/// Which pointer coordinate drives the shader mask and proximity checks.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum MaskSource {
    /// The smoothed coordinate.
    #[default]
    Smoothed,
    /// The latest raw pointer coordinate.
    Raw,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Reveal", inline)]
#[serde(default)]
/// Reveal mask shape, expand toggle and pointer smoothing.
pub struct RevealOptions {
    /// Mask radius when collapsed, in normalized viewport-height units.
    #[schemars(title = "Base Radius", range(min = 0.05, max = 0.6), extend("step" = 0.01))]
    pub base_radius: f32,
    /// Extra radius added when expanded, before scaling.
    #[schemars(title = "Expanded Radius", range(min = 0.0, max = 0.6), extend("step" = 0.01))]
    pub expanded_radius: f32,
    /// Lower bound of the expand scale.
    #[schemars(skip)]
    pub min_scale: f32,
    /// Upper bound of the expand scale.
    #[schemars(skip)]
    pub max_scale: f32,
    /// Expand scale at startup.
    #[schemars(title = "Expand Scale", range(min = 0.3, max = 2.0), extend("step" = 0.05))]
    pub initial_scale: f32,
    /// Width of the soft edge as a fraction of the radius.
    #[schemars(title = "Edge Softness", range(min = 0.0, max = 1.0), extend("step" = 0.01))]
    pub softness: f32,
    /// Seconds the expand/collapse animation takes.
    #[schemars(title = "Expand Duration", range(min = 0.0, max = 2.0), extend("step" = 0.05))]
    pub expand_duration: f32,
    /// Pointer smoothing mode.
    #[schemars(skip)]
    pub smoothing: SmoothingMode,
    /// Fraction of the remaining distance covered per (reference) frame.
    #[schemars(title = "Smoothing", range(min = 0.01, max = 1.0), extend("step" = 0.01))]
    pub smoothing_factor: f32,
    /// Frame rate the exponential mode's factor is defined at.
    #[schemars(skip)]
    pub reference_rate: f32,
    /// Coordinate that drives the mask.
    #[schemars(skip)]
    pub mask_source: MaskSource,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            base_radius: 0.25,
            expanded_radius: 0.25,
            min_scale: 0.3,
            max_scale: 2.0,
            initial_scale: 1.0,
            softness: 0.2,
            expand_duration: 0.5,
            smoothing: SmoothingMode::PerFrame,
            smoothing_factor: 0.1,
            reference_rate: 60.0,
            mask_source: MaskSource::Smoothed,
        }
    }
}

impl RevealOptions {
    /// Clamp `scale` into the configured range. NaN maps to the minimum.
    #[must_use]
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        if scale.is_nan() {
            return self.min_scale;
        }
        scale.max(self.min_scale).min(self.max_scale.max(self.min_scale))
    }
}
