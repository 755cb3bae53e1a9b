use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::gpu::viewport::DEFAULT_MAX_PIXEL_RATIO;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Display", inline)]
#[serde(default)]
/// Output resolution and scene colors.
pub struct DisplayOptions {
    /// Upper bound on the device pixel ratio for offscreen buffers.
    #[schemars(title = "Max Pixel Ratio", range(min = 1.0, max = 3.0), extend("step" = 0.25))]
    pub max_pixel_ratio: f32,
    /// Background of the skin capture.
    #[schemars(skip)]
    pub skin_clear_color: [f32; 3],
    /// Background of the live skeleton pass.
    #[schemars(skip)]
    pub skeleton_clear_color: [f32; 3],
    /// Base color of the skin model.
    #[schemars(skip)]
    pub skin_tint: [f32; 3],
    /// Base color of the skeleton model.
    #[schemars(skip)]
    pub skeleton_tint: [f32; 3],
    /// Marker color while scanning.
    #[schemars(skip)]
    pub marker_scanning_color: [f32; 3],
    /// Marker color once discovered.
    #[schemars(skip)]
    pub marker_discovered_color: [f32; 3],
    /// Frame rate cap for the native viewer (0 = uncapped).
    #[schemars(skip)]
    pub target_fps: u32,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            max_pixel_ratio: DEFAULT_MAX_PIXEL_RATIO,
            skin_clear_color: [0.06, 0.07, 0.09],
            skeleton_clear_color: [0.01, 0.03, 0.06],
            skin_tint: [0.87, 0.68, 0.58],
            skeleton_tint: [0.78, 0.9, 1.0],
            marker_scanning_color: [1.0, 0.75, 0.2],
            marker_discovered_color: [0.2, 1.0, 0.45],
            target_fps: 60,
        }
    }
}
