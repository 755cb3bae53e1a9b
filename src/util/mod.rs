//! Shared utilities: easing curves for animated transitions and frame
//! timing for the render loop.

pub mod easing;
/// Frame-rate cap and smoothed FPS.
pub mod frame_timing;
