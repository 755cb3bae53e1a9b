//! GPU resource management utilities.
//!
//! Provides wgpu device/surface initialization, viewport bookkeeping,
//! render-target textures, and shader composition.

/// Shared wgpu boilerplate helpers for screen-space pipelines.
pub mod pipeline_helpers;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// WGSL shader composition with `#import` support via naga-oil.
pub mod shader_composer;
/// Framework-agnostic render-target texture abstraction.
pub mod texture;
/// Logical viewport size, device pixel ratio, and deferred resizes.
pub mod viewport;
