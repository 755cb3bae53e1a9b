//! The engine's complete interactive vocabulary.
//!
//! Every user-facing operation, whether triggered by a key press, a mouse
//! gesture, or a programmatic call, is represented as an `EngineCommand`.
//! Consumers construct commands and pass them to
//! [`XrayEngine::execute`](super::XrayEngine::execute).

use glam::Vec2;

use crate::scene::AnatomyContext;

/// A discrete operation on the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineCommand {
    // ── Pointer ──
    /// Pointer moved; logical pixels from the viewport's top-left corner.
    PointerMoved {
        /// Horizontal position.
        x: f32,
        /// Vertical position.
        y: f32,
    },
    /// Click without drag; logical pixels from the top-left corner.
    Click {
        /// Horizontal position.
        x: f32,
        /// Vertical position.
        y: f32,
    },

    // ── Reveal mask ──
    /// Expand or collapse the reveal mask.
    ToggleExpand,
    /// Set the expand scale; clamped to the configured range.
    SetExpandScale {
        /// Requested scale.
        scale: f32,
    },
    /// Nudge the expand scale; the result is clamped.
    AdjustExpandScale {
        /// Amount to add.
        delta: f32,
    },

    // ── Anatomy context ──
    /// Switch to a context (full discovery reset).
    SwitchContext {
        /// New context.
        context: AnatomyContext,
    },
    /// Switch to the next context in order.
    CycleContext,

    // ── Camera ──
    /// Orbit by a pointer delta in logical pixels.
    RotateCamera {
        /// Pointer movement.
        delta: Vec2,
    },
    /// Zoom in (positive) or out (negative).
    Zoom {
        /// Scroll amount.
        delta: f32,
    },
    /// Return the camera to the context's framing.
    ResetCamera,
}
