//! Pointer/reveal controller.
//!
//! Owns the one coordinate that drives the x-ray mask. Pointer events only
//! store a target; [`RevealController::update`] moves the smoothed
//! coordinate toward it once per frame and advances the expand animation.
//! Nothing else writes the mask center.
//!
//! Two coordinate spaces are kept side by side:
//!
//! - *mask space*: normalized `[0, 1]`, origin bottom-left, Y up. This is
//!   what the composite shader and the proximity checks read.
//! - *NDC*: `[-1, 1]`, origin center, Y up. This is what ray-casting reads.

use glam::Vec2;

use crate::options::{MaskSource, RevealOptions, SmoothingMode};
use crate::util::easing::EasingFunction;

/// Convert a platform pointer position (origin top-left, Y down) in a
/// viewport of `size` into mask space. Returns `None` for non-finite
/// input or a zero-area viewport.
#[must_use]
pub fn pointer_to_mask(position: Vec2, size: Vec2) -> Option<Vec2> {
    if !position.is_finite()
        || !size.is_finite()
        || size.x <= 0.0
        || size.y <= 0.0
    {
        return None;
    }
    Some(Vec2::new(position.x / size.x, 1.0 - position.y / size.y))
}

/// Mask space → normalized device coordinates.
#[must_use]
pub fn mask_to_ndc(mask: Vec2) -> Vec2 {
    mask * 2.0 - Vec2::ONE
}

/// Expand toggle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpandState {
    /// Mask at its base radius.
    #[default]
    Collapsed,
    /// Mask grown by the scaled expanded radius.
    Expanded,
}

/// Eased transition of the expand value.
#[derive(Debug, Clone, Copy)]
struct ExpandAnimation {
    from: f32,
    to: f32,
    elapsed: f32,
    duration: f32,
}

impl ExpandAnimation {
    fn value(&self) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = EasingFunction::DEFAULT.evaluate(self.elapsed / self.duration);
        self.from + (self.to - self.from) * t
    }

    fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Smoothed pointer, mask coordinate spaces, and the expand toggle.
#[derive(Debug, Clone)]
pub struct RevealController {
    options: RevealOptions,
    target: Vec2,
    current: Vec2,
    state: ExpandState,
    scale: f32,
    expand_value: f32,
    animation: Option<ExpandAnimation>,
}

impl RevealController {
    /// Create a controller with the mask centered and collapsed.
    #[must_use]
    pub fn new(options: RevealOptions) -> Self {
        let scale = options.clamp_scale(options.initial_scale);
        Self {
            options,
            target: Vec2::splat(0.5),
            current: Vec2::splat(0.5),
            state: ExpandState::Collapsed,
            scale,
            expand_value: 0.0,
            animation: None,
        }
    }

    /// Replace the options. The current scale is re-clamped.
    pub fn set_options(&mut self, options: RevealOptions) {
        self.options = options;
        let _ = self.set_expand_scale(self.scale);
    }

    /// Reveal options in effect.
    #[must_use]
    pub fn options(&self) -> &RevealOptions {
        &self.options
    }

    // -- Pointer --

    /// Store a new target in mask space. Non-finite input is ignored;
    /// positions outside the viewport are clamped to its edge.
    pub fn on_pointer_move(&mut self, mask: Vec2) {
        if !mask.is_finite() {
            return;
        }
        self.target = mask.clamp(Vec2::ZERO, Vec2::ONE);
    }

    /// Advance smoothing and the expand animation by one frame.
    pub fn update(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let factor = self.options.smoothing_factor.clamp(0.0, 1.0);
        let alpha = match self.options.smoothing {
            SmoothingMode::PerFrame => factor,
            SmoothingMode::Exponential => {
                1.0 - (1.0 - factor).powf(dt * self.options.reference_rate)
            }
        };
        self.current += (self.target - self.current) * alpha;

        if let Some(anim) = &mut self.animation {
            anim.elapsed += dt;
            self.expand_value = anim.value();
            if anim.is_finished() {
                self.animation = None;
            }
        }
    }

    /// Latest raw pointer position in mask space.
    #[must_use]
    pub fn target(&self) -> Vec2 {
        self.target
    }

    /// Smoothed pointer position in mask space.
    #[must_use]
    pub fn current(&self) -> Vec2 {
        self.current
    }

    /// The coordinate that drives the shader mask and proximity checks.
    #[must_use]
    pub fn mask_center(&self) -> Vec2 {
        match self.options.mask_source {
            MaskSource::Smoothed => self.current,
            MaskSource::Raw => self.target,
        }
    }

    /// [`mask_center`](Self::mask_center) in NDC.
    #[must_use]
    pub fn mask_center_ndc(&self) -> Vec2 {
        mask_to_ndc(self.mask_center())
    }

    // -- Expand --

    /// Flip between collapsed and expanded, animating the change.
    pub fn toggle_expand(&mut self) -> ExpandState {
        self.state = match self.state {
            ExpandState::Collapsed => ExpandState::Expanded,
            ExpandState::Expanded => ExpandState::Collapsed,
        };
        self.retarget();
        self.state
    }

    /// Set the expand scale, clamped to the configured range. Returns the
    /// applied value.
    pub fn set_expand_scale(&mut self, scale: f32) -> f32 {
        let applied = self.options.clamp_scale(scale);
        if applied != self.scale {
            self.scale = applied;
            if self.state == ExpandState::Expanded {
                self.retarget();
            }
        }
        applied
    }

    /// Add `delta` to the expand scale (clamped). Returns the applied value.
    pub fn adjust_expand_scale(&mut self, delta: f32) -> f32 {
        self.set_expand_scale(self.scale + delta)
    }

    /// Applied expand scale.
    #[must_use]
    pub fn expand_scale(&self) -> f32 {
        self.scale
    }

    /// Toggle state.
    #[must_use]
    pub fn expand_state(&self) -> ExpandState {
        self.state
    }

    /// Whether the expand animation is still running.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Current (animated) expand amount added to the base radius.
    #[must_use]
    pub fn expand_value(&self) -> f32 {
        self.expand_value
    }

    /// Value the expand animation is heading to.
    #[must_use]
    pub fn expand_goal(&self) -> f32 {
        match self.state {
            ExpandState::Collapsed => 0.0,
            ExpandState::Expanded => self.options.expanded_radius * self.scale,
        }
    }

    /// Effective mask radius.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.options.base_radius + self.expand_value
    }

    fn retarget(&mut self) {
        let goal = self.expand_goal();
        let duration = self.options.expand_duration.max(0.0);
        if duration == 0.0 {
            self.expand_value = goal;
            self.animation = None;
            return;
        }
        self.animation = Some(ExpandAnimation {
            from: self.expand_value,
            to: goal,
            elapsed: 0.0,
            duration,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> RevealController {
        RevealController::new(RevealOptions::default())
    }

    #[test]
    fn pointer_conversion_flips_y() {
        let mask =
            pointer_to_mask(Vec2::new(200.0, 150.0), Vec2::new(800.0, 600.0))
                .unwrap();
        assert_eq!(mask, Vec2::new(0.25, 0.75));
        assert_eq!(mask_to_ndc(mask), Vec2::new(-0.5, 0.5));
    }

    #[test]
    fn pointer_conversion_rejects_bad_input() {
        let size = Vec2::new(800.0, 600.0);
        assert!(pointer_to_mask(Vec2::new(f32::NAN, 1.0), size).is_none());
        assert!(pointer_to_mask(Vec2::ONE, Vec2::new(0.0, 600.0)).is_none());
    }

    #[test]
    fn pointer_move_only_stores_target() {
        let mut reveal = controller();
        reveal.on_pointer_move(Vec2::new(1.0, 0.0));
        assert_eq!(reveal.target(), Vec2::new(1.0, 0.0));
        assert_eq!(reveal.current(), Vec2::splat(0.5));
    }

    #[test]
    fn per_frame_smoothing_moves_a_tenth() {
        let mut reveal = controller();
        reveal.on_pointer_move(Vec2::new(1.0, 0.5));
        reveal.update(1.0 / 60.0);
        assert!((reveal.current().x - 0.55).abs() < 1e-6);
        // Frame time does not matter in per-frame mode
        reveal.update(1.0);
        assert!((reveal.current().x - 0.595).abs() < 1e-6);
    }

    #[test]
    fn exponential_smoothing_matches_per_frame_at_reference_rate() {
        let mut reveal = RevealController::new(RevealOptions {
            smoothing: SmoothingMode::Exponential,
            ..RevealOptions::default()
        });
        reveal.on_pointer_move(Vec2::new(1.0, 0.5));
        reveal.update(1.0 / 60.0);
        assert!((reveal.current().x - 0.55).abs() < 1e-5);

        // Two half-frames equal one full frame
        let mut halves = RevealController::new(reveal.options().clone());
        halves.on_pointer_move(Vec2::new(1.0, 0.5));
        halves.update(1.0 / 120.0);
        halves.update(1.0 / 120.0);
        assert!((halves.current().x - 0.55).abs() < 1e-5);
    }

    #[test]
    fn invalid_pointer_is_ignored_and_outside_is_clamped() {
        let mut reveal = controller();
        reveal.on_pointer_move(Vec2::new(f32::NAN, 0.2));
        assert_eq!(reveal.target(), Vec2::splat(0.5));
        reveal.on_pointer_move(Vec2::new(1.5, -0.5));
        assert_eq!(reveal.target(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn mask_source_selects_coordinate() {
        let mut reveal = controller();
        reveal.on_pointer_move(Vec2::new(0.9, 0.9));
        reveal.update(0.016);
        assert_eq!(reveal.mask_center(), reveal.current());

        let mut raw = RevealController::new(RevealOptions {
            mask_source: MaskSource::Raw,
            ..RevealOptions::default()
        });
        raw.on_pointer_move(Vec2::new(0.9, 0.9));
        raw.update(0.016);
        assert_eq!(raw.mask_center(), Vec2::new(0.9, 0.9));
    }

    #[test]
    fn scale_requests_are_clamped() {
        let mut reveal = controller();
        assert_eq!(reveal.set_expand_scale(-5.0), 0.3);
        assert_eq!(reveal.expand_scale(), 0.3);
        assert_eq!(reveal.set_expand_scale(99.0), 2.0);
        assert_eq!(reveal.adjust_expand_scale(0.5), 2.0);
        assert_eq!(reveal.set_expand_scale(f32::NAN), 0.3);
    }

    #[test]
    fn expand_animates_over_duration() {
        let mut reveal = controller();
        assert_eq!(reveal.expand_state(), ExpandState::Collapsed);
        assert_eq!(reveal.expand_value(), 0.0);

        assert_eq!(reveal.toggle_expand(), ExpandState::Expanded);
        reveal.update(0.25);
        let halfway = reveal.expand_value();
        assert!(halfway > 0.0 && halfway < 0.25);
        assert!(reveal.is_animating());

        reveal.update(0.25);
        assert!((reveal.expand_value() - 0.25).abs() < 1e-6);
        assert!(!reveal.is_animating());
        assert!((reveal.radius() - 0.5).abs() < 1e-6);

        assert_eq!(reveal.toggle_expand(), ExpandState::Collapsed);
        reveal.update(0.5);
        assert_eq!(reveal.expand_value(), 0.0);
    }

    #[test]
    fn rescaling_while_expanded_retargets() {
        let mut reveal = controller();
        let _ = reveal.toggle_expand();
        reveal.update(1.0);
        let _ = reveal.set_expand_scale(2.0);
        assert!((reveal.expand_goal() - 0.5).abs() < 1e-6);
        reveal.update(1.0);
        assert!((reveal.expand_value() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn zero_duration_expands_instantly() {
        let mut reveal = RevealController::new(RevealOptions {
            expand_duration: 0.0,
            ..RevealOptions::default()
        });
        let _ = reveal.toggle_expand();
        assert!((reveal.expand_value() - 0.25).abs() < 1e-6);
    }
}
