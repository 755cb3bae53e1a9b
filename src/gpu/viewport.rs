//! Viewport bookkeeping shared by every resolution-dependent resource.
//!
//! The offscreen capture target, the live color target, and the composite
//! pass's resolution uniform all read their size from one [`RenderExtent`],
//! so they can never disagree about the frame they describe.

/// Upper bound on the device pixel ratio used for offscreen rendering.
pub const DEFAULT_MAX_PIXEL_RATIO: f32 = 2.0;

/// Logical (CSS / window-point) viewport size plus the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Logical width.
    pub width: f32,
    /// Logical height.
    pub height: f32,
    /// Physical pixels per logical pixel.
    pub device_pixel_ratio: f32,
}

/// Physical pixel dimensions of every offscreen buffer for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderExtent {
    /// Width in physical pixels.
    pub width: u32,
    /// Height in physical pixels.
    pub height: u32,
}

impl Viewport {
    /// Create a viewport from logical dimensions and a pixel ratio.
    #[must_use]
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    /// Whether the viewport has a drawable area.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        self.width.is_finite()
            && self.height.is_finite()
            && self.width >= 1.0
            && self.height >= 1.0
    }

    /// Pixel ratio actually used for rendering: the device ratio clamped to
    /// `[1, max_ratio]`. Non-finite ratios fall back to 1.
    #[must_use]
    pub fn effective_pixel_ratio(&self, max_ratio: f32) -> f32 {
        if self.device_pixel_ratio.is_finite() {
            self.device_pixel_ratio.clamp(1.0, max_ratio.max(1.0))
        } else {
            1.0
        }
    }

    /// Physical size of the offscreen buffers for this viewport.
    #[must_use]
    pub fn render_extent(&self, max_ratio: f32) -> RenderExtent {
        let ratio = self.effective_pixel_ratio(max_ratio);
        RenderExtent {
            width: ((self.width * ratio).round() as u32).max(1),
            height: ((self.height * ratio).round() as u32).max(1),
        }
    }

    /// Width / height, guarded against zero height.
    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.width / self.height.max(1.0)
    }
}

impl RenderExtent {
    /// Extent as `[width, height]` floats for shader uniforms.
    #[must_use]
    pub fn as_vec(&self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }
}

/// Last-write-wins holder for resize requests.
///
/// Window systems can deliver several resize events between two frames.
/// Only the most recent one matters; it is applied once at the top of the
/// next frame, before anything renders.
#[derive(Debug, Default)]
pub struct PendingResize {
    latest: Option<Viewport>,
}

impl PendingResize {
    /// Record a resize request, replacing any request not yet applied.
    pub fn request(&mut self, viewport: Viewport) {
        self.latest = Some(viewport);
    }

    /// Whether a resize is waiting to be applied.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.latest.is_some()
    }

    /// Take the latest request, leaving nothing pending.
    pub fn take(&mut self) -> Option<Viewport> {
        self.latest.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_scales_by_pixel_ratio() {
        let vp = Viewport::new(800.0, 600.0, 1.5);
        assert_eq!(
            vp.render_extent(DEFAULT_MAX_PIXEL_RATIO),
            RenderExtent {
                width: 1200,
                height: 900
            }
        );
    }

    #[test]
    fn pixel_ratio_is_clamped_to_max() {
        let vp = Viewport::new(1000.0, 500.0, 3.0);
        assert_eq!(
            vp.render_extent(DEFAULT_MAX_PIXEL_RATIO),
            RenderExtent {
                width: 2000,
                height: 1000
            }
        );
    }

    #[test]
    fn bogus_pixel_ratio_falls_back_to_one() {
        let vp = Viewport::new(640.0, 480.0, f32::NAN);
        assert_eq!(vp.effective_pixel_ratio(2.0), 1.0);
        let vp = Viewport::new(640.0, 480.0, 0.25);
        assert_eq!(vp.effective_pixel_ratio(2.0), 1.0);
    }

    #[test]
    fn pending_resize_keeps_only_latest() {
        let mut pending = PendingResize::default();
        pending.request(Viewport::new(100.0, 100.0, 1.0));
        pending.request(Viewport::new(300.0, 200.0, 2.0));
        pending.request(Viewport::new(640.0, 360.0, 1.0));
        assert!(pending.is_pending());
        assert_eq!(pending.take(), Some(Viewport::new(640.0, 360.0, 1.0)));
        assert!(!pending.is_pending());
        assert_eq!(pending.take(), None);
    }

    #[test]
    fn zero_sized_viewport_is_not_drawable() {
        assert!(!Viewport::new(0.0, 600.0, 1.0).is_drawable());
        assert!(!Viewport::new(800.0, f32::NAN, 1.0).is_drawable());
        assert!(Viewport::new(800.0, 600.0, 1.0).is_drawable());
    }
}
