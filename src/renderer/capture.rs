//! Offscreen skin capture and the per-frame model visibility switch.

use crate::gpu::texture::{RenderTarget, OFFSCREEN_COLOR_FORMAT};
use crate::gpu::viewport::RenderExtent;
use crate::scene::{ModelHandle, SceneGraph, SceneManager};

/// The two scene renders of a frame, as seen by [`VisibilitySwitch`].
pub trait FramePasses {
    /// Render the scene, as currently visible, into the offscreen target.
    fn capture(&mut self, graph: &SceneGraph);
    /// Render the scene, as currently visible, into the live target.
    fn main(&mut self, graph: &SceneGraph);
}

/// Flips model visibility around the two scene renders.
///
/// Every frame: skin on and skeleton off, capture; skeleton on and skin
/// off, main. The scene is left in the main-pass state. Nothing else may
/// toggle model visibility.
pub struct VisibilitySwitch;

impl VisibilitySwitch {
    /// Run one frame. Returns `false` without rendering anything while
    /// either model is still loading.
    pub fn run_frame(scene: &mut SceneManager, passes: &mut impl FramePasses) -> bool {
        let Some((graph, skin, skeleton)) = scene.split_models() else {
            return false;
        };
        Self::show(graph, skin, skeleton);
        passes.capture(graph);
        Self::show(graph, skeleton, skin);
        passes.main(graph);
        true
    }

    fn show(graph: &mut SceneGraph, shown: &ModelHandle, hidden: &ModelHandle) {
        hidden.set_visible(graph, false);
        shown.set_visible(graph, true);
    }
}

/// Owns the render target the skin is captured into.
///
/// The target is replaced, never mutated, when the extent changes.
pub struct OffscreenCapturePass {
    color: RenderTarget,
    depth: RenderTarget,
    /// Background behind the skin.
    pub clear_color: wgpu::Color,
}

impl OffscreenCapturePass {
    /// Allocate targets at `extent`.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        extent: RenderExtent,
        clear_color: wgpu::Color,
    ) -> Self {
        let (color, depth) = Self::create_targets(device, extent);
        Self {
            color,
            depth,
            clear_color,
        }
    }

    fn create_targets(
        device: &wgpu::Device,
        extent: RenderExtent,
    ) -> (RenderTarget, RenderTarget) {
        (
            RenderTarget::color(
                device,
                "Skin Capture",
                extent,
                OFFSCREEN_COLOR_FORMAT,
            ),
            RenderTarget::depth(device, "Skin Capture Depth", extent),
        )
    }

    /// Rebuild the targets if `extent` differs. Returns whether they were
    /// rebuilt; callers must then rebind views that sample the capture.
    pub fn resize(&mut self, device: &wgpu::Device, extent: RenderExtent) -> bool {
        if self.color.extent == extent {
            return false;
        }
        let (color, depth) = Self::create_targets(device, extent);
        self.color = color;
        self.depth = depth;
        true
    }

    /// Size of the current targets.
    #[must_use]
    pub fn extent(&self) -> RenderExtent {
        self.color.extent
    }

    /// Captured skin color, sampled by the composite.
    #[must_use]
    pub fn color_view(&self) -> &wgpu::TextureView {
        &self.color.view
    }

    /// Depth attachment for the capture.
    #[must_use]
    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::viewport::Viewport;
    use crate::options::CameraOptions;
    use crate::scene::models::{procedural_skeleton, procedural_skin};

    #[derive(Default)]
    struct Recorder {
        log: Vec<(&'static str, bool, bool)>,
        skin: Option<ModelHandle>,
        skeleton: Option<ModelHandle>,
    }

    impl Recorder {
        fn record(&mut self, pass: &'static str, graph: &SceneGraph) {
            let skin = self.skin.as_ref().unwrap();
            let skeleton = self.skeleton.as_ref().unwrap();
            self.log.push((
                pass,
                skin.is_visible(graph),
                skeleton.is_visible(graph),
            ));
            // Exclusivity: exactly one model fully visible, the other fully hidden.
            assert!(skin.is_visible(graph) != skeleton.is_visible(graph));
            assert!(skin.is_hidden(graph) != skeleton.is_hidden(graph));
        }
    }

    impl FramePasses for Recorder {
        fn capture(&mut self, graph: &SceneGraph) {
            self.record("capture", graph);
        }

        fn main(&mut self, graph: &SceneGraph) {
            self.record("main", graph);
        }
    }

    fn scene() -> SceneManager {
        SceneManager::new(
            &CameraOptions::default(),
            Viewport::new(800.0, 600.0, 1.0),
            2.0,
        )
    }

    #[test]
    fn skipped_until_both_models_load() {
        let mut scene = scene();
        let mut recorder = Recorder::default();
        assert!(!VisibilitySwitch::run_frame(&mut scene, &mut recorder));
        scene.install_model(procedural_skin([1.0; 3]));
        assert!(!VisibilitySwitch::run_frame(&mut scene, &mut recorder));
        assert!(recorder.log.is_empty());
    }

    #[test]
    fn capture_sees_skin_and_main_sees_skeleton_every_frame() {
        let mut scene = scene();
        scene.install_model(procedural_skin([1.0; 3]));
        scene.install_model(procedural_skeleton([1.0; 3]));
        let (skin, skeleton) = scene.models().unwrap();
        let mut recorder = Recorder {
            skin: Some(skin.clone()),
            skeleton: Some(skeleton.clone()),
            ..Default::default()
        };

        for _ in 0..3 {
            assert!(VisibilitySwitch::run_frame(&mut scene, &mut recorder));
        }
        assert_eq!(recorder.log.len(), 6);
        for pair in recorder.log.chunks(2) {
            assert_eq!(pair[0], ("capture", true, false));
            assert_eq!(pair[1], ("main", false, true));
        }

        // Left in the main-pass state.
        let (skin, skeleton) = scene.models().unwrap();
        assert!(skin.is_hidden(&scene.graph));
        assert!(skeleton.is_visible(&scene.graph));
    }
}
