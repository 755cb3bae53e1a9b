//! Scene ownership: the node tree, the camera, the two models, and the
//! viewport size every offscreen buffer is derived from.
//!
//! [`SceneManager`] is the only owner of the camera and the root node. The
//! models and the marker layer add children under the root but never share
//! a node.

/// Bone anchors and anatomy contexts.
pub mod anatomy;
/// Background model delivery.
pub mod assets;
/// Node arena.
pub mod graph;
/// Meshes and primitive generators.
pub mod mesh;
/// Skin / skeleton models.
pub mod models;

pub use anatomy::{AnatomyContext, Bone};
pub use graph::{
    DrawItem, Drawable, Material, NodeId, SceneGraph, SceneNode, Transform,
};
pub use mesh::{MeshData, MeshId, MeshLibrary, Vertex};
pub use models::{ModelAsset, ModelHandle, ModelKind};

use crate::camera::controller::OrbitCamera;
use crate::gpu::viewport::{PendingResize, RenderExtent, Viewport};
use crate::options::CameraOptions;

/// Owner of the scene tree, camera, installed models and viewport size.
pub struct SceneManager {
    /// Node tree.
    pub graph: SceneGraph,
    /// Every mesh referenced by the tree.
    pub meshes: MeshLibrary,
    /// Orbit camera.
    pub orbit: OrbitCamera,
    skin: Option<ModelHandle>,
    skeleton: Option<ModelHandle>,
    viewport: Viewport,
    extent: RenderExtent,
    max_pixel_ratio: f32,
    pending: PendingResize,
}

impl SceneManager {
    /// Create an empty scene sized for `viewport`.
    #[must_use]
    pub fn new(
        camera: &CameraOptions,
        viewport: Viewport,
        max_pixel_ratio: f32,
    ) -> Self {
        Self {
            graph: SceneGraph::new(),
            meshes: MeshLibrary::new(),
            orbit: OrbitCamera::new(camera, viewport.aspect()),
            skin: None,
            skeleton: None,
            viewport,
            extent: viewport.render_extent(max_pixel_ratio),
            max_pixel_ratio,
            pending: PendingResize::default(),
        }
    }

    // -- Models --

    /// Install a delivered model, replacing any earlier model of the same
    /// kind.
    pub fn install_model(&mut self, asset: ModelAsset) {
        let kind = asset.kind;
        let Some(handle) =
            ModelHandle::install(&mut self.graph, &mut self.meshes, asset)
        else {
            log::warn!("failed to install {} model", kind.name());
            return;
        };
        log::info!(
            "{} model ready ({} meshes)",
            kind.name(),
            handle.meshes.len()
        );
        let slot = match kind {
            ModelKind::Skin => &mut self.skin,
            ModelKind::Skeleton => &mut self.skeleton,
        };
        if let Some(old) = slot.replace(handle) {
            let _ = self.graph.remove_subtree(old.root);
        }
    }

    /// Both models, once both have arrived.
    #[must_use]
    pub fn models(&self) -> Option<(&ModelHandle, &ModelHandle)> {
        self.skin.as_ref().zip(self.skeleton.as_ref())
    }

    /// The tree together with both models, for the per-frame visibility
    /// switch. `None` until both models have arrived.
    pub fn split_models(
        &mut self,
    ) -> Option<(&mut SceneGraph, &ModelHandle, &ModelHandle)> {
        let skin = self.skin.as_ref()?;
        let skeleton = self.skeleton.as_ref()?;
        Some((&mut self.graph, skin, skeleton))
    }

    /// Whether both models are installed.
    #[must_use]
    pub fn models_ready(&self) -> bool {
        self.models().is_some()
    }

    // -- Camera --

    /// Frame the camera on an anatomy context.
    pub fn frame_context(&mut self, context: AnatomyContext) {
        let (focus, distance) = context.framing();
        self.orbit.set_focus(focus, distance);
    }

    // -- Resize --

    /// Record a resize. Only the latest request before the next
    /// [`apply_pending_resize`](Self::apply_pending_resize) takes effect.
    pub fn request_resize(&mut self, viewport: Viewport) {
        self.pending.request(viewport);
    }

    /// Apply the latest resize request, if any. Returns the new extent when
    /// the offscreen buffers must be rebuilt.
    pub fn apply_pending_resize(&mut self) -> Option<RenderExtent> {
        let viewport = self.pending.take()?;
        if !viewport.is_drawable() {
            log::debug!("ignoring resize to undrawable viewport {viewport:?}");
            return None;
        }
        self.viewport = viewport;
        self.orbit.camera.aspect = viewport.aspect();

        let extent = viewport.render_extent(self.max_pixel_ratio);
        if extent == self.extent {
            return None;
        }
        log::debug!("render extent {}x{}", extent.width, extent.height);
        self.extent = extent;
        Some(extent)
    }

    /// Current logical viewport.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Physical size every offscreen buffer is allocated at.
    #[must_use]
    pub fn extent(&self) -> RenderExtent {
        self.extent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::models::{procedural_skeleton, procedural_skin};

    fn manager() -> SceneManager {
        SceneManager::new(
            &CameraOptions::default(),
            Viewport::new(800.0, 600.0, 1.0),
            2.0,
        )
    }

    #[test]
    fn models_ready_only_after_both_arrive() {
        let mut scene = manager();
        assert!(!scene.models_ready());
        scene.install_model(procedural_skin([1.0; 3]));
        assert!(!scene.models_ready());
        scene.install_model(procedural_skeleton([1.0; 3]));
        assert!(scene.models_ready());
    }

    #[test]
    fn reinstalling_replaces_the_old_model() {
        let mut scene = manager();
        scene.install_model(procedural_skin([1.0; 3]));
        let nodes = scene.graph.len();
        scene.install_model(procedural_skin([0.5; 3]));
        assert_eq!(scene.graph.len(), nodes);
    }

    #[test]
    fn last_resize_wins() {
        let mut scene = manager();
        scene.request_resize(Viewport::new(1024.0, 768.0, 1.0));
        scene.request_resize(Viewport::new(640.0, 480.0, 3.0));
        let extent = scene.apply_pending_resize().unwrap();
        assert_eq!((extent.width, extent.height), (1280, 960));
        assert_eq!(scene.extent(), extent);
        assert!((scene.orbit.camera.aspect - 640.0 / 480.0).abs() < 1e-6);
        assert!(scene.apply_pending_resize().is_none());
    }

    #[test]
    fn zero_size_resize_is_ignored() {
        let mut scene = manager();
        let before = scene.extent();
        scene.request_resize(Viewport::new(0.0, 600.0, 1.0));
        assert!(scene.apply_pending_resize().is_none());
        assert_eq!(scene.extent(), before);
    }
}
