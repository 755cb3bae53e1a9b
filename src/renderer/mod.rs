//! GPU side of the reveal pipeline.
//!
//! Per frame: the [`VisibilitySwitch`](capture::VisibilitySwitch) renders the
//! skin into the [`OffscreenCapturePass`](capture::OffscreenCapturePass)
//! target and the skeleton into the live target, then bloom and the
//! [`XrayCompositePass`](postprocess::xray_composite::XrayCompositePass)
//! produce the presented image.

pub mod capture;
pub mod mesh_pass;
pub mod postprocess;

use capture::{FramePasses, OffscreenCapturePass, VisibilitySwitch};
use mesh_pass::{MeshPass, PassTargets};
use postprocess::post_process::PostProcessStack;
use postprocess::xray_composite::XrayParams;

use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{ShaderComposer, ShaderError};
use crate::gpu::viewport::RenderExtent;
use crate::options::Options;
use crate::reveal::RevealController;
use crate::scene::{SceneGraph, SceneManager};

fn clear_color(rgb: [f32; 3]) -> wgpu::Color {
    wgpu::Color {
        r: f64::from(rgb[0]),
        g: f64::from(rgb[1]),
        b: f64::from(rgb[2]),
        a: 1.0,
    }
}

/// The capture target, the live target and the composite resolution
/// uniform must all describe one size before a composite runs.
fn targets_agree(
    capture: RenderExtent,
    live: RenderExtent,
    params: &XrayParams,
) -> bool {
    capture == live && params.matches_extent(capture)
}

/// Every GPU pass plus the resources they share.
pub struct XrayRenderer {
    mesh_pass: MeshPass,
    capture: OffscreenCapturePass,
    post: PostProcessStack,
    skeleton_clear: wgpu::Color,
    srgb_output: bool,
}

impl XrayRenderer {
    /// Build all pipelines and targets at `extent`.
    ///
    /// # Errors
    ///
    /// Returns [`ShaderError`] if any program fails to compose.
    pub fn new(
        context: &RenderContext,
        camera_layout: &wgpu::BindGroupLayout,
        extent: RenderExtent,
        options: &Options,
    ) -> Result<Self, ShaderError> {
        let device = &context.device;
        let mut composer = ShaderComposer::new()?;
        let mesh_pass =
            MeshPass::new(device, &context.queue, &mut composer, camera_layout)?;
        let capture = OffscreenCapturePass::new(
            device,
            extent,
            clear_color(options.display.skin_clear_color),
        );
        let mut post =
            PostProcessStack::new(device, &mut composer, context.format(), extent)?;
        post.bind_composite(device, capture.color_view());

        let mut renderer = Self {
            mesh_pass,
            capture,
            post,
            skeleton_clear: clear_color(options.display.skeleton_clear_color),
            srgb_output: context.format().is_srgb(),
        };
        renderer.apply_options(&context.queue, options);
        Ok(renderer)
    }

    /// Push option values (clear colors, bloom, tone mapping).
    pub fn apply_options(&mut self, queue: &wgpu::Queue, options: &Options) {
        self.capture.clear_color = clear_color(options.display.skin_clear_color);
        self.skeleton_clear = clear_color(options.display.skeleton_clear_color);
        self.post
            .apply_options(queue, &options.post_processing, self.srgb_output);
    }

    /// Rebuild the capture target, the live targets and the composite
    /// bindings at `extent`. All three always share one size.
    pub fn resize(&mut self, device: &wgpu::Device, extent: RenderExtent) {
        let _ = self.capture.resize(device, extent);
        self.post.resize(device, extent);
        self.post.bind_composite(device, self.capture.color_view());
        if self.extents_agree() {
            log::debug!("render targets rebuilt at {}x{}", extent.width, extent.height);
        } else {
            log::error!(
                "render targets disagree after resize to {}x{}",
                extent.width,
                extent.height
            );
        }
    }

    /// Extent of the offscreen targets.
    #[must_use]
    pub fn extent(&self) -> RenderExtent {
        self.capture.extent()
    }

    /// Whether the capture target, the live target and the composite's
    /// resolution uniform all describe the same size.
    #[must_use]
    pub fn extents_agree(&self) -> bool {
        targets_agree(
            self.capture.extent(),
            self.post.extent(),
            &self.post.composite.params,
        )
    }

    /// Upload the face texture. Returns `false` for malformed images.
    pub fn set_face(
        &mut self,
        context: &RenderContext,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> bool {
        self.mesh_pass
            .set_face(&context.device, &context.queue, rgba, width, height)
    }

    /// Encode a whole frame into `output`. Returns `false` (encoding
    /// nothing) while a model is still loading.
    pub fn render(
        &mut self,
        context: &RenderContext,
        encoder: &mut wgpu::CommandEncoder,
        scene: &mut SceneManager,
        reveal: &RevealController,
        camera: &wgpu::BindGroup,
        output: &wgpu::TextureView,
    ) -> bool {
        if !scene.models_ready() {
            return false;
        }
        self.mesh_pass.sync_meshes(&context.device, &scene.meshes);
        self.mesh_pass
            .prepare(&context.device, &context.queue, &scene.graph);

        self.post.composite.params.apply_reveal(reveal);
        self.post.composite.flush_params(&context.queue);

        let mut passes = FrameRecorder {
            encoder: &mut *encoder,
            mesh_pass: &self.mesh_pass,
            capture: &self.capture,
            post: &self.post,
            camera,
            skeleton_clear: self.skeleton_clear,
        };
        if !VisibilitySwitch::run_frame(scene, &mut passes) {
            return false;
        }
        self.post.render(encoder, output);
        true
    }
}

/// Records the two scene renders of [`VisibilitySwitch::run_frame`].
struct FrameRecorder<'a> {
    encoder: &'a mut wgpu::CommandEncoder,
    mesh_pass: &'a MeshPass,
    capture: &'a OffscreenCapturePass,
    post: &'a PostProcessStack,
    camera: &'a wgpu::BindGroup,
    skeleton_clear: wgpu::Color,
}

impl FramePasses for FrameRecorder<'_> {
    fn capture(&mut self, graph: &SceneGraph) {
        let targets = PassTargets {
            color: self.capture.color_view(),
            depth: self.capture.depth_view(),
            clear: self.capture.clear_color,
        };
        self.mesh_pass
            .draw(self.encoder, "Skin Capture Pass", &targets, self.camera, graph);
    }

    fn main(&mut self, graph: &SceneGraph) {
        let targets = PassTargets {
            color: self.post.live_color_view(),
            depth: self.post.live_depth_view(),
            clear: self.skeleton_clear,
        };
        self.mesh_pass
            .draw(self.encoder, "Skeleton Pass", &targets, self.camera, graph);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::viewport::Viewport;

    #[test]
    fn resize_keeps_targets_and_uniform_in_step() {
        let before = Viewport::new(800.0, 600.0, 1.0).render_extent(2.0);
        let mut params = XrayParams::new(before);
        assert!(targets_agree(before, before, &params));

        let after = Viewport::new(500.0, 400.0, 2.5).render_extent(2.0);
        assert_eq!(
            after,
            RenderExtent {
                width: 1000,
                height: 800
            }
        );
        // Targets rebuilt but the uniform not yet updated.
        assert!(!targets_agree(after, after, &params));

        params.set_extent(after);
        assert!(targets_agree(after, after, &params));
        assert!(!targets_agree(after, before, &params));
    }
}
