//! Live skeleton targets and the pass chain that runs after both scene
//! renders.

use super::bloom::BloomPass;
use super::xray_composite::{CompositeInputs, XrayCompositePass};
use crate::gpu::shader_composer::{ShaderComposer, ShaderError};
use crate::gpu::texture::{RenderTarget, OFFSCREEN_COLOR_FORMAT};
use crate::gpu::viewport::RenderExtent;
use crate::options::PostProcessingOptions;

/// Owns the live skeleton targets and every pass after the scene renders:
/// bloom, then the x-ray composite.
pub(crate) struct PostProcessStack {
    live_color: RenderTarget,
    live_depth: RenderTarget,
    pub bloom: BloomPass,
    pub composite: XrayCompositePass,
    bloom_enabled: bool,
}

impl PostProcessStack {
    /// Build the stack at `extent`, compositing into `output_format`.
    pub fn new(
        device: &wgpu::Device,
        composer: &mut ShaderComposer,
        output_format: wgpu::TextureFormat,
        extent: RenderExtent,
    ) -> Result<Self, ShaderError> {
        let (live_color, live_depth) = Self::create_live_targets(device, extent);
        let mut bloom = BloomPass::new(device, composer, extent)?;
        bloom.bind_input(device, &live_color.view);
        let composite =
            XrayCompositePass::new(device, composer, output_format, extent)?;
        Ok(Self {
            live_color,
            live_depth,
            bloom,
            composite,
            bloom_enabled: true,
        })
    }

    fn create_live_targets(
        device: &wgpu::Device,
        extent: RenderExtent,
    ) -> (RenderTarget, RenderTarget) {
        (
            RenderTarget::color(device, "Live Skeleton", extent, OFFSCREEN_COLOR_FORMAT),
            RenderTarget::depth(device, "Live Skeleton Depth", extent),
        )
    }

    /// Recreate every resolution-dependent resource. The composite must be
    /// rebound with [`bind_composite`](Self::bind_composite) afterwards.
    pub fn resize(&mut self, device: &wgpu::Device, extent: RenderExtent) {
        let (live_color, live_depth) = Self::create_live_targets(device, extent);
        self.live_color = live_color;
        self.live_depth = live_depth;
        self.bloom.resize(device, extent);
        self.bloom.bind_input(device, &self.live_color.view);
    }

    /// Bind the skin capture and the live targets into the composite and
    /// set its resolution uniform to their shared extent.
    pub fn bind_composite(&mut self, device: &wgpu::Device, skin: &wgpu::TextureView) {
        let inputs = CompositeInputs {
            skin,
            skeleton: &self.live_color.view,
            bloom: self.bloom.output_view(),
        };
        self.composite
            .bind_inputs(device, &inputs, self.live_color.extent);
    }

    /// Push post-processing option values to the GPU.
    pub fn apply_options(
        &mut self,
        queue: &wgpu::Queue,
        options: &PostProcessingOptions,
        srgb_output: bool,
    ) {
        self.bloom_enabled = options.bloom_enabled;
        self.bloom.threshold = options.bloom_threshold;
        self.bloom.knee = options.bloom_knee;
        self.bloom.update_params(queue);
        self.composite.params.apply_post_processing(options, srgb_output);
        self.composite.flush_params(queue);
    }

    /// Run bloom (when enabled) then the composite into `output`.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView) {
        if self.bloom_enabled {
            self.bloom.render(encoder);
        }
        self.composite.render(encoder, output);
    }

    pub fn live_color_view(&self) -> &wgpu::TextureView {
        &self.live_color.view
    }

    pub fn live_depth_view(&self) -> &wgpu::TextureView {
        &self.live_depth.view
    }

    /// Extent of the live targets.
    pub fn extent(&self) -> RenderExtent {
        self.live_color.extent
    }
}
