//! X-ray composite: blends the captured skin over the live skeleton
//! through a soft circular mask that follows the pointer.
//!
//! Inside the mask radius the skin capture shows; outside it the live
//! skeleton (plus bloom) shows; a smoothstep band of width
//! `softness * radius` joins them. The mask center is normalized with the
//! origin bottom-left, the same space [`RevealController`] produces.

use wgpu::util::DeviceExt;

use super::screen_pass::draw_fullscreen;
use crate::gpu::pipeline_helpers::{
    create_screen_space_pipeline, filtering_sampler, linear_sampler,
    texture_2d, uniform_buffer,
};
use crate::gpu::shader_composer::{ShaderComposer, ShaderError};
use crate::gpu::viewport::RenderExtent;
use crate::options::PostProcessingOptions;
use crate::reveal::RevealController;

/// Composite uniforms. Must match `XrayParams` in
/// `screen/xray_composite.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct XrayParams {
    /// Mask center in [0, 1], origin bottom-left.
    pub mask_center: [f32; 2],
    /// Render-target size in physical pixels.
    pub resolution: [f32; 2],
    /// Extra radius from the expand animation.
    pub expand: f32,
    /// Collapsed radius.
    pub base_radius: f32,
    /// Edge falloff width relative to the radius.
    pub softness: f32,
    /// Bloom contribution.
    pub bloom_intensity: f32,
    /// Exposure multiplier.
    pub exposure: f32,
    /// Output gamma exponent.
    pub gamma: f32,
    /// Padding for GPU alignment.
    pub _pad: [f32; 2],
}

impl XrayParams {
    /// Parameters for a collapsed mask centered on screen.
    #[must_use]
    pub fn new(extent: RenderExtent) -> Self {
        Self {
            mask_center: [0.5, 0.5],
            resolution: extent.as_vec(),
            expand: 0.0,
            base_radius: 0.25,
            softness: 0.2,
            bloom_intensity: 0.0,
            exposure: 1.0,
            gamma: 1.0,
            _pad: [0.0; 2],
        }
    }

    /// Track the size of the targets being composited.
    pub fn set_extent(&mut self, extent: RenderExtent) {
        self.resolution = extent.as_vec();
    }

    /// Whether the resolution uniform describes `extent`.
    #[must_use]
    pub fn matches_extent(&self, extent: RenderExtent) -> bool {
        self.resolution == extent.as_vec()
    }

    /// Copy the mask from the reveal controller, the only source of mask
    /// data.
    pub fn apply_reveal(&mut self, reveal: &RevealController) {
        self.mask_center = reveal.mask_center().to_array();
        self.expand = reveal.expand_value();
        self.base_radius = reveal.options().base_radius;
        self.softness = reveal.options().softness;
    }

    /// Copy tone-mapping and bloom settings. `srgb_output` tells whether the
    /// surface applies gamma in hardware.
    pub fn apply_post_processing(
        &mut self,
        options: &PostProcessingOptions,
        srgb_output: bool,
    ) {
        self.bloom_intensity = if options.bloom_enabled {
            options.bloom_intensity
        } else {
            0.0
        };
        self.exposure = options.exposure;
        // If sRGB, hardware does gamma correction → only the user gamma.
        let encode = if srgb_output { 1.0 } else { 1.0 / 2.2 };
        self.gamma = options.gamma.max(0.01) * encode;
    }
}

/// Views the composite samples. All must share one extent.
pub struct CompositeInputs<'a> {
    /// Captured skin.
    pub skin: &'a wgpu::TextureView,
    /// Live skeleton.
    pub skeleton: &'a wgpu::TextureView,
    /// Blurred bloom.
    pub bloom: &'a wgpu::TextureView,
}

/// Final full-screen pass writing to the presentation target.
pub struct XrayCompositePass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    bind_group: Option<wgpu::BindGroup>,
    params_buffer: wgpu::Buffer,
    /// CPU copy of the uniforms; push with [`flush_params`](Self::flush_params).
    pub params: XrayParams,
}

impl XrayCompositePass {
    /// Build the pipeline for an `output_format` target.
    ///
    /// # Errors
    ///
    /// Returns [`ShaderError`] if the composite shader fails to compose.
    /// Nothing can be shown without it.
    pub fn new(
        device: &wgpu::Device,
        composer: &mut ShaderComposer,
        output_format: wgpu::TextureFormat,
        extent: RenderExtent,
    ) -> Result<Self, ShaderError> {
        let shader = composer.compose(
            device,
            "X-ray Composite Shader",
            "screen/xray_composite.wgsl",
        )?;
        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("X-ray Composite Layout"),
                entries: &[
                    texture_2d(0),
                    texture_2d(1),
                    texture_2d(2),
                    filtering_sampler(3),
                    uniform_buffer(4),
                ],
            });
        let pipeline = create_screen_space_pipeline(
            device,
            "X-ray Composite",
            &shader,
            output_format,
            None,
            &[&layout],
        );

        let params = XrayParams::new(extent);
        let params_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("X-ray Params Buffer"),
                contents: bytemuck::bytes_of(&params),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

        Ok(Self {
            pipeline,
            layout,
            sampler: linear_sampler(device, "X-ray Sampler"),
            bind_group: None,
            params_buffer,
            params,
        })
    }

    /// Bind new input views and set the resolution uniform to their extent.
    pub fn bind_inputs(
        &mut self,
        device: &wgpu::Device,
        inputs: &CompositeInputs<'_>,
        extent: RenderExtent,
    ) {
        self.bind_group =
            Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("X-ray Composite Bind Group"),
                layout: &self.layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(inputs.skin),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(
                            inputs.skeleton,
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(inputs.bloom),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: self.params_buffer.as_entire_binding(),
                    },
                ],
            }));
        self.params.set_extent(extent);
    }

    /// Upload [`params`](Self::params).
    pub fn flush_params(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&self.params));
    }

    /// Composite into `output`. No-op until inputs are bound.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView) {
        if let Some(bind_group) = &self.bind_group {
            draw_fullscreen(encoder, "X-ray Composite", &self.pipeline, bind_group, output);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::options::RevealOptions;

    #[test]
    fn params_match_shader_layout() {
        assert_eq!(size_of::<XrayParams>(), 48);
    }

    #[test]
    fn reveal_state_flows_into_params() {
        let mut reveal = RevealController::new(RevealOptions::default());
        reveal.on_pointer_move(Vec2::new(0.2, 0.8));
        for _ in 0..200 {
            reveal.update(1.0 / 60.0);
        }
        let _ = reveal.toggle_expand();
        for _ in 0..60 {
            reveal.update(1.0 / 60.0);
        }

        let mut params = XrayParams::new(RenderExtent {
            width: 1600,
            height: 1200,
        });
        params.apply_reveal(&reveal);
        assert!((params.mask_center[0] - 0.2).abs() < 1e-3);
        assert!((params.mask_center[1] - 0.8).abs() < 1e-3);
        assert!((params.expand - 0.25).abs() < 1e-4);
        assert_eq!(params.base_radius, 0.25);
        assert_eq!(params.resolution, [1600.0, 1200.0]);
    }

    #[test]
    fn resolution_follows_a_resize() {
        let mut params = XrayParams::new(RenderExtent {
            width: 800,
            height: 600,
        });
        let viewport = crate::gpu::viewport::Viewport::new(500.0, 400.0, 2.5);
        let extent = viewport.render_extent(2.0);
        assert!(!params.matches_extent(extent));

        params.set_extent(extent);
        assert!(params.matches_extent(extent));
        assert_eq!(params.resolution, [1000.0, 800.0]);
    }

    #[test]
    fn disabled_bloom_contributes_nothing() {
        let mut params = XrayParams::new(RenderExtent {
            width: 1,
            height: 1,
        });
        let options = PostProcessingOptions {
            bloom_enabled: false,
            ..Default::default()
        };
        params.apply_post_processing(&options, true);
        assert_eq!(params.bloom_intensity, 0.0);
        assert_eq!(params.gamma, 1.0);
    }
}
