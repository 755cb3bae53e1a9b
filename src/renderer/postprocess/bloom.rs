//! Bloom: soft-knee bright-pass at half resolution followed by a separable
//! gaussian blur (horizontal into a ping texture, vertical back).
//!
//! The composite adds the result to the live skeleton image, so bright
//! emissive markers glow through the reveal mask.

use bytemuck::Zeroable;
use wgpu::util::DeviceExt;

use super::screen_pass::draw_fullscreen;
use crate::gpu::pipeline_helpers::{
    create_screen_space_pipeline_with_entry, filtering_sampler, linear_sampler,
    texture_2d, uniform_buffer,
};
use crate::gpu::shader_composer::{ShaderComposer, ShaderError};
use crate::gpu::texture::{RenderTarget, OFFSCREEN_COLOR_FORMAT};
use crate::gpu::viewport::RenderExtent;

/// Must match `BloomParams` in `screen/bloom.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct BloomParams {
    texel_size: [f32; 2],
    direction: [f32; 2],
    threshold: f32,
    knee: f32,
    _pad: [f32; 2],
}

/// Threshold + blur chain.
pub struct BloomPass {
    threshold_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    // [threshold, horizontal, vertical]
    params_buffers: [wgpu::Buffer; 3],
    bind_groups: Option<[wgpu::BindGroup; 3]>,
    output: RenderTarget,
    ping: RenderTarget,
    /// Brightness above which pixels bloom.
    pub threshold: f32,
    /// Width of the soft transition below the threshold.
    pub knee: f32,
}

impl BloomPass {
    /// Build pipelines and half-resolution targets for `extent`.
    ///
    /// # Errors
    ///
    /// Returns [`ShaderError`] if the bloom shader fails to compose.
    pub fn new(
        device: &wgpu::Device,
        composer: &mut ShaderComposer,
        extent: RenderExtent,
    ) -> Result<Self, ShaderError> {
        let shader = composer.compose(device, "Bloom Shader", "screen/bloom.wgsl")?;
        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Bloom Layout"),
                entries: &[texture_2d(0), filtering_sampler(1), uniform_buffer(2)],
            });
        let threshold_pipeline = create_screen_space_pipeline_with_entry(
            device,
            "Bloom Threshold",
            &shader,
            "fs_threshold",
            OFFSCREEN_COLOR_FORMAT,
            None,
            &[&layout],
        );
        let blur_pipeline = create_screen_space_pipeline_with_entry(
            device,
            "Bloom Blur",
            &shader,
            "fs_blur",
            OFFSCREEN_COLOR_FORMAT,
            None,
            &[&layout],
        );

        let params_buffers = ["Threshold", "Blur H", "Blur V"].map(|name| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("Bloom {name} Params")),
                contents: bytemuck::bytes_of(&BloomParams::zeroed()),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
        });
        let (output, ping) = Self::create_targets(device, extent);

        Ok(Self {
            threshold_pipeline,
            blur_pipeline,
            layout,
            sampler: linear_sampler(device, "Bloom Sampler"),
            params_buffers,
            bind_groups: None,
            output,
            ping,
            threshold: 0.8,
            knee: 0.25,
        })
    }

    fn create_targets(
        device: &wgpu::Device,
        extent: RenderExtent,
    ) -> (RenderTarget, RenderTarget) {
        let half = RenderExtent {
            width: (extent.width / 2).max(1),
            height: (extent.height / 2).max(1),
        };
        (
            RenderTarget::color(device, "Bloom Output", half, OFFSCREEN_COLOR_FORMAT),
            RenderTarget::color(device, "Bloom Ping", half, OFFSCREEN_COLOR_FORMAT),
        )
    }

    /// Rebuild the half-resolution targets for a new full-resolution extent.
    /// The input must be rebound afterwards.
    pub fn resize(&mut self, device: &wgpu::Device, extent: RenderExtent) {
        let (output, ping) = Self::create_targets(device, extent);
        self.output = output;
        self.ping = ping;
        self.bind_groups = None;
    }

    /// Point the bright-pass at the live scene color.
    pub fn bind_input(&mut self, device: &wgpu::Device, input: &wgpu::TextureView) {
        let group = |label: &str, view: &wgpu::TextureView, params: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &self.layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: params.as_entire_binding(),
                    },
                ],
            })
        };
        let [threshold, horizontal, vertical] = &self.params_buffers;
        self.bind_groups = Some([
            group("Bloom Threshold Bind Group", input, threshold),
            group("Bloom Blur H Bind Group", &self.output.view, horizontal),
            group("Bloom Blur V Bind Group", &self.ping.view, vertical),
        ]);
    }

    /// Upload threshold and blur parameters for the current size.
    pub fn update_params(&self, queue: &wgpu::Queue) {
        let extent = self.output.extent;
        let texel_size = [1.0 / extent.width as f32, 1.0 / extent.height as f32];
        let directions = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        for (buffer, direction) in self.params_buffers.iter().zip(directions) {
            let params = BloomParams {
                texel_size,
                direction,
                threshold: self.threshold,
                knee: self.knee,
                _pad: [0.0; 2],
            };
            queue.write_buffer(buffer, 0, bytemuck::bytes_of(&params));
        }
    }

    /// Encode threshold → blur H → blur V. No-op until an input is bound.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder) {
        let Some([threshold, horizontal, vertical]) = &self.bind_groups else {
            return;
        };
        draw_fullscreen(
            encoder,
            "Bloom Threshold",
            &self.threshold_pipeline,
            threshold,
            &self.output.view,
        );
        draw_fullscreen(
            encoder,
            "Bloom Blur H",
            &self.blur_pipeline,
            horizontal,
            &self.ping.view,
        );
        draw_fullscreen(
            encoder,
            "Bloom Blur V",
            &self.blur_pipeline,
            vertical,
            &self.output.view,
        );
    }

    /// The blurred bloom texture.
    #[must_use]
    pub fn output_view(&self) -> &wgpu::TextureView {
        &self.output.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_match_shader_layout() {
        assert_eq!(size_of::<BloomParams>(), 32);
    }
}
