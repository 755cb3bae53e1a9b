//! Render-target and sampled-texture helpers.

use super::viewport::RenderExtent;

/// Color format of every offscreen color buffer.
pub const OFFSCREEN_COLOR_FORMAT: wgpu::TextureFormat =
    wgpu::TextureFormat::Rgba16Float;

/// Depth format shared by the mesh passes.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// An offscreen texture and its default view, tagged with the extent it was
/// created at.
///
/// Targets are never resized in place. A resize builds a new target and the
/// old one is dropped, so a view handed out earlier can never describe a
/// buffer of a different size.
pub struct RenderTarget {
    /// The underlying GPU texture.
    pub texture: wgpu::Texture,
    /// A default full-texture view.
    pub view: wgpu::TextureView,
    /// Size the texture was allocated at.
    pub extent: RenderExtent,
}

impl RenderTarget {
    /// Create a color target that can be rendered into and sampled.
    #[must_use]
    pub fn color(
        device: &wgpu::Device,
        label: &str,
        extent: RenderExtent,
        format: wgpu::TextureFormat,
    ) -> Self {
        Self::create(
            device,
            label,
            extent,
            format,
            wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
        )
    }

    /// Create a depth attachment.
    #[must_use]
    pub fn depth(
        device: &wgpu::Device,
        label: &str,
        extent: RenderExtent,
    ) -> Self {
        Self::create(
            device,
            label,
            extent,
            DEPTH_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        )
    }

    fn create(
        device: &wgpu::Device,
        label: &str,
        extent: RenderExtent,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: extent.width.max(1),
                height: extent.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            extent,
        }
    }
}

/// A sampled RGBA8 texture uploaded from CPU pixels (the face image, or a
/// 1×1 placeholder).
pub struct ImageTexture {
    /// The underlying GPU texture.
    pub texture: wgpu::Texture,
    /// A default full-texture view.
    pub view: wgpu::TextureView,
}

impl ImageTexture {
    /// Upload tightly packed RGBA8 pixels. Returns `None` when the pixel
    /// buffer does not match `width * height * 4`.
    #[must_use]
    pub fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if width == 0 || height == 0 || rgba.len() != expected {
            return None;
        }
        Some(Self::upload(device, queue, label, rgba, width, height))
    }

    fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    /// A single opaque white texel, used until a face image is supplied.
    #[must_use]
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::upload(device, queue, "Placeholder Face", &[255; 4], 1, 1)
    }
}
