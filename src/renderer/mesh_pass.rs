//! Indexed-mesh draw pass shared by the offscreen capture and the live
//! skeleton render.
//!
//! One pipeline pair (opaque, then alpha-blended) draws every visible
//! [`DrawItem`]. Per-draw data lives in a single uniform buffer addressed
//! with dynamic offsets; the slot of an item is its position in
//! [`SceneGraph::draw_items`], which is stable across visibility changes,
//! so both passes of a frame share one upload.

use wgpu::util::DeviceExt;

use crate::gpu::pipeline_helpers::{
    aligned_uniform_stride, dynamic_uniform_buffer, filtering_sampler,
    linear_sampler, texture_2d,
};
use crate::gpu::shader_composer::{ShaderComposer, ShaderError};
use crate::gpu::texture::{ImageTexture, DEPTH_FORMAT, OFFSCREEN_COLOR_FORMAT};
use crate::scene::{DrawItem, MeshLibrary, SceneGraph, Vertex};

/// Per-draw uniform. Must match `DrawUniform` in `raster/mesh.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniform {
    /// Model-to-world matrix.
    pub model: [[f32; 4]; 4],
    /// Base color and opacity.
    pub tint: [f32; 4],
    /// Emissive color; `w` is the face texture weight.
    pub emissive: [f32; 4],
}

impl DrawUniform {
    /// Pack a draw item.
    #[must_use]
    pub fn from_item(item: &DrawItem) -> Self {
        let [r, g, b] = item.material.emissive;
        Self {
            model: item.world.to_cols_array_2d(),
            tint: item.material.tint,
            emissive: [r, g, b, item.material.face_weight],
        }
    }
}

const DRAW_UNIFORM_SIZE: u64 = size_of::<DrawUniform>() as u64;
const INITIAL_DRAW_CAPACITY: usize = 64;

/// GPU copy of one [`MeshData`](crate::scene::MeshData).
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// Where a pass draws to.
pub struct PassTargets<'a> {
    /// Color attachment.
    pub color: &'a wgpu::TextureView,
    /// Depth attachment.
    pub depth: &'a wgpu::TextureView,
    /// Background color.
    pub clear: wgpu::Color,
}

/// Pipelines, per-draw uniforms, the face texture and uploaded meshes.
pub struct MeshPass {
    opaque_pipeline: wgpu::RenderPipeline,
    blended_pipeline: wgpu::RenderPipeline,

    draw_layout: wgpu::BindGroupLayout,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    draw_stride: u64,
    draw_capacity: usize,
    staging: Vec<u8>,

    face_layout: wgpu::BindGroupLayout,
    face_sampler: wgpu::Sampler,
    face_texture: ImageTexture,
    face_bind_group: wgpu::BindGroup,

    meshes: Vec<GpuMesh>,
}

impl MeshPass {
    /// Build the pipelines. `camera_layout` is bind group 0.
    ///
    /// # Errors
    ///
    /// Returns [`ShaderError`] if the mesh shader fails to compose.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        composer: &mut ShaderComposer,
        camera_layout: &wgpu::BindGroupLayout,
    ) -> Result<Self, ShaderError> {
        let shader = composer.compose(device, "Mesh Shader", "raster/mesh.wgsl")?;

        let draw_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Draw Uniform Layout"),
                entries: &[dynamic_uniform_buffer(0, DRAW_UNIFORM_SIZE)],
            });
        let face_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Face Texture Layout"),
                entries: &[texture_2d(0), filtering_sampler(1)],
            });

        let layouts = [camera_layout, &draw_layout, &face_layout];
        let opaque_pipeline = create_mesh_pipeline(
            device,
            "Opaque Mesh",
            &shader,
            &layouts,
            None,
            true,
        );
        let blended_pipeline = create_mesh_pipeline(
            device,
            "Blended Mesh",
            &shader,
            &layouts,
            Some(wgpu::BlendState::ALPHA_BLENDING),
            false,
        );

        let draw_stride = aligned_uniform_stride(device, DRAW_UNIFORM_SIZE);
        let (draw_buffer, draw_bind_group) = create_draw_buffer(
            device,
            &draw_layout,
            draw_stride,
            INITIAL_DRAW_CAPACITY,
        );

        let face_sampler = linear_sampler(device, "Face Sampler");
        let face_texture = ImageTexture::white(device, queue);
        let face_bind_group =
            create_face_bind_group(device, &face_layout, &face_texture, &face_sampler);

        Ok(Self {
            opaque_pipeline,
            blended_pipeline,
            draw_layout,
            draw_buffer,
            draw_bind_group,
            draw_stride,
            draw_capacity: INITIAL_DRAW_CAPACITY,
            staging: Vec::new(),
            face_layout,
            face_sampler,
            face_texture,
            face_bind_group,
            meshes: Vec::new(),
        })
    }

    /// Upload every mesh added to `library` since the last call.
    pub fn sync_meshes(&mut self, device: &wgpu::Device, library: &MeshLibrary) {
        for (id, mesh) in library.since(self.meshes.len()) {
            let vertex_buffer =
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("Mesh {} Vertices", id.index())),
                    contents: bytemuck::cast_slice(&mesh.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            let index_buffer =
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("Mesh {} Indices", id.index())),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
            self.meshes.push(GpuMesh {
                vertex_buffer,
                index_buffer,
                index_count: mesh.indices.len() as u32,
            });
        }
    }

    /// Number of meshes resident on the GPU.
    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Replace the face texture. Returns `false` (and keeps the current
    /// texture) when the pixel buffer does not match the dimensions.
    pub fn set_face(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> bool {
        let Some(texture) =
            ImageTexture::from_rgba(device, queue, "Face Texture", rgba, width, height)
        else {
            return false;
        };
        self.face_bind_group = create_face_bind_group(
            device,
            &self.face_layout,
            &texture,
            &self.face_sampler,
        );
        self.face_texture = texture;
        true
    }

    /// Write per-draw uniforms for every drawable in `graph`. Call once per
    /// frame before the first [`draw`](Self::draw).
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        graph: &SceneGraph,
    ) {
        let items = graph.draw_items();
        if items.is_empty() {
            return;
        }
        if items.len() > self.draw_capacity {
            let capacity = items.len().next_power_of_two();
            let (buffer, bind_group) = create_draw_buffer(
                device,
                &self.draw_layout,
                self.draw_stride,
                capacity,
            );
            self.draw_buffer = buffer;
            self.draw_bind_group = bind_group;
            self.draw_capacity = capacity;
        }

        let stride = self.draw_stride as usize;
        self.staging.clear();
        self.staging.resize(items.len() * stride, 0);
        for (slot, item) in items.iter().enumerate() {
            let uniform = DrawUniform::from_item(item);
            let bytes = bytemuck::bytes_of(&uniform);
            let start = slot * stride;
            self.staging[start..start + bytes.len()].copy_from_slice(bytes);
        }
        queue.write_buffer(&self.draw_buffer, 0, &self.staging);
    }

    /// Draw the currently visible items of `graph` into `targets`: opaque
    /// items first, then translucent ones.
    pub fn draw(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        label: &str,
        targets: &PassTargets<'_>,
        camera: &wgpu::BindGroup,
        graph: &SceneGraph,
    ) {
        let items = graph.draw_items();
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: targets.color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(targets.clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(
                wgpu::RenderPassDepthStencilAttachment {
                    view: targets.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                },
            ),
            ..Default::default()
        });

        pass.set_bind_group(0, camera, &[]);
        pass.set_bind_group(2, &self.face_bind_group, &[]);

        for translucent in [false, true] {
            pass.set_pipeline(if translucent {
                &self.blended_pipeline
            } else {
                &self.opaque_pipeline
            });
            for (slot, item) in items.iter().enumerate() {
                if !item.visible || is_translucent(item) != translucent {
                    continue;
                }
                if slot >= self.draw_capacity {
                    break;
                }
                let Some(mesh) = self.meshes.get(item.mesh.index()) else {
                    continue;
                };
                let offset = (slot as u64 * self.draw_stride) as u32;
                pass.set_bind_group(1, &self.draw_bind_group, &[offset]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(
                    mesh.index_buffer.slice(..),
                    wgpu::IndexFormat::Uint32,
                );
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }
    }
}

fn is_translucent(item: &DrawItem) -> bool {
    item.material.tint[3] < 1.0
}

fn create_mesh_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader: &wgpu::ShaderModule,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    blend: Option<wgpu::BlendState>,
    depth_write: bool,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{label} Layout")),
        bind_group_layouts,
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::LAYOUT],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: OFFSCREEN_COLOR_FORMAT,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: depth_write,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_draw_buffer(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    stride: u64,
    capacity: usize,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Draw Uniform Buffer"),
        size: stride * capacity as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Draw Uniform Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: wgpu::BufferSize::new(DRAW_UNIFORM_SIZE),
            }),
        }],
    });
    (buffer, bind_group)
}

fn create_face_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &ImageTexture,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Face Texture Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3};

    use super::*;
    use crate::scene::{Material, MeshId};

    #[test]
    fn draw_uniform_matches_shader_layout() {
        assert_eq!(size_of::<DrawUniform>(), 96);
    }

    #[test]
    fn face_weight_rides_in_emissive_w() {
        let graph = SceneGraph::new();
        let item = DrawItem {
            node: graph.root(),
            mesh: MeshId(0),
            material: Material {
                tint: [0.5, 0.5, 0.5, 0.4],
                emissive: [0.1, 0.2, 0.3],
                face_weight: 1.0,
            },
            world: Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)),
            visible: true,
        };
        let uniform = DrawUniform::from_item(&item);
        assert_eq!(uniform.emissive, [0.1, 0.2, 0.3, 1.0]);
        assert_eq!(uniform.model[3], [1.0, 2.0, 3.0, 1.0]);
        assert!(is_translucent(&item));
    }
}
