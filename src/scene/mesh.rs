//! CPU-side triangle meshes and procedural primitive generators.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

/// Interleaved mesh vertex: position, normal, texture coordinate.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space unit normal.
    pub normal: [f32; 3],
    /// Texture coordinate (origin top-left).
    pub uv: [f32; 2],
}

impl Vertex {
    /// Vertex buffer layout matching `raster/mesh.wgsl`.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> =
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![
                0 => Float32x3,
                1 => Float32x3,
                2 => Float32x2,
            ],
        };

    fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.normalize_or_zero().to_array(),
            uv: uv.to_array(),
        }
    }
}

/// Indexed triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex array.
    pub vertices: Vec<Vertex>,
    /// Triangle indices into `vertices`.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Whether the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Axis-aligned ellipsoid centered at the origin. Texture coordinates
    /// wrap longitude so that u = 0.5 faces +Z.
    #[must_use]
    pub fn ellipsoid(radii: Vec3, rings: u32, segments: u32) -> Self {
        let rings = rings.max(2);
        let segments = segments.max(3);
        let mut mesh = Self::default();

        for ring in 0..=rings {
            let v = ring as f32 / rings as f32;
            let theta = v * PI;
            for seg in 0..=segments {
                let u = seg as f32 / segments as f32;
                let phi = u * TAU;
                let unit = Vec3::new(
                    -theta.sin() * phi.sin(),
                    theta.cos(),
                    -theta.sin() * phi.cos(),
                );
                let position = unit * radii;
                // Gradient of the implicit surface
                let normal = unit / radii;
                mesh.vertices
                    .push(Vertex::new(position, normal, Vec2::new(u, v)));
            }
        }

        mesh.push_grid_indices(rings, segments);
        mesh
    }

    /// Sphere of the given radius.
    #[must_use]
    pub fn sphere(radius: f32, rings: u32, segments: u32) -> Self {
        Self::ellipsoid(Vec3::splat(radius), rings, segments)
    }

    /// Open cylinder along +Y, centered at the origin.
    #[must_use]
    pub fn cylinder(radius: f32, height: f32, segments: u32) -> Self {
        let segments = segments.max(3);
        let mut mesh = Self::default();
        let half = height * 0.5;

        for row in 0..=1u32 {
            let y = if row == 0 { half } else { -half };
            for seg in 0..=segments {
                let u = seg as f32 / segments as f32;
                let phi = u * TAU;
                let normal = Vec3::new(phi.sin(), 0.0, phi.cos());
                mesh.vertices.push(Vertex::new(
                    normal * radius + Vec3::Y * y,
                    normal,
                    Vec2::new(u, row as f32),
                ));
            }
        }

        mesh.push_grid_indices(1, segments);
        mesh
    }

    /// Torus in the XZ plane.
    #[must_use]
    pub fn torus(
        major_radius: f32,
        minor_radius: f32,
        rings: u32,
        segments: u32,
    ) -> Self {
        let rings = rings.max(3);
        let segments = segments.max(3);
        let mut mesh = Self::default();

        for ring in 0..=rings {
            let v = ring as f32 / rings as f32;
            let tube = v * TAU;
            for seg in 0..=segments {
                let u = seg as f32 / segments as f32;
                let around = u * TAU;
                let center =
                    Vec3::new(around.cos(), 0.0, around.sin()) * major_radius;
                let normal = Vec3::new(
                    around.cos() * tube.cos(),
                    tube.sin(),
                    around.sin() * tube.cos(),
                );
                mesh.vertices.push(Vertex::new(
                    center + normal * minor_radius,
                    normal,
                    Vec2::new(u, v),
                ));
            }
        }

        mesh.push_grid_indices(rings, segments);
        mesh
    }

    /// Flat-shaded octahedron with the given circumradius.
    #[must_use]
    pub fn octahedron(radius: f32) -> Self {
        let tips = [
            Vec3::X,
            Vec3::NEG_X,
            Vec3::Y,
            Vec3::NEG_Y,
            Vec3::Z,
            Vec3::NEG_Z,
        ];
        let faces: [[usize; 3]; 8] = [
            [4, 0, 2],
            [0, 5, 2],
            [5, 1, 2],
            [1, 4, 2],
            [0, 4, 3],
            [5, 0, 3],
            [1, 5, 3],
            [4, 1, 3],
        ];

        let mut mesh = Self::default();
        for face in faces {
            let [a, b, c] = face.map(|i| tips[i] * radius);
            let normal = (b - a).cross(c - a);
            let base = mesh.vertices.len() as u32;
            for (p, uv) in [(a, Vec2::ZERO), (b, Vec2::X), (c, Vec2::Y)] {
                mesh.vertices.push(Vertex::new(p, normal, uv));
            }
            mesh.indices.extend_from_slice(&[base, base + 1, base + 2]);
        }
        mesh
    }

    /// Indices for a `(rows + 1) x (cols + 1)` vertex grid laid out row-major.
    fn push_grid_indices(&mut self, rows: u32, cols: u32) {
        let stride = cols + 1;
        for row in 0..rows {
            for col in 0..cols {
                let a = row * stride + col;
                let b = a + stride;
                self.indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }
    }
}

/// Handle to a mesh registered in a [`MeshLibrary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub(crate) u32);

impl MeshId {
    /// Position of the mesh in its library.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Append-only store of CPU meshes. The renderer uploads entries it has not
/// seen yet; meshes are never modified after registration.
#[derive(Debug, Default)]
pub struct MeshLibrary {
    meshes: Vec<MeshData>,
}

impl MeshLibrary {
    /// Create an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mesh and return its handle.
    pub fn add(&mut self, mesh: MeshData) -> MeshId {
        let id = MeshId(self.meshes.len() as u32);
        self.meshes.push(mesh);
        id
    }

    /// Look up a mesh.
    #[must_use]
    pub fn get(&self, id: MeshId) -> Option<&MeshData> {
        self.meshes.get(id.index())
    }

    /// Number of registered meshes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Whether no meshes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Meshes registered at or after `start`, with their ids.
    pub fn since(
        &self,
        start: usize,
    ) -> impl Iterator<Item = (MeshId, &MeshData)> + '_ {
        self.meshes
            .iter()
            .enumerate()
            .skip(start)
            .map(|(i, mesh)| (MeshId(i as u32), mesh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices_in_range(mesh: &MeshData) -> bool {
        let n = mesh.vertices.len() as u32;
        mesh.indices.iter().all(|&i| i < n)
    }

    #[test]
    fn primitives_are_well_formed() {
        let meshes = [
            MeshData::sphere(1.0, 8, 12),
            MeshData::ellipsoid(Vec3::new(1.0, 2.0, 0.5), 6, 6),
            MeshData::cylinder(0.5, 2.0, 10),
            MeshData::torus(1.0, 0.2, 8, 16),
            MeshData::octahedron(1.0),
        ];
        for mesh in &meshes {
            assert!(!mesh.is_empty());
            assert_eq!(mesh.indices.len() % 3, 0);
            assert!(indices_in_range(mesh));
        }
    }

    #[test]
    fn sphere_vertices_lie_on_surface() {
        let mesh = MeshData::sphere(2.0, 6, 8);
        for v in &mesh.vertices {
            let len = Vec3::from(v.position).length();
            assert!((len - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn octahedron_normals_point_outward() {
        let mesh = MeshData::octahedron(1.0);
        for v in &mesh.vertices {
            assert!(Vec3::from(v.normal).dot(Vec3::from(v.position)) > 0.0);
        }
    }

    #[test]
    fn library_ids_are_sequential() {
        let mut library = MeshLibrary::new();
        let a = library.add(MeshData::octahedron(1.0));
        let b = library.add(MeshData::sphere(1.0, 4, 4));
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(library.since(1).count(), 1);
        assert!(library.get(MeshId(7)).is_none());
    }
}
