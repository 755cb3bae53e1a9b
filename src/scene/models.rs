//! The two stand-in 3D models (skin figure and skeleton) and the handles the
//! core uses to toggle them.

use glam::{Quat, Vec2, Vec3};

use super::anatomy::Bone;
use super::graph::{Drawable, Material, NodeId, SceneGraph, SceneNode, Transform};
use super::mesh::{MeshData, MeshLibrary};

/// Which of the two models an asset is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    /// Outer appearance, captured offscreen.
    Skin,
    /// Inner appearance, drawn live.
    Skeleton,
}

impl ModelKind {
    /// Lowercase label.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Skin => "skin",
            Self::Skeleton => "skeleton",
        }
    }
}

/// One mesh of a model asset.
#[derive(Debug, Clone)]
pub struct ModelPart {
    /// Debug name.
    pub name: String,
    /// Geometry in part-local space.
    pub mesh: MeshData,
    /// Placement relative to the model root.
    pub transform: Transform,
    /// Surface parameters.
    pub material: Material,
}

/// A ready-to-install model, as delivered by an asset loader.
#[derive(Debug, Clone)]
pub struct ModelAsset {
    /// Skin or skeleton.
    pub kind: ModelKind,
    /// Child meshes.
    pub parts: Vec<ModelPart>,
}

/// An installed model: a group node under the scene root plus its mesh
/// nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelHandle {
    /// Skin or skeleton.
    pub kind: ModelKind,
    /// Group node owning the parts.
    pub root: NodeId,
    /// Mesh child nodes, in part order.
    pub meshes: Vec<NodeId>,
}

impl ModelHandle {
    /// Add `asset` under the scene root, registering its meshes.
    pub fn install(
        graph: &mut SceneGraph,
        library: &mut MeshLibrary,
        asset: ModelAsset,
    ) -> Option<Self> {
        let root = graph.add_child(
            graph.root(),
            SceneNode::group(asset.kind.name(), Transform::IDENTITY),
        )?;
        let mut meshes = Vec::with_capacity(asset.parts.len());
        for part in asset.parts {
            let mesh = library.add(part.mesh);
            let node = SceneNode::mesh(
                part.name,
                part.transform,
                Drawable {
                    mesh,
                    material: part.material,
                },
            );
            meshes.push(graph.add_child(root, node)?);
        }
        Some(Self {
            kind: asset.kind,
            root,
            meshes,
        })
    }

    /// Set the visibility flag of every mesh node.
    pub fn set_visible(&self, graph: &mut SceneGraph, visible: bool) {
        for &node in &self.meshes {
            let _ = graph.set_visible(node, visible);
        }
    }

    /// Whether every mesh node is effectively visible.
    #[must_use]
    pub fn is_visible(&self, graph: &SceneGraph) -> bool {
        self.meshes.iter().all(|&n| graph.is_effectively_visible(n))
    }

    /// Whether every mesh node is effectively hidden.
    #[must_use]
    pub fn is_hidden(&self, graph: &SceneGraph) -> bool {
        self.meshes.iter().all(|&n| !graph.is_effectively_visible(n))
    }
}

// ---------------------------------------------------------------------------
// Procedural stand-ins
// ---------------------------------------------------------------------------

const RINGS: u32 = 16;
const SEGMENTS: u32 = 24;

fn part(
    name: impl Into<String>,
    mesh: MeshData,
    at: Vec3,
    material: Material,
) -> ModelPart {
    ModelPart {
        name: name.into(),
        mesh,
        transform: Transform::from_translation(at),
        material,
    }
}

/// Squeeze longitude so the front hemisphere spans the full texture width.
/// The back of the head clamps to the texture edge.
fn front_facing_uv(mut mesh: MeshData) -> MeshData {
    for v in &mut mesh.vertices {
        let uv = Vec2::from(v.uv);
        v.uv = [(uv.x - 0.5) * 2.0 + 0.5, uv.y];
    }
    mesh
}

/// Stylized skin figure: head (face-textured), neck, torso, arms, hips,
/// legs.
#[must_use]
pub fn procedural_skin(tint: [f32; 3]) -> ModelAsset {
    let skin = Material::solid(tint);
    let face = Material {
        face_weight: 1.0,
        ..skin
    };
    let head = Bone::Skull.anchor() + Vec3::new(0.0, -0.01, 0.005);

    let mut parts = vec![
        part(
            "head",
            front_facing_uv(MeshData::ellipsoid(
                Vec3::new(0.085, 0.115, 0.1),
                RINGS * 2,
                SEGMENTS * 2,
            )),
            head,
            face,
        ),
        part(
            "neck",
            MeshData::cylinder(0.05, 0.14, SEGMENTS),
            Vec3::new(0.0, 1.5, -0.01),
            skin,
        ),
        part(
            "torso",
            MeshData::ellipsoid(Vec3::new(0.19, 0.3, 0.12), RINGS, SEGMENTS),
            Vec3::new(0.0, 1.2, 0.0),
            skin,
        ),
        part(
            "hips",
            MeshData::ellipsoid(Vec3::new(0.17, 0.12, 0.11), RINGS, SEGMENTS),
            Bone::Pelvis.anchor(),
            skin,
        ),
    ];
    for (side, x) in [("left", -1.0), ("right", 1.0)] {
        parts.push(part(
            format!("{side} arm"),
            MeshData::ellipsoid(Vec3::new(0.045, 0.17, 0.045), RINGS, SEGMENTS),
            Vec3::new(0.24 * x, 1.22, 0.0),
            skin,
        ));
        parts.push(part(
            format!("{side} leg"),
            MeshData::ellipsoid(Vec3::new(0.075, 0.25, 0.075), RINGS, SEGMENTS),
            Vec3::new(0.1 * x, 0.66, 0.0),
            skin,
        ));
    }

    ModelAsset {
        kind: ModelKind::Skin,
        parts,
    }
}

/// Stylized skeleton whose bones sit on the [`Bone`] anchors.
#[must_use]
pub fn procedural_skeleton(tint: [f32; 3]) -> ModelAsset {
    let bone = Material::solid(tint);
    let socket = Material::solid([0.05, 0.05, 0.06]);
    let mut parts = vec![
        part(
            "cranium",
            MeshData::ellipsoid(Vec3::new(0.078, 0.095, 0.092), RINGS, SEGMENTS),
            Bone::Skull.anchor() + Vec3::new(0.0, 0.015, 0.0),
            bone,
        ),
        part(
            "mandible",
            MeshData::ellipsoid(Vec3::new(0.055, 0.025, 0.05), RINGS, SEGMENTS),
            Bone::Mandible.anchor(),
            bone,
        ),
        part(
            "sternum",
            MeshData::ellipsoid(Vec3::new(0.02, 0.08, 0.012), RINGS, SEGMENTS),
            Bone::Sternum.anchor(),
            bone,
        ),
    ];

    for (side, x) in [("left", -1.0_f32), ("right", 1.0)] {
        parts.push(part(
            format!("{side} eye socket"),
            MeshData::sphere(0.018, RINGS / 2, SEGMENTS / 2),
            Vec3::new(0.03 * x, 1.665, 0.075),
            socket,
        ));
        parts.push(part(
            format!("{side} clavicle"),
            MeshData::ellipsoid(Vec3::new(0.075, 0.012, 0.012), RINGS, SEGMENTS),
            Vec3::new(Bone::Clavicle.anchor().x.abs() * x, 1.40, 0.05),
            bone,
        ));
        let femur = Vec3::new(Bone::Femur.anchor().x.abs() * x, 0.68, 0.0);
        parts.push(part(
            format!("{side} femur"),
            MeshData::cylinder(0.02, 0.42, SEGMENTS),
            femur,
            bone,
        ));
        parts.push(part(
            format!("{side} femoral head"),
            MeshData::sphere(0.03, RINGS, SEGMENTS),
            femur + Vec3::new(-0.01 * x, 0.22, 0.0),
            bone,
        ));
    }

    // Rib cage: tori narrowing towards the top and bottom
    for i in 0..7 {
        let t = i as f32 / 6.0;
        let y = 1.36 - t * 0.2;
        let major = 0.1 + 0.04 * (1.0 - (2.0 * t - 1.0).powi(2));
        parts.push(part(
            format!("rib {}", i + 1),
            MeshData::torus(major, 0.008, 8, SEGMENTS),
            Vec3::new(0.0, y, Bone::Ribs.anchor().z),
            bone,
        ));
    }

    let vertebrae: [(&str, usize, f32, f32, f32, f32); 3] = [
        ("cervical", 4, 1.43, 1.53, 0.018, Bone::CervicalSpine.anchor().z),
        ("thoracic", 8, 1.16, 1.38, 0.02, Bone::ThoracicSpine.anchor().z),
        ("lumbar", 5, 0.98, 1.12, 0.026, Bone::LumbarSpine.anchor().z),
    ];
    for (label, count, bottom, top, radius, z) in vertebrae {
        let spacing = (top - bottom) / (count - 1) as f32;
        for i in 0..count {
            parts.push(part(
                format!("{label} vertebra {}", i + 1),
                MeshData::cylinder(radius, spacing * 0.7, 12),
                Vec3::new(0.0, bottom + spacing * i as f32, z),
                bone,
            ));
        }
    }

    parts.push(ModelPart {
        name: "pelvis".to_owned(),
        mesh: MeshData::torus(0.11, 0.03, 12, SEGMENTS),
        transform: Transform {
            translation: Bone::Pelvis.anchor(),
            rotation: Quat::from_rotation_x(-0.5),
            scale: Vec3::ONE,
        },
        material: bone,
    });

    ModelAsset {
        kind: ModelKind::Skeleton,
        parts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_adds_parts_under_one_group() {
        let mut graph = SceneGraph::new();
        let mut library = MeshLibrary::new();
        let asset = procedural_skeleton([0.9, 0.9, 0.85]);
        let part_count = asset.parts.len();

        let handle =
            ModelHandle::install(&mut graph, &mut library, asset).unwrap();

        assert_eq!(handle.meshes.len(), part_count);
        assert_eq!(library.len(), part_count);
        for &mesh in &handle.meshes {
            assert_eq!(graph.get(mesh).unwrap().parent(), Some(handle.root));
        }
    }

    #[test]
    fn visibility_toggles_every_mesh() {
        let mut graph = SceneGraph::new();
        let mut library = MeshLibrary::new();
        let handle = ModelHandle::install(
            &mut graph,
            &mut library,
            procedural_skin([0.8, 0.6, 0.5]),
        )
        .unwrap();

        assert!(handle.is_visible(&graph));
        handle.set_visible(&mut graph, false);
        assert!(handle.is_hidden(&graph));
        handle.set_visible(&mut graph, true);
        assert!(handle.is_visible(&graph));
    }

    #[test]
    fn only_the_head_carries_the_face() {
        let asset = procedural_skin([0.8, 0.6, 0.5]);
        let faced: Vec<_> = asset
            .parts
            .iter()
            .filter(|p| p.material.face_weight > 0.0)
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(faced, ["head"]);
    }
}
