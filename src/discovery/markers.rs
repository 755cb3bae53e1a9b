//! Marker layer: one scene node per non-hidden condition, styled from its
//! scan progress.

use std::f32::consts::TAU;

use glam::Vec3;
use rustc_hash::FxHashMap;

use super::condition::{MarkerShape, MarkerVisual};
use super::events::DiscoveryEvent;
use crate::scene::{
    Drawable, Material, MeshData, MeshId, MeshLibrary, NodeId, SceneGraph,
    SceneNode, Transform,
};

/// Colors the layer styles markers with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerPalette {
    /// Color blended in as scan progress grows.
    pub scanning: [f32; 3],
    /// Terminal color once discovered.
    pub discovered: [f32; 3],
}

#[derive(Debug, Clone)]
struct Marker {
    node: NodeId,
    position: Vec3,
    visual: MarkerVisual,
    ratio: f32,
    in_range: bool,
    discovered: bool,
    phase: f32,
}

/// Scene nodes for discovery markers, grouped under one parent.
#[derive(Debug)]
pub struct MarkerLayer {
    group: NodeId,
    shapes: [MeshId; 3],
    markers: FxHashMap<String, Marker>,
    palette: MarkerPalette,
}

fn shape_slot(shape: MarkerShape) -> usize {
    match shape {
        MarkerShape::Octahedron => 0,
        MarkerShape::Sphere => 1,
        MarkerShape::Ring => 2,
    }
}

fn mix(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    let t = t.clamp(0.0, 1.0);
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

impl MarkerLayer {
    /// Register the unit marker shapes and add the layer's group node under
    /// the scene root. Returns `None` only if the graph rejects the group.
    pub fn new(
        graph: &mut SceneGraph,
        meshes: &mut MeshLibrary,
        palette: MarkerPalette,
    ) -> Option<Self> {
        let shapes = [
            meshes.add(MeshData::octahedron(1.0)),
            meshes.add(MeshData::sphere(1.0, 10, 16)),
            meshes.add(MeshData::torus(1.0, 0.25, 8, 20)),
        ];
        let group = graph.add_child(
            graph.root(),
            SceneNode::group("markers", Transform::IDENTITY),
        )?;
        Some(Self {
            group,
            shapes,
            markers: FxHashMap::default(),
            palette,
        })
    }

    /// Number of live markers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Whether no markers are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Scene node of a condition's marker.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<NodeId> {
        self.markers.get(id).map(|m| m.node)
    }

    /// Group node all markers hang from.
    #[must_use]
    pub fn group(&self) -> NodeId {
        self.group
    }

    /// Replace the palette.
    pub fn set_palette(&mut self, palette: MarkerPalette) {
        self.palette = palette;
    }

    /// Mirror discovery events into the scene.
    pub fn apply(&mut self, graph: &mut SceneGraph, events: &[DiscoveryEvent]) {
        for event in events {
            match event {
                DiscoveryEvent::MarkerSpawned {
                    id,
                    position,
                    visual,
                } => self.spawn(graph, id, *position, *visual),
                DiscoveryEvent::MarkerRemoved { id } => {
                    if let Some(marker) = self.markers.remove(id) {
                        let _ = graph.remove_subtree(marker.node);
                    }
                }
                DiscoveryEvent::Progress {
                    id,
                    ratio,
                    in_range,
                } => {
                    if let Some(marker) = self.markers.get_mut(id) {
                        marker.ratio = *ratio;
                        marker.in_range = *in_range;
                    }
                }
                DiscoveryEvent::Discovered { id, .. } => {
                    if let Some(marker) = self.markers.get_mut(id) {
                        marker.discovered = true;
                        marker.ratio = 1.0;
                    }
                }
                DiscoveryEvent::ContextChanged { .. } => {}
            }
        }
    }

    fn spawn(
        &mut self,
        graph: &mut SceneGraph,
        id: &str,
        position: Vec3,
        visual: MarkerVisual,
    ) {
        if let Some(old) = self.markers.remove(id) {
            let _ = graph.remove_subtree(old.node);
        }
        let node = SceneNode::mesh(
            format!("marker {id}"),
            Transform::from_translation(position),
            Drawable {
                mesh: self.shapes[shape_slot(visual.shape)],
                material: Material::solid(visual.color),
            },
        );
        let Some(node) = graph.add_child(self.group, node) else {
            return;
        };
        let _ = self.markers.insert(
            id.to_owned(),
            Marker {
                node,
                position,
                visual,
                ratio: 0.0,
                in_range: false,
                discovered: false,
                phase: 0.0,
            },
        );
    }

    /// Update every marker's transform and material for this frame.
    ///
    /// Scanning markers fade in, grow and shift toward the scanning color as
    /// their ratio rises, and pulse while the mask is over them. Discovered
    /// markers hold a fixed, glowing highlight.
    pub fn animate(&mut self, graph: &mut SceneGraph, dt: f32) {
        let palette = self.palette;
        for marker in self.markers.values_mut() {
            let visual = marker.visual;
            let (scale, material) = if marker.discovered {
                let rgb = palette.discovered;
                (
                    visual.size * 1.25,
                    Material {
                        tint: [rgb[0], rgb[1], rgb[2], 1.0],
                        emissive: rgb.map(|c| c * 0.6),
                        face_weight: 0.0,
                    },
                )
            } else {
                let pulse = if marker.in_range {
                    marker.phase =
                        (marker.phase + dt * visual.pulse_rate * TAU) % TAU;
                    1.0 + 0.15 * marker.phase.sin()
                } else {
                    marker.phase = 0.0;
                    1.0
                };
                let rgb = mix(visual.color, palette.scanning, marker.ratio);
                (
                    visual.size * (0.6 + 0.4 * marker.ratio) * pulse,
                    Material {
                        tint: [rgb[0], rgb[1], rgb[2], 0.35 + 0.65 * marker.ratio],
                        emissive: rgb.map(|c| c * 0.25 * marker.ratio),
                        face_weight: 0.0,
                    },
                )
            };

            if let Some(node) = graph.get_mut(marker.node) {
                node.transform = Transform {
                    scale: Vec3::splat(scale),
                    ..Transform::from_translation(marker.position)
                };
                if let Some(drawable) = &mut node.drawable {
                    drawable.material = material;
                }
            }
        }
    }

    /// Remove every marker node.
    pub fn clear(&mut self, graph: &mut SceneGraph) {
        for (_, marker) in self.markers.drain() {
            let _ = graph.remove_subtree(marker.node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::condition::{Category, Severity};
    use crate::discovery::events::DiscoveryMethod;

    const PALETTE: MarkerPalette = MarkerPalette {
        scanning: [1.0, 1.0, 0.0],
        discovered: [0.0, 1.0, 0.0],
    };

    fn spawn_event(id: &str) -> DiscoveryEvent {
        DiscoveryEvent::MarkerSpawned {
            id: id.to_owned(),
            position: Vec3::new(0.0, 1.0, 0.0),
            visual: Category::Fracture.marker_visual(Severity::High),
        }
    }

    fn material(layer: &MarkerLayer, graph: &SceneGraph, id: &str) -> Material {
        let node = graph.get(layer.node(id).unwrap()).unwrap();
        node.drawable.unwrap().material
    }

    #[test]
    fn spawn_and_remove_follow_events() {
        let mut graph = SceneGraph::new();
        let mut meshes = MeshLibrary::new();
        let mut layer = MarkerLayer::new(&mut graph, &mut meshes, PALETTE).unwrap();

        layer.apply(&mut graph, &[spawn_event("a"), spawn_event("b")]);
        assert_eq!(layer.len(), 2);
        assert_eq!(graph.get(layer.group()).unwrap().children().len(), 2);

        layer.apply(
            &mut graph,
            &[DiscoveryEvent::MarkerRemoved { id: "a".to_owned() }],
        );
        assert_eq!(layer.len(), 1);
        assert!(layer.node("a").is_none());

        layer.clear(&mut graph);
        assert!(layer.is_empty());
        assert!(graph.get(layer.group()).unwrap().children().is_empty());
    }

    #[test]
    fn progress_fades_markers_in() {
        let mut graph = SceneGraph::new();
        let mut meshes = MeshLibrary::new();
        let mut layer = MarkerLayer::new(&mut graph, &mut meshes, PALETTE).unwrap();
        layer.apply(&mut graph, &[spawn_event("a")]);

        layer.animate(&mut graph, 0.016);
        let start = material(&layer, &graph, "a").tint[3];

        layer.apply(
            &mut graph,
            &[DiscoveryEvent::Progress {
                id: "a".to_owned(),
                ratio: 0.5,
                in_range: true,
            }],
        );
        layer.animate(&mut graph, 0.016);
        let half = material(&layer, &graph, "a").tint[3];
        assert!(half > start);
    }

    #[test]
    fn discovered_markers_use_terminal_style() {
        let mut graph = SceneGraph::new();
        let mut meshes = MeshLibrary::new();
        let mut layer = MarkerLayer::new(&mut graph, &mut meshes, PALETTE).unwrap();
        layer.apply(&mut graph, &[spawn_event("a")]);
        layer.apply(
            &mut graph,
            &[DiscoveryEvent::Discovered {
                id: "a".to_owned(),
                name: "A".to_owned(),
                severity: Severity::High,
                position: Vec3::ZERO,
                elapsed_ms: 10,
                method: DiscoveryMethod::Click,
            }],
        );
        layer.animate(&mut graph, 0.016);
        let m = material(&layer, &graph, "a");
        assert_eq!(m.tint, [0.0, 1.0, 0.0, 1.0]);
    }
}
