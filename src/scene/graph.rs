//! Single-parent scene tree stored in a flat arena.

use glam::{Mat4, Quat, Vec3};

use super::mesh::MeshId;

// ---------------------------------------------------------------------------
// Node data
// ---------------------------------------------------------------------------

/// Handle to a node in a [`SceneGraph`]. Slots are never reused, so a
/// handle to a removed node stays invalid forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Local translation / rotation / scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation relative to the parent.
    pub translation: Vec3,
    /// Rotation relative to the parent.
    pub rotation: Quat,
    /// Non-uniform scale.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// No translation, rotation or scale.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Pure translation.
    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Local matrix.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            self.rotation,
            self.translation,
        )
    }
}

/// Surface parameters the mesh pass reads per draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Base color; alpha below 1 blends.
    pub tint: [f32; 4],
    /// Additive emissive color.
    pub emissive: [f32; 3],
    /// How much the face texture replaces the tint (0 = none).
    pub face_weight: f32,
}

impl Material {
    /// Opaque material of the given color.
    #[must_use]
    pub fn solid(rgb: [f32; 3]) -> Self {
        Self {
            tint: [rgb[0], rgb[1], rgb[2], 1.0],
            emissive: [0.0; 3],
            face_weight: 0.0,
        }
    }
}

/// Mesh + material attached to a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drawable {
    /// Geometry.
    pub mesh: MeshId,
    /// Surface parameters.
    pub material: Material,
}

/// One node of the tree.
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Debug name.
    pub name: String,
    /// Local transform.
    pub transform: Transform,
    /// Own visibility flag. A node draws only if it and every ancestor are
    /// visible.
    pub visible: bool,
    /// Optional geometry.
    pub drawable: Option<Drawable>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    /// A visible node with no geometry.
    #[must_use]
    pub fn group(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
            visible: true,
            drawable: None,
            parent: None,
            children: Vec::new(),
        }
    }

    /// A visible node drawing `drawable`.
    #[must_use]
    pub fn mesh(
        name: impl Into<String>,
        transform: Transform,
        drawable: Drawable,
    ) -> Self {
        Self {
            drawable: Some(drawable),
            ..Self::group(name, transform)
        }
    }

    /// Parent node, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Direct children in insertion order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// A drawable node resolved for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    /// Source node.
    pub node: NodeId,
    /// Geometry.
    pub mesh: MeshId,
    /// Surface parameters.
    pub material: Material,
    /// Accumulated world matrix.
    pub world: Mat4,
    /// Whether the node and all its ancestors are visible right now.
    pub visible: bool,
}

// ---------------------------------------------------------------------------
// SceneGraph
// ---------------------------------------------------------------------------

/// Scene tree. Owns every node; the root cannot be removed.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<Option<SceneNode>>,
    root: NodeId,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a tree holding only the root node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(SceneNode::group("root", Transform::IDENTITY))],
            root: NodeId(0),
        }
    }

    /// Top-level node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Look up a live node.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    /// Look up a live node mutably.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Whether `id` refers to a live node.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    /// Always false: the root is permanent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Insert `node` under `parent`. Returns `None` if the parent is gone.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        mut node: SceneNode,
    ) -> Option<NodeId> {
        if !self.contains(parent) {
            return None;
        }
        let id = NodeId(self.nodes.len() as u32);
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(Some(node));
        self.get_mut(parent)?.children.push(id);
        Some(id)
    }

    /// Remove `id` and everything below it. Returns the number of nodes
    /// removed (0 for the root or a stale id).
    pub fn remove_subtree(&mut self, id: NodeId) -> usize {
        if id == self.root || !self.contains(id) {
            return 0;
        }
        if let Some(parent) = self.get(id).and_then(SceneNode::parent) {
            if let Some(p) = self.get_mut(parent) {
                p.children.retain(|&c| c != id);
            }
        }

        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) =
                self.nodes.get_mut(next.index()).and_then(Option::take)
            {
                stack.extend(node.children);
                removed += 1;
            }
        }
        removed
    }

    /// Move `id` under `new_parent`. Refuses moves that would create a cycle
    /// or detach the root.
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId) -> bool {
        if id == self.root
            || !self.contains(id)
            || !self.contains(new_parent)
            || self.is_ancestor_or_self(id, new_parent)
        {
            return false;
        }
        if let Some(old) = self.get(id).and_then(SceneNode::parent) {
            if let Some(p) = self.get_mut(old) {
                p.children.retain(|&c| c != id);
            }
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = Some(new_parent);
        }
        if let Some(p) = self.get_mut(new_parent) {
            p.children.push(id);
        }
        true
    }

    /// Whether `ancestor` is `node` or lies on its parent chain.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.get(id).and_then(SceneNode::parent);
        }
        false
    }

    /// Set a node's own visibility flag. Returns false for stale ids.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> bool {
        match self.get_mut(id) {
            Some(node) => {
                node.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Whether the node and every ancestor are visible.
    #[must_use]
    pub fn is_effectively_visible(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(next) = cursor {
            match self.get(next) {
                Some(node) if node.visible => cursor = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Accumulated world matrix of a node (identity for stale ids).
    #[must_use]
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut cursor = Some(id);
        while let Some(next) = cursor {
            let Some(node) = self.get(next) else { break };
            matrix = node.transform.matrix() * matrix;
            cursor = node.parent;
        }
        matrix
    }

    /// World-space origin of a node.
    #[must_use]
    pub fn world_position(&self, id: NodeId) -> Vec3 {
        self.world_matrix(id).transform_point3(Vec3::ZERO)
    }

    /// Every drawable node in depth-first order, visible or not. The order
    /// is stable between calls as long as the tree is not edited, so the
    /// index into the result can serve as a per-draw uniform slot.
    #[must_use]
    pub fn draw_items(&self) -> Vec<DrawItem> {
        let mut items = Vec::new();
        self.collect(self.root, Mat4::IDENTITY, true, &mut items);
        items
    }

    fn collect(
        &self,
        id: NodeId,
        parent_world: Mat4,
        parent_visible: bool,
        out: &mut Vec<DrawItem>,
    ) {
        let Some(node) = self.get(id) else { return };
        let world = parent_world * node.transform.matrix();
        let visible = parent_visible && node.visible;
        if let Some(drawable) = node.drawable {
            out.push(DrawItem {
                node: id,
                mesh: drawable.mesh,
                material: drawable.material,
                world,
                visible,
            });
        }
        for &child in &node.children {
            self.collect(child, world, visible, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh_node(name: &str) -> SceneNode {
        SceneNode::mesh(
            name,
            Transform::from_translation(Vec3::X),
            Drawable {
                mesh: MeshId(0),
                material: Material::solid([1.0; 3]),
            },
        )
    }

    #[test]
    fn children_inherit_transforms() {
        let mut graph = SceneGraph::new();
        let a = graph.add_child(graph.root(), mesh_node("a")).unwrap();
        let b = graph.add_child(a, mesh_node("b")).unwrap();
        assert!((graph.world_position(b) - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn remove_subtree_drops_descendants() {
        let mut graph = SceneGraph::new();
        let a = graph.add_child(graph.root(), mesh_node("a")).unwrap();
        let b = graph.add_child(a, mesh_node("b")).unwrap();
        let _ = graph.add_child(b, mesh_node("c")).unwrap();
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.remove_subtree(a), 3);
        assert_eq!(graph.len(), 1);
        assert!(!graph.contains(b));
        assert!(graph.get(graph.root()).unwrap().children().is_empty());
    }

    #[test]
    fn root_cannot_be_removed() {
        let mut graph = SceneGraph::new();
        assert_eq!(graph.remove_subtree(graph.root()), 0);
        assert!(graph.contains(graph.root()));
    }

    #[test]
    fn reparent_rejects_cycles() {
        let mut graph = SceneGraph::new();
        let a = graph.add_child(graph.root(), mesh_node("a")).unwrap();
        let b = graph.add_child(a, mesh_node("b")).unwrap();
        assert!(!graph.reparent(a, b));
        assert!(!graph.reparent(a, a));
        assert!(graph.reparent(b, graph.root()));
        assert_eq!(graph.get(b).unwrap().parent(), Some(graph.root()));
        assert!(graph.get(a).unwrap().children().is_empty());
    }

    #[test]
    fn hidden_parent_hides_children() {
        let mut graph = SceneGraph::new();
        let a = graph.add_child(graph.root(), mesh_node("a")).unwrap();
        let b = graph.add_child(a, mesh_node("b")).unwrap();
        assert!(graph.set_visible(a, false));
        assert!(!graph.is_effectively_visible(b));
        let items = graph.draw_items();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|item| !item.visible));
    }

    #[test]
    fn add_under_stale_parent_fails() {
        let mut graph = SceneGraph::new();
        let a = graph.add_child(graph.root(), mesh_node("a")).unwrap();
        let _ = graph.remove_subtree(a);
        assert!(graph.add_child(a, mesh_node("b")).is_none());
        assert!(!graph.set_visible(a, true));
    }
}
