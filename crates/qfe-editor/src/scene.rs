//! Visual item tree mirroring the model.
//!
//! One `FormEditorItem` per live, visible model node without a node-source
//! override. Items cache the instance geometry reported by the model and
//! provide hit testing for tools. The scene also owns the controller arenas
//! that on-screen handles refer to.

use crate::config::EditorConfig;
use crate::indicators::{ControllerArena, ControllerId, ResizeController, RotationController};
use crate::manipulators::resize::ResizeHandle;
use crate::manipulators::rotation::RotationHandle;
use qfe_core::geometry::map_rect;
use qfe_core::{Affine, DesignModel, NodeId, Point, Rect, RenderImage};
use std::collections::HashMap;

// ─── Item ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FormEditorItem {
    pub node: NodeId,
    pub parent: Option<NodeId>,
    /// Child items in stacking order (back to front).
    pub children: Vec<NodeId>,
    pub bounding_rect: Rect,
    pub painted_rect: Rect,
    pub content_rect: Rect,
    pub item_transform: Affine,
    pub scene_transform: Affine,
    pub render_image: Option<RenderImage>,
}

impl FormEditorItem {
    fn new(node: NodeId, parent: Option<NodeId>) -> Self {
        Self {
            node,
            parent,
            children: Vec::new(),
            bounding_rect: Rect::ZERO,
            painted_rect: Rect::ZERO,
            content_rect: Rect::ZERO,
            item_transform: Affine::IDENTITY,
            scene_transform: Affine::IDENTITY,
            render_image: None,
        }
    }

    pub fn scene_bounding_rect(&self) -> Rect {
        map_rect(self.scene_transform, self.bounding_rect)
    }

    /// Corners of the bounding rect in scene space, clockwise from top-left.
    pub fn scene_corners(&self) -> [Point; 4] {
        let r = self.bounding_rect;
        [
            self.scene_transform * Point::new(r.x0, r.y0),
            self.scene_transform * Point::new(r.x1, r.y0),
            self.scene_transform * Point::new(r.x1, r.y1),
            self.scene_transform * Point::new(r.x0, r.y1),
        ]
    }

    pub fn map_to_scene(&self, point: Point) -> Point {
        self.scene_transform * point
    }

    /// `None` for degenerate (zero-scale) items.
    pub fn map_from_scene(&self, point: Point) -> Option<Point> {
        invert(self.scene_transform).map(|inv| inv * point)
    }

    /// Item-space → `other`-space transform.
    pub fn transform_to(&self, other: &FormEditorItem) -> Option<Affine> {
        invert(other.scene_transform).map(|inv| inv * self.scene_transform)
    }

    pub fn contains_scene_point(&self, point: Point) -> bool {
        let Some(local) = self.map_from_scene(point) else {
            return false;
        };
        let r = self.bounding_rect;
        local.x >= r.x0 && local.x <= r.x1 && local.y >= r.y0 && local.y <= r.y1
    }
}

/// Inverse of an affine, or `None` when it collapses the plane.
pub fn invert(transform: Affine) -> Option<Affine> {
    if transform.determinant().abs() < 1e-12 {
        None
    } else {
        Some(transform.inverse())
    }
}

// ─── Handles ──────────────────────────────────────────────────────────────

/// An on-screen handle under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleHit {
    Resize {
        controller: ControllerId,
        node: NodeId,
        handle: ResizeHandle,
    },
    Rotation {
        controller: ControllerId,
        node: NodeId,
        handle: RotationHandle,
    },
}

impl HandleHit {
    pub fn node(&self) -> NodeId {
        match self {
            HandleHit::Resize { node, .. } | HandleHit::Rotation { node, .. } => *node,
        }
    }
}

// ─── Scene ────────────────────────────────────────────────────────────────

pub struct FormEditorScene {
    items: HashMap<NodeId, FormEditorItem>,
    root: Option<NodeId>,
    pub resize_controllers: ControllerArena<ResizeController>,
    pub rotation_controllers: ControllerArena<RotationController>,
    zoom: f64,
    handle_size: f64,
    rotation_handle_offset: f64,
}

impl FormEditorScene {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            items: HashMap::new(),
            root: None,
            resize_controllers: ControllerArena::default(),
            rotation_controllers: ControllerArena::default(),
            zoom: 1.0,
            handle_size: config.handle_size,
            rotation_handle_offset: config.rotation_handle_offset,
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn item(&self, node: NodeId) -> Option<&FormEditorItem> {
        self.items.get(&node)
    }

    pub fn has_item(&self, node: NodeId) -> bool {
        self.items.contains_key(&node)
    }

    pub fn items(&self) -> impl Iterator<Item = &FormEditorItem> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom > 0.0 {
            self.zoom = zoom;
        }
    }

    /// Resize handle side length in scene units.
    pub fn handle_extent(&self) -> f64 {
        self.handle_size / self.zoom
    }

    /// Rotation handle distance from the corner in scene units.
    pub fn rotation_offset(&self) -> f64 {
        self.rotation_handle_offset / self.zoom
    }

    // ── model synchronisation ──

    fn wants_item(model: &dyn DesignModel, node: NodeId) -> bool {
        model.is_valid(node) && model.is_visible(node) && !model.has_node_source(node)
    }

    /// Rebuild every item from the model.
    pub fn sync_from_model(&mut self, model: &dyn DesignModel) {
        self.items.clear();
        self.root = None;
        let root = model.root();
        self.add_item(model, root);
    }

    /// Create the item for `node` and its subtree. Nodes whose parent has
    /// no item (hidden or overridden subtrees) get none either. Existing
    /// items only get their geometry refreshed.
    pub fn add_item(&mut self, model: &dyn DesignModel, node: NodeId) {
        if self.items.contains_key(&node) {
            self.update_geometry(model, &[node]);
            return;
        }
        if !Self::wants_item(model, node) {
            return;
        }
        let parent = if node == model.root() {
            self.root = Some(node);
            None
        } else {
            model
                .instance_parent(node)
                .filter(|p| self.items.contains_key(p))
        };
        if parent.is_none() && self.root != Some(node) {
            log::trace!("no parent item for {node}; skipped");
            return;
        }
        self.items.insert(node, FormEditorItem::new(node, parent));
        if let Some(parent) = parent {
            self.attach_child(model, parent, node);
        }
        self.refresh_item(model, node);
        for child in model.children(node) {
            self.add_item(model, child);
        }
    }

    /// Insert `child` into `parent`'s children, keeping model order.
    fn attach_child(&mut self, model: &dyn DesignModel, parent: NodeId, child: NodeId) {
        let order = model.children(parent);
        let Some(parent_item) = self.items.get_mut(&parent) else {
            return;
        };
        parent_item.children.retain(|c| *c != child);
        parent_item.children.push(child);
        let rank = |id: &NodeId| order.iter().position(|o| o == id).unwrap_or(usize::MAX);
        parent_item.children.sort_by_key(rank);
        if let Some(item) = self.items.get_mut(&child) {
            item.parent = Some(parent);
        }
    }

    fn detach_child(&mut self, parent: Option<NodeId>, child: NodeId) {
        if let Some(parent_item) = parent.and_then(|p| self.items.get_mut(&p)) {
            parent_item.children.retain(|c| *c != child);
        }
    }

    /// Destroy the item of `node`. Its child items move to the root item.
    pub fn remove_item(&mut self, node: NodeId) {
        let Some(item) = self.items.remove(&node) else {
            return;
        };
        self.detach_child(item.parent, node);
        if self.root == Some(node) {
            self.root = None;
            self.items.clear();
            return;
        }
        for child in item.children {
            if let Some(root) = self.root
                && let Some(child_item) = self.items.get_mut(&child)
            {
                child_item.parent = Some(root);
                if let Some(root_item) = self.items.get_mut(&root) {
                    root_item.children.push(child);
                }
            }
        }
    }

    /// Destroy the items of `node` and all its descendants.
    pub fn remove_subtree(&mut self, node: NodeId) {
        let children = self
            .items
            .get(&node)
            .map(|i| i.children.clone())
            .unwrap_or_default();
        for child in children {
            self.remove_subtree(child);
        }
        self.remove_item(node);
    }

    /// Drop items whose node no longer exists in the model.
    pub fn prune(&mut self, model: &dyn DesignModel) {
        let stale: Vec<NodeId> = self
            .items
            .keys()
            .copied()
            .filter(|n| !model.is_valid(*n))
            .collect();
        for node in stale {
            self.remove_item(node);
        }
    }

    /// Follow a model reparent.
    pub fn reparent_item(&mut self, model: &dyn DesignModel, node: NodeId) {
        let Some(old_parent) = self.items.get(&node).map(|i| i.parent) else {
            self.add_item(model, node);
            return;
        };
        self.detach_child(old_parent, node);
        let new_parent = model
            .instance_parent(node)
            .filter(|p| self.items.contains_key(p));
        match new_parent {
            Some(parent) => self.attach_child(model, parent, node),
            None => self.remove_subtree(node),
        }
        self.update_geometry(model, &[node]);
    }

    /// Re-evaluate whether `node` should have an item (visibility or node
    /// source changed).
    pub fn sync_node(&mut self, model: &dyn DesignModel, node: NodeId) {
        match (self.items.contains_key(&node), Self::wants_item(model, node)) {
            (false, true) => self.add_item(model, node),
            (true, false) => self.remove_subtree(node),
            (true, true) => self.update_geometry(model, &[node]),
            (false, false) => {}
        }
    }

    /// Refresh cached geometry of `nodes` and their descendants.
    pub fn update_geometry(&mut self, model: &dyn DesignModel, nodes: &[NodeId]) {
        let mut stack: Vec<NodeId> = nodes.to_vec();
        while let Some(node) = stack.pop() {
            if let Some(item) = self.items.get(&node) {
                stack.extend(item.children.iter().copied());
                self.refresh_item(model, node);
            }
        }
    }

    fn refresh_item(&mut self, model: &dyn DesignModel, node: NodeId) {
        let Some(info) = model.instance_info(node) else {
            return;
        };
        if let Some(item) = self.items.get_mut(&node) {
            item.bounding_rect = info.bounding_rect;
            item.painted_rect = info.painted_rect;
            item.content_rect = info.content_rect;
            item.item_transform = info.item_transform;
            item.scene_transform = info.scene_transform;
        }
    }

    pub fn update_render_images(&mut self, model: &dyn DesignModel, nodes: &[NodeId]) {
        for node in nodes {
            if let Some(item) = self.items.get_mut(node) {
                item.render_image = model.render_image(*node);
            }
        }
    }

    // ── hit testing ──

    /// Items containing `pos`, topmost first. The root item comes last.
    pub fn items_at(&self, pos: Point) -> Vec<NodeId> {
        let mut out = Vec::new();
        if let Some(root) = self.root {
            self.collect_at(root, pos, &mut out);
        }
        out
    }

    fn collect_at(&self, node: NodeId, pos: Point, out: &mut Vec<NodeId>) {
        let Some(item) = self.items.get(&node) else {
            return;
        };
        // Walk children in reverse order (last painted = topmost)
        for child in item.children.iter().rev() {
            self.collect_at(*child, pos, out);
        }
        if item.contains_scene_point(pos) {
            out.push(node);
        }
    }

    /// Children of `container` whose scene rect intersects `rect`.
    pub fn children_in_rect(&self, container: NodeId, rect: Rect) -> Vec<NodeId> {
        let Some(item) = self.items.get(&container) else {
            return Vec::new();
        };
        item.children
            .iter()
            .copied()
            .filter(|c| {
                self.items.get(c).is_some_and(|child| {
                    let hit = child.scene_bounding_rect().intersect(rect);
                    hit.width() > 0.0 && hit.height() > 0.0
                })
            })
            .collect()
    }

    pub fn is_ancestor_item(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.items.get(&node).and_then(|i| i.parent);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.items.get(&p).and_then(|i| i.parent);
        }
        false
    }

    /// The resize or rotation handle under `pos`. Resize handles win.
    /// Controllers whose item is gone are skipped.
    pub fn handle_at(&self, pos: Point) -> Option<HandleHit> {
        let extent = self.handle_extent();
        for (id, controller) in self.resize_controllers.iter() {
            let Some(item) = self.items.get(&controller.node) else {
                continue;
            };
            if let Some(handle) = controller.handle_at(item, extent, pos) {
                return Some(HandleHit::Resize {
                    controller: id,
                    node: controller.node,
                    handle,
                });
            }
        }
        let offset = self.rotation_offset();
        for (id, controller) in self.rotation_controllers.iter() {
            let Some(item) = self.items.get(&controller.node) else {
                continue;
            };
            if let Some(handle) = controller.handle_at(item, extent, offset, pos) {
                return Some(HandleHit::Rotation {
                    controller: id,
                    node: controller.node,
                    handle,
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qfe_core::model::ModelNode;
    use qfe_core::SceneModel;

    fn model() -> SceneModel {
        let mut model = SceneModel::new("scene_root", "Item", 400.0, 300.0);
        let root = model.root();
        let a = model
            .add_node(
                root,
                ModelNode::new(NodeId::intern("scene_a"), "Rectangle")
                    .with_geometry(10.0, 10.0, 100.0, 100.0),
            )
            .unwrap();
        model
            .add_node(
                a,
                ModelNode::new(NodeId::intern("scene_a_child"), "Rectangle")
                    .with_geometry(10.0, 10.0, 20.0, 20.0),
            )
            .unwrap();
        model
            .add_node(
                root,
                ModelNode::new(NodeId::intern("scene_hidden"), "Rectangle")
                    .with_geometry(0.0, 0.0, 50.0, 50.0)
                    .with_property("visible", false),
            )
            .unwrap();
        model
    }

    #[test]
    fn mirrors_visible_nodes_only() {
        let model = model();
        let mut scene = FormEditorScene::new(&EditorConfig::default());
        scene.sync_from_model(&model);
        assert_eq!(scene.len(), 3);
        assert!(!scene.has_item(NodeId::intern("scene_hidden")));
        let child = scene.item(NodeId::intern("scene_a_child")).unwrap();
        assert_eq!(child.scene_bounding_rect(), Rect::new(20.0, 20.0, 40.0, 40.0));
    }

    #[test]
    fn hit_test_returns_topmost_first() {
        let model = model();
        let mut scene = FormEditorScene::new(&EditorConfig::default());
        scene.sync_from_model(&model);
        assert_eq!(
            scene.items_at(Point::new(25.0, 25.0)),
            vec![
                NodeId::intern("scene_a_child"),
                NodeId::intern("scene_a"),
                NodeId::intern("scene_root"),
            ]
        );
        assert_eq!(
            scene.items_at(Point::new(300.0, 200.0)),
            vec![NodeId::intern("scene_root")]
        );
    }

    #[test]
    fn removing_an_item_moves_children_to_root() {
        let model = model();
        let mut scene = FormEditorScene::new(&EditorConfig::default());
        scene.sync_from_model(&model);
        scene.remove_item(NodeId::intern("scene_a"));
        let child = scene.item(NodeId::intern("scene_a_child")).unwrap();
        assert_eq!(child.parent, Some(NodeId::intern("scene_root")));
        assert!(
            scene
                .item(NodeId::intern("scene_root"))
                .unwrap()
                .children
                .contains(&NodeId::intern("scene_a_child"))
        );
    }
}
