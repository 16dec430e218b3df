//! In-memory [`DesignModel`] implementation.
//!
//! `SceneModel` owns the node tree, resolves live instance geometry after
//! every change (standing in for the preview process), batches edits into
//! undoable transactions and queues notifications for the editor.

use crate::anchors::{AnchorLineKind, AnchorTarget};
use crate::design_model::{
    DesignModel, InstanceInfo, ModelNotification, NodeCapabilities, PropertyValue, RenderImage,
    TransactionId,
};
use crate::error::ModelError;
use crate::id::NodeId;
use crate::instance::resolve_instances;
use crate::model::{ModelNode, NodeTree};
use crate::transaction::{TransactionStack, TransactionStats};
use std::collections::{HashMap, HashSet};

const DEFAULT_UNDO_DEPTH: usize = 100;

/// Geometry properties whose instance value comes from the solver.
const GEOMETRY_PROPERTIES: [&str; 4] = ["x", "y", "width", "height"];

pub struct SceneModel {
    tree: NodeTree,
    instances: HashMap<NodeId, InstanceInfo>,
    render_images: HashMap<NodeId, RenderImage>,
    selection: Vec<NodeId>,
    transactions: TransactionStack<NodeTree>,
    notifications: Vec<ModelNotification>,
}

impl SceneModel {
    /// Create a model whose root is an item of `root_type` sized `width × height`.
    pub fn new(root_id: &str, root_type: &str, width: f64, height: f64) -> Self {
        let root = ModelNode::new(NodeId::intern(root_id), root_type)
            .with_geometry(0.0, 0.0, width, height);
        let tree = NodeTree::new(root);
        let instances = resolve_instances(&tree);
        Self {
            tree,
            instances,
            render_images: HashMap::new(),
            selection: Vec::new(),
            transactions: TransactionStack::new(DEFAULT_UNDO_DEPTH),
            notifications: Vec::new(),
        }
    }

    /// Insert a fully built node under `parent`.
    pub fn add_node(&mut self, parent: NodeId, node: ModelNode) -> Result<NodeId, ModelError> {
        let parent_idx = self
            .tree
            .index_of(parent)
            .ok_or(ModelError::UnknownNode(parent))?;
        if !self.tree.graph[parent_idx].capabilities.container {
            return Err(ModelError::NotAContainer(parent));
        }
        let id = node.id;
        self.tree.add_node(parent_idx, node);
        self.notifications
            .push(ModelNotification::NodeAdded { node: id, parent });
        self.changed();
        self.notifications
            .push(ModelNotification::InstancesCompleted(vec![id]));
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&ModelNode> {
        self.tree.get(id)
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    /// Raw property as written, without solver overrides.
    pub fn property(&self, node: NodeId, name: &str) -> Option<&PropertyValue> {
        self.tree.get(node).and_then(|n| n.properties.get(name))
    }

    /// Replace the rendered image of a node, as the preview process would.
    pub fn set_render_image(&mut self, node: NodeId, image: RenderImage) {
        if self.tree.contains(node) {
            self.render_images.insert(node, image);
            self.notifications
                .push(ModelNotification::InstancesRenderImageChanged(vec![node]));
        }
    }

    pub fn transaction_stats(&self) -> TransactionStats {
        self.transactions.stats()
    }

    pub fn can_undo(&self) -> bool {
        self.transactions.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.transactions.can_redo()
    }

    /// Restore the state before the last committed transaction.
    pub fn undo(&mut self) -> Option<String> {
        let (tree, label) = self.transactions.undo()?;
        self.restore(tree);
        Some(label)
    }

    pub fn redo(&mut self) -> Option<String> {
        let (tree, label) = self.transactions.redo()?;
        self.restore(tree);
        Some(label)
    }

    fn restore(&mut self, tree: NodeTree) {
        let before: HashSet<NodeId> = self.tree.ids_top_down().into_iter().collect();
        let after: HashSet<NodeId> = tree.ids_top_down().into_iter().collect();
        for gone in before.difference(&after) {
            self.notifications.push(ModelNotification::NodeRemoved {
                node: *gone,
                parent: self.tree.parent_id(*gone),
            });
        }
        self.tree = tree;
        for id in self.tree.ids_top_down() {
            if !before.contains(&id)
                && let Some(parent) = self.tree.parent_id(id)
            {
                self.notifications
                    .push(ModelNotification::NodeAdded { node: id, parent });
            }
        }
        self.render_images.retain(|id, _| after.contains(id));
        let selection: Vec<NodeId> = self
            .selection
            .iter()
            .copied()
            .filter(|id| after.contains(id))
            .collect();
        if selection != self.selection {
            self.set_selected_nodes(selection);
        }
        self.resolve();
    }

    /// Re-resolve instance geometry and report nodes whose geometry moved.
    fn resolve(&mut self) {
        let fresh = resolve_instances(&self.tree);
        let mut changed: Vec<NodeId> = self
            .tree
            .ids_top_down()
            .into_iter()
            .filter(|id| self.instances.get(id) != fresh.get(id))
            .collect();
        changed.retain(|id| fresh.contains_key(id));
        self.instances = fresh;
        if !changed.is_empty() {
            log::trace!("instance informations changed for {} nodes", changed.len());
            self.notifications
                .push(ModelNotification::InstanceInformationsChanged(changed));
        }
    }

    fn changed(&mut self) {
        self.transactions.mark_dirty();
        self.resolve();
    }

    fn node_mut(&mut self, node: NodeId) -> Option<&mut ModelNode> {
        let found = self.tree.get_mut(node);
        if found.is_none() {
            log::trace!("write to stale node {node} ignored");
        }
        found
    }
}

impl DesignModel for SceneModel {
    fn root(&self) -> NodeId {
        self.tree.root_id()
    }

    fn is_valid(&self, node: NodeId) -> bool {
        self.tree.contains(node)
    }

    fn type_name(&self, node: NodeId) -> Option<String> {
        self.tree.get(node).map(|n| n.type_name.clone())
    }

    fn capabilities(&self, node: NodeId) -> NodeCapabilities {
        self.tree
            .get(node)
            .map(|n| n.capabilities)
            .unwrap_or_default()
    }

    fn has_node_source(&self, node: NodeId) -> bool {
        self.tree.get(node).is_some_and(|n| n.node_source.is_some())
    }

    fn is_visible(&self, node: NodeId) -> bool {
        self.tree.get(node).is_some_and(|n| {
            n.properties
                .get("visible")
                .and_then(PropertyValue::as_bool)
                .unwrap_or(true)
        })
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree.child_ids(node)
    }

    fn instance_parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.parent_id(node)
    }

    fn instance_info(&self, node: NodeId) -> Option<InstanceInfo> {
        self.instances.get(&node).copied()
    }

    fn instance_value(&self, node: NodeId, name: &str) -> Option<PropertyValue> {
        if GEOMETRY_PROPERTIES.contains(&name) {
            let info = self.instances.get(&node)?;
            let value = match name {
                "x" => info.position.x,
                "y" => info.position.y,
                "width" => info.size.width,
                _ => info.size.height,
            };
            return Some(PropertyValue::Number(value));
        }
        let n = self.tree.get(node)?;
        if let Some(line) = AnchorLineKind::ALL
            .into_iter()
            .find(|l| l.margin_property() == name)
        {
            return Some(PropertyValue::Number(n.anchors.margin(line)));
        }
        n.properties.get(name).cloned()
    }

    fn render_image(&self, node: NodeId) -> Option<RenderImage> {
        self.render_images.get(&node).cloned()
    }

    fn has_property(&self, node: NodeId, name: &str) -> bool {
        self.tree
            .get(node)
            .is_some_and(|n| n.properties.contains_key(name) || n.bindings.contains_key(name))
    }

    fn set_variant_property(&mut self, node: NodeId, name: &str, value: PropertyValue) {
        let Some(n) = self.node_mut(node) else { return };
        n.bindings.remove(name);
        n.properties.insert(name.to_string(), value);
        self.notifications.push(ModelNotification::InstancePropertyChanged(vec![(
            node,
            name.to_string(),
        )]));
        self.changed();
    }

    fn set_binding_property(&mut self, node: NodeId, name: &str, expression: &str) {
        let Some(n) = self.node_mut(node) else { return };
        n.bindings.insert(name.to_string(), expression.to_string());
        self.notifications.push(ModelNotification::InstancePropertyChanged(vec![(
            node,
            name.to_string(),
        )]));
        self.changed();
    }

    fn has_binding(&self, node: NodeId, name: &str) -> bool {
        self.tree
            .get(node)
            .is_some_and(|n| n.bindings.contains_key(name))
    }

    fn remove_property(&mut self, node: NodeId, name: &str) {
        let Some(n) = self.node_mut(node) else { return };
        let had = n.properties.remove(name).is_some() | n.bindings.remove(name).is_some();
        if had {
            self.notifications.push(ModelNotification::InstancePropertyChanged(vec![(
                node,
                name.to_string(),
            )]));
            self.changed();
        }
    }

    fn instance_anchor(&self, node: NodeId, line: AnchorLineKind) -> Option<AnchorTarget> {
        self.tree.get(node).and_then(|n| n.anchors.get(line))
    }

    fn set_anchor(
        &mut self,
        node: NodeId,
        line: AnchorLineKind,
        target: AnchorTarget,
    ) -> Result<(), ModelError> {
        if !self.tree.contains(node) {
            return Err(ModelError::UnknownNode(node));
        }
        if !self.can_anchor(node, target.node) {
            return Err(ModelError::NotAnchorable {
                node,
                target: target.node,
            });
        }
        if self.check_for_cycle(node, line, target.node) {
            return Err(ModelError::AnchorCycle { node, line });
        }
        if let Some(n) = self.node_mut(node) {
            n.anchors.set(line, target);
        }
        self.changed();
        Ok(())
    }

    fn remove_anchor(&mut self, node: NodeId, line: AnchorLineKind) {
        let Some(n) = self.node_mut(node) else { return };
        if n.anchors.remove(line).is_some() {
            self.changed();
        }
    }

    fn instance_margin(&self, node: NodeId, line: AnchorLineKind) -> f64 {
        self.tree
            .get(node)
            .map(|n| n.anchors.margin(line))
            .unwrap_or(0.0)
    }

    fn set_margin(&mut self, node: NodeId, line: AnchorLineKind, value: f64) {
        let Some(n) = self.node_mut(node) else { return };
        n.anchors.set_margin(line, value);
        self.changed();
    }

    fn remove_margin(&mut self, node: NodeId, line: AnchorLineKind) {
        let Some(n) = self.node_mut(node) else { return };
        if n.anchors.has_margin(line) {
            n.anchors.remove_margin(line);
            self.changed();
        }
    }

    fn can_anchor(&self, node: NodeId, other: NodeId) -> bool {
        if node == other || !self.tree.contains(other) {
            return false;
        }
        let Some(parent) = self.tree.parent_id(node) else {
            return false;
        };
        other == parent || self.tree.parent_id(other) == Some(parent)
    }

    fn check_for_cycle(&self, node: NodeId, _line: AnchorLineKind, candidate: NodeId) -> bool {
        if candidate == node || self.tree.is_ancestor_of(node, candidate) {
            return true;
        }
        // Does `candidate` already depend on `node` through any anchor?
        let mut visited = HashSet::new();
        let mut stack = vec![candidate];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(n) = self.tree.get(current) else { continue };
            for (_, target) in n.anchors.iter() {
                if target.node == node {
                    return true;
                }
                stack.push(target.node);
            }
        }
        false
    }

    fn create_node(
        &mut self,
        type_name: &str,
        parent: NodeId,
        properties: Vec<(String, PropertyValue)>,
    ) -> Result<NodeId, ModelError> {
        let mut node = ModelNode::new(NodeId::for_type(type_name), type_name);
        node.properties.extend(properties);
        self.add_node(parent, node)
    }

    fn reparent(&mut self, node: NodeId, new_parent: NodeId) -> Result<(), ModelError> {
        let child_idx = self.tree.index_of(node).ok_or(ModelError::UnknownNode(node))?;
        let parent_idx = self
            .tree
            .index_of(new_parent)
            .ok_or(ModelError::UnknownNode(new_parent))?;
        if child_idx == self.tree.root {
            return Err(ModelError::RootNode("reparented"));
        }
        if node == new_parent || self.tree.is_ancestor_of(node, new_parent) {
            return Err(ModelError::ReparentCycle {
                child: node,
                parent: new_parent,
            });
        }
        if !self.tree.graph[parent_idx].capabilities.container {
            return Err(ModelError::NotAContainer(new_parent));
        }
        let old_parent = self.tree.parent_id(node);
        if old_parent == Some(new_parent) {
            return Ok(());
        }
        self.tree.reparent(child_idx, parent_idx);
        self.notifications.push(ModelNotification::NodeReparented {
            node,
            new_parent,
            old_parent,
        });
        self.changed();
        Ok(())
    }

    fn remove_node(&mut self, node: NodeId) -> Result<(), ModelError> {
        let idx = self.tree.index_of(node).ok_or(ModelError::UnknownNode(node))?;
        if idx == self.tree.root {
            return Err(ModelError::RootNode("removed"));
        }
        let parent = self.tree.parent_id(node);
        let removed = self.tree.remove_subtree(idx);
        let removed_set: HashSet<NodeId> = removed.iter().copied().collect();
        // Anchors into the removed subtree would dangle.
        for id in self.tree.ids_top_down() {
            if let Some(n) = self.tree.get_mut(id) {
                for gone in &removed {
                    n.anchors.remove_targeting(*gone);
                }
            }
        }
        self.render_images.retain(|id, _| !removed_set.contains(id));
        for id in removed {
            let parent = if id == node { parent } else { None };
            self.notifications
                .push(ModelNotification::NodeRemoved { node: id, parent });
        }
        if self.selection.iter().any(|id| removed_set.contains(id)) {
            let selection = self
                .selection
                .iter()
                .copied()
                .filter(|id| !removed_set.contains(id))
                .collect();
            self.set_selected_nodes(selection);
        }
        self.changed();
        Ok(())
    }

    fn begin_transaction(&mut self, label: &str) -> TransactionId {
        self.transactions.begin(label, &self.tree)
    }

    fn commit(&mut self, id: TransactionId) -> Result<(), ModelError> {
        self.transactions.commit(id, &self.tree)
    }

    fn in_transaction(&self) -> bool {
        self.transactions.is_open()
    }

    fn selected_nodes(&self) -> Vec<NodeId> {
        self.selection.clone()
    }

    fn set_selected_nodes(&mut self, nodes: Vec<NodeId>) {
        let mut seen = HashSet::new();
        let selected: Vec<NodeId> = nodes
            .into_iter()
            .filter(|id| self.tree.contains(*id) && seen.insert(*id))
            .collect();
        if selected == self.selection {
            return;
        }
        let previous = std::mem::replace(&mut self.selection, selected.clone());
        self.notifications
            .push(ModelNotification::SelectionChanged { selected, previous });
    }

    fn take_notifications(&mut self) -> Vec<ModelNotification> {
        std::mem::take(&mut self.notifications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn model() -> (SceneModel, NodeId, NodeId) {
        let mut model = SceneModel::new("sm_root", "Item", 400.0, 300.0);
        let root = model.root();
        let a = model
            .add_node(
                root,
                ModelNode::new(NodeId::intern("sm_a"), "Rectangle")
                    .with_geometry(0.0, 0.0, 50.0, 50.0),
            )
            .unwrap();
        let b = model
            .add_node(
                root,
                ModelNode::new(NodeId::intern("sm_b"), "Rectangle")
                    .with_geometry(60.0, 0.0, 50.0, 50.0),
            )
            .unwrap();
        model.take_notifications();
        (model, a, b)
    }

    #[test]
    fn property_writes_queue_geometry_notifications() {
        let (mut model, a, _) = model();
        model.set_variant_property(a, "x", 20.0.into());
        let notes = model.take_notifications();
        assert!(notes.contains(&ModelNotification::InstanceInformationsChanged(vec![a])));
        assert_eq!(model.instance_value(a, "x"), Some(PropertyValue::Number(20.0)));
    }

    #[test]
    fn anchored_instance_value_reports_resolved_position() {
        let (mut model, a, _) = model();
        let root = model.root();
        model
            .set_anchor(a, AnchorLineKind::Top, AnchorTarget { node: root, line: AnchorLineKind::Top })
            .unwrap();
        model.set_margin(a, AnchorLineKind::Top, 10.0);
        assert_eq!(model.instance_value(a, "y"), Some(PropertyValue::Number(10.0)));
        assert_eq!(
            model.instance_value(a, "anchors.topMargin"),
            Some(PropertyValue::Number(10.0))
        );
    }

    #[test]
    fn anchoring_only_to_parent_or_siblings() {
        let (mut model, a, b) = model();
        let child = model
            .add_node(b, ModelNode::new(NodeId::intern("sm_b_child"), "Text"))
            .unwrap();
        let err = model
            .set_anchor(a, AnchorLineKind::Left, AnchorTarget { node: child, line: AnchorLineKind::Left })
            .unwrap_err();
        assert_eq!(err, ModelError::NotAnchorable { node: a, target: child });
        assert!(!model.has_anchor(a, AnchorLineKind::Left));
    }

    #[test]
    fn mutual_anchors_are_cycles() {
        let (mut model, a, b) = model();
        model
            .set_anchor(b, AnchorLineKind::Left, AnchorTarget { node: a, line: AnchorLineKind::Right })
            .unwrap();
        assert!(model.check_for_cycle(a, AnchorLineKind::Right, b));
        assert!(
            model
                .set_anchor(a, AnchorLineKind::Right, AnchorTarget { node: b, line: AnchorLineKind::Left })
                .is_err()
        );
        assert!(!model.has_anchor(a, AnchorLineKind::Right));
    }

    #[test]
    fn transaction_groups_gesture_into_one_undo_step() {
        let (mut model, a, _) = model();
        let tx = model.begin_transaction("move");
        model.set_variant_property(a, "x", 5.0.into());
        model.set_variant_property(a, "x", 15.0.into());
        model.commit(tx).unwrap();
        assert_eq!(model.transaction_stats(), TransactionStats { begun: 1, committed: 1 });

        assert_eq!(model.undo().as_deref(), Some("move"));
        assert_eq!(model.instance_value(a, "x"), Some(PropertyValue::Number(0.0)));
        model.redo();
        assert_eq!(model.instance_value(a, "x"), Some(PropertyValue::Number(15.0)));
    }

    #[test]
    fn removing_node_drops_anchors_and_selection() {
        let (mut model, a, b) = model();
        model
            .set_anchor(a, AnchorLineKind::Right, AnchorTarget { node: b, line: AnchorLineKind::Left })
            .unwrap();
        model.set_selected_nodes(vec![a, b]);
        model.take_notifications();

        model.remove_node(b).unwrap();
        assert!(!model.is_valid(b));
        assert!(!model.has_anchor(a, AnchorLineKind::Right));
        assert_eq!(model.selected_nodes(), vec![a]);
        let notes = model.take_notifications();
        assert!(notes.iter().any(|n| matches!(
            n,
            ModelNotification::SelectionChanged { selected, .. } if selected == &vec![a]
        )));
    }

    #[test]
    fn reparent_rejects_descendants() {
        let (mut model, a, b) = model();
        model.reparent(a, b).unwrap();
        assert_eq!(model.instance_parent(a), Some(b));
        assert_eq!(
            model.reparent(b, a),
            Err(ModelError::ReparentCycle { child: b, parent: a })
        );
    }
}
