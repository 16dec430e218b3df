//! Node tree backing [`SceneModel`](crate::scene_model::SceneModel).
//!
//! Nodes are QML object instances; edges are parent→child containment
//! through the parent's default property. Child order is the stacking order
//! (first child painted first).

use crate::anchors::NodeAnchors;
use crate::design_model::{NodeCapabilities, PropertyValue};
use crate::id::NodeId;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use std::collections::HashMap;

/// A QML object in the model.
#[derive(Debug, Clone)]
pub struct ModelNode {
    pub id: NodeId,
    pub type_name: String,
    pub properties: HashMap<String, PropertyValue>,
    /// Property name → binding expression.
    pub bindings: HashMap<String, String>,
    pub anchors: NodeAnchors,
    pub capabilities: NodeCapabilities,
    /// Opaque source override; such nodes get no visual item.
    pub node_source: Option<String>,
}

impl ModelNode {
    pub fn new(id: NodeId, type_name: &str) -> Self {
        Self {
            id,
            type_name: type_name.to_string(),
            properties: HashMap::new(),
            bindings: HashMap::new(),
            anchors: NodeAnchors::default(),
            capabilities: NodeCapabilities::default(),
            node_source: None,
        }
    }

    pub fn with_geometry(self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.with_property("x", x)
            .with_property("y", y)
            .with_property("width", width)
            .with_property("height", height)
    }

    pub fn with_property(mut self, name: &str, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.to_string(), value.into());
        self
    }

    pub fn with_capabilities(mut self, capabilities: NodeCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.properties.get(name).and_then(PropertyValue::as_f64)
    }
}

/// Containment tree with an id index and explicit child order.
#[derive(Debug, Clone)]
pub struct NodeTree {
    pub graph: StableDiGraph<ModelNode, ()>,
    pub root: NodeIndex,
    id_index: HashMap<NodeId, NodeIndex>,
    child_order: HashMap<NodeIndex, Vec<NodeIndex>>,
}

impl NodeTree {
    pub fn new(root: ModelNode) -> Self {
        let mut graph = StableDiGraph::new();
        let id = root.id;
        let root = graph.add_node(root);
        let mut id_index = HashMap::new();
        id_index.insert(id, root);
        Self {
            graph,
            root,
            id_index,
            child_order: HashMap::new(),
        }
    }

    pub fn root_id(&self) -> NodeId {
        self.graph[self.root].id
    }

    /// Append `node` as the last (topmost) child of `parent`.
    pub fn add_node(&mut self, parent: NodeIndex, node: ModelNode) -> NodeIndex {
        let id = node.id;
        let idx = self.graph.add_node(node);
        self.graph.add_edge(parent, idx, ());
        self.child_order.entry(parent).or_default().push(idx);
        self.id_index.insert(id, idx);
        idx
    }

    /// Remove a node and its whole subtree. Returns the removed ids,
    /// children before parents.
    pub fn remove_subtree(&mut self, idx: NodeIndex) -> Vec<NodeId> {
        let mut removed = Vec::new();
        for child in self.children(idx) {
            removed.extend(self.remove_subtree(child));
        }
        if let Some(parent) = self.parent(idx)
            && let Some(order) = self.child_order.get_mut(&parent)
        {
            order.retain(|c| *c != idx);
        }
        self.child_order.remove(&idx);
        if let Some(node) = self.graph.remove_node(idx) {
            self.id_index.remove(&node.id);
            removed.push(node.id);
        }
        removed
    }

    pub fn get(&self, id: NodeId) -> Option<&ModelNode> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut ModelNode> {
        self.id_index
            .get(&id)
            .copied()
            .map(|idx| &mut self.graph[idx])
    }

    pub fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.id_index.contains_key(&id)
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()
    }

    pub fn parent_id(&self, id: NodeId) -> Option<NodeId> {
        self.index_of(id)
            .and_then(|idx| self.parent(idx))
            .map(|p| self.graph[p].id)
    }

    /// Move `child` to the end of `new_parent`'s children.
    pub fn reparent(&mut self, child: NodeIndex, new_parent: NodeIndex) {
        if let Some(old_parent) = self.parent(child) {
            if let Some(edge) = self.graph.find_edge(old_parent, child) {
                self.graph.remove_edge(edge);
            }
            if let Some(order) = self.child_order.get_mut(&old_parent) {
                order.retain(|c| *c != child);
            }
        }
        self.graph.add_edge(new_parent, child, ());
        self.child_order.entry(new_parent).or_default().push(child);
    }

    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.child_order.get(&idx).cloned().unwrap_or_default()
    }

    pub fn child_ids(&self, id: NodeId) -> Vec<NodeId> {
        self.index_of(id)
            .map(|idx| {
                self.children(idx)
                    .into_iter()
                    .map(|c| self.graph[c].id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Check if `ancestor` is a parent/grandparent/etc. of `descendant`.
    pub fn is_ancestor_of(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        if ancestor == descendant {
            return false;
        }
        let Some(mut current) = self.index_of(descendant) else {
            return false;
        };
        while let Some(parent) = self.parent(current) {
            if self.graph[parent].id == ancestor {
                return true;
            }
            current = parent;
        }
        false
    }

    /// All node ids, parents before children.
    pub fn ids_top_down(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.id_index.len());
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            out.push(self.graph[idx].id);
            for child in self.children(idx).into_iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.id_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_index.is_empty()
    }
}
