//! The contract between the form editor and the QML model it edits.
//!
//! The editor never touches the node graph, the rewriter or the preview
//! process directly. Everything it needs goes through [`DesignModel`]:
//! instance geometry queries, property and anchor writes, transactional
//! batching, selection, and a queue of push notifications from the live
//! instance side.

use crate::anchors::{AnchorLineKind, AnchorTarget};
use crate::error::ModelError;
use crate::geometry::{Affine, Point, Rect, Size, TransformOrigin};
use crate::id::NodeId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A property value as stored in the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Number(f64),
    Bool(bool),
    String(String),
    /// An enumeration literal such as `Item.TopLeft`.
    Enum(String),
}

impl PropertyValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) | PropertyValue::Enum(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

/// What the editor may do with a node, derived from its type metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCapabilities {
    pub movable: bool,
    pub resizable: bool,
    pub rotatable: bool,
    /// Can hold child items (has a default `data` property).
    pub container: bool,
    /// Positions its children itself (Row, Column, layouts).
    pub layout: bool,
    /// Shows one child at a time (StackLayout, SwipeView).
    pub stacked_container: bool,
    /// False for component instances whose inner items are read-only.
    pub content_editable: bool,
}

impl Default for NodeCapabilities {
    fn default() -> Self {
        Self {
            movable: true,
            resizable: true,
            rotatable: true,
            container: true,
            layout: false,
            stacked_container: false,
            content_editable: true,
        }
    }
}

/// Live geometry of a node as reported by the running preview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceInfo {
    pub parent: Option<NodeId>,
    /// Item-space bounding rect, `(0, 0, width, height)` for plain items.
    pub bounding_rect: Rect,
    /// Item-space rect covered by painting (shadows, overflowing text).
    pub painted_rect: Rect,
    /// Item-space rect of the content item, inset by the item's padding.
    pub content_rect: Rect,
    /// Item → parent transform.
    pub item_transform: Affine,
    /// Item → scene transform.
    pub scene_transform: Affine,
    pub position: Point,
    pub size: Size,
    pub rotation: f64,
    pub scale: f64,
    pub transform_origin: TransformOrigin,
}

impl InstanceInfo {
    /// Bounding rect mapped into scene space.
    pub fn scene_bounding_rect(&self) -> Rect {
        crate::geometry::map_rect(self.scene_transform, self.bounding_rect)
    }
}

/// An opaque rendered image handed over by the instance process.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Arc<[u8]>,
}

/// Handle of an open transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId(pub u64);

/// Push notifications from the model and the instance process, delivered
/// in the order they were produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelNotification {
    SelectionChanged {
        selected: Vec<NodeId>,
        previous: Vec<NodeId>,
    },
    NodeAdded {
        node: NodeId,
        parent: NodeId,
    },
    NodeRemoved {
        node: NodeId,
        parent: Option<NodeId>,
    },
    NodeReparented {
        node: NodeId,
        new_parent: NodeId,
        old_parent: Option<NodeId>,
    },
    InstancesCompleted(Vec<NodeId>),
    InstanceInformationsChanged(Vec<NodeId>),
    InstancesRenderImageChanged(Vec<NodeId>),
    InstancePropertyChanged(Vec<(NodeId, String)>),
}

/// The narrow model interface consumed by the form editor.
pub trait DesignModel {
    fn root(&self) -> NodeId;

    /// False once the node has been removed from the model.
    fn is_valid(&self, node: NodeId) -> bool;

    fn type_name(&self, node: NodeId) -> Option<String>;

    fn capabilities(&self, node: NodeId) -> NodeCapabilities;

    /// True if an opaque node-source override replaces the node's visuals.
    fn has_node_source(&self, node: NodeId) -> bool;

    fn is_visible(&self, node: NodeId) -> bool;

    /// Direct children in stacking order (back to front).
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn instance_parent(&self, node: NodeId) -> Option<NodeId>;

    fn instance_info(&self, node: NodeId) -> Option<InstanceInfo>;

    fn instance_value(&self, node: NodeId, name: &str) -> Option<PropertyValue>;

    fn render_image(&self, node: NodeId) -> Option<RenderImage>;

    fn has_property(&self, node: NodeId, name: &str) -> bool;

    fn set_variant_property(&mut self, node: NodeId, name: &str, value: PropertyValue);

    fn set_binding_property(&mut self, node: NodeId, name: &str, expression: &str);

    fn has_binding(&self, node: NodeId, name: &str) -> bool;

    fn remove_property(&mut self, node: NodeId, name: &str);

    // ── anchors ──

    fn has_anchor(&self, node: NodeId, line: AnchorLineKind) -> bool {
        self.instance_anchor(node, line).is_some()
    }

    fn has_anchors(&self, node: NodeId) -> bool {
        AnchorLineKind::ALL
            .into_iter()
            .any(|line| self.has_anchor(node, line))
    }

    fn instance_anchor(&self, node: NodeId, line: AnchorLineKind) -> Option<AnchorTarget>;

    /// Anchor `node.line` to `target`. Rejects cycles and targets that are
    /// neither the parent nor a sibling.
    fn set_anchor(
        &mut self,
        node: NodeId,
        line: AnchorLineKind,
        target: AnchorTarget,
    ) -> Result<(), ModelError>;

    fn remove_anchor(&mut self, node: NodeId, line: AnchorLineKind);

    fn instance_margin(&self, node: NodeId, line: AnchorLineKind) -> f64;

    fn set_margin(&mut self, node: NodeId, line: AnchorLineKind, value: f64);

    fn remove_margin(&mut self, node: NodeId, line: AnchorLineKind);

    /// `other` is the parent or a sibling of `node`.
    fn can_anchor(&self, node: NodeId, other: NodeId) -> bool;

    /// True if anchoring `node.line` to `candidate` would create a cycle.
    fn check_for_cycle(&self, node: NodeId, line: AnchorLineKind, candidate: NodeId) -> bool;

    // ── structure ──

    fn create_node(
        &mut self,
        type_name: &str,
        parent: NodeId,
        properties: Vec<(String, PropertyValue)>,
    ) -> Result<NodeId, ModelError>;

    /// Move `node` into the default property of `new_parent`.
    fn reparent(&mut self, node: NodeId, new_parent: NodeId) -> Result<(), ModelError>;

    fn remove_node(&mut self, node: NodeId) -> Result<(), ModelError>;

    // ── transactions ──

    fn begin_transaction(&mut self, label: &str) -> TransactionId;

    fn commit(&mut self, id: TransactionId) -> Result<(), ModelError>;

    fn in_transaction(&self) -> bool;

    // ── selection ──

    fn selected_nodes(&self) -> Vec<NodeId>;

    fn set_selected_nodes(&mut self, nodes: Vec<NodeId>);

    // ── notifications ──

    /// Drain queued notifications, oldest first.
    fn take_notifications(&mut self) -> Vec<ModelNotification>;
}
