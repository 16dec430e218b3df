//! Instance solver: turns model properties and anchors into live geometry.
//!
//! Mirrors what the preview process reports back for each item. Anchors
//! override the `x`/`y`/`width`/`height` properties on the axes they
//! constrain. Targets are resolved in the anchored item's parent space:
//! the parent contributes its own `(0, 0, w, h)` rect, siblings their
//! position and size.

use crate::anchors::{AnchorLineKind, Axis};
use crate::design_model::{InstanceInfo, PropertyValue};
use crate::geometry::{Affine, Point, Rect, Size, TransformOrigin, item_transform};
use crate::id::NodeId;
use crate::model::{ModelNode, NodeTree};
use std::collections::{HashMap, HashSet};

/// Position and size of an item in its parent's space, before transforms.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Placement {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Placement {
    fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    fn local_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    fn start(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }

    fn set_axis(&mut self, axis: Axis, start: f64, extent: f64) {
        match axis {
            Axis::X => {
                self.x = start;
                self.width = extent;
            }
            Axis::Y => {
                self.y = start;
                self.height = extent;
            }
        }
    }
}

struct Solver<'a> {
    tree: &'a NodeTree,
    placements: HashMap<NodeId, Placement>,
    resolving: HashSet<NodeId>,
}

impl<'a> Solver<'a> {
    fn placement(&mut self, id: NodeId) -> Placement {
        if let Some(p) = self.placements.get(&id) {
            return *p;
        }
        let tree = self.tree;
        let Some(node) = tree.get(id) else {
            return Placement::default();
        };
        let base = Placement {
            x: node.number("x").unwrap_or(0.0),
            y: node.number("y").unwrap_or(0.0),
            width: node.number("width").unwrap_or(0.0).max(0.0),
            height: node.number("height").unwrap_or(0.0).max(0.0),
        };
        // Anchor loops are rejected when written; this guards stale data.
        if !self.resolving.insert(id) {
            log::warn!("anchor loop while resolving {id}");
            return base;
        }
        let mut placement = base;
        for axis in [Axis::X, Axis::Y] {
            self.apply_axis(node, axis, &mut placement);
        }
        self.resolving.remove(&id);
        self.placements.insert(id, placement);
        placement
    }

    /// Coordinate of `target.line` in the parent space of `node`.
    fn target_coordinate(&mut self, node: &ModelNode, line: AnchorLineKind) -> Option<f64> {
        let target = node.anchors.get(line)?;
        let parent = self.tree.parent_id(node.id)?;
        let rect = if target.node == parent {
            self.placement(parent).local_rect()
        } else if self.tree.parent_id(target.node) == Some(parent) {
            self.placement(target.node).rect()
        } else {
            return None;
        };
        Some(target.line.coordinate_in(rect))
    }

    fn apply_axis(&mut self, node: &ModelNode, axis: Axis, placement: &mut Placement) {
        let [lead_line, trail_line, center_line] = axis.lines();
        let lead = self
            .target_coordinate(node, lead_line)
            .map(|c| c + node.anchors.margin(lead_line));
        let trail = self
            .target_coordinate(node, trail_line)
            .map(|c| c - node.anchors.margin(trail_line));
        let center = self
            .target_coordinate(node, center_line)
            .map(|c| c + node.anchors.margin(center_line));

        let extent = placement.extent(axis);
        let (start, extent) = match (lead, trail, center) {
            (Some(l), Some(t), _) => (l, (t - l).max(0.0)),
            (Some(l), None, Some(c)) => (l, (2.0 * (c - l)).max(0.0)),
            (None, Some(t), Some(c)) => {
                let e = (2.0 * (t - c)).max(0.0);
                (t - e, e)
            }
            (Some(l), None, None) => (l, extent),
            (None, Some(t), None) => (t - extent, extent),
            (None, None, Some(c)) => (c - extent / 2.0, extent),
            (None, None, None) => (placement.start(axis), extent),
        };
        placement.set_axis(axis, start, extent);
    }
}

fn content_rect(node: &ModelNode, local: Rect) -> Rect {
    let padding = node.number("padding").unwrap_or(0.0);
    let side = |name: &str| node.number(name).unwrap_or(padding);
    let (l, t, r, b) = (
        side("leftPadding"),
        side("topPadding"),
        side("rightPadding"),
        side("bottomPadding"),
    );
    Rect::new(
        local.x0 + l,
        local.y0 + t,
        (local.x1 - r).max(local.x0 + l),
        (local.y1 - b).max(local.y0 + t),
    )
}

/// Resolve live geometry for every node in the tree.
pub fn resolve_instances(tree: &NodeTree) -> HashMap<NodeId, InstanceInfo> {
    let mut solver = Solver {
        tree,
        placements: HashMap::new(),
        resolving: HashSet::new(),
    };
    let mut out: HashMap<NodeId, InstanceInfo> = HashMap::with_capacity(tree.len());

    // Parents come first, so their scene transforms are ready.
    for id in tree.ids_top_down() {
        let Some(node) = tree.get(id) else { continue };
        let placement = solver.placement(id);
        let parent = tree.parent_id(id);
        let rotation = node.number("rotation").unwrap_or(0.0);
        let scale = node.number("scale").unwrap_or(1.0);
        let transform_origin = node
            .properties
            .get("transformOrigin")
            .and_then(PropertyValue::as_str)
            .and_then(TransformOrigin::from_qml)
            .unwrap_or_default();
        let size = Size::new(placement.width, placement.height);
        let position = Point::new(placement.x, placement.y);
        let item_transform = item_transform(position, size, rotation, scale, transform_origin);
        let parent_scene = parent
            .and_then(|p| out.get(&p))
            .map(|info| info.scene_transform)
            .unwrap_or(Affine::IDENTITY);
        let bounding_rect = placement.local_rect();

        out.insert(
            id,
            InstanceInfo {
                parent,
                bounding_rect,
                painted_rect: bounding_rect,
                content_rect: content_rect(node, bounding_rect),
                item_transform,
                scene_transform: parent_scene * item_transform,
                position,
                size,
                rotation,
                scale,
                transform_origin,
            },
        );
    }
    out
}
