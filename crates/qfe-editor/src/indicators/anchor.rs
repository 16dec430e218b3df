//! Anchor lines of the selected item and the connections of its existing
//! anchors. While the anchor tool is dragging, candidate target lines are
//! shown highlighted.

use super::{OverlayItem, anchor_line_segment};
use crate::scene::FormEditorScene;
use qfe_core::{AnchorLineKind, DesignModel, NodeId};

#[derive(Debug, Default)]
pub struct AnchorIndicator {
    items: Vec<NodeId>,
    highlighted: Option<(NodeId, AnchorLineKind)>,
    targets: Vec<(NodeId, AnchorLineKind)>,
}

impl AnchorIndicator {
    /// Only a single selected item shows anchor lines.
    pub fn set_items(&mut self, model: &dyn DesignModel, items: &[NodeId]) {
        self.items = match items {
            [node] if model.is_valid(*node) && *node != model.root() => vec![*node],
            _ => Vec::new(),
        };
        self.highlighted = None;
        self.targets.clear();
    }

    pub fn update_items(&mut self, model: &dyn DesignModel) {
        self.items.retain(|n| model.is_valid(*n));
        if let Some((node, _)) = self.highlighted
            && !model.is_valid(node)
        {
            self.highlighted = None;
        }
        self.targets.retain(|(n, _)| model.is_valid(*n));
    }

    pub fn items(&self) -> &[NodeId] {
        &self.items
    }

    pub fn set_highlighted(&mut self, line: Option<(NodeId, AnchorLineKind)>) {
        self.highlighted = line;
    }

    pub fn highlighted(&self) -> Option<(NodeId, AnchorLineKind)> {
        self.highlighted
    }

    pub fn set_target_lines(&mut self, targets: Vec<(NodeId, AnchorLineKind)>) {
        self.targets = targets;
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.highlighted = None;
        self.targets.clear();
    }

    pub fn collect_overlay(
        &self,
        model: &dyn DesignModel,
        scene: &FormEditorScene,
        out: &mut Vec<OverlayItem>,
    ) {
        for node in &self.items {
            let Some(item) = scene.item(*node) else {
                continue;
            };
            for line in AnchorLineKind::ALL {
                let segment = anchor_line_segment(item, line);
                out.push(OverlayItem::AnchorLine {
                    node: *node,
                    line,
                    segment,
                    highlighted: self.highlighted == Some((*node, line)),
                });
                let Some(target) = model.instance_anchor(*node, line) else {
                    continue;
                };
                let Some(target_item) = scene.item(target.node) else {
                    continue;
                };
                let to = anchor_line_segment(target_item, target.line);
                out.push(OverlayItem::AnchorConnection {
                    node: *node,
                    line,
                    target,
                    from: segment.p0.midpoint(segment.p1),
                    to: to.p0.midpoint(to.p1),
                });
            }
        }
        for (node, line) in &self.targets {
            if let Some(item) = scene.item(*node) {
                out.push(OverlayItem::AnchorLine {
                    node: *node,
                    line: *line,
                    segment: anchor_line_segment(item, *line),
                    highlighted: true,
                });
            }
        }
    }
}
