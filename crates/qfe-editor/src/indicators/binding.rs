//! Marks geometry edges driven by bindings.
//!
//! A bound `x` marks the left edge, `y` the top, `width` the right and
//! `height` the bottom.

use super::{OverlayItem, anchor_line_segment};
use crate::scene::FormEditorScene;
use qfe_core::{AnchorLineKind, DesignModel, NodeId};

const BOUND_EDGES: [(&str, AnchorLineKind); 4] = [
    ("x", AnchorLineKind::Left),
    ("y", AnchorLineKind::Top),
    ("width", AnchorLineKind::Right),
    ("height", AnchorLineKind::Bottom),
];

#[derive(Debug, Default)]
pub struct BindingIndicator {
    lines: Vec<(NodeId, AnchorLineKind)>,
}

impl BindingIndicator {
    pub fn set_items(&mut self, model: &dyn DesignModel, items: &[NodeId]) {
        self.lines.clear();
        for node in items {
            if !model.is_valid(*node) {
                continue;
            }
            for (property, edge) in BOUND_EDGES {
                if model.has_binding(*node, property) {
                    self.lines.push((*node, edge));
                }
            }
        }
    }

    pub fn update_items(&mut self, model: &dyn DesignModel, items: &[NodeId]) {
        self.set_items(model, items);
    }

    pub fn lines(&self) -> &[(NodeId, AnchorLineKind)] {
        &self.lines
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn collect_overlay(&self, scene: &FormEditorScene, out: &mut Vec<OverlayItem>) {
        for (node, line) in &self.lines {
            if let Some(item) = scene.item(*node) {
                out.push(OverlayItem::BindingLine {
                    node: *node,
                    line: *line,
                    segment: anchor_line_segment(item, *line),
                });
            }
        }
    }
}
