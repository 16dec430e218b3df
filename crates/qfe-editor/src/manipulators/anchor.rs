//! Explicit anchor editing.

use super::commit;
use crate::snapping::snapper::margin_to;
use qfe_core::geometry::map_rect;
use qfe_core::{
    AnchorLineKind, AnchorTarget, Axis, DesignModel, ModelError, NodeId, Rect, TransactionId,
};
use smallvec::SmallVec;

/// `node`'s bounding rect in its parent's space.
fn rect_in_parent(model: &dyn DesignModel, node: NodeId) -> Option<Rect> {
    let info = model.instance_info(node)?;
    Some(map_rect(info.item_transform, info.bounding_rect))
}

/// Rect of an anchor target in the space of `node`'s parent. The parent
/// contributes its own local rect, siblings their rect in the parent.
fn target_rect(model: &dyn DesignModel, node: NodeId, target: NodeId) -> Option<Rect> {
    if model.instance_parent(node) == Some(target) {
        model.instance_info(target).map(|info| info.bounding_rect)
    } else {
        rect_in_parent(model, target)
    }
}

fn extent(rect: Rect, line: AnchorLineKind) -> (f64, f64) {
    match line.axis() {
        Axis::X => (rect.x0, rect.x1),
        Axis::Y => (rect.y0, rect.y1),
    }
}

/// Lines of `target` that `node.line` may reasonably anchor to.
///
/// The parent offers every line on the same axis. A sibling that overlaps
/// `node` along the axis offers the same-named line and its center; a
/// disjoint sibling offers the line facing `node` and the same-named one.
pub fn possible_anchor_lines(
    model: &dyn DesignModel,
    node: NodeId,
    line: AnchorLineKind,
    target: NodeId,
) -> SmallVec<[AnchorLineKind; 3]> {
    let mut lines = SmallVec::new();
    if node == target || !model.can_anchor(node, target) {
        return lines;
    }
    let axis = line.axis();
    if model.instance_parent(node) == Some(target) {
        lines.extend(axis.lines());
        return lines;
    }
    let (Some(source), Some(other)) = (rect_in_parent(model, node), rect_in_parent(model, target))
    else {
        return lines;
    };
    let (s_lo, s_hi) = extent(source, line);
    let (t_lo, t_hi) = extent(other, line);
    let [lead, trail, center] = axis.lines();
    let mut push = |candidate: AnchorLineKind| {
        if !lines.contains(&candidate) {
            lines.push(candidate);
        }
    };
    if t_hi >= s_lo && t_lo <= s_hi {
        push(line);
        push(center);
    } else {
        push(if t_hi < s_lo { trail } else { lead });
        push(line);
    }
    lines
}

/// Adds or removes one anchor of a source line chosen by `begin`. Each
/// edit runs in its own transaction.
#[derive(Default)]
pub struct AnchorManipulator {
    source: Option<(NodeId, AnchorLineKind)>,
    transaction: Option<TransactionId>,
}

impl AnchorManipulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, node: NodeId, line: AnchorLineKind) {
        self.source = Some((node, line));
    }

    pub fn source(&self) -> Option<(NodeId, AnchorLineKind)> {
        self.source
    }

    /// Anchor the source line to `target`, choosing the margin that keeps
    /// the item where it is. Without a source this does nothing.
    pub fn add_anchor(
        &mut self,
        model: &mut dyn DesignModel,
        target: AnchorTarget,
    ) -> Result<(), ModelError> {
        let Some((node, line)) = self.source else {
            return Ok(());
        };
        let source = rect_in_parent(&*model, node).ok_or(ModelError::UnknownNode(node))?;
        let other =
            target_rect(&*model, node, target.node).ok_or(ModelError::UnknownNode(target.node))?;
        let margin = margin_to(
            line,
            line.coordinate_in(source),
            target.line.coordinate_in(other),
        );
        self.transaction = Some(model.begin_transaction("add anchor"));
        let result = model.set_anchor(node, line, target);
        if result.is_ok() {
            model.set_margin(node, line, margin);
            log::debug!(
                "anchored {node}.{} to {}.{} margin {margin}",
                line.qml_name(),
                target.node,
                target.line.qml_name()
            );
        }
        commit(model, &mut self.transaction);
        result
    }

    pub fn remove_anchor(&mut self, model: &mut dyn DesignModel) {
        let Some((node, line)) = self.source else {
            return;
        };
        self.transaction = Some(model.begin_transaction("remove anchor"));
        model.remove_anchor(node, line);
        model.remove_margin(node, line);
        commit(model, &mut self.transaction);
    }

    pub fn clear(&mut self, model: &mut dyn DesignModel) {
        commit(model, &mut self.transaction);
        self.source = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qfe_core::model::ModelNode;
    use qfe_core::{PropertyValue, SceneModel};

    fn setup() -> (SceneModel, NodeId, NodeId) {
        let mut model = SceneModel::new("am_root", "Item", 400.0, 300.0);
        let root = model.root();
        let a = model
            .add_node(
                root,
                ModelNode::new(NodeId::intern("am_a"), "Rectangle")
                    .with_geometry(200.0, 20.0, 50.0, 50.0),
            )
            .unwrap();
        let b = model
            .add_node(
                root,
                ModelNode::new(NodeId::intern("am_b"), "Rectangle")
                    .with_geometry(40.0, 40.0, 100.0, 50.0),
            )
            .unwrap();
        (model, a, b)
    }

    #[test]
    fn parent_offers_whole_axis() {
        let (model, a, _) = setup();
        let lines = possible_anchor_lines(&model, a, AnchorLineKind::Left, model.root());
        assert_eq!(
            lines.as_slice(),
            &[
                AnchorLineKind::Left,
                AnchorLineKind::Right,
                AnchorLineKind::HorizontalCenter
            ]
        );
    }

    #[test]
    fn sibling_lines_depend_on_overlap() {
        let (model, a, b) = setup();
        // Horizontally disjoint: b lies left of a, so its right edge faces a.
        let lines = possible_anchor_lines(&model, a, AnchorLineKind::Left, b);
        assert_eq!(lines.as_slice(), &[AnchorLineKind::Right, AnchorLineKind::Left]);
        // Vertically overlapping.
        let lines = possible_anchor_lines(&model, a, AnchorLineKind::Top, b);
        assert_eq!(
            lines.as_slice(),
            &[AnchorLineKind::Top, AnchorLineKind::VerticalCenter]
        );
    }

    #[test]
    fn add_anchor_keeps_geometry() {
        let (mut model, a, b) = setup();
        let root = model.root();
        let mut manipulator = AnchorManipulator::new();
        manipulator.begin(a, AnchorLineKind::Left);
        manipulator
            .add_anchor(&mut model, AnchorTarget { node: b, line: AnchorLineKind::Right })
            .unwrap();
        assert_eq!(model.instance_margin(a, AnchorLineKind::Left), 60.0);
        assert_eq!(model.instance_value(a, "x"), Some(PropertyValue::Number(200.0)));

        manipulator.begin(a, AnchorLineKind::Bottom);
        manipulator
            .add_anchor(&mut model, AnchorTarget { node: root, line: AnchorLineKind::Bottom })
            .unwrap();
        assert_eq!(model.instance_margin(a, AnchorLineKind::Bottom), 230.0);
        assert_eq!(model.instance_value(a, "y"), Some(PropertyValue::Number(20.0)));

        manipulator.begin(a, AnchorLineKind::Left);
        manipulator.remove_anchor(&mut model);
        assert!(!model.has_anchor(a, AnchorLineKind::Left));
        assert_eq!(model.instance_margin(a, AnchorLineKind::Left), 0.0);
        assert_eq!(model.transaction_stats().committed, 3);
    }

    #[test]
    fn cyclic_anchor_is_rejected() {
        let (mut model, a, b) = setup();
        let mut manipulator = AnchorManipulator::new();
        manipulator.begin(a, AnchorLineKind::Left);
        manipulator
            .add_anchor(&mut model, AnchorTarget { node: b, line: AnchorLineKind::Right })
            .unwrap();
        manipulator.begin(b, AnchorLineKind::Right);
        let err = manipulator
            .add_anchor(&mut model, AnchorTarget { node: a, line: AnchorLineKind::Left })
            .unwrap_err();
        assert!(matches!(err, ModelError::AnchorCycle { .. }));
        assert!(!model.has_anchor(b, AnchorLineKind::Right));
        assert!(!model.in_transaction());
    }
}
