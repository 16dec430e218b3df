//! Drag from an anchor line of the selected item onto a line of its parent
//! or a sibling to anchor it there. Releasing over nothing removes the
//! anchor the line had.

use super::{Tool, ToolContext, ToolKind, ToolRequest};
use crate::indicators::{AnchorIndicator, OverlayItem, SelectionIndicator};
use crate::indicators::{anchor_line_segment, near_segment};
use crate::input::{InputEvent, Key};
use crate::manipulators::{AnchorManipulator, possible_anchor_lines};
use crate::scene::FormEditorScene;
use kurbo::ParamCurveNearest;
use qfe_core::{AnchorLineKind, AnchorTarget, DesignModel, NodeId, Point};

#[derive(Default)]
pub struct AnchorTool {
    manipulator: AnchorManipulator,
    selection: SelectionIndicator,
    anchors: AnchorIndicator,
    target: Option<AnchorTarget>,
    refused: bool,
}

impl AnchorTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> Option<AnchorTarget> {
        self.target
    }

    /// The line of the selected item closest to `pos`, if within reach.
    fn source_line_at(&self, scene: &FormEditorScene, pos: Point) -> Option<(NodeId, AnchorLineKind)> {
        let node = *self.anchors.items().first()?;
        let item = scene.item(node)?;
        let tolerance = scene.handle_extent();
        AnchorLineKind::ALL
            .iter()
            .map(|line| (*line, anchor_line_segment(item, *line)))
            .filter(|(_, segment)| near_segment(*segment, pos, tolerance))
            .min_by(|(_, a), (_, b)| {
                let da = a.nearest(pos, 1e-6).distance_sq;
                let db = b.nearest(pos, 1e-6).distance_sq;
                da.total_cmp(&db)
            })
            .map(|(line, _)| (node, line))
    }

    /// Find the item under `pos` the source line could anchor to: the
    /// topmost sibling whose rect or anchor lines are under the pointer,
    /// else the parent. All its possible lines are previewed; the one
    /// passing near `pos`, if any, becomes the target. An item the source
    /// already feeds into is refused and shows nothing.
    fn find_targets(&mut self, ctx: &ToolContext<'_>, pos: Point) {
        self.target = None;
        self.refused = false;
        self.anchors.set_target_lines(Vec::new());
        let Some((node, line)) = self.manipulator.source() else {
            return;
        };
        let Some(parent) = ctx.model.instance_parent(node) else {
            return;
        };
        let tolerance = ctx.scene.handle_extent();
        let siblings = ctx.model.children(parent);
        let candidates = siblings
            .iter()
            .rev()
            .copied()
            .filter(|n| *n != node)
            .chain(std::iter::once(parent));
        for candidate in candidates {
            let Some(item) = ctx.scene.item(candidate) else {
                continue;
            };
            let lines = possible_anchor_lines(&*ctx.model, node, line, candidate);
            if lines.is_empty() {
                continue;
            }
            let near = lines
                .iter()
                .copied()
                .find(|l| near_segment(anchor_line_segment(item, *l), pos, tolerance));
            if near.is_none() && !item.contains_scene_point(pos) {
                continue;
            }
            if ctx.model.check_for_cycle(node, line, candidate) {
                self.refused = true;
                return;
            }
            self.target = near.map(|line| AnchorTarget { node: candidate, line });
            self.anchors
                .set_target_lines(lines.iter().map(|l| (candidate, *l)).collect());
            return;
        }
    }

    fn release(&mut self, ctx: &mut ToolContext<'_>) {
        if self.manipulator.source().is_none() {
            return;
        }
        match self.target.take() {
            Some(target) => {
                if let Err(err) = self.manipulator.add_anchor(ctx.model, target) {
                    log::warn!("cannot anchor: {err}");
                }
            }
            None if self.refused => log::debug!("anchor target would form a cycle"),
            None => self.manipulator.remove_anchor(ctx.model),
        }
        self.refused = false;
        self.manipulator.clear(ctx.model);
        self.anchors.set_target_lines(Vec::new());
        self.anchors.set_highlighted(None);
    }
}

impl Tool for AnchorTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Anchor
    }

    fn handle(&mut self, ctx: &mut ToolContext<'_>, event: &InputEvent) {
        match event {
            InputEvent::HoverMove { pos, .. } => {
                let line = self.source_line_at(ctx.scene, *pos);
                self.anchors.set_highlighted(line);
            }
            InputEvent::PointerDown { pos, .. } => match self.source_line_at(ctx.scene, *pos) {
                Some((node, line)) => {
                    self.anchors.set_highlighted(Some((node, line)));
                    self.manipulator.begin(node, line);
                }
                None => ctx.change_tool_with_replay(ToolRequest::Selection, vec![event.clone()]),
            },
            InputEvent::PointerMove { pos, .. } => self.find_targets(ctx, *pos),
            InputEvent::PointerUp { pos, .. } => {
                self.find_targets(ctx, *pos);
                self.release(ctx);
            }
            InputEvent::KeyDown {
                key: Key::Escape, ..
            } => {
                self.manipulator.clear(ctx.model);
                ctx.change_tool(ToolRequest::Selection);
            }
            _ => {}
        }
    }

    fn set_items(&mut self, ctx: &mut ToolContext<'_>, items: &[NodeId]) {
        self.selection.set_items(items);
        self.selection.update_items(ctx.scene);
        self.anchors.set_items(&*ctx.model, items);
    }

    fn clear(&mut self, ctx: &mut ToolContext<'_>) {
        self.manipulator.clear(ctx.model);
        self.selection.clear();
        self.anchors.clear();
        self.target = None;
        self.refused = false;
    }

    fn update_indicators(&mut self, ctx: &mut ToolContext<'_>) {
        self.selection.update_items(ctx.scene);
        self.anchors.update_items(&*ctx.model);
    }

    fn collect_overlay(
        &self,
        model: &dyn DesignModel,
        scene: &FormEditorScene,
        out: &mut Vec<OverlayItem>,
    ) {
        self.selection.collect_overlay(scene, out);
        self.anchors.collect_overlay(model, scene, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use pretty_assertions::assert_eq;
    use qfe_core::SceneModel;
    use qfe_core::model::ModelNode;

    fn setup() -> (SceneModel, FormEditorScene, EditorConfig, NodeId, NodeId) {
        let mut model = SceneModel::new("at_root", "Item", 400.0, 300.0);
        let root = model.root();
        let a = model
            .add_node(
                root,
                ModelNode::new(NodeId::intern("at_a"), "Rectangle")
                    .with_geometry(100.0, 100.0, 50.0, 50.0),
            )
            .unwrap();
        let b = model
            .add_node(
                root,
                ModelNode::new(NodeId::intern("at_b"), "Rectangle")
                    .with_geometry(200.0, 80.0, 50.0, 50.0),
            )
            .unwrap();
        let config = EditorConfig::default();
        let mut scene = FormEditorScene::new(&config);
        scene.sync_from_model(&model);
        (model, scene, config, a, b)
    }

    /// Previewed target lines, in overlay order.
    fn shown_targets(tool: &AnchorTool, ctx: &ToolContext<'_>, source: NodeId) -> Vec<(NodeId, AnchorLineKind)> {
        let mut out = Vec::new();
        tool.collect_overlay(&*ctx.model, &*ctx.scene, &mut out);
        out.into_iter()
            .filter_map(|item| match item {
                OverlayItem::AnchorLine {
                    node,
                    line,
                    highlighted: true,
                    ..
                } if node != source => Some((node, line)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn hovered_sibling_previews_all_its_lines() {
        let (mut model, mut scene, config, a, b) = setup();
        let mut tool = AnchorTool::new();
        let mut ctx = ToolContext::new(&mut model, &mut scene, &config);
        tool.set_items(&mut ctx, &[a]);
        tool.handle(&mut ctx, &InputEvent::pointer_down(150.0, 125.0, 0));
        assert_eq!(tool.manipulator.source(), Some((a, AnchorLineKind::Right)));

        // Inside b but away from its lines: preview only, nothing to release on.
        tool.handle(&mut ctx, &InputEvent::pointer_move(225.0, 90.0, 10));
        assert_eq!(
            shown_targets(&tool, &ctx, a),
            vec![(b, AnchorLineKind::Left), (b, AnchorLineKind::Right)]
        );
        assert_eq!(tool.target(), None);

        tool.handle(&mut ctx, &InputEvent::pointer_move(202.0, 90.0, 20));
        assert_eq!(shown_targets(&tool, &ctx, a).len(), 2);
        assert_eq!(
            tool.target(),
            Some(AnchorTarget {
                node: b,
                line: AnchorLineKind::Left
            })
        );
    }

    #[test]
    fn parent_is_hovered_outside_siblings() {
        let (mut model, mut scene, config, a, _) = setup();
        let root = model.root();
        let mut tool = AnchorTool::new();
        let mut ctx = ToolContext::new(&mut model, &mut scene, &config);
        tool.set_items(&mut ctx, &[a]);
        tool.handle(&mut ctx, &InputEvent::pointer_down(150.0, 125.0, 0));
        tool.handle(&mut ctx, &InputEvent::pointer_move(300.0, 250.0, 10));
        assert_eq!(
            shown_targets(&tool, &ctx, a),
            vec![
                (root, AnchorLineKind::Left),
                (root, AnchorLineKind::Right),
                (root, AnchorLineKind::HorizontalCenter)
            ]
        );
        assert_eq!(tool.target(), None);

        tool.handle(&mut ctx, &InputEvent::pointer_move(397.0, 250.0, 20));
        assert_eq!(
            tool.target(),
            Some(AnchorTarget {
                node: root,
                line: AnchorLineKind::Right
            })
        );
    }

    #[test]
    fn dependent_sibling_shows_no_targets() {
        let (mut model, mut scene, config, a, b) = setup();
        model
            .set_anchor(
                b,
                AnchorLineKind::Left,
                AnchorTarget {
                    node: a,
                    line: AnchorLineKind::Right,
                },
            )
            .unwrap();
        scene.sync_from_model(&model);
        let mut tool = AnchorTool::new();
        let mut ctx = ToolContext::new(&mut model, &mut scene, &config);
        tool.set_items(&mut ctx, &[a]);
        tool.handle(&mut ctx, &InputEvent::pointer_down(150.0, 125.0, 0));
        tool.handle(&mut ctx, &InputEvent::pointer_move(202.0, 90.0, 10));
        assert!(shown_targets(&tool, &ctx, a).is_empty());
        assert_eq!(tool.target(), None);
    }
}
