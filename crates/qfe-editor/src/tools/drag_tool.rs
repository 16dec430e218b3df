//! Drops from the item and asset libraries.
//!
//! The node is created as soon as the drag enters the canvas and then moved
//! like any other item, so the user sees it snap and reparent live. The
//! whole gesture is one transaction; leaving the canvas removes the node.

use super::{Tool, ToolContext, ToolKind, ToolRequest};
use crate::config::EditorConfig;
use crate::indicators::{OverlayItem, SelectionIndicator};
use crate::input::{DragPayload, InputEvent};
use crate::manipulators::{MoveManipulator, ReparentFlag, StateFlag, commit};
use crate::scene::FormEditorScene;
use crate::snapping::Snapping;
use qfe_core::{DesignModel, ModelError, NodeId, Point, PropertyValue, TransactionId};

pub struct DragTool {
    manipulator: MoveManipulator,
    indicator: SelectionIndicator,
    dropped: Option<NodeId>,
    transaction: Option<TransactionId>,
}

/// Type and initial properties of the node a payload turns into.
fn node_template(payload: &DragPayload) -> (String, Vec<(String, PropertyValue)>, Option<(f64, f64)>) {
    match payload {
        DragPayload::LibraryItem {
            type_name,
            properties,
            size,
        } => (
            type_name.clone(),
            properties.clone(),
            size.map(|s| (s.width, s.height)),
        ),
        DragPayload::ImageAsset(path) => (
            "Image".to_string(),
            vec![("source".to_string(), PropertyValue::from(path.as_str()))],
            None,
        ),
        DragPayload::FontAsset(family) => (
            "Text".to_string(),
            vec![
                ("font.family".to_string(), PropertyValue::from(family.as_str())),
                ("text".to_string(), PropertyValue::from(family.as_str())),
            ],
            None,
        ),
    }
}

impl DragTool {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            manipulator: MoveManipulator::new(config),
            indicator: SelectionIndicator::default(),
            dropped: None,
            transaction: None,
        }
    }

    /// The node created for the drag in flight.
    pub fn dropped(&self) -> Option<NodeId> {
        self.dropped
    }

    fn create(
        &mut self,
        ctx: &mut ToolContext<'_>,
        pos: Point,
        payload: &DragPayload,
    ) -> Result<NodeId, ModelError> {
        let parent = ctx
            .container_at(pos, &[])
            .ok_or(ModelError::UnknownNode(ctx.model.root()))?;
        let local = ctx
            .scene
            .item(parent)
            .and_then(|item| item.map_from_scene(pos))
            .unwrap_or(pos);
        let (type_name, mut properties, size) = node_template(payload);
        properties.push(("x".to_string(), local.x.into()));
        properties.push(("y".to_string(), local.y.into()));
        if let Some((width, height)) = size {
            properties.push(("width".to_string(), width.into()));
            properties.push(("height".to_string(), height.into()));
        }
        let node = ctx.model.create_node(&type_name, parent, properties)?;
        log::debug!("dropped {type_name} {node} into {parent}");
        Ok(node)
    }

    fn enter(&mut self, ctx: &mut ToolContext<'_>, pos: Point, payload: &DragPayload) {
        self.transaction = Some(ctx.model.begin_transaction("drop item"));
        match self.create(ctx, pos, payload) {
            Ok(node) => {
                ctx.scene.add_item(&*ctx.model, node);
                ctx.model.set_selected_nodes(vec![node]);
                self.dropped = Some(node);
                self.indicator.set_items(&[node]);
                self.manipulator.set_items(&*ctx.model, ctx.scene, &[node]);
                self.manipulator.begin(ctx.model, ctx.scene, pos);
            }
            Err(err) => {
                log::warn!("cannot drop {payload:?}: {err}");
                commit(ctx.model, &mut self.transaction);
                ctx.change_tool(ToolRequest::Selection);
            }
        }
    }

    fn drag_move(&mut self, ctx: &mut ToolContext<'_>, pos: Point) {
        let Some(node) = self.dropped else {
            return;
        };
        if let Some(target) = ctx.container_at(pos, &[node])
            && self.manipulator.container() != Some(target)
        {
            self.manipulator
                .reparent_to(ctx.model, ctx.scene, target, ReparentFlag::FindLayoutAncestor);
        }
        self.manipulator.update(
            ctx.model,
            ctx.scene,
            pos,
            Snapping::UseSnapping,
            StateFlag::BaseStateOnly,
        );
    }

    fn leave(&mut self, ctx: &mut ToolContext<'_>) {
        self.manipulator.clear(ctx.model);
        if let Some(node) = self.dropped.take() {
            ctx.scene.remove_subtree(node);
            if let Err(err) = ctx.model.remove_node(node) {
                log::warn!("cannot remove dragged {node}: {err}");
            }
        }
        self.indicator.clear();
        commit(ctx.model, &mut self.transaction);
    }
}

impl Tool for DragTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Drag
    }

    fn handle(&mut self, ctx: &mut ToolContext<'_>, event: &InputEvent) {
        match event {
            InputEvent::DragEnter { pos, payload } => {
                if self.dropped.is_some() {
                    self.leave(ctx);
                }
                self.enter(ctx, *pos, payload);
            }
            InputEvent::DragMove { pos, .. } => self.drag_move(ctx, *pos),
            InputEvent::Drop { pos, .. } => {
                self.drag_move(ctx, *pos);
                self.manipulator
                    .end(ctx.model, ctx.scene, Snapping::UseSnapping);
                self.dropped = None;
                commit(ctx.model, &mut self.transaction);
                ctx.change_tool(ToolRequest::Selection);
            }
            InputEvent::DragLeave => {
                self.leave(ctx);
                ctx.change_tool(ToolRequest::Selection);
            }
            _ => {}
        }
    }

    fn set_items(&mut self, ctx: &mut ToolContext<'_>, items: &[NodeId]) {
        self.indicator.set_items(items);
        self.indicator.update_items(ctx.scene);
    }

    fn clear(&mut self, ctx: &mut ToolContext<'_>) {
        self.manipulator.clear(ctx.model);
        self.indicator.clear();
        self.dropped = None;
        commit(ctx.model, &mut self.transaction);
    }

    fn update_indicators(&mut self, ctx: &mut ToolContext<'_>) {
        self.indicator.update_items(ctx.scene);
    }

    fn collect_overlay(
        &self,
        _model: &dyn DesignModel,
        scene: &FormEditorScene,
        out: &mut Vec<OverlayItem>,
    ) {
        self.indicator.collect_overlay(scene, out);
        out.extend(
            self.manipulator
                .guides()
                .iter()
                .map(|line| OverlayItem::SnapGuide(*line)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn font_asset_becomes_text() {
        let (type_name, properties, size) =
            node_template(&DragPayload::FontAsset("Inter".to_string()));
        assert_eq!(type_name, "Text");
        assert_eq!(properties[0].0, "font.family");
        assert_eq!(properties[0].1.as_str(), Some("Inter"));
        assert_eq!(size, None);
    }

    #[test]
    fn library_item_keeps_its_size() {
        let payload = DragPayload::LibraryItem {
            type_name: "Rectangle".to_string(),
            properties: vec![("color".to_string(), "red".into())],
            size: Some(qfe_core::Size::new(40.0, 30.0)),
        };
        let (type_name, properties, size) = node_template(&payload);
        assert_eq!(type_name, "Rectangle");
        assert_eq!(properties.len(), 1);
        assert_eq!(size, Some((40.0, 30.0)));
    }
}
