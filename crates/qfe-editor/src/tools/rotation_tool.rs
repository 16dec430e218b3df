//! Active while the pointer is over a rotation handle.

use super::{Tool, ToolContext, ToolKind, ToolRequest};
use crate::indicators::{OverlayItem, RotationIndicator, SelectionIndicator};
use crate::input::{InputEvent, Key};
use crate::manipulators::{RotationHandle, RotationManipulator};
use crate::scene::{FormEditorScene, HandleHit};
use qfe_core::{DesignModel, NodeId, Point};

#[derive(Default)]
pub struct RotationTool {
    manipulator: RotationManipulator,
    selection: SelectionIndicator,
    handles: RotationIndicator,
}

impl RotationTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_rotating(&self) -> bool {
        self.manipulator.is_active()
    }

    fn handle_at(ctx: &ToolContext<'_>, pos: Point) -> Option<(NodeId, RotationHandle)> {
        match ctx.scene.handle_at(pos) {
            Some(HandleHit::Rotation { node, handle, .. }) => Some((node, handle)),
            _ => None,
        }
    }
}

impl Tool for RotationTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Rotate
    }

    fn handle(&mut self, ctx: &mut ToolContext<'_>, event: &InputEvent) {
        match event {
            InputEvent::HoverMove { pos, .. } => {
                if !self.manipulator.is_active() && Self::handle_at(ctx, *pos).is_none() {
                    ctx.change_tool_with_replay(ToolRequest::Selection, vec![event.clone()]);
                }
            }
            InputEvent::PointerDown { pos, .. } => match Self::handle_at(ctx, *pos) {
                Some((node, handle)) => {
                    self.manipulator.begin(ctx.model, ctx.scene, node, handle);
                }
                None => ctx.change_tool_with_replay(ToolRequest::Selection, vec![event.clone()]),
            },
            InputEvent::PointerMove { pos, modifiers, .. } => {
                self.manipulator.update(ctx.model, *pos, *modifiers);
            }
            InputEvent::PointerUp { pos, modifiers, .. } => {
                if self.manipulator.is_active() {
                    self.manipulator.update(ctx.model, *pos, *modifiers);
                    self.manipulator.end(ctx.model);
                }
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
        self.handles.set_items(&*ctx.model, ctx.scene, items);
    }

    fn clear(&mut self, ctx: &mut ToolContext<'_>) {
        self.manipulator.clear(ctx.model);
        self.selection.clear();
        self.handles.clear(ctx.scene);
    }

    fn update_indicators(&mut self, ctx: &mut ToolContext<'_>) {
        self.selection.update_items(ctx.scene);
        self.handles.update_items(ctx.scene);
    }

    fn collect_overlay(
        &self,
        _model: &dyn DesignModel,
        scene: &FormEditorScene,
        out: &mut Vec<OverlayItem>,
    ) {
        self.selection.collect_overlay(scene, out);
        self.handles.collect_overlay(scene, out);
    }
}
