//! Active while the pointer is over a resize handle.

use super::{Tool, ToolContext, ToolKind, ToolRequest};
use crate::config::EditorConfig;
use crate::indicators::{OverlayItem, ResizeIndicator, SelectionIndicator};
use crate::input::{InputEvent, Key};
use crate::manipulators::{ResizeHandle, ResizeManipulator};
use crate::scene::{FormEditorScene, HandleHit};
use qfe_core::{DesignModel, NodeId, Point};

pub struct ResizeTool {
    manipulator: ResizeManipulator,
    selection: SelectionIndicator,
    handles: ResizeIndicator,
    /// Handle under the pointer, used by keyboard resizing.
    hovered: Option<(NodeId, ResizeHandle)>,
}

impl ResizeTool {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            manipulator: ResizeManipulator::new(config),
            selection: SelectionIndicator::default(),
            handles: ResizeIndicator::default(),
            hovered: None,
        }
    }

    pub fn is_resizing(&self) -> bool {
        self.manipulator.is_active()
    }

    fn handle_at(ctx: &ToolContext<'_>, pos: Point) -> Option<(NodeId, ResizeHandle)> {
        match ctx.scene.handle_at(pos) {
            Some(HandleHit::Resize { node, handle, .. }) => Some((node, handle)),
            _ => None,
        }
    }
}

impl Tool for ResizeTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Resize
    }

    fn handle(&mut self, ctx: &mut ToolContext<'_>, event: &InputEvent) {
        match event {
            InputEvent::HoverMove { pos, .. } => {
                self.hovered = Self::handle_at(ctx, *pos);
                if self.hovered.is_none() && !self.manipulator.is_active() {
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
                let snapping = ctx.config.snap_mode.for_modifiers(*modifiers);
                self.manipulator.update(ctx.model, *pos, snapping);
            }
            InputEvent::PointerUp { pos, modifiers, .. } => {
                if self.manipulator.is_active() {
                    let snapping = ctx.config.snap_mode.for_modifiers(*modifiers);
                    self.manipulator.update(ctx.model, *pos, snapping);
                    self.manipulator.end(ctx.model, ctx.scene, snapping);
                }
            }
            InputEvent::KeyDown { key, modifiers } => match key {
                k if k.is_arrow() => {
                    let (Some((node, handle)), Some((dx, dy))) =
                        (self.hovered, k.arrow_direction())
                    else {
                        return;
                    };
                    let step = if modifiers.shift {
                        ctx.config.key_step_large
                    } else {
                        ctx.config.key_step
                    };
                    self.manipulator
                        .move_by(ctx.model, node, handle, dx * step, dy * step);
                }
                Key::Escape => {
                    self.manipulator.clear(ctx.model);
                    ctx.change_tool(ToolRequest::Selection);
                }
                _ => {}
            },
            InputEvent::KeyUp { key, .. } if key.is_arrow() => {
                if !self.manipulator.is_active() {
                    self.manipulator.clear(ctx.model);
                }
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
        self.hovered = None;
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
        out.extend(
            self.manipulator
                .guides()
                .iter()
                .map(|line| OverlayItem::SnapGuide(*line)),
        );
    }
}
