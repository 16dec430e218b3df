//! Attaches a free-form note to the selected items.

use super::custom::{DialogToolState, write_property};
use super::{CustomTool, Tool, ToolContext, ToolKind, ToolRequest};
use crate::indicators::OverlayItem;
use crate::input::{DialogResult, InputEvent};
use crate::scene::FormEditorScene;
use qfe_core::{DesignModel, NodeId};

/// Property the note is stored in.
pub const ANNOTATION_PROPERTY: &str = "__annotation";

#[derive(Debug, Default)]
pub struct AnnotationTool {
    state: DialogToolState,
}

impl AnnotationTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tool for AnnotationTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Custom
    }

    fn handle(&mut self, ctx: &mut ToolContext<'_>, event: &InputEvent) {
        if self.state.handle_exit(ctx, event) {
            return;
        }
        match event {
            InputEvent::Dialog(DialogResult::Accepted(value)) => {
                write_property(
                    ctx.model,
                    &self.state.items,
                    ANNOTATION_PROPERTY,
                    value,
                    "edit annotation",
                );
                ctx.change_tool(ToolRequest::Selection);
            }
            InputEvent::Dialog(DialogResult::Rejected) => ctx.change_tool(ToolRequest::Selection),
            _ => {}
        }
    }

    fn set_items(&mut self, ctx: &mut ToolContext<'_>, items: &[NodeId]) {
        self.state.set_items(ctx, items);
    }

    fn clear(&mut self, _ctx: &mut ToolContext<'_>) {
        self.state.clear();
    }

    fn update_indicators(&mut self, ctx: &mut ToolContext<'_>) {
        self.state.update_indicators(ctx);
    }

    fn collect_overlay(
        &self,
        _model: &dyn DesignModel,
        scene: &FormEditorScene,
        out: &mut Vec<OverlayItem>,
    ) {
        self.state.collect_overlay(scene, out);
    }
}

impl CustomTool for AnnotationTool {
    fn name(&self) -> &str {
        "annotation"
    }

    /// Any item can carry a note, but every other tool takes precedence.
    fn want_handle_item(&self, model: &dyn DesignModel, node: NodeId) -> i32 {
        if model.is_valid(node) { 0 } else { -1 }
    }
}
