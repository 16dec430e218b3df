//! In-place text editing for items with a `text` property.

use super::custom::{DialogToolState, write_property};
use super::{CustomTool, Tool, ToolContext, ToolKind, ToolRequest};
use crate::indicators::OverlayItem;
use crate::input::{DialogResult, InputEvent};
use crate::scene::FormEditorScene;
use qfe_core::{DesignModel, NodeId};

#[derive(Debug, Default)]
pub struct TextTool {
    state: DialogToolState,
}

impl TextTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tool for TextTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Custom
    }

    fn handle(&mut self, ctx: &mut ToolContext<'_>, event: &InputEvent) {
        if self.state.handle_exit(ctx, event) {
            return;
        }
        match event {
            InputEvent::Dialog(DialogResult::Accepted(value)) => {
                write_property(ctx.model, &self.state.items, "text", value, "edit text");
                ctx.change_tool(ToolRequest::Selection);
            }
            InputEvent::Dialog(DialogResult::Rejected) => ctx.change_tool(ToolRequest::Selection),
            _ => {}
        }
    }

    /// Only one text is edited at a time.
    fn set_items(&mut self, ctx: &mut ToolContext<'_>, items: &[NodeId]) {
        let first: Vec<NodeId> = items
            .iter()
            .copied()
            .filter(|n| ctx.model.has_property(*n, "text"))
            .take(1)
            .collect();
        self.state.set_items(ctx, &first);
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

impl CustomTool for TextTool {
    fn name(&self) -> &str {
        "text"
    }

    fn want_handle_item(&self, model: &dyn DesignModel, node: NodeId) -> i32 {
        if model.has_property(node, "text") { 20 } else { -1 }
    }
}
