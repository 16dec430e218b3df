//! Picks a new image file for image-like items.

use super::custom::{DialogToolState, simple_type_name, write_property};
use super::{CustomTool, Tool, ToolContext, ToolKind, ToolRequest};
use crate::indicators::OverlayItem;
use crate::input::{DialogResult, InputEvent};
use crate::scene::FormEditorScene;
use qfe_core::{DesignModel, NodeId};

const IMAGE_TYPES: [&str; 3] = ["Image", "AnimatedImage", "BorderImage"];

#[derive(Debug, Default)]
pub struct SourceTool {
    state: DialogToolState,
}

impl SourceTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tool for SourceTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Custom
    }

    fn handle(&mut self, ctx: &mut ToolContext<'_>, event: &InputEvent) {
        if self.state.handle_exit(ctx, event) {
            return;
        }
        match event {
            InputEvent::Dialog(DialogResult::Accepted(value)) => {
                write_property(ctx.model, &self.state.items, "source", value, "change source");
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

impl CustomTool for SourceTool {
    fn name(&self) -> &str {
        "source"
    }

    fn want_handle_item(&self, model: &dyn DesignModel, node: NodeId) -> i32 {
        let image_like = simple_type_name(model, node)
            .is_some_and(|t| IMAGE_TYPES.contains(&t.as_str()));
        if image_like && model.has_property(node, "source") {
            10
        } else {
            -1
        }
    }
}
