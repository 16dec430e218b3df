//! Color picking with live preview. Previews write straight into the open
//! transaction; rejecting the dialog puts the old colors back.

use super::custom::{DialogToolState, simple_type_name};
use super::{CustomTool, Tool, ToolContext, ToolKind, ToolRequest};
use crate::indicators::OverlayItem;
use crate::input::{DialogResult, InputEvent};
use crate::manipulators::commit;
use crate::scene::FormEditorScene;
use qfe_core::{DesignModel, NodeId, PropertyValue, TransactionId};

const COLOR_PROPERTY: &str = "color";

#[derive(Debug, Default)]
pub struct ColorTool {
    state: DialogToolState,
    old_colors: Vec<(NodeId, Option<PropertyValue>)>,
    transaction: Option<TransactionId>,
}

impl ColorTool {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self, model: &mut dyn DesignModel, value: &PropertyValue) {
        for node in &self.state.items {
            if model.is_valid(*node) {
                model.set_variant_property(*node, COLOR_PROPERTY, value.clone());
            }
        }
    }

    fn restore(&self, model: &mut dyn DesignModel) {
        for (node, old) in &self.old_colors {
            if !model.is_valid(*node) {
                continue;
            }
            match old {
                Some(value) => model.set_variant_property(*node, COLOR_PROPERTY, value.clone()),
                None => model.remove_property(*node, COLOR_PROPERTY),
            }
        }
    }

    fn finish(&mut self, ctx: &mut ToolContext<'_>) {
        commit(ctx.model, &mut self.transaction);
        self.old_colors.clear();
        ctx.change_tool(ToolRequest::Selection);
    }
}

impl Tool for ColorTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Custom
    }

    fn start(&mut self, ctx: &mut ToolContext<'_>) {
        self.old_colors = self
            .state
            .items
            .iter()
            .map(|n| (*n, ctx.model.instance_value(*n, COLOR_PROPERTY)))
            .collect();
        if !self.state.items.is_empty() {
            self.transaction = Some(ctx.model.begin_transaction("change color"));
        }
    }

    fn handle(&mut self, ctx: &mut ToolContext<'_>, event: &InputEvent) {
        if let InputEvent::Dialog(result) = event {
            match result {
                DialogResult::Preview(value) => self.write(ctx.model, value),
                DialogResult::Accepted(value) => {
                    self.write(ctx.model, value);
                    self.finish(ctx);
                }
                DialogResult::Rejected => {
                    self.restore(ctx.model);
                    self.finish(ctx);
                }
            }
            return;
        }
        // Leaving any other way keeps the previewed color.
        if self.state.handle_exit(ctx, event) {
            commit(ctx.model, &mut self.transaction);
        }
    }

    fn set_items(&mut self, ctx: &mut ToolContext<'_>, items: &[NodeId]) {
        self.state.set_items(ctx, items);
    }

    fn clear(&mut self, ctx: &mut ToolContext<'_>) {
        commit(ctx.model, &mut self.transaction);
        self.old_colors.clear();
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

impl CustomTool for ColorTool {
    fn name(&self) -> &str {
        "color"
    }

    fn want_handle_item(&self, model: &dyn DesignModel, node: NodeId) -> i32 {
        let colored_type =
            simple_type_name(model, node).is_some_and(|t| t == "Rectangle" || t == "Text");
        if colored_type || model.has_property(node, COLOR_PROPERTY) {
            10
        } else {
            -1
        }
    }
}
