//! Extension point for tools registered by the host, plus the state the
//! bundled property-editing tools share.
//!
//! A custom tool is picked on double-click when no tool is named: every
//! registered tool rates the selected item and the highest rating wins.
//! Custom tools usually drive a host dialog and receive its outcome as
//! [`InputEvent::Dialog`].

use super::{Tool, ToolContext, ToolRequest};
use crate::indicators::{OverlayItem, SelectionIndicator};
use crate::input::{InputEvent, Key};
use crate::manipulators::commit;
use crate::scene::FormEditorScene;
use qfe_core::{DesignModel, NodeId, PropertyValue};

pub trait CustomTool: Tool {
    /// Name the host uses to request this tool.
    fn name(&self) -> &str;

    /// How much this tool wants to edit `node`. Negative means never.
    fn want_handle_item(&self, model: &dyn DesignModel, node: NodeId) -> i32;
}

/// Selection tracking and the exit gestures common to dialog tools.
#[derive(Debug, Default)]
pub(crate) struct DialogToolState {
    pub items: Vec<NodeId>,
    indicator: SelectionIndicator,
}

impl DialogToolState {
    pub fn set_items(&mut self, ctx: &mut ToolContext<'_>, items: &[NodeId]) {
        self.items = items
            .iter()
            .copied()
            .filter(|n| ctx.model.is_valid(*n))
            .collect();
        self.indicator.set_items(&self.items);
        self.indicator.update_items(ctx.scene);
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.indicator.clear();
    }

    pub fn update_indicators(&mut self, ctx: &mut ToolContext<'_>) {
        self.indicator.update_items(ctx.scene);
    }

    pub fn collect_overlay(&self, scene: &FormEditorScene, out: &mut Vec<OverlayItem>) {
        self.indicator.collect_overlay(scene, out);
    }

    /// Escape leaves the tool; a press outside the edited items leaves it
    /// and hands the press to the selection tool. Returns true if handled.
    pub fn handle_exit(&self, ctx: &mut ToolContext<'_>, event: &InputEvent) -> bool {
        match event {
            InputEvent::KeyDown {
                key: Key::Escape, ..
            } => {
                ctx.change_tool(ToolRequest::Selection);
                true
            }
            InputEvent::PointerDown { pos, .. } => {
                let inside = self.items.iter().any(|n| {
                    ctx.scene
                        .item(*n)
                        .is_some_and(|item| item.contains_scene_point(*pos))
                });
                if !inside {
                    ctx.change_tool_with_replay(ToolRequest::Selection, vec![event.clone()]);
                }
                !inside
            }
            _ => false,
        }
    }
}

/// Write `value` to `name` on each of `nodes` in a single transaction.
pub(crate) fn write_property(
    model: &mut dyn DesignModel,
    nodes: &[NodeId],
    name: &str,
    value: &PropertyValue,
    label: &str,
) {
    if nodes.is_empty() {
        return;
    }
    let mut transaction = Some(model.begin_transaction(label));
    for node in nodes {
        if model.is_valid(*node) {
            model.set_variant_property(*node, name, value.clone());
        }
    }
    commit(model, &mut transaction);
}

/// Unqualified QML type name of `node`, without any module prefix.
pub(crate) fn simple_type_name(model: &dyn DesignModel, node: NodeId) -> Option<String> {
    let full = model.type_name(node)?;
    Some(full.rsplit('.').next().unwrap_or(&full).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use qfe_core::model::ModelNode;
    use qfe_core::SceneModel;

    #[test]
    fn type_names_lose_their_module() {
        let mut model = SceneModel::new("ct_root", "Item", 400.0, 300.0);
        let root = model.root();
        let node = model
            .add_node(root, ModelNode::new(NodeId::intern("ct_img"), "QtQuick.Image"))
            .unwrap();
        assert_eq!(simple_type_name(&model, node).as_deref(), Some("Image"));
    }

    #[test]
    fn write_property_is_one_transaction() {
        let mut model = SceneModel::new("ct_root", "Item", 400.0, 300.0);
        let root = model.root();
        let a = model.add_node(root, ModelNode::new(NodeId::intern("ct_a"), "Text")).unwrap();
        let b = model.add_node(root, ModelNode::new(NodeId::intern("ct_b"), "Text")).unwrap();
        write_property(&mut model, &[a, b], "text", &"hi".into(), "edit text");
        assert_eq!(model.transaction_stats().committed, 1);
        assert_eq!(model.property(b, "text"), Some(&PropertyValue::from("hi")));
    }
}
