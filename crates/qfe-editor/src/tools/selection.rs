//! The default tool: click and rubber-band selection, and the hub every
//! other tool is reached from.

use super::{Tool, ToolContext, ToolKind, ToolRequest};
use crate::indicators::{IndicatorSet, OverlayItem};
use crate::input::{InputEvent, Key, Modifiers};
use crate::manipulators::{RubberBandSelectionManipulator, SelectionMode};
use crate::scene::{FormEditorScene, HandleHit};
use qfe_core::{DesignModel, NodeId, Point};

/// A press on an item that may turn into a move.
#[derive(Debug, Clone)]
struct Press {
    pos: Point,
    time_ms: u64,
    node: NodeId,
    event: InputEvent,
}

#[derive(Debug, Default)]
pub struct SelectionTool {
    indicators: IndicatorSet,
    rubber_band: RubberBandSelectionManipulator,
    press: Option<Press>,
    items: Vec<NodeId>,
}

impl SelectionTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_rubber_band_active(&self) -> bool {
        self.rubber_band.is_active()
    }

    fn switch_to_handle(ctx: &mut ToolContext<'_>, hit: HandleHit, event: &InputEvent) {
        let request = match hit {
            HandleHit::Resize { .. } => ToolRequest::Resize,
            HandleHit::Rotation { .. } => ToolRequest::Rotate,
        };
        ctx.change_tool_with_replay(request, vec![event.clone()]);
    }

    fn click(ctx: &mut ToolContext<'_>, node: NodeId, modifiers: Modifiers) {
        let mut selection = ctx.selection();
        let selected = selection.contains(&node);
        if modifiers.shift {
            if !selected {
                selection.push(node);
            }
        } else if modifiers.command() {
            if selected {
                selection.retain(|n| *n != node);
            } else {
                selection.push(node);
            }
        } else if !selected {
            selection = vec![node];
        }
        ctx.model.set_selected_nodes(selection);
    }

    fn press(&mut self, ctx: &mut ToolContext<'_>, event: &InputEvent) {
        let InputEvent::PointerDown {
            pos,
            modifiers,
            time_ms,
        } = event
        else {
            return;
        };
        self.press = None;
        if let Some(hit) = ctx.scene.handle_at(*pos) {
            Self::switch_to_handle(ctx, hit, event);
            return;
        }
        let top = ctx.top_item_at(*pos);
        if modifiers.alt
            && let Some(node) = top
            && ctx.model.capabilities(node).movable
        {
            ctx.model.set_selected_nodes(vec![node]);
            ctx.change_tool_with_replay(ToolRequest::Move, vec![event.clone()]);
            return;
        }
        match top {
            Some(node) => {
                Self::click(ctx, node, *modifiers);
                self.press = Some(Press {
                    pos: *pos,
                    time_ms: *time_ms,
                    node,
                    event: event.clone(),
                });
            }
            None => {
                if SelectionMode::for_modifiers(*modifiers) == SelectionMode::Replace {
                    ctx.model.set_selected_nodes(Vec::new());
                }
                self.rubber_band.begin(&*ctx.model, ctx.scene, *pos);
            }
        }
    }

    /// Start moving once the pointer has travelled far enough for long
    /// enough. Both thresholds must be exceeded.
    fn drag(&mut self, ctx: &mut ToolContext<'_>, event: &InputEvent, pos: Point, time_ms: u64) {
        let Some(press) = &self.press else {
            return;
        };
        let distance = (pos.x - press.pos.x).abs() + (pos.y - press.pos.y).abs();
        let elapsed = time_ms.saturating_sub(press.time_ms);
        if distance <= ctx.config.move_start_distance || elapsed <= ctx.config.move_start_delay_ms {
            return;
        }
        let node = press.node;
        if !ctx.selection().contains(&node) || !ctx.model.capabilities(node).movable {
            return;
        }
        let replay = vec![press.event.clone(), event.clone()];
        self.press = None;
        ctx.change_tool_with_replay(ToolRequest::Move, replay);
    }

    fn delete_selection(ctx: &mut ToolContext<'_>) {
        let root = ctx.model.root();
        let selection: Vec<NodeId> = ctx.selection().into_iter().filter(|n| *n != root).collect();
        if selection.is_empty() {
            return;
        }
        let transaction = ctx.model.begin_transaction("delete selection");
        for node in selection {
            if !ctx.model.is_valid(node) {
                continue;
            }
            if let Err(err) = ctx.model.remove_node(node) {
                log::warn!("cannot delete {node}: {err}");
            }
        }
        if let Err(err) = ctx.model.commit(transaction) {
            log::warn!("delete selection: {err}");
        }
    }
}

impl Tool for SelectionTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Selection
    }

    fn handle(&mut self, ctx: &mut ToolContext<'_>, event: &InputEvent) {
        match event {
            InputEvent::HoverMove { pos, .. } => {
                if let Some(hit) = ctx.scene.handle_at(*pos) {
                    Self::switch_to_handle(ctx, hit, event);
                }
            }
            InputEvent::PointerDown { .. } => self.press(ctx, event),
            InputEvent::PointerMove {
                pos,
                modifiers,
                time_ms,
            } => {
                if self.rubber_band.is_active() {
                    self.rubber_band.update(*pos);
                    self.rubber_band.select(
                        ctx.model,
                        ctx.scene,
                        SelectionMode::for_modifiers(*modifiers),
                    );
                } else {
                    self.drag(ctx, event, *pos, *time_ms);
                }
            }
            InputEvent::PointerUp { pos, modifiers, .. } => {
                if self.rubber_band.is_active() {
                    self.rubber_band.update(*pos);
                    self.rubber_band.select(
                        ctx.model,
                        ctx.scene,
                        SelectionMode::for_modifiers(*modifiers),
                    );
                    self.rubber_band.end();
                }
                self.press = None;
            }
            InputEvent::DoubleClick { pos, .. } => {
                if let Some(node) = ctx.top_item_at(*pos) {
                    if !ctx.selection().contains(&node) {
                        ctx.model.set_selected_nodes(vec![node]);
                    }
                    ctx.change_tool(ToolRequest::Custom { name: None });
                }
            }
            InputEvent::KeyDown { key, .. } => match key {
                k if k.is_arrow() => {
                    if !ctx.selection().is_empty() {
                        ctx.change_tool_with_replay(ToolRequest::Move, vec![event.clone()]);
                    }
                }
                Key::Delete | Key::Backspace => Self::delete_selection(ctx),
                Key::Escape => ctx.model.set_selected_nodes(Vec::new()),
                _ => {}
            },
            InputEvent::DragEnter { .. } => {
                ctx.change_tool_with_replay(ToolRequest::Drag, vec![event.clone()]);
            }
            _ => {}
        }
    }

    fn set_items(&mut self, ctx: &mut ToolContext<'_>, items: &[NodeId]) {
        self.items = items.to_vec();
        self.indicators.set_items(&*ctx.model, ctx.scene, items);
    }

    fn clear(&mut self, ctx: &mut ToolContext<'_>) {
        self.rubber_band.end();
        self.press = None;
        self.items.clear();
        self.indicators.clear(ctx.scene);
    }

    fn update_indicators(&mut self, ctx: &mut ToolContext<'_>) {
        self.indicators.update_items(&*ctx.model, ctx.scene, &self.items);
    }

    fn collect_overlay(
        &self,
        model: &dyn DesignModel,
        scene: &FormEditorScene,
        out: &mut Vec<OverlayItem>,
    ) {
        self.indicators.collect_overlay(model, scene, out);
        if let Some(rect) = self.rubber_band.rect() {
            out.push(OverlayItem::RubberBand(rect));
        }
    }
}
