//! Drags the selection, and nudges it with the arrow keys.

use super::{Tool, ToolContext, ToolKind, ToolRequest};
use crate::config::EditorConfig;
use crate::indicators::{OverlayItem, SelectionIndicator};
use crate::input::{InputEvent, Key, Modifiers};
use crate::manipulators::{MoveManipulator, ReparentFlag, StateFlag};
use crate::scene::FormEditorScene;
use qfe_core::{DesignModel, NodeId, Point};

pub struct MoveTool {
    manipulator: MoveManipulator,
    indicator: SelectionIndicator,
    last_update_ms: Option<u64>,
}

impl MoveTool {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            manipulator: MoveManipulator::new(config),
            indicator: SelectionIndicator::default(),
            last_update_ms: None,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.manipulator.is_active()
    }

    fn begin(&mut self, ctx: &mut ToolContext<'_>, pos: Point) {
        let items = ctx.selection();
        self.manipulator.set_items(&*ctx.model, ctx.scene, &items);
        if self.manipulator.items().is_empty() {
            ctx.change_tool(ToolRequest::Selection);
            return;
        }
        self.manipulator.begin(ctx.model, ctx.scene, pos);
        self.last_update_ms = None;
    }

    /// Apply one pointer position: optional reparenting with Shift, then
    /// the snapped move.
    fn apply(&mut self, ctx: &mut ToolContext<'_>, pos: Point, modifiers: Modifiers) {
        if modifiers.shift {
            let moving = self.manipulator.items().to_vec();
            if let Some(target) = ctx.container_at(pos, &moving)
                && self.manipulator.container() != Some(target)
            {
                let flag = if modifiers.alt {
                    ReparentFlag::EnforceReparent
                } else {
                    ReparentFlag::FindLayoutAncestor
                };
                self.manipulator
                    .reparent_to(ctx.model, ctx.scene, target, flag);
            }
        }
        let snapping = ctx.config.snap_mode.for_modifiers(modifiers);
        self.manipulator.update(
            ctx.model,
            ctx.scene,
            pos,
            snapping,
            StateFlag::UseCurrentState,
        );
    }

    fn nudge(&mut self, ctx: &mut ToolContext<'_>, key: Key, modifiers: Modifiers) {
        let Some((dx, dy)) = key.arrow_direction() else {
            return;
        };
        if self.manipulator.items().is_empty() {
            let items = ctx.selection();
            self.manipulator.set_items(&*ctx.model, ctx.scene, &items);
        }
        let step = if modifiers.shift {
            ctx.config.key_step_large
        } else {
            ctx.config.key_step
        };
        self.manipulator.move_by(ctx.model, dx * step, dy * step);
    }
}

impl Tool for MoveTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Move
    }

    fn handle(&mut self, ctx: &mut ToolContext<'_>, event: &InputEvent) {
        match event {
            InputEvent::PointerDown { pos, .. } => self.begin(ctx, *pos),
            InputEvent::PointerMove {
                pos,
                modifiers,
                time_ms,
            } => {
                if !self.manipulator.is_active() {
                    return;
                }
                if let Some(last) = self.last_update_ms
                    && time_ms.saturating_sub(last) < ctx.config.move_throttle_ms
                {
                    return;
                }
                self.last_update_ms = Some(*time_ms);
                self.apply(ctx, *pos, *modifiers);
            }
            InputEvent::PointerUp { pos, modifiers, .. } => {
                // The release always lands, throttled or not.
                if self.manipulator.is_active() {
                    self.apply(ctx, *pos, *modifiers);
                    let snapping = ctx.config.snap_mode.for_modifiers(*modifiers);
                    self.manipulator.end(ctx.model, ctx.scene, snapping);
                }
                ctx.change_tool(ToolRequest::Selection);
            }
            InputEvent::KeyDown { key, modifiers } => match key {
                k if k.is_arrow() => self.nudge(ctx, *k, *modifiers),
                // Commits whatever moved so far.
                Key::Escape => {
                    self.manipulator.clear(ctx.model);
                    ctx.change_tool(ToolRequest::Selection);
                }
                _ => {}
            },
            InputEvent::KeyUp { key, .. } if key.is_arrow() => {
                if !self.manipulator.is_active() {
                    self.manipulator.clear(ctx.model);
                    ctx.change_tool(ToolRequest::Selection);
                }
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
        self.last_update_ms = None;
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
