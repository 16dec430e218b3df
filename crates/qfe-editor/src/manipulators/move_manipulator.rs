//! Move manipulator: drags one or more sibling items.
//!
//! `idle → begin(point) → update* → end(snapping)`. Anchored items keep
//! their anchors; the move edits their margins instead.

use super::{
    ReparentFlag, StateFlag, anchored_on, commit, margin_slot, margins_of, number, set_number,
};
use crate::config::EditorConfig;
use crate::scene::{FormEditorScene, invert};
use crate::snapping::{NO_SNAP, Snapper, Snapping};
use qfe_core::geometry::map_rect;
use qfe_core::{
    AnchorLineKind, Axis, DesignModel, Line, NodeId, Point, Rect, TransactionId, Vec2,
};
use std::collections::HashMap;

/// Begin snapshot of one moving item.
#[derive(Debug, Clone, Copy)]
struct BeginState {
    /// Bounding rect in container space.
    rect: Rect,
    /// Position in parent space.
    position: Point,
    margins: [f64; 6],
}

impl BeginState {
    fn margin(&self, line: AnchorLineKind) -> f64 {
        self.margins[margin_slot(line)]
    }
}

pub struct MoveManipulator {
    items: Vec<NodeId>,
    begin: HashMap<NodeId, BeginState>,
    begin_point: Point,
    snapper: Snapper,
    guides: Vec<Line>,
    transaction: Option<TransactionId>,
    active: bool,
}

impl MoveManipulator {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            items: Vec::new(),
            begin: HashMap::new(),
            begin_point: Point::ZERO,
            snapper: Snapper::new(config),
            guides: Vec::new(),
            transaction: None,
            active: false,
        }
    }

    /// Items to move. Only valid items sharing the first item's parent are
    /// kept; the root never moves.
    pub fn set_items(&mut self, model: &dyn DesignModel, scene: &FormEditorScene, items: &[NodeId]) {
        let movable: Vec<NodeId> = items
            .iter()
            .copied()
            .filter(|n| {
                model.is_valid(*n)
                    && *n != model.root()
                    && model.capabilities(*n).movable
                    && scene.has_item(*n)
            })
            .collect();
        let parent = movable.first().and_then(|n| model.instance_parent(*n));
        self.items = movable
            .into_iter()
            .filter(|n| model.instance_parent(*n) == parent)
            .collect();
        self.snapper.set_container(parent);
    }

    pub fn items(&self) -> &[NodeId] {
        &self.items
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn container(&self) -> Option<NodeId> {
        self.snapper.container()
    }

    /// Snap guides of the last update, in scene space.
    pub fn guides(&self) -> &[Line] {
        &self.guides
    }

    fn begin_state(
        &self,
        model: &dyn DesignModel,
        scene: &FormEditorScene,
        node: NodeId,
    ) -> Option<BeginState> {
        let item = scene.item(node)?;
        let container = scene.item(self.snapper.container()?)?;
        let to_container = invert(container.scene_transform)? * item.scene_transform;
        Some(BeginState {
            rect: map_rect(to_container, item.bounding_rect),
            position: model.instance_info(node)?.position,
            margins: margins_of(model, node),
        })
    }

    /// Snapshot the items, open the transaction and prime the snap lines.
    pub fn begin(&mut self, model: &mut dyn DesignModel, scene: &FormEditorScene, point: Point) {
        if self.items.is_empty() {
            return;
        }
        self.begin.clear();
        for node in &self.items {
            if let Some(state) = self.begin_state(&*model, scene, *node) {
                self.begin.insert(*node, state);
            }
        }
        self.begin_point = point;
        self.snapper.update_snapping_lines(scene, &self.items);
        if self.transaction.is_none() {
            self.transaction = Some(model.begin_transaction("move"));
        }
        self.active = true;
        log::debug!("move begin: {} items at {point:?}", self.items.len());
    }

    /// Pointer delta in container space, corrected by snapping.
    fn offset(&mut self, scene: &FormEditorScene, point: Point, snapping: Snapping) -> Option<Vec2> {
        let container = scene.item(self.snapper.container()?)?;
        let from_scene = invert(container.scene_transform)?;
        let mut offset = from_scene * point - from_scene * self.begin_point;
        self.guides.clear();
        if !snapping.snaps() {
            return Some(offset);
        }

        let mut dx = NO_SNAP;
        let mut dy = NO_SNAP;
        for node in &self.items {
            let Some(begin) = self.begin.get(node) else {
                continue;
            };
            let moved = begin.rect + offset;
            let x = self.snapper.snapped_vertical_offset(moved);
            if x.abs() < dx.abs() {
                dx = x;
            }
            let y = self.snapper.snapped_horizontal_offset(moved);
            if y.abs() < dy.abs() {
                dy = y;
            }
        }
        if dx != NO_SNAP {
            offset.x -= dx;
        }
        if dy != NO_SNAP {
            offset.y -= dy;
        }

        let to_scene = container.scene_transform;
        for node in &self.items {
            let Some(begin) = self.begin.get(node) else {
                continue;
            };
            let moved = begin.rect + offset;
            let lines = self
                .snapper
                .horizontal_snapped_lines(moved)
                .into_iter()
                .chain(self.snapper.vertical_snapped_lines(moved));
            self.guides
                .extend(lines.map(|l| Line::new(to_scene * l.p0, to_scene * l.p1)));
        }
        Some(offset)
    }

    pub fn update(
        &mut self,
        model: &mut dyn DesignModel,
        scene: &FormEditorScene,
        point: Point,
        snapping: Snapping,
        state: StateFlag,
    ) {
        if !self.active {
            return;
        }
        let Some(offset) = self.offset(scene, point, snapping) else {
            return;
        };
        log::trace!("move update {offset:?}");
        for node in self.items.clone() {
            if !model.is_valid(node) {
                continue;
            }
            let Some(begin) = self.begin.get(&node).copied() else {
                continue;
            };
            for axis in [Axis::X, Axis::Y] {
                let delta = match axis {
                    Axis::X => offset.x,
                    Axis::Y => offset.y,
                };
                if state == StateFlag::UseCurrentState && anchored_on(&*model, node, axis) {
                    for line in axis.lines() {
                        if model.has_anchor(node, line) {
                            let sign = if line.is_trailing() { -1.0 } else { 1.0 };
                            model.set_margin(node, line, begin.margin(line) + sign * delta);
                        }
                    }
                } else {
                    match axis {
                        Axis::X => set_number(model, node, "x", begin.position.x + delta),
                        Axis::Y => set_number(model, node, "y", begin.position.y + delta),
                    }
                }
            }
        }
    }

    /// Reparent the moving items into `new_parent`, keeping their scene
    /// position. Anchors are dropped. Returns true if anything moved.
    pub fn reparent_to(
        &mut self,
        model: &mut dyn DesignModel,
        scene: &mut FormEditorScene,
        new_parent: NodeId,
        flag: ReparentFlag,
    ) -> bool {
        if !self.active || self.items.is_empty() || !model.is_valid(new_parent) {
            return false;
        }
        let mut target = new_parent;
        if flag == ReparentFlag::FindLayoutAncestor {
            let mut current = Some(new_parent);
            while let Some(candidate) = current {
                let caps = model.capabilities(candidate);
                if caps.layout || caps.stacked_container {
                    target = candidate;
                    break;
                }
                current = model.instance_parent(candidate);
            }
        }
        if !model.capabilities(target).container {
            return false;
        }
        // Never into one of the moving items or their descendants.
        let mut current = Some(target);
        while let Some(candidate) = current {
            if self.items.contains(&candidate) {
                return false;
            }
            current = model.instance_parent(candidate);
        }
        let Some(to_target) = scene.item(target).and_then(|i| invert(i.scene_transform)) else {
            return false;
        };

        let mut moved = Vec::new();
        for node in self.items.clone() {
            let Some(parent) = model.instance_parent(node) else {
                continue;
            };
            if parent == target || !model.is_valid(node) {
                continue;
            }
            let Some(parent_scene) = scene.item(parent).map(|i| i.scene_transform) else {
                continue;
            };
            let Some(info) = model.instance_info(node) else {
                continue;
            };
            if let Err(err) = model.reparent(node, target) {
                log::warn!("reparent of {node} skipped: {err}");
                continue;
            }
            for line in AnchorLineKind::ALL {
                model.remove_anchor(node, line);
                model.remove_margin(node, line);
            }
            let position = to_target * (parent_scene * info.position);
            set_number(model, node, "x", position.x);
            set_number(model, node, "y", position.y);

            let old_to_new = to_target * parent_scene;
            if let Some(begin) = self.begin.get_mut(&node) {
                begin.position = old_to_new * begin.position;
                begin.rect = map_rect(old_to_new, begin.rect);
                begin.margins = [0.0; 6];
            }
            moved.push(node);
        }
        if moved.is_empty() {
            return false;
        }
        for node in &moved {
            scene.reparent_item(&*model, *node);
        }
        log::debug!("reparented {} items into {target}", moved.len());
        self.snapper.set_container(Some(target));
        self.snapper.update_snapping_lines(scene, &self.items);
        true
    }

    /// Finish the gesture: infer anchors when asked, then commit.
    pub fn end(
        &mut self,
        model: &mut dyn DesignModel,
        scene: &mut FormEditorScene,
        snapping: Snapping,
    ) {
        if self.active && snapping.anchors() {
            scene.update_geometry(&*model, &self.items);
            for node in &self.items {
                self.snapper.adjust_anchoring_of_item(model, scene, *node);
            }
        }
        self.clear(model);
    }

    /// Keyboard nudge. Applies the delta directly to positions or, on
    /// anchored axes, to margins (mirrored for bottom/right). Opens a
    /// transaction on first use that stays open until `clear`.
    pub fn move_by(&mut self, model: &mut dyn DesignModel, dx: f64, dy: f64) {
        if self.items.is_empty() {
            return;
        }
        if self.transaction.is_none() {
            self.transaction = Some(model.begin_transaction("move by key"));
        }
        for node in self.items.clone() {
            if !model.is_valid(node) {
                continue;
            }
            for (axis, delta) in [(Axis::X, dx), (Axis::Y, dy)] {
                if delta == 0.0 {
                    continue;
                }
                if anchored_on(&*model, node, axis) {
                    for line in axis.lines() {
                        if model.has_anchor(node, line) {
                            let sign = if line.is_trailing() { -1.0 } else { 1.0 };
                            let margin = model.instance_margin(node, line) + sign * delta;
                            model.set_margin(node, line, margin);
                        }
                    }
                } else {
                    let name = if axis == Axis::X { "x" } else { "y" };
                    let value = number(&*model, node, name) + delta;
                    set_number(model, node, name, value);
                }
            }
        }
    }

    /// Commit any open transaction and forget the gesture.
    pub fn clear(&mut self, model: &mut dyn DesignModel) {
        commit(model, &mut self.transaction);
        self.items.clear();
        self.begin.clear();
        self.guides.clear();
        self.snapper.clear();
        self.active = false;
    }
}
