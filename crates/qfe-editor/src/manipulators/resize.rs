//! Resize manipulator: drags one of the eight handles of a single item.
//!
//! The gesture works in the item's own coordinate space, so rotated and
//! scaled items resize along their local axes. Snap lines are built in the
//! same space.

use super::{anchored_on, commit, margin_slot, margins_of, number, set_number};
use crate::config::EditorConfig;
use crate::scene::{FormEditorScene, invert};
use crate::snapping::{NO_SNAP, Snapper, Snapping};
use qfe_core::geometry::round_to;
use qfe_core::{
    AnchorLineKind, Affine, Axis, DesignModel, Line, NodeId, Point, Rect, TransactionId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResizeHandle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::TopLeft,
        ResizeHandle::Top,
        ResizeHandle::TopRight,
        ResizeHandle::Right,
        ResizeHandle::BottomRight,
        ResizeHandle::Bottom,
        ResizeHandle::BottomLeft,
        ResizeHandle::Left,
    ];

    /// Where the handle sits on `rect`.
    pub fn position_in(self, rect: Rect) -> Point {
        let c = rect.center();
        match self {
            ResizeHandle::TopLeft => Point::new(rect.x0, rect.y0),
            ResizeHandle::Top => Point::new(c.x, rect.y0),
            ResizeHandle::TopRight => Point::new(rect.x1, rect.y0),
            ResizeHandle::Right => Point::new(rect.x1, c.y),
            ResizeHandle::BottomRight => Point::new(rect.x1, rect.y1),
            ResizeHandle::Bottom => Point::new(c.x, rect.y1),
            ResizeHandle::BottomLeft => Point::new(rect.x0, rect.y1),
            ResizeHandle::Left => Point::new(rect.x0, c.y),
        }
    }

    pub fn moves_left(self) -> bool {
        matches!(
            self,
            ResizeHandle::TopLeft | ResizeHandle::Left | ResizeHandle::BottomLeft
        )
    }

    pub fn moves_right(self) -> bool {
        matches!(
            self,
            ResizeHandle::TopRight | ResizeHandle::Right | ResizeHandle::BottomRight
        )
    }

    pub fn moves_top(self) -> bool {
        matches!(
            self,
            ResizeHandle::TopLeft | ResizeHandle::Top | ResizeHandle::TopRight
        )
    }

    pub fn moves_bottom(self) -> bool {
        matches!(
            self,
            ResizeHandle::BottomLeft | ResizeHandle::Bottom | ResizeHandle::BottomRight
        )
    }
}

/// Collapse an inverted extent. When both ends moved the extent shrinks
/// to its middle; otherwise the moved end stops at the fixed one.
fn clamp_extent(lo: f64, hi: f64, lo_moved: bool, hi_moved: bool) -> (f64, f64) {
    if hi >= lo {
        (lo, hi)
    } else if lo_moved && hi_moved {
        let mid = (lo + hi) / 2.0;
        (mid, mid)
    } else if lo_moved {
        (hi, hi)
    } else {
        (lo, lo)
    }
}

#[derive(Debug, Clone, Copy)]
struct ResizeBegin {
    node: NodeId,
    handle: ResizeHandle,
    /// Item-local bounding rect.
    rect: Rect,
    to_parent: Affine,
    to_scene: Affine,
    from_scene: Affine,
    position: Point,
    margins: [f64; 6],
}

pub struct ResizeManipulator {
    begin: Option<ResizeBegin>,
    snapper: Snapper,
    guides: Vec<Line>,
    transaction: Option<TransactionId>,
}

impl ResizeManipulator {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            begin: None,
            snapper: Snapper::new(config),
            guides: Vec::new(),
            transaction: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.begin.is_some()
    }

    pub fn node(&self) -> Option<NodeId> {
        self.begin.map(|b| b.node)
    }

    pub fn guides(&self) -> &[Line] {
        &self.guides
    }

    /// Start dragging `handle` of `node`. Returns false if the node has no
    /// item or cannot be resized.
    pub fn begin(
        &mut self,
        model: &mut dyn DesignModel,
        scene: &FormEditorScene,
        node: NodeId,
        handle: ResizeHandle,
    ) -> bool {
        if !model.is_valid(node) || !model.capabilities(node).resizable {
            return false;
        }
        let (Some(item), Some(info)) = (scene.item(node), model.instance_info(node)) else {
            return false;
        };
        let Some(from_scene) = invert(item.scene_transform) else {
            return false;
        };
        self.begin = Some(ResizeBegin {
            node,
            handle,
            rect: item.bounding_rect,
            to_parent: item.item_transform,
            to_scene: item.scene_transform,
            from_scene,
            position: info.position,
            margins: margins_of(&*model, node),
        });
        self.snapper.set_container(item.parent);
        self.snapper.set_transformation_space(Some(node));
        self.snapper.update_snapping_lines(scene, &[node]);
        if self.transaction.is_none() {
            self.transaction = Some(model.begin_transaction("resize"));
        }
        log::debug!("resize begin: {node} {handle:?}");
        true
    }

    pub fn update(&mut self, model: &mut dyn DesignModel, point: Point, snapping: Snapping) {
        let Some(b) = self.begin else {
            return;
        };
        if !model.is_valid(b.node) {
            return;
        }
        let h = b.handle;
        let local = b.from_scene * point;
        let mut rect = b.rect;
        if h.moves_left() {
            rect.x0 = local.x;
        }
        if h.moves_right() {
            rect.x1 = local.x;
        }
        if h.moves_top() {
            rect.y0 = local.y;
        }
        if h.moves_bottom() {
            rect.y1 = local.y;
        }

        self.guides.clear();
        if snapping.snaps() {
            let snaps = [
                (h.moves_left(), self.snapper.snap_left_offset(rect), 0),
                (h.moves_right(), self.snapper.snap_right_offset(rect), 1),
                (h.moves_top(), self.snapper.snap_top_offset(rect), 2),
                (h.moves_bottom(), self.snapper.snap_bottom_offset(rect), 3),
            ];
            for (moved, offset, edge) in snaps {
                if !moved || offset == NO_SNAP {
                    continue;
                }
                match edge {
                    0 => rect.x0 -= offset,
                    1 => rect.x1 -= offset,
                    2 => rect.y0 -= offset,
                    _ => rect.y1 -= offset,
                }
            }
            let lines = self
                .snapper
                .horizontal_snapped_lines(rect)
                .into_iter()
                .chain(self.snapper.vertical_snapped_lines(rect));
            self.guides
                .extend(lines.map(|l| Line::new(b.to_scene * l.p0, b.to_scene * l.p1)));
        }

        // Center-anchored axes grow symmetrically.
        let centered_x = model.has_anchor(b.node, AnchorLineKind::HorizontalCenter);
        let centered_y = model.has_anchor(b.node, AnchorLineKind::VerticalCenter);
        if centered_x {
            if h.moves_left() {
                rect.x1 = b.rect.x1 - (rect.x0 - b.rect.x0);
            } else if h.moves_right() {
                rect.x0 = b.rect.x0 - (rect.x1 - b.rect.x1);
            }
        }
        if centered_y {
            if h.moves_top() {
                rect.y1 = b.rect.y1 - (rect.y0 - b.rect.y0);
            } else if h.moves_bottom() {
                rect.y0 = b.rect.y0 - (rect.y1 - b.rect.y1);
            }
        }
        let x_moved = h.moves_left() || h.moves_right();
        let y_moved = h.moves_top() || h.moves_bottom();
        (rect.x0, rect.x1) = clamp_extent(
            rect.x0,
            rect.x1,
            h.moves_left() || (centered_x && x_moved),
            h.moves_right() || (centered_x && x_moved),
        );
        (rect.y0, rect.y1) = clamp_extent(
            rect.y0,
            rect.y1,
            h.moves_top() || (centered_y && y_moved),
            h.moves_bottom() || (centered_y && y_moved),
        );

        self.write(model, &b, rect);
    }

    fn write(&self, model: &mut dyn DesignModel, b: &ResizeBegin, rect: Rect) {
        let node = b.node;
        let top_left = b.to_parent * rect.origin() - b.to_parent * b.rect.origin();
        let bottom_right = b.to_parent * Point::new(rect.x1, rect.y1)
            - b.to_parent * Point::new(b.rect.x1, b.rect.y1);
        let position = b.position + top_left;

        if !anchored_on(&*model, node, Axis::X) {
            set_number(model, node, "x", position.x);
        }
        if !anchored_on(&*model, node, Axis::Y) {
            set_number(model, node, "y", position.y);
        }
        set_number(model, node, "width", rect.width());
        set_number(model, node, "height", rect.height());

        let margins = [
            (AnchorLineKind::Left, top_left.x),
            (AnchorLineKind::Top, top_left.y),
            (AnchorLineKind::Right, -bottom_right.x),
            (AnchorLineKind::Bottom, -bottom_right.y),
        ];
        for (line, delta) in margins {
            if model.has_anchor(node, line) {
                model.set_margin(node, line, b.margins[margin_slot(line)] + delta);
            }
        }
        log::trace!("resize {node} to {rect:?}");
    }

    /// Finish the gesture: infer anchors against the parent when asked,
    /// then commit.
    pub fn end(&mut self, model: &mut dyn DesignModel, scene: &mut FormEditorScene, snapping: Snapping) {
        if let Some(b) = self.begin
            && snapping.anchors()
            && model.is_valid(b.node)
        {
            scene.update_geometry(&*model, &[b.node]);
            let parent = scene.item(b.node).and_then(|i| i.parent);
            self.snapper.set_container(parent);
            self.snapper.update_snapping_lines(scene, &[b.node]);
            self.snapper.adjust_anchoring_of_item(model, scene, b.node);
        }
        self.clear(model);
    }

    /// Keyboard resize: move the edges `handle` controls by `(dx, dy)`,
    /// keeping margins and center offsets consistent. Values are rounded
    /// to four decimals; sizes never go negative.
    pub fn move_by(
        &mut self,
        model: &mut dyn DesignModel,
        node: NodeId,
        handle: ResizeHandle,
        dx: f64,
        dy: f64,
    ) {
        if !model.is_valid(node) {
            return;
        }
        if self.transaction.is_none() {
            self.transaction = Some(model.begin_transaction("resize by key"));
        }
        let mut x = number(&*model, node, "x");
        let mut y = number(&*model, node, "y");
        let mut width = number(&*model, node, "width");
        let mut height = number(&*model, node, "height");
        let mut margins = margins_of(&*model, node);
        let mut shift = |line: AnchorLineKind, delta: f64| margins[margin_slot(line)] += delta;

        // An edge stops at the opposite one; the position only follows as
        // far as the size actually changed.
        if handle.moves_left() {
            let dx = dx.min(width.max(0.0));
            x += dx;
            width -= dx;
            shift(AnchorLineKind::Left, dx);
            shift(AnchorLineKind::HorizontalCenter, dx / 2.0);
        }
        if handle.moves_right() {
            let dx = dx.max(-width.max(0.0));
            width += dx;
            shift(AnchorLineKind::Right, -dx);
            shift(AnchorLineKind::HorizontalCenter, dx / 2.0);
        }
        if handle.moves_top() {
            let dy = dy.min(height.max(0.0));
            y += dy;
            height -= dy;
            shift(AnchorLineKind::Top, dy);
            shift(AnchorLineKind::VerticalCenter, dy / 2.0);
        }
        if handle.moves_bottom() {
            let dy = dy.max(-height.max(0.0));
            height += dy;
            shift(AnchorLineKind::Bottom, -dy);
            shift(AnchorLineKind::VerticalCenter, dy / 2.0);
        }

        if !anchored_on(&*model, node, Axis::X) {
            set_number(model, node, "x", round_to(x, 4));
        }
        if !anchored_on(&*model, node, Axis::Y) {
            set_number(model, node, "y", round_to(y, 4));
        }
        set_number(model, node, "width", round_to(width.max(0.0), 4));
        set_number(model, node, "height", round_to(height.max(0.0), 4));
        for line in AnchorLineKind::ALL {
            if model.has_anchor(node, line) {
                model.set_margin(node, line, round_to(margins[margin_slot(line)], 4));
            }
        }
    }

    pub fn clear(&mut self, model: &mut dyn DesignModel) {
        commit(model, &mut self.transaction);
        self.begin = None;
        self.guides.clear();
        self.snapper.clear();
    }
}
