//! Rotation manipulator: drags a corner handle around the item's pivot.

use super::{anchored_on, commit, set_number};
use crate::input::Modifiers;
use crate::scene::FormEditorScene;
use qfe_core::geometry::{fuzzy_point_eq, item_transform};
use qfe_core::{
    Affine, Axis, DesignModel, NodeId, Point, Rect, Size, TransactionId, TransformOrigin,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationHandle {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl RotationHandle {
    pub const ALL: [RotationHandle; 4] = [
        RotationHandle::TopLeft,
        RotationHandle::TopRight,
        RotationHandle::BottomRight,
        RotationHandle::BottomLeft,
    ];

    /// The corner of `rect` this handle belongs to.
    pub fn position_in(self, rect: Rect) -> Point {
        match self {
            RotationHandle::TopLeft => Point::new(rect.x0, rect.y0),
            RotationHandle::TopRight => Point::new(rect.x1, rect.y0),
            RotationHandle::BottomRight => Point::new(rect.x1, rect.y1),
            RotationHandle::BottomLeft => Point::new(rect.x0, rect.y1),
        }
    }
}

/// Snap an angle in degrees: Alt to 45° steps, Shift to 5° steps.
pub fn snap_angle(degrees: f64, modifiers: Modifiers) -> f64 {
    let step = if modifiers.alt {
        45.0
    } else if modifiers.shift {
        5.0
    } else {
        return degrees;
    };
    (degrees / step).round() * step
}

#[derive(Debug, Clone, Copy)]
struct RotationBegin {
    node: NodeId,
    /// Pivot in item space.
    pivot: Point,
    /// True when the pivot differs from the transform origin, so the
    /// position has to compensate.
    moves_origin: bool,
    pivot_scene: Point,
    handle_scene: Point,
    to_parent: Affine,
    position: Point,
    size: Size,
    rotation: f64,
    scale: f64,
    origin: TransformOrigin,
}

#[derive(Default)]
pub struct RotationManipulator {
    begin: Option<RotationBegin>,
    transaction: Option<TransactionId>,
}

impl RotationManipulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.begin.is_some()
    }

    pub fn node(&self) -> Option<NodeId> {
        self.begin.map(|b| b.node)
    }

    /// Start rotating `node` by `handle`. The pivot is the transform origin
    /// unless that coincides with the dragged corner, in which case the
    /// item rotates around its center.
    pub fn begin(
        &mut self,
        model: &mut dyn DesignModel,
        scene: &FormEditorScene,
        node: NodeId,
        handle: RotationHandle,
    ) -> bool {
        if !model.is_valid(node) || !model.capabilities(node).rotatable {
            return false;
        }
        let (Some(item), Some(info)) = (scene.item(node), model.instance_info(node)) else {
            return false;
        };
        let rect = item.bounding_rect;
        let corner = handle.position_in(rect);
        let origin_point = info.transform_origin.point_in(rect);
        let (pivot, moves_origin) = if fuzzy_point_eq(origin_point, corner) {
            (rect.center(), true)
        } else {
            (origin_point, false)
        };
        self.begin = Some(RotationBegin {
            node,
            pivot,
            moves_origin,
            pivot_scene: item.scene_transform * pivot,
            handle_scene: item.scene_transform * corner,
            to_parent: item.item_transform,
            position: info.position,
            size: info.size,
            rotation: info.rotation,
            scale: info.scale,
            origin: info.transform_origin,
        });
        if self.transaction.is_none() {
            self.transaction = Some(model.begin_transaction("rotate"));
        }
        log::debug!("rotation begin: {node} {handle:?} pivot {pivot:?}");
        true
    }

    pub fn update(&mut self, model: &mut dyn DesignModel, point: Point, modifiers: Modifiers) {
        let Some(b) = self.begin else {
            return;
        };
        if !model.is_valid(b.node) || fuzzy_point_eq(point, b.pivot_scene) {
            return;
        }
        let start = (b.handle_scene - b.pivot_scene).atan2();
        let current = (point - b.pivot_scene).atan2();
        let rotation = snap_angle(b.rotation + (current - start).to_degrees(), modifiers) % 360.0;

        if b.moves_origin {
            let transform = item_transform(b.position, b.size, rotation, b.scale, b.origin);
            let drift = b.to_parent * b.pivot - transform * b.pivot;
            let position = b.position + drift;
            if !anchored_on(&*model, b.node, Axis::X) {
                set_number(model, b.node, "x", position.x);
            }
            if !anchored_on(&*model, b.node, Axis::Y) {
                set_number(model, b.node, "y", position.y);
            }
        }
        set_number(model, b.node, "rotation", rotation);
        log::trace!("rotate {} to {rotation}", b.node);
    }

    pub fn end(&mut self, model: &mut dyn DesignModel) {
        self.clear(model);
    }

    pub fn clear(&mut self, model: &mut dyn DesignModel) {
        commit(model, &mut self.transaction);
        self.begin = None;
    }
}
