//! On-screen overlays drawn above the scene.
//!
//! Indicators never paint; they describe shapes as [`OverlayItem`]s that
//! the host renders. Resize and rotation handles are also hit targets, so
//! their controllers live in arenas owned by the scene.

pub mod anchor;
pub mod binding;
pub mod content_not_editable;
pub mod resize;
pub mod rotation;
pub mod selection;

pub use anchor::AnchorIndicator;
pub use binding::BindingIndicator;
pub use content_not_editable::ContentNotEditableIndicator;
pub use resize::{ResizeController, ResizeIndicator};
pub use rotation::{RotationController, RotationIndicator};
pub use selection::SelectionIndicator;

use crate::manipulators::{ResizeHandle, RotationHandle};
use crate::scene::{FormEditorItem, FormEditorScene};
use kurbo::ParamCurveNearest;
use qfe_core::{AnchorLineKind, AnchorTarget, DesignModel, Line, NodeId, Point, Rect};
use std::collections::BTreeMap;

// ─── Controller arena ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ControllerId(u64);

/// Owner of handle controllers. Ids are never reused, so a stale id simply
/// misses.
#[derive(Debug)]
pub struct ControllerArena<T> {
    entries: BTreeMap<ControllerId, T>,
    next: u64,
}

impl<T> Default for ControllerArena<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            next: 1,
        }
    }
}

impl<T> ControllerArena<T> {
    pub fn insert(&mut self, value: T) -> ControllerId {
        let id = ControllerId(self.next);
        self.next += 1;
        self.entries.insert(id, value);
        id
    }

    pub fn get(&self, id: ControllerId) -> Option<&T> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: ControllerId) -> Option<&mut T> {
        self.entries.get_mut(&id)
    }

    pub fn remove(&mut self, id: ControllerId) -> Option<T> {
        self.entries.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ControllerId, &T)> {
        self.entries.iter().map(|(id, value)| (*id, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ─── Overlay ──────────────────────────────────────────────────────────────

/// One shape of the overlay, in scene coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayItem {
    SelectionFrame {
        node: NodeId,
        corners: [Point; 4],
    },
    ResizeHandle {
        controller: ControllerId,
        node: NodeId,
        handle: ResizeHandle,
        rect: Rect,
    },
    RotationHandle {
        controller: ControllerId,
        node: NodeId,
        handle: RotationHandle,
        rect: Rect,
    },
    AnchorLine {
        node: NodeId,
        line: AnchorLineKind,
        segment: Line,
        highlighted: bool,
    },
    /// An existing anchor, drawn from the source line to its target line.
    AnchorConnection {
        node: NodeId,
        line: AnchorLineKind,
        target: AnchorTarget,
        from: Point,
        to: Point,
    },
    BindingLine {
        node: NodeId,
        line: AnchorLineKind,
        segment: Line,
    },
    ContentNotEditable {
        node: NodeId,
        corners: [Point; 4],
    },
    SnapGuide(Line),
    RubberBand(Rect),
}

// ─── Indicator set ────────────────────────────────────────────────────────

/// Every indicator the selection tool shows for the current selection.
#[derive(Debug, Default)]
pub struct IndicatorSet {
    pub selection: SelectionIndicator,
    pub resize: ResizeIndicator,
    pub rotation: RotationIndicator,
    pub anchor: AnchorIndicator,
    pub binding: BindingIndicator,
    pub content_not_editable: ContentNotEditableIndicator,
}

impl IndicatorSet {
    pub fn set_items(
        &mut self,
        model: &dyn DesignModel,
        scene: &mut FormEditorScene,
        items: &[NodeId],
    ) {
        self.selection.set_items(items);
        self.resize.set_items(model, scene, items);
        self.rotation.set_items(model, scene, items);
        self.anchor.set_items(model, items);
        self.binding.set_items(model, items);
        self.content_not_editable.set_items(model, items);
    }

    pub fn update_items(
        &mut self,
        model: &dyn DesignModel,
        scene: &mut FormEditorScene,
        items: &[NodeId],
    ) {
        self.selection.update_items(scene);
        self.resize.update_items(scene);
        self.rotation.update_items(scene);
        self.anchor.update_items(model);
        self.binding.update_items(model, items);
        self.content_not_editable.update_items(model, items);
    }

    pub fn clear(&mut self, scene: &mut FormEditorScene) {
        self.selection.clear();
        self.resize.clear(scene);
        self.rotation.clear(scene);
        self.anchor.clear();
        self.binding.clear();
        self.content_not_editable.clear();
    }

    pub fn collect_overlay(
        &self,
        model: &dyn DesignModel,
        scene: &FormEditorScene,
        out: &mut Vec<OverlayItem>,
    ) {
        self.content_not_editable.collect_overlay(scene, out);
        self.selection.collect_overlay(scene, out);
        self.binding.collect_overlay(scene, out);
        self.anchor.collect_overlay(model, scene, out);
        self.resize.collect_overlay(scene, out);
        self.rotation.collect_overlay(scene, out);
    }
}

/// The segment of `line` across `item`, in scene space.
pub fn anchor_line_segment(item: &FormEditorItem, line: AnchorLineKind) -> Line {
    let r = item.bounding_rect;
    let c = r.center();
    let (p0, p1) = match line {
        AnchorLineKind::Left => (Point::new(r.x0, r.y0), Point::new(r.x0, r.y1)),
        AnchorLineKind::Right => (Point::new(r.x1, r.y0), Point::new(r.x1, r.y1)),
        AnchorLineKind::Top => (Point::new(r.x0, r.y0), Point::new(r.x1, r.y0)),
        AnchorLineKind::Bottom => (Point::new(r.x0, r.y1), Point::new(r.x1, r.y1)),
        AnchorLineKind::HorizontalCenter => (Point::new(c.x, r.y0), Point::new(c.x, r.y1)),
        AnchorLineKind::VerticalCenter => (Point::new(r.x0, c.y), Point::new(r.x1, c.y)),
    };
    Line::new(item.scene_transform * p0, item.scene_transform * p1)
}

/// True if `point` lies within `tolerance` of `segment`.
pub fn near_segment(segment: Line, point: Point, tolerance: f64) -> bool {
    segment.nearest(point, 1e-6).distance_sq <= tolerance * tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_ids_are_not_reused() {
        let mut arena = ControllerArena::default();
        let a = arena.insert("a");
        let b = arena.insert("b");
        assert_eq!(arena.remove(a), Some("a"));
        let c = arena.insert("c");
        assert_ne!(a, c);
        assert!(arena.get(a).is_none());
        assert_eq!(arena.get(b), Some(&"b"));
        let ids: Vec<ControllerId> = arena.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![b, c]);
    }

    #[test]
    fn segment_distance() {
        let segment = Line::new(Point::new(0.0, 0.0), Point::new(0.0, 100.0));
        assert!(near_segment(segment, Point::new(2.0, 50.0), 3.0));
        assert!(!near_segment(segment, Point::new(0.0, 104.0), 3.0));
    }
}
