//! Snapping engine.
//!
//! Offsets follow one convention throughout: `offset = value - line`, so a
//! caller snaps by subtracting the offset. [`NO_SNAP`] means no line was
//! within reach on that axis.

use super::lines::{LineMap, SnapLine, SnapLineIndex};
use crate::config::EditorConfig;
use crate::scene::{FormEditorScene, invert};
use qfe_core::geometry::map_rect;
use qfe_core::{AnchorLineKind, AnchorTarget, Axis, DesignModel, Line, NodeId, Point, Rect};

pub const NO_SNAP: f64 = f64::MAX;

/// Below this distance a rect edge counts as lying on a line.
const ON_LINE: f64 = 1e-4;

fn min_abs(offsets: &[f64]) -> f64 {
    let mut best = NO_SNAP;
    for offset in offsets {
        if offset.abs() < best.abs() {
            best = *offset;
        }
    }
    best
}

/// True if `owner` and `rect` share some extent across the line's axis.
/// A vertical line (x coordinate) compares y ranges and vice versa.
fn overlaps_across(line_axis: Axis, owner: Rect, rect: Rect) -> bool {
    match line_axis {
        Axis::X => rect.y0 <= owner.y1 && rect.y1 >= owner.y0,
        Axis::Y => rect.x0 <= owner.x1 && rect.x1 >= owner.x0,
    }
}

#[derive(Debug, Clone)]
pub struct Snapper {
    index: SnapLineIndex,
    container: Option<NodeId>,
    transformation_space: Option<NodeId>,
    snapping_distance: f64,
    anchor_tolerance: f64,
    spacing: f64,
    padding: f64,
}

impl Snapper {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            index: SnapLineIndex::default(),
            container: None,
            transformation_space: None,
            snapping_distance: config.snapping_distance,
            anchor_tolerance: config.anchor_tolerance,
            spacing: config.item_spacing,
            padding: config.container_padding,
        }
    }

    pub fn container(&self) -> Option<NodeId> {
        self.container
    }

    /// Set the container and use it as transformation space as well.
    pub fn set_container(&mut self, container: Option<NodeId>) {
        self.container = container;
        self.transformation_space = container;
    }

    pub fn set_transformation_space(&mut self, space: Option<NodeId>) {
        self.transformation_space = space;
    }

    pub fn transformation_space(&self) -> Option<NodeId> {
        self.transformation_space
    }

    pub fn index(&self) -> &SnapLineIndex {
        &self.index
    }

    pub fn snapping_distance(&self) -> f64 {
        self.snapping_distance
    }

    /// Rebuild the line index, ignoring `exceptions` as snap targets.
    pub fn update_snapping_lines(&mut self, scene: &FormEditorScene, exceptions: &[NodeId]) {
        match (self.container, self.transformation_space) {
            (Some(container), Some(space)) => self.index.update(
                scene,
                container,
                space,
                exceptions,
                self.spacing,
                self.padding,
            ),
            _ => self.index.clear(),
        }
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.container = None;
        self.transformation_space = None;
    }

    // ── offsets ──

    fn offset_for_lines(&self, lines: &LineMap, value: f64) -> f64 {
        let offsets: Vec<f64> = lines
            .near(value, self.snapping_distance)
            .iter()
            .map(|l| value - l.coordinate)
            .collect();
        min_abs(&offsets)
    }

    fn offset_for_offset_lines(&self, lines: &LineMap, value: f64, axis: Axis, rect: Rect) -> f64 {
        let offsets: Vec<f64> = lines
            .near(value, self.snapping_distance)
            .iter()
            .filter(|l| overlaps_across(axis, l.rect, rect))
            .map(|l| value - l.coordinate)
            .collect();
        min_abs(&offsets)
    }

    /// Horizontal correction for a moving rect: left, right and center
    /// lines plus offset lines of overlapping neighbours.
    pub fn snapped_vertical_offset(&self, rect: Rect) -> f64 {
        let i = &self.index;
        let center = rect.center().x;
        min_abs(&[
            self.offset_for_lines(i.lines(AnchorLineKind::Left), rect.x0),
            self.offset_for_lines(i.lines(AnchorLineKind::Right), rect.x1),
            self.offset_for_lines(i.lines(AnchorLineKind::HorizontalCenter), center),
            self.offset_for_offset_lines(
                i.offset_lines(AnchorLineKind::Right),
                rect.x0,
                Axis::X,
                rect,
            ),
            self.offset_for_offset_lines(
                i.offset_lines(AnchorLineKind::Left),
                rect.x1,
                Axis::X,
                rect,
            ),
        ])
    }

    /// Vertical correction for a moving rect.
    pub fn snapped_horizontal_offset(&self, rect: Rect) -> f64 {
        let i = &self.index;
        let center = rect.center().y;
        min_abs(&[
            self.offset_for_lines(i.lines(AnchorLineKind::Top), rect.y0),
            self.offset_for_lines(i.lines(AnchorLineKind::Bottom), rect.y1),
            self.offset_for_lines(i.lines(AnchorLineKind::VerticalCenter), center),
            self.offset_for_offset_lines(
                i.offset_lines(AnchorLineKind::Bottom),
                rect.y0,
                Axis::Y,
                rect,
            ),
            self.offset_for_offset_lines(
                i.offset_lines(AnchorLineKind::Top),
                rect.y1,
                Axis::Y,
                rect,
            ),
        ])
    }

    /// Correction for one dragged edge: same-named lines plus the offset
    /// lines of the neighbours' facing edges.
    fn snap_edge_offset(&self, edge: AnchorLineKind, rect: Rect) -> f64 {
        let value = edge.coordinate_in(rect);
        min_abs(&[
            self.offset_for_lines(self.index.lines(edge), value),
            self.offset_for_offset_lines(
                self.index.offset_lines(edge.opposite()),
                value,
                edge.axis(),
                rect,
            ),
        ])
    }

    pub fn snap_top_offset(&self, rect: Rect) -> f64 {
        self.snap_edge_offset(AnchorLineKind::Top, rect)
    }

    pub fn snap_bottom_offset(&self, rect: Rect) -> f64 {
        self.snap_edge_offset(AnchorLineKind::Bottom, rect)
    }

    pub fn snap_left_offset(&self, rect: Rect) -> f64 {
        self.snap_edge_offset(AnchorLineKind::Left, rect)
    }

    pub fn snap_right_offset(&self, rect: Rect) -> f64 {
        self.snap_edge_offset(AnchorLineKind::Right, rect)
    }

    // ── guides ──

    /// Guide segments (constant y) for rect edges lying on top, bottom,
    /// vertical-center or offset lines. One merged segment per coordinate.
    pub fn horizontal_snapped_lines(&self, rect: Rect) -> Vec<Line> {
        let i = &self.index;
        let mut found = Vec::new();
        collect_matches(i.lines(AnchorLineKind::Top), rect.y0, None, rect, &mut found);
        collect_matches(i.lines(AnchorLineKind::Bottom), rect.y1, None, rect, &mut found);
        collect_matches(
            i.lines(AnchorLineKind::VerticalCenter),
            rect.center().y,
            None,
            rect,
            &mut found,
        );
        collect_matches(i.offset_lines(AnchorLineKind::Top), rect.y1, Some(Axis::Y), rect, &mut found);
        collect_matches(i.offset_lines(AnchorLineKind::Bottom), rect.y0, Some(Axis::Y), rect, &mut found);
        merge_guides(found, rect, Axis::Y)
    }

    /// Guide segments (constant x) for left, right, horizontal-center and
    /// offset lines.
    pub fn vertical_snapped_lines(&self, rect: Rect) -> Vec<Line> {
        let i = &self.index;
        let mut found = Vec::new();
        collect_matches(i.lines(AnchorLineKind::Left), rect.x0, None, rect, &mut found);
        collect_matches(i.lines(AnchorLineKind::Right), rect.x1, None, rect, &mut found);
        collect_matches(
            i.lines(AnchorLineKind::HorizontalCenter),
            rect.center().x,
            None,
            rect,
            &mut found,
        );
        collect_matches(i.offset_lines(AnchorLineKind::Left), rect.x1, Some(Axis::X), rect, &mut found);
        collect_matches(i.offset_lines(AnchorLineKind::Right), rect.x0, Some(Axis::X), rect, &mut found);
        merge_guides(found, rect, Axis::X)
    }

    // ── anchor inference ──

    /// After a gesture: anchor each edge of `node` lying on a snap line of
    /// the container. Axes carrying a center anchor are left alone.
    /// Writes go through the model; rejected anchors are logged and skipped.
    pub fn adjust_anchoring_of_item(
        &self,
        model: &mut dyn DesignModel,
        scene: &FormEditorScene,
        node: NodeId,
    ) {
        if !model.is_valid(node) {
            return;
        }
        let Some(rect) = self.rect_in_space(scene, node) else {
            return;
        };
        for axis in [Axis::X, Axis::Y] {
            if model.has_anchor(node, axis.center()) {
                continue;
            }
            let [lead, trail, _] = axis.lines();
            for edge in [lead, trail] {
                let Some((target, margin)) = self.find_anchor(&*model, node, edge, rect) else {
                    continue;
                };
                match model.set_anchor(node, edge, target) {
                    Ok(()) => {
                        log::debug!(
                            "anchored {node}.{} to {}.{} ({margin})",
                            edge.qml_name(),
                            target.node,
                            target.line.qml_name()
                        );
                        model.set_margin(node, edge, margin);
                    }
                    Err(err) => log::warn!("anchor inference skipped: {err}"),
                }
            }
        }
    }

    fn rect_in_space(&self, scene: &FormEditorScene, node: NodeId) -> Option<Rect> {
        let item = scene.item(node)?;
        let space = scene.item(self.transformation_space?)?;
        let to_space = invert(space.scene_transform)?;
        Some(map_rect(to_space * item.scene_transform, item.bounding_rect))
    }

    fn find_anchor(
        &self,
        model: &dyn DesignModel,
        node: NodeId,
        edge: AnchorLineKind,
        rect: Rect,
    ) -> Option<(AnchorTarget, f64)> {
        let value = edge.coordinate_in(rect);
        let parent = model.instance_parent(node);
        let acceptable = |line: &&SnapLine| {
            line.node != node
                && model.can_anchor(node, line.node)
                && !model.check_for_cycle(node, edge, line.node)
        };

        // Lines of the same name: the edge lies on the target's edge.
        let exact: Vec<&SnapLine> = self
            .index
            .lines(edge)
            .near(value, self.anchor_tolerance)
            .iter()
            .filter(acceptable)
            .collect();
        if let Some(line) = pick(&exact, value, parent) {
            let target = AnchorTarget {
                node: line.node,
                line: edge,
            };
            return Some((target, margin_to(edge, value, edge.coordinate_in(line.rect))));
        }

        // Offset lines: the edge sits one spacing away from the facing edge.
        let facing = edge.opposite();
        let spaced: Vec<&SnapLine> = self
            .index
            .offset_lines(facing)
            .near(value, self.anchor_tolerance)
            .iter()
            .filter(|l| overlaps_across(edge.axis(), l.rect, rect))
            .filter(acceptable)
            .collect();
        let line = pick(&spaced, value, parent)?;
        let target = AnchorTarget {
            node: line.node,
            line: facing,
        };
        Some((target, margin_to(edge, value, facing.coordinate_in(line.rect))))
    }
}

/// Margin that keeps `edge` at `value` when anchored to a line at `target`.
pub fn margin_to(edge: AnchorLineKind, value: f64, target: f64) -> f64 {
    if edge.is_trailing() {
        target - value
    } else {
        value - target
    }
}

/// Closest candidate; the instance parent wins whenever it is a candidate.
fn pick<'a>(candidates: &[&'a SnapLine], value: f64, parent: Option<NodeId>) -> Option<&'a SnapLine> {
    if let Some(line) = candidates.iter().find(|l| Some(l.node) == parent) {
        return Some(*line);
    }
    let mut best: Option<&SnapLine> = None;
    for line in candidates {
        let better = best.is_none_or(|b| {
            (line.coordinate - value).abs() < (b.coordinate - value).abs()
        });
        if better {
            best = Some(*line);
        }
    }
    best
}

fn collect_matches(
    lines: &LineMap,
    value: f64,
    overlap: Option<Axis>,
    rect: Rect,
    out: &mut Vec<SnapLine>,
) {
    for line in lines.near(value, ON_LINE) {
        if overlap.is_none_or(|axis| overlaps_across(axis, line.rect, rect)) {
            out.push(*line);
        }
    }
}

/// Merge matches sharing a coordinate into one segment spanning the rect
/// and every owner rect. `axis` is the axis of the line coordinate.
fn merge_guides(mut found: Vec<SnapLine>, rect: Rect, axis: Axis) -> Vec<Line> {
    found.sort_by(|a, b| a.coordinate.total_cmp(&b.coordinate));
    let span = |r: Rect| match axis {
        Axis::X => (r.y0, r.y1),
        Axis::Y => (r.x0, r.x1),
    };
    let mut guides: Vec<(f64, f64, f64)> = Vec::new();
    for line in found {
        let (lo, hi) = span(line.rect);
        if let Some((c, start, end)) = guides.last_mut()
            && (*c - line.coordinate).abs() < ON_LINE
        {
            *start = start.min(lo);
            *end = end.max(hi);
            continue;
        }
        let (r_lo, r_hi) = span(rect);
        guides.push((line.coordinate, lo.min(r_lo), hi.max(r_hi)));
    }
    guides
        .into_iter()
        .map(|(c, start, end)| match axis {
            Axis::X => Line::new(Point::new(c, start), Point::new(c, end)),
            Axis::Y => Line::new(Point::new(start, c), Point::new(end, c)),
        })
        .collect()
}
