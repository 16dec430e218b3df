//! Per-container index of candidate snap lines.
//!
//! Built from the container's own rect (raw and inset by its padding) and
//! from every child item not being manipulated. All rects are expressed in
//! a caller-chosen transformation space. Offset lines sit one item spacing
//! outside each child edge and let items line up at a regular gap.
//!
//! The index is rebuilt in full on demand; it is never patched.

use crate::scene::{FormEditorItem, FormEditorScene, invert};
use qfe_core::geometry::map_rect;
use qfe_core::{AnchorLineKind, NodeId, Rect};

/// One candidate line: its coordinate plus the owning item and that item's
/// rect in transformation space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapLine {
    pub coordinate: f64,
    pub rect: Rect,
    pub node: NodeId,
}

/// Lines ordered by coordinate. Equal coordinates keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct LineMap {
    lines: Vec<SnapLine>,
}

impl LineMap {
    pub fn insert(&mut self, line: SnapLine) {
        let at = self.lines.partition_point(|l| l.coordinate <= line.coordinate);
        self.lines.insert(at, line);
    }

    pub fn iter(&self) -> impl Iterator<Item = &SnapLine> {
        self.lines.iter()
    }

    /// Lines whose coordinate lies in `[value - distance, value + distance]`.
    pub fn near(&self, value: f64, distance: f64) -> &[SnapLine] {
        let start = self
            .lines
            .partition_point(|l| l.coordinate < value - distance);
        let end = self
            .lines
            .partition_point(|l| l.coordinate <= value + distance);
        &self.lines[start..end.max(start)]
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

fn line_slot(kind: AnchorLineKind) -> usize {
    match kind {
        AnchorLineKind::Top => 0,
        AnchorLineKind::Bottom => 1,
        AnchorLineKind::Left => 2,
        AnchorLineKind::Right => 3,
        AnchorLineKind::HorizontalCenter => 4,
        AnchorLineKind::VerticalCenter => 5,
    }
}

#[derive(Debug, Clone, Default)]
pub struct SnapLineIndex {
    lines: [LineMap; 6],
    /// Top, bottom, left and right offset lines (same slots as `lines`).
    offsets: [LineMap; 4],
    empty: LineMap,
}

impl SnapLineIndex {
    pub fn lines(&self, kind: AnchorLineKind) -> &LineMap {
        &self.lines[line_slot(kind)]
    }

    /// Offset lines of the owners' `edge`. Centers have none.
    pub fn offset_lines(&self, edge: AnchorLineKind) -> &LineMap {
        if edge.is_center() {
            &self.empty
        } else {
            &self.offsets[line_slot(edge)]
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(LineMap::is_empty)
    }

    pub fn clear(&mut self) {
        for map in self.lines.iter_mut().chain(self.offsets.iter_mut()) {
            map.clear();
        }
    }

    /// Rebuild from `container` and its child items.
    ///
    /// `padding` insets the container's inner lines unless the container
    /// reports its own content rect (e.g. a padded pane), which then wins.
    pub fn update(
        &mut self,
        scene: &FormEditorScene,
        container: NodeId,
        transformation_space: NodeId,
        exceptions: &[NodeId],
        spacing: f64,
        padding: f64,
    ) {
        self.clear();
        let (Some(container_item), Some(space)) =
            (scene.item(container), scene.item(transformation_space))
        else {
            return;
        };
        let Some(to_space) = invert(space.scene_transform) else {
            return;
        };
        let in_space = |item: &FormEditorItem, rect: Rect| {
            map_rect(to_space * item.scene_transform, rect)
        };

        let outer = in_space(container_item, container_item.bounding_rect);
        self.add_lines(outer, container);
        let inner_local = if container_item.content_rect != container_item.bounding_rect
            && container_item.content_rect.area() > 0.0
        {
            container_item.content_rect
        } else {
            container_item.bounding_rect.inset(-padding)
        };
        // The inner lines keep the outer rect so inferred anchors target
        // the container's real edges with the padding as margin.
        let inner = in_space(container_item, inner_local);
        self.add_lines_with_rect(inner, outer, container);

        for child in &container_item.children {
            if exceptions.contains(child) {
                continue;
            }
            let Some(child_item) = scene.item(*child) else {
                continue;
            };
            let rect = in_space(child_item, child_item.bounding_rect);
            self.add_lines(rect, *child);
            self.add_offsets(rect, *child, spacing);
        }
        log::trace!(
            "snap lines for {container}: {} top, {} left",
            self.lines(AnchorLineKind::Top).len(),
            self.lines(AnchorLineKind::Left).len()
        );
    }

    fn add_lines(&mut self, rect: Rect, node: NodeId) {
        self.add_lines_with_rect(rect, rect, node);
    }

    fn add_lines_with_rect(&mut self, lines_of: Rect, rect: Rect, node: NodeId) {
        for kind in AnchorLineKind::ALL {
            self.lines[line_slot(kind)].insert(SnapLine {
                coordinate: kind.coordinate_in(lines_of),
                rect,
                node,
            });
        }
    }

    fn add_offsets(&mut self, rect: Rect, node: NodeId, spacing: f64) {
        let offsets = [
            (AnchorLineKind::Top, rect.y0 - spacing),
            (AnchorLineKind::Bottom, rect.y1 + spacing),
            (AnchorLineKind::Left, rect.x0 - spacing),
            (AnchorLineKind::Right, rect.x1 + spacing),
        ];
        for (edge, coordinate) in offsets {
            self.offsets[line_slot(edge)].insert(SnapLine {
                coordinate,
                rect,
                node,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use qfe_core::model::ModelNode;
    use qfe_core::{DesignModel, SceneModel};

    fn scene() -> (FormEditorScene, NodeId, NodeId, NodeId) {
        let mut model = SceneModel::new("lines_root", "Item", 200.0, 100.0);
        let root = model.root();
        let a = model
            .add_node(
                root,
                ModelNode::new(NodeId::intern("lines_a"), "Rectangle")
                    .with_geometry(0.0, 0.0, 50.0, 50.0),
            )
            .unwrap();
        let b = model
            .add_node(
                root,
                ModelNode::new(NodeId::intern("lines_b"), "Rectangle")
                    .with_geometry(60.0, 10.0, 50.0, 50.0),
            )
            .unwrap();
        let mut scene = FormEditorScene::new(&EditorConfig::default());
        scene.sync_from_model(&model);
        (scene, root, a, b)
    }

    #[test]
    fn line_map_keeps_order_and_finds_neighbours() {
        let node = NodeId::intern("lines_map");
        let mut map = LineMap::default();
        for c in [30.0, 10.0, 20.0, 10.0] {
            map.insert(SnapLine {
                coordinate: c,
                rect: Rect::ZERO,
                node,
            });
        }
        let coords: Vec<f64> = map.iter().map(|l| l.coordinate).collect();
        assert_eq!(coords, vec![10.0, 10.0, 20.0, 30.0]);
        assert_eq!(map.near(15.0, 5.0).len(), 3);
        assert!(map.near(50.0, 5.0).is_empty());
    }

    #[test]
    fn container_contributes_raw_and_padded_lines() {
        let (scene, root, a, b) = scene();
        let mut index = SnapLineIndex::default();
        index.update(&scene, root, root, &[a, b], 10.0, 8.0);

        let lefts: Vec<f64> = index
            .lines(AnchorLineKind::Left)
            .iter()
            .map(|l| l.coordinate)
            .collect();
        assert_eq!(lefts, vec![0.0, 8.0]);
        let padded = index.lines(AnchorLineKind::Right).iter().next().unwrap();
        assert_eq!(padded.coordinate, 192.0);
        assert_eq!(padded.rect, Rect::new(0.0, 0.0, 200.0, 100.0));
        assert!(index.offset_lines(AnchorLineKind::Left).is_empty());
    }

    #[test]
    fn children_contribute_offset_lines() {
        let (scene, root, a, b) = scene();
        let mut index = SnapLineIndex::default();
        index.update(&scene, root, root, &[a], 10.0, 8.0);

        let left_offsets: Vec<_> = index.offset_lines(AnchorLineKind::Left).iter().collect();
        assert_eq!(left_offsets.len(), 1);
        assert_eq!(left_offsets[0].coordinate, 50.0);
        assert_eq!(left_offsets[0].node, b);
        assert_eq!(
            index
                .offset_lines(AnchorLineKind::Bottom)
                .iter()
                .next()
                .map(|l| l.coordinate),
            Some(70.0)
        );
    }
}
