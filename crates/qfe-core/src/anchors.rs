//! QML anchor lines and per-node anchor storage.

use crate::geometry::Rect;
use crate::id::NodeId;
use serde::{Deserialize, Serialize};

/// One of the six named reference lines of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnchorLineKind {
    Top,
    Bottom,
    Left,
    Right,
    HorizontalCenter,
    VerticalCenter,
}

/// The coordinate an anchor line constrains.
///
/// `Left`, `Right` and `HorizontalCenter` are vertical lines positioned on
/// the x axis; `Top`, `Bottom` and `VerticalCenter` live on the y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn lines(self) -> [AnchorLineKind; 3] {
        match self {
            Axis::X => [
                AnchorLineKind::Left,
                AnchorLineKind::Right,
                AnchorLineKind::HorizontalCenter,
            ],
            Axis::Y => [
                AnchorLineKind::Top,
                AnchorLineKind::Bottom,
                AnchorLineKind::VerticalCenter,
            ],
        }
    }

    pub fn center(self) -> AnchorLineKind {
        match self {
            Axis::X => AnchorLineKind::HorizontalCenter,
            Axis::Y => AnchorLineKind::VerticalCenter,
        }
    }
}

impl AnchorLineKind {
    pub const ALL: [AnchorLineKind; 6] = [
        AnchorLineKind::Top,
        AnchorLineKind::Bottom,
        AnchorLineKind::Left,
        AnchorLineKind::Right,
        AnchorLineKind::HorizontalCenter,
        AnchorLineKind::VerticalCenter,
    ];

    pub const EDGES: [AnchorLineKind; 4] = [
        AnchorLineKind::Top,
        AnchorLineKind::Bottom,
        AnchorLineKind::Left,
        AnchorLineKind::Right,
    ];

    fn index(self) -> usize {
        match self {
            AnchorLineKind::Top => 0,
            AnchorLineKind::Bottom => 1,
            AnchorLineKind::Left => 2,
            AnchorLineKind::Right => 3,
            AnchorLineKind::HorizontalCenter => 4,
            AnchorLineKind::VerticalCenter => 5,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            AnchorLineKind::Left | AnchorLineKind::Right | AnchorLineKind::HorizontalCenter => {
                Axis::X
            }
            AnchorLineKind::Top | AnchorLineKind::Bottom | AnchorLineKind::VerticalCenter => {
                Axis::Y
            }
        }
    }

    /// Top and left: a positive margin moves the item towards +x/+y.
    pub fn is_leading(self) -> bool {
        matches!(self, AnchorLineKind::Top | AnchorLineKind::Left)
    }

    /// Bottom and right: a positive margin moves the item towards -x/-y.
    pub fn is_trailing(self) -> bool {
        matches!(self, AnchorLineKind::Bottom | AnchorLineKind::Right)
    }

    pub fn is_center(self) -> bool {
        matches!(
            self,
            AnchorLineKind::HorizontalCenter | AnchorLineKind::VerticalCenter
        )
    }

    pub fn opposite(self) -> AnchorLineKind {
        match self {
            AnchorLineKind::Top => AnchorLineKind::Bottom,
            AnchorLineKind::Bottom => AnchorLineKind::Top,
            AnchorLineKind::Left => AnchorLineKind::Right,
            AnchorLineKind::Right => AnchorLineKind::Left,
            center => center,
        }
    }

    /// Position of this line on `rect`.
    pub fn coordinate_in(self, rect: Rect) -> f64 {
        match self {
            AnchorLineKind::Top => rect.y0,
            AnchorLineKind::Bottom => rect.y1,
            AnchorLineKind::Left => rect.x0,
            AnchorLineKind::Right => rect.x1,
            AnchorLineKind::HorizontalCenter => (rect.x0 + rect.x1) / 2.0,
            AnchorLineKind::VerticalCenter => (rect.y0 + rect.y1) / 2.0,
        }
    }

    /// The QML name of the line, as used in `anchors.<line>`.
    pub fn qml_name(self) -> &'static str {
        match self {
            AnchorLineKind::Top => "top",
            AnchorLineKind::Bottom => "bottom",
            AnchorLineKind::Left => "left",
            AnchorLineKind::Right => "right",
            AnchorLineKind::HorizontalCenter => "horizontalCenter",
            AnchorLineKind::VerticalCenter => "verticalCenter",
        }
    }

    /// The QML property holding this line's margin.
    pub fn margin_property(self) -> &'static str {
        match self {
            AnchorLineKind::Top => "anchors.topMargin",
            AnchorLineKind::Bottom => "anchors.bottomMargin",
            AnchorLineKind::Left => "anchors.leftMargin",
            AnchorLineKind::Right => "anchors.rightMargin",
            AnchorLineKind::HorizontalCenter => "anchors.horizontalCenterOffset",
            AnchorLineKind::VerticalCenter => "anchors.verticalCenterOffset",
        }
    }
}

/// The far end of an anchor: `target.line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnchorTarget {
    pub node: NodeId,
    pub line: AnchorLineKind,
}

/// All anchors and margins of one node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeAnchors {
    lines: [Option<AnchorTarget>; 6],
    margins: [Option<f64>; 6],
}

impl NodeAnchors {
    pub fn get(&self, line: AnchorLineKind) -> Option<AnchorTarget> {
        self.lines[line.index()]
    }

    pub fn has(&self, line: AnchorLineKind) -> bool {
        self.lines[line.index()].is_some()
    }

    pub fn set(&mut self, line: AnchorLineKind, target: AnchorTarget) {
        self.lines[line.index()] = Some(target);
    }

    pub fn remove(&mut self, line: AnchorLineKind) -> Option<AnchorTarget> {
        self.lines[line.index()].take()
    }

    pub fn margin(&self, line: AnchorLineKind) -> f64 {
        self.margins[line.index()].unwrap_or(0.0)
    }

    pub fn has_margin(&self, line: AnchorLineKind) -> bool {
        self.margins[line.index()].is_some()
    }

    pub fn set_margin(&mut self, line: AnchorLineKind, value: f64) {
        self.margins[line.index()] = Some(value);
    }

    pub fn remove_margin(&mut self, line: AnchorLineKind) {
        self.margins[line.index()] = None;
    }

    pub fn has_anchors(&self) -> bool {
        self.lines.iter().any(Option::is_some)
    }

    pub fn has_anchor_on_axis(&self, axis: Axis) -> bool {
        axis.lines().iter().any(|l| self.has(*l))
    }

    /// Anchored lines with their targets, in `AnchorLineKind::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = (AnchorLineKind, AnchorTarget)> + '_ {
        AnchorLineKind::ALL
            .into_iter()
            .filter_map(|line| self.get(line).map(|t| (line, t)))
    }

    /// Remove every anchor pointing at `node`. Returns true if any was removed.
    pub fn remove_targeting(&mut self, node: NodeId) -> bool {
        let mut removed = false;
        for line in AnchorLineKind::ALL {
            if self.get(line).is_some_and(|t| t.node == node) {
                self.lines[line.index()] = None;
                self.margins[line.index()] = None;
                removed = true;
            }
        }
        removed
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_axes_and_sides() {
        assert_eq!(AnchorLineKind::Left.axis(), Axis::X);
        assert_eq!(AnchorLineKind::VerticalCenter.axis(), Axis::Y);
        assert!(AnchorLineKind::Top.is_leading());
        assert!(AnchorLineKind::Right.is_trailing());
        assert_eq!(AnchorLineKind::Bottom.opposite(), AnchorLineKind::Top);
        assert_eq!(
            AnchorLineKind::HorizontalCenter.opposite(),
            AnchorLineKind::HorizontalCenter
        );
    }

    #[test]
    fn coordinates_on_rect() {
        let r = Rect::new(10.0, 20.0, 50.0, 100.0);
        assert_eq!(AnchorLineKind::Left.coordinate_in(r), 10.0);
        assert_eq!(AnchorLineKind::Bottom.coordinate_in(r), 100.0);
        assert_eq!(AnchorLineKind::HorizontalCenter.coordinate_in(r), 30.0);
        assert_eq!(AnchorLineKind::VerticalCenter.coordinate_in(r), 60.0);
    }

    #[test]
    fn removing_targets_drops_margins_too() {
        let parent = NodeId::intern("anchors_parent");
        let sibling = NodeId::intern("anchors_sibling");
        let mut anchors = NodeAnchors::default();
        anchors.set(
            AnchorLineKind::Top,
            AnchorTarget { node: parent, line: AnchorLineKind::Top },
        );
        anchors.set_margin(AnchorLineKind::Top, 12.0);
        anchors.set(
            AnchorLineKind::Left,
            AnchorTarget { node: sibling, line: AnchorLineKind::Right },
        );

        assert!(anchors.remove_targeting(parent));
        assert!(!anchors.has(AnchorLineKind::Top));
        assert!(!anchors.has_margin(AnchorLineKind::Top));
        assert!(anchors.has_anchor_on_axis(Axis::X));
        assert!(!anchors.has_anchor_on_axis(Axis::Y));
    }
}
