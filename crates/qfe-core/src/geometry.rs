//! Geometry primitives shared by the model and the editor.
//!
//! Plain `kurbo` types in a y-down coordinate system: positive rotation is
//! clockwise, matching QML's `rotation` property.

pub use kurbo::{Affine, Line, Point, Rect, Size, Vec2};

use serde::{Deserialize, Serialize};

/// QML `Item.transformOrigin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransformOrigin {
    TopLeft,
    Top,
    TopRight,
    Left,
    #[default]
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl TransformOrigin {
    /// Parse `"Item.TopLeft"` or `"TopLeft"`.
    pub fn from_qml(name: &str) -> Option<Self> {
        let short = name.strip_prefix("Item.").unwrap_or(name);
        Some(match short {
            "TopLeft" => Self::TopLeft,
            "Top" => Self::Top,
            "TopRight" => Self::TopRight,
            "Left" => Self::Left,
            "Center" => Self::Center,
            "Right" => Self::Right,
            "BottomLeft" => Self::BottomLeft,
            "Bottom" => Self::Bottom,
            "BottomRight" => Self::BottomRight,
            _ => return None,
        })
    }

    pub fn as_qml(self) -> &'static str {
        match self {
            Self::TopLeft => "Item.TopLeft",
            Self::Top => "Item.Top",
            Self::TopRight => "Item.TopRight",
            Self::Left => "Item.Left",
            Self::Center => "Item.Center",
            Self::Right => "Item.Right",
            Self::BottomLeft => "Item.BottomLeft",
            Self::Bottom => "Item.Bottom",
            Self::BottomRight => "Item.BottomRight",
        }
    }

    /// The origin as a point of `rect`.
    pub fn point_in(self, rect: Rect) -> Point {
        let c = rect.center();
        match self {
            Self::TopLeft => Point::new(rect.x0, rect.y0),
            Self::Top => Point::new(c.x, rect.y0),
            Self::TopRight => Point::new(rect.x1, rect.y0),
            Self::Left => Point::new(rect.x0, c.y),
            Self::Center => c,
            Self::Right => Point::new(rect.x1, c.y),
            Self::BottomLeft => Point::new(rect.x0, rect.y1),
            Self::Bottom => Point::new(c.x, rect.y1),
            Self::BottomRight => Point::new(rect.x1, rect.y1),
        }
    }
}

/// Item → parent transform of a QML item: translate to `position`, then
/// rotate and scale around the transform origin.
pub fn item_transform(
    position: Point,
    size: Size,
    rotation_degrees: f64,
    scale: f64,
    origin: TransformOrigin,
) -> Affine {
    let pivot = origin
        .point_in(Rect::from_origin_size(Point::ZERO, size))
        .to_vec2();
    Affine::translate(position.to_vec2())
        * Affine::translate(pivot)
        * Affine::rotate(rotation_degrees.to_radians())
        * Affine::scale(scale)
        * Affine::translate(-pivot)
}

/// Axis-aligned bounding box of `rect` after `transform`.
pub fn map_rect(transform: Affine, rect: Rect) -> Rect {
    transform.transform_rect_bbox(rect)
}

/// Round to a fixed number of decimals (keyboard nudges use 4).
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn fuzzy_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

pub fn fuzzy_point_eq(a: Point, b: Point) -> bool {
    fuzzy_eq(a.x, b.x) && fuzzy_eq(a.y, b.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_origin_points() {
        let r = Rect::new(10.0, 20.0, 110.0, 70.0);
        assert_eq!(TransformOrigin::TopLeft.point_in(r), Point::new(10.0, 20.0));
        assert_eq!(TransformOrigin::Center.point_in(r), Point::new(60.0, 45.0));
        assert_eq!(TransformOrigin::BottomRight.point_in(r), Point::new(110.0, 70.0));
        assert_eq!(TransformOrigin::from_qml("Item.Bottom"), Some(TransformOrigin::Bottom));
        assert_eq!(TransformOrigin::from_qml("Middle"), None);
    }

    #[test]
    fn item_transform_rotates_around_origin() {
        let t = item_transform(
            Point::new(100.0, 100.0),
            Size::new(50.0, 50.0),
            90.0,
            1.0,
            TransformOrigin::TopLeft,
        );
        // Top-left stays, top-right swings down (clockwise in y-down space).
        let tl = t * Point::new(0.0, 0.0);
        let tr = t * Point::new(50.0, 0.0);
        assert!(fuzzy_point_eq(tl, Point::new(100.0, 100.0)));
        assert!((tr.x - 100.0).abs() < 1e-9);
        assert!((tr.y - 150.0).abs() < 1e-9);
    }

    #[test]
    fn rounding_removes_float_noise() {
        assert_eq!(round_to(0.1 + 0.2, 4), 0.3);
        assert_eq!(round_to(-12.345_67, 2), -12.35);
    }
}
