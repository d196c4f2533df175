pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Vector = euclid::Vector2D<f64, Unit>;
pub type Size = euclid::Size2D<f64, Unit>;
pub type Rect = euclid::Rect<f64, Unit>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

pub fn vector(x: f64, y: f64) -> Vector {
    euclid::vec2(x, y)
}

/// Axis-aligned rectangle centered on `center`.
pub fn centered_rect(center: Point, width: f64, height: f64) -> Rect {
    Rect::new(
        point(center.x - width / 2.0, center.y - height / 2.0),
        Size::new(width, height),
    )
}
