//! Drawing-surface abstraction.
//!
//! The scene renderer speaks only in logical coordinates; a surface is responsible for any
//! device-pixel scaling.

use mindcanvas_core::geom::{Point, Rect, point};
use mindcanvas_core::view::Viewport;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo { ctrl: Point, to: Point },
    CubicTo { ctrl1: Point, ctrl2: Point, to: Point },
    /// Elliptical arc in SVG endpoint parameterization.
    ArcTo {
        radii: (f64, f64),
        large_arc: bool,
        sweep: bool,
        to: Point,
    },
    Close,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    commands: Vec<PathCommand>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn move_to(mut self, to: Point) -> Self {
        self.commands.push(PathCommand::MoveTo(to));
        self
    }

    pub fn line_to(mut self, to: Point) -> Self {
        self.commands.push(PathCommand::LineTo(to));
        self
    }

    pub fn quad_to(mut self, ctrl: Point, to: Point) -> Self {
        self.commands.push(PathCommand::QuadTo { ctrl, to });
        self
    }

    pub fn cubic_to(mut self, ctrl1: Point, ctrl2: Point, to: Point) -> Self {
        self.commands.push(PathCommand::CubicTo { ctrl1, ctrl2, to });
        self
    }

    pub fn arc_to(mut self, rx: f64, ry: f64, large_arc: bool, sweep: bool, to: Point) -> Self {
        self.commands.push(PathCommand::ArcTo {
            radii: (rx, ry),
            large_arc,
            sweep,
            to,
        });
        self
    }

    pub fn close(mut self) -> Self {
        self.commands.push(PathCommand::Close);
        self
    }

    pub fn line(from: Point, to: Point) -> Self {
        Self::new().move_to(from).line_to(to)
    }

    pub fn rect(rect: Rect) -> Self {
        Self::new()
            .move_to(rect.min())
            .line_to(point(rect.max_x(), rect.min_y()))
            .line_to(rect.max())
            .line_to(point(rect.min_x(), rect.max_y()))
            .close()
    }

    /// Rectangle with circular corners; the radius is clamped to half the shorter side.
    pub fn rounded_rect(rect: Rect, radius: f64) -> Self {
        let r = radius
            .min(rect.width() / 2.0)
            .min(rect.height() / 2.0)
            .max(0.0);
        let (x0, y0, x1, y1) = (rect.min_x(), rect.min_y(), rect.max_x(), rect.max_y());
        Self::new()
            .move_to(point(x0 + r, y0))
            .line_to(point(x1 - r, y0))
            .arc_to(r, r, false, true, point(x1, y0 + r))
            .line_to(point(x1, y1 - r))
            .arc_to(r, r, false, true, point(x1 - r, y1))
            .line_to(point(x0 + r, y1))
            .arc_to(r, r, false, true, point(x0, y1 - r))
            .line_to(point(x0, y0 + r))
            .arc_to(r, r, false, true, point(x0 + r, y0))
            .close()
    }

    /// Full ellipse drawn as two half arcs.
    pub fn ellipse(center: Point, rx: f64, ry: f64) -> Self {
        let left = point(center.x - rx, center.y);
        let right = point(center.x + rx, center.y);
        Self::new()
            .move_to(left)
            .arc_to(rx, ry, false, true, right)
            .arc_to(rx, ry, false, true, left)
            .close()
    }

    pub fn circle(center: Point, radius: f64) -> Self {
        Self::ellipse(center, radius, radius)
    }

    /// Rhombus whose corners touch the midpoints of a `width × height` box.
    pub fn diamond(center: Point, width: f64, height: f64) -> Self {
        Self::new()
            .move_to(point(center.x, center.y - height / 2.0))
            .line_to(point(center.x + width / 2.0, center.y))
            .line_to(point(center.x, center.y + height / 2.0))
            .line_to(point(center.x - width / 2.0, center.y))
            .close()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
    pub dash: Option<[f64; 2]>,
}

impl Stroke {
    pub fn solid(color: impl Into<String>, width: f64) -> Self {
        Self {
            color: color.into(),
            width,
            dash: None,
        }
    }

    pub fn dashed(color: impl Into<String>, width: f64, dash: [f64; 2]) -> Self {
        Self {
            color: color.into(),
            width,
            dash: Some(dash),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub family: String,
    pub size: f64,
    pub bold: bool,
}

impl Font {
    pub fn new(family: impl Into<String>, size: f64, bold: bool) -> Self {
        Self {
            family: family.into(),
            size,
            bold,
        }
    }
}

/// A 2D drawing target. Text is always centered on its anchor both ways.
pub trait Surface {
    fn viewport(&self) -> Viewport;

    /// Opens a named group. Layers nest; every `begin_layer` needs a matching `end_layer`.
    fn begin_layer(&mut self, name: &str);
    fn end_layer(&mut self);

    fn fill_rect(&mut self, rect: Rect, color: &str);
    fn draw_path(&mut self, path: &Path, fill: Option<&str>, stroke: Option<&Stroke>);
    fn fill_text(&mut self, text: &str, at: Point, font: &Font, color: &str);
}
