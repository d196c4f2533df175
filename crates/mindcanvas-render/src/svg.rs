//! SVG implementation of [`Surface`].
//!
//! The document's `width`/`height` are the device-pixel size while the `viewBox` stays in
//! logical units, so rasterizing at the document size yields a density-scaled frame.

use crate::error::{Error, Result};
use crate::surface::{Font, Path, PathCommand, Stroke, Surface};
use mindcanvas_core::geom::{Point, Rect};
use mindcanvas_core::view::Viewport;
use std::fmt::Write as _;

#[derive(Debug, Clone)]
pub struct SvgSurface {
    viewport: Viewport,
    out: String,
    open_layers: usize,
}

impl SvgSurface {
    pub fn new(viewport: Viewport) -> Result<Self> {
        if viewport.is_empty() || !viewport.width.is_finite() || !viewport.height.is_finite() {
            return Err(Error::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
                pixel_ratio: viewport.pixel_ratio,
            });
        }
        let (px_w, px_h) = viewport.pixel_size();
        let mut out = String::with_capacity(16 * 1024);
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{px_w}" height="{px_h}" viewBox="0 0 "#
        );
        fmt_into(&mut out, viewport.width);
        out.push(' ');
        fmt_into(&mut out, viewport.height);
        out.push_str(r#"">"#);
        Ok(Self {
            viewport,
            out,
            open_layers: 0,
        })
    }

    /// Closes any layer left open and returns the finished document.
    pub fn finish(mut self) -> String {
        while self.open_layers > 0 {
            self.end_layer();
        }
        self.out.push_str("</svg>");
        self.out
    }

    fn push_stroke_attrs(&mut self, stroke: &Stroke) {
        self.out.push_str(r#" stroke=""#);
        escape_xml_into(&mut self.out, &stroke.color);
        self.out.push_str(r#"" stroke-width=""#);
        fmt_into(&mut self.out, stroke.width);
        self.out.push('"');
        if let Some([on, off]) = stroke.dash {
            self.out.push_str(r#" stroke-dasharray=""#);
            fmt_into(&mut self.out, on);
            self.out.push(' ');
            fmt_into(&mut self.out, off);
            self.out.push('"');
        }
    }
}

impl Surface for SvgSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn begin_layer(&mut self, name: &str) {
        self.out.push_str(r#"<g class=""#);
        escape_xml_into(&mut self.out, name);
        self.out.push_str(r#"">"#);
        self.open_layers += 1;
    }

    fn end_layer(&mut self) {
        if self.open_layers == 0 {
            return;
        }
        self.out.push_str("</g>");
        self.open_layers -= 1;
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        self.out.push_str(r#"<rect x=""#);
        fmt_into(&mut self.out, rect.min_x());
        self.out.push_str(r#"" y=""#);
        fmt_into(&mut self.out, rect.min_y());
        self.out.push_str(r#"" width=""#);
        fmt_into(&mut self.out, rect.width());
        self.out.push_str(r#"" height=""#);
        fmt_into(&mut self.out, rect.height());
        self.out.push_str(r#"" fill=""#);
        escape_xml_into(&mut self.out, color);
        self.out.push_str(r#""/>"#);
    }

    fn draw_path(&mut self, path: &Path, fill: Option<&str>, stroke: Option<&Stroke>) {
        if path.is_empty() || (fill.is_none() && stroke.is_none()) {
            return;
        }
        self.out.push_str(r#"<path d=""#);
        write_path_data(&mut self.out, path);
        self.out.push_str(r#"" fill=""#);
        escape_xml_into(&mut self.out, fill.unwrap_or("none"));
        self.out.push('"');
        if let Some(stroke) = stroke {
            self.push_stroke_attrs(stroke);
        }
        self.out.push_str("/>");
    }

    fn fill_text(&mut self, text: &str, at: Point, font: &Font, color: &str) {
        self.out.push_str(r#"<text x=""#);
        fmt_into(&mut self.out, at.x);
        self.out.push_str(r#"" y=""#);
        fmt_into(&mut self.out, at.y);
        self.out.push_str(r#"" font-family=""#);
        escape_xml_into(&mut self.out, &font.family);
        self.out.push_str(r#"" font-size=""#);
        fmt_into(&mut self.out, font.size);
        self.out.push('"');
        if font.bold {
            self.out.push_str(r#" font-weight="bold""#);
        }
        self.out.push_str(r#" fill=""#);
        escape_xml_into(&mut self.out, color);
        self.out
            .push_str(r#"" text-anchor="middle" dominant-baseline="central">"#);
        escape_xml_into(&mut self.out, text);
        self.out.push_str("</text>");
    }
}

fn push_point(out: &mut String, p: Point) {
    fmt_path_into(out, p.x);
    out.push(',');
    fmt_path_into(out, p.y);
}

fn write_path_data(out: &mut String, path: &Path) {
    for cmd in path.commands() {
        match *cmd {
            PathCommand::MoveTo(p) => {
                out.push('M');
                push_point(out, p);
            }
            PathCommand::LineTo(p) => {
                out.push('L');
                push_point(out, p);
            }
            PathCommand::QuadTo { ctrl, to } => {
                out.push('Q');
                push_point(out, ctrl);
                out.push(' ');
                push_point(out, to);
            }
            PathCommand::CubicTo { ctrl1, ctrl2, to } => {
                out.push('C');
                push_point(out, ctrl1);
                out.push(' ');
                push_point(out, ctrl2);
                out.push(' ');
                push_point(out, to);
            }
            PathCommand::ArcTo {
                radii: (rx, ry),
                large_arc,
                sweep,
                to,
            } => {
                out.push('A');
                fmt_path_into(out, rx);
                out.push(',');
                fmt_path_into(out, ry);
                out.push_str(" 0 ");
                out.push(if large_arc { '1' } else { '0' });
                out.push(',');
                out.push(if sweep { '1' } else { '0' });
                out.push(' ');
                push_point(out, to);
            }
            PathCommand::Close => out.push('Z'),
        }
    }
}

/// Shortest decimal form, snapping float noise and never emitting `-0`.
pub(crate) fn fmt_into(out: &mut String, v: f64) {
    if !v.is_finite() {
        out.push('0');
        return;
    }
    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let nearest = v.round();
    if (v - nearest).abs() < 1e-6 {
        v = nearest;
    }
    if v == -0.0 {
        v = 0.0;
    }
    let _ = write!(out, "{v}");
}

/// Path coordinates: at most three fractional digits, trailing zeros trimmed.
pub(crate) fn fmt_path_into(out: &mut String, v: f64) {
    if !v.is_finite() || v.abs() < 0.0005 {
        out.push('0');
        return;
    }
    let k = (v * 1000.0).round() as i64;
    if k == 0 {
        out.push('0');
        return;
    }
    let start = out.len();
    let _ = write!(out, "{:.3}", k as f64 / 1000.0);
    while out.len() > start && out.ends_with('0') {
        out.pop();
    }
    if out.ends_with('.') {
        out.pop();
    }
}

pub(crate) fn escape_xml_into(out: &mut String, text: &str) {
    let mut start = 0usize;
    for (i, b) in text.bytes().enumerate() {
        let esc = match b {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            b'\'' => "&#39;",
            _ => continue,
        };
        out.push_str(&text[start..i]);
        out.push_str(esc);
        start = i + 1;
    }
    out.push_str(&text[start..]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindcanvas_core::geom::{centered_rect, point};

    fn fmt_path(v: f64) -> String {
        let mut s = String::new();
        fmt_path_into(&mut s, v);
        s
    }

    #[test]
    fn path_numbers_use_three_decimals() {
        assert_eq!(fmt_path(1.0), "1");
        assert_eq!(fmt_path(-0.0001), "0");
        assert_eq!(fmt_path(12.34567), "12.346");
        assert_eq!(fmt_path(-2.5), "-2.5");
        assert_eq!(fmt_path(f64::NAN), "0");
    }

    #[test]
    fn attribute_numbers_drop_float_noise() {
        let mut s = String::new();
        fmt_into(&mut s, 1.000_000_4);
        s.push(' ');
        fmt_into(&mut s, -0.0);
        assert_eq!(s, "1 0");
    }

    #[test]
    fn document_is_density_scaled() {
        let surface = SvgSurface::new(Viewport::new(400.0, 300.0, 2.0)).unwrap();
        let svg = surface.finish();
        let doc = roxmltree::Document::parse(&svg).unwrap();
        let root = doc.root_element();
        assert_eq!(root.attribute("width"), Some("800"));
        assert_eq!(root.attribute("height"), Some("600"));
        assert_eq!(root.attribute("viewBox"), Some("0 0 400 300"));
    }

    #[test]
    fn empty_viewport_is_rejected() {
        assert!(matches!(
            SvgSurface::new(Viewport::new(0.0, 300.0, 1.0)),
            Err(Error::InvalidViewport { .. })
        ));
    }

    #[test]
    fn text_and_paths_are_escaped_and_well_formed() {
        let mut surface = SvgSurface::new(Viewport::new(100.0, 100.0, 1.0)).unwrap();
        surface.begin_layer("nodes");
        surface.draw_path(
            &Path::rounded_rect(centered_rect(point(50.0, 50.0), 40.0, 20.0), 5.0),
            Some("#fff"),
            Some(&Stroke::dashed("#f00", 3.0, [5.0, 5.0])),
        );
        surface.fill_text(
            "A & B <C>",
            point(50.0, 50.0),
            &Font::new("sans-serif", 14.0, true),
            "#000",
        );
        let svg = surface.finish();
        let doc = roxmltree::Document::parse(&svg).unwrap();
        let text = doc
            .descendants()
            .find(|n| n.has_tag_name("text"))
            .unwrap();
        assert_eq!(text.text(), Some("A & B <C>"));
        assert!(svg.contains("A &amp; B &lt;C&gt;"));
        let path = doc
            .descendants()
            .find(|n| n.has_tag_name("path"))
            .unwrap();
        assert_eq!(path.attribute("stroke-dasharray"), Some("5 5"));
    }
}
