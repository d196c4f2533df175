//! Frame renderer.
//!
//! Layers are emitted in a fixed order: background, grid, connectors, nodes (shapes and
//! labels), decorations, tooltip. Decorations are drawn in their own pass so no node shape can
//! cover another node's markers.

use crate::surface::{Font, Path, Stroke, Surface};
use crate::text::{TextMeasurer, TextStyle};
use crate::theme::Theme;
use mindcanvas_core::config::NodeMetrics;
use mindcanvas_core::geom::{Point, Rect, Size, centered_rect, point};
use mindcanvas_core::layout::{LayoutMode, Positions};
use mindcanvas_core::model::{MindMap, Node, Shape};
use mindcanvas_core::palette;
use mindcanvas_core::view::{ViewState, Viewport};

/// Tooltip text for hovered nodes without notes.
pub const TOOLTIP_PLACEHOLDER: &str = "双击编辑节点";

pub const LAYERS: [&str; 6] = [
    "background",
    "grid",
    "connectors",
    "nodes",
    "decorations",
    "tooltip",
];

const MAX_GRID_LINES: f64 = 8192.0;

/// Everything a frame depends on.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub map: &'a MindMap,
    pub positions: &'a Positions,
    pub mode: LayoutMode,
    pub view: &'a ViewState,
    pub hovered: Option<&'a str>,
    pub selected: Option<&'a str>,
    pub metrics: &'a NodeMetrics,
    pub theme: &'a Theme,
}

impl Scene<'_> {
    fn is_emphasized(&self, id: &str) -> bool {
        self.hovered == Some(id) || self.selected == Some(id)
    }
}

/// On-screen box of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeBox {
    pub center: Point,
    pub width: f64,
    pub height: f64,
}

impl NodeBox {
    pub fn rect(&self) -> Rect {
        centered_rect(self.center, self.width, self.height)
    }
}

/// Sizes a node box from its measured label: `max(min_width, text + 2 * padding)` wide.
pub fn node_box(
    node: &Node,
    center: Point,
    zoom: f64,
    metrics: &NodeMetrics,
    measurer: &dyn TextMeasurer,
) -> NodeBox {
    let text_width = measurer
        .measure(&node.text, &TextStyle::sized(metrics.font_size * zoom))
        .width;
    let padding = metrics.padding * zoom;
    NodeBox {
        center,
        width: (metrics.min_width * zoom).max(text_width + padding * 2.0),
        height: metrics.height * zoom,
    }
}

/// Draws one frame. A missing surface is skipped (logged) and reported as `false`.
pub fn render_scene(
    surface: Option<&mut dyn Surface>,
    scene: &Scene<'_>,
    measurer: &dyn TextMeasurer,
) -> bool {
    let Some(surface) = surface else {
        tracing::warn!("no drawing surface mounted; skipping frame");
        return false;
    };
    let viewport = surface.viewport();

    let boxes: Vec<(&Node, NodeBox)> = scene
        .map
        .iter()
        .filter_map(|node| {
            let layout = scene.positions.get(&node.id)?;
            let center = scene.view.to_screen(&viewport, *layout);
            Some((
                node,
                node_box(node, center, scene.view.zoom, scene.metrics, measurer),
            ))
        })
        .collect();

    surface.begin_layer(LAYERS[0]);
    surface.fill_rect(
        Rect::new(point(0.0, 0.0), viewport.logical_size()),
        &scene.theme.background,
    );
    surface.end_layer();

    surface.begin_layer(LAYERS[1]);
    draw_grid(surface, scene, &viewport);
    surface.end_layer();

    surface.begin_layer(LAYERS[2]);
    draw_connectors(surface, scene, &viewport);
    surface.end_layer();

    surface.begin_layer(LAYERS[3]);
    for (node, b) in &boxes {
        draw_node(surface, scene, node, b);
    }
    surface.end_layer();

    surface.begin_layer(LAYERS[4]);
    for (node, b) in &boxes {
        draw_decorations(surface, scene, node, b);
    }
    surface.end_layer();

    surface.begin_layer(LAYERS[5]);
    if let Some((node, b)) = scene
        .hovered
        .and_then(|id| boxes.iter().find(|(n, _)| n.id == id))
    {
        draw_tooltip(surface, scene, node, b, measurer);
    }
    surface.end_layer();

    tracing::debug!(nodes = boxes.len(), zoom = scene.view.zoom, "rendered frame");
    true
}

fn draw_grid(surface: &mut dyn Surface, scene: &Scene<'_>, viewport: &Viewport) {
    let zoom = scene.view.zoom;
    let spacing = scene.metrics.grid_size * zoom;
    if spacing.is_nan() || spacing <= 0.0 {
        return;
    }
    let lines = (viewport.width + viewport.height) / spacing;
    if lines > MAX_GRID_LINES {
        tracing::warn!(spacing, "grid spacing too small; skipping grid");
        return;
    }
    let stroke = Stroke::solid(scene.theme.grid.as_str(), 1.0);
    let phase_x = (scene.view.offset.x * zoom) % spacing;
    let phase_y = (scene.view.offset.y * zoom) % spacing;

    let mut x = phase_x;
    while x < viewport.width {
        let line = Path::line(point(x, 0.0), point(x, viewport.height));
        surface.draw_path(&line, None, Some(&stroke));
        x += spacing;
    }
    let mut y = phase_y;
    while y < viewport.height {
        let line = Path::line(point(0.0, y), point(viewport.width, y));
        surface.draw_path(&line, None, Some(&stroke));
        y += spacing;
    }
}

fn connector_path(mode: LayoutMode, from: Point, to: Point) -> Path {
    match mode {
        LayoutMode::MindMap => {
            let mid_x = (from.x + to.x) / 2.0;
            Path::new()
                .move_to(from)
                .cubic_to(point(mid_x, from.y), point(mid_x, to.y), to)
        }
        LayoutMode::OrgChart => {
            let mid_y = (from.y + to.y) / 2.0;
            Path::new()
                .move_to(from)
                .line_to(point(from.x, mid_y))
                .line_to(point(to.x, mid_y))
                .line_to(to)
        }
        LayoutMode::Fishbone | LayoutMode::Timeline | LayoutMode::Logic => Path::line(from, to),
    }
}

fn draw_connectors(surface: &mut dyn Surface, scene: &Scene<'_>, viewport: &Viewport) {
    let zoom = scene.view.zoom;
    for node in scene.map.iter() {
        let Some(parent_id) = node.parent_id.as_deref() else {
            continue;
        };
        let Some(parent) = scene.map.get(parent_id) else {
            continue;
        };
        if parent.collapsed {
            continue;
        }
        let (Some(from), Some(to)) = (
            scene.positions.get(parent_id),
            scene.positions.get(&node.id),
        ) else {
            continue;
        };
        let stroke = if scene.is_emphasized(parent_id) || scene.is_emphasized(&node.id) {
            Stroke::solid(scene.theme.connector_emphasis.as_str(), 3.0 * zoom)
        } else {
            Stroke::solid(scene.theme.connector.as_str(), 2.0 * zoom)
        };
        let path = connector_path(
            scene.mode,
            scene.view.to_screen(viewport, *from),
            scene.view.to_screen(viewport, *to),
        );
        surface.draw_path(&path, None, Some(&stroke));
    }
}

fn shape_path(shape: Shape, b: &NodeBox, corner_radius: f64) -> Path {
    match shape {
        Shape::Rectangle => Path::rect(b.rect()),
        Shape::Rounded => Path::rounded_rect(b.rect(), corner_radius),
        Shape::Ellipse => Path::ellipse(b.center, b.width / 2.0, b.height / 2.0),
        Shape::Diamond => Path::diamond(b.center, b.width, b.height),
    }
}

fn outline_path(shape: Shape, b: &NodeBox) -> Path {
    match shape {
        Shape::Rectangle | Shape::Rounded => {
            Path::rect(centered_rect(b.center, b.width + 10.0, b.height + 10.0))
        }
        Shape::Ellipse => Path::ellipse(b.center, b.width / 2.0 + 5.0, b.height / 2.0 + 5.0),
        Shape::Diamond => Path::diamond(b.center, b.width + 20.0, b.height + 20.0),
    }
}

fn draw_node(surface: &mut dyn Surface, scene: &Scene<'_>, node: &Node, b: &NodeBox) {
    let zoom = scene.view.zoom;
    let theme = scene.theme;
    let emphasized = scene.is_emphasized(&node.id);
    let (fill, border, width) = if emphasized {
        (
            theme.node_emphasis_fill.as_str(),
            theme.node_emphasis_border.as_str(),
            3.0 * zoom,
        )
    } else {
        (
            node.style.background_color.as_str(),
            node.style.border_color.as_str(),
            2.0 * zoom,
        )
    };
    let body = shape_path(node.style.shape, b, scene.metrics.corner_radius * zoom);
    surface.draw_path(&body, Some(fill), Some(&Stroke::solid(border, width)));

    if emphasized {
        let color = if scene.selected == Some(node.id.as_str()) {
            theme.selected_outline.as_str()
        } else {
            theme.hovered_outline.as_str()
        };
        let dashed = Stroke::dashed(color, 3.0 * zoom, [5.0, 5.0]);
        surface.draw_path(&outline_path(node.style.shape, b), None, Some(&dashed));
    }

    let font = Font::new(
        theme.font_family.as_str(),
        scene.metrics.font_size * zoom,
        true,
    );
    surface.fill_text(&node.text, b.center, &font, &node.style.text_color);
}

fn draw_decorations(surface: &mut dyn Surface, scene: &Scene<'_>, node: &Node, b: &NodeBox) {
    let zoom = scene.view.zoom;
    let theme = scene.theme;
    let (x, y) = (b.center.x, b.center.y);

    if !node.icons.is_empty() {
        let size = 16.0 * zoom;
        let spacing = 4.0 * zoom;
        let count = node.icons.len() as f64;
        let mut icon_x = x - (count * size + (count - 1.0) * spacing) / 2.0;
        let icon_y = y - b.height / 2.0 - size / 2.0;
        let border = Stroke::solid(theme.icon_border.as_str(), zoom);
        let glyph_font = Font::new(theme.font_family.as_str(), 10.0 * zoom, true);
        for icon in &node.icons {
            let center = point(icon_x + size / 2.0, icon_y);
            surface.draw_path(
                &Path::circle(center, size / 2.0),
                Some(theme.icon_fill.as_str()),
                Some(&border),
            );
            if let Some(glyph) = palette::icon_glyph(icon) {
                surface.fill_text(
                    glyph.encode_utf8(&mut [0u8; 4]),
                    center,
                    &glyph_font,
                    &theme.icon_glyph,
                );
            }
            icon_x += size + spacing;
        }
    }

    if let Some(progress) = node.progress {
        let bar_width = b.width * 0.8;
        let bar_height = 6.0 * zoom;
        let origin = point(x - bar_width / 2.0, y + b.height / 2.0 + 5.0 * zoom);
        surface.fill_rect(
            Rect::new(origin, Size::new(bar_width, bar_height)),
            &theme.progress_track,
        );
        let done = f64::from(progress.min(100)) / 100.0;
        let color = if progress >= 100 {
            &theme.progress_complete
        } else {
            &theme.progress_fill
        };
        surface.fill_rect(
            Rect::new(origin, Size::new(bar_width * done, bar_height)),
            color,
        );
    }

    if let Some(priority) = node.priority {
        let radius = 8.0 * zoom;
        let center = point(x - b.width / 2.0 - radius - 2.0 * zoom, y);
        surface.draw_path(
            &Path::circle(center, radius),
            Some(theme.priority_color(priority)),
            None,
        );
    }

    if node.has_children() {
        let radius = 10.0 * zoom;
        let cx = x + b.width / 2.0 + radius;
        surface.draw_path(
            &Path::circle(point(cx, y), radius),
            Some(theme.badge_fill.as_str()),
            None,
        );
        let glyph = Stroke::solid(theme.badge_glyph.as_str(), 2.0 * zoom);
        let arm = radius / 2.0 - 2.0;
        surface.draw_path(
            &Path::line(point(cx - arm, y), point(cx + arm, y)),
            None,
            Some(&glyph),
        );
        if node.collapsed {
            surface.draw_path(
                &Path::line(point(cx, y - arm), point(cx, y + arm)),
                None,
                Some(&glyph),
            );
        }
    }
}

fn draw_tooltip(
    surface: &mut dyn Surface,
    scene: &Scene<'_>,
    node: &Node,
    b: &NodeBox,
    measurer: &dyn TextMeasurer,
) {
    let zoom = scene.view.zoom;
    let theme = scene.theme;
    let text = node.notes_text().unwrap_or(TOOLTIP_PLACEHOLDER);
    let font_size = 12.0 * zoom;
    let width = measurer.measure(text, &TextStyle::sized(font_size)).width + 20.0 * zoom;
    let height = 30.0 * zoom;
    let (x, y) = (b.center.x, b.center.y);
    let (left, top) = (x - width / 2.0, y - 60.0 * zoom);
    let (right, bottom) = (left + width, top + height);
    let r = 5.0 * zoom;
    let pointer = 10.0 * zoom;

    let bubble = Path::new()
        .move_to(point(left + r, top))
        .line_to(point(right - r, top))
        .quad_to(point(right, top), point(right, top + r))
        .line_to(point(right, bottom - r))
        .quad_to(point(right, bottom), point(right - r, bottom))
        .line_to(point(x + pointer, bottom))
        .line_to(point(x, bottom + pointer))
        .line_to(point(x - pointer, bottom))
        .line_to(point(left + r, bottom))
        .quad_to(point(left, bottom), point(left, bottom - r))
        .line_to(point(left, top + r))
        .quad_to(point(left, top), point(left + r, top))
        .close();
    surface.draw_path(
        &bubble,
        Some(theme.tooltip_fill.as_str()),
        Some(&Stroke::solid(theme.tooltip_border.as_str(), zoom)),
    );
    surface.fill_text(
        text,
        point(x, top + height / 2.0),
        &Font::new(theme.font_family.as_str(), font_size, false),
        &theme.tooltip_text,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::DeterministicTextMeasurer;
    use mindcanvas_core::config::LayoutSettings;
    use mindcanvas_core::layout::compute_positions;
    use mindcanvas_core::seed::demo_strategy_map;

    #[test]
    fn node_box_respects_minimum_width() {
        let map = demo_strategy_map();
        let measurer = DeterministicTextMeasurer::default();
        let metrics = NodeMetrics::default();
        let mut short = map.get("ui").unwrap().clone();
        short.text = "UI".into();
        let b = node_box(&short, point(0.0, 0.0), 1.0, &metrics, &measurer);
        assert_eq!(b.width, 100.0);
        assert_eq!(b.height, 40.0);

        let long = map.get("ui").unwrap();
        // 用户界面测试: 6 wide glyphs = 12 columns * 14 * 0.5 = 84, plus 40 padding.
        let b = node_box(long, point(0.0, 0.0), 1.0, &metrics, &measurer);
        assert_eq!(b.width, 124.0);
    }

    #[test]
    fn degenerate_grid_spacing_draws_no_grid() {
        let map = demo_strategy_map();
        let positions = compute_positions(&map, LayoutMode::MindMap, &LayoutSettings::default());
        let view = ViewState::default();
        let metrics = NodeMetrics {
            grid_size: 1e-9,
            ..NodeMetrics::default()
        };
        let theme = Theme::default();
        let scene = Scene {
            map: &map,
            positions: &positions,
            mode: LayoutMode::MindMap,
            view: &view,
            hovered: None,
            selected: None,
            metrics: &metrics,
            theme: &theme,
        };
        let mut surface =
            crate::svg::SvgSurface::new(Viewport::new(200.0, 100.0, 1.0)).unwrap();
        assert!(render_scene(
            Some(&mut surface),
            &scene,
            &DeterministicTextMeasurer::default()
        ));
        assert!(surface.finish().contains(r#"<g class="grid"></g>"#));
    }

    #[test]
    fn missing_surface_is_a_logged_no_op() {
        let map = demo_strategy_map();
        let positions = compute_positions(&map, LayoutMode::MindMap, &LayoutSettings::default());
        let view = ViewState::default();
        let metrics = NodeMetrics::default();
        let theme = Theme::default();
        let scene = Scene {
            map: &map,
            positions: &positions,
            mode: LayoutMode::MindMap,
            view: &view,
            hovered: None,
            selected: None,
            metrics: &metrics,
            theme: &theme,
        };
        assert!(!render_scene(None, &scene, &DeterministicTextMeasurer::default()));
    }
}
