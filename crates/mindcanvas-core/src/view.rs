//! Pan/zoom transform and hit testing.

use crate::config::ViewSettings;
use crate::geom::{Point, Size, Vector, centered_rect, point, vector};
use crate::layout::Positions;
use crate::model::MindMap;

/// Logical size of the drawing surface plus the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            pixel_ratio,
        }
    }

    pub fn center(&self) -> Point {
        point(self.width / 2.0, self.height / 2.0)
    }

    pub fn logical_size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Backing store size in device pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let scale = |v: f64| (v * self.pixel_ratio).round().max(0.0) as u32;
        (scale(self.width), scale(self.height))
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0 && self.pixel_ratio > 0.0)
    }
}

/// Zoom and pan offset. The offset is in layout units and is applied before zooming.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub zoom: f64,
    pub offset: Vector,
    settings: ViewSettings,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(ViewSettings::default())
    }
}

impl ViewState {
    pub fn new(settings: ViewSettings) -> Self {
        Self {
            zoom: settings.zoom_default,
            offset: vector(0.0, 0.0),
            settings,
        }
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.set_zoom(self.zoom + self.settings.zoom_step)
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.set_zoom(self.zoom - self.settings.zoom_step)
    }

    /// Sets the zoom factor clamped to the configured range and returns the applied value.
    ///
    /// An inverted range resolves to `zoom_max`; a NaN request keeps the current zoom.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        if !zoom.is_nan() {
            self.zoom = zoom.max(self.settings.zoom_min).min(self.settings.zoom_max);
        }
        self.zoom
    }

    /// Back to the configured default zoom with no pan.
    pub fn reset(&mut self) {
        self.zoom = self.settings.zoom_default;
        self.offset = vector(0.0, 0.0);
    }

    pub fn pan_to(&mut self, offset: Vector) {
        self.offset = offset;
    }

    pub fn to_screen(&self, viewport: &Viewport, layout: Point) -> Point {
        viewport.center() + (layout.to_vector() + self.offset) * self.zoom
    }

    pub fn to_layout(&self, viewport: &Viewport, screen: Point) -> Point {
        ((screen - viewport.center()) / self.zoom - self.offset).to_point()
    }
}

/// Returns the first node, in collection order, whose hit box contains `screen`.
///
/// The box is a fixed `hit_width × hit_height` scaled by zoom, independent of the drawn label
/// width. Edges are inclusive.
pub fn hit_test(
    map: &MindMap,
    positions: &Positions,
    view: &ViewState,
    viewport: &Viewport,
    screen: Point,
) -> Option<String> {
    let w = view.settings.hit_width * view.zoom;
    let h = view.settings.hit_height * view.zoom;
    map.iter()
        .filter_map(|node| positions.get(&node.id).map(|p| (node, *p)))
        .find(|(_, layout)| {
            let rect = centered_rect(view.to_screen(viewport, *layout), w, h);
            screen.x >= rect.min_x()
                && screen.x <= rect.max_x()
                && screen.y >= rect.min_y()
                && screen.y <= rect.max_y()
        })
        .map(|(node, _)| node.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutSettings;
    use crate::layout::{LayoutMode, compute_positions};
    use crate::seed::demo_strategy_map;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0, 2.0)
    }

    #[test]
    fn zoom_is_clamped_to_range() {
        let mut view = ViewState::default();
        for _ in 0..30 {
            view.zoom_in();
        }
        assert_eq!(view.zoom, 2.0);
        for _ in 0..30 {
            view.zoom_out();
        }
        assert_eq!(view.zoom, 0.5);
        view.offset = vector(10.0, -4.0);
        view.reset();
        assert_eq!(view.zoom, 1.0);
        assert_eq!(view.offset, vector(0.0, 0.0));
    }

    #[test]
    fn reset_returns_to_the_configured_default() {
        let mut view = ViewState::new(ViewSettings {
            zoom_min: 1.5,
            zoom_max: 3.0,
            zoom_default: 2.0,
            ..ViewSettings::default()
        });
        view.set_zoom(3.0);
        view.offset = vector(4.0, 4.0);
        view.reset();
        assert_eq!(view.zoom, 2.0);
        assert_eq!(view.offset, vector(0.0, 0.0));
        assert_eq!(view.set_zoom(0.1), 1.5);
    }

    #[test]
    fn inverted_range_does_not_panic() {
        let mut view = ViewState::new(ViewSettings {
            zoom_min: 3.0,
            zoom_max: 2.0,
            zoom_default: 3.0,
            ..ViewSettings::default()
        });
        assert_eq!(view.zoom_in(), 2.0);
        assert_eq!(view.set_zoom(f64::NAN), 2.0);
    }

    #[test]
    fn screen_transform_applies_offset_before_zoom() {
        let mut view = ViewState::default();
        view.set_zoom(2.0);
        view.offset = vector(10.0, 5.0);
        let s = view.to_screen(&viewport(), point(100.0, -50.0));
        assert_eq!(s, point(400.0 + 220.0, 300.0 - 90.0));
        assert_eq!(view.to_layout(&viewport(), s), point(100.0, -50.0));
    }

    #[test]
    fn pixel_size_scales_by_ratio() {
        assert_eq!(viewport().pixel_size(), (1600, 1200));
        assert!(Viewport::new(0.0, 10.0, 1.0).is_empty());
    }

    #[test]
    fn hit_test_uses_fixed_box_with_inclusive_edges() {
        let map = demo_strategy_map();
        let positions = compute_positions(&map, LayoutMode::MindMap, &LayoutSettings::default());
        let view = ViewState::default();
        let vp = viewport();
        assert_eq!(
            hit_test(&map, &positions, &view, &vp, point(400.0, 300.0)).as_deref(),
            Some("root")
        );
        assert_eq!(
            hit_test(&map, &positions, &view, &vp, point(460.0, 320.0)).as_deref(),
            Some("root")
        );
        assert_eq!(hit_test(&map, &positions, &view, &vp, point(461.0, 300.0)), None);
        // func sits at layout (200, -200).
        assert_eq!(
            hit_test(&map, &positions, &view, &vp, point(600.0, 100.0)).as_deref(),
            Some("func")
        );
    }

    #[test]
    fn hit_test_skips_hidden_nodes() {
        let map = demo_strategy_map().toggle_collapsed("func").unwrap();
        let positions = compute_positions(&map, LayoutMode::MindMap, &LayoutSettings::default());
        let view = ViewState::default();
        // login would sit at layout (400, -300).
        assert_eq!(
            hit_test(&map, &positions, &view, &viewport(), point(800.0, 0.0)),
            None
        );
    }
}
