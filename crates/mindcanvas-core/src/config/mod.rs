//! JSON-backed canvas configuration.
//!
//! The config is stored as a plain JSON object so hosts can pass partial overrides (for example
//! `{"layout": {"horizontalGap": 240}}`) that are deep-merged over the built-in defaults. Typed
//! settings structs are resolved from it on demand.

use crate::{Error, Result};
use serde_json::{Map, Value, json};

/// Smallest accepted grid spacing at zoom 1.
pub const MIN_GRID_SIZE: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct CanvasConfig(Value);

impl Default for CanvasConfig {
    fn default() -> Self {
        Self(default_canvas_config())
    }
}

/// Built-in defaults. Values mirror the numbers the canvas was tuned with.
pub fn default_canvas_config() -> Value {
    json!({
        "layout": {
            "horizontalGap": 200.0,
            "verticalGap": 100.0
        },
        "zoom": {
            "min": 0.5,
            "max": 2.0,
            "step": 0.1,
            "default": 1.0
        },
        "hitTest": {
            "width": 120.0,
            "height": 40.0
        },
        "interaction": {
            "doubleClickMs": 500
        },
        "node": {
            "fontSize": 14.0,
            "padding": 20.0,
            "minWidth": 100.0,
            "height": 40.0,
            "cornerRadius": 10.0
        },
        "grid": {
            "size": 20.0
        },
        "export": {
            "fileStem": "思维导图"
        }
    })
}

impl CanvasConfig {
    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Defaults with `overrides` deep-merged on top.
    pub fn with_overrides(overrides: &Value) -> Self {
        let mut cfg = Self::default();
        cfg.deep_merge(overrides);
        cfg
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let overrides: Value = serde_json::from_str(text)?;
        let cfg = Self::with_overrides(&overrides);
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    fn lookup(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        self.lookup(dotted_path)?.as_f64()
    }

    pub fn get_u64(&self, dotted_path: &str) -> Option<u64> {
        self.lookup(dotted_path)?.as_u64()
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.lookup(dotted_path)?.as_str()
    }

    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }

        let Value::Object(ref mut root) = self.0 else {
            return;
        };
        let mut cur: &mut Map<String, Value> = root;
        let mut segments = dotted_path.split('.').peekable();
        while let Some(seg) = segments.next() {
            if segments.peek().is_none() {
                cur.insert(seg.to_string(), value);
                return;
            }
            let slot = cur.entry(seg).or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Some(next) = slot.as_object_mut() else {
                return;
            };
            cur = next;
        }
    }

    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }

    /// Rejects values the canvas cannot work with (non-positive sizes, inverted zoom range).
    pub fn validate(&self) -> Result<()> {
        for path in [
            "layout.horizontalGap",
            "layout.verticalGap",
            "zoom.min",
            "zoom.max",
            "zoom.step",
            "hitTest.width",
            "hitTest.height",
            "node.fontSize",
            "node.minWidth",
            "node.height",
            "grid.size",
        ] {
            if let Some(v) = self.lookup(path) {
                let ok = v.as_f64().is_some_and(|n| n.is_finite() && n > 0.0);
                if !ok {
                    return Err(Error::InvalidConfig {
                        path: path.to_string(),
                        message: format!("expected a positive number, got {v}"),
                    });
                }
            }
        }

        if let Some(grid) = self.get_f64("grid.size").filter(|g| *g < MIN_GRID_SIZE) {
            return Err(Error::InvalidConfig {
                path: "grid.size".to_string(),
                message: format!("{grid} is smaller than {MIN_GRID_SIZE}"),
            });
        }

        let view = self.view_settings();
        if view.zoom_min > view.zoom_max {
            return Err(Error::InvalidConfig {
                path: "zoom".to_string(),
                message: format!("min {} is larger than max {}", view.zoom_min, view.zoom_max),
            });
        }
        if !(view.zoom_min..=view.zoom_max).contains(&view.zoom_default) {
            return Err(Error::InvalidConfig {
                path: "zoom.default".to_string(),
                message: format!(
                    "{} is outside [{}, {}]",
                    view.zoom_default, view.zoom_min, view.zoom_max
                ),
            });
        }
        Ok(())
    }

    pub fn layout_settings(&self) -> LayoutSettings {
        let d = LayoutSettings::default();
        LayoutSettings {
            horizontal_gap: self
                .get_f64("layout.horizontalGap")
                .unwrap_or(d.horizontal_gap),
            vertical_gap: self.get_f64("layout.verticalGap").unwrap_or(d.vertical_gap),
        }
    }

    pub fn view_settings(&self) -> ViewSettings {
        let d = ViewSettings::default();
        ViewSettings {
            zoom_min: self.get_f64("zoom.min").unwrap_or(d.zoom_min),
            zoom_max: self.get_f64("zoom.max").unwrap_or(d.zoom_max),
            zoom_step: self.get_f64("zoom.step").unwrap_or(d.zoom_step),
            zoom_default: self.get_f64("zoom.default").unwrap_or(d.zoom_default),
            hit_width: self.get_f64("hitTest.width").unwrap_or(d.hit_width),
            hit_height: self.get_f64("hitTest.height").unwrap_or(d.hit_height),
        }
    }

    pub fn interaction_settings(&self) -> InteractionSettings {
        let d = InteractionSettings::default();
        InteractionSettings {
            double_click_ms: self
                .get_u64("interaction.doubleClickMs")
                .unwrap_or(d.double_click_ms),
        }
    }

    pub fn node_metrics(&self) -> NodeMetrics {
        let d = NodeMetrics::default();
        NodeMetrics {
            font_size: self.get_f64("node.fontSize").unwrap_or(d.font_size),
            padding: self.get_f64("node.padding").unwrap_or(d.padding),
            min_width: self.get_f64("node.minWidth").unwrap_or(d.min_width),
            height: self.get_f64("node.height").unwrap_or(d.height),
            corner_radius: self.get_f64("node.cornerRadius").unwrap_or(d.corner_radius),
            grid_size: self.get_f64("grid.size").unwrap_or(d.grid_size),
        }
    }

    pub fn export_file_stem(&self) -> &str {
        self.get_str("export.fileStem").unwrap_or("思维导图")
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSettings {
    pub horizontal_gap: f64,
    pub vertical_gap: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            horizontal_gap: 200.0,
            vertical_gap: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSettings {
    pub zoom_min: f64,
    pub zoom_max: f64,
    pub zoom_step: f64,
    pub zoom_default: f64,
    /// Hit-test box size at zoom 1. Deliberately independent of the drawn label width.
    pub hit_width: f64,
    pub hit_height: f64,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            zoom_min: 0.5,
            zoom_max: 2.0,
            zoom_step: 0.1,
            zoom_default: 1.0,
            hit_width: 120.0,
            hit_height: 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionSettings {
    pub double_click_ms: u64,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            double_click_ms: 500,
        }
    }
}

/// Node box metrics at zoom 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeMetrics {
    pub font_size: f64,
    pub padding: f64,
    pub min_width: f64,
    pub height: f64,
    pub corner_radius: f64,
    pub grid_size: f64,
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            padding: 20.0,
            min_width: 100.0,
            height: 40.0,
            corner_radius: 10.0,
            grid_size: 20.0,
        }
    }
}
