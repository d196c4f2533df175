use mindcanvas_core::Priority;

/// Canvas colours. Node fill/text/border come from each node's own style.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub font_family: String,
    pub background: String,
    pub grid: String,
    pub connector: String,
    pub connector_emphasis: String,
    pub node_emphasis_fill: String,
    pub node_emphasis_border: String,
    pub selected_outline: String,
    pub hovered_outline: String,
    pub icon_fill: String,
    pub icon_border: String,
    pub icon_glyph: String,
    pub progress_track: String,
    pub progress_fill: String,
    pub progress_complete: String,
    pub priority_high: String,
    pub priority_medium: String,
    pub priority_low: String,
    pub badge_fill: String,
    pub badge_glyph: String,
    pub tooltip_fill: String,
    pub tooltip_border: String,
    pub tooltip_text: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            font_family: "system-ui, sans-serif".to_string(),
            background: "#0f172a".to_string(),
            grid: "#1e293b".to_string(),
            connector: "rgba(99, 179, 237, 0.4)".to_string(),
            connector_emphasis: "rgba(99, 179, 237, 0.8)".to_string(),
            node_emphasis_fill: "rgba(99, 179, 237, 0.8)".to_string(),
            node_emphasis_border: "rgba(124, 58, 237, 0.8)".to_string(),
            selected_outline: "#f00".to_string(),
            hovered_outline: "#00f".to_string(),
            icon_fill: "#fff".to_string(),
            icon_border: "#888".to_string(),
            icon_glyph: "#000".to_string(),
            progress_track: "rgba(0, 0, 0, 0.1)".to_string(),
            progress_fill: "#3b82f6".to_string(),
            progress_complete: "#10b981".to_string(),
            priority_high: "#ef4444".to_string(),
            priority_medium: "#f59e0b".to_string(),
            priority_low: "#10b981".to_string(),
            badge_fill: "#888".to_string(),
            badge_glyph: "#fff".to_string(),
            tooltip_fill: "rgba(15, 23, 42, 0.9)".to_string(),
            tooltip_border: "rgba(99, 179, 237, 0.4)".to_string(),
            tooltip_text: "rgba(255, 255, 255, 0.9)".to_string(),
        }
    }
}

impl Theme {
    pub fn priority_color(&self, priority: Priority) -> &str {
        match priority {
            Priority::High => &self.priority_high,
            Priority::Medium => &self.priority_medium,
            Priority::Low => &self.priority_low,
        }
    }
}
