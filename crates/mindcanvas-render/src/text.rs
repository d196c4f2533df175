use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: f64,
    pub bold: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: 14.0,
            bold: false,
        }
    }
}

impl TextStyle {
    pub fn sized(font_size: f64) -> Self {
        Self {
            font_size,
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;
}

/// Font-free measurer: width is the widest line's display-column count times
/// `font_size * char_width_factor`, so wide (CJK) glyphs count double.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
    /// Extra width factor applied to bold text.
    pub bold_factor: f64,
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let char_width_factor = if self.char_width_factor == 0.0 {
            0.5
        } else {
            self.char_width_factor
        };
        let line_height_factor = if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        };
        let bold_factor = match (style.bold, self.bold_factor) {
            (false, _) => 1.0,
            (true, f) if f == 0.0 => 1.05,
            (true, f) => f,
        };

        let font_size = style.font_size.max(1.0);
        let mut columns = 0usize;
        let mut line_count = 0usize;
        for line in text.split('\n') {
            columns = columns.max(UnicodeWidthStr::width(line));
            line_count += 1;
        }

        TextMetrics {
            width: columns as f64 * font_size * char_width_factor * bold_factor,
            height: line_count as f64 * font_size * line_height_factor,
            line_count,
        }
    }
}
