#![forbid(unsafe_code)]

//! Frame rendering for mindcanvas: text measurement, drawing surfaces and the layered scene
//! renderer.

pub mod error;
pub mod scene;
pub mod surface;
pub mod svg;
pub mod text;
pub mod theme;

pub use error::{Error, Result};
pub use scene::{NodeBox, Scene, TOOLTIP_PLACEHOLDER, node_box, render_scene};
pub use surface::{Font, Path, PathCommand, Stroke, Surface};
pub use svg::SvgSurface;
pub use text::{DeterministicTextMeasurer, TextMeasurer, TextMetrics, TextStyle};
pub use theme::Theme;
