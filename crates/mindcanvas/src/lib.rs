#![forbid(unsafe_code)]

//! Headless mind-map canvas.
//!
//! [`Engine`] ties the model crate and the renderer together: it keeps the undo history, lays
//! the tree out in one of five modes, interprets pointer input, draws SVG frames and exports the
//! map as PNG or as an XMind-compatible outline archive.
//!
//! Features:
//! - `raster` (default): PNG export through `resvg`. Without it PNG export fails with
//!   [`ExportError::RasterUnsupported`].

pub mod engine;
pub mod export;
pub mod notice;

pub use engine::{Engine, EngineOptions};
pub use export::{ExportError, ExportedFile, PendingExport};
pub use notice::{Notice, NoticeKind, NoticeLog};

pub use mindcanvas_core::*;
pub use mindcanvas_render as render;
