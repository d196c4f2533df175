//! PNG and outline-archive export.
//!
//! [`crate::Engine::export`] captures everything the export needs and hands back a
//! [`PendingExport`]; awaiting [`PendingExport::finish`] produces the file bytes and posts the
//! success or failure notice. Only one export may be pending at a time.

pub mod archive;
#[cfg(feature = "raster")]
pub mod raster;

use crate::notice::{Notice, NoticeLog};
use chrono::{DateTime, Utc};
use mindcanvas_core::{ExportFormat, MindMap};
use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("an export is already in progress")]
    InFlight,
    #[error("no drawing surface is mounted")]
    SurfaceUnavailable,
    #[error("failed to parse SVG")]
    SvgParse,
    #[error("failed to allocate pixmap for raster rendering")]
    PixmapAlloc,
    #[error("failed to encode PNG")]
    PngEncode,
    #[error("failed to build archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("I/O error while writing archive: {0}")]
    Io(#[from] std::io::Error),
    #[error("PNG export requires the `raster` feature")]
    RasterUnsupported,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub media_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Held while an export is pending; releases the engine's busy flag on drop.
#[derive(Debug)]
pub(crate) struct ExportGuard(Rc<Cell<bool>>);

impl ExportGuard {
    pub(crate) fn acquire(flag: &Rc<Cell<bool>>) -> Option<Self> {
        if flag.replace(true) {
            return None;
        }
        Some(Self(Rc::clone(flag)))
    }
}

impl Drop for ExportGuard {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

#[derive(Debug)]
pub(crate) enum Payload {
    Png { svg: String },
    Archive {
        map: MindMap,
        created_at: DateTime<Utc>,
    },
}

#[derive(Debug)]
pub struct PendingExport {
    format: ExportFormat,
    file_name: String,
    payload: Payload,
    notices: NoticeLog,
    _guard: ExportGuard,
}

impl PendingExport {
    pub(crate) fn new(
        format: ExportFormat,
        file_stem: &str,
        payload: Payload,
        notices: NoticeLog,
        guard: ExportGuard,
    ) -> Self {
        Self {
            format,
            file_name: format!("{file_stem}.{}", format.extension()),
            payload,
            notices,
            _guard: guard,
        }
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Produces the file. The busy flag is released when this returns.
    pub async fn finish(self) -> Result<ExportedFile, ExportError> {
        let result = match &self.payload {
            Payload::Png { svg } => encode_png(svg).map(|bytes| (bytes, "image/png")),
            Payload::Archive { map, created_at } => {
                archive::write_archive(map, *created_at).map(|bytes| (bytes, "application/zip"))
            }
        };
        match result {
            Ok((bytes, media_type)) => {
                tracing::info!(file = %self.file_name, bytes = bytes.len(), "export finished");
                self.notices.push(Notice::export_succeeded(self.format));
                Ok(ExportedFile {
                    file_name: self.file_name,
                    media_type,
                    bytes,
                })
            }
            Err(err) => {
                tracing::warn!(file = %self.file_name, error = %err, "export failed");
                self.notices.push(Notice::export_failed(self.format));
                Err(err)
            }
        }
    }
}

#[cfg(feature = "raster")]
fn encode_png(svg: &str) -> Result<Vec<u8>, ExportError> {
    raster::svg_to_png(svg, &raster::RasterOptions::default())
}

#[cfg(not(feature = "raster"))]
fn encode_png(_svg: &str) -> Result<Vec<u8>, ExportError> {
    Err(ExportError::RasterUnsupported)
}
