//! SVG frame to PNG via usvg/resvg/tiny-skia.

use super::ExportError;

#[derive(Debug, Clone)]
pub struct RasterOptions {
    /// Loading the system font database is slow; tests that only check pixels can skip it.
    pub load_system_fonts: bool,
    pub font_family: String,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            load_system_fonts: true,
            font_family: "Arial".to_string(),
        }
    }
}

/// Rasterizes a frame at the document's own `width`/`height`, which already include the device
/// pixel ratio.
pub fn svg_to_png(svg: &str, options: &RasterOptions) -> Result<Vec<u8>, ExportError> {
    let pixmap = svg_to_pixmap(svg, options)?;
    pixmap.encode_png().map_err(|_| ExportError::PngEncode)
}

fn svg_to_pixmap(svg: &str, options: &RasterOptions) -> Result<tiny_skia::Pixmap, ExportError> {
    let mut opt = usvg::Options::default();
    if options.load_system_fonts {
        opt.fontdb_mut().load_system_fonts();
    }
    opt.font_family = options.font_family.clone();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|_| ExportError::SvgParse)?;
    let size = tree.size().to_int_size();
    let mut pixmap =
        tiny_skia::Pixmap::new(size.width().max(1), size.height().max(1))
            .ok_or(ExportError::PixmapAlloc)?;
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());
    Ok(pixmap)
}
