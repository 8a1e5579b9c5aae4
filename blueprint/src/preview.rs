use std::sync::Arc;

use bag_core::Blueprint;
use png::{BitDepth, ColorType, Compression, Encoder, FilterType};
use tracing::debug;

use crate::error::ExportError;
use crate::pdf::Exporter;

impl Exporter {
    /// Raster preview of the die-line at `px_per_mm` pixels per millimeter.
    /// The same blueprint and scale always give the same bytes.
    pub fn preview_png(
        &self,
        blueprint: &Blueprint,
        px_per_mm: f64,
    ) -> Result<Vec<u8>, ExportError> {
        if blueprint.svg.trim().is_empty() {
            return Err(ExportError::MissingDiagram);
        }
        let w_px = (blueprint.frame.width * px_per_mm).ceil().max(0.0) as u32;
        let h_px = (blueprint.frame.height * px_per_mm).ceil().max(0.0) as u32;

        let mut opt = usvg::Options::default();
        opt.fontdb = Arc::clone(self.raster_fonts());
        let tree = usvg::Tree::from_str(&blueprint.svg, &opt)
            .map_err(|e| ExportError::DiagramParse(format!("{e:?}")))?;
        let mut pixmap = tiny_skia::Pixmap::new(w_px, h_px).ok_or(ExportError::Canvas {
            width: w_px,
            height: h_px,
        })?;
        let size = tree.size();
        let transform = tiny_skia::Transform::from_scale(
            w_px as f32 / size.width(),
            h_px as f32 / size.height(),
        );
        let mut pm = pixmap.as_mut();
        resvg::render(&tree, transform, &mut pm);
        debug!(width = w_px, height = h_px, "blueprint preview rendered");
        encode_png_deterministic(&pixmap)
    }
}

fn encode_png_deterministic(pixmap: &tiny_skia::Pixmap) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    {
        let mut enc = Encoder::new(&mut buf, pixmap.width(), pixmap.height());
        enc.set_color(ColorType::Rgba);
        enc.set_depth(BitDepth::Eight);
        enc.set_filter(FilterType::NoFilter);
        enc.set_compression(Compression::Default);
        let mut writer = enc.write_header()?;
        // The blueprint background is opaque, so premultiplied data is exact.
        writer.write_image_data(pixmap.data())?;
        writer.finish()?;
    }
    Ok(buf)
}
