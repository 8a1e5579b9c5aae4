use thiserror::Error;

/// Why a text overlay could not be turned into a bitmap.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("no font face resolves for '{family}' at weight {weight}")]
    NoFontFace { family: String, weight: u16 },
    #[error("cannot allocate a {width}x{height} px raster canvas")]
    Canvas { width: u32, height: u32 },
    #[error("text SVG parse error: {0}")]
    Svg(String),
    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
}

/// A single overlay that could not be placed. Never aborts an export.
#[derive(Debug, Error)]
pub enum ElementError {
    #[error("element box {width}x{height} px is empty")]
    EmptyBox { width: f64, height: f64 },
    #[error("text rasterization failed: {0}")]
    Raster(#[from] RasterError),
    #[error("image source is unreadable: {0}")]
    Image(String),
    #[error("PDF conversion failed: {0}")]
    Conversion(String),
}

/// Failures that abort the whole export; no output file is written.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("diagram SVG is missing")]
    MissingDiagram,
    #[error("diagram SVG could not be parsed: {0}")]
    DiagramParse(String),
    #[error("diagram could not be converted to PDF: {0}")]
    DiagramConversion(String),
    #[error("container size {width}x{height} px must be positive")]
    InvalidContainer { width: f64, height: f64 },
    #[error("diagram frame {width}x{height} mm must be positive")]
    InvalidFrame { width: f64, height: f64 },
    #[error("cannot allocate a {width}x{height} px preview")]
    Canvas { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
