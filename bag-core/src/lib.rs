//! Geometry core for a parametric gusseted paper bag: dimension math, the
//! flattened die-line blueprint, and the overlay model placed on top of it.

use png::{BitDepth, ColorType, Encoder};

pub mod blueprint;
pub mod design;
pub mod dimensions;
pub mod edit;
pub mod limits;
pub mod overlay;
pub mod units;

pub use blueprint::{Blueprint, DiagramFrame, Rect, render, svg_escape};
pub use design::{DesignError, DesignRecord, StoredLogo};
pub use dimensions::{BagDimensions, CalculatedDimensions, PanelKind, Section, calculate};
pub use edit::{DesignSession, DimensionEdit};
pub use limits::ValidationError;
pub use overlay::{Overlay, OverlayError, OverlayKind, OverlayLayers, Point, Size, TextStyle};

// Shared PNG encoder: straight (non-premultiplied) RGBA -> PNG bytes,
// deterministic for the same input.
pub fn encode_rgba_to_png_bytes(
    width: u32,
    height: u32,
    rgba: &[u8],
) -> Result<Vec<u8>, png::EncodingError> {
    let mut buf = Vec::new();
    {
        let mut enc = Encoder::new(&mut buf, width, height);
        enc.set_color(ColorType::Rgba);
        enc.set_depth(BitDepth::Eight);
        {
            let mut writer = enc.write_header()?;
            writer.write_image_data(rgba)?;
        }
    }
    Ok(buf)
}
