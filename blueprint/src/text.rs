//! Text overlays rendered to bitmaps so fonts, rotation and line breaks look
//! the same in every PDF viewer.

use std::sync::Arc;

use bag_core::{Point, Size, TextStyle, svg_escape};
use fonts::GenericFamily;
use tracing::debug;
use usvg::fontdb::{Database, Family, Query, Weight};

use crate::error::RasterError;
use crate::page::expand_for_rotation;

/// Line advance as a multiple of the font size.
pub const LINE_HEIGHT: f64 = 1.4;

/// A text overlay in screen pixels.
#[derive(Clone, Copy, Debug)]
pub struct TextBox<'a> {
    pub text: &'a str,
    pub style: &'a TextStyle,
    pub position: Point,
    pub size: Size,
    /// Degrees, clockwise.
    pub rotation: f64,
}

/// Standalone SVG for one text box, drawn on a canvas large enough for the
/// rotated box.
#[derive(Clone, Debug, PartialEq)]
pub struct TextCanvas {
    pub svg: String,
    pub width_px: u32,
    pub height_px: u32,
    /// Expanded box, screen pixels.
    pub origin: Point,
    pub size: Size,
}

#[derive(Clone, Debug)]
pub struct TextRaster {
    pub png: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
    pub origin: Point,
    pub size: Size,
}

/// Split on `\n`, dropping a trailing `\r`. Unlike `str::lines`, a trailing
/// newline yields a final empty line, as in the editor.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect()
}

fn generic_css(style: &TextStyle) -> &'static str {
    fonts::generic_family(&style.font_family).css()
}

pub fn text_canvas(b: &TextBox<'_>, supersample: u32) -> TextCanvas {
    let (w, h) = (b.size.width, b.size.height);
    let (origin, expanded) = expand_for_rotation(b.position, b.size, b.rotation);
    let (ew, eh) = (expanded.width, expanded.height);
    let k = f64::from(supersample);
    let width_px = (ew * k).round().max(0.0) as u32;
    let height_px = (eh * k).round().max(0.0) as u32;

    let lines = split_lines(b.text);
    let line_h = b.style.font_size * LINE_HEIGHT;
    let start_y = (h - lines.len() as f64 * line_h) / 2.0 + line_h / 2.0;
    let family = fonts::primary_family(&b.style.font_family).replace('\'', "");
    let fill = b.style.rgb().map_or_else(
        || "#000000".to_string(),
        |(r, g, bl)| {
            format!(
                "#{:02x}{:02x}{:02x}",
                (r * 255.0).round() as u8,
                (g * 255.0).round() as u8,
                (bl * 255.0).round() as u8
            )
        },
    );

    let mut s = String::new();
    s.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {:.3} {:.3}\">\n",
        width_px, height_px, ew, eh
    ));
    s.push_str(&format!(
        "<g transform=\"rotate({:.3} {:.3} {:.3}) translate({:.3} {:.3})\">\n",
        b.rotation,
        ew / 2.0,
        eh / 2.0,
        (ew - w) / 2.0,
        (eh - h) / 2.0
    ));
    s.push_str(&format!(
        "<g font-family=\"{}\" font-size=\"{:.3}\" font-weight=\"{}\" fill=\"{}\" text-anchor=\"middle\" dominant-baseline=\"central\">\n",
        svg_escape(&format!("'{}', {}, sans-serif", family, generic_css(b.style))),
        b.style.font_size,
        b.style.weight(),
        fill
    ));
    for (i, line) in lines.iter().enumerate() {
        s.push_str(&format!(
            "<text x=\"{:.3}\" y=\"{:.3}\" xml:space=\"preserve\">{}</text>\n",
            w / 2.0,
            start_y + i as f64 * line_h,
            svg_escape(line)
        ));
    }
    s.push_str("</g>\n</g>\n</svg>\n");
    TextCanvas {
        svg: s,
        width_px,
        height_px,
        origin,
        size: expanded,
    }
}

/// Fails with [`RasterError::NoFontFace`] when neither the requested family,
/// its generic family nor `sans-serif` resolves in `db`.
pub fn check_font(db: &Database, style: &TextStyle) -> Result<(), RasterError> {
    let generic = match fonts::generic_family(&style.font_family) {
        GenericFamily::SansSerif => Family::SansSerif,
        GenericFamily::Serif => Family::Serif,
        GenericFamily::Monospace => Family::Monospace,
        GenericFamily::Cursive => Family::Cursive,
    };
    let families = [
        Family::Name(fonts::primary_family(&style.font_family)),
        generic,
        Family::SansSerif,
    ];
    let query = Query {
        families: &families,
        weight: Weight(style.weight()),
        ..Query::default()
    };
    match db.query(&query) {
        Some(_) => Ok(()),
        None => Err(RasterError::NoFontFace {
            family: style.font_family.clone(),
            weight: style.weight(),
        }),
    }
}

/// Render `b` to a straight-alpha PNG at `supersample` pixels per screen
/// pixel.
pub fn rasterize(
    b: &TextBox<'_>,
    supersample: u32,
    max_px: u32,
    fonts: &Arc<Database>,
) -> Result<TextRaster, RasterError> {
    check_font(fonts, b.style)?;
    let canvas = text_canvas(b, supersample);
    if canvas.width_px == 0
        || canvas.height_px == 0
        || canvas.width_px > max_px
        || canvas.height_px > max_px
    {
        return Err(RasterError::Canvas {
            width: canvas.width_px,
            height: canvas.height_px,
        });
    }

    let mut opt = usvg::Options::default();
    opt.fontdb = Arc::clone(fonts);
    let tree =
        usvg::Tree::from_str(&canvas.svg, &opt).map_err(|e| RasterError::Svg(format!("{e:?}")))?;
    let mut pixmap =
        tiny_skia::Pixmap::new(canvas.width_px, canvas.height_px).ok_or(RasterError::Canvas {
            width: canvas.width_px,
            height: canvas.height_px,
        })?;
    let mut pm = pixmap.as_mut();
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pm);

    let rgba: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    let png = bag_core::encode_rgba_to_png_bytes(canvas.width_px, canvas.height_px, &rgba)?;
    debug!(
        width = canvas.width_px,
        height = canvas.height_px,
        bytes = png.len(),
        "text rasterized"
    );
    Ok(TextRaster {
        png,
        width_px: canvas.width_px,
        height_px: canvas.height_px,
        origin: canvas.origin,
        size: canvas.size,
    })
}
