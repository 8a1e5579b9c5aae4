//! Native PDF text for overlays that could not be rasterized. Uses the
//! base-14 fonts, so glyph shapes and widths are approximate.

use bag_core::TextStyle;
use bag_core::units::POINTS_PER_INCH;

use crate::page::{PageLayout, PageRect};
use crate::text::{LINE_HEIGHT, split_lines};

/// Baseline drop below a line's vertical center, in em.
const BASELINE_SHIFT: f64 = 0.35;

#[derive(Clone, Debug, PartialEq)]
pub struct FallbackLine {
    /// WinAnsi bytes.
    pub bytes: Vec<u8>,
    /// PDF text matrix: rotation plus the baseline start in points.
    pub matrix: [f32; 6],
}

#[derive(Clone, Debug, PartialEq)]
pub struct FallbackText {
    /// Base-14 font name.
    pub font: &'static str,
    pub size_pt: f32,
    pub color: (f32, f32, f32),
    pub lines: Vec<FallbackLine>,
}

/// Map to WinAnsi, replacing anything outside Latin-1 (and the C1 range) with
/// `?`.
pub fn win_ansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| match c as u32 {
            v @ (0x20..=0x7e | 0xa0..=0xff) => v as u8,
            _ => b'?',
        })
        .collect()
}

/// Lay out `text` centered in `rect` (page inches, unrotated box) and
/// rotated clockwise by `rotation` degrees about the box center.
pub fn layout_text(
    text: &str,
    style: &TextStyle,
    rect: &PageRect,
    rotation: f64,
    page: &PageLayout,
) -> FallbackText {
    let generic = fonts::generic_family(&style.font_family);
    let size_in = style.font_size * page.scale_y;
    let line_h = size_in * LINE_HEIGHT;
    let lines = split_lines(text);
    let n = lines.len() as f64;
    let (cx, cy) = rect.center();
    let (s, c) = rotation.to_radians().sin_cos();

    let lines = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let est_w = line.chars().count() as f64 * size_in * generic.average_advance();
            // Baseline start relative to the box center, y down.
            let dx = -est_w / 2.0;
            let dy = (i as f64 - (n - 1.0) / 2.0) * line_h + BASELINE_SHIFT * size_in;
            let (px, py) = page.to_pdf_point(cx + dx * c - dy * s, cy + dx * s + dy * c);
            FallbackLine {
                bytes: win_ansi(line),
                matrix: [c as f32, -s as f32, s as f32, c as f32, px, py],
            }
        })
        .collect();

    FallbackText {
        font: generic.base14(style.is_bold()),
        size_pt: (size_in * POINTS_PER_INCH) as f32,
        color: style.rgb().unwrap_or((0.0, 0.0, 0.0)),
        lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bag_core::{DiagramFrame, Size};

    fn layout() -> PageLayout {
        // 1 screen px == 0.01in on both axes.
        let frame = DiagramFrame {
            min_x: 0.0,
            min_y: 0.0,
            width: 254.0,
            height: 254.0,
        };
        PageLayout::compute(
            &frame,
            Size {
                width: 1000.0,
                height: 1000.0,
            },
            1.0,
        )
        .unwrap()
    }

    #[test]
    fn encodes_win_ansi() {
        assert_eq!(win_ansi("Café"), vec![b'C', b'a', b'f', 0xe9]);
        assert_eq!(win_ansi("日本"), b"??".to_vec());
    }

    #[test]
    fn picks_base14_font() {
        let page = layout();
        let rect = page.map_rect(
            bag_core::Point { x: 0.0, y: 0.0 },
            Size {
                width: 100.0,
                height: 50.0,
            },
        );
        let bold_serif = TextStyle {
            font_family: "Georgia".into(),
            font_weight: "bold".into(),
            ..TextStyle::default()
        };
        assert_eq!(layout_text("x", &bold_serif, &rect, 0.0, &page).font, "Times-Bold");
        let mono = TextStyle {
            font_family: "Courier New".into(),
            ..TextStyle::default()
        };
        assert_eq!(layout_text("x", &mono, &rect, 0.0, &page).font, "Courier");
    }

    #[test]
    fn single_line_is_centered() {
        let page = layout();
        let rect = PageRect {
            x: 2.0,
            y: 3.0,
            width: 2.0,
            height: 1.0,
        };
        let style = TextStyle {
            font_size: 20.0,
            color: "#ff0000".into(),
            ..TextStyle::default()
        };
        let t = layout_text("abcd", &style, &rect, 0.0, &page);
        // 20px * 0.01in = 0.2in = 14.4pt.
        assert!((t.size_pt - 14.4).abs() < 1e-4);
        assert_eq!(t.color, (1.0, 0.0, 0.0));
        let m = t.lines[0].matrix;
        // Estimated width 4 * 0.2 * 0.5 = 0.4in, so x starts at 3.0 - 0.2.
        assert!((m[4] - 2.8 * 72.0).abs() < 1e-3);
        // Baseline 0.07in below the center (3.5in); page is 12in tall.
        assert!((m[5] - (12.0 - 3.57) as f32 * 72.0).abs() < 1e-3);
        assert_eq!(&m[..4], &[1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn rotation_goes_into_the_matrix() {
        let page = layout();
        let rect = PageRect {
            x: 2.0,
            y: 3.0,
            width: 2.0,
            height: 1.0,
        };
        let t = layout_text("a\nb", &TextStyle::default(), &rect, 90.0, &page);
        assert_eq!(t.lines.len(), 2);
        let m = t.lines[0].matrix;
        assert!(m[0].abs() < 1e-6);
        assert!((m[1] + 1.0).abs() < 1e-6);
        assert!((m[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn trailing_newline_counts_as_a_line() {
        let page = layout();
        let rect = PageRect {
            x: 2.0,
            y: 3.0,
            width: 2.0,
            height: 1.0,
        };
        let style = TextStyle::default();
        let one = layout_text("Logo", &style, &rect, 0.0, &page);
        let two = layout_text("Logo\n", &style, &rect, 0.0, &page);
        assert_eq!(two.lines.len(), 2);
        assert!(two.lines[1].bytes.is_empty());
        // The first line moves up by half a line, i.e. up the page in PDF space.
        let half_line = style.font_size * page.scale_y * LINE_HEIGHT / 2.0 * 72.0;
        let shift = f64::from(two.lines[0].matrix[5] - one.lines[0].matrix[5]);
        assert!((shift - half_line).abs() < 1e-3);
    }
}
