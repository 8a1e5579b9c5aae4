use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dimensions::{
    BagDimensions, CalculatedDimensions, PANEL_TOP_MM, SEAM_ALLOWANCE_MM, calculate,
};
use crate::edit::DimensionEdit;
use crate::units::round_to;

/// Label glyph height in diagram units (mm).
pub const LABEL_FONT_MM: f64 = 12.0;
/// Fraction of the content size added on each side of the view box.
pub const FRAME_BUFFER: f64 = 0.03;

// Offsets of the measurement annotations from the panel geometry.
const TOTAL_WIDTH_ARROW_ABOVE: f64 = 25.0;
const TOTAL_HEIGHT_ARROW_RIGHT: f64 = 30.0;
const TABSIDE_ARROW_LEFT: f64 = 30.0;
const TAB_ARROW_LEFT: f64 = 60.0;
const SECTION_ARROW_BELOW: f64 = 20.0;
const LABEL_OFFSET: f64 = 12.0;
const ARROW_HEAD: f64 = 4.0;
// Average advance of a glyph relative to the font size.
const GLYPH_EM: f64 = 0.6;
const LABEL_FILL: &str = "#333";
const PANEL_LABEL_FILL: &str = "#bbb";

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    // Positive extents, for drawing degenerate inputs.
    fn normalized(&self) -> Rect {
        let (x, width) = if self.width < 0.0 {
            (self.x + self.width, -self.width)
        } else {
            (self.x, self.width)
        };
        let (y, height) = if self.height < 0.0 {
            (self.y + self.height, -self.height)
        } else {
            (self.y, self.height)
        };
        Rect::new(x, y, width, height)
    }
}

/// The view rectangle of a rendered blueprint, in millimeters. This is the
/// anchor the exporter scales overlays against.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramFrame {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

impl DiagramFrame {
    pub fn view_box(&self) -> String {
        format!(
            "{:.3} {:.3} {:.3} {:.3}",
            self.min_x, self.min_y, self.width, self.height
        )
    }
}

/// A rendered die-line: SVG text plus the geometry it was drawn from.
#[derive(Clone, Debug, PartialEq)]
pub struct Blueprint {
    pub svg: String,
    pub frame: DiagramFrame,
    pub dimensions: BagDimensions,
    pub calculated: CalculatedDimensions,
    pub panels: [Rect; 4],
    pub tabs: [Rect; 4],
    /// Left and right seam allowance strips.
    pub seams: [Rect; 2],
    pub preview: bool,
}

/// Draw the die-line for `dimensions`. When `preview` carries provisional
/// values, they are merged over `dimensions` and the geometry is derived from
/// the merged value; `dimensions` itself is never changed.
pub fn render(
    dimensions: &BagDimensions,
    calculated: &CalculatedDimensions,
    preview: Option<&DimensionEdit>,
) -> Blueprint {
    let merged = preview
        .filter(|p| !p.is_empty())
        .map(|p| p.resolve(dimensions));
    let (dims, calc, is_preview) = match merged {
        Some(m) => (m, calculate(&m), true),
        None => (*dimensions, calculated.clone(), false),
    };
    debug!(
        length = dims.length,
        width = dims.width,
        height = dims.height,
        preview = is_preview,
        "rendering blueprint"
    );
    build(dims, calc, is_preview)
}

fn build(dims: BagDimensions, calc: CalculatedDimensions, preview: bool) -> Blueprint {
    let top = PANEL_TOP_MM;
    let tabside = calc.tabside_height_mm;
    let tab = calc.tab_length_mm;
    let tab_top = top + tabside;
    let tab_bottom = tab_top + tab;
    let seam_w = SEAM_ALLOWANCE_MM / 2.0;
    let left = calc.sections[0].start_mm;
    let right = calc.panels_end_mm();

    let panels = calc
        .sections
        .map(|s| Rect::new(s.start_mm, top, s.width_mm, tabside));
    let tabs = calc
        .sections
        .map(|s| Rect::new(s.start_mm, tab_top, s.width_mm, tab));
    let seams = [
        Rect::new(left - seam_w, top, seam_w, tabside),
        Rect::new(right, top, seam_w, tabside),
    ];

    let mut sheet = Sheet::new();

    for seam in &seams {
        sheet.rect(
            seam,
            "seam",
            "fill=\"none\" stroke=\"#999\" stroke-dasharray=\"4 3\"",
        );
    }
    for (panel, section) in panels.iter().zip(calc.sections.iter()) {
        sheet.rect(panel, "panel", "fill=\"#fafafa\"");
        sheet.text(
            panel.x + panel.width / 2.0,
            panel.y + panel.height / 2.0,
            false,
            PANEL_LABEL_FILL,
            section.kind.label(),
        );
    }
    for t in &tabs {
        sheet.rect(t, "tab", "fill=\"#f0f0f0\"");
    }

    // Total width, centered above everything including the seam strips.
    let tw_y = top - TOTAL_WIDTH_ARROW_ABOVE;
    let tw_x0 = left - seam_w;
    let tw_x1 = tw_x0 + calc.total_width_mm;
    sheet.arrow(tw_x0, tw_y, tw_x1, tw_y);
    sheet.text(
        (tw_x0 + tw_x1) / 2.0,
        tw_y - LABEL_OFFSET,
        false,
        LABEL_FILL,
        &calc.formatted.total_width,
    );

    // Total height, a fixed distance right of the last panel.
    let th_x = right + TOTAL_HEIGHT_ARROW_RIGHT;
    sheet.arrow(th_x, top, th_x, top + calc.total_height_mm);
    sheet.text(
        th_x + LABEL_OFFSET,
        top + calc.total_height_mm / 2.0,
        true,
        LABEL_FILL,
        &calc.formatted.total_height,
    );

    let ts_x = left - TABSIDE_ARROW_LEFT;
    sheet.arrow(ts_x, top, ts_x, tab_top);
    sheet.text(
        ts_x - LABEL_OFFSET,
        top + tabside / 2.0,
        true,
        LABEL_FILL,
        &calc.formatted.height,
    );

    let tl_x = left - TAB_ARROW_LEFT;
    sheet.arrow(tl_x, tab_top, tl_x, tab_bottom);
    sheet.text(
        tl_x - LABEL_OFFSET,
        tab_top + tab / 2.0,
        true,
        LABEL_FILL,
        &calc.formatted.tab_length,
    );

    // Per-panel widths on one line under the tab row.
    let sw_y = tab_bottom + SECTION_ARROW_BELOW;
    for (s, label) in calc.sections.iter().zip(calc.formatted.sections.iter()) {
        sheet.arrow(s.start_mm, sw_y, s.end_mm(), sw_y);
        sheet.text(
            s.start_mm + s.width_mm / 2.0,
            sw_y + LABEL_OFFSET,
            false,
            LABEL_FILL,
            label,
        );
    }

    let frame = sheet.frame();
    let svg = sheet.finish(&frame, preview);
    Blueprint {
        svg,
        frame,
        dimensions: dims,
        calculated: calc,
        panels,
        tabs,
        seams,
        preview,
    }
}

/// SVG body under construction plus the running bounds of everything drawn.
struct Sheet {
    body: String,
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Sheet {
    fn new() -> Self {
        Sheet {
            body: String::new(),
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    fn include(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) {
        self.min_x = self.min_x.min(x0.min(x1));
        self.min_y = self.min_y.min(y0.min(y1));
        self.max_x = self.max_x.max(x0.max(x1));
        self.max_y = self.max_y.max(y0.max(y1));
    }

    fn rect(&mut self, r: &Rect, class: &str, attrs: &str) {
        let r = r.normalized();
        self.include(r.x, r.y, r.right(), r.bottom());
        self.body.push_str(&format!(
            "<rect class=\"{}\" x=\"{:.3}\" y=\"{:.3}\" width=\"{:.3}\" height=\"{:.3}\" {}/>\n",
            class, r.x, r.y, r.width, r.height, attrs
        ));
    }

    fn arrow(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) {
        self.include(x0, y0, x1, y1);
        self.body.push_str(&format!(
            "<path class=\"measure\" d=\"M {:.3} {:.3} L {:.3} {:.3}\" stroke-width=\"0.5\"/>\n",
            x0, y0, x1, y1
        ));
        self.head(x1, y1, x0, y0);
        self.head(x0, y0, x1, y1);
    }

    // Filled triangle at `tip`, pointing away from `from`.
    fn head(&mut self, tip_x: f64, tip_y: f64, from_x: f64, from_y: f64) {
        let dx = tip_x - from_x;
        let dy = tip_y - from_y;
        let len = (dx * dx + dy * dy).sqrt();
        if len == 0.0 {
            return;
        }
        let (ux, uy) = (dx / len, dy / len);
        let bx = tip_x - ux * ARROW_HEAD;
        let by = tip_y - uy * ARROW_HEAD;
        let (px, py) = (-uy * ARROW_HEAD / 2.0, ux * ARROW_HEAD / 2.0);
        self.include(bx + px, by + py, bx - px, by - py);
        self.body.push_str(&format!(
            "<path class=\"measure-head\" d=\"M {:.3} {:.3} L {:.3} {:.3} L {:.3} {:.3} Z\" fill=\"#333\" stroke=\"none\"/>\n",
            tip_x,
            tip_y,
            bx + px,
            by + py,
            bx - px,
            by - py
        ));
    }

    /// Text centered on `(x, y)`; `vertical` turns it to read bottom-to-top.
    fn text(&mut self, x: f64, y: f64, vertical: bool, fill: &str, content: &str) {
        let len = content.chars().count() as f64 * LABEL_FONT_MM * GLYPH_EM;
        let half_len = len / 2.0;
        let half_h = LABEL_FONT_MM / 2.0;
        let transform = if vertical {
            self.include(x - half_h, y - half_len, x + half_h, y + half_len);
            format!(" transform=\"rotate(-90 {:.3} {:.3})\"", x, y)
        } else {
            self.include(x - half_len, y - half_h, x + half_len, y + half_h);
            String::new()
        };
        self.body.push_str(&format!(
            "<text x=\"{:.3}\" y=\"{:.3}\" text-anchor=\"middle\" dominant-baseline=\"central\" stroke=\"none\" fill=\"{}\"{}>{}</text>\n",
            x,
            y,
            fill,
            transform,
            svg_escape(content)
        ));
    }

    fn frame(&self) -> DiagramFrame {
        let w = self.max_x - self.min_x;
        let h = self.max_y - self.min_y;
        let bx = w * FRAME_BUFFER;
        let by = h * FRAME_BUFFER;
        DiagramFrame {
            min_x: round_to(self.min_x - bx, 3),
            min_y: round_to(self.min_y - by, 3),
            width: round_to(w + 2.0 * bx, 3),
            height: round_to(h + 2.0 * by, 3),
        }
    }

    fn finish(self, frame: &DiagramFrame, preview: bool) -> String {
        let mut s = String::new();
        s.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        s.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{:.3}mm\" height=\"{:.3}mm\" viewBox=\"{}\" stroke=\"#333\" stroke-width=\"0.8\" stroke-linejoin=\"round\" font-family=\"sans-serif\" font-size=\"{}\">\n",
            frame.width,
            frame.height,
            frame.view_box(),
            LABEL_FONT_MM
        ));
        s.push_str(&format!(
            "<rect x=\"{:.3}\" y=\"{:.3}\" width=\"{:.3}\" height=\"{:.3}\" fill=\"#ffffff\" stroke=\"none\"/>\n",
            frame.min_x, frame.min_y, frame.width, frame.height
        ));
        if preview {
            s.push_str("<g class=\"preview\" opacity=\"0.85\">\n");
        } else {
            s.push_str("<g>\n");
        }
        s.push_str(&self.body);
        s.push_str("</g>\n</svg>\n");
        s
    }
}

pub fn svg_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
