//! Physical page geometry: where the diagram lands on paper and how screen
//! pixels map onto it.
//!
//! Page space is measured in inches from the top-left corner, y down. PDF
//! space is points from the bottom-left corner, y up; only this module
//! converts between the two.

use bag_core::units::{POINTS_PER_INCH, mm_to_inches};
use bag_core::{DiagramFrame, Point, Size};
use serde::Serialize;

use crate::error::ExportError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Rectangle on the page, in inches, y down.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PageRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PageRect {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PageLayout {
    pub page_width_in: f64,
    pub page_height_in: f64,
    pub margin_in: f64,
    pub orientation: Orientation,
    /// Diagram placement at true physical size.
    pub diagram: PageRect,
    /// Inches per on-screen pixel. X and Y differ whenever the container's
    /// aspect ratio differs from the diagram's.
    pub scale_x: f64,
    pub scale_y: f64,
}

impl PageLayout {
    /// Size a page for `frame` (millimeters) shown on screen inside a
    /// `container` of pixels, with `margin_in` inches on every side.
    pub fn compute(
        frame: &DiagramFrame,
        container: Size,
        margin_in: f64,
    ) -> Result<Self, ExportError> {
        if !(container.width > 0.0 && container.height > 0.0)
            || !container.width.is_finite()
            || !container.height.is_finite()
        {
            return Err(ExportError::InvalidContainer {
                width: container.width,
                height: container.height,
            });
        }
        if !(frame.width > 0.0 && frame.height > 0.0)
            || !frame.width.is_finite()
            || !frame.height.is_finite()
        {
            return Err(ExportError::InvalidFrame {
                width: frame.width,
                height: frame.height,
            });
        }
        let diagram_w = mm_to_inches(frame.width);
        let diagram_h = mm_to_inches(frame.height);
        let page_width_in = diagram_w + 2.0 * margin_in;
        let page_height_in = diagram_h + 2.0 * margin_in;
        let orientation = if page_width_in > page_height_in {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        };
        Ok(PageLayout {
            page_width_in,
            page_height_in,
            margin_in,
            orientation,
            diagram: PageRect {
                x: margin_in,
                y: margin_in,
                width: diagram_w,
                height: diagram_h,
            },
            scale_x: diagram_w / container.width,
            scale_y: diagram_h / container.height,
        })
    }

    pub fn map_point(&self, p: Point) -> (f64, f64) {
        (
            self.diagram.x + p.x * self.scale_x,
            self.diagram.y + p.y * self.scale_y,
        )
    }

    /// Screen rectangle (container pixels) to page inches.
    pub fn map_rect(&self, position: Point, size: Size) -> PageRect {
        let (x, y) = self.map_point(position);
        PageRect {
            x,
            y,
            width: size.width * self.scale_x,
            height: size.height * self.scale_y,
        }
    }

    pub fn page_width_pt(&self) -> f32 {
        (self.page_width_in * POINTS_PER_INCH) as f32
    }

    pub fn page_height_pt(&self) -> f32 {
        (self.page_height_in * POINTS_PER_INCH) as f32
    }

    /// Page inches (y down) to PDF points (y up).
    pub fn to_pdf_point(&self, x_in: f64, y_in: f64) -> (f32, f32) {
        (
            (x_in * POINTS_PER_INCH) as f32,
            ((self.page_height_in - y_in) * POINTS_PER_INCH) as f32,
        )
    }

    /// Matrix that stretches a unit-square form XObject over `rect`.
    pub fn placement_matrix(&self, rect: &PageRect) -> [f32; 6] {
        let (x, y) = self.to_pdf_point(rect.x, rect.y + rect.height);
        [
            (rect.width * POINTS_PER_INCH) as f32,
            0.0,
            0.0,
            (rect.height * POINTS_PER_INCH) as f32,
            x,
            y,
        ]
    }

    pub fn file_name(&self) -> String {
        format!(
            "custom-bag-{:.2}x{:.2}in.pdf",
            self.page_width_in, self.page_height_in
        )
    }
}

/// Bounding box of a `w`x`h` rectangle rotated by `degrees`.
pub fn rotated_extent(w: f64, h: f64, degrees: f64) -> (f64, f64) {
    let (s, c) = degrees.to_radians().sin_cos();
    let (s, c) = (s.abs(), c.abs());
    (w * c + h * s, w * s + h * c)
}

/// Grow a screen box so its rotated content fits, keeping the same center.
/// Unrotated boxes come back unchanged.
pub fn expand_for_rotation(position: Point, size: Size, degrees: f64) -> (Point, Size) {
    if degrees.rem_euclid(360.0) == 0.0 {
        return (position, size);
    }
    let (w, h) = rotated_extent(size.width, size.height, degrees);
    (
        Point {
            x: position.x - (w - size.width) / 2.0,
            y: position.y - (h - size.height) / 2.0,
        },
        Size {
            width: w,
            height: h,
        },
    )
}
