use serde::{Deserialize, Serialize};

use crate::units::{format_measurement, format_with_inches, inches_to_mm, mm_to_inches};

/// Left edge of the first panel in diagram units (mm).
pub const SECTION1_START_MM: f64 = 50.0;
/// Top edge of the panel row in diagram units (mm).
pub const PANEL_TOP_MM: f64 = 50.0;
/// Fold allowance added to half the width to get the tab length.
pub const TAB_ALLOWANCE_MM: f64 = 20.0;
/// Left plus right seam allowance included in the total width.
pub const SEAM_ALLOWANCE_MM: f64 = 40.0;

const FACTORY_LENGTH_MM: f64 = 310.0;
const FACTORY_WIDTH_MM: f64 = 155.0;
const FACTORY_HEIGHT_MM: f64 = 400.0;
const FACTORY_TOLERANCE_MM: f64 = 0.1;
// Marketing figure printed for the factory bag's total width.
const FACTORY_TOTAL_WIDTH_IN: f64 = 38.17;

/// The three user-supplied measurements, in millimeters. `height` is the
/// tabside height: the height of the four main panels without the tab.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BagDimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for BagDimensions {
    fn default() -> Self {
        BagDimensions {
            length: FACTORY_LENGTH_MM,
            width: FACTORY_WIDTH_MM,
            height: FACTORY_HEIGHT_MM,
        }
    }
}

impl BagDimensions {
    pub fn new(length: f64, width: f64, height: f64) -> Self {
        BagDimensions {
            length,
            width,
            height,
        }
    }

    pub fn from_inches(length: f64, width: f64, height: f64) -> Self {
        BagDimensions {
            length: inches_to_mm(length),
            width: inches_to_mm(width),
            height: inches_to_mm(height),
        }
    }

    /// `(length, width, height)` in inches.
    pub fn to_inches(&self) -> (f64, f64, f64) {
        (
            mm_to_inches(self.length),
            mm_to_inches(self.width),
            mm_to_inches(self.height),
        )
    }

    fn is_factory_default(&self) -> bool {
        (self.width - FACTORY_WIDTH_MM).abs() <= FACTORY_TOLERANCE_MM
            && (self.length - FACTORY_LENGTH_MM).abs() <= FACTORY_TOLERANCE_MM
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PanelKind {
    Side1,
    Front1,
    Side2,
    Front2,
}

impl PanelKind {
    pub const ORDER: [PanelKind; 4] = [
        PanelKind::Side1,
        PanelKind::Front1,
        PanelKind::Side2,
        PanelKind::Front2,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PanelKind::Side1 => "Side 1",
            PanelKind::Front1 => "Front 1",
            PanelKind::Side2 => "Side 2",
            PanelKind::Front2 => "Front 2",
        }
    }
}

/// One of the four sections laid out left to right.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub kind: PanelKind,
    pub start_mm: f64,
    pub width_mm: f64,
}

impl Section {
    pub fn end_mm(&self) -> f64 {
        self.start_mm + self.width_mm
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedDimensions {
    pub length: String,
    pub width: String,
    pub height: String,
    pub tab_length: String,
    pub total_width: String,
    pub total_height: String,
    pub sections: [String; 4],
}

/// Everything derived from a [`BagDimensions`]. Pure function of its input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedDimensions {
    #[serde(rename = "tabLengthMM")]
    pub tab_length_mm: f64,
    #[serde(rename = "totalWidthMM")]
    pub total_width_mm: f64,
    #[serde(rename = "totalHeightMM")]
    pub total_height_mm: f64,
    #[serde(rename = "tabsideHeightMM")]
    pub tabside_height_mm: f64,
    pub sections: [Section; 4],
    pub formatted: FormattedDimensions,
}

impl CalculatedDimensions {
    pub fn section_width(&self, index: usize) -> Option<f64> {
        self.sections.get(index).map(|s| s.width_mm)
    }

    pub fn section_start(&self, index: usize) -> Option<f64> {
        self.sections.get(index).map(|s| s.start_mm)
    }

    /// Sum of the four panel widths, i.e. total width without seam allowance.
    pub fn panels_width_mm(&self) -> f64 {
        self.sections.iter().map(|s| s.width_mm).sum()
    }

    /// Right edge of the last panel.
    pub fn panels_end_mm(&self) -> f64 {
        self.sections[3].end_mm()
    }
}

/// Derive panel layout, totals and display strings. Never rejects input:
/// range checks belong to [`crate::limits`], and degenerate values produce
/// degenerate geometry.
pub fn calculate(d: &BagDimensions) -> CalculatedDimensions {
    let tab_length_mm = d.width / 2.0 + TAB_ALLOWANCE_MM;
    let total_width_mm = 2.0 * d.width + 2.0 * d.length + SEAM_ALLOWANCE_MM;
    let total_height_mm = d.height + tab_length_mm;

    let widths = [d.width, d.length, d.width, d.length];
    let mut start = SECTION1_START_MM;
    let sections = std::array::from_fn(|i| {
        let s = Section {
            kind: PanelKind::ORDER[i],
            start_mm: start,
            width_mm: widths[i],
        };
        start += widths[i];
        s
    });

    let total_width = if d.is_factory_default() {
        format_with_inches(FACTORY_TOTAL_WIDTH_IN, total_width_mm)
    } else {
        format_measurement(total_width_mm)
    };

    let formatted = FormattedDimensions {
        length: format_measurement(d.length),
        width: format_measurement(d.width),
        height: format_measurement(d.height),
        tab_length: format_measurement(tab_length_mm),
        total_width,
        total_height: format_measurement(total_height_mm),
        sections: widths.map(format_measurement),
    };

    CalculatedDimensions {
        tab_length_mm,
        total_width_mm,
        total_height_mm,
        tabside_height_mm: d.height,
        sections,
        formatted,
    }
}
