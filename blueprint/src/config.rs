use fonts::FontConfig;
use serde::{Deserialize, Serialize};

/// Lowest supersampling factor used for rasterized text.
pub const MIN_SUPERSAMPLE: u32 = 4;

/// Export settings. Built once and handed to [`crate::Exporter::new`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Blank border around the diagram on every side, in inches.
    pub margin_in: f64,
    /// Raster resolution multiplier for text overlays; values below
    /// [`MIN_SUPERSAMPLE`] are raised to it.
    pub supersample: u32,
    /// Place text as native PDF text when rasterization fails.
    pub text_fallback: bool,
    /// Largest raster edge, in pixels, a text overlay may allocate.
    pub max_raster_px: u32,
    pub fonts: FontConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            margin_in: 2.0,
            supersample: MIN_SUPERSAMPLE,
            text_fallback: true,
            max_raster_px: 8192,
            fonts: FontConfig::default(),
        }
    }
}

impl ExportConfig {
    pub fn supersample(&self) -> u32 {
        self.supersample.max(MIN_SUPERSAMPLE)
    }

    pub fn margin_in(&self) -> f64 {
        if self.margin_in.is_finite() {
            self.margin_in.max(0.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supersample_has_a_floor() {
        let c = ExportConfig {
            supersample: 1,
            ..ExportConfig::default()
        };
        assert_eq!(c.supersample(), 4);
        let c = ExportConfig {
            supersample: 8,
            ..ExportConfig::default()
        };
        assert_eq!(c.supersample(), 8);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c: ExportConfig = serde_json::from_str(r#"{"margin_in": 1.5}"#).unwrap();
        assert_eq!(c.margin_in, 1.5);
        assert!(c.text_fallback);
        assert_eq!(c.max_raster_px, 8192);
        assert!(c.fonts.system_fonts);
    }

    #[test]
    fn negative_margin_is_ignored() {
        let c = ExportConfig {
            margin_in: -3.0,
            ..ExportConfig::default()
        };
        assert_eq!(c.margin_in(), 0.0);
    }
}
