//! Font provisioning for blueprint labels and rasterized overlay text.
//!
//! Fonts come from three places, loaded in this order: the system font
//! directories, a font embedded at build time (`BAG_FONT_FILE`), and extra
//! font files listed in [`FontConfig`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[doc(hidden)]
pub use tracing;

/// Font embedded at build time; empty when `BAG_FONT_FILE` was not set.
pub const FONT_BYTES: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/embedded-font.bin"));

pub fn embedded() -> Option<&'static [u8]> {
    if FONT_BYTES.is_empty() {
        None
    } else {
        Some(FONT_BYTES)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub system_fonts: bool,
    pub files: Vec<PathBuf>,
    /// Family used for the generic `sans-serif`, e.g. the embedded font's name.
    pub sans_serif: Option<String>,
    pub serif: Option<String>,
    pub monospace: Option<String>,
}

impl Default for FontConfig {
    fn default() -> Self {
        FontConfig {
            system_fonts: true,
            files: Vec::new(),
            sans_serif: None,
            serif: None,
            monospace: None,
        }
    }
}

/// Fill a `fontdb::Database` from a [`FontConfig`]. Takes the path of the
/// `fontdb` crate to use, e.g. `install_fonts!(db, &config, usvg::fontdb)`,
/// so it works with whichever `fontdb` version a renderer re-exports.
#[macro_export]
macro_rules! install_fonts {
    ($db:expr, $config:expr, $($fontdb:ident)::+) => {{
        let db = &mut $db;
        let config: &$crate::FontConfig = $config;
        if config.system_fonts {
            db.load_system_fonts();
        }
        if let Some(bytes) = $crate::embedded() {
            db.load_font_data(bytes.to_vec());
        }
        for path in &config.files {
            if let Err(e) = db.load_font_file(path) {
                $crate::tracing::warn!(path = %path.display(), error = %e, "font file skipped");
            }
        }
        match &config.sans_serif {
            Some(name) => db.set_sans_serif_family(name.clone()),
            None => {
                // Map generic 'sans-serif' to the first loaded face when the
                // default family is not installed.
                let current = db
                    .family_name(&$($fontdb)::+::Family::SansSerif)
                    .to_string();
                let installed = db
                    .faces()
                    .any(|face| face.families.iter().any(|(n, _)| *n == current));
                let first_family = db
                    .faces()
                    .next()
                    .and_then(|face| face.families.first().map(|(n, _)| n.clone()));
                if let (false, Some(name)) = (installed, first_family) {
                    db.set_sans_serif_family(name);
                }
            }
        }
        if let Some(name) = &config.serif {
            db.set_serif_family(name.clone());
        }
        if let Some(name) = &config.monospace {
            db.set_monospace_family(name.clone());
        }
        $crate::tracing::debug!(faces = db.len(), "font database ready");
    }};
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenericFamily {
    SansSerif,
    Serif,
    Monospace,
    Cursive,
}

impl GenericFamily {
    /// CSS generic family keyword.
    pub fn css(self) -> &'static str {
        match self {
            GenericFamily::SansSerif => "sans-serif",
            GenericFamily::Serif => "serif",
            GenericFamily::Monospace => "monospace",
            GenericFamily::Cursive => "cursive",
        }
    }

    /// Closest PDF base-14 font.
    pub fn base14(self, bold: bool) -> &'static str {
        match (self, bold) {
            (GenericFamily::Serif, false) => "Times-Roman",
            (GenericFamily::Serif, true) => "Times-Bold",
            (GenericFamily::Monospace, false) => "Courier",
            (GenericFamily::Monospace, true) => "Courier-Bold",
            (_, false) => "Helvetica",
            (_, true) => "Helvetica-Bold",
        }
    }

    /// Average glyph advance in em, for estimating line widths.
    pub fn average_advance(self) -> f64 {
        match self {
            GenericFamily::Monospace => 0.6,
            GenericFamily::Serif => 0.45,
            _ => 0.5,
        }
    }
}

/// Guess the generic family of a CSS font-family list such as
/// `"'Times New Roman', serif"`.
pub fn generic_family(family: &str) -> GenericFamily {
    let f = family.to_ascii_lowercase();
    const MONO: [&str; 6] = ["mono", "courier", "consolas", "menlo", "monaco", "code"];
    const SERIF: [&str; 7] = [
        "times", "georgia", "garamond", "palatino", "baskerville", "cambria", "bodoni",
    ];
    const CURSIVE: [&str; 4] = ["cursive", "comic", "brush", "script"];
    if MONO.iter().any(|k| f.contains(k)) {
        GenericFamily::Monospace
    } else if CURSIVE.iter().any(|k| f.contains(k)) {
        GenericFamily::Cursive
    } else if f.contains("sans") {
        GenericFamily::SansSerif
    } else if f.contains("serif") || SERIF.iter().any(|k| f.contains(k)) {
        GenericFamily::Serif
    } else {
        GenericFamily::SansSerif
    }
}

/// First family name of a CSS list, without quotes.
pub fn primary_family(family: &str) -> &str {
    family
        .split(',')
        .next()
        .unwrap_or("")
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_families() {
        assert_eq!(generic_family("Arial"), GenericFamily::SansSerif);
        assert_eq!(generic_family("'Times New Roman', serif"), GenericFamily::Serif);
        assert_eq!(generic_family("Georgia"), GenericFamily::Serif);
        assert_eq!(generic_family("Fira Sans"), GenericFamily::SansSerif);
        assert_eq!(generic_family("Courier New"), GenericFamily::Monospace);
        assert_eq!(generic_family("Comic Sans MS"), GenericFamily::Cursive);
    }

    #[test]
    fn base14_names() {
        assert_eq!(GenericFamily::Serif.base14(true), "Times-Bold");
        assert_eq!(GenericFamily::Cursive.base14(false), "Helvetica");
        assert_eq!(GenericFamily::Monospace.base14(false), "Courier");
    }

    #[test]
    fn primary_family_strips_quotes() {
        assert_eq!(primary_family("\"Open Sans\", Arial"), "Open Sans");
        assert_eq!(primary_family("Arial"), "Arial");
    }

    #[test]
    fn config_defaults_to_system_fonts() {
        let c = FontConfig::default();
        assert!(c.system_fonts);
        assert!(c.files.is_empty());
    }
}
