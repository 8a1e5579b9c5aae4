//! Saved-design wire shape. Stored logos name their text fields `content`
//! and `style` where the in-memory overlay uses `text` and `textStyle`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dimensions::BagDimensions;
use crate::edit::DesignSession;
use crate::overlay::{Overlay, OverlayError, OverlayKind, OverlayLayers, Point, Size, TextStyle};

#[derive(Error, Debug)]
pub enum DesignError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Overlay(#[from] OverlayError),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoredLogoKind {
    Image { src: String },
    Text { content: String, style: TextStyle },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredLogo {
    pub id: String,
    pub position: Point,
    pub size: Size,
    /// Absent in older records; text then uses `style.rotation`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(flatten)]
    pub kind: StoredLogoKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DesignRecord {
    pub dimensions: BagDimensions,
    #[serde(default)]
    pub logos: Vec<StoredLogo>,
}

impl From<StoredLogo> for Overlay {
    fn from(l: StoredLogo) -> Self {
        let kind = match l.kind {
            StoredLogoKind::Image { src } => OverlayKind::Image { src },
            StoredLogoKind::Text { content, style } => OverlayKind::Text {
                text: content,
                text_style: style,
            },
        };
        Overlay::assemble(l.id, l.position, l.size, l.rotation, kind)
    }
}

impl From<&Overlay> for StoredLogo {
    fn from(o: &Overlay) -> Self {
        let kind = match &o.kind {
            OverlayKind::Image { src } => StoredLogoKind::Image { src: src.clone() },
            OverlayKind::Text { text, text_style } => StoredLogoKind::Text {
                content: text.clone(),
                style: text_style.clone(),
            },
        };
        StoredLogo {
            id: o.id.clone(),
            position: o.position,
            size: o.size,
            rotation: Some(o.rotation),
            kind,
        }
    }
}

impl DesignRecord {
    pub fn from_json(s: &str) -> Result<Self, DesignError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json(&self) -> Result<String, DesignError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_session(session: &DesignSession) -> Self {
        DesignRecord {
            dimensions: *session.committed(),
            logos: session.overlays.iter().map(StoredLogo::from).collect(),
        }
    }

    /// Overlays in stored order, which is also layer order.
    pub fn overlays(&self) -> Result<OverlayLayers, DesignError> {
        let items = self.logos.iter().cloned().map(Overlay::from).collect();
        Ok(OverlayLayers::from_vec(items)?)
    }

    pub fn into_session(self) -> Result<DesignSession, DesignError> {
        let overlays = self.overlays()?;
        Ok(DesignSession::new(self.dimensions, overlays))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = r##"{
        "dimensions": {"length": 310, "width": 155, "height": 400},
        "logos": [
            {"id": "a", "type": "image", "src": "data:image/png;base64,AAAA", "rotation": 0,
             "position": {"x": 1, "y": 2}, "size": {"width": 30, "height": 40}},
            {"id": "b", "type": "text", "content": "Hi", "rotation": 30,
             "style": {"fontFamily": "Arial", "fontSize": 20, "color": "#123456", "fontWeight": "normal", "rotation": 30},
             "position": {"x": 5, "y": 6}, "size": {"width": 80, "height": 20}}
        ]
    }"##;

    #[test]
    fn renames_text_fields_on_load() {
        let rec = DesignRecord::from_json(RECORD).unwrap();
        let layers = rec.overlays().unwrap();
        let b = layers.get("b").unwrap();
        match &b.kind {
            OverlayKind::Text { text, text_style } => {
                assert_eq!(text, "Hi");
                assert_eq!(text_style.color, "#123456");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(layers.layer_of("a"), Some(0));
        let mem = serde_json::to_value(b).unwrap();
        assert_eq!(mem["text"], "Hi");
        assert!(mem.get("content").is_none());
    }

    #[test]
    fn session_round_trip_keeps_wire_names() {
        let rec = DesignRecord::from_json(RECORD).unwrap();
        let session = rec.clone().into_session().unwrap();
        let back = DesignRecord::from_session(&session);
        assert_eq!(back, rec);
        let json = back.to_json().unwrap();
        assert!(json.contains("\"content\""));
        assert!(json.contains("\"style\""));
        assert!(!json.contains("textStyle"));
    }

    #[test]
    fn older_text_logos_take_rotation_from_style() {
        let json = r##"{"dimensions": {"length": 310, "width": 155, "height": 400},
            "logos": [
              {"id": "t", "type": "text", "content": "Hi",
               "style": {"fontFamily": "Arial", "fontSize": 20, "color": "#000", "rotation": 45},
               "position": {"x": 0, "y": 0}, "size": {"width": 80, "height": 20}}
            ]}"##;
        let rec = DesignRecord::from_json(json).unwrap();
        assert_eq!(rec.logos[0].rotation, None);
        let layers = rec.overlays().unwrap();
        assert_eq!(layers.get("t").unwrap().rotation, 45.0);
    }

    #[test]
    fn duplicate_logo_ids_are_rejected() {
        let json = r#"{"dimensions": {"length": 310, "width": 155, "height": 400},
            "logos": [
              {"id": "a", "type": "image", "src": "x", "position": {"x": 0, "y": 0}, "size": {"width": 1, "height": 1}},
              {"id": "a", "type": "image", "src": "y", "position": {"x": 0, "y": 0}, "size": {"width": 1, "height": 1}}
            ]}"#;
        let rec = DesignRecord::from_json(json).unwrap();
        assert!(matches!(rec.overlays(), Err(DesignError::Overlay(OverlayError::DuplicateId(_)))));
    }
}
