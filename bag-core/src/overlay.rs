use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Position or size in screen pixels, relative to the diagram container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub font_family: String,
    /// Pixels.
    pub font_size: f64,
    pub color: String,
    #[serde(default = "default_weight")]
    pub font_weight: String,
    #[serde(default)]
    pub rotation: f64,
}

fn default_weight() -> String {
    "normal".to_string()
}

impl Default for TextStyle {
    fn default() -> Self {
        TextStyle {
            font_family: "Arial".to_string(),
            font_size: 24.0,
            color: "#000000".to_string(),
            font_weight: default_weight(),
            rotation: 0.0,
        }
    }
}

impl TextStyle {
    /// CSS-like weight as a number: `bold` is 700, `normal` 400.
    pub fn weight(&self) -> u16 {
        match self.font_weight.trim().to_ascii_lowercase().as_str() {
            "bold" | "bolder" => 700,
            "normal" | "" => 400,
            "lighter" => 300,
            other => other.parse::<u16>().unwrap_or(400),
        }
    }

    pub fn is_bold(&self) -> bool {
        self.weight() >= 600
    }

    /// `#rgb` or `#rrggbb` as 0..1 floats.
    pub fn rgb(&self) -> Option<(f32, f32, f32)> {
        let hex = self.color.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0);
        match hex.len() {
            3 => {
                let mut it = hex.chars().map(|c| {
                    let s = format!("{c}{c}");
                    channel(&s)
                });
                Some((it.next()??, it.next()??, it.next()??))
            }
            6 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OverlayKind {
    /// `src` is a data URL or a path to a bitmap file.
    Image { src: String },
    #[serde(rename_all = "camelCase")]
    Text { text: String, text_style: TextStyle },
}

/// A logo or text element placed over the blueprint in screen space.
///
/// For text, `rotation` and `text_style.rotation` always agree. On load a
/// missing outer `rotation` is taken from the style.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "OverlayRecord")]
pub struct Overlay {
    pub id: String,
    pub position: Point,
    pub size: Size,
    /// Degrees, clockwise.
    pub rotation: f64,
    #[serde(flatten)]
    pub kind: OverlayKind,
}

#[derive(Deserialize)]
struct OverlayRecord {
    id: String,
    position: Point,
    size: Size,
    #[serde(default)]
    rotation: Option<f64>,
    #[serde(flatten)]
    kind: OverlayKind,
}

impl From<OverlayRecord> for Overlay {
    fn from(r: OverlayRecord) -> Self {
        Overlay::assemble(r.id, r.position, r.size, r.rotation, r.kind)
    }
}

impl Overlay {
    /// Build an overlay, settling the rotation: an explicit `rotation` wins,
    /// otherwise a text style's rotation is used.
    pub fn assemble(
        id: String,
        position: Point,
        size: Size,
        rotation: Option<f64>,
        mut kind: OverlayKind,
    ) -> Self {
        let degrees = match (&kind, rotation) {
            (_, Some(r)) => r,
            (OverlayKind::Text { text_style, .. }, None) => text_style.rotation,
            (OverlayKind::Image { .. }, None) => 0.0,
        };
        let degrees = if degrees.is_finite() {
            degrees.rem_euclid(360.0)
        } else {
            0.0
        };
        if let OverlayKind::Text { text_style, .. } = &mut kind {
            text_style.rotation = degrees;
        }
        Overlay {
            id,
            position,
            size,
            rotation: degrees,
            kind,
        }
    }

    pub fn image(src: impl Into<String>, position: Point, size: Size) -> Self {
        Overlay {
            id: Uuid::new_v4().to_string(),
            position,
            size,
            rotation: 0.0,
            kind: OverlayKind::Image { src: src.into() },
        }
    }

    pub fn text(text: impl Into<String>, style: TextStyle, position: Point, size: Size) -> Self {
        let kind = OverlayKind::Text {
            text: text.into(),
            text_style: style,
        };
        Overlay::assemble(Uuid::new_v4().to_string(), position, size, None, kind)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees.rem_euclid(360.0);
        if let OverlayKind::Text { text_style, .. } = &mut self.kind {
            text_style.rotation = self.rotation;
        }
        self
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            OverlayKind::Image { .. } => "image",
            OverlayKind::Text { .. } => "text",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OverlayError {
    #[error("overlay id already in use: {0}")]
    DuplicateId(String),

    #[error("overlay not found: {0}")]
    NotFound(String),
}

/// Overlays in paint order: index 0 is the bottom layer, the last entry is
/// front-most.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverlayLayers {
    items: Vec<Overlay>,
}

impl OverlayLayers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the collection, rejecting repeated ids.
    pub fn from_vec(items: Vec<Overlay>) -> Result<Self, OverlayError> {
        let mut layers = Self::new();
        for o in items {
            layers.push(o)?;
        }
        Ok(layers)
    }

    /// Adds on top of the stack.
    pub fn push(&mut self, overlay: Overlay) -> Result<(), OverlayError> {
        if self.layer_of(&overlay.id).is_some() {
            return Err(OverlayError::DuplicateId(overlay.id));
        }
        self.items.push(overlay);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<Overlay, OverlayError> {
        let idx = self.index(id)?;
        Ok(self.items.remove(idx))
    }

    pub fn get(&self, id: &str) -> Option<&Overlay> {
        self.items.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Overlay> {
        self.items.iter_mut().find(|o| o.id == id)
    }

    pub fn layer_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|o| o.id == id)
    }

    pub fn bring_to_front(&mut self, id: &str) -> Result<(), OverlayError> {
        let idx = self.index(id)?;
        let o = self.items.remove(idx);
        self.items.push(o);
        Ok(())
    }

    pub fn send_to_back(&mut self, id: &str) -> Result<(), OverlayError> {
        let idx = self.index(id)?;
        let o = self.items.remove(idx);
        self.items.insert(0, o);
        Ok(())
    }

    pub fn move_up(&mut self, id: &str) -> Result<(), OverlayError> {
        let idx = self.index(id)?;
        if idx + 1 < self.items.len() {
            self.items.swap(idx, idx + 1);
        }
        Ok(())
    }

    pub fn move_down(&mut self, id: &str) -> Result<(), OverlayError> {
        let idx = self.index(id)?;
        if idx > 0 {
            self.items.swap(idx, idx - 1);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Overlay> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Overlay] {
        &self.items
    }

    fn index(&self, id: &str) -> Result<usize, OverlayError> {
        self.layer_of(id)
            .ok_or_else(|| OverlayError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn img(id: &str) -> Overlay {
        Overlay::image("logo.png", Point::default(), Size { width: 10.0, height: 10.0 }).with_id(id)
    }

    fn ids(l: &OverlayLayers) -> Vec<&str> {
        l.iter().map(|o| o.id.as_str()).collect()
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = Overlay::image("a", Point::default(), Size::default());
        let b = Overlay::image("a", Point::default(), Size::default());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut l = OverlayLayers::new();
        l.push(img("a")).unwrap();
        assert_eq!(l.push(img("a")), Err(OverlayError::DuplicateId("a".into())));
        assert!(OverlayLayers::from_vec(vec![img("x"), img("x")]).is_err());
    }

    #[test]
    fn z_order_moves() {
        let mut l = OverlayLayers::from_vec(vec![img("a"), img("b"), img("c")]).unwrap();
        l.bring_to_front("a").unwrap();
        assert_eq!(ids(&l), ["b", "c", "a"]);
        l.send_to_back("c").unwrap();
        assert_eq!(ids(&l), ["c", "b", "a"]);
        l.move_up("c").unwrap();
        assert_eq!(ids(&l), ["b", "c", "a"]);
        l.move_down("b").unwrap();
        assert_eq!(ids(&l), ["b", "c", "a"]);
        assert_eq!(l.layer_of("a"), Some(2));
        assert_eq!(l.remove("zz"), Err(OverlayError::NotFound("zz".into())));
        assert_eq!(l.remove("c").unwrap().id, "c");
        assert_eq!(l.len(), 2);
    }

    #[test]
    fn text_json_shape() {
        let json = r##"{
            "id": "t1", "type": "text",
            "position": {"x": 10, "y": 20}, "size": {"width": 100, "height": 50},
            "rotation": 45,
            "text": "Hello\nWorld",
            "textStyle": {"fontFamily": "Georgia", "fontSize": 18, "color": "#f00", "fontWeight": "bold", "rotation": 45}
        }"##;
        let o: Overlay = serde_json::from_str(json).unwrap();
        assert_eq!(o.rotation, 45.0);
        match &o.kind {
            OverlayKind::Text { text, text_style } => {
                assert_eq!(text, "Hello\nWorld");
                assert!(text_style.is_bold());
                assert_eq!(text_style.rgb(), Some((1.0, 0.0, 0.0)));
            }
            other => panic!("unexpected {other:?}"),
        }
        let back = serde_json::to_value(&o).unwrap();
        assert_eq!(back["type"], "text");
        assert_eq!(back["textStyle"]["fontFamily"], "Georgia");
    }

    #[test]
    fn style_rotation_applies_when_outer_is_missing() {
        let json = r##"{
            "id": "t2", "type": "text",
            "position": {"x": 0, "y": 0}, "size": {"width": 80, "height": 40},
            "text": "Sale",
            "textStyle": {"fontFamily": "Arial", "fontSize": 12, "color": "#000", "rotation": 30}
        }"##;
        let o: Overlay = serde_json::from_str(json).unwrap();
        assert_eq!(o.rotation, 30.0);

        // An explicit outer rotation wins and is copied into the style.
        let json = json.replace("\"text\": \"Sale\"", "\"rotation\": -90, \"text\": \"Sale\"");
        let o: Overlay = serde_json::from_str(&json).unwrap();
        assert_eq!(o.rotation, 270.0);
        match &o.kind {
            OverlayKind::Text { text_style, .. } => assert_eq!(text_style.rotation, 270.0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn colors_and_weights() {
        let mut s = TextStyle::default();
        assert_eq!(s.rgb(), Some((0.0, 0.0, 0.0)));
        s.color = "red".into();
        assert_eq!(s.rgb(), None);
        s.color = "#3366CC".into();
        let (r, g, b) = s.rgb().unwrap();
        assert!((r - 0.2).abs() < 1e-6 && (g - 0.4).abs() < 1e-6 && (b - 0.8).abs() < 1e-6);
        s.font_weight = "600".into();
        assert!(s.is_bold());
        s.font_weight = "normal".into();
        assert!(!s.is_bold());
    }

    #[test]
    fn rotation_wraps() {
        let o = img("r").with_rotation(-90.0);
        assert_eq!(o.rotation, 270.0);
    }
}
