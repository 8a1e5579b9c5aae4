//! Committed dimensions versus provisional edits. The provisional overlay is
//! merged only when rendering; the committed value changes on `apply_edit`.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::blueprint::{self, Blueprint};
use crate::dimensions::{BagDimensions, CalculatedDimensions, calculate};
use crate::limits::{self, ValidationError};
use crate::overlay::OverlayLayers;

/// Field-by-field override; `None` falls back to the committed value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionEdit {
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl DimensionEdit {
    pub fn is_empty(&self) -> bool {
        self.length.is_none() && self.width.is_none() && self.height.is_none()
    }

    pub fn resolve(&self, committed: &BagDimensions) -> BagDimensions {
        BagDimensions {
            length: self.length.unwrap_or(committed.length),
            width: self.width.unwrap_or(committed.width),
            height: self.height.unwrap_or(committed.height),
        }
    }
}

/// State of one design being edited: the committed bag size, an optional
/// pending edit and the overlays placed on the blueprint.
#[derive(Clone, Debug, Default)]
pub struct DesignSession {
    committed: BagDimensions,
    calculated: Option<CalculatedDimensions>,
    edit: Option<DimensionEdit>,
    pub overlays: OverlayLayers,
}

impl DesignSession {
    pub fn new(committed: BagDimensions, overlays: OverlayLayers) -> Self {
        DesignSession {
            committed,
            calculated: Some(calculate(&committed)),
            edit: None,
            overlays,
        }
    }

    pub fn committed(&self) -> &BagDimensions {
        &self.committed
    }

    pub fn calculated(&mut self) -> &CalculatedDimensions {
        let committed = self.committed;
        self.calculated.get_or_insert_with(|| calculate(&committed))
    }

    pub fn pending_edit(&self) -> Option<&DimensionEdit> {
        self.edit.as_ref()
    }

    pub fn begin_edit(&mut self) {
        self.edit.get_or_insert_with(DimensionEdit::default);
    }

    pub fn set_length(&mut self, mm: f64) {
        self.edit.get_or_insert_with(DimensionEdit::default).length = Some(mm);
    }

    pub fn set_width(&mut self, mm: f64) {
        self.edit.get_or_insert_with(DimensionEdit::default).width = Some(mm);
    }

    pub fn set_height(&mut self, mm: f64) {
        self.edit.get_or_insert_with(DimensionEdit::default).height = Some(mm);
    }

    /// What the blueprint should show right now.
    pub fn preview_dimensions(&self) -> BagDimensions {
        self.edit
            .map(|e| e.resolve(&self.committed))
            .unwrap_or(self.committed)
    }

    /// Validates the merged value and commits it. On error the pending edit
    /// is kept so the caller can correct it.
    pub fn apply_edit(&mut self) -> Result<BagDimensions, ValidationError> {
        let Some(edit) = self.edit else {
            return Ok(self.committed);
        };
        let merged = edit.resolve(&self.committed);
        limits::validate(&merged)?;
        info!(
            length = merged.length,
            width = merged.width,
            height = merged.height,
            "dimensions committed"
        );
        self.committed = merged;
        self.calculated = Some(calculate(&merged));
        self.edit = None;
        Ok(merged)
    }

    pub fn discard_edit(&mut self) {
        if self.edit.take().is_some() {
            debug!("pending dimension edit discarded");
        }
    }

    pub fn render(&mut self) -> Blueprint {
        let edit = self.edit;
        let committed = self.committed;
        let calc = self.calculated().clone();
        blueprint::render(&committed, &calc, edit.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_falls_back_per_field() {
        let c = BagDimensions::new(300.0, 150.0, 400.0);
        let e = DimensionEdit {
            height: Some(350.0),
            ..Default::default()
        };
        assert_eq!(e.resolve(&c), BagDimensions::new(300.0, 150.0, 350.0));
        assert!(DimensionEdit::default().is_empty());
    }

    #[test]
    fn edits_stay_provisional_until_applied() {
        let mut s = DesignSession::new(BagDimensions::default(), OverlayLayers::new());
        s.set_width(200.0);
        assert_eq!(s.committed().width, 155.0);
        assert_eq!(s.preview_dimensions().width, 200.0);
        assert!(s.render().preview);

        let applied = s.apply_edit().unwrap();
        assert_eq!(applied.width, 200.0);
        assert_eq!(s.committed().width, 200.0);
        assert!(s.pending_edit().is_none());
        assert_eq!(s.calculated().tab_length_mm, 120.0);
        assert!(!s.render().preview);
    }

    #[test]
    fn invalid_edit_is_kept_for_correction() {
        let mut s = DesignSession::new(BagDimensions::default(), OverlayLayers::new());
        s.set_length(10.0);
        assert!(s.apply_edit().is_err());
        assert_eq!(s.committed().length, 310.0);
        assert_eq!(s.pending_edit().and_then(|e| e.length), Some(10.0));
        s.discard_edit();
        assert_eq!(s.preview_dimensions(), BagDimensions::default());
    }
}
