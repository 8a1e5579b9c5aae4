//! Print export for the paper bag designer: a true-to-scale PDF of the
//! die-line with logo and text overlays, plus PNG previews.

pub mod config;
pub mod error;
pub mod fallback;
pub mod image;
pub mod page;
pub mod pdf;
mod preview;
pub mod text;

pub use config::ExportConfig;
pub use error::{ElementError, ExportError, RasterError};
pub use page::{Orientation, PageLayout, PageRect, expand_for_rotation, rotated_extent};
pub use pdf::{ElementFailure, ExportJob, ExportOutcome, Exporter, PlacedElement, Placement};
