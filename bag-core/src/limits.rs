//! Range checks applied at the boundary, before dimensions reach the
//! calculator. The calculator itself accepts anything finite.

use thiserror::Error;

use crate::dimensions::BagDimensions;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DimensionRange {
    pub min_mm: f64,
    pub max_mm: f64,
}

impl DimensionRange {
    pub fn contains(&self, v: f64) -> bool {
        v >= self.min_mm && v <= self.max_mm
    }

    pub fn clamp(&self, v: f64) -> f64 {
        v.clamp(self.min_mm, self.max_mm)
    }
}

// 6–21.65 in
pub const LENGTH_RANGE: DimensionRange = DimensionRange {
    min_mm: 152.4,
    max_mm: 549.9,
};
// 2–11.81 in
pub const WIDTH_RANGE: DimensionRange = DimensionRange {
    min_mm: 50.8,
    max_mm: 299.97,
};
// 6–22.14 in
pub const HEIGHT_RANGE: DimensionRange = DimensionRange {
    min_mm: 152.4,
    max_mm: 562.4,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Length,
    Width,
    Height,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Field::Length => "length",
            Field::Width => "width",
            Field::Height => "tabside height",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: Field, value: f64 },

    #[error("{field} {value} mm is outside {min} to {max} mm")]
    OutOfRange {
        field: Field,
        value: f64,
        min: f64,
        max: f64,
    },
}

fn fields(d: &BagDimensions) -> [(Field, f64, DimensionRange); 3] {
    [
        (Field::Length, d.length, LENGTH_RANGE),
        (Field::Width, d.width, WIDTH_RANGE),
        (Field::Height, d.height, HEIGHT_RANGE),
    ]
}

/// Reports the first field that is not finite or not within its range.
pub fn validate(d: &BagDimensions) -> Result<(), ValidationError> {
    for (field, value, range) in fields(d) {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite { field, value });
        }
        if !range.contains(value) {
            return Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.min_mm,
                max: range.max_mm,
            });
        }
    }
    Ok(())
}

/// Pulls every field into its range. Non-finite values land on the minimum.
pub fn clamp(d: &BagDimensions) -> BagDimensions {
    let fix = |v: f64, r: DimensionRange| if v.is_finite() { r.clamp(v) } else { r.min_mm };
    BagDimensions {
        length: fix(d.length, LENGTH_RANGE),
        width: fix(d.width, WIDTH_RANGE),
        height: fix(d.height, HEIGHT_RANGE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(validate(&BagDimensions::default()), Ok(()));
    }

    #[test]
    fn reports_offending_field() {
        let err = validate(&BagDimensions::new(310.0, 10.0, 300.0)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::OutOfRange {
                field: Field::Width,
                value: 10.0,
                min: 50.8,
                max: 299.97
            }
        );
        assert_eq!(err.to_string(), "width 10 mm is outside 50.8 to 299.97 mm");
    }

    #[test]
    fn rejects_nan() {
        let err = validate(&BagDimensions::new(f64::NAN, 100.0, 300.0)).unwrap_err();
        assert!(matches!(err, ValidationError::NotFinite { field: Field::Length, .. }));
    }

    #[test]
    fn clamps_into_range() {
        let c = clamp(&BagDimensions::new(1000.0, 0.0, f64::INFINITY));
        assert_eq!(c, BagDimensions::new(549.9, 50.8, 152.4));
        assert_eq!(validate(&c), Ok(()));
    }

    #[test]
    fn inch_bounds_match() {
        let lo = BagDimensions::from_inches(6.01, 2.01, 6.01);
        let hi = BagDimensions::from_inches(21.65, 11.81, 22.14);
        assert!(validate(&lo).is_ok());
        assert!((hi.length - LENGTH_RANGE.max_mm).abs() < 0.05);
        assert!((hi.width - WIDTH_RANGE.max_mm).abs() < 0.05);
        assert!((hi.height - HEIGHT_RANGE.max_mm).abs() < 0.05);
    }
}
