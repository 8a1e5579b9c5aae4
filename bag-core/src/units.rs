/// Unit conversions shared by the calculator, the renderer and the exporter.
/// Millimeters are the only computation unit; inches are derived for display
/// and page sizing.
pub const MM_PER_INCH: f64 = 25.4;
pub const MM_TO_IN: f64 = 1.0 / MM_PER_INCH;
/// PDF user space unit.
pub const POINTS_PER_INCH: f64 = 72.0;

pub fn mm_to_inches(mm: f64) -> f64 {
    mm * MM_TO_IN
}

pub fn inches_to_mm(inches: f64) -> f64 {
    inches * MM_PER_INCH
}

pub fn inches_to_points(inches: f64) -> f64 {
    inches * POINTS_PER_INCH
}

pub fn round_to(v: f64, decimals: i32) -> f64 {
    let f = 10f64.powi(decimals);
    (v * f).round() / f
}

// Rounds to an integer without producing a negative zero in labels.
pub(crate) fn whole_mm(mm: f64) -> f64 {
    let r = mm.round();
    if r == 0.0 { 0.0 } else { r }
}

/// `"X.XX in (Y mm)"` with inches at two decimals and millimeters rounded to
/// the nearest integer.
pub fn format_measurement(mm: f64) -> String {
    format_with_inches(mm_to_inches(mm), mm)
}

pub(crate) fn format_with_inches(inches: f64, mm: f64) -> String {
    let inches = if inches.abs() < 0.005 { 0.0 } else { inches };
    format!("{:.2} in ({:.0} mm)", inches, whole_mm(mm))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_inches_and_mm() {
        assert_eq!(format_measurement(254.0), "10.00 in (254 mm)");
        assert_eq!(format_measurement(640.0), "25.20 in (640 mm)");
        assert_eq!(format_measurement(155.0), "6.10 in (155 mm)");
    }

    #[test]
    fn zero_is_not_negative() {
        assert_eq!(format_measurement(-0.2), "0.00 in (0 mm)");
    }

    #[test]
    fn two_decimal_inches_survive_round_trips() {
        for hundredths in 600..=2165 {
            let inches = hundredths as f64 / 100.0;
            let mm = inches_to_mm(inches);
            let once = inches_to_mm(round_to(mm_to_inches(mm), 2));
            let twice = inches_to_mm(round_to(mm_to_inches(once), 2));
            assert!((twice - mm).abs() <= 0.01, "{inches} in drifted to {twice} mm");
        }
    }
}
