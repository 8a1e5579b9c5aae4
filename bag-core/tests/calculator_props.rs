use bag_core::limits::{HEIGHT_RANGE, LENGTH_RANGE, WIDTH_RANGE};
use bag_core::{BagDimensions, calculate, render};
use proptest::prelude::*;

fn valid_dimensions() -> impl Strategy<Value = BagDimensions> {
    (
        LENGTH_RANGE.min_mm..=LENGTH_RANGE.max_mm,
        WIDTH_RANGE.min_mm..=WIDTH_RANGE.max_mm,
        HEIGHT_RANGE.min_mm..=HEIGHT_RANGE.max_mm,
    )
        .prop_map(|(l, w, h)| BagDimensions::new(l, w, h))
}

proptest! {
    #[test]
    fn total_width_formula(d in valid_dimensions()) {
        let c = calculate(&d);
        prop_assert_eq!(c.total_width_mm, 2.0 * d.width + 2.0 * d.length + 40.0);
    }

    #[test]
    fn tab_length_formula(d in valid_dimensions()) {
        prop_assert_eq!(calculate(&d).tab_length_mm, d.width / 2.0 + 20.0);
    }

    #[test]
    fn total_height_formula(d in valid_dimensions()) {
        let c = calculate(&d);
        prop_assert_eq!(c.total_height_mm, d.height + c.tab_length_mm);
        prop_assert!(c.total_height_mm > d.height);
    }

    #[test]
    fn panel_widths_sum(d in valid_dimensions()) {
        let c = calculate(&d);
        let sum = c.section_width(0).unwrap()
            + c.section_width(1).unwrap()
            + c.section_width(2).unwrap()
            + c.section_width(3).unwrap();
        prop_assert!((sum + 40.0 - c.total_width_mm).abs() < 1e-9);
    }

    #[test]
    fn default_total_width_label(h in HEIGHT_RANGE.min_mm..=HEIGHT_RANGE.max_mm) {
        let c = calculate(&BagDimensions::new(310.0, 155.0, h));
        let expected = format!("38.17 in ({} mm)", c.total_width_mm.round());
        prop_assert_eq!(c.formatted.total_width, expected);
    }

    #[test]
    fn renderer_never_diverges_from_calculator(d in valid_dimensions()) {
        let c = calculate(&d);
        let b = render(&d, &c, None);
        for (p, s) in b.panels.iter().zip(c.sections.iter()) {
            prop_assert_eq!(p.x, s.start_mm);
            prop_assert_eq!(p.width, s.width_mm);
        }
        prop_assert!(b.frame.width > c.total_width_mm);
        prop_assert!(b.frame.height > c.total_height_mm);
    }
}
