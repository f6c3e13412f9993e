//! Property tests for the open-rectangle geometry `TownController` relies on
//! for conversation-area overlap rejection and spatial auto-enrollment.

use proptest::prelude::*;
use town_server::model::BoundingBox;

fn arb_bbox() -> impl Strategy<Value = BoundingBox> {
    (-100.0f64..100.0, -100.0f64..100.0, 0.1f64..50.0, 0.1f64..50.0)
        .prop_map(|(x, y, width, height)| BoundingBox::new(x, y, width, height))
}

proptest! {
    #[test]
    fn overlap_is_symmetric(a in arb_bbox(), b in arb_bbox()) {
        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
    }

    #[test]
    fn every_box_overlaps_itself(a in arb_bbox()) {
        prop_assert!(a.overlaps(&a));
    }

    #[test]
    fn center_is_always_strictly_contained(a in arb_bbox()) {
        prop_assert!(a.strictly_contains(a.x, a.y));
    }

    #[test]
    fn points_far_outside_are_never_contained(a in arb_bbox(), dx in 1000.0f64..2000.0) {
        prop_assert!(!a.strictly_contains(a.x + dx, a.y));
    }

    #[test]
    fn disjoint_on_one_axis_implies_no_overlap(
        a in arb_bbox(),
        gap in 0.01f64..10.0,
    ) {
        // Shift `b` far enough on the x-axis that the two boxes cannot overlap.
        let b = BoundingBox::new(a.x + a.width / 2.0 + b_half_width(&a) + gap, a.y, a.width, a.height);
        prop_assert!(!a.overlaps(&b));
    }
}

fn b_half_width(a: &BoundingBox) -> f64 {
    a.width / 2.0
}
