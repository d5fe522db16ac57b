use loctrack_core::model::{Fix, NewSample};
use proptest::prelude::*;

proptest! {
    #[test]
    fn in_range_fixes_are_usable(
        lat in -90.0f64..=90.0,
        lon in -180.0f64..=180.0,
        acc in 0.0f32..10_000.0,
    ) {
        prop_assert!(Fix::new(lat, lon, acc).is_usable());
    }

    #[test]
    fn out_of_range_latitude_is_rejected(
        lat in prop_oneof![90.000_001f64..1e6, -1e6f64..-90.000_001],
        lon in -180.0f64..=180.0,
    ) {
        prop_assert!(!Fix::new(lat, lon, 1.0).is_usable());
    }

    #[test]
    fn sample_timestamp_always_comes_from_capture_time(
        source_time in any::<i64>(),
        captured in any::<i64>(),
    ) {
        let fix = Fix { time_ms: Some(source_time), ..Fix::new(10.0, 20.0, 3.0) };
        prop_assert_eq!(NewSample::from_fix(&fix, captured).timestamp, captured);
    }
}
