//! Property tests for angle wrapping and step conversions.

use altaz_motion::astro::coords::{normalize_180, shortest_delta, wrap_360};
use altaz_motion::config::AxisCalibration;
use altaz_motion::{Axis, MotionEngine, MountConfig};
use proptest::prelude::*;

fn engine(steps_per_degree: f64, az_home: i64, alt_home: i64) -> MotionEngine {
    MotionEngine::new(&MountConfig {
        calibration: Some(AxisCalibration {
            steps_per_degree_az: steps_per_degree,
            steps_per_degree_alt: steps_per_degree,
            az_home_offset: az_home,
            alt_home_offset: alt_home,
        }),
        ..MountConfig::default()
    })
}

proptest! {
    #[test]
    fn wrap_stays_in_range(deg in -1.0e6f64..1.0e6) {
        let wrapped = wrap_360(deg);
        prop_assert!((0.0..360.0).contains(&wrapped));

        let folded = normalize_180(deg);
        prop_assert!((-180.0..180.0).contains(&folded));

        let delta = shortest_delta(0.0, deg);
        prop_assert!(delta > -180.0 && delta <= 180.0);
    }

    #[test]
    fn azimuth_steps_to_degrees_is_wrapped(
        steps in -10_000_000i64..10_000_000,
        spd in 1.0f64..2000.0,
        home in -100_000i64..100_000,
    ) {
        let engine = engine(spd, home, 0);
        let deg = engine.steps_to_degrees(Axis::Azimuth, steps);
        prop_assert!((0.0..360.0).contains(&deg));
    }

    #[test]
    fn altitude_steps_to_degrees_is_normalized(
        steps in any::<i64>(),
        spd in 1.0e-3f64..1.0e4,
        home in any::<i64>(),
    ) {
        let engine = engine(spd, 0, home);
        let deg = engine.steps_to_degrees(Axis::Altitude, steps);
        prop_assert!((-180.0..=180.0).contains(&deg), "altitude {}", deg);
    }

    #[test]
    fn azimuth_extreme_counts_stay_wrapped(
        steps in any::<i64>(),
        spd in 1.0e-3f64..1.0e4,
        home in any::<i64>(),
    ) {
        let engine = engine(spd, home, 0);
        let deg = engine.steps_to_degrees(Axis::Azimuth, steps);
        prop_assert!((0.0..360.0).contains(&deg), "azimuth {}", deg);
    }

    #[test]
    fn azimuth_round_trip_within_half_step(
        deg in 0.0f64..360.0,
        spd in 1.0f64..2000.0,
        home in -100_000i64..100_000,
    ) {
        let engine = engine(spd, home, 0);
        let steps = engine.degrees_to_steps(Axis::Azimuth, deg);
        let back = engine.steps_to_degrees(Axis::Azimuth, steps);
        prop_assert!(shortest_delta(deg, back).abs() <= 0.5 / spd + 1e-9);
    }

    #[test]
    fn altitude_round_trip_within_half_step(
        deg in -90.0f64..90.0,
        spd in 1.0f64..2000.0,
        home in -100_000i64..100_000,
    ) {
        let engine = engine(spd, 0, home);
        let steps = engine.degrees_to_steps(Axis::Altitude, deg);
        let back = engine.steps_to_degrees(Axis::Altitude, steps);
        prop_assert!((back - deg).abs() <= 0.5 / spd + 1e-9);
    }

    #[test]
    fn whole_degree_steps_round_trip_exactly(
        spd in 1u32..2000,
        offset in 0i64..360,
    ) {
        // Integer steps per degree: every whole-degree count maps back to itself
        let engine = engine(spd as f64, 0, 0);
        let steps = offset * spd as i64;
        let deg = engine.steps_to_degrees(Axis::Azimuth, steps);
        prop_assert_eq!(engine.degrees_to_steps(Axis::Azimuth, deg), steps);
    }
}
