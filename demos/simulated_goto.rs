//! Simulated GOTO example.
//!
//! Loads a mount configuration from TOML, slews to a star with the step
//! scheduler driving in-memory pins, and lets the mount settle into tracking.
//!
//! No hardware is required: pins only count edges.

use altaz_motion::{
    astro::{Equatorial, KeplerEphemeris, Planet, Target},
    motion::TrapezoidalProfile,
    parse_config, Axis, AxisDriver, MotionEngine, MountController, MountState, StepScheduler,
    Wake,
};
use chrono::{Duration, TimeZone, Utc};

/// Delay provider that returns immediately.
struct NoDelay;

impl embedded_hal::delay::DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// Output pin that counts rising edges.
struct CountingPin {
    high: bool,
    rising_edges: u64,
}

impl CountingPin {
    fn new() -> Self {
        Self {
            high: false,
            rising_edges: 0,
        }
    }
}

impl embedded_hal::digital::OutputPin for CountingPin {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        if !self.high {
            self.rising_edges += 1;
        }
        self.high = true;
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        Ok(())
    }
}

impl embedded_hal::digital::ErrorType for CountingPin {
    type Error = core::convert::Infallible;
}

const MOUNT_TOML: &str = r#"
[drive]
steps_per_revolution = 200
microsteps = 16
gear_ratio = 4.5

[calibration]
steps_per_degree_az = 40.0
steps_per_degree_alt = 40.0
az_home_offset = 0
alt_home_offset = 0

[backlash]
az_steps = 12
alt_steps = 8

[goto_profile]
max_speed_deg_per_sec = 6.0
acceleration_deg_per_sec2 = 3.0
deceleration_deg_per_sec2 = 2.0

[goto]
min_altitude_deg = 10.0
arrival_margin_sec = 1.0

[observer]
latitude_deg = 52.52
longitude_deg = 13.40
timezone_offset_minutes = 60
dst = "auto"
"#;

const TICK_US: u64 = 20_000;

fn main() {
    // Library log points go through `tracing`; RUST_LOG=altaz_motion=debug shows more
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "altaz_motion=info".to_string()),
        )
        .init();

    println!("=== Simulated GOTO Example ===\n");

    let config = parse_config(MOUNT_TOML).expect("Failed to parse mount config");
    let engine = MotionEngine::new(&config);
    let driver = || AxisDriver::new(CountingPin::new(), CountingPin::new(), NoDelay, false);
    let mut scheduler = StepScheduler::new(driver(), driver(), &config.scheduler);
    let mut mount = MountController::new(&config, KeplerEphemeris);

    println!(
        "Calibration: {} steps/deg az, {} steps/deg alt",
        engine.steps_per_degree(Axis::Azimuth),
        engine.steps_per_degree(Axis::Altitude)
    );

    // Slew profile for a 90° move
    let profile = TrapezoidalProfile::for_goto(90.0, &config.goto_profile);
    println!("\n=== 90° Slew Profile ===");
    println!("Peak speed: {:.2} deg/s", profile.peak_speed);
    println!("Acceleration: {:.2} s", profile.accel_time);
    println!("Cruise: {:.2} s", profile.cruise_time);
    println!("Deceleration: {:.2} s", profile.decel_time);
    println!("Total: {:.2} s", profile.duration_secs());

    // Where are the planets?
    let start = Utc
        .with_ymd_and_hms(2024, 1, 15, 20, 0, 0)
        .single()
        .expect("Valid instant");
    println!("\n=== Sky at {:?} ===", start);
    for planet in [Planet::Jupiter, Planet::Saturn, Planet::Mars] {
        match mount.sky().apparent(&Target::Body(planet), &start) {
            Ok(h) => println!("{:>8}: az {:7.2}°  alt {:6.2}°", planet.name(), h.az_deg, h.alt_deg),
            Err(e) => println!("{:>8}: {}", planet.name(), e),
        }
    }

    // GOTO Aldebaran
    let target = Target::Coordinates(Equatorial::new(4.598_7, 16.509_3));
    let plan = mount
        .goto(&engine, target, &start)
        .expect("GOTO should be accepted");
    println!("\n=== GOTO ===");
    println!(
        "Target: az {:.3}° alt {:.3}° (estimated {:.2} s)",
        plan.target.az_deg, plan.target.alt_deg, plan.estimated_duration_secs
    );

    let mut monotonic_us = 0u64;
    let mut state = MountState::Slewing;
    while state == MountState::Slewing && monotonic_us < 120_000_000 {
        let now = start + Duration::microseconds(monotonic_us as i64);
        state = mount
            .tick(&engine, &now, monotonic_us)
            .expect("Tick should succeed");

        let until = monotonic_us + TICK_US;
        let mut t = monotonic_us;
        while let Wake::At(due) = scheduler.poll(&engine, t) {
            if due >= until {
                break;
            }
            t = due;
        }
        monotonic_us = until;

        if monotonic_us % 2_000_000 == 0 {
            println!(
                "t = {:5.1} s  az {:8.3}°  alt {:7.3}°",
                monotonic_us as f64 * 1e-6,
                engine.position_degrees(Axis::Azimuth),
                engine.position_degrees(Axis::Altitude)
            );
        }
    }

    println!("\nSlew finished after {:.2} s, mount is {:?}", monotonic_us as f64 * 1e-6, state);
    println!(
        "Position: az {:.3}° alt {:.3}°",
        engine.position_degrees(Axis::Azimuth),
        engine.position_degrees(Axis::Altitude)
    );
    let tracking = mount.tracking().state();
    println!(
        "Tracking offsets: az {:.4}° alt {:.4}°",
        tracking.offset_az_deg, tracking.offset_alt_deg
    );

    // Textual command surface
    println!("\n=== Commands ===");
    for (name, params) in [
        ("GET_STEP_COUNT", &["AZ"][..]),
        ("GET_STEP_COUNT", &["ALT"][..]),
        ("GET_LAST_DIR", &["AZ"][..]),
        ("GET_BACKLASH", &["ALT"][..]),
        ("SET_SPEED", &["AZ"][..]),
    ] {
        match mount.handle_request(&engine, name, params, monotonic_us) {
            Ok(reply) => println!("{} {:?} -> {}", name, params, reply),
            Err(e) => println!("{} {:?} -> error: {}", name, params, e),
        }
    }

    let [az, alt] = scheduler.release();
    let (az_step, _, _) = az.release();
    let (alt_step, _, _) = alt.release();
    println!(
        "\nSTEP pulses emitted: az {}, alt {}",
        az_step.rising_edges, alt_step.rising_edges
    );
}
