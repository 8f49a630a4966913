//! Integration tests for altaz-motion
//!
//! These tests drive the complete stack, from TOML parsing through the GOTO
//! planner and step scheduler to the tracking hand-off.

use core::convert::Infallible;

use altaz_motion::astro::{Equatorial, Horizontal, KeplerEphemeris, SkyModel, Target};
use altaz_motion::config::{AxisCalibration, BacklashConfig, ObserverConfig};
use altaz_motion::config::units::Microsteps;
use altaz_motion::error::{ConfigError, Error};
use altaz_motion::motor::RateSource;
use altaz_motion::{
    parse_config, repair, Axis, AxisDriver, GotoPlanner, GotoStatus, MotionEngine, MountConfig,
    MountController, MountState, StepScheduler, TrapezoidalProfile, Wake,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use embedded_hal::digital::{ErrorType, OutputPin};
use embedded_hal_mock::eh1::delay::NoopDelay;
use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};

// =============================================================================
// Test configuration data
// =============================================================================

const MOUNT_CONFIG: &str = r#"
[drive]
steps_per_revolution = 200
microsteps = 32
gear_ratio = 100.0
invert_alt = true

[calibration]
steps_per_degree_az = 1777.7778
steps_per_degree_alt = 1777.7778
az_home_offset = 0
alt_home_offset = -1200

[backlash]
az_steps = 40
alt_steps = 25

[goto_profile]
max_speed_deg_per_sec = 4.0
acceleration_deg_per_sec2 = 2.0
deceleration_deg_per_sec2 = 1.5

[goto]
min_altitude_deg = 10.0
arrival_margin_sec = 2.0

[observer]
latitude_deg = 52.52
longitude_deg = 13.40
timezone_offset_minutes = 60
dst = "auto"

[scheduler]
command_timeout_ms = 2000
"#;

const TICK_US: u64 = 10_000;

fn calibrated(steps_per_degree: f64) -> MountConfig {
    MountConfig {
        calibration: Some(AxisCalibration {
            steps_per_degree_az: steps_per_degree,
            steps_per_degree_alt: steps_per_degree,
            az_home_offset: 0,
            alt_home_offset: 0,
        }),
        observer: ObserverConfig {
            latitude_deg: 52.52,
            longitude_deg: 13.40,
            ..ObserverConfig::default()
        },
        ..MountConfig::default()
    }
}

fn pin(expectations: &[Transaction]) -> PinMock {
    PinMock::new(expectations)
}

fn reference_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 20, 0, 0).unwrap()
}

// =============================================================================
// Simulated hardware
// =============================================================================

/// Output pin that only remembers its level.
#[derive(Debug, Default)]
struct SimPin {
    high: bool,
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        Ok(())
    }
}

type SimScheduler = StepScheduler<SimPin, SimPin, NoopDelay>;

fn sim_scheduler(config: &MountConfig) -> SimScheduler {
    let driver = || AxisDriver::new(SimPin::default(), SimPin::default(), NoopDelay::new(), false);
    StepScheduler::new(driver(), driver(), &config.scheduler)
}

/// Run the scheduler from `from_us` up to (excluding) `to_us`.
fn run_steps(engine: &MotionEngine, scheduler: &mut SimScheduler, from_us: u64, to_us: u64) {
    let mut now = from_us;
    while now < to_us {
        match scheduler.poll(engine, now) {
            Wake::At(due) if due < to_us => now = due,
            _ => break,
        }
    }
}

// =============================================================================
// T001-T003: Configuration
// =============================================================================

#[test]
fn t001_parse_full_mount_config() {
    let config = parse_config(MOUNT_CONFIG).expect("Should parse mount config");

    assert_eq!(config.drive.steps_per_revolution, 200);
    assert_eq!(config.drive.microsteps, Microsteps::THIRTY_SECOND);
    assert!(config.drive.invert_alt);
    assert!(!config.drive.invert_az);

    let cal = config.calibration();
    assert!((cal.steps_per_degree_az - 1777.7778).abs() < 1e-9);
    assert_eq!(cal.alt_home_offset, -1200);

    assert_eq!(config.backlash, BacklashConfig { az_steps: 40, alt_steps: 25 });
    assert!((config.goto_profile.deceleration.value() - 1.5).abs() < 1e-12);
    assert!((config.goto.min_altitude.value() - 10.0).abs() < 1e-12);
    assert_eq!(config.scheduler.command_timeout_ms, Some(2000));
    assert!((config.observer.longitude_deg - 13.40).abs() < 1e-12);
}

#[test]
fn t002_parse_rejects_invalid_values() {
    let bad_microsteps = "[drive]\nmicrosteps = 3\n";
    assert!(matches!(
        parse_config(bad_microsteps),
        Err(Error::Config(ConfigError::ParseError(_)))
    ));

    let bad_calibration = "[calibration]\nsteps_per_degree_az = 0.0\nsteps_per_degree_alt = 10.0\naz_home_offset = 0\nalt_home_offset = 0\n";
    assert!(matches!(
        parse_config(bad_calibration),
        Err(Error::Config(ConfigError::InvalidStepsPerDegree { axis: Axis::Azimuth, .. }))
    ));
}

#[test]
fn t003_repair_restores_safe_defaults() {
    let mut config: MountConfig = toml::from_str(
        r#"
[backlash]
az_steps = -10
alt_steps = 5

[observer]
latitude_deg = 123.0
"#,
    )
    .expect("Should parse");

    assert!(altaz_motion::validate_config(&config).is_err());
    assert!(repair(&mut config));
    assert!(altaz_motion::validate_config(&config).is_ok());
    assert_eq!(config.backlash.az_steps, 0);
    assert_eq!(config.backlash.alt_steps, 5);
    assert!((config.observer.latitude_deg - ObserverConfig::default().latitude_deg).abs() < 1e-12);

    // Nothing left to fix
    assert!(!repair(&mut config));
}

// =============================================================================
// T010-T011: Sky model
// =============================================================================

#[test]
fn t010_reference_position_berlin() {
    // RA 5h30m, Dec +20° seen from 52.52 N, 13.40 E at 2024-01-15 20:00 UTC.
    // Reference: LST 68.1731°, hour angle -14.3269°.
    let sky = SkyModel::new(calibrated(100.0).observer, KeplerEphemeris);
    let target = Target::Coordinates(Equatorial::new(5.5, 20.0));
    let h = sky.horizontal(&target, &reference_instant()).unwrap();

    assert!((h.az_deg - 155.675_05).abs() < 0.05, "az {}", h.az_deg);
    assert!((h.alt_deg - 55.631_19).abs() < 0.05, "alt {}", h.alt_deg);
    assert!((sky.local_sidereal_deg(&reference_instant()) - 68.173_07).abs() < 0.01);
}

#[test]
fn t011_target_rises_in_the_east() {
    // Six hours before transit on the equator the target sits near due east
    let sky = SkyModel::new(calibrated(100.0).observer, KeplerEphemeris);
    let lst_hours = sky.local_sidereal_deg(&reference_instant()) / 15.0;
    let ra = (lst_hours + 6.0) % 24.0;
    let h = sky
        .horizontal(&Target::Coordinates(Equatorial::new(ra, 0.0)), &reference_instant())
        .unwrap();
    assert!((h.az_deg - 90.0).abs() < 0.01);
    assert!(h.alt_deg.abs() < 0.01);
}

// =============================================================================
// T020: Trapezoidal profile
// =============================================================================

#[test]
fn t020_trapezoid_durations() {
    // 10° at 3°/s, 1°/s²: 3 s up, 3 s down, 4.5° each, 1° cruise in 1/3 s
    let ten = TrapezoidalProfile::new(10.0, 3.0, 1.0, 1.0);
    assert!((ten.duration_secs() - (6.0 + 1.0 / 3.0)).abs() < 1e-9);

    // With 2°/s² ramps: 1.5 s each way, 2.25° each, 5.5° cruise in 11/6 s
    let ten_fast = TrapezoidalProfile::new(10.0, 3.0, 2.0, 2.0);
    assert!((ten_fast.duration_secs() - 4.833_333).abs() < 1e-5);

    // 1° never reaches cruise: triangle with 1°/s peak
    let one = TrapezoidalProfile::new(1.0, 3.0, 1.0, 1.0);
    assert!(one.is_triangular());
    assert!((one.duration_secs() - 2.0).abs() < 1e-9);
    assert!((one.peak_speed - 1.0).abs() < 1e-9);
}

// =============================================================================
// T030-T031: Engine and scheduler
// =============================================================================

#[test]
fn t030_stop_all_is_idempotent() {
    let engine = MotionEngine::new(&calibrated(100.0));
    engine.set_manual_rate(Axis::Azimuth, 120.0);
    engine.set_goto_steps_per_second(Axis::Altitude, -80.0);
    engine.set_tracking_enabled(true);
    engine.set_tracking_rates(0.004, 0.001);

    engine.stop_all();
    let snapshot = |e: &MotionEngine| {
        Axis::ALL.map(|axis| {
            [RateSource::Manual, RateSource::Goto, RateSource::Tracking]
                .map(|source| e.axis(axis).rate(source))
        })
    };
    let first = snapshot(&engine);
    engine.stop_all();
    assert_eq!(snapshot(&engine), first);
    assert_eq!(first, [[0.0; 3]; 2]);
    assert!(!engine.tracking_enabled());
}

#[test]
fn t031_exact_step_and_dir_sequence() {
    let engine = MotionEngine::new(&calibrated(100.0));

    let az_step = pin(&[
        Transaction::set(State::High),
        Transaction::set(State::Low),
        Transaction::set(State::High),
        Transaction::set(State::Low),
        Transaction::set(State::High),
        Transaction::set(State::Low),
        // Rest after the axis stops
        Transaction::set(State::Low),
    ]);
    let az_dir = pin(&[Transaction::set(State::High), Transaction::set(State::Low)]);
    let alt_step = pin(&[Transaction::set(State::Low)]);
    let alt_dir = pin(&[]);

    let mut scheduler = StepScheduler::new(
        AxisDriver::new(az_step, az_dir, NoopDelay::new(), false),
        AxisDriver::new(alt_step, alt_dir, NoopDelay::new(), false),
        &calibrated(100.0).scheduler,
    );

    engine.set_manual_rate(Axis::Azimuth, 1000.0);
    assert_eq!(scheduler.poll(&engine, 0), Wake::At(1000));
    assert_eq!(scheduler.poll(&engine, 500), Wake::At(1000));
    assert_eq!(scheduler.poll(&engine, 1000), Wake::At(2000));

    engine.set_manual_rate(Axis::Azimuth, -1000.0);
    assert_eq!(scheduler.poll(&engine, 2000), Wake::At(3000));

    engine.set_manual_rate(Axis::Azimuth, 0.0);
    assert_eq!(scheduler.poll(&engine, 2500), Wake::Idle);

    assert_eq!(engine.step_count(Axis::Azimuth), 1);
    assert_eq!(engine.last_direction(Axis::Azimuth), -1);
    // Never stepped: still the power-on direction
    assert_eq!(engine.last_direction(Axis::Altitude), 1);

    for driver in scheduler.release() {
        let (mut step, mut dir, _) = driver.release();
        step.done();
        dir.done();
    }
}

// =============================================================================
// T040-T041: GOTO through the scheduler
// =============================================================================

#[test]
fn t040_simulated_goto_reaches_target() {
    let config = calibrated(100.0);
    let engine = MotionEngine::new(&config);
    let mut scheduler = sim_scheduler(&config);
    let mut planner = GotoPlanner::new(config.goto_profile);

    planner.start(&engine, 10.0, 5.0).unwrap();
    let mut now = 0;
    let mut status = GotoStatus::Moving;
    while status == GotoStatus::Moving && now < 30_000_000 {
        status = planner.tick(&engine, TICK_US as f64 * 1e-6);
        run_steps(&engine, &mut scheduler, now, now + TICK_US);
        now += TICK_US;
    }

    assert_eq!(status, GotoStatus::Completed);
    assert!((engine.step_count(Axis::Azimuth) - 1000).abs() <= 1);
    assert!((engine.step_count(Axis::Altitude) - 500).abs() <= 1);
    // Closed-form estimate is 6.33 s; the closed loop lands close to it
    let elapsed = now as f64 * 1e-6;
    assert!(elapsed > 6.0 && elapsed < 9.0, "elapsed {}", elapsed);
    assert_eq!(engine.total_rate(Axis::Azimuth), 0.0);
}

#[test]
fn t041_backlash_overshoot_without_early_completion() {
    let mut config = calibrated(100.0);
    config.backlash = BacklashConfig {
        az_steps: 30,
        alt_steps: 0,
    };
    let engine = MotionEngine::new(&config);
    let mut scheduler = sim_scheduler(&config);

    // Leave the azimuth gear loaded in reverse
    engine.set_manual_rate(Axis::Azimuth, -200.0);
    run_steps(&engine, &mut scheduler, 0, 50_000);
    engine.set_manual_rate(Axis::Azimuth, 0.0);
    assert_eq!(engine.last_direction(Axis::Azimuth), -1);
    let start = engine.step_count(Axis::Azimuth);

    let mut planner = GotoPlanner::new(config.goto_profile);
    planner.start(&engine, 5.0, 0.0).unwrap();
    let az = *planner.axis(Axis::Azimuth);
    assert_eq!(az.final_target, 500);
    assert_eq!(az.compensated_target, 530);
    assert!(az.compensation_pending);
    assert!(start < 0);

    let mut now = 100_000;
    let mut furthest = start;
    let mut status = GotoStatus::Moving;
    while status == GotoStatus::Moving && now < 30_000_000 {
        status = planner.tick(&engine, TICK_US as f64 * 1e-6);
        if status == GotoStatus::Completed {
            break;
        }
        run_steps(&engine, &mut scheduler, now, now + TICK_US);
        furthest = furthest.max(engine.step_count(Axis::Azimuth));
        now += TICK_US;
    }

    assert_eq!(status, GotoStatus::Completed);
    // Overshot by the full backlash before settling back
    assert!(furthest >= 529, "furthest {}", furthest);
    assert!((engine.step_count(Axis::Azimuth) - 500).abs() <= 1);
    assert_eq!(engine.last_direction(Axis::Azimuth), -1);
    assert!(planner.axis(Axis::Azimuth).reached_final_target);
}

#[test]
fn t042_goto_hands_off_to_tracking_without_jump() {
    let config = calibrated(100.0);
    let engine = MotionEngine::new(&config);
    let mut scheduler = sim_scheduler(&config);
    let mut mount = MountController::new(&config, KeplerEphemeris);
    let start = reference_instant();
    let star = Target::Coordinates(Equatorial::new(5.5, 20.0));

    let plan = mount.goto(&engine, star, &start).unwrap();
    // 155.7° of azimuth at 3°/s dominates
    assert!(plan.estimated_duration_secs > 50.0 && plan.estimated_duration_secs < 60.0);

    let mut now = 0;
    let mut state = MountState::Slewing;
    while state == MountState::Slewing && now < 120_000_000 {
        let civil = start + Duration::microseconds(now as i64);
        state = mount.tick(&engine, &civil, now).unwrap();
        if state != MountState::Slewing {
            break;
        }
        run_steps(&engine, &mut scheduler, now, now + TICK_US);
        now += TICK_US;
    }

    assert_eq!(state, MountState::Tracking);
    assert!(engine.tracking_enabled());
    assert!(mount.tracking().is_active());

    // Desired position equals the current one at hand-off: no correction yet
    assert!(engine.total_rate(Axis::Azimuth).abs() < 1e-6);
    assert!(engine.total_rate(Axis::Altitude).abs() < 1e-6);

    // The mount landed where the target was predicted to be
    let tracking = mount.tracking().state();
    assert!(tracking.offset_az_deg.abs() < 0.2, "az offset {}", tracking.offset_az_deg);
    assert!(tracking.offset_alt_deg.abs() < 0.2, "alt offset {}", tracking.offset_alt_deg);

    // A few seconds later the sky has moved and tracking follows it
    let later = now + 5_000_000;
    let civil = start + Duration::microseconds(later as i64);
    assert_eq!(mount.tick(&engine, &civil, later), Ok(MountState::Tracking));
    let rate_az = engine.axis(Axis::Azimuth).rate(RateSource::Tracking);
    assert!(rate_az > 0.0, "target moves west of south, az increases: {}", rate_az);
}

#[test]
fn t043_goto_rejected_below_minimum_altitude() {
    let mut config = calibrated(100.0);
    config.goto.min_altitude = altaz_motion::Degrees::new(60.0);
    let engine = MotionEngine::new(&config);
    let mut mount = MountController::new(&config, KeplerEphemeris);
    let star = Target::Coordinates(Equatorial::new(5.5, 20.0));

    let result = mount.goto(&engine, star, &reference_instant());
    assert!(matches!(result, Err(Error::Goto(_))));
    assert!(!mount.planner().is_active());
    assert_eq!(engine.total_rate(Axis::Azimuth), 0.0);
    assert_eq!(engine.total_rate(Axis::Altitude), 0.0);
}

// =============================================================================
// T050-T051: Commands, watchdog and alignment
// =============================================================================

#[test]
fn t050_watchdog_zeroes_manual_but_not_goto() {
    let mut config = calibrated(100.0);
    config.scheduler.command_timeout_ms = Some(1000);
    let engine = MotionEngine::new(&config);
    let mut mount = MountController::new(&config, KeplerEphemeris);

    mount
        .handle_request(&engine, "SET_MANUAL_SPS", &["AZ", "150"], 0)
        .unwrap();
    mount
        .handle_request(&engine, "SET_GOTO_SPS", &["ALT", "75"], 10_000)
        .unwrap();
    assert!(engine.is_jogging());

    mount.tick(&engine, &reference_instant(), 500_000).unwrap();
    assert_eq!(engine.total_rate(Axis::Azimuth), 150.0);

    mount.tick(&engine, &reference_instant(), 1_100_000).unwrap();
    assert_eq!(engine.total_rate(Axis::Azimuth), 0.0);
    assert_eq!(engine.total_rate(Axis::Altitude), 75.0);
    assert!(!engine.is_jogging());
}

#[test]
fn t051_align_then_read_back_position() {
    let config = calibrated(200.0);
    let engine = MotionEngine::new(&config);
    let mut mount = MountController::new(&config, KeplerEphemeris);

    let polaris = Target::Coordinates(altaz_motion::astro::POLARIS);
    let aligned: Horizontal = mount.align_on(&engine, &polaris, &reference_instant()).unwrap();

    // Polaris sits within a degree of the pole: altitude ≈ latitude, azimuth ≈ north
    assert!((aligned.alt_deg - 52.52).abs() < 1.0);
    assert!(aligned.az_deg < 2.0 || aligned.az_deg > 358.0);

    let reply = mount
        .handle_request(&engine, "GET_STEP_COUNT", &["ALT"], 0)
        .unwrap();
    assert_eq!(
        reply,
        altaz_motion::Reply::Steps(engine.degrees_to_steps(Axis::Altitude, aligned.alt_deg))
    );
    assert!((engine.position_degrees(Axis::Altitude) - aligned.alt_deg).abs() <= 0.5 / 200.0);
}
