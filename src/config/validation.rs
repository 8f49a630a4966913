//! Configuration validation and repair.

use crate::error::{ConfigError, Error, Result};
use crate::motor::Axis;

use super::calibration::{AxisCalibration, BacklashConfig};
use super::drive::DriveConfig;
use super::observer::ObserverConfig;
use super::profile::{GotoProfile, GotoSettings};
use super::tuning::{SchedulerConfig, TrackingTuning};
use super::MountConfig;

/// Validate a mount configuration.
///
/// Checks:
/// - Drive train produces a positive step count per revolution
/// - Calibration has positive steps per degree on both axes
/// - Backlash is non-negative
/// - GOTO profile values are positive
/// - Observer latitude, longitude and timezone are in range
/// - Tracking and scheduler tuning are usable
pub fn validate_config(config: &MountConfig) -> Result<()> {
    validate_drive(&config.drive)?;
    validate_calibration(&config.calibration())?;
    validate_backlash(&config.backlash)?;
    validate_goto(&config.goto_profile, &config.goto)?;
    validate_observer(&config.observer)?;

    if !config.tracking.is_valid() {
        return Err(Error::Config(ConfigError::InvalidTrackingTuning));
    }
    if !config.scheduler.is_valid() {
        return Err(Error::Config(ConfigError::InvalidSchedulerTiming));
    }

    Ok(())
}

/// Replace invalid values with firmware defaults.
///
/// Returns `true` if anything was changed. A repaired configuration always
/// passes [`validate_config`].
pub fn repair(config: &mut MountConfig) -> bool {
    let mut changed = false;

    if validate_drive(&config.drive).is_err() {
        config.drive = DriveConfig::default();
        changed = true;
    }
    if let Some(cal) = config.calibration {
        if !cal.is_valid() {
            config.calibration = None;
            changed = true;
        }
    }
    if config.backlash.az_steps < 0 {
        config.backlash.az_steps = 0;
        changed = true;
    }
    if config.backlash.alt_steps < 0 {
        config.backlash.alt_steps = 0;
        changed = true;
    }
    if !config.goto_profile.is_valid() {
        config.goto_profile = GotoProfile::default();
        changed = true;
    }
    if !goto_settings_valid(&config.goto) {
        config.goto = GotoSettings::default();
        changed = true;
    }

    let defaults = ObserverConfig::default();
    if !config.observer.latitude_valid() {
        config.observer.latitude_deg = defaults.latitude_deg;
        changed = true;
    }
    if !config.observer.longitude_valid() {
        config.observer.longitude_deg = defaults.longitude_deg;
        changed = true;
    }
    if !config.observer.timezone_valid() {
        config.observer.timezone_offset_minutes = defaults.timezone_offset_minutes;
        changed = true;
    }

    if !config.tracking.is_valid() {
        config.tracking = TrackingTuning::default();
        changed = true;
    }
    if !config.scheduler.is_valid() {
        config.scheduler = SchedulerConfig::default();
        changed = true;
    }

    if changed {
        warn!("configuration repaired with defaults");
    }
    changed
}

fn validate_drive(drive: &DriveConfig) -> Result<()> {
    if drive.steps_per_revolution == 0 {
        return Err(Error::Config(ConfigError::InvalidStepsPerRevolution(
            drive.steps_per_revolution,
        )));
    }

    // Gear ratio must be positive
    if !(drive.gear_ratio > 0.0 && drive.gear_ratio.is_finite()) {
        return Err(Error::Config(ConfigError::InvalidGearRatio(drive.gear_ratio)));
    }

    Ok(())
}

fn validate_calibration(cal: &AxisCalibration) -> Result<()> {
    for axis in Axis::ALL {
        let value = cal.steps_per_degree(axis);
        if !(value > 0.0 && value.is_finite()) {
            return Err(Error::Config(ConfigError::InvalidStepsPerDegree { axis, value }));
        }
    }
    Ok(())
}

fn validate_backlash(backlash: &BacklashConfig) -> Result<()> {
    for axis in Axis::ALL {
        let steps = backlash.steps(axis);
        if steps < 0 {
            return Err(Error::Config(ConfigError::NegativeBacklash { axis, steps }));
        }
    }
    Ok(())
}

fn validate_goto(profile: &GotoProfile, settings: &GotoSettings) -> Result<()> {
    if !profile.is_valid() || !goto_settings_valid(settings) {
        return Err(Error::Config(ConfigError::InvalidGotoProfile));
    }
    Ok(())
}

fn goto_settings_valid(settings: &GotoSettings) -> bool {
    (-90.0..=90.0).contains(&settings.min_altitude.0)
        && settings.arrival_margin_secs.is_finite()
        && settings.arrival_margin_secs >= 0.0
}

fn validate_observer(observer: &ObserverConfig) -> Result<()> {
    if !observer.latitude_valid() {
        return Err(Error::Config(ConfigError::InvalidLatitude(observer.latitude_deg)));
    }
    if !observer.longitude_valid() {
        return Err(Error::Config(ConfigError::InvalidLongitude(observer.longitude_deg)));
    }
    if !observer.timezone_valid() {
        return Err(Error::Config(ConfigError::InvalidTimezone(
            observer.timezone_offset_minutes,
        )));
    }
    Ok(())
}
