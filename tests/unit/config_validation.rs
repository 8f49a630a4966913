//! Unit tests for configuration validation.

use altaz_motion::config::units::DegreesPerSec;
use altaz_motion::config::{repair, validate_config, AxisCalibration, MountConfig};
use altaz_motion::error::{ConfigError, Error};
use altaz_motion::Axis;

/// Test validation of the default configuration.
#[test]
fn test_default_config_passes_validation() {
    assert!(validate_config(&MountConfig::default()).is_ok());
}

/// Test negative altitude backlash is reported with its axis.
#[test]
fn test_negative_backlash_rejected() {
    let mut config = MountConfig::default();
    config.backlash.alt_steps = -3;
    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::NegativeBacklash {
            axis: Axis::Altitude,
            steps: -3
        }))
    );
}

/// Test a zero slew speed is rejected.
#[test]
fn test_invalid_goto_profile() {
    let mut config = MountConfig::default();
    config.goto_profile.max_speed = DegreesPerSec::new(0.0);
    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidGotoProfile))
    );
}

/// Test out-of-range site values.
#[test]
fn test_observer_ranges() {
    let mut config = MountConfig::default();
    config.observer.longitude_deg = 200.0;
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidLongitude(_)))
    ));

    let mut config = MountConfig::default();
    config.observer.timezone_offset_minutes = 900;
    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidTimezone(900)))
    );
}

/// Test tracking tuning must be positive.
#[test]
fn test_tracking_tuning() {
    let mut config = MountConfig::default();
    config.tracking.gain_per_sec = 0.0;
    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidTrackingTuning))
    );
}

/// Test repair drops an unusable calibration in favour of the drive-derived one.
#[test]
fn test_repair_replaces_calibration() {
    let mut config = MountConfig {
        calibration: Some(AxisCalibration {
            steps_per_degree_az: f64::NAN,
            steps_per_degree_alt: 100.0,
            az_home_offset: 0,
            alt_home_offset: 0,
        }),
        ..MountConfig::default()
    };
    assert!(repair(&mut config));
    assert!(config.calibration.is_none());
    assert!(config.calibration().is_valid());
    assert!(validate_config(&config).is_ok());
}
