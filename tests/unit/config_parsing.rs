//! Unit tests for TOML configuration parsing.

use altaz_motion::astro::DstMode;
use altaz_motion::config::{parse_config, to_toml_string, MountConfig};

/// Test parsing the observer section with every DST mode.
#[test]
fn test_parse_observer_dst_modes() {
    for (text, mode) in [("off", DstMode::Off), ("on", DstMode::On), ("auto", DstMode::Auto)] {
        let toml_str = format!(
            "[observer]\nlatitude_deg = -33.87\nlongitude_deg = 151.21\ntimezone_offset_minutes = 600\ndst = \"{}\"\n",
            text
        );
        let config = parse_config(&toml_str).expect("Failed to parse observer");
        assert_eq!(config.observer.dst, mode);
        assert_eq!(config.observer.timezone_offset_minutes, 600);
        assert!((config.observer.latitude_deg + 33.87).abs() < 1e-12);
    }
}

/// Test that a config without a calibration section derives one from the drive.
#[test]
fn test_calibration_derived_from_drive() {
    let toml_str = r#"
[drive]
steps_per_revolution = 200
microsteps = 16
gear_ratio = 90.0
"#;

    let config: MountConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    assert!(config.calibration.is_none());
    // 200 * 16 * 90 / 360
    assert!((config.calibration().steps_per_degree_az - 800.0).abs() < 1e-9);
    assert!((config.calibration().steps_per_degree_alt - 800.0).abs() < 1e-9);
}

/// Test the optional watchdog timeout.
#[test]
fn test_scheduler_timeout_optional() {
    let config = parse_config("[scheduler]\nmin_edge_period_us = 40\n").unwrap();
    assert_eq!(config.scheduler.command_timeout_ms, None);
    assert_eq!(config.scheduler.min_step_interval_us(), 80);

    let config = parse_config("[scheduler]\ncommand_timeout_ms = 750\n").unwrap();
    assert_eq!(config.scheduler.command_timeout_ms, Some(750));
}

/// Test that a saved configuration loads back unchanged.
#[test]
fn test_saved_config_reloads() {
    let mut config = MountConfig::default();
    config.backlash.alt_steps = 12;
    config.goto.arrival_margin_secs = 1.5;
    config.observer.dst = DstMode::Off;

    let text = to_toml_string(&config).expect("Failed to serialize");
    assert!(text.contains("[backlash]"));
    assert_eq!(parse_config(&text).unwrap(), config);
}
