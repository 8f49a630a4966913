//! Axis calibration and backlash configuration.

use serde::{Deserialize, Serialize};

use super::drive::DriveConfig;
use crate::motor::Axis;

/// Mapping between step counts and axis angles.
///
/// Replaced wholesale when a new calibration is applied. Both
/// steps-per-degree values must be positive before GOTO or tracking may run;
/// manual jogging works regardless.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisCalibration {
    /// Azimuth steps per degree.
    pub steps_per_degree_az: f64,
    /// Altitude steps per degree.
    pub steps_per_degree_alt: f64,
    /// Azimuth step count that reads as 0°.
    #[serde(default)]
    pub az_home_offset: i64,
    /// Altitude step count that reads as 0°.
    #[serde(default)]
    pub alt_home_offset: i64,
}

impl AxisCalibration {
    /// Calibration derived from the drive train with zero home offsets.
    pub fn from_drive(drive: &DriveConfig) -> Self {
        let spd = drive.steps_per_degree();
        Self {
            steps_per_degree_az: spd,
            steps_per_degree_alt: spd,
            az_home_offset: 0,
            alt_home_offset: 0,
        }
    }

    /// Steps per degree for `axis`.
    #[inline]
    pub fn steps_per_degree(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Azimuth => self.steps_per_degree_az,
            Axis::Altitude => self.steps_per_degree_alt,
        }
    }

    /// Home offset for `axis`.
    #[inline]
    pub fn home_offset(&self, axis: Axis) -> i64 {
        match axis {
            Axis::Azimuth => self.az_home_offset,
            Axis::Altitude => self.alt_home_offset,
        }
    }

    /// True when both axes have a usable steps-per-degree value.
    pub fn is_valid(&self) -> bool {
        self.steps_per_degree_az > 0.0
            && self.steps_per_degree_alt > 0.0
            && self.steps_per_degree_az.is_finite()
            && self.steps_per_degree_alt.is_finite()
    }
}

impl Default for AxisCalibration {
    fn default() -> Self {
        Self::from_drive(&DriveConfig::default())
    }
}

/// Mechanical slack per axis, in steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BacklashConfig {
    /// Azimuth backlash in steps.
    pub az_steps: i32,
    /// Altitude backlash in steps.
    pub alt_steps: i32,
}

impl BacklashConfig {
    /// Backlash for `axis`.
    #[inline]
    pub fn steps(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Azimuth => self.az_steps,
            Axis::Altitude => self.alt_steps,
        }
    }
}
