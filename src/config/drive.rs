//! Drive train configuration from TOML.

use serde::{Deserialize, Serialize};

use super::units::Microsteps;
use crate::motor::Axis;

/// Stepper drive train shared by both axes.
///
/// The defaults describe a 28BYJ-48 style motor (2048 full steps per
/// revolution) at 16 microsteps behind a 4:1 reduction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Full steps per motor revolution.
    pub steps_per_revolution: u16,

    /// Microstep setting (1, 2, 4, 8, 16, 32, etc.).
    pub microsteps: Microsteps,

    /// Gear ratio (output:input, e.g., 4.0 means 4:1 reduction).
    pub gear_ratio: f32,

    /// Invert DIR pin logic on the azimuth driver.
    pub invert_az: bool,

    /// Invert DIR pin logic on the altitude driver.
    pub invert_alt: bool,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            steps_per_revolution: 2048,
            microsteps: Microsteps::SIXTEENTH,
            gear_ratio: 4.0,
            invert_az: false,
            invert_alt: false,
        }
    }
}

impl DriveConfig {
    /// Microsteps per full revolution of the axis output.
    pub fn steps_per_axis_revolution(&self) -> f64 {
        self.steps_per_revolution as f64 * self.microsteps.value() as f64 * self.gear_ratio as f64
    }

    /// Microsteps per degree of axis rotation.
    pub fn steps_per_degree(&self) -> f64 {
        self.steps_per_axis_revolution() / 360.0
    }

    /// Whether the DIR line of `axis` is inverted.
    pub fn invert_direction(&self, axis: Axis) -> bool {
        match axis {
            Axis::Azimuth => self.invert_az,
            Axis::Altitude => self.invert_alt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_steps() {
        let config = DriveConfig::default();
        // 2048 * 16 * 4.0 = 131072
        assert_eq!(config.steps_per_axis_revolution(), 131_072.0);
        assert!((config.steps_per_degree() - 364.088_888).abs() < 1e-5);
    }

    #[test]
    fn test_inversion_per_axis() {
        let config = DriveConfig {
            invert_alt: true,
            ..DriveConfig::default()
        };
        assert!(!config.invert_direction(Axis::Azimuth));
        assert!(config.invert_direction(Axis::Altitude));
    }
}
