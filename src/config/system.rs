//! Mount configuration - root configuration structure.

use serde::{Deserialize, Serialize};

use super::calibration::{AxisCalibration, BacklashConfig};
use super::drive::DriveConfig;
use super::observer::ObserverConfig;
use super::profile::{GotoProfile, GotoSettings};
use super::tuning::{SchedulerConfig, TrackingTuning};

/// Root configuration structure from TOML.
///
/// Every section is optional; missing sections take firmware defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    /// Motor and gearing.
    pub drive: DriveConfig,

    /// Explicit calibration. When absent it is derived from `drive`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calibration: Option<AxisCalibration>,

    /// Per-axis backlash.
    pub backlash: BacklashConfig,

    /// Slew profile.
    pub goto_profile: GotoProfile,

    /// GOTO acceptance settings.
    pub goto: GotoSettings,

    /// Tracking corrector tuning.
    pub tracking: TrackingTuning,

    /// Observer site.
    pub observer: ObserverConfig,

    /// Step scheduler timing.
    pub scheduler: SchedulerConfig,
}

impl MountConfig {
    /// Effective calibration: the explicit section or one derived from the drive.
    pub fn calibration(&self) -> AxisCalibration {
        self.calibration
            .unwrap_or_else(|| AxisCalibration::from_drive(&self.drive))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibration_falls_back_to_drive() {
        let mut config = MountConfig::default();
        config.drive.gear_ratio = 2.0;
        // 2048 * 16 * 2 / 360
        assert!((config.calibration().steps_per_degree_az - 182.044_444).abs() < 1e-5);

        config.calibration = Some(AxisCalibration {
            steps_per_degree_az: 10.0,
            steps_per_degree_alt: 20.0,
            az_home_offset: 0,
            alt_home_offset: 0,
        });
        assert_eq!(config.calibration().steps_per_degree_alt, 20.0);
    }
}
