//! Shared motion engine.
//!
//! [`MotionEngine`] owns the runtime state of both axes, the calibration and
//! backlash settings and the global tracking flag. Every field is atomic and
//! every method takes `&self`, so one engine can be shared by reference
//! between the step scheduler and the control tick.

use core::sync::atomic::{AtomicBool, AtomicI32, AtomicI64, Ordering};

use libm::round;

use crate::astro::coords::{normalize_180, wrap_360};
use crate::config::{AxisCalibration, BacklashConfig, MountConfig};

use super::axis::Axis;
use super::state::{AtomicF64, AxisRuntimeState, RateSource};

/// Calibration stored as four independent atomics.
///
/// Updates are not transactional with a GOTO in flight; callers apply a new
/// calibration only while the mount is stationary.
#[derive(Debug)]
struct CalibrationCell {
    steps_per_degree: [AtomicF64; 2],
    home_offset: [AtomicI64; 2],
}

/// Motion engine shared between scheduler and control contexts.
#[derive(Debug)]
pub struct MotionEngine {
    axes: [AxisRuntimeState; 2],
    tracking_enabled: AtomicBool,
    calibration: CalibrationCell,
    backlash: [AtomicI32; 2],
    steps_per_axis_revolution: f64,
}

impl MotionEngine {
    /// Create an engine from the mount configuration.
    ///
    /// All counters start at 0, tracking disabled, all rates zero.
    pub fn new(config: &MountConfig) -> Self {
        let cal = config.calibration();
        let engine = Self {
            axes: [AxisRuntimeState::new(), AxisRuntimeState::new()],
            tracking_enabled: AtomicBool::new(false),
            calibration: CalibrationCell {
                steps_per_degree: [
                    AtomicF64::new(cal.steps_per_degree_az),
                    AtomicF64::new(cal.steps_per_degree_alt),
                ],
                home_offset: [
                    AtomicI64::new(cal.az_home_offset),
                    AtomicI64::new(cal.alt_home_offset),
                ],
            },
            backlash: [AtomicI32::new(0), AtomicI32::new(0)],
            steps_per_axis_revolution: config.drive.steps_per_axis_revolution(),
        };
        engine.apply_backlash(config.backlash);
        engine
    }

    /// Runtime state of `axis`.
    #[inline]
    pub fn axis(&self, axis: Axis) -> &AxisRuntimeState {
        &self.axes[axis.index()]
    }

    // ---------------------------------------------------------------------
    // Rate contributions
    // ---------------------------------------------------------------------

    /// Set the manual (jog) contribution in steps per second.
    pub fn set_manual_rate(&self, axis: Axis, steps_per_sec: f64) {
        self.axis(axis).set_rate(RateSource::Manual, steps_per_sec);
    }

    /// Set the manual contribution in axis revolutions per minute.
    pub fn set_manual_rate_rpm(&self, axis: Axis, rpm: f64) {
        self.set_manual_rate(axis, rpm * self.steps_per_axis_revolution / 60.0);
    }

    /// Set the GOTO contribution in steps per second.
    pub fn set_goto_steps_per_second(&self, axis: Axis, steps_per_sec: f64) {
        self.axis(axis).set_rate(RateSource::Goto, steps_per_sec);
    }

    /// Zero the GOTO contribution on both axes.
    pub fn clear_goto_rates(&self) {
        for axis in Axis::ALL {
            self.set_goto_steps_per_second(axis, 0.0);
        }
    }

    /// Zero every contribution on both axes and disable tracking.
    pub fn stop_all(&self) {
        for axis in Axis::ALL {
            let state = self.axis(axis);
            state.set_rate(RateSource::Manual, 0.0);
            state.set_rate(RateSource::Goto, 0.0);
            state.set_rate(RateSource::Tracking, 0.0);
        }
        self.tracking_enabled.store(false, Ordering::Release);
        debug!("stop all");
    }

    /// Gate the tracking contribution globally.
    pub fn set_tracking_enabled(&self, enabled: bool) {
        self.tracking_enabled.store(enabled, Ordering::Release);
    }

    /// Whether tracking contributions are summed into the step rate.
    #[inline]
    pub fn tracking_enabled(&self) -> bool {
        self.tracking_enabled.load(Ordering::Acquire)
    }

    /// Set tracking contributions from angular rates in degrees per second.
    pub fn set_tracking_rates(&self, az_deg_per_sec: f64, alt_deg_per_sec: f64) {
        self.axis(Axis::Azimuth).set_rate(
            RateSource::Tracking,
            az_deg_per_sec * self.steps_per_degree(Axis::Azimuth),
        );
        self.axis(Axis::Altitude).set_rate(
            RateSource::Tracking,
            alt_deg_per_sec * self.steps_per_degree(Axis::Altitude),
        );
    }

    /// Effective step rate of `axis` in steps per second.
    #[inline]
    pub fn total_rate(&self, axis: Axis) -> f64 {
        self.axis(axis).total_rate(self.tracking_enabled())
    }

    /// True while any manual contribution is non-zero.
    pub fn is_jogging(&self) -> bool {
        Axis::ALL
            .iter()
            .any(|&axis| self.axis(axis).rate(RateSource::Manual) != 0.0)
    }

    // ---------------------------------------------------------------------
    // Position
    // ---------------------------------------------------------------------

    /// Current step count of `axis`.
    #[inline]
    pub fn step_count(&self, axis: Axis) -> i64 {
        self.axis(axis).step_count()
    }

    /// Overwrite the step count of `axis` (alignment only).
    pub fn set_step_count(&self, axis: Axis, steps: i64) {
        self.axis(axis).set_step_count(steps);
    }

    /// Direction of the last step: +1, -1, or 0 before the first step.
    #[inline]
    pub fn last_direction(&self, axis: Axis) -> i8 {
        self.axis(axis).last_direction_sign()
    }

    /// Convert a step count to axis degrees.
    ///
    /// Azimuth is wrapped to [0, 360); altitude is folded into [-180, 180].
    /// Returns 0 when the axis has no usable calibration. Total over every
    /// `i64` count and home offset.
    pub fn steps_to_degrees(&self, axis: Axis, steps: i64) -> f64 {
        let spd = self.steps_per_degree(axis);
        if spd <= 0.0 || !spd.is_finite() {
            return 0.0;
        }
        let degrees = (steps as f64 - self.home_offset(axis) as f64) / spd;
        match axis {
            Axis::Azimuth => wrap_360(degrees),
            Axis::Altitude => {
                if (-180.0..=180.0).contains(&degrees) {
                    degrees
                } else {
                    normalize_180(degrees)
                }
            }
        }
    }

    /// Convert axis degrees to the nearest step count.
    ///
    /// Azimuth input is wrapped to [0, 360) first. Returns the home offset
    /// when the axis has no usable calibration. Out-of-range results
    /// saturate at the `i64` limits.
    pub fn degrees_to_steps(&self, axis: Axis, degrees: f64) -> i64 {
        let spd = self.steps_per_degree(axis);
        let home = self.home_offset(axis);
        if spd <= 0.0 || !spd.is_finite() {
            return home;
        }
        let degrees = match axis {
            Axis::Azimuth => wrap_360(degrees),
            Axis::Altitude => degrees,
        };
        (round(degrees * spd) as i64).saturating_add(home)
    }

    /// Current position of `axis` in degrees.
    pub fn position_degrees(&self, axis: Axis) -> f64 {
        self.steps_to_degrees(axis, self.step_count(axis))
    }

    // ---------------------------------------------------------------------
    // Calibration and backlash
    // ---------------------------------------------------------------------

    /// Replace the calibration wholesale.
    pub fn apply_calibration(&self, calibration: AxisCalibration) {
        for axis in Axis::ALL {
            let i = axis.index();
            self.calibration.steps_per_degree[i].store(calibration.steps_per_degree(axis));
            self.calibration.home_offset[i].store(calibration.home_offset(axis), Ordering::Release);
        }
        info!(
            "calibration applied: az {} steps/deg, alt {} steps/deg",
            calibration.steps_per_degree_az,
            calibration.steps_per_degree_alt
        );
    }

    /// Snapshot of the current calibration.
    pub fn calibration(&self) -> AxisCalibration {
        AxisCalibration {
            steps_per_degree_az: self.steps_per_degree(Axis::Azimuth),
            steps_per_degree_alt: self.steps_per_degree(Axis::Altitude),
            az_home_offset: self.home_offset(Axis::Azimuth),
            alt_home_offset: self.home_offset(Axis::Altitude),
        }
    }

    /// Steps per degree of `axis`.
    #[inline]
    pub fn steps_per_degree(&self, axis: Axis) -> f64 {
        self.calibration.steps_per_degree[axis.index()].load()
    }

    /// Home offset of `axis`.
    #[inline]
    pub fn home_offset(&self, axis: Axis) -> i64 {
        self.calibration.home_offset[axis.index()].load(Ordering::Acquire)
    }

    /// Steps in one full revolution of the azimuth axis under the current calibration.
    pub fn azimuth_steps_per_revolution(&self) -> f64 {
        360.0 * self.steps_per_degree(Axis::Azimuth)
    }

    /// Microsteps per axis revolution from the drive train.
    #[inline]
    pub fn steps_per_axis_revolution(&self) -> f64 {
        self.steps_per_axis_revolution
    }

    /// Set backlash on `axis`. Negative values are stored as 0.
    pub fn set_backlash(&self, axis: Axis, steps: i32) {
        self.backlash[axis.index()].store(steps.max(0), Ordering::Release);
    }

    /// Set backlash on both axes.
    pub fn apply_backlash(&self, backlash: BacklashConfig) {
        for axis in Axis::ALL {
            self.set_backlash(axis, backlash.steps(axis));
        }
    }

    /// Backlash of `axis` in steps.
    #[inline]
    pub fn backlash_steps(&self, axis: Axis) -> i32 {
        self.backlash[axis.index()].load(Ordering::Acquire)
    }
}
