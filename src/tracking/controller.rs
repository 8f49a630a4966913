//! Proportional tracking controller.

use crate::astro::coords::{normalize_180, shortest_delta, Horizontal};
use crate::astro::{Ephemeris, SkyModel, Target};
use crate::config::TrackingTuning;
use crate::error::{Result, TrackingError};
use crate::motor::{Axis, MotionEngine};

use chrono::{DateTime, Utc};

/// Tracking state owned by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingState {
    /// Tracking a target.
    pub active: bool,
    /// Target being followed.
    pub target: Option<Target>,
    /// Mount minus sky, azimuth (degrees).
    pub offset_az_deg: f64,
    /// Mount minus sky, altitude (degrees).
    pub offset_alt_deg: f64,
    /// Operator is jogging; rate output suspended.
    pub user_adjusting: bool,
}

impl TrackingState {
    const fn idle() -> Self {
        Self {
            active: false,
            target: None,
            offset_az_deg: 0.0,
            offset_alt_deg: 0.0,
            user_adjusting: false,
        }
    }
}

impl Default for TrackingState {
    fn default() -> Self {
        Self::idle()
    }
}

/// Follows a target by driving the tracking rate contribution.
///
/// Each update computes the desired position (apparent sky position plus the
/// stored offset) and commands `gain * error`, clamped to the maximum
/// tracking rate, on both axes.
#[derive(Debug, Clone)]
pub struct TrackingController {
    state: TrackingState,
    tuning: TrackingTuning,
}

impl TrackingController {
    /// Create an idle controller.
    pub fn new(tuning: TrackingTuning) -> Self {
        Self {
            state: TrackingState::idle(),
            tuning,
        }
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> &TrackingState {
        &self.state
    }

    /// Whether a target is being tracked.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.state.active
    }

    /// Tuning in use.
    pub fn tuning(&self) -> &TrackingTuning {
        &self.tuning
    }

    /// Replace the tuning.
    pub fn set_tuning(&mut self, tuning: TrackingTuning) {
        self.tuning = tuning;
    }

    /// Start following `target` with the given offsets.
    ///
    /// # Errors
    ///
    /// Returns `TrackingError::CalibrationInvalid` without touching the
    /// engine if either axis lacks a positive steps-per-degree value.
    pub fn start(
        &mut self,
        engine: &MotionEngine,
        target: Target,
        offset_az_deg: f64,
        offset_alt_deg: f64,
    ) -> core::result::Result<(), TrackingError> {
        if !engine.calibration().is_valid() {
            warn!("tracking rejected: calibration invalid");
            return Err(TrackingError::CalibrationInvalid);
        }

        self.state = TrackingState {
            active: true,
            target: Some(target),
            offset_az_deg: normalize_180(offset_az_deg),
            offset_alt_deg,
            user_adjusting: false,
        };
        engine.set_tracking_rates(0.0, 0.0);
        engine.set_tracking_enabled(true);
        info!(
            "tracking started: offset az {} alt {}",
            self.state.offset_az_deg,
            self.state.offset_alt_deg
        );
        Ok(())
    }

    /// Overwrite the offsets, e.g. after re-aligning the step counters.
    pub fn set_offsets(&mut self, offset_az_deg: f64, offset_alt_deg: f64) {
        self.state.offset_az_deg = normalize_180(offset_az_deg);
        self.state.offset_alt_deg = offset_alt_deg;
    }

    /// Stop tracking. Offsets are kept.
    pub fn stop(&mut self, engine: &MotionEngine) {
        engine.set_tracking_rates(0.0, 0.0);
        engine.set_tracking_enabled(false);
        if self.state.active {
            info!("tracking stopped");
        }
        self.state.active = false;
        self.state.user_adjusting = false;
    }

    /// Run one control step at `at`.
    ///
    /// While `jogging` the tracking rates are held at zero. On the first
    /// update after jogging ends the offsets are re-baselined to the current
    /// mount position so tracking resumes without a jump.
    ///
    /// Returns the desired mount position.
    ///
    /// # Errors
    ///
    /// `TrackingError::NotActive` when no target is tracked, or the sky
    /// model's error if the target can't be resolved.
    pub fn update<E: Ephemeris>(
        &mut self,
        engine: &MotionEngine,
        sky: &SkyModel<E>,
        at: &DateTime<Utc>,
        jogging: bool,
    ) -> Result<Horizontal> {
        let target = match (self.state.active, self.state.target) {
            (true, Some(target)) => target,
            _ => return Err(TrackingError::NotActive.into()),
        };

        let apparent = sky.apparent(&target, at)?;
        let current_az = engine.position_degrees(Axis::Azimuth);
        let current_alt = engine.position_degrees(Axis::Altitude);

        if jogging {
            if !self.state.user_adjusting {
                debug!("tracking suspended while jogging");
            }
            self.state.user_adjusting = true;
            engine.set_tracking_rates(0.0, 0.0);
            return Ok(Horizontal::new(current_az, current_alt));
        }

        if self.state.user_adjusting {
            self.state.offset_az_deg = normalize_180(current_az - apparent.az_deg);
            self.state.offset_alt_deg = current_alt - apparent.alt_deg;
            self.state.user_adjusting = false;
            info!(
                "tracking offset re-baselined: az {} alt {}",
                self.state.offset_az_deg,
                self.state.offset_alt_deg
            );
        }

        let desired = apparent.offset(self.state.offset_az_deg, self.state.offset_alt_deg);
        let error_az = shortest_delta(current_az, desired.az_deg);
        let error_alt = desired.alt_deg - current_alt;

        engine.set_tracking_rates(self.correction(error_az), self.correction(error_alt));
        trace!("tracking error az {} alt {}", error_az, error_alt);
        Ok(desired)
    }

    fn correction(&self, error_deg: f64) -> f64 {
        let max = self.tuning.max_rate_deg_per_sec;
        (self.tuning.gain_per_sec * error_deg).clamp(-max, max)
    }
}
