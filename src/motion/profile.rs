//! Motion profile calculation.
//!
//! Closed-form asymmetric trapezoidal profiles, used to estimate slew
//! durations before a GOTO starts.

use libm::{fabs, sqrt};

use crate::config::GotoProfile;

/// Phase of a profile at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionPhase {
    /// Accelerating from rest toward cruise velocity.
    Accelerating,
    /// Moving at constant cruise velocity.
    Cruising,
    /// Decelerating from cruise velocity to rest.
    Decelerating,
    /// Motion complete.
    Complete,
}

/// Computed rest-to-rest profile for a move of a given distance.
///
/// Units are whatever the inputs use (degrees or steps), as long as they
/// are consistent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrapezoidalProfile {
    /// Absolute distance covered.
    pub distance: f64,
    /// Highest speed reached (the cruise speed unless triangular).
    pub peak_speed: f64,
    /// Time spent accelerating.
    pub accel_time: f64,
    /// Time spent at peak speed.
    pub cruise_time: f64,
    /// Time spent decelerating.
    pub decel_time: f64,
    accel_rate: f64,
    decel_rate: f64,
}

impl TrapezoidalProfile {
    /// Create an asymmetric trapezoidal profile.
    ///
    /// When the ramps alone would overshoot `distance` the profile becomes
    /// triangular with peak `sqrt(2·D·a·d / (a + d))`.
    ///
    /// # Arguments
    ///
    /// * `distance` - Distance to cover (sign ignored)
    /// * `max_speed` - Cruise speed limit
    /// * `acceleration` - Ramp-up rate
    /// * `deceleration` - Ramp-down rate
    pub fn new(distance: f64, max_speed: f64, acceleration: f64, deceleration: f64) -> Self {
        let distance = fabs(distance);
        let usable = [distance, max_speed, acceleration, deceleration]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0);
        if !usable {
            return Self::zero();
        }

        let accel_distance = max_speed * max_speed / (2.0 * acceleration);
        let decel_distance = max_speed * max_speed / (2.0 * deceleration);

        let (peak_speed, cruise_time) = if accel_distance + decel_distance >= distance {
            // Triangle profile: can't reach max speed
            let peak = sqrt(2.0 * distance * acceleration * deceleration / (acceleration + deceleration));
            (peak, 0.0)
        } else {
            let cruise_distance = distance - accel_distance - decel_distance;
            (max_speed, cruise_distance / max_speed)
        };

        Self {
            distance,
            peak_speed,
            accel_time: peak_speed / acceleration,
            cruise_time,
            decel_time: peak_speed / deceleration,
            accel_rate: acceleration,
            decel_rate: deceleration,
        }
    }

    /// Profile for `distance` degrees under a GOTO profile.
    pub fn for_goto(distance_deg: f64, profile: &GotoProfile) -> Self {
        Self::new(
            distance_deg,
            profile.max_speed.0,
            profile.acceleration.0,
            profile.deceleration.0,
        )
    }

    /// Create a zero-length profile (no motion).
    pub fn zero() -> Self {
        Self {
            distance: 0.0,
            peak_speed: 0.0,
            accel_time: 0.0,
            cruise_time: 0.0,
            decel_time: 0.0,
            accel_rate: 0.0,
            decel_rate: 0.0,
        }
    }

    /// Check if this is a zero-length profile.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.distance == 0.0
    }

    /// Total duration in seconds.
    #[inline]
    pub fn duration_secs(&self) -> f64 {
        self.accel_time + self.cruise_time + self.decel_time
    }

    /// Whether the cruise speed is never reached.
    #[inline]
    pub fn is_triangular(&self) -> bool {
        !self.is_zero() && self.cruise_time == 0.0
    }

    /// Phase at `t` seconds after the start.
    pub fn phase_at(&self, t: f64) -> MotionPhase {
        if self.is_zero() || t >= self.duration_secs() {
            MotionPhase::Complete
        } else if t < self.accel_time {
            MotionPhase::Accelerating
        } else if t < self.accel_time + self.cruise_time {
            MotionPhase::Cruising
        } else {
            MotionPhase::Decelerating
        }
    }

    /// Speed at `t` seconds after the start.
    pub fn speed_at(&self, t: f64) -> f64 {
        match self.phase_at(t) {
            MotionPhase::Complete => 0.0,
            MotionPhase::Accelerating => self.accel_rate * t.max(0.0),
            MotionPhase::Cruising => self.peak_speed,
            MotionPhase::Decelerating => {
                let remaining = self.duration_secs() - t;
                (self.decel_rate * remaining).max(0.0)
            }
        }
    }
}
