//! GOTO trajectory planner.
//!
//! Each tick the planner compares the current step count with the target,
//! ramps a speed up or down and writes only the GOTO rate contribution of
//! each axis. When the approach direction differs from the last motion and
//! the axis has backlash, the planner first overshoots by the backlash and
//! then settles back on the final target.

use core::cmp::Ordering;

use libm::{fabs, round};

use crate::config::GotoProfile;
use crate::error::GotoError;
use crate::motor::{Axis, MotionEngine};

use super::profile::TrapezoidalProfile;

/// Per-axis planner phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GotoPhase {
    /// Heading for the (possibly backlash-compensated) target.
    Approaching,
    /// Settled on the compensation target; retargeting to the final one.
    CompensationSettle,
    /// Heading for the final target after compensation.
    ApproachingFinal,
    /// At the final target; GOTO contribution zeroed.
    Reached,
}

/// Runtime state of one axis during a GOTO.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisGotoRuntime {
    /// Step count the axis must end at.
    pub final_target: i64,
    /// Step count currently being approached.
    pub compensated_target: i64,
    /// Speed magnitude in steps per second.
    pub current_speed: f64,
    /// +1 or -1 from the initial position toward the final target, 0 if already there.
    pub desired_direction: i8,
    /// Overshoot still to be settled before the final approach.
    pub compensation_pending: bool,
    /// Final target reached.
    pub reached_final_target: bool,
    phase: GotoPhase,
}

impl AxisGotoRuntime {
    fn idle() -> Self {
        Self {
            final_target: 0,
            compensated_target: 0,
            current_speed: 0.0,
            desired_direction: 0,
            compensation_pending: false,
            reached_final_target: true,
            phase: GotoPhase::Reached,
        }
    }

    /// Plan an approach from `current` to `final_target`.
    ///
    /// `last_direction` is the sign of the last step taken on the axis (0
    /// skips compensation) and `backlash` its slack in steps.
    pub fn plan(current: i64, final_target: i64, last_direction: i8, backlash: i32) -> Self {
        let desired_direction = match final_target.cmp(&current) {
            Ordering::Greater => 1,
            Ordering::Less => -1,
            Ordering::Equal => 0,
        };

        let compensate = backlash > 0
            && last_direction != 0
            && desired_direction != 0
            && desired_direction != last_direction;

        let compensated_target = if compensate {
            final_target.saturating_add(desired_direction as i64 * backlash as i64)
        } else {
            final_target
        };

        Self {
            final_target,
            compensated_target,
            current_speed: 0.0,
            desired_direction,
            compensation_pending: compensate,
            reached_final_target: false,
            phase: GotoPhase::Approaching,
        }
    }

    /// Current phase.
    #[inline]
    pub fn phase(&self) -> GotoPhase {
        self.phase
    }
}

/// Speed limits of one axis converted to steps.
#[derive(Debug, Clone, Copy)]
struct StepLimits {
    max_speed: f64,
    acceleration: f64,
    deceleration: f64,
}

impl StepLimits {
    fn from_profile(profile: &GotoProfile, steps_per_degree: f64) -> Self {
        Self {
            max_speed: profile.max_speed.0 * steps_per_degree,
            acceleration: profile.acceleration.0 * steps_per_degree,
            deceleration: profile.deceleration.0 * steps_per_degree,
        }
    }
}

/// Result of a planner tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GotoStatus {
    /// No GOTO in progress.
    Idle,
    /// At least one axis still moving.
    Moving,
    /// Both axes reached their final targets on this tick.
    Completed,
}

/// Closed-loop GOTO planner for both axes.
#[derive(Debug, Clone)]
pub struct GotoPlanner {
    profile: GotoProfile,
    axes: [AxisGotoRuntime; 2],
    limits: [StepLimits; 2],
    active: bool,
}

impl GotoPlanner {
    /// Create an idle planner.
    pub fn new(profile: GotoProfile) -> Self {
        let zero = StepLimits::from_profile(&profile, 0.0);
        Self {
            profile,
            axes: [AxisGotoRuntime::idle(), AxisGotoRuntime::idle()],
            limits: [zero, zero],
            active: false,
        }
    }

    /// The profile in use.
    pub fn profile(&self) -> &GotoProfile {
        &self.profile
    }

    /// Replace the profile. Takes effect on the next start.
    pub fn set_profile(&mut self, profile: GotoProfile) {
        self.profile = profile;
    }

    /// Whether a GOTO is in progress.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Runtime state of `axis`.
    #[inline]
    pub fn axis(&self, axis: Axis) -> &AxisGotoRuntime {
        &self.axes[axis.index()]
    }

    /// Step target for `axis` at `degrees`.
    ///
    /// Azimuth picks the equivalent count (mod one revolution) closest to the
    /// current position so the mount never slews the long way round.
    pub fn target_steps(engine: &MotionEngine, axis: Axis, degrees: f64) -> i64 {
        let target = engine.degrees_to_steps(axis, degrees);
        if axis != Axis::Azimuth {
            return target;
        }
        let revolution = engine.azimuth_steps_per_revolution();
        if revolution <= 0.0 {
            return target;
        }
        let current = engine.step_count(axis);
        let turns = round((current as f64 - target as f64) / revolution);
        target.saturating_add(round(turns * revolution) as i64)
    }

    /// Estimated slew time in seconds from the current position to `az_deg`/`alt_deg`.
    ///
    /// The slower axis dominates.
    pub fn estimate_duration(&self, engine: &MotionEngine, az_deg: f64, alt_deg: f64) -> f64 {
        let mut longest = 0.0f64;
        for (axis, degrees) in [(Axis::Azimuth, az_deg), (Axis::Altitude, alt_deg)] {
            let spd = engine.steps_per_degree(axis);
            if spd <= 0.0 {
                continue;
            }
            let delta = Self::target_steps(engine, axis, degrees) as f64
                - engine.step_count(axis) as f64;
            let profile = TrapezoidalProfile::for_goto(delta / spd, &self.profile);
            longest = longest.max(profile.duration_secs());
        }
        longest
    }

    /// Start a GOTO to `az_deg`/`alt_deg`.
    ///
    /// # Errors
    ///
    /// Returns `GotoError::CalibrationInvalid` before any motion if either
    /// axis lacks a positive steps-per-degree value.
    pub fn start(&mut self, engine: &MotionEngine, az_deg: f64, alt_deg: f64) -> Result<(), GotoError> {
        if !engine.calibration().is_valid() {
            return Err(GotoError::CalibrationInvalid);
        }

        engine.clear_goto_rates();

        for axis in Axis::ALL {
            let degrees = match axis {
                Axis::Azimuth => az_deg,
                Axis::Altitude => alt_deg,
            };
            let target = Self::target_steps(engine, axis, degrees);
            let runtime = AxisGotoRuntime::plan(
                engine.step_count(axis),
                target,
                engine.last_direction(axis),
                engine.backlash_steps(axis),
            );
            if runtime.compensation_pending {
                debug!(
                    "{} backlash compensation: overshoot to {}",
                    axis.name(),
                    runtime.compensated_target
                );
            }
            self.axes[axis.index()] = runtime;
            self.limits[axis.index()] =
                StepLimits::from_profile(&self.profile, engine.steps_per_degree(axis));
        }

        self.active = true;
        info!(
            "goto started: az {} -> {}, alt {} -> {}",
            engine.step_count(Axis::Azimuth),
            self.axes[0].final_target,
            engine.step_count(Axis::Altitude),
            self.axes[1].final_target
        );
        Ok(())
    }

    /// Advance both axes by `dt_secs`.
    pub fn tick(&mut self, engine: &MotionEngine, dt_secs: f64) -> GotoStatus {
        if !self.active {
            return GotoStatus::Idle;
        }

        let dt = if dt_secs.is_finite() { dt_secs.max(0.0) } else { 0.0 };
        let mut all_reached = true;
        for axis in Axis::ALL {
            if !self.tick_axis(engine, axis, dt) {
                all_reached = false;
            }
        }

        if all_reached {
            self.active = false;
            engine.clear_goto_rates();
            info!("goto complete");
            GotoStatus::Completed
        } else {
            GotoStatus::Moving
        }
    }

    /// Stop the GOTO immediately, without a ramp.
    pub fn abort(&mut self, engine: &MotionEngine) {
        engine.clear_goto_rates();
        if self.active {
            info!("goto aborted");
        }
        self.active = false;
        for runtime in self.axes.iter_mut() {
            runtime.current_speed = 0.0;
        }
    }

    /// One axis; returns `true` once the final target is reached.
    fn tick_axis(&mut self, engine: &MotionEngine, axis: Axis, dt: f64) -> bool {
        let limits = self.limits[axis.index()];
        let rt = &mut self.axes[axis.index()];

        if rt.reached_final_target {
            return true;
        }
        if rt.phase == GotoPhase::CompensationSettle {
            rt.phase = GotoPhase::ApproachingFinal;
        }

        let error = rt.compensated_target as f64 - engine.step_count(axis) as f64;
        let distance = fabs(error);
        let stopping_distance = rt.current_speed * rt.current_speed / (2.0 * limits.deceleration);

        if distance <= stopping_distance + 1.0 {
            rt.current_speed = (rt.current_speed - limits.deceleration * dt).max(0.0);
        } else {
            rt.current_speed = (rt.current_speed + limits.acceleration * dt).min(limits.max_speed);
        }

        if distance <= 1.0 && rt.current_speed < 1.0 {
            rt.current_speed = 0.0;
            engine.set_goto_steps_per_second(axis, 0.0);

            if rt.compensation_pending {
                // Overshoot done; come back to the real target without reporting arrival
                rt.compensated_target = rt.final_target;
                rt.compensation_pending = false;
                rt.phase = GotoPhase::CompensationSettle;
                debug!("{} backlash settled", axis.name());
                return false;
            }

            rt.reached_final_target = true;
            rt.phase = GotoPhase::Reached;
            return true;
        }

        let sign = if error > 0.0 {
            1.0
        } else if error < 0.0 {
            -1.0
        } else {
            0.0
        };
        engine.set_goto_steps_per_second(axis, rt.current_speed * sign);
        false
    }
}
