//! Mount control loop.
//!
//! [`MountController`] ties the sky model, GOTO planner, tracking controller
//! and command watchdog together around a shared [`MotionEngine`]. The
//! platform calls [`MountController::tick`] at a steady rate (10–50 Hz) and
//! runs the [`StepScheduler`](crate::motor::StepScheduler) in its own context.

use chrono::{DateTime, Duration, Utc};
use libm::round;

use crate::astro::coords::{normalize_180, Horizontal};
use crate::astro::{Ephemeris, SkyModel, Target};
use crate::command::{Command, Reply};
use crate::config::{GotoSettings, MountConfig};
use crate::error::{CommandError, GotoError, Result};
use crate::motion::{GotoPlanner, GotoStatus};
use crate::motor::{Axis, CommandWatchdog, MotionEngine};
use crate::tracking::TrackingController;

/// What the mount is doing after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MountState {
    /// Neither slewing nor tracking.
    Idle,
    /// GOTO in progress.
    Slewing,
    /// Following a target.
    Tracking,
}

/// Accepted GOTO.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GotoPlan {
    /// Apparent position the mount is slewing to.
    pub target: Horizontal,
    /// Predicted slew time in seconds, margin excluded.
    pub estimated_duration_secs: f64,
}

/// High-level mount controller.
#[derive(Debug)]
pub struct MountController<E> {
    sky: SkyModel<E>,
    planner: GotoPlanner,
    tracking: TrackingController,
    watchdog: CommandWatchdog,
    goto_settings: GotoSettings,
    goto_target: Option<Target>,
    last_tick_us: Option<u64>,
}

impl<E: Ephemeris> MountController<E> {
    /// Create a controller from the mount configuration.
    pub fn new(config: &MountConfig, ephemeris: E) -> Self {
        Self {
            sky: SkyModel::new(config.observer, ephemeris),
            planner: GotoPlanner::new(config.goto_profile),
            tracking: TrackingController::new(config.tracking),
            watchdog: CommandWatchdog::new(config.scheduler.command_timeout_ms),
            goto_settings: config.goto,
            goto_target: None,
            last_tick_us: None,
        }
    }

    /// Sky model.
    pub fn sky(&self) -> &SkyModel<E> {
        &self.sky
    }

    /// GOTO planner.
    pub fn planner(&self) -> &GotoPlanner {
        &self.planner
    }

    /// Tracking controller.
    pub fn tracking(&self) -> &TrackingController {
        &self.tracking
    }

    /// Start a GOTO to `target`.
    ///
    /// The slew duration is estimated twice (to where the target is now, then
    /// to where it will be after that first estimate) and the planner is
    /// aimed at the target's position at `now + duration + arrival margin`.
    /// Tracking is stopped while slewing.
    ///
    /// # Errors
    ///
    /// Fails before any motion when the calibration is invalid, the target is
    /// below the minimum altitude now or on arrival, or the target can't be
    /// resolved.
    pub fn goto(&mut self, engine: &MotionEngine, target: Target, now: &DateTime<Utc>) -> Result<GotoPlan> {
        if !engine.calibration().is_valid() {
            warn!("goto rejected: calibration invalid");
            return Err(GotoError::CalibrationInvalid.into());
        }

        let minimum_deg = self.goto_settings.min_altitude.value();
        let present = self.sky.apparent(&target, now)?;
        self.check_altitude(present, minimum_deg)?;

        let first = self.planner.estimate_duration(engine, present.az_deg, present.alt_deg);
        let midway = self.sky.apparent(&target, &after(now, first))?;
        let second = self.planner.estimate_duration(engine, midway.az_deg, midway.alt_deg);
        let duration = first.max(second);

        let arrival = after(now, duration + self.goto_settings.arrival_margin_secs);
        let predicted = self.sky.apparent(&target, &arrival)?;
        self.check_altitude(predicted, minimum_deg)?;

        self.tracking.stop(engine);
        self.planner.start(engine, predicted.az_deg, predicted.alt_deg)?;
        self.goto_target = Some(target);

        Ok(GotoPlan {
            target: predicted,
            estimated_duration_secs: duration,
        })
    }

    /// Abort a GOTO. Rates drop to zero at once.
    pub fn abort_goto(&mut self, engine: &MotionEngine) {
        self.planner.abort(engine);
        self.goto_target = None;
    }

    /// Track `target` with zero offsets.
    ///
    /// # Errors
    ///
    /// Fails when the calibration is invalid.
    pub fn start_tracking(&mut self, engine: &MotionEngine, target: Target) -> Result<()> {
        self.tracking.start(engine, target, 0.0, 0.0)?;
        Ok(())
    }

    /// Stop tracking.
    pub fn stop_tracking(&mut self, engine: &MotionEngine) {
        self.tracking.stop(engine);
    }

    /// Declare that the mount points at `target` right now.
    ///
    /// Both step counters are overwritten so they read the target's apparent
    /// position, and tracking offsets are cleared.
    ///
    /// # Errors
    ///
    /// Fails when the calibration is invalid or the target can't be resolved.
    pub fn align_on(
        &mut self,
        engine: &MotionEngine,
        target: &Target,
        now: &DateTime<Utc>,
    ) -> Result<Horizontal> {
        if !engine.calibration().is_valid() {
            return Err(GotoError::CalibrationInvalid.into());
        }
        let apparent = self.sky.apparent(target, now)?;
        engine.set_step_count(
            Axis::Azimuth,
            engine.degrees_to_steps(Axis::Azimuth, apparent.az_deg),
        );
        engine.set_step_count(
            Axis::Altitude,
            engine.degrees_to_steps(Axis::Altitude, apparent.alt_deg),
        );
        self.tracking.set_offsets(0.0, 0.0);
        info!("aligned at az {} alt {}", apparent.az_deg, apparent.alt_deg);
        Ok(apparent)
    }

    /// Execute a command and feed the watchdog.
    ///
    /// Commands that stop motion also stop the planner and the tracking
    /// controller, so the next tick does not restore the rates.
    pub fn handle_command(&mut self, engine: &MotionEngine, command: Command, now_us: u64) -> Reply {
        self.watchdog.feed(now_us);
        self.dispatch(engine, command)
    }

    /// Parse and execute a textual command.
    ///
    /// Any request, valid or not, counts as link activity.
    ///
    /// # Errors
    ///
    /// Returns the parse error; the engine is untouched.
    pub fn handle_request(
        &mut self,
        engine: &MotionEngine,
        name: &str,
        params: &[&str],
        now_us: u64,
    ) -> core::result::Result<Reply, CommandError> {
        self.watchdog.feed(now_us);
        let command = Command::parse(name, params)?;
        Ok(self.dispatch(engine, command))
    }

    fn dispatch(&mut self, engine: &MotionEngine, command: Command) -> Reply {
        match command {
            Command::StopAll => {
                self.abort_goto(engine);
                self.tracking.stop(engine);
            }
            Command::ClearGoto => self.abort_goto(engine),
            Command::SetTrackingEnabled(false) => self.tracking.stop(engine),
            _ => {}
        }
        engine.execute(command)
    }

    /// Run one control step.
    ///
    /// `now` is the civil time used for the sky model, `monotonic_us` the
    /// timebase of the step scheduler. The first tick advances the planner by
    /// zero seconds.
    ///
    /// # Errors
    ///
    /// Tracking hand-off or update failures. The planner keeps running.
    pub fn tick(
        &mut self,
        engine: &MotionEngine,
        now: &DateTime<Utc>,
        monotonic_us: u64,
    ) -> Result<MountState> {
        let dt = self
            .last_tick_us
            .map_or(0.0, |last| monotonic_us.saturating_sub(last) as f64 * 1e-6);
        self.last_tick_us = Some(monotonic_us);

        if self.watchdog.check(engine, monotonic_us) {
            self.tracking.stop(engine);
        }

        match self.planner.tick(engine, dt) {
            GotoStatus::Moving => return Ok(MountState::Slewing),
            GotoStatus::Completed => {
                self.hand_off(engine, now)?;
            }
            GotoStatus::Idle => {}
        }

        if self.tracking.is_active() {
            self.tracking.update(engine, &self.sky, now, engine.is_jogging())?;
            Ok(MountState::Tracking)
        } else {
            Ok(MountState::Idle)
        }
    }

    /// Start tracking the GOTO target from where the mount stopped.
    fn hand_off(&mut self, engine: &MotionEngine, now: &DateTime<Utc>) -> Result<()> {
        let Some(target) = self.goto_target.take() else {
            return Ok(());
        };
        let apparent = self.sky.apparent(&target, now)?;
        let offset_az = normalize_180(engine.position_degrees(Axis::Azimuth) - apparent.az_deg);
        let offset_alt = engine.position_degrees(Axis::Altitude) - apparent.alt_deg;
        self.tracking.start(engine, target, offset_az, offset_alt)?;
        debug!("goto handed off to tracking");
        Ok(())
    }

    fn check_altitude(&self, position: Horizontal, minimum_deg: f64) -> Result<()> {
        if position.alt_deg < minimum_deg {
            warn!(
                "goto rejected: altitude {} below {}",
                position.alt_deg,
                minimum_deg
            );
            return Err(GotoError::BelowHorizon {
                altitude_deg: position.alt_deg,
                minimum_deg,
            }
            .into());
        }
        Ok(())
    }
}

fn after(now: &DateTime<Utc>, secs: f64) -> DateTime<Utc> {
    let micros = if secs.is_finite() { round(secs * 1e6) as i64 } else { 0 };
    *now + Duration::microseconds(micros)
}
