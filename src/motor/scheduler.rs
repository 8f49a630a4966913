//! Step pulse scheduler.
//!
//! The scheduler is executor-agnostic: the platform calls [`StepScheduler::poll`]
//! with a monotonic microsecond timestamp and sleeps until the returned
//! [`Wake`] deadline. Each poll reads the summed rate of each axis from the
//! shared [`MotionEngine`], emits at most one pulse per axis and re-arms the
//! axis deadline.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::SchedulerConfig;

use super::axis::{Axis, Direction};
use super::driver::AxisDriver;
use super::engine::MotionEngine;

/// When the scheduler next needs to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Wake {
    /// Both axes idle; poll again after a rate change.
    Idle,
    /// Earliest step deadline, in the caller's microsecond timebase.
    At(u64),
}

impl Wake {
    fn earliest(self, other: Wake) -> Wake {
        match (self, other) {
            (Wake::At(a), Wake::At(b)) => Wake::At(a.min(b)),
            (Wake::At(a), Wake::Idle) | (Wake::Idle, Wake::At(a)) => Wake::At(a),
            (Wake::Idle, Wake::Idle) => Wake::Idle,
        }
    }
}

/// Paces STEP pulses for both axes from the engine's summed rates.
pub struct StepScheduler<STEP, DIR, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    drivers: [AxisDriver<STEP, DIR, DELAY>; 2],
    min_active_rate: f64,
    min_step_interval_us: u64,
    reported_faults: u32,
}

impl<STEP, DIR, DELAY> StepScheduler<STEP, DIR, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    /// Create a scheduler from an azimuth and an altitude driver.
    pub fn new(
        azimuth: AxisDriver<STEP, DIR, DELAY>,
        altitude: AxisDriver<STEP, DIR, DELAY>,
        config: &SchedulerConfig,
    ) -> Self {
        Self {
            drivers: [
                azimuth
                    .with_pulse_width(config.pulse_width_us)
                    .with_dir_setup(config.dir_setup_ns),
                altitude
                    .with_pulse_width(config.pulse_width_us)
                    .with_dir_setup(config.dir_setup_ns),
            ],
            min_active_rate: config.min_active_rate,
            min_step_interval_us: config.min_step_interval_us(),
            reported_faults: 0,
        }
    }

    /// Service both axes at `now_us`.
    ///
    /// Never fails: pin errors are counted and logged.
    pub fn poll(&mut self, engine: &MotionEngine, now_us: u64) -> Wake {
        let mut wake = Wake::Idle;
        for axis in Axis::ALL {
            wake = wake.earliest(self.update_axis(engine, axis, now_us));
        }

        let faults = self.pin_faults();
        if faults != self.reported_faults {
            error!("step scheduler pin faults: {}", faults);
            self.reported_faults = faults;
        }

        wake
    }

    /// Total failed pin writes on both axes.
    pub fn pin_faults(&self) -> u32 {
        self.drivers
            .iter()
            .fold(0u32, |acc, d| acc.saturating_add(d.faults()))
    }

    /// Interval between steps at `steps_per_sec`.
    ///
    /// The STEP edge period is `1 / (2 * |rate|)`, clamped to the configured
    /// minimum; one step spans two edges.
    pub fn step_interval_us(&self, steps_per_sec: f64) -> u64 {
        let edge_period_us = 1_000_000.0 / (2.0 * libm::fabs(steps_per_sec));
        let interval = (2.0 * edge_period_us) as u64;
        interval.max(self.min_step_interval_us)
    }

    /// Release the drivers (azimuth, altitude).
    pub fn release(self) -> [AxisDriver<STEP, DIR, DELAY>; 2] {
        self.drivers
    }

    fn update_axis(&mut self, engine: &MotionEngine, axis: Axis, now_us: u64) -> Wake {
        let state = engine.axis(axis);
        let total = engine.total_rate(axis);

        let direction = match Direction::of(total) {
            Some(direction) if libm::fabs(total) >= self.min_active_rate => direction,
            _ => {
                state.set_next_due_us(None);
                self.drivers[axis.index()].rest();
                return Wake::Idle;
            }
        };

        let interval_us = self.step_interval_us(total);

        // A pending deadline never lies further out than one interval at the current rate
        let due = state
            .next_due_us()
            .map_or(now_us, |due| due.min(now_us.saturating_add(interval_us)));

        if now_us < due {
            state.set_next_due_us(Some(due));
            return Wake::At(due);
        }

        if self.drivers[axis.index()].pulse(direction) {
            state.record_step(direction);
        } else {
            warn!("{} step pulse failed", axis.name());
        }

        let next = now_us.saturating_add(interval_us);
        state.set_next_due_us(Some(next));
        Wake::At(next)
    }
}
