//! STEP/DIR pin driver for one axis.
//!
//! Generic over embedded-hal 1.0 pin and delay types.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use super::axis::Direction;

/// Pin-level driver for a single axis.
///
/// Generic over:
/// - `STEP`: STEP pin type (must implement `OutputPin`)
/// - `DIR`: DIR pin type (must implement `OutputPin`)
/// - `DELAY`: Delay provider used for the pulse width (must implement `DelayNs`)
///
/// Pin errors are never returned; they are counted in [`AxisDriver::faults`].
pub struct AxisDriver<STEP, DIR, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    /// STEP pin (one pulse per microstep).
    step_pin: STEP,

    /// DIR pin (high = forward, or inverted).
    dir_pin: DIR,

    /// Delay provider for the pulse width.
    delay: DELAY,

    /// Whether direction pin logic is inverted.
    invert_direction: bool,

    /// Direction last written to DIR (cached to avoid unnecessary pin writes).
    current_direction: Option<Direction>,

    /// STEP already driven to rest since the axis went idle.
    resting: bool,

    /// STEP high time in microseconds.
    pulse_width_us: u32,

    /// Wait after a DIR change before raising STEP, in nanoseconds.
    dir_setup_ns: u32,

    /// Failed pin writes.
    faults: u32,
}

impl<STEP, DIR, DELAY> AxisDriver<STEP, DIR, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    /// Create a driver with a 3 µs pulse width and 650 ns DIR setup time.
    pub fn new(step_pin: STEP, dir_pin: DIR, delay: DELAY, invert_direction: bool) -> Self {
        Self {
            step_pin,
            dir_pin,
            delay,
            invert_direction,
            current_direction: None,
            resting: false,
            pulse_width_us: 3,
            dir_setup_ns: 650,
            faults: 0,
        }
    }

    /// Override the STEP pulse width.
    pub fn with_pulse_width(mut self, pulse_width_us: u32) -> Self {
        self.pulse_width_us = pulse_width_us;
        self
    }

    /// Override the DIR setup time.
    pub fn with_dir_setup(mut self, dir_setup_ns: u32) -> Self {
        self.dir_setup_ns = dir_setup_ns;
        self
    }

    /// Number of failed pin writes so far.
    #[inline]
    pub fn faults(&self) -> u32 {
        self.faults
    }

    /// Direction currently latched on DIR, if any.
    #[inline]
    pub fn current_direction(&self) -> Option<Direction> {
        self.current_direction
    }

    /// Emit one STEP pulse in `direction`.
    ///
    /// Returns `true` if the STEP line was raised, i.e. the driver saw a step.
    pub fn pulse(&mut self, direction: Direction) -> bool {
        if !self.set_direction(direction) {
            return false;
        }

        self.resting = false;

        if self.step_pin.set_high().is_err() {
            self.faults = self.faults.saturating_add(1);
            return false;
        }

        self.delay.delay_us(self.pulse_width_us);

        if self.step_pin.set_low().is_err() {
            self.faults = self.faults.saturating_add(1);
        }

        true
    }

    /// Drive STEP low once after the axis goes idle.
    pub fn rest(&mut self) {
        if self.resting {
            return;
        }
        if self.step_pin.set_low().is_err() {
            self.faults = self.faults.saturating_add(1);
            return;
        }
        self.resting = true;
    }

    /// Release the pins and delay provider.
    pub fn release(self) -> (STEP, DIR, DELAY) {
        (self.step_pin, self.dir_pin, self.delay)
    }

    fn set_direction(&mut self, direction: Direction) -> bool {
        if self.current_direction == Some(direction) {
            return true;
        }

        let pin_high = match direction {
            Direction::Forward => !self.invert_direction,
            Direction::Reverse => self.invert_direction,
        };

        let result = if pin_high {
            self.dir_pin.set_high()
        } else {
            self.dir_pin.set_low()
        };

        if result.is_err() {
            // Force a rewrite on the next attempt
            self.current_direction = None;
            self.faults = self.faults.saturating_add(1);
            return false;
        }

        self.current_direction = Some(direction);
        if self.dir_setup_ns > 0 {
            self.delay.delay_ns(self.dir_setup_ns);
        }
        true
    }
}
