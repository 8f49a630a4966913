//! Lock-free per-axis runtime state.
//!
//! Everything here is shared between the step scheduler and the periodic
//! control tick, so every field is an atomic and every method takes `&self`.

use core::sync::atomic::{AtomicI64, AtomicI8, AtomicU64, Ordering};

use super::axis::Direction;

/// An `f64` stored as its bit pattern in an `AtomicU64`.
#[derive(Debug)]
pub struct AtomicF64(AtomicU64);

impl AtomicF64 {
    /// Create a new cell.
    pub fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    /// Read the value.
    #[inline]
    pub fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    /// Write the value.
    #[inline]
    pub fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

impl Default for AtomicF64 {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Origin of a rate contribution. Contributions on an axis are summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RateSource {
    /// Operator jogging.
    Manual,
    /// GOTO planner output.
    Goto,
    /// Tracking corrector output, gated by the global tracking flag.
    Tracking,
}

/// Runtime state of one axis.
#[derive(Debug)]
pub struct AxisRuntimeState {
    step_count: AtomicI64,
    /// +1 or -1; a fresh axis counts as last moved forward.
    last_direction: AtomicI8,
    manual_rate: AtomicF64,
    goto_rate: AtomicF64,
    tracking_rate: AtomicF64,
    /// Absolute time of the next step in µs; 0 means no step scheduled.
    next_due_us: AtomicU64,
}

impl Default for AxisRuntimeState {
    fn default() -> Self {
        Self::new()
    }
}

impl AxisRuntimeState {
    /// Fresh state: counter at 0, last direction forward, all rates zero.
    pub fn new() -> Self {
        Self {
            step_count: AtomicI64::new(0),
            last_direction: AtomicI8::new(Direction::Forward.sign()),
            manual_rate: AtomicF64::default(),
            goto_rate: AtomicF64::default(),
            tracking_rate: AtomicF64::default(),
            next_due_us: AtomicU64::new(0),
        }
    }

    /// Current step count.
    #[inline]
    pub fn step_count(&self) -> i64 {
        self.step_count.load(Ordering::Acquire)
    }

    /// Overwrite the step count (alignment / calibration only).
    #[inline]
    pub fn set_step_count(&self, steps: i64) {
        self.step_count.store(steps, Ordering::Release);
    }

    /// Record one step taken in `direction`.
    #[inline]
    pub(crate) fn record_step(&self, direction: Direction) {
        self.step_count
            .fetch_add(direction.sign() as i64, Ordering::AcqRel);
        self.last_direction.store(direction.sign(), Ordering::Release);
    }

    /// Direction of the most recent step (forward on a fresh axis).
    #[inline]
    pub fn last_direction(&self) -> Option<Direction> {
        Direction::from_sign(self.last_direction.load(Ordering::Acquire))
    }

    /// Raw last-direction sign (+1 or -1).
    #[inline]
    pub fn last_direction_sign(&self) -> i8 {
        self.last_direction.load(Ordering::Acquire)
    }

    fn cell(&self, source: RateSource) -> &AtomicF64 {
        match source {
            RateSource::Manual => &self.manual_rate,
            RateSource::Goto => &self.goto_rate,
            RateSource::Tracking => &self.tracking_rate,
        }
    }

    /// Contribution from `source` in steps per second.
    #[inline]
    pub fn rate(&self, source: RateSource) -> f64 {
        self.cell(source).load()
    }

    /// Set the contribution from `source`. Non-finite values are stored as 0.
    #[inline]
    pub fn set_rate(&self, source: RateSource, steps_per_sec: f64) {
        let value = if steps_per_sec.is_finite() { steps_per_sec } else { 0.0 };
        self.cell(source).store(value);
    }

    /// Sum of contributions, with tracking only when `tracking_enabled`.
    #[inline]
    pub fn total_rate(&self, tracking_enabled: bool) -> f64 {
        let mut total = self.rate(RateSource::Manual) + self.rate(RateSource::Goto);
        if tracking_enabled {
            total += self.rate(RateSource::Tracking);
        }
        total
    }

    /// Scheduled time of the next step, if any.
    #[inline]
    pub fn next_due_us(&self) -> Option<u64> {
        match self.next_due_us.load(Ordering::Acquire) {
            0 => None,
            t => Some(t),
        }
    }

    #[inline]
    pub(crate) fn set_next_due_us(&self, due: Option<u64>) {
        // 0 is the "cleared" marker, so a real deadline at t=0 becomes 1
        let raw = due.map(|t| t.max(1)).unwrap_or(0);
        self.next_due_us.store(raw, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_f64_round_trip() {
        let cell = AtomicF64::new(-12.25);
        assert_eq!(cell.load(), -12.25);
        cell.store(1.0e-9);
        assert_eq!(cell.load(), 1.0e-9);
    }

    #[test]
    fn test_rates_sum_and_tracking_gate() {
        let state = AxisRuntimeState::new();
        state.set_rate(RateSource::Manual, 10.0);
        state.set_rate(RateSource::Goto, -4.0);
        state.set_rate(RateSource::Tracking, 1.5);

        assert_eq!(state.total_rate(false), 6.0);
        assert_eq!(state.total_rate(true), 7.5);
    }

    #[test]
    fn test_non_finite_rate_is_zeroed() {
        let state = AxisRuntimeState::new();
        state.set_rate(RateSource::Goto, f64::NAN);
        assert_eq!(state.rate(RateSource::Goto), 0.0);
    }

    #[test]
    fn test_record_step_updates_direction() {
        let state = AxisRuntimeState::new();
        assert_eq!(state.last_direction(), Some(Direction::Forward));
        assert_eq!(state.last_direction_sign(), 1);

        state.record_step(Direction::Reverse);
        state.record_step(Direction::Reverse);
        assert_eq!(state.step_count(), -2);
        assert_eq!(state.last_direction(), Some(Direction::Reverse));
        assert_eq!(state.last_direction_sign(), -1);
    }

    #[test]
    fn test_deadline_cleared_marker() {
        let state = AxisRuntimeState::new();
        assert_eq!(state.next_due_us(), None);
        state.set_next_due_us(Some(0));
        assert_eq!(state.next_due_us(), Some(1));
        state.set_next_due_us(None);
        assert_eq!(state.next_due_us(), None);
    }
}
