//! Command link watchdog.
//!
//! Optional. With no timeout configured the last commanded rates persist
//! until changed, which is how the mount behaves by default.

use super::axis::Axis;
use super::engine::MotionEngine;

/// Zeroes manual and tracking contributions when the command link goes quiet.
///
/// GOTO contributions are left alone; the planner owns them.
#[derive(Debug, Clone)]
pub struct CommandWatchdog {
    timeout_us: Option<u64>,
    last_feed_us: Option<u64>,
    tripped: bool,
}

impl CommandWatchdog {
    /// Create a watchdog. `None` disables expiry.
    pub fn new(timeout_ms: Option<u32>) -> Self {
        Self {
            timeout_us: timeout_ms.map(|ms| ms as u64 * 1000),
            last_feed_us: None,
            tripped: false,
        }
    }

    /// Whether a timeout is configured.
    pub fn is_enabled(&self) -> bool {
        self.timeout_us.is_some()
    }

    /// Record a command received at `now_us`.
    pub fn feed(&mut self, now_us: u64) {
        self.last_feed_us = Some(now_us);
        self.tripped = false;
    }

    /// Check for expiry at `now_us`.
    ///
    /// Returns `true` exactly once per expiry, after zeroing manual and
    /// tracking rates and disabling tracking on `engine`.
    pub fn check(&mut self, engine: &MotionEngine, now_us: u64) -> bool {
        let Some(timeout_us) = self.timeout_us else {
            return false;
        };
        if self.tripped {
            return false;
        }

        // The first check starts the clock when nothing was fed yet
        let last = *self.last_feed_us.get_or_insert(now_us);
        if now_us.saturating_sub(last) < timeout_us {
            return false;
        }

        for axis in Axis::ALL {
            engine.set_manual_rate(axis, 0.0);
        }
        engine.set_tracking_rates(0.0, 0.0);
        engine.set_tracking_enabled(false);
        self.tripped = true;

        warn!("command watchdog expired after {} us", now_us.saturating_sub(last));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MountConfig;
    use crate::motor::RateSource;

    #[test]
    fn test_disabled_never_expires() {
        let engine = MotionEngine::new(&MountConfig::default());
        engine.set_manual_rate(Axis::Azimuth, 100.0);

        let mut watchdog = CommandWatchdog::new(None);
        watchdog.feed(0);
        assert!(!watchdog.check(&engine, u64::MAX / 2));
        assert_eq!(engine.total_rate(Axis::Azimuth), 100.0);
    }

    #[test]
    fn test_expiry_zeroes_manual_and_tracking_once() {
        let engine = MotionEngine::new(&MountConfig::default());
        engine.set_manual_rate(Axis::Altitude, -40.0);
        engine.set_goto_steps_per_second(Axis::Azimuth, 500.0);
        engine.set_tracking_enabled(true);
        engine.set_tracking_rates(0.01, 0.01);

        let mut watchdog = CommandWatchdog::new(Some(500));
        watchdog.feed(1_000_000);
        assert!(!watchdog.check(&engine, 1_499_999));
        assert!(watchdog.check(&engine, 1_500_000));
        assert!(!watchdog.check(&engine, 2_000_000));

        assert_eq!(engine.axis(Axis::Altitude).rate(RateSource::Manual), 0.0);
        assert_eq!(engine.axis(Axis::Azimuth).rate(RateSource::Tracking), 0.0);
        assert_eq!(engine.axis(Axis::Azimuth).rate(RateSource::Goto), 500.0);
        assert!(!engine.tracking_enabled());

        // Feeding re-arms it
        watchdog.feed(3_000_000);
        assert!(watchdog.check(&engine, 3_600_000));
    }
}
