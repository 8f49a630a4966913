//! Tracking and scheduler tuning.

use serde::{Deserialize, Serialize};

/// Proportional tracking corrector settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingTuning {
    /// Correction gain in 1/s.
    pub gain_per_sec: f64,
    /// Correction rate clamp in degrees per second.
    pub max_rate_deg_per_sec: f64,
}

impl Default for TrackingTuning {
    fn default() -> Self {
        Self {
            gain_per_sec: 0.5,
            max_rate_deg_per_sec: 0.5,
        }
    }
}

impl TrackingTuning {
    /// Both values finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.gain_per_sec.is_finite()
            && self.gain_per_sec > 0.0
            && self.max_rate_deg_per_sec.is_finite()
            && self.max_rate_deg_per_sec > 0.0
    }
}

/// Step scheduler timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Rates below this magnitude (steps/s) leave the axis idle.
    pub min_active_rate: f64,
    /// Shortest STEP edge period in microseconds.
    pub min_edge_period_us: u32,
    /// STEP pulse high time in microseconds.
    pub pulse_width_us: u32,
    /// Hold time after a DIR change before the next STEP edge, in nanoseconds.
    pub dir_setup_ns: u32,
    /// Zero manual and tracking rates when no command arrives for this long.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_timeout_ms: Option<u32>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_active_rate: 0.1,
            min_edge_period_us: 25,
            pulse_width_us: 3,
            dir_setup_ns: 650,
            command_timeout_ms: None,
        }
    }
}

impl SchedulerConfig {
    /// Shortest interval between two steps: a step spans two edges.
    pub fn min_step_interval_us(&self) -> u64 {
        2 * self.min_edge_period_us as u64
    }

    /// All timing values usable.
    pub fn is_valid(&self) -> bool {
        self.min_active_rate.is_finite()
            && self.min_active_rate > 0.0
            && self.min_edge_period_us > 0
            && self.pulse_width_us > 0
            && self.pulse_width_us < 2 * self.min_edge_period_us
            && self.command_timeout_ms != Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(TrackingTuning::default().is_valid());
        let sched = SchedulerConfig::default();
        assert!(sched.is_valid());
        assert_eq!(sched.min_step_interval_us(), 50);
        assert_eq!(sched.command_timeout_ms, None);
        assert_eq!(sched.dir_setup_ns, 650);
    }

    #[test]
    fn test_pulse_must_fit_step_interval() {
        let sched = SchedulerConfig {
            pulse_width_us: 50,
            ..SchedulerConfig::default()
        };
        assert!(!sched.is_valid());
    }
}
