//! GOTO motion profile and GOTO settings.

use serde::{Deserialize, Serialize};

use super::units::{Degrees, DegreesPerSec, DegreesPerSecSquared};

/// Speed and ramp limits for slews, in axis degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GotoProfile {
    /// Cruise speed.
    #[serde(rename = "max_speed_deg_per_sec")]
    pub max_speed: DegreesPerSec,

    /// Ramp-up rate.
    #[serde(rename = "acceleration_deg_per_sec2")]
    pub acceleration: DegreesPerSecSquared,

    /// Ramp-down rate.
    #[serde(rename = "deceleration_deg_per_sec2")]
    pub deceleration: DegreesPerSecSquared,
}

impl GotoProfile {
    /// Create a profile from raw degree values.
    pub const fn new(max_speed: f64, acceleration: f64, deceleration: f64) -> Self {
        Self {
            max_speed: DegreesPerSec::new(max_speed),
            acceleration: DegreesPerSecSquared::new(acceleration),
            deceleration: DegreesPerSecSquared::new(deceleration),
        }
    }

    /// All three values finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        [self.max_speed.0, self.acceleration.0, self.deceleration.0]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }
}

impl Default for GotoProfile {
    fn default() -> Self {
        Self::new(3.0, 1.0, 1.0)
    }
}

/// GOTO acceptance and prediction settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GotoSettings {
    /// Targets below this altitude (now or on arrival) are rejected.
    #[serde(rename = "min_altitude_deg")]
    pub min_altitude: Degrees,

    /// Extra time added to the slew estimate when predicting the target.
    #[serde(rename = "arrival_margin_sec")]
    pub arrival_margin_secs: f64,
}

impl Default for GotoSettings {
    fn default() -> Self {
        Self {
            min_altitude: Degrees::new(0.0),
            arrival_margin_secs: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_validity() {
        assert!(GotoProfile::default().is_valid());
        assert!(!GotoProfile::new(0.0, 1.0, 1.0).is_valid());
        assert!(!GotoProfile::new(3.0, -1.0, 1.0).is_valid());
        assert!(!GotoProfile::new(3.0, 1.0, f64::INFINITY).is_valid());
    }
}
