//! Observer site configuration.

use serde::{Deserialize, Serialize};

use crate::astro::time::{DstMode, Timezone};

/// Geographic site and civil time settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    /// Geodetic latitude, north positive.
    pub latitude_deg: f64,
    /// Longitude, east positive.
    pub longitude_deg: f64,
    /// Standard-time offset from UTC in minutes.
    pub timezone_offset_minutes: i32,
    /// Daylight saving handling.
    pub dst: DstMode,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        // Berlin
        Self {
            latitude_deg: 52.52,
            longitude_deg: 13.405,
            timezone_offset_minutes: 60,
            dst: DstMode::Auto,
        }
    }
}

impl ObserverConfig {
    /// Civil timezone of the site.
    pub fn timezone(&self) -> Timezone {
        Timezone::new(self.timezone_offset_minutes, self.dst)
    }

    /// Latitude within [-90, 90].
    pub fn latitude_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude_deg)
    }

    /// Longitude within [-180, 180].
    pub fn longitude_valid(&self) -> bool {
        (-180.0..=180.0).contains(&self.longitude_deg)
    }

    /// Offset within [-720, 840] minutes (UTC-12 to UTC+14).
    pub fn timezone_valid(&self) -> bool {
        (-720..=840).contains(&self.timezone_offset_minutes)
    }
}
