//! Julian dates, sidereal time and civil time zones.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use libm::floor;
use serde::{Deserialize, Serialize};

use super::coords::wrap_360;

/// Julian date of the J2000.0 epoch.
pub const J2000: f64 = 2_451_545.0;

/// Julian date of the Unix epoch.
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Length of a sidereal day in seconds.
pub const SIDEREAL_DAY_SECS: f64 = 86_164.0905;

/// Apparent sky rotation rate in degrees per second.
pub const SIDEREAL_RATE_DEG_PER_SEC: f64 = 360.0 / SIDEREAL_DAY_SECS;

/// Julian date of a UTC instant.
pub fn julian_day(at: &DateTime<Utc>) -> f64 {
    let secs = at.timestamp() as f64 + at.timestamp_subsec_nanos() as f64 * 1e-9;
    secs / 86_400.0 + UNIX_EPOCH_JD
}

/// Julian date of a Gregorian calendar date plus fractional hours (Meeus 7.1).
pub fn julian_day_from_calendar(year: i32, month: u32, day: u32, hour_fraction: f64) -> f64 {
    let (y, m) = if month <= 2 {
        (year as f64 - 1.0, month as f64 + 12.0)
    } else {
        (year as f64, month as f64)
    };
    let a = floor(y / 100.0);
    let b = 2.0 - a + floor(a / 4.0);
    floor(365.25 * (y + 4716.0)) + floor(30.6001 * (m + 1.0)) + day as f64 + b - 1524.5
        + hour_fraction / 24.0
}

/// Julian centuries since J2000.0.
#[inline]
pub fn centuries_since_j2000(jd: f64) -> f64 {
    (jd - J2000) / 36_525.0
}

/// Greenwich mean sidereal time in degrees, [0, 360) (Meeus 12.4).
pub fn gmst_deg(jd: f64) -> f64 {
    let t = centuries_since_j2000(jd);
    let theta = 280.460_618_37 + 360.985_647_366_29 * (jd - J2000) + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0;
    wrap_360(theta)
}

/// Local mean sidereal time in degrees for an east-positive longitude.
pub fn local_sidereal_deg(jd: f64, longitude_deg: f64) -> f64 {
    wrap_360(gmst_deg(jd) + longitude_deg)
}

/// Daylight saving handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DstMode {
    /// Never apply daylight saving.
    Off,
    /// Always apply one hour of daylight saving.
    On,
    /// European rule: last Sunday of March to last Sunday of October.
    #[default]
    Auto,
}

/// Fixed standard offset plus a daylight saving mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone {
    offset_minutes: i32,
    dst: DstMode,
}

impl Timezone {
    /// Create a timezone from a standard offset in minutes east of UTC.
    pub const fn new(offset_minutes: i32, dst: DstMode) -> Self {
        Self { offset_minutes, dst }
    }

    /// Standard offset in minutes.
    pub const fn standard_offset_minutes(&self) -> i32 {
        self.offset_minutes
    }

    /// Whether daylight saving is in effect at `utc`.
    ///
    /// Under [`DstMode::Auto`] summer time starts on the last Sunday of March
    /// at 02:00 local standard time and ends on the last Sunday of October at
    /// 03:00 local summer time (02:00 standard).
    pub fn is_dst(&self, utc: &DateTime<Utc>) -> bool {
        match self.dst {
            DstMode::Off => false,
            DstMode::On => true,
            DstMode::Auto => {
                let standard = utc.naive_utc() + Duration::minutes(self.offset_minutes as i64);
                let year = standard.year();
                match (switch_instant(year, 3), switch_instant(year, 10)) {
                    (Some(start), Some(end)) => standard >= start && standard < end,
                    _ => false,
                }
            }
        }
    }

    /// Total offset from UTC at `utc`, including daylight saving.
    pub fn offset_minutes_at(&self, utc: &DateTime<Utc>) -> i32 {
        if self.is_dst(utc) {
            self.offset_minutes + 60
        } else {
            self.offset_minutes
        }
    }

    /// Local wall-clock time of a UTC instant.
    pub fn to_local(&self, utc: &DateTime<Utc>) -> NaiveDateTime {
        utc.naive_utc() + Duration::minutes(self.offset_minutes_at(utc) as i64)
    }

    /// UTC instant of a local wall-clock time.
    ///
    /// Times inside the autumn repeat hour resolve to the summer-time reading.
    pub fn to_utc(&self, local: &NaiveDateTime) -> DateTime<Utc> {
        let standard = Utc.from_utc_datetime(&(*local - Duration::minutes(self.offset_minutes as i64)));
        let summer = standard - Duration::minutes(60);
        if self.is_dst(&summer) {
            summer
        } else {
            standard
        }
    }
}

/// 02:00 on the last Sunday of `month` (a 31-day month).
fn switch_instant(year: i32, month: u32) -> Option<NaiveDateTime> {
    let last_day = NaiveDate::from_ymd_opt(year, month, 31)?;
    let back = last_day.weekday().num_days_from_sunday() as i64;
    last_day
        .checked_sub_signed(Duration::days(back))?
        .and_hms_opt(2, 0, 0)
}
