//! Astronomy module for altaz-motion.
//!
//! Time scales, coordinate frames, planetary ephemeris and the sky model that
//! turns a [`Target`] into local azimuth and altitude.

pub mod coords;
pub mod planets;
pub mod target;
pub mod time;

use chrono::{DateTime, Utc};

use crate::config::ObserverConfig;
use crate::error::SkyError;

pub use coords::{Equatorial, Horizontal};
pub use planets::{Ephemeris, KeplerEphemeris, Planet};
pub use target::{Target, POLARIS};
pub use time::{DstMode, Timezone};

/// Observer site plus ephemeris.
#[derive(Debug, Clone)]
pub struct SkyModel<E> {
    observer: ObserverConfig,
    ephemeris: E,
}

impl<E: Ephemeris> SkyModel<E> {
    /// Create a sky model for a site.
    pub fn new(observer: ObserverConfig, ephemeris: E) -> Self {
        Self { observer, ephemeris }
    }

    /// Observer site.
    pub fn observer(&self) -> &ObserverConfig {
        &self.observer
    }

    /// Move the observer.
    pub fn set_observer(&mut self, observer: ObserverConfig) {
        self.observer = observer;
    }

    /// Ephemeris in use.
    pub fn ephemeris(&self) -> &E {
        &self.ephemeris
    }

    /// Local sidereal time in degrees at `at`.
    pub fn local_sidereal_deg(&self, at: &DateTime<Utc>) -> f64 {
        time::local_sidereal_deg(time::julian_day(at), self.observer.longitude_deg)
    }

    /// Geometric horizontal position of `target` at `at`.
    pub fn horizontal(&self, target: &Target, at: &DateTime<Utc>) -> Result<Horizontal, SkyError> {
        let jd = time::julian_day(at);
        let position = target.resolve(&self.ephemeris, jd)?;
        let lst = time::local_sidereal_deg(jd, self.observer.longitude_deg);
        Ok(position.to_horizontal(lst, self.observer.latitude_deg))
    }

    /// Apparent horizontal position of `target` at `at`, refraction applied.
    pub fn apparent(&self, target: &Target, at: &DateTime<Utc>) -> Result<Horizontal, SkyError> {
        self.horizontal(target, at).map(Horizontal::refracted)
    }
}
