//! Pointing targets.

use crate::error::SkyError;

use super::coords::Equatorial;
use super::planets::{Ephemeris, Planet};

/// Polaris, used for polar alignment.
pub const POLARIS: Equatorial = Equatorial::new(2.530_301, 89.264_1);

/// Something the mount can point at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    /// Catalog object with fixed coordinates.
    Catalog {
        /// Catalog index.
        index: u16,
        /// Catalog coordinates.
        position: Equatorial,
    },
    /// Solar system body, resolved through an ephemeris.
    Body(Planet),
    /// Raw right ascension and declination.
    Coordinates(Equatorial),
}

impl Target {
    /// Equatorial position at `julian_day`.
    ///
    /// Fixed targets ignore the ephemeris.
    pub fn resolve<E: Ephemeris + ?Sized>(
        &self,
        ephemeris: &E,
        julian_day: f64,
    ) -> Result<Equatorial, SkyError> {
        match *self {
            Target::Catalog { position, .. } | Target::Coordinates(position) => Ok(position),
            Target::Body(body) => ephemeris.position_at(body, julian_day),
        }
    }

    /// Whether the position changes with time beyond sidereal rotation.
    pub fn is_moving(&self) -> bool {
        matches!(self, Target::Body(_))
    }
}

impl From<Equatorial> for Target {
    fn from(position: Equatorial) -> Self {
        Target::Coordinates(position)
    }
}

impl From<Planet> for Target {
    fn from(body: Planet) -> Self {
        Target::Body(body)
    }
}
