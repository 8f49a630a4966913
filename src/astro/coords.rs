//! Equatorial and horizontal coordinates.

use libm::{asin, atan2, cos, fmod, sin, tan};

/// Wrap an angle to [0, 360).
pub fn wrap_360(degrees: f64) -> f64 {
    let mut wrapped = fmod(degrees, 360.0);
    if wrapped < 0.0 {
        wrapped += 360.0;
    }
    if wrapped >= 360.0 {
        // -1e-17 + 360.0 rounds to 360.0
        wrapped = 0.0;
    }
    wrapped
}

/// Fold an angle into [-180, 180).
pub fn normalize_180(degrees: f64) -> f64 {
    wrap_360(degrees + 180.0) - 180.0
}

/// Signed shortest rotation from `from` to `to`, in (-180, 180].
pub fn shortest_delta(from: f64, to: f64) -> f64 {
    let delta = normalize_180(to - from);
    if delta == -180.0 {
        180.0
    } else {
        delta
    }
}

/// Sky position in the equatorial frame of date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Equatorial {
    /// Right ascension in hours, [0, 24).
    pub ra_hours: f64,
    /// Declination in degrees.
    pub dec_deg: f64,
}

impl Equatorial {
    /// Create a position.
    pub const fn new(ra_hours: f64, dec_deg: f64) -> Self {
        Self { ra_hours, dec_deg }
    }

    /// Right ascension in degrees.
    #[inline]
    pub fn ra_deg(&self) -> f64 {
        self.ra_hours * 15.0
    }

    /// Convert to horizontal coordinates for a site.
    ///
    /// `lst_deg` is local sidereal time and `latitude_deg` the site latitude.
    /// Azimuth is measured from north through east.
    pub fn to_horizontal(&self, lst_deg: f64, latitude_deg: f64) -> Horizontal {
        let ha = (lst_deg - self.ra_deg()).to_radians();
        let dec = self.dec_deg.to_radians();
        let lat = latitude_deg.to_radians();

        let sin_alt = (sin(dec) * sin(lat) + cos(dec) * cos(lat) * cos(ha)).clamp(-1.0, 1.0);
        let alt = asin(sin_alt);

        let y = -sin(ha) * cos(dec);
        let x = sin(dec) * cos(lat) - cos(dec) * sin(lat) * cos(ha);
        let az = atan2(y, x);

        Horizontal {
            az_deg: wrap_360(az.to_degrees()),
            alt_deg: alt.to_degrees(),
        }
    }
}

/// Local horizontal position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Horizontal {
    /// Azimuth in degrees, north 0, east 90, [0, 360).
    pub az_deg: f64,
    /// Altitude above the horizon in degrees.
    pub alt_deg: f64,
}

impl Horizontal {
    /// Create a position; azimuth is wrapped.
    pub fn new(az_deg: f64, alt_deg: f64) -> Self {
        Self {
            az_deg: wrap_360(az_deg),
            alt_deg,
        }
    }

    /// Apparent position after atmospheric refraction.
    pub fn refracted(self) -> Self {
        Self {
            az_deg: self.az_deg,
            alt_deg: self.alt_deg + refraction_deg(self.alt_deg),
        }
    }

    /// Shift by offsets; azimuth wraps.
    pub fn offset(self, az_offset_deg: f64, alt_offset_deg: f64) -> Self {
        Self::new(self.az_deg + az_offset_deg, self.alt_deg + alt_offset_deg)
    }
}

/// Atmospheric refraction in degrees for a true altitude (Sæmundsson).
///
/// Zero outside [-1°, 90°].
pub fn refraction_deg(altitude_deg: f64) -> f64 {
    if !(-1.0..=90.0).contains(&altitude_deg) {
        return 0.0;
    }
    let arg = (altitude_deg + 10.3 / (altitude_deg + 5.11)).to_radians();
    let arcmin = 1.02 / tan(arg);
    arcmin / 60.0
}
