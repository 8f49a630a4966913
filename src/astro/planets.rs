//! Planetary positions from mean Keplerian elements.
//!
//! Elements are the J2000 values with linear rates per Julian century
//! (Standish, JPL "Approximate Positions of the Planets"), good to a few
//! arcminutes between 1800 and 2050.

use libm::{atan2, cos, fabs, sin, sqrt};

use crate::error::SkyError;

use super::coords::{wrap_360, Equatorial};
use super::time::centuries_since_j2000;

/// Solar system bodies known to the pointing engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Planet {
    /// Mercury
    Mercury,
    /// Venus
    Venus,
    /// Earth (observer's own planet; never a target)
    Earth,
    /// Mars
    Mars,
    /// Jupiter
    Jupiter,
    /// Saturn
    Saturn,
    /// Uranus
    Uranus,
    /// Neptune
    Neptune,
    /// The Moon (not covered by the Keplerian model)
    Moon,
}

impl Planet {
    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            Planet::Mercury => "Mercury",
            Planet::Venus => "Venus",
            Planet::Earth => "Earth",
            Planet::Mars => "Mars",
            Planet::Jupiter => "Jupiter",
            Planet::Saturn => "Saturn",
            Planet::Uranus => "Uranus",
            Planet::Neptune => "Neptune",
            Planet::Moon => "Moon",
        }
    }

    /// Parse a body name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        const ALL: [Planet; 9] = [
            Planet::Mercury,
            Planet::Venus,
            Planet::Earth,
            Planet::Mars,
            Planet::Jupiter,
            Planet::Saturn,
            Planet::Uranus,
            Planet::Neptune,
            Planet::Moon,
        ];
        ALL.into_iter().find(|p| p.name().eq_ignore_ascii_case(name.trim()))
    }

    fn elements(self) -> Option<&'static OrbitalElements> {
        let index = match self {
            Planet::Mercury => 0,
            Planet::Venus => 1,
            Planet::Earth => 2,
            Planet::Mars => 3,
            Planet::Jupiter => 4,
            Planet::Saturn => 5,
            Planet::Uranus => 6,
            Planet::Neptune => 7,
            Planet::Moon => return None,
        };
        Some(&ELEMENTS[index])
    }
}

/// Source of apparent equatorial positions for solar system bodies.
pub trait Ephemeris {
    /// Geocentric position of `body` at `julian_day`.
    ///
    /// # Errors
    ///
    /// Returns `SkyError::BodyUnavailable` if the body can't be computed.
    fn position_at(&self, body: Planet, julian_day: f64) -> Result<Equatorial, SkyError>;
}

/// Geocentric position with distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanetPosition {
    /// Equatorial coordinates.
    pub equatorial: Equatorial,
    /// Distance from Earth in AU.
    pub distance_au: f64,
}

/// Mean orbital elements: value at J2000 and rate per century.
#[derive(Debug, Clone, Copy)]
struct OrbitalElements {
    /// Semi-major axis (AU).
    a: [f64; 2],
    /// Eccentricity.
    e: [f64; 2],
    /// Inclination (deg).
    i: [f64; 2],
    /// Mean longitude (deg).
    l: [f64; 2],
    /// Longitude of perihelion (deg).
    peri: [f64; 2],
    /// Longitude of ascending node (deg).
    node: [f64; 2],
}

#[rustfmt::skip]
const ELEMENTS: [OrbitalElements; 8] = [
    // Mercury
    OrbitalElements { a: [0.38709927, 0.00000037], e: [0.20563593, 0.00001906], i: [7.00497902, -0.00594749],
        l: [252.25032350, 149472.67411175], peri: [77.45779628, 0.16047689], node: [48.33076593, -0.12534081] },
    // Venus
    OrbitalElements { a: [0.72333566, 0.00000390], e: [0.00677672, -0.00004107], i: [3.39467605, -0.00078890],
        l: [181.97909950, 58517.81538729], peri: [131.60246718, 0.00268329], node: [76.67984255, -0.27769418] },
    // Earth-Moon barycentre
    OrbitalElements { a: [1.00000261, 0.00000562], e: [0.01671123, -0.00004392], i: [-0.00001531, -0.01294668],
        l: [100.46457166, 35999.37244981], peri: [102.93768193, 0.32327364], node: [0.0, 0.0] },
    // Mars
    OrbitalElements { a: [1.52371034, 0.00001847], e: [0.09339410, 0.00007882], i: [1.84969142, -0.00813131],
        l: [-4.55343205, 19140.30268499], peri: [-23.94362959, 0.44441088], node: [49.55953891, -0.29257343] },
    // Jupiter
    OrbitalElements { a: [5.20288700, -0.00011607], e: [0.04838624, -0.00013253], i: [1.30439695, -0.00183714],
        l: [34.39644051, 3034.74612775], peri: [14.72847983, 0.21252668], node: [100.47390909, 0.20469106] },
    // Saturn
    OrbitalElements { a: [9.53667594, -0.00125060], e: [0.05386179, -0.00050991], i: [2.48599187, 0.00193609],
        l: [49.95424423, 1222.49362201], peri: [92.59887831, -0.41897216], node: [113.66242448, -0.28867794] },
    // Uranus
    OrbitalElements { a: [19.18916464, -0.00196176], e: [0.04725744, -0.00004397], i: [0.77263783, -0.00242939],
        l: [313.23810451, 428.48202785], peri: [170.95427630, 0.40805281], node: [74.01692503, 0.04240589] },
    // Neptune
    OrbitalElements { a: [30.06992276, 0.00026291], e: [0.00859048, 0.00005105], i: [1.77004347, 0.00035372],
        l: [-55.12002969, 218.45945325], peri: [44.96476227, -0.32241464], node: [131.78422574, -0.00508664] },
];

const KEPLER_ITERATIONS: usize = 5;

/// Built-in ephemeris for Mercury through Neptune.
///
/// Earth and the Moon are rejected with `SkyError::BodyUnavailable`.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeplerEphemeris;

impl KeplerEphemeris {
    /// Geocentric position and distance of `body`.
    ///
    /// # Errors
    ///
    /// Returns `SkyError::BodyUnavailable` for Earth and the Moon.
    pub fn geocentric(&self, body: Planet, julian_day: f64) -> Result<PlanetPosition, SkyError> {
        let elements = match body {
            Planet::Earth | Planet::Moon => None,
            other => other.elements(),
        }
        .ok_or_else(|| unavailable(body))?;
        let earth = Planet::Earth.elements().ok_or_else(|| unavailable(body))?;

        let t = centuries_since_j2000(julian_day);
        let p = heliocentric_ecliptic(elements, t);
        let e = heliocentric_ecliptic(earth, t);
        let (gx, gy, gz) = (p[0] - e[0], p[1] - e[1], p[2] - e[2]);

        // Ecliptic to equatorial
        let eps = (23.439_291 - 0.013_004_2 * t).to_radians();
        let x = gx;
        let y = gy * cos(eps) - gz * sin(eps);
        let z = gy * sin(eps) + gz * cos(eps);

        let ra_deg = wrap_360(atan2(y, x).to_degrees());
        let dec_deg = atan2(z, sqrt(x * x + y * y)).to_degrees();

        Ok(PlanetPosition {
            equatorial: Equatorial::new(ra_deg / 15.0, dec_deg),
            distance_au: sqrt(x * x + y * y + z * z),
        })
    }
}

impl Ephemeris for KeplerEphemeris {
    fn position_at(&self, body: Planet, julian_day: f64) -> Result<Equatorial, SkyError> {
        self.geocentric(body, julian_day).map(|p| p.equatorial)
    }
}

fn unavailable(body: Planet) -> SkyError {
    SkyError::BodyUnavailable(heapless::String::try_from(body.name()).unwrap_or_default())
}

/// Solve Kepler's equation `E - e sin E = M` by Newton iteration.
fn solve_kepler(mean_anomaly: f64, eccentricity: f64) -> f64 {
    let mut ecc_anomaly = mean_anomaly;
    for _ in 0..KEPLER_ITERATIONS {
        let delta = (ecc_anomaly - eccentricity * sin(ecc_anomaly) - mean_anomaly)
            / (1.0 - eccentricity * cos(ecc_anomaly));
        ecc_anomaly -= delta;
        if fabs(delta) < 1e-8 {
            break;
        }
    }
    ecc_anomaly
}

/// Heliocentric ecliptic J2000 position in AU.
fn heliocentric_ecliptic(el: &OrbitalElements, t: f64) -> [f64; 3] {
    let at = |v: [f64; 2]| v[0] + v[1] * t;

    let a = at(el.a);
    let e = at(el.e);
    let incl = at(el.i).to_radians();
    let long = wrap_360(at(el.l)).to_radians();
    let peri = wrap_360(at(el.peri)).to_radians();
    let node = wrap_360(at(el.node)).to_radians();

    let mean_anomaly = wrap_360((long - peri).to_degrees()).to_radians();
    let ecc_anomaly = solve_kepler(mean_anomaly, e);

    let xv = cos(ecc_anomaly) - e;
    let yv = sqrt(1.0 - e * e) * sin(ecc_anomaly);
    let true_anomaly = atan2(yv, xv);
    let r = a * (1.0 - e * cos(ecc_anomaly));

    let arg_peri = peri - node;
    let (sin_o, cos_o) = (sin(node), cos(node));
    let (sin_i, cos_i) = (sin(incl), cos(incl));
    let (sin_u, cos_u) = (sin(true_anomaly + arg_peri), cos(true_anomaly + arg_peri));

    [
        r * (cos_o * cos_u - sin_o * sin_u * cos_i),
        r * (sin_o * cos_u + cos_o * sin_u * cos_i),
        r * (sin_u * sin_i),
    ]
}
