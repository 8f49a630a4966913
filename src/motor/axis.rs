//! Axis identifiers and step direction.

/// One of the two mount axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    /// Horizontal rotation, degrees east of north.
    Azimuth,
    /// Elevation above the horizon.
    Altitude,
}

impl Axis {
    /// Both axes, azimuth first.
    pub const ALL: [Axis; 2] = [Axis::Azimuth, Axis::Altitude];

    /// Short name used on the command link.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Axis::Azimuth => "AZ",
            Axis::Altitude => "ALT",
        }
    }

    /// Array index (azimuth 0, altitude 1).
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Axis::Azimuth => 0,
            Axis::Altitude => 1,
        }
    }

    /// Parse `AZ` / `ALT`, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("AZ") {
            Some(Axis::Azimuth)
        } else if name.eq_ignore_ascii_case("ALT") {
            Some(Axis::Altitude)
        } else {
            None
        }
    }
}

/// Direction of axis motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Increasing step count.
    Forward,
    /// Decreasing step count.
    Reverse,
}

impl Direction {
    /// Direction of a signed quantity. Zero has no direction.
    #[inline]
    pub fn of(value: f64) -> Option<Self> {
        if value > 0.0 {
            Some(Direction::Forward)
        } else if value < 0.0 {
            Some(Direction::Reverse)
        } else {
            None
        }
    }

    /// Decode a stored sign (`+1` / `-1`; anything else is unknown).
    #[inline]
    pub fn from_sign(sign: i8) -> Option<Self> {
        match sign {
            1 => Some(Direction::Forward),
            -1 => Some(Direction::Reverse),
            _ => None,
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub const fn sign(self) -> i8 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }
}
