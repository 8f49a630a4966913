//! Error types for altaz-motion.
//!
//! Provides unified error handling across configuration, GOTO planning,
//! tracking, sky computations and the command surface.

use core::fmt;

use crate::motor::Axis;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all altaz-motion operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// GOTO precondition or planning error
    Goto(GotoError),
    /// Tracking precondition error
    Tracking(TrackingError),
    /// Ephemeris or coordinate error
    Sky(SkyError),
    /// Command surface error
    Command(CommandError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Invalid microstep value (must be power of 2: 1, 2, 4, 8, 16, 32, 64, 128, 256)
    InvalidMicrosteps(u16),
    /// Invalid gear ratio (must be > 0)
    InvalidGearRatio(f32),
    /// Invalid full steps per revolution (must be > 0)
    InvalidStepsPerRevolution(u16),
    /// Steps per degree must be > 0 for GOTO and tracking
    InvalidStepsPerDegree {
        /// Axis with the bad value
        axis: Axis,
        /// Configured value
        value: f64,
    },
    /// Negative backlash on an axis
    NegativeBacklash {
        /// Axis with the bad value
        axis: Axis,
        /// Configured value
        steps: i32,
    },
    /// GOTO profile speed/acceleration/deceleration must all be > 0
    InvalidGotoProfile,
    /// Observer latitude outside [-90, 90]
    InvalidLatitude(f64),
    /// Observer longitude outside [-180, 180]
    InvalidLongitude(f64),
    /// Timezone offset outside [-720, 840] minutes
    InvalidTimezone(i32),
    /// Tracking gain or maximum rate not > 0
    InvalidTrackingTuning,
    /// Scheduler timing values not > 0
    InvalidSchedulerTiming,
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// GOTO errors. All are raised before any motion is commanded.
#[derive(Debug, Clone, PartialEq)]
pub enum GotoError {
    /// Steps-per-degree calibration is not positive
    CalibrationInvalid,
    /// Target is below the minimum visibility altitude
    BelowHorizon {
        /// Computed altitude in degrees (present or predicted)
        altitude_deg: f64,
        /// Configured minimum altitude in degrees
        minimum_deg: f64,
    },
}

/// Tracking errors.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackingError {
    /// Steps-per-degree calibration is not positive
    CalibrationInvalid,
    /// Tracking was updated without a target
    NotActive,
}

/// Sky model errors.
#[derive(Debug, Clone, PartialEq)]
pub enum SkyError {
    /// The ephemeris cannot compute a position for this body
    BodyUnavailable(heapless::String<16>),
}

/// Command surface errors.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// Command name not recognised
    UnknownCommand(heapless::String<32>),
    /// Fewer parameters than the command needs
    MissingParameter {
        /// Command name
        command: &'static str,
        /// Zero-based parameter index
        index: usize,
    },
    /// Parameter could not be parsed
    InvalidParameter {
        /// Command name
        command: &'static str,
        /// Zero-based parameter index
        index: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Goto(e) => write!(f, "Goto error: {}", e),
            Error::Tracking(e) => write!(f, "Tracking error: {}", e),
            Error::Sky(e) => write!(f, "Sky error: {}", e),
            Error::Command(e) => write!(f, "Command error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidMicrosteps(v) => {
                write!(f, "Invalid microsteps: {}. Valid values: 1, 2, 4, 8, 16, 32, 64, 128, 256", v)
            }
            ConfigError::InvalidGearRatio(v) => write!(f, "Invalid gear ratio: {}. Must be > 0", v),
            ConfigError::InvalidStepsPerRevolution(v) => {
                write!(f, "Invalid steps per revolution: {}. Must be > 0", v)
            }
            ConfigError::InvalidStepsPerDegree { axis, value } => {
                write!(f, "Invalid {} steps per degree: {}. Must be > 0", axis.name(), value)
            }
            ConfigError::NegativeBacklash { axis, steps } => {
                write!(f, "Invalid {} backlash: {} steps. Must be >= 0", axis.name(), steps)
            }
            ConfigError::InvalidGotoProfile => {
                write!(f, "Goto profile speed, acceleration and deceleration must be > 0")
            }
            ConfigError::InvalidLatitude(v) => write!(f, "Invalid latitude: {}. Must be -90..90", v),
            ConfigError::InvalidLongitude(v) => write!(f, "Invalid longitude: {}. Must be -180..180", v),
            ConfigError::InvalidTimezone(v) => {
                write!(f, "Invalid timezone offset: {} min. Must be -720..840", v)
            }
            ConfigError::InvalidTrackingTuning => write!(f, "Tracking gain and max rate must be > 0"),
            ConfigError::InvalidSchedulerTiming => write!(f, "Scheduler timing values must be > 0"),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for GotoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GotoError::CalibrationInvalid => write!(f, "Axis calibration invalid"),
            GotoError::BelowHorizon { altitude_deg, minimum_deg } => {
                write!(f, "Target altitude {:.2} below minimum {:.2}", altitude_deg, minimum_deg)
            }
        }
    }
}

impl fmt::Display for TrackingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingError::CalibrationInvalid => write!(f, "Axis calibration invalid"),
            TrackingError::NotActive => write!(f, "No tracking target"),
        }
    }
}

impl fmt::Display for SkyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkyError::BodyUnavailable(name) => write!(f, "No ephemeris for '{}'", name),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnknownCommand(name) => write!(f, "Unknown command '{}'", name),
            CommandError::MissingParameter { command, index } => {
                write!(f, "{}: missing parameter {}", command, index)
            }
            CommandError::InvalidParameter { command, index } => {
                write!(f, "{}: invalid parameter {}", command, index)
            }
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<GotoError> for Error {
    fn from(e: GotoError) -> Self {
        Error::Goto(e)
    }
}

impl From<TrackingError> for Error {
    fn from(e: TrackingError) -> Self {
        Error::Tracking(e)
    }
}

impl From<SkyError> for Error {
    fn from(e: SkyError) -> Self {
        Error::Sky(e)
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Error::Command(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for GotoError {}

#[cfg(feature = "std")]
impl std::error::Error for TrackingError {}

#[cfg(feature = "std")]
impl std::error::Error for SkyError {}

#[cfg(feature = "std")]
impl std::error::Error for CommandError {}
