//! Configuration module for altaz-motion.
//!
//! Provides types for loading, validating and repairing the mount
//! configuration from TOML files (with `std` feature) or pre-parsed data.

mod calibration;
mod drive;
mod observer;
mod profile;
mod system;
mod tuning;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use calibration::{AxisCalibration, BacklashConfig};
pub use drive::DriveConfig;
pub use observer::ObserverConfig;
pub use profile::{GotoProfile, GotoSettings};
pub use system::MountConfig;
pub use tuning::{SchedulerConfig, TrackingTuning};
pub use validation::{repair, validate_config};

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config, to_toml_string};

// Re-export unit types at config level
pub use units::{Degrees, DegreesPerSec, DegreesPerSecSquared, Microsteps};
