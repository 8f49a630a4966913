//! # altaz-motion
//!
//! Motion and pointing core for alt-azimuth telescope mounts with embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Step scheduling**: STEP/DIR pulses paced from summed manual, GOTO and tracking rates
//! - **embedded-hal 1.0**: Uses `OutputPin` for STEP/DIR, `DelayNs` for pulse width
//! - **no_std compatible**: Core library works without standard library
//! - **GOTO planning**: Trapezoidal slews with backlash compensation and arrival prediction
//! - **Sidereal tracking**: Proportional correction toward the refracted target position
//! - **Configuration-driven**: Drive train, calibration and site in TOML files
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use altaz_motion::{MotionEngine, MountController, StepScheduler, AxisDriver};
//! use altaz_motion::astro::{Equatorial, KeplerEphemeris, Target};
//!
//! // Load configuration from TOML
//! let config = altaz_motion::load_config("mount.toml")?;
//!
//! // One engine, shared by the step context and the control context
//! let engine = MotionEngine::new(&config);
//! let mut scheduler = StepScheduler::new(
//!     AxisDriver::new(az_step, az_dir, delay_az, config.drive.invert_az),
//!     AxisDriver::new(alt_step, alt_dir, delay_alt, config.drive.invert_alt),
//!     &config.scheduler,
//! );
//! let mut mount = MountController::new(&config, KeplerEphemeris);
//!
//! mount.goto(&engine, Target::Coordinates(Equatorial::new(5.5, 20.0)), &now)?;
//! loop {
//!     mount.tick(&engine, &now, monotonic_us)?;
//!     scheduler.poll(&engine, monotonic_us);
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O, TOML parsing and `tracing` logs
//! - `alloc`: Enables heap allocation for no_std with allocator
//! - `defmt`: Enables defmt logging for embedded targets (takes precedence over `tracing`)
//! - `tracing`: Log through `tracing` without the rest of `std`

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Must come first so the logging macros are visible everywhere
#[macro_use]
mod fmt;

// Core modules
pub mod astro;
pub mod command;
pub mod config;
pub mod error;
pub mod motion;
pub mod motor;
pub mod mount;
pub mod tracking;

// Re-exports for ergonomic API
pub use command::{Command, Reply};
pub use config::{repair, validate_config, AxisCalibration, BacklashConfig, MountConfig};
pub use error::{Error, Result};
pub use motion::{GotoPlanner, GotoStatus, MotionPhase, TrapezoidalProfile};
pub use motor::{state, Axis, AxisDriver, CommandWatchdog, Direction, MotionEngine, StepScheduler, Wake};
pub use mount::{GotoPlan, MountController, MountState};
pub use tracking::{TrackingController, TrackingState};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Degrees, DegreesPerSec, DegreesPerSecSquared, Microsteps};
