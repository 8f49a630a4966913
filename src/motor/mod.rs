//! Motor module for altaz-motion.
//!
//! Provides the shared motion engine, the per-axis pin driver and the step
//! scheduler that turns summed rates into STEP pulses.

mod axis;
mod driver;
mod engine;
mod scheduler;
pub mod state;
mod watchdog;

pub use axis::{Axis, Direction};
pub use driver::AxisDriver;
pub use engine::MotionEngine;
pub use scheduler::{StepScheduler, Wake};
pub use state::{AxisRuntimeState, RateSource};
pub use watchdog::CommandWatchdog;
