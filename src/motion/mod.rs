//! Motion module for altaz-motion.
//!
//! Provides trapezoidal profile math and the GOTO trajectory planner.

mod goto;
mod profile;

pub use goto::{AxisGotoRuntime, GotoPhase, GotoPlanner, GotoStatus};
pub use profile::{MotionPhase, TrapezoidalProfile};
