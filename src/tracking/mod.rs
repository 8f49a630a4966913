//! Sidereal tracking.
//!
//! Keeps the mount on a target by feeding the tracking rate contribution of
//! the [`MotionEngine`](crate::motor::MotionEngine).

mod controller;

pub use controller::{TrackingController, TrackingState};
