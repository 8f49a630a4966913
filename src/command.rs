//! Command surface of the motion engine.
//!
//! A [`Command`] is one request from the pointing side of the mount: a name
//! such as `SET_MANUAL_RPM` followed by textual parameters. Axis parameters
//! are `AZ` or `ALT` and always come first. Framing of the link is left to
//! the transport.

use core::fmt;
use core::str::FromStr;

use crate::config::{AxisCalibration, BacklashConfig};
use crate::error::CommandError;
use crate::motor::{Axis, MotionEngine};

/// A request to the motion engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// `SET_MANUAL_RPM axis rpm`
    SetManualRpm {
        /// Axis
        axis: Axis,
        /// Axis revolutions per minute
        rpm: f64,
    },
    /// `SET_MANUAL_SPS axis steps_per_sec`
    SetManualSps {
        /// Axis
        axis: Axis,
        /// Steps per second
        steps_per_sec: f64,
    },
    /// `SET_GOTO_SPS axis steps_per_sec`
    SetGotoSps {
        /// Axis
        axis: Axis,
        /// Steps per second
        steps_per_sec: f64,
    },
    /// `CLEAR_GOTO`
    ClearGoto,
    /// `STOP_ALL`
    StopAll,
    /// `SET_TRACKING_ENABLED 1|0`
    SetTrackingEnabled(bool),
    /// `SET_TRACKING_RATES az_deg_per_sec alt_deg_per_sec`
    SetTrackingRates {
        /// Azimuth rate
        az_deg_per_sec: f64,
        /// Altitude rate
        alt_deg_per_sec: f64,
    },
    /// `GET_STEP_COUNT axis`
    GetStepCount(Axis),
    /// `SET_STEP_COUNT axis steps`
    SetStepCount {
        /// Axis
        axis: Axis,
        /// New count
        steps: i64,
    },
    /// `STEPS_TO_AZ steps`
    StepsToAz(i64),
    /// `STEPS_TO_ALT steps`
    StepsToAlt(i64),
    /// `AZ_TO_STEPS degrees`
    AzToSteps(f64),
    /// `ALT_TO_STEPS degrees`
    AltToSteps(f64),
    /// `APPLY_CALIBRATION spd_az spd_alt az_home alt_home`
    ApplyCalibration(AxisCalibration),
    /// `SET_BACKLASH az_steps alt_steps`
    SetBacklash(BacklashConfig),
    /// `GET_BACKLASH axis`
    GetBacklash(Axis),
    /// `GET_LAST_DIR axis`
    GetLastDir(Axis),
}

/// Successful result of a command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reply {
    /// Done, no payload.
    Ok,
    /// Step count.
    Steps(i64),
    /// Angle in degrees.
    Degrees(f64),
    /// Last direction: -1, 0 or +1.
    Direction(i8),
    /// Backlash in steps.
    Backlash(i32),
}

impl fmt::Display for Reply {
    /// Formats the payload only; [`Reply::Ok`] is empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok => Ok(()),
            Reply::Steps(n) => write!(f, "{}", n),
            Reply::Degrees(d) => write!(f, "{:.6}", d),
            Reply::Direction(d) => write!(f, "{}", d),
            Reply::Backlash(b) => write!(f, "{}", b),
        }
    }
}

/// Positional parameter reader.
struct Params<'a> {
    command: &'static str,
    values: &'a [&'a str],
}

impl<'a> Params<'a> {
    fn raw(&self, index: usize) -> Result<&'a str, CommandError> {
        self.values
            .get(index)
            .map(|s| s.trim())
            .ok_or(CommandError::MissingParameter {
                command: self.command,
                index,
            })
    }

    fn parse<T: FromStr>(&self, index: usize) -> Result<T, CommandError> {
        self.raw(index)?.parse().map_err(|_| CommandError::InvalidParameter {
            command: self.command,
            index,
        })
    }

    fn axis(&self, index: usize) -> Result<Axis, CommandError> {
        Axis::from_name(self.raw(index)?).ok_or(CommandError::InvalidParameter {
            command: self.command,
            index,
        })
    }
}

impl Command {
    /// Parse a command from its name and textual parameters.
    ///
    /// Names are matched exactly. Extra parameters are ignored.
    ///
    /// # Errors
    ///
    /// `UnknownCommand`, `MissingParameter` or `InvalidParameter`.
    pub fn parse(name: &str, params: &[&str]) -> Result<Self, CommandError> {
        let command = Self::canonical_name(name.trim()).ok_or_else(|| {
            let mut unknown = heapless::String::new();
            for c in name.trim().chars() {
                if unknown.push(c).is_err() {
                    break;
                }
            }
            CommandError::UnknownCommand(unknown)
        })?;
        let p = Params {
            command,
            values: params,
        };

        let cmd = match command {
            "SET_MANUAL_RPM" => Command::SetManualRpm {
                axis: p.axis(0)?,
                rpm: p.parse(1)?,
            },
            "SET_MANUAL_SPS" => Command::SetManualSps {
                axis: p.axis(0)?,
                steps_per_sec: p.parse(1)?,
            },
            "SET_GOTO_SPS" => Command::SetGotoSps {
                axis: p.axis(0)?,
                steps_per_sec: p.parse(1)?,
            },
            "CLEAR_GOTO" => Command::ClearGoto,
            "STOP_ALL" => Command::StopAll,
            "SET_TRACKING_ENABLED" => Command::SetTrackingEnabled(p.parse::<i32>(0)? != 0),
            "SET_TRACKING_RATES" => Command::SetTrackingRates {
                az_deg_per_sec: p.parse(0)?,
                alt_deg_per_sec: p.parse(1)?,
            },
            "GET_STEP_COUNT" => Command::GetStepCount(p.axis(0)?),
            "SET_STEP_COUNT" => Command::SetStepCount {
                axis: p.axis(0)?,
                steps: p.parse(1)?,
            },
            "STEPS_TO_AZ" => Command::StepsToAz(p.parse(0)?),
            "STEPS_TO_ALT" => Command::StepsToAlt(p.parse(0)?),
            "AZ_TO_STEPS" => Command::AzToSteps(p.parse(0)?),
            "ALT_TO_STEPS" => Command::AltToSteps(p.parse(0)?),
            "APPLY_CALIBRATION" => Command::ApplyCalibration(AxisCalibration {
                steps_per_degree_az: p.parse(0)?,
                steps_per_degree_alt: p.parse(1)?,
                az_home_offset: p.parse(2)?,
                alt_home_offset: p.parse(3)?,
            }),
            "SET_BACKLASH" => Command::SetBacklash(BacklashConfig {
                az_steps: p.parse(0)?,
                alt_steps: p.parse(1)?,
            }),
            "GET_BACKLASH" => Command::GetBacklash(p.axis(0)?),
            // GET_LAST_DIR, the only name left
            _ => Command::GetLastDir(p.axis(0)?),
        };
        Ok(cmd)
    }

    /// Wire name of the command.
    pub const fn name(&self) -> &'static str {
        match self {
            Command::SetManualRpm { .. } => "SET_MANUAL_RPM",
            Command::SetManualSps { .. } => "SET_MANUAL_SPS",
            Command::SetGotoSps { .. } => "SET_GOTO_SPS",
            Command::ClearGoto => "CLEAR_GOTO",
            Command::StopAll => "STOP_ALL",
            Command::SetTrackingEnabled(_) => "SET_TRACKING_ENABLED",
            Command::SetTrackingRates { .. } => "SET_TRACKING_RATES",
            Command::GetStepCount(_) => "GET_STEP_COUNT",
            Command::SetStepCount { .. } => "SET_STEP_COUNT",
            Command::StepsToAz(_) => "STEPS_TO_AZ",
            Command::StepsToAlt(_) => "STEPS_TO_ALT",
            Command::AzToSteps(_) => "AZ_TO_STEPS",
            Command::AltToSteps(_) => "ALT_TO_STEPS",
            Command::ApplyCalibration(_) => "APPLY_CALIBRATION",
            Command::SetBacklash(_) => "SET_BACKLASH",
            Command::GetBacklash(_) => "GET_BACKLASH",
            Command::GetLastDir(_) => "GET_LAST_DIR",
        }
    }

    fn canonical_name(name: &str) -> Option<&'static str> {
        const NAMES: [&str; 17] = [
            "SET_MANUAL_RPM",
            "SET_MANUAL_SPS",
            "SET_GOTO_SPS",
            "CLEAR_GOTO",
            "STOP_ALL",
            "SET_TRACKING_ENABLED",
            "SET_TRACKING_RATES",
            "GET_STEP_COUNT",
            "SET_STEP_COUNT",
            "STEPS_TO_AZ",
            "STEPS_TO_ALT",
            "AZ_TO_STEPS",
            "ALT_TO_STEPS",
            "APPLY_CALIBRATION",
            "SET_BACKLASH",
            "GET_BACKLASH",
            "GET_LAST_DIR",
        ];
        NAMES.into_iter().find(|n| *n == name)
    }
}

impl MotionEngine {
    /// Execute a command against the engine.
    pub fn execute(&self, command: Command) -> Reply {
        trace!("execute {}", command.name());
        match command {
            Command::SetManualRpm { axis, rpm } => {
                self.set_manual_rate_rpm(axis, rpm);
                Reply::Ok
            }
            Command::SetManualSps {
                axis,
                steps_per_sec,
            } => {
                self.set_manual_rate(axis, steps_per_sec);
                Reply::Ok
            }
            Command::SetGotoSps {
                axis,
                steps_per_sec,
            } => {
                self.set_goto_steps_per_second(axis, steps_per_sec);
                Reply::Ok
            }
            Command::ClearGoto => {
                self.clear_goto_rates();
                Reply::Ok
            }
            Command::StopAll => {
                self.stop_all();
                Reply::Ok
            }
            Command::SetTrackingEnabled(enabled) => {
                self.set_tracking_enabled(enabled);
                Reply::Ok
            }
            Command::SetTrackingRates {
                az_deg_per_sec,
                alt_deg_per_sec,
            } => {
                self.set_tracking_rates(az_deg_per_sec, alt_deg_per_sec);
                Reply::Ok
            }
            Command::GetStepCount(axis) => Reply::Steps(self.step_count(axis)),
            Command::SetStepCount { axis, steps } => {
                self.set_step_count(axis, steps);
                Reply::Ok
            }
            Command::StepsToAz(steps) => Reply::Degrees(self.steps_to_degrees(Axis::Azimuth, steps)),
            Command::StepsToAlt(steps) => {
                Reply::Degrees(self.steps_to_degrees(Axis::Altitude, steps))
            }
            Command::AzToSteps(deg) => Reply::Steps(self.degrees_to_steps(Axis::Azimuth, deg)),
            Command::AltToSteps(deg) => Reply::Steps(self.degrees_to_steps(Axis::Altitude, deg)),
            Command::ApplyCalibration(calibration) => {
                self.apply_calibration(calibration);
                Reply::Ok
            }
            Command::SetBacklash(backlash) => {
                self.apply_backlash(backlash);
                Reply::Ok
            }
            Command::GetBacklash(axis) => Reply::Backlash(self.backlash_steps(axis)),
            Command::GetLastDir(axis) => Reply::Direction(self.last_direction(axis)),
        }
    }
}
