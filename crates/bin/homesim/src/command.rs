//! Interactive commands — one line of user input parsed into a [`Command`].
//!
//! Input is case-insensitive and whitespace separated:
//!
//! ```text
//! lights on kitchen 60
//! occupy bedroom true
//! routine bedtime
//! ```

use std::str::FromStr;

use homesim_domain::device::{CameraFeature, DeviceCategory, ThermostatMode};
use homesim_domain::error::{InvalidParameterError, ValidationError};
use homesim_domain::id::{DeviceId, RuleId};

/// Room whose light `lights` controls when none is given.
pub const DEFAULT_LIGHT_ROOM: &str = "living_room";

/// A parsed user command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Status,
    Devices(Option<DeviceCategory>),
    Lights {
        on: bool,
        room: String,
        brightness: Option<i64>,
    },
    Color {
        room: String,
        color: String,
        color_temp: Option<i64>,
    },
    Temp(f64),
    Mode(ThermostatMode),
    Lock(DeviceId),
    Unlock(DeviceId),
    Camera {
        device_id: DeviceId,
        active: bool,
    },
    CameraFeature {
        device_id: DeviceId,
        feature: CameraFeature,
        enabled: bool,
    },
    Occupy {
        room: String,
        occupied: bool,
    },
    Routine(RuleId),
    Rules,
    Enable(RuleId),
    Disable(RuleId),
    Suggestions,
    History,
    Help,
    Quit,
}

/// Reasons a line cannot be turned into a [`Command`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`, type `help` for the list")]
    Unknown(String),
    #[error("`{command}` needs a {argument}")]
    MissingArgument {
        command: String,
        argument: &'static str,
    },
    #[error("invalid {argument} `{value}`")]
    InvalidArgument {
        argument: &'static str,
        value: String,
    },
    #[error("unexpected argument `{0}`")]
    UnexpectedArgument(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    InvalidParameter(#[from] InvalidParameterError),
}

struct Args<'a> {
    command: &'a str,
    tokens: std::slice::Iter<'a, &'a str>,
}

impl<'a> Args<'a> {
    fn required(&mut self, argument: &'static str) -> Result<&'a str, ParseCommandError> {
        self.tokens
            .next()
            .copied()
            .ok_or_else(|| ParseCommandError::MissingArgument {
                command: self.command.to_string(),
                argument,
            })
    }

    fn optional(&mut self) -> Option<&'a str> {
        self.tokens.next().copied()
    }

    fn finish(mut self) -> Result<(), ParseCommandError> {
        match self.tokens.next() {
            Some(extra) => Err(ParseCommandError::UnexpectedArgument((*extra).to_string())),
            None => Ok(()),
        }
    }
}

fn parse_switch(argument: &'static str, value: &str) -> Result<bool, ParseCommandError> {
    match value {
        "on" => Ok(true),
        "off" => Ok(false),
        _ => Err(ParseCommandError::InvalidArgument {
            argument,
            value: value.to_string(),
        }),
    }
}

fn parse_flag(argument: &'static str, value: &str) -> Result<bool, ParseCommandError> {
    match value {
        "true" | "yes" => Ok(true),
        "false" | "no" => Ok(false),
        _ => Err(ParseCommandError::InvalidArgument {
            argument,
            value: value.to_string(),
        }),
    }
}

fn parse_number<T: FromStr>(argument: &'static str, value: &str) -> Result<T, ParseCommandError> {
    value
        .parse()
        .map_err(|_| ParseCommandError::InvalidArgument {
            argument,
            value: value.to_string(),
        })
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim().to_ascii_lowercase();
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((head, rest)) = tokens.split_first() else {
            return Err(ParseCommandError::Empty);
        };
        let mut args = Args {
            command: *head,
            tokens: rest.iter(),
        };

        let parsed = match *head {
            "status" => Self::Status,
            "devices" => Self::Devices(args.optional().map(str::parse).transpose()?),
            "lights" => {
                let on = parse_switch("switch", args.required("on|off")?)?;
                let room = args.optional().unwrap_or(DEFAULT_LIGHT_ROOM).to_string();
                let brightness = args
                    .optional()
                    .map(|v| parse_number("brightness", v))
                    .transpose()?;
                Self::Lights {
                    on,
                    room,
                    brightness,
                }
            }
            "temp" => Self::Temp(parse_number("temperature", args.required("temperature")?)?),
            "mode" => Self::Mode(args.required("mode")?.parse()?),
            "lock" => Self::Lock(args.required("device")?.parse()?),
            "unlock" => Self::Unlock(args.required("device")?.parse()?),
            "color" => Self::Color {
                room: args.required("room")?.to_string(),
                color: args.required("color")?.to_string(),
                color_temp: args
                    .optional()
                    .map(|v| parse_number("color temperature", v))
                    .transpose()?,
            },
            "camera" => {
                let device_id = args.required("device")?.parse()?;
                match args.required("on|off")? {
                    switch @ ("on" | "off") => Self::Camera {
                        device_id,
                        active: parse_switch("switch", switch)?,
                    },
                    feature => Self::CameraFeature {
                        device_id,
                        feature: feature.parse()?,
                        enabled: parse_switch("switch", args.required("on|off")?)?,
                    },
                }
            }
            "occupy" => Self::Occupy {
                room: args.required("room")?.to_string(),
                occupied: parse_flag("occupancy", args.required("true|false")?)?,
            },
            "routine" => Self::Routine(args.required("rule id")?.parse()?),
            "rules" => Self::Rules,
            "enable" => Self::Enable(args.required("rule id")?.parse()?),
            "disable" => Self::Disable(args.required("rule id")?.parse()?),
            "suggestions" => Self::Suggestions,
            "history" => Self::History,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(ParseCommandError::Unknown(other.to_string())),
        };
        args.finish()?;
        Ok(parsed)
    }
}

/// Text printed by `help`.
pub const HELP: &str = "\
Commands:
  status                          show devices, occupancy, suggestions and recent runs
  devices [category]              list devices, optionally of one category
  lights <on|off> [room] [level]  switch a room's light (default living_room)
  temp <value>                    set the main thermostat target
  mode <auto|heat|cool|off>       set the main thermostat mode
  lock <device>                   lock a door
  unlock <device>                 unlock a door
  color <room> <color> [kelvin]   change a room light's color
  camera <device> <on|off>        arm or disarm a camera
  camera <device> <motion|night> <on|off>
                                  toggle motion detection or night vision
  occupy <room> <true|false>      mark a room occupied or empty
  routine <rule_id>               run a rule now
  rules                           list rules
  enable <rule_id>                enable a rule
  disable <rule_id>               disable a rule
  suggestions                     show contextual suggestions
  history                         show recent rule runs
  help                            show this text
  quit                            exit";
