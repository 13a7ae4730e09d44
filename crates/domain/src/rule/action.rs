//! Action — one device command performed when a rule fires.

use serde::{Deserialize, Serialize};

use crate::device::{Device, ThermostatMode};
use crate::error::HomeError;
use crate::id::DeviceId;
use crate::time::Timestamp;

/// The operation an [`Action`] performs on its target device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    TurnOnLight {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        brightness: Option<u8>,
    },
    TurnOffLight,
    SetTemperature {
        target: f64,
    },
    SetThermostatMode {
        mode: ThermostatMode,
    },
    Lock,
    Unlock,
    ArmCamera,
    DisarmCamera,
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TurnOnLight {
                brightness: Some(level),
            } => write!(f, "turn_on({level}%)"),
            Self::TurnOnLight { brightness: None } => f.write_str("turn_on"),
            Self::TurnOffLight => f.write_str("turn_off"),
            Self::SetTemperature { target } => write!(f, "set_temperature({target})"),
            Self::SetThermostatMode { mode } => write!(f, "set_mode({mode})"),
            Self::Lock => f.write_str("lock"),
            Self::Unlock => f.write_str("unlock"),
            Self::ArmCamera => f.write_str("arm"),
            Self::DisarmCamera => f.write_str("disarm"),
        }
    }
}

/// A command aimed at one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub device_id: DeviceId,
    #[serde(flatten)]
    pub command: Command,
}

impl Action {
    #[must_use]
    pub fn new(device_id: impl Into<DeviceId>, command: Command) -> Self {
        Self {
            device_id: device_id.into(),
            command,
        }
    }

    #[must_use]
    pub fn turn_on_light(device_id: impl Into<DeviceId>, brightness: Option<u8>) -> Self {
        Self::new(device_id, Command::TurnOnLight { brightness })
    }

    #[must_use]
    pub fn turn_off_light(device_id: impl Into<DeviceId>) -> Self {
        Self::new(device_id, Command::TurnOffLight)
    }

    #[must_use]
    pub fn set_temperature(device_id: impl Into<DeviceId>, target: f64) -> Self {
        Self::new(device_id, Command::SetTemperature { target })
    }

    #[must_use]
    pub fn lock(device_id: impl Into<DeviceId>) -> Self {
        Self::new(device_id, Command::Lock)
    }

    #[must_use]
    pub fn unlock(device_id: impl Into<DeviceId>) -> Self {
        Self::new(device_id, Command::Unlock)
    }

    #[must_use]
    pub fn arm_camera(device_id: impl Into<DeviceId>) -> Self {
        Self::new(device_id, Command::ArmCamera)
    }

    #[must_use]
    pub fn disarm_camera(device_id: impl Into<DeviceId>) -> Self {
        Self::new(device_id, Command::DisarmCamera)
    }

    /// Apply the command to `device`, which must be the action's target.
    ///
    /// # Errors
    ///
    /// Propagates the device's category or parameter error; the device is
    /// left unchanged in that case.
    pub fn apply(&self, device: &mut Device, at: Timestamp) -> Result<(), HomeError> {
        match &self.command {
            Command::TurnOnLight { brightness } => device.switch_light(true, *brightness, at),
            Command::TurnOffLight => device.switch_light(false, None, at),
            Command::SetTemperature { target } => device.set_target_temperature(*target, at),
            Command::SetThermostatMode { mode } => device.set_thermostat_mode(*mode, at),
            Command::Lock => device.set_locked(true, at),
            Command::Unlock => device.set_locked(false, at),
            Command::ArmCamera => device.set_camera_active(true, at),
            Command::DisarmCamera => device.set_camera_active(false, at),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.command, self.device_id)
    }
}
