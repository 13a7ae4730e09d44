//! Common error types used across the workspace.
//!
//! Each failure family is its own typed enum; [`HomeError`] aggregates them
//! through `#[from]` conversions so callers can use `?` throughout.

use serde::Serialize;

use crate::device::{DeviceCategory, PropertyKind};
use crate::id::{DeviceId, RuleId};

/// Top-level error returned by every fallible homesim operation.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum HomeError {
    #[error(transparent)]
    InvalidDevice(#[from] InvalidDeviceError),

    #[error(transparent)]
    InvalidParameter(#[from] InvalidParameterError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("rule {0} not found")]
    RuleNotFound(RuleId),

    #[error("rule {0} already exists")]
    DuplicateRuleId(RuleId),

    #[error("rule {0} is disabled")]
    RuleDisabled(RuleId),

    #[error("device {device_id} is referenced by rules {rule_ids:?}")]
    DeviceInUse {
        device_id: DeviceId,
        rule_ids: Vec<RuleId>,
    },
}

/// The targeted device is unknown or of the wrong category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum InvalidDeviceError {
    #[error("device {0} not found")]
    NotFound(DeviceId),

    #[error("device {0} already exists")]
    AlreadyExists(DeviceId),

    #[error("device {device_id} is a {actual}, expected a {expected}")]
    WrongCategory {
        device_id: DeviceId,
        expected: DeviceCategory,
        actual: DeviceCategory,
    },
}

/// A supplied value lies outside its documented domain.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum InvalidParameterError {
    #[error("brightness {0} is outside 0..=100")]
    BrightnessOutOfRange(i64),

    #[error("temperature {0} is not a finite number")]
    NonFiniteTemperature(f64),

    #[error("unknown thermostat mode {0:?}")]
    UnknownThermostatMode(String),

    #[error("color temperature {0}K is outside 1000..=10000")]
    ColorTemperatureOutOfRange(i64),

    #[error("light color must not be empty")]
    EmptyColor,

    #[error("unknown camera feature {0:?}")]
    UnknownCameraFeature(String),

    #[error("property {key:?} is not supported by a {category}")]
    UnknownProperty {
        category: DeviceCategory,
        key: String,
    },

    #[error("property {key:?} expects a {expected} value")]
    PropertyKindMismatch { key: String, expected: PropertyKind },
}

/// A domain invariant was violated while building a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("identifier must not be empty")]
    EmptyId,

    #[error("name must not be empty")]
    EmptyName,

    #[error("room must not be empty")]
    EmptyRoom,

    #[error("a category is required")]
    MissingCategory,

    #[error("unknown device category {0:?}")]
    UnknownCategory(String),

    #[error("at least one action is required")]
    NoActions,

    #[error("invalid time of day {0:?}, expected HH:MM")]
    InvalidTimeOfDay(String),
}
