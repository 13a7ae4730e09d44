//! Device — a simulated controllable thing in the house.
//!
//! Every device belongs to one [`DeviceCategory`], lives in a room, has a
//! power state and a map of category-specific properties. The set of
//! property keys a device may carry is closed per category; each key also
//! declares the [`PropertyKind`] its value must have.
//!
//! The control methods on [`Device`] validate their inputs *before* touching
//! any field, so a rejected call never leaves a device half-updated.

mod property;

pub use property::{CameraFeature, PropertyKind, PropertyValue, ThermostatMode};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HomeError, InvalidDeviceError, InvalidParameterError, ValidationError};
use crate::id::DeviceId;
use crate::time::Timestamp;

/// Upper bound of a light's brightness, in percent.
pub const MAX_BRIGHTNESS: u8 = 100;

/// Brightness used when a light is turned on without an explicit level.
pub const DEFAULT_BRIGHTNESS: u8 = MAX_BRIGHTNESS;

/// Accepted range of a light's color temperature, in kelvin.
pub const COLOR_TEMP_RANGE: std::ops::RangeInclusive<i64> = 1000..=10_000;

/// The kind of device, which determines its allowed properties and the
/// control operations it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceCategory {
    Light,
    Thermostat,
    Camera,
    Lock,
    MotionSensor,
}

impl DeviceCategory {
    /// All categories, in display order.
    pub const ALL: [Self; 5] = [
        Self::Light,
        Self::Thermostat,
        Self::Camera,
        Self::Lock,
        Self::MotionSensor,
    ];

    /// The closed set of property keys this category accepts.
    #[must_use]
    pub fn property_specs(self) -> &'static [(&'static str, PropertyKind)] {
        match self {
            Self::Light => &[
                ("brightness", PropertyKind::Integer),
                ("color", PropertyKind::Text),
                ("color_temp", PropertyKind::Integer),
            ],
            Self::Thermostat => &[
                ("target_temp", PropertyKind::Number),
                ("current_temp", PropertyKind::Number),
                ("mode", PropertyKind::Text),
                ("humidity", PropertyKind::Integer),
            ],
            Self::Camera => &[
                ("recording", PropertyKind::Bool),
                ("motion_detection", PropertyKind::Bool),
                ("night_vision", PropertyKind::Bool),
            ],
            Self::Lock => &[
                ("locked", PropertyKind::Bool),
                ("auto_lock", PropertyKind::Bool),
            ],
            Self::MotionSensor => &[
                ("sensitivity", PropertyKind::Text),
                ("motion_detected", PropertyKind::Bool),
            ],
        }
    }

    /// Declared kind of `key`, or `None` if the category does not support it.
    #[must_use]
    pub fn property_kind(self, key: &str) -> Option<PropertyKind> {
        self.property_specs()
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, kind)| *kind)
    }

    /// Properties a freshly built device of this category starts with.
    #[must_use]
    pub fn default_properties(self) -> Vec<(&'static str, PropertyValue)> {
        match self {
            Self::Light => vec![
                ("brightness", PropertyValue::Int(0)),
                ("color", PropertyValue::from("white")),
                ("color_temp", PropertyValue::Int(3000)),
            ],
            Self::Thermostat => vec![
                ("target_temp", PropertyValue::Float(72.0)),
                ("current_temp", PropertyValue::Float(72.0)),
                ("mode", PropertyValue::from(ThermostatMode::Auto.as_str())),
                ("humidity", PropertyValue::Int(45)),
            ],
            Self::Camera => vec![
                ("recording", PropertyValue::Bool(false)),
                ("motion_detection", PropertyValue::Bool(true)),
                ("night_vision", PropertyValue::Bool(true)),
            ],
            Self::Lock => vec![
                ("locked", PropertyValue::Bool(true)),
                ("auto_lock", PropertyValue::Bool(true)),
            ],
            Self::MotionSensor => vec![
                ("sensitivity", PropertyValue::from("medium")),
                ("motion_detected", PropertyValue::Bool(false)),
            ],
        }
    }

    /// Power state a freshly built device of this category starts with.
    #[must_use]
    pub fn default_power(self) -> PowerState {
        match self {
            Self::Light | Self::Camera => PowerState::Off,
            Self::Thermostat | Self::Lock | Self::MotionSensor => PowerState::On,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Thermostat => "thermostat",
            Self::Camera => "camera",
            Self::Lock => "lock",
            Self::MotionSensor => "motion_sensor",
        }
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "light" | "lights" => Ok(Self::Light),
            "thermostat" => Ok(Self::Thermostat),
            "camera" | "security_camera" => Ok(Self::Camera),
            "lock" | "door_lock" => Ok(Self::Lock),
            "motion_sensor" | "motion" => Ok(Self::MotionSensor),
            _ => Err(ValidationError::UnknownCategory(s.to_string())),
        }
    }
}

/// Binary power state of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    On,
    #[default]
    Off,
}

impl PowerState {
    #[must_use]
    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

impl From<bool> for PowerState {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
        }
    }
}

/// Read-only copy of every device, keyed by id. Handed to rule conditions.
pub type DeviceSnapshot = BTreeMap<DeviceId, Device>;

/// A simulated device and its current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub category: DeviceCategory,
    pub room: String,
    pub power: PowerState,
    properties: BTreeMap<String, PropertyValue>,
    pub last_updated: Option<Timestamp>,
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::Validation`] when the id, name or room is empty,
    /// or [`HomeError::InvalidParameter`] when a stored property is not
    /// allowed for the category.
    pub fn validate(&self) -> Result<(), HomeError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyId.into());
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.room.trim().is_empty() {
            return Err(ValidationError::EmptyRoom.into());
        }
        for (key, value) in &self.properties {
            check_property(self.category, key, value)?;
        }
        Ok(())
    }

    /// All properties, ordered by key.
    #[must_use]
    pub fn properties(&self) -> &BTreeMap<String, PropertyValue> {
        &self.properties
    }

    /// Look up a property by key.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        self.power.is_on()
    }

    /// Brightness in percent, for lights.
    #[must_use]
    pub fn brightness(&self) -> Option<i64> {
        self.property("brightness").and_then(PropertyValue::as_int)
    }

    /// Target temperature, for thermostats.
    #[must_use]
    pub fn target_temp(&self) -> Option<f64> {
        self.property("target_temp").and_then(PropertyValue::as_number)
    }

    /// Operating mode, for thermostats.
    #[must_use]
    pub fn thermostat_mode(&self) -> Option<ThermostatMode> {
        self.property("mode")
            .and_then(PropertyValue::as_text)
            .and_then(|s| s.parse().ok())
    }

    /// Whether the lock is engaged, for locks.
    #[must_use]
    pub fn is_locked(&self) -> Option<bool> {
        self.property("locked").and_then(PropertyValue::as_bool)
    }

    /// Whether the camera is armed: powered on and recording.
    #[must_use]
    pub fn is_camera_active(&self) -> bool {
        self.category == DeviceCategory::Camera
            && self.is_on()
            && self
                .property("recording")
                .and_then(PropertyValue::as_bool)
                .unwrap_or(false)
    }

    /// Fail unless this device belongs to `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidDeviceError::WrongCategory`] on mismatch.
    pub fn ensure_category(&self, expected: DeviceCategory) -> Result<(), InvalidDeviceError> {
        if self.category == expected {
            Ok(())
        } else {
            Err(InvalidDeviceError::WrongCategory {
                device_id: self.id.clone(),
                expected,
                actual: self.category,
            })
        }
    }

    /// Set a single property after checking it against the category.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameterError::UnknownProperty`] for a key outside the
    /// category's set, or [`InvalidParameterError::PropertyKindMismatch`] when
    /// the value has the wrong kind.
    pub fn set_property(
        &mut self,
        key: &str,
        value: PropertyValue,
        at: Timestamp,
    ) -> Result<(), InvalidParameterError> {
        check_property(self.category, key, &value)?;
        self.properties.insert(key.to_string(), value);
        self.last_updated = Some(at);
        Ok(())
    }

    /// Turn a light on or off. Turning on without a level uses
    /// [`DEFAULT_BRIGHTNESS`]; turning off forces brightness to zero.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::InvalidDevice`] if this is not a light and
    /// [`HomeError::InvalidParameter`] if `brightness` exceeds [`MAX_BRIGHTNESS`].
    pub fn switch_light(
        &mut self,
        on: bool,
        brightness: Option<u8>,
        at: Timestamp,
    ) -> Result<(), HomeError> {
        self.ensure_category(DeviceCategory::Light)?;
        if let Some(level) = brightness {
            if level > MAX_BRIGHTNESS {
                return Err(InvalidParameterError::BrightnessOutOfRange(i64::from(level)).into());
            }
        }
        let level = if on {
            brightness.unwrap_or(DEFAULT_BRIGHTNESS)
        } else {
            0
        };
        self.power = PowerState::from(on);
        self.properties
            .insert("brightness".to_string(), PropertyValue::Int(i64::from(level)));
        self.last_updated = Some(at);
        Ok(())
    }

    /// Store a new thermostat target. Any finite value is accepted verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::InvalidDevice`] if this is not a thermostat and
    /// [`HomeError::InvalidParameter`] if `target` is NaN or infinite.
    pub fn set_target_temperature(&mut self, target: f64, at: Timestamp) -> Result<(), HomeError> {
        self.ensure_category(DeviceCategory::Thermostat)?;
        if !target.is_finite() {
            return Err(InvalidParameterError::NonFiniteTemperature(target).into());
        }
        self.properties
            .insert("target_temp".to_string(), PropertyValue::Float(target));
        self.last_updated = Some(at);
        Ok(())
    }

    /// Change the thermostat's operating mode.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::InvalidDevice`] if this is not a thermostat.
    pub fn set_thermostat_mode(
        &mut self,
        mode: ThermostatMode,
        at: Timestamp,
    ) -> Result<(), HomeError> {
        self.ensure_category(DeviceCategory::Thermostat)?;
        self.properties
            .insert("mode".to_string(), PropertyValue::from(mode.as_str()));
        self.last_updated = Some(at);
        Ok(())
    }

    /// Engage or release a lock.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::InvalidDevice`] if this is not a lock.
    pub fn set_locked(&mut self, locked: bool, at: Timestamp) -> Result<(), HomeError> {
        self.ensure_category(DeviceCategory::Lock)?;
        self.properties
            .insert("locked".to_string(), PropertyValue::Bool(locked));
        self.last_updated = Some(at);
        Ok(())
    }

    /// Arm or disarm a camera. Arming powers it on and starts recording.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::InvalidDevice`] if this is not a camera.
    pub fn set_camera_active(&mut self, active: bool, at: Timestamp) -> Result<(), HomeError> {
        self.ensure_category(DeviceCategory::Camera)?;
        self.power = PowerState::from(active);
        self.properties
            .insert("recording".to_string(), PropertyValue::Bool(active));
        self.last_updated = Some(at);
        Ok(())
    }

    /// Change a light's color and, optionally, its color temperature.
    /// Power and brightness are left alone.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::InvalidDevice`] if this is not a light, and
    /// [`HomeError::InvalidParameter`] for a blank color or a temperature
    /// outside [`COLOR_TEMP_RANGE`].
    pub fn set_light_color(
        &mut self,
        color: &str,
        color_temp: Option<i64>,
        at: Timestamp,
    ) -> Result<(), HomeError> {
        self.ensure_category(DeviceCategory::Light)?;
        let color = color.trim();
        if color.is_empty() {
            return Err(InvalidParameterError::EmptyColor.into());
        }
        if let Some(kelvin) = color_temp {
            if !COLOR_TEMP_RANGE.contains(&kelvin) {
                return Err(InvalidParameterError::ColorTemperatureOutOfRange(kelvin).into());
            }
        }
        self.set_property("color", PropertyValue::from(color), at)?;
        if let Some(kelvin) = color_temp {
            self.set_property("color_temp", PropertyValue::Int(kelvin), at)?;
        }
        Ok(())
    }

    /// Whether a camera feature is switched on.
    #[must_use]
    pub fn camera_feature(&self, feature: CameraFeature) -> Option<bool> {
        self.property(feature.key()).and_then(PropertyValue::as_bool)
    }

    /// Toggle motion detection or night vision on a camera.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::InvalidDevice`] if this is not a camera.
    pub fn set_camera_feature(
        &mut self,
        feature: CameraFeature,
        enabled: bool,
        at: Timestamp,
    ) -> Result<(), HomeError> {
        self.ensure_category(DeviceCategory::Camera)?;
        self.set_property(feature.key(), PropertyValue::Bool(enabled), at)?;
        Ok(())
    }
}

fn check_property(
    category: DeviceCategory,
    key: &str,
    value: &PropertyValue,
) -> Result<(), InvalidParameterError> {
    let kind = category
        .property_kind(key)
        .ok_or_else(|| InvalidParameterError::UnknownProperty {
            category,
            key: key.to_string(),
        })?;
    if !kind.accepts(value) {
        return Err(InvalidParameterError::PropertyKindMismatch {
            key: key.to_string(),
            expected: kind,
        });
    }
    if key == "brightness" {
        if let Some(level) = value.as_int() {
            if !(0..=i64::from(MAX_BRIGHTNESS)).contains(&level) {
                return Err(InvalidParameterError::BrightnessOutOfRange(level));
            }
        }
    }
    if key == "color_temp" {
        if let Some(kelvin) = value.as_int() {
            if !COLOR_TEMP_RANGE.contains(&kelvin) {
                return Err(InvalidParameterError::ColorTemperatureOutOfRange(kelvin));
            }
        }
    }
    if key == "mode" {
        if let Some(text) = value.as_text() {
            text.parse::<ThermostatMode>()?;
        }
    }
    Ok(())
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: Option<DeviceId>,
    name: Option<String>,
    category: Option<DeviceCategory>,
    room: Option<String>,
    power: Option<PowerState>,
    properties: Vec<(String, PropertyValue)>,
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<DeviceId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn category(mut self, category: DeviceCategory) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub fn room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    #[must_use]
    pub fn power(mut self, power: PowerState) -> Self {
        self.power = Some(power);
        self
    }

    /// Override one of the category's default properties.
    #[must_use]
    pub fn property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.push((key.into(), value.into()));
        self
    }

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// The category's default properties are seeded first, then any
    /// explicit properties are layered on top.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::Validation`] if a required field is missing or
    /// empty, or [`HomeError::InvalidParameter`] for a property the category
    /// does not accept.
    pub fn build(self) -> Result<Device, HomeError> {
        let category = self.category.ok_or(ValidationError::MissingCategory)?;
        let mut properties: BTreeMap<String, PropertyValue> = category
            .default_properties()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        properties.extend(self.properties);

        let device = Device {
            id: self.id.unwrap_or_else(|| DeviceId::new("")),
            name: self.name.unwrap_or_default(),
            category,
            room: self.room.unwrap_or_default(),
            power: self.power.unwrap_or_else(|| category.default_power()),
            properties,
            last_updated: None,
        };
        device.validate()?;
        Ok(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> Timestamp {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn light() -> Device {
        Device::builder()
            .id("kitchen_light")
            .name("Kitchen Light")
            .category(DeviceCategory::Light)
            .room("kitchen")
            .build()
            .unwrap()
    }

    fn thermostat() -> Device {
        Device::builder()
            .id("main_thermostat")
            .name("Main Thermostat")
            .category(DeviceCategory::Thermostat)
            .room("hallway")
            .build()
            .unwrap()
    }

    #[test]
    fn should_seed_category_defaults_when_built() {
        let device = light();
        assert_eq!(device.power, PowerState::Off);
        assert_eq!(device.brightness(), Some(0));
        assert_eq!(device.property("color"), Some(&PropertyValue::from("white")));
        assert!(device.last_updated.is_none());
    }

    #[test]
    fn should_override_default_property_via_builder() {
        let device = Device::builder()
            .id("back_door_camera")
            .name("Back Door Camera")
            .category(DeviceCategory::Camera)
            .room("back_door")
            .power(PowerState::On)
            .property("recording", true)
            .build()
            .unwrap();
        assert!(device.is_camera_active());
    }

    #[test]
    fn should_reject_unknown_property_for_category() {
        let result = Device::builder()
            .id("front_door_lock")
            .name("Front Door Lock")
            .category(DeviceCategory::Lock)
            .room("front_door")
            .property("brightness", 50_i64)
            .build();
        assert!(matches!(
            result,
            Err(HomeError::InvalidParameter(
                InvalidParameterError::UnknownProperty { .. }
            ))
        ));
    }

    #[test]
    fn should_reject_property_of_wrong_kind() {
        let result = Device::builder()
            .id("hall_lock")
            .name("Hall Lock")
            .category(DeviceCategory::Lock)
            .room("hall")
            .property("locked", "yes")
            .build();
        assert!(matches!(
            result,
            Err(HomeError::InvalidParameter(
                InvalidParameterError::PropertyKindMismatch { .. }
            ))
        ));
    }

    #[test]
    fn should_return_validation_error_when_category_missing() {
        let result = Device::builder().id("x").name("X").room("r").build();
        assert!(matches!(
            result,
            Err(HomeError::Validation(ValidationError::MissingCategory))
        ));
    }

    #[test]
    fn should_return_validation_error_when_room_is_empty() {
        let result = Device::builder()
            .id("x")
            .name("X")
            .category(DeviceCategory::Light)
            .build();
        assert!(matches!(
            result,
            Err(HomeError::Validation(ValidationError::EmptyRoom))
        ));
    }

    #[test]
    fn should_store_requested_brightness_for_every_valid_level() {
        let mut device = light();
        for level in 0..=MAX_BRIGHTNESS {
            device.switch_light(true, Some(level), at()).unwrap();
            assert_eq!(device.brightness(), Some(i64::from(level)));
            assert!(device.is_on());
        }
    }

    #[test]
    fn should_leave_light_untouched_when_brightness_out_of_range() {
        let mut device = light();
        device.switch_light(true, Some(40), at()).unwrap();
        let before = device.clone();
        for level in (MAX_BRIGHTNESS + 1)..=u8::MAX {
            let result = device.switch_light(false, Some(level), at());
            assert!(matches!(
                result,
                Err(HomeError::InvalidParameter(
                    InvalidParameterError::BrightnessOutOfRange(l)
                )) if l == i64::from(level)
            ));
            assert_eq!(device, before);
        }
    }

    #[test]
    fn should_default_to_full_brightness_when_turned_on_without_level() {
        let mut device = light();
        device.switch_light(true, None, at()).unwrap();
        assert_eq!(device.brightness(), Some(100));
        assert_eq!(device.last_updated, Some(at()));
    }

    #[test]
    fn should_zero_brightness_when_turned_off() {
        let mut device = light();
        device.switch_light(true, Some(70), at()).unwrap();
        device.switch_light(false, None, at()).unwrap();
        assert_eq!(device.power, PowerState::Off);
        assert_eq!(device.brightness(), Some(0));
    }

    #[test]
    fn should_reject_light_control_on_thermostat() {
        let mut device = thermostat();
        let result = device.switch_light(true, None, at());
        assert!(matches!(
            result,
            Err(HomeError::InvalidDevice(InvalidDeviceError::WrongCategory {
                expected: DeviceCategory::Light,
                actual: DeviceCategory::Thermostat,
                ..
            }))
        ));
    }

    #[test]
    fn should_store_out_of_range_temperature_verbatim() {
        let mut device = thermostat();
        device.set_target_temperature(-40.0, at()).unwrap();
        assert_eq!(device.target_temp(), Some(-40.0));
        device.set_target_temperature(250.5, at()).unwrap();
        assert_eq!(device.target_temp(), Some(250.5));
    }

    #[test]
    fn should_reject_non_finite_temperature() {
        let mut device = thermostat();
        let result = device.set_target_temperature(f64::NAN, at());
        assert!(matches!(
            result,
            Err(HomeError::InvalidParameter(
                InvalidParameterError::NonFiniteTemperature(_)
            ))
        ));
        assert_eq!(device.target_temp(), Some(72.0));
    }

    #[test]
    fn should_change_thermostat_mode() {
        let mut device = thermostat();
        device.set_thermostat_mode(ThermostatMode::Cool, at()).unwrap();
        assert_eq!(device.thermostat_mode(), Some(ThermostatMode::Cool));
    }

    #[test]
    fn should_arm_and_disarm_camera() {
        let mut device = Device::builder()
            .id("front_door_camera")
            .name("Front Door Camera")
            .category(DeviceCategory::Camera)
            .room("front_door")
            .build()
            .unwrap();
        assert!(!device.is_camera_active());
        device.set_camera_active(true, at()).unwrap();
        assert!(device.is_camera_active());
        device.set_camera_active(false, at()).unwrap();
        assert!(!device.is_camera_active());
    }

    #[test]
    fn should_toggle_lock() {
        let mut device = Device::builder()
            .id("front_door_lock")
            .name("Front Door Lock")
            .category(DeviceCategory::Lock)
            .room("front_door")
            .build()
            .unwrap();
        assert_eq!(device.is_locked(), Some(true));
        device.set_locked(false, at()).unwrap();
        assert_eq!(device.is_locked(), Some(false));
    }

    #[test]
    fn should_reject_invalid_mode_through_set_property() {
        let mut device = thermostat();
        let result = device.set_property("mode", PropertyValue::from("turbo"), at());
        assert!(matches!(
            result,
            Err(InvalidParameterError::UnknownThermostatMode(_))
        ));
    }

    #[test]
    fn should_change_light_color_without_touching_power() {
        let mut device = light();
        device.switch_light(true, Some(35), at()).unwrap();
        device.set_light_color("amber", Some(2200), at()).unwrap();
        assert_eq!(device.property("color"), Some(&PropertyValue::from("amber")));
        assert_eq!(device.property("color_temp"), Some(&PropertyValue::Int(2200)));
        assert_eq!(device.brightness(), Some(35));
        assert!(device.is_on());

        device.set_light_color("blue", None, at()).unwrap();
        assert_eq!(device.property("color_temp"), Some(&PropertyValue::Int(2200)));
    }

    #[test]
    fn should_leave_light_untouched_when_color_invalid() {
        let mut device = light();
        let before = device.clone();
        assert!(matches!(
            device.set_light_color("red", Some(20_000), at()),
            Err(HomeError::InvalidParameter(
                InvalidParameterError::ColorTemperatureOutOfRange(20_000)
            ))
        ));
        assert!(matches!(
            device.set_light_color("  ", None, at()),
            Err(HomeError::InvalidParameter(InvalidParameterError::EmptyColor))
        ));
        assert_eq!(device, before);
    }

    #[test]
    fn should_reject_light_color_on_thermostat() {
        let mut device = thermostat();
        assert!(matches!(
            device.set_light_color("red", None, at()),
            Err(HomeError::InvalidDevice(InvalidDeviceError::WrongCategory { .. }))
        ));
    }

    #[test]
    fn should_toggle_camera_features_independently_of_arming() {
        let mut device = Device::builder()
            .id("back_door_camera")
            .name("Back Door Camera")
            .category(DeviceCategory::Camera)
            .room("back_door")
            .build()
            .unwrap();
        assert_eq!(device.camera_feature(CameraFeature::MotionDetection), Some(true));
        device
            .set_camera_feature(CameraFeature::MotionDetection, false, at())
            .unwrap();
        assert_eq!(device.camera_feature(CameraFeature::MotionDetection), Some(false));
        assert_eq!(device.camera_feature(CameraFeature::NightVision), Some(true));
        assert!(!device.is_camera_active());
    }

    #[test]
    fn should_reject_camera_feature_on_lock() {
        let mut device = Device::builder()
            .id("front_door_lock")
            .name("Front Door Lock")
            .category(DeviceCategory::Lock)
            .room("front_door")
            .build()
            .unwrap();
        assert!(matches!(
            device.set_camera_feature(CameraFeature::NightVision, false, at()),
            Err(HomeError::InvalidDevice(InvalidDeviceError::WrongCategory {
                expected: DeviceCategory::Camera,
                ..
            }))
        ));
    }

    #[test]
    fn should_parse_category_aliases() {
        assert_eq!(
            "security_camera".parse::<DeviceCategory>().unwrap(),
            DeviceCategory::Camera
        );
        assert_eq!(
            "motion-sensor".parse::<DeviceCategory>().unwrap(),
            DeviceCategory::MotionSensor
        );
        assert!("toaster".parse::<DeviceCategory>().is_err());
    }

    #[test]
    fn should_roundtrip_through_serde_json() {
        let device = light();
        let json = serde_json::to_string(&device).unwrap();
        let parsed: Device = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, device.id);
        assert_eq!(parsed.category, DeviceCategory::Light);
    }
}
