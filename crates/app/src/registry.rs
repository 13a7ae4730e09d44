//! Device registry — owns every device and exposes typed control operations.
//!
//! Each control call looks the device up, lets the domain validate and apply
//! the change, and returns the updated device. Failures leave the device
//! exactly as it was.

use std::collections::BTreeMap;

use homesim_domain::device::{
    CameraFeature, Device, DeviceCategory, DeviceSnapshot, ThermostatMode,
};
use homesim_domain::error::{HomeError, InvalidDeviceError};
use homesim_domain::id::DeviceId;
use homesim_domain::rule::Action;
use homesim_domain::time::{self, Timestamp};

/// Optional criteria for [`DeviceRegistry::list`].
#[derive(Debug, Clone, Default)]
pub struct DeviceFilter {
    pub category: Option<DeviceCategory>,
    pub room: Option<String>,
}

impl DeviceFilter {
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

    fn matches(&self, device: &Device) -> bool {
        self.category.is_none_or(|c| c == device.category)
            && self.room.as_deref().is_none_or(|r| r == device.room)
    }
}

/// In-memory set of devices, keyed and ordered by id.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: BTreeMap<DeviceId, Device>,
}

impl DeviceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new device after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::Validation`] or [`HomeError::InvalidParameter`]
    /// if the device is invalid, or [`InvalidDeviceError::AlreadyExists`] if
    /// the id is taken.
    #[tracing::instrument(skip(self, device), fields(device_id = %device.id))]
    pub fn add(&mut self, device: Device) -> Result<(), HomeError> {
        device.validate()?;
        if self.devices.contains_key(&device.id) {
            return Err(InvalidDeviceError::AlreadyExists(device.id).into());
        }
        tracing::debug!(category = %device.category, room = %device.room, "device added");
        self.devices.insert(device.id.clone(), device);
        Ok(())
    }

    /// Look up a device by id.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidDeviceError::NotFound`] when no device has `id`.
    pub fn get(&self, id: &DeviceId) -> Result<&Device, HomeError> {
        self.devices
            .get(id)
            .ok_or_else(|| InvalidDeviceError::NotFound(id.clone()).into())
    }

    #[must_use]
    pub fn contains(&self, id: &DeviceId) -> bool {
        self.devices.contains_key(id)
    }

    /// Devices matching `filter`, in id order.
    pub fn list<'a>(&'a self, filter: &'a DeviceFilter) -> impl Iterator<Item = &'a Device> {
        self.devices.values().filter(|d| filter.matches(d))
    }

    /// Every device, in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Number of lights currently on.
    #[must_use]
    pub fn lights_on(&self) -> usize {
        self.devices
            .values()
            .filter(|d| d.category == DeviceCategory::Light && d.is_on())
            .count()
    }

    /// Read-only copy of every device, for rule evaluation.
    #[must_use]
    pub fn snapshot(&self) -> DeviceSnapshot {
        self.devices.clone()
    }

    /// Turn a light on or off, optionally setting its brightness.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::InvalidDevice`] if `id` is unknown or not a light,
    /// and [`HomeError::InvalidParameter`] if `brightness` exceeds 100.
    #[tracing::instrument(skip(self))]
    pub fn control_light(
        &mut self,
        id: &DeviceId,
        on: bool,
        brightness: Option<u8>,
    ) -> Result<&Device, HomeError> {
        self.mutate(id, |device, at| device.switch_light(on, brightness, at))
    }

    /// Set a thermostat's target temperature. Finite values are stored
    /// verbatim, without clamping.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::InvalidDevice`] if `id` is unknown or not a
    /// thermostat, and [`HomeError::InvalidParameter`] for NaN or infinity.
    #[tracing::instrument(skip(self))]
    pub fn control_thermostat(
        &mut self,
        id: &DeviceId,
        target_temp: f64,
    ) -> Result<&Device, HomeError> {
        self.mutate(id, |device, at| device.set_target_temperature(target_temp, at))
    }

    /// Change a thermostat's operating mode.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::InvalidDevice`] if `id` is unknown or not a thermostat.
    #[tracing::instrument(skip(self))]
    pub fn set_thermostat_mode(
        &mut self,
        id: &DeviceId,
        mode: ThermostatMode,
    ) -> Result<&Device, HomeError> {
        self.mutate(id, |device, at| device.set_thermostat_mode(mode, at))
    }

    /// Engage or release a lock.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::InvalidDevice`] if `id` is unknown or not a lock.
    #[tracing::instrument(skip(self))]
    pub fn control_lock(&mut self, id: &DeviceId, locked: bool) -> Result<&Device, HomeError> {
        self.mutate(id, |device, at| device.set_locked(locked, at))
    }

    /// Arm or disarm a camera.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::InvalidDevice`] if `id` is unknown or not a camera.
    #[tracing::instrument(skip(self))]
    pub fn control_camera(&mut self, id: &DeviceId, active: bool) -> Result<&Device, HomeError> {
        self.mutate(id, |device, at| device.set_camera_active(active, at))
    }

    /// Change a light's color, and its color temperature when given.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::InvalidDevice`] if `id` is unknown or not a light,
    /// and [`HomeError::InvalidParameter`] for a blank color or an
    /// out-of-range temperature.
    #[tracing::instrument(skip(self))]
    pub fn set_light_color(
        &mut self,
        id: &DeviceId,
        color: &str,
        color_temp: Option<i64>,
    ) -> Result<&Device, HomeError> {
        self.mutate(id, |device, at| device.set_light_color(color, color_temp, at))
    }

    /// Switch a camera feature on or off without arming or disarming it.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::InvalidDevice`] if `id` is unknown or not a camera.
    #[tracing::instrument(skip(self))]
    pub fn set_camera_feature(
        &mut self,
        id: &DeviceId,
        feature: CameraFeature,
        enabled: bool,
    ) -> Result<&Device, HomeError> {
        self.mutate(id, |device, at| device.set_camera_feature(feature, enabled, at))
    }

    /// Apply a rule action to its target device, stamping it with `at`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidDeviceError::NotFound`] if the target is gone, or the
    /// category/parameter error raised by the device.
    pub fn apply(&mut self, action: &Action, at: Timestamp) -> Result<(), HomeError> {
        let device = self
            .devices
            .get_mut(&action.device_id)
            .ok_or_else(|| InvalidDeviceError::NotFound(action.device_id.clone()))?;
        action.apply(device, at)
    }

    /// Remove a device, returning it.
    ///
    /// Callers are expected to have checked that no rule still references
    /// the device; see `Home::remove_device`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidDeviceError::NotFound`] when no device has `id`.
    pub fn remove(&mut self, id: &DeviceId) -> Result<Device, HomeError> {
        self.devices
            .remove(id)
            .ok_or_else(|| InvalidDeviceError::NotFound(id.clone()).into())
    }

    fn mutate<F>(&mut self, id: &DeviceId, change: F) -> Result<&Device, HomeError>
    where
        F: FnOnce(&mut Device, Timestamp) -> Result<(), HomeError>,
    {
        let device = self
            .devices
            .get_mut(id)
            .ok_or_else(|| InvalidDeviceError::NotFound(id.clone()))?;
        change(device, time::now())?;
        tracing::debug!(power = %device.power, "device updated");
        Ok(device)
    }
}
