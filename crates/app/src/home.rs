//! Home — the single context object owning devices, occupancy and rules.
//!
//! Every operation of the simulator goes through a [`Home`]. It forwards to
//! the [`DeviceRegistry`], [`OccupancyTracker`] and [`RuleEngine`] and adds
//! the few operations that need more than one of them.

use serde::Serialize;

use homesim_domain::device::{CameraFeature, Device, ThermostatMode};
use homesim_domain::error::HomeError;
use homesim_domain::id::{DeviceId, RuleId};
use homesim_domain::occupancy::OccupancySnapshot;
use homesim_domain::report::ExecutionReport;
use homesim_domain::rule::Rule;
use homesim_domain::suggestion::{self, Suggestion};
use homesim_domain::time::Timestamp;

use crate::defaults;
use crate::occupancy::OccupancyTracker;
use crate::registry::{DeviceFilter, DeviceRegistry};
use crate::rule_engine::{DEFAULT_HISTORY_CAPACITY, RuleEngine};

/// Settings applied when a [`Home`] is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomeOptions {
    /// Number of execution reports kept in history.
    pub history_capacity: usize,
}

impl Default for HomeOptions {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

/// Serializable view of the whole house.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub devices: Vec<Device>,
    pub occupancy: OccupancySnapshot,
    pub home_occupied: bool,
    pub recent_reports: Vec<ExecutionReport>,
}

/// The simulated house.
#[derive(Debug, Clone)]
pub struct Home {
    devices: DeviceRegistry,
    occupancy: OccupancyTracker,
    rules: RuleEngine,
}

impl Home {
    /// A house with no devices, rooms or rules.
    #[must_use]
    pub fn empty(options: HomeOptions) -> Self {
        Self {
            devices: DeviceRegistry::new(),
            occupancy: OccupancyTracker::new(),
            rules: RuleEngine::new(options.history_capacity),
        }
    }

    /// A house seeded with the default rooms, devices and rules.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError`] if the built-in data fails validation.
    #[tracing::instrument]
    pub fn bootstrap(options: HomeOptions) -> Result<Self, HomeError> {
        let mut home = Self {
            occupancy: OccupancyTracker::with_rooms(defaults::DEFAULT_ROOMS),
            ..Self::empty(options)
        };
        for device in defaults::default_devices()? {
            home.add_device(device)?;
        }
        for rule in defaults::default_rules()? {
            home.register_rule(rule)?;
        }
        tracing::info!(
            devices = home.devices.len(),
            rules = home.rules.len(),
            "home bootstrapped"
        );
        Ok(home)
    }

    #[must_use]
    pub fn devices(&self) -> &DeviceRegistry {
        &self.devices
    }

    #[must_use]
    pub fn occupancy(&self) -> &OccupancyTracker {
        &self.occupancy
    }

    #[must_use]
    pub fn rules(&self) -> &RuleEngine {
        &self.rules
    }

    // ── Devices ────────────────────────────────────────────────────

    /// See [`DeviceRegistry::add`].
    ///
    /// # Errors
    ///
    /// Returns [`HomeError`] if the device is invalid or its id is taken.
    pub fn add_device(&mut self, device: Device) -> Result<(), HomeError> {
        self.devices.add(device)
    }

    /// See [`DeviceRegistry::get`].
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::InvalidDevice`] when the device is unknown.
    pub fn get_device(&self, id: &DeviceId) -> Result<&Device, HomeError> {
        self.devices.get(id)
    }

    pub fn list_devices<'a>(&'a self, filter: &'a DeviceFilter) -> impl Iterator<Item = &'a Device> {
        self.devices.list(filter)
    }

    /// See [`DeviceRegistry::control_light`].
    ///
    /// # Errors
    ///
    /// Returns [`HomeError`] if the device is not a light or the brightness
    /// is out of range.
    pub fn control_light(
        &mut self,
        id: &DeviceId,
        on: bool,
        brightness: Option<u8>,
    ) -> Result<&Device, HomeError> {
        self.devices.control_light(id, on, brightness)
    }

    /// See [`DeviceRegistry::control_thermostat`].
    ///
    /// # Errors
    ///
    /// Returns [`HomeError`] if the device is not a thermostat or the value
    /// is not finite.
    pub fn control_thermostat(
        &mut self,
        id: &DeviceId,
        target_temp: f64,
    ) -> Result<&Device, HomeError> {
        self.devices.control_thermostat(id, target_temp)
    }

    /// See [`DeviceRegistry::set_thermostat_mode`].
    ///
    /// # Errors
    ///
    /// Returns [`HomeError`] if the device is not a thermostat.
    pub fn set_thermostat_mode(
        &mut self,
        id: &DeviceId,
        mode: ThermostatMode,
    ) -> Result<&Device, HomeError> {
        self.devices.set_thermostat_mode(id, mode)
    }

    /// See [`DeviceRegistry::control_lock`].
    ///
    /// # Errors
    ///
    /// Returns [`HomeError`] if the device is not a lock.
    pub fn control_lock(&mut self, id: &DeviceId, locked: bool) -> Result<&Device, HomeError> {
        self.devices.control_lock(id, locked)
    }

    /// See [`DeviceRegistry::control_camera`].
    ///
    /// # Errors
    ///
    /// Returns [`HomeError`] if the device is not a camera.
    pub fn control_camera(&mut self, id: &DeviceId, active: bool) -> Result<&Device, HomeError> {
        self.devices.control_camera(id, active)
    }

    /// See [`DeviceRegistry::set_light_color`].
    ///
    /// # Errors
    ///
    /// Returns [`HomeError`] if the device is not a light or the color is invalid.
    pub fn set_light_color(
        &mut self,
        id: &DeviceId,
        color: &str,
        color_temp: Option<i64>,
    ) -> Result<&Device, HomeError> {
        self.devices.set_light_color(id, color, color_temp)
    }

    /// See [`DeviceRegistry::set_camera_feature`].
    ///
    /// # Errors
    ///
    /// Returns [`HomeError`] if the device is not a camera.
    pub fn set_camera_feature(
        &mut self,
        id: &DeviceId,
        feature: CameraFeature,
        enabled: bool,
    ) -> Result<&Device, HomeError> {
        self.devices.set_camera_feature(id, feature, enabled)
    }

    /// Remove a device that no rule references.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::DeviceInUse`] listing the referencing rules, or
    /// [`HomeError::InvalidDevice`] when the device is unknown.
    #[tracing::instrument(skip(self))]
    pub fn remove_device(&mut self, id: &DeviceId) -> Result<Device, HomeError> {
        let rule_ids = self.rules.rules_referencing(id);
        if !rule_ids.is_empty() {
            return Err(HomeError::DeviceInUse {
                device_id: id.clone(),
                rule_ids,
            });
        }
        let device = self.devices.remove(id)?;
        tracing::info!("device removed");
        Ok(device)
    }

    // ── Occupancy ──────────────────────────────────────────────────

    pub fn set_occupancy(&mut self, room: &str, occupied: bool) {
        self.occupancy.set_occupancy(room, occupied);
    }

    #[must_use]
    pub fn is_home_occupied(&self) -> bool {
        self.occupancy.is_home_occupied()
    }

    // ── Rules ──────────────────────────────────────────────────────

    /// See [`RuleEngine::register_rule`].
    ///
    /// # Errors
    ///
    /// Returns [`HomeError`] if the rule is invalid or its id is taken.
    pub fn register_rule(&mut self, rule: Rule) -> Result<(), HomeError> {
        self.rules.register_rule(rule)
    }

    /// See [`RuleEngine::set_enabled`].
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::RuleNotFound`] when the rule is unknown.
    pub fn set_rule_enabled(&mut self, id: &RuleId, enabled: bool) -> Result<(), HomeError> {
        self.rules.set_enabled(id, enabled)
    }

    /// Run a rule at `now` against the current devices and occupancy.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::RuleNotFound`] or [`HomeError::RuleDisabled`].
    pub fn execute_rule(
        &mut self,
        rule_id: &RuleId,
        now: Timestamp,
    ) -> Result<ExecutionReport, HomeError> {
        self.rules
            .execute_rule(rule_id, now, &mut self.devices, &self.occupancy)
    }

    pub fn history(&self) -> impl Iterator<Item = &ExecutionReport> {
        self.rules.history()
    }

    // ── Suggestions ────────────────────────────────────────────────

    /// Time and occupancy suggestions, followed by an energy hint when too
    /// many lights are on.
    #[must_use]
    pub fn contextual_suggestions(&self, now: Timestamp) -> Vec<Suggestion> {
        suggestion::contextual_suggestions(now, self.occupancy.current())
            .chain(suggestion::energy_suggestion(self.devices.lights_on()))
            .collect()
    }

    /// Serializable view of devices, occupancy and recent runs.
    #[must_use]
    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            devices: self.devices.iter().cloned().collect(),
            occupancy: self.occupancy.snapshot(),
            home_occupied: self.occupancy.is_home_occupied(),
            recent_reports: self.rules.history().cloned().collect(),
        }
    }
}
