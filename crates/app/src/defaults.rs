//! Built-in house layout — the rooms, devices and rules a fresh home starts with.

use homesim_domain::device::{Device, DeviceCategory, PowerState};
use homesim_domain::error::HomeError;
use homesim_domain::rule::{Action, Condition, Rule};

/// Rooms tracked for occupancy from the start.
pub const DEFAULT_ROOMS: [&str; 4] = ["living_room", "bedroom", "kitchen", "entry"];

const LIGHTS: [&str; 4] = [
    "living_room_light",
    "bedroom_light",
    "kitchen_light",
    "entry_light",
];
const DOOR_LOCKS: [&str; 2] = ["front_door_lock", "back_door_lock"];
const CAMERAS: [&str; 2] = ["front_door_camera", "back_door_camera"];

/// Thermostat targeted by the temperature and mode commands.
pub const MAIN_THERMOSTAT: &str = "main_thermostat";

fn light(id: &str, name: &str, room: &str, color_temp: i64) -> Result<Device, HomeError> {
    Device::builder()
        .id(id)
        .name(name)
        .category(DeviceCategory::Light)
        .room(room)
        .property("color_temp", color_temp)
        .build()
}

fn device(
    id: &str,
    name: &str,
    category: DeviceCategory,
    room: &str,
) -> Result<Device, HomeError> {
    Device::builder()
        .id(id)
        .name(name)
        .category(category)
        .room(room)
        .build()
}

/// The default device set.
///
/// # Errors
///
/// Returns [`HomeError`] if a built-in device fails validation.
pub fn default_devices() -> Result<Vec<Device>, HomeError> {
    Ok(vec![
        light("living_room_light", "Living Room Light", "living_room", 3000)?,
        light("bedroom_light", "Bedroom Light", "bedroom", 3000)?,
        light("kitchen_light", "Kitchen Light", "kitchen", 4000)?,
        light("entry_light", "Entry Light", "entry", 3000)?,
        Device::builder()
            .id(MAIN_THERMOSTAT)
            .name("Main Thermostat")
            .category(DeviceCategory::Thermostat)
            .room("hallway")
            .property("target_temp", 72.0)
            .property("current_temp", 72.0)
            .property("mode", "auto")
            .build()?,
        Device::builder()
            .id("front_door_camera")
            .name("Front Door Camera")
            .category(DeviceCategory::Camera)
            .room("front_door")
            .power(PowerState::On)
            .property("recording", true)
            .build()?,
        device(
            "back_door_camera",
            "Back Door Camera",
            DeviceCategory::Camera,
            "back_door",
        )?,
        device(
            "front_door_lock",
            "Front Door Lock",
            DeviceCategory::Lock,
            "front_door",
        )?,
        device(
            "back_door_lock",
            "Back Door Lock",
            DeviceCategory::Lock,
            "back_door",
        )?,
        device(
            "living_room_motion",
            "Living Room Motion Sensor",
            DeviceCategory::MotionSensor,
            "living_room",
        )?,
    ])
}

/// The default rule set.
///
/// # Errors
///
/// Returns [`HomeError`] if a built-in rule fails validation.
pub fn default_rules() -> Result<Vec<Rule>, HomeError> {
    let welcome_home = Rule::builder()
        .id("welcome_home")
        .name("Welcome Home")
        .priority(1)
        .condition(Condition::home_occupied(true))
        .action(Action::unlock("front_door_lock"))
        .action(Action::turn_on_light("entry_light", Some(80)))
        .action(Action::turn_on_light("living_room_light", Some(80)))
        .action(Action::set_temperature(MAIN_THERMOSTAT, 72.0))
        .build()?;

    let bedtime = Rule::builder()
        .id("bedtime")
        .name("Bedtime")
        .priority(2)
        .condition(Condition::and(vec![
            Condition::time_range("21:00", "02:00")?,
            Condition::home_occupied(true),
        ]))
        .action(Action::lock("front_door_lock"))
        .action(Action::lock("back_door_lock"))
        .action(Action::turn_off_light("living_room_light"))
        .action(Action::turn_off_light("kitchen_light"))
        .action(Action::turn_off_light("entry_light"))
        .action(Action::turn_on_light("bedroom_light", Some(30)))
        .action(Action::set_temperature(MAIN_THERMOSTAT, 68.0))
        .build()?;

    let away_security = DOOR_LOCKS
        .iter()
        .map(|id| Action::lock(*id))
        .chain(LIGHTS.iter().map(|id| Action::turn_off_light(*id)))
        .chain(CAMERAS.iter().map(|id| Action::arm_camera(*id)))
        .chain(std::iter::once(Action::set_temperature(MAIN_THERMOSTAT, 65.0)))
        .fold(
            Rule::builder()
                .id("away_security")
                .name("Away Security")
                .priority(3)
                .condition(Condition::home_occupied(false)),
            homesim_domain::rule::RuleBuilder::action,
        )
        .build()?;

    let good_morning = Rule::builder()
        .id("good_morning")
        .name("Good Morning")
        .priority(1)
        .condition(Condition::and(vec![
            Condition::time_range("06:00", "09:00")?,
            Condition::home_occupied(true),
        ]))
        .action(Action::turn_on_light("living_room_light", Some(90)))
        .action(Action::turn_on_light("kitchen_light", Some(100)))
        .action(Action::set_temperature(MAIN_THERMOSTAT, 73.0))
        .action(Action::disarm_camera("front_door_camera"))
        .action(Action::disarm_camera("back_door_camera"))
        .build()?;

    Ok(vec![welcome_home, bedtime, away_security, good_morning])
}
