//! Command dispatch — runs parsed [`Command`]s against a [`Home`].

use serde::Serialize;

use homesim_app::defaults::MAIN_THERMOSTAT;
use homesim_app::home::Home;
use homesim_app::registry::DeviceFilter;
use homesim_domain::device::Device;
use homesim_domain::error::{HomeError, InvalidParameterError};
use homesim_domain::id::DeviceId;
use homesim_domain::time::Timestamp;

use crate::command::{Command, HELP, ParseCommandError};
use crate::dashboard::{
    DeviceLine, DeviceList, HistoryView, ReportView, RuleList, StatusView, SuggestionList,
};

/// How replies are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// What the caller should print, and whether to stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub output: String,
    pub quit: bool,
}

impl Reply {
    fn show(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            quit: false,
        }
    }
}

/// Errors surfaced to the user for a single line of input.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error(transparent)]
    Parse(#[from] ParseCommandError),
    #[error(transparent)]
    Home(#[from] HomeError),
    #[error("failed to encode output")]
    Json(#[from] serde_json::Error),
}

/// Interactive session over one house.
pub struct Shell {
    home: Home,
    format: OutputFormat,
}

impl Shell {
    #[must_use]
    pub fn new(home: Home, format: OutputFormat) -> Self {
        Self { home, format }
    }

    #[must_use]
    pub fn home(&self) -> &Home {
        &self.home
    }

    /// Parse and run one line of input at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError`] when the line does not parse or the house
    /// rejects the command. The house is left unchanged in both cases.
    pub fn handle_line(&mut self, line: &str, now: Timestamp) -> Result<Reply, ShellError> {
        let command: Command = line.parse()?;
        self.run(command, now)
    }

    /// Run a parsed command at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::Home`] when the house rejects the command.
    #[tracing::instrument(skip(self))]
    pub fn run(&mut self, command: Command, now: Timestamp) -> Result<Reply, ShellError> {
        let reply = match command {
            Command::Status => {
                let status = self.home.status();
                let suggestions = self.home.contextual_suggestions(now);
                let view = StatusView {
                    status: &status,
                    suggestions: &suggestions,
                };
                self.render(&view, || view.to_string())?
            }
            Command::Devices(category) => {
                let filter = DeviceFilter {
                    category,
                    room: None,
                };
                let devices: Vec<&Device> = self.home.list_devices(&filter).collect();
                self.render(&devices, || DeviceList(devices.clone()).to_string())?
            }
            Command::Lights {
                on,
                room,
                brightness,
            } => {
                let brightness = brightness
                    .map(|level| {
                        u8::try_from(level)
                            .map_err(|_| InvalidParameterError::BrightnessOutOfRange(level))
                    })
                    .transpose()
                    .map_err(HomeError::from)?;
                let device = self.home.control_light(&room_light(&room), on, brightness)?;
                render_device(self.format, device)?
            }
            Command::Color {
                room,
                color,
                color_temp,
            } => {
                let device = self
                    .home
                    .set_light_color(&room_light(&room), &color, color_temp)?;
                render_device(self.format, device)?
            }
            Command::Temp(target) => {
                let device = self
                    .home
                    .control_thermostat(&DeviceId::new(MAIN_THERMOSTAT), target)?;
                render_device(self.format, device)?
            }
            Command::Mode(mode) => {
                let device = self
                    .home
                    .set_thermostat_mode(&DeviceId::new(MAIN_THERMOSTAT), mode)?;
                render_device(self.format, device)?
            }
            Command::Lock(id) => render_device(self.format, self.home.control_lock(&id, true)?)?,
            Command::Unlock(id) => render_device(self.format, self.home.control_lock(&id, false)?)?,
            Command::Camera { device_id, active } => {
                render_device(self.format, self.home.control_camera(&device_id, active)?)?
            }
            Command::CameraFeature {
                device_id,
                feature,
                enabled,
            } => render_device(
                self.format,
                self.home.set_camera_feature(&device_id, feature, enabled)?,
            )?,
            Command::Occupy { room, occupied } => {
                self.home.set_occupancy(&room, occupied);
                let state = if occupied { "occupied" } else { "empty" };
                let rooms: Vec<&str> = self.home.occupancy().current().occupied_rooms().collect();
                let home = if rooms.is_empty() {
                    "home empty".to_string()
                } else {
                    format!("occupied: {}", rooms.join(", "))
                };
                Reply::show(format!("{room} is now {state} ({home})"))
            }
            Command::Routine(rule_id) => {
                let report = self.home.execute_rule(&rule_id, now)?;
                self.render(&report, || ReportView(&report).to_string())?
            }
            Command::Rules => {
                let rules = self.home.rules().list();
                self.render(&rules, || RuleList(&rules).to_string())?
            }
            Command::Enable(rule_id) => {
                self.home.set_rule_enabled(&rule_id, true)?;
                Reply::show(format!("rule {rule_id} enabled"))
            }
            Command::Disable(rule_id) => {
                self.home.set_rule_enabled(&rule_id, false)?;
                Reply::show(format!("rule {rule_id} disabled"))
            }
            Command::Suggestions => {
                let suggestions = self.home.contextual_suggestions(now);
                self.render(&suggestions, || SuggestionList(&suggestions).to_string())?
            }
            Command::History => {
                let reports: Vec<_> = self.home.history().collect();
                self.render(&reports, || HistoryView(&reports).to_string())?
            }
            Command::Help => Reply::show(HELP),
            Command::Quit => Reply {
                output: "Goodbye!".to_string(),
                quit: true,
            },
        };
        Ok(reply)
    }

    fn render<T, F>(&self, value: &T, text: F) -> Result<Reply, ShellError>
    where
        T: Serialize + ?Sized,
        F: FnOnce() -> String,
    {
        encode(self.format, value, text)
    }
}

fn room_light(room: &str) -> DeviceId {
    DeviceId::new(format!("{room}_light"))
}

fn render_device(format: OutputFormat, device: &Device) -> Result<Reply, ShellError> {
    encode(format, device, || DeviceLine(device).to_string())
}

fn encode<T, F>(format: OutputFormat, value: &T, text: F) -> Result<Reply, ShellError>
where
    T: Serialize + ?Sized,
    F: FnOnce() -> String,
{
    let output = match format {
        OutputFormat::Text => text(),
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
    };
    Ok(Reply::show(output))
}
