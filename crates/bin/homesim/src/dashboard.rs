//! Plain-text rendering of the house state.
//!
//! Each view borrows what it renders and implements [`fmt::Display`], so the
//! caller decides where the text goes.

use std::fmt;

use serde::Serialize;

use homesim_app::home::StatusSnapshot;
use homesim_domain::device::{CameraFeature, Device, DeviceCategory};
use homesim_domain::report::ExecutionReport;
use homesim_domain::rule::Rule;
use homesim_domain::suggestion::Suggestion;

/// One device on one line.
pub struct DeviceLine<'a>(pub &'a Device);

impl fmt::Display for DeviceLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let device = self.0;
        write!(
            f,
            "[{:<3}] {:<20} {:<12} ",
            device.power.to_string(),
            device.id.as_str(),
            device.room
        )?;
        match device.category {
            DeviceCategory::Light => match device.brightness() {
                Some(level) if device.is_on() => {
                    write!(f, "{level}%")?;
                    if let Some(color) = device.property("color") {
                        write!(f, " {color}")?;
                    }
                    Ok(())
                }
                _ => f.write_str("-"),
            },
            DeviceCategory::Thermostat => {
                if let Some(target) = device.target_temp() {
                    write!(f, "target {target}")?;
                }
                if let Some(mode) = device.thermostat_mode() {
                    write!(f, " ({mode})")?;
                }
                Ok(())
            }
            DeviceCategory::Lock => match device.is_locked() {
                Some(true) => f.write_str("locked"),
                Some(false) => f.write_str("unlocked"),
                None => f.write_str("-"),
            },
            DeviceCategory::Camera => {
                if device.is_camera_active() {
                    f.write_str("armed")?;
                } else {
                    f.write_str("disarmed")?;
                }
                if device.camera_feature(CameraFeature::MotionDetection) == Some(false) {
                    f.write_str(", motion off")?;
                }
                Ok(())
            }
            DeviceCategory::MotionSensor => match device.property("sensitivity") {
                Some(sensitivity) => write!(f, "sensitivity {sensitivity}"),
                None => f.write_str("-"),
            },
        }
    }
}

/// Devices grouped under their category.
pub struct DeviceList<'a>(pub Vec<&'a Device>);

impl fmt::Display for DeviceList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "  (no devices)");
        }
        for category in DeviceCategory::ALL {
            let mut devices = self.0.iter().filter(|d| d.category == category).peekable();
            if devices.peek().is_none() {
                continue;
            }
            writeln!(f, "  {category}:")?;
            for device in devices {
                writeln!(f, "    {}", DeviceLine(device))?;
            }
        }
        Ok(())
    }
}

pub struct SuggestionList<'a>(pub &'a [Suggestion]);

impl fmt::Display for SuggestionList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "  (nothing to suggest)");
        }
        for (index, suggestion) in self.0.iter().enumerate() {
            write!(
                f,
                "  {}. [{}] {}",
                index + 1,
                suggestion.priority,
                suggestion.title
            )?;
            if let Some(rule_id) = &suggestion.rule_id {
                write!(f, " (routine {rule_id})")?;
            }
            writeln!(f)?;
            writeln!(f, "     {}", suggestion.description)?;
        }
        Ok(())
    }
}

pub struct RuleList<'a>(pub &'a [&'a Rule]);

impl fmt::Display for RuleList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "  (no rules)");
        }
        for rule in self.0 {
            let state = if rule.enabled { "enabled" } else { "disabled" };
            writeln!(
                f,
                "  {:<16} p{} {:<8} {}",
                rule.id.as_str(),
                rule.priority,
                state,
                rule.name
            )?;
            writeln!(f, "      when {}", rule.condition)?;
            writeln!(f, "      then {} action(s)", rule.actions.len())?;
        }
        Ok(())
    }
}

/// A single execution report, with its failed actions.
pub struct ReportView<'a>(pub &'a ExecutionReport);

impl fmt::Display for ReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        write!(
            f,
            "{} {} `{}`: {}",
            report.executed_at.format("%Y-%m-%d %H:%M"),
            report.rule_id,
            report.rule_name,
            report.status
        )?;
        if !report.outcomes.is_empty() {
            write!(
                f,
                " ({}/{} actions)",
                report.applied_count(),
                report.outcomes.len()
            )?;
        }
        for outcome in report.failures() {
            if let Some(error) = &outcome.error {
                write!(f, "\n    failed {}: {error}", outcome.action)?;
            }
        }
        Ok(())
    }
}

pub struct HistoryView<'a>(pub &'a [&'a ExecutionReport]);

impl fmt::Display for HistoryView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "  (no runs yet)");
        }
        for report in self.0 {
            writeln!(f, "  {}", ReportView(report))?;
        }
        Ok(())
    }
}

/// The full dashboard printed by `status`. Serializes to the same sections.
#[derive(Serialize)]
pub struct StatusView<'a> {
    pub status: &'a StatusSnapshot,
    pub suggestions: &'a [Suggestion],
}

impl fmt::Display for StatusView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = self.status;
        writeln!(f, "Devices")?;
        write!(f, "{}", DeviceList(status.devices.iter().collect()))?;

        let presence = if status.home_occupied { "occupied" } else { "empty" };
        writeln!(f, "Occupancy (home {presence})")?;
        if status.occupancy.is_empty() {
            writeln!(f, "  (no rooms)")?;
        }
        for (room, occupied) in status.occupancy.iter() {
            let mark = if occupied { "x" } else { " " };
            writeln!(f, "  [{mark}] {room}")?;
        }

        writeln!(f, "Suggestions")?;
        write!(f, "{}", SuggestionList(self.suggestions))?;

        let reports: Vec<_> = status.recent_reports.iter().collect();
        writeln!(f, "Recent runs")?;
        write!(f, "{}", HistoryView(&reports))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use homesim_app::home::{Home, HomeOptions};
    use homesim_domain::id::{DeviceId, RuleId};
    use homesim_domain::time::Timestamp;

    fn at(h: u32, m: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn home() -> Home {
        Home::bootstrap(HomeOptions::default()).unwrap()
    }

    #[test]
    fn should_render_device_lines_per_category() {
        let mut home = home();
        home.control_light(&DeviceId::new("kitchen_light"), true, Some(60))
            .unwrap();
        let render = |id: &str| {
            DeviceLine(home.get_device(&DeviceId::new(id)).unwrap()).to_string()
        };
        assert!(render("kitchen_light").ends_with("60% white"));
        assert!(render("bedroom_light").ends_with('-'));
        assert!(render("main_thermostat").ends_with("target 72 (auto)"));
        assert!(render("front_door_lock").ends_with("locked"));
        assert!(render("back_door_camera").ends_with("disarmed"));
        assert!(render("front_door_camera").starts_with("[on ]"));

        home.set_light_color(&DeviceId::new("kitchen_light"), "amber", None)
            .unwrap();
        home.set_camera_feature(
            &DeviceId::new("back_door_camera"),
            CameraFeature::MotionDetection,
            false,
        )
        .unwrap();
        let render = |id: &str| {
            DeviceLine(home.get_device(&DeviceId::new(id)).unwrap()).to_string()
        };
        assert!(render("kitchen_light").ends_with("60% amber"));
        assert!(render("back_door_camera").ends_with("disarmed, motion off"));
    }

    #[test]
    fn should_render_full_status_sections() {
        let mut home = home();
        home.set_occupancy("bedroom", true);
        home.execute_rule(&RuleId::new("bedtime"), at(23, 30)).unwrap();
        let status = home.status();
        let suggestions = home.contextual_suggestions(at(23, 30));

        let text = StatusView {
            status: &status,
            suggestions: &suggestions,
        }
        .to_string();

        for section in ["Devices", "Occupancy (home occupied)", "Suggestions", "Recent runs"] {
            assert!(text.contains(section), "missing {section}:\n{text}");
        }
        assert!(text.contains("[x] bedroom"));
        assert!(text.contains("Bedtime Preparation (routine bedtime)"));
        assert!(text.contains("bedtime `Bedtime`: completed (7/7 actions)"));
    }

    #[test]
    fn should_render_failed_actions_in_report() {
        let mut home = home();
        home.register_rule(
            Rule::builder()
                .id("garage")
                .name("Garage")
                .action(homesim_domain::rule::Action::lock("garage_lock"))
                .build()
                .unwrap(),
        )
        .unwrap();
        let report = home.execute_rule(&RuleId::new("garage"), at(12, 0)).unwrap();

        let text = ReportView(&report).to_string();

        assert!(text.contains("partial (0/1 actions)"));
        assert!(text.contains("failed lock(garage_lock)"));
    }

    #[test]
    fn should_render_placeholders_when_empty() {
        let home = Home::empty(HomeOptions::default());
        let status = home.status();
        let text = StatusView {
            status: &status,
            suggestions: &[],
        }
        .to_string();
        assert!(text.contains("(no devices)"));
        assert!(text.contains("(no rooms)"));
        assert!(text.contains("(nothing to suggest)"));
        assert!(text.contains("(no runs yet)"));
    }

    #[test]
    fn should_list_rules_with_conditions() {
        let home = home();
        let rules = home.rules().list();
        let text = RuleList(&rules).to_string();
        assert!(text.contains("away_security"));
        assert!(text.contains("when home_empty"));
    }
}
