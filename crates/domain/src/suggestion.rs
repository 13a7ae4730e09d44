//! Suggestion — an ephemeral recommendation derived from time and occupancy.
//!
//! Suggestions are computed fresh on every call and never stored. The core
//! generator, [`contextual_suggestions`], depends only on the time of day and
//! the occupancy snapshot; it does not look at stored rules.

use serde::Serialize;

use crate::id::RuleId;
use crate::occupancy::OccupancySnapshot;
use crate::time::{DayPeriod, Timestamp};

/// Number of lights that may be on before an energy suggestion appears.
pub const ENERGY_LIGHTS_THRESHOLD: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Routine,
    Security,
    Energy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionPriority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for SuggestionPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => f.write_str("high"),
            Self::Medium => f.write_str("medium"),
            Self::Low => f.write_str("low"),
        }
    }
}

/// A recommended action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub id: &'static str,
    pub kind: SuggestionKind,
    pub title: &'static str,
    pub description: &'static str,
    pub priority: SuggestionPriority,
    /// Rule the user could run to act on the suggestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<RuleId>,
}

/// Suggestions for the given instant and occupancy, in display order.
///
/// | Period  | Occupied | Suggestion |
/// |---------|----------|------------|
/// | morning | yes      | Good Morning Routine |
/// | evening | yes      | Evening Wind Down |
/// | night   | yes      | Bedtime Preparation |
/// | any     | no       | Away Mode |
pub fn contextual_suggestions(
    now: Timestamp,
    occupancy: &OccupancySnapshot,
) -> impl Iterator<Item = Suggestion> {
    let period = DayPeriod::of(now.time());
    let occupied = occupancy.is_home_occupied();

    let routine = std::iter::once_with(move || {
        if occupied {
            routine_for(period)
        } else {
            None
        }
    });
    let away = std::iter::once_with(move || (!occupied).then(away_mode));

    routine.chain(away).flatten()
}

/// Energy-saving hint, produced when more than
/// [`ENERGY_LIGHTS_THRESHOLD`] lights are on.
#[must_use]
pub fn energy_suggestion(lights_on: usize) -> Option<Suggestion> {
    (lights_on > ENERGY_LIGHTS_THRESHOLD).then(|| Suggestion {
        id: "energy_save",
        kind: SuggestionKind::Energy,
        title: "Energy Saving",
        description: "Turn off unused lights to save energy",
        priority: SuggestionPriority::Low,
        rule_id: None,
    })
}

fn routine_for(period: DayPeriod) -> Option<Suggestion> {
    match period {
        DayPeriod::Morning => Some(Suggestion {
            id: "morning_routine",
            kind: SuggestionKind::Routine,
            title: "Good Morning Routine",
            description: "Turn on lights and adjust temperature for the day",
            priority: SuggestionPriority::High,
            rule_id: Some(RuleId::new("good_morning")),
        }),
        DayPeriod::Evening => Some(Suggestion {
            id: "evening_routine",
            kind: SuggestionKind::Routine,
            title: "Evening Wind Down",
            description: "Dim lights and prepare for relaxation",
            priority: SuggestionPriority::Medium,
            rule_id: None,
        }),
        DayPeriod::Night => Some(Suggestion {
            id: "bedtime_routine",
            kind: SuggestionKind::Routine,
            title: "Bedtime Preparation",
            description: "Activate the bedtime routine for better sleep",
            priority: SuggestionPriority::High,
            rule_id: Some(RuleId::new("bedtime")),
        }),
        DayPeriod::Day => None,
    }
}

fn away_mode() -> Suggestion {
    Suggestion {
        id: "security_mode",
        kind: SuggestionKind::Security,
        title: "Away Mode",
        description: "Enable security features while away",
        priority: SuggestionPriority::High,
        rule_id: Some(RuleId::new("away_security")),
    }
}
