//! Time and time-of-day helpers.
//!
//! The simulation runs on the house's wall clock, so timestamps are naive
//! local date-times. Every time-dependent operation takes `now` as an
//! argument; only the presentation layer reads the real clock.

use std::fmt;

use chrono::{Local, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// House-local wall-clock timestamp.
pub type Timestamp = NaiveDateTime;

/// Return the current local wall-clock time.
#[must_use]
pub fn now() -> Timestamp {
    Local::now().naive_local()
}

/// Parse an `HH:MM` string into a time of day.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidTimeOfDay`] when the text is not a valid
/// 24-hour `HH:MM` value.
pub fn parse_time_of_day(text: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M")
        .map_err(|_| ValidationError::InvalidTimeOfDay(text.to_string()))
}

/// Whether `time` lies in the inclusive window `after..=before`.
///
/// When `after > before` the window wraps past midnight, e.g. `22:00..06:00`.
#[must_use]
pub fn in_window(time: NaiveTime, after: NaiveTime, before: NaiveTime) -> bool {
    if after <= before {
        time >= after && time <= before
    } else {
        time >= after || time <= before
    }
}

/// Coarse bucket of the day used to pick contextual suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPeriod {
    /// `06:00` up to `09:00`.
    Morning,
    /// `09:00` up to `18:00`.
    Day,
    /// `18:00` up to `22:00`.
    Evening,
    /// `22:00` up to `06:00`.
    Night,
}

impl DayPeriod {
    /// Classify a time of day.
    #[must_use]
    pub fn of(time: NaiveTime) -> Self {
        match time.hour() {
            6..=8 => Self::Morning,
            9..=17 => Self::Day,
            18..=21 => Self::Evening,
            _ => Self::Night,
        }
    }
}

impl fmt::Display for DayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Morning => f.write_str("morning"),
            Self::Day => f.write_str("day"),
            Self::Evening => f.write_str("evening"),
            Self::Night => f.write_str("night"),
        }
    }
}
