//! Condition — a predicate tree deciding whether a rule's actions run.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::device::{DeviceSnapshot, PowerState, PropertyValue};
use crate::error::ValidationError;
use crate::id::DeviceId;
use crate::occupancy::OccupancySnapshot;
use crate::time::{self, Timestamp};

/// Everything a condition may look at, captured at one instant.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub now: Timestamp,
    pub occupancy: &'a OccupancySnapshot,
    pub devices: &'a DeviceSnapshot,
}

/// A check against one device's current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum DevicePredicate {
    /// The device's power state equals `power`.
    Power { power: PowerState },
    /// The device carries `key` with exactly `value`.
    Property { key: String, value: PropertyValue },
}

/// A predicate over time of day, occupancy and device state.
///
/// Leaves test one fact; `and`, `or` and `not` compose them. An empty `and`
/// holds, an empty `or` does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Time of day within `after..=before`, wrapping past midnight when
    /// `after > before`.
    TimeRange {
        #[serde(with = "hh_mm")]
        after: NaiveTime,
        #[serde(with = "hh_mm")]
        before: NaiveTime,
    },
    /// Whole-home occupancy equals `occupied`.
    HomeOccupied { occupied: bool },
    /// A single room's occupancy equals `occupied`.
    RoomOccupied { room: String, occupied: bool },
    /// A device exists and satisfies `predicate`.
    DeviceState {
        device_id: DeviceId,
        predicate: DevicePredicate,
    },
    And { conditions: Vec<Condition> },
    Or { conditions: Vec<Condition> },
    Not { condition: Box<Condition> },
}

impl Condition {
    /// A condition that always holds.
    #[must_use]
    pub fn always() -> Self {
        Self::And {
            conditions: Vec::new(),
        }
    }

    /// Build a time window from two `HH:MM` strings.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTimeOfDay`] if either bound is malformed.
    pub fn time_range(after: &str, before: &str) -> Result<Self, ValidationError> {
        Ok(Self::TimeRange {
            after: time::parse_time_of_day(after)?,
            before: time::parse_time_of_day(before)?,
        })
    }

    #[must_use]
    pub fn home_occupied(occupied: bool) -> Self {
        Self::HomeOccupied { occupied }
    }

    #[must_use]
    pub fn room_occupied(room: impl Into<String>, occupied: bool) -> Self {
        Self::RoomOccupied {
            room: room.into(),
            occupied,
        }
    }

    #[must_use]
    pub fn device_power(device_id: impl Into<DeviceId>, power: PowerState) -> Self {
        Self::DeviceState {
            device_id: device_id.into(),
            predicate: DevicePredicate::Power { power },
        }
    }

    #[must_use]
    pub fn device_property(
        device_id: impl Into<DeviceId>,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Self {
        Self::DeviceState {
            device_id: device_id.into(),
            predicate: DevicePredicate::Property {
                key: key.into(),
                value: value.into(),
            },
        }
    }

    #[must_use]
    pub fn and(conditions: Vec<Condition>) -> Self {
        Self::And { conditions }
    }

    #[must_use]
    pub fn or(conditions: Vec<Condition>) -> Self {
        Self::Or { conditions }
    }

    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(condition: Condition) -> Self {
        Self::Not {
            condition: Box::new(condition),
        }
    }

    /// Evaluate against a captured context. Pure: the same context always
    /// yields the same answer.
    #[must_use]
    pub fn evaluate(&self, ctx: &EvaluationContext<'_>) -> bool {
        match self {
            Self::TimeRange { after, before } => time::in_window(ctx.now.time(), *after, *before),
            Self::HomeOccupied { occupied } => ctx.occupancy.is_home_occupied() == *occupied,
            Self::RoomOccupied { room, occupied } => {
                ctx.occupancy.is_room_occupied(room) == *occupied
            }
            Self::DeviceState {
                device_id,
                predicate,
            } => ctx
                .devices
                .get(device_id)
                .is_some_and(|device| match predicate {
                    DevicePredicate::Power { power } => device.power == *power,
                    DevicePredicate::Property { key, value } => device.property(key) == Some(value),
                }),
            Self::And { conditions } => conditions.iter().all(|c| c.evaluate(ctx)),
            Self::Or { conditions } => conditions.iter().any(|c| c.evaluate(ctx)),
            Self::Not { condition } => !condition.evaluate(ctx),
        }
    }

    /// Every device id mentioned anywhere in the tree.
    #[must_use]
    pub fn device_ids(&self) -> Vec<&DeviceId> {
        let mut ids = Vec::new();
        self.collect_device_ids(&mut ids);
        ids
    }

    fn collect_device_ids<'a>(&'a self, ids: &mut Vec<&'a DeviceId>) {
        match self {
            Self::DeviceState { device_id, .. } => ids.push(device_id),
            Self::And { conditions } | Self::Or { conditions } => {
                for c in conditions {
                    c.collect_device_ids(ids);
                }
            }
            Self::Not { condition } => condition.collect_device_ids(ids),
            Self::TimeRange { .. } | Self::HomeOccupied { .. } | Self::RoomOccupied { .. } => {}
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimeRange { after, before } => {
                write!(f, "time_range({}..{})", after.format("%H:%M"), before.format("%H:%M"))
            }
            Self::HomeOccupied { occupied: true } => f.write_str("home_occupied"),
            Self::HomeOccupied { occupied: false } => f.write_str("home_empty"),
            Self::RoomOccupied { room, occupied } => {
                write!(f, "room_occupied({room}, {occupied})")
            }
            Self::DeviceState {
                device_id,
                predicate: DevicePredicate::Power { power },
            } => write!(f, "power({device_id}) == {power}"),
            Self::DeviceState {
                device_id,
                predicate: DevicePredicate::Property { key, value },
            } => write!(f, "{device_id}.{key} == {value}"),
            Self::And { conditions } if conditions.is_empty() => f.write_str("always"),
            Self::And { conditions } => write_joined(f, conditions, " and "),
            Self::Or { conditions } => write_joined(f, conditions, " or "),
            Self::Not { condition } => write!(f, "not ({condition})"),
        }
    }
}

fn write_joined(
    f: &mut std::fmt::Formatter<'_>,
    conditions: &[Condition],
    separator: &str,
) -> std::fmt::Result {
    f.write_str("(")?;
    for (i, c) in conditions.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{c}")?;
    }
    f.write_str(")")
}

mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        crate::time::parse_time_of_day(&text).map_err(serde::de::Error::custom)
    }
}
