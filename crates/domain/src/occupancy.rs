//! Occupancy — per-room presence flags.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Room name → occupied flag, ordered by room name.
///
/// Rooms are an open set: any room name can be recorded. A room that has
/// never been recorded reads as unoccupied.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OccupancySnapshot {
    rooms: BTreeMap<String, bool>,
}

impl OccupancySnapshot {
    /// Seed the given rooms as unoccupied.
    #[must_use]
    pub fn with_rooms<I, S>(rooms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rooms: rooms.into_iter().map(|r| (r.into(), false)).collect(),
        }
    }

    /// Record a room's flag, creating the room if needed. Returns the
    /// previous flag, if the room was known.
    pub fn set(&mut self, room: impl Into<String>, occupied: bool) -> Option<bool> {
        self.rooms.insert(room.into(), occupied)
    }

    #[must_use]
    pub fn is_room_occupied(&self, room: &str) -> bool {
        self.rooms.get(room).copied().unwrap_or(false)
    }

    /// True iff at least one room is occupied.
    #[must_use]
    pub fn is_home_occupied(&self) -> bool {
        self.rooms.values().any(|occupied| *occupied)
    }

    /// Iterate rooms and flags in room-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.rooms.iter().map(|(room, occupied)| (room.as_str(), *occupied))
    }

    /// Names of the rooms currently occupied.
    pub fn occupied_rooms(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter_map(|(room, occupied)| occupied.then_some(room))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for OccupancySnapshot {
    fn from_iter<T: IntoIterator<Item = (S, bool)>>(iter: T) -> Self {
        Self {
            rooms: iter.into_iter().map(|(r, o)| (r.into(), o)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_report_empty_home_as_unoccupied() {
        let occupancy = OccupancySnapshot::default();
        assert!(!occupancy.is_home_occupied());
        assert!(occupancy.is_empty());
    }

    #[test]
    fn should_seed_rooms_as_unoccupied() {
        let occupancy = OccupancySnapshot::with_rooms(["kitchen", "bedroom"]);
        assert_eq!(occupancy.len(), 2);
        assert!(!occupancy.is_home_occupied());
    }

    #[test]
    fn should_report_home_occupied_when_any_room_is() {
        let mut occupancy = OccupancySnapshot::with_rooms(["kitchen", "bedroom"]);
        occupancy.set("bedroom", true);
        assert!(occupancy.is_home_occupied());
        assert_eq!(occupancy.occupied_rooms().collect::<Vec<_>>(), vec!["bedroom"]);
    }

    #[test]
    fn should_create_unknown_room_implicitly() {
        let mut occupancy = OccupancySnapshot::default();
        let previous = occupancy.set("garage", true);
        assert_eq!(previous, None);
        assert!(occupancy.is_room_occupied("garage"));
    }

    #[test]
    fn should_read_unknown_room_as_unoccupied() {
        let occupancy = OccupancySnapshot::default();
        assert!(!occupancy.is_room_occupied("attic"));
    }

    #[test]
    fn should_serialize_as_plain_map() {
        let occupancy: OccupancySnapshot = [("bedroom", true)].into_iter().collect();
        let json = serde_json::to_value(&occupancy).unwrap();
        assert_eq!(json, serde_json::json!({"bedroom": true}));
    }
}
