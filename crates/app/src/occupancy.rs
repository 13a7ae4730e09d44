//! Occupancy tracker — per-room presence flags with a whole-home aggregate.

use homesim_domain::occupancy::OccupancySnapshot;

/// Holds the current occupancy of every known room.
#[derive(Debug, Clone, Default)]
pub struct OccupancyTracker {
    rooms: OccupancySnapshot,
}

impl OccupancyTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the given rooms, all unoccupied.
    #[must_use]
    pub fn with_rooms<I, S>(rooms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rooms: OccupancySnapshot::with_rooms(rooms),
        }
    }

    /// Record a room's occupancy. Unknown rooms are created.
    #[tracing::instrument(skip(self))]
    pub fn set_occupancy(&mut self, room: &str, occupied: bool) {
        let was_home = self.rooms.is_home_occupied();
        if self.rooms.set(room, occupied).is_none() {
            tracing::debug!("new room recorded");
        }
        let is_home = self.rooms.is_home_occupied();
        if was_home != is_home {
            tracing::info!(home_occupied = is_home, "home occupancy changed");
        }
    }

    #[must_use]
    pub fn is_home_occupied(&self) -> bool {
        self.rooms.is_home_occupied()
    }

    #[must_use]
    pub fn is_room_occupied(&self, room: &str) -> bool {
        self.rooms.is_room_occupied(room)
    }

    /// Borrow the current flags.
    #[must_use]
    pub fn current(&self) -> &OccupancySnapshot {
        &self.rooms
    }

    /// Read-only copy of the current flags.
    #[must_use]
    pub fn snapshot(&self) -> OccupancySnapshot {
        self.rooms.clone()
    }
}
