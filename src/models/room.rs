//! Room model.
//!
//! Blocked periods are standing reservations; the allocator never uses them.

use serde::{Deserialize, Serialize};

use super::Weekday;

/// A room that sections can be allocated into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Number of seats.
    pub capacity: u32,
    /// Hours the room is available each weekday, counted from 08:00.
    pub hours_per_day: u32,
    /// Runs of blocks that are permanently unavailable.
    pub blocked: Vec<BlockedPeriod>,
}

/// A run of blocks on one weekday that cannot be allocated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedPeriod {
    pub day: Weekday,
    /// First blocked block index.
    pub start_block: usize,
    /// Number of blocked blocks.
    pub len: usize,
}

impl Room {
    /// Creates a room available `hours_per_day` hours on every weekday.
    pub fn new(id: impl Into<String>, capacity: u32, hours_per_day: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            capacity,
            hours_per_day,
            blocked: Vec::new(),
        }
    }

    /// Sets the room name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a blocked run of `len` blocks starting at `start_block`.
    pub fn with_blocked(mut self, day: Weekday, start_block: usize, len: usize) -> Self {
        self.blocked.push(BlockedPeriod {
            day,
            start_block,
            len,
        });
        self
    }

    /// Number of 25-minute blocks per weekday (two per available hour).
    #[inline]
    pub fn blocks_per_day(&self) -> usize {
        self.hours_per_day as usize * 2
    }
}
