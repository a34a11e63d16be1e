//! Room time grids and block allocation.
//!
//! A [`RoomTimeGrid`] is one room's week: five weekdays, each split into
//! `hours_per_day × 2` blocks of 25 minutes. Every block records its
//! owner (0 = free, otherwise an assignment ID) and each day keeps a
//! counter of free blocks.
//!
//! # Invariant
//! For every day, `free_blocks(day) == blocks_per_day - (non-zero slots on day)`.
//! Slots and counters are only ever changed together.
//!
//! # Placement
//! [`RoomTimeGrid::place_contiguous`] always writes from the first free
//! block of the day. It never looks for a gap further into the day, so a
//! fragmented day can hold enough free blocks in total and still refuse a
//! run. Policies in [`policy`] decide which days to call it on.

pub mod policy;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{
    AllocationPolicy, BlockedPeriod, MeetingTime, Room, Usage, Weekday, WeekdaySet,
    WEEKDAY_COUNT,
};

pub use policy::{allocate, BlockRequest, Placement, Rejection};

/// Owner value of a free block.
pub const FREE: u32 = 0;

/// Owner value of a block reserved by a room's blocked period.
pub const BLOCKED: u32 = u32::MAX;

/// A run of consecutive blocks on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRun {
    pub day: Weekday,
    pub start_block: usize,
    pub len: usize,
}

/// A block allocation carved out of a room's grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomAssignment {
    /// Sequential ID within the room, starting at 1.
    pub id: u32,
    pub room_id: String,
    pub course_id: String,
    /// Seats consumed by the section using this assignment.
    pub seats: u32,
    pub usage: Usage,
    /// Blocks requested.
    pub block_count: usize,
    /// Layout actually used (never `GroupsOf2Or3`).
    pub policy: AllocationPolicy,
    /// Placed runs, in placement order.
    pub runs: Vec<BlockRun>,
}

impl RoomAssignment {
    /// Blocks actually reserved. Can exceed `block_count` when groups are
    /// rounded up.
    pub fn blocks_reserved(&self) -> usize {
        self.runs.iter().map(|r| r.len).sum()
    }

    /// Weekly meeting times, merging days that share a start and length.
    pub fn meeting_times(&self) -> Vec<MeetingTime> {
        let mut merged: Vec<(usize, usize, WeekdaySet)> = Vec::new();
        let mut runs = self.runs.clone();
        runs.sort_by_key(|r| r.day);
        for run in runs {
            match merged
                .iter_mut()
                .find(|(start, len, _)| *start == run.start_block && *len == run.len)
            {
                Some(entry) => entry.2 = entry.2.with(run.day),
                None => merged.push((run.start_block, run.len, WeekdaySet::of(&[run.day]))),
            }
        }
        merged
            .into_iter()
            .map(|(start, len, days)| {
                let first = days.iter().next().unwrap_or(Weekday::Monday);
                let mut m = MeetingTime::from_blocks(first, start, len);
                m.days = days;
                m
            })
            .collect()
    }
}

/// One room's weekly occupancy grid.
#[derive(Debug, Clone)]
pub struct RoomTimeGrid {
    room_id: String,
    capacity: u32,
    hours_per_day: u32,
    blocks_per_day: usize,
    blocked: Vec<BlockedPeriod>,
    slots: [Vec<u32>; WEEKDAY_COUNT],
    free: [usize; WEEKDAY_COUNT],
    assignments: Vec<RoomAssignment>,
    next_id: u32,
}

impl RoomTimeGrid {
    /// Creates an empty grid for a room, with its blocked periods applied.
    pub fn new(room: &Room) -> Self {
        let blocks_per_day = room.blocks_per_day();
        let mut grid = Self {
            room_id: room.id.clone(),
            capacity: room.capacity,
            hours_per_day: room.hours_per_day,
            blocks_per_day,
            blocked: room.blocked.clone(),
            slots: std::array::from_fn(|_| vec![FREE; blocks_per_day]),
            free: [blocks_per_day; WEEKDAY_COUNT],
            assignments: Vec::new(),
            next_id: 1,
        };
        grid.apply_blocked();
        grid
    }

    /// Clears every assignment and owner; blocked periods are re-applied.
    pub fn reset(&mut self) {
        for day in &mut self.slots {
            day.fill(FREE);
        }
        self.free = [self.blocks_per_day; WEEKDAY_COUNT];
        self.assignments.clear();
        self.next_id = 1;
        self.apply_blocked();
    }

    fn apply_blocked(&mut self) {
        for period in &self.blocked {
            let d = period.day.index();
            let end = (period.start_block + period.len).min(self.blocks_per_day);
            for slot in period.start_block.min(end)..end {
                if self.slots[d][slot] == FREE {
                    self.slots[d][slot] = BLOCKED;
                    self.free[d] -= 1;
                }
            }
        }
    }

    #[inline]
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    #[inline]
    pub fn hours_per_day(&self) -> u32 {
        self.hours_per_day
    }

    #[inline]
    pub fn blocks_per_day(&self) -> usize {
        self.blocks_per_day
    }

    /// Free blocks left on a day.
    #[inline]
    pub fn free_blocks(&self, day: Weekday) -> usize {
        self.free[day.index()]
    }

    /// Smallest free-block count among `days` (0 for an empty slice).
    pub fn min_free(&self, days: &[Weekday]) -> usize {
        days.iter().map(|&d| self.free_blocks(d)).min().unwrap_or(0)
    }

    /// Marks `block_count` consecutive blocks from the day's first free block.
    ///
    /// Returns `None` without touching the grid when the day has fewer free
    /// blocks than requested, or when the run starting at the first free
    /// block is interrupted before `block_count` blocks.
    pub fn place_contiguous(
        &mut self,
        day: Weekday,
        block_count: usize,
        assignment_id: u32,
    ) -> Option<BlockRun> {
        let d = day.index();
        if block_count == 0 || self.free[d] < block_count {
            return None;
        }

        let start = self.slots[d].iter().position(|&owner| owner == FREE)?;
        let end = start + block_count;
        if end > self.blocks_per_day || self.slots[d][start..end].iter().any(|&o| o != FREE) {
            return None;
        }

        self.slots[d][start..end].fill(assignment_id);
        self.free[d] -= block_count;
        Some(BlockRun {
            day,
            start_block: start,
            len: block_count,
        })
    }

    /// Owners of every block on a day.
    #[inline]
    pub fn block_schedule_for_day(&self, day: Weekday) -> &[u32] {
        &self.slots[day.index()]
    }

    /// Reserves the next assignment ID. IDs of failed attempts are not reused.
    pub fn next_assignment_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Records a completed assignment.
    pub(crate) fn record(&mut self, assignment: RoomAssignment) {
        self.assignments.push(assignment);
    }

    /// Assignments made since the last reset, in creation order.
    #[inline]
    pub fn assignments(&self) -> &[RoomAssignment] {
        &self.assignments
    }
}

impl fmt::Display for RoomTimeGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} ({} seats, {} blocks/day)",
            self.room_id, self.capacity, self.blocks_per_day
        )?;
        for day in Weekday::ALL {
            write!(f, "{} |", day.code())?;
            for &owner in self.block_schedule_for_day(day) {
                match owner {
                    FREE => write!(f, "  .")?,
                    BLOCKED => write!(f, "  #")?,
                    id => write!(f, "{id:>3}")?,
                }
            }
            writeln!(f, " | free {}", self.free_blocks(day))?;
        }
        Ok(())
    }
}
