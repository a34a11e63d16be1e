//! Weekday and meeting-time models.
//!
//! # Time Model
//! A block index `k` starts at `08:00 + 30·k` minutes. A run of `n`
//! consecutive blocks starting at `k` meets for `25·n` minutes, so two
//! blocks at index 2 meet 09:00–09:50.
//!
//! # Overlap
//! Meeting intervals are half-open `[start, end)`: back-to-back meetings
//! do not overlap.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of one scheduling block in minutes.
pub const BLOCK_MINUTES: u32 = 25;

/// Distance between the starts of two adjacent blocks in minutes.
pub const BLOCK_PITCH_MINUTES: u32 = 30;

/// Start of the campus day (08:00) in minutes since midnight.
pub const DAY_START_MINUTES: u32 = 8 * 60;

/// End of the campus day (17:00) in minutes since midnight.
pub const DAY_END_MINUTES: u32 = 17 * 60;

/// Number of teaching weekdays in the grid.
pub const WEEKDAY_COUNT: usize = 5;

/// Converts a wall-clock time to minutes since midnight.
#[inline]
pub const fn hm(hour: u32, minute: u32) -> u32 {
    hour * 60 + minute
}

/// A teaching weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    /// All weekdays in calendar order.
    pub const ALL: [Weekday; WEEKDAY_COUNT] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    /// Monday, Wednesday, Friday.
    pub const MWF: [Weekday; 3] = [Weekday::Monday, Weekday::Wednesday, Weekday::Friday];

    /// Tuesday, Thursday.
    pub const TR: [Weekday; 2] = [Weekday::Tuesday, Weekday::Thursday];

    /// Zero-based position in the week (Monday = 0).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Weekday at a zero-based position, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Single-letter registrar code (M, T, W, R, F).
    pub const fn code(self) -> char {
        match self {
            Weekday::Monday => 'M',
            Weekday::Tuesday => 'T',
            Weekday::Wednesday => 'W',
            Weekday::Thursday => 'R',
            Weekday::Friday => 'F',
        }
    }

    fn from_code(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'M' => Some(Weekday::Monday),
            'T' => Some(Weekday::Tuesday),
            'W' => Some(Weekday::Wednesday),
            'R' => Some(Weekday::Thursday),
            'F' => Some(Weekday::Friday),
            _ => None,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A set of weekdays, stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// The empty set.
    pub const EMPTY: WeekdaySet = WeekdaySet(0);

    /// Creates a set containing the given days.
    pub fn of(days: &[Weekday]) -> Self {
        days.iter().fold(Self::EMPTY, |set, &d| set.with(d))
    }

    /// Parses registrar codes such as `"MWF"` or `"TR"`.
    ///
    /// Returns `None` on any unknown character.
    pub fn parse(codes: &str) -> Option<Self> {
        codes
            .chars()
            .try_fold(Self::EMPTY, |set, c| Weekday::from_code(c).map(|d| set.with(d)))
    }

    /// Returns a copy with `day` added.
    #[inline]
    pub fn with(self, day: Weekday) -> Self {
        WeekdaySet(self.0 | (1 << day.index()))
    }

    #[inline]
    pub fn contains(self, day: Weekday) -> bool {
        self.0 & (1 << day.index()) != 0
    }

    /// Whether the two sets share at least one day.
    #[inline]
    pub fn intersects(self, other: WeekdaySet) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Days in calendar order.
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        Weekday::ALL.into_iter().filter(move |&d| self.contains(d))
    }
}

impl fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for day in self.iter() {
            write!(f, "{}", day.code())?;
        }
        Ok(())
    }
}

/// A recurring weekly meeting: a set of days and a `[start, end)` interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingTime {
    /// Days on which the meeting recurs.
    pub days: WeekdaySet,
    /// Start (minutes since midnight, inclusive).
    pub start: u32,
    /// End (minutes since midnight, exclusive).
    pub end: u32,
}

impl MeetingTime {
    /// Creates a meeting time.
    pub fn new(days: WeekdaySet, start: u32, end: u32) -> Self {
        Self { days, start, end }
    }

    /// Meeting time of a run of `len` blocks starting at block `start_block`.
    pub fn from_blocks(day: Weekday, start_block: usize, len: usize) -> Self {
        let start = DAY_START_MINUTES + start_block as u32 * BLOCK_PITCH_MINUTES;
        Self {
            days: WeekdaySet::of(&[day]),
            start,
            end: start + len as u32 * BLOCK_MINUTES,
        }
    }

    /// Duration of one occurrence in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Whether two meeting times collide: a shared day and overlapping intervals.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.days.intersects(other.days) && self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for MeetingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:02}:{:02}-{:02}:{:02}",
            self.days,
            self.start / 60,
            self.start % 60,
            self.end / 60,
            self.end % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_set_parse_and_display() {
        let mwf = WeekdaySet::parse("MWF").unwrap();
        assert!(mwf.contains(Weekday::Monday));
        assert!(mwf.contains(Weekday::Friday));
        assert!(!mwf.contains(Weekday::Thursday));
        assert_eq!(mwf.to_string(), "MWF");

        assert_eq!(WeekdaySet::parse("tr").unwrap().to_string(), "TR");
        assert!(WeekdaySet::parse("MX").is_none());
        assert!(WeekdaySet::parse("").unwrap().is_empty());
        assert!(!mwf.is_empty());
    }

    #[test]
    fn test_from_blocks() {
        let m = MeetingTime::from_blocks(Weekday::Monday, 2, 2);
        assert_eq!(m.start, hm(9, 0));
        assert_eq!(m.end, hm(9, 50));
        assert_eq!(m.to_string(), "M 09:00-09:50");

        let first = MeetingTime::from_blocks(Weekday::Tuesday, 0, 3);
        assert_eq!(first.start, DAY_START_MINUTES);
        assert_eq!(first.duration_minutes(), 75);
    }

    #[test]
    fn test_overlap_needs_shared_day() {
        let mwf = MeetingTime::new(WeekdaySet::parse("MWF").unwrap(), hm(9, 0), hm(9, 50));
        let tr = MeetingTime::new(WeekdaySet::parse("TR").unwrap(), hm(9, 0), hm(9, 50));
        assert!(mwf.overlaps(&mwf));
        assert!(!mwf.overlaps(&tr));
        assert!(!tr.overlaps(&mwf));
    }

    #[test]
    fn test_overlap_half_open() {
        let days = WeekdaySet::of(&[Weekday::Wednesday]);
        let a = MeetingTime::new(days, hm(9, 0), hm(10, 0));
        let b = MeetingTime::new(days, hm(10, 0), hm(11, 0)); // touching
        let c = MeetingTime::new(days, hm(9, 30), hm(10, 30));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }
}
