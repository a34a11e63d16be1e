//! Offered section model.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{MeetingTime, Usage};

/// Index of a section within its timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(pub usize);

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One scheduled offering of a course usage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferedSection {
    pub id: SectionId,
    /// Parent course ID.
    pub course_id: String,
    /// Which usage of the course this section serves.
    pub usage: Usage,
    /// Room the section was allocated into.
    pub room_id: String,
    /// Weekly meetings, ordered by first day.
    pub meetings: Vec<MeetingTime>,
    /// Seat capacity.
    pub capacity: u32,
}

impl OfferedSection {
    /// Creates a section with no meetings.
    pub fn new(
        id: SectionId,
        course_id: impl Into<String>,
        usage: Usage,
        room_id: impl Into<String>,
        capacity: u32,
    ) -> Self {
        Self {
            id,
            course_id: course_id.into(),
            usage,
            room_id: room_id.into(),
            meetings: Vec::new(),
            capacity,
        }
    }

    /// Adds a meeting time.
    pub fn with_meeting(mut self, meeting: MeetingTime) -> Self {
        self.meetings.push(meeting);
        self
    }

    /// Whether any meeting of `self` overlaps any meeting of `other`.
    ///
    /// Symmetric by construction.
    pub fn conflicts_with(&self, other: &OfferedSection) -> bool {
        self.meetings
            .iter()
            .any(|a| other.meetings.iter().any(|b| a.overlaps(b)))
    }
}

impl fmt::Display for OfferedSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} [{}]", self.course_id, self.usage, self.id, self.room_id)?;
        for m in &self.meetings {
            write!(f, " {m}")?;
        }
        Ok(())
    }
}
