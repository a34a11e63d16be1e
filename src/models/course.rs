//! Course model.
//!
//! A course carries its credit value, whether every student must take
//! it, and one optional requirement per room usage (classroom, lab).
//! Each requirement states the weekly contact hours, the block
//! allocation policy and the rooms it may be placed in.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The role a room serves for a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Usage {
    /// Lecture or recitation in a classroom.
    Classroom,
    /// Hands-on session in a teaching lab.
    Lab,
}

impl Usage {
    /// Number of usage kinds.
    pub const COUNT: usize = 2;

    /// All usages, in allocation order.
    pub const ALL: [Usage; Usage::COUNT] = [Usage::Classroom, Usage::Lab];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Usage::Classroom => write!(f, "CLASSROOM"),
            Usage::Lab => write!(f, "LAB"),
        }
    }
}

/// How a request's blocks are laid out over the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AllocationPolicy {
    /// One unbroken run on a single day.
    Contiguous,
    /// 2-block meetings, one per day (1–5 meetings).
    GroupsOf2,
    /// 3-block meetings, one per day (1–3 meetings).
    GroupsOf3,
    /// Whichever of the two grouped layouts the room has more slack for.
    GroupsOf2Or3,
}

impl AllocationPolicy {
    /// Largest number of blocks the policy can lay out, if bounded.
    ///
    /// `Contiguous` is bounded by the room's day length instead.
    pub fn max_blocks(self) -> Option<usize> {
        match self {
            AllocationPolicy::Contiguous => None,
            AllocationPolicy::GroupsOf2 | AllocationPolicy::GroupsOf2Or3 => Some(10),
            AllocationPolicy::GroupsOf3 => Some(9),
        }
    }
}

impl fmt::Display for AllocationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AllocationPolicy::Contiguous => "CONTIGUOUS",
            AllocationPolicy::GroupsOf2 => "GROUPS_OF_2",
            AllocationPolicy::GroupsOf3 => "GROUPS_OF_3",
            AllocationPolicy::GroupsOf2Or3 => "GROUPS_OF_2_OR_3",
        };
        f.write_str(name)
    }
}

/// Room requirement of one course usage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRequirement {
    /// Weekly contact hours (one hour = two blocks).
    pub contact_hours: u32,
    /// Block layout policy.
    pub policy: AllocationPolicy,
    /// Compatible room IDs, tried in order.
    pub rooms: Vec<String>,
    /// Number of sections to offer (default: 1).
    pub sections: u32,
    /// Seat cap per section. `None` = the room's capacity.
    pub seats_per_section: Option<u32>,
}

impl UsageRequirement {
    /// Creates a requirement with one section and no compatible rooms.
    pub fn new(contact_hours: u32, policy: AllocationPolicy) -> Self {
        Self {
            contact_hours,
            policy,
            rooms: Vec::new(),
            sections: 1,
            seats_per_section: None,
        }
    }

    /// Adds a compatible room.
    pub fn with_room(mut self, room_id: impl Into<String>) -> Self {
        self.rooms.push(room_id.into());
        self
    }

    /// Sets the number of sections.
    pub fn with_sections(mut self, sections: u32) -> Self {
        self.sections = sections;
        self
    }

    /// Caps the seats of each section.
    pub fn with_seat_cap(mut self, seats: u32) -> Self {
        self.seats_per_section = Some(seats);
        self
    }

    /// Number of 25-minute blocks needed per week.
    #[inline]
    pub fn blocks(&self) -> usize {
        self.contact_hours as usize * 2
    }
}

/// An offered course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Unique course identifier.
    pub id: String,
    /// Human-readable title.
    pub name: String,
    /// Credit value.
    pub credits: u32,
    /// Whether every student must take this course.
    pub mandatory: bool,
    /// Requirement per usage, indexed by [`Usage::index`].
    pub usages: [Option<UsageRequirement>; Usage::COUNT],
}

impl Course {
    /// Creates an elective course with no usages.
    pub fn new(id: impl Into<String>, credits: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            credits,
            mandatory: false,
            usages: [None, None],
        }
    }

    /// Sets the course title.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Marks the course as mandatory for every student.
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Declares a usage requirement, replacing any previous one.
    pub fn with_usage(mut self, usage: Usage, requirement: UsageRequirement) -> Self {
        self.usages[usage.index()] = Some(requirement);
        self
    }

    /// Requirement for a usage, if declared.
    #[inline]
    pub fn requirement(&self, usage: Usage) -> Option<&UsageRequirement> {
        self.usages[usage.index()].as_ref()
    }

    /// Declared usages with their requirements, in allocation order.
    pub fn declared_usages(&self) -> impl Iterator<Item = (Usage, &UsageRequirement)> {
        Usage::ALL
            .into_iter()
            .filter_map(move |u| self.requirement(u).map(|r| (u, r)))
    }
}
