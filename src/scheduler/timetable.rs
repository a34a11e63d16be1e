//! Greedy timetable builder.
//!
//! # Algorithm
//!
//! 1. Reset every room grid (blocked periods stay).
//! 2. Order courses: mandatory first, then catalog order.
//! 3. For each declared usage and each requested section, try the usage's
//!    compatible rooms in declared order; the first room that accepts the
//!    block request hosts the section.
//! 4. A section no room accepts is recorded as unschedulable with the
//!    last room's rejection.
//!
//! Rejected attempts may leave groups behind on a grid (see
//! [`Rejection::Interrupted`]); those blocks stay reserved.
//!
//! # Complexity
//! O(s · r) allocation calls, where s = requested sections and
//! r = compatible rooms per usage.

use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::grid::{allocate, BlockRequest, Placement, Rejection, RoomTimeGrid};
use crate::models::{Course, OfferedSection, Room, SectionId, Usage};

/// A requested section no compatible room could host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnscheduledSection {
    pub course_id: String,
    pub usage: Usage,
    /// Zero-based index among the usage's requested sections.
    pub index: u32,
    /// Rejection from the last room tried, `None` if no room exists.
    pub reason: Option<Rejection>,
}

impl fmt::Display for UnscheduledSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} section {}: ", self.course_id, self.usage, self.index + 1)?;
        match &self.reason {
            Some(reason) => write!(f, "{reason}"),
            None => f.write_str("no compatible room"),
        }
    }
}

/// The section inventory built from a catalog.
#[derive(Debug, Clone, Default)]
pub struct Timetable {
    sections: Vec<OfferedSection>,
    by_course: HashMap<String, [Vec<SectionId>; Usage::COUNT]>,
    grids: Vec<RoomTimeGrid>,
    unscheduled: Vec<UnscheduledSection>,
}

impl Timetable {
    /// All offered sections, indexed by [`SectionId`].
    #[inline]
    pub fn sections(&self) -> &[OfferedSection] {
        &self.sections
    }

    /// Looks up a section.
    pub fn section(&self, id: SectionId) -> Option<&OfferedSection> {
        self.sections.get(id.0)
    }

    /// Sections offered for one course usage.
    pub fn sections_for(&self, course_id: &str, usage: Usage) -> &[SectionId] {
        self.by_course
            .get(course_id)
            .map(|lists| lists[usage.index()].as_slice())
            .unwrap_or(&[])
    }

    /// One section list per declared usage of a course, lecture first.
    ///
    /// A declared usage without sections yields an empty list, so the
    /// course can never be registered.
    pub fn section_lists(&self, course: &Course) -> Vec<&[SectionId]> {
        course
            .declared_usages()
            .map(|(usage, _)| self.sections_for(&course.id, usage))
            .collect()
    }

    /// Total seats offered for one course usage.
    pub fn seats_for(&self, course_id: &str, usage: Usage) -> u32 {
        self.sections_for(course_id, usage)
            .iter()
            .filter_map(|&id| self.section(id))
            .map(|s| s.capacity)
            .sum()
    }

    /// Room grids after allocation, in room order.
    #[inline]
    pub fn grids(&self) -> &[RoomTimeGrid] {
        &self.grids
    }

    /// Grid of one room.
    pub fn grid(&self, room_id: &str) -> Option<&RoomTimeGrid> {
        self.grids.iter().find(|g| g.room_id() == room_id)
    }

    /// Requested sections that could not be placed.
    #[inline]
    pub fn unscheduled(&self) -> &[UnscheduledSection] {
        &self.unscheduled
    }
}

impl fmt::Display for Timetable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for grid in self.grids() {
            writeln!(f, "{grid}")?;
        }
        for section in &self.sections {
            writeln!(f, "{section}")?;
        }
        Ok(())
    }
}

/// Builds timetables on a fixed set of rooms.
///
/// # Example
///
/// ```
/// use u_facility::models::{AllocationPolicy, Course, Room, Usage, UsageRequirement};
/// use u_facility::scheduler::TimetableBuilder;
///
/// let rooms = vec![Room::new("R1", 40, 9)];
/// let courses = vec![Course::new("BIO101", 3).with_usage(
///     Usage::Classroom,
///     UsageRequirement::new(3, AllocationPolicy::GroupsOf2Or3).with_room("R1"),
/// )];
///
/// let mut builder = TimetableBuilder::new(&rooms);
/// let timetable = builder.build(&courses);
/// assert_eq!(timetable.sections().len(), 1);
/// assert_eq!(timetable.seats_for("BIO101", Usage::Classroom), 40);
/// ```
#[derive(Debug, Clone)]
pub struct TimetableBuilder {
    grids: Vec<RoomTimeGrid>,
}

impl TimetableBuilder {
    /// Creates a builder with one empty grid per room.
    pub fn new(rooms: &[Room]) -> Self {
        Self {
            grids: rooms.iter().map(RoomTimeGrid::new).collect(),
        }
    }

    /// Builds a timetable from scratch.
    pub fn build(&mut self, courses: &[Course]) -> Timetable {
        for grid in &mut self.grids {
            grid.reset();
        }

        let mut timetable = Timetable::default();
        for &idx in &course_order(courses) {
            let course = &courses[idx];
            for (usage, req) in course.declared_usages() {
                for index in 0..req.sections {
                    let mut reason = None;
                    let mut placed = None;

                    for room_id in &req.rooms {
                        let Some(grid) = self.grids.iter_mut().find(|g| g.room_id() == room_id.as_str())
                        else {
                            continue;
                        };
                        let seats = req
                            .seats_per_section
                            .map_or(grid.capacity(), |cap| cap.min(grid.capacity()));
                        let request = BlockRequest {
                            course_id: &course.id,
                            usage,
                            seats,
                            blocks: req.blocks(),
                            policy: req.policy,
                        };
                        match allocate(grid, &request) {
                            Placement::Placed(assignment) => {
                                placed = Some(assignment);
                                break;
                            }
                            Placement::Rejected(r) => reason = Some(r),
                        }
                    }

                    match placed {
                        Some(assignment) => {
                            let id = SectionId(timetable.sections.len());
                            let mut section = OfferedSection::new(
                                id,
                                &course.id,
                                usage,
                                &assignment.room_id,
                                assignment.seats,
                            );
                            section.meetings = assignment.meeting_times();
                            debug!("offered {section}");
                            timetable.sections.push(section);
                            timetable
                                .by_course
                                .entry(course.id.clone())
                                .or_default()[usage.index()]
                                .push(id);
                        }
                        None => {
                            let missing = UnscheduledSection {
                                course_id: course.id.clone(),
                                usage,
                                index,
                                reason,
                            };
                            warn!("unschedulable: {missing}");
                            timetable.unscheduled.push(missing);
                        }
                    }
                }
            }
        }

        timetable.grids = self.grids.clone();
        info!(
            "timetable built: {} section(s) offered, {} unschedulable",
            timetable.sections.len(),
            timetable.unscheduled.len()
        );
        timetable
    }
}

/// Course indices with mandatory courses first, otherwise in catalog order.
fn course_order(courses: &[Course]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..courses.len()).collect();
    indices.sort_by_key(|&i| !courses[i].mandatory);
    indices
}
