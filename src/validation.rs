//! Catalog validation.
//!
//! Checks structural integrity of rooms, courses and the student
//! population before any timetable is built. Detects:
//! - Duplicate IDs
//! - Unknown room and course references
//! - Usages the allocator cannot lay out
//! - Inconsistent credit ranges, weights and population fractions
//!
//! Every problem is collected, so one pass reports the whole catalog.

use crate::models::{
    AllocationPolicy, Course, Room, StudentPopulation, DAY_END_MINUTES, DAY_START_MINUTES,
};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A room has no seats, no hours or blocked periods outside its day.
    InvalidRoom,
    /// A usage references a room that doesn't exist.
    InvalidRoomReference,
    /// A preference weight references a course that doesn't exist.
    InvalidCourseReference,
    /// A course declares neither a classroom nor a lab usage.
    MissingUsage,
    /// A declared usage has zero contact hours.
    ZeroContactHours,
    /// A usage lists no compatible room.
    NoCompatibleRoom,
    /// A usage asks for zero sections or a zero seat cap.
    InvalidSectionCount,
    /// A usage needs more blocks than its policy can lay out.
    UnsupportedBlockCount,
    /// An archetype's minimum credits exceed its maximum.
    InvalidCreditRange,
    /// A preference weight is outside [0, 1].
    InvalidWeight,
    /// Population fractions are negative, non-finite or all zero.
    InvalidFraction,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Longest room day that still ends inside the campus window.
const MAX_HOURS_PER_DAY: u32 = (DAY_END_MINUTES - DAY_START_MINUTES) / 60;

/// Validates a facility catalog.
///
/// Checks:
/// 1. No duplicate room, course or archetype IDs
/// 2. Rooms have seats, 1..=9 hours and blocked periods inside their day
/// 3. Every course declares at least one usage
/// 4. Every usage has contact hours, sections and known compatible rooms
/// 5. Block counts fit the usage's policy (and, for contiguous runs, the
///    day of every compatible room)
/// 6. Archetypes have `min ≤ max` credits and weights in [0, 1] on known courses
/// 7. Population fractions are finite, non-negative and not all zero
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_catalog(
    rooms: &[Room],
    courses: &[Course],
    population: &StudentPopulation,
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut room_index: HashMap<&str, &Room> = HashMap::new();
    for room in rooms {
        if room_index.insert(room.id.as_str(), room).is_some() {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate room ID: {}", room.id),
            ));
        }
        check_room(room, &mut errors);
    }

    let mut course_ids = HashSet::new();
    for course in courses {
        if !course_ids.insert(course.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate course ID: {}", course.id),
            ));
        }
        check_course(course, &room_index, &mut errors);
    }

    check_population(population, &course_ids, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_room(room: &Room, errors: &mut Vec<ValidationError>) {
    if room.capacity == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidRoom,
            format!("Room '{}' has no seats", room.id),
        ));
    }
    if room.hours_per_day == 0 || room.hours_per_day > MAX_HOURS_PER_DAY {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidRoom,
            format!(
                "Room '{}' is available {} hours per day (expected 1..={MAX_HOURS_PER_DAY})",
                room.id, room.hours_per_day
            ),
        ));
    }
    for period in &room.blocked {
        if period.len == 0 || period.start_block + period.len > room.blocks_per_day() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidRoom,
                format!(
                    "Room '{}' blocks {} block(s) from block {} on {:?}, outside its {}-block day",
                    room.id,
                    period.len,
                    period.start_block,
                    period.day,
                    room.blocks_per_day()
                ),
            ));
        }
    }
}

fn check_course(course: &Course, rooms: &HashMap<&str, &Room>, errors: &mut Vec<ValidationError>) {
    if course.declared_usages().next().is_none() {
        errors.push(ValidationError::new(
            ValidationErrorKind::MissingUsage,
            format!("Course '{}' declares no classroom or lab usage", course.id),
        ));
    }

    for (usage, req) in course.declared_usages() {
        if req.contact_hours == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroContactHours,
                format!("Course '{}' {usage} has zero contact hours", course.id),
            ));
        }
        if req.sections == 0 || req.seats_per_section == Some(0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidSectionCount,
                format!("Course '{}' {usage} offers no seats", course.id),
            ));
        }
        if req.rooms.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::NoCompatibleRoom,
                format!("Course '{}' {usage} lists no compatible room", course.id),
            ));
        }

        let blocks = req.blocks();
        if let Some(max) = req.policy.max_blocks() {
            if blocks > max {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnsupportedBlockCount,
                    format!(
                        "Course '{}' {usage} needs {blocks} blocks but {} supports at most {max}",
                        course.id, req.policy
                    ),
                ));
            }
        }

        for room_id in &req.rooms {
            match rooms.get(room_id.as_str()) {
                None => errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidRoomReference,
                    format!("Course '{}' {usage} references unknown room '{room_id}'", course.id),
                )),
                Some(room)
                    if req.policy == AllocationPolicy::Contiguous
                        && blocks > room.blocks_per_day() =>
                {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::UnsupportedBlockCount,
                        format!(
                            "Course '{}' {usage} needs a {blocks}-block run but room '{room_id}' has {} blocks per day",
                            course.id,
                            room.blocks_per_day()
                        ),
                    ))
                }
                Some(_) => {}
            }
        }
    }
}

fn check_population(
    population: &StudentPopulation,
    course_ids: &HashSet<&str>,
    errors: &mut Vec<ValidationError>,
) {
    let mut archetypes = HashSet::new();
    let mut total = 0.0;

    for share in &population.shares {
        let prefs = &share.preferences;
        if !archetypes.insert(prefs.archetype.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate archetype: {}", prefs.archetype),
            ));
        }
        if prefs.min_credits > prefs.max_credits {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCreditRange,
                format!(
                    "Archetype '{}' needs {} credits but allows at most {}",
                    prefs.archetype, prefs.min_credits, prefs.max_credits
                ),
            ));
        }
        for (course_id, &weight) in &prefs.weights {
            if !course_ids.contains(course_id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidCourseReference,
                    format!(
                        "Archetype '{}' weights unknown course '{course_id}'",
                        prefs.archetype
                    ),
                ));
            }
            if !(0.0..=1.0).contains(&weight) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidWeight,
                    format!(
                        "Archetype '{}' weights course '{course_id}' at {weight} (expected 0..=1)",
                        prefs.archetype
                    ),
                ));
            }
        }

        if !share.fraction.is_finite() || share.fraction < 0.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidFraction,
                format!(
                    "Archetype '{}' has population fraction {}",
                    prefs.archetype, share.fraction
                ),
            ));
        } else {
            total += share.fraction;
        }
    }

    if total <= 0.0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidFraction,
            "Population fractions sum to zero",
        ));
    }
}
