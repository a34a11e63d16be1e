//! Validated facility catalog.

use std::collections::HashMap;

use super::{Timetable, TimetableBuilder};
use crate::error::{Error, Result};
use crate::models::{Course, Room, StudentPopulation};
use crate::validation::validate_catalog;

/// Rooms, courses and the student population, checked for consistency.
///
/// Construction runs [`validate_catalog`]; a `Facility` that exists is
/// always safe to build timetables and simulate on.
#[derive(Debug, Clone)]
pub struct Facility {
    rooms: Vec<Room>,
    courses: Vec<Course>,
    population: StudentPopulation,
    course_index: HashMap<String, usize>,
}

impl Facility {
    /// Validates and wraps a catalog.
    ///
    /// # Errors
    /// [`Error::InvalidCatalog`] with every problem found.
    pub fn new(rooms: Vec<Room>, courses: Vec<Course>, population: StudentPopulation) -> Result<Self> {
        validate_catalog(&rooms, &courses, &population).map_err(Error::InvalidCatalog)?;

        let course_index = courses
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();
        Ok(Self {
            rooms,
            courses,
            population,
            course_index,
        })
    }

    #[inline]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    #[inline]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    #[inline]
    pub fn population(&self) -> &StudentPopulation {
        &self.population
    }

    /// Looks up a course by ID.
    pub fn course(&self, id: &str) -> Option<&Course> {
        self.course_index.get(id).map(|&i| &self.courses[i])
    }

    /// Mandatory courses in catalog order.
    pub fn mandatory_courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.iter().filter(|c| c.mandatory)
    }

    /// Builds a fresh timetable for the catalog.
    pub fn build_timetable(&self) -> Timetable {
        TimetableBuilder::new(&self.rooms).build(&self.courses)
    }
}
