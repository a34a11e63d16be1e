//! Enrolling student model.

use serde::{Deserialize, Serialize};

use super::SectionId;

/// A student going through one simulated registration pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrollingStudent {
    /// Index of the student within the trial roster.
    pub id: usize,
    /// Index of the archetype in the population's shares.
    pub archetype: usize,
    /// Registered course IDs, in registration order.
    pub courses: Vec<String>,
    /// Sections of the chosen track, one per course usage.
    pub sections: Vec<SectionId>,
    /// Credits of the registered courses.
    pub credits: u32,
    /// Quality of the chosen schedule. `None` = unscheduled.
    pub quality: Option<f64>,
}

impl EnrollingStudent {
    /// Creates a student with an empty schedule.
    pub fn new(id: usize, archetype: usize) -> Self {
        Self {
            id,
            archetype,
            ..Default::default()
        }
    }

    /// Whether the student ended the trial with at least one section.
    #[inline]
    pub fn is_scheduled(&self) -> bool {
        !self.sections.is_empty()
    }
}
