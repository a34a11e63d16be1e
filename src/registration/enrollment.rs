//! Per-trial seat occupancy.

use crate::models::{OfferedSection, SectionId};

/// Students enrolled in each section during one trial.
#[derive(Debug, Clone, Default)]
pub struct Enrollment {
    students: Vec<Vec<usize>>,
}

impl Enrollment {
    /// Creates an empty enrollment for `section_count` sections.
    pub fn new(section_count: usize) -> Self {
        Self {
            students: vec![Vec::new(); section_count],
        }
    }

    /// Students enrolled in a section.
    pub fn enrolled(&self, section: SectionId) -> &[usize] {
        self.students
            .get(section.0)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Seats still open in a section.
    pub fn remaining(&self, section: &OfferedSection) -> u32 {
        let taken = self.enrolled(section.id).len() as u32;
        section.capacity.saturating_sub(taken)
    }

    /// Adds a student to a section.
    pub fn enroll(&mut self, section: SectionId, student: usize) {
        if let Some(list) = self.students.get_mut(section.0) {
            list.push(student);
        }
    }

    /// Head count per section, indexed by section ID.
    pub fn counts(&self) -> Vec<usize> {
        self.students.iter().map(Vec::len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Usage;

    #[test]
    fn test_enroll_and_remaining() {
        let section = OfferedSection::new(SectionId(1), "C", Usage::Lab, "L1", 2);
        let mut e = Enrollment::new(2);
        assert_eq!(e.remaining(&section), 2);

        e.enroll(SectionId(1), 10);
        e.enroll(SectionId(1), 11);
        assert_eq!(e.enrolled(SectionId(1)), &[10, 11]);
        assert_eq!(e.remaining(&section), 0);
        assert_eq!(e.counts(), vec![0, 2]);

        // Unknown sections are ignored.
        e.enroll(SectionId(9), 1);
        assert!(e.enrolled(SectionId(9)).is_empty());
    }
}
