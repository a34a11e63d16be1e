//! Advisory diagnostics gathered across trials.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use super::CollisionLog;

/// Collision pairs listed in the report.
const TOP_COLLISIONS: usize = 5;

/// Counters and notes explaining why registrations went wrong.
///
/// Nothing here affects the simulation; it only accumulates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    /// Sections the timetable builder could not place.
    pub unschedulable_sections: Vec<String>,
    /// Failed mandatory registrations per course.
    pub mandatory_failures: BTreeMap<String, u64>,
    /// Scheduled students who ended below their minimum credits.
    pub reduced_credit_students: u64,
    /// Students whose elective search hit the consecutive-failure limit.
    pub exhausted_students: u64,
    /// Students who ended a trial with no section at all.
    pub unscheduled_students: u64,
    /// Section pairs that blocked each other.
    pub collisions: CollisionLog,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts a failed mandatory registration.
    pub fn record_mandatory_failure(&mut self, course_id: &str) {
        *self
            .mandatory_failures
            .entry(course_id.to_string())
            .or_insert(0) += 1;
    }

    /// Whether nothing went wrong.
    pub fn is_clean(&self) -> bool {
        self.unschedulable_sections.is_empty()
            && self.mandatory_failures.is_empty()
            && self.reduced_credit_students == 0
            && self.exhausted_students == 0
            && self.unscheduled_students == 0
            && self.collisions.is_empty()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "unschedulable sections: {}", self.unschedulable_sections.len())?;
        for note in &self.unschedulable_sections {
            writeln!(f, "  {note}")?;
        }

        writeln!(f, "mandatory registration failures:")?;
        if self.mandatory_failures.is_empty() {
            writeln!(f, "  none")?;
        }
        for (course, count) in &self.mandatory_failures {
            writeln!(f, "  {course}: {count}")?;
        }

        writeln!(f, "reduced-credit students: {}", self.reduced_credit_students)?;
        writeln!(f, "preference exhaustions: {}", self.exhausted_students)?;
        writeln!(f, "unscheduled students: {}", self.unscheduled_students)?;

        writeln!(f, "top section collisions:")?;
        let top = self.collisions.top(TOP_COLLISIONS);
        if top.is_empty() {
            writeln!(f, "  none")?;
        }
        for (a, b, count) in top {
            writeln!(f, "  {a} x {b}: {count}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SectionId;

    #[test]
    fn test_report_text() {
        let mut diag = Diagnostics::new();
        assert!(diag.is_clean());

        diag.unschedulable_sections
            .push("BIO101 LAB section 2: no fitting day combination".into());
        diag.record_mandatory_failure("CHEM101");
        diag.record_mandatory_failure("CHEM101");
        diag.unscheduled_students = 4;
        diag.collisions.record(SectionId(0), SectionId(3));
        assert!(!diag.is_clean());

        let text = diag.to_string();
        assert!(text.contains("unschedulable sections: 1"));
        assert!(text.contains("  BIO101 LAB section 2"));
        assert!(text.contains("  CHEM101: 2"));
        assert!(text.contains("unscheduled students: 4"));
        assert!(text.contains("  #0 x #3: 1"));
    }
}
