//! Section conflict resolution.
//!
//! A student's registration state is a set of *tracks*: every
//! conflict-free combination of sections that covers the courses taken
//! so far. Adding a course extends every track with every compatible
//! section of that course.
//!
//! # Algorithm
//! For each track `t` and candidate `c` with open seats: keep `t + c`
//! unless `c` overlaps a section already in `t`. A course with a lecture
//! and a lab list is extended once per list.
//!
//! # Complexity
//! O(T · C · L) per extension, where T = tracks, C = candidates and
//! L = track length. Tracks are never pruned.

use serde::Serialize;
use std::collections::BTreeMap;

use super::Enrollment;
use crate::models::{OfferedSection, SectionId};

/// One conflict-free combination of sections.
pub type Track = Vec<SectionId>;

/// Section pairs found to overlap, with how often they were compared.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollisionLog {
    counts: BTreeMap<SectionId, BTreeMap<SectionId, u64>>,
}

impl CollisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a mutual collision between two sections.
    pub fn record(&mut self, a: SectionId, b: SectionId) {
        *self.counts.entry(a).or_default().entry(b).or_insert(0) += 1;
        *self.counts.entry(b).or_default().entry(a).or_insert(0) += 1;
    }

    /// How often `a` was found colliding with `b`.
    pub fn count(&self, a: SectionId, b: SectionId) -> u64 {
        self.counts
            .get(&a)
            .and_then(|m| m.get(&b))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The `n` most frequent pairs, each reported once as `(low, high, count)`.
    pub fn top(&self, n: usize) -> Vec<(SectionId, SectionId, u64)> {
        let mut pairs: Vec<(SectionId, SectionId, u64)> = self
            .counts
            .iter()
            .flat_map(|(&a, m)| m.iter().map(move |(&b, &c)| (a, b, c)))
            .filter(|(a, b, _)| a < b)
            .collect();
        pairs.sort_by(|x, y| y.2.cmp(&x.2).then(x.0.cmp(&y.0)).then(x.1.cmp(&y.1)));
        pairs.truncate(n);
        pairs
    }
}

/// Extends tracks with a course's section choices during one trial.
pub struct SectionConflictResolver<'a> {
    sections: &'a [OfferedSection],
    enrollment: &'a Enrollment,
    collisions: &'a mut CollisionLog,
}

impl<'a> SectionConflictResolver<'a> {
    /// Creates a resolver over the timetable's sections and the trial's seats.
    pub fn new(
        sections: &'a [OfferedSection],
        enrollment: &'a Enrollment,
        collisions: &'a mut CollisionLog,
    ) -> Self {
        Self {
            sections,
            enrollment,
            collisions,
        }
    }

    /// Every track extended by every compatible candidate with open seats.
    ///
    /// Returns an empty set when no extension is possible.
    pub fn extend(&mut self, tracks: &[Track], choices: &[SectionId]) -> Vec<Track> {
        let mut extended = Vec::new();
        for track in tracks {
            for &candidate in choices {
                let Some(section) = self.sections.get(candidate.0) else {
                    continue;
                };
                if self.enrollment.remaining(section) == 0 {
                    continue;
                }

                let mut clear = true;
                for &taken in track {
                    if self.sections[taken.0].conflicts_with(section) {
                        self.collisions.record(taken, candidate);
                        clear = false;
                    }
                }
                if clear {
                    let mut next = track.clone();
                    next.push(candidate);
                    extended.push(next);
                }
            }
        }
        extended
    }

    /// Extends the tracks once per parallel section list of a course.
    ///
    /// Returns `None` when any list leaves no track, i.e. the course cannot
    /// be registered.
    pub fn register(&mut self, tracks: &[Track], section_lists: &[&[SectionId]]) -> Option<Vec<Track>> {
        let mut current = tracks.to_vec();
        for &list in section_lists {
            current = self.extend(&current, list);
            if current.is_empty() {
                return None;
            }
        }
        Some(current)
    }
}
