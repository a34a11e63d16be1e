//! Student preference model.
//!
//! An archetype ([`StudentClassPreferences`]) describes a family of
//! students: the credit load they aim for and how much they want each
//! course. A [`StudentPopulation`] mixes archetypes by fraction and
//! materializes integer head counts for a concrete population size.
//!
//! # Weighted Selection
//! `pick` is a roulette-wheel draw: courses with weight 0 (or absent) are
//! never drawn, others are drawn proportionally to their weight.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Course preferences of one student archetype.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentClassPreferences {
    /// Archetype key (e.g., "commuter", "full-time").
    pub archetype: String,
    /// Lowest credit load the student is satisfied with.
    pub min_credits: u32,
    /// Highest credit load the student will take.
    pub max_credits: u32,
    /// Desirability per course ID, in [0.0, 1.0].
    pub weights: BTreeMap<String, f64>,
}

impl StudentClassPreferences {
    /// Creates an archetype with no course preferences.
    pub fn new(archetype: impl Into<String>, min_credits: u32, max_credits: u32) -> Self {
        Self {
            archetype: archetype.into(),
            min_credits,
            max_credits,
            weights: BTreeMap::new(),
        }
    }

    /// Sets the desirability of a course.
    pub fn with_weight(mut self, course_id: impl Into<String>, weight: f64) -> Self {
        self.weights.insert(course_id.into(), weight);
        self
    }

    /// Desirability of a course (0.0 if not listed).
    pub fn weight(&self, course_id: &str) -> f64 {
        self.weights.get(course_id).copied().unwrap_or(0.0)
    }

    /// Sum of all positive weights.
    pub fn total_weight(&self) -> f64 {
        self.weights.values().filter(|&&w| w > 0.0).sum()
    }

    /// Draws a course proportionally to its weight.
    ///
    /// Returns `None` when no course has a positive weight.
    pub fn pick<R: Rng>(&self, rng: &mut R) -> Option<&str> {
        let total = self.total_weight();
        if total <= 0.0 {
            return None;
        }

        let draw = rng.random::<f64>() * total;
        let mut cumulative = 0.0;
        let mut last = None;
        for (course_id, &w) in self.weights.iter().filter(|(_, w)| **w > 0.0) {
            cumulative += w;
            if cumulative > draw {
                return Some(course_id.as_str());
            }
            last = Some(course_id.as_str());
        }
        // Float rounding can leave the draw just above the final sum.
        last
    }
}

/// One archetype and its share of the population.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchetypeShare {
    pub preferences: StudentClassPreferences,
    /// Fraction of students following this archetype.
    pub fraction: f64,
}

/// A student population described by archetype fractions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentPopulation {
    pub shares: Vec<ArchetypeShare>,
}

impl StudentPopulation {
    /// Creates an empty population.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an archetype with its population fraction.
    pub fn with_archetype(mut self, preferences: StudentClassPreferences, fraction: f64) -> Self {
        self.shares.push(ArchetypeShare {
            preferences,
            fraction,
        });
        self
    }

    /// Looks up an archetype by key.
    pub fn archetype(&self, key: &str) -> Option<&StudentClassPreferences> {
        self.shares
            .iter()
            .map(|s| &s.preferences)
            .find(|p| p.archetype == key)
    }

    /// Integer head counts per archetype (aligned with `shares`) summing to `n`.
    ///
    /// Fractions are normalized by their sum and floored; the remainder
    /// goes to the archetype with the largest fraction (the first one
    /// on ties).
    pub fn get_counts(&self, n: usize) -> Vec<usize> {
        let total: f64 = self.shares.iter().map(|s| s.fraction.max(0.0)).sum();
        if self.shares.is_empty() {
            return Vec::new();
        }

        let mut counts: Vec<usize> = self
            .shares
            .iter()
            .map(|s| {
                if total > 0.0 {
                    (s.fraction.max(0.0) / total * n as f64).floor() as usize
                } else {
                    0
                }
            })
            .collect();

        let assigned: usize = counts.iter().sum();
        let largest = self
            .shares
            .iter()
            .enumerate()
            .fold(0, |best, (i, s)| {
                if s.fraction > self.shares[best].fraction {
                    i
                } else {
                    best
                }
            });
        counts[largest] += n.saturating_sub(assigned);
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_weight_lookup() {
        let p = StudentClassPreferences::new("full-time", 12, 16)
            .with_weight("MATH-101", 0.8)
            .with_weight("ART-100", 0.0);
        assert!((p.weight("MATH-101") - 0.8).abs() < 1e-12);
        assert_eq!(p.weight("ART-100"), 0.0);
        assert_eq!(p.weight("UNLISTED"), 0.0);
    }

    #[test]
    fn test_pick_distribution() {
        let p = StudentClassPreferences::new("x", 0, 10)
            .with_weight("A", 1.0)
            .with_weight("B", 0.0)
            .with_weight("C", 0.5);
        let mut rng = SmallRng::seed_from_u64(7);

        let (mut a, mut c) = (0u32, 0u32);
        for _ in 0..100_000 {
            match p.pick(&mut rng) {
                Some("A") => a += 1,
                Some("C") => c += 1,
                other => panic!("unexpected draw {other:?}"),
            }
        }
        let ratio = a as f64 / c as f64;
        assert!((ratio - 2.0).abs() < 0.1, "A:C ratio {ratio}");
    }

    #[test]
    fn test_pick_nothing_selectable() {
        let mut rng = SmallRng::seed_from_u64(1);
        let empty = StudentClassPreferences::new("x", 0, 10);
        assert!(empty.pick(&mut rng).is_none());

        let zeros = StudentClassPreferences::new("y", 0, 10).with_weight("A", 0.0);
        assert!(zeros.pick(&mut rng).is_none());
    }

    #[test]
    fn test_pick_is_reproducible() {
        let p = StudentClassPreferences::new("x", 0, 10)
            .with_weight("A", 0.3)
            .with_weight("B", 0.3)
            .with_weight("C", 0.4);
        let draws = |seed| {
            let mut rng = SmallRng::seed_from_u64(seed);
            (0..50)
                .map(|_| p.pick(&mut rng).unwrap().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(draws(42), draws(42));
    }

    #[test]
    fn test_counts_sum_to_n() {
        let pop = StudentPopulation::new()
            .with_archetype(StudentClassPreferences::new("a", 12, 15), 0.5)
            .with_archetype(StudentClassPreferences::new("b", 12, 15), 0.3)
            .with_archetype(StudentClassPreferences::new("c", 6, 9), 0.2);

        for n in [0, 1, 7, 10, 33, 101] {
            let counts = pop.get_counts(n);
            assert_eq!(counts.iter().sum::<usize>(), n, "n = {n}");
        }
        // floor(3.5)=3, floor(2.1)=2, floor(1.4)=1 → remainder 1 to "a"
        assert_eq!(pop.get_counts(7), vec![4, 2, 1]);
    }

    #[test]
    fn test_counts_unnormalized_fractions() {
        let pop = StudentPopulation::new()
            .with_archetype(StudentClassPreferences::new("a", 12, 15), 1.0)
            .with_archetype(StudentClassPreferences::new("b", 12, 15), 3.0);
        assert_eq!(pop.get_counts(8), vec![2, 6]);
        assert!(pop.archetype("b").is_some());
        assert!(pop.archetype("z").is_none());
    }
}
