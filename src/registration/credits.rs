//! Elective credit accumulation.
//!
//! # Algorithm
//! 1. Draw a course from the archetype's weights.
//! 2. Skip it if already taken or tried, or if it would exceed the
//!    archetype's maximum credits; otherwise try to register it.
//! 3. Once credits reach the minimum, flip two coins with
//!    `p = (credits − min + 1) / (max − min + 1)`; either heads stops.
//!
//! Every skipped or unregistrable draw is a failure. A run of
//! consecutive failures ends the search as *exhausted*; the total number
//! of draws is capped as well.

use log::{debug, warn};
use rand::Rng;
use std::collections::HashSet;

use crate::config::SimulationConfig;
use crate::models::StudentClassPreferences;

/// What one student's elective search produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreditOutcome {
    /// Credits after the search, including the starting credits.
    pub credits: u32,
    /// Courses registered during the search, in order.
    pub registered: Vec<String>,
    /// Every course a registration was attempted for.
    pub attempted: Vec<String>,
    /// Draws made.
    pub draws: u32,
    /// Whether the search hit the consecutive-failure limit.
    pub exhausted: bool,
}

/// Elective search for one archetype.
#[derive(Debug, Clone)]
pub struct CreditLoop<'a> {
    prefs: &'a StudentClassPreferences,
    max_draw_attempts: u32,
    max_consecutive_failures: u32,
}

impl<'a> CreditLoop<'a> {
    /// Creates a search using the configured draw limits.
    pub fn new(prefs: &'a StudentClassPreferences, config: &SimulationConfig) -> Self {
        Self {
            prefs,
            max_draw_attempts: config.max_draw_attempts,
            max_consecutive_failures: config.max_consecutive_failures.max(1),
        }
    }

    /// Runs the search.
    ///
    /// # Arguments
    /// * `credits` - Credits already held (mandatory courses).
    /// * `taken` - Courses that must not be drawn again.
    /// * `credits_of` - Credit value of a course, `None` if unknown.
    /// * `register` - Attempts registration; `true` on success.
    pub fn run<R, C, F>(
        &self,
        credits: u32,
        taken: &[String],
        credits_of: C,
        mut register: F,
        rng: &mut R,
    ) -> CreditOutcome
    where
        R: Rng,
        C: Fn(&str) -> Option<u32>,
        F: FnMut(&str) -> bool,
    {
        let prefs = self.prefs;
        let mut outcome = CreditOutcome {
            credits,
            ..Default::default()
        };
        let mut seen: HashSet<String> = taken.iter().cloned().collect();
        let mut failures = 0u32;

        let mut done = outcome.credits >= prefs.min_credits
            && wants_to_stop(outcome.credits, prefs.min_credits, prefs.max_credits, rng);

        while !done && outcome.draws < self.max_draw_attempts {
            let Some(course) = prefs.pick(rng) else {
                debug!("archetype '{}' has no selectable course", prefs.archetype);
                break;
            };
            outcome.draws += 1;

            let fits = credits_of(course)
                .filter(|c| outcome.credits + c <= prefs.max_credits);
            let accepted = match fits {
                Some(c) if !seen.contains(course) => {
                    seen.insert(course.to_string());
                    outcome.attempted.push(course.to_string());
                    if register(course) {
                        debug!("registered elective {course} ({c} credits)");
                        outcome.credits += c;
                        outcome.registered.push(course.to_string());
                        true
                    } else {
                        false
                    }
                }
                _ => false,
            };

            if accepted {
                failures = 0;
                done = outcome.credits >= prefs.min_credits
                    && wants_to_stop(outcome.credits, prefs.min_credits, prefs.max_credits, rng);
            } else {
                failures += 1;
                if failures >= self.max_consecutive_failures {
                    warn!(
                        "archetype '{}' exhausted its preferences after {} draws at {} credits",
                        prefs.archetype, outcome.draws, outcome.credits
                    );
                    outcome.exhausted = true;
                    break;
                }
            }
        }

        outcome
    }
}

/// Two Bernoulli draws with `p = (credits − min + 1) / (max − min + 1)`;
/// stops when either succeeds.
pub fn wants_to_stop<R: Rng>(credits: u32, min: u32, max: u32, rng: &mut R) -> bool {
    if credits < min {
        return false;
    }
    let span = max.saturating_sub(min) + 1;
    let p = ((credits - min + 1) as f64 / span as f64).clamp(0.0, 1.0);
    let first = rng.random_bool(p);
    let second = rng.random_bool(p);
    first || second
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn twenty_courses(min: u32, max: u32) -> StudentClassPreferences {
        (0..20).fold(StudentClassPreferences::new("any", min, max), |p, i| {
            p.with_weight(format!("C{i:02}"), 1.0)
        })
    }

    #[test]
    fn test_mean_credits_below_midpoint() {
        let prefs = twenty_courses(13, 17);
        let config = SimulationConfig::default();
        let search = CreditLoop::new(&prefs, &config);
        let mut rng = SmallRng::seed_from_u64(42);

        let runs = 10_000;
        let mut total = 0u64;
        for _ in 0..runs {
            let out = search.run(0, &[], |_| Some(1), |_| true, &mut rng);
            assert!((13..=17).contains(&out.credits), "credits {}", out.credits);
            assert!(!out.exhausted);
            total += out.credits as u64;
        }
        let mean = total as f64 / runs as f64;
        assert!(mean < 15.0, "mean {mean}");
        assert!(mean > 13.0, "mean {mean}");
    }

    #[test]
    fn test_respects_taken_and_max() {
        let prefs = StudentClassPreferences::new("any", 4, 6)
            .with_weight("MAND", 1.0)
            .with_weight("BIG", 1.0)
            .with_weight("SMALL", 1.0);
        let config = SimulationConfig::default();
        let search = CreditLoop::new(&prefs, &config);
        let mut rng = SmallRng::seed_from_u64(7);

        let credits_of = |c: &str| match c {
            "BIG" => Some(5),
            "SMALL" => Some(2),
            _ => Some(3),
        };
        for _ in 0..200 {
            let out = search.run(3, &["MAND".to_string()], credits_of, |_| true, &mut rng);
            assert!(!out.registered.contains(&"MAND".to_string()));
            assert!(!out.registered.contains(&"BIG".to_string()));
            assert!(out.credits <= 6);
        }
    }

    #[test]
    fn test_exhaustion_after_consecutive_failures() {
        let prefs = StudentClassPreferences::new("stuck", 3, 6).with_weight("A", 1.0);
        let config = SimulationConfig::default();
        let search = CreditLoop::new(&prefs, &config);
        let mut rng = SmallRng::seed_from_u64(1);

        let mut attempts = 0;
        let out = search.run(
            0,
            &[],
            |_| Some(3),
            |_| {
                attempts += 1;
                false
            },
            &mut rng,
        );
        assert!(out.exhausted);
        assert_eq!(out.draws, 100);
        assert_eq!(attempts, 1);
        assert_eq!(out.attempted, vec!["A".to_string()]);
        assert_eq!(out.credits, 0);
    }

    #[test]
    fn test_draw_cap() {
        let prefs = twenty_courses(10, 20);
        let config = SimulationConfig::default().with_draw_limits(5, 100);
        let search = CreditLoop::new(&prefs, &config);
        let mut rng = SmallRng::seed_from_u64(3);

        let out = search.run(0, &[], |_| Some(1), |_| false, &mut rng);
        assert_eq!(out.draws, 5);
        assert!(!out.exhausted);
    }

    #[test]
    fn test_no_selectable_course() {
        let prefs = StudentClassPreferences::new("idle", 3, 6).with_weight("A", 0.0);
        let config = SimulationConfig::default();
        let mut rng = SmallRng::seed_from_u64(5);

        let out = CreditLoop::new(&prefs, &config).run(0, &[], |_| Some(3), |_| true, &mut rng);
        assert_eq!(out.draws, 0);
        assert_eq!(out.credits, 0);
        assert!(!out.exhausted);
    }

    #[test]
    fn test_wants_to_stop_bounds() {
        let mut rng = SmallRng::seed_from_u64(9);
        for _ in 0..100 {
            assert!(!wants_to_stop(12, 13, 17, &mut rng));
            assert!(wants_to_stop(17, 13, 17, &mut rng));
            assert!(wants_to_stop(20, 13, 17, &mut rng));
        }
    }
}
