//! Registration simulator.
//!
//! Runs simulated registration passes against a fixed timetable.
//!
//! # Algorithm
//!
//! Each trial walks through five stages:
//!
//! 1. **Init**: materialize the population's head counts and shuffle the
//!    roster uniformly.
//! 2. **Mandatory**: register every mandatory course; a failure is noted
//!    and the student carries on.
//! 3. **Electives**: run the archetype's credit loop; credits count only
//!    for courses that register.
//! 4. **Score**: pick the surviving track with the highest quality (the
//!    first one on ties).
//! 5. **Capture**: enroll the student into the winning sections before
//!    the next student registers.

use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;

use super::{CreditLoop, Diagnostics, Enrollment, SectionConflictResolver, Track};
use crate::config::SimulationConfig;
use crate::error::Result;
use crate::models::{EnrollingStudent, StudentClassPreferences};
use crate::scheduler::{Facility, ScheduleQuality, Timetable};

/// Result of one registration pass.
#[derive(Debug, Clone, Serialize)]
pub struct TrialOutcome {
    /// Students in roster order.
    pub students: Vec<EnrollingStudent>,
    /// Students that ended with at least one section.
    pub scheduled: usize,
    /// Mean quality over scheduled students (0 if none).
    pub average_quality: f64,
    /// Head count per section, indexed by section ID.
    pub enrollment: Vec<usize>,
    /// Students who attempted each course.
    pub demand: BTreeMap<String, usize>,
}

/// Aggregate of several trials.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    /// Average quality of each trial.
    pub trial_averages: Vec<f64>,
    /// Mean of the trial averages.
    pub average_quality: f64,
    /// Diagnostics accumulated so far.
    pub diagnostics: Diagnostics,
}

/// Per-trial state.
struct Trial {
    enrollment: Enrollment,
    demand: BTreeMap<String, usize>,
}

impl Trial {
    fn note_demand(&mut self, course_id: &str) {
        *self.demand.entry(course_id.to_string()).or_insert(0) += 1;
    }
}

/// Simulates student registration on a built timetable.
///
/// # Example
///
/// ```
/// use rand::rngs::SmallRng;
/// use rand::SeedableRng;
/// use u_facility::config::SimulationConfig;
/// use u_facility::models::*;
/// use u_facility::registration::RegistrationSimulator;
/// use u_facility::scheduler::Facility;
///
/// let facility = Facility::new(
///     vec![Room::new("R1", 40, 9)],
///     vec![Course::new("CORE", 3).mandatory().with_usage(
///         Usage::Classroom,
///         UsageRequirement::new(3, AllocationPolicy::GroupsOf2Or3).with_room("R1"),
///     )],
///     StudentPopulation::new().with_archetype(StudentClassPreferences::new("any", 3, 3), 1.0),
/// )
/// .unwrap();
/// let timetable = facility.build_timetable();
///
/// let mut sim = RegistrationSimulator::new(&facility, &timetable, SimulationConfig::default()).unwrap();
/// let mut rng = SmallRng::seed_from_u64(1);
/// let report = sim.run(30, &mut rng);
/// assert!(report.average_quality > 0.0);
/// ```
pub struct RegistrationSimulator<'a> {
    facility: &'a Facility,
    timetable: &'a Timetable,
    config: SimulationConfig,
    diagnostics: Diagnostics,
}

impl<'a> RegistrationSimulator<'a> {
    /// Creates a simulator. The timetable's unschedulable sections seed
    /// the diagnostics.
    ///
    /// # Errors
    /// [`crate::Error::InvalidConfig`] if the config cannot be run.
    pub fn new(facility: &'a Facility, timetable: &'a Timetable, config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let diagnostics = Diagnostics {
            unschedulable_sections: timetable.unscheduled().iter().map(ToString::to_string).collect(),
            ..Default::default()
        };
        Ok(Self {
            facility,
            timetable,
            config,
            diagnostics,
        })
    }

    #[inline]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[inline]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Consumes the simulator, returning its diagnostics.
    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// Runs the configured number of trials and averages them.
    pub fn run<R: Rng>(&mut self, population_size: usize, rng: &mut R) -> SimulationReport {
        let trial_averages: Vec<f64> = (0..self.config.trials)
            .map(|_| self.run_trial(population_size, rng).average_quality)
            .collect();
        let average_quality = if trial_averages.is_empty() {
            0.0
        } else {
            trial_averages.iter().sum::<f64>() / trial_averages.len() as f64
        };
        info!(
            "{} trial(s) of {} students: average quality {:.3}",
            trial_averages.len(),
            population_size,
            average_quality
        );
        SimulationReport {
            trial_averages,
            average_quality,
            diagnostics: self.diagnostics.clone(),
        }
    }

    /// Runs one registration pass with a fresh enrollment.
    pub fn run_trial<R: Rng>(&mut self, population_size: usize, rng: &mut R) -> TrialOutcome {
        let mut trial = Trial {
            enrollment: Enrollment::new(self.timetable.sections().len()),
            demand: BTreeMap::new(),
        };

        let mut students = self.init_roster(population_size, rng);
        for student in &mut students {
            self.register_student(student, &mut trial, rng);
        }

        let scores: Vec<f64> = students.iter().filter_map(|s| s.quality).collect();
        let scheduled = scores.len();
        let average_quality = if scheduled == 0 {
            0.0
        } else {
            scores.iter().sum::<f64>() / scheduled as f64
        };
        debug!(
            "trial: {scheduled}/{} students scheduled, average quality {average_quality:.3}",
            students.len()
        );

        TrialOutcome {
            students,
            scheduled,
            average_quality,
            enrollment: trial.enrollment.counts(),
            demand: trial.demand,
        }
    }

    fn init_roster<R: Rng>(&self, population_size: usize, rng: &mut R) -> Vec<EnrollingStudent> {
        let counts = self.facility.population().get_counts(population_size);
        let mut students: Vec<EnrollingStudent> = counts
            .iter()
            .enumerate()
            .flat_map(|(archetype, &n)| std::iter::repeat(archetype).take(n))
            .enumerate()
            .map(|(id, archetype)| EnrollingStudent::new(id, archetype))
            .collect();
        students.shuffle(rng);
        students
    }

    fn register_student<R: Rng>(&mut self, student: &mut EnrollingStudent, trial: &mut Trial, rng: &mut R) {
        let facility = self.facility;
        let timetable = self.timetable;
        let prefs = &facility.population().shares[student.archetype].preferences;
        let mut tracks: Vec<Track> = vec![Vec::new()];
        let mut taken = Vec::new();

        for course in facility.mandatory_courses() {
            taken.push(course.id.clone());
            trial.note_demand(&course.id);

            let lists = timetable.section_lists(course);
            let mut resolver = SectionConflictResolver::new(
                timetable.sections(),
                &trial.enrollment,
                &mut self.diagnostics.collisions,
            );
            match resolver.register(&tracks, &lists) {
                Some(next) => {
                    tracks = next;
                    student.courses.push(course.id.clone());
                    student.credits += course.credits;
                }
                None => {
                    debug!("student {} could not register mandatory {}", student.id, course.id);
                    self.diagnostics.record_mandatory_failure(&course.id);
                }
            }
        }

        let outcome = {
            let enrollment = &trial.enrollment;
            let collisions = &mut self.diagnostics.collisions;
            CreditLoop::new(prefs, &self.config).run(
                student.credits,
                &taken,
                |id| facility.course(id).map(|c| c.credits),
                |id| {
                    let Some(course) = facility.course(id) else {
                        return false;
                    };
                    let lists = timetable.section_lists(course);
                    let mut resolver =
                        SectionConflictResolver::new(timetable.sections(), enrollment, collisions);
                    match resolver.register(&tracks, &lists) {
                        Some(next) => {
                            tracks = next;
                            true
                        }
                        None => false,
                    }
                },
                rng,
            )
        };
        for id in &outcome.attempted {
            trial.note_demand(id);
        }
        if outcome.exhausted {
            self.diagnostics.exhausted_students += 1;
        }
        student.courses.extend(outcome.registered);
        student.credits = outcome.credits;

        self.score_and_capture(student, prefs, &tracks, trial);
    }

    fn score_and_capture(
        &mut self,
        student: &mut EnrollingStudent,
        prefs: &StudentClassPreferences,
        tracks: &[Track],
        trial: &mut Trial,
    ) {
        let timetable = self.timetable;
        let sections = timetable.sections();
        let mut best: Option<(&Track, f64)> = None;
        if !student.courses.is_empty() {
            for track in tracks {
                let meetings = track.iter().flat_map(|id| sections[id.0].meetings.iter());
                let quality = ScheduleQuality::calculate_within(
                    meetings,
                    &student.courses,
                    student.credits,
                    prefs,
                    self.config.day_window(),
                )
                .value();
                match best {
                    Some((_, q)) if q >= quality => {}
                    _ => best = Some((track, quality)),
                }
            }
        }

        let Some((track, quality)) = best else {
            self.diagnostics.unscheduled_students += 1;
            if student.credits < prefs.min_credits {
                warn!(
                    "student {} ({}) is unscheduled with {} of {} required credits",
                    student.id, prefs.archetype, student.credits, prefs.min_credits
                );
            }
            return;
        };

        for &id in track {
            trial.enrollment.enroll(id, student.id);
        }
        student.sections = track.clone();
        student.quality = Some(quality);
        if student.credits < prefs.min_credits {
            self.diagnostics.reduced_credit_students += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AllocationPolicy, Course, Room, StudentPopulation, Usage, UsageRequirement,
    };
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn core(id: &str, room: &str) -> Course {
        Course::new(id, 3).mandatory().with_usage(
            Usage::Classroom,
            UsageRequirement::new(3, AllocationPolicy::GroupsOf2Or3).with_room(room),
        )
    }

    fn elective(id: &str, room: &str) -> Course {
        Course::new(id, 3).with_usage(
            Usage::Classroom,
            UsageRequirement::new(3, AllocationPolicy::GroupsOf2).with_room(room),
        )
    }

    fn one_archetype(min: u32, max: u32, weights: &[(&str, f64)]) -> StudentPopulation {
        let prefs = weights
            .iter()
            .fold(StudentClassPreferences::new("std", min, max), |p, &(c, w)| {
                p.with_weight(c, w)
            });
        StudentPopulation::new().with_archetype(prefs, 1.0)
    }

    #[test]
    fn test_everyone_scheduled_with_expected_quality() {
        let facility = Facility::new(
            vec![Room::new("R1", 40, 9), Room::new("R2", 40, 9)],
            vec![core("M", "R1"), elective("E", "R2")],
            one_archetype(6, 6, &[("E", 1.0)]),
        )
        .unwrap();
        let timetable = facility.build_timetable();
        let mut sim =
            RegistrationSimulator::new(&facility, &timetable, SimulationConfig::default()).unwrap();
        let mut rng = SmallRng::seed_from_u64(11);

        let outcome = sim.run_trial(10, &mut rng);
        assert_eq!(outcome.scheduled, 10);
        assert_eq!(outcome.enrollment, vec![10, 10]);
        assert_eq!(outcome.demand.get("M"), Some(&10));
        assert_eq!(outcome.demand.get("E"), Some(&10));

        // M meets TR 08:00-09:15, E meets MWF 08:00-08:50.
        // factor1 = 0.1 + 1.0, factor2 = 1, factor3 = 1 + 2 * 465 + 3 * 490.
        let expected = 1.1 * 2401.0;
        assert!((outcome.average_quality - expected).abs() < 1e-6);
        for s in &outcome.students {
            assert_eq!(s.credits, 6);
            assert_eq!(s.sections.len(), 2);
        }
        assert!(sim.diagnostics().is_clean());
    }

    #[test]
    fn test_trials_do_not_share_enrollment() {
        let facility = Facility::new(
            vec![Room::new("R1", 40, 9), Room::new("R2", 40, 9)],
            vec![core("M", "R1"), elective("E", "R2")],
            one_archetype(6, 6, &[("E", 1.0)]),
        )
        .unwrap();
        let timetable = facility.build_timetable();
        let config = SimulationConfig::default().with_trials(3);
        let mut sim = RegistrationSimulator::new(&facility, &timetable, config).unwrap();
        let mut rng = SmallRng::seed_from_u64(2);

        let first = sim.run_trial(30, &mut rng);
        let second = sim.run_trial(30, &mut rng);
        assert_eq!(first.enrollment, vec![30, 30]);
        assert_eq!(second.enrollment, vec![30, 30]);

        let report = sim.run(30, &mut rng);
        assert_eq!(report.trial_averages.len(), 3);
        let spread = report
            .trial_averages
            .iter()
            .map(|q| (q - report.average_quality).abs())
            .fold(0.0, f64::max);
        assert!(spread < 1e-9);
    }

    #[test]
    fn test_full_mandatory_course_leaves_students_unscheduled() {
        let mut course = core("M", "R1");
        course.usages[Usage::Classroom.index()] = Some(
            UsageRequirement::new(3, AllocationPolicy::GroupsOf2Or3)
                .with_room("R1")
                .with_seat_cap(5),
        );
        let facility = Facility::new(
            vec![Room::new("R1", 40, 9)],
            vec![course],
            one_archetype(3, 3, &[]),
        )
        .unwrap();
        let timetable = facility.build_timetable();
        let mut sim =
            RegistrationSimulator::new(&facility, &timetable, SimulationConfig::default()).unwrap();
        let mut rng = SmallRng::seed_from_u64(4);

        let outcome = sim.run_trial(8, &mut rng);
        assert_eq!(outcome.scheduled, 5);
        assert_eq!(outcome.enrollment, vec![5]);
        assert_eq!(outcome.students.iter().filter(|s| !s.is_scheduled()).count(), 3);

        let diag = sim.diagnostics();
        assert_eq!(diag.mandatory_failures.get("M"), Some(&3));
        assert_eq!(diag.unscheduled_students, 3);
        assert_eq!(diag.exhausted_students, 0);
    }

    #[test]
    fn test_clashing_mandatory_courses() {
        // Both cores land on TR 08:00 in their own rooms.
        let facility = Facility::new(
            vec![Room::new("R1", 40, 9), Room::new("R2", 40, 9)],
            vec![core("M1", "R1"), core("M2", "R2")],
            one_archetype(6, 6, &[]),
        )
        .unwrap();
        let timetable = facility.build_timetable();
        let mut sim =
            RegistrationSimulator::new(&facility, &timetable, SimulationConfig::default()).unwrap();
        let mut rng = SmallRng::seed_from_u64(8);

        let outcome = sim.run_trial(4, &mut rng);
        assert_eq!(outcome.scheduled, 4);
        assert!(outcome.students.iter().all(|s| s.credits == 3));

        let diag = sim.diagnostics();
        assert_eq!(diag.mandatory_failures.get("M2"), Some(&4));
        assert_eq!(diag.reduced_credit_students, 4);
        assert_eq!(diag.collisions.top(1)[0].2, 4);
    }

    #[test]
    fn test_unschedulable_sections_reported() {
        let facility = Facility::new(
            vec![Room::new("R1", 40, 1)],
            vec![Course::new("LONG", 3).mandatory().with_usage(
                Usage::Classroom,
                UsageRequirement::new(1, AllocationPolicy::GroupsOf2)
                    .with_room("R1")
                    .with_sections(6),
            )],
            one_archetype(3, 3, &[]),
        )
        .unwrap();
        let timetable = facility.build_timetable();
        let sim =
            RegistrationSimulator::new(&facility, &timetable, SimulationConfig::default()).unwrap();
        assert_eq!(sim.diagnostics().unschedulable_sections.len(), 1);

        let diag = sim.into_diagnostics();
        assert!(!diag.is_clean());
        assert!(diag.unschedulable_sections[0].starts_with("LONG CLASSROOM section 6"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let facility = Facility::new(
            vec![Room::new("R1", 40, 9)],
            vec![core("M", "R1")],
            one_archetype(3, 3, &[]),
        )
        .unwrap();
        let timetable = facility.build_timetable();
        let config = SimulationConfig::default().with_trials(0);
        assert!(RegistrationSimulator::new(&facility, &timetable, config).is_err());
    }
}
