//! Facility capacity search.
//!
//! # Algorithm
//!
//! Starting from one student, run a single registration pass (the
//! *capacity probe*) and compare, for every course usage, the seats on
//! offer with the students who asked for the course:
//!
//! ```text
//! hours remaining = (seats supplied − students demanding) × contact hours
//! ```
//!
//! Any negative balance makes the population infeasible. The population
//! grows by one until that happens; the answer is the last feasible size.
//! The scan is linear and stops at the configured ceiling.

use log::{info, warn};
use rand::Rng;
use serde::Serialize;

use super::RegistrationSimulator;
use crate::config::SimulationConfig;
use crate::error::Result;
use crate::models::Usage;
use crate::scheduler::{Facility, Timetable};

/// Seat balance of one course usage after a probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageBalance {
    pub course_id: String,
    pub usage: Usage,
    /// Seats across every section of the usage.
    pub seats_supplied: u32,
    /// Students who attempted the course.
    pub seats_demanded: usize,
    /// `(supplied − demanded) × contact hours`.
    pub hours_remaining: i64,
}

/// Outcome of one capacity probe.
#[derive(Debug, Clone, Serialize)]
pub struct CapacityProbe {
    pub population: usize,
    pub balances: Vec<UsageBalance>,
}

impl CapacityProbe {
    /// Whether every usage kept a non-negative balance.
    pub fn is_feasible(&self) -> bool {
        self.balances.iter().all(|b| b.hours_remaining >= 0)
    }

    /// The usage with the smallest balance (the first one on ties).
    pub fn limiting(&self) -> Option<&UsageBalance> {
        self.balances
            .iter()
            .reduce(|best, b| if b.hours_remaining < best.hours_remaining { b } else { best })
    }
}

/// Result of a capacity search.
#[derive(Debug, Clone, Serialize)]
pub struct CapacityReport {
    /// Largest population every probe up to which was feasible.
    pub max_population: usize,
    /// Probes run.
    pub probes: usize,
    /// Balance that first went negative, if the search found a limit.
    pub limiting: Option<UsageBalance>,
    /// Whether the search stopped at the population ceiling instead.
    pub hit_ceiling: bool,
}

/// Linear search for the largest population a timetable can serve.
///
/// # Example
///
/// ```
/// use rand::rngs::SmallRng;
/// use rand::SeedableRng;
/// use u_facility::config::SimulationConfig;
/// use u_facility::models::*;
/// use u_facility::registration::CapacitySearch;
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
/// let mut search = CapacitySearch::new(&facility, &timetable, SimulationConfig::default()).unwrap();
/// let report = search.search(&mut SmallRng::seed_from_u64(5));
/// assert_eq!(report.max_population, 40);
/// ```
pub struct CapacitySearch<'a> {
    facility: &'a Facility,
    timetable: &'a Timetable,
    simulator: RegistrationSimulator<'a>,
}

impl<'a> CapacitySearch<'a> {
    /// Creates a search over a built timetable.
    pub fn new(facility: &'a Facility, timetable: &'a Timetable, config: SimulationConfig) -> Result<Self> {
        Ok(Self {
            facility,
            timetable,
            simulator: RegistrationSimulator::new(facility, timetable, config)?,
        })
    }

    /// The simulator driving the probes, with its diagnostics.
    #[inline]
    pub fn simulator(&self) -> &RegistrationSimulator<'a> {
        &self.simulator
    }

    /// Runs one registration pass at `population` students and balances
    /// supply against demand.
    pub fn probe<R: Rng>(&mut self, population: usize, rng: &mut R) -> CapacityProbe {
        let outcome = self.simulator.run_trial(population, rng);

        let mut balances = Vec::new();
        for course in self.facility.courses() {
            let demanded = outcome.demand.get(&course.id).copied().unwrap_or(0);
            for (usage, req) in course.declared_usages() {
                let supplied = self.timetable.seats_for(&course.id, usage);
                balances.push(UsageBalance {
                    course_id: course.id.clone(),
                    usage,
                    seats_supplied: supplied,
                    seats_demanded: demanded,
                    hours_remaining: (supplied as i64 - demanded as i64) * req.contact_hours as i64,
                });
            }
        }

        CapacityProbe {
            population,
            balances,
        }
    }

    /// Grows the population from one until a probe turns infeasible.
    pub fn search<R: Rng>(&mut self, rng: &mut R) -> CapacityReport {
        let ceiling = self.simulator.config().max_population.max(1);
        let mut population = 1;
        loop {
            let probe = self.probe(population, rng);
            if !probe.is_feasible() {
                let limiting = probe.limiting().cloned();
                if let Some(b) = &limiting {
                    info!(
                        "capacity {}: {} {} short by {} hour(s) at {} students",
                        population - 1,
                        b.course_id,
                        b.usage,
                        -b.hours_remaining,
                        population
                    );
                }
                return CapacityReport {
                    max_population: population - 1,
                    probes: population,
                    limiting,
                    hit_ceiling: false,
                };
            }
            if population >= ceiling {
                warn!("capacity search stopped at the ceiling of {ceiling} students");
                return CapacityReport {
                    max_population: population,
                    probes: population,
                    limiting: None,
                    hit_ceiling: true,
                };
            }
            population += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AllocationPolicy, Course, Room, StudentClassPreferences, StudentPopulation, UsageRequirement};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn core_course() -> Course {
        Course::new("CORE", 3).mandatory().with_usage(
            Usage::Classroom,
            UsageRequirement::new(3, AllocationPolicy::GroupsOf2Or3).with_room("R1"),
        )
    }

    #[test]
    fn test_single_room_capacity() {
        let facility = Facility::new(
            vec![Room::new("R1", 40, 9)],
            vec![core_course()],
            StudentPopulation::new()
                .with_archetype(StudentClassPreferences::new("any", 3, 3), 1.0),
        )
        .unwrap();
        let timetable = facility.build_timetable();
        let mut search =
            CapacitySearch::new(&facility, &timetable, SimulationConfig::default()).unwrap();
        let mut rng = SmallRng::seed_from_u64(40);

        let report = search.search(&mut rng);
        assert_eq!(report.max_population, 40);
        assert_eq!(report.probes, 41);
        assert!(!report.hit_ceiling);
        let limiting = report.limiting.unwrap();
        assert_eq!(limiting.course_id, "CORE");
        assert_eq!(limiting.hours_remaining, -3);
    }

    #[test]
    fn test_probe_balances() {
        let facility = Facility::new(
            vec![Room::new("R1", 40, 9)],
            vec![core_course()],
            StudentPopulation::new()
                .with_archetype(StudentClassPreferences::new("any", 3, 3), 1.0),
        )
        .unwrap();
        let timetable = facility.build_timetable();
        let mut search =
            CapacitySearch::new(&facility, &timetable, SimulationConfig::default()).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);

        let probe = search.probe(25, &mut rng);
        assert!(probe.is_feasible());
        assert_eq!(probe.balances.len(), 1);
        assert_eq!(probe.balances[0].seats_supplied, 40);
        assert_eq!(probe.balances[0].seats_demanded, 25);
        assert_eq!(probe.balances[0].hours_remaining, 45);
    }

    #[test]
    fn test_elective_limits_capacity() {
        // Everyone needs the 25-seat elective to reach six credits.
        let facility = Facility::new(
            vec![Room::new("R1", 40, 9), Room::new("R2", 25, 9)],
            vec![
                core_course(),
                Course::new("ELEC", 3).with_usage(
                    Usage::Classroom,
                    UsageRequirement::new(3, AllocationPolicy::GroupsOf2).with_room("R2"),
                ),
            ],
            StudentPopulation::new().with_archetype(
                StudentClassPreferences::new("any", 6, 6).with_weight("ELEC", 1.0),
                1.0,
            ),
        )
        .unwrap();
        let timetable = facility.build_timetable();
        let mut search =
            CapacitySearch::new(&facility, &timetable, SimulationConfig::default()).unwrap();
        let mut rng = SmallRng::seed_from_u64(9);

        let report = search.search(&mut rng);
        assert_eq!(report.max_population, 25);
        assert_eq!(report.limiting.unwrap().course_id, "ELEC");
        assert!(search.simulator().diagnostics().exhausted_students > 0);
    }

    #[test]
    fn test_ceiling_stops_search() {
        let facility = Facility::new(
            vec![Room::new("R1", 40, 9)],
            vec![core_course()],
            StudentPopulation::new()
                .with_archetype(StudentClassPreferences::new("any", 3, 3), 1.0),
        )
        .unwrap();
        let timetable = facility.build_timetable();
        let config = SimulationConfig::default().with_max_population(10);
        let mut search = CapacitySearch::new(&facility, &timetable, config).unwrap();

        let report = search.search(&mut SmallRng::seed_from_u64(3));
        assert!(report.hit_ceiling);
        assert_eq!(report.max_population, 10);
        assert!(report.limiting.is_none());
    }
}
