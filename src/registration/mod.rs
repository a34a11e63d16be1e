//! Student registration simulation.
//!
//! Registers a simulated student population into a built timetable,
//! scores the resulting schedules and searches for the largest
//! population the timetable can serve.
//!
//! # Components
//!
//! | Type | Role |
//! |------|------|
//! | `SectionConflictResolver` | Extends conflict-free section tracks |
//! | `CreditLoop` | Draws electives until the credit target is met |
//! | `RegistrationSimulator` | Runs trials and averages schedule quality |
//! | `CapacitySearch` | Linear scan for the last feasible population |
//!
//! Randomness is always passed in. [`clock_seeded_rng`] is a convenience
//! for drivers that do not need reproducible runs.

mod capacity;
mod credits;
mod diagnostics;
mod enrollment;
mod resolver;
mod simulator;

pub use capacity::{CapacityProbe, CapacityReport, CapacitySearch, UsageBalance};
pub use credits::{wants_to_stop, CreditLoop, CreditOutcome};
pub use diagnostics::Diagnostics;
pub use enrollment::Enrollment;
pub use resolver::{CollisionLog, SectionConflictResolver, Track};
pub use simulator::{RegistrationSimulator, SimulationReport, TrialOutcome};

use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::sync::OnceLock;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// A generator seeded once from the wall clock and a monotonic clock.
///
/// Two calls in quick succession still get different seeds, because the
/// monotonic part keeps advancing even when the wall clock does not.
pub fn clock_seeded_rng() -> SmallRng {
    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    let origin = *ORIGIN.get_or_init(Instant::now);

    let wall = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let mono = origin.elapsed().as_nanos() as u64;
    SmallRng::seed_from_u64(wall ^ mono.rotate_left(32))
}
