//! Facility capacity simulation for the U-Engine ecosystem.
//!
//! Answers two questions about a set of rooms and a course catalog: how
//! many students can the facility serve, and how good are the weekly
//! schedules those students end up with.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Room`, `Course`, `UsageRequirement`,
//!   `OfferedSection`, `StudentClassPreferences`, `MeetingTime`
//! - **`grid`**: Per-room weekly block grids and the block allocation policies
//! - **`scheduler`**: Validated `Facility`, greedy timetable builder and the
//!   schedule quality KPI
//! - **`registration`**: Conflict resolution, credit accumulation, the
//!   registration simulator and the capacity search
//! - **`validation`**: Catalog integrity checks
//! - **`config`**: Simulation settings
//!
//! # Pipeline
//!
//! ```text
//! Facility::new ─▶ build_timetable ─▶ RegistrationSimulator::run ─▶ average quality
//!                                   └▶ CapacitySearch::search    ─▶ max population
//! ```
//!
//! The crate logs through the `log` facade and never installs a logger.
//!
//! # References
//!
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"
//! - Schaerf (1999), "A Survey of Automated Timetabling"

pub mod config;
pub mod error;
pub mod grid;
pub mod models;
pub mod registration;
pub mod scheduler;
pub mod validation;

pub use error::{Error, Result};
