//! Timetable construction and schedule quality.

mod facility;
mod kpi;
mod timetable;

pub use facility::Facility;
pub use kpi::ScheduleQuality;
pub use timetable::{Timetable, TimetableBuilder, UnscheduledSection};
