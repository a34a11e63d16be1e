//! Facility and registration domain models.
//!
//! Plain data types describing the catalog handed to the allocator and
//! the simulator: rooms, courses with per-usage room requirements,
//! offered sections, student archetypes and the weekly time grid.
//!
//! # Domain Mappings
//!
//! | u-facility | Registrar term | Allocator view |
//! |------------|----------------|----------------|
//! | Room | Classroom / Lab | Weekly block grid |
//! | Course | Catalog course | Block requests per usage |
//! | OfferedSection | Section / CRN | Placed assignment |
//! | StudentClassPreferences | Student profile | Weighted demand |

mod course;
mod preference;
mod room;
mod section;
mod student;
mod time;

pub use course::{AllocationPolicy, Course, Usage, UsageRequirement};
pub use preference::{ArchetypeShare, StudentClassPreferences, StudentPopulation};
pub use room::{BlockedPeriod, Room};
pub use section::{OfferedSection, SectionId};
pub use student::EnrollingStudent;
pub use time::{
    hm, MeetingTime, Weekday, WeekdaySet, BLOCK_MINUTES, BLOCK_PITCH_MINUTES, DAY_END_MINUTES,
    DAY_START_MINUTES, WEEKDAY_COUNT,
};
