//! Student schedule quality.
//!
//! Scores one student's weekly schedule. Higher is better.
//!
//! # Metrics
//!
//! | Factor | Definition |
//! |--------|-----------|
//! | Preference | 0.1 + Σ preference weight of the scheduled courses, halved below the credit minimum |
//! | Free days | 1 + weekdays with no meeting at all |
//! | Off-campus time | 1 + Σ over meeting days of (first start − day start) + (day end − last end) |
//!
//! `quality = preference × free days × off-campus time`. Gaps before the
//! window opens or after it closes clamp at zero minutes, so the last two
//! factors are always ≥ 1.

use serde::Serialize;

use crate::models::{
    MeetingTime, StudentClassPreferences, DAY_END_MINUTES, DAY_START_MINUTES, WEEKDAY_COUNT,
};

/// Factor breakdown of one schedule's quality.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScheduleQuality {
    /// Preference factor.
    pub preference: f64,
    /// Free-day factor (≥ 1).
    pub free_days: f64,
    /// Off-campus-minutes factor (≥ 1).
    pub off_campus: f64,
}

impl ScheduleQuality {
    /// Scores a schedule against the default 08:00–17:00 window.
    ///
    /// # Arguments
    /// * `meetings` - Every meeting of the chosen sections.
    /// * `courses` - Registered course IDs.
    /// * `credits` - Total registered credits.
    /// * `prefs` - The student's archetype.
    pub fn calculate<'m>(
        meetings: impl IntoIterator<Item = &'m MeetingTime>,
        courses: &[String],
        credits: u32,
        prefs: &StudentClassPreferences,
    ) -> Self {
        Self::calculate_within(
            meetings,
            courses,
            credits,
            prefs,
            (DAY_START_MINUTES, DAY_END_MINUTES),
        )
    }

    /// Scores a schedule against a custom campus day window.
    pub fn calculate_within<'m>(
        meetings: impl IntoIterator<Item = &'m MeetingTime>,
        courses: &[String],
        credits: u32,
        prefs: &StudentClassPreferences,
        window: (u32, u32),
    ) -> Self {
        let mut preference = 0.1 + courses.iter().map(|c| prefs.weight(c)).sum::<f64>();
        if credits < prefs.min_credits {
            preference *= 0.5;
        }

        // (first start, last end) per weekday.
        let mut spans: [Option<(u32, u32)>; WEEKDAY_COUNT] = [None; WEEKDAY_COUNT];
        for m in meetings {
            for day in m.days.iter() {
                let span = &mut spans[day.index()];
                *span = Some(match *span {
                    Some((first, last)) => (first.min(m.start), last.max(m.end)),
                    None => (m.start, m.end),
                });
            }
        }

        let (open, close) = window;
        let mut free_days = 0u32;
        let mut off_minutes = 0u64;
        for span in spans {
            match span {
                None => free_days += 1,
                Some((first, last)) => {
                    off_minutes += first.saturating_sub(open) as u64;
                    off_minutes += close.saturating_sub(last) as u64;
                }
            }
        }

        Self {
            preference,
            free_days: 1.0 + free_days as f64,
            off_campus: 1.0 + off_minutes as f64,
        }
    }

    /// Product of the three factors.
    #[inline]
    pub fn value(&self) -> f64 {
        self.preference * self.free_days * self.off_campus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{hm, WeekdaySet};

    fn prefs() -> StudentClassPreferences {
        StudentClassPreferences::new("eng", 6, 12)
            .with_weight("A", 0.5)
            .with_weight("B", 0.2)
    }

    fn at(days: &str, start: u32, end: u32) -> MeetingTime {
        MeetingTime::new(WeekdaySet::parse(days).unwrap(), start, end)
    }

    #[test]
    fn test_quality_factors() {
        let meetings = [at("MWF", hm(9, 0), hm(9, 50)), at("M", hm(13, 0), hm(14, 15))];
        let courses = vec!["A".to_string(), "B".to_string()];
        let q = ScheduleQuality::calculate(&meetings, &courses, 6, &prefs());

        assert!((q.preference - 0.8).abs() < 1e-9);
        // Tue and Thu are free.
        assert!((q.free_days - 3.0).abs() < 1e-9);
        // Mon: 60 + 165, Wed and Fri: 60 + 430 each.
        assert!((q.off_campus - (1.0 + 225.0 + 980.0)).abs() < 1e-9);
        assert!((q.value() - 0.8 * 3.0 * 1206.0).abs() < 1e-6);
    }

    #[test]
    fn test_quality_reduced_credits_halve_preference() {
        let meetings = [at("TR", hm(8, 0), hm(9, 15))];
        let courses = vec!["A".to_string()];
        let full = ScheduleQuality::calculate(&meetings, &courses, 6, &prefs());
        let reduced = ScheduleQuality::calculate(&meetings, &courses, 3, &prefs());
        assert!((reduced.preference - full.preference * 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_quality_factors_at_least_one() {
        // Every day runs past both ends of the window.
        let meetings = [at("MTWRF", hm(7, 0), hm(18, 0))];
        let q = ScheduleQuality::calculate(&meetings, &[], 0, &prefs());
        assert!((q.free_days - 1.0).abs() < 1e-9);
        assert!((q.off_campus - 1.0).abs() < 1e-9);

        let q = ScheduleQuality::calculate(std::iter::empty(), &[], 0, &prefs());
        assert!((q.free_days - 6.0).abs() < 1e-9);
        assert!((q.off_campus - 1.0).abs() < 1e-9);
        assert!((q.preference - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_quality_custom_window() {
        let meetings = [at("R", hm(10, 0), hm(11, 0))];
        let q = ScheduleQuality::calculate_within(
            &meetings,
            &[],
            6,
            &prefs(),
            (hm(9, 0), hm(12, 0)),
        );
        assert!((q.off_campus - 121.0).abs() < 1e-9);
    }
}
