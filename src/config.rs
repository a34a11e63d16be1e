//! Simulation settings.
//!
//! Every knob the simulator and the capacity search read, with the
//! defaults the registrar model was tuned on. Drivers may deserialize it
//! from JSON; missing fields fall back to their defaults.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{DAY_END_MINUTES, DAY_START_MINUTES};

/// Simulation and capacity-search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Registration trials averaged per quality estimate.
    pub trials: usize,
    /// Elective draws per student before giving up.
    pub max_draw_attempts: u32,
    /// Consecutive failed elective draws that end the search.
    pub max_consecutive_failures: u32,
    /// Campus day opening (minutes since midnight).
    pub day_start: u32,
    /// Campus day closing (minutes since midnight).
    pub day_end: u32,
    /// Largest population the capacity search will probe.
    pub max_population: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trials: 10,
            max_draw_attempts: 1000,
            max_consecutive_failures: 100,
            day_start: DAY_START_MINUTES,
            day_end: DAY_END_MINUTES,
            max_population: 10_000,
        }
    }
}

impl SimulationConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of trials.
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    /// Sets the elective draw limits.
    pub fn with_draw_limits(mut self, max_attempts: u32, max_consecutive_failures: u32) -> Self {
        self.max_draw_attempts = max_attempts;
        self.max_consecutive_failures = max_consecutive_failures;
        self
    }

    /// Sets the campus day window.
    pub fn with_day_window(mut self, start: u32, end: u32) -> Self {
        self.day_start = start;
        self.day_end = end;
        self
    }

    /// Sets the capacity-search ceiling.
    pub fn with_max_population(mut self, max_population: usize) -> Self {
        self.max_population = max_population;
        self
    }

    /// Campus day window as `(start, end)`.
    #[inline]
    pub fn day_window(&self) -> (u32, u32) {
        (self.day_start, self.day_end)
    }

    /// Rejects settings the simulator cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            return Err(Error::InvalidConfig("trials must be at least 1".into()));
        }
        if self.max_consecutive_failures == 0 {
            return Err(Error::InvalidConfig(
                "max_consecutive_failures must be at least 1".into(),
            ));
        }
        if self.day_start >= self.day_end {
            return Err(Error::InvalidConfig(format!(
                "day window {}..{} is empty",
                self.day_start, self.day_end
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::default();
        assert_eq!(config.trials, 10);
        assert_eq!(config.max_draw_attempts, 1000);
        assert_eq!(config.max_consecutive_failures, 100);
        assert_eq!(config.day_window(), (480, 1020));
        assert_eq!(config.max_population, 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{ "trials": 3, "day_end": 960 }"#).unwrap();
        assert_eq!(config.trials, 3);
        assert_eq!(config.day_window(), (480, 960));
        assert_eq!(config.max_draw_attempts, 1000);

        let json = serde_json::to_string(&config).unwrap();
        let back: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        assert!(SimulationConfig::new().with_trials(0).validate().is_err());
        assert!(SimulationConfig::new()
            .with_draw_limits(1000, 0)
            .validate()
            .is_err());
        let err = SimulationConfig::new()
            .with_day_window(600, 600)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("day window"));
    }
}
