// ABOUTME: Intelligence configuration container with validation and environment overrides
// ABOUTME: Groups the overload policy and the grading table into one tunable unit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Intelligence configuration
//!
//! Every tunable number used by the recommendation engine and the session
//! grader lives here rather than in the engines, so tests can pin it and
//! deployments can override it from the environment.

/// Configuration error types
pub mod error;
/// Session grading table
pub mod grading;
/// Progressive overload policy
pub mod recommendation;

pub use error::ConfigError;
pub use grading::{GradeThreshold, GradingConfig};
pub use recommendation::OverloadConfig;

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Main intelligence configuration container
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntelligenceConfig {
    /// Progressive overload policy
    pub overload: OverloadConfig,
    /// Session grading table
    pub grading: GradingConfig,
}

impl IntelligenceConfig {
    /// Load defaults, apply environment overrides, and validate
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values or validation fails
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::default().apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.overload.validate()?;
        self.grading.validate()
    }

    /// Helper function to parse and apply an environment variable override
    fn apply_env_var<T: FromStr>(env_var_name: &str, target: &mut T) -> Result<(), ConfigError> {
        if let Ok(val) = env::var(env_var_name) {
            *target = val
                .trim()
                .parse()
                .map_err(|_| ConfigError::Parse(format!("Invalid {env_var_name}")))?;
        }
        Ok(())
    }

    fn apply_env_overrides(mut self) -> Result<Self, ConfigError> {
        Self::apply_env_var(
            "VYAYAMAM_OVERLOAD_PERCENT",
            &mut self.overload.increase_percent,
        )?;
        Self::apply_env_var(
            "VYAYAMAM_WEIGHT_INCREMENT",
            &mut self.overload.weight_increment,
        )?;
        Self::apply_env_var(
            "VYAYAMAM_DEFAULT_REP_TARGET",
            &mut self.overload.default_rep_target,
        )?;
        Self::apply_env_var(
            "VYAYAMAM_GRADE_HISTORY_SESSIONS",
            &mut self.grading.history_sessions,
        )?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use vyayamam_core::models::Grade;

    #[test]
    fn test_defaults_validate() {
        assert!(IntelligenceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_unordered_table_rejected() {
        let mut config = IntelligenceConfig::default();
        config.grading.thresholds.swap(0, 1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTable(_))
        ));
    }

    #[test]
    fn test_inverted_minimums_rejected() {
        let mut config = IntelligenceConfig::default();
        config.grading.thresholds[1].min_volume_ratio = 2.0;
        assert!(config.validate().is_err());
        config = IntelligenceConfig::default();
        config.grading.thresholds.retain(|row| row.grade != Grade::B);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_env_overrides_applied() {
        env::set_var("VYAYAMAM_OVERLOAD_PERCENT", "0.05");
        env::set_var("VYAYAMAM_GRADE_HISTORY_SESSIONS", "6");
        let config = IntelligenceConfig::load();
        env::remove_var("VYAYAMAM_OVERLOAD_PERCENT");
        env::remove_var("VYAYAMAM_GRADE_HISTORY_SESSIONS");
        let config = config.unwrap();
        assert!((config.overload.increase_percent - 0.05).abs() < f64::EPSILON);
        assert_eq!(config.grading.history_sessions, 6);
    }

    #[test]
    #[serial]
    fn test_env_parse_failure_reported() {
        env::set_var("VYAYAMAM_WEIGHT_INCREMENT", "two");
        let result = IntelligenceConfig::load();
        env::remove_var("VYAYAMAM_WEIGHT_INCREMENT");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
