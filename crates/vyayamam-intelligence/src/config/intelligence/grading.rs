// ABOUTME: Session grading threshold table and rolling-average window
// ABOUTME: Ordered best-first; the first row whose minimums are met assigns the grade
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::ConfigError;
use serde::{Deserialize, Serialize};
use vyayamam_core::models::Grade;

/// One row of the grading table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeThreshold {
    /// Grade awarded when both minimums are met
    pub grade: Grade,
    /// Minimum fraction of planned exercises with at least one set
    pub min_coverage: f64,
    /// Minimum ratio of session volume to the rolling average
    pub min_volume_ratio: f64,
}

impl GradeThreshold {
    const fn new(grade: Grade, min_coverage: f64, min_volume_ratio: f64) -> Self {
        Self {
            grade,
            min_coverage,
            min_volume_ratio,
        }
    }
}

/// Session grading configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingConfig {
    /// Prior closed sessions of the same day type averaged for the volume signal
    pub history_sessions: usize,
    /// Rows ordered best grade first; anything below the last row is F
    pub thresholds: Vec<GradeThreshold>,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            history_sessions: 4,
            thresholds: vec![
                GradeThreshold::new(Grade::APlus, 1.0, 1.05),
                GradeThreshold::new(Grade::A, 1.0, 0.95),
                GradeThreshold::new(Grade::B, 0.75, 0.85),
                GradeThreshold::new(Grade::C, 0.5, 0.7),
                GradeThreshold::new(Grade::D, 0.25, 0.5),
            ],
        }
    }
}

impl GradingConfig {
    /// Check internal consistency
    ///
    /// # Errors
    ///
    /// Returns an error if the table is empty, unordered, or holds out-of-range values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_sessions == 0 {
            return Err(ConfigError::InvalidRange("history_sessions must be >= 1"));
        }
        if self.thresholds.is_empty() {
            return Err(ConfigError::InvalidTable("at least one row is required"));
        }
        for row in &self.thresholds {
            if !(0.0..=1.0).contains(&row.min_coverage) {
                return Err(ConfigError::InvalidRange("min_coverage must be in [0, 1]"));
            }
            if !(row.min_volume_ratio >= 0.0 && row.min_volume_ratio.is_finite()) {
                return Err(ConfigError::InvalidRange("min_volume_ratio must be >= 0"));
            }
        }
        for pair in self.thresholds.windows(2) {
            if pair[0].grade >= pair[1].grade {
                return Err(ConfigError::InvalidTable("rows must be ordered best grade first"));
            }
            if pair[0].min_coverage < pair[1].min_coverage
                || pair[0].min_volume_ratio < pair[1].min_volume_ratio
            {
                return Err(ConfigError::InvalidTable(
                    "a better grade cannot have lower minimums than a worse one",
                ));
            }
        }
        Ok(())
    }
}
