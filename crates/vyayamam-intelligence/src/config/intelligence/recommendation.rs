// ABOUTME: Progressive overload configuration for next-set recommendations
// ABOUTME: Configures the increase percentage, plate rounding, and fallback rep target
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Overload Configuration
//!
//! Controls how much the recommendation engine adds after a target is met
//! and how suggestions are rounded to loads a lifter can actually set up.

use super::ConfigError;
use serde::{Deserialize, Serialize};

/// Progressive overload policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverloadConfig {
    /// Fractional weight increase after a met target (0.025 = 2.5%)
    pub increase_percent: f64,
    /// Smallest practical load step; suggestions round to a multiple of it
    pub weight_increment: f64,
    /// Rep target used when an exercise has no numeric plan prescription
    pub default_rep_target: u32,
    /// Reps added per step for bodyweight exercises
    pub bodyweight_rep_step: u32,
}

impl Default for OverloadConfig {
    fn default() -> Self {
        Self {
            increase_percent: 0.025,
            weight_increment: 2.5,
            default_rep_target: 8,
            bodyweight_rep_step: 1,
        }
    }
}

impl OverloadConfig {
    /// Check internal consistency
    ///
    /// # Errors
    ///
    /// Returns an error when a value is outside its usable range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.increase_percent > 0.0 && self.increase_percent <= 0.25) {
            return Err(ConfigError::InvalidRange(
                "increase_percent must be in (0, 0.25]",
            ));
        }
        if !(self.weight_increment > 0.0 && self.weight_increment.is_finite()) {
            return Err(ConfigError::InvalidRange("weight_increment must be > 0"));
        }
        if self.default_rep_target == 0 {
            return Err(ConfigError::InvalidRange("default_rep_target must be >= 1"));
        }
        if self.bodyweight_rep_step == 0 {
            return Err(ConfigError::InvalidRange(
                "bodyweight_rep_step must be >= 1",
            ));
        }
        Ok(())
    }
}
