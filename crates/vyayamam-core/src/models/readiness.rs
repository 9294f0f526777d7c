// ABOUTME: Daily readiness log holding subjective sleep, stress, and soreness scores
// ABOUTME: One record per user per date; a later log for the same date overwrites it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::UserId;
use crate::constants::limits;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the readiness scores a user can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessMetric {
    /// Hours slept
    Sleep,
    /// Stress, 1-10
    Stress,
    /// Muscle soreness, 1-10
    Soreness,
}

impl ReadinessMetric {
    /// Command keyword (`/sleep`, `/stress`, `/soreness`)
    #[must_use]
    pub const fn command(&self) -> &'static str {
        match self {
            Self::Sleep => "sleep",
            Self::Stress => "stress",
            Self::Soreness => "soreness",
        }
    }

    /// Inclusive accepted range
    #[must_use]
    pub const fn valid_range(&self) -> (f64, f64) {
        match self {
            Self::Sleep => (0.0, limits::SLEEP_HOURS_MAX),
            Self::Stress | Self::Soreness => (limits::SCORE_MIN, limits::SCORE_MAX),
        }
    }

    /// Whether a value is acceptable for this metric
    #[must_use]
    pub fn accepts(&self, value: f64) -> bool {
        let (low, high) = self.valid_range();
        value.is_finite() && value >= low && value <= high
    }

    /// Unit suffix for display
    #[must_use]
    pub const fn unit(&self) -> &'static str {
        match self {
            Self::Sleep => "h",
            Self::Stress | Self::Soreness => "/10",
        }
    }
}

impl fmt::Display for ReadinessMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}

/// A user's readiness for one calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessLog {
    /// Owner
    pub user_id: UserId,
    /// Local calendar date the scores apply to
    pub date: NaiveDate,
    /// Hours slept
    #[serde(default)]
    pub sleep: Option<f64>,
    /// Stress score
    #[serde(default)]
    pub stress: Option<f64>,
    /// Soreness score
    #[serde(default)]
    pub soreness: Option<f64>,
    /// Last write
    pub updated_at: DateTime<Utc>,
}

impl ReadinessLog {
    /// Create an empty log for a date
    #[must_use]
    pub const fn new(user_id: UserId, date: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            date,
            sleep: None,
            stress: None,
            soreness: None,
            updated_at: now,
        }
    }

    /// Copy of this log with one metric replaced
    #[must_use]
    pub fn with_metric(mut self, metric: ReadinessMetric, value: f64, now: DateTime<Utc>) -> Self {
        match metric {
            ReadinessMetric::Sleep => self.sleep = Some(value),
            ReadinessMetric::Stress => self.stress = Some(value),
            ReadinessMetric::Soreness => self.soreness = Some(value),
        }
        self.updated_at = now;
        self
    }

    /// Read one metric
    #[must_use]
    pub const fn get(&self, metric: ReadinessMetric) -> Option<f64> {
        match metric {
            ReadinessMetric::Sleep => self.sleep,
            ReadinessMetric::Stress => self.stress,
            ReadinessMetric::Soreness => self.soreness,
        }
    }
}
