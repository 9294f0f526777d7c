// ABOUTME: Session grader scoring a closed session against plan coverage and volume history
// ABOUTME: Combines both signals through the configured threshold table into a letter grade
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::config::intelligence::GradingConfig;
use crate::metrics::total_volume;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;
use vyayamam_core::models::{Grade, PlannedExercise, SetEntry};

/// Grade plus the signals that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeReport {
    /// Assigned grade
    pub grade: Grade,
    /// Fraction of planned exercises with at least one set (1.0 for an empty plan)
    pub coverage: f64,
    /// Planned exercises with at least one set
    pub covered_exercises: usize,
    /// Planned exercises for the day
    pub planned_exercises: usize,
    /// Sets logged in the session
    pub total_sets: usize,
    /// Volume of the session
    pub total_volume: f64,
    /// Mean volume of prior sessions of the same day type, if any
    pub rolling_average: Option<f64>,
    /// Session volume divided by the rolling average (1.0 without history)
    pub volume_ratio: f64,
}

/// Session grader
#[derive(Debug, Clone, Default)]
pub struct SessionGrader {
    config: GradingConfig,
}

impl SessionGrader {
    /// Create a grader with the given table
    #[must_use]
    pub const fn new(config: GradingConfig) -> Self {
        Self { config }
    }

    /// Number of prior sessions the rolling average looks at
    #[must_use]
    pub const fn history_window(&self) -> usize {
        self.config.history_sessions
    }

    /// Mean of the most recent `history_window` volumes
    ///
    /// `prior_volumes` must be ordered most recent first.
    #[must_use]
    pub fn rolling_average(&self, prior_volumes: &[f64]) -> Option<f64> {
        let window: Vec<f64> = prior_volumes
            .iter()
            .copied()
            .take(self.config.history_sessions)
            .collect();
        if window.is_empty() {
            return None;
        }
        Some(window.iter().sum::<f64>() / window.len() as f64)
    }

    /// Grade a closed session
    ///
    /// `sets` are the session's sets, `planned` the day's prescriptions, and
    /// `prior_volumes` the volumes of earlier closed sessions of the same day
    /// type, most recent first.
    #[must_use]
    pub fn grade(
        &self,
        sets: &[SetEntry],
        planned: &[PlannedExercise],
        prior_volumes: &[f64],
    ) -> GradeReport {
        let logged: BTreeSet<String> = sets
            .iter()
            .map(|set| set.exercise.to_lowercase())
            .collect();
        let covered_exercises = planned
            .iter()
            .filter(|p| logged.contains(&p.exercise.to_lowercase()))
            .count();
        let coverage = if planned.is_empty() {
            1.0
        } else {
            covered_exercises as f64 / planned.len() as f64
        };

        let volume = total_volume(sets);
        let rolling_average = self.rolling_average(prior_volumes);
        let volume_ratio = match rolling_average {
            Some(average) if average > 0.0 => volume / average,
            _ => 1.0,
        };

        let grade = if sets.is_empty() {
            Grade::F
        } else {
            self.lookup(coverage, volume_ratio)
        };

        debug!(
            %grade,
            coverage,
            volume_ratio,
            total_sets = sets.len(),
            "Graded session"
        );

        GradeReport {
            grade,
            coverage,
            covered_exercises,
            planned_exercises: planned.len(),
            total_sets: sets.len(),
            total_volume: volume,
            rolling_average,
            volume_ratio,
        }
    }

    /// First table row whose minimums are both met; F below the table
    #[must_use]
    pub fn lookup(&self, coverage: f64, volume_ratio: f64) -> Grade {
        self.config
            .thresholds
            .iter()
            .find(|row| coverage >= row.min_coverage && volume_ratio >= row.min_volume_ratio)
            .map_or(Grade::F, |row| row.grade)
    }
}
