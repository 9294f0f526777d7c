// ABOUTME: Progressive overload engine suggesting the weight and reps for the next set
// ABOUTME: Reads the latest session's top set against the planned rep target
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Recommendation engine
//!
//! Policy: take the top set (heaviest, then most reps) from the most recent
//! session in which the exercise was logged. The session is the stored window
//! holding the newest set; sets logged outside any session fall back to their
//! local calendar date. If it met the rep target,
//! add a small percentage rounded to the configured load increment. If it
//! fell short, repeat the weight. Bodyweight exercises progress by reps
//! instead of load. With no history the plan's starting weight is used, or
//! the user is told to start conservatively.
//!
//! Every recommendation carries the current PR and best e1RM.

use crate::config::intelligence::OverloadConfig;
use crate::metrics::{best_e1rm, compare_for_record, personal_record};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vyayamam_core::models::{
    Exercise, ExerciseUnit, PlannedExercise, RepTarget, Session, SetEntry,
};

/// What kind of suggestion was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Progression {
    /// Target met last time; add load
    IncreaseWeight,
    /// Target missed last time; same load again
    RepeatWeight,
    /// Bodyweight target met; add reps
    AddReps,
    /// No history; plan-defined starting load
    StartingWeight,
    /// No history and no starting load
    NoHistory,
}

/// Suggested next set for an exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Canonical exercise name
    pub exercise: String,
    /// Kind of suggestion
    pub progression: Progression,
    /// Load to use, if one can be suggested
    pub suggested_weight: Option<f64>,
    /// Reps to aim for
    pub suggested_reps: u32,
    /// Planned working sets, if the exercise is in the plan
    pub target_sets: Option<u32>,
    /// Planned rep prescription as written
    pub rep_target: Option<RepTarget>,
    /// Top set of the most recent session that included the exercise
    pub last_top_set: Option<SetEntry>,
    /// All-time personal record
    pub personal_record: Option<SetEntry>,
    /// All-time best estimated one-rep max
    pub best_e1rm: Option<f64>,
}

/// Progressive overload recommendation engine
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    config: OverloadConfig,
}

impl RecommendationEngine {
    /// Create an engine with the given overload policy
    #[must_use]
    pub const fn new(config: OverloadConfig) -> Self {
        Self { config }
    }

    /// Overload policy in use
    #[must_use]
    pub const fn config(&self) -> &OverloadConfig {
        &self.config
    }

    /// Reps that count as meeting the prescription
    #[must_use]
    pub fn rep_target(&self, planned: Option<&PlannedExercise>) -> u32 {
        planned
            .and_then(|p| p.target_reps.minimum())
            .unwrap_or(self.config.default_rep_target)
    }

    /// Round a load to the nearest configured increment
    #[must_use]
    pub fn round_to_increment(&self, weight: f64) -> f64 {
        let step = self.config.weight_increment;
        (weight / step).round() * step
    }

    /// Next load after a met target; always at least one increment heavier
    #[must_use]
    pub fn increased_weight(&self, previous: f64) -> f64 {
        let step = self.config.weight_increment;
        let candidate = self.round_to_increment(previous * (1.0 + self.config.increase_percent));
        if candidate > previous {
            candidate
        } else {
            ((previous / step).floor() + 1.0) * step
        }
    }

    /// Suggest the next set for `exercise` from the user's history
    ///
    /// `history` may contain other exercises; only matching entries are used.
    /// `latest_session` is the stored session holding the newest matching set.
    /// Without it, `offset` defines the calendar day standing in for a session.
    #[must_use]
    pub fn recommend(
        &self,
        exercise: &Exercise,
        planned: Option<&PlannedExercise>,
        history: &[SetEntry],
        latest_session: Option<&Session>,
        offset: FixedOffset,
    ) -> Recommendation {
        let relevant: Vec<&SetEntry> = history
            .iter()
            .filter(|set| set.is_for(&exercise.name))
            .collect();
        let rep_target = self.rep_target(planned);
        let last_top_set = latest_top_set(&relevant, latest_session, offset).cloned();

        let (progression, suggested_weight, suggested_reps) = match &last_top_set {
            None => match planned.and_then(|p| p.start_weight) {
                Some(start) => (Progression::StartingWeight, Some(start), rep_target),
                None => (Progression::NoHistory, None, rep_target),
            },
            Some(top) if exercise.unit == ExerciseUnit::Bodyweight => {
                if top.reps >= rep_target {
                    let reps = top.reps.saturating_add(self.config.bodyweight_rep_step);
                    (Progression::AddReps, Some(top.weight), reps)
                } else {
                    (Progression::RepeatWeight, Some(top.weight), rep_target)
                }
            }
            Some(top) if top.reps >= rep_target => (
                Progression::IncreaseWeight,
                Some(self.increased_weight(top.weight)),
                rep_target,
            ),
            Some(top) => (Progression::RepeatWeight, Some(top.weight), rep_target),
        };

        debug!(
            exercise = %exercise.name,
            ?progression,
            suggested_weight,
            suggested_reps,
            "Computed overload recommendation"
        );

        Recommendation {
            exercise: exercise.name.clone(),
            progression,
            suggested_weight,
            suggested_reps,
            target_sets: planned.map(|p| p.target_sets),
            rep_target: planned.map(|p| p.target_reps.clone()),
            last_top_set,
            personal_record: personal_record(relevant.iter().copied()).cloned(),
            best_e1rm: best_e1rm(relevant.iter().copied()),
        }
    }
}

/// Top set (heaviest, then most reps) of the session holding the newest set
///
/// `session` is ignored unless its window contains the newest of `sets`; the
/// newest local calendar date is used instead.
#[must_use]
pub fn latest_top_set<'a>(
    sets: &[&'a SetEntry],
    session: Option<&Session>,
    offset: FixedOffset,
) -> Option<&'a SetEntry> {
    let newest = sets.iter().copied().max_by_key(|set| set.timestamp)?;
    let within = |window: &Session, set: &SetEntry| {
        set.timestamp >= window.started_at
            && window.ended_at.is_none_or(|end| set.timestamp < end)
    };
    if let Some(window) = session.filter(|window| within(window, newest)) {
        return sets
            .iter()
            .copied()
            .filter(|set| within(window, set))
            .max_by(|a, b| compare_for_record(a, b));
    }

    let local_date = |set: &SetEntry| set.timestamp.with_timezone(&offset).date_naive();
    let latest = local_date(newest);
    sets.iter()
        .copied()
        .filter(|set| local_date(set) == latest)
        .max_by(|a, b| compare_for_record(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use vyayamam_core::models::{Grade, MuscleGroup, UserId};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn bench() -> Exercise {
        Exercise::new("Bench Press", MuscleGroup::Chest)
    }

    fn entry(weight: f64, reps: u32, day: u32) -> SetEntry {
        SetEntry::new(UserId::from("u1"), "Bench Press", weight, reps, at(day))
    }

    #[test]
    fn test_increase_rounds_to_increment() {
        let engine = RecommendationEngine::default();
        assert!((engine.increased_weight(100.0) - 102.5).abs() < 1e-9);
        assert!((engine.increased_weight(20.0) - 22.5).abs() < 1e-9);
        assert!((engine.increased_weight(101.0) - 102.5).abs() < 1e-9);
    }

    #[test]
    fn test_uses_latest_session_not_all_time_best() {
        let engine = RecommendationEngine::default();
        let history = vec![entry(120.0, 8, 1), entry(100.0, 6, 5), entry(90.0, 10, 5)];
        let planned = PlannedExercise::new("Bench Press", 3, "8-12");
        let rec = engine.recommend(&bench(), Some(&planned), &history, None, utc());
        assert_eq!(rec.progression, Progression::RepeatWeight);
        assert_eq!(rec.suggested_weight, Some(100.0));
        assert_eq!(rec.personal_record.map(|s| s.weight), Some(120.0));
    }

    #[test]
    fn test_two_sessions_on_one_date_stay_apart() {
        let engine = RecommendationEngine::default();
        let morning = at(5);
        let evening = morning + Duration::hours(9);
        let history = vec![
            SetEntry::new(UserId::from("u1"), "Bench Press", 110.0, 6, morning),
            SetEntry::new(UserId::from("u1"), "Bench Press", 90.0, 10, evening),
        ];
        let planned = PlannedExercise::new("Bench Press", 3, "8-12");
        let later = Session::open(UserId::from("u1"), None, evening - Duration::minutes(5));

        let rec = engine.recommend(&bench(), Some(&planned), &history, Some(&later), utc());
        assert_eq!(rec.last_top_set.as_ref().map(|s| s.weight), Some(90.0));
        assert_eq!(rec.progression, Progression::IncreaseWeight);

        // Without the session both sets share the calendar date
        let dated = engine.recommend(&bench(), Some(&planned), &history, None, utc());
        assert_eq!(dated.last_top_set.map(|s| s.weight), Some(110.0));

        // A window that misses the newest set is not trusted
        let stale = Session::open(UserId::from("u1"), None, at(1)).closed(at(2), Grade::C, 0.0);
        let rec = engine.recommend(&bench(), Some(&planned), &history, Some(&stale), utc());
        assert_eq!(rec.last_top_set.map(|s| s.weight), Some(110.0));
    }

    #[test]
    fn test_start_weight_without_history() {
        let engine = RecommendationEngine::default();
        let planned = PlannedExercise::new("Bench Press", 3, "8-12").with_start_weight(40.0);
        let rec = engine.recommend(&bench(), Some(&planned), &[], None, utc());
        assert_eq!(rec.progression, Progression::StartingWeight);
        assert_eq!(rec.suggested_weight, Some(40.0));
        assert!(rec.best_e1rm.is_none());

        let bare = engine.recommend(&bench(), None, &[], None, utc());
        assert_eq!(bare.progression, Progression::NoHistory);
        assert_eq!(bare.suggested_reps, 8);
    }

    #[test]
    fn test_bodyweight_progresses_by_reps() {
        let engine = RecommendationEngine::default();
        let pullups = Exercise::new("Pull-ups", MuscleGroup::Back).bodyweight();
        let history = vec![SetEntry::new(UserId::from("u1"), "Pull-ups", 0.0, 10, at(2))];
        let rec = engine.recommend(&pullups, None, &history, None, utc());
        assert_eq!(rec.progression, Progression::AddReps);
        assert_eq!(rec.suggested_reps, 11);
    }
}
