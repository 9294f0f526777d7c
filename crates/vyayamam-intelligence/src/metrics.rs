// ABOUTME: Strength metrics over logged set history: e1RM, personal records, volume, consistency
// ABOUTME: Pure functions of the slice passed in; no state is held between calls
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Strength metrics
//!
//! Every function here is deterministic: the same history slice produces the
//! same answer regardless of slice order or call order.

use chrono::{Duration, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use vyayamam_core::models::{MuscleGroup, SetEntry};

/// Epley estimate of the one-repetition maximum: `weight * (1 + reps / 30)`
#[must_use]
pub fn estimated_one_rep_max(weight: f64, reps: u32) -> f64 {
    weight * (1.0 + f64::from(reps) / 30.0)
}

/// e1RM of a single logged set
#[must_use]
pub fn set_e1rm(set: &SetEntry) -> f64 {
    estimated_one_rep_max(set.weight, set.reps)
}

/// Highest e1RM across the given sets
#[must_use]
pub fn best_e1rm<'a, I>(sets: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a SetEntry>,
{
    sets.into_iter().map(set_e1rm).max_by(f64::total_cmp)
}

/// Total order used to pick a personal record
///
/// Greater weight wins, then more reps, then the more recent timestamp.
/// Identical performances logged at the same instant fall back to the id so
/// the winner never depends on slice order.
#[must_use]
pub fn compare_for_record(a: &SetEntry, b: &SetEntry) -> Ordering {
    a.weight
        .total_cmp(&b.weight)
        .then_with(|| a.reps.cmp(&b.reps))
        .then_with(|| a.timestamp.cmp(&b.timestamp))
        .then_with(|| a.id.cmp(&b.id))
}

/// Personal record among the given sets, which should all be one exercise
#[must_use]
pub fn personal_record<'a, I>(sets: I) -> Option<&'a SetEntry>
where
    I: IntoIterator<Item = &'a SetEntry>,
{
    sets.into_iter().max_by(|a, b| compare_for_record(a, b))
}

/// Personal record for one exercise within a mixed history
#[must_use]
pub fn personal_record_for<'a>(history: &'a [SetEntry], exercise: &str) -> Option<&'a SetEntry> {
    personal_record(history.iter().filter(|set| set.is_for(exercise)))
}

/// Volume of a single set: `weight * reps`
#[must_use]
pub fn set_volume(set: &SetEntry) -> f64 {
    set.weight * f64::from(set.reps)
}

/// Summed volume of the given sets
#[must_use]
pub fn total_volume<'a, I>(sets: I) -> f64
where
    I: IntoIterator<Item = &'a SetEntry>,
{
    sets.into_iter().map(set_volume).sum()
}

/// Volume per canonical exercise name
#[must_use]
pub fn volume_by_exercise(sets: &[SetEntry]) -> BTreeMap<String, f64> {
    let mut volumes = BTreeMap::new();
    for set in sets {
        *volumes.entry(set.exercise.clone()).or_insert(0.0) += set_volume(set);
    }
    volumes
}

/// Volume per muscle group
///
/// `groups_of` maps an exercise name to every group it is tagged with; a set
/// counts fully toward each of them. Exercises the lookup does not know are
/// skipped.
#[must_use]
pub fn volume_by_muscle_group<F>(sets: &[SetEntry], groups_of: F) -> BTreeMap<MuscleGroup, f64>
where
    F: Fn(&str) -> Vec<MuscleGroup>,
{
    let mut volumes = BTreeMap::new();
    for (exercise, volume) in volume_by_exercise(sets) {
        for group in groups_of(&exercise) {
            *volumes.entry(group).or_insert(0.0) += volume;
        }
    }
    volumes
}

/// Training-day consistency over a trailing window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consistency {
    /// First date of the window
    pub window_start: NaiveDate,
    /// Last date of the window (today)
    pub window_end: NaiveDate,
    /// Distinct dates with at least one set
    pub active_days: usize,
    /// Consecutive active days ending today, or yesterday if today has no sets yet
    pub current_streak: u32,
    /// Longest run of consecutive active days inside the window
    pub longest_streak: u32,
    /// Active dates in ascending order, for heatmap rendering
    pub active_dates: Vec<NaiveDate>,
}

/// Local calendar dates with at least one set
#[must_use]
pub fn training_dates(sets: &[SetEntry], offset: FixedOffset) -> BTreeSet<NaiveDate> {
    sets.iter()
        .map(|set| set.timestamp.with_timezone(&offset).date_naive())
        .collect()
}

/// Consistency of training over the `window_days` days ending on `today`
#[must_use]
pub fn consistency(
    sets: &[SetEntry],
    today: NaiveDate,
    window_days: i64,
    offset: FixedOffset,
) -> Consistency {
    let window_start = today - Duration::days(window_days.max(1) - 1);
    let active_dates: Vec<NaiveDate> = training_dates(sets, offset)
        .into_iter()
        .filter(|date| *date >= window_start && *date <= today)
        .collect();
    let active: BTreeSet<NaiveDate> = active_dates.iter().copied().collect();

    let mut cursor = if active.contains(&today) {
        Some(today)
    } else {
        today.pred_opt()
    };
    let mut current_streak = 0;
    while let Some(date) = cursor.filter(|date| active.contains(date)) {
        current_streak += 1;
        cursor = date.pred_opt();
    }

    let mut longest_streak = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for date in &active_dates {
        run = match previous {
            Some(prev) if prev.succ_opt() == Some(*date) => run + 1,
            _ => 1,
        };
        longest_streak = longest_streak.max(run);
        previous = Some(*date);
    }

    Consistency {
        window_start,
        window_end: today,
        active_days: active_dates.len(),
        current_streak,
        longest_streak,
        active_dates,
    }
}

/// Per-exercise summary used in coaching summaries and listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseStats {
    /// Canonical exercise name
    pub exercise: String,
    /// Sets logged
    pub total_sets: usize,
    /// Summed volume
    pub total_volume: f64,
    /// Personal record set
    pub personal_record: Option<SetEntry>,
    /// Best estimated one-rep max
    pub best_e1rm: Option<f64>,
}

/// Stats for every exercise in a history slice, keyed by exercise name
#[must_use]
pub fn exercise_stats(sets: &[SetEntry]) -> Vec<ExerciseStats> {
    let mut grouped: BTreeMap<&str, Vec<&SetEntry>> = BTreeMap::new();
    for set in sets {
        grouped.entry(set.exercise.as_str()).or_default().push(set);
    }
    grouped
        .into_iter()
        .map(|(exercise, entries)| ExerciseStats {
            exercise: exercise.to_owned(),
            total_sets: entries.len(),
            total_volume: total_volume(entries.iter().copied()),
            personal_record: personal_record(entries.iter().copied()).cloned(),
            best_e1rm: best_e1rm(entries.iter().copied()),
        })
        .collect()
}
