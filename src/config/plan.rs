// ABOUTME: Workout plan store with YAML loading, catalog validation, and atomic reload
// ABOUTME: Readers get an Arc snapshot; a reload swaps the Arc and never edits a plan in place
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Workout Plan Store
//!
//! Plan files look like:
//!
//! ```yaml
//! days:
//!   - label: Push A
//!     weekday: Mon
//!     exercises:
//!       - exercise: Smith Machine Incline Press
//!         target_sets: 3
//!         target_reps: "8-12"
//!         start_weight: 40
//! ```
//!
//! Exercises may be written as a canonical name or any alias; both are
//! matched ignoring case and punctuation and rewritten to the canonical
//! spelling.

use crate::catalog::{default_plan, ExerciseCatalog};
use crate::errors::{config_io_error, yaml_error, AppError, AppResult};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;
use vyayamam_core::models::WorkoutPlan;

/// Holder of the active plan
#[derive(Debug)]
pub struct PlanStore {
    plan: RwLock<Arc<WorkoutPlan>>,
}

impl PlanStore {
    /// Store holding `plan`
    #[must_use]
    pub fn new(plan: WorkoutPlan) -> Self {
        Self {
            plan: RwLock::new(Arc::new(plan)),
        }
    }

    /// Store holding the built-in Push/Pull/Legs plan
    #[must_use]
    pub fn with_default_plan() -> Self {
        Self::new(default_plan())
    }

    /// Load from a YAML file, or the built-in plan when no path is given
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated
    pub fn load(path: Option<&Path>, catalog: &ExerciseCatalog) -> AppResult<Self> {
        match path {
            Some(path) => Ok(Self::new(load_yaml(path, catalog)?)),
            None => Ok(Self::with_default_plan()),
        }
    }

    /// Snapshot of the active plan
    #[must_use]
    pub fn current(&self) -> Arc<WorkoutPlan> {
        Arc::clone(&self.plan.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Swap in a new plan
    pub fn replace(&self, plan: WorkoutPlan) {
        *self.plan.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(plan);
    }

    /// Re-read a plan file and swap it in; the old plan stays active on error
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated
    pub fn reload(&self, path: &Path, catalog: &ExerciseCatalog) -> AppResult<()> {
        let plan = load_yaml(path, catalog)?;
        let days = plan.days.len();
        self.replace(plan);
        info!(path = %path.display(), days, "Workout plan reloaded");
        Ok(())
    }
}

impl Default for PlanStore {
    fn default() -> Self {
        Self::with_default_plan()
    }
}

/// Read and validate a YAML plan file
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or validated
pub fn load_yaml(path: &Path, catalog: &ExerciseCatalog) -> AppResult<WorkoutPlan> {
    let text = fs::read_to_string(path)
        .map_err(|e| config_io_error(&format!("Failed to read plan {}", path.display()), e))?;
    from_yaml_str(&text, catalog)
}

/// Parse and validate a YAML plan
///
/// # Errors
///
/// Returns an error if the YAML is malformed or the plan fails validation
pub fn from_yaml_str(text: &str, catalog: &ExerciseCatalog) -> AppResult<WorkoutPlan> {
    let plan: WorkoutPlan =
        serde_yaml::from_str(text).map_err(|e| yaml_error("Invalid workout plan", e))?;
    validate(plan, catalog)
}

/// Check a plan against the catalog and canonicalize exercise names
///
/// # Errors
///
/// Returns an error on an empty or duplicate day label, a weekday used
/// twice, an unknown exercise, or a prescription of zero sets
pub fn validate(mut plan: WorkoutPlan, catalog: &ExerciseCatalog) -> AppResult<WorkoutPlan> {
    let mut labels = HashSet::new();
    let mut weekdays = HashSet::new();

    for day in &mut plan.days {
        let label = day.label.trim().to_lowercase();
        if label.is_empty() {
            return Err(AppError::config("Plan day label must not be empty"));
        }
        if !labels.insert(label) {
            return Err(AppError::config(format!(
                "Duplicate plan day label: {}",
                day.label
            )));
        }
        if let Some(weekday) = day.weekday {
            if !weekdays.insert(weekday) {
                return Err(AppError::config(format!(
                    "Weekday {weekday} is assigned to more than one plan day"
                )));
            }
        }

        for planned in &mut day.exercises {
            let exercise = catalog.lookup(&planned.exercise).ok_or_else(|| {
                AppError::config(format!(
                    "Plan day {} references unknown exercise '{}'",
                    day.label, planned.exercise
                ))
            })?;
            if planned.target_sets == 0 {
                return Err(AppError::config(format!(
                    "{} on {} must have at least one set",
                    exercise.name, day.label
                )));
            }
            planned.exercise.clone_from(&exercise.name);
        }
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use vyayamam_core::models::RepTarget;

    #[test]
    fn test_yaml_plan_is_canonicalized() {
        let catalog = ExerciseCatalog::default_catalog();
        let plan = from_yaml_str(
            r#"
days:
  - label: Upper
    weekday: tue
    exercises:
      - exercise: pull ups
        target_sets: 3
        target_reps: "To Failure"
      - exercise: lat pulldowns
        target_sets: 4
        target_reps: "8-12"
        start_weight: 45
"#,
            &catalog,
        )
        .unwrap();

        let day = plan.day("upper").unwrap();
        assert_eq!(day.weekday, Some(Weekday::Tue));
        assert_eq!(day.exercises[0].exercise, "Pull-ups");
        assert_eq!(day.exercises[0].target_reps, RepTarget::ToFailure);
        assert_eq!(day.exercises[1].start_weight, Some(45.0));
    }

    #[test]
    fn test_aliases_are_canonicalized() {
        let catalog = ExerciseCatalog::default_catalog();
        let plan = from_yaml_str(
            "days:\n  - label: Arms\n    exercises:\n      - exercise: db curls\n        target_sets: 3\n        target_reps: \"10-15\"\n      - exercise: Rope Pushdowns\n        target_sets: 3\n        target_reps: \"12\"\n",
            &catalog,
        )
        .unwrap();

        let names: Vec<&str> = plan.days[0]
            .exercises
            .iter()
            .map(|planned| planned.exercise.as_str())
            .collect();
        assert_eq!(names, ["Dumbbell Bicep Curls", "Cable Tricep Pushdowns"]);
    }

    #[test]
    fn test_unknown_exercise_rejected() {
        let catalog = ExerciseCatalog::default_catalog();
        let result = from_yaml_str(
            "days:\n  - label: X\n    exercises:\n      - exercise: Bench Press\n        target_sets: 3\n        target_reps: \"5\"\n",
            &catalog,
        );
        assert!(result.unwrap_err().message.contains("Bench Press"));
    }

    #[test]
    fn test_replace_swaps_snapshot() {
        let store = PlanStore::with_default_plan();
        let before = store.current();
        store.replace(WorkoutPlan::default());
        assert_eq!(before.days.len(), 6);
        assert!(store.current().days.is_empty());
    }
}
