// ABOUTME: Workout plan model mapping day labels to ordered exercise prescriptions
// ABOUTME: Read-only during normal operation; replaced wholesale by an administrative reload
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prescribed repetitions for a planned exercise
///
/// Plans are written by hand (`"8-12"`, `"20"`, `"To Failure"`,
/// `"10-12/leg"`, `"5 min"`), so the target is parsed from text and
/// serialized back to text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RepTarget {
    /// Inclusive range, e.g. `8-12`
    Range {
        /// Lower bound
        min: u32,
        /// Upper bound
        max: u32,
    },
    /// A fixed count
    Exact(u32),
    /// As many reps as possible
    ToFailure,
    /// Anything else (durations, distances); carries the original text
    Freeform(String),
}

impl RepTarget {
    /// Parse a hand-written target
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        let lowered = trimmed.to_ascii_lowercase();
        if matches!(lowered.as_str(), "to failure" | "failure" | "amrap") {
            return Self::ToFailure;
        }

        // A per-side qualifier ("/leg", "/arm") does not change the count
        let count = lowered.split('/').next().unwrap_or_default().trim();
        let has_other_suffix = count
            .chars()
            .any(|c| !c.is_ascii_digit() && c != '-' && c != ' ');
        if has_other_suffix {
            return Self::Freeform(trimmed.to_owned());
        }

        match count.split_once('-') {
            Some((low, high)) => match (low.trim().parse(), high.trim().parse()) {
                (Ok(min), Ok(max)) if min <= max => Self::Range { min, max },
                _ => Self::Freeform(trimmed.to_owned()),
            },
            None => count
                .parse()
                .map_or_else(|_| Self::Freeform(trimmed.to_owned()), Self::Exact),
        }
    }

    /// Fewest reps that count as meeting the prescription
    #[must_use]
    pub const fn minimum(&self) -> Option<u32> {
        match self {
            Self::Range { min, .. } => Some(*min),
            Self::Exact(n) => Some(*n),
            Self::ToFailure | Self::Freeform(_) => None,
        }
    }
}

impl fmt::Display for RepTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range { min, max } => write!(f, "{min}-{max}"),
            Self::Exact(n) => write!(f, "{n}"),
            Self::ToFailure => f.write_str("To Failure"),
            Self::Freeform(text) => f.write_str(text),
        }
    }
}

impl From<String> for RepTarget {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<RepTarget> for String {
    fn from(value: RepTarget) -> Self {
        value.to_string()
    }
}

/// One exercise prescription within a plan day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedExercise {
    /// Canonical exercise name from the catalog
    pub exercise: String,
    /// Working sets prescribed
    pub target_sets: u32,
    /// Reps prescribed per set
    pub target_reps: RepTarget,
    /// Suggested load when the user has no history
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_weight: Option<f64>,
}

impl PlannedExercise {
    /// Create a prescription
    #[must_use]
    pub fn new(exercise: impl Into<String>, target_sets: u32, target_reps: &str) -> Self {
        Self {
            exercise: exercise.into(),
            target_sets,
            target_reps: RepTarget::parse(target_reps),
            start_weight: None,
        }
    }

    /// Set the starting weight
    #[must_use]
    pub const fn with_start_weight(mut self, weight: f64) -> Self {
        self.start_weight = Some(weight);
        self
    }
}

/// A labelled training day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDay {
    /// Day label, e.g. "Push A"
    pub label: String,
    /// Weekday this day is scheduled on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday: Option<Weekday>,
    /// Exercises in the order they should be performed
    #[serde(default)]
    pub exercises: Vec<PlannedExercise>,
}

impl PlanDay {
    /// Index of an exercise within the day
    #[must_use]
    pub fn position(&self, exercise: &str) -> Option<usize> {
        self.exercises
            .iter()
            .position(|planned| planned.exercise.eq_ignore_ascii_case(exercise))
    }

    /// Prescription for an exercise on this day
    #[must_use]
    pub fn get(&self, exercise: &str) -> Option<&PlannedExercise> {
        self.position(exercise).map(|index| &self.exercises[index])
    }

    /// The exercise that follows `current` in plan order
    ///
    /// With no current exercise, or one that is not part of this day, the
    /// first planned exercise is returned. After the last exercise the day is
    /// finished and `None` is returned.
    #[must_use]
    pub fn next_after(&self, current: Option<&str>) -> Option<&PlannedExercise> {
        match current.and_then(|name| self.position(name)) {
            Some(index) => self.exercises.get(index + 1),
            None => self.exercises.first(),
        }
    }
}

/// Mapping from day labels to ordered exercise sequences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    /// Training days
    #[serde(default)]
    pub days: Vec<PlanDay>,
}

impl WorkoutPlan {
    /// Create a plan from days
    #[must_use]
    pub const fn new(days: Vec<PlanDay>) -> Self {
        Self { days }
    }

    /// Look up a day by label (case-insensitive)
    #[must_use]
    pub fn day(&self, label: &str) -> Option<&PlanDay> {
        self.days
            .iter()
            .find(|day| day.label.eq_ignore_ascii_case(label))
    }

    /// The day scheduled on a weekday, if any
    #[must_use]
    pub fn day_for_weekday(&self, weekday: Weekday) -> Option<&PlanDay> {
        self.days.iter().find(|day| day.weekday == Some(weekday))
    }

    /// Prescription for an exercise on one day
    ///
    /// Other days are never consulted, so an exercise missing from the day
    /// has no prescription.
    #[must_use]
    pub fn planned_on(&self, day_label: Option<&str>, exercise: &str) -> Option<&PlannedExercise> {
        day_label
            .and_then(|label| self.day(label))
            .and_then(|day| day.get(exercise))
    }

    /// Every exercise name referenced by the plan
    pub fn exercise_names(&self) -> impl Iterator<Item = &str> {
        self.days
            .iter()
            .flat_map(|day| day.exercises.iter().map(|planned| planned.exercise.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rep_target_parsing() {
        assert_eq!(RepTarget::parse("8-12"), RepTarget::Range { min: 8, max: 12 });
        assert_eq!(RepTarget::parse("20"), RepTarget::Exact(20));
        assert_eq!(RepTarget::parse("To Failure"), RepTarget::ToFailure);
        assert_eq!(
            RepTarget::parse("10-12/leg"),
            RepTarget::Range { min: 10, max: 12 }
        );
        assert_eq!(
            RepTarget::parse("5 min"),
            RepTarget::Freeform("5 min".into())
        );
        assert_eq!(RepTarget::parse("12-8"), RepTarget::Freeform("12-8".into()));
    }

    #[test]
    fn test_rep_target_minimum() {
        assert_eq!(RepTarget::parse("8-12").minimum(), Some(8));
        assert_eq!(RepTarget::parse("20").minimum(), Some(20));
        assert_eq!(RepTarget::ToFailure.minimum(), None);
    }

    #[test]
    fn test_next_after_walks_plan_order() {
        let day = PlanDay {
            label: "Push A".into(),
            weekday: Some(Weekday::Mon),
            exercises: vec![
                PlannedExercise::new("Smith Machine Incline Press", 4, "8-12"),
                PlannedExercise::new("Dumbbell Shoulder Press", 3, "10-15"),
            ],
        };
        assert_eq!(
            day.next_after(None).map(|p| p.exercise.as_str()),
            Some("Smith Machine Incline Press")
        );
        assert_eq!(
            day.next_after(Some("smith machine incline press"))
                .map(|p| p.exercise.as_str()),
            Some("Dumbbell Shoulder Press")
        );
        assert!(day.next_after(Some("Dumbbell Shoulder Press")).is_none());
        assert_eq!(
            day.next_after(Some("Leg Press Machine"))
                .map(|p| p.exercise.as_str()),
            Some("Smith Machine Incline Press")
        );
    }

    #[test]
    fn test_planned_on_ignores_other_days() {
        let plan = WorkoutPlan::new(vec![
            PlanDay {
                label: "Push A".into(),
                weekday: Some(Weekday::Mon),
                exercises: vec![PlannedExercise::new("Dumbbell Shoulder Press", 3, "10-15")],
            },
            PlanDay {
                label: "Pull A".into(),
                weekday: Some(Weekday::Tue),
                exercises: vec![PlannedExercise::new("Cable Face Pulls", 3, "15-20")],
            },
        ]);
        assert_eq!(
            plan.planned_on(Some("push a"), "dumbbell shoulder press")
                .map(|p| p.target_sets),
            Some(3)
        );
        assert!(plan.planned_on(Some("Push A"), "Cable Face Pulls").is_none());
        assert!(plan.planned_on(None, "Cable Face Pulls").is_none());
    }
}
