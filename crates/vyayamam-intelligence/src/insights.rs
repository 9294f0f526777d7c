// ABOUTME: Structured training summaries handed to the language-model collaborator
// ABOUTME: Builds the /ask data digest and the end-of-session recap from raw history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Training summaries
//!
//! The core never generates prose itself. These types collect the numbers a
//! coach would look at (recent sessions, records, volume, consistency) into a
//! serializable digest that is embedded verbatim in a model prompt.

use crate::metrics::{
    consistency, exercise_stats, personal_record, total_volume, volume_by_muscle_group,
    Consistency, ExerciseStats,
};
use crate::session_grader::GradeReport;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use vyayamam_core::models::{Grade, MuscleGroup, ReadinessLog, Session, SetEntry};

/// One logged set, stripped to what a coach needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetDigest {
    /// Canonical exercise name
    pub exercise: String,
    /// Load
    pub weight: f64,
    /// Reps
    pub reps: u32,
    /// RPE, if reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpe: Option<f64>,
    /// Note, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl From<&SetEntry> for SetDigest {
    fn from(set: &SetEntry) -> Self {
        Self {
            exercise: set.exercise.clone(),
            weight: set.weight,
            reps: set.reps,
            rpe: set.rpe,
            note: set.note.clone(),
        }
    }
}

/// A past session with its sets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDigest {
    /// Plan day label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_label: Option<String>,
    /// Local date the session started on
    pub date: NaiveDate,
    /// Grade, if closed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<Grade>,
    /// Session volume
    pub total_volume: f64,
    /// Sets in logging order
    pub sets: Vec<SetDigest>,
}

/// Data digest for open-ended coaching questions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    /// Generation time
    pub generated_at: DateTime<Utc>,
    /// Weight unit label used in the digest
    pub weight_unit: String,
    /// Most recent sessions, newest first
    pub recent_sessions: Vec<SessionDigest>,
    /// Per-exercise records across the full history
    pub exercises: Vec<ExerciseStats>,
    /// Volume per muscle group over the trailing volume window
    pub muscle_group_volume: BTreeMap<MuscleGroup, f64>,
    /// Training-day consistency
    pub consistency: Consistency,
    /// Today's readiness, if logged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness: Option<ReadinessLog>,
}

impl TrainingSummary {
    /// Whether there is nothing worth analysing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Pretty JSON for embedding in a prompt
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_prompt_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Inputs for [`build_training_summary`]
pub struct SummaryInput<'a> {
    /// Full set history for the user
    pub history: &'a [SetEntry],
    /// Most recent sessions, newest first
    pub sessions: &'a [Session],
    /// Today's readiness log
    pub readiness: Option<ReadinessLog>,
    /// Current time
    pub now: DateTime<Utc>,
    /// User's calendar offset
    pub offset: FixedOffset,
    /// Days of history counted for consistency
    pub consistency_days: i64,
    /// Days of history counted for muscle-group volume
    pub volume_days: i64,
    /// Weight unit label
    pub weight_unit: &'a str,
}

/// Assemble the digest for an `/ask` question
#[must_use]
pub fn build_training_summary<F>(input: &SummaryInput<'_>, groups_of: F) -> TrainingSummary
where
    F: Fn(&str) -> Vec<MuscleGroup>,
{
    let today = input.now.with_timezone(&input.offset).date_naive();
    let volume_since = input.now - Duration::days(input.volume_days);
    let recent: Vec<SetEntry> = input
        .history
        .iter()
        .filter(|set| set.timestamp >= volume_since && set.timestamp <= input.now)
        .cloned()
        .collect();

    let recent_sessions = input
        .sessions
        .iter()
        .map(|session| {
            let sets: Vec<&SetEntry> = input
                .history
                .iter()
                .filter(|set| session.contains(set.timestamp, input.now))
                .collect();
            SessionDigest {
                day_label: session.day_label.clone(),
                date: session.started_at.with_timezone(&input.offset).date_naive(),
                grade: session.grade,
                total_volume: total_volume(sets.iter().copied()),
                sets: sets.into_iter().map(SetDigest::from).collect(),
            }
        })
        .collect();

    TrainingSummary {
        generated_at: input.now,
        weight_unit: input.weight_unit.to_owned(),
        recent_sessions,
        exercises: exercise_stats(input.history),
        muscle_group_volume: volume_by_muscle_group(&recent, groups_of),
        consistency: consistency(input.history, today, input.consistency_days, input.offset),
        readiness: input.readiness.clone(),
    }
}

/// Per-exercise slice of a session recap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseRecap {
    /// Canonical exercise name
    pub exercise: String,
    /// Sets in logging order
    pub sets: Vec<SetDigest>,
    /// Volume for the exercise in this session
    pub volume: f64,
    /// Whether this session set a new personal record
    pub new_personal_record: bool,
}

/// Data for the end-of-session summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecap {
    /// Plan day label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_label: Option<String>,
    /// Session length in whole minutes
    pub duration_minutes: i64,
    /// Grade and grading signals
    pub grade: GradeReport,
    /// Exercises in the order first logged
    pub exercises: Vec<ExerciseRecap>,
}

impl SessionRecap {
    /// Pretty JSON for embedding in a prompt
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_prompt_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Exercises on which a record was set
    pub fn record_exercises(&self) -> impl Iterator<Item = &str> {
        self.exercises
            .iter()
            .filter(|e| e.new_personal_record)
            .map(|e| e.exercise.as_str())
    }
}

/// Build the recap for a closed session
///
/// `session_sets` are the sets inside the session window; `earlier` is the
/// user's history before the session started, used to decide whether a
/// record was broken.
#[must_use]
pub fn build_session_recap(
    session: &Session,
    session_sets: &[SetEntry],
    earlier: &[SetEntry],
    grade: GradeReport,
    now: DateTime<Utc>,
) -> SessionRecap {
    let mut order: Vec<&str> = Vec::new();
    for set in session_sets {
        if !order.iter().any(|name| set.is_for(name)) {
            order.push(set.exercise.as_str());
        }
    }

    let exercises = order
        .into_iter()
        .map(|name| {
            let sets: Vec<&SetEntry> = session_sets.iter().filter(|s| s.is_for(name)).collect();
            let session_best = personal_record(sets.iter().copied());
            let previous_best = personal_record(earlier.iter().filter(|s| s.is_for(name)));
            let new_personal_record = match (session_best, previous_best) {
                (Some(best), Some(previous)) => beats_record(best, previous),
                (Some(_), None) => true,
                _ => false,
            };
            ExerciseRecap {
                exercise: name.to_owned(),
                volume: total_volume(sets.iter().copied()),
                sets: sets.into_iter().map(SetDigest::from).collect(),
                new_personal_record,
            }
        })
        .collect();

    let end = session.ended_at.unwrap_or(now);
    SessionRecap {
        day_label: session.day_label.clone(),
        duration_minutes: (end - session.started_at).num_minutes(),
        grade,
        exercises,
    }
}

/// Whether `candidate` is a better performance than `record`
///
/// Recency alone does not make a record: weight or reps must improve.
#[must_use]
pub fn beats_record(candidate: &SetEntry, record: &SetEntry) -> bool {
    candidate
        .weight
        .total_cmp(&record.weight)
        .then_with(|| candidate.reps.cmp(&record.reps))
        == Ordering::Greater
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session_grader::SessionGrader;
    use chrono::TimeZone;
    use vyayamam_core::models::UserId;

    #[test]
    fn test_recap_flags_new_records_only_on_improvement() {
        let start = Utc.with_ymd_and_hms(2025, 3, 3, 7, 0, 0).unwrap();
        let user = UserId::from("u1");
        let earlier = vec![
            SetEntry::new(user.clone(), "Bench Press", 100.0, 8, start - Duration::days(7)),
            SetEntry::new(user.clone(), "Squat", 140.0, 5, start - Duration::days(5)),
        ];
        let session_sets = vec![
            SetEntry::new(user.clone(), "Bench Press", 100.0, 9, start + Duration::minutes(5)),
            SetEntry::new(user.clone(), "Squat", 140.0, 5, start + Duration::minutes(20)),
            SetEntry::new(user.clone(), "Lunge", 20.0, 10, start + Duration::minutes(40)),
        ];
        let session = Session::open(user, Some("Legs".into()), start);
        let end = start + Duration::minutes(50);
        let grade = SessionGrader::default().grade(&session_sets, &[], &[]);
        let recap = build_session_recap(&session, &session_sets, &earlier, grade, end);

        assert_eq!(recap.duration_minutes, 50);
        let records: Vec<&str> = recap.record_exercises().collect();
        assert_eq!(records, vec!["Bench Press", "Lunge"]);
    }
}
