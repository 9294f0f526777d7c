// ABOUTME: Logged set model, the immutable atomic unit of training history
// ABOUTME: Also defines the UserId newtype used to key all per-user records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque user identifier supplied by the chat transport (e.g. a phone number)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap a transport identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A single logged set
///
/// Created by a `LogSet` command and never updated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetEntry {
    /// Unique identifier
    pub id: Uuid,
    /// Owner
    pub user_id: UserId,
    /// Canonical exercise name
    pub exercise: String,
    /// Load lifted (0 for unloaded bodyweight work)
    pub weight: f64,
    /// Repetitions completed (always at least 1)
    pub reps: u32,
    /// Rate of perceived exertion, 1-10
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe: Option<f64>,
    /// Free-text note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// When the set was logged
    pub timestamp: DateTime<Utc>,
}

impl SetEntry {
    /// Create a set with a fresh identifier
    #[must_use]
    pub fn new(
        user_id: UserId,
        exercise: impl Into<String>,
        weight: f64,
        reps: u32,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            exercise: exercise.into(),
            weight,
            reps,
            rpe: None,
            note: None,
            timestamp,
        }
    }

    /// Attach an RPE
    #[must_use]
    pub const fn with_rpe(mut self, rpe: Option<f64>) -> Self {
        self.rpe = rpe;
        self
    }

    /// Attach a note
    #[must_use]
    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }

    /// Whether the set belongs to the named exercise
    #[must_use]
    pub fn is_for(&self, exercise: &str) -> bool {
        self.exercise.eq_ignore_ascii_case(exercise)
    }
}
