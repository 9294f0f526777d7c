// ABOUTME: Workout session model bracketing logged sets between start and end events
// ABOUTME: Includes the discrete letter grade assigned when a session is closed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Discrete session grade, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    /// Full coverage and volume above the rolling average
    #[serde(rename = "A+")]
    APlus,
    /// Full coverage at the rolling average
    A,
    /// Mostly covered
    B,
    /// Partially covered
    C,
    /// Large shortfall
    D,
    /// Near-empty session
    F,
}

impl Grade {
    /// Display form
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }

    /// Parse the display form
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "A+" => Some(Self::APlus),
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            "F" => Some(Self::F),
            _ => None,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bounded window of logged sets
///
/// The sets of a session are not stored on it: they are exactly the user's
/// `SetEntry` records with timestamps in `[started_at, ended_at)`, or
/// `[started_at, now)` while the session is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier
    pub id: Uuid,
    /// Owner
    pub user_id: UserId,
    /// Plan day this session was opened under, if the day had one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_label: Option<String>,
    /// Start of the window
    pub started_at: DateTime<Utc>,
    /// End of the window; absent while open
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    /// Grade, assigned on close
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<Grade>,
    /// Total volume, recorded on close for rolling averages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_volume: Option<f64>,
}

impl Session {
    /// Open a new session
    #[must_use]
    pub fn open(user_id: UserId, day_label: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            day_label,
            started_at: now,
            ended_at: None,
            grade: None,
            total_volume: None,
        }
    }

    /// Whether the session is still open
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Whether a timestamp falls within the session window
    #[must_use]
    pub fn contains(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let end = self.ended_at.unwrap_or(now);
        timestamp >= self.started_at && timestamp < end
    }

    /// Close the session with its grade and volume
    #[must_use]
    pub fn closed(mut self, now: DateTime<Utc>, grade: Grade, total_volume: f64) -> Self {
        self.ended_at = Some(now);
        self.grade = Some(grade);
        self.total_volume = Some(total_volume);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_grade_order_and_display() {
        assert!(Grade::APlus < Grade::A);
        assert!(Grade::D < Grade::F);
        assert_eq!(Grade::APlus.to_string(), "A+");
        assert_eq!(Grade::parse("A+"), Some(Grade::APlus));
        assert_eq!(Grade::parse("E"), None);
    }

    #[test]
    fn test_window_is_half_open() {
        let start = Utc::now();
        let session = Session::open(UserId::from("u1"), None, start);
        let end = start + Duration::minutes(60);
        let closed = session.closed(end, Grade::A, 1000.0);
        assert!(closed.contains(start, end));
        assert!(closed.contains(end - Duration::seconds(1), end));
        assert!(!closed.contains(end, end + Duration::minutes(5)));
        assert!(!closed.contains(start - Duration::seconds(1), end));
    }
}
