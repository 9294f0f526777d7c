// ABOUTME: Storage collaborator contract for sets, sessions, and readiness logs
// ABOUTME: Implemented by a SQLite store for persistence and an in-memory store for tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Workout Storage
//!
//! A command either commits its records or fails without a partial write.
//! Most writes touch a single record; a set that opens a session is written
//! together with that session through [`WorkoutStore::record_set`].
//! `SetEntry` rows are append-only. `Session` rows are upserted by id, and at most one row per
//! user may be open. `ReadinessLog` rows are upserted by user and date.

mod memory;
mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use crate::errors::{config_io_error, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;
use vyayamam_core::models::{ReadinessLog, Session, SetEntry, UserId};

/// Range filter for set reads
///
/// `from` is inclusive and `until` exclusive, matching the half-open
/// session window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetQuery {
    /// Canonical exercise name, compared case-insensitively
    pub exercise: Option<String>,
    /// Earliest timestamp included
    pub from: Option<DateTime<Utc>>,
    /// First timestamp excluded
    pub until: Option<DateTime<Utc>>,
}

impl SetQuery {
    /// Every set for the user
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Every set for one exercise
    #[must_use]
    pub fn exercise(name: impl Into<String>) -> Self {
        Self {
            exercise: Some(name.into()),
            ..Self::default()
        }
    }

    /// Sets inside `[from, until)`
    #[must_use]
    pub const fn window(from: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        Self {
            exercise: None,
            from: Some(from),
            until: Some(until),
        }
    }

    /// Sets strictly before `until`
    #[must_use]
    pub const fn before(until: DateTime<Utc>) -> Self {
        Self {
            exercise: None,
            from: None,
            until: Some(until),
        }
    }

    /// Narrow to one exercise
    #[must_use]
    pub fn for_exercise(mut self, name: impl Into<String>) -> Self {
        self.exercise = Some(name.into());
        self
    }

    /// Whether a set satisfies the filter
    #[must_use]
    pub fn matches(&self, set: &SetEntry) -> bool {
        self.exercise.as_deref().is_none_or(|name| set.is_for(name))
            && self.from.is_none_or(|from| set.timestamp >= from)
            && self.until.is_none_or(|until| set.timestamp < until)
    }
}

/// Storage collaborator used by the message handler
#[async_trait]
pub trait WorkoutStore: Send + Sync {
    /// Create the schema if it does not exist
    async fn migrate(&self) -> AppResult<()>;

    /// Append one logged set
    async fn append_set(&self, set: &SetEntry) -> AppResult<()>;

    /// Append a set, first inserting `opened` when logging starts a session
    ///
    /// Both records are written or neither is.
    async fn record_set(&self, opened: Option<&Session>, set: &SetEntry) -> AppResult<()>;

    /// Point read of one set
    async fn get_set(&self, user_id: &UserId, id: Uuid) -> AppResult<Option<SetEntry>>;

    /// Range read ordered by timestamp, then logging order
    async fn query_sets(&self, user_id: &UserId, query: &SetQuery) -> AppResult<Vec<SetEntry>>;

    /// Insert or update a session by id
    ///
    /// Fails if the session is open and the user already has a different
    /// open session.
    async fn upsert_session(&self, session: &Session) -> AppResult<()>;

    /// Point read of one session
    async fn get_session(&self, user_id: &UserId, id: Uuid) -> AppResult<Option<Session>>;

    /// The user's open session, if any
    async fn open_session(&self, user_id: &UserId) -> AppResult<Option<Session>>;

    /// The session whose window holds `at`, if any
    ///
    /// Windows are half-open; an open session extends indefinitely.
    async fn session_at(&self, user_id: &UserId, at: DateTime<Utc>) -> AppResult<Option<Session>>;

    /// Most recently started sessions, newest first
    async fn recent_sessions(&self, user_id: &UserId, limit: usize) -> AppResult<Vec<Session>>;

    /// Closed sessions opened under a day label, most recently ended first
    async fn closed_sessions_for_day(
        &self,
        user_id: &UserId,
        day_label: &str,
        limit: usize,
    ) -> AppResult<Vec<Session>>;

    /// Insert or replace the log for the user and date
    async fn upsert_readiness(&self, log: &ReadinessLog) -> AppResult<()>;

    /// Readiness for one date
    async fn get_readiness(&self, user_id: &UserId, date: NaiveDate)
        -> AppResult<Option<ReadinessLog>>;
}

/// Open the store named by a database URL
///
/// `memory` gives a process-local store; any other URL is opened with
/// `SQLite` and migrated.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrated
pub async fn connect(database_url: &str) -> AppResult<Arc<dyn WorkoutStore>> {
    if database_url == "memory" {
        return Ok(Arc::new(InMemoryStore::new()));
    }
    ensure_parent_dir(database_url)?;
    let store = SqliteStore::new(database_url).await?;
    store.migrate().await?;
    Ok(Arc::new(store))
}

/// Create the directory holding a file-backed `SQLite` database
fn ensure_parent_dir(database_url: &str) -> AppResult<()> {
    let Some(path) = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
    else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return Ok(());
    }
    match Path::new(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .map_err(|e| config_io_error(&format!("Failed to create {}", parent.display()), e)),
        _ => Ok(()),
    }
}
