// ABOUTME: In-memory workout store for tests and ephemeral runs
// ABOUTME: Keeps every table in one tokio RwLock; contents vanish with the process
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{SetQuery, WorkoutStore};
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;
use vyayamam_core::models::{ReadinessLog, Session, SetEntry, UserId};

#[derive(Debug, Default)]
struct Tables {
    sets: Vec<SetEntry>,
    sessions: Vec<Session>,
    readiness: HashMap<(UserId, NaiveDate), ReadinessLog>,
}

impl Tables {
    /// Reject an open session when the user already has a different one
    fn check_open_slot(&self, session: &Session) -> AppResult<()> {
        let conflicting = session.is_open()
            && self.sessions.iter().any(|existing| {
                existing.user_id == session.user_id && existing.is_open() && existing.id != session.id
            });
        if conflicting {
            return Err(AppError::invalid_input(format!(
                "User {} already has an open session",
                session.user_id
            )));
        }
        Ok(())
    }

    fn put_session(&mut self, session: &Session) {
        match self.sessions.iter_mut().find(|existing| existing.id == session.id) {
            Some(existing) => *existing = session.clone(),
            None => self.sessions.push(session.clone()),
        }
    }
}

/// Process-local store
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkoutStore for InMemoryStore {
    async fn migrate(&self) -> AppResult<()> {
        Ok(())
    }

    async fn append_set(&self, set: &SetEntry) -> AppResult<()> {
        self.record_set(None, set).await
    }

    async fn record_set(&self, opened: Option<&Session>, set: &SetEntry) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.sets.iter().any(|existing| existing.id == set.id) {
            return Err(AppError::invalid_input(format!(
                "Set {} already recorded",
                set.id
            )));
        }
        if let Some(session) = opened {
            tables.check_open_slot(session)?;
            tables.put_session(session);
        }
        tables.sets.push(set.clone());
        Ok(())
    }

    async fn get_set(&self, user_id: &UserId, id: Uuid) -> AppResult<Option<SetEntry>> {
        let tables = self.tables.read().await;
        Ok(tables
            .sets
            .iter()
            .find(|set| set.id == id && &set.user_id == user_id)
            .cloned())
    }

    async fn query_sets(&self, user_id: &UserId, query: &SetQuery) -> AppResult<Vec<SetEntry>> {
        let tables = self.tables.read().await;
        let mut sets: Vec<SetEntry> = tables
            .sets
            .iter()
            .filter(|set| &set.user_id == user_id && query.matches(set))
            .cloned()
            .collect();
        // Stable sort keeps append order for equal timestamps
        sets.sort_by_key(|set| set.timestamp);
        Ok(sets)
    }

    async fn upsert_session(&self, session: &Session) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables.check_open_slot(session)?;
        tables.put_session(session);
        Ok(())
    }

    async fn get_session(&self, user_id: &UserId, id: Uuid) -> AppResult<Option<Session>> {
        let tables = self.tables.read().await;
        Ok(tables
            .sessions
            .iter()
            .find(|session| session.id == id && &session.user_id == user_id)
            .cloned())
    }

    async fn open_session(&self, user_id: &UserId) -> AppResult<Option<Session>> {
        let tables = self.tables.read().await;
        Ok(tables
            .sessions
            .iter()
            .find(|session| &session.user_id == user_id && session.is_open())
            .cloned())
    }

    async fn session_at(&self, user_id: &UserId, at: DateTime<Utc>) -> AppResult<Option<Session>> {
        let tables = self.tables.read().await;
        Ok(tables
            .sessions
            .iter()
            .filter(|session| {
                &session.user_id == user_id
                    && session.started_at <= at
                    && session.ended_at.is_none_or(|end| at < end)
            })
            .max_by_key(|session| session.started_at)
            .cloned())
    }

    async fn recent_sessions(&self, user_id: &UserId, limit: usize) -> AppResult<Vec<Session>> {
        let tables = self.tables.read().await;
        let mut sessions: Vec<Session> = tables
            .sessions
            .iter()
            .filter(|session| &session.user_id == user_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        sessions.truncate(limit);
        Ok(sessions)
    }

    async fn closed_sessions_for_day(
        &self,
        user_id: &UserId,
        day_label: &str,
        limit: usize,
    ) -> AppResult<Vec<Session>> {
        let tables = self.tables.read().await;
        let mut sessions: Vec<Session> = tables
            .sessions
            .iter()
            .filter(|session| {
                &session.user_id == user_id
                    && !session.is_open()
                    && session
                        .day_label
                        .as_deref()
                        .is_some_and(|label| label.eq_ignore_ascii_case(day_label))
            })
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.ended_at.cmp(&a.ended_at));
        sessions.truncate(limit);
        Ok(sessions)
    }

    async fn upsert_readiness(&self, log: &ReadinessLog) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .readiness
            .insert((log.user_id.clone(), log.date), log.clone());
        Ok(())
    }

    async fn get_readiness(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> AppResult<Option<ReadinessLog>> {
        let tables = self.tables.read().await;
        Ok(tables.readiness.get(&(user_id.clone(), date)).cloned())
    }
}
