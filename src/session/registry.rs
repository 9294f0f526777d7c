// ABOUTME: Registry of per-user session contexts keyed by user id
// ABOUTME: Rehydrates a user's context from the store on first touch and after an eviction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{session_window, SessionContext};
use crate::database::WorkoutStore;
use crate::errors::AppResult;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;
use vyayamam_core::models::UserId;

/// Sharded map of session contexts
///
/// Contexts are cloned out for the duration of a command and written back by
/// [`SessionRegistry::commit`]; no shard guard is held across an await.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    contexts: Arc<DashMap<UserId, SessionContext>>,
}

impl SessionRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current context for a user, loading it from the store if absent
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read
    pub async fn context(
        &self,
        user_id: &UserId,
        store: &dyn WorkoutStore,
    ) -> AppResult<SessionContext> {
        if let Some(context) = self.contexts.get(user_id) {
            return Ok(context.value().clone());
        }

        let open = store.open_session(user_id).await?;
        let sets = match &open {
            Some(session) => store.query_sets(user_id, &session_window(session)).await?,
            None => Vec::new(),
        };
        let context = SessionContext::rehydrate(user_id.clone(), open, &sets);
        debug!(
            user.id = %user_id,
            open = context.is_open(),
            sets = sets.len(),
            "Rehydrated session context"
        );

        self.contexts.insert(user_id.clone(), context.clone());
        Ok(context)
    }

    /// Store a context after its transition has been committed
    pub fn commit(&self, context: SessionContext) {
        self.contexts.insert(context.user_id().clone(), context);
    }

    /// Forget a user's context so the next message reloads it
    pub fn evict(&self, user_id: &UserId) {
        self.contexts.remove(user_id);
    }

    /// Number of users with a cached context
    #[must_use]
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// Whether no context is cached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}
