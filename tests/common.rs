// ABOUTME: Shared test utilities and fixtures for integration tests
// ABOUTME: Provides quiet logging, fixed clocks, in-memory handlers, and a scripted language model
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `vyayamam`

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use tokio::time;
use tracing::Level;
use vyayamam::catalog::ExerciseCatalog;
use vyayamam::config::PlanStore;
use vyayamam::database::{InMemoryStore, WorkoutStore};
use vyayamam::errors::{AppError, AppResult};
use vyayamam::handler::{MessageHandler, Reply, ResponsePayload};
use vyayamam::llm::{ChatRequest, ChatResponse, LlmProvider};
use vyayamam_core::models::{SetEntry, UserId};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            Ok("WARN" | "ERROR") | _ => Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// Monday 3 March 2025, 07:00 UTC; the default plan's "Push A" day
pub fn monday_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 3, 7, 0, 0).unwrap()
}

/// Sunday 2 March 2025, 07:00 UTC; a rest day in the default plan
pub fn sunday_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 2, 7, 0, 0).unwrap()
}

/// `minutes` after `start`
pub fn at(start: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    start + Duration::minutes(minutes)
}

pub fn user(id: &str) -> UserId {
    UserId::from(id)
}

pub fn set_at(
    user_id: &UserId,
    exercise: &str,
    weight: f64,
    reps: u32,
    timestamp: DateTime<Utc>,
) -> SetEntry {
    SetEntry::new(user_id.clone(), exercise, weight, reps, timestamp)
}

/// Handler over a fresh in-memory store with the built-in catalog and plan
pub fn memory_handler() -> (MessageHandler, Arc<InMemoryStore>) {
    init_test_logging();
    let store = Arc::new(InMemoryStore::new());
    let handler = MessageHandler::new(
        ExerciseCatalog::default_catalog(),
        PlanStore::with_default_plan(),
        Arc::clone(&store) as Arc<dyn WorkoutStore>,
    );
    (handler, store)
}

/// Payload of a successful reply
pub fn success(reply: Reply) -> ResponsePayload {
    match reply {
        Reply::Success(payload) => payload,
        Reply::Failure(failure) => panic!("expected success, got {failure:?}"),
    }
}

/// How a scripted model behaves
#[derive(Debug, Clone)]
pub enum Script {
    /// Answer with fixed text
    Answer(String),
    /// Fail every call
    Fail,
    /// Sleep longer than any test timeout
    Hang,
}

/// Language model stand-in that records how often it was called
#[derive(Debug)]
pub struct ScriptedProvider {
    script: Script,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn display_name(&self) -> &'static str {
        "Scripted"
    }

    fn default_model(&self) -> &str {
        "scripted-1"
    }

    async fn complete(&self, _request: &ChatRequest) -> AppResult<ChatResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Answer(text) => Ok(ChatResponse {
                content: text.clone(),
                model: "scripted-1".to_owned(),
                usage: None,
                finish_reason: Some("stop".to_owned()),
            }),
            Script::Fail => Err(AppError::external_service("Scripted", "model crashed")),
            Script::Hang => {
                time::sleep(time::Duration::from_secs(3600)).await;
                Err(AppError::internal("unreachable"))
            }
        }
    }

    async fn health_check(&self) -> AppResult<bool> {
        match &self.script {
            Script::Answer(_) => Ok(true),
            Script::Fail => Err(AppError::external_service("Scripted", "connection refused")),
            Script::Hang => {
                time::sleep(time::Duration::from_secs(3600)).await;
                Ok(true)
            }
        }
    }
}
