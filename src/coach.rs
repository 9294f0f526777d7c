// ABOUTME: Coaching collaborator wrapping the language model with a timeout and canned fallbacks
// ABOUTME: Answers /ask questions and writes end-of-session summaries without touching session state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Coach
//!
//! Every call is bounded by a timeout. A disabled, failing, or slow model
//! never surfaces as an error: the caller always gets text to send, tagged
//! with where it came from.

use crate::errors::{AppError, AppResult};
use crate::llm::prompts::{analysis_messages, session_summary_messages};
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};
use crate::logging::AppLogger;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{debug, warn};
use vyayamam_intelligence::{SessionRecap, TrainingSummary};

/// Reply when there is no history to analyze
pub const NOT_ENOUGH_DATA: &str =
    "I don't have enough training history to answer that yet. Log a few sessions and ask again.";

/// Reply when the model fails or times out
pub const ANALYSIS_UNAVAILABLE: &str =
    "Analysis is unavailable right now. Your data is safe; please try again later.";

const SERVICE: &str = "LocalLLM";
const ANALYSIS_MAX_TOKENS: u32 = 600;
const SUMMARY_MAX_TOKENS: u32 = 200;
const TEMPERATURE: f32 = 0.4;

/// Where an answer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    /// Generated by the language model
    Model,
    /// Canned text
    Fallback,
}

/// Text to send back to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachAnswer {
    /// Message body
    pub text: String,
    /// Origin of the text
    pub source: AnswerSource,
}

impl CoachAnswer {
    fn model(text: String) -> Self {
        Self {
            text,
            source: AnswerSource::Model,
        }
    }

    fn fallback(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: AnswerSource::Fallback,
        }
    }
}

/// Language-model coach
#[derive(Clone)]
pub struct Coach {
    provider: Option<Arc<dyn LlmProvider>>,
    timeout: Duration,
}

impl Coach {
    /// Coach backed by a provider
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        Self {
            provider: Some(provider),
            timeout,
        }
    }

    /// Coach that always answers with fallbacks
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            provider: None,
            timeout: Duration::ZERO,
        }
    }

    /// Whether a model is configured
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Whether the configured model answers, or `None` when coaching is disabled
    ///
    /// Errors and timeouts count as unreachable.
    pub async fn check_model(&self) -> Option<bool> {
        let provider = self.provider.as_ref()?;
        let healthy = match time::timeout(self.timeout, provider.health_check()).await {
            Ok(Ok(healthy)) => healthy,
            Ok(Err(e)) => {
                warn!(provider = provider.name(), error = %e, "Coaching model health check failed");
                false
            }
            Err(_) => {
                warn!(
                    provider = provider.name(),
                    timeout_secs = self.timeout.as_secs(),
                    "Coaching model health check timed out"
                );
                false
            }
        };
        Some(healthy)
    }

    /// Answer a free-text question from the user's training summary
    pub async fn analyze(&self, question: &str, summary: &TrainingSummary) -> CoachAnswer {
        if summary.is_empty() {
            return CoachAnswer::fallback(NOT_ENOUGH_DATA);
        }
        let summary_json = match summary.to_prompt_json() {
            Ok(json) => json,
            Err(e) => {
                AppLogger::log_analysis_fallback("analysis", &e.to_string());
                return CoachAnswer::fallback(ANALYSIS_UNAVAILABLE);
            }
        };

        match self
            .complete(analysis_messages(question, &summary_json), ANALYSIS_MAX_TOKENS)
            .await
        {
            Ok(text) => CoachAnswer::model(text),
            Err(e) => {
                AppLogger::log_analysis_fallback("analysis", &e.to_string());
                CoachAnswer::fallback(ANALYSIS_UNAVAILABLE)
            }
        }
    }

    /// Short encouraging summary of a closed session
    pub async fn summarize_session(&self, recap: &SessionRecap) -> CoachAnswer {
        let generated = match recap.to_prompt_json() {
            Ok(recap_json) => {
                self.complete(session_summary_messages(&recap_json), SUMMARY_MAX_TOKENS)
                    .await
            }
            Err(e) => Err(AppError::from(e)),
        };
        match generated {
            Ok(text) => CoachAnswer::model(text),
            Err(e) => {
                AppLogger::log_analysis_fallback("session_summary", &e.to_string());
                CoachAnswer::fallback(fallback_session_summary(recap))
            }
        }
    }

    async fn complete(&self, messages: Vec<ChatMessage>, max_tokens: u32) -> AppResult<String> {
        let Some(provider) = &self.provider else {
            return Err(AppError::external_service(SERVICE, "coaching model is disabled"));
        };
        let request = ChatRequest::new(messages)
            .with_temperature(TEMPERATURE)
            .with_max_tokens(max_tokens);

        let response = time::timeout(self.timeout, provider.complete(&request))
            .await
            .map_err(|_| AppError::timeout(provider.display_name(), self.timeout.as_secs()))??;

        let text = response.content.trim();
        if text.is_empty() {
            return Err(AppError::external_service(SERVICE, "model returned an empty answer"));
        }
        debug!(
            provider = provider.name(),
            model = %response.model,
            chars = text.len(),
            "Coaching model answered"
        );
        Ok(text.to_owned())
    }
}

/// Deterministic summary used when the model is unavailable
#[must_use]
pub fn fallback_session_summary(recap: &SessionRecap) -> String {
    let report = &recap.grade;
    let mut text = format!(
        "Session complete: grade {}, {} sets across {} exercises.",
        report.grade,
        report.total_sets,
        recap.exercises.len()
    );
    let records: Vec<&str> = recap.record_exercises().collect();
    if !records.is_empty() {
        let _ = write!(text, " New PR on {}!", records.join(", "));
    }
    text.push_str(" Rest up and come back stronger.");
    text
}
