// ABOUTME: Strength-training intelligence engines for the Vyayamam coach
// ABOUTME: Metrics, progressive overload recommendations, session grading, and summaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Vyayamam Intelligence
//!
//! Pure computations over a user's logged sets. Nothing in this crate touches
//! storage, the network, or the clock; callers pass history slices and the
//! current time in, which keeps every engine deterministic and testable.
//!
//! ## Modules
//!
//! - **metrics**: e1RM, personal records, volume aggregates, consistency
//! - **`recommendation_engine`**: next-set weight and rep suggestions
//! - **`session_grader`**: letter grade from plan coverage and volume history
//! - **insights**: data digests for the language-model collaborator
//! - **config**: tunable overload and grading values

/// Tunable configuration for the engines
pub mod config;

/// Training data digests for coaching prompts
pub mod insights;

/// Strength metrics over set history
pub mod metrics;

/// Progressive overload recommendations
pub mod recommendation_engine;

/// Session grading
pub mod session_grader;

pub use config::intelligence::{
    ConfigError, GradeThreshold, GradingConfig, IntelligenceConfig, OverloadConfig,
};
pub use insights::{
    build_session_recap, build_training_summary, SessionRecap, SummaryInput, TrainingSummary,
};
pub use metrics::{estimated_one_rep_max, personal_record, Consistency, ExerciseStats};
pub use recommendation_engine::{Progression, Recommendation, RecommendationEngine};
pub use session_grader::{GradeReport, SessionGrader};
