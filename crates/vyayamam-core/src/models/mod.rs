// ABOUTME: Core data models for logged training: exercises, plans, sets, sessions, readiness
// ABOUTME: Re-exports model types so crates depend on one path
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! Reference data (`Exercise`, `WorkoutPlan`) is immutable after load.
//! `SetEntry` is append-only. `Session` and `ReadinessLog` are the only
//! records that get upserted.

mod exercise;
mod plan;
mod readiness;
mod session;
mod set_entry;

pub use exercise::{Exercise, ExerciseUnit, MuscleGroup};
pub use plan::{PlanDay, PlannedExercise, RepTarget, WorkoutPlan};
pub use readiness::{ReadinessLog, ReadinessMetric};
pub use session::{Grade, Session};
pub use set_entry::{SetEntry, UserId};
