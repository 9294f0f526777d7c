// ABOUTME: Core types and constants for the Vyayamam workout coaching core
// ABOUTME: Foundation crate with error handling, the training data model, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Vyayamam Core
//!
//! Foundation crate providing shared types for the chat-driven strength coach.
//! This crate is designed to change infrequently, enabling incremental
//! compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and typed command failures
//! - **models**: Exercises, workout plans, logged sets, sessions, and readiness logs
//! - **constants**: Validation limits and service identifiers

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data model (Exercise, `WorkoutPlan`, `SetEntry`, Session, `ReadinessLog`)
pub mod models;
