// ABOUTME: Configuration management module for environment settings and the workout plan
// ABOUTME: Handles environment-derived server settings and YAML plan loading with catalog validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module
//!
//! - **Environment**: storage location, timezone, display units, and the
//!   language-model collaborator, all read from environment variables
//! - **Plan**: the workout plan, loaded from YAML or built in, and swapped
//!   atomically on reload

/// Environment and server configuration
pub mod environment;

/// Workout plan loading, validation, and reload
pub mod plan;

pub use environment::{LlmSettings, ServerConfig, WeightUnit};
pub use plan::PlanStore;
