// ABOUTME: Error types for the application crate, re-exported from vyayamam-core
// ABOUTME: Adds call-site mappings for YAML and HTTP client failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Error Handling
//!
//! The error types are defined in `vyayamam-core` so every crate in the
//! workspace shares one taxonomy. This module re-exports them and adds the
//! conversions for dependencies only the application crate uses.

use std::io;

pub use vyayamam_core::errors::{
    AppError, AppResult, CommandError, ErrorCode, ParseError, ParseField, ResolutionError,
};

/// Map a YAML decoding failure into a configuration error
#[must_use]
pub fn yaml_error(context: &str, error: serde_yaml::Error) -> AppError {
    AppError::new(ErrorCode::ConfigInvalid, format!("{context}: {error}")).with_source(error)
}

/// Map an I/O failure while reading configuration
#[must_use]
pub fn config_io_error(context: &str, error: io::Error) -> AppError {
    AppError::config(format!("{context}: {error}")).with_source(error)
}
