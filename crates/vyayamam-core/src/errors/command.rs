// ABOUTME: Typed failures for interpreting a chat message into a command
// ABOUTME: ParseError for malformed set logs, ResolutionError for unknown or ambiguous exercises
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Command Error Types
//!
//! These failures are recovered locally: the handler answers with a
//! corrective prompt and no state is mutated.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The field of the set-logging grammar a [`ParseError`] refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseField {
    /// Exercise phrase before the numbers
    Exercise,
    /// Weight (first number)
    Weight,
    /// Repetitions (second number)
    Reps,
    /// Value after the `rpe` keyword
    Rpe,
    /// Text after the `notes` keyword
    Notes,
    /// Argument of a slash command
    Value,
}

impl ParseField {
    /// Lowercase name used in messages
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exercise => "exercise",
            Self::Weight => "weight",
            Self::Reps => "reps",
            Self::Rpe => "rpe",
            Self::Notes => "notes",
            Self::Value => "value",
        }
    }
}

impl fmt::Display for ParseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Malformed set-logging grammar or command argument
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A required field was absent
    #[error("missing {field}")]
    Missing {
        /// Field that was absent
        field: ParseField,
    },
    /// A field was present but not acceptable
    #[error("invalid {field} '{value}': {reason}")]
    Invalid {
        /// Offending field
        field: ParseField,
        /// Raw token as typed
        value: String,
        /// Why it was rejected
        reason: &'static str,
    },
    /// Text after the reps that is neither `rpe <n>` nor `notes ...`
    #[error("unexpected text after reps: '{text}'")]
    UnexpectedTrailing {
        /// Unconsumed text
        text: String,
    },
}

impl ParseError {
    /// Create a missing-field error
    #[must_use]
    pub const fn missing(field: ParseField) -> Self {
        Self::Missing { field }
    }

    /// Create an invalid-field error
    #[must_use]
    pub fn invalid(field: ParseField, value: impl Into<String>, reason: &'static str) -> Self {
        Self::Invalid {
            field,
            value: value.into(),
            reason,
        }
    }

    /// The field this error names, if any
    #[must_use]
    pub const fn field(&self) -> Option<ParseField> {
        match self {
            Self::Missing { field } | Self::Invalid { field, .. } => Some(*field),
            Self::UnexpectedTrailing { .. } => None,
        }
    }
}

/// The exercise phrase could not be pinned to one catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// Nothing scored above the acceptance threshold
    #[error("no exercise matches '{query}'")]
    NoMatch {
        /// Phrase as typed
        query: String,
        /// Closest names below the threshold, best first
        suggestions: Vec<String>,
    },
    /// Two or more exercises scored too close to call
    #[error("'{query}' could be {}", .candidates.join(" or "))]
    Ambiguous {
        /// Phrase as typed
        query: String,
        /// Tied canonical names, best first
        candidates: Vec<String>,
    },
}

impl ResolutionError {
    /// Candidate names to offer the user
    #[must_use]
    pub fn candidates(&self) -> &[String] {
        match self {
            Self::NoMatch { suggestions, .. } => suggestions,
            Self::Ambiguous { candidates, .. } => candidates,
        }
    }
}

/// Any failure while turning message text into a command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Grammar or argument failure
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Exercise resolution failure
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_names_field() {
        let error = ParseError::invalid(ParseField::Reps, "8.5", "must be a whole number");
        assert_eq!(error.field(), Some(ParseField::Reps));
        assert_eq!(
            error.to_string(),
            "invalid reps '8.5': must be a whole number"
        );
    }

    #[test]
    fn test_ambiguous_lists_candidates() {
        let error = ResolutionError::Ambiguous {
            query: "cable".into(),
            candidates: vec!["Cable Row".into(), "Cable Fly".into()],
        };
        assert_eq!(error.to_string(), "'cable' could be Cable Row or Cable Fly");
        assert_eq!(error.candidates().len(), 2);
    }
}
