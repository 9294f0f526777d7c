// ABOUTME: Intent parser turning raw chat text into exactly one typed command
// ABOUTME: Handles slash commands, next/done phrasings, and the free-form set-logging grammar
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Intent Parser
//!
//! Priority order, first match wins:
//!
//! 1. A leading `/` selects a named command. Unknown names are unrecognized.
//! 2. `next`, `next exercise`, `what's next` ask for the next exercise;
//!    `done` and `end workout` end the session.
//! 3. `<exercise phrase> <weight> <reps> [rpe <n>] [notes <text>]` logs a set.
//!    The phrase is everything before the first two consecutive numbers.
//! 4. Anything else is unrecognized.
//!
//! Parsing never touches state; failures come back as [`CommandError`] values.

use crate::errors::{CommandError, ParseError, ParseField};
use crate::resolver::{normalize, ExerciseResolver};
use serde::{Deserialize, Serialize};
use vyayamam_core::constants::limits;
use vyayamam_core::models::ReadinessMetric;

/// Which listing `/list` should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListScope {
    /// Today's plan with progress
    Today,
    /// Whole catalog grouped by muscle group
    All,
}

/// A fully resolved set log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetCommand {
    /// Canonical exercise name
    pub exercise: String,
    /// Phrase as typed
    pub query: String,
    /// Resolver score for the phrase
    pub match_score: f64,
    /// Load
    pub weight: f64,
    /// Repetitions
    pub reps: u32,
    /// Optional RPE
    pub rpe: Option<f64>,
    /// Optional note
    pub note: Option<String>,
}

/// Set-logging grammar with the exercise phrase still unresolved
#[derive(Debug, Clone, PartialEq)]
pub struct RawSet {
    /// Text before the weight
    pub phrase: String,
    /// Load
    pub weight: f64,
    /// Repetitions
    pub reps: u32,
    /// Optional RPE
    pub rpe: Option<f64>,
    /// Optional note, truncated to the storage limit
    pub note: Option<String>,
}

/// Everything a chat message can ask for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Log one set
    LogSet(SetCommand),
    /// Suggest the next planned exercise
    Next,
    /// Open a session
    StartSession,
    /// Close and grade the open session
    EndSession,
    /// Free-text question for the coach
    Ask {
        /// Question text
        question: String,
    },
    /// Plan or catalog listing
    List {
        /// Listing scope
        scope: ListScope,
    },
    /// Record one readiness score for today
    LogReadiness {
        /// Score being logged
        metric: ReadinessMetric,
        /// Value as typed
        value: f64,
    },
    /// Command reference
    Help,
    /// Text that matches no grammar
    Unrecognized {
        /// Message as received
        text: String,
    },
}

impl Command {
    /// Short name used in logs
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::LogSet(_) => "log_set",
            Self::Next => "next",
            Self::StartSession => "start",
            Self::EndSession => "end",
            Self::Ask { .. } => "ask",
            Self::List { .. } => "list",
            Self::LogReadiness { .. } => "readiness",
            Self::Help => "help",
            Self::Unrecognized { .. } => "unrecognized",
        }
    }

    /// Whether the command can change session state or persisted data
    #[must_use]
    pub const fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::LogSet(_) | Self::StartSession | Self::EndSession | Self::LogReadiness { .. }
        )
    }
}

/// Maps message text to commands, resolving exercise phrases on the way
#[derive(Debug, Clone)]
pub struct IntentParser {
    resolver: ExerciseResolver,
}

impl IntentParser {
    /// Create a parser over a resolver
    #[must_use]
    pub const fn new(resolver: ExerciseResolver) -> Self {
        Self { resolver }
    }

    /// Resolver in use
    #[must_use]
    pub const fn resolver(&self) -> &ExerciseResolver {
        &self.resolver
    }

    /// Parse one message
    ///
    /// # Errors
    ///
    /// Returns a [`CommandError`] when the set grammar is malformed, a slash
    /// command argument is invalid, or the exercise phrase does not resolve
    pub fn parse(&self, text: &str) -> Result<Command, CommandError> {
        let trimmed = text.trim();
        if let Some(rest) = trimmed.strip_prefix('/') {
            return parse_slash(rest, trimmed).map_err(CommandError::from);
        }

        match normalize(trimmed).as_str() {
            "next" | "next exercise" | "whats next" => return Ok(Command::Next),
            "done" | "end workout" => return Ok(Command::EndSession),
            _ => {}
        }

        let Some(raw) = parse_set(trimmed)? else {
            return Ok(Command::Unrecognized {
                text: trimmed.to_owned(),
            });
        };
        let resolved = self.resolver.resolve(&raw.phrase)?;
        Ok(Command::LogSet(SetCommand {
            exercise: resolved.exercise.name.clone(),
            query: raw.phrase,
            match_score: resolved.score,
            weight: raw.weight,
            reps: raw.reps,
            rpe: raw.rpe,
            note: raw.note,
        }))
    }
}

fn number(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn parse_slash(rest: &str, original: &str) -> Result<Command, ParseError> {
    let mut parts = rest.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default().to_ascii_lowercase();
    let argument = parts.next().map_or("", str::trim);

    let metric = match name.as_str() {
        "start" => return Ok(Command::StartSession),
        "end" => return Ok(Command::EndSession),
        "help" => return Ok(Command::Help),
        "ask" if argument.is_empty() => return Err(ParseError::missing(ParseField::Value)),
        "ask" => {
            return Ok(Command::Ask {
                question: argument.to_owned(),
            })
        }
        "list" => {
            return match argument.to_ascii_lowercase().as_str() {
                "" => Ok(Command::List {
                    scope: ListScope::Today,
                }),
                "all" => Ok(Command::List {
                    scope: ListScope::All,
                }),
                other => Err(ParseError::UnexpectedTrailing {
                    text: other.to_owned(),
                }),
            }
        }
        "sleep" => ReadinessMetric::Sleep,
        "stress" => ReadinessMetric::Stress,
        "soreness" => ReadinessMetric::Soreness,
        _ => {
            return Ok(Command::Unrecognized {
                text: original.to_owned(),
            })
        }
    };

    let mut tokens = argument.split_whitespace();
    let raw = tokens
        .next()
        .ok_or_else(|| ParseError::missing(ParseField::Value))?;
    let value = number(raw)
        .ok_or_else(|| ParseError::invalid(ParseField::Value, raw, "must be a number"))?;
    if !metric.accepts(value) {
        let reason = match metric {
            ReadinessMetric::Sleep => "must be between 0 and 24 hours",
            ReadinessMetric::Stress | ReadinessMetric::Soreness => "must be between 1 and 10",
        };
        return Err(ParseError::invalid(ParseField::Value, raw, reason));
    }
    let trailing: Vec<&str> = tokens.collect();
    if !trailing.is_empty() {
        return Err(ParseError::UnexpectedTrailing {
            text: trailing.join(" "),
        });
    }
    Ok(Command::LogReadiness { metric, value })
}

/// Apply the set-logging grammar without resolving the exercise
///
/// Returns `Ok(None)` when the text contains no numbers at all, meaning it is
/// not an attempt to log a set.
///
/// # Errors
///
/// Returns a [`ParseError`] naming the offending field when numbers are
/// present but the grammar is not satisfied
pub fn parse_set(text: &str) -> Result<Option<RawSet>, ParseError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let pair = tokens
        .windows(2)
        .position(|window| number(window[0]).is_some() && number(window[1]).is_some());

    let Some(start) = pair else {
        return incomplete_set(&tokens);
    };
    if start == 0 {
        return Err(ParseError::missing(ParseField::Exercise));
    }

    let weight = parse_weight(tokens[start])?;
    let reps = parse_reps(tokens[start + 1])?;
    let (rpe, note) = parse_trailing(&tokens[start + 2..])?;

    Ok(Some(RawSet {
        phrase: tokens[..start].join(" "),
        weight,
        reps,
        rpe,
        note,
    }))
}

/// Numbers present but no weight/reps pair
fn incomplete_set(tokens: &[&str]) -> Result<Option<RawSet>, ParseError> {
    let Some(first) = tokens.iter().position(|token| number(token).is_some()) else {
        return Ok(None);
    };
    if first == 0 {
        return Err(ParseError::missing(ParseField::Exercise));
    }
    let previous = tokens[first - 1];
    if previous.chars().any(|c| c.is_ascii_digit()) {
        return Err(ParseError::invalid(
            ParseField::Weight,
            previous,
            "must be a number",
        ));
    }
    match tokens.get(first + 1) {
        None => Err(ParseError::missing(ParseField::Reps)),
        Some(next) => Err(ParseError::invalid(
            ParseField::Reps,
            *next,
            "must be a whole number",
        )),
    }
}

fn parse_weight(raw: &str) -> Result<f64, ParseError> {
    let weight = number(raw)
        .ok_or_else(|| ParseError::invalid(ParseField::Weight, raw, "must be a number"))?;
    if weight < 0.0 {
        return Err(ParseError::invalid(
            ParseField::Weight,
            raw,
            "must not be negative",
        ));
    }
    if weight > limits::MAX_WEIGHT {
        return Err(ParseError::invalid(
            ParseField::Weight,
            raw,
            "is above the supported maximum",
        ));
    }
    Ok(weight)
}

fn parse_reps(raw: &str) -> Result<u32, ParseError> {
    match raw.parse::<u32>() {
        Ok(0) => Err(ParseError::invalid(ParseField::Reps, raw, "must be at least 1")),
        Ok(reps) if reps > limits::MAX_REPS => Err(ParseError::invalid(
            ParseField::Reps,
            raw,
            "is above the supported maximum",
        )),
        Ok(reps) => Ok(reps),
        Err(_) if number(raw).is_some_and(|value| value < 1.0) => {
            Err(ParseError::invalid(ParseField::Reps, raw, "must be at least 1"))
        }
        Err(_) => Err(ParseError::invalid(
            ParseField::Reps,
            raw,
            "must be a whole number",
        )),
    }
}

/// `[rpe <n>] [notes <text>]` after the reps
fn parse_trailing(mut rest: &[&str]) -> Result<(Option<f64>, Option<String>), ParseError> {
    let mut rpe = None;
    while let Some((head, tail)) = rest.split_first() {
        if head.eq_ignore_ascii_case("rpe") && rpe.is_none() {
            let raw = tail
                .first()
                .ok_or_else(|| ParseError::missing(ParseField::Rpe))?;
            let value = number(raw)
                .ok_or_else(|| ParseError::invalid(ParseField::Rpe, *raw, "must be a number"))?;
            if !(limits::RPE_MIN..=limits::RPE_MAX).contains(&value) {
                return Err(ParseError::invalid(
                    ParseField::Rpe,
                    *raw,
                    "must be between 1 and 10",
                ));
            }
            rpe = Some(value);
            rest = &tail[1..];
        } else if head.eq_ignore_ascii_case("notes") || head.eq_ignore_ascii_case("note") {
            if tail.is_empty() {
                return Err(ParseError::missing(ParseField::Notes));
            }
            let note: String = tail.join(" ").chars().take(limits::MAX_NOTE_CHARS).collect();
            return Ok((rpe, Some(note)));
        } else {
            return Err(ParseError::UnexpectedTrailing {
                text: rest.join(" "),
            });
        }
    }
    Ok((rpe, None))
}
