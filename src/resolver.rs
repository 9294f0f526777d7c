// ABOUTME: Fuzzy exercise resolver mapping free-text phrases to catalog entries
// ABOUTME: Exact names and aliases short-circuit; otherwise a deterministic similarity score decides
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Exercise Resolver
//!
//! Scoring works on normalized text (lowercase, punctuation stripped,
//! whitespace collapsed) with common gym abbreviations expanded
//! (`db` → `dumbbell`). Each catalog name and alias is scored two ways and
//! the better one wins:
//!
//! - **compact**: normalized Levenshtein similarity with all spaces removed,
//!   which absorbs run-together words ("shoulderpress")
//! - **token**: symmetric token coverage, where each token is matched to its
//!   best counterpart by Jaro-Winkler similarity and a shared prefix of three
//!   or more characters counts as [`PREFIX_SCORE`]; this absorbs reordering
//!   and typos
//!
//! An exercise's score is the best over its name and aliases. Below
//! [`ACCEPT_THRESHOLD`] the phrase does not resolve. Above it, the phrase is
//! ambiguous when:
//!
//! - several exercises contain every word of it, exactly or as a prefix
//!   ("press", "curls"), and none is named by exactly those words; or
//! - the runner-up is within [`AMBIGUITY_EPSILON`] of the winner.

use crate::catalog::ExerciseCatalog;
use crate::errors::ResolutionError;
use std::iter;
use strsim::{jaro_winkler, normalized_levenshtein};
use tracing::debug;
use vyayamam_core::models::Exercise;

/// Lowest score accepted as a match
pub const ACCEPT_THRESHOLD: f64 = 0.80;

/// Scores this close to the best are treated as ties
pub const AMBIGUITY_EPSILON: f64 = 0.02;

/// Token similarity when one token is a prefix of the other
pub const PREFIX_SCORE: f64 = 0.95;

/// Shortest prefix that counts for [`PREFIX_SCORE`]
const MIN_PREFIX_LEN: usize = 3;

/// Lowest score offered back to the user as a suggestion
const SUGGESTION_FLOOR: f64 = 0.5;

/// Suggestions returned with a `NoMatch`
const MAX_SUGGESTIONS: usize = 3;

/// Abbreviations users type for equipment and movement words
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("db", "dumbbell"),
    ("dbs", "dumbbell"),
    ("kb", "kettlebell"),
    ("bb", "barbell"),
    ("ext", "extension"),
    ("ohp", "overhead press"),
];

/// Lowercase, drop punctuation, and collapse whitespace
///
/// Hyphens, slashes, and underscores separate words; other punctuation is
/// removed so "what's" and "whats" compare equal.
#[must_use]
pub fn normalize(text: &str) -> String {
    let mapped: String = text
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c.to_ascii_lowercase())
            } else if c.is_whitespace() || matches!(c, '-' | '/' | '_') {
                Some(' ')
            } else {
                None
            }
        })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized tokens with abbreviations expanded
fn expanded_tokens(normalized: &str) -> Vec<String> {
    normalized
        .split_whitespace()
        .flat_map(|token| {
            ABBREVIATIONS
                .iter()
                .find(|(short, _)| *short == token)
                .map_or(token, |(_, long)| *long)
                .split_whitespace()
        })
        .map(str::to_owned)
        .collect()
}

/// Pre-processed text of a phrase or of one catalog name/alias
#[derive(Debug, Clone)]
struct Prepared {
    normalized: String,
    tokens: Vec<String>,
    compact: String,
}

impl Prepared {
    fn new(text: &str) -> Self {
        let normalized = normalize(text);
        let tokens = expanded_tokens(&normalized);
        let compact = tokens.concat();
        Self {
            normalized,
            tokens,
            compact,
        }
    }

    fn forms(exercise: &Exercise) -> Vec<Self> {
        iter::once(exercise.name.as_str())
            .chain(exercise.aliases.iter().map(String::as_str))
            .map(Self::new)
            .collect()
    }
}

fn token_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let shared_prefix = a.starts_with(b) || b.starts_with(a);
    if shared_prefix && a.len().min(b.len()) >= MIN_PREFIX_LEN {
        PREFIX_SCORE
    } else {
        jaro_winkler(a, b)
    }
}

/// Mean over `from` of each token's best similarity in `to`
fn coverage(from: &[String], to: &[String]) -> f64 {
    if from.is_empty() || to.is_empty() {
        return 0.0;
    }
    let total: f64 = from
        .iter()
        .map(|token| {
            to.iter()
                .map(|other| token_similarity(token, other))
                .fold(0.0, f64::max)
        })
        .sum();
    total / from.len() as f64
}

/// Whether every token of `from` appears in `to`, exactly or as a prefix
fn covers(from: &[String], to: &[String]) -> bool {
    !from.is_empty()
        && from.iter().all(|token| {
            to.iter()
                .any(|other| token_similarity(token, other) >= PREFIX_SCORE)
        })
}

/// How completely a phrase spells out one exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Containment {
    /// Some query word is missing from every name and alias
    Partial,
    /// A name or alias contains every query word
    Contains,
    /// A name or alias has exactly the query's words, in any order
    Names,
}

fn containment(query: &Prepared, forms: &[Prepared]) -> Containment {
    forms
        .iter()
        .filter(|form| covers(&query.tokens, &form.tokens))
        .fold(Containment::Partial, |best, form| {
            if covers(&form.tokens, &query.tokens) {
                Containment::Names
            } else if best == Containment::Partial {
                Containment::Contains
            } else {
                best
            }
        })
}

fn similarity(query: &Prepared, candidate: &Prepared) -> f64 {
    if query.normalized.is_empty() || candidate.normalized.is_empty() {
        return 0.0;
    }
    if query.normalized == candidate.normalized || query.compact == candidate.compact {
        return 1.0;
    }
    let compact = normalized_levenshtein(&query.compact, &candidate.compact);
    let token = (coverage(&query.tokens, &candidate.tokens)
        + coverage(&candidate.tokens, &query.tokens))
        / 2.0;
    compact.max(token)
}

/// A phrase pinned to one catalog entry
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedExercise<'a> {
    /// Matched catalog entry
    pub exercise: &'a Exercise,
    /// Similarity score in `[0, 1]`
    pub score: f64,
    /// Whether the phrase was exactly a name or alias
    pub exact: bool,
}

/// Outcome of [`ExerciseResolver::resolve`]
pub type Resolution<'a> = Result<ResolvedExercise<'a>, ResolutionError>;

/// Deterministic fuzzy resolver over a fixed catalog
#[derive(Debug, Clone)]
pub struct ExerciseResolver {
    exercises: Vec<Exercise>,
    forms: Vec<Vec<Prepared>>,
    accept_threshold: f64,
    ambiguity_epsilon: f64,
}

impl ExerciseResolver {
    /// Index every name and alias in the catalog
    #[must_use]
    pub fn new(catalog: &ExerciseCatalog) -> Self {
        let exercises: Vec<Exercise> = catalog.iter().cloned().collect();
        let forms = exercises.iter().map(Prepared::forms).collect();
        Self {
            exercises,
            forms,
            accept_threshold: ACCEPT_THRESHOLD,
            ambiguity_epsilon: AMBIGUITY_EPSILON,
        }
    }

    /// Override the acceptance threshold and tie epsilon
    #[must_use]
    pub const fn with_thresholds(mut self, accept_threshold: f64, ambiguity_epsilon: f64) -> Self {
        self.accept_threshold = accept_threshold;
        self.ambiguity_epsilon = ambiguity_epsilon;
        self
    }

    /// Acceptance threshold in use
    #[must_use]
    pub const fn accept_threshold(&self) -> f64 {
        self.accept_threshold
    }

    /// Similarity of a phrase to one exercise, best over its name and aliases
    #[must_use]
    pub fn score(&self, phrase: &str, exercise: &Exercise) -> f64 {
        let query = Prepared::new(phrase);
        let indexed = self
            .exercises
            .iter()
            .position(|known| known == exercise)
            .map(|position| self.forms[position].clone());
        indexed
            .unwrap_or_else(|| Prepared::forms(exercise))
            .iter()
            .map(|form| similarity(&query, form))
            .fold(0.0, f64::max)
    }

    /// Resolve a phrase to a single catalog entry
    ///
    /// # Errors
    ///
    /// Returns `NoMatch` when nothing reaches the acceptance threshold and
    /// `Ambiguous` when the best scores are within the tie epsilon
    pub fn resolve(&self, phrase: &str) -> Resolution<'_> {
        let query = Prepared::new(phrase);
        if query.normalized.is_empty() {
            return Err(ResolutionError::NoMatch {
                query: phrase.trim().to_owned(),
                suggestions: Vec::new(),
            });
        }

        let exact: Vec<usize> = self
            .forms
            .iter()
            .enumerate()
            .filter(|(_, forms)| forms.iter().any(|form| form.normalized == query.normalized))
            .map(|(position, _)| position)
            .collect();
        match exact.as_slice() {
            [only] => {
                return Ok(ResolvedExercise {
                    exercise: &self.exercises[*only],
                    score: 1.0,
                    exact: true,
                })
            }
            [] => {}
            several => {
                return Err(ResolutionError::Ambiguous {
                    query: phrase.trim().to_owned(),
                    candidates: several
                        .iter()
                        .map(|&position| self.exercises[position].name.clone())
                        .collect(),
                })
            }
        }

        let ranked = self.rank(&query);
        let Some(&(best, best_score)) = ranked.first() else {
            return Err(ResolutionError::NoMatch {
                query: phrase.trim().to_owned(),
                suggestions: Vec::new(),
            });
        };

        debug!(
            query = %query.normalized,
            best = %self.exercises[best].name,
            score = best_score,
            "Ranked exercise candidates"
        );

        if best_score < self.accept_threshold {
            return Err(ResolutionError::NoMatch {
                query: phrase.trim().to_owned(),
                suggestions: ranked
                    .iter()
                    .take_while(|(_, score)| *score >= SUGGESTION_FLOOR)
                    .take(MAX_SUGGESTIONS)
                    .map(|&(position, _)| self.exercises[position].name.clone())
                    .collect(),
            });
        }

        // A generic phrase must not silently pick whichever name is shortest
        let containing: Vec<(usize, f64, Containment)> = ranked
            .iter()
            .map(|&(position, score)| (position, score, containment(&query, &self.forms[position])))
            .filter(|(_, _, kind)| *kind != Containment::Partial)
            .collect();
        if containing.len() > 1 {
            let mut named = containing
                .iter()
                .filter(|(_, _, kind)| *kind == Containment::Names);
            return match (named.next(), named.next()) {
                (Some(&(position, score, _)), None) => Ok(ResolvedExercise {
                    exercise: &self.exercises[position],
                    score,
                    exact: false,
                }),
                _ => Err(ResolutionError::Ambiguous {
                    query: phrase.trim().to_owned(),
                    candidates: containing
                        .iter()
                        .map(|&(position, _, _)| self.exercises[position].name.clone())
                        .collect(),
                }),
            };
        }

        let tied: Vec<String> = ranked
            .iter()
            .take_while(|(_, score)| best_score - score <= self.ambiguity_epsilon)
            .map(|&(position, _)| self.exercises[position].name.clone())
            .collect();
        if tied.len() > 1 {
            return Err(ResolutionError::Ambiguous {
                query: phrase.trim().to_owned(),
                candidates: tied,
            });
        }

        Ok(ResolvedExercise {
            exercise: &self.exercises[best],
            score: best_score,
            exact: false,
        })
    }

    /// Catalog positions with their scores, best first, catalog order on ties
    fn rank(&self, query: &Prepared) -> Vec<(usize, f64)> {
        let mut ranked: Vec<(usize, f64)> = self
            .forms
            .iter()
            .enumerate()
            .map(|(position, forms)| {
                let score = forms
                    .iter()
                    .map(|form| similarity(query, form))
                    .fold(0.0, f64::max);
                (position, score)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  What's   NEXT? "), "whats next");
        assert_eq!(normalize("Pull-ups"), "pull ups");
        assert_eq!(normalize("10-12/leg"), "10 12 leg");
    }

    #[test]
    fn test_expanded_tokens() {
        assert_eq!(
            expanded_tokens("db shoulderpress"),
            vec!["dumbbell".to_owned(), "shoulderpress".to_owned()]
        );
        assert_eq!(
            expanded_tokens("ohp"),
            vec!["overhead".to_owned(), "press".to_owned()]
        );
    }

    #[test]
    fn test_containment() {
        let forms = [Prepared::new("Dumbbell Lateral Raises"), Prepared::new("db lat raises")];
        assert_eq!(containment(&Prepared::new("lat raises"), &forms), Containment::Contains);
        assert_eq!(
            containment(&Prepared::new("raises lateral dumbbell"), &forms),
            Containment::Names
        );
        assert_eq!(containment(&Prepared::new("cable raises"), &forms), Containment::Partial);
    }

    #[test]
    fn test_token_similarity_prefix() {
        assert!((token_similarity("inc", "incline") - PREFIX_SCORE).abs() < f64::EPSILON);
        assert!(token_similarity("ab", "abs") < PREFIX_SCORE + f64::EPSILON);
        assert!((token_similarity("row", "row") - 1.0).abs() < f64::EPSILON);
    }
}
