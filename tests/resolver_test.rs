// ABOUTME: Exercise resolver tests against the built-in catalog and small custom catalogs
// ABOUTME: Covers exact aliases, typo tolerance, abbreviations, ambiguity, and suggestions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use vyayamam::catalog::ExerciseCatalog;
use vyayamam::errors::ResolutionError;
use vyayamam::resolver::{ExerciseResolver, ACCEPT_THRESHOLD};
use vyayamam_core::models::{Exercise, MuscleGroup};

fn default_resolver() -> ExerciseResolver {
    common::init_test_logging();
    ExerciseResolver::new(&ExerciseCatalog::default_catalog())
}

#[test]
fn test_every_canonical_name_resolves_to_itself() {
    let catalog = ExerciseCatalog::default_catalog();
    let resolver = ExerciseResolver::new(&catalog);

    for exercise in catalog.iter() {
        let resolved = resolver.resolve(&exercise.name).unwrap();
        assert_eq!(resolved.exercise.name, exercise.name);
        assert!(resolved.exact);
        assert!((resolved.score - 1.0).abs() < f64::EPSILON);

        let shouted = resolver.resolve(&exercise.name.to_uppercase()).unwrap();
        assert_eq!(shouted.exercise.name, exercise.name);
    }
}

#[test]
fn test_every_alias_is_an_exact_match() {
    let catalog = ExerciseCatalog::default_catalog();
    let resolver = ExerciseResolver::new(&catalog);

    for exercise in catalog.iter() {
        for alias in &exercise.aliases {
            let resolved = resolver.resolve(alias).unwrap();
            assert_eq!(resolved.exercise.name, exercise.name, "alias {alias}");
            assert!(resolved.exact);
        }
    }
}

#[test]
fn test_common_shorthand() {
    let resolver = default_resolver();
    let cases = [
        ("smith incline", "Smith Machine Incline Press"),
        ("cable row", "Seated Cable Rows"),
        ("rdl", "Dumbbell RDLs"),
        ("bss", "Bulgarian Split Squats"),
        ("pull ups", "Pull-ups"),
    ];
    for (phrase, expected) in cases {
        let resolved = resolver.resolve(phrase).unwrap();
        assert_eq!(resolved.exercise.name, expected, "phrase {phrase}");
    }
}

#[test]
fn test_abbreviation_and_spacing_typos() {
    let resolver = default_resolver();

    let resolved = resolver.resolve("db shoulderpress").unwrap();
    assert_eq!(resolved.exercise.name, "Dumbbell Shoulder Press");
    assert!(!resolved.exact);
    assert!(resolved.score >= ACCEPT_THRESHOLD);

    let resolved = resolver.resolve("lat pulldwons").unwrap();
    assert_eq!(resolved.exercise.name, "Lat Pulldowns");
    assert!(!resolved.exact);
    assert!(resolved.score >= ACCEPT_THRESHOLD);
}

#[test]
fn test_unknown_exercise_is_no_match_with_bounded_suggestions() {
    let resolver = default_resolver();

    let error = resolver.resolve("benchpress").unwrap_err();
    let ResolutionError::NoMatch { query, suggestions } = &error else {
        panic!("expected no match, got {error:?}");
    };
    assert_eq!(query, "benchpress");
    assert!(suggestions.len() <= 3);

    let error = resolver.resolve("   ").unwrap_err();
    assert!(error.candidates().is_empty());
}

#[test]
fn test_equal_scores_are_ambiguous_in_catalog_order() {
    let catalog = ExerciseCatalog::new(vec![
        Exercise::new("Cable Row", MuscleGroup::Back),
        Exercise::new("Cable Fly", MuscleGroup::Chest),
    ])
    .unwrap();
    let resolver = ExerciseResolver::new(&catalog).with_thresholds(0.7, 0.02);

    let error = resolver.resolve("cable").unwrap_err();
    assert_eq!(
        error,
        ResolutionError::Ambiguous {
            query: "cable".to_owned(),
            candidates: vec!["Cable Row".to_owned(), "Cable Fly".to_owned()],
        }
    );

    // The default threshold rejects the same phrase outright
    let strict = ExerciseResolver::new(&catalog);
    assert!(matches!(
        strict.resolve("cable"),
        Err(ResolutionError::NoMatch { .. })
    ));
}

#[test]
fn test_generic_phrases_are_ambiguous() {
    let resolver = default_resolver();
    let cases: [(&str, &[&str]); 3] = [
        (
            "press",
            &[
                "Smith Machine Incline Press",
                "Dumbbell Shoulder Press",
                "Leg Press Machine",
                "Machine Chest Press",
                "Smith Machine Shoulder Press",
            ],
        ),
        ("curls", &["Dumbbell Bicep Curls", "Hammer Curls", "Hamstring Curls"]),
        ("tricep", &["Cable Tricep Pushdowns", "Overhead Cable Tricep Extensions"]),
    ];
    for (phrase, expected) in cases {
        let error = resolver.resolve(phrase).unwrap_err();
        let ResolutionError::Ambiguous { query, candidates } = &error else {
            panic!("expected {phrase} to be ambiguous, got {error:?}");
        };
        assert_eq!(query, phrase);
        let mut sorted = candidates.clone();
        sorted.sort();
        let mut wanted: Vec<String> = expected.iter().map(|&name| name.to_owned()).collect();
        wanted.sort();
        assert_eq!(sorted, wanted, "phrase {phrase}");
    }
}

#[test]
fn test_reordered_name_picks_its_exercise() {
    let resolver = default_resolver();

    // Seated Dumbbell Lateral Raises also contains every word
    let resolved = resolver.resolve("raises lateral dumbbell").unwrap();
    assert_eq!(resolved.exercise.name, "Dumbbell Lateral Raises");
    assert!(!resolved.exact);
}

#[test]
fn test_resolution_is_deterministic() {
    let resolver = default_resolver();
    let phrases = ["db rows", "smith incline", "lat pulldwons", "benchpress", "cable"];
    for phrase in phrases {
        let first = resolver.resolve(phrase).map(|r| (r.exercise.name.clone(), r.exact));
        for _ in 0..5 {
            let again = resolver.resolve(phrase).map(|r| (r.exercise.name.clone(), r.exact));
            assert_eq!(first, again, "phrase {phrase}");
        }
    }
}

#[test]
fn test_score_is_best_over_name_and_aliases() {
    let catalog = ExerciseCatalog::default_catalog();
    let resolver = ExerciseResolver::new(&catalog);
    let rows = catalog.get("Seated Cable Rows").unwrap();

    assert!((resolver.score("cable row", rows) - 1.0).abs() < f64::EPSILON);
    assert!(resolver.score("hammer curls", rows) < ACCEPT_THRESHOLD);
}
