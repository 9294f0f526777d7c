// ABOUTME: Workout plan file tests covering load, reload, and rejection of bad plans
// ABOUTME: A failed reload must leave the previous plan in place
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::Weekday;
use common::{success, sunday_morning, user};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use vyayamam::catalog::ExerciseCatalog;
use vyayamam::config::plan::load_yaml;
use vyayamam::config::PlanStore;
use vyayamam::database::{InMemoryStore, WorkoutStore};
use vyayamam::handler::{MessageHandler, ResponsePayload};
use vyayamam_core::models::RepTarget;

const SUNDAY_PLAN: &str = r#"
days:
  - label: Sunday Arms
    weekday: sun
    exercises:
      - exercise: db curls
        target_sets: 3
        target_reps: "10-15"
        start_weight: 12.5
      - exercise: rope pushdowns
        target_sets: 3
        target_reps: "12"
"#;

fn write_plan(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_plan_file_is_loaded_and_canonicalized() {
    let dir = TempDir::new().unwrap();
    let path = write_plan(&dir, "plan.yaml", SUNDAY_PLAN);
    let catalog = ExerciseCatalog::default_catalog();

    let plan = load_yaml(&path, &catalog).unwrap();
    let day = plan.day_for_weekday(Weekday::Sun).unwrap();
    assert_eq!(day.label, "Sunday Arms");
    assert_eq!(day.exercises[0].exercise, "Dumbbell Bicep Curls");
    assert_eq!(day.exercises[1].exercise, "Cable Tricep Pushdowns");
    assert_eq!(day.exercises[1].target_reps, RepTarget::Exact(12));
    assert!(plan.day_for_weekday(Weekday::Mon).is_none());
}

#[test]
fn test_missing_path_uses_default_plan() {
    let catalog = ExerciseCatalog::default_catalog();
    let store = PlanStore::load(None, &catalog).unwrap();
    assert_eq!(store.current().days.len(), 6);

    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.yaml");
    assert!(PlanStore::load(Some(&missing), &catalog).is_err());
}

#[test]
fn test_failed_reload_keeps_previous_plan() {
    let dir = TempDir::new().unwrap();
    let catalog = ExerciseCatalog::default_catalog();
    let good = write_plan(&dir, "plan.yaml", SUNDAY_PLAN);
    let store = PlanStore::load(Some(&good), &catalog).unwrap();

    let unknown = write_plan(
        &dir,
        "unknown.yaml",
        "days:\n  - label: X\n    exercises:\n      - exercise: Zercher Squat\n        target_sets: 3\n        target_reps: \"5\"\n",
    );
    let error = store.reload(&unknown, &catalog).unwrap_err();
    assert!(error.message.contains("Zercher Squat"));

    let broken = write_plan(&dir, "broken.yaml", "days: [unclosed");
    assert!(store.reload(&broken, &catalog).is_err());

    let current = store.current();
    assert_eq!(current.days.len(), 1);
    assert_eq!(current.days[0].label, "Sunday Arms");
}

#[tokio::test]
async fn test_handler_follows_loaded_plan() {
    common::init_test_logging();
    let dir = TempDir::new().unwrap();
    let catalog = ExerciseCatalog::default_catalog();
    let path = write_plan(&dir, "plan.yaml", SUNDAY_PLAN);
    let plans = PlanStore::load(Some(&path), &catalog).unwrap();
    let store = Arc::new(InMemoryStore::new());
    let handler = MessageHandler::new(catalog, plans, Arc::clone(&store) as Arc<dyn WorkoutStore>);

    let reply = handler.handle_at(&user("ivo"), "next", sunday_morning()).await;
    let ResponsePayload::NextExercise {
        recommendation,
        day_label,
        ..
    } = success(reply)
    else {
        panic!("expected a next exercise");
    };
    assert_eq!(day_label, "Sunday Arms");
    assert_eq!(recommendation.exercise, "Dumbbell Bicep Curls");
    assert_eq!(recommendation.suggested_weight, Some(12.5));
}
