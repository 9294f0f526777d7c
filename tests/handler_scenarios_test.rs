// ABOUTME: End-to-end message handling scenarios over an in-memory store
// ABOUTME: Covers set logging, implicit sessions, next, grading, readiness, and storage failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use common::{at, memory_handler, monday_morning, set_at, success, sunday_morning, user};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;
use vyayamam::catalog::ExerciseCatalog;
use vyayamam::config::PlanStore;
use vyayamam::database::{InMemoryStore, SetQuery, WorkoutStore};
use vyayamam::errors::{AppError, AppResult, ParseField, ResolutionError};
use vyayamam::handler::{FailureReply, MessageHandler, Reply, ResponsePayload};
use vyayamam::session::session_window;
use vyayamam_core::models::{Grade, ReadinessLog, Session, SetEntry, UserId};
use vyayamam_intelligence::Progression;

#[tokio::test]
async fn test_smith_incline_scenario_logs_set_with_e1rm() {
    let (handler, store) = memory_handler();
    let alice = user("alice");

    let reply = handler
        .handle_at(&alice, "smith incline 120 8 rpe 7", monday_morning())
        .await;
    let ResponsePayload::SetLogged(logged) = success(reply) else {
        panic!("expected a logged set");
    };

    assert_eq!(logged.set.exercise, "Smith Machine Incline Press");
    assert!((logged.set.weight - 120.0).abs() < f64::EPSILON);
    assert_eq!(logged.set.reps, 8);
    assert_eq!(logged.set.rpe, Some(7.0));
    assert!((logged.e1rm - 152.0).abs() < 1e-9);
    assert!(logged.new_record);
    assert_eq!(logged.set_index, 1);
    assert_eq!(logged.target_sets, Some(4));

    let stored = store.query_sets(&alice, &SetQuery::all()).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, logged.set.id);
}

#[tokio::test]
async fn test_logging_without_start_opens_session_containing_the_set() {
    let (handler, store) = memory_handler();
    let bob = user("bob");

    let reply = handler
        .handle_at(&bob, "db rows 30 10", monday_morning())
        .await;
    let ResponsePayload::SetLogged(logged) = success(reply) else {
        panic!("expected a logged set");
    };
    assert!(logged.session_opened);
    assert_eq!(logged.matched_from.as_deref(), Some("db rows"));

    let open = store.open_session(&bob).await.unwrap().expect("open session");
    assert_eq!(open.day_label.as_deref(), Some("Push A"));
    let in_window = store.query_sets(&bob, &session_window(&open)).await.unwrap();
    assert_eq!(in_window.len(), 1);
    assert_eq!(in_window[0].exercise, "Dumbbell Rows");
    assert_eq!(handler.sessions().len(), 1);
}

#[tokio::test]
async fn test_double_start_leaves_one_open_session() {
    let (handler, store) = memory_handler();
    let carol = user("carol");
    let now = monday_morning();

    let first = success(handler.handle_at(&carol, "/start", now).await);
    let ResponsePayload::SessionStarted { day_label, first } = first else {
        panic!("expected a started session");
    };
    assert_eq!(day_label.as_deref(), Some("Push A"));
    let first = first.expect("first planned exercise");
    assert_eq!(first.exercise, "Smith Machine Incline Press");
    assert_eq!(first.progression, Progression::NoHistory);

    let second = success(handler.handle_at(&carol, "/start", at(now, 1)).await);
    assert!(matches!(second, ResponsePayload::SessionAlreadyOpen { .. }));

    let sessions = store.recent_sessions(&carol, 10).await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert!(sessions[0].is_open());
}

#[tokio::test]
async fn test_consecutive_sets_count_up_and_prompt_next() {
    let (handler, _store) = memory_handler();
    let dave = user("dave");
    let start = monday_morning();

    let mut last = None;
    for (minute, text) in [
        (0, "face pulls 15 15"),
        (2, "face pulls 15 15"),
        (4, "cable face pulls 17.5 12"),
    ] {
        let reply = handler.handle_at(&dave, text, at(start, minute)).await;
        last = Some(success(reply));
    }
    let Some(ResponsePayload::SetLogged(logged)) = last else {
        panic!("expected a logged set");
    };
    assert_eq!(logged.set_index, 3);
    // Cable Face Pulls is planned on Pull A, not today's Push A
    assert_eq!(logged.target_sets, None);
    assert!(logged.new_record);

    let reply = handler
        .handle_at(&dave, "dumbbell shoulder press 20 12", at(start, 6))
        .await;
    let ResponsePayload::SetLogged(logged) = success(reply) else {
        panic!("expected a logged set");
    };
    assert_eq!(logged.set_index, 1);
    assert_eq!(logged.target_sets, Some(3));
}

#[tokio::test]
async fn test_next_without_session_on_rest_day_changes_nothing() {
    let (handler, store) = memory_handler();
    let erin = user("erin");

    let reply = handler.handle_at(&erin, "next", sunday_morning()).await;
    assert_eq!(
        success(reply),
        ResponsePayload::NothingPlanned {
            session_open: false
        }
    );
    assert!(store.open_session(&erin).await.unwrap().is_none());
    assert!(store.recent_sessions(&erin, 5).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_next_follows_plan_order_and_finishes_day() {
    let (handler, _store) = memory_handler();
    let finn = user("finn");
    let start = monday_morning();

    let reply = handler.handle_at(&finn, "next", start).await;
    let ResponsePayload::NextExercise {
        recommendation,
        session_open,
        day_label,
    } = success(reply)
    else {
        panic!("expected a next exercise");
    };
    assert_eq!(recommendation.exercise, "Smith Machine Incline Press");
    assert!(!session_open);
    assert_eq!(day_label, "Push A");

    success(handler.handle_at(&finn, "tricep pushdowns 25 12", at(start, 1)).await);
    let reply = handler.handle_at(&finn, "whats next", at(start, 2)).await;
    assert_eq!(
        success(reply),
        ResponsePayload::DayComplete {
            day_label: "Push A".to_owned()
        }
    );

    success(handler.handle_at(&finn, "side raises 8 15", at(start, 3)).await);
    let reply = handler.handle_at(&finn, "next exercise", at(start, 4)).await;
    let ResponsePayload::NextExercise { recommendation, .. } = success(reply) else {
        panic!("expected a next exercise");
    };
    assert_eq!(recommendation.exercise, "Cable Tricep Pushdowns");
    assert_eq!(recommendation.progression, Progression::IncreaseWeight);
    assert_eq!(recommendation.suggested_weight, Some(27.5));
}

#[tokio::test]
async fn test_met_target_last_session_suggests_increase() {
    let (handler, _store) = memory_handler();
    let gina = user("gina");
    let last_week = monday_morning();
    let this_week = last_week + Duration::days(7);

    success(handler.handle_at(&gina, "smith incline 100 10", last_week).await);
    success(handler.handle_at(&gina, "/end", at(last_week, 30)).await);
    success(handler.handle_at(&gina, "smith incline 100 10", this_week).await);
    success(handler.handle_at(&gina, "/end", at(this_week, 30)).await);

    let next_week = this_week + Duration::days(7);
    let reply = handler.handle_at(&gina, "/start", next_week).await;
    let ResponsePayload::SessionStarted { first, .. } = success(reply) else {
        panic!("expected a started session");
    };
    let recommendation = first.expect("recommendation");
    assert_eq!(recommendation.progression, Progression::IncreaseWeight);
    assert_eq!(recommendation.suggested_weight, Some(102.5));
    assert_eq!(recommendation.personal_record.map(|pr| pr.reps), Some(10));
    let e1rm = recommendation.best_e1rm.expect("e1rm");
    assert!((e1rm - 100.0 * (1.0 + 10.0 / 30.0)).abs() < 1e-9);
}

#[tokio::test]
async fn test_second_session_on_one_date_drives_the_suggestion() {
    let (handler, _store) = memory_handler();
    let hugo = user("hugo");
    let morning = monday_morning();
    let evening = morning + Duration::hours(9);

    success(handler.handle_at(&hugo, "smith incline 120 6", morning).await);
    success(handler.handle_at(&hugo, "/end", at(morning, 30)).await);
    success(handler.handle_at(&hugo, "smith incline 100 10", evening).await);
    success(handler.handle_at(&hugo, "/end", at(evening, 30)).await);

    let reply = handler
        .handle_at(&hugo, "/start", morning + Duration::days(7))
        .await;
    let ResponsePayload::SessionStarted { first, .. } = success(reply) else {
        panic!("expected a started session");
    };
    let recommendation = first.expect("recommendation");
    assert_eq!(recommendation.last_top_set.map(|set| set.weight), Some(100.0));
    assert_eq!(recommendation.progression, Progression::IncreaseWeight);
    assert_eq!(recommendation.suggested_weight, Some(102.5));
    assert_eq!(recommendation.personal_record.map(|pr| pr.weight), Some(120.0));
}

#[tokio::test]
async fn test_end_with_zero_sets_grades_f() {
    let (handler, store) = memory_handler();
    let hank = user("hank");
    let start = monday_morning();

    success(handler.handle_at(&hank, "/start", start).await);
    let reply = handler.handle_at(&hank, "/end", at(start, 5)).await;
    let ResponsePayload::SessionEnded(ended) = success(reply) else {
        panic!("expected an ended session");
    };
    assert_eq!(ended.report.grade, Grade::F);
    assert_eq!(ended.report.total_sets, 0);
    assert_eq!(ended.duration_minutes, 5);
    assert!(ended.summary.text.starts_with("Session complete: grade F"));

    assert!(store.open_session(&hank).await.unwrap().is_none());
    let closed = store.recent_sessions(&hank, 1).await.unwrap();
    assert_eq!(closed[0].grade, Some(Grade::F));

    let again = handler.handle_at(&hank, "done", at(start, 6)).await;
    assert_eq!(success(again), ResponsePayload::NoOpenSession);
}

#[tokio::test]
async fn test_full_day_grades_against_rolling_average() {
    let (handler, store) = memory_handler();
    let ivy = user("ivy");
    let start = monday_morning();

    let day = [
        (0, "smith incline 60 10"),
        (3, "db shoulder press 20 12"),
        (6, "cable fly 15 15"),
        (9, "db lat raises 8 15"),
        (12, "tricep pushdowns 25 15"),
    ];
    for (minute, text) in day {
        success(handler.handle_at(&ivy, text, at(start, minute)).await);
    }
    let reply = handler.handle_at(&ivy, "end workout", at(start, 40)).await;
    let ResponsePayload::SessionEnded(ended) = success(reply) else {
        panic!("expected an ended session");
    };
    assert_eq!(ended.day_label.as_deref(), Some("Push A"));
    assert_eq!(ended.report.covered_exercises, 5);
    assert!((ended.report.coverage - 1.0).abs() < f64::EPSILON);
    assert_eq!(ended.report.rolling_average, None);
    // Without prior sessions the volume ratio is 1.0, one step short of A+
    assert_eq!(ended.report.grade, Grade::A);
    assert_eq!(ended.records.len(), 5);

    let closed = store.recent_sessions(&ivy, 1).await.unwrap();
    let volume = closed[0].total_volume.expect("volume recorded");
    assert!((volume - ended.report.total_volume).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_list_shows_progress_and_catalog() {
    let (handler, _store) = memory_handler();
    let jack = user("jack");
    let start = monday_morning();

    success(handler.handle_at(&jack, "smith incline 60 10", start).await);
    success(handler.handle_at(&jack, "smith incline 60 9", at(start, 2)).await);

    let ResponsePayload::PlanListing(listing) =
        success(handler.handle_at(&jack, "/list", at(start, 3)).await)
    else {
        panic!("expected a plan listing");
    };
    assert_eq!(listing.day_label.as_deref(), Some("Push A"));
    assert_eq!(listing.items.len(), 5);
    assert_eq!(listing.items[0].logged_sets, 2);
    assert_eq!(listing.items[1].logged_sets, 0);

    let ResponsePayload::CatalogListing(groups) =
        success(handler.handle_at(&jack, "/list all", at(start, 4)).await)
    else {
        panic!("expected a catalog listing");
    };
    let total: usize = groups.iter().map(|g| g.exercises.len()).sum();
    assert_eq!(total, 30);
}

#[tokio::test]
async fn test_readiness_second_log_same_day_overwrites() {
    let (handler, store) = memory_handler();
    let kim = user("kim");
    let start = monday_morning();

    success(handler.handle_at(&kim, "/sleep 6", start).await);
    success(handler.handle_at(&kim, "/stress 4", at(start, 1)).await);
    let reply = handler.handle_at(&kim, "/sleep 7.5", at(start, 2)).await;
    let ResponsePayload::ReadinessLogged { log, .. } = success(reply) else {
        panic!("expected a readiness log");
    };
    assert_eq!(log.sleep, Some(7.5));
    assert_eq!(log.stress, Some(4.0));

    let date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
    let stored: ReadinessLog = store.get_readiness(&kim, date).await.unwrap().unwrap();
    assert_eq!(stored.sleep, Some(7.5));
    assert_eq!(stored.soreness, None);
}

#[tokio::test]
async fn test_failures_do_not_mutate_state() {
    let (handler, store) = memory_handler();
    let lee = user("lee");
    let now = monday_morning();

    let reply = handler.handle_at(&lee, "db curls 20 8.5", now).await;
    let Reply::Failure(FailureReply::Parse(error)) = reply else {
        panic!("expected a parse failure");
    };
    assert_eq!(error.field(), Some(ParseField::Reps));

    let reply = handler.handle_at(&lee, "benchpress 100 5", now).await;
    assert!(matches!(
        reply,
        Reply::Failure(FailureReply::Resolution(ResolutionError::NoMatch { .. }))
    ));

    let reply = handler.handle_at(&lee, "/dance", now).await;
    assert!(matches!(
        reply,
        Reply::Failure(FailureReply::Unrecognized { .. })
    ));

    assert!(store.open_session(&lee).await.unwrap().is_none());
    assert!(store.query_sets(&lee, &SetQuery::all()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_help_is_state_independent() {
    let (handler, _store) = memory_handler();
    let reply = handler.handle_at(&user("mo"), "/help", monday_morning()).await;
    assert_eq!(success(reply), ResponsePayload::Help);
}

#[tokio::test]
async fn test_context_rehydrates_from_store() {
    let store = Arc::new(InMemoryStore::new());
    let nia = user("nia");
    let start = monday_morning();
    let session = Session::open(nia.clone(), Some("Push A".to_owned()), start);
    store.upsert_session(&session).await.unwrap();
    store
        .append_set(&set_at(&nia, "Cable Crossover", 15.0, 15, at(start, 1)))
        .await
        .unwrap();

    let handler = MessageHandler::new(
        ExerciseCatalog::default_catalog(),
        PlanStore::with_default_plan(),
        Arc::clone(&store) as Arc<dyn WorkoutStore>,
    );
    let reply = handler.handle_at(&nia, "crossovers 15 15", at(start, 3)).await;
    let ResponsePayload::SetLogged(logged) = success(reply) else {
        panic!("expected a logged set");
    };
    assert!(!logged.session_opened);
    assert_eq!(logged.set_index, 2);

    let reply = handler.handle_at(&nia, "next", at(start, 4)).await;
    let ResponsePayload::NextExercise { recommendation, .. } = success(reply) else {
        panic!("expected a next exercise");
    };
    assert_eq!(recommendation.exercise, "Dumbbell Lateral Raises");
}

/// Store whose set writes or set reads fail while a switch is on
#[derive(Default)]
struct FlakyStore {
    inner: InMemoryStore,
    fail_appends: AtomicBool,
    fail_set_reads: AtomicBool,
}

impl FlakyStore {
    fn check(switch: &AtomicBool) -> AppResult<()> {
        if switch.load(Ordering::SeqCst) {
            return Err(AppError::database("disk unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl WorkoutStore for FlakyStore {
    async fn migrate(&self) -> AppResult<()> {
        self.inner.migrate().await
    }

    async fn append_set(&self, set: &SetEntry) -> AppResult<()> {
        Self::check(&self.fail_appends)?;
        self.inner.append_set(set).await
    }

    async fn record_set(&self, opened: Option<&Session>, set: &SetEntry) -> AppResult<()> {
        Self::check(&self.fail_appends)?;
        self.inner.record_set(opened, set).await
    }

    async fn get_set(&self, user_id: &UserId, id: Uuid) -> AppResult<Option<SetEntry>> {
        self.inner.get_set(user_id, id).await
    }

    async fn query_sets(&self, user_id: &UserId, query: &SetQuery) -> AppResult<Vec<SetEntry>> {
        Self::check(&self.fail_set_reads)?;
        self.inner.query_sets(user_id, query).await
    }

    async fn upsert_session(&self, session: &Session) -> AppResult<()> {
        self.inner.upsert_session(session).await
    }

    async fn get_session(&self, user_id: &UserId, id: Uuid) -> AppResult<Option<Session>> {
        self.inner.get_session(user_id, id).await
    }

    async fn open_session(&self, user_id: &UserId) -> AppResult<Option<Session>> {
        self.inner.open_session(user_id).await
    }

    async fn session_at(&self, user_id: &UserId, at: DateTime<Utc>) -> AppResult<Option<Session>> {
        self.inner.session_at(user_id, at).await
    }

    async fn recent_sessions(&self, user_id: &UserId, limit: usize) -> AppResult<Vec<Session>> {
        self.inner.recent_sessions(user_id, limit).await
    }

    async fn closed_sessions_for_day(
        &self,
        user_id: &UserId,
        day_label: &str,
        limit: usize,
    ) -> AppResult<Vec<Session>> {
        self.inner
            .closed_sessions_for_day(user_id, day_label, limit)
            .await
    }

    async fn upsert_readiness(&self, log: &ReadinessLog) -> AppResult<()> {
        self.inner.upsert_readiness(log).await
    }

    async fn get_readiness(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> AppResult<Option<ReadinessLog>> {
        self.inner.get_readiness(user_id, date).await
    }
}

fn flaky_handler() -> (MessageHandler, Arc<FlakyStore>) {
    common::init_test_logging();
    let store = Arc::new(FlakyStore::default());
    let handler = MessageHandler::new(
        ExerciseCatalog::default_catalog(),
        PlanStore::with_default_plan(),
        Arc::clone(&store) as Arc<dyn WorkoutStore>,
    );
    (handler, store)
}

#[tokio::test]
async fn test_storage_failure_is_reported_and_nothing_is_recorded() {
    let (handler, store) = flaky_handler();
    let omar = user("omar");
    let start = monday_morning();

    success(handler.handle_at(&omar, "/start", start).await);
    success(handler.handle_at(&omar, "cable fly 15 12", at(start, 1)).await);

    store.fail_appends.store(true, Ordering::SeqCst);
    let reply = handler.handle_at(&omar, "cable fly 15 12", at(start, 2)).await;
    assert_eq!(
        reply,
        Reply::Failure(FailureReply::Storage {
            retryable: true,
            message: "disk unavailable".to_owned(),
        })
    );
    assert!(handler.sessions().is_empty());

    store.fail_appends.store(false, Ordering::SeqCst);
    let reply = handler.handle_at(&omar, "cable fly 15 12", at(start, 3)).await;
    let ResponsePayload::SetLogged(logged) = success(reply) else {
        panic!("expected a logged set");
    };
    assert_eq!(logged.set_index, 2);
    let sets = store.query_sets(&omar, &SetQuery::all()).await.unwrap();
    assert_eq!(sets.len(), 2);
}

#[tokio::test]
async fn test_failed_first_set_does_not_leave_an_open_session() {
    let (handler, store) = flaky_handler();
    let pia = user("pia");
    let start = monday_morning();

    store.fail_appends.store(true, Ordering::SeqCst);
    let reply = handler.handle_at(&pia, "cable fly 15 12", start).await;
    assert!(matches!(
        reply,
        Reply::Failure(FailureReply::Storage { retryable: true, .. })
    ));
    assert!(store.open_session(&pia).await.unwrap().is_none());
    assert!(store.recent_sessions(&pia, 10).await.unwrap().is_empty());

    store.fail_appends.store(false, Ordering::SeqCst);
    let reply = handler.handle_at(&pia, "cable fly 15 12", at(start, 1)).await;
    let ResponsePayload::SetLogged(logged) = success(reply) else {
        panic!("expected a logged set");
    };
    assert!(logged.session_opened);
    assert_eq!(logged.set_index, 1);
    let open = store.open_session(&pia).await.unwrap().unwrap();
    let sets = store.query_sets(&pia, &session_window(&open)).await.unwrap();
    assert_eq!(sets, vec![logged.set]);
}

#[tokio::test]
async fn test_failed_start_does_not_open_a_session() {
    let (handler, store) = flaky_handler();
    let quinn = user("quinn");
    let start = monday_morning();

    store.fail_set_reads.store(true, Ordering::SeqCst);
    let reply = handler.handle_at(&quinn, "/start", start).await;
    assert!(matches!(
        reply,
        Reply::Failure(FailureReply::Storage { retryable: true, .. })
    ));
    assert!(store.open_session(&quinn).await.unwrap().is_none());

    store.fail_set_reads.store(false, Ordering::SeqCst);
    let reply = handler.handle_at(&quinn, "/start", at(start, 1)).await;
    let ResponsePayload::SessionStarted { day_label, first } = success(reply) else {
        panic!("expected a started session");
    };
    assert_eq!(day_label.as_deref(), Some("Push A"));
    assert!(first.is_some());
    assert_eq!(store.recent_sessions(&quinn, 10).await.unwrap().len(), 1);
}
