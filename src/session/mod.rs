// ABOUTME: Per-user session state machine tracking the open session and current exercise
// ABOUTME: Transitions are computed purely and applied only after the store has committed them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Session State Machine
//!
//! Each user is in one of two states:
//!
//! - `NoSession`
//! - `Open { session, current_exercise, set_index }`
//!
//! [`SessionMachine`] turns a command into a [`Transition`] without touching
//! the context. The handler persists whatever the transition carries and only
//! then calls [`SessionContext::apply`], so a failed write leaves the context
//! exactly as it was.

mod registry;

pub use registry::SessionRegistry;

use crate::database::SetQuery;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vyayamam_core::models::{PlanDay, PlannedExercise, Session, SetEntry, UserId};

/// Session lifecycle state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    /// No open session
    NoSession,
    /// A session is open
    Open {
        /// The open session record
        session: Session,
        /// Exercise of the most recent set, if any
        current_exercise: Option<String>,
        /// Consecutive sets logged for the current exercise
        set_index: u32,
    },
}

/// Transient per-user context held between messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    user_id: UserId,
    state: SessionState,
}

impl SessionContext {
    /// Fresh context with no open session
    #[must_use]
    pub const fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            state: SessionState::NoSession,
        }
    }

    /// Rebuild a context from the store's open session and the sets inside it
    ///
    /// `session_sets` must be in logging order. The current exercise is the
    /// one of the last set, and the index counts the trailing run of sets for
    /// that exercise.
    #[must_use]
    pub fn rehydrate(user_id: UserId, open: Option<Session>, session_sets: &[SetEntry]) -> Self {
        let Some(session) = open else {
            return Self::new(user_id);
        };
        let current_exercise = session_sets.last().map(|set| set.exercise.clone());
        let set_index = current_exercise.as_deref().map_or(0, |name| {
            session_sets
                .iter()
                .rev()
                .take_while(|set| set.is_for(name))
                .count() as u32
        });
        Self {
            user_id,
            state: SessionState::Open {
                session,
                current_exercise,
                set_index,
            },
        }
    }

    /// Owner of the context
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Whether a session is open
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.state, SessionState::Open { .. })
    }

    /// The open session, if any
    #[must_use]
    pub const fn open_session(&self) -> Option<&Session> {
        match &self.state {
            SessionState::Open { session, .. } => Some(session),
            SessionState::NoSession => None,
        }
    }

    /// Exercise of the most recent set in the open session
    #[must_use]
    pub fn current_exercise(&self) -> Option<&str> {
        match &self.state {
            SessionState::Open {
                current_exercise, ..
            } => current_exercise.as_deref(),
            SessionState::NoSession => None,
        }
    }

    /// Consecutive sets for the current exercise; zero with no session
    #[must_use]
    pub const fn set_index(&self) -> u32 {
        match &self.state {
            SessionState::Open { set_index, .. } => *set_index,
            SessionState::NoSession => 0,
        }
    }

    /// Apply a committed transition
    pub fn apply(&mut self, transition: &Transition) {
        match transition {
            Transition::Open { session, created } => {
                if *created || !self.is_open() {
                    self.state = SessionState::Open {
                        session: session.clone(),
                        current_exercise: None,
                        set_index: 0,
                    };
                }
            }
            Transition::Logged {
                session,
                exercise,
                set_index,
                ..
            } => {
                self.state = SessionState::Open {
                    session: session.clone(),
                    current_exercise: Some(exercise.clone()),
                    set_index: *set_index,
                };
            }
            Transition::Closed { .. } => self.state = SessionState::NoSession,
            Transition::Unchanged => {}
        }
    }
}

/// A state change waiting to be committed
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// `/start`: a session is open afterwards
    Open {
        /// The open session
        session: Session,
        /// False when the session was already open
        created: bool,
    },
    /// A set was logged
    Logged {
        /// Session the set belongs to
        session: Session,
        /// Whether logging opened the session
        session_created: bool,
        /// Canonical exercise name
        exercise: String,
        /// Position of the set in the current run for the exercise
        set_index: u32,
    },
    /// The session was closed and graded
    Closed {
        /// The closed session
        session: Session,
    },
    /// Nothing to commit
    Unchanged,
}

impl Transition {
    /// Session record the store must upsert, if any
    #[must_use]
    pub const fn session_to_persist(&self) -> Option<&Session> {
        match self {
            Self::Open {
                session,
                created: true,
            }
            | Self::Logged {
                session,
                session_created: true,
                ..
            }
            | Self::Closed { session } => Some(session),
            Self::Open { .. } | Self::Logged { .. } | Self::Unchanged => None,
        }
    }
}

/// What `next` points at
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NextStep<'a> {
    /// The exercise to do next
    Planned(&'a PlannedExercise),
    /// The last planned exercise is the current one
    DayComplete,
    /// Nothing is planned today
    NoPlan,
}

/// Pure transition rules
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionMachine;

impl SessionMachine {
    /// `/start`: open a session unless one is already open
    #[must_use]
    pub fn on_start(
        context: &SessionContext,
        day_label: Option<String>,
        now: DateTime<Utc>,
    ) -> Transition {
        match context.open_session() {
            Some(session) => Transition::Open {
                session: session.clone(),
                created: false,
            },
            None => Transition::Open {
                session: Session::open(context.user_id.clone(), day_label, now),
                created: true,
            },
        }
    }

    /// A set for `exercise`; opens a session first when none is open
    #[must_use]
    pub fn on_log(
        context: &SessionContext,
        exercise: &str,
        day_label: Option<String>,
        now: DateTime<Utc>,
    ) -> Transition {
        match &context.state {
            SessionState::Open {
                session,
                current_exercise,
                set_index,
            } => {
                let same = current_exercise
                    .as_deref()
                    .is_some_and(|current| current.eq_ignore_ascii_case(exercise));
                Transition::Logged {
                    session: session.clone(),
                    session_created: false,
                    exercise: exercise.to_owned(),
                    set_index: if same { set_index.saturating_add(1) } else { 1 },
                }
            }
            SessionState::NoSession => Transition::Logged {
                session: Session::open(context.user_id.clone(), day_label, now),
                session_created: true,
                exercise: exercise.to_owned(),
                set_index: 1,
            },
        }
    }

    /// `/end`: the closed session, or `Unchanged` when nothing is open
    ///
    /// `close` receives the open session and returns it closed with its grade.
    pub fn on_end<F>(context: &SessionContext, close: F) -> Transition
    where
        F: FnOnce(&Session) -> Session,
    {
        context
            .open_session()
            .map_or(Transition::Unchanged, |session| Transition::Closed {
                session: close(session),
            })
    }

    /// The planned exercise after the current one on `day`
    #[must_use]
    pub fn next_planned<'a>(context: &SessionContext, day: Option<&'a PlanDay>) -> NextStep<'a> {
        let Some(day) = day.filter(|day| !day.exercises.is_empty()) else {
            return NextStep::NoPlan;
        };
        day.next_after(context.current_exercise())
            .map_or(NextStep::DayComplete, NextStep::Planned)
    }
}

/// Read filter for the sets inside a session's window
///
/// An open session's window runs to the present, so it is left unbounded.
#[must_use]
pub fn session_window(session: &Session) -> SetQuery {
    SetQuery {
        exercise: None,
        from: Some(session.started_at),
        until: session.ended_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use vyayamam_core::models::Grade;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 3, 7, 0, 0).unwrap()
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut context = SessionContext::new(UserId::from("u1"));
        let first = SessionMachine::on_start(&context, Some("Push A".into()), start());
        assert!(first.session_to_persist().is_some());
        context.apply(&first);
        let opened = context.open_session().cloned();

        let second = SessionMachine::on_start(&context, None, start() + Duration::minutes(5));
        assert!(matches!(second, Transition::Open { created: false, .. }));
        assert!(second.session_to_persist().is_none());
        context.apply(&second);
        assert_eq!(context.open_session().cloned(), opened);
    }

    #[test]
    fn test_log_counts_consecutive_sets() {
        let mut context = SessionContext::new(UserId::from("u1"));
        let logged = SessionMachine::on_log(&context, "Squat", None, start());
        assert!(matches!(
            logged,
            Transition::Logged {
                session_created: true,
                set_index: 1,
                ..
            }
        ));
        context.apply(&logged);

        let again = SessionMachine::on_log(&context, "squat", None, start());
        context.apply(&again);
        assert_eq!(context.set_index(), 2);

        let other = SessionMachine::on_log(&context, "Leg Press", None, start());
        context.apply(&other);
        assert_eq!(context.current_exercise(), Some("Leg Press"));
        assert_eq!(context.set_index(), 1);
    }

    #[test]
    fn test_end_without_session_is_unchanged() {
        let context = SessionContext::new(UserId::from("u1"));
        let transition = SessionMachine::on_end(&context, Clone::clone);
        assert_eq!(transition, Transition::Unchanged);
    }

    #[test]
    fn test_end_resets_context() {
        let mut context = SessionContext::new(UserId::from("u1"));
        context.apply(&SessionMachine::on_start(&context, None, start()));
        let end = start() + Duration::hours(1);
        let transition =
            SessionMachine::on_end(&context, |s| s.clone().closed(end, Grade::F, 0.0));
        assert!(transition.session_to_persist().is_some());
        context.apply(&transition);
        assert!(!context.is_open());
        assert_eq!(context.set_index(), 0);
    }

    #[test]
    fn test_rehydrate_counts_trailing_run() {
        let user = UserId::from("u1");
        let session = Session::open(user.clone(), None, start());
        let sets = vec![
            SetEntry::new(user.clone(), "Squat", 100.0, 5, start()),
            SetEntry::new(user.clone(), "Leg Press", 200.0, 10, start()),
            SetEntry::new(user.clone(), "Leg Press", 200.0, 10, start()),
        ];
        let context = SessionContext::rehydrate(user, Some(session), &sets);
        assert_eq!(context.current_exercise(), Some("Leg Press"));
        assert_eq!(context.set_index(), 2);
    }
}
