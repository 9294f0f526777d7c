// ABOUTME: Message handler driving one chat message from raw text to a typed reply
// ABOUTME: Parses, advances the session state machine, commits to storage, then consults the coach
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Message Handler
//!
//! One inbound message is one unit of work for one user:
//!
//! 1. The [`IntentParser`] turns the text into a [`Command`]. Parse and
//!    resolution failures become replies immediately; nothing is mutated.
//! 2. The user's [`SessionContext`] is loaded (or rehydrated from the store)
//!    and a [`Transition`] is computed by the pure [`SessionMachine`].
//! 3. Every read a command needs happens first. The records the transition
//!    needs are then written, a set and the session it opens together in
//!    one store call. Only when the writes succeed is the new context
//!    committed to the registry; on a storage failure the context is evicted
//!    so the next message reloads it.
//! 4. Language-model calls happen last, after the commit, so their latency
//!    or failure never touches session state.
//!
//! Every path returns a [`Reply`]; no error escapes to the transport.

use crate::catalog::ExerciseCatalog;
use crate::coach::{Coach, CoachAnswer};
use crate::config::{PlanStore, ServerConfig, WeightUnit};
use crate::database::{self, SetQuery, WorkoutStore};
use crate::errors::{AppError, AppResult, CommandError, ParseError, ResolutionError};
use crate::llm::OpenAiCompatibleProvider;
use crate::logging::AppLogger;
use crate::parser::{Command, IntentParser, ListScope, SetCommand};
use crate::resolver::ExerciseResolver;
use crate::session::{
    session_window, NextStep, SessionContext, SessionMachine, SessionRegistry, Transition,
};
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Offset, Utc, Weekday};
use std::sync::Arc;
use tracing::{debug, field, instrument, Span};
use vyayamam_core::constants::windows;
use vyayamam_core::models::{
    MuscleGroup, PlanDay, PlannedExercise, ReadinessLog, ReadinessMetric, RepTarget, SetEntry,
    UserId, WorkoutPlan,
};
use vyayamam_intelligence::insights::beats_record;
use vyayamam_intelligence::{
    build_session_recap, build_training_summary, estimated_one_rep_max, personal_record,
    GradeReport, IntelligenceConfig, Recommendation, RecommendationEngine, SessionGrader,
    SummaryInput,
};

/// Outcome of one message
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The command ran
    Success(ResponsePayload),
    /// The command was rejected or could not be applied
    Failure(FailureReply),
}

impl Reply {
    /// Whether the command ran
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Why a command did not run
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReply {
    /// Malformed set log or command argument
    Parse(ParseError),
    /// Unknown or ambiguous exercise
    Resolution(ResolutionError),
    /// Text matching no grammar
    Unrecognized {
        /// Message as received
        text: String,
    },
    /// The store failed; nothing was written
    Storage {
        /// Whether trying again may succeed
        retryable: bool,
        /// Failure description for logs
        message: String,
    },
}

/// Structured result of a successful command
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    /// A set was appended
    SetLogged(SetLogged),
    /// `/start` opened a session
    SessionStarted {
        /// Plan day the session follows
        day_label: Option<String>,
        /// Suggestion for the first planned exercise
        first: Option<Recommendation>,
    },
    /// `/start` while a session is open
    SessionAlreadyOpen {
        /// Plan day of the open session
        day_label: Option<String>,
        /// When it was opened
        started_at: DateTime<Utc>,
    },
    /// `next` found a planned exercise
    NextExercise {
        /// Suggested load and reps
        recommendation: Recommendation,
        /// Plan day the suggestion comes from
        day_label: String,
        /// Whether a session is open
        session_open: bool,
    },
    /// `next` after the last planned exercise
    DayComplete {
        /// Plan day that is finished
        day_label: String,
    },
    /// `next` with nothing planned today
    NothingPlanned {
        /// Whether a session is open
        session_open: bool,
    },
    /// `/end` closed and graded the session
    SessionEnded(SessionEnded),
    /// `/end` with no open session
    NoOpenSession,
    /// `/ask` answer
    Analysis(CoachAnswer),
    /// `/list`
    PlanListing(PlanListing),
    /// `/list all`
    CatalogListing(Vec<CatalogGroup>),
    /// A readiness score was stored
    ReadinessLogged {
        /// Score that was logged
        metric: ReadinessMetric,
        /// Value stored
        value: f64,
        /// The whole log for the day after the update
        log: ReadinessLog,
    },
    /// `/help`
    Help,
}

/// Details of a logged set
#[derive(Debug, Clone, PartialEq)]
pub struct SetLogged {
    /// The stored entry
    pub set: SetEntry,
    /// Position of the set in the current run for the exercise
    pub set_index: u32,
    /// Planned sets for the exercise, if it is in the session's plan day
    pub target_sets: Option<u32>,
    /// Whether logging opened the session
    pub session_opened: bool,
    /// Phrase the user typed when it was not an exact catalog name
    pub matched_from: Option<String>,
    /// Whether this set is the new personal record
    pub new_record: bool,
    /// Estimated one-rep max of this set
    pub e1rm: f64,
    /// All-time best estimated one-rep max including this set
    pub best_e1rm: f64,
    /// All-time personal record including this set
    pub personal_record: SetEntry,
}

impl SetLogged {
    /// Whether the planned set count has been reached
    #[must_use]
    pub fn target_reached(&self) -> bool {
        self.target_sets
            .is_some_and(|target| self.set_index >= target)
    }
}

/// Details of a closed session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEnded {
    /// Plan day the session followed
    pub day_label: Option<String>,
    /// Minutes between open and close
    pub duration_minutes: i64,
    /// Grade and the numbers behind it
    pub report: GradeReport,
    /// Exercises whose record was broken in this session
    pub records: Vec<String>,
    /// Coach summary, generated or canned
    pub summary: CoachAnswer,
}

/// Today's plan with progress
#[derive(Debug, Clone, PartialEq)]
pub struct PlanListing {
    /// User's local weekday
    pub weekday: Weekday,
    /// Plan day, if one is scheduled
    pub day_label: Option<String>,
    /// Planned exercises in order
    pub items: Vec<PlanProgress>,
}

/// One planned exercise and how many sets were logged for it
#[derive(Debug, Clone, PartialEq)]
pub struct PlanProgress {
    /// Canonical exercise name
    pub exercise: String,
    /// Planned working sets
    pub target_sets: u32,
    /// Planned reps
    pub target_reps: RepTarget,
    /// Sets logged in the open session
    pub logged_sets: usize,
}

/// Catalog entries sharing a primary muscle group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogGroup {
    /// Muscle group
    pub group: MuscleGroup,
    /// Canonical names in catalog order
    pub exercises: Vec<String>,
}

/// Routes chat messages through parsing, session state, storage, and coaching
pub struct MessageHandler {
    parser: IntentParser,
    catalog: Arc<ExerciseCatalog>,
    plans: Arc<PlanStore>,
    store: Arc<dyn WorkoutStore>,
    sessions: SessionRegistry,
    recommender: RecommendationEngine,
    grader: SessionGrader,
    coach: Coach,
    offset: FixedOffset,
    weight_unit: WeightUnit,
}

impl MessageHandler {
    /// Handler with default tunables, UTC days, kilograms, and no coaching model
    #[must_use]
    pub fn new(catalog: ExerciseCatalog, plans: PlanStore, store: Arc<dyn WorkoutStore>) -> Self {
        let intelligence = IntelligenceConfig::default();
        Self {
            parser: IntentParser::new(ExerciseResolver::new(&catalog)),
            catalog: Arc::new(catalog),
            plans: Arc::new(plans),
            store,
            sessions: SessionRegistry::new(),
            recommender: RecommendationEngine::new(intelligence.overload),
            grader: SessionGrader::new(intelligence.grading),
            coach: Coach::disabled(),
            offset: Utc.fix(),
            weight_unit: WeightUnit::Kg,
        }
    }

    /// Build everything from process configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the plan file is invalid, the store cannot be
    /// opened, or the model client cannot be created
    pub async fn from_config(config: &ServerConfig) -> AppResult<Self> {
        let catalog = ExerciseCatalog::default_catalog();
        let plans = PlanStore::load(config.plan_path.as_deref(), &catalog)?;
        let store = database::connect(&config.database_url).await?;

        let coach = if config.llm.enabled {
            let provider = OpenAiCompatibleProvider::new(config.llm.provider.clone())?;
            Coach::new(Arc::new(provider), config.llm.timeout)
        } else {
            Coach::disabled()
        };

        Ok(Self::new(catalog, plans, store)
            .with_intelligence(config.intelligence.clone())
            .with_coach(coach)
            .with_offset(config.offset())
            .with_weight_unit(config.weight_unit))
    }

    /// Use a coach
    #[must_use]
    pub fn with_coach(mut self, coach: Coach) -> Self {
        self.coach = coach;
        self
    }

    /// Use overload and grading tunables
    #[must_use]
    pub fn with_intelligence(mut self, config: IntelligenceConfig) -> Self {
        self.recommender = RecommendationEngine::new(config.overload);
        self.grader = SessionGrader::new(config.grading);
        self
    }

    /// Offset that decides a user's calendar day
    #[must_use]
    pub const fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Display unit passed to the coach
    #[must_use]
    pub const fn with_weight_unit(mut self, unit: WeightUnit) -> Self {
        self.weight_unit = unit;
        self
    }

    /// Exercise catalog
    #[must_use]
    pub fn catalog(&self) -> &ExerciseCatalog {
        &self.catalog
    }

    /// Coaching collaborator
    #[must_use]
    pub const fn coach(&self) -> &Coach {
        &self.coach
    }

    /// Plan store, for administrative reloads
    #[must_use]
    pub fn plans(&self) -> &PlanStore {
        &self.plans
    }

    /// Storage collaborator
    #[must_use]
    pub fn store(&self) -> &dyn WorkoutStore {
        self.store.as_ref()
    }

    /// Per-user session contexts
    #[must_use]
    pub const fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Handle a message received now
    pub async fn handle(&self, user_id: &UserId, text: &str) -> Reply {
        self.handle_at(user_id, text, Utc::now()).await
    }

    /// Handle a message as if received at `now`
    #[instrument(skip(self, text), fields(user.id = %user_id, command = field::Empty))]
    pub async fn handle_at(&self, user_id: &UserId, text: &str, now: DateTime<Utc>) -> Reply {
        let command = match self.parser.parse(text) {
            Ok(command) => command,
            Err(CommandError::Parse(error)) => {
                debug!(%error, "Message rejected by parser");
                return Reply::Failure(FailureReply::Parse(error));
            }
            Err(CommandError::Resolution(error)) => {
                debug!(%error, "Exercise could not be resolved");
                return Reply::Failure(FailureReply::Resolution(error));
            }
        };

        let kind = command.kind();
        Span::current().record("command", kind);

        match self.execute(user_id, command, now).await {
            Ok(reply) => reply,
            Err(error) => {
                self.sessions.evict(user_id);
                AppLogger::log_storage_failure(user_id, kind, &error.to_string());
                Reply::Failure(FailureReply::Storage {
                    retryable: error.is_retryable(),
                    message: error.message,
                })
            }
        }
    }

    async fn execute(
        &self,
        user_id: &UserId,
        command: Command,
        now: DateTime<Utc>,
    ) -> AppResult<Reply> {
        let payload = match command {
            Command::LogSet(set) => self.log_set(user_id, set, now).await?,
            Command::Next => self.next_exercise(user_id, now).await?,
            Command::StartSession => self.start_session(user_id, now).await?,
            Command::EndSession => self.end_session(user_id, now).await?,
            Command::Ask { question } => self.answer(user_id, &question, now).await?,
            Command::List {
                scope: ListScope::Today,
            } => self.list_today(user_id, now).await?,
            Command::List {
                scope: ListScope::All,
            } => self.list_catalog(),
            Command::LogReadiness { metric, value } => {
                self.log_readiness(user_id, metric, value, now).await?
            }
            Command::Help => ResponsePayload::Help,
            Command::Unrecognized { text } => {
                return Ok(Reply::Failure(FailureReply::Unrecognized { text }))
            }
        };
        Ok(Reply::Success(payload))
    }

    async fn log_set(
        &self,
        user_id: &UserId,
        command: SetCommand,
        now: DateTime<Utc>,
    ) -> AppResult<ResponsePayload> {
        let mut context = self.context(user_id).await?;
        let plan = self.plans.current();
        let transition =
            SessionMachine::on_log(&context, &command.exercise, self.today_label(&plan, now), now);
        let Transition::Logged {
            session,
            session_created,
            set_index,
            ..
        } = &transition
        else {
            return Err(AppError::internal("Set logging produced no logged transition"));
        };

        let history = self
            .store
            .query_sets(user_id, &SetQuery::exercise(&command.exercise))
            .await?;
        let entry = SetEntry::new(
            user_id.clone(),
            &command.exercise,
            command.weight,
            command.reps,
            now,
        )
        .with_rpe(command.rpe)
        .with_note(command.note);

        self.store
            .record_set(transition.session_to_persist(), &entry)
            .await?;

        let previous = personal_record(history.iter());
        let new_record = previous.is_none_or(|record| beats_record(&entry, record));
        let e1rm = estimated_one_rep_max(entry.weight, entry.reps);
        let best_e1rm = history
            .iter()
            .map(|set| estimated_one_rep_max(set.weight, set.reps))
            .fold(e1rm, f64::max);
        let record = match previous {
            Some(record) if !new_record => record.clone(),
            _ => entry.clone(),
        };
        let target_sets = plan
            .planned_on(session.day_label.as_deref(), &command.exercise)
            .map(|planned| planned.target_sets);

        if *session_created {
            AppLogger::log_session_opened(user_id, session.day_label.as_deref(), true);
        }
        AppLogger::log_set_logged(user_id, &entry.exercise, entry.weight, entry.reps, *set_index);

        let logged = SetLogged {
            set_index: *set_index,
            target_sets,
            session_opened: *session_created,
            matched_from: (!command.query.eq_ignore_ascii_case(&command.exercise))
                .then_some(command.query),
            new_record,
            e1rm,
            best_e1rm,
            personal_record: record,
            set: entry,
        };
        context.apply(&transition);
        self.sessions.commit(context);
        Ok(ResponsePayload::SetLogged(logged))
    }

    async fn start_session(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> AppResult<ResponsePayload> {
        let mut context = self.context(user_id).await?;
        let plan = self.plans.current();
        let transition = SessionMachine::on_start(&context, self.today_label(&plan, now), now);

        match &transition {
            Transition::Open {
                session,
                created: true,
            } => {
                // Read before the session row is written
                let first = match plan_day(&plan, session.day_label.as_deref())
                    .and_then(|day| day.exercises.first())
                {
                    Some(planned) => Some(self.recommend(user_id, planned).await?),
                    None => None,
                };
                self.store.upsert_session(session).await?;
                AppLogger::log_session_opened(user_id, session.day_label.as_deref(), false);
                let day_label = session.day_label.clone();
                context.apply(&transition);
                self.sessions.commit(context);
                Ok(ResponsePayload::SessionStarted { day_label, first })
            }
            Transition::Open { session, .. } => Ok(ResponsePayload::SessionAlreadyOpen {
                day_label: session.day_label.clone(),
                started_at: session.started_at,
            }),
            _ => Err(AppError::internal("Session start produced no open transition")),
        }
    }

    async fn next_exercise(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> AppResult<ResponsePayload> {
        let context = self.context(user_id).await?;
        let plan = self.plans.current();
        let day = self.active_day(&plan, &context, now);

        match SessionMachine::next_planned(&context, day) {
            NextStep::Planned(planned) => {
                let recommendation = self.recommend(user_id, planned).await?;
                Ok(ResponsePayload::NextExercise {
                    recommendation,
                    day_label: day.map_or_else(String::new, |d| d.label.clone()),
                    session_open: context.is_open(),
                })
            }
            NextStep::DayComplete => Ok(ResponsePayload::DayComplete {
                day_label: day.map_or_else(String::new, |d| d.label.clone()),
            }),
            NextStep::NoPlan => Ok(ResponsePayload::NothingPlanned {
                session_open: context.is_open(),
            }),
        }
    }

    async fn end_session(&self, user_id: &UserId, now: DateTime<Utc>) -> AppResult<ResponsePayload> {
        let mut context = self.context(user_id).await?;
        let Some(open) = context.open_session().cloned() else {
            return Ok(ResponsePayload::NoOpenSession);
        };

        let sets = self.store.query_sets(user_id, &session_window(&open)).await?;
        let earlier = self
            .store
            .query_sets(user_id, &SetQuery::before(open.started_at))
            .await?;
        let prior_volumes: Vec<f64> = match open.day_label.as_deref() {
            Some(label) => self
                .store
                .closed_sessions_for_day(user_id, label, self.grader.history_window())
                .await?
                .iter()
                .filter_map(|session| session.total_volume)
                .collect(),
            None => Vec::new(),
        };

        let plan = self.plans.current();
        let planned = plan_day(&plan, open.day_label.as_deref())
            .map_or_else(Vec::new, |day| day.exercises.clone());
        let report = self.grader.grade(&sets, &planned, &prior_volumes);

        // The window is half-open, so it must end after the last set
        let ended_at = sets
            .last()
            .map_or(now, |last| now.max(last.timestamp + Duration::nanoseconds(1)));
        let transition = SessionMachine::on_end(&context, |session| {
            session
                .clone()
                .closed(ended_at, report.grade, report.total_volume)
        });
        let Transition::Closed { session } = &transition else {
            return Err(AppError::internal("Session end produced no closed transition"));
        };
        self.store.upsert_session(session).await?;
        let closed = session.clone();
        context.apply(&transition);
        self.sessions.commit(context);
        AppLogger::log_session_closed(user_id, report.grade, report.total_sets, report.total_volume);

        let recap = build_session_recap(&closed, &sets, &earlier, report, now);
        let summary = self.coach.summarize_session(&recap).await;
        Ok(ResponsePayload::SessionEnded(SessionEnded {
            day_label: closed.day_label,
            duration_minutes: recap.duration_minutes,
            records: recap.record_exercises().map(str::to_owned).collect(),
            report: recap.grade,
            summary,
        }))
    }

    async fn answer(
        &self,
        user_id: &UserId,
        question: &str,
        now: DateTime<Utc>,
    ) -> AppResult<ResponsePayload> {
        let history = self.store.query_sets(user_id, &SetQuery::all()).await?;
        let sessions = self
            .store
            .recent_sessions(user_id, windows::SUMMARY_SESSIONS)
            .await?;
        let readiness = self
            .store
            .get_readiness(user_id, self.local_date(now))
            .await?;

        let input = SummaryInput {
            history: &history,
            sessions: &sessions,
            readiness,
            now,
            offset: self.offset,
            consistency_days: windows::CONSISTENCY_DAYS,
            volume_days: windows::SUMMARY_VOLUME_DAYS,
            weight_unit: self.weight_unit.as_str(),
        };
        let summary = build_training_summary(&input, |name| self.catalog.groups_of(name));
        Ok(ResponsePayload::Analysis(
            self.coach.analyze(question, &summary).await,
        ))
    }

    async fn list_today(&self, user_id: &UserId, now: DateTime<Utc>) -> AppResult<ResponsePayload> {
        let context = self.context(user_id).await?;
        let plan = self.plans.current();
        let day = self.active_day(&plan, &context, now);

        let logged = match context.open_session() {
            Some(session) => self.store.query_sets(user_id, &session_window(session)).await?,
            None => Vec::new(),
        };
        let items = day.map_or_else(Vec::new, |day| {
            day.exercises
                .iter()
                .map(|planned| PlanProgress {
                    exercise: planned.exercise.clone(),
                    target_sets: planned.target_sets,
                    target_reps: planned.target_reps.clone(),
                    logged_sets: logged.iter().filter(|s| s.is_for(&planned.exercise)).count(),
                })
                .collect()
        });

        Ok(ResponsePayload::PlanListing(PlanListing {
            weekday: now.with_timezone(&self.offset).weekday(),
            day_label: day.map(|d| d.label.clone()),
            items,
        }))
    }

    fn list_catalog(&self) -> ResponsePayload {
        let groups = self
            .catalog
            .by_muscle_group()
            .into_iter()
            .map(|(group, exercises)| CatalogGroup {
                group,
                exercises: exercises.into_iter().map(|e| e.name.clone()).collect(),
            })
            .collect();
        ResponsePayload::CatalogListing(groups)
    }

    async fn log_readiness(
        &self,
        user_id: &UserId,
        metric: ReadinessMetric,
        value: f64,
        now: DateTime<Utc>,
    ) -> AppResult<ResponsePayload> {
        let date = self.local_date(now);
        let log = self
            .store
            .get_readiness(user_id, date)
            .await?
            .unwrap_or_else(|| ReadinessLog::new(user_id.clone(), date, now))
            .with_metric(metric, value, now);
        self.store.upsert_readiness(&log).await?;
        debug!(user.id = %user_id, metric = metric.command(), value, "Readiness logged");
        Ok(ResponsePayload::ReadinessLogged { metric, value, log })
    }

    async fn recommend(
        &self,
        user_id: &UserId,
        planned: &PlannedExercise,
    ) -> AppResult<Recommendation> {
        let exercise = self
            .catalog
            .get(&planned.exercise)
            .ok_or_else(|| AppError::not_found(format!("Exercise {}", planned.exercise)))?;
        let history = self
            .store
            .query_sets(user_id, &SetQuery::exercise(&exercise.name))
            .await?;
        let latest_session = match history.last() {
            Some(newest) => self.store.session_at(user_id, newest.timestamp).await?,
            None => None,
        };
        Ok(self.recommender.recommend(
            exercise,
            Some(planned),
            &history,
            latest_session.as_ref(),
            self.offset,
        ))
    }

    async fn context(&self, user_id: &UserId) -> AppResult<SessionContext> {
        self.sessions.context(user_id, self.store.as_ref()).await
    }

    fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    fn today_label(&self, plan: &WorkoutPlan, now: DateTime<Utc>) -> Option<String> {
        let weekday = now.with_timezone(&self.offset).weekday();
        plan.day_for_weekday(weekday).map(|day| day.label.clone())
    }

    /// The open session's plan day, or today's when no session is open
    fn active_day<'a>(
        &self,
        plan: &'a WorkoutPlan,
        context: &SessionContext,
        now: DateTime<Utc>,
    ) -> Option<&'a PlanDay> {
        match context.open_session() {
            Some(session) => plan_day(plan, session.day_label.as_deref()),
            None => plan.day_for_weekday(now.with_timezone(&self.offset).weekday()),
        }
    }
}

fn plan_day<'a>(plan: &'a WorkoutPlan, label: Option<&str>) -> Option<&'a PlanDay> {
    label.and_then(|label| plan.day(label))
}

