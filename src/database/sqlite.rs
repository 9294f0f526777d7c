// ABOUTME: SQLite-backed workout store persisting sets, sessions, and readiness logs
// ABOUTME: Timestamps are stored as fixed-precision RFC 3339 text so lexical order is time order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{SetQuery, WorkoutStore};
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool};
use tracing::{debug, instrument};
use uuid::Uuid;
use vyayamam_core::models::{Grade, ReadinessLog, Session, SetEntry, UserId};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn timestamp_text(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(text: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|e| AppError::database(format!("Invalid stored timestamp '{text}': {e}")))
}

fn parse_uuid(text: &str) -> AppResult<Uuid> {
    Uuid::parse_str(text).map_err(|e| AppError::database(format!("Invalid stored id '{text}': {e}")))
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn set_from_row(row: &SqliteRow) -> AppResult<SetEntry> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let reps: i64 = row.get("reps");
    let timestamp: String = row.get("timestamp");
    Ok(SetEntry {
        id: parse_uuid(&id)?,
        user_id: UserId::new(user_id),
        exercise: row.get("exercise"),
        weight: row.get("weight"),
        reps: u32::try_from(reps)
            .map_err(|e| AppError::database(format!("Invalid stored rep count {reps}: {e}")))?,
        rpe: row.get("rpe"),
        note: row.get("note"),
        timestamp: parse_timestamp(&timestamp)?,
    })
}

fn session_from_row(row: &SqliteRow) -> AppResult<Session> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let started_at: String = row.get("started_at");
    let ended_at: Option<String> = row.get("ended_at");
    let grade: Option<String> = row.get("grade");
    let grade = grade
        .map(|text| {
            Grade::parse(&text)
                .ok_or_else(|| AppError::database(format!("Invalid stored grade '{text}'")))
        })
        .transpose()?;
    Ok(Session {
        id: parse_uuid(&id)?,
        user_id: UserId::new(user_id),
        day_label: row.get("day_label"),
        started_at: parse_timestamp(&started_at)?,
        ended_at: ended_at.as_deref().map(parse_timestamp).transpose()?,
        grade,
        total_volume: row.get("total_volume"),
    })
}

fn readiness_from_row(row: &SqliteRow) -> AppResult<ReadinessLog> {
    let user_id: String = row.get("user_id");
    let date: String = row.get("date");
    let updated_at: String = row.get("updated_at");
    Ok(ReadinessLog {
        user_id: UserId::new(user_id),
        date: NaiveDate::parse_from_str(&date, DATE_FORMAT)
            .map_err(|e| AppError::database(format!("Invalid stored date '{date}': {e}")))?,
        sleep: row.get("sleep"),
        stress: row.get("stress"),
        soreness: row.get("soreness"),
        updated_at: parse_timestamp(&updated_at)?,
    })
}

async fn insert_set(conn: &mut SqliteConnection, set: &SetEntry) -> AppResult<()> {
    sqlx::query(
        r"
        INSERT INTO sets (id, user_id, exercise, weight, reps, rpe, note, timestamp)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ",
    )
    .bind(set.id.to_string())
    .bind(set.user_id.as_str())
    .bind(&set.exercise)
    .bind(set.weight)
    .bind(i64::from(set.reps))
    .bind(set.rpe)
    .bind(&set.note)
    .bind(timestamp_text(set.timestamp))
    .execute(conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to append set: {e}")))?;
    Ok(())
}

async fn write_session(conn: &mut SqliteConnection, session: &Session) -> AppResult<()> {
    let result = sqlx::query(
        r"
        INSERT INTO sessions (id, user_id, day_label, started_at, ended_at, grade, total_volume)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT(id) DO UPDATE SET
            day_label = excluded.day_label,
            ended_at = excluded.ended_at,
            grade = excluded.grade,
            total_volume = excluded.total_volume
        ",
    )
    .bind(session.id.to_string())
    .bind(session.user_id.as_str())
    .bind(&session.day_label)
    .bind(timestamp_text(session.started_at))
    .bind(session.ended_at.map(timestamp_text))
    .bind(session.grade.map(|grade| grade.as_str()))
    .bind(session.total_volume)
    .execute(conn)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            Err(AppError::invalid_input(format!(
                "User {} already has an open session",
                session.user_id
            )))
        }
        Err(e) => Err(AppError::database(format!("Failed to upsert session: {e}"))),
    }
}

/// Persistent store backed by a `SQLite` file
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `database_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let connection_string = if database_url.contains('?') {
            database_url.to_owned()
        } else {
            format!("{database_url}?mode=rwc")
        };
        let pool = SqlitePool::connect(&connection_string)
            .await
            .map_err(|e| AppError::database(format!("Failed to open {database_url}: {e}")))?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    #[must_use]
    pub const fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn connection(&self) -> AppResult<PoolConnection<Sqlite>> {
        self.pool
            .acquire()
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))
    }

    /// Underlying connection pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl WorkoutStore for SqliteStore {
    async fn migrate(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS sets (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                exercise TEXT NOT NULL,
                weight REAL NOT NULL,
                reps INTEGER NOT NULL,
                rpe REAL,
                note TEXT,
                timestamp TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create sets table: {e}")))?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_sets_user_time
            ON sets(user_id, timestamp)
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create sets index: {e}")))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                day_label TEXT,
                started_at TEXT NOT NULL,
                ended_at TEXT,
                grade TEXT,
                total_volume REAL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create sessions table: {e}")))?;

        sqlx::query(
            r"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_sessions_one_open
            ON sessions(user_id) WHERE ended_at IS NULL
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create open session index: {e}")))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS readiness (
                user_id TEXT NOT NULL,
                date TEXT NOT NULL,
                sleep REAL,
                stress REAL,
                soreness REAL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (user_id, date)
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create readiness table: {e}")))?;

        debug!("Workout store schema ready");
        Ok(())
    }

    #[instrument(skip(self, set), fields(user.id = %set.user_id, exercise = %set.exercise))]
    async fn append_set(&self, set: &SetEntry) -> AppResult<()> {
        let mut conn = self.connection().await?;
        insert_set(&mut conn, set).await
    }

    #[instrument(skip(self, opened, set), fields(user.id = %set.user_id, exercise = %set.exercise))]
    async fn record_set(&self, opened: Option<&Session>, set: &SetEntry) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;
        // Dropping the transaction on an early return rolls it back
        if let Some(session) = opened {
            write_session(&mut tx, session).await?;
        }
        insert_set(&mut tx, set).await?;
        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit set: {e}")))
    }

    async fn get_set(&self, user_id: &UserId, id: Uuid) -> AppResult<Option<SetEntry>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, exercise, weight, reps, rpe, note, timestamp
            FROM sets
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id.to_string())
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get set: {e}")))?;

        row.as_ref().map(set_from_row).transpose()
    }

    async fn query_sets(&self, user_id: &UserId, query: &SetQuery) -> AppResult<Vec<SetEntry>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, exercise, weight, reps, rpe, note, timestamp
            FROM sets
            WHERE user_id = $1
              AND ($2 IS NULL OR exercise = $2 COLLATE NOCASE)
              AND ($3 IS NULL OR timestamp >= $3)
              AND ($4 IS NULL OR timestamp < $4)
            ORDER BY timestamp ASC, rowid ASC
            ",
        )
        .bind(user_id.as_str())
        .bind(query.exercise.as_deref())
        .bind(query.from.map(timestamp_text))
        .bind(query.until.map(timestamp_text))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to query sets: {e}")))?;

        rows.iter().map(set_from_row).collect()
    }

    #[instrument(skip(self, session), fields(user.id = %session.user_id, session.id = %session.id))]
    async fn upsert_session(&self, session: &Session) -> AppResult<()> {
        let mut conn = self.connection().await?;
        write_session(&mut conn, session).await
    }

    async fn get_session(&self, user_id: &UserId, id: Uuid) -> AppResult<Option<Session>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, day_label, started_at, ended_at, grade, total_volume
            FROM sessions
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id.to_string())
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get session: {e}")))?;

        row.as_ref().map(session_from_row).transpose()
    }

    async fn open_session(&self, user_id: &UserId) -> AppResult<Option<Session>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, day_label, started_at, ended_at, grade, total_volume
            FROM sessions
            WHERE user_id = $1 AND ended_at IS NULL
            ",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get open session: {e}")))?;

        row.as_ref().map(session_from_row).transpose()
    }

    async fn session_at(&self, user_id: &UserId, at: DateTime<Utc>) -> AppResult<Option<Session>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, day_label, started_at, ended_at, grade, total_volume
            FROM sessions
            WHERE user_id = $1
              AND started_at <= $2
              AND (ended_at IS NULL OR ended_at > $2)
            ORDER BY started_at DESC
            LIMIT 1
            ",
        )
        .bind(user_id.as_str())
        .bind(timestamp_text(at))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find session at {at}: {e}")))?;

        row.as_ref().map(session_from_row).transpose()
    }

    async fn recent_sessions(&self, user_id: &UserId, limit: usize) -> AppResult<Vec<Session>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, day_label, started_at, ended_at, grade, total_volume
            FROM sessions
            WHERE user_id = $1
            ORDER BY started_at DESC
            LIMIT $2
            ",
        )
        .bind(user_id.as_str())
        .bind(limit_param(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list sessions: {e}")))?;

        rows.iter().map(session_from_row).collect()
    }

    async fn closed_sessions_for_day(
        &self,
        user_id: &UserId,
        day_label: &str,
        limit: usize,
    ) -> AppResult<Vec<Session>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, day_label, started_at, ended_at, grade, total_volume
            FROM sessions
            WHERE user_id = $1
              AND ended_at IS NOT NULL
              AND day_label = $2 COLLATE NOCASE
            ORDER BY ended_at DESC
            LIMIT $3
            ",
        )
        .bind(user_id.as_str())
        .bind(day_label)
        .bind(limit_param(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list sessions for {day_label}: {e}")))?;

        rows.iter().map(session_from_row).collect()
    }

    async fn upsert_readiness(&self, log: &ReadinessLog) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO readiness (user_id, date, sleep, stress, soreness, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT(user_id, date) DO UPDATE SET
                sleep = excluded.sleep,
                stress = excluded.stress,
                soreness = excluded.soreness,
                updated_at = excluded.updated_at
            ",
        )
        .bind(log.user_id.as_str())
        .bind(log.date.format(DATE_FORMAT).to_string())
        .bind(log.sleep)
        .bind(log.stress)
        .bind(log.soreness)
        .bind(timestamp_text(log.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to upsert readiness: {e}")))?;
        Ok(())
    }

    async fn get_readiness(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> AppResult<Option<ReadinessLog>> {
        let row = sqlx::query(
            r"
            SELECT user_id, date, sleep, stress, soreness, updated_at
            FROM readiness
            WHERE user_id = $1 AND date = $2
            ",
        )
        .bind(user_id.as_str())
        .bind(date.format(DATE_FORMAT).to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get readiness: {e}")))?;

        row.as_ref().map(readiness_from_row).transpose()
    }
}
