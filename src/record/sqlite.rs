//! `SQLite` recorder with async operations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::schema::SCHEMA;
use super::{
    AdjustmentRecord, RecordError, RecordRequest, RestRecord, SessionEndRecord, SessionRecord,
    SetRecord, WorkoutRecorder,
};

/// Returns the default path for the workout database.
///
/// This is `~/.local/share/workout-coach/workouts.db` on Unix systems.
#[must_use]
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("workout-coach")
        .join("workouts.db")
}

/// A stored session row.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSession {
    pub id: Uuid,
    pub workout_name: String,
    pub started_at: String,
    pub ended_at: Option<String>,
    pub finished_early: Option<bool>,
}

/// A stored set row.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSet {
    pub exercise_id: String,
    pub set_number: u32,
    pub actual_reps: u32,
    pub actual_weight: Option<f64>,
    pub duration_secs: u64,
    pub pause_secs: u64,
}

/// Workout recorder backed by `SQLite`.
///
/// Blocking database calls run on the blocking pool via `spawn_blocking`.
#[derive(Debug, Clone)]
pub struct SqliteRecorder {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl SqliteRecorder {
    /// Open a recorder at the specified path.
    ///
    /// Creates parent directories if they don't exist and initializes the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the schema cannot be applied.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| RecordError::CreateDir {
                        path: parent.to_path_buf(),
                        source,
                    })?;
            }
        }

        let path_clone = path.clone();
        let conn = tokio::task::spawn_blocking(move || -> Result<Connection, RecordError> {
            let conn =
                Connection::open(&path_clone).map_err(|source| RecordError::DatabaseOpen {
                    path: path_clone,
                    source,
                })?;
            conn.execute_batch(SCHEMA)?;
            Ok(conn)
        })
        .await
        .map_err(|_| RecordError::TaskCancelled)??;

        tracing::debug!(path = %path.display(), "Opened workout database");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path),
        })
    }

    /// Open an in-memory recorder for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created or the schema cannot be applied.
    pub async fn open_in_memory() -> Result<Self, RecordError> {
        let conn = tokio::task::spawn_blocking(|| -> Result<Connection, RecordError> {
            let conn = Connection::open_in_memory()?;
            conn.execute_batch(SCHEMA)?;
            Ok(conn)
        })
        .await
        .map_err(|_| RecordError::TaskCancelled)??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    /// Returns the path to the database, if opened from a file.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get a stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_session(&self, session_id: Uuid) -> Result<Option<StoredSession>, RecordError> {
        let id = session_id.to_string();
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<Option<StoredSession>, RecordError> {
            let conn = conn.blocking_lock();
            let row = conn
                .query_row(
                    "SELECT workout_name, started_at, ended_at, finished_early
                     FROM sessions WHERE id = ?1",
                    params![id],
                    |row| {
                        let workout_name: String = row.get(0)?;
                        let started_at: String = row.get(1)?;
                        let ended_at: Option<String> = row.get(2)?;
                        let finished_early: Option<bool> = row.get(3)?;
                        Ok((workout_name, started_at, ended_at, finished_early))
                    },
                )
                .optional()?;
            Ok(row.map(|(workout_name, started_at, ended_at, finished_early)| StoredSession {
                id: session_id,
                workout_name,
                started_at,
                ended_at,
                finished_early,
            }))
        })
        .await
        .map_err(|_| RecordError::TaskCancelled)?
    }

    /// List the most recent sessions, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored id is malformed.
    pub async fn list_sessions(&self, limit: u32) -> Result<Vec<StoredSession>, RecordError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<Vec<StoredSession>, RecordError> {
            let conn = conn.blocking_lock();
            let mut stmt = conn.prepare(
                "SELECT id, workout_name, started_at, ended_at, finished_early
                 FROM sessions ORDER BY started_at DESC LIMIT ?1",
            )?;
            let sessions = stmt
                .query_map(params![limit], |row| {
                    let id: String = row.get(0)?;
                    let id = Uuid::parse_str(&id).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            0,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?;
                    Ok(StoredSession {
                        id,
                        workout_name: row.get(1)?,
                        started_at: row.get(2)?,
                        ended_at: row.get(3)?,
                        finished_early: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(sessions)
        })
        .await
        .map_err(|_| RecordError::TaskCancelled)?
    }

    /// Get the completed sets of a session in completion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_sets(&self, session_id: Uuid) -> Result<Vec<StoredSet>, RecordError> {
        let id = session_id.to_string();
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<Vec<StoredSet>, RecordError> {
            let conn = conn.blocking_lock();
            let mut stmt = conn.prepare(
                "SELECT exercise_id, set_number, actual_reps, actual_weight, duration_secs, pause_secs
                 FROM sets WHERE session_id = ?1 ORDER BY id",
            )?;
            let sets = stmt
                .query_map(params![id], |row| {
                    Ok(StoredSet {
                        exercise_id: row.get(0)?,
                        set_number: row.get(1)?,
                        actual_reps: row.get(2)?,
                        actual_weight: row.get(3)?,
                        duration_secs: row.get(4)?,
                        pause_secs: row.get(5)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(sets)
        })
        .await
        .map_err(|_| RecordError::TaskCancelled)?
    }

    /// Count the rest periods recorded for a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count_rests(&self, session_id: Uuid) -> Result<u64, RecordError> {
        self.count_for_session("SELECT COUNT(*) FROM rests WHERE session_id = ?1", session_id)
            .await
    }

    /// Count the adjustments recorded for a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count_adjustments(&self, session_id: Uuid) -> Result<u64, RecordError> {
        self.count_for_session(
            "SELECT COUNT(*) FROM adjustments WHERE session_id = ?1",
            session_id,
        )
        .await
    }

    async fn count_for_session(
        &self,
        sql: &'static str,
        session_id: Uuid,
    ) -> Result<u64, RecordError> {
        let id = session_id.to_string();
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<u64, RecordError> {
            let conn = conn.blocking_lock();
            let count: i64 = conn.query_row(sql, params![id], |row| row.get(0))?;
            Ok(count.unsigned_abs())
        })
        .await
        .map_err(|_| RecordError::TaskCancelled)?
    }

    async fn insert_session(&self, record: &SessionRecord) -> Result<(), RecordError> {
        let id = record.session_id.to_string();
        let workout_id = record.workout_id.clone();
        let workout_name = record.workout_name.clone();
        let started_at = record.started_at.to_rfc3339();

        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<(), RecordError> {
            let conn = conn.blocking_lock();
            conn.execute(
                "INSERT INTO sessions (id, workout_id, workout_name, started_at) VALUES (?1, ?2, ?3, ?4)",
                params![id, workout_id, workout_name, started_at],
            )?;
            Ok(())
        })
        .await
        .map_err(|_| RecordError::TaskCancelled)?
    }

    async fn insert_set(&self, record: &SetRecord) -> Result<(), RecordError> {
        let record = record.clone();
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<(), RecordError> {
            let conn = conn.blocking_lock();
            conn.execute(
                "INSERT INTO sets (session_id, workout_entry_id, exercise_id, set_id, set_number,
                    target_reps, target_weight, target_time, actual_reps, actual_weight, difficulty,
                    duration_secs, pause_secs, started_at, completed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                params![
                    record.session_id.to_string(),
                    record.workout_entry_id,
                    record.exercise_id,
                    record.set_id,
                    record.set_number,
                    record.target_reps,
                    record.target_weight,
                    record.target_time,
                    record.actual_reps,
                    record.actual_weight,
                    record.difficulty.map(|d| d.as_str()),
                    record.duration_secs,
                    record.pause_secs,
                    record.started_at.to_rfc3339(),
                    record.completed_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(|_| RecordError::TaskCancelled)?
    }

    async fn insert_rest(&self, record: &RestRecord) -> Result<(), RecordError> {
        let record = record.clone();
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<(), RecordError> {
            let conn = conn.blocking_lock();
            conn.execute(
                "INSERT INTO rests (session_id, exercise_id, set_number, prescribed_secs, actual_secs, ended_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.session_id.to_string(),
                    record.exercise_id,
                    record.set_number,
                    record.prescribed_secs,
                    record.actual_secs,
                    record.ended_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(|_| RecordError::TaskCancelled)?
    }

    async fn insert_adjustment(&self, record: &AdjustmentRecord) -> Result<(), RecordError> {
        let affected = serde_json::to_string(&record.affected_set_numbers)?;
        let record = record.clone();
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<(), RecordError> {
            let conn = conn.blocking_lock();
            conn.execute(
                "INSERT INTO adjustments (session_id, kind, workout_entry_id, exercise_id, from_value,
                    to_value, reason, affected_set_numbers, affects_future_sets, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    record.session_id.to_string(),
                    record.kind.as_str(),
                    record.workout_entry_id,
                    record.exercise_id,
                    record.from,
                    record.to,
                    record.reason,
                    affected,
                    record.affects_future_sets,
                    record.timestamp.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(|_| RecordError::TaskCancelled)?
    }

    async fn end_session(&self, record: &SessionEndRecord) -> Result<(), RecordError> {
        let id = record.session_id.to_string();
        let ended_at = record.ended_at.to_rfc3339();
        let finished_early = record.summary.finished_early.unwrap_or(false);
        let summary = serde_json::to_string(&record.summary)?;

        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<(), RecordError> {
            let conn = conn.blocking_lock();
            conn.execute(
                "UPDATE sessions SET ended_at = ?1, finished_early = ?2, summary = ?3 WHERE id = ?4",
                params![ended_at, finished_early, summary, id],
            )?;
            Ok(())
        })
        .await
        .map_err(|_| RecordError::TaskCancelled)?
    }
}

#[async_trait]
impl WorkoutRecorder for SqliteRecorder {
    async fn record(&self, request: &RecordRequest) -> Result<(), RecordError> {
        tracing::trace!(kind = request.kind(), session_id = %request.session_id(), "Recording to SQLite");
        match request {
            RecordRequest::SessionStarted(r) => self.insert_session(r).await,
            RecordRequest::SetCompleted(r) => self.insert_set(r).await,
            RecordRequest::RestCompleted(r) => self.insert_rest(r).await,
            RecordRequest::Adjusted(r) => self.insert_adjustment(r).await,
            RecordRequest::SessionEnded(r) => self.end_session(r).await,
        }
    }
}
