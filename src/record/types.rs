//! Record requests emitted by the machine for durable storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::machine::{AdjustmentKind, WorkoutSummary};
use crate::session::Difficulty;

/// A workout was selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: Uuid,
    pub workout_id: String,
    pub workout_name: String,
    pub started_at: DateTime<Utc>,
}

/// A set was completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRecord {
    pub session_id: Uuid,
    pub workout_entry_id: Option<String>,
    pub exercise_id: String,
    pub set_id: String,
    pub set_number: u32,
    pub target_reps: u32,
    pub target_weight: Option<f64>,
    pub target_time: Option<u32>,
    pub actual_reps: u32,
    pub actual_weight: Option<f64>,
    pub difficulty: Option<Difficulty>,
    /// Active seconds, pauses excluded.
    pub duration_secs: u64,
    pub pause_secs: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// A rest period ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestRecord {
    pub session_id: Uuid,
    pub exercise_id: String,
    /// Set the rest followed.
    pub set_number: u32,
    pub prescribed_secs: u64,
    pub actual_secs: u64,
    pub ended_at: DateTime<Utc>,
}

/// A target was changed mid-workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentRecord {
    pub session_id: Uuid,
    pub kind: AdjustmentKind,
    pub workout_entry_id: Option<String>,
    pub exercise_id: Option<String>,
    pub from: Option<f64>,
    pub to: Option<f64>,
    pub reason: String,
    pub affected_set_numbers: Vec<u32>,
    pub affects_future_sets: bool,
    pub timestamp: DateTime<Utc>,
}

/// The workout ended, naturally or early.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEndRecord {
    pub session_id: Uuid,
    pub ended_at: DateTime<Utc>,
    pub summary: WorkoutSummary,
}

/// Something the machine needs durably recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordRequest {
    SessionStarted(SessionRecord),
    SetCompleted(SetRecord),
    RestCompleted(RestRecord),
    Adjusted(AdjustmentRecord),
    SessionEnded(SessionEndRecord),
}

impl RecordRequest {
    /// Short name for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SessionStarted(_) => "session_started",
            Self::SetCompleted(_) => "set_completed",
            Self::RestCompleted(_) => "rest_completed",
            Self::Adjusted(_) => "adjusted",
            Self::SessionEnded(_) => "session_ended",
        }
    }

    /// Session the request belongs to.
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        match self {
            Self::SessionStarted(r) => r.session_id,
            Self::SetCompleted(r) => r.session_id,
            Self::RestCompleted(r) => r.session_id,
            Self::Adjusted(r) => r.session_id,
            Self::SessionEnded(r) => r.session_id,
        }
    }
}
