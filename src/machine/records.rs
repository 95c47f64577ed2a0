//! In-memory history accumulated over a workout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::Difficulty;

/// What the user reported when finishing a set. Missing fields fall back
/// to the live targets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetCompletion {
    pub actual_reps: Option<u32>,
    pub actual_weight: Option<f64>,
    pub difficulty: Option<Difficulty>,
}

impl SetCompletion {
    /// Report a rep count.
    #[must_use]
    pub fn reps(actual_reps: u32) -> Self {
        Self {
            actual_reps: Some(actual_reps),
            ..Self::default()
        }
    }
}

/// Measured outcome of one set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPerformance {
    pub actual_reps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    /// Active working time in seconds, pauses excluded.
    pub duration: u64,
    /// Wall-clock time from start to completion in seconds.
    pub total_elapsed: u64,
    /// Time spent paused in seconds.
    pub pause_time: u64,
}

/// A completed set as kept in the session history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSetRecord {
    pub exercise_id: String,
    pub set_id: String,
    pub set_number: u32,
    pub performance: SetPerformance,
}

/// Which target an adjustment changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentKind {
    Weight,
    Reps,
    Rest,
}

impl AdjustmentKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weight => "weight",
            Self::Reps => "reps",
            Self::Rest => "rest",
        }
    }
}

impl std::fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mid-workout change to a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    #[serde(rename = "type")]
    pub kind: AdjustmentKind,
    /// Previous value; `None` for bodyweight.
    pub from: Option<f64>,
    pub to: Option<f64>,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

impl Adjustment {
    #[must_use]
    pub fn new(
        kind: AdjustmentKind,
        from: Option<f64>,
        to: Option<f64>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            from,
            to,
            reason: reason.into(),
            timestamp: Utc::now(),
        }
    }
}
