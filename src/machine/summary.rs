//! Read-only views of the machine: status snapshots and end-of-workout summaries.

use serde::{Deserialize, Serialize};

use super::{Adjustment, CompletedSetRecord, WorkoutPhase};

/// Summary produced when a workout ends, naturally or early.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSummary {
    pub session_name: String,
    /// Wall-clock seconds since selection.
    pub total_time: u64,
    pub completed_exercises: usize,
    pub total_exercises: usize,
    pub completed_sets: usize,
    pub total_sets: usize,
    pub sets_completed: Vec<CompletedSetRecord>,
    pub adjustments_made: Vec<Adjustment>,
    pub is_fully_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_early: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_exercise: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_set: Option<u32>,
}

/// Point-in-time view of an active workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub workout_name: String,
    pub phase: WorkoutPhase,
    pub exercise_name: String,
    /// 1-based.
    pub exercise_number: usize,
    pub total_exercises: usize,
    pub set_number: u32,
    pub total_sets: usize,
    pub target_reps: u32,
    pub target_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_time: Option<u32>,
    pub rest_time_after: u32,
    /// Seconds since the workout was selected.
    pub elapsed: u64,
    /// Seconds left on the running set or rest timer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_remaining: Option<u64>,
    pub is_paused: bool,
    pub is_last_set: bool,
    pub completed_sets: usize,
    pub total_workout_sets: usize,
    pub agent_connected: bool,
}

impl StatusSnapshot {
    /// One-paragraph briefing for an agent joining mid-workout.
    #[must_use]
    pub fn context_message(&self) -> String {
        let mut message = format!(
            "Workout \"{}\": exercise {} of {} ({}), set {} of {}, {}. Phase: {}",
            self.workout_name,
            self.exercise_number,
            self.total_exercises,
            self.exercise_name,
            self.set_number,
            self.total_sets,
            format_target(self.target_reps, self.target_weight),
            self.phase,
        );
        if let Some(remaining) = self.time_remaining {
            message.push_str(&format!(", {remaining}s remaining"));
        }
        if self.is_paused {
            message.push_str(" (paused)");
        }
        message.push_str(&format!(
            ". {} of {} sets done.",
            self.completed_sets, self.total_workout_sets
        ));
        message
    }
}

/// Descriptive information about the current exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub muscle_groups: Vec<String>,
    pub set_number: u32,
    pub total_sets: usize,
    pub target_reps: u32,
    pub target_weight: Option<f64>,
}

/// Human phrasing of a rep/weight target, e.g. `8 reps at 60 kg`.
#[must_use]
pub fn format_target(reps: u32, weight: Option<f64>) -> String {
    match weight {
        Some(w) => format!("{reps} reps at {} kg", format_weight(w)),
        None => format!("{reps} reps (bodyweight)"),
    }
}

/// Drop a trailing `.0` from whole weights.
#[must_use]
pub fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{weight:.0}")
    } else {
        format!("{weight}")
    }
}
