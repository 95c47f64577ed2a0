//! Colored CLI display utilities for workout output.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use serde_json::Value;

use crate::bridge::{AudioCue, CoachSignal, SystemUpdate, UpdateEvent};
use crate::machine::{format_target, WorkoutSummary};
use crate::session::WorkoutSession;
use crate::tools::ToolResponse;

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%H:%M:%S").to_string()
}

/// Truncate a string to a maximum number of characters, adding an
/// ellipsis if truncated.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{kept}...")
    }
}

/// Format update data as `key=value` pairs, skipping nested values.
#[must_use]
pub fn format_data(data: &Value) -> String {
    match data {
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| !v.is_array() && !v.is_object() && !v.is_null())
            .map(|(k, v)| {
                let value = match v {
                    Value::String(s) => truncate(s, 40),
                    other => other.to_string(),
                };
                format!("{k}={value}")
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
        other => truncate(&other.to_string(), 80),
    }
}

/// Print a system update.
pub fn print_update(update: &SystemUpdate) {
    let label = format!("[{}]", update.event.as_str().to_uppercase());
    let label = match update.event {
        UpdateEvent::SetStarted | UpdateEvent::SetRestarted | UpdateEvent::SetResumed => {
            label.green().bold().to_string()
        }
        UpdateEvent::SetCompleted | UpdateEvent::ExerciseChanged => label.cyan().bold().to_string(),
        UpdateEvent::RestStarted | UpdateEvent::RestResumed | UpdateEvent::RestExtended => {
            label.blue().bold().to_string()
        }
        UpdateEvent::RestEnding | UpdateEvent::SetPaused | UpdateEvent::RestPaused => {
            label.yellow().bold().to_string()
        }
        UpdateEvent::WorkoutCompleted | UpdateEvent::WorkoutFinishedEarly => {
            label.magenta().bold().to_string()
        }
        _ => label.bold().to_string(),
    };
    println!(
        "{} {} {}",
        format_timestamp(update.timestamp).dimmed(),
        label,
        format_data(&update.data).dimmed()
    );
    let _ = io::stdout().flush();
}

/// Print an audio cue. Keep-alive pings are only logged.
pub fn print_signal(signal: CoachSignal) {
    match signal {
        CoachSignal::Cue(AudioCue::Start) => println!("{}", "[CUE] start".green()),
        CoachSignal::Cue(AudioCue::End) => println!("{}", "[CUE] end".red()),
        CoachSignal::UserActivity => tracing::trace!("Keep-alive signal"),
    }
    let _ = io::stdout().flush();
}

/// Print the outcome of a tool call.
pub fn print_tool_response(name: &str, response: &ToolResponse) {
    if response.success {
        println!("{} {} {}", "[TOOL]".cyan().bold(), name.bold(), response.message);
    } else {
        println!(
            "{} {} {}",
            "[TOOL]".red().bold(),
            name.bold(),
            response.message.red()
        );
    }
    let _ = io::stdout().flush();
}

/// Print a workout plan.
pub fn print_plan(workout: &WorkoutSession) {
    println!(
        "{} {} ({} exercises, {} sets)",
        "[PLAN]".blue().bold(),
        workout.name.bold(),
        workout.exercises.len(),
        workout.total_sets()
    );
    for (i, exercise) in workout.exercises.iter().enumerate() {
        println!("  {}. {}", i + 1, exercise.name.cyan());
        for set in &exercise.sets {
            let timed = set
                .target_time
                .map_or(String::new(), |t| format!(", {t}s work"));
            println!(
                "     set {}: {}{}, rest {}s",
                set.set_number,
                format_target(set.target_reps, set.target_weight),
                timed,
                set.rest_time_after
            );
        }
    }
    let _ = io::stdout().flush();
}

/// Print the end-of-workout summary.
pub fn print_summary(summary: &WorkoutSummary) {
    let headline = if summary.is_fully_completed {
        "Workout complete".green().bold().to_string()
    } else {
        "Workout ended early".yellow().bold().to_string()
    };
    println!("{} {}", "[SUMMARY]".magenta().bold(), headline);
    println!(
        "  {}: {} of {} sets, {} of {} exercises in {}s",
        summary.session_name.bold(),
        summary.completed_sets,
        summary.total_sets,
        summary.completed_exercises,
        summary.total_exercises,
        summary.total_time
    );
    if !summary.adjustments_made.is_empty() {
        println!("  {} adjustments made", summary.adjustments_made.len());
    }
    let _ = io::stdout().flush();
}
