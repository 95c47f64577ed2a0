//! Name to handler routing for agent and UI commands.

use std::collections::HashMap;

use serde_json::{json, Value};

use crate::machine::{format_target, SetCompletion, WorkoutMachine, WorkoutPhase};

use super::{tool_definitions, ToolDefinition, ToolInput, ToolResponse};

/// A tool handler. `Err` carries a failure response so handlers can use `?`.
pub type ToolHandler = fn(&mut WorkoutMachine, ToolInput<'_>) -> Result<ToolResponse, ToolResponse>;

const DEFAULT_PAUSE_REASON: &str = "user request";

/// Routes named tool calls to machine operations.
#[derive(Debug, Clone)]
pub struct ToolRouter {
    handlers: HashMap<&'static str, ToolHandler>,
}

impl ToolRouter {
    /// Create a router with every workout tool registered.
    #[must_use]
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, ToolHandler> = HashMap::new();
        handlers.insert("start_set", start_set);
        handlers.insert("complete_set", complete_set);
        handlers.insert("pause_set", pause_set);
        handlers.insert("resume_set", resume_set);
        handlers.insert("restart_set", restart_set);
        handlers.insert("extend_rest", extend_rest);
        handlers.insert("jump_to_set", jump_to_set);
        handlers.insert("adjust_weight", adjust_weight);
        handlers.insert("adjust_reps", adjust_reps);
        handlers.insert("adjust_rest_time", adjust_rest_time);
        handlers.insert("get_workout_status", get_workout_status);
        handlers.insert("get_exercise_instructions", get_exercise_instructions);
        handlers.insert("pause_for_issue", pause_for_issue);
        Self { handlers }
    }

    /// Whether a tool with this name is registered.
    #[must_use]
    pub fn has_tool(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered tool names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Definitions of the registered tools.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        tool_definitions()
            .into_iter()
            .filter(|d| self.has_tool(&d.name))
            .collect()
    }

    /// Invoke a tool by name with loosely typed arguments.
    pub fn call(&self, machine: &mut WorkoutMachine, name: &str, args: &Value) -> ToolResponse {
        let Some(handler) = self.handlers.get(name) else {
            tracing::warn!(tool = %name, "Unknown tool");
            return ToolResponse::failure(format!("Unknown tool: {name}"));
        };
        tracing::info!(tool = %name, phase = %machine.phase(), "Tool called");
        let response = handler(machine, ToolInput::new(args)).unwrap_or_else(|failure| failure);
        if !response.success {
            tracing::warn!(tool = %name, message = %response.message, "Tool call failed");
        }
        response
    }
}

impl Default for ToolRouter {
    fn default() -> Self {
        Self::new()
    }
}

fn start_set(machine: &mut WorkoutMachine, _input: ToolInput<'_>) -> Result<ToolResponse, ToolResponse> {
    let phase = machine.confirm_ready_and_start_set()?;
    let message = match (phase, machine.context(), machine.current_exercise()) {
        (WorkoutPhase::Exercising, Some(ctx), _) => format!(
            "Set {} started: {}.",
            ctx.set_number(),
            format_target(ctx.target_reps, ctx.target_weight)
        ),
        (WorkoutPhase::Preparing, Some(ctx), Some(exercise)) => format!(
            "Up next: {} set {}, {}. Say when you're ready.",
            exercise.name,
            ctx.set_number(),
            format_target(ctx.target_reps, ctx.target_weight)
        ),
        (WorkoutPhase::ExerciseTransition, _, Some(exercise)) => {
            format!("Exercise complete. Next exercise: {}.", exercise.name)
        }
        (WorkoutPhase::Inactive, _, _) => "Workout complete. Great work!".to_string(),
        _ => format!("Now {phase}."),
    };
    Ok(ToolResponse::ok_with(message, json!({ "phase": phase })))
}

fn complete_set(machine: &mut WorkoutMachine, input: ToolInput<'_>) -> Result<ToolResponse, ToolResponse> {
    let completion = SetCompletion {
        actual_reps: input.u32("actual_reps")?,
        actual_weight: input.f64("actual_weight")?,
        difficulty: input.difficulty("difficulty")?,
    };
    let set_number = machine.context().map_or(0, |c| c.set_number());
    let performance = machine.complete_set(completion)?;
    let data = serde_json::to_value(&performance).unwrap_or(Value::Null);
    Ok(ToolResponse::ok_with(
        format!(
            "Set {set_number} complete: {} reps in {}s.",
            performance.actual_reps, performance.duration
        ),
        data,
    ))
}

fn pause_set(machine: &mut WorkoutMachine, input: ToolInput<'_>) -> Result<ToolResponse, ToolResponse> {
    let reason = input
        .string("reason")?
        .unwrap_or_else(|| DEFAULT_PAUSE_REASON.to_string());
    if machine.pause(reason)? {
        Ok(ToolResponse::ok("Paused."))
    } else {
        Ok(ToolResponse::ok("Already paused."))
    }
}

fn resume_set(machine: &mut WorkoutMachine, _input: ToolInput<'_>) -> Result<ToolResponse, ToolResponse> {
    if !machine.resume()? {
        return Ok(ToolResponse::ok("Not paused."));
    }
    let remaining = machine.time_remaining().map_or(0, |d| d.as_secs());
    Ok(ToolResponse::ok(format!("Resumed with {remaining}s left.")))
}

fn restart_set(machine: &mut WorkoutMachine, _input: ToolInput<'_>) -> Result<ToolResponse, ToolResponse> {
    machine.restart_set()?;
    let set_number = machine.context().map_or(0, |c| c.set_number());
    Ok(ToolResponse::ok(format!("Set {set_number} restarted.")))
}

fn extend_rest(machine: &mut WorkoutMachine, input: ToolInput<'_>) -> Result<ToolResponse, ToolResponse> {
    let seconds = input.required_u32("seconds")?;
    machine.extend_rest(seconds)?;
    Ok(ToolResponse::ok(format!("Rest extended by {seconds} seconds.")))
}

fn jump_to_set(machine: &mut WorkoutMachine, input: ToolInput<'_>) -> Result<ToolResponse, ToolResponse> {
    let set_number = input.required_u32("set_number")?;
    machine.jump_to_set(set_number)?;
    let target = machine
        .context()
        .map(|c| format_target(c.target_reps, c.target_weight))
        .unwrap_or_default();
    Ok(ToolResponse::ok(format!(
        "Jumped to set {set_number}: {target}. Say when you're ready."
    )))
}

fn adjust_weight(machine: &mut WorkoutMachine, input: ToolInput<'_>) -> Result<ToolResponse, ToolResponse> {
    let new_weight = input.required_f64("new_weight")?;
    let reason = input.string("reason")?.unwrap_or_default();
    machine.adjust_weight(new_weight, reason)?;
    Ok(ToolResponse::ok(format!(
        "Weight set to {} kg.",
        crate::machine::format_weight(new_weight)
    )))
}

fn adjust_reps(machine: &mut WorkoutMachine, input: ToolInput<'_>) -> Result<ToolResponse, ToolResponse> {
    let new_reps = input.required_u32("new_reps")?;
    let reason = input.string("reason")?.unwrap_or_default();
    machine.adjust_reps(new_reps, reason)?;
    Ok(ToolResponse::ok(format!("Reps set to {new_reps}.")))
}

fn adjust_rest_time(machine: &mut WorkoutMachine, input: ToolInput<'_>) -> Result<ToolResponse, ToolResponse> {
    let seconds = input.required_u32("new_rest_seconds")?;
    let reason = input.string("reason")?.unwrap_or_default();
    machine.adjust_rest_time(seconds, reason)?;
    let message = match machine.time_remaining() {
        Some(left) if machine.phase().is_rest() => {
            format!("Rest set to {seconds} seconds, {}s left.", left.as_secs())
        }
        _ => format!("Rest set to {seconds} seconds."),
    };
    Ok(ToolResponse::ok(message))
}

fn get_workout_status(machine: &mut WorkoutMachine, _input: ToolInput<'_>) -> Result<ToolResponse, ToolResponse> {
    let Some(status) = machine.status() else {
        return Ok(ToolResponse::failure("No active workout"));
    };
    let data = serde_json::to_value(&status).unwrap_or(Value::Null);
    Ok(ToolResponse::ok_with(status.context_message(), data))
}

fn get_exercise_instructions(
    machine: &mut WorkoutMachine,
    _input: ToolInput<'_>,
) -> Result<ToolResponse, ToolResponse> {
    let info = machine.exercise_instructions()?;
    let message = info
        .instructions
        .clone()
        .or_else(|| info.description.clone())
        .unwrap_or_else(|| format!("No instructions available for {}.", info.name));
    let data = serde_json::to_value(&info).unwrap_or(Value::Null);
    Ok(ToolResponse::ok_with(message, data))
}

fn pause_for_issue(machine: &mut WorkoutMachine, input: ToolInput<'_>) -> Result<ToolResponse, ToolResponse> {
    let issue = input.required_string("issue")?;
    machine.pause(issue.clone())?;
    Ok(ToolResponse::ok(format!(
        "Paused for: {issue}. Take your time and say resume when ready."
    )))
}
