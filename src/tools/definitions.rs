//! Tool definitions for language-model tool calling.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Name, description and JSON-schema parameters of one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDefinition {
    fn new(name: &str, description: &str, parameters: Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
        }
    }
}

fn no_params() -> Value {
    json!({ "type": "object", "properties": {} })
}

fn reason_param() -> Value {
    json!({ "type": "string", "description": "Why the change is being made" })
}

/// Definitions for every routed tool, in routing order.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "start_set",
            "The user is ready: start the prepared set, or move on from a rest.",
            no_params(),
        ),
        ToolDefinition::new(
            "complete_set",
            "Finish the current set, optionally reporting what was actually done.",
            json!({
                "type": "object",
                "properties": {
                    "actual_reps": { "type": "integer", "minimum": 0 },
                    "actual_weight": { "type": "number", "minimum": 0 },
                    "difficulty": { "type": "string", "enum": ["easy", "medium", "hard", "impossible"] }
                }
            }),
        ),
        ToolDefinition::new(
            "pause_set",
            "Pause the running set or rest timer.",
            json!({
                "type": "object",
                "properties": { "reason": { "type": "string" } }
            }),
        ),
        ToolDefinition::new("resume_set", "Resume a paused set or rest timer.", no_params()),
        ToolDefinition::new("restart_set", "Restart the current set from the beginning.", no_params()),
        ToolDefinition::new(
            "extend_rest",
            "Add rest time when the rest is about to end.",
            json!({
                "type": "object",
                "properties": { "seconds": { "type": "integer", "minimum": 1 } },
                "required": ["seconds"]
            }),
        ),
        ToolDefinition::new(
            "jump_to_set",
            "Move to a specific set of the current exercise.",
            json!({
                "type": "object",
                "properties": { "set_number": { "type": "integer", "minimum": 1 } },
                "required": ["set_number"]
            }),
        ),
        ToolDefinition::new(
            "adjust_weight",
            "Change the target weight for the upcoming and remaining sets.",
            json!({
                "type": "object",
                "properties": {
                    "new_weight": { "type": "number", "minimum": 0 },
                    "reason": reason_param()
                },
                "required": ["new_weight"]
            }),
        ),
        ToolDefinition::new(
            "adjust_reps",
            "Change the target reps for the upcoming and remaining sets.",
            json!({
                "type": "object",
                "properties": {
                    "new_reps": { "type": "integer", "minimum": 1 },
                    "reason": reason_param()
                },
                "required": ["new_reps"]
            }),
        ),
        ToolDefinition::new(
            "adjust_rest_time",
            "Change the rest time; a running rest is resized immediately.",
            json!({
                "type": "object",
                "properties": {
                    "new_rest_seconds": { "type": "integer", "minimum": 1 },
                    "reason": reason_param()
                },
                "required": ["new_rest_seconds"]
            }),
        ),
        ToolDefinition::new(
            "get_workout_status",
            "Get the current workout position, phase and timers.",
            no_params(),
        ),
        ToolDefinition::new(
            "get_exercise_instructions",
            "Get the description and instructions for the current exercise.",
            no_params(),
        ),
        ToolDefinition::new(
            "pause_for_issue",
            "Pause because the user reported a problem such as pain or equipment trouble.",
            json!({
                "type": "object",
                "properties": { "issue": { "type": "string" } },
                "required": ["issue"]
            }),
        ),
    ]
}
