//! Structured tool results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::machine::CommandError;

use super::ToolInputError;

/// Outcome of a tool call. Handlers always produce one, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub success: bool,
    /// Human-readable text suitable for display or speech.
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ToolResponse {
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    #[must_use]
    pub fn ok_with(message: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    /// Mark a successful response as not durably saved. The state change
    /// stands; only the save failed.
    #[must_use]
    pub fn unsaved(mut self, error: &str) -> Self {
        self.success = false;
        self.message = format!(
            "{} (applied, but could not be saved: {error})",
            self.message
        );
        self
    }
}

impl From<CommandError> for ToolResponse {
    fn from(err: CommandError) -> Self {
        Self::failure(err.to_string())
    }
}

impl From<ToolInputError> for ToolResponse {
    fn from(err: ToolInputError) -> Self {
        Self::failure(err.to_string())
    }
}
