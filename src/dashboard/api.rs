//! API response types for the dashboard HTTP endpoints.

use serde::{Deserialize, Serialize};

use crate::machine::StatusSnapshot;

/// Response for GET /api/status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Whether a workout is in progress.
    pub active: bool,
    /// Snapshot of the workout, absent when none is active.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusSnapshot>,
    /// Context sentence for the voice agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_message: Option<String>,
}

impl StatusResponse {
    #[must_use]
    pub fn new(status: Option<StatusSnapshot>) -> Self {
        Self {
            active: status.is_some(),
            context_message: status.as_ref().map(StatusSnapshot::context_message),
            status,
        }
    }
}
