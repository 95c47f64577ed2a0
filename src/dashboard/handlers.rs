//! HTTP handlers for the dashboard API.

use std::convert::Infallible;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures_util::stream::StreamExt;
use serde_json::Value;
use tokio_stream::wrappers::BroadcastStream;

use super::api::StatusResponse;
use crate::runtime::{RuntimeError, WorkoutHandle};
use crate::session::WorkoutSession;
use crate::tools::{tool_definitions, ToolDefinition, ToolResponse};

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Handle to the running workout.
    pub workout: WorkoutHandle,
}

impl AppState {
    #[must_use]
    pub fn new(workout: WorkoutHandle) -> Self {
        Self { workout }
    }
}

fn unavailable(err: &RuntimeError) -> (StatusCode, Json<ToolResponse>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ToolResponse::failure(err.to_string())),
    )
}

/// GET /api/status - Snapshot of the active workout.
pub async fn get_status(
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, (StatusCode, Json<ToolResponse>)> {
    let status = state.workout.status().await.map_err(|e| unavailable(&e))?;
    Ok(Json(StatusResponse::new(status)))
}

/// GET /api/events - SSE stream of system updates.
pub async fn get_events_sse(
    State(state): State<AppState>,
) -> Result<
    Sse<impl futures_core::Stream<Item = Result<Event, Infallible>>>,
    (StatusCode, Json<ToolResponse>),
> {
    let rx = state.workout.subscribe().await.map_err(|e| unavailable(&e))?;
    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(update) => {
                let data = serde_json::to_string(&update).ok()?;
                Some(Ok(Event::default().event(update.event.as_str()).data(data)))
            }
            Err(_) => None, // Skip lagged messages
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// GET /api/tools - Tool definitions for language-model tool calling.
pub async fn get_tools() -> Json<Vec<ToolDefinition>> {
    Json(tool_definitions())
}

/// POST /api/tools/:name - Invoke a tool. An empty body means no arguments.
pub async fn post_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Json<ToolResponse> {
    let args = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Object(serde_json::Map::new())
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(args @ Value::Object(_)) => args,
            _ => return Json(ToolResponse::failure("Request body must be a JSON object")),
        }
    };
    match state.workout.call_tool(&name, args).await {
        Ok(response) => Json(response),
        Err(e) => Json(ToolResponse::failure(e.to_string())),
    }
}

/// POST /api/workout - Select a workout session.
pub async fn post_workout(
    State(state): State<AppState>,
    Json(workout): Json<WorkoutSession>,
) -> Json<ToolResponse> {
    let name = workout.name.clone();
    match state.workout.select_workout(workout).await {
        Ok(()) => Json(ToolResponse::ok(format!("Workout {name} selected"))),
        Err(e) => Json(ToolResponse::failure(e.to_string())),
    }
}

/// POST /api/workout/finish - End the workout early.
pub async fn post_finish(State(state): State<AppState>) -> Json<ToolResponse> {
    match state.workout.finish_early().await {
        Ok(summary) => {
            let message = format!(
                "Workout finished: {} of {} sets in {}s",
                summary.completed_sets, summary.total_sets, summary.total_time
            );
            let data = serde_json::to_value(&summary).unwrap_or(Value::Null);
            Json(ToolResponse::ok_with(message, data))
        }
        Err(e) => Json(ToolResponse::failure(e.to_string())),
    }
}

/// POST /api/agent/connect - Mark the voice agent connected.
pub async fn post_agent_connect(State(state): State<AppState>) -> Json<ToolResponse> {
    match state.workout.set_agent_connected(true).await {
        Ok(Some(update)) => Json(ToolResponse::ok_with("Agent connected", update.data)),
        Ok(None) => Json(ToolResponse::ok("Agent connected")),
        Err(e) => Json(ToolResponse::failure(e.to_string())),
    }
}

/// POST /api/agent/disconnect - Mark the voice agent disconnected.
pub async fn post_agent_disconnect(State(state): State<AppState>) -> Json<ToolResponse> {
    match state.workout.set_agent_connected(false).await {
        Ok(_) => Json(ToolResponse::ok("Agent disconnected")),
        Err(e) => Json(ToolResponse::failure(e.to_string())),
    }
}
