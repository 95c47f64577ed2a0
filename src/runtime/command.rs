//! Messages sent from handles to the runtime task.

use serde_json::Value;
use tokio::sync::{broadcast, oneshot};

use crate::bridge::{CoachSignal, SystemUpdate};
use crate::machine::{StatusSnapshot, WorkoutSummary};
use crate::session::WorkoutSession;
use crate::tools::ToolResponse;

use super::RuntimeError;

pub(super) type Reply<T> = oneshot::Sender<T>;

/// One request for the machine, answered through its reply channel.
#[derive(Debug)]
pub(super) enum RuntimeCommand {
    SelectWorkout {
        workout: Box<WorkoutSession>,
        reply: Reply<Result<(), RuntimeError>>,
    },
    CallTool {
        name: String,
        args: Value,
        reply: Reply<ToolResponse>,
    },
    FinishEarly {
        reply: Reply<Result<WorkoutSummary, RuntimeError>>,
    },
    CompleteExercise {
        reply: Reply<Result<(), RuntimeError>>,
    },
    SetAgentConnected {
        connected: bool,
        reply: Reply<Option<SystemUpdate>>,
    },
    Status {
        reply: Reply<Option<StatusSnapshot>>,
    },
    Subscribe {
        reply: Reply<broadcast::Receiver<SystemUpdate>>,
    },
    SubscribeSignals {
        reply: Reply<broadcast::Receiver<CoachSignal>>,
    },
    Cleanup {
        reply: Reply<()>,
    },
}

impl RuntimeCommand {
    pub(super) fn name(&self) -> &'static str {
        match self {
            Self::SelectWorkout { .. } => "select_workout",
            Self::CallTool { .. } => "call_tool",
            Self::FinishEarly { .. } => "finish_early",
            Self::CompleteExercise { .. } => "complete_exercise",
            Self::SetAgentConnected { .. } => "set_agent_connected",
            Self::Status { .. } => "status",
            Self::Subscribe { .. } => "subscribe",
            Self::SubscribeSignals { .. } => "subscribe_signals",
            Self::Cleanup { .. } => "cleanup",
        }
    }
}
