//! Cloneable handle to a running workout.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::bridge::{CoachSignal, SystemUpdate};
use crate::machine::{StatusSnapshot, WorkoutSummary};
use crate::session::WorkoutSession;
use crate::tools::ToolResponse;

use super::command::{Reply, RuntimeCommand};
use super::RuntimeError;

/// Handle for sending commands to a [`WorkoutRuntime`](super::WorkoutRuntime).
#[derive(Debug, Clone)]
pub struct WorkoutHandle {
    commands: mpsc::Sender<RuntimeCommand>,
    cancel: CancellationToken,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl WorkoutHandle {
    pub(super) fn new(
        commands: mpsc::Sender<RuntimeCommand>,
        cancel: CancellationToken,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            commands,
            cancel,
            task: Arc::new(Mutex::new(Some(task))),
        }
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> RuntimeCommand,
    ) -> Result<T, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(command(tx))
            .await
            .map_err(|_| RuntimeError::Stopped)?;
        rx.await.map_err(|_| RuntimeError::Stopped)
    }

    /// Begin a workout.
    ///
    /// # Errors
    ///
    /// Returns an error if the machine rejects the workout, its start cannot
    /// be recorded, or the runtime has stopped.
    pub async fn select_workout(&self, workout: WorkoutSession) -> Result<(), RuntimeError> {
        self.request(|reply| RuntimeCommand::SelectWorkout {
            workout: Box::new(workout),
            reply,
        })
        .await?
    }

    /// Invoke a routed tool.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Stopped`] if the runtime has stopped. Tool
    /// failures are reported inside the response.
    pub async fn call_tool(&self, name: &str, args: Value) -> Result<ToolResponse, RuntimeError> {
        self.request(|reply| RuntimeCommand::CallTool {
            name: name.to_string(),
            args,
            reply,
        })
        .await
    }

    /// End the workout now.
    ///
    /// # Errors
    ///
    /// Returns an error if no workout is active, the summary cannot be
    /// recorded, or the runtime has stopped.
    pub async fn finish_early(&self) -> Result<WorkoutSummary, RuntimeError> {
        self.request(|reply| RuntimeCommand::FinishEarly { reply })
            .await?
    }

    /// Complete the current exercise regardless of remaining sets.
    ///
    /// # Errors
    ///
    /// Returns an error if no workout is active or the runtime has stopped.
    pub async fn complete_exercise(&self) -> Result<(), RuntimeError> {
        self.request(|reply| RuntimeCommand::CompleteExercise { reply })
            .await?
    }

    /// Report the voice agent connection state.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Stopped`] if the runtime has stopped.
    pub async fn set_agent_connected(
        &self,
        connected: bool,
    ) -> Result<Option<SystemUpdate>, RuntimeError> {
        self.request(|reply| RuntimeCommand::SetAgentConnected { connected, reply })
            .await
    }

    /// Snapshot of the active workout, if any.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Stopped`] if the runtime has stopped.
    pub async fn status(&self) -> Result<Option<StatusSnapshot>, RuntimeError> {
        self.request(|reply| RuntimeCommand::Status { reply }).await
    }

    /// Subscribe to system updates. Dropping the receiver unsubscribes.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Stopped`] if the runtime has stopped.
    pub async fn subscribe(&self) -> Result<broadcast::Receiver<SystemUpdate>, RuntimeError> {
        self.request(|reply| RuntimeCommand::Subscribe { reply }).await
    }

    /// Subscribe to keep-alive and cue signals.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Stopped`] if the runtime has stopped.
    pub async fn subscribe_signals(&self) -> Result<broadcast::Receiver<CoachSignal>, RuntimeError> {
        self.request(|reply| RuntimeCommand::SubscribeSignals { reply })
            .await
    }

    /// Reset the machine, dropping the workout and all subscribers.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Stopped`] if the runtime has stopped.
    pub async fn cleanup(&self) -> Result<(), RuntimeError> {
        self.request(|reply| RuntimeCommand::Cleanup { reply }).await
    }

    /// Whether the runtime task is still accepting commands.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.commands.is_closed() && !self.cancel.is_cancelled()
    }

    /// Stop the runtime and wait for its task to finish.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let task = self.task.lock().await.take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Workout runtime task failed");
            }
        }
    }
}
