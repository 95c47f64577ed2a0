//! The task that owns the workout machine.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::machine::{CommandError, WorkoutMachine};
use crate::record::{RecordError, WorkoutRecorder};
use crate::tools::ToolRouter;

use super::command::{Reply, RuntimeCommand};
use super::{RuntimeError, WorkoutHandle};

/// Default buffer size for the command channel.
pub const DEFAULT_COMMAND_BUFFER: usize = 64;

/// Single owner of a [`WorkoutMachine`].
///
/// Commands and timer batches are applied one at a time, each running to
/// completion before the next is taken. After every step the machine's
/// record requests are handed to the recorder.
pub struct WorkoutRuntime {
    machine: WorkoutMachine,
    router: ToolRouter,
    recorder: Arc<dyn WorkoutRecorder>,
    commands: mpsc::Receiver<RuntimeCommand>,
    cancel: CancellationToken,
}

impl WorkoutRuntime {
    /// Move `machine` into a new task and return a handle to it.
    ///
    /// The task stops when `cancel` fires, when [`WorkoutHandle::shutdown`]
    /// is called or when every handle is dropped.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(
        machine: WorkoutMachine,
        recorder: Arc<dyn WorkoutRecorder>,
        cancel: CancellationToken,
    ) -> WorkoutHandle {
        let (tx, rx) = mpsc::channel(DEFAULT_COMMAND_BUFFER);
        let runtime = Self {
            machine,
            router: ToolRouter::new(),
            recorder,
            commands: rx,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(runtime.run());
        WorkoutHandle::new(tx, cancel, task)
    }

    async fn run(mut self) {
        tracing::info!("Workout runtime started");
        loop {
            let next_due = self.machine.next_timer_due();
            tokio::select! {
                biased;

                () = self.cancel.cancelled() => {
                    tracing::info!("Workout runtime cancelled");
                    break;
                }
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        tracing::debug!("All workout handles dropped");
                        break;
                    };
                    self.handle(command).await;
                }
                () = sleep_until_due(next_due) => {
                    self.run_due_timers().await;
                }
            }
        }
        if let Err(e) = self.flush().await {
            tracing::error!(error = %e, "Failed to record final workout state");
        }
        self.machine.cleanup();
        tracing::info!("Workout runtime stopped");
    }

    async fn run_due_timers(&mut self) {
        let fired = self.machine.poll_timers();
        if fired == 0 {
            return;
        }
        tracing::trace!(fired, phase = %self.machine.phase(), "Timers fired");
        if let Err(e) = self.flush().await {
            tracing::error!(error = %e, "Failed to record timer-driven progress");
        }
    }

    async fn handle(&mut self, command: RuntimeCommand) {
        tracing::debug!(command = command.name(), "Runtime command");
        // Commands observe every timer that is already due.
        self.run_due_timers().await;

        match command {
            RuntimeCommand::SelectWorkout { workout, reply } => {
                let result = self.machine.select_workout(*workout);
                let result = self.settle(result).await;
                respond(reply, result);
            }
            RuntimeCommand::CallTool { name, args, reply } => {
                let response = self.router.call(&mut self.machine, &name, &args);
                let response = match self.flush().await {
                    Err(e) if response.success => response.unsaved(&e.to_string()),
                    _ => response,
                };
                respond(reply, response);
            }
            RuntimeCommand::FinishEarly { reply } => {
                let result = self.machine.finish_workout_early();
                let result = self.settle(result).await;
                respond(reply, result);
            }
            RuntimeCommand::CompleteExercise { reply } => {
                let result = self.machine.complete_exercise();
                let result = self.settle(result).await;
                respond(reply, result);
            }
            RuntimeCommand::SetAgentConnected { connected, reply } => {
                respond(reply, self.machine.set_agent_connected(connected));
            }
            RuntimeCommand::Status { reply } => respond(reply, self.machine.status()),
            RuntimeCommand::Subscribe { reply } => respond(reply, self.machine.subscribe()),
            RuntimeCommand::SubscribeSignals { reply } => {
                respond(reply, self.machine.subscribe_signals());
            }
            RuntimeCommand::Cleanup { reply } => {
                if let Err(e) = self.flush().await {
                    tracing::error!(error = %e, "Failed to record state before cleanup");
                }
                self.machine.cleanup();
                respond(reply, ());
            }
        }
    }

    /// Store pending records, then report the command outcome. A storage
    /// failure after a successful command becomes [`RuntimeError::Unsaved`].
    async fn settle<T>(&mut self, result: Result<T, CommandError>) -> Result<T, RuntimeError> {
        let saved = self.flush().await;
        let value = result?;
        saved.map_err(|e| RuntimeError::Unsaved(e.to_string()))?;
        Ok(value)
    }

    /// Hand every pending record to the recorder, in order. Returns the
    /// first failure after attempting them all.
    async fn flush(&mut self) -> Result<(), RecordError> {
        let requests = self.machine.drain_records();
        let mut first_error = None;
        for request in &requests {
            if let Err(e) = self.recorder.record(request).await {
                tracing::error!(
                    kind = request.kind(),
                    session_id = %request.session_id(),
                    error = %e,
                    "Failed to record workout progress"
                );
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

async fn sleep_until_due(due: Option<Instant>) {
    match due {
        Some(due) => tokio::time::sleep_until(tokio::time::Instant::from_std(due)).await,
        None => std::future::pending().await,
    }
}

fn respond<T>(reply: Reply<T>, value: T) {
    if reply.send(value).is_err() {
        tracing::debug!("Caller dropped before the reply was sent");
    }
}
