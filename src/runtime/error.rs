//! Runtime error types.

use crate::machine::CommandError;

/// Errors returned by [`WorkoutHandle`](super::WorkoutHandle) operations.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The runtime task has exited.
    #[error("Workout runtime stopped")]
    Stopped,

    /// The machine rejected the command.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// The command took effect but its records could not be stored.
    #[error("Change applied, but could not be saved: {0}")]
    Unsaved(String),
}

impl RuntimeError {
    /// Whether the machine state changed despite the error.
    #[must_use]
    pub fn was_applied(&self) -> bool {
        matches!(self, Self::Unsaved(_))
    }
}
