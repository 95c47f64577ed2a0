//! Command rejection errors.

use super::WorkoutPhase;

/// Why a command was rejected. State is never changed when one is returned.
///
/// The `Display` text is meant to be shown or spoken to the user as is.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    /// No workout is selected.
    #[error("No active workout")]
    NoActiveWorkout,

    /// A workout is already running.
    #[error("A workout is already in progress; finish it before selecting another")]
    WorkoutAlreadyActive,

    /// The command is not allowed in the current phase.
    #[error("Cannot {action} while {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: WorkoutPhase,
    },

    /// The command's input is out of range or malformed.
    #[error("{0}")]
    InvalidInput(String),
}
