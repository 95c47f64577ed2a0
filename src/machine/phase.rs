//! Workout progression phases.

use serde::{Deserialize, Serialize};

/// Current phase of a workout session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkoutPhase {
    #[default]
    Inactive,
    Selected,
    Preparing,
    Exercising,
    SetComplete,
    Resting,
    RestEnding,
    ExerciseTransition,
}

impl WorkoutPhase {
    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Selected => "selected",
            Self::Preparing => "preparing",
            Self::Exercising => "exercising",
            Self::SetComplete => "set-complete",
            Self::Resting => "resting",
            Self::RestEnding => "rest-ending",
            Self::ExerciseTransition => "exercise-transition",
        }
    }

    /// Whether a workout is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Inactive)
    }

    /// Whether the rest timer is the relevant timer.
    #[must_use]
    pub fn is_rest(&self) -> bool {
        matches!(self, Self::Resting | Self::RestEnding)
    }
}

impl std::fmt::Display for WorkoutPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
