//! Live cursor into the running session.

use serde::{Deserialize, Serialize};

use crate::session::{Exercise, WorkoutSession};

/// Position within the session plus the live targets for that position.
///
/// Targets are denormalised so an adjustment can land before the set it
/// applies to is reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutContext {
    pub exercise_index: usize,
    pub set_index: usize,
    pub target_reps: u32,
    pub target_weight: Option<f64>,
}

impl WorkoutContext {
    /// Build a context at a position, deriving targets from that set.
    ///
    /// Returns `None` if the position is out of bounds.
    #[must_use]
    pub fn at(session: &WorkoutSession, exercise_index: usize, set_index: usize) -> Option<Self> {
        let set = session
            .exercises
            .get(exercise_index)?
            .sets
            .get(set_index)?;
        Some(Self {
            exercise_index,
            set_index,
            target_reps: set.target_reps,
            target_weight: set.target_weight,
        })
    }

    /// Exercise under the cursor.
    #[must_use]
    pub fn exercise<'a>(&self, session: &'a WorkoutSession) -> Option<&'a Exercise> {
        session.exercises.get(self.exercise_index)
    }

    /// 1-based number of the current set.
    #[must_use]
    pub fn set_number(&self) -> u32 {
        u32::try_from(self.set_index + 1).unwrap_or(u32::MAX)
    }

    /// Whether the cursor is on the final set of its exercise.
    #[must_use]
    pub fn is_last_set(&self, session: &WorkoutSession) -> bool {
        self.exercise(session)
            .is_some_and(|e| self.set_index + 1 >= e.sets.len())
    }
}
