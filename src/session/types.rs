//! Workout plan types: sessions, exercises and prescribed sets.

use serde::{Deserialize, Serialize};

/// How hard a completed set felt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Impossible,
}

impl Difficulty {
    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Impossible => "impossible",
        }
    }

    /// Parse a difficulty, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            "impossible" => Some(Self::Impossible),
            _ => None,
        }
    }
}

/// One prescribed unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSet {
    pub id: String,
    /// 1-based position within the exercise.
    pub set_number: u32,
    pub target_reps: u32,
    /// Absent means bodyweight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_weight: Option<f64>,
    /// Work duration in seconds for timed sets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_time: Option<u32>,
    /// Rest prescribed after this set, in seconds.
    #[serde(default)]
    pub rest_time_after: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub is_completed: bool,
}

impl WorkoutSet {
    /// Create a set with targets and no outcome yet.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        set_number: u32,
        target_reps: u32,
        target_weight: Option<f64>,
        rest_time_after: u32,
    ) -> Self {
        Self {
            id: id.into(),
            set_number,
            target_reps,
            target_weight,
            target_time: None,
            rest_time_after,
            actual_reps: None,
            actual_weight: None,
            difficulty: None,
            is_completed: false,
        }
    }

    /// Set the work duration for a timed set.
    #[must_use]
    pub fn with_target_time(mut self, seconds: u32) -> Self {
        self.target_time = Some(seconds);
        self
    }

    /// Whether any outcome field is already filled in.
    #[must_use]
    pub fn has_outcome(&self) -> bool {
        self.is_completed
            || self.actual_reps.is_some()
            || self.actual_weight.is_some()
            || self.difficulty.is_some()
    }
}

/// An exercise and its ordered sets. Metadata is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    /// Identifier of this exercise's entry in the stored workout, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub muscle_groups: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub sets: Vec<WorkoutSet>,
}

impl Exercise {
    /// Create an exercise with no metadata.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, sets: Vec<WorkoutSet>) -> Self {
        Self {
            id: id.into(),
            entry_id: None,
            name: name.into(),
            muscle_groups: Vec::new(),
            description: None,
            instructions: None,
            sets,
        }
    }

    /// Number of prescribed sets.
    #[must_use]
    pub fn total_sets(&self) -> usize {
        self.sets.len()
    }

    /// Whether every set has been completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        !self.sets.is_empty() && self.sets.iter().all(|s| s.is_completed)
    }
}

/// A pre-built workout to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: String,
    pub name: String,
    pub exercises: Vec<Exercise>,
}

impl WorkoutSession {
    /// Create a session.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, exercises: Vec<Exercise>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            exercises,
        }
    }

    /// Total number of sets across all exercises.
    #[must_use]
    pub fn total_sets(&self) -> usize {
        self.exercises.iter().map(Exercise::total_sets).sum()
    }

    /// Number of sets marked completed.
    #[must_use]
    pub fn completed_sets(&self) -> usize {
        self.exercises
            .iter()
            .flat_map(|e| e.sets.iter())
            .filter(|s| s.is_completed)
            .count()
    }

    /// Number of exercises with every set completed.
    #[must_use]
    pub fn completed_exercises(&self) -> usize {
        self.exercises.iter().filter(|e| e.is_completed()).count()
    }

    /// Check the structural invariants the state machine relies on.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.exercises.is_empty() {
            return Err(format!("Workout '{}' has no exercises", self.name));
        }
        for exercise in &self.exercises {
            if exercise.sets.is_empty() {
                return Err(format!("Exercise '{}' has no sets", exercise.name));
            }
            for (idx, set) in exercise.sets.iter().enumerate() {
                let expected = u32::try_from(idx + 1).unwrap_or(u32::MAX);
                if set.set_number != expected {
                    return Err(format!(
                        "Exercise '{}' set {} is numbered {}",
                        exercise.name, expected, set.set_number
                    ));
                }
                if set.has_outcome() {
                    return Err(format!(
                        "Exercise '{}' set {} already has a recorded outcome",
                        exercise.name, set.set_number
                    ));
                }
            }
        }
        Ok(())
    }
}
