//! System update events broadcast to the UI and the voice agent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed vocabulary of system update events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateEvent {
    WorkoutSelected,
    ExercisePreparation,
    SetStarted,
    SetPaused,
    SetResumed,
    SetRestarted,
    SetJumped,
    SetCompleted,
    RestStarted,
    RestPaused,
    RestResumed,
    RestEnding,
    RestExtended,
    RestTimeAdjusted,
    WeightAdjusted,
    RepsAdjusted,
    ExerciseChanged,
    WorkoutCompleted,
    WorkoutFinishedEarly,
    VoiceAgentConnected,
}

impl UpdateEvent {
    /// Get the wire name of the event.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WorkoutSelected => "workout-selected",
            Self::ExercisePreparation => "exercise-preparation",
            Self::SetStarted => "set-started",
            Self::SetPaused => "set-paused",
            Self::SetResumed => "set-resumed",
            Self::SetRestarted => "set-restarted",
            Self::SetJumped => "set-jumped",
            Self::SetCompleted => "set-completed",
            Self::RestStarted => "rest-started",
            Self::RestPaused => "rest-paused",
            Self::RestResumed => "rest-resumed",
            Self::RestEnding => "rest-ending",
            Self::RestExtended => "rest-extended",
            Self::RestTimeAdjusted => "rest-time-adjusted",
            Self::WeightAdjusted => "weight-adjusted",
            Self::RepsAdjusted => "reps-adjusted",
            Self::ExerciseChanged => "exercise-changed",
            Self::WorkoutCompleted => "workout-completed",
            Self::WorkoutFinishedEarly => "workout-finished-early",
            Self::VoiceAgentConnected => "voice-agent-connected",
        }
    }
}

impl std::fmt::Display for UpdateEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured notification of something the machine did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemUpdate {
    pub event: UpdateEvent,
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl SystemUpdate {
    /// Create an update stamped with the current time.
    #[must_use]
    pub fn new(event: UpdateEvent, data: serde_json::Value) -> Self {
        Self {
            event,
            data,
            timestamp: Utc::now(),
        }
    }
}

/// Audio cue the presentation layer should play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCue {
    Start,
    End,
}

/// Side-channel signals that are not state updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "signal", content = "cue", rename_all = "kebab-case")]
pub enum CoachSignal {
    /// Keep-alive sent while the user is silently working through a set.
    UserActivity,
    /// Play a cue.
    Cue(AudioCue),
}
