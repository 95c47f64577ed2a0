//! The workout progression state machine.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::bridge::{AudioCue, CoachSignal, NotificationBridge, SystemUpdate, UpdateEvent};
use crate::config::TimingConfig;
use crate::record::{RecordRequest, RestRecord, SessionEndRecord, SessionRecord, SetRecord};
use crate::session::{Exercise, WorkoutSession, WorkoutSet};
use crate::timer::{whole_secs, Clock, CountdownTimer, Scheduler, SystemClock};

use super::{
    Adjustment, CommandError, CompletedSetRecord, ExerciseInfo, SetCompletion, SetPerformance,
    StatusSnapshot, WorkoutContext, WorkoutPhase, WorkoutSummary,
};

/// What a scheduled task does when it comes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TimerKind {
    /// selected -> preparing
    AutoPrepare,
    /// set-complete -> resting
    AutoStartRest,
    SetExpired,
    /// Fires `rest_warning` before the end of a non-final rest.
    RestWarning,
    /// Fires at the end of the final rest of an exercise.
    RestExpired,
    KeepAlive,
}

/// Machine position a task was scheduled for. A task whose guard no longer
/// matches the machine is dropped without effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct TimerGuard {
    phase: WorkoutPhase,
    exercise_index: usize,
    set_index: usize,
}

#[derive(Debug, Clone, Copy)]
pub(super) struct TimerTask {
    kind: TimerKind,
    guard: TimerGuard,
}

/// Rest countdown plus what it was started for.
#[derive(Debug)]
pub(super) struct RestTimer {
    pub(super) countdown: CountdownTimer,
    /// Fixed when the rest starts.
    pub(super) is_last_set: bool,
    pub(super) prescribed: Duration,
    exercise_id: String,
    set_number: u32,
}

/// Everything that lives exactly as long as one workout.
#[derive(Debug)]
pub(super) struct ActiveSession {
    pub(super) id: Uuid,
    /// Working copy; set outcomes and adjustments are written here.
    pub(super) workout: WorkoutSession,
    pub(super) context: WorkoutContext,
    started_at: Instant,
    set_started_at: Option<DateTime<Utc>>,
    pub(super) completed_sets: Vec<CompletedSetRecord>,
    pub(super) adjustments: Vec<Adjustment>,
}

impl ActiveSession {
    /// Exercise under the cursor. The context is always in bounds.
    pub(super) fn exercise(&self) -> &Exercise {
        &self.workout.exercises[self.context.exercise_index]
    }

    pub(super) fn set(&self) -> &WorkoutSet {
        &self.exercise().sets[self.context.set_index]
    }

    pub(super) fn sets_mut(&mut self) -> &mut [WorkoutSet] {
        &mut self.workout.exercises[self.context.exercise_index].sets
    }

    fn summary(&self, now: Instant, finished_early: bool) -> WorkoutSummary {
        let completed_sets = self.workout.completed_sets();
        let total_sets = self.workout.total_sets();
        WorkoutSummary {
            session_name: self.workout.name.clone(),
            total_time: whole_secs(now.saturating_duration_since(self.started_at)),
            completed_exercises: self.workout.completed_exercises(),
            total_exercises: self.workout.exercises.len(),
            completed_sets,
            total_sets,
            sets_completed: self.completed_sets.clone(),
            adjustments_made: self.adjustments.clone(),
            is_fully_completed: !finished_early && completed_sets == total_sets,
            finished_early: finished_early.then_some(true),
            current_exercise: finished_early.then(|| self.exercise().name.clone()),
            current_set: finished_early.then(|| self.context.set_number()),
        }
    }
}

/// Sequences and times a pre-built workout.
///
/// The machine is synchronous: commands run to completion and timers are
/// stored as deferred tasks that the owner drives through
/// [`poll_timers`](Self::poll_timers), using
/// [`next_timer_due`](Self::next_timer_due) to know when to wake. Rejected
/// commands return a [`CommandError`] and leave the machine untouched.
///
/// Durable record requests accumulate in an outbox drained with
/// [`drain_records`](Self::drain_records).
#[derive(Debug)]
pub struct WorkoutMachine {
    pub(super) timing: TimingConfig,
    clock: Arc<dyn Clock>,
    pub(super) phase: WorkoutPhase,
    pub(super) session: Option<ActiveSession>,
    set_timer: Option<CountdownTimer>,
    pub(super) rest_timer: Option<RestTimer>,
    scheduler: Scheduler<TimerTask>,
    bridge: NotificationBridge,
    pub(super) outbox: Vec<RecordRequest>,
}

impl WorkoutMachine {
    /// Create a machine driven by the system clock.
    #[must_use]
    pub fn new(timing: TimingConfig) -> Self {
        Self::with_clock(timing, Arc::new(SystemClock))
    }

    /// Create a machine with an injected clock.
    #[must_use]
    pub fn with_clock(timing: TimingConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            timing,
            clock,
            phase: WorkoutPhase::Inactive,
            session: None,
            set_timer: None,
            rest_timer: None,
            scheduler: Scheduler::new(),
            bridge: NotificationBridge::new(),
            outbox: Vec::new(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> WorkoutPhase {
        self.phase
    }

    #[must_use]
    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Live cursor, present while a workout is active.
    #[must_use]
    pub fn context(&self) -> Option<&WorkoutContext> {
        self.session.as_ref().map(|s| &s.context)
    }

    /// Working copy of the active workout.
    #[must_use]
    pub fn session(&self) -> Option<&WorkoutSession> {
        self.session.as_ref().map(|s| &s.workout)
    }

    /// Identifier used for record requests of the active workout.
    #[must_use]
    pub fn session_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(|s| s.id)
    }

    #[must_use]
    pub fn current_exercise(&self) -> Option<&Exercise> {
        self.session.as_ref().map(ActiveSession::exercise)
    }

    #[must_use]
    pub fn current_set(&self) -> Option<&WorkoutSet> {
        self.session.as_ref().map(ActiveSession::set)
    }

    /// Completed-set history of the active workout.
    #[must_use]
    pub fn completed_sets(&self) -> &[CompletedSetRecord] {
        self.session
            .as_ref()
            .map_or(&[], |s| s.completed_sets.as_slice())
    }

    /// Adjustment history of the active workout.
    #[must_use]
    pub fn adjustments(&self) -> &[Adjustment] {
        self.session.as_ref().map_or(&[], |s| s.adjustments.as_slice())
    }

    /// Whether the timer relevant to the current phase is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        match self.phase {
            WorkoutPhase::Exercising => self.set_timer.as_ref().is_some_and(CountdownTimer::is_paused),
            WorkoutPhase::Resting | WorkoutPhase::RestEnding => self
                .rest_timer
                .as_ref()
                .is_some_and(|r| r.countdown.is_paused()),
            _ => false,
        }
    }

    /// Time left on the timer relevant to the current phase.
    #[must_use]
    pub fn time_remaining(&self) -> Option<Duration> {
        let now = self.now();
        match self.phase {
            WorkoutPhase::Exercising => self.set_timer.as_ref().map(|t| t.remaining(now)),
            WorkoutPhase::Resting | WorkoutPhase::RestEnding => {
                self.rest_timer.as_ref().map(|r| r.countdown.remaining(now))
            }
            _ => None,
        }
    }

    /// Whether the running rest follows the final set of its exercise.
    #[must_use]
    pub fn rest_is_last_set(&self) -> Option<bool> {
        self.rest_timer.as_ref().map(|r| r.is_last_set)
    }

    /// Subscribe to system updates.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SystemUpdate> {
        self.bridge.subscribe()
    }

    /// Subscribe to keep-alive and audio cue signals.
    #[must_use]
    pub fn subscribe_signals(&self) -> broadcast::Receiver<CoachSignal> {
        self.bridge.subscribe_signals()
    }

    #[must_use]
    pub fn agent_connected(&self) -> bool {
        self.bridge.agent_connected()
    }

    /// When the earliest pending timer comes due.
    #[must_use]
    pub fn next_timer_due(&self) -> Option<Instant> {
        self.scheduler.next_due()
    }

    /// Number of pending timers.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    /// Take the record requests produced since the last drain.
    pub fn drain_records(&mut self) -> Vec<RecordRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Begin a workout.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::WorkoutAlreadyActive`] if a workout is running,
    /// or [`CommandError::InvalidInput`] if the workout is malformed.
    pub fn select_workout(&mut self, workout: WorkoutSession) -> Result<(), CommandError> {
        if self.session.is_some() {
            tracing::warn!(workout = %workout.name, "Rejected selection: workout already active");
            return Err(CommandError::WorkoutAlreadyActive);
        }
        workout
            .validate()
            .map_err(|message| self.invalid_input(message))?;
        let Some(context) = WorkoutContext::at(&workout, 0, 0) else {
            return Err(self.invalid_input("Workout has no sets"));
        };

        let active = ActiveSession {
            id: Uuid::new_v4(),
            workout,
            context,
            started_at: self.now(),
            set_started_at: None,
            completed_sets: Vec::new(),
            adjustments: Vec::new(),
        };
        tracing::info!(
            session_id = %active.id,
            workout = %active.workout.name,
            exercises = active.workout.exercises.len(),
            "Workout selected"
        );
        self.outbox.push(RecordRequest::SessionStarted(SessionRecord {
            session_id: active.id,
            workout_id: active.workout.id.clone(),
            workout_name: active.workout.name.clone(),
            started_at: Utc::now(),
        }));
        let data = json!({
            "workoutName": active.workout.name,
            "exercises": active
                .workout
                .exercises
                .iter()
                .map(|e| json!({
                    "name": e.name,
                    "sets": e.sets.len(),
                    "muscleGroups": e.muscle_groups,
                }))
                .collect::<Vec<_>>(),
            "currentExercise": active.exercise().name,
        });

        self.session = Some(active);
        self.transition(WorkoutPhase::Selected);
        self.bridge.emit(UpdateEvent::WorkoutSelected, data);
        self.schedule(self.timing.auto_prepare_delay(), TimerKind::AutoPrepare);
        Ok(())
    }

    /// Move to `preparing` for the current set.
    ///
    /// From `rest-ending` the cursor first advances to the next set.
    ///
    /// # Errors
    ///
    /// Returns an error unless the phase is `selected`, `rest-ending` or
    /// `exercise-transition`.
    pub fn start_exercise_preparation(&mut self) -> Result<(), CommandError> {
        match self.phase {
            WorkoutPhase::Selected | WorkoutPhase::ExerciseTransition => {}
            WorkoutPhase::RestEnding => {
                self.finish_rest();
                self.advance_set();
            }
            _ => return Err(self.reject("prepare the exercise")),
        }
        self.enter_preparing();
        Ok(())
    }

    /// The user is ready. Returns the phase the machine landed in.
    ///
    /// From `preparing` the set starts. From a rest the cursor advances and
    /// the machine stops in `preparing`, waiting for a second confirmation;
    /// after the final set of an exercise the exercise completes instead.
    ///
    /// # Errors
    ///
    /// Returns an error from `inactive`, `selected`, `exercising` and
    /// `set-complete`.
    pub fn confirm_ready_and_start_set(&mut self) -> Result<WorkoutPhase, CommandError> {
        match self.phase {
            WorkoutPhase::Preparing => self.start_set(),
            WorkoutPhase::Resting | WorkoutPhase::RestEnding if self.rest_follows_last_set() => {
                tracing::info!("Ready after final set, completing exercise");
                self.complete_current_exercise();
            }
            WorkoutPhase::Resting | WorkoutPhase::RestEnding => {
                self.finish_rest();
                self.advance_set();
                self.enter_preparing();
            }
            WorkoutPhase::ExerciseTransition => self.enter_preparing(),
            _ => return Err(self.reject("start the set")),
        }
        Ok(self.phase)
    }

    /// Finish the running set. Missing values default to the live targets.
    ///
    /// # Errors
    ///
    /// Returns an error unless exercising, or if the reported weight is negative.
    pub fn complete_set(&mut self, completion: SetCompletion) -> Result<SetPerformance, CommandError> {
        if self.phase != WorkoutPhase::Exercising || self.session.is_none() {
            return Err(self.reject("complete the set"));
        }
        if completion
            .actual_weight
            .is_some_and(|w| !w.is_finite() || w < 0.0)
        {
            return Err(self.invalid_input("Weight must be zero or a positive number"));
        }

        let now = self.now();
        let (duration, total_elapsed, pause_time) =
            self.set_timer.take().map_or((Duration::ZERO, Duration::ZERO, Duration::ZERO), |t| {
                (t.elapsed(now), t.wall_elapsed(now), t.total_paused(now))
            });
        self.cancel(&[TimerKind::SetExpired, TimerKind::KeepAlive]);
        let completed_at = Utc::now();

        let Some(active) = self.session.as_mut() else {
            return Err(CommandError::NoActiveWorkout);
        };
        let ctx = active.context.clone();
        let session_id = active.id;
        let started_at = active.set_started_at.take().unwrap_or(completed_at);
        let exercise = &mut active.workout.exercises[ctx.exercise_index];
        let exercise_id = exercise.id.clone();
        let workout_entry_id = exercise.entry_id.clone();
        let set = &mut exercise.sets[ctx.set_index];

        let actual_reps = completion.actual_reps.unwrap_or(ctx.target_reps);
        let actual_weight = completion.actual_weight.or(ctx.target_weight);
        set.actual_reps = Some(actual_reps);
        set.actual_weight = actual_weight;
        set.difficulty = completion.difficulty;
        if set.is_completed {
            tracing::debug!(set = set.set_number, "Set completed again, overwriting actuals");
        } else {
            set.is_completed = true;
        }

        let performance = SetPerformance {
            actual_reps,
            actual_weight,
            difficulty: completion.difficulty,
            duration: whole_secs(duration),
            total_elapsed: whole_secs(total_elapsed),
            pause_time: whole_secs(pause_time),
        };
        let set_number = set.set_number;
        let set_id = set.id.clone();
        let record = SetRecord {
            session_id,
            workout_entry_id,
            exercise_id: exercise_id.clone(),
            set_id: set_id.clone(),
            set_number,
            target_reps: ctx.target_reps,
            target_weight: ctx.target_weight,
            target_time: set.target_time,
            actual_reps,
            actual_weight,
            difficulty: completion.difficulty,
            duration_secs: performance.duration,
            pause_secs: performance.pause_time,
            started_at,
            completed_at,
        };
        active.completed_sets.push(CompletedSetRecord {
            exercise_id,
            set_id,
            set_number,
            performance: performance.clone(),
        });
        self.outbox.push(RecordRequest::SetCompleted(record));

        self.transition(WorkoutPhase::SetComplete);
        tracing::info!(
            set = set_number,
            actual_reps,
            duration_secs = performance.duration,
            pause_secs = performance.pause_time,
            "Set completed"
        );
        self.bridge.emit(
            UpdateEvent::SetCompleted,
            json!({
                "setNumber": set_number,
                "actualReps": actual_reps,
                "targetReps": ctx.target_reps,
                "duration": performance.duration,
                "totalElapsed": performance.total_elapsed,
                "pauseTime": performance.pause_time,
            }),
        );
        self.bridge.signal(CoachSignal::Cue(AudioCue::End));
        self.schedule(self.timing.auto_rest_delay(), TimerKind::AutoStartRest);
        Ok(performance)
    }

    /// Start the rest after a completed set.
    ///
    /// # Errors
    ///
    /// Returns an error unless the phase is `set-complete`.
    pub fn start_rest(&mut self) -> Result<(), CommandError> {
        if self.phase != WorkoutPhase::SetComplete {
            return Err(self.reject("start the rest"));
        }
        let now = self.now();
        let default_rest = self.timing.default_rest();
        let Some(active) = self.session.as_ref() else {
            return Err(CommandError::NoActiveWorkout);
        };
        let set = active.set();
        let duration = if set.rest_time_after == 0 {
            default_rest
        } else {
            secs(set.rest_time_after)
        };
        let is_last_set = active.context.is_last_set(&active.workout);
        let set_number = set.set_number;
        let set_index = active.context.set_index;
        let total_sets = active.exercise().sets.len();
        let exercise_id = active.exercise().id.clone();

        self.cancel(&[TimerKind::AutoStartRest]);
        self.rest_timer = Some(RestTimer {
            countdown: CountdownTimer::start(now, duration),
            is_last_set,
            prescribed: duration,
            exercise_id,
            set_number,
        });
        self.transition(WorkoutPhase::Resting);
        self.schedule_rest_expiry(duration);
        tracing::info!(
            duration_secs = duration.as_secs(),
            is_last_set,
            "Rest started"
        );
        self.bridge.emit(
            UpdateEvent::RestStarted,
            json!({
                "duration": duration.as_secs(),
                "setJustCompleted": set_number,
                "isLastSet": is_last_set,
                "currentSetIndex": set_index,
                "totalSets": total_sets,
            }),
        );
        Ok(())
    }

    /// Leave the current exercise: on to the next one, or finish the workout.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::NoActiveWorkout`] if no workout is active.
    pub fn complete_exercise(&mut self) -> Result<(), CommandError> {
        if self.session.is_none() {
            return Err(self.reject("complete the exercise"));
        }
        self.complete_current_exercise();
        Ok(())
    }

    /// Stop the workout now and return its summary.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::NoActiveWorkout`] if no workout is active.
    pub fn finish_workout_early(&mut self) -> Result<WorkoutSummary, CommandError> {
        if self.session.is_none() {
            return Err(self.reject("finish the workout"));
        }
        self.finish_rest();
        self.clear_timers();
        let Some(active) = self.session.take() else {
            return Err(CommandError::NoActiveWorkout);
        };
        let summary = self.end_session(&active, true);
        tracing::info!(
            workout = %summary.session_name,
            completed_sets = summary.completed_sets,
            total_sets = summary.total_sets,
            "Workout finished early"
        );
        self.bridge
            .emit(UpdateEvent::WorkoutFinishedEarly, to_data(&summary));
        Ok(summary)
    }

    /// Freeze the running set or rest timer.
    ///
    /// Returns `false` if it was already paused.
    ///
    /// # Errors
    ///
    /// Returns an error unless exercising or resting.
    pub fn pause(&mut self, reason: impl Into<String>) -> Result<bool, CommandError> {
        let reason = reason.into();
        let now = self.now();
        match self.phase {
            WorkoutPhase::Exercising => {
                let Some(timer) = self.set_timer.as_mut() else {
                    return Ok(false);
                };
                if !timer.pause(now) {
                    tracing::debug!("Set already paused");
                    return Ok(false);
                }
                let worked = timer.elapsed(now);
                self.cancel(&[TimerKind::SetExpired, TimerKind::KeepAlive]);
                tracing::info!(reason = %reason, worked_secs = worked.as_secs(), "Set paused");
                self.bridge.emit(
                    UpdateEvent::SetPaused,
                    json!({
                        "reason": reason,
                        "workingTimeBeforePause": whole_secs(worked),
                    }),
                );
            }
            WorkoutPhase::Resting | WorkoutPhase::RestEnding => {
                let Some(rest) = self.rest_timer.as_mut() else {
                    return Ok(false);
                };
                if !rest.countdown.pause(now) {
                    tracing::debug!("Rest already paused");
                    return Ok(false);
                }
                self.cancel(&[TimerKind::RestWarning, TimerKind::RestExpired]);
                tracing::info!(reason = %reason, "Rest paused");
                self.bridge
                    .emit(UpdateEvent::RestPaused, json!({ "reason": reason }));
            }
            _ => return Err(self.reject("pause")),
        }
        Ok(true)
    }

    /// Unfreeze the running set or rest timer.
    ///
    /// Returns `false` if it was not paused.
    ///
    /// # Errors
    ///
    /// Returns an error unless exercising or resting.
    pub fn resume(&mut self) -> Result<bool, CommandError> {
        let now = self.now();
        match self.phase {
            WorkoutPhase::Exercising => {
                let floor = self.timing.set_resume_floor();
                let Some(remaining) = self.set_timer.as_mut().and_then(|t| t.resume(now, floor))
                else {
                    tracing::debug!("Set not paused");
                    return Ok(false);
                };
                self.schedule_set_expiry(remaining);
                tracing::info!(remaining_secs = remaining.as_secs(), "Set resumed");
                self.bridge.emit(UpdateEvent::SetResumed, json!({}));
            }
            WorkoutPhase::Resting | WorkoutPhase::RestEnding => {
                let floor = self.timing.rest_resume_floor();
                let Some(remaining) = self
                    .rest_timer
                    .as_mut()
                    .and_then(|r| r.countdown.resume(now, floor))
                else {
                    tracing::debug!("Rest not paused");
                    return Ok(false);
                };
                if self.phase == WorkoutPhase::Resting {
                    self.schedule_rest_expiry(remaining);
                } else if self.rest_follows_last_set() {
                    self.schedule(remaining, TimerKind::RestExpired);
                }
                tracing::info!(remaining_secs = remaining.as_secs(), "Rest resumed");
                self.bridge.emit(UpdateEvent::RestResumed, json!({}));
            }
            _ => return Err(self.reject("resume")),
        }
        Ok(true)
    }

    /// Start the running set over with a fresh timer.
    ///
    /// # Errors
    ///
    /// Returns an error unless exercising.
    pub fn restart_set(&mut self) -> Result<(), CommandError> {
        if self.phase != WorkoutPhase::Exercising {
            return Err(self.reject("restart the set"));
        }
        let duration = self.arm_set_timer();
        self.schedule_set_expiry(duration);
        tracing::info!(duration_secs = duration.as_secs(), "Set restarted");
        self.bridge.emit(UpdateEvent::SetRestarted, json!({}));
        self.bridge.signal(CoachSignal::Cue(AudioCue::Start));
        Ok(())
    }

    /// Move the cursor to a set of the current exercise and wait in
    /// `preparing`. Allowed from any active phase.
    ///
    /// # Errors
    ///
    /// Returns an error if no workout is active or `set_number` is outside
    /// `1..=total_sets`.
    pub fn jump_to_set(&mut self, set_number: u32) -> Result<(), CommandError> {
        let Some(active) = self.session.as_ref() else {
            return Err(self.reject("jump to a set"));
        };
        let total = active.exercise().sets.len();
        let index = usize::try_from(set_number).unwrap_or(usize::MAX);
        if index == 0 || index > total {
            return Err(self.invalid_input(format!("Set number must be between 1 and {total}")));
        }
        let Some(context) = WorkoutContext::at(&active.workout, active.context.exercise_index, index - 1)
        else {
            return Err(self.invalid_input(format!("Set number must be between 1 and {total}")));
        };

        self.finish_rest();
        self.clear_timers();
        let Some(active) = self.session.as_mut() else {
            return Err(CommandError::NoActiveWorkout);
        };
        active.context = context;
        active.set_started_at = None;
        let data = json!({
            "targetSetNumber": set_number,
            "exercise": active.exercise().name,
            "targetReps": active.context.target_reps,
            "targetWeight": active.context.target_weight,
        });
        self.transition(WorkoutPhase::Preparing);
        tracing::info!(set = set_number, "Jumped to set");
        self.bridge.emit(UpdateEvent::SetJumped, data);
        Ok(())
    }

    /// Give more rest from `rest-ending`. The warning fires again `seconds`
    /// from now.
    ///
    /// # Errors
    ///
    /// Returns an error unless in `rest-ending`, or if `seconds` is zero.
    pub fn extend_rest(&mut self, seconds: u32) -> Result<(), CommandError> {
        if self.phase != WorkoutPhase::RestEnding {
            return Err(self.reject("extend the rest"));
        }
        if seconds == 0 {
            return Err(self.invalid_input("Rest extension must be a positive number of seconds"));
        }
        let now = self.now();
        let remaining = secs(seconds) + self.timing.rest_warning();
        if let Some(rest) = self.rest_timer.as_mut() {
            rest.countdown.extend_to(now, remaining);
        }
        self.transition(WorkoutPhase::Resting);
        self.schedule_rest_expiry(remaining);
        tracing::info!(seconds, "Rest extended");
        self.bridge.emit(
            UpdateEvent::RestExtended,
            json!({ "additionalSeconds": seconds }),
        );
        Ok(())
    }

    /// Record the agent connection state. On a disconnected to connected
    /// transition with an active workout, a full context sync is emitted
    /// and returned.
    pub fn set_agent_connected(&mut self, connected: bool) -> Option<SystemUpdate> {
        if !self.bridge.set_agent_connected(connected) {
            return None;
        }
        let status = self.status()?;
        let mut data = to_data(&status);
        if let Some(map) = data.as_object_mut() {
            map.insert(
                "contextMessage".to_string(),
                Value::String(status.context_message()),
            );
        }
        tracing::info!(phase = %self.phase, "Syncing context to voice agent");
        Some(self.bridge.emit(UpdateEvent::VoiceAgentConnected, data))
    }

    /// Snapshot of the active workout.
    #[must_use]
    pub fn status(&self) -> Option<StatusSnapshot> {
        let active = self.session.as_ref()?;
        let now = self.now();
        let exercise = active.exercise();
        let set = active.set();
        let ctx = &active.context;
        Some(StatusSnapshot {
            workout_name: active.workout.name.clone(),
            phase: self.phase,
            exercise_name: exercise.name.clone(),
            exercise_number: ctx.exercise_index + 1,
            total_exercises: active.workout.exercises.len(),
            set_number: ctx.set_number(),
            total_sets: exercise.sets.len(),
            target_reps: ctx.target_reps,
            target_weight: ctx.target_weight,
            target_time: set.target_time,
            rest_time_after: set.rest_time_after,
            elapsed: whole_secs(now.saturating_duration_since(active.started_at)),
            time_remaining: self.time_remaining().map(whole_secs),
            is_paused: self.is_paused(),
            is_last_set: ctx.is_last_set(&active.workout),
            completed_sets: active.workout.completed_sets(),
            total_workout_sets: active.workout.total_sets(),
            agent_connected: self.bridge.agent_connected(),
        })
    }

    /// Descriptive information about the current exercise.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::NoActiveWorkout`] if no workout is active.
    pub fn exercise_instructions(&self) -> Result<ExerciseInfo, CommandError> {
        let Some(active) = self.session.as_ref() else {
            return Err(self.reject("describe the exercise"));
        };
        let exercise = active.exercise();
        Ok(ExerciseInfo {
            name: exercise.name.clone(),
            description: exercise.description.clone(),
            instructions: exercise.instructions.clone(),
            muscle_groups: exercise.muscle_groups.clone(),
            set_number: active.context.set_number(),
            total_sets: exercise.sets.len(),
            target_reps: active.context.target_reps,
            target_weight: active.context.target_weight,
        })
    }

    /// Run every task that is due, one at a time. Returns how many ran.
    pub fn poll_timers(&mut self) -> usize {
        let mut fired = 0;
        while let Some(due) = self.scheduler.pop_due(self.now()) {
            fired += 1;
            self.fire(due.task);
        }
        fired
    }

    /// Reset to a fresh machine: timers cleared, workout dropped and every
    /// subscriber disconnected.
    pub fn cleanup(&mut self) {
        self.clear_timers();
        self.session = None;
        self.outbox.clear();
        self.phase = WorkoutPhase::Inactive;
        self.bridge.reset();
        tracing::debug!("Workout machine reset");
    }

    fn fire(&mut self, task: TimerTask) {
        if task.kind != TimerKind::KeepAlive && task.guard != self.guard() {
            tracing::debug!(kind = ?task.kind, phase = %self.phase, "Skipping stale timer");
            return;
        }
        let outcome = match task.kind {
            TimerKind::AutoPrepare => self.start_exercise_preparation(),
            TimerKind::AutoStartRest => self.start_rest(),
            TimerKind::SetExpired => {
                if self.is_paused() {
                    return;
                }
                tracing::info!("Set timer expired");
                self.complete_set(SetCompletion::default()).map(|_| ())
            }
            TimerKind::RestWarning => {
                self.enter_rest_ending();
                Ok(())
            }
            TimerKind::RestExpired => {
                tracing::info!("Final rest of exercise finished");
                self.complete_current_exercise();
                Ok(())
            }
            TimerKind::KeepAlive => {
                self.keep_alive_tick();
                Ok(())
            }
        };
        if let Err(e) = outcome {
            tracing::warn!(kind = ?task.kind, error = %e, "Timer transition failed");
        }
    }

    fn keep_alive_tick(&mut self) {
        if self.phase != WorkoutPhase::Exercising || self.is_paused() {
            tracing::trace!("Keep-alive stopped");
            return;
        }
        self.bridge.signal(CoachSignal::UserActivity);
        self.schedule(self.timing.keep_alive(), TimerKind::KeepAlive);
    }

    fn enter_preparing(&mut self) {
        self.cancel(&[TimerKind::AutoPrepare]);
        self.transition(WorkoutPhase::Preparing);
        if let Some(active) = self.session.as_ref() {
            let ctx = &active.context;
            tracing::info!(
                exercise = %active.exercise().name,
                set = ctx.set_number(),
                "Preparing set"
            );
            self.bridge.emit(
                UpdateEvent::ExercisePreparation,
                json!({
                    "exerciseName": active.exercise().name,
                    "setNumber": ctx.set_number(),
                    "targetReps": ctx.target_reps,
                    "targetWeight": ctx.target_weight,
                }),
            );
        }
    }

    fn start_set(&mut self) {
        let duration = self.arm_set_timer();
        self.transition(WorkoutPhase::Exercising);
        self.schedule_set_expiry(duration);

        let (set_number, target_reps) = self
            .session
            .as_ref()
            .map_or((0, 0), |s| (s.context.set_number(), s.context.target_reps));
        tracing::info!(set = set_number, duration_secs = duration.as_secs(), "Set started");
        self.bridge.emit(
            UpdateEvent::SetStarted,
            json!({
                "setNumber": set_number,
                "targetReps": target_reps,
                "duration": duration.as_secs(),
            }),
        );
        self.bridge.signal(CoachSignal::Cue(AudioCue::Start));
    }

    /// Start a fresh set timer for the current set.
    fn arm_set_timer(&mut self) -> Duration {
        let now = self.now();
        let duration = self
            .session
            .as_ref()
            .and_then(|s| s.set().target_time)
            .filter(|&t| t > 0)
            .map_or_else(|| self.timing.default_set(), secs);
        if let Some(active) = self.session.as_mut() {
            active.set_started_at = Some(Utc::now());
        }
        self.set_timer = Some(CountdownTimer::start(now, duration));
        duration
    }

    fn schedule_set_expiry(&mut self, remaining: Duration) {
        self.cancel(&[TimerKind::SetExpired, TimerKind::KeepAlive]);
        self.schedule(remaining, TimerKind::SetExpired);
        self.schedule(self.timing.keep_alive(), TimerKind::KeepAlive);
    }

    pub(super) fn enter_rest_ending(&mut self) {
        let now = self.now();
        let remaining = self
            .rest_timer
            .as_ref()
            .map_or(Duration::ZERO, |r| r.countdown.remaining(now));
        let next_set = self
            .session
            .as_ref()
            .map_or(0, |s| s.context.set_number() + 1);
        self.cancel(&[TimerKind::RestWarning, TimerKind::RestExpired]);
        self.transition(WorkoutPhase::RestEnding);
        tracing::info!(remaining_secs = remaining.as_secs(), next_set, "Rest ending");
        self.bridge.emit(
            UpdateEvent::RestEnding,
            json!({
                "timeRemaining": whole_secs(remaining),
                "nextSetNumber": next_set,
            }),
        );
    }

    /// Schedule the end of the running rest `remaining` from now. Paused
    /// rests are scheduled on resume instead.
    pub(super) fn schedule_rest_expiry(&mut self, remaining: Duration) {
        self.cancel(&[TimerKind::RestWarning, TimerKind::RestExpired]);
        let (paused, is_last_set) = match self.rest_timer.as_ref() {
            Some(rest) => (rest.countdown.is_paused(), rest.is_last_set),
            None => return,
        };
        if paused {
            return;
        }
        if is_last_set {
            self.schedule(remaining, TimerKind::RestExpired);
        } else {
            let warning_in = remaining.saturating_sub(self.timing.rest_warning());
            self.schedule(warning_in, TimerKind::RestWarning);
        }
    }

    fn rest_follows_last_set(&self) -> bool {
        match (self.rest_timer.as_ref(), self.session.as_ref()) {
            (Some(rest), _) => rest.is_last_set,
            (None, Some(active)) => active.context.is_last_set(&active.workout),
            (None, None) => false,
        }
    }

    fn advance_set(&mut self) {
        let Some(active) = self.session.as_mut() else {
            return;
        };
        let (exercise_index, set_index) = (active.context.exercise_index, active.context.set_index);
        match WorkoutContext::at(&active.workout, exercise_index, set_index + 1) {
            Some(next) => active.context = next,
            None => tracing::warn!(set = set_index + 1, "No further set to advance to"),
        }
    }

    fn complete_current_exercise(&mut self) {
        self.finish_rest();
        self.clear_timers();
        let next = self.session.as_ref().and_then(|s| {
            WorkoutContext::at(&s.workout, s.context.exercise_index + 1, 0)
        });
        let Some(context) = next else {
            self.complete_workout();
            return;
        };
        let Some(active) = self.session.as_mut() else {
            return;
        };
        active.context = context;
        let exercise = active.exercise();
        tracing::info!(
            exercise = %exercise.name,
            index = active.context.exercise_index,
            "Exercise changed"
        );
        let data = json!({
            "newExercise": exercise.name,
            "exerciseIndex": active.context.exercise_index,
            "totalExercises": active.workout.exercises.len(),
            "description": exercise.description,
            "sets": exercise.sets,
            "targetReps": active.context.target_reps,
            "targetWeight": active.context.target_weight,
        });
        self.transition(WorkoutPhase::ExerciseTransition);
        self.bridge.emit(UpdateEvent::ExerciseChanged, data);
    }

    fn complete_workout(&mut self) {
        self.clear_timers();
        let Some(active) = self.session.take() else {
            return;
        };
        let summary = self.end_session(&active, false);
        tracing::info!(
            workout = %summary.session_name,
            total_secs = summary.total_time,
            completed_sets = summary.completed_sets,
            "Workout completed"
        );
        self.bridge
            .emit(UpdateEvent::WorkoutCompleted, to_data(&summary));
    }

    fn end_session(&mut self, active: &ActiveSession, finished_early: bool) -> WorkoutSummary {
        let summary = active.summary(self.now(), finished_early);
        self.outbox.push(RecordRequest::SessionEnded(SessionEndRecord {
            session_id: active.id,
            ended_at: Utc::now(),
            summary: summary.clone(),
        }));
        self.transition(WorkoutPhase::Inactive);
        summary
    }

    /// Stop the rest timer, recording how long the rest actually lasted.
    fn finish_rest(&mut self) {
        let Some(rest) = self.rest_timer.take() else {
            return;
        };
        self.cancel(&[TimerKind::RestWarning, TimerKind::RestExpired]);
        let now = self.now();
        let Some(session_id) = self.session_id() else {
            return;
        };
        self.outbox.push(RecordRequest::RestCompleted(RestRecord {
            session_id,
            exercise_id: rest.exercise_id,
            set_number: rest.set_number,
            prescribed_secs: whole_secs(rest.prescribed),
            actual_secs: whole_secs(rest.countdown.wall_elapsed(now)),
            ended_at: Utc::now(),
        }));
    }

    fn clear_timers(&mut self) {
        self.scheduler.clear();
        self.set_timer = None;
        self.rest_timer = None;
    }

    pub(super) fn now(&self) -> Instant {
        self.clock.now()
    }

    fn guard(&self) -> TimerGuard {
        let (exercise_index, set_index) = self
            .session
            .as_ref()
            .map_or((0, 0), |s| (s.context.exercise_index, s.context.set_index));
        TimerGuard {
            phase: self.phase,
            exercise_index,
            set_index,
        }
    }

    fn schedule(&mut self, delay: Duration, kind: TimerKind) {
        let task = TimerTask {
            kind,
            guard: self.guard(),
        };
        let due = self.now() + delay;
        self.scheduler.schedule(due, task);
    }

    pub(super) fn cancel(&mut self, kinds: &[TimerKind]) {
        self.scheduler.cancel_where(|t| kinds.contains(&t.kind));
    }

    pub(super) fn transition(&mut self, to: WorkoutPhase) {
        if self.phase != to {
            tracing::debug!(from = %self.phase, to = %to, "Phase transition");
        }
        self.phase = to;
    }

    pub(super) fn emit(&self, event: UpdateEvent, data: Value) {
        self.bridge.emit(event, data);
    }

    /// Log and build a rejection for `action` in the current phase.
    pub(super) fn reject(&self, action: &'static str) -> CommandError {
        if self.session.is_none() {
            tracing::warn!(action, "Rejected command: no active workout");
            return CommandError::NoActiveWorkout;
        }
        tracing::warn!(action, phase = %self.phase, "Rejected command in current phase");
        CommandError::InvalidTransition {
            action,
            phase: self.phase,
        }
    }

    pub(super) fn invalid_input(&self, message: impl Into<String>) -> CommandError {
        let message = message.into();
        tracing::warn!(phase = %self.phase, message = %message, "Rejected command input");
        CommandError::InvalidInput(message)
    }
}

pub(super) fn secs(seconds: u32) -> Duration {
    Duration::from_secs(u64::from(seconds))
}

fn to_data<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to serialize update payload");
        Value::Null
    })
}
