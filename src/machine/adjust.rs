//! Mid-workout target adjustments.
//!
//! Weight and reps changes land on the upcoming set and every later set of
//! the current exercise. Rest changes land on the current set onward and
//! resize a rest that is already running.

use std::time::Duration;

use chrono::Utc;
use serde_json::json;

use crate::bridge::UpdateEvent;
use crate::record::{AdjustmentRecord, RecordRequest};

use super::engine::secs;
use super::{Adjustment, AdjustmentKind, CommandError, WorkoutMachine, WorkoutPhase};

impl WorkoutMachine {
    /// Change the target weight.
    ///
    /// # Errors
    ///
    /// Returns an error if no workout is active, no set is left to adjust,
    /// or the weight is negative.
    pub fn adjust_weight(
        &mut self,
        new_weight: f64,
        reason: impl Into<String>,
    ) -> Result<(), CommandError> {
        let first = self.upcoming_set_index("adjust the weight")?;
        if !new_weight.is_finite() || new_weight < 0.0 {
            return Err(self.invalid_input("Weight must be zero or a positive number"));
        }
        let reason = reason.into();
        let Some(active) = self.session.as_mut() else {
            return Err(CommandError::NoActiveWorkout);
        };
        let sets = active.sets_mut();
        let from = sets[first].target_weight;
        for set in &mut sets[first..] {
            set.target_weight = Some(new_weight);
        }
        active.context.target_weight = Some(new_weight);

        self.record_adjustment(AdjustmentKind::Weight, from, Some(new_weight), &reason, first);
        tracing::info!(from = ?from, to = new_weight, reason = %reason, "Weight adjusted");
        self.emit(
            UpdateEvent::WeightAdjusted,
            json!({ "from": from, "to": new_weight, "reason": reason }),
        );
        Ok(())
    }

    /// Change the target reps.
    ///
    /// # Errors
    ///
    /// Returns an error if no workout is active, no set is left to adjust,
    /// or `new_reps` is zero.
    pub fn adjust_reps(
        &mut self,
        new_reps: u32,
        reason: impl Into<String>,
    ) -> Result<(), CommandError> {
        let first = self.upcoming_set_index("adjust the reps")?;
        if new_reps == 0 {
            return Err(self.invalid_input("Reps must be a positive number"));
        }
        let reason = reason.into();
        let Some(active) = self.session.as_mut() else {
            return Err(CommandError::NoActiveWorkout);
        };
        let sets = active.sets_mut();
        let from = sets[first].target_reps;
        for set in &mut sets[first..] {
            set.target_reps = new_reps;
        }
        active.context.target_reps = new_reps;

        self.record_adjustment(
            AdjustmentKind::Reps,
            Some(f64::from(from)),
            Some(f64::from(new_reps)),
            &reason,
            first,
        );
        tracing::info!(from, to = new_reps, reason = %reason, "Reps adjusted");
        self.emit(
            UpdateEvent::RepsAdjusted,
            json!({ "from": from, "to": new_reps, "reason": reason }),
        );
        Ok(())
    }

    /// Change the rest time. A running rest is resized immediately; if that
    /// leaves the warning window or less, the machine enters `rest-ending`.
    ///
    /// # Errors
    ///
    /// Returns an error if no workout is active or `seconds` is zero.
    pub fn adjust_rest_time(
        &mut self,
        seconds: u32,
        reason: impl Into<String>,
    ) -> Result<(), CommandError> {
        if self.session.is_none() {
            return Err(self.reject("adjust the rest time"));
        }
        if seconds == 0 {
            return Err(self.invalid_input("Rest time must be a positive number of seconds"));
        }
        let reason = reason.into();
        let default_rest = self.timing.default_rest_secs;
        let live_rest = self.phase.is_rest() && self.rest_timer.is_some();
        let Some(active) = self.session.as_mut() else {
            return Err(CommandError::NoActiveWorkout);
        };
        let first = active.context.set_index;
        let sets = active.sets_mut();
        // The set data holds the prescription, or the last adjustment to it.
        let from = match sets[first].rest_time_after {
            0 => default_rest,
            n => u64::from(n),
        };
        for set in &mut sets[first..] {
            set.rest_time_after = seconds;
        }

        #[allow(clippy::cast_precision_loss)]
        let from_secs = from as f64;
        self.record_adjustment(
            AdjustmentKind::Rest,
            Some(from_secs),
            Some(f64::from(seconds)),
            &reason,
            first,
        );
        tracing::info!(from, to = seconds, reason = %reason, "Rest time adjusted");
        self.emit(
            UpdateEvent::RestTimeAdjusted,
            json!({ "from": from, "to": seconds, "reason": reason }),
        );
        if live_rest {
            self.resize_live_rest(secs(seconds));
        }
        Ok(())
    }

    fn resize_live_rest(&mut self, duration: Duration) {
        let now = self.now();
        let floor = self.timing.rest_resume_floor();
        let warning = self.timing.rest_warning();
        let Some(rest) = self.rest_timer.as_mut() else {
            return;
        };
        rest.prescribed = duration;
        let remaining = rest.countdown.resize(now, duration, floor);
        let is_last_set = rest.is_last_set;
        tracing::debug!(remaining_secs = remaining.as_secs(), "Live rest resized");

        if is_last_set {
            self.schedule_rest_expiry(remaining);
        } else if remaining <= warning {
            if self.phase == WorkoutPhase::Resting {
                self.enter_rest_ending();
            }
        } else {
            self.transition(WorkoutPhase::Resting);
            self.schedule_rest_expiry(remaining);
        }
    }

    /// Index of the first set an adjustment should land on.
    fn upcoming_set_index(&self, action: &'static str) -> Result<usize, CommandError> {
        let Some(active) = self.session.as_ref() else {
            return Err(self.reject(action));
        };
        let after_set = matches!(
            self.phase,
            WorkoutPhase::SetComplete | WorkoutPhase::Resting | WorkoutPhase::RestEnding
        );
        let index = active.context.set_index + usize::from(after_set);
        if index >= active.exercise().sets.len() {
            return Err(self.invalid_input(format!(
                "No sets of {} left to adjust",
                active.exercise().name
            )));
        }
        Ok(index)
    }

    fn record_adjustment(
        &mut self,
        kind: AdjustmentKind,
        from: Option<f64>,
        to: Option<f64>,
        reason: &str,
        first: usize,
    ) {
        let Some(active) = self.session.as_mut() else {
            return;
        };
        let exercise = active.exercise();
        let affected_set_numbers: Vec<u32> =
            exercise.sets[first..].iter().map(|s| s.set_number).collect();
        let record = AdjustmentRecord {
            session_id: active.id,
            kind,
            workout_entry_id: exercise.entry_id.clone(),
            exercise_id: Some(exercise.id.clone()),
            from,
            to,
            reason: reason.to_string(),
            affects_future_sets: first > active.context.set_index || affected_set_numbers.len() > 1,
            affected_set_numbers,
            timestamp: Utc::now(),
        };
        active.adjustments.push(Adjustment::new(kind, from, to, reason));
        self.outbox.push(RecordRequest::Adjusted(record));
    }
}
