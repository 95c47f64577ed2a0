//! Workout machine tests driven by a manual clock.

mod invariant_test;
mod scenario_test;
mod timer_test;

use std::sync::Arc;

use tokio::sync::broadcast;
use workout_coach::bridge::{CoachSignal, SystemUpdate, UpdateEvent};
use workout_coach::config::TimingConfig;
use workout_coach::machine::{SetCompletion, WorkoutMachine, WorkoutPhase};
use workout_coach::session::{Exercise, WorkoutSession, WorkoutSet};
use workout_coach::timer::ManualClock;

pub fn machine() -> (WorkoutMachine, ManualClock) {
    let clock = ManualClock::new();
    let machine = WorkoutMachine::with_clock(TimingConfig::default(), Arc::new(clock.clone()));
    (machine, clock)
}

/// Exercise with `sets` sets of 8 reps at 60 kg, `rest` seconds apart.
pub fn exercise(id: &str, name: &str, sets: u32, rest: u32) -> Exercise {
    Exercise::new(
        id,
        name,
        (1..=sets)
            .map(|n| WorkoutSet::new(format!("{id}-{n}"), n, 8, Some(60.0), rest))
            .collect(),
    )
}

pub fn single_set_workout() -> WorkoutSession {
    WorkoutSession::new("w-single", "Quick", vec![exercise("press", "Overhead Press", 1, 60)])
}

/// Bench (3 sets, 50s rest) then Row (2 sets, 60s rest).
pub fn push_pull() -> WorkoutSession {
    WorkoutSession::new(
        "w-push-pull",
        "Push Pull",
        vec![exercise("bench", "Bench Press", 3, 50), exercise("row", "Barbell Row", 2, 60)],
    )
}

/// Wait out the auto-prepare delay.
pub fn select_and_prepare(machine: &mut WorkoutMachine, clock: &ManualClock, workout: WorkoutSession) {
    machine.select_workout(workout).unwrap();
    assert_eq!(machine.phase(), WorkoutPhase::Selected);
    clock.advance_secs(1);
    machine.poll_timers();
    assert_eq!(machine.phase(), WorkoutPhase::Preparing);
}

/// From `preparing`: start, complete and wait out the auto-rest delay.
pub fn do_set(machine: &mut WorkoutMachine, clock: &ManualClock) {
    assert_eq!(machine.confirm_ready_and_start_set().unwrap(), WorkoutPhase::Exercising);
    clock.advance_secs(20);
    machine.complete_set(SetCompletion::default()).unwrap();
    clock.advance_millis(500);
    machine.poll_timers();
    assert_eq!(machine.phase(), WorkoutPhase::Resting);
}

pub fn events(rx: &mut broadcast::Receiver<SystemUpdate>) -> Vec<UpdateEvent> {
    let mut events = Vec::new();
    while let Ok(update) = rx.try_recv() {
        events.push(update.event);
    }
    events
}

pub fn signals(rx: &mut broadcast::Receiver<CoachSignal>) -> Vec<CoachSignal> {
    let mut signals = Vec::new();
    while let Ok(signal) = rx.try_recv() {
        signals.push(signal);
    }
    signals
}

#[test]
fn test_public_machine_types_exported() {
    use workout_coach::machine::{
        Adjustment, AdjustmentKind, CommandError, CompletedSetRecord, SetPerformance,
        StatusSnapshot, WorkoutContext, WorkoutSummary,
    };

    let _: fn() -> CommandError = || CommandError::NoActiveWorkout;
    let _ = Adjustment::new(AdjustmentKind::Reps, Some(8.0), Some(6.0), "tired");
    let _: Option<(CompletedSetRecord, SetPerformance, StatusSnapshot, WorkoutSummary)> = None;
    assert!(WorkoutContext::at(&push_pull(), 1, 1).is_some());
}
