//! Set and rest timer behavior: expiry, pause accounting, floors, keep-alive.

use std::time::Duration;

use workout_coach::bridge::{AudioCue, CoachSignal, UpdateEvent};
use workout_coach::machine::WorkoutPhase;
use workout_coach::session::{Exercise, WorkoutSession, WorkoutSet};

use super::{do_set, events, machine, push_pull, select_and_prepare, signals};

#[test]
fn pause_resume_round_trip_preserves_remaining() {
    let (mut machine, clock) = machine();
    select_and_prepare(&mut machine, &clock, push_pull());
    machine.confirm_ready_and_start_set().unwrap();

    clock.advance_secs(5);
    assert!(machine.pause("phone call").unwrap());
    assert!(machine.is_paused());
    clock.advance_secs(3);
    assert!(machine.resume().unwrap());

    assert_eq!(machine.time_remaining(), Some(Duration::from_secs(40)));

    clock.advance_secs(10);
    let performance = machine
        .complete_set(workout_coach::machine::SetCompletion::default())
        .unwrap();
    assert_eq!(performance.duration, 15);
    assert_eq!(performance.pause_time, 3);
    assert_eq!(performance.total_elapsed, 18);
}

#[test]
fn pause_and_resume_are_idempotent() {
    let (mut machine, clock) = machine();
    select_and_prepare(&mut machine, &clock, push_pull());
    machine.confirm_ready_and_start_set().unwrap();
    let mut updates = machine.subscribe();

    assert!(!machine.resume().unwrap());
    clock.advance_secs(5);
    assert!(machine.pause("water").unwrap());
    clock.advance_secs(2);
    assert!(!machine.pause("water again").unwrap());
    clock.advance_secs(2);
    assert!(machine.resume().unwrap());
    assert!(!machine.resume().unwrap());

    // Four seconds paused, counted once.
    assert_eq!(machine.time_remaining(), Some(Duration::from_secs(40)));
    assert_eq!(
        events(&mut updates),
        vec![UpdateEvent::SetPaused, UpdateEvent::SetResumed]
    );
}

#[test]
fn pause_outside_a_timer_is_rejected() {
    let (mut machine, clock) = machine();
    select_and_prepare(&mut machine, &clock, push_pull());
    let err = machine.pause("x").unwrap_err();
    assert_eq!(err.to_string(), "Cannot pause while preparing");
}

#[test]
fn paused_set_does_not_expire() {
    let (mut machine, clock) = machine();
    select_and_prepare(&mut machine, &clock, push_pull());
    machine.confirm_ready_and_start_set().unwrap();
    clock.advance_secs(10);
    machine.pause("spotter").unwrap();

    clock.advance_secs(300);
    machine.poll_timers();
    assert_eq!(machine.phase(), WorkoutPhase::Exercising);
    assert_eq!(machine.time_remaining(), Some(Duration::from_secs(35)));
}

#[test]
fn resumed_set_keeps_a_minimum_floor() {
    let (mut machine, clock) = machine();
    select_and_prepare(&mut machine, &clock, push_pull());
    machine.confirm_ready_and_start_set().unwrap();
    clock.advance_secs(43);
    machine.pause("cramp").unwrap();
    clock.advance_secs(20);
    machine.resume().unwrap();

    assert_eq!(machine.time_remaining(), Some(Duration::from_secs(5)));
    clock.advance_secs(4);
    machine.poll_timers();
    assert_eq!(machine.phase(), WorkoutPhase::Exercising);
    clock.advance_secs(1);
    machine.poll_timers();
    assert_eq!(machine.phase(), WorkoutPhase::SetComplete);
}

#[test]
fn set_timer_expiry_completes_with_targets() {
    let (mut machine, clock) = machine();
    let timed = Exercise::new(
        "plank",
        "Plank",
        vec![WorkoutSet::new("p1", 1, 1, None, 30).with_target_time(20)],
    );
    select_and_prepare(&mut machine, &clock, WorkoutSession::new("w", "Core", vec![timed]));
    machine.confirm_ready_and_start_set().unwrap();

    clock.advance_secs(20);
    machine.poll_timers();

    assert_eq!(machine.phase(), WorkoutPhase::SetComplete);
    let record = &machine.completed_sets()[0];
    assert_eq!(record.performance.actual_reps, 1);
    assert_eq!(record.performance.duration, 20);
}

#[test]
fn keep_alive_pings_while_exercising_only() {
    let (mut machine, clock) = machine();
    select_and_prepare(&mut machine, &clock, push_pull());
    let mut rx = machine.subscribe_signals();
    machine.confirm_ready_and_start_set().unwrap();

    clock.advance_secs(30);
    machine.poll_timers();
    assert_eq!(
        signals(&mut rx),
        vec![CoachSignal::Cue(AudioCue::Start), CoachSignal::UserActivity]
    );

    machine.pause("rest a moment").unwrap();
    clock.advance_secs(60);
    machine.poll_timers();
    assert!(signals(&mut rx).is_empty());

    machine.resume().unwrap();
    clock.advance_secs(15);
    machine.poll_timers();
    // 30s of work then 15 after resume: the set expires, no further ping.
    assert_eq!(machine.phase(), WorkoutPhase::SetComplete);
    assert_eq!(signals(&mut rx), vec![CoachSignal::Cue(AudioCue::End)]);
}

#[test]
fn rest_warning_fires_ten_seconds_before_the_end() {
    let (mut machine, clock) = machine();
    select_and_prepare(&mut machine, &clock, push_pull());
    do_set(&mut machine, &clock);
    let mut updates = machine.subscribe();

    clock.advance_secs(39);
    machine.poll_timers();
    assert_eq!(machine.phase(), WorkoutPhase::Resting);
    clock.advance_secs(1);
    machine.poll_timers();
    assert_eq!(machine.phase(), WorkoutPhase::RestEnding);

    let update = updates.try_recv().unwrap();
    assert_eq!(update.event, UpdateEvent::RestEnding);
    assert_eq!(update.data["timeRemaining"], 10);
    assert_eq!(update.data["nextSetNumber"], 2);

    // Rest-ending waits for the user.
    clock.advance_secs(600);
    assert_eq!(machine.poll_timers(), 0);
    assert_eq!(machine.phase(), WorkoutPhase::RestEnding);
}

#[test]
fn extend_rest_restarts_the_warning() {
    let (mut machine, clock) = machine();
    select_and_prepare(&mut machine, &clock, push_pull());
    do_set(&mut machine, &clock);
    clock.advance_secs(40);
    machine.poll_timers();
    assert_eq!(machine.phase(), WorkoutPhase::RestEnding);

    assert_eq!(
        machine.extend_rest(0).unwrap_err().to_string(),
        "Rest extension must be a positive number of seconds"
    );
    machine.extend_rest(30).unwrap();

    assert_eq!(machine.phase(), WorkoutPhase::Resting);
    assert_eq!(machine.time_remaining(), Some(Duration::from_secs(40)));
    clock.advance_secs(29);
    machine.poll_timers();
    assert_eq!(machine.phase(), WorkoutPhase::Resting);
    clock.advance_secs(1);
    machine.poll_timers();
    assert_eq!(machine.phase(), WorkoutPhase::RestEnding);
}

#[test]
fn paused_rest_holds_and_resumes_above_floor() {
    let (mut machine, clock) = machine();
    select_and_prepare(&mut machine, &clock, push_pull());
    do_set(&mut machine, &clock);
    clock.advance_secs(35);
    machine.pause("chat").unwrap();

    clock.advance_secs(120);
    machine.poll_timers();
    assert_eq!(machine.phase(), WorkoutPhase::Resting);
    assert_eq!(machine.time_remaining(), Some(Duration::from_secs(15)));

    machine.resume().unwrap();
    clock.advance_secs(5);
    machine.poll_timers();
    assert_eq!(machine.phase(), WorkoutPhase::RestEnding);
}

#[test]
fn start_exercise_preparation_from_rest_ending_advances() {
    let (mut machine, clock) = machine();
    select_and_prepare(&mut machine, &clock, push_pull());
    do_set(&mut machine, &clock);
    clock.advance_secs(40);
    machine.poll_timers();

    machine.start_exercise_preparation().unwrap();

    assert_eq!(machine.phase(), WorkoutPhase::Preparing);
    assert_eq!(machine.context().unwrap().set_number(), 2);
    assert_eq!(machine.rest_is_last_set(), None);
}
