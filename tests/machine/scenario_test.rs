//! End-to-end walks through a workout.

use workout_coach::bridge::UpdateEvent;
use workout_coach::machine::{CommandError, SetCompletion, WorkoutPhase};
use workout_coach::session::{Exercise, WorkoutSession, WorkoutSet};

use super::{do_set, events, machine, push_pull, select_and_prepare, single_set_workout};

#[test]
fn single_set_reaches_rest_flagged_as_last() {
    let (mut machine, clock) = machine();
    let mut updates = machine.subscribe();

    machine.select_workout(single_set_workout()).unwrap();
    assert_eq!(machine.phase(), WorkoutPhase::Selected);

    clock.advance_millis(999);
    machine.poll_timers();
    assert_eq!(machine.phase(), WorkoutPhase::Selected);
    clock.advance_millis(1);
    machine.poll_timers();
    assert_eq!(machine.phase(), WorkoutPhase::Preparing);

    assert_eq!(machine.confirm_ready_and_start_set().unwrap(), WorkoutPhase::Exercising);
    let performance = machine.complete_set(SetCompletion::reps(8)).unwrap();
    assert_eq!(performance.actual_reps, 8);
    assert_eq!(machine.phase(), WorkoutPhase::SetComplete);

    clock.advance_millis(500);
    machine.poll_timers();
    assert_eq!(machine.phase(), WorkoutPhase::Resting);
    assert_eq!(machine.rest_is_last_set(), Some(true));

    assert_eq!(
        events(&mut updates),
        vec![
            UpdateEvent::WorkoutSelected,
            UpdateEvent::ExercisePreparation,
            UpdateEvent::SetStarted,
            UpdateEvent::SetCompleted,
            UpdateEvent::RestStarted,
        ]
    );
}

#[test]
fn last_set_rest_skips_rest_ending() {
    let (mut machine, clock) = machine();
    select_and_prepare(&mut machine, &clock, single_set_workout());
    do_set(&mut machine, &clock);
    let mut updates = machine.subscribe();

    clock.advance_secs(55);
    machine.poll_timers();
    assert_eq!(machine.phase(), WorkoutPhase::Resting);

    clock.advance_secs(5);
    machine.poll_timers();
    assert_eq!(machine.phase(), WorkoutPhase::Inactive);
    assert!(machine.session().is_none());

    let seen = events(&mut updates);
    assert!(!seen.contains(&UpdateEvent::RestEnding));
    assert_eq!(seen.last(), Some(&UpdateEvent::WorkoutCompleted));
}

#[test]
fn last_set_rest_of_first_exercise_moves_to_next_exercise() {
    let (mut machine, clock) = machine();
    select_and_prepare(&mut machine, &clock, push_pull());
    for _ in 0..2 {
        do_set(&mut machine, &clock);
        assert_eq!(machine.confirm_ready_and_start_set().unwrap(), WorkoutPhase::Preparing);
    }
    do_set(&mut machine, &clock);
    assert_eq!(machine.rest_is_last_set(), Some(true));

    clock.advance_secs(50);
    machine.poll_timers();

    assert_eq!(machine.phase(), WorkoutPhase::ExerciseTransition);
    assert_eq!(machine.current_exercise().unwrap().name, "Barbell Row");
    let ctx = machine.context().unwrap();
    assert_eq!((ctx.exercise_index, ctx.set_index), (1, 0));

    assert_eq!(machine.confirm_ready_and_start_set().unwrap(), WorkoutPhase::Preparing);
}

#[test]
fn ready_during_rest_needs_a_second_confirmation() {
    let (mut machine, clock) = machine();
    select_and_prepare(&mut machine, &clock, push_pull());
    do_set(&mut machine, &clock);

    assert_eq!(machine.confirm_ready_and_start_set().unwrap(), WorkoutPhase::Preparing);
    assert_eq!(machine.context().unwrap().set_index, 1);
    assert_eq!(machine.time_remaining(), None);

    assert_eq!(machine.confirm_ready_and_start_set().unwrap(), WorkoutPhase::Exercising);
    assert_eq!(machine.context().unwrap().set_number(), 2);
}

#[test]
fn ready_after_final_set_completes_the_exercise() {
    let (mut machine, clock) = machine();
    select_and_prepare(&mut machine, &clock, push_pull());
    for _ in 0..2 {
        do_set(&mut machine, &clock);
        machine.confirm_ready_and_start_set().unwrap();
    }
    do_set(&mut machine, &clock);

    assert_eq!(
        machine.confirm_ready_and_start_set().unwrap(),
        WorkoutPhase::ExerciseTransition
    );
    assert_eq!(machine.pending_timers(), 0);
}

#[test]
fn adjust_rest_mid_rest_drops_into_rest_ending() {
    let (mut machine, clock) = machine();
    select_and_prepare(&mut machine, &clock, push_pull());
    do_set(&mut machine, &clock);
    let mut updates = machine.subscribe();

    // 45s into a 50s rest, before the pending warning has been delivered.
    clock.advance_secs(45);
    machine.adjust_rest_time(20, "running late").unwrap();

    assert_eq!(machine.phase(), WorkoutPhase::RestEnding);
    assert_eq!(machine.time_remaining().unwrap().as_secs(), 10);
    assert_eq!(
        events(&mut updates),
        vec![UpdateEvent::RestTimeAdjusted, UpdateEvent::RestEnding]
    );

    // The superseded warning never fires a second rest-ending.
    clock.advance_secs(30);
    machine.poll_timers();
    assert_eq!(machine.phase(), WorkoutPhase::RestEnding);
    assert!(events(&mut updates).is_empty());
}

#[test]
fn adjust_rest_during_rest_ending_keeps_the_floor() {
    let (mut machine, clock) = machine();
    select_and_prepare(&mut machine, &clock, push_pull());
    do_set(&mut machine, &clock);

    // 45s into a 50s rest; the warning went out at 40s.
    clock.advance_secs(45);
    machine.poll_timers();
    assert_eq!(machine.phase(), WorkoutPhase::RestEnding);
    let mut updates = machine.subscribe();

    machine.adjust_rest_time(20, "running late").unwrap();

    assert_eq!(machine.phase(), WorkoutPhase::RestEnding);
    assert_eq!(machine.time_remaining().unwrap().as_secs(), 10);
    assert_eq!(events(&mut updates), vec![UpdateEvent::RestTimeAdjusted]);
    assert_eq!(machine.pending_timers(), 0);

    // Rest-ending still waits for the user.
    clock.advance_secs(60);
    assert_eq!(machine.poll_timers(), 0);
    assert_eq!(machine.phase(), WorkoutPhase::RestEnding);
    assert_eq!(machine.confirm_ready_and_start_set().unwrap(), WorkoutPhase::Preparing);
    assert_eq!(machine.context().unwrap().set_number(), 2);
}

#[test]
fn jump_to_set_mid_set_resets_to_preparing() {
    let (mut machine, clock) = machine();
    let bench = Exercise::new(
        "bench",
        "Bench Press",
        (1..=5)
            .map(|n| WorkoutSet::new(format!("b{n}"), n, 4 + n, Some(50.0 + f64::from(n) * 5.0), 90))
            .collect(),
    );
    select_and_prepare(&mut machine, &clock, WorkoutSession::new("w", "Bench", vec![bench]));
    machine.confirm_ready_and_start_set().unwrap();
    assert!(machine.pending_timers() > 0);

    machine.jump_to_set(3).unwrap();

    assert_eq!(machine.phase(), WorkoutPhase::Preparing);
    assert_eq!(machine.pending_timers(), 0);
    assert_eq!(machine.time_remaining(), None);
    let ctx = machine.context().unwrap();
    assert_eq!(ctx.set_index, 2);
    assert_eq!(ctx.target_reps, 7);
    assert_eq!(ctx.target_weight, Some(65.0));

    // Nothing left over from the abandoned set.
    clock.advance_secs(120);
    assert_eq!(machine.poll_timers(), 0);
    assert_eq!(machine.phase(), WorkoutPhase::Preparing);
}

#[test]
fn jump_to_set_out_of_range_is_rejected() {
    let (mut machine, clock) = machine();
    select_and_prepare(&mut machine, &clock, push_pull());

    let err = machine.jump_to_set(4).unwrap_err();
    assert_eq!(err.to_string(), "Set number must be between 1 and 3");
    assert!(machine.jump_to_set(0).is_err());
    assert_eq!(machine.context().unwrap().set_index, 0);
}

#[test]
fn finish_early_during_rest_reports_position() {
    let (mut machine, clock) = machine();
    let mut updates = machine.subscribe();
    select_and_prepare(&mut machine, &clock, push_pull());
    do_set(&mut machine, &clock);

    let summary = machine.finish_workout_early().unwrap();

    assert_eq!(machine.phase(), WorkoutPhase::Inactive);
    assert!(machine.session().is_none());
    assert_eq!(machine.pending_timers(), 0);
    assert_eq!(summary.finished_early, Some(true));
    assert!(!summary.is_fully_completed);
    assert_eq!(summary.current_exercise.as_deref(), Some("Bench Press"));
    assert_eq!(summary.current_set, Some(1));
    assert_eq!(summary.completed_sets, 1);
    assert_eq!(summary.total_sets, 5);
    assert_eq!(events(&mut updates).last(), Some(&UpdateEvent::WorkoutFinishedEarly));

    // The machine is reusable.
    machine.select_workout(single_set_workout()).unwrap();
    assert_eq!(machine.phase(), WorkoutPhase::Selected);
}

#[test]
fn full_workout_completes_with_summary() {
    let (mut machine, clock) = machine();
    let mut updates = machine.subscribe();
    select_and_prepare(&mut machine, &clock, push_pull());

    while machine.phase() != WorkoutPhase::Inactive {
        match machine.phase() {
            WorkoutPhase::Preparing => do_set(&mut machine, &clock),
            WorkoutPhase::Resting | WorkoutPhase::ExerciseTransition => {
                machine.confirm_ready_and_start_set().unwrap();
            }
            other => panic!("unexpected phase {other}"),
        }
    }

    let updates: Vec<_> = std::iter::from_fn(|| updates.try_recv().ok()).collect();
    let completed = updates
        .iter()
        .find(|u| u.event == UpdateEvent::WorkoutCompleted)
        .unwrap();
    assert_eq!(completed.data["isFullyCompleted"], true);
    assert_eq!(completed.data["completedSets"], 5);
    assert_eq!(completed.data["completedExercises"], 2);
    assert_eq!(completed.data["setsCompleted"].as_array().unwrap().len(), 5);
    assert!(completed.data.get("finishedEarly").is_none());
}

#[test]
fn commands_in_wrong_phase_fail_softly() {
    let (mut machine, clock) = machine();
    assert_eq!(
        machine.confirm_ready_and_start_set().unwrap_err(),
        CommandError::NoActiveWorkout
    );

    select_and_prepare(&mut machine, &clock, push_pull());
    let err = machine.complete_set(SetCompletion::default()).unwrap_err();
    assert_eq!(err.to_string(), "Cannot complete the set while preparing");
    let err = machine.extend_rest(30).unwrap_err();
    assert_eq!(err.to_string(), "Cannot extend the rest while preparing");
    assert_eq!(
        machine.select_workout(single_set_workout()).unwrap_err(),
        CommandError::WorkoutAlreadyActive
    );

    assert_eq!(machine.phase(), WorkoutPhase::Preparing);
    assert_eq!(machine.session().unwrap().name, "Push Pull");
}

#[test]
fn recompleting_a_set_after_jump_overwrites_actuals() {
    let (mut machine, clock) = machine();
    select_and_prepare(&mut machine, &clock, push_pull());
    do_set(&mut machine, &clock);
    machine.jump_to_set(1).unwrap();
    machine.confirm_ready_and_start_set().unwrap();

    machine.complete_set(SetCompletion::reps(5)).unwrap();

    let exercise = machine.current_exercise().unwrap();
    assert_eq!(exercise.sets[0].actual_reps, Some(5));
    assert!(exercise.sets[0].is_completed);
    assert_eq!(machine.session().unwrap().completed_sets(), 1);
    assert_eq!(machine.completed_sets().len(), 2);
}

#[test]
fn drained_records_follow_the_workout() {
    let (mut machine, clock) = machine();
    select_and_prepare(&mut machine, &clock, single_set_workout());
    do_set(&mut machine, &clock);
    clock.advance_secs(60);
    machine.poll_timers();

    let kinds: Vec<_> = machine.drain_records().iter().map(|r| r.kind()).collect();
    assert_eq!(
        kinds,
        vec!["session_started", "set_completed", "rest_completed", "session_ended"]
    );
    assert!(machine.drain_records().is_empty());
}
