//! Properties that must hold in every reachable state.

use workout_coach::bridge::UpdateEvent;
use workout_coach::machine::{SetCompletion, WorkoutMachine, WorkoutPhase};

use super::{do_set, events, machine, push_pull, select_and_prepare};

fn assert_in_bounds(machine: &WorkoutMachine) {
    let (Some(session), Some(ctx)) = (machine.session(), machine.context()) else {
        assert_eq!(machine.phase(), WorkoutPhase::Inactive);
        return;
    };
    assert!(ctx.exercise_index < session.exercises.len());
    assert!(ctx.set_index < session.exercises[ctx.exercise_index].sets.len());
}

#[test]
fn cursor_stays_in_bounds_through_timer_driven_workout() {
    let (mut machine, clock) = machine();
    select_and_prepare(&mut machine, &clock, push_pull());

    // The user only ever says ready. Everything else is driven by timers.
    let mut steps = 0;
    while machine.phase() != WorkoutPhase::Inactive {
        steps += 1;
        assert!(steps < 1000, "workout did not finish");
        match machine.phase() {
            WorkoutPhase::Preparing | WorkoutPhase::RestEnding | WorkoutPhase::ExerciseTransition => {
                machine.confirm_ready_and_start_set().unwrap();
            }
            _ => {}
        }
        assert_in_bounds(&machine);
        clock.advance_secs(1);
        machine.poll_timers();
        assert_in_bounds(&machine);
    }
    assert!(machine.context().is_none());
}

#[test]
fn cursor_stays_in_bounds_with_jumps_and_adjustments() {
    let (mut machine, clock) = machine();
    select_and_prepare(&mut machine, &clock, push_pull());

    machine.jump_to_set(3).unwrap();
    assert_in_bounds(&machine);
    do_set(&mut machine, &clock);
    // No set after the last one to adjust.
    assert!(machine.adjust_weight(40.0, "x").is_err());
    machine.adjust_rest_time(15, "hurry").unwrap();
    assert_in_bounds(&machine);

    // A manual exercise completion does not advance past the end either.
    machine.complete_exercise().unwrap();
    assert_in_bounds(&machine);
    machine.complete_exercise().unwrap();
    assert_eq!(machine.phase(), WorkoutPhase::Inactive);
    assert!(machine.complete_exercise().is_err());
}

#[test]
fn last_set_flag_matches_cursor_at_rest_start() {
    let (mut machine, clock) = machine();
    select_and_prepare(&mut machine, &clock, push_pull());
    let mut updates = machine.subscribe();

    for expected_last in [false, false, true] {
        do_set(&mut machine, &clock);
        let session = machine.session().unwrap();
        let ctx = machine.context().unwrap();
        let at_end = ctx.set_index == session.exercises[ctx.exercise_index].sets.len() - 1;
        assert_eq!(machine.rest_is_last_set(), Some(expected_last));
        assert_eq!(at_end, expected_last);
        if !expected_last {
            machine.confirm_ready_and_start_set().unwrap();
        }
    }

    let rest_started: Vec<_> = std::iter::from_fn(|| updates.try_recv().ok())
        .filter(|u| u.event == UpdateEvent::RestStarted)
        .map(|u| u.data["isLastSet"].as_bool().unwrap())
        .collect();
    assert_eq!(rest_started, vec![false, false, true]);
}

#[test]
fn manual_exercise_completion_silences_the_old_rest_timer() {
    let (mut machine, clock) = machine();
    select_and_prepare(&mut machine, &clock, push_pull());
    do_set(&mut machine, &clock);
    let mut updates = machine.subscribe();

    machine.complete_exercise().unwrap();
    assert_eq!(machine.phase(), WorkoutPhase::ExerciseTransition);
    assert_eq!(events(&mut updates), vec![UpdateEvent::ExerciseChanged]);

    // Well past the original 50s rest and its warning.
    clock.advance_secs(120);
    assert_eq!(machine.poll_timers(), 0);
    assert_eq!(machine.phase(), WorkoutPhase::ExerciseTransition);
    assert!(events(&mut updates).is_empty());
}

#[test]
fn superseded_auto_rest_is_ignored() {
    let (mut machine, clock) = machine();
    select_and_prepare(&mut machine, &clock, push_pull());
    machine.confirm_ready_and_start_set().unwrap();
    machine.complete_set(SetCompletion::reps(8)).unwrap();
    assert_eq!(machine.phase(), WorkoutPhase::SetComplete);

    // The user jumps back before the automatic rest kicks in.
    machine.jump_to_set(1).unwrap();
    clock.advance_secs(1);
    machine.poll_timers();

    assert_eq!(machine.phase(), WorkoutPhase::Preparing);
    assert_eq!(machine.rest_is_last_set(), None);
}

#[test]
fn auto_prepare_after_manual_prepare_is_a_no_op() {
    let (mut machine, clock) = machine();
    machine.select_workout(push_pull()).unwrap();
    let mut updates = machine.subscribe();

    machine.start_exercise_preparation().unwrap();
    machine.confirm_ready_and_start_set().unwrap();
    clock.advance_secs(1);
    machine.poll_timers();

    assert_eq!(machine.phase(), WorkoutPhase::Exercising);
    assert_eq!(
        events(&mut updates),
        vec![UpdateEvent::ExercisePreparation, UpdateEvent::SetStarted]
    );
}

#[test]
fn cleanup_resets_everything() {
    let (mut machine, clock) = machine();
    let mut updates = machine.subscribe();
    select_and_prepare(&mut machine, &clock, push_pull());
    machine.set_agent_connected(true);
    machine.confirm_ready_and_start_set().unwrap();

    machine.cleanup();

    assert_eq!(machine.phase(), WorkoutPhase::Inactive);
    assert!(machine.session().is_none());
    assert_eq!(machine.pending_timers(), 0);
    assert!(!machine.agent_connected());
    assert!(machine.drain_records().is_empty());
    // Old subscribers are disconnected.
    while updates.try_recv().is_ok() {}
    assert!(matches!(
        updates.try_recv(),
        Err(tokio::sync::broadcast::error::TryRecvError::Closed)
    ));
}

#[test]
fn agent_connect_syncs_context_once() {
    let (mut machine, clock) = machine();
    assert!(machine.set_agent_connected(true).is_none());
    machine.set_agent_connected(false);

    select_and_prepare(&mut machine, &clock, push_pull());
    do_set(&mut machine, &clock);
    clock.advance_secs(5);

    let sync = machine.set_agent_connected(true).unwrap();
    assert_eq!(sync.event, UpdateEvent::VoiceAgentConnected);
    assert_eq!(sync.data["phase"], "resting");
    assert_eq!(sync.data["workoutName"], "Push Pull");
    assert_eq!(sync.data["timeRemaining"], 45);
    assert!(sync.data["contextMessage"]
        .as_str()
        .unwrap()
        .contains("45s remaining"));

    assert!(machine.set_agent_connected(true).is_none());
}
