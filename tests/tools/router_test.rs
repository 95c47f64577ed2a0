//! Tool calls as an agent would make them.

use serde_json::json;
use workout_coach::machine::WorkoutPhase;

use super::Harness;

#[test]
fn start_set_walks_the_two_step_ready() {
    let mut h = Harness::preparing();

    let started = h.call("start_set", json!({}));
    assert!(started.success);
    assert_eq!(started.message, "Set 1 started: 5 reps at 100 kg.");
    assert_eq!(started.data.unwrap()["phase"], "exercising");

    h.call("complete_set", json!({}));
    h.wait(1);
    assert_eq!(h.machine.phase(), WorkoutPhase::Resting);

    let next = h.call("start_set", json!({}));
    assert_eq!(
        next.message,
        "Up next: Back Squat set 2, 5 reps at 100 kg. Say when you're ready."
    );
    assert_eq!(next.data.unwrap()["phase"], "preparing");
}

#[test]
fn complete_set_accepts_string_numbers() {
    let mut h = Harness::preparing();
    h.call("start_set", json!({}));
    h.clock.advance_secs(25);

    let response = h.call(
        "complete_set",
        json!({"actual_reps": "4", "actual_weight": "97.5", "difficulty": "hard"}),
    );

    assert!(response.success, "{}", response.message);
    assert_eq!(response.message, "Set 1 complete: 4 reps in 25s.");
    let data = response.data.unwrap();
    assert_eq!(data["actualReps"], 4);
    assert_eq!(data["actualWeight"], 97.5);
    assert_eq!(data["difficulty"], "hard");
}

#[test]
fn complete_set_rejects_unknown_difficulty_without_side_effects() {
    let mut h = Harness::preparing();
    h.call("start_set", json!({}));

    let response = h.call("complete_set", json!({"difficulty": "brutal"}));

    assert!(!response.success);
    assert_eq!(
        response.message,
        "Parameter difficulty must be one of easy, medium, hard, impossible"
    );
    assert_eq!(h.machine.phase(), WorkoutPhase::Exercising);
}

#[test]
fn pause_and_resume_report_idempotence() {
    let mut h = Harness::preparing();
    h.call("start_set", json!({}));
    h.clock.advance_secs(10);

    assert_eq!(h.call("resume_set", json!({})).message, "Not paused.");
    assert_eq!(h.call("pause_set", json!({})).message, "Paused.");
    assert_eq!(h.call("pause_set", json!({"reason": "again"})).message, "Already paused.");
    h.clock.advance_secs(60);
    assert_eq!(h.call("resume_set", json!({})).message, "Resumed with 35s left.");
}

#[test]
fn pause_for_issue_requires_an_issue() {
    let mut h = Harness::preparing();
    h.call("start_set", json!({}));

    let missing = h.call("pause_for_issue", json!({"issue": "  "}));
    assert!(!missing.success);
    assert_eq!(missing.message, "Missing required parameter: issue");
    assert!(!h.machine.is_paused());

    let paused = h.call("pause_for_issue", json!({"issue": "knee pain"}));
    assert_eq!(
        paused.message,
        "Paused for: knee pain. Take your time and say resume when ready."
    );
    assert!(h.machine.is_paused());
}

#[test]
fn jump_to_set_validates_its_argument() {
    let mut h = Harness::preparing();

    let missing = h.call("jump_to_set", json!({}));
    assert_eq!(missing.message, "Missing required parameter: set_number");

    let bad = h.call("jump_to_set", json!({"set_number": "two"}));
    assert_eq!(
        bad.message,
        "Parameter set_number must be a non-negative whole number"
    );

    let out_of_range = h.call("jump_to_set", json!({"set_number": 9}));
    assert_eq!(out_of_range.message, "Set number must be between 1 and 3");

    let ok = h.call("jump_to_set", json!({"set_number": "3"}));
    assert!(ok.success);
    assert_eq!(
        ok.message,
        "Jumped to set 3: 5 reps at 100 kg. Say when you're ready."
    );
    assert_eq!(h.machine.context().unwrap().set_number(), 3);
}

#[test]
fn adjustments_land_on_the_next_set_during_rest() {
    let mut h = Harness::preparing();
    h.call("start_set", json!({}));
    h.call("complete_set", json!({}));
    h.wait(1);

    let weight = h.call("adjust_weight", json!({"new_weight": 92.5, "reason": "form"}));
    assert_eq!(weight.message, "Weight set to 92.5 kg.");
    let reps = h.call("adjust_reps", json!({"new_reps": 4}));
    assert_eq!(reps.message, "Reps set to 4.");

    let exercise = h.machine.current_exercise().unwrap();
    assert_eq!(exercise.sets[0].target_weight, Some(100.0));
    assert_eq!(exercise.sets[1].target_weight, Some(92.5));
    assert_eq!(exercise.sets[2].target_reps, 4);
    assert_eq!(h.machine.adjustments().len(), 2);

    let next = h.call("start_set", json!({}));
    assert_eq!(
        next.message,
        "Up next: Back Squat set 2, 4 reps at 92.5 kg. Say when you're ready."
    );
}

#[test]
fn adjust_rest_time_reports_the_live_remaining() {
    let mut h = Harness::preparing();
    h.call("start_set", json!({}));
    h.call("complete_set", json!({}));
    h.wait(1);
    h.clock.advance_secs(30);

    let response = h.call("adjust_rest_time", json!({"new_rest_seconds": 120}));

    assert!(response.success);
    assert_eq!(response.message, "Rest set to 120 seconds, 90s left.");
    assert_eq!(h.machine.phase(), WorkoutPhase::Resting);
}

#[test]
fn extend_rest_only_from_rest_ending() {
    let mut h = Harness::preparing();
    h.call("start_set", json!({}));
    h.call("complete_set", json!({}));
    h.wait(1);

    let early = h.call("extend_rest", json!({"seconds": 30}));
    assert_eq!(early.message, "Cannot extend the rest while resting");

    h.wait(80);
    assert_eq!(h.machine.phase(), WorkoutPhase::RestEnding);
    let extended = h.call("extend_rest", json!({"seconds": 30}));
    assert_eq!(extended.message, "Rest extended by 30 seconds.");
    assert_eq!(h.machine.phase(), WorkoutPhase::Resting);
}

#[test]
fn status_carries_camel_case_snapshot() {
    let mut h = Harness::preparing();
    h.call("start_set", json!({}));
    h.clock.advance_secs(12);

    let response = h.call("get_workout_status", json!({}));

    assert!(response.success);
    assert!(response.message.starts_with("Workout \"Leg Day\": exercise 1 of 2 (Back Squat)"));
    assert!(response.message.contains("33s remaining"));
    let data = response.data.unwrap();
    assert_eq!(data["workoutName"], "Leg Day");
    assert_eq!(data["phase"], "exercising");
    assert_eq!(data["setNumber"], 1);
    assert_eq!(data["totalSets"], 3);
    assert_eq!(data["timeRemaining"], 33);
    assert_eq!(data["isPaused"], false);
}

#[test]
fn instructions_fall_back_when_missing() {
    let mut h = Harness::preparing();
    let squat = h.call("get_exercise_instructions", json!({}));
    assert_eq!(squat.message, "Brace, sit back, drive through the heels.");
    assert_eq!(squat.data.unwrap()["name"], "Back Squat");

    h.machine.complete_exercise().unwrap();
    let lunge = h.call("get_exercise_instructions", json!({}));
    assert_eq!(lunge.message, "No instructions available for Walking Lunge.");
}

#[test]
fn restart_set_requires_a_running_set() {
    let mut h = Harness::preparing();
    let early = h.call("restart_set", json!({}));
    assert_eq!(early.message, "Cannot restart the set while preparing");

    h.call("start_set", json!({}));
    h.clock.advance_secs(30);
    assert_eq!(h.call("restart_set", json!({})).message, "Set 1 restarted.");
    assert_eq!(
        h.machine.time_remaining(),
        Some(std::time::Duration::from_secs(45))
    );
}

#[test]
fn start_set_through_to_the_end() {
    let mut h = Harness::preparing();
    h.machine.jump_to_set(3).unwrap();
    h.call("start_set", json!({}));
    h.call("complete_set", json!({}));
    h.wait(1);

    let transition = h.call("start_set", json!({}));
    assert_eq!(transition.message, "Exercise complete. Next exercise: Walking Lunge.");

    h.call("start_set", json!({}));
    let started = h.call("start_set", json!({}));
    assert_eq!(started.message, "Set 1 started: 12 reps (bodyweight).");
    h.call("complete_set", json!({}));
    h.wait(1);

    let done = h.call("start_set", json!({}));
    assert_eq!(done.message, "Workout complete. Great work!");
    assert_eq!(h.machine.phase(), WorkoutPhase::Inactive);
}
