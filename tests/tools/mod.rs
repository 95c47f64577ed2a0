//! Tool router tests against a manually clocked machine.

mod router_test;

use std::sync::Arc;

use serde_json::Value;
use workout_coach::config::TimingConfig;
use workout_coach::machine::{WorkoutMachine, WorkoutPhase};
use workout_coach::session::{Exercise, WorkoutSession, WorkoutSet};
use workout_coach::timer::ManualClock;
use workout_coach::tools::{ToolResponse, ToolRouter};

pub struct Harness {
    pub machine: WorkoutMachine,
    pub clock: ManualClock,
    pub router: ToolRouter,
}

impl Harness {
    /// A squat workout of three sets, already in `preparing`.
    pub fn preparing() -> Self {
        let clock = ManualClock::new();
        let mut machine =
            WorkoutMachine::with_clock(TimingConfig::default(), Arc::new(clock.clone()));
        let mut squat = Exercise::new(
            "squat",
            "Back Squat",
            (1..=3)
                .map(|n| WorkoutSet::new(format!("s{n}"), n, 5, Some(100.0), 90))
                .collect(),
        );
        squat.instructions = Some("Brace, sit back, drive through the heels.".to_string());
        let lunge = Exercise::new(
            "lunge",
            "Walking Lunge",
            vec![WorkoutSet::new("l1", 1, 12, None, 60)],
        );
        machine
            .select_workout(WorkoutSession::new("legs", "Leg Day", vec![squat, lunge]))
            .unwrap();
        clock.advance_secs(1);
        machine.poll_timers();
        assert_eq!(machine.phase(), WorkoutPhase::Preparing);
        Self {
            machine,
            clock,
            router: ToolRouter::new(),
        }
    }

    pub fn call(&mut self, name: &str, args: Value) -> ToolResponse {
        self.router.call(&mut self.machine, name, &args)
    }

    /// Advance the clock and run due timers.
    pub fn wait(&mut self, secs: u64) {
        self.clock.advance_secs(secs);
        self.machine.poll_timers();
    }
}
