//! Workout progression state machine.
//!
//! A session moves through eight phases:
//!
//! ```text
//! inactive -> selected -> preparing -> exercising -> set-complete -> resting
//!                             ^                                        |
//!                             |                                   rest-ending
//!                             +---- exercise-transition <-------------+
//! ```
//!
//! Set and rest timers, and the machine's own deferred transitions, are
//! scheduled tasks guarded by the phase and position they were scheduled
//! for, so a superseded timer never acts.

mod adjust;
mod context;
mod engine;
mod error;
mod phase;
mod records;
mod summary;

pub use context::*;
pub use engine::WorkoutMachine;
pub use error::*;
pub use phase::*;
pub use records::*;
pub use summary::*;
