//! Workout Coach - real-time strength training progression.
//!
//! A workout is a pre-built [`session::WorkoutSession`]. The
//! [`machine::WorkoutMachine`] walks it set by set, runs the set and rest
//! timers, applies adjustments and broadcasts every change through the
//! [`bridge`]. The [`tools`] router exposes the machine to a voice agent or
//! UI, and the [`runtime`] drives it on a single tokio task.

pub mod bridge;
pub mod config;
pub mod dashboard;
pub mod display;
pub mod machine;
pub mod record;
pub mod runtime;
pub mod session;
pub mod timer;
pub mod tools;
