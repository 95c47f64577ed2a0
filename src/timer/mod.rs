//! Timer subsystem: clocks, pausable countdowns and deferred tasks.
//!
//! # Components
//!
//! - [`Clock`]: injectable time source ([`SystemClock`], [`ManualClock`])
//! - [`CountdownTimer`]: countdown with pause-time accounting and resume floors
//! - [`Scheduler`]: cancelable deferred tasks polled by their owner

mod clock;
mod countdown;
mod scheduler;

pub use clock::*;
pub use countdown::*;
pub use scheduler::*;
