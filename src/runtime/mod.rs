//! Async driver for the workout machine.
//!
//! [`WorkoutRuntime`] moves the machine into a single tokio task that
//! serialises commands, wakes for the next due timer and forwards record
//! requests to a [`WorkoutRecorder`](crate::record::WorkoutRecorder).
//! Callers talk to it through a cloneable [`WorkoutHandle`].

mod command;
mod driver;
mod error;
mod handle;

pub use driver::{WorkoutRuntime, DEFAULT_COMMAND_BUFFER};
pub use error::RuntimeError;
pub use handle::WorkoutHandle;
