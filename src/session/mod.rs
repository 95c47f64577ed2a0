//! Workout session data model and plan loading.

mod loader;
mod types;

pub use loader::*;
pub use types::*;
