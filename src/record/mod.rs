//! Durable recording of workout progress.
//!
//! The machine emits [`RecordRequest`]s; a [`WorkoutRecorder`] stores them.

mod error;
mod recorder;
mod schema;
mod sqlite;
mod types;

pub use error::RecordError;
pub use recorder::{MemoryRecorder, WorkoutRecorder};
pub use schema::{SCHEMA, SCHEMA_VERSION};
pub use sqlite::{default_database_path, SqliteRecorder, StoredSession, StoredSet};
pub use types::*;
