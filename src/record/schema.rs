//! Database schema for workout records.

/// Current schema version for migrations.
pub const SCHEMA_VERSION: u32 = 1;

/// SQL schema for the workout database.
pub const SCHEMA: &str = r"
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY NOT NULL,
    workout_id TEXT NOT NULL,
    workout_name TEXT NOT NULL,
    started_at TEXT NOT NULL,
    ended_at TEXT,
    finished_early INTEGER,
    summary TEXT
);

CREATE TABLE IF NOT EXISTS sets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL,
    workout_entry_id TEXT,
    exercise_id TEXT NOT NULL,
    set_id TEXT NOT NULL,
    set_number INTEGER NOT NULL,
    target_reps INTEGER NOT NULL,
    target_weight REAL,
    target_time INTEGER,
    actual_reps INTEGER NOT NULL,
    actual_weight REAL,
    difficulty TEXT,
    duration_secs INTEGER NOT NULL,
    pause_secs INTEGER NOT NULL,
    started_at TEXT NOT NULL,
    completed_at TEXT NOT NULL,
    FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS rests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL,
    exercise_id TEXT NOT NULL,
    set_number INTEGER NOT NULL,
    prescribed_secs INTEGER NOT NULL,
    actual_secs INTEGER NOT NULL,
    ended_at TEXT NOT NULL,
    FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS adjustments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    workout_entry_id TEXT,
    exercise_id TEXT,
    from_value REAL,
    to_value REAL,
    reason TEXT NOT NULL,
    affected_set_numbers TEXT NOT NULL,
    affects_future_sets INTEGER NOT NULL,
    timestamp TEXT NOT NULL,
    FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_sets_session_id ON sets(session_id);
CREATE INDEX IF NOT EXISTS idx_rests_session_id ON rests(session_id);
CREATE INDEX IF NOT EXISTS idx_adjustments_session_id ON adjustments(session_id);
CREATE INDEX IF NOT EXISTS idx_sessions_started_at ON sessions(started_at);
";
