//! Workout plan file loader.

use std::path::{Path, PathBuf};

use super::WorkoutSession;

/// Errors that can occur while loading a workout plan.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("Failed to read plan file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse TOML plan {path}: {source}")]
    TomlError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to parse JSON plan {path}: {source}")]
    JsonError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Unsupported plan format: {0} (expected .toml or .json)")]
    UnsupportedFormat(PathBuf),

    #[error("Invalid plan: {0}")]
    Invalid(String),
}

/// Loads pre-built workout sessions from disk.
#[derive(Debug, Default)]
pub struct PlanLoader;

impl PlanLoader {
    /// Load and validate a plan, choosing the format by file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<WorkoutSession, PlanError> {
        let path = path.as_ref().to_path_buf();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let content = std::fs::read_to_string(&path).map_err(|e| PlanError::ReadError {
            path: path.clone(),
            source: e,
        })?;

        let session = match extension.as_deref() {
            Some("toml") => Self::parse_toml(&content).map_err(|e| PlanError::TomlError {
                path: path.clone(),
                source: e,
            })?,
            Some("json") => serde_json::from_str(&content).map_err(|e| PlanError::JsonError {
                path: path.clone(),
                source: e,
            })?,
            _ => return Err(PlanError::UnsupportedFormat(path)),
        };

        session.validate().map_err(PlanError::Invalid)?;
        tracing::debug!(
            path = %path.display(),
            workout = %session.name,
            exercises = session.exercises.len(),
            "Loaded workout plan"
        );
        Ok(session)
    }

    /// Parse a plan from TOML text without validating it.
    ///
    /// # Errors
    ///
    /// Returns the TOML error if the text does not describe a session.
    pub fn parse_toml(content: &str) -> Result<WorkoutSession, toml::de::Error> {
        toml::from_str(content)
    }
}
