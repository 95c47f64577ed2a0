//! Configuration file discovery and loading.

use std::path::{Path, PathBuf};

use super::{CoachConfig, TimingConfig};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".workout-coach.toml";

/// Finds and reads the coach configuration.
///
/// The first existing file wins:
///
/// 1. `./.workout-coach.toml`
/// 2. `<user config dir>/workout-coach/config.toml`
///
/// An explicit path replaces the search entirely.
#[derive(Debug)]
pub struct ConfigLoader {
    candidates: Vec<PathBuf>,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        let user = dirs::config_dir().map(|dir| dir.join("workout-coach").join("config.toml"));
        Self {
            candidates: std::iter::once(PathBuf::from(LOCAL_CONFIG_FILE))
                .chain(user)
                .collect(),
        }
    }

    /// Only ever read `path`.
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            candidates: vec![path],
        }
    }

    /// Load and validate the first config file found, or the defaults when
    /// there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if its
    /// timing values are inconsistent.
    pub fn load(&self) -> Result<CoachConfig, ConfigError> {
        let Some(path) = self.find_config_file() else {
            tracing::debug!("No config file found, using defaults");
            return Ok(CoachConfig::default());
        };
        tracing::debug!(path = %path.display(), "Loading config file");
        let config = read_config(&path)?;
        validate_timing(&config.timing).map_err(|reason| ConfigError::Invalid {
            path: path.clone(),
            reason,
        })?;
        Ok(config)
    }

    /// Candidate paths, highest priority first.
    #[must_use]
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.candidates
    }

    #[must_use]
    pub fn find_config_file(&self) -> Option<PathBuf> {
        self.candidates.iter().find(|p| p.is_file()).cloned()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_config(path: &Path) -> Result<CoachConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })
}

/// Timing values the machine cannot run with.
fn validate_timing(timing: &TimingConfig) -> Result<(), String> {
    if timing.default_set_secs == 0 || timing.default_rest_secs == 0 {
        return Err("default set and rest lengths must be positive".to_string());
    }
    if timing.keep_alive_secs == 0 {
        return Err("keep_alive_secs must be positive".to_string());
    }
    if timing.rest_warning_secs >= timing.default_rest_secs {
        return Err(format!(
            "rest_warning_secs ({}) must be shorter than default_rest_secs ({})",
            timing.rest_warning_secs, timing.default_rest_secs
        ));
    }
    Ok(())
}

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config file {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}
