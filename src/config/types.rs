//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dashboard::DashboardConfig;

/// Timing constants for the workout state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Set timer length when a set has no target time.
    pub default_set_secs: u64,
    /// Rest length when a set prescribes no rest.
    pub default_rest_secs: u64,
    /// Length of the rest-ending window.
    pub rest_warning_secs: u64,
    /// Minimum time left after resuming a set.
    pub set_resume_floor_secs: u64,
    /// Minimum time left after resuming or resizing a rest.
    pub rest_resume_floor_secs: u64,
    /// Delay between selecting a workout and preparing the first set.
    pub auto_prepare_delay_ms: u64,
    /// Delay between completing a set and starting the rest.
    pub auto_rest_delay_ms: u64,
    /// Period of the user-activity keep-alive while exercising.
    pub keep_alive_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            default_set_secs: 45,
            default_rest_secs: 60,
            rest_warning_secs: 10,
            set_resume_floor_secs: 5,
            rest_resume_floor_secs: 10,
            auto_prepare_delay_ms: 1000,
            auto_rest_delay_ms: 500,
            keep_alive_secs: 30,
        }
    }
}

impl TimingConfig {
    #[must_use]
    pub fn default_set(&self) -> Duration {
        Duration::from_secs(self.default_set_secs)
    }

    #[must_use]
    pub fn default_rest(&self) -> Duration {
        Duration::from_secs(self.default_rest_secs)
    }

    #[must_use]
    pub fn rest_warning(&self) -> Duration {
        Duration::from_secs(self.rest_warning_secs)
    }

    #[must_use]
    pub fn set_resume_floor(&self) -> Duration {
        Duration::from_secs(self.set_resume_floor_secs)
    }

    #[must_use]
    pub fn rest_resume_floor(&self) -> Duration {
        Duration::from_secs(self.rest_resume_floor_secs)
    }

    #[must_use]
    pub fn auto_prepare_delay(&self) -> Duration {
        Duration::from_millis(self.auto_prepare_delay_ms)
    }

    #[must_use]
    pub fn auto_rest_delay(&self) -> Duration {
        Duration::from_millis(self.auto_rest_delay_ms)
    }

    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }
}

/// Where completed sets and adjustments are recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecorderBackend {
    #[default]
    Memory,
    Sqlite,
}

/// Recorder configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    pub backend: RecorderBackend,
    /// Database file for the sqlite backend.
    pub path: Option<PathBuf>,
}

impl RecorderConfig {
    /// Database path, falling back to the per-user data directory.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(crate::record::default_database_path)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoachConfig {
    pub timing: TimingConfig,
    pub dashboard: DashboardConfig,
    pub recorder: RecorderConfig,
}
