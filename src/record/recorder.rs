//! The recorder seam and its in-memory implementation.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use super::{RecordError, RecordRequest};

/// Durable storage for workout record requests.
#[async_trait]
pub trait WorkoutRecorder: Send + Sync {
    /// Store one request.
    async fn record(&self, request: &RecordRequest) -> Result<(), RecordError>;
}

/// Keeps every request in a shared vector.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecorder {
    records: Arc<Mutex<Vec<RecordRequest>>>,
}

impl MemoryRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    #[must_use]
    pub fn records(&self) -> Vec<RecordRequest> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl WorkoutRecorder for MemoryRecorder {
    async fn record(&self, request: &RecordRequest) -> Result<(), RecordError> {
        tracing::trace!(kind = request.kind(), "Recording in memory");
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        Ok(())
    }
}
