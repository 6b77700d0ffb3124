use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use validation_core::machine::ValidationSnapshot;
use validation_core::model::Epoch;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape of a running validation session.
///
/// `state_path` duplicates the state held in `snapshot` so stored sessions
/// can be inspected without decoding the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationStateRecord {
    pub epoch: Epoch,
    pub state_path: String,
    pub snapshot: ValidationSnapshot,
    pub saved_at: DateTime<Utc>,
}

impl ValidationStateRecord {
    #[must_use]
    pub fn from_snapshot(snapshot: &ValidationSnapshot, saved_at: DateTime<Utc>) -> Self {
        Self {
            epoch: snapshot.context().params().epoch(),
            state_path: snapshot.state().path(),
            snapshot: snapshot.clone(),
            saved_at,
        }
    }

    #[must_use]
    pub fn into_snapshot(self) -> ValidationSnapshot {
        self.snapshot
    }
}

/// Keyed store for validation sessions, one record per epoch.
#[async_trait]
pub trait ValidationStateRepository: Send + Sync {
    /// Fetch the record stored for `epoch`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read or the record cannot be decoded.
    async fn load_state(&self, epoch: Epoch) -> Result<Option<ValidationStateRecord>, StorageError>;

    /// Persist or replace the record for `record.epoch`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn save_state(&self, record: &ValidationStateRecord) -> Result<(), StorageError>;

    /// Remove the record for `epoch`. Clearing a missing record is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    async fn clear_state(&self, epoch: Epoch) -> Result<(), StorageError>;

    /// Remove every record except the one for `current`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    async fn clear_other_epochs(&self, current: Epoch) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    states: Arc<Mutex<HashMap<Epoch, ValidationStateRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl ValidationStateRepository for InMemoryRepository {
    async fn load_state(&self, epoch: Epoch) -> Result<Option<ValidationStateRecord>, StorageError> {
        let guard = self
            .states
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&epoch).cloned())
    }

    async fn save_state(&self, record: &ValidationStateRecord) -> Result<(), StorageError> {
        let mut guard = self
            .states
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(record.epoch, record.clone());
        Ok(())
    }

    async fn clear_state(&self, epoch: Epoch) -> Result<(), StorageError> {
        let mut guard = self
            .states
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&epoch);
        Ok(())
    }

    async fn clear_other_epochs(&self, current: Epoch) -> Result<(), StorageError> {
        let mut guard = self
            .states
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.retain(|epoch, _| *epoch == current);
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub validation_states: Arc<dyn ValidationStateRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let states: Arc<dyn ValidationStateRepository> = Arc::new(InMemoryRepository::new());
        Self {
            validation_states: states,
        }
    }
}
