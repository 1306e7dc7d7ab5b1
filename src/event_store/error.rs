//! Event Store Errors
//!
//! Error types for event store operations.

use crate::domain::DomainError;
use crate::store::StoreError;

/// Errors that can occur in the event store
#[derive(Debug, thiserror::Error)]
pub enum EventStoreError {
    /// Payload failed validation
    #[error("Invalid event data: {0}")]
    InvalidEventData(#[from] DomainError),

    /// Storage error, propagated unchanged
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EventStoreError {
    /// Check if the caller sent a bad payload
    pub fn is_invalid_data(&self) -> bool {
        matches!(self, EventStoreError::InvalidEventData(_))
    }
}
