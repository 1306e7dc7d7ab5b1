//! Release Errors

use crate::domain::DomainError;
use crate::event_store::EventStoreError;
use crate::store::StoreError;

/// Errors raised while generating or managing releases
#[derive(Debug, thiserror::Error)]
pub enum ReleaseError {
    #[error("Release not found: {0}")]
    NotFound(i64),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    EventStore(#[from] EventStoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
