//! Storage Errors

/// Errors raised by a storage backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The backend refused the write
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}
