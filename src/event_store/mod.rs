//! Event Store module
//!
//! Append-only log of change events with time range queries.

mod error;
mod repository;

pub use error::EventStoreError;
pub use repository::EventStore;
