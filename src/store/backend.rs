//! Storage backend
//!
//! Enum dispatch over the PostgreSQL and in-memory stores.

use std::sync::Arc;

use sqlx::PgPool;

use crate::domain::{Event, NewRelease, Release, ReleaseQuery};

use super::{EventFilter, EventInsert, InMemoryStore, PgStore, StoreError};

/// Storage backend that can be either PostgreSQL or in-memory
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// PostgreSQL database (production)
    Postgres(PgStore),
    /// In-memory store (dev mode, tests)
    InMemory(Arc<InMemoryStore>),
}

impl StorageBackend {
    pub fn postgres(pool: PgPool) -> Self {
        Self::Postgres(PgStore::new(pool))
    }

    pub fn in_memory() -> Self {
        Self::InMemory(Arc::new(InMemoryStore::new()))
    }

    /// Check if this is dev mode (in-memory)
    pub fn is_dev_mode(&self) -> bool {
        matches!(self, Self::InMemory(_))
    }

    /// The PostgreSQL pool, if any
    pub fn pool(&self) -> Option<&PgPool> {
        match self {
            Self::Postgres(store) => Some(store.pool()),
            Self::InMemory(_) => None,
        }
    }

    // ============================================
    // Events
    // ============================================

    pub async fn insert_event(&self, input: EventInsert) -> Result<Event, StoreError> {
        match self {
            Self::Postgres(store) => store.insert_event(input).await,
            Self::InMemory(store) => store.insert_event(input).await,
        }
    }

    pub async fn events_in_range(
        &self,
        start: i64,
        end: i64,
        filter: &EventFilter,
    ) -> Result<Vec<Event>, StoreError> {
        match self {
            Self::Postgres(store) => store.events_in_range(start, end, filter).await,
            Self::InMemory(store) => store.events_in_range(start, end, filter).await,
        }
    }

    pub async fn count_events_since(&self, since: i64) -> Result<i64, StoreError> {
        match self {
            Self::Postgres(store) => store.count_events_since(since).await,
            Self::InMemory(store) => store.count_events_since(since).await,
        }
    }

    pub async fn delete_events_before(&self, cutoff: i64) -> Result<u64, StoreError> {
        match self {
            Self::Postgres(store) => store.delete_events_before(cutoff).await,
            Self::InMemory(store) => store.delete_events_before(cutoff).await,
        }
    }

    // ============================================
    // Releases
    // ============================================

    pub async fn insert_release(&self, input: NewRelease, now: i64) -> Result<Release, StoreError> {
        match self {
            Self::Postgres(store) => store.insert_release(input, now).await,
            Self::InMemory(store) => store.insert_release(input, now).await,
        }
    }

    pub async fn get_release(&self, id: i64) -> Result<Option<Release>, StoreError> {
        match self {
            Self::Postgres(store) => store.get_release(id).await,
            Self::InMemory(store) => store.get_release(id).await,
        }
    }

    pub async fn save_release(&self, release: &Release) -> Result<bool, StoreError> {
        match self {
            Self::Postgres(store) => store.save_release(release).await,
            Self::InMemory(store) => store.save_release(release).await,
        }
    }

    pub async fn delete_release(&self, id: i64) -> Result<bool, StoreError> {
        match self {
            Self::Postgres(store) => store.delete_release(id).await,
            Self::InMemory(store) => store.delete_release(id).await,
        }
    }

    pub async fn latest_published_release(&self) -> Result<Option<Release>, StoreError> {
        match self {
            Self::Postgres(store) => store.latest_published_release().await,
            Self::InMemory(store) => store.latest_published_release().await,
        }
    }

    pub async fn list_releases(&self, query: ReleaseQuery) -> Result<Vec<Release>, StoreError> {
        match self {
            Self::Postgres(store) => store.list_releases(query).await,
            Self::InMemory(store) => store.list_releases(query).await,
        }
    }

    pub async fn count_releases(&self, published_only: bool) -> Result<i64, StoreError> {
        match self {
            Self::Postgres(store) => store.count_releases(published_only).await,
            Self::InMemory(store) => store.count_releases(published_only).await,
        }
    }
}
