//! Event Store Repository
//!
//! Logging and querying of change events. Events are never updated; the only
//! removal path is the retention sweep.

use crate::clock::SharedClock;
use crate::domain::{Event, NewEvent, OperationContext};
use crate::store::{EventFilter, EventInsert, StorageBackend};

use super::EventStoreError;

/// Event Store for logging and retrieving change events
#[derive(Debug, Clone)]
pub struct EventStore {
    backend: StorageBackend,
    clock: SharedClock,
}

impl EventStore {
    /// Create a new EventStore on a storage backend
    pub fn new(backend: StorageBackend, clock: SharedClock) -> Self {
        Self { backend, clock }
    }

    pub fn backend(&self) -> &StorageBackend {
        &self.backend
    }

    /// Current time according to the injected clock
    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    // =========================================================================
    // log_event
    // =========================================================================

    /// Validate and append one event.
    /// Missing timestamp defaults to now, missing user to the acting user.
    /// Identical payloads produce distinct events.
    pub async fn log_event(
        &self,
        payload: NewEvent,
        context: &OperationContext,
    ) -> Result<Event, EventStoreError> {
        payload.validate()?;

        let input = EventInsert {
            timestamp: payload.timestamp.unwrap_or_else(|| self.clock.now()),
            event_type: payload.event_type,
            source: payload.source,
            entity_type_id: payload.entity_type_id,
            entity_id: payload.entity_id,
            bundle: payload.bundle,
            user_id: payload.user_id.or(context.user_id),
            message: payload.message,
            section_hint: payload.section_hint,
            metadata: payload
                .metadata
                .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new())),
        };

        let event = self.backend.insert_event(input).await?;

        tracing::debug!(
            event_id = event.id,
            event_type = %event.event_type,
            source = %event.source,
            correlation_id = ?context.correlation_id,
            "Change event logged"
        );

        Ok(event)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Events with `start <= timestamp <= end`, oldest first.
    /// An inverted window yields no events.
    pub async fn events_by_range(
        &self,
        start: i64,
        end: i64,
        filter: &EventFilter,
    ) -> Result<Vec<Event>, EventStoreError> {
        if start > end {
            return Ok(Vec::new());
        }

        let events = self
            .backend
            .events_in_range(start, end, &filter.normalized())
            .await?;
        Ok(events)
    }

    /// Number of events with `timestamp >= since`
    pub async fn event_count_since(&self, since: i64) -> Result<i64, EventStoreError> {
        Ok(self.backend.count_events_since(since).await?)
    }

    /// Where the next release window starts: the boundary of the most recent
    /// published release, or 0 when nothing has been published
    pub async fn last_release_boundary(&self) -> Result<i64, EventStoreError> {
        let boundary = self
            .backend
            .latest_published_release()
            .await?
            .map(|release| release.boundary())
            .unwrap_or(0);
        Ok(boundary)
    }

    /// All events from the last published release's boundary up to now
    pub async fn events_since_last_release(&self) -> Result<Vec<Event>, EventStoreError> {
        let since = self.last_release_boundary().await?;
        self.events_by_range(since, self.clock.now(), &EventFilter::default())
            .await
    }

    /// Number of events a since-last generation would pick up now.
    /// Events stamped in the future are not counted.
    pub async fn event_count_since_last_release(&self) -> Result<i64, EventStoreError> {
        Ok(self.events_since_last_release().await?.len() as i64)
    }

    // =========================================================================
    // Retention
    // =========================================================================

    /// Delete events strictly older than `cutoff`
    pub async fn purge_older_than(&self, cutoff: i64) -> Result<u64, EventStoreError> {
        let rows_deleted = self.backend.delete_events_before(cutoff).await?;

        if rows_deleted > 0 {
            tracing::info!(rows_deleted, cutoff, "Purged expired change events");
        }

        Ok(rows_deleted)
    }
}
