//! In-memory storage
//!
//! Same contract as the PostgreSQL store, backed by ordered maps. Data is
//! lost on restart.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use parking_lot::RwLock;

use crate::domain::{Event, NewRelease, Release, ReleaseQuery};

use super::{EventFilter, EventInsert, StoreError};

/// In-memory store for dev mode and tests
#[derive(Debug, Default)]
pub struct InMemoryStore {
    events: RwLock<BTreeMap<i64, Event>>,
    releases: RwLock<BTreeMap<i64, Release>>,
    next_event_id: AtomicI64,
    next_release_id: AtomicI64,
    read_only: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject all writes with `StoreError::Unavailable` while set
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store is read only".to_string()));
        }
        Ok(())
    }

    // ============================================
    // Events
    // ============================================

    pub async fn insert_event(&self, input: EventInsert) -> Result<Event, StoreError> {
        self.check_writable()?;

        let id = self.next_event_id.fetch_add(1, Ordering::SeqCst) + 1;
        let event = Event {
            id,
            timestamp: input.timestamp,
            event_type: input.event_type,
            source: input.source,
            entity_type_id: input.entity_type_id,
            entity_id: input.entity_id,
            bundle: input.bundle,
            user_id: input.user_id,
            message: input.message,
            section_hint: input.section_hint,
            metadata: input.metadata,
        };
        self.events.write().insert(id, event.clone());
        Ok(event)
    }

    pub async fn events_in_range(
        &self,
        start: i64,
        end: i64,
        filter: &EventFilter,
    ) -> Result<Vec<Event>, StoreError> {
        let mut events: Vec<Event> = self
            .events
            .read()
            .values()
            .filter(|e| e.timestamp >= start && e.timestamp <= end)
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.timestamp, e.id));
        Ok(events)
    }

    pub async fn count_events_since(&self, since: i64) -> Result<i64, StoreError> {
        let count = self
            .events
            .read()
            .values()
            .filter(|e| e.timestamp >= since)
            .count();
        Ok(count as i64)
    }

    pub async fn delete_events_before(&self, cutoff: i64) -> Result<u64, StoreError> {
        self.check_writable()?;

        let mut events = self.events.write();
        let before = events.len();
        events.retain(|_, e| e.timestamp >= cutoff);
        Ok((before - events.len()) as u64)
    }

    // ============================================
    // Releases
    // ============================================

    pub async fn insert_release(&self, input: NewRelease, now: i64) -> Result<Release, StoreError> {
        self.check_writable()?;

        let id = self.next_release_id.fetch_add(1, Ordering::SeqCst) + 1;
        let release = Release {
            id,
            title: input.title,
            label_type: input.label_type,
            version: input.version,
            release_date: input.release_date,
            date_start: input.date_start,
            date_end: input.date_end,
            sections: input.sections,
            published: input.published,
            owner: input.owner,
            created: now,
            changed: now,
        };
        self.releases.write().insert(id, release.clone());
        Ok(release)
    }

    pub async fn get_release(&self, id: i64) -> Result<Option<Release>, StoreError> {
        Ok(self.releases.read().get(&id).cloned())
    }

    pub async fn save_release(&self, release: &Release) -> Result<bool, StoreError> {
        self.check_writable()?;

        let mut releases = self.releases.write();
        match releases.get_mut(&release.id) {
            Some(existing) => {
                *existing = release.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn delete_release(&self, id: i64) -> Result<bool, StoreError> {
        self.check_writable()?;
        Ok(self.releases.write().remove(&id).is_some())
    }

    pub async fn latest_published_release(&self) -> Result<Option<Release>, StoreError> {
        Ok(self
            .releases
            .read()
            .values()
            .filter(|r| r.published)
            .max_by_key(|r| (r.release_date, r.id))
            .cloned())
    }

    pub async fn list_releases(&self, query: ReleaseQuery) -> Result<Vec<Release>, StoreError> {
        let mut releases: Vec<Release> = self
            .releases
            .read()
            .values()
            .filter(|r| !query.published_only || r.published)
            .cloned()
            .collect();
        // Newest first
        releases.sort_by(|a, b| (b.release_date, b.id).cmp(&(a.release_date, a.id)));

        Ok(releases
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .collect())
    }

    pub async fn count_releases(&self, published_only: bool) -> Result<i64, StoreError> {
        let count = self
            .releases
            .read()
            .values()
            .filter(|r| !published_only || r.published)
            .count();
        Ok(count as i64)
    }
}
