//! Shared application state
//!
//! Everything a request handler needs, cloned into each request.

use std::sync::Arc;

use crate::clock::SharedClock;
use crate::config::Settings;
use crate::event_store::EventStore;
use crate::producers::ChangeTracker;
use crate::release::{ReleaseGenerator, ReleaseRepository};
use crate::store::StorageBackend;

#[derive(Debug, Clone)]
pub struct AppState {
    pub event_store: EventStore,
    pub generator: ReleaseGenerator,
    pub releases: ReleaseRepository,
    pub tracker: ChangeTracker,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wire all services onto one backend and clock
    pub fn new(backend: StorageBackend, clock: SharedClock, settings: Settings) -> Self {
        let event_store = EventStore::new(backend.clone(), clock.clone());
        Self {
            generator: ReleaseGenerator::new(event_store.clone()),
            releases: ReleaseRepository::new(backend, clock),
            tracker: ChangeTracker::new(event_store.clone(), settings.tracking),
            event_store,
            settings: Arc::new(settings),
        }
    }
}
