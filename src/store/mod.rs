//! Storage module
//!
//! Persistence for change events and releases. PostgreSQL in production,
//! in-memory for development and tests.

mod backend;
mod error;
mod memory;
mod postgres;

pub use backend::StorageBackend;
pub use error::StoreError;
pub use memory::InMemoryStore;
pub use postgres::PgStore;

use serde::{Deserialize, Serialize};

/// Fully resolved event ready to be stored; the id is assigned by the store
#[derive(Debug, Clone, PartialEq)]
pub struct EventInsert {
    pub timestamp: i64,
    pub event_type: String,
    pub source: String,
    pub entity_type_id: Option<String>,
    pub entity_id: Option<i64>,
    pub bundle: Option<String>,
    pub user_id: Option<i64>,
    pub message: String,
    pub section_hint: Option<String>,
    pub metadata: serde_json::Value,
}

/// Optional equality filters on event queries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub section_hint: Option<String>,
}

impl EventFilter {
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn section_hint(mut self, section_hint: impl Into<String>) -> Self {
        self.section_hint = Some(section_hint.into());
        self
    }

    /// Drop empty filter values, they mean "no filter"
    pub fn normalized(&self) -> Self {
        fn keep(value: &Option<String>) -> Option<String> {
            value.clone().filter(|v| !v.is_empty())
        }

        Self {
            event_type: keep(&self.event_type),
            source: keep(&self.source),
            section_hint: keep(&self.section_hint),
        }
    }

    pub(crate) fn matches(&self, event: &crate::domain::Event) -> bool {
        fn eq(filter: &Option<String>, value: Option<&str>) -> bool {
            match filter {
                Some(expected) => value == Some(expected.as_str()),
                None => true,
            }
        }

        eq(&self.event_type, Some(event.event_type.as_str()))
            && eq(&self.source, Some(event.source.as_str()))
            && eq(&self.section_hint, event.section_hint.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_normalized_drops_empty() {
        let filter = EventFilter::default().event_type("").source("system");
        let normalized = filter.normalized();

        assert!(normalized.event_type.is_none());
        assert_eq!(normalized.source.as_deref(), Some("system"));
    }
}
