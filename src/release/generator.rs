//! Release Generator
//!
//! Collects the events of a time window, buckets them by section hint and
//! stores the result as a draft release.

use chrono::{DateTime, Utc};

use crate::domain::{
    Event, LabelType, NewRelease, OperationContext, Release, ReleaseOptions, SectionItem, Sections,
};
use crate::event_store::EventStore;
use crate::store::EventFilter;

use super::ReleaseError;

/// Group events into the six release sections.
///
/// One item per event, in input order. Events without a recognized hint land
/// in `other`. Duplicate messages are kept.
pub fn group_events_by_section(events: &[Event]) -> Sections {
    let mut sections = Sections::new();
    for event in events {
        sections.push(
            event.section(),
            SectionItem::new(event.message.clone(), vec![event.id]),
        );
    }
    sections
}

/// "Release - <Month Year>" for the month containing `end`
pub fn default_title(end: i64) -> String {
    match DateTime::<Utc>::from_timestamp(end, 0) {
        Some(date) => format!("Release - {}", date.format("%B %Y")),
        None => "Release".to_string(),
    }
}

/// Generates draft releases from logged events
#[derive(Debug, Clone)]
pub struct ReleaseGenerator {
    event_store: EventStore,
}

impl ReleaseGenerator {
    pub fn new(event_store: EventStore) -> Self {
        Self { event_store }
    }

    pub fn event_store(&self) -> &EventStore {
        &self.event_store
    }

    /// Draft release covering `[start, end]`
    pub async fn generate_from_range(
        &self,
        start: i64,
        end: i64,
        options: ReleaseOptions,
        context: &OperationContext,
    ) -> Result<Release, ReleaseError> {
        let events = self
            .event_store
            .events_by_range(start, end, &EventFilter::default())
            .await?;
        self.create_from_events(&events, start, end, options, context)
            .await
    }

    /// Draft release covering everything since the last published release
    pub async fn generate_since_last(
        &self,
        options: ReleaseOptions,
        context: &OperationContext,
    ) -> Result<Release, ReleaseError> {
        let start = self.event_store.last_release_boundary().await?;
        let end = self.event_store.now();
        let events = self
            .event_store
            .events_by_range(start, end, &EventFilter::default())
            .await?;
        self.create_from_events(&events, start, end, options, context)
            .await
    }

    async fn create_from_events(
        &self,
        events: &[Event],
        start: i64,
        end: i64,
        options: ReleaseOptions,
        context: &OperationContext,
    ) -> Result<Release, ReleaseError> {
        let sections = group_events_by_section(events);
        let now = self.event_store.now();

        let title = options
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| default_title(end));

        let new_release = NewRelease {
            title,
            label_type: options.label_type.unwrap_or(LabelType::DateRange),
            version: options.version.filter(|v| !v.trim().is_empty()),
            release_date: now,
            date_start: Some(start),
            date_end: Some(end),
            sections,
            published: false,
            owner: context.user_id,
        };
        new_release.validate()?;

        let release = self
            .event_store
            .backend()
            .insert_release(new_release, now)
            .await?;

        tracing::info!(
            release_id = release.id,
            events = events.len(),
            date_start = start,
            date_end = end,
            "Draft release generated"
        );

        Ok(release)
    }
}
