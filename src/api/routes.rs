//! Admin API Routes
//!
//! Producer interface, dashboard, release generation and release editing.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{
    Event, LabelType, NewEvent, OperationContext, Release, ReleaseQuery, ReleaseUpdate, Section,
};
use crate::error::AppError;
use crate::handlers::{
    CreateReleaseCommand, CreateReleaseHandler, GenerateReleaseCommand, GenerateReleaseHandler,
    UpdateReleaseCommand, UpdateReleaseHandler,
};
use crate::producers::ChangeNotification;
use crate::store::EventFilter;

use super::AppState;

/// Releases per admin listing page
pub const ADMIN_PAGE_SIZE: i64 = 25;
/// Releases shown on the dashboard
pub const DASHBOARD_RECENT_RELEASES: i64 = 5;

const DAY: i64 = 86_400;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EventsQuery {
    /// Defaults to the epoch
    #[serde(default)]
    pub start: Option<i64>,
    /// Defaults to now
    #[serde(default)]
    pub end: Option<i64>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub section_hint: Option<String>,
}

impl EventsQuery {
    pub fn filter(&self) -> EventFilter {
        EventFilter {
            event_type: self.event_type.clone(),
            source: self.source.clone(),
            section_hint: self.section_hint.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EventsResponse {
    pub events: Vec<Event>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChangesResponse {
    pub events_logged: usize,
    pub events: Vec<Event>,
}

/// Compact release row for listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseSummary {
    pub id: i64,
    pub title: String,
    pub label_type: LabelType,
    pub version: Option<String>,
    pub release_date: i64,
    pub published: bool,
    pub item_count: usize,
}

impl From<&Release> for ReleaseSummary {
    fn from(release: &Release) -> Self {
        Self {
            id: release.id,
            title: release.title.clone(),
            label_type: release.label_type,
            version: release.version.clone(),
            release_date: release.release_date,
            published: release.published,
            item_count: release.sections.item_count(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub events_last_7_days: i64,
    pub events_last_30_days: i64,
    pub events_since_last_release: i64,
    pub last_release_boundary: i64,
    pub recent_releases: Vec<ReleaseSummary>,
}

/// A newly stored release and where to edit it
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateReleaseResponse {
    pub release: Release,
    pub edit_url: String,
}

/// A release plus its sections as editable text
#[derive(Debug, Serialize, Deserialize)]
pub struct ReleaseDetailResponse {
    pub release: Release,
    pub sections_text: BTreeMap<String, String>,
}

impl From<Release> for ReleaseDetailResponse {
    fn from(release: Release) -> Self {
        let sections_text = Section::ALL
            .into_iter()
            .map(|s| (s.as_str().to_string(), release.sections.to_text(s)))
            .collect();
        Self {
            release,
            sections_text,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PageQuery {
    /// Zero-based page number
    #[serde(default)]
    pub page: Option<u32>,
}

impl PageQuery {
    /// (limit, offset) for a page size
    pub fn bounds(&self, per_page: i64) -> (i64, i64) {
        let page = i64::from(self.page.unwrap_or(0));
        (per_page, page * per_page)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReleaseListResponse {
    pub releases: Vec<ReleaseSummary>,
    pub page: u32,
    pub per_page: i64,
    pub total: i64,
}

/// Where a release is edited
pub fn edit_url(release_id: i64) -> String {
    format!("/api/v1/admin/releases/{}", release_id)
}

// =========================================================================
// Router
// =========================================================================

/// Admin routes, nested under `/api/v1/admin`
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/events", post(log_event).get(list_events))
        .route("/changes", post(record_change))
        .route("/dashboard", get(dashboard))
        .route("/releases", get(list_releases).post(create_release))
        .route("/releases/generate", post(generate_release))
        .route(
            "/releases/:release_id",
            get(get_release).patch(update_release).delete(delete_release),
        )
}

// =========================================================================
// POST /events
// =========================================================================

/// Log a raw change event
async fn log_event(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(payload): Json<NewEvent>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let event = state.event_store.log_event(payload, &context).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

// =========================================================================
// GET /events
// =========================================================================

/// Events in a time window, oldest first
async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<EventsResponse>, AppError> {
    let start = query.start.unwrap_or(0);
    let end = query.end.unwrap_or_else(|| state.event_store.now());

    let events = state
        .event_store
        .events_by_range(start, end, &query.filter())
        .await?;

    Ok(Json(EventsResponse {
        count: events.len(),
        events,
    }))
}

// =========================================================================
// POST /changes
// =========================================================================

/// Platform lifecycle notification
async fn record_change(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(notification): Json<ChangeNotification>,
) -> Result<(StatusCode, Json<ChangesResponse>), AppError> {
    let events = state.tracker.record(notification, &context).await?;

    let status = if events.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    Ok((
        status,
        Json(ChangesResponse {
            events_logged: events.len(),
            events,
        }),
    ))
}

// =========================================================================
// GET /dashboard
// =========================================================================

/// Event counts and the most recent releases
async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardResponse>, AppError> {
    let store = &state.event_store;
    let now = store.now();
    let boundary = store.last_release_boundary().await?;

    let recent = state
        .releases
        .list(ReleaseQuery::all(DASHBOARD_RECENT_RELEASES, 0))
        .await?;

    Ok(Json(DashboardResponse {
        events_last_7_days: store.event_count_since(now - 7 * DAY).await?,
        events_last_30_days: store.event_count_since(now - 30 * DAY).await?,
        events_since_last_release: store.event_count_since_last_release().await?,
        last_release_boundary: boundary,
        recent_releases: recent.iter().map(ReleaseSummary::from).collect(),
    }))
}

// =========================================================================
// POST /releases/generate
// =========================================================================

/// Generate a draft release from the admin form
async fn generate_release(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(command): Json<GenerateReleaseCommand>,
) -> Result<(StatusCode, Json<GenerateReleaseResponse>), AppError> {
    let handler = GenerateReleaseHandler::new(state.generator.clone());
    let release = handler.execute(command, &context).await?;

    Ok((
        StatusCode::CREATED,
        Json(GenerateReleaseResponse {
            edit_url: edit_url(release.id),
            release,
        }),
    ))
}

// =========================================================================
// GET /releases
// =========================================================================

/// All releases, drafts included
async fn list_releases(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<ReleaseListResponse>, AppError> {
    let (limit, offset) = page.bounds(ADMIN_PAGE_SIZE);
    let releases = state.releases.list(ReleaseQuery::all(limit, offset)).await?;
    let total = state.releases.count(false).await?;

    Ok(Json(ReleaseListResponse {
        releases: releases.iter().map(ReleaseSummary::from).collect(),
        page: page.page.unwrap_or(0),
        per_page: ADMIN_PAGE_SIZE,
        total,
    }))
}

// =========================================================================
// POST /releases
// =========================================================================

/// Write a release by hand
async fn create_release(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(command): Json<CreateReleaseCommand>,
) -> Result<(StatusCode, Json<GenerateReleaseResponse>), AppError> {
    let handler = CreateReleaseHandler::new(state.releases.clone());
    let release = handler.execute(command, &context).await?;

    Ok((
        StatusCode::CREATED,
        Json(GenerateReleaseResponse {
            edit_url: edit_url(release.id),
            release,
        }),
    ))
}

// =========================================================================
// GET/PATCH/DELETE /releases/:release_id
// =========================================================================

/// A release in its editable form
async fn get_release(
    State(state): State<AppState>,
    Path(release_id): Path<i64>,
) -> Result<Json<ReleaseDetailResponse>, AppError> {
    let release = state.releases.get(release_id).await?;
    Ok(Json(release.into()))
}

/// Edit or publish a release
async fn update_release(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(release_id): Path<i64>,
    Json(update): Json<ReleaseUpdate>,
) -> Result<Json<Release>, AppError> {
    let handler = UpdateReleaseHandler::new(state.releases.clone());
    let release = handler
        .execute(UpdateReleaseCommand::new(release_id, update), &context)
        .await?;
    Ok(Json(release))
}

async fn delete_release(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(release_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let handler = UpdateReleaseHandler::new(state.releases.clone());
    handler.delete(release_id, &context).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_bounds() {
        assert_eq!(PageQuery::default().bounds(25), (25, 0));
        assert_eq!(PageQuery { page: Some(2) }.bounds(25), (25, 50));
    }

    #[test]
    fn test_events_query_deserializes_filters() {
        let query: EventsQuery = serde_json::from_str(
            r#"{"start":10,"event_type":"content_created","section_hint":""}"#,
        )
        .unwrap();
        assert_eq!(query.start, Some(10));
        assert!(query.end.is_none());
        let filter = query.filter().normalized();
        assert_eq!(filter.event_type.as_deref(), Some("content_created"));
        assert!(filter.section_hint.is_none());
    }

    #[test]
    fn test_detail_has_text_for_every_section() {
        use crate::domain::{SectionItem, Sections};

        let mut sections = Sections::default();
        sections.push(Section::Fixed, SectionItem::new("One", vec![1]));
        sections.push(Section::Fixed, SectionItem::new("Two", vec![2]));
        let release = Release {
            id: 3,
            title: "Draft".to_string(),
            label_type: LabelType::DateRange,
            version: None,
            release_date: 0,
            date_start: None,
            date_end: None,
            sections,
            published: false,
            owner: None,
            created: 0,
            changed: 0,
        };

        let detail = ReleaseDetailResponse::from(release);
        assert_eq!(detail.sections_text.len(), 6);
        assert_eq!(detail.sections_text["fixed"], "One\nTwo");
        assert_eq!(detail.sections_text["added"], "");
    }

    #[test]
    fn test_edit_url() {
        assert_eq!(edit_url(12), "/api/v1/admin/releases/12");
    }
}
