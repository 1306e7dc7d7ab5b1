//! Public changelog
//!
//! Published releases only, newest first. Drafts are invisible here.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::domain::{LabelType, Release, ReleaseQuery};
use crate::error::{AppError, AppResult};

use super::routes::PageQuery;
use super::AppState;

/// Releases per public listing page
pub const PUBLIC_PAGE_SIZE: i64 = 10;
/// Items shown in a listing excerpt
pub const EXCERPT_ITEMS: usize = 2;

#[derive(Debug, Serialize, Deserialize)]
pub struct PublicReleaseSummary {
    pub id: i64,
    pub title: String,
    pub version: Option<String>,
    pub release_date: i64,
    pub excerpt: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PublicListResponse {
    pub releases: Vec<PublicReleaseSummary>,
    pub page: u32,
    pub per_page: i64,
    pub total: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PublicSection {
    pub key: String,
    pub label: String,
    pub items: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PublicReleaseView {
    pub id: i64,
    pub title: String,
    pub label_type: LabelType,
    pub version: Option<String>,
    pub release_date: i64,
    pub date_start: Option<i64>,
    pub date_end: Option<i64>,
    /// Only populated sections, canonical order
    pub sections: Vec<PublicSection>,
}

impl From<Release> for PublicReleaseView {
    fn from(release: Release) -> Self {
        let sections = release
            .sections
            .non_empty()
            .map(|(section, items)| PublicSection {
                key: section.as_str().to_string(),
                label: section.label().to_string(),
                items: items.iter().map(|item| item.text.clone()).collect(),
            })
            .collect();

        Self {
            id: release.id,
            title: release.title,
            label_type: release.label_type,
            version: release.version,
            release_date: release.release_date,
            date_start: release.date_start,
            date_end: release.date_end,
            sections,
        }
    }
}

/// Public routes mounted at `changelog_path`
pub fn create_router(changelog_path: &str) -> Router<AppState> {
    Router::new()
        .route(changelog_path, get(list_published))
        .route(&format!("{}/:release_id", changelog_path), get(view_published))
}

async fn list_published(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<PublicListResponse>> {
    let (limit, offset) = page.bounds(PUBLIC_PAGE_SIZE);
    let releases = state
        .releases
        .list(ReleaseQuery::published(limit, offset))
        .await?;
    let total = state.releases.count(true).await?;

    let releases = releases
        .into_iter()
        .map(|release| PublicReleaseSummary {
            excerpt: release.sections.excerpt(EXCERPT_ITEMS),
            id: release.id,
            title: release.title,
            version: release.version,
            release_date: release.release_date,
        })
        .collect();

    Ok(Json(PublicListResponse {
        releases,
        page: page.page.unwrap_or(0),
        per_page: PUBLIC_PAGE_SIZE,
        total,
    }))
}

async fn view_published(
    State(state): State<AppState>,
    Path(release_id): Path<i64>,
) -> AppResult<Json<PublicReleaseView>> {
    match state.releases.find(release_id).await? {
        Some(release) if release.published => Ok(Json(release.into())),
        _ => Err(AppError::NotFound),
    }
}
