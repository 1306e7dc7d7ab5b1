//! PostgreSQL storage
//!
//! Tables `changelog_events` and `changelog_releases`, see
//! `migrations/0001_changelog.sql`. Metadata and sections are stored as
//! JSON text and decoded leniently on read.

use sqlx::{FromRow, PgPool};

use crate::domain::event::decode_metadata;
use crate::domain::{Event, LabelType, NewRelease, Release, ReleaseQuery, Sections};

use super::{EventFilter, EventInsert, StoreError};

const EVENT_COLUMNS: &str = r#"
    id, event_timestamp, event_type, source, entity_type_id, entity_id,
    bundle, user_id, message, section_hint, metadata
"#;

const RELEASE_COLUMNS: &str = r#"
    id, title, label_type, version, release_date, date_start, date_end,
    sections, status, owner_id, created, changed
"#;

#[derive(Debug, FromRow)]
struct EventRow {
    id: i64,
    event_timestamp: i64,
    event_type: String,
    source: String,
    entity_type_id: Option<String>,
    entity_id: Option<i64>,
    bundle: Option<String>,
    user_id: Option<i64>,
    message: String,
    section_hint: Option<String>,
    metadata: Option<String>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            timestamp: row.event_timestamp,
            event_type: row.event_type,
            source: row.source,
            entity_type_id: row.entity_type_id,
            entity_id: row.entity_id,
            bundle: row.bundle,
            user_id: row.user_id,
            message: row.message,
            section_hint: row.section_hint,
            metadata: decode_metadata(row.metadata.as_deref().unwrap_or("")),
        }
    }
}

#[derive(Debug, FromRow)]
struct ReleaseRow {
    id: i64,
    title: String,
    label_type: String,
    version: Option<String>,
    release_date: i64,
    date_start: Option<i64>,
    date_end: Option<i64>,
    sections: Option<String>,
    status: bool,
    owner_id: Option<i64>,
    created: i64,
    changed: i64,
}

impl From<ReleaseRow> for Release {
    fn from(row: ReleaseRow) -> Self {
        let label_type = row.label_type.parse().unwrap_or_else(|_| {
            tracing::warn!(
                release_id = row.id,
                label_type = %row.label_type,
                "Unknown label type, using custom"
            );
            LabelType::Custom
        });

        Release {
            id: row.id,
            title: row.title,
            label_type,
            version: row.version,
            release_date: row.release_date,
            date_start: row.date_start,
            date_end: row.date_end,
            sections: Sections::decode_release(
                row.sections.as_deref().unwrap_or(""),
                Some(row.id),
            ),
            published: row.status,
            owner: row.owner_id,
            created: row.created,
            changed: row.changed,
        }
    }
}

/// PostgreSQL-backed store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // ============================================
    // Events
    // ============================================

    pub async fn insert_event(&self, input: EventInsert) -> Result<Event, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO changelog_events (
                event_timestamp, event_type, source, entity_type_id, entity_id,
                bundle, user_id, message, section_hint, metadata
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            EVENT_COLUMNS
        );

        let row: EventRow = sqlx::query_as(&sql)
            .bind(input.timestamp)
            .bind(&input.event_type)
            .bind(&input.source)
            .bind(&input.entity_type_id)
            .bind(input.entity_id)
            .bind(&input.bundle)
            .bind(input.user_id)
            .bind(&input.message)
            .bind(&input.section_hint)
            .bind(input.metadata.to_string())
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    pub async fn events_in_range(
        &self,
        start: i64,
        end: i64,
        filter: &EventFilter,
    ) -> Result<Vec<Event>, StoreError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM changelog_events
            WHERE event_timestamp >= $1 AND event_timestamp <= $2
              AND ($3::text IS NULL OR event_type = $3)
              AND ($4::text IS NULL OR source = $4)
              AND ($5::text IS NULL OR section_hint = $5)
            ORDER BY event_timestamp ASC, id ASC
            "#,
            EVENT_COLUMNS
        );

        let rows: Vec<EventRow> = sqlx::query_as(&sql)
            .bind(start)
            .bind(end)
            .bind(&filter.event_type)
            .bind(&filter.source)
            .bind(&filter.section_hint)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Event::from).collect())
    }

    pub async fn count_events_since(&self, since: i64) -> Result<i64, StoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM changelog_events WHERE event_timestamp >= $1")
                .bind(since)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    pub async fn delete_events_before(&self, cutoff: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM changelog_events WHERE event_timestamp < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // ============================================
    // Releases
    // ============================================

    pub async fn insert_release(&self, input: NewRelease, now: i64) -> Result<Release, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO changelog_releases (
                title, label_type, version, release_date, date_start, date_end,
                sections, status, owner_id, created, changed
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING {}
            "#,
            RELEASE_COLUMNS
        );

        let row: ReleaseRow = sqlx::query_as(&sql)
            .bind(&input.title)
            .bind(input.label_type.as_str())
            .bind(&input.version)
            .bind(input.release_date)
            .bind(input.date_start)
            .bind(input.date_end)
            .bind(input.sections.encode())
            .bind(input.published)
            .bind(input.owner)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    pub async fn get_release(&self, id: i64) -> Result<Option<Release>, StoreError> {
        let sql = format!(
            "SELECT {} FROM changelog_releases WHERE id = $1",
            RELEASE_COLUMNS
        );

        let row: Option<ReleaseRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Release::from))
    }

    pub async fn save_release(&self, release: &Release) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE changelog_releases
            SET title = $2, label_type = $3, version = $4, release_date = $5,
                date_start = $6, date_end = $7, sections = $8, status = $9,
                owner_id = $10, changed = $11
            WHERE id = $1
            "#,
        )
        .bind(release.id)
        .bind(&release.title)
        .bind(release.label_type.as_str())
        .bind(&release.version)
        .bind(release.release_date)
        .bind(release.date_start)
        .bind(release.date_end)
        .bind(release.sections.encode())
        .bind(release.published)
        .bind(release.owner)
        .bind(release.changed)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_release(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM changelog_releases WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn latest_published_release(&self) -> Result<Option<Release>, StoreError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM changelog_releases
            WHERE status = TRUE
            ORDER BY release_date DESC, id DESC
            LIMIT 1
            "#,
            RELEASE_COLUMNS
        );

        let row: Option<ReleaseRow> = sqlx::query_as(&sql).fetch_optional(&self.pool).await?;
        Ok(row.map(Release::from))
    }

    pub async fn list_releases(&self, query: ReleaseQuery) -> Result<Vec<Release>, StoreError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM changelog_releases
            WHERE ($1 = FALSE OR status = TRUE)
            ORDER BY release_date DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
            RELEASE_COLUMNS
        );

        let rows: Vec<ReleaseRow> = sqlx::query_as(&sql)
            .bind(query.published_only)
            .bind(query.limit.max(0))
            .bind(query.offset.max(0))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Release::from).collect())
    }

    pub async fn count_releases(&self, published_only: bool) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM changelog_releases WHERE ($1 = FALSE OR status = TRUE)",
        )
        .bind(published_only)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
