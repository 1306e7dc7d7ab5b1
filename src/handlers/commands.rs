//! Command definitions
//!
//! Commands represent intentions to change the system state.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{
    DomainError, LabelType, NewRelease, ReleaseOptions, ReleaseUpdate, Section, Sections,
};

/// Last second of a day, relative to its midnight
const END_OF_DAY_SECS: i64 = 86_399;

// =========================================================================
// GenerateReleaseCommand
// =========================================================================

/// Which window a generated release covers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// From the last published release up to now
    #[default]
    SinceLast,
    /// Between two calendar dates, both whole days included
    Custom,
}

/// Command to generate a draft release
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateReleaseCommand {
    #[serde(default)]
    pub mode: GenerationMode,
    /// YYYY-MM-DD, required in custom mode
    #[serde(default)]
    pub start_date: Option<String>,
    /// YYYY-MM-DD, required in custom mode
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl GenerateReleaseCommand {
    pub fn since_last() -> Self {
        Self::default()
    }

    pub fn custom(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            mode: GenerationMode::Custom,
            start_date: Some(start_date.into()),
            end_date: Some(end_date.into()),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// The custom window in epoch seconds, `None` in since-last mode.
    /// Start is midnight of the start date, end the last second of the end date (UTC).
    pub fn window(&self) -> Result<Option<(i64, i64)>, DomainError> {
        if self.mode == GenerationMode::SinceLast {
            return Ok(None);
        }

        let start = non_blank(&self.start_date);
        let end = non_blank(&self.end_date);
        let (start, end) = match (start, end) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(DomainError::validation(
                    "Please specify both start and end dates for custom range",
                ))
            }
        };

        let start = day_start(start)?;
        let end = day_start(end)? + END_OF_DAY_SECS;
        Ok(Some((start, end)))
    }

    /// Generator options; a version switches the label to semantic versioning
    pub fn options(&self) -> ReleaseOptions {
        let mut options = ReleaseOptions::default();
        if let Some(title) = non_blank(&self.title) {
            options = options.with_title(title);
        }
        if let Some(version) = non_blank(&self.version) {
            options = options
                .with_version(version)
                .with_label_type(LabelType::SemanticVersion);
        }
        options
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Midnight UTC of a YYYY-MM-DD date
fn day_start(date: &str) -> Result<i64, DomainError> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| DomainError::InvalidDate(date.to_string()))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| DomainError::InvalidDate(date.to_string()))?;
    Ok(midnight.and_utc().timestamp())
}

// =========================================================================
// CreateReleaseCommand
// =========================================================================

/// Command to write a release by hand
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateReleaseCommand {
    #[serde(default)]
    pub title: String,
    /// Defaults to `custom`
    #[serde(default)]
    pub label_type: Option<LabelType>,
    #[serde(default)]
    pub version: Option<String>,
    /// Defaults to now
    #[serde(default)]
    pub release_date: Option<i64>,
    #[serde(default)]
    pub date_start: Option<i64>,
    #[serde(default)]
    pub date_end: Option<i64>,
    #[serde(default)]
    pub published: bool,
    /// Section key to newline separated item text
    #[serde(default)]
    pub sections_text: BTreeMap<String, String>,
}

impl CreateReleaseCommand {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_release_date(mut self, release_date: i64) -> Self {
        self.release_date = Some(release_date);
        self
    }

    pub fn with_section(mut self, section: Section, text: impl Into<String>) -> Self {
        self.sections_text
            .insert(section.as_str().to_string(), text.into());
        self
    }

    pub fn published(mut self) -> Self {
        self.published = true;
        self
    }

    /// Values to store; unknown section keys are rejected
    pub fn into_new_release(self, now: i64, owner: Option<i64>) -> Result<NewRelease, DomainError> {
        let mut sections = Sections::new();
        for (key, text) in &self.sections_text {
            let section =
                Section::parse(key).ok_or_else(|| DomainError::InvalidSection(key.clone()))?;
            sections.replace_from_text(section, text);
        }

        Ok(NewRelease {
            version: non_blank(&self.version).map(str::to_string),
            title: self.title,
            label_type: self.label_type.unwrap_or_default(),
            release_date: self.release_date.unwrap_or(now),
            date_start: self.date_start,
            date_end: self.date_end,
            sections,
            published: self.published,
            owner,
        })
    }
}

// =========================================================================
// UpdateReleaseCommand
// =========================================================================

/// Command to edit (or publish) an existing release
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateReleaseCommand {
    pub release_id: i64,
    pub update: ReleaseUpdate,
}

impl UpdateReleaseCommand {
    pub fn new(release_id: i64, update: ReleaseUpdate) -> Self {
        Self { release_id, update }
    }

    /// Shorthand for flipping the published flag
    pub fn publish(release_id: i64, published: bool) -> Self {
        Self::new(
            release_id,
            ReleaseUpdate {
                published: Some(published),
                ..ReleaseUpdate::default()
            },
        )
    }
}
