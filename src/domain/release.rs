//! Releases
//!
//! A release groups change events into categorized sections. Releases start
//! as drafts and become part of the public changelog once published.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{DomainError, Section, Sections};

pub const MAX_TITLE_LEN: usize = 255;
pub const MAX_VERSION_LEN: usize = 50;

/// How a release is labelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelType {
    DateRange,
    #[default]
    Custom,
    SemanticVersion,
}

impl LabelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelType::DateRange => "date_range",
            LabelType::Custom => "custom",
            LabelType::SemanticVersion => "semantic_version",
        }
    }
}

impl FromStr for LabelType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date_range" => Ok(LabelType::DateRange),
            "custom" => Ok(LabelType::Custom),
            "semantic_version" => Ok(LabelType::SemanticVersion),
            other => Err(DomainError::InvalidLabelType(other.to_string())),
        }
    }
}

impl std::fmt::Display for LabelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub id: i64,
    pub title: String,
    pub label_type: LabelType,
    pub version: Option<String>,
    pub release_date: i64,
    pub date_start: Option<i64>,
    pub date_end: Option<i64>,
    pub sections: Sections,
    pub published: bool,
    pub owner: Option<i64>,
    pub created: i64,
    pub changed: i64,
}

impl Release {
    /// Point in time the next aggregation starts from.
    /// The covered window's end if recorded, otherwise the release date.
    pub fn boundary(&self) -> i64 {
        self.date_end.unwrap_or(self.release_date)
    }
}

/// Values for inserting a release
#[derive(Debug, Clone, PartialEq)]
pub struct NewRelease {
    pub title: String,
    pub label_type: LabelType,
    pub version: Option<String>,
    pub release_date: i64,
    pub date_start: Option<i64>,
    pub date_end: Option<i64>,
    pub sections: Sections,
    pub published: bool,
    pub owner: Option<i64>,
}

impl NewRelease {
    pub fn validate(&self) -> Result<(), DomainError> {
        DomainError::require("title", &self.title)?;
        DomainError::check_length("title", &self.title, MAX_TITLE_LEN)?;
        if let Some(ref version) = self.version {
            DomainError::check_length("version", version, MAX_VERSION_LEN)?;
        }
        Ok(())
    }
}

/// Optional overrides when generating a release
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReleaseOptions {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub label_type: Option<LabelType>,
}

impl ReleaseOptions {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_label_type(mut self, label_type: LabelType) -> Self {
        self.label_type = Some(label_type);
        self
    }
}

/// Partial edit of a release
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReleaseUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub label_type: Option<LabelType>,
    /// `Some(None)` clears the version
    #[serde(default, with = "double_option")]
    pub version: Option<Option<String>>,
    #[serde(default)]
    pub release_date: Option<i64>,
    /// `Some(None)` clears the window start
    #[serde(default, with = "double_option")]
    pub date_start: Option<Option<i64>>,
    /// `Some(None)` clears the window end; the release date then bounds the next window
    #[serde(default, with = "double_option")]
    pub date_end: Option<Option<i64>>,
    #[serde(default)]
    pub published: Option<bool>,
    /// Section key to newline separated item text
    #[serde(default)]
    pub sections_text: Option<std::collections::BTreeMap<String, String>>,
}

impl ReleaseUpdate {
    /// Apply to a release in place; `now` becomes the changed time
    pub fn apply(&self, release: &mut Release, now: i64) -> Result<(), DomainError> {
        if let Some(ref title) = self.title {
            DomainError::require("title", title)?;
            DomainError::check_length("title", title, MAX_TITLE_LEN)?;
            release.title = title.clone();
        }
        if let Some(label_type) = self.label_type {
            release.label_type = label_type;
        }
        if let Some(ref version) = self.version {
            if let Some(ref v) = version {
                DomainError::check_length("version", v, MAX_VERSION_LEN)?;
            }
            release.version = version.clone().filter(|v| !v.trim().is_empty());
        }
        if let Some(release_date) = self.release_date {
            release.release_date = release_date;
        }
        if let Some(date_start) = self.date_start {
            release.date_start = date_start;
        }
        if let Some(date_end) = self.date_end {
            release.date_end = date_end;
        }
        if let Some(published) = self.published {
            release.published = published;
        }
        if let Some(ref texts) = self.sections_text {
            for (key, text) in texts {
                let section = Section::parse(key)
                    .ok_or_else(|| DomainError::InvalidSection(key.clone()))?;
                release.sections.replace_from_text(section, text);
            }
        }
        release.changed = now;
        Ok(())
    }
}

/// Listing filter for releases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseQuery {
    pub published_only: bool,
    pub limit: i64,
    pub offset: i64,
}

impl ReleaseQuery {
    pub fn published(limit: i64, offset: i64) -> Self {
        Self {
            published_only: true,
            limit,
            offset,
        }
    }

    pub fn all(limit: i64, offset: i64) -> Self {
        Self {
            published_only: false,
            limit,
            offset,
        }
    }
}

mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, T>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
