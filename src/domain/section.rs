//! Release Sections
//!
//! Changelog categories and the section/item structure stored on releases.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Changelog category an event or release item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Added,
    Changed,
    Fixed,
    Removed,
    Security,
    Other,
}

impl Section {
    /// All sections in canonical order
    pub const ALL: [Section; 6] = [
        Section::Added,
        Section::Changed,
        Section::Fixed,
        Section::Removed,
        Section::Security,
        Section::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Added => "added",
            Section::Changed => "changed",
            Section::Fixed => "fixed",
            Section::Removed => "removed",
            Section::Security => "security",
            Section::Other => "other",
        }
    }

    /// Human readable heading
    pub fn label(&self) -> &'static str {
        match self {
            Section::Added => "Added",
            Section::Changed => "Changed",
            Section::Fixed => "Fixed",
            Section::Removed => "Removed",
            Section::Security => "Security",
            Section::Other => "Other",
        }
    }

    /// Parse a known section key
    pub fn parse(key: &str) -> Option<Section> {
        Section::ALL.into_iter().find(|s| s.as_str() == key)
    }

    /// Resolve an event's section hint; absent, empty or unknown hints map to `Other`
    pub fn from_hint(hint: Option<&str>) -> Section {
        hint.and_then(Section::parse).unwrap_or(Section::Other)
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One line of a release section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionItem {
    pub id: Uuid,
    pub text: String,
    /// Originating event ids, empty for manually written items
    #[serde(default)]
    pub event_ids: Vec<i64>,
}

impl SectionItem {
    pub fn new(text: impl Into<String>, event_ids: Vec<i64>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            event_ids,
        }
    }
}

/// The six sections of a release, always all present
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sections {
    pub added: Vec<SectionItem>,
    pub changed: Vec<SectionItem>,
    pub fixed: Vec<SectionItem>,
    pub removed: Vec<SectionItem>,
    pub security: Vec<SectionItem>,
    pub other: Vec<SectionItem>,
}

impl Sections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a stored sections blob.
    /// Empty or undecodable content yields the empty six-section structure.
    pub fn decode(raw: &str) -> Self {
        Self::decode_release(raw, None)
    }

    /// Decode the sections of a stored release.
    /// Each section is decoded on its own, so one malformed section leaves
    /// the others intact. Missing or null sections are empty.
    pub fn decode_release(raw: &str, release_id: Option<i64>) -> Self {
        if raw.trim().is_empty() {
            return Self::default();
        }

        let mut object = match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(serde_json::Value::Object(object)) => object,
            Ok(_) => {
                tracing::warn!(?release_id, "Release sections are not an object, discarding");
                return Self::default();
            }
            Err(e) => {
                tracing::warn!(?release_id, error = %e, "Discarding undecodable release sections");
                return Self::default();
            }
        };

        let mut sections = Self::default();
        for section in Section::ALL {
            let value = match object.remove(section.as_str()) {
                None | Some(serde_json::Value::Null) => continue,
                Some(value) => value,
            };
            match serde_json::from_value::<Vec<SectionItem>>(value) {
                Ok(items) => *sections.get_mut(section) = items,
                Err(e) => tracing::warn!(
                    ?release_id,
                    section = section.as_str(),
                    error = %e,
                    "Discarding undecodable release section"
                ),
            }
        }
        sections
    }

    /// Encode for storage
    pub fn encode(&self) -> String {
        // Plain structs of strings and integers always serialize
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn get(&self, section: Section) -> &[SectionItem] {
        match section {
            Section::Added => &self.added,
            Section::Changed => &self.changed,
            Section::Fixed => &self.fixed,
            Section::Removed => &self.removed,
            Section::Security => &self.security,
            Section::Other => &self.other,
        }
    }

    fn get_mut(&mut self, section: Section) -> &mut Vec<SectionItem> {
        match section {
            Section::Added => &mut self.added,
            Section::Changed => &mut self.changed,
            Section::Fixed => &mut self.fixed,
            Section::Removed => &mut self.removed,
            Section::Security => &mut self.security,
            Section::Other => &mut self.other,
        }
    }

    pub fn push(&mut self, section: Section, item: SectionItem) {
        self.get_mut(section).push(item);
    }

    /// Iterate sections in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Section, &[SectionItem])> {
        Section::ALL.into_iter().map(move |s| (s, self.get(s)))
    }

    /// Sections that contain at least one item
    pub fn non_empty(&self) -> impl Iterator<Item = (Section, &[SectionItem])> {
        self.iter().filter(|(_, items)| !items.is_empty())
    }

    pub fn item_count(&self) -> usize {
        self.iter().map(|(_, items)| items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    /// Short summary: the first `limit` non-empty item texts joined by a bullet
    pub fn excerpt(&self, limit: usize) -> String {
        self.iter()
            .flat_map(|(_, items)| items.iter())
            .map(|item| item.text.trim())
            .filter(|text| !text.is_empty())
            .take(limit)
            .collect::<Vec<_>>()
            .join(" • ")
    }

    /// Item texts of one section, one per line
    pub fn to_text(&self, section: Section) -> String {
        self.get(section)
            .iter()
            .map(|item| item.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Replace a section with manually written lines.
    /// Blank lines are dropped; new items carry no event ids.
    pub fn replace_from_text(&mut self, section: Section, text: &str) {
        let items = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| SectionItem::new(line, Vec::new()))
            .collect();
        *self.get_mut(section) = items;
    }
}
