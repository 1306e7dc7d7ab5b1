//! Change Events
//!
//! A change event is one observed change in the platform (content, module or
//! user lifecycle). Events are immutable once stored.

use serde::{Deserialize, Serialize};

use super::{DomainError, Section};

pub const MAX_EVENT_TYPE_LEN: usize = 64;
pub const MAX_SOURCE_LEN: usize = 64;
pub const MAX_REFERENCE_LEN: usize = 64;
pub const MAX_MESSAGE_LEN: usize = 512;
pub const MAX_SECTION_HINT_LEN: usize = 32;

/// A stored change event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    /// Seconds since the Unix epoch
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

impl Event {
    /// Section this event lands in when grouped into a release
    pub fn section(&self) -> Section {
        Section::from_hint(self.section_hint.as_deref())
    }
}

/// Payload for logging a new event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub event_type: String,
    pub source: String,
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub entity_type_id: Option<String>,
    #[serde(default)]
    pub entity_id: Option<i64>,
    #[serde(default)]
    pub bundle: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub section_hint: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl NewEvent {
    pub fn new(
        event_type: impl Into<String>,
        source: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            source: source.into(),
            message: message.into(),
            timestamp: None,
            entity_type_id: None,
            entity_id: None,
            bundle: None,
            user_id: None,
            section_hint: None,
            metadata: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_entity(mut self, entity_type_id: impl Into<String>, entity_id: i64) -> Self {
        self.entity_type_id = Some(entity_type_id.into());
        self.entity_id = Some(entity_id);
        self
    }

    pub fn with_bundle(mut self, bundle: impl Into<String>) -> Self {
        self.bundle = Some(bundle.into());
        self
    }

    pub fn with_user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_section(mut self, section: Section) -> Self {
        self.section_hint = Some(section.as_str().to_string());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Check required fields and storage limits
    pub fn validate(&self) -> Result<(), DomainError> {
        DomainError::require("event_type", &self.event_type)?;
        DomainError::require("source", &self.source)?;
        DomainError::require("message", &self.message)?;

        DomainError::check_length("event_type", &self.event_type, MAX_EVENT_TYPE_LEN)?;
        DomainError::check_length("source", &self.source, MAX_SOURCE_LEN)?;
        DomainError::check_length("message", &self.message, MAX_MESSAGE_LEN)?;

        if let Some(ref entity_type_id) = self.entity_type_id {
            DomainError::check_length("entity_type_id", entity_type_id, MAX_REFERENCE_LEN)?;
        }
        if let Some(ref bundle) = self.bundle {
            DomainError::check_length("bundle", bundle, MAX_REFERENCE_LEN)?;
        }
        if let Some(ref hint) = self.section_hint {
            DomainError::check_length("section_hint", hint, MAX_SECTION_HINT_LEN)?;
        }

        Ok(())
    }
}

/// Decode a stored metadata blob; anything that is not a JSON object becomes `{}`
pub fn decode_metadata(raw: &str) -> serde_json::Value {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value @ serde_json::Value::Object(_)) => value,
        _ => serde_json::Value::Object(serde_json::Map::new()),
    }
}

/// Truncate to at most `max` characters without splitting a char
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_event_builder() {
        let event = NewEvent::new("content_created", "content_entity", "Created page")
            .with_entity("node", 7)
            .with_bundle("page")
            .with_section(Section::Added)
            .with_metadata(json!({"title": "About"}));

        assert_eq!(event.entity_type_id.as_deref(), Some("node"));
        assert_eq!(event.entity_id, Some(7));
        assert_eq!(event.section_hint.as_deref(), Some("added"));
        assert!(event.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_fields() {
        let missing_type = NewEvent::new("", "system", "msg");
        assert_eq!(
            missing_type.validate(),
            Err(DomainError::MissingField("event_type"))
        );

        let missing_source = NewEvent::new("module_installed", " ", "msg");
        assert_eq!(
            missing_source.validate(),
            Err(DomainError::MissingField("source"))
        );

        let missing_message = NewEvent::new("module_installed", "system", "");
        assert_eq!(
            missing_message.validate(),
            Err(DomainError::MissingField("message"))
        );
    }

    #[test]
    fn test_validate_message_limit() {
        let ok = NewEvent::new("t", "s", "a".repeat(MAX_MESSAGE_LEN));
        assert!(ok.validate().is_ok());

        let too_long = NewEvent::new("t", "s", "a".repeat(MAX_MESSAGE_LEN + 1));
        assert!(matches!(
            too_long.validate(),
            Err(DomainError::FieldTooLong { field: "message", .. })
        ));
    }

    #[test]
    fn test_deserialize_minimal_payload() {
        let payload: NewEvent = serde_json::from_str(
            r#"{"event_type":"deploy","source":"system","message":"Deployed"}"#,
        )
        .unwrap();

        assert!(payload.timestamp.is_none());
        assert!(payload.metadata.is_none());
        assert!(payload.section_hint.is_none());
    }

    #[test]
    fn test_decode_metadata() {
        assert_eq!(decode_metadata(r#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(decode_metadata("garbage"), json!({}));
        assert_eq!(decode_metadata("[1]"), json!({}));
        assert_eq!(decode_metadata(""), json!({}));
    }

    #[test]
    fn test_event_section() {
        let mut event = Event {
            id: 1,
            timestamp: 0,
            event_type: "x".into(),
            source: "y".into(),
            entity_type_id: None,
            entity_id: None,
            bundle: None,
            user_id: None,
            message: "m".into(),
            section_hint: Some("fixed".into()),
            metadata: json!({}),
        };
        assert_eq!(event.section(), Section::Fixed);

        event.section_hint = Some("whatever".into());
        assert_eq!(event.section(), Section::Other);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
