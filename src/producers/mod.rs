//! Change Producers
//!
//! Translates platform lifecycle notifications (content, modules, users) into
//! change events. Call sites invoke `ChangeTracker` directly wherever the
//! platform performs the change.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::TrackingSettings;
use crate::domain::event::{truncate_chars, MAX_MESSAGE_LEN};
use crate::domain::{Event, NewEvent, OperationContext, Section};
use crate::event_store::{EventStore, EventStoreError};

/// Name this service registers under; its own installation is not logged
pub const OWN_MODULE_NAME: &str = "changelog_service";

/// Lifecycle change kinds and their fixed event policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    ContentCreated,
    ContentUpdated,
    ContentDeleted,
    ModuleInstalled,
    ModuleUninstalled,
    UserCreated,
    UserRoleChanged,
}

/// Which tracking switch governs a change kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFamily {
    Content,
    Modules,
    Users,
}

impl ChangeKind {
    pub fn event_type(&self) -> &'static str {
        match self {
            ChangeKind::ContentCreated => "content_created",
            ChangeKind::ContentUpdated => "content_updated",
            ChangeKind::ContentDeleted => "content_deleted",
            ChangeKind::ModuleInstalled => "module_installed",
            ChangeKind::ModuleUninstalled => "module_uninstalled",
            ChangeKind::UserCreated => "user_created",
            ChangeKind::UserRoleChanged => "user_role_changed",
        }
    }

    pub fn source(&self) -> &'static str {
        match self.family() {
            ChangeFamily::Content => "content_entity",
            ChangeFamily::Modules => "system",
            ChangeFamily::Users => "user",
        }
    }

    /// Creates are added, updates changed, deletes removed
    pub fn section(&self) -> Section {
        match self {
            ChangeKind::ContentCreated | ChangeKind::ModuleInstalled | ChangeKind::UserCreated => {
                Section::Added
            }
            ChangeKind::ContentUpdated | ChangeKind::UserRoleChanged => Section::Changed,
            ChangeKind::ContentDeleted | ChangeKind::ModuleUninstalled => Section::Removed,
        }
    }

    pub fn family(&self) -> ChangeFamily {
        match self {
            ChangeKind::ContentCreated | ChangeKind::ContentUpdated | ChangeKind::ContentDeleted => {
                ChangeFamily::Content
            }
            ChangeKind::ModuleInstalled | ChangeKind::ModuleUninstalled => ChangeFamily::Modules,
            ChangeKind::UserCreated | ChangeKind::UserRoleChanged => ChangeFamily::Users,
        }
    }

    /// Event payload skeleton for this kind
    fn new_event(&self, message: String) -> NewEvent {
        NewEvent::new(
            self.event_type(),
            self.source(),
            truncate_chars(&message, MAX_MESSAGE_LEN),
        )
        .with_section(self.section())
    }
}

/// A content item that was created, updated or deleted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentChange {
    /// Entity type, e.g. "node"
    #[serde(default = "default_content_entity_type")]
    pub entity_type_id: String,
    pub entity_id: i64,
    /// Content type machine name, e.g. "article"
    pub bundle: String,
    /// Content type label, e.g. "Article"
    pub type_label: String,
    pub title: String,
    #[serde(default)]
    pub path: Option<String>,
}

fn default_content_entity_type() -> String {
    "node".to_string()
}

/// A user account that was created or updated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserChange {
    pub user_id: i64,
    pub account_name: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Lifecycle notification as received from the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeNotification {
    ContentCreated {
        content: ContentChange,
    },
    ContentUpdated {
        content: ContentChange,
    },
    ContentDeleted {
        content: ContentChange,
    },
    ModulesInstalled {
        modules: Vec<String>,
        #[serde(default)]
        is_syncing: bool,
    },
    ModulesUninstalled {
        modules: Vec<String>,
        #[serde(default)]
        is_syncing: bool,
    },
    UserCreated {
        user: UserChange,
    },
    UserUpdated {
        user: UserChange,
        original_roles: Vec<String>,
    },
}

/// Logs change events for platform lifecycle changes
#[derive(Debug, Clone)]
pub struct ChangeTracker {
    event_store: EventStore,
    settings: TrackingSettings,
}

impl ChangeTracker {
    pub fn new(event_store: EventStore, settings: TrackingSettings) -> Self {
        Self {
            event_store,
            settings,
        }
    }

    fn is_tracked(&self, family: ChangeFamily) -> bool {
        match family {
            ChangeFamily::Content => self.settings.track_content,
            ChangeFamily::Modules => self.settings.track_modules,
            ChangeFamily::Users => self.settings.track_users,
        }
    }

    /// Dispatch a notification; returns the events written (possibly none)
    pub async fn record(
        &self,
        notification: ChangeNotification,
        context: &OperationContext,
    ) -> Result<Vec<Event>, EventStoreError> {
        match notification {
            ChangeNotification::ContentCreated { content } => {
                self.content_changed(ChangeKind::ContentCreated, &content, context).await
            }
            ChangeNotification::ContentUpdated { content } => {
                self.content_changed(ChangeKind::ContentUpdated, &content, context).await
            }
            ChangeNotification::ContentDeleted { content } => {
                self.content_changed(ChangeKind::ContentDeleted, &content, context).await
            }
            ChangeNotification::ModulesInstalled { modules, is_syncing } => {
                self.modules_installed(&modules, is_syncing, context).await
            }
            ChangeNotification::ModulesUninstalled { modules, is_syncing } => {
                self.modules_uninstalled(&modules, is_syncing, context).await
            }
            ChangeNotification::UserCreated { user } => self.user_created(&user, context).await,
            ChangeNotification::UserUpdated {
                user,
                original_roles,
            } => self.user_updated(&user, &original_roles, context).await,
        }
    }

    // =========================================================================
    // Content
    // =========================================================================

    pub async fn content_changed(
        &self,
        kind: ChangeKind,
        content: &ContentChange,
        context: &OperationContext,
    ) -> Result<Vec<Event>, EventStoreError> {
        if kind.family() != ChangeFamily::Content || !self.is_tracked(ChangeFamily::Content) {
            return Ok(Vec::new());
        }

        let verb = match kind {
            ChangeKind::ContentCreated => "Created",
            ChangeKind::ContentUpdated => "Updated",
            _ => "Deleted",
        };
        let message = format!("{} {}: \"{}\"", verb, content.type_label, content.title);

        // Deleted content no longer has a path
        let metadata = match (&content.path, kind) {
            (Some(path), ChangeKind::ContentCreated | ChangeKind::ContentUpdated) => {
                json!({ "title": content.title, "path": path })
            }
            _ => json!({ "title": content.title }),
        };

        let payload = kind
            .new_event(message)
            .with_entity(content.entity_type_id.clone(), content.entity_id)
            .with_bundle(content.bundle.clone())
            .with_metadata(metadata);

        let event = self.event_store.log_event(payload, context).await?;
        Ok(vec![event])
    }

    // =========================================================================
    // Modules
    // =========================================================================

    /// One event per installed module; nothing while configuration is syncing
    pub async fn modules_installed(
        &self,
        modules: &[String],
        is_syncing: bool,
        context: &OperationContext,
    ) -> Result<Vec<Event>, EventStoreError> {
        let modules: Vec<&String> = modules
            .iter()
            .filter(|m| m.as_str() != OWN_MODULE_NAME)
            .collect();
        self.modules_changed(ChangeKind::ModuleInstalled, &modules, is_syncing, context)
            .await
    }

    pub async fn modules_uninstalled(
        &self,
        modules: &[String],
        is_syncing: bool,
        context: &OperationContext,
    ) -> Result<Vec<Event>, EventStoreError> {
        let modules: Vec<&String> = modules.iter().collect();
        self.modules_changed(ChangeKind::ModuleUninstalled, &modules, is_syncing, context)
            .await
    }

    async fn modules_changed(
        &self,
        kind: ChangeKind,
        modules: &[&String],
        is_syncing: bool,
        context: &OperationContext,
    ) -> Result<Vec<Event>, EventStoreError> {
        if is_syncing || !self.is_tracked(ChangeFamily::Modules) {
            return Ok(Vec::new());
        }

        let verb = match kind {
            ChangeKind::ModuleInstalled => "Installed",
            _ => "Uninstalled",
        };

        let mut events = Vec::with_capacity(modules.len());
        for module in modules {
            let payload = kind
                .new_event(format!("{} module: {}", verb, module))
                .with_metadata(json!({ "module": module }));
            events.push(self.event_store.log_event(payload, context).await?);
        }
        Ok(events)
    }

    // =========================================================================
    // Users
    // =========================================================================

    pub async fn user_created(
        &self,
        user: &UserChange,
        context: &OperationContext,
    ) -> Result<Vec<Event>, EventStoreError> {
        if !self.is_tracked(ChangeFamily::Users) {
            return Ok(Vec::new());
        }

        let kind = ChangeKind::UserCreated;
        let payload = kind
            .new_event(format!("Created user: {}", user.account_name))
            .with_entity("user", user.user_id)
            .with_metadata(json!({ "username": user.account_name }));

        let event = self.event_store.log_event(payload, context).await?;
        Ok(vec![event])
    }

    /// Only role changes are logged; other profile edits are ignored
    pub async fn user_updated(
        &self,
        user: &UserChange,
        original_roles: &[String],
        context: &OperationContext,
    ) -> Result<Vec<Event>, EventStoreError> {
        if !self.is_tracked(ChangeFamily::Users) || !roles_differ(original_roles, &user.roles) {
            return Ok(Vec::new());
        }

        let kind = ChangeKind::UserRoleChanged;
        let payload = kind
            .new_event(format!("Changed roles for user: {}", user.account_name))
            .with_entity("user", user.user_id)
            .with_metadata(json!({
                "username": user.account_name,
                "old_roles": original_roles,
                "new_roles": user.roles,
            }));

        let event = self.event_store.log_event(payload, context).await?;
        Ok(vec![event])
    }
}

/// Role sets differ, ignoring order and duplicates
fn roles_differ(old: &[String], new: &[String]) -> bool {
    let old: std::collections::BTreeSet<&String> = old.iter().collect();
    let new: std::collections::BTreeSet<&String> = new.iter().collect();
    old != new
}
