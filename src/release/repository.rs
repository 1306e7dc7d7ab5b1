//! Release Repository
//!
//! Creating, reading, editing and deleting stored releases.

use crate::clock::SharedClock;
use crate::domain::{NewRelease, Release, ReleaseQuery, ReleaseUpdate};
use crate::store::StorageBackend;

use super::ReleaseError;

#[derive(Debug, Clone)]
pub struct ReleaseRepository {
    backend: StorageBackend,
    clock: SharedClock,
}

impl ReleaseRepository {
    pub fn new(backend: StorageBackend, clock: SharedClock) -> Self {
        Self { backend, clock }
    }

    /// Current time according to the injected clock
    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Store a manually written release
    pub async fn create(&self, new_release: NewRelease) -> Result<Release, ReleaseError> {
        new_release.validate()?;

        let release = self
            .backend
            .insert_release(new_release, self.clock.now())
            .await?;

        tracing::info!(
            release_id = release.id,
            published = release.published,
            "Release created"
        );

        Ok(release)
    }

    pub async fn find(&self, id: i64) -> Result<Option<Release>, ReleaseError> {
        Ok(self.backend.get_release(id).await?)
    }

    pub async fn get(&self, id: i64) -> Result<Release, ReleaseError> {
        self.find(id).await?.ok_or(ReleaseError::NotFound(id))
    }

    /// Newest first by release date, ties by id
    pub async fn list(&self, query: ReleaseQuery) -> Result<Vec<Release>, ReleaseError> {
        Ok(self.backend.list_releases(query).await?)
    }

    pub async fn count(&self, published_only: bool) -> Result<i64, ReleaseError> {
        Ok(self.backend.count_releases(published_only).await?)
    }

    /// Apply a partial edit. Nothing is written when the edit is invalid.
    pub async fn update(&self, id: i64, update: &ReleaseUpdate) -> Result<Release, ReleaseError> {
        let mut release = self.get(id).await?;
        let was_published = release.published;

        update.apply(&mut release, self.clock.now())?;

        if !self.backend.save_release(&release).await? {
            return Err(ReleaseError::NotFound(id));
        }

        if release.published != was_published {
            tracing::info!(
                release_id = id,
                published = release.published,
                "Release status changed"
            );
        }

        Ok(release)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ReleaseError> {
        if !self.backend.delete_release(id).await? {
            return Err(ReleaseError::NotFound(id));
        }
        tracing::info!(release_id = id, "Release deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::domain::{DomainError, LabelType, Sections};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn release_input() -> NewRelease {
        NewRelease {
            title: "Draft".to_string(),
            label_type: LabelType::DateRange,
            version: None,
            release_date: 100,
            date_start: Some(0),
            date_end: Some(100),
            sections: Sections::default(),
            published: false,
            owner: None,
        }
    }

    async fn setup() -> (ReleaseRepository, FixedClock, i64) {
        let clock = FixedClock::new(100);
        let backend = StorageBackend::in_memory();
        let release = backend.insert_release(release_input(), 100).await.unwrap();
        let repo = ReleaseRepository::new(backend, Arc::new(clock.clone()));
        (repo, clock, release.id)
    }

    #[tokio::test]
    async fn test_get_missing_release() {
        let (repo, _, _) = setup().await;
        let err = repo.get(999).await.unwrap_err();
        assert!(matches!(err, ReleaseError::NotFound(999)));
    }

    #[tokio::test]
    async fn test_update_publishes_and_edits_sections() {
        let (repo, clock, id) = setup().await;
        clock.set(250);

        let mut texts = BTreeMap::new();
        texts.insert("fixed".to_string(), "Crash on save\n\n  Typo  ".to_string());
        let update = ReleaseUpdate {
            title: Some("1.0".to_string()),
            published: Some(true),
            sections_text: Some(texts),
            ..ReleaseUpdate::default()
        };

        let release = repo.update(id, &update).await.unwrap();
        assert!(release.published);
        assert_eq!(release.changed, 250);

        let stored = repo.get(id).await.unwrap();
        assert_eq!(stored.title, "1.0");
        let fixed: Vec<&str> = stored.sections.fixed.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(fixed, vec!["Crash on save", "Typo"]);
        assert_eq!(repo.count(true).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_invalid_update_writes_nothing() {
        let (repo, _, id) = setup().await;
        let update = ReleaseUpdate {
            title: Some(String::new()),
            published: Some(true),
            ..ReleaseUpdate::default()
        };

        let err = repo.update(id, &update).await.unwrap_err();
        assert!(matches!(
            err,
            ReleaseError::Domain(DomainError::MissingField("title"))
        ));
        assert!(!repo.get(id).await.unwrap().published);
    }

    #[tokio::test]
    async fn test_create_stamps_times_and_validates() {
        let (repo, clock, _) = setup().await;
        clock.set(400);

        let release = repo
            .create(NewRelease {
                title: "Hand written".to_string(),
                label_type: LabelType::Custom,
                version: None,
                release_date: 350,
                date_start: None,
                date_end: None,
                sections: Sections::default(),
                published: true,
                owner: Some(9),
            })
            .await
            .unwrap();

        assert_eq!(release.created, 400);
        assert_eq!(release.changed, 400);
        assert_eq!(release.release_date, 350);
        assert_eq!(release.owner, Some(9));
        assert_eq!(repo.count(false).await.unwrap(), 2);

        let err = repo
            .create(NewRelease {
                title: "  ".to_string(),
                ..release_input()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReleaseError::Domain(DomainError::MissingField("title"))
        ));
        assert_eq!(repo.count(false).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete() {
        let (repo, _, id) = setup().await;
        repo.delete(id).await.unwrap();
        assert!(repo.find(id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(id).await.unwrap_err(),
            ReleaseError::NotFound(_)
        ));
    }
}
