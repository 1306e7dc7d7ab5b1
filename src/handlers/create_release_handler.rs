//! Create Release Handler
//!
//! Handles manually written releases from the admin add form.

use crate::domain::{OperationContext, Release};
use crate::error::AppError;
use crate::release::ReleaseRepository;

use super::CreateReleaseCommand;

/// Handler for manual release creation
pub struct CreateReleaseHandler {
    releases: ReleaseRepository,
}

impl CreateReleaseHandler {
    pub fn new(releases: ReleaseRepository) -> Self {
        Self { releases }
    }

    /// Execute the create command; the acting user owns the release
    pub async fn execute(
        &self,
        command: CreateReleaseCommand,
        context: &OperationContext,
    ) -> Result<Release, AppError> {
        let new_release = command.into_new_release(self.releases.now(), context.user_id)?;
        let release = self.releases.create(new_release).await?;

        tracing::debug!(
            release_id = release.id,
            user_id = ?context.user_id,
            correlation_id = ?context.correlation_id,
            "Release written by hand"
        );

        Ok(release)
    }
}
