//! Update Release Handler
//!
//! Handles release edits, publishing and deletion.

use crate::domain::{OperationContext, Release};
use crate::error::AppError;
use crate::release::ReleaseRepository;

use super::UpdateReleaseCommand;

/// Handler for release edits
pub struct UpdateReleaseHandler {
    releases: ReleaseRepository,
}

impl UpdateReleaseHandler {
    pub fn new(releases: ReleaseRepository) -> Self {
        Self { releases }
    }

    /// Execute the update command
    pub async fn execute(
        &self,
        command: UpdateReleaseCommand,
        context: &OperationContext,
    ) -> Result<Release, AppError> {
        let release = self
            .releases
            .update(command.release_id, &command.update)
            .await?;

        tracing::debug!(
            release_id = release.id,
            user_id = ?context.user_id,
            correlation_id = ?context.correlation_id,
            "Release updated"
        );

        Ok(release)
    }

    /// Delete a release
    pub async fn delete(&self, release_id: i64, context: &OperationContext) -> Result<(), AppError> {
        self.releases.delete(release_id).await?;

        tracing::debug!(
            release_id,
            user_id = ?context.user_id,
            correlation_id = ?context.correlation_id,
            "Release removed"
        );

        Ok(())
    }
}
