//! Generate Release Handler
//!
//! Handles the admin generate form: picks the window, runs the generator.

use crate::domain::{OperationContext, Release};
use crate::error::AppError;
use crate::release::ReleaseGenerator;

use super::GenerateReleaseCommand;

/// Handler for draft release generation
pub struct GenerateReleaseHandler {
    generator: ReleaseGenerator,
}

impl GenerateReleaseHandler {
    pub fn new(generator: ReleaseGenerator) -> Self {
        Self { generator }
    }

    /// Execute the generate command
    pub async fn execute(
        &self,
        command: GenerateReleaseCommand,
        context: &OperationContext,
    ) -> Result<Release, AppError> {
        // Form validation happens before anything is read
        let window = command.window()?;
        let options = command.options();

        let release = match window {
            Some((start, end)) => {
                self.generator
                    .generate_from_range(start, end, options, context)
                    .await
            }
            None => self.generator.generate_since_last(options, context).await,
        }
        .map_err(|e| {
            tracing::error!(error = %e, mode = ?command.mode, "Failed to generate release");
            AppError::from(e)
        })?;

        Ok(release)
    }
}
