//! Scheduled Jobs
//!
//! Background jobs for periodic maintenance tasks.
//! Currently only the event retention sweep.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::interval;

use crate::event_store::{EventStore, EventStoreError};

const SECONDS_PER_DAY: i64 = 86_400;

// =========================================================================
// Event Retention Sweep
// =========================================================================

/// Cutoff for a retention period; `None` when retention is disabled
pub fn retention_cutoff(now: i64, retention_days: u32) -> Option<i64> {
    if retention_days == 0 {
        return None;
    }
    Some(now - i64::from(retention_days) * SECONDS_PER_DAY)
}

/// Delete events older than the retention period.
/// A retention of 0 days keeps everything.
pub async fn purge_expired_events(
    event_store: &EventStore,
    retention_days: u32,
) -> Result<u64, JobError> {
    let Some(cutoff) = retention_cutoff(event_store.now(), retention_days) else {
        return Ok(0);
    };

    let rows_deleted = event_store.purge_older_than(cutoff).await?;
    Ok(rows_deleted)
}

// =========================================================================
// Job Scheduler
// =========================================================================

/// Configuration for job scheduler
#[derive(Debug, Clone)]
pub struct JobSchedulerConfig {
    /// Interval for the retention sweep (default: 1 hour)
    pub retention_sweep_interval: Duration,
    /// Retention period in days, 0 disables the sweep
    pub event_retention_days: u32,
}

impl Default for JobSchedulerConfig {
    fn default() -> Self {
        Self {
            retention_sweep_interval: Duration::from_secs(3600),
            event_retention_days: 365,
        }
    }
}

/// Job Scheduler - runs periodic maintenance tasks
pub struct JobScheduler {
    event_store: EventStore,
    config: JobSchedulerConfig,
}

impl JobScheduler {
    /// Create a new job scheduler
    pub fn new(event_store: EventStore) -> Self {
        Self {
            event_store,
            config: JobSchedulerConfig::default(),
        }
    }

    /// Create with custom configuration
    pub fn with_config(event_store: EventStore, config: JobSchedulerConfig) -> Self {
        Self {
            event_store,
            config,
        }
    }

    /// Start the job scheduler in the background
    /// Returns a handle that can be used to abort the scheduler
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// Run the scheduler loop
    async fn run(&self) {
        tracing::info!(
            retention_days = self.config.event_retention_days,
            interval_secs = self.config.retention_sweep_interval.as_secs(),
            "Job scheduler started"
        );

        let mut retention_interval = interval(self.config.retention_sweep_interval);

        loop {
            retention_interval.tick().await;
            if let Err(e) =
                purge_expired_events(&self.event_store, self.config.event_retention_days).await
            {
                tracing::error!(error = %e, "Event retention sweep failed");
            }
        }
    }

    /// Run all maintenance jobs once (for manual trigger or testing)
    pub async fn run_all_once(&self) -> MaintenanceReport {
        let mut report = MaintenanceReport::default();

        match purge_expired_events(&self.event_store, self.config.event_retention_days).await {
            Ok(count) => report.events_purged = count,
            Err(e) => report.errors.push(format!("Event retention: {}", e)),
        }

        report.completed_at = Utc::now();
        report
    }
}

/// Report from running maintenance jobs
#[derive(Debug, Clone, Default)]
pub struct MaintenanceReport {
    pub events_purged: u64,
    pub errors: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

/// Job execution errors
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),
}

// =========================================================================
// Tests
// =========================================================================
