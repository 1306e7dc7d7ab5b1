//! Changelog Service
//!
//! Records platform changes as events and turns them into releases for a
//! public changelog.

use std::net::SocketAddr;

use changelog_service::api::{self, AppState};
use changelog_service::clock::system_clock;
use changelog_service::event_store::EventStore;
use changelog_service::jobs::{JobScheduler, JobSchedulerConfig};
use changelog_service::store::StorageBackend;
use changelog_service::{db, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging
fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "changelog_service=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// PostgreSQL when configured, otherwise the in-memory store
async fn open_backend(config: &Config) -> anyhow::Result<StorageBackend> {
    let Some(ref database_url) = config.database_url else {
        tracing::warn!("DATABASE_URL not set, using in-memory storage (data is not persisted)");
        return Ok(StorageBackend::in_memory());
    };

    tracing::info!("Connecting to database...");
    let pool = db::connect(database_url, config.database_max_connections).await?;
    db::verify_connection(&pool).await?;

    if !db::check_schema(&pool).await? {
        tracing::error!("Database schema is not complete. Please run migrations.");
        anyhow::bail!("Database schema incomplete");
    }

    tracing::info!("Database connected successfully");
    Ok(StorageBackend::postgres(pool))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(config.log_json);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!(
        environment = %config.environment,
        production = config.is_production(),
        changelog_path = %config.settings.changelog_path,
        "Starting changelog service"
    );

    let backend = open_backend(&config).await?;
    let clock = system_clock();

    let scheduler = JobScheduler::with_config(
        EventStore::new(backend.clone(), clock.clone()),
        JobSchedulerConfig {
            retention_sweep_interval: config.retention_sweep_interval,
            event_retention_days: config.settings.event_retention_days,
        },
    );
    let jobs = scheduler.start();

    let state = AppState::new(backend.clone(), clock, config.settings.clone());
    let app = api::build_router(state);

    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Cleanup
    tracing::info!("Server shutting down...");
    jobs.abort();
    if let Some(pool) = backend.pool() {
        pool.close().await;
        tracing::info!("Database connections closed");
    }
    tracing::info!("Goodbye!");

    Ok(())
}

/// Shutdown signal handler for graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
