use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use juris_events::{EventBus, EventPersistence};
use juris_import::{ImportConfig, ImportScheduler};
use juris_worker::shutdown_signal;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "juris_worker=debug,juris_import=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ImportConfig::from_env();
    tracing::info!(
        workers = config.worker_count,
        staging_dir = %config.staging_dir.display(),
        "Loaded import configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = juris_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    juris_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    juris_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    // Spawn event persistence (writes all events to the database and
    // creates initiator notifications).
    let persistence_handle = tokio::spawn(EventPersistence::run(
        pool.clone(),
        event_bus.subscribe(),
    ));
    tracing::info!("Event persistence started");

    // --- Import workers ---
    let cancel = tokio_util::sync::CancellationToken::new();
    let scheduler = ImportScheduler::new(pool.clone(), Arc::clone(&event_bus), config);
    let worker_handles = scheduler.spawn_workers(&cancel);
    tracing::info!(count = worker_handles.len(), "Import workers started");

    // --- Shutdown ---
    shutdown_signal().await;

    cancel.cancel();
    for handle in worker_handles {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }
    tracing::info!("Import workers stopped");

    // Drop every bus handle to close the broadcast channel.
    // This signals persistence to shut down.
    drop(scheduler);
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), persistence_handle).await;
    tracing::info!("Event services shut down");

    tracing::info!("Graceful shutdown complete");
}
