//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, InMemoryAdapter},
    config::{Config, StorageBackend},
    error::ApiError,
    web::{router, state::AppState},
};
use goal_tracker_core::{GoalTracker, UserRecordStore};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Select the Storage Backend ---
    let store: Arc<dyn UserRecordStore> = match &config.storage {
        StorageBackend::Memory => {
            info!("Using in-memory user record storage.");
            Arc::new(InMemoryAdapter::new())
        }
        StorageBackend::Postgres { database_url, max_connections } => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(*max_connections)
                .connect(database_url)
                .await
                .map_err(|e| {
                    error!("Database is unreachable: {}", e);
                    e
                })?;
            let db_adapter = DbAdapter::new(db_pool);
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(db_adapter)
        }
    };

    // --- 3. Build the Tracker & Re-derive the Leaderboard ---
    let tracker = Arc::new(GoalTracker::new(store));
    tracker.warm_leaderboard().await?;

    // --- 4. Build the Shared AppState & Router ---
    let app_state = Arc::new(AppState {
        tracker,
        config: config.clone(),
    });
    let app = router(app_state);

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
