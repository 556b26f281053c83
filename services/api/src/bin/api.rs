//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, PngChartAdapter},
    config::Config,
    error::ApiError,
    web::{build_router, state::AppState},
};
use chrono::Utc;
use habit_tracker_core::ports::DatabaseService;
use std::sync::Arc;
use tracing::info;
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

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_adapter = Arc::new(
        DbAdapter::connect(&config.database_url, config.db_max_connections).await?,
    );
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    let purged = db_adapter.delete_expired_auth_sessions(Utc::now()).await?;
    if purged > 0 {
        info!("Purged {} expired sessions.", purged);
    }

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        db: db_adapter,
        chart_renderer: Arc::new(PngChartAdapter::new()),
        config: config.clone(),
    });

    // --- 4. Create the Web Router ---
    let app = build_router(app_state);

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
