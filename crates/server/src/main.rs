//! CyberSecure Portal gateway entry point.

use std::sync::Arc;

use cybersecure_api::{AppState, app};
use cybersecure_common::{Config, StorageConfig};
use cybersecure_core::{GoTrueClient, assistant};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cybersecure=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting CyberSecure Portal gateway...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = cybersecure_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    cybersecure_db::migrate(&db).await?;
    info!("Migrations completed");

    // Outbound clients
    let http = reqwest::Client::builder()
        .user_agent(format!("cybersecure-portal/{}", env!("CARGO_PKG_VERSION")))
        .build()?;
    let identity = Arc::new(GoTrueClient::new(http.clone(), &config.identity));
    let storage = StorageConfig::from_settings(&config.storage, &config.identity).build(http)?;
    let assistant = assistant::from_config(&config.assistant);

    let state = AppState::new(
        Arc::new(db),
        identity,
        storage,
        assistant,
        &config.server,
        config.upload,
    );
    let router = app(state, &config.server.cors_origin)?;

    // Start server with graceful shutdown
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, cors_origin = %config.server.cors_origin, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
