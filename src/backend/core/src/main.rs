//! Bazaar server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use bazaar_core::{
    api::{self, AppState},
    config::{Config, Environment},
    db::{Database, MemoryStore, Store},
    error::{set_error_mode, ErrorMode},
    middleware::auth::Authenticator,
    observability,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config: {}. Using defaults.", e);
        Config::default()
    });

    set_error_mode(match config.environment {
        Environment::Development => ErrorMode::Development,
        Environment::Production => ErrorMode::Production,
    });

    observability::init(&config.observability)?;
    let metrics = observability::init_metrics()?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Bazaar server");

    let store: Arc<dyn Store> = match &config.database.url {
        Some(url) => {
            let db = Database::new(
                url,
                config.database.max_connections,
                config.database.min_connections,
            )
            .await?;
            db.migrate().await?;
            tracing::info!("Connected to database, migrations applied");
            Arc::new(db)
        }
        None => {
            tracing::warn!("No database URL configured; using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let auth = Arc::new(Authenticator::new(&config.auth));
    let app = api::build_router(AppState::new(store, auth, Some(metrics)));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!(address = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
