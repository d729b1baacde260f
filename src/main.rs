//! # Cafeteria Orders Service
//!
//! Public catalog, order placement and history, and the dashboard statistics
//! endpoint for a cafeteria.
//!
//! ## Lifecycle
//!
//! - Configuration is read once from the environment (`.env` supported)
//! - The PostgreSQL pool is opened at start-up and migrations are applied
//! - Axum serves until Ctrl-C or SIGTERM, drains in-flight requests, then the
//!   pool is closed

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use cafeteria_orders::config::AppConfig;
use cafeteria_orders::store::{PgStore, SharedStore};
use cafeteria_orders::{create_app, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cafeteria_orders=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting cafeteria orders service");

    let config = AppConfig::from_env()?;

    let pool = db::connect(&config).await?;
    info!("Connected to application database");

    db::migrate(&pool).await?;
    info!("Application migrations complete");

    let store: SharedStore = Arc::new(PgStore::new(pool.clone()));
    let app = create_app(store);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped, closing database pool");
    pool.close().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    info!("Shutdown signal received");
}
