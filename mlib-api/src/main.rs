//! mlib-api - Music library track service
//!
//! Serves create/read/update/delete over the `tracks` table of a local SQLite
//! file. The store is opened once here, handed to the router, and closed after
//! the server has drained on Ctrl+C or SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use mlib_api::config::{load_dotenv, Config};
use mlib_api::logging::init_tracing;
use mlib_api::{build_router, AppState, ENDPOINTS};
use mlib_common::db::init::{close_database, init_database};

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = load_dotenv();
    init_tracing();

    let config = Config::parse();

    info!("Starting music library API v{}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }
    info!("Database path: {}", config.store.db_storage.display());

    let pool = match init_database(&config.store.db_storage).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Unable to connect to database: {}", e);
            return Err(e).context("Database initialization failed");
        }
    };

    let app = build_router(AppState::new(pool.clone()));

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    log_banner(addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    info!("Shutting down gracefully...");
    close_database(&pool).await;

    served.context("Server error")?;
    info!("Server shutdown complete");
    Ok(())
}

fn log_banner(addr: SocketAddr) {
    info!("================================");
    info!("Music Library API Server");
    info!("Server running on http://localhost:{}", addr.port());
    info!("Health check: http://localhost:{}/health", addr.port());
    info!("API Endpoints:");
    for (method, path, summary) in ENDPOINTS {
        info!("  {:<6} {:<16} - {}", method, path, summary);
    }
    info!("================================");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
