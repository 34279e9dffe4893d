mod chart;
mod config;
mod db;
mod error;
mod instruments;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use config::HubConfig;
use db::records::count_records;
use instruments::INSTRUMENTS;
use state::AppState;

#[tokio::main]
async fn main() {
    // Initialise tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = match HubConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let addr: SocketAddr = match format!("{}:{}", cfg.bind, cfg.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!("Invalid bind address {}:{}: {e}", cfg.bind, cfg.port);
            std::process::exit(1);
        }
    };

    let state = AppState::new(cfg);
    warm_up(Arc::clone(&state)).await;

    let app = routes::app(Arc::clone(&state));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!("Chart hub listening on http://{addr}");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {e}");
    }

    if let Some(pool) = state.db.connected() {
        let s = pool.state();
        tracing::info!(
            "Releasing database pool ({} connections, {} idle)",
            s.connections,
            s.idle_connections
        );
    }
}

/// Connect eagerly and log per-instrument record counts. Failure is not
/// fatal: the first chart request retries the connection.
async fn warm_up(state: Arc<AppState>) {
    let pool = match state.db.pool().await {
        Ok(pool) => pool.clone(),
        Err(e) => {
            tracing::warn!("Database not reachable at startup: {e}");
            return;
        }
    };

    let counted = tokio::task::spawn_blocking(move || {
        let conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!("No connection for startup check: {e}");
                return;
            }
        };
        for inst in INSTRUMENTS {
            match count_records(&conn, inst.collection) {
                Ok(n) => tracing::info!("{}: {n} records", inst.name),
                Err(e) => tracing::warn!("{}: collection {:?} unavailable: {e}", inst.name, inst.collection),
            }
        }
    })
    .await;

    if let Err(e) = counted {
        tracing::warn!("Startup record count failed: {e}");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
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
    tracing::info!("Shutdown signal received, gracefully stopping…");
}
