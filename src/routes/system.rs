use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use std::sync::Arc;

use super::ENDPOINTS;
use crate::db::records::count_collections;
use crate::error::HubError;
use crate::state::AppState;

const SERVER_NAME: &str = "Chart Hub API";

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Build system sub-router.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(api_health))
}

/// GET / — Service descriptor.
async fn root() -> Json<Value> {
    Json(json!({
        "message": "Instrument price chart API",
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "status": "online",
        "endpoints": {
            "chartData": "/api/chart-data",
            "health": "/api/health",
        },
        "database": "SQLite",
    }))
}

/// GET /api/health — Server and database status. Does not connect.
async fn api_health(State(state): State<Arc<AppState>>) -> Result<Json<Value>, HubError> {
    let (status, collections) = match state.db.connected() {
        Some(pool) => {
            let pool = pool.clone();
            let count = tokio::task::spawn_blocking(move || -> Result<i64, HubError> {
                let conn = pool.get()?;
                count_collections(&conn)
            })
            .await??;
            ("connected", count)
        }
        None => ("disconnected", 0),
    };

    Ok(Json(json!({
        "success": true,
        "timestamp": now_iso(),
        "server": SERVER_NAME,
        "database": {
            "status": status,
            "name": state.db.name(),
            "collectionCount": collections,
            "cluster": state.db.location(),
            "connectAttempts": state.db.connect_attempts(),
        },
        "environment": state.config.environment,
    })))
}

/// Fallback for unmatched routes.
pub async fn not_found(uri: Uri) -> (StatusCode, Json<Value>) {
    tracing::debug!("No route for {uri}");
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "endpoint not found",
            "path": uri.path(),
            "availableEndpoints": ENDPOINTS,
        })),
    )
}
