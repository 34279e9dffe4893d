use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::chart::collect;
use crate::chart::payload::{build_payload, PayloadFormat};
use crate::db::records::{RecordSource, SqliteSource};
use crate::error::HubError;
use crate::instruments::INSTRUMENTS;
use crate::state::AppState;

const SOURCE: &str = "SQLite";

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    /// `legacy` or `chart`; the configured default applies when absent.
    #[serde(default)]
    format: Option<String>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/chart-data", get(api_chart_data))
}

/// GET /api/chart-data — Normalized series for every configured instrument.
async fn api_chart_data(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ChartQuery>,
) -> Result<Json<Value>, HubError> {
    let format = match q.format.as_deref() {
        Some(f) => f.parse::<PayloadFormat>().map_err(HubError::BadRequest)?,
        None => state.config.chart_format,
    };

    let pool = match state.db.pool().await {
        Ok(pool) => pool.clone(),
        Err(e) => {
            tracing::error!("Chart data: database unavailable: {e}");
            return Err(e);
        }
    };
    let source: Arc<dyn RecordSource> = Arc::new(SqliteSource::new(pool));

    let collected = collect(source, INSTRUMENTS, state.config.query_timeout).await;
    let payload = build_payload(collected.series).with_instruments(collected.reports);

    tracing::info!(
        "Chart data: {} series, {} points",
        payload.series_count,
        payload.total_points
    );
    Ok(Json(format.render(&payload, SOURCE)))
}
