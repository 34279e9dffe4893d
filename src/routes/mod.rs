pub mod chart;
pub mod system;

use axum::http::{header, HeaderName, Method};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};

use crate::error::HubError;
use crate::state::AppState;

/// Paths listed by the root descriptor and the 404 fallback.
pub const ENDPOINTS: &[&str] = &["/", "/api/chart-data", "/api/health"];

/// Assemble the API router.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(system::routes())
        .merge(chart::routes())
}

/// Full application: API routes, 404 fallback, panic boundary and CORS.
pub fn app(state: Arc<AppState>) -> Router {
    api_router()
        .fallback(system::not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors_layer())
        .with_state(state)
}

/// Any origin, no credentials.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    tracing::error!("Unhandled panic while serving request: {message}");
    HubError::Internal(message).into_response()
}
