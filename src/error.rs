use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Unified error type for chart hub API responses.
#[derive(Debug)]
pub enum HubError {
    /// The record store could not be reached at all.
    Connect(String),
    Db(String),
    BadRequest(String),
    Internal(String),
}

impl std::fmt::Display for HubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connect(msg) => write!(f, "connect_error: {msg}"),
            Self::Db(msg) => write!(f, "db_error: {msg}"),
            Self::BadRequest(msg) => write!(f, "bad_request: {msg}"),
            Self::Internal(msg) => write!(f, "internal_error: {msg}"),
        }
    }
}

impl std::error::Error for HubError {}

impl IntoResponse for HubError {
    fn into_response(self) -> Response {
        let (status, error_str, message) = match self {
            Self::Connect(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "database connection failed",
                msg,
            ),
            Self::Db(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "database error", msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad request", msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal server error", msg),
        };

        let body = json!({
            "success": false,
            "error": error_str,
            "message": message,
        });
        (status, axum::Json(body)).into_response()
    }
}

impl From<rusqlite::Error> for HubError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Db(e.to_string())
    }
}

impl From<r2d2::Error> for HubError {
    fn from(e: r2d2::Error) -> Self {
        Self::Db(e.to_string())
    }
}

impl From<tokio::task::JoinError> for HubError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn connect_error_is_500_with_success_false() {
        let resp = HubError::Connect("no such file".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "database connection failed");
        assert_eq!(body["message"], "no such file");
    }

    #[tokio::test]
    async fn bad_request_maps_to_400() {
        let resp = HubError::BadRequest("unknown payload format: xml".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = body_json(resp).await;
        assert_eq!(body["message"], "unknown payload format: xml");
    }
}
