//! services/api/src/web/response.rs
//!
//! JSON envelopes shared by every POST endpoint, and the HTTP error type that
//! renders failures into them.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

/// Body of every successful POST: `{"success": true, "message": ...}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

/// Body of every failed POST. Exactly one of `error` / `errors` is present.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

pub fn success(message: &str) -> (StatusCode, Json<SuccessResponse>) {
    (
        StatusCode::OK,
        Json(SuccessResponse {
            success: true,
            message: message.to_string(),
        }),
    )
}

/// Failure of a single request. Every variant is terminal for the request.
#[derive(Debug)]
pub enum HttpError {
    /// 400 with the batched messages in `errors`.
    Invalid(Vec<String>),
    /// 400 with one message in `error`: missing input, conflicts, bad credentials.
    BadRequest(String),
    /// 500 with the store's own message passed through.
    Store(String),
    /// 500 with a fixed message. The detail is logged, never sent.
    Internal(String),
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, error, errors) = match self {
            Self::Invalid(messages) => (StatusCode::BAD_REQUEST, None, Some(messages)),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, Some(message), None),
            Self::Store(message) => {
                error!("Store error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, Some(message), None)
            }
            Self::Internal(detail) => {
                error!("Internal server error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Some("Internal server error.".to_string()),
                    None,
                )
            }
        };
        let body = ErrorResponse {
            success: false,
            error,
            errors,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: HttpError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn invalid_lists_every_message() {
        let (status, body) =
            render(HttpError::Invalid(vec!["a".to_string(), "b".to_string()])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"success": false, "errors": ["a", "b"]}));
    }

    #[tokio::test]
    async fn store_errors_pass_through_but_internal_ones_do_not() {
        let (status, body) = render(HttpError::Store("disk I/O error".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "disk I/O error");

        let (status, body) = render(HttpError::Internal("secret detail".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error.");
    }
}
