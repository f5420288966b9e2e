//! Structured error responses shared by every HTTP surface.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

/// Standard error response body.
///
/// Returned for all error responses so clients can rely on one shape:
/// - `error`: machine-readable error identifier (e.g. "VALIDATION_ERROR")
/// - `message`: human-readable error message
/// - `details`: optional structured context (e.g. per-field validation errors)
///
/// # JSON Example
///
/// ```json
/// {
///   "error": "VALIDATION_ERROR",
///   "message": "Request validation failed",
///   "details": { "email": [{ "code": "email" }] }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error identifier for programmatic handling
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Optional structured error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Handler for 404 Not Found. Use as the router fallback.
pub async fn not_found() -> Response {
    let body = Json(ErrorResponse::new(
        "NOT_FOUND",
        "The requested resource was not found",
    ));

    (StatusCode::NOT_FOUND, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_serializes_without_empty_details() {
        let body = ErrorResponse::new("NOT_FOUND", "missing");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "NOT_FOUND");
        assert_eq!(json["message"], "missing");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_error_response_with_details() {
        let body = ErrorResponse::new("VALIDATION_ERROR", "bad input")
            .with_details(serde_json::json!({"field": "email"}));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["details"]["field"], "email");
    }
}
