//! UUID path parameter extractor with automatic validation.

use crate::errors::ErrorResponse;
use axum::{
    Json,
    extract::{FromRequestParts, Path},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

/// Extractor for UUID path parameters.
///
/// Parses the single path parameter as a UUID, returning a structured 400
/// response instead of axum's plain-text rejection when it is malformed.
///
/// # Example
/// ```ignore
/// use axum_helpers::UuidPath;
///
/// async fn get_user(UuidPath(id): UuidPath) -> String {
///     format!("User ID: {}", id)
/// }
/// ```
pub struct UuidPath(pub Uuid);

impl<S> FromRequestParts<S> for UuidPath
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| e.into_response())?;

        match Uuid::parse_str(&id) {
            Ok(uuid) => Ok(UuidPath(uuid)),
            Err(_) => {
                let body = ErrorResponse::new("INVALID_UUID", format!("Invalid UUID: {}", id));
                Err((StatusCode::BAD_REQUEST, Json(body)).into_response())
            }
        }
    }
}
