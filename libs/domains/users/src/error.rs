use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value, json};
use thiserror::Error;
use uuid::Uuid;

/// Stable classification tag carried by every [`UserError`].
///
/// Kinds form a two-level hierarchy: each concrete kind rolls up to a
/// category (`InvalidEmailFormat` -> `Validation`, `Database` ->
/// `Infrastructure`, ...). Transport status codes are a pure lookup on the
/// kind, so error handling outside this crate never matches on error
/// internals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // Categories
    Validation,
    NotFound,
    Duplicate,
    BusinessLogic,
    Infrastructure,

    // Concrete kinds
    InvalidUserData,
    InvalidEmailFormat,
    UserNotFound,
    DuplicateEmail,
    InvalidUserOperation,
    Database,
}

impl ErrorKind {
    /// Machine-readable tag, used as the `type` field of error bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION",
            Self::NotFound => "NOT_FOUND",
            Self::Duplicate => "DUPLICATE",
            Self::BusinessLogic => "BUSINESS_LOGIC",
            Self::Infrastructure => "INFRASTRUCTURE",
            Self::InvalidUserData => "INVALID_USER_DATA",
            Self::InvalidEmailFormat => "INVALID_EMAIL_FORMAT",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::DuplicateEmail => "DUPLICATE_EMAIL",
            Self::InvalidUserOperation => "INVALID_USER_OPERATION",
            Self::Database => "DATABASE",
        }
    }

    /// The category a concrete kind belongs to; `None` for categories.
    pub fn parent(&self) -> Option<ErrorKind> {
        match self {
            Self::InvalidUserData | Self::InvalidEmailFormat => Some(Self::Validation),
            Self::UserNotFound => Some(Self::NotFound),
            Self::DuplicateEmail => Some(Self::Duplicate),
            Self::InvalidUserOperation => Some(Self::BusinessLogic),
            Self::Database => Some(Self::Infrastructure),
            Self::Validation
            | Self::NotFound
            | Self::Duplicate
            | Self::BusinessLogic
            | Self::Infrastructure => None,
        }
    }

    /// Whether this kind is `ancestor` or rolls up to it.
    pub fn is_within(&self, ancestor: ErrorKind) -> bool {
        let mut current = Some(*self);
        while let Some(kind) = current {
            if kind == ancestor {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    /// Transport status for this kind. A pure lookup; categories and their
    /// members always agree.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation | Self::InvalidUserData | Self::InvalidEmailFormat => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound | Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::Duplicate | Self::DuplicateEmail => StatusCode::CONFLICT,
            Self::BusinessLogic | Self::InvalidUserOperation => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Infrastructure | Self::Database => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Closed set of failures the users domain can surface.
///
/// Every failure crossing a layer boundary (repository -> service -> caller)
/// is one of these. Opaque storage errors are wrapped into `Database` with
/// the original cause preserved.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("Invalid user data: {0}")]
    InvalidUserData(String),

    #[error("Invalid email format: '{0}'")]
    InvalidEmailFormat(String),

    #[error("User not found: {0}")]
    NotFound(Uuid),

    #[error("User with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Invalid user operation: {0}")]
    InvalidOperation(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    /// The concrete kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUserData(_) => ErrorKind::InvalidUserData,
            Self::InvalidEmailFormat(_) => ErrorKind::InvalidEmailFormat,
            Self::NotFound(_) => ErrorKind::UserNotFound,
            Self::DuplicateEmail(_) => ErrorKind::DuplicateEmail,
            Self::InvalidOperation(_) => ErrorKind::InvalidUserOperation,
            Self::Database(_) => ErrorKind::Database,
        }
    }

    /// Structured context for the error body, keyed per kind.
    pub fn details(&self) -> Map<String, Value> {
        let mut details = Map::new();
        match self {
            Self::NotFound(id) => {
                details.insert("user_id".to_string(), json!(id));
            }
            Self::DuplicateEmail(email) | Self::InvalidEmailFormat(email) => {
                details.insert("email".to_string(), json!(email));
            }
            Self::Database(cause) => {
                details.insert("cause".to_string(), json!(cause));
            }
            Self::InvalidUserData(_) | Self::InvalidOperation(_) => {}
        }
        details
    }

    /// Whether this is a storage failure carrying a duplicate-key signature.
    ///
    /// The service's existence pre-check is not atomic with the insert; the
    /// store's unique index is the real guarantee and surfaces here.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Database(cause) => {
                cause.contains("duplicate key") || cause.contains("unique constraint")
            }
            _ => false,
        }
    }
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = kind.status();

        if status.is_server_error() {
            tracing::error!(kind = kind.as_str(), "{}", self);
        } else {
            tracing::info!(kind = kind.as_str(), "{}", self);
        }

        let body = json!({
            "error": {
                "type": kind.as_str(),
                "message": self.to_string(),
                "details": self.details(),
            }
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_lookup_per_kind() {
        assert_eq!(ErrorKind::InvalidUserData.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorKind::InvalidEmailFormat.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ErrorKind::UserNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorKind::DuplicateEmail.status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorKind::InvalidUserOperation.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorKind::Database.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_concrete_kinds_roll_up_to_categories() {
        assert_eq!(
            ErrorKind::InvalidEmailFormat.parent(),
            Some(ErrorKind::Validation)
        );
        assert_eq!(ErrorKind::UserNotFound.parent(), Some(ErrorKind::NotFound));
        assert_eq!(
            ErrorKind::DuplicateEmail.parent(),
            Some(ErrorKind::Duplicate)
        );
        assert_eq!(
            ErrorKind::Database.parent(),
            Some(ErrorKind::Infrastructure)
        );
        assert_eq!(ErrorKind::Validation.parent(), None);
    }

    #[test]
    fn test_is_within_walks_the_chain() {
        assert!(ErrorKind::DuplicateEmail.is_within(ErrorKind::Duplicate));
        assert!(ErrorKind::DuplicateEmail.is_within(ErrorKind::DuplicateEmail));
        assert!(!ErrorKind::DuplicateEmail.is_within(ErrorKind::Validation));
        assert!(ErrorKind::InvalidUserData.is_within(ErrorKind::Validation));
    }

    #[test]
    fn test_category_status_agrees_with_members() {
        for kind in [
            ErrorKind::InvalidUserData,
            ErrorKind::InvalidEmailFormat,
            ErrorKind::UserNotFound,
            ErrorKind::DuplicateEmail,
            ErrorKind::InvalidUserOperation,
            ErrorKind::Database,
        ] {
            let parent = kind.parent().expect("concrete kinds have a category");
            assert_eq!(kind.status(), parent.status(), "{} vs {}", kind, parent);
        }
    }

    #[test]
    fn test_not_found_details_carry_the_id() {
        let id = Uuid::now_v7();
        let err = UserError::NotFound(id);
        assert_eq!(err.kind(), ErrorKind::UserNotFound);
        assert_eq!(err.details()["user_id"], json!(id));
    }

    #[test]
    fn test_duplicate_email_details_carry_the_email() {
        let err = UserError::DuplicateEmail("ana@x.com".to_string());
        assert_eq!(err.details()["email"], json!("ana@x.com"));
    }

    #[test]
    fn test_database_wraps_cause() {
        let err = UserError::Database("connection reset".to_string());
        assert_eq!(err.kind(), ErrorKind::Database);
        assert_eq!(err.details()["cause"], json!("connection reset"));
        assert!(!err.is_unique_violation());
    }

    #[test]
    fn test_unique_violation_signatures() {
        let err = UserError::Database(
            "duplicate key value violates unique constraint \"idx_users_email_lower\"".to_string(),
        );
        assert!(err.is_unique_violation());

        assert!(!UserError::DuplicateEmail("a@b.co".to_string()).is_unique_violation());
    }
}
