use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidateEmail};

use crate::error::{UserError, UserResult};

/// Longest accepted display name.
pub const MAX_NAME_LENGTH: usize = 100;

/// User entity.
///
/// Pure domain state plus invariant-enforcing behavior; persistence is the
/// repository's job. `id` stays `None` until the repository assigns one on
/// first save and is immutable afterwards.
///
/// Invariants:
/// - `name` is never empty or whitespace-only
/// - `email` always passes address-format validation (uniqueness is a
///   cross-entity concern owned by the service)
/// - `updated_at >= created_at`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier; `None` means never persisted
    pub id: Option<Uuid>,
    /// Display name
    pub name: String,
    /// Email address (unique case-insensitively across the store)
    pub email: String,
    /// Account active flag; deactivation is the soft-delete path
    pub is_active: bool,
    /// Creation timestamp, set once
    pub created_at: DateTime<Utc>,
    /// Refreshed by every mutating operation
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new, not-yet-persisted user.
    pub fn create(name: String, email: String) -> UserResult<Self> {
        validate_name(&name)?;
        validate_email(&email)?;

        let now = Utc::now();
        Ok(Self {
            id: None,
            name,
            email,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether this entity has been through the repository.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Mark the user active. Idempotent.
    pub fn activate(&mut self) {
        self.is_active = true;
        self.touch();
    }

    /// Mark the user inactive. Idempotent.
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.touch();
    }

    /// Replace the display name, rejecting empty or whitespace-only values.
    pub fn update_name(&mut self, name: String) -> UserResult<()> {
        validate_name(&name)?;
        self.name = name;
        self.touch();
        Ok(())
    }

    /// Replace the email, re-validating the format only. Uniqueness against
    /// other users is checked by the service before this is applied.
    pub fn update_email(&mut self, email: String) -> UserResult<()> {
        validate_email(&email)?;
        self.email = email;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn validate_name(name: &str) -> UserResult<()> {
    if name.trim().is_empty() {
        return Err(UserError::InvalidUserData(
            "name must not be empty".to_string(),
        ));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(UserError::InvalidUserData(format!(
            "name cannot exceed {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> UserResult<()> {
    if !email.validate_email() {
        return Err(UserError::InvalidEmailFormat(email.to_string()));
    }
    Ok(())
}

/// DTO for creating a new user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email, length(max = 255))]
    pub email: String,
}

/// DTO for updating an existing user; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
}

/// User response DTO: the wire projection of a persisted user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<User> for UserResponse {
    type Error = UserError;

    fn try_from(user: User) -> UserResult<Self> {
        let id = user.id.ok_or_else(|| {
            UserError::InvalidOperation("cannot build a response for an unpersisted user".to_string())
        })?;

        Ok(Self {
            id,
            name: user.name,
            email: user.email,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }
}

/// Page of users plus pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListUsersResponse {
    pub data: Vec<UserResponse>,
    pub page: u64,
    pub per_page: u64,
    /// Total record count, unaffected by pagination
    pub total: u64,
}

/// Pagination query parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema, IntoParams)]
pub struct PageParams {
    /// 1-indexed page number
    #[serde(default = "default_page")]
    pub page: u64,
    /// Page size, capped at [`PageParams::MAX_PER_PAGE`]
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

impl PageParams {
    pub const MAX_PER_PAGE: u64 = 100;

    /// Clamp to valid bounds: `page >= 1`, `1 <= per_page <= 100`.
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, Self::MAX_PER_PAGE),
        }
    }

    /// Row offset of the first item on this page.
    pub fn offset(self) -> u64 {
        self.page.saturating_sub(1) * self.per_page
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_create_sets_invariants() {
        let user = User::create("Ana".to_string(), "ana@x.com".to_string()).unwrap();

        assert_eq!(user.id, None);
        assert!(!user.is_persisted());
        assert!(user.is_active);
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_create_rejects_empty_name() {
        let result = User::create("".to_string(), "ana@x.com".to_string());
        assert!(matches!(result, Err(UserError::InvalidUserData(_))));
    }

    #[test]
    fn test_create_rejects_whitespace_name() {
        let result = User::create("   \t".to_string(), "ana@x.com".to_string());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidUserData);
    }

    #[test]
    fn test_create_rejects_overlong_name() {
        let result = User::create("a".repeat(MAX_NAME_LENGTH + 1), "ana@x.com".to_string());
        assert!(matches!(result, Err(UserError::InvalidUserData(_))));
    }

    #[test]
    fn test_create_rejects_bad_email() {
        for email in ["", "not-an-email", "missing@", "@missing.local"] {
            let result = User::create("Ana".to_string(), email.to_string());
            assert!(
                matches!(result, Err(UserError::InvalidEmailFormat(_))),
                "expected format rejection for {:?}",
                email
            );
        }
    }

    #[test]
    fn test_deactivate_then_activate_is_idempotent() {
        let mut user = User::create("Ana".to_string(), "ana@x.com".to_string()).unwrap();

        user.deactivate();
        assert!(!user.is_active);
        user.deactivate();
        assert!(!user.is_active);

        user.activate();
        assert!(user.is_active);
        user.activate();
        assert!(user.is_active);
    }

    #[test]
    fn test_mutations_touch_updated_at() {
        let mut user = User::create("Ana".to_string(), "ana@x.com".to_string()).unwrap();
        let created_at = user.created_at;

        user.deactivate();
        assert!(user.updated_at >= created_at);
        assert_eq!(user.created_at, created_at);

        user.update_name("Ana Maria".to_string()).unwrap();
        assert!(user.updated_at >= created_at);
    }

    #[test]
    fn test_update_email_rejects_bad_format_and_keeps_old_value() {
        let mut user = User::create("Ana".to_string(), "ana@x.com".to_string()).unwrap();

        let result = user.update_email("nope".to_string());
        assert!(matches!(result, Err(UserError::InvalidEmailFormat(_))));
        assert_eq!(user.email, "ana@x.com");
    }

    #[test]
    fn test_response_roundtrip_preserves_fields() {
        let mut user = User::create("Ana".to_string(), "ana@x.com".to_string()).unwrap();
        user.id = Some(Uuid::now_v7());

        let response = UserResponse::try_from(user.clone()).unwrap();
        assert_eq!(Some(response.id), user.id);
        assert_eq!(response.name, user.name);
        assert_eq!(response.email, user.email);
        assert_eq!(response.is_active, user.is_active);
        assert_eq!(response.created_at, user.created_at);
        assert_eq!(response.updated_at, user.updated_at);
    }

    #[test]
    fn test_unpersisted_user_has_no_response() {
        let user = User::create("Ana".to_string(), "ana@x.com".to_string()).unwrap();
        let result = UserResponse::try_from(user);
        assert!(matches!(result, Err(UserError::InvalidOperation(_))));
    }

    #[test]
    fn test_page_params_normalization() {
        let page = PageParams { page: 0, per_page: 0 }.normalized();
        assert_eq!(page, PageParams { page: 1, per_page: 1 });

        let page = PageParams { page: 3, per_page: 500 }.normalized();
        assert_eq!(page.per_page, PageParams::MAX_PER_PAGE);
        assert_eq!(page.page, 3);
    }

    #[test]
    fn test_page_params_offset() {
        assert_eq!(PageParams { page: 1, per_page: 20 }.offset(), 0);
        assert_eq!(PageParams { page: 3, per_page: 20 }.offset(), 40);
        assert_eq!(PageParams { page: 0, per_page: 20 }.offset(), 0);
    }

    #[test]
    fn test_page_params_query_defaults() {
        let params: PageParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params, PageParams::default());
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 20);
    }
}
