use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{PageParams, User};

/// Repository trait for User persistence.
///
/// Implementations hide the storage engine behind entity-shaped CRUD plus
/// existence/count queries. Contract highlights:
///
/// - `save` is the single write path: it inserts (assigning an id) when the
///   entity was never persisted and updates otherwise.
/// - Queries report absence as `None`, never as an error; `save` on a
///   missing id is the one precondition violation that raises `NotFound`.
/// - Email uniqueness (case-insensitive) is guaranteed at this layer the way
///   a storage engine would: a violation surfaces as a `Database` failure
///   carrying the duplicate-key signature, which the service translates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert (id unassigned) or update (id present) a user; returns the
    /// persisted entity with its id populated.
    async fn save(&self, user: User) -> UserResult<User>;

    /// Get a user by ID
    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Get a user by email, case-insensitively
    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// List one page of users ordered by creation time ascending. Pages past
    /// the end are empty, never an error.
    async fn find_all(&self, page: PageParams) -> UserResult<Vec<User>>;

    /// Remove a user by ID; `false` when nothing was removed
    async fn delete(&self, id: Uuid) -> UserResult<bool>;

    /// Check whether an email is already taken, case-insensitively
    async fn exists_by_email(&self, email: &str) -> UserResult<bool>;

    /// Total user count, unaffected by pagination
    async fn count_total(&self) -> UserResult<u64>;
}

/// In-memory implementation of UserRepository (for development/testing).
///
/// Mirrors the storage-backed semantics, including the duplicate-key failure
/// shape, so service behavior is identical against either implementation.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn duplicate_key(email: &str) -> UserError {
        // Same shape a relational store reports for a unique index hit.
        UserError::Database(format!(
            "duplicate key value violates unique constraint \"idx_users_email_lower\" (email: {})",
            email
        ))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        match user.id {
            None => {
                let email_taken = users
                    .values()
                    .any(|u| u.email.eq_ignore_ascii_case(&user.email));
                if email_taken {
                    return Err(Self::duplicate_key(&user.email));
                }

                let id = Uuid::now_v7();
                let mut user = user;
                user.id = Some(id);
                users.insert(id, user.clone());

                tracing::info!(user_id = %id, email = %user.email, "Created user");
                Ok(user)
            }
            Some(id) => {
                if !users.contains_key(&id) {
                    return Err(UserError::NotFound(id));
                }

                let email_taken = users
                    .values()
                    .any(|u| u.id != user.id && u.email.eq_ignore_ascii_case(&user.email));
                if email_taken {
                    return Err(Self::duplicate_key(&user.email));
                }

                users.insert(id, user.clone());

                tracing::info!(user_id = %id, "Updated user");
                Ok(user)
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        let user = users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned();
        Ok(user)
    }

    async fn find_all(&self, page: PageParams) -> UserResult<Vec<User>> {
        let page = page.normalized();
        let users = self.users.read().await;

        let mut result: Vec<User> = users.values().cloned().collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let result = result
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .collect();

        Ok(result)
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let mut users = self.users.write().await;

        if users.remove(&id).is_some() {
            tracing::info!(user_id = %id, "Deleted user");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn exists_by_email(&self, email: &str) -> UserResult<bool> {
        let users = self.users.read().await;
        let exists = users.values().any(|u| u.email.eq_ignore_ascii_case(email));
        Ok(exists)
    }

    async fn count_total(&self) -> UserResult<u64> {
        let users = self.users.read().await;
        Ok(users.len() as u64)
    }
}
