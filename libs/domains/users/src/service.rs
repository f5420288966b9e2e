use std::sync::Arc;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, ListUsersResponse, PageParams, UpdateUser, User, UserResponse};
use crate::repository::UserRepository;

/// Service layer for User business logic.
///
/// Stateless per call: every method reads and writes exclusively through the
/// repository, applies the cross-entity rules (email uniqueness), and either
/// returns a fully-formed response or raises a typed error. Nothing is
/// retried internally.
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new user.
    ///
    /// The existence pre-check and the insert are not atomic; the store's
    /// unique index is the actual guarantee and [`Self::persist`] folds a
    /// constraint hit back into `DuplicateEmail`.
    pub async fn create_user(&self, input: CreateUser) -> UserResult<UserResponse> {
        let user = User::create(input.name, input.email)?;

        if self.repository.exists_by_email(&user.email).await? {
            return Err(UserError::DuplicateEmail(user.email));
        }

        let created = self.persist(user).await?;
        created.try_into()
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: Uuid) -> UserResult<UserResponse> {
        let user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        user.try_into()
    }

    /// List one page of users with pagination metadata. Always succeeds: a
    /// page past the end is empty while `total` stays the true count.
    pub async fn list_users(&self, page: PageParams) -> UserResult<ListUsersResponse> {
        let page = page.normalized();

        let total = self.repository.count_total().await?;
        let users = self.repository.find_all(page).await?;

        let data = users
            .into_iter()
            .map(UserResponse::try_from)
            .collect::<UserResult<Vec<_>>>()?;

        Ok(ListUsersResponse {
            data,
            page: page.page,
            per_page: page.per_page,
            total,
        })
    }

    /// Update name and/or email of an existing user.
    ///
    /// When the email actually changes (case-insensitively), uniqueness is
    /// re-checked against all other users before the mutation is applied;
    /// re-submitting the current email is a no-op that succeeds.
    pub async fn update_user(&self, id: Uuid, input: UpdateUser) -> UserResult<UserResponse> {
        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        if let Some(email) = input.email {
            let changing = !user.email.eq_ignore_ascii_case(&email);
            if changing && self.repository.exists_by_email(&email).await? {
                return Err(UserError::DuplicateEmail(email));
            }
            user.update_email(email)?;
        }

        if let Some(name) = input.name {
            user.update_name(name)?;
        }

        let updated = self.persist(user).await?;
        updated.try_into()
    }

    /// Soft delete: flag the user inactive. Idempotent, so deactivating an
    /// already-inactive user succeeds.
    pub async fn deactivate_user(&self, id: Uuid) -> UserResult<UserResponse> {
        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        user.deactivate();

        let updated = self.persist(user).await?;
        updated.try_into()
    }

    /// Reverse of [`Self::deactivate_user`]. Idempotent.
    pub async fn activate_user(&self, id: Uuid) -> UserResult<UserResponse> {
        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        user.activate();

        let updated = self.persist(user).await?;
        updated.try_into()
    }

    /// Hard delete: irreversibly remove the record.
    pub async fn delete_user(&self, id: Uuid) -> UserResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(UserError::NotFound(id));
        }

        Ok(())
    }

    /// Save with the race-safety net: a storage duplicate-key failure becomes
    /// `DuplicateEmail` so callers see one kind regardless of which layer
    /// caught the conflict.
    async fn persist(&self, user: User) -> UserResult<User> {
        let email = user.email.clone();

        match self.repository.save(user).await {
            Err(e) if e.is_unique_violation() => Err(UserError::DuplicateEmail(email)),
            other => other,
        }
    }
}
