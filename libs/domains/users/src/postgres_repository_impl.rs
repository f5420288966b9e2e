use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DbBackend, FromQueryResult, Statement, TransactionTrait};
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{PageParams, User};
use crate::repository::UserRepository;

/// PostgreSQL implementation of UserRepository using SeaORM.
///
/// Uniqueness is backed by the unique index on `lower(email)`; violations
/// come back as `Database` errors carrying the driver's duplicate-key
/// message, which the service layer translates.
#[derive(Clone)]
pub struct PostgresUserRepository {
    db: sea_orm::DatabaseConnection,
}

impl PostgresUserRepository {
    pub fn new(db: sea_orm::DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Helper struct for deserializing user rows from the database
#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: Some(row.id),
            name: row.name,
            email: row.email,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn save(&self, user: User) -> UserResult<User> {
        // Scoped unit of work: the transaction rolls back on drop if any step
        // fails, so the connection is always released cleanly.
        let txn = self.db.begin().await?;

        let row = match user.id {
            None => {
                let sql = r#"
                    INSERT INTO users (id, name, email, is_active, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    RETURNING *
                "#;

                let stmt = Statement::from_sql_and_values(
                    DbBackend::Postgres,
                    sql,
                    [
                        Uuid::now_v7().into(),
                        user.name.clone().into(),
                        user.email.clone().into(),
                        user.is_active.into(),
                        user.created_at.into(),
                        user.updated_at.into(),
                    ],
                );

                UserRow::find_by_statement(stmt)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| UserError::Database("insert returned no row".to_string()))?
            }
            Some(id) => {
                let sql = r#"
                    UPDATE users
                    SET name = $2, email = $3, is_active = $4, updated_at = $5
                    WHERE id = $1
                    RETURNING *
                "#;

                let stmt = Statement::from_sql_and_values(
                    DbBackend::Postgres,
                    sql,
                    [
                        id.into(),
                        user.name.clone().into(),
                        user.email.clone().into(),
                        user.is_active.into(),
                        user.updated_at.into(),
                    ],
                );

                UserRow::find_by_statement(stmt)
                    .one(&txn)
                    .await?
                    .ok_or(UserError::NotFound(id))?
            }
        };

        txn.commit().await?;

        tracing::info!(user_id = %row.id, "Saved user");
        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let sql = "SELECT * FROM users WHERE id = $1";

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);

        let row = UserRow::find_by_statement(stmt).one(&self.db).await?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let sql = "SELECT * FROM users WHERE lower(email) = lower($1)";

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [email.into()]);

        let row = UserRow::find_by_statement(stmt).one(&self.db).await?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_all(&self, page: PageParams) -> UserResult<Vec<User>> {
        let page = page.normalized();

        let sql = "SELECT * FROM users ORDER BY created_at ASC LIMIT $1 OFFSET $2";

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [(page.per_page as i64).into(), (page.offset() as i64).into()],
        );

        let rows = UserRow::find_by_statement(stmt).all(&self.db).await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let sql = "DELETE FROM users WHERE id = $1";

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);

        let result = self.db.execute_raw(stmt).await?;

        Ok(result.rows_affected() > 0)
    }

    async fn exists_by_email(&self, email: &str) -> UserResult<bool> {
        let sql = "SELECT EXISTS(SELECT 1 FROM users WHERE lower(email) = lower($1)) AS present";

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [email.into()]);

        #[derive(FromQueryResult)]
        struct ExistsRow {
            present: bool,
        }

        let row = ExistsRow::find_by_statement(stmt).one(&self.db).await?;

        Ok(row.map(|r| r.present).unwrap_or(false))
    }

    async fn count_total(&self) -> UserResult<u64> {
        let sql = "SELECT COUNT(*) AS count FROM users";

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, []);

        #[derive(FromQueryResult)]
        struct CountRow {
            count: i64,
        }

        let row = CountRow::find_by_statement(stmt).one(&self.db).await?;

        Ok(row.map(|r| r.count as u64).unwrap_or(0))
    }
}
