use async_trait::async_trait;
use sqlx::{pool::PoolConnection, PgPool, Postgres};
use tracing::{debug, error, instrument};

use super::repo_types::{CreatedUser, Credentials, NewUser, User};
use super::UserRepository;
use crate::error::StorageError;

/// `users` table access over a Postgres pool.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One connection per operation; it goes back to the pool when dropped.
    async fn acquire(&self) -> Result<PoolConnection<Postgres>, StorageError> {
        self.pool
            .acquire()
            .await
            .map_err(|e| failed("acquire connection", e))
    }
}

fn failed(op: &'static str, e: sqlx::Error) -> StorageError {
    let err = StorageError::from(e);
    error!(error = %err, kind = ?err.kind(), code = err.code(), op, "storage operation failed");
    err
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn get_all_users(&self) -> Result<Vec<User>, StorageError> {
        let mut conn = self.acquire().await?;
        let users = sqlx::query_as::<_, User>("SELECT * FROM users")
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| failed("get_all_users", e))?;
        debug!(count = users.len(), "users loaded");
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        let mut conn = self.acquire().await?;
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| failed("get_user_by_username", e))?;
        debug!(found = user.is_some(), "user lookup");
        Ok(user)
    }

    #[instrument(skip(self, new_user), fields(username = %new_user.username, email = %new_user.email))]
    async fn create_user(&self, new_user: &NewUser) -> Result<CreatedUser, StorageError> {
        let mut conn = self.acquire().await?;
        let created = sqlx::query_as::<_, CreatedUser>(
            r#"
            INSERT INTO users (username, email, first_name, last_name, password)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, email, first_name, last_name
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.password)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| failed("create_user", e))?;
        debug!(user_id = created.id, "user created");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn login_query(&self, email: &str) -> Result<Vec<Credentials>, StorageError> {
        let mut conn = self.acquire().await?;
        let rows = sqlx::query_as::<_, Credentials>(
            "SELECT id, password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| failed("login_query", e))?;
        debug!(count = rows.len(), "credentials loaded");
        Ok(rows)
    }
}
