//! Access to the `users` table.
//!
//! Callers hold an `Arc<dyn UserRepository>`; Postgres and in-memory
//! backends share the same contract: one connection per call, released on
//! every exit path, failures reported as [`StorageError`].

use async_trait::async_trait;

use crate::error::StorageError;

mod memory;
mod repo;
mod repo_types;

pub use memory::MemoryUserRepository;
pub use repo::PgUserRepository;
pub use repo_types::{CreatedUser, Credentials, NewUser, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Every row, in storage order.
    async fn get_all_users(&self) -> Result<Vec<User>, StorageError>;

    /// First row with this username, `None` if there is none.
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError>;

    /// Insert a row and return it without the password.
    async fn create_user(&self, new_user: &NewUser) -> Result<CreatedUser, StorageError>;

    /// `{id, password}` for every row with this email.
    async fn login_query(&self, email: &str) -> Result<Vec<Credentials>, StorageError>;
}
