use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

use async_trait::async_trait;
use tokio::sync::{OwnedSemaphorePermit, RwLock, Semaphore};
use tracing::{debug, warn};

use super::repo_types::{CreatedUser, Credentials, NewUser, User};
use super::UserRepository;
use crate::error::{ErrorKind, StorageError};

const DEFAULT_CAPACITY: usize = 10;

/// In-memory `users` table behind a bounded set of connection slots.
///
/// Every operation holds one slot for its duration, the same way the
/// Postgres backend holds one pooled connection.
pub struct MemoryUserRepository {
    rows: RwLock<Vec<User>>,
    next_id: AtomicI64,
    slots: Arc<Semaphore>,
    capacity: usize,
}

impl Default for MemoryUserRepository {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl MemoryUserRepository {
    pub fn new(capacity: usize) -> Self {
        Self::with_users(capacity, Vec::new())
    }

    /// Seed the table. Ids continue after the largest seeded id.
    ///
    /// A capacity of 0 is raised to 1; a pool without slots would block forever.
    pub fn with_users(capacity: usize, users: Vec<User>) -> Self {
        let capacity = capacity.max(1);
        let next_id = users.iter().map(|u| i64::from(u.id)).max().unwrap_or(0) + 1;
        Self {
            rows: RwLock::new(users),
            next_id: AtomicI64::new(next_id),
            slots: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots not currently held by an operation.
    pub fn idle_connections(&self) -> usize {
        self.slots.available_permits()
    }

    /// Stop handing out connections; later operations fail to acquire.
    pub fn close(&self) {
        self.slots.close();
    }

    pub fn is_closed(&self) -> bool {
        self.slots.is_closed()
    }

    async fn acquire(&self) -> Result<OwnedSemaphorePermit, StorageError> {
        self.slots.clone().acquire_owned().await.map_err(|_| {
            warn!("memory pool closed");
            StorageError::new(ErrorKind::ConnectionFailure, "pool closed")
        })
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn get_all_users(&self) -> Result<Vec<User>, StorageError> {
        let _conn = self.acquire().await?;
        let rows = self.rows.read().await;
        Ok(rows.clone())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        let _conn = self.acquire().await?;
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, new_user: &NewUser) -> Result<CreatedUser, StorageError> {
        let _conn = self.acquire().await?;
        let mut rows = self.rows.write().await;

        if rows.iter().any(|u| u.username == new_user.username) {
            return Err(StorageError::new(
                ErrorKind::Conflict,
                format!("duplicate username {:?}", new_user.username),
            ));
        }
        if rows.iter().any(|u| u.email == new_user.email) {
            return Err(StorageError::new(
                ErrorKind::Conflict,
                format!("duplicate email {:?}", new_user.email),
            ));
        }

        // Same ceiling as a SERIAL column.
        let id = i32::try_from(self.next_id.fetch_add(1, Ordering::Relaxed)).map_err(|_| {
            StorageError::new(ErrorKind::QueryFailure, "users id sequence exhausted")
        })?;
        let user = User {
            id,
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            password: new_user.password.clone(),
        };
        let created = CreatedUser::from(&user);
        rows.push(user);
        debug!(user_id = created.id, "user created in memory");
        Ok(created)
    }

    async fn login_query(&self, email: &str) -> Result<Vec<Credentials>, StorageError> {
        let _conn = self.acquire().await?;
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|u| u.email == email)
            .map(Credentials::from)
            .collect())
    }
}
