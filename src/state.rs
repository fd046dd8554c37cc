use crate::config::{AppConfig, DbConfig};
use crate::db;
use crate::users::{MemoryUserRepository, PgUserRepository, UserRepository};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let pool = db::connect(&config).await?;
        let users = Arc::new(PgUserRepository::new(pool)) as Arc<dyn UserRepository>;
        Ok(Self { users, config })
    }

    pub fn from_parts(users: Arc<dyn UserRepository>, config: Arc<AppConfig>) -> Self {
        Self { users, config }
    }

    /// State backed by an empty in-memory table.
    pub fn fake() -> Self {
        let db = DbConfig::default();
        let users = Arc::new(MemoryUserRepository::new(db.max_connections as usize))
            as Arc<dyn UserRepository>;
        let config = Arc::new(AppConfig {
            database_url: "memory://".into(),
            db,
        });
        Self { users, config }
    }
}
