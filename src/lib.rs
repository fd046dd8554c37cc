pub mod config;
pub mod db;
pub mod error;
pub mod state;
pub mod users;

pub use error::{ErrorKind, StorageError};
pub use state::AppState;
pub use users::{CreatedUser, Credentials, NewUser, User, UserRepository};
