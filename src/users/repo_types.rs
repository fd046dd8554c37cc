use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct User {
    pub id: i32,                        // assigned by storage
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(skip_serializing)]
    pub password: String,               // opaque credential, not exposed in JSON
}

/// Values for a row to insert.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: String,
}

/// Columns returned after an insert. Has no password field.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct CreatedUser {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Credential projection used by login checks.
#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct Credentials {
    pub id: i32,
    pub password: String,
}

impl From<&User> for CreatedUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            email: u.email.clone(),
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
        }
    }
}

impl From<&User> for Credentials {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            password: u.password.clone(),
        }
    }
}
