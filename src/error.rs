use thiserror::Error;

/// Classification of a storage failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    ConnectionFailure,
    QueryFailure,
}

impl ErrorKind {
    /// Numeric classification code handed to callers that map errors to responses.
    pub fn code(self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::ConnectionFailure | ErrorKind::QueryFailure => 500,
        }
    }
}

/// Error returned by every user repository operation.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StorageError {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<sqlx::Error>,
}

impl StorageError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> u16 {
        self.kind.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// True for failures worth retrying later (pool or network trouble).
    pub fn is_retryable(&self) -> bool {
        self.kind == ErrorKind::ConnectionFailure
    }
}

fn classify(e: &sqlx::Error) -> ErrorKind {
    match e {
        sqlx::Error::RowNotFound => ErrorKind::NotFound,
        sqlx::Error::Database(db_err)
            if db_err.is_unique_violation()
                || db_err.is_foreign_key_violation()
                || db_err.is_check_violation() =>
        {
            ErrorKind::Conflict
        }
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::WorkerCrashed => ErrorKind::ConnectionFailure,
        _ => ErrorKind::QueryFailure,
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        Self {
            kind: classify(&e),
            message: e.to_string(),
            source: Some(e),
        }
    }
}
