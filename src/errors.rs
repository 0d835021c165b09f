use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use crate::users::UserId;

// Create a type alias for Result using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the aggregation core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Constraint violation: {0}")]
    Constraint(#[from] ConstraintViolation),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl Error {
    /// Whether the failure is a transient store outage that callers may
    /// retry. Observers use this to keep publishing their last-known-good
    /// value instead of tearing down.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Database(DatabaseError::Unavailable(_))
                | Error::Database(DatabaseError::ConnectionFailed(_))
        )
    }
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(#[from] diesel::result::ConnectionError),

    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(#[from] r2d2::Error),

    #[error("Database temporarily unavailable: {0}")]
    Unavailable(String),

    #[error("Database query failed: {0}")]
    QueryFailed(DieselError),

    #[error("Database migration failed: {0}")]
    MigrationFailed(String),
}

/// Uniqueness invariants surfaced synchronously at write time.
#[derive(Error, Debug)]
pub enum ConstraintViolation {
    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),

    #[error("email '{0}' is already registered")]
    DuplicateEmail(String),

    #[error("category '{0}' already exists")]
    DuplicateCategory(String),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("no active user session")]
    NotAuthenticated,

    #[error("session user id {0} is not valid")]
    InvalidUser(UserId),

    #[error("session user {0} does not exist")]
    UnknownUser(UserId),
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),
}

// Diesel errors map to the database taxonomy, except unique-index
// violations which surface as constraint errors so the store-level
// backstop matches the repository pre-checks.
impl From<DieselError> for Error {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => Error::NotFound("row".to_string()),
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                let message = info.message().to_string();
                if message.contains("users.username") {
                    Error::Constraint(ConstraintViolation::DuplicateUsername(message))
                } else if message.contains("users.email") {
                    Error::Constraint(ConstraintViolation::DuplicateEmail(message))
                } else if message.contains("categories") {
                    Error::Constraint(ConstraintViolation::DuplicateCategory(message))
                } else {
                    Error::Database(DatabaseError::QueryFailed(DieselError::DatabaseError(
                        DatabaseErrorKind::UniqueViolation,
                        info,
                    )))
                }
            }
            other => Error::Database(DatabaseError::QueryFailed(other)),
        }
    }
}

// Pool exhaustion is the recoverable "store unavailable" case.
impl From<r2d2::Error> for Error {
    fn from(e: r2d2::Error) -> Self {
        Error::Database(DatabaseError::Unavailable(e.to_string()))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}
