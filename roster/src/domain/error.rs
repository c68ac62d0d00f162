use thiserror::Error;

use super::models::EmailError;
use super::TimeFormatError;

/// A required field was missing or malformed. Caught before any collaborator call.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{0} must be a number")]
    InvalidNumber(&'static str),
    #[error("Time must be HH:MM, e.g. 08:30")]
    InvalidTime(#[from] TimeFormatError),
}

/// Errors reported by the table store collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store answered with an error. The message is shown as-is.
    #[error("{0}")]
    Rejected(String),
    #[error("store unavailable: {0}")]
    Transport(String),
    #[error("unexpected store response: {0}")]
    Malformed(String),
}

/// Errors from sign-in and registration.
#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error(transparent)]
    InvalidEmail(#[from] EmailError),
    #[error("{0}")]
    Rejected(String),
    #[error("auth service unavailable: {0}")]
    Transport(String),
}

/// Errors from the record-management services.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The session guard blocked the mutation. The user has already been warned.
    #[error("not signed in")]
    NotAuthenticated,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("record {0} not found")]
    NotFound(i64),
}

impl StoreError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }
}
