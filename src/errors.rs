//! Error types shared by every layer of the crate.
//!
//! Configuration problems are reported once at start-up with field-level detail.
//! Store-level constraint violations surface as [`Error::Database`] so callers can
//! decide how to present them; [`Error::is_unique_violation`] and
//! [`Error::is_foreign_key_violation`] classify them without string matching.

use sea_orm::{DbErr, SqlErr};
use std::fmt;
use thiserror::Error;

/// A single problem found while loading configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Name of the offending variable (e.g. `MAIL_USERNAME`)
    pub field: &'static str,
    /// What is wrong with it
    pub problem: String,
}

impl FieldError {
    pub(crate) fn missing(field: &'static str) -> Self {
        Self {
            field,
            problem: "is required but was not set".to_string(),
        }
    }

    pub(crate) fn malformed(field: &'static str, problem: impl Into<String>) -> Self {
        Self {
            field,
            problem: problem.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.problem)
    }
}

fn join_field_errors(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid configuration: {}", join_field_errors(.fields))]
    InvalidConfig { fields: Vec<FieldError> },

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("User not found: {id}")]
    UserNotFound { id: i32 },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i32 },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Password reset token is invalid or has expired")]
    InvalidResetToken,

    #[error("Mail transport error: {0}")]
    MailTransport(#[from] lettre::transport::smtp::Error),

    #[error("Mail message error: {0}")]
    MailMessage(#[from] lettre::error::Error),

    #[error("Invalid mail address: {0}")]
    MailAddress(#[from] lettre::address::AddressError),
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Returns true when the store rejected a write because of a uniqueness constraint.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            Self::Database(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        )
    }

    /// Returns true when the store rejected a write because a referenced row does not exist.
    #[must_use]
    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            Self::Database(err) if matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
        )
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
