//! Error handling utilities for repositories

use crafts_core::error::DomainError;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce(Option<&str>) -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique(db_err.constraint());
        }
    }
    DomainError::DatabaseError(e.to_string())
}

/// Map a violated `users` unique index to the conflicting field
pub fn user_conflict(constraint: Option<&str>) -> DomainError {
    match constraint {
        Some("users_username_key") => DomainError::UsernameAlreadyExists,
        Some("users_phone_key") => DomainError::PhoneAlreadyExists,
        _ => DomainError::EmailAlreadyExists,
    }
}
