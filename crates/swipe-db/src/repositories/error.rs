//! Error handling utilities for repositories
//!
//! Everything leaving this crate is a [`DomainError`]. Failures the caller
//! may retry (lost connections, pool exhaustion, serialization conflicts)
//! become [`DomainError::TransientStore`]; the rest become
//! [`DomainError::DatabaseError`].

use sqlx::Error as SqlxError;
use swipe_core::{DomainError, Snowflake};

/// SQLSTATE codes worth another attempt
const TRANSIENT_SQLSTATES: &[&str] = &[
    "40001", // serialization_failure
    "40P01", // deadlock_detected
    "53300", // too_many_connections
    "57P01", // admin_shutdown
    "08000", "08003", "08006", // connection exceptions
];

fn is_transient(e: &SqlxError) -> bool {
    match e {
        SqlxError::Io(_) | SqlxError::PoolTimedOut | SqlxError::WorkerCrashed => true,
        SqlxError::Database(db_err) => db_err
            .code()
            .is_some_and(|code| TRANSIENT_SQLSTATES.contains(&&*code)),
        _ => false,
    }
}

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    if is_transient(&e) {
        DomainError::TransientStore(e.to_string())
    } else {
        DomainError::DatabaseError(e.to_string())
    }
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    map_db_error(e)
}

pub fn room_not_found(id: Snowflake) -> DomainError {
    DomainError::RoomNotFound(id)
}

pub fn match_not_found(id: Snowflake) -> DomainError {
    DomainError::MatchNotFound(id)
}
