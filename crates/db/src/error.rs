//! Mapping of `sqlx` errors onto [`CoreError`].

use seqcraft_core::error::CoreError;

/// PostgreSQL SQLSTATE for a unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL SQLSTATE for a foreign key violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";
/// PostgreSQL SQLSTATE for a check constraint violation.
const CHECK_VIOLATION: &str = "23514";

/// Classify a database error.
///
/// - Unique violations on constraints named `uq_*` become [`CoreError::Conflict`].
/// - Foreign key and check violations become [`CoreError::Validation`].
/// - Everything else, including `RowNotFound`, is a [`CoreError::Store`]
///   failure; repositories report absent rows as `Option`/`bool` instead.
pub fn classify(err: sqlx::Error) -> CoreError {
    match &err {
        sqlx::Error::Database(db_err) => classify_database(
            db_err.code().as_deref(),
            db_err.constraint(),
            db_err.message(),
        ),
        _ => CoreError::Store(err.to_string()),
    }
}

fn classify_database(code: Option<&str>, constraint: Option<&str>, message: &str) -> CoreError {
    let constraint_name = constraint.unwrap_or("unknown");
    match code {
        Some(UNIQUE_VIOLATION) if constraint_name.starts_with("uq_") => CoreError::Conflict(
            format!("Duplicate value violates unique constraint: {constraint_name}"),
        ),
        Some(FOREIGN_KEY_VIOLATION) => CoreError::Validation(format!(
            "Referenced record does not exist: {constraint_name}"
        )),
        Some(CHECK_VIOLATION) => {
            CoreError::Validation(format!("Value violates check constraint: {constraint_name}"))
        }
        _ => CoreError::Store(message.to_string()),
    }
}

/// Name of the violated foreign key, if `err` is a foreign key violation.
pub(crate) fn foreign_key_violation(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err)
            if db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) =>
        {
            db_err.constraint().map(str::to_string)
        }
        _ => None,
    }
}
