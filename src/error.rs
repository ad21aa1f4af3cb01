//! Error types shared by the scheduling engine, the store and the CLI.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudyError {
    /// Malformed input rejected before touching the store
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Missing record, or a record owned by another learner
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique-name violation
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, StudyError>;

impl StudyError {
    pub fn validation(msg: impl Into<String>) -> Self {
        StudyError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        StudyError::NotFound(msg.into())
    }
}

/// True when a rusqlite error comes from a UNIQUE constraint.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Rejects identifiers that can never name a stored row.
pub(crate) fn check_id(id: i64, what: &str) -> Result<()> {
    if id <= 0 {
        return Err(StudyError::validation(format!("{} id must be positive", what)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_id_rejects_non_positive() {
        assert!(check_id(1, "item").is_ok());
        assert!(matches!(check_id(0, "item"), Err(StudyError::Validation(_))));
        assert!(matches!(check_id(-4, "item"), Err(StudyError::Validation(_))));
    }

    #[test]
    fn test_error_messages() {
        let err = StudyError::not_found("Review state not found");
        assert_eq!(err.to_string(), "Not found: Review state not found");
    }
}
