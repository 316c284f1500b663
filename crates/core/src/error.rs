//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures (validation, missing posts).
/// Storage faults belong to the infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. an empty title).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The referenced post does not exist.
    ///
    /// Carries the id as requested, which may lie outside the storable range.
    #[error("Post with id {0} was not found")]
    NotFound(i64),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(id: impl Into<i64>) -> Self {
        Self::NotFound(id.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_post() {
        let err = DomainError::not_found(42);
        assert_eq!(err.to_string(), "Post with id 42 was not found");

        let err = DomainError::not_found(99_999_999_999_i64);
        assert_eq!(err.to_string(), "Post with id 99999999999 was not found");
    }
}
