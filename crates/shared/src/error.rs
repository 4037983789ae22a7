//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Lower layers keep their own error enums; this is the taxonomy callers of
/// the workspace see once those are folded together.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Value outside a closed vocabulary, or otherwise malformed input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Write duplicates a unique key tuple or breaks a foreign key.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A required related record does not exist (e.g. a firm without ISINs).
    #[error("Missing reference: {0}")]
    MissingReference(String),

    /// Arithmetic that cannot be carried out (e.g. a zero unit coefficient).
    #[error("Arithmetic error: {0}")]
    Arithmetic(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns a stable machine-readable code for this error.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONSTRAINT_VIOLATION",
            Self::MissingReference(_) => "MISSING_REFERENCE",
            Self::Arithmetic(_) => "ARITHMETIC_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true for errors caused by the caller's input rather than the
    /// environment. None of them are retried.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::Validation(_)
                | Self::Conflict(_)
                | Self::MissingReference(_)
                | Self::Arithmetic(_)
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::NotFound(String::new()), "NOT_FOUND")]
    #[case(AppError::Validation(String::new()), "VALIDATION_ERROR")]
    #[case(AppError::Conflict(String::new()), "CONSTRAINT_VIOLATION")]
    #[case(AppError::MissingReference(String::new()), "MISSING_REFERENCE")]
    #[case(AppError::Arithmetic(String::new()), "ARITHMETIC_ERROR")]
    #[case(AppError::Database(String::new()), "DATABASE_ERROR")]
    #[case(AppError::Config(String::new()), "CONFIG_ERROR")]
    #[case(AppError::Internal(String::new()), "INTERNAL_ERROR")]
    fn test_error_codes(#[case] error: AppError, #[case] code: &str) {
        assert_eq!(error.error_code(), code);
    }

    #[test]
    fn test_client_errors() {
        assert!(AppError::Conflict("dup".into()).is_client_error());
        assert!(AppError::Validation("bad".into()).is_client_error());
        assert!(!AppError::Database("down".into()).is_client_error());
        assert!(!AppError::Internal("oops".into()).is_client_error());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::NotFound("msg".into()).to_string(),
            "Not found: msg"
        );
        assert_eq!(
            AppError::Validation("msg".into()).to_string(),
            "Validation error: msg"
        );
        assert_eq!(
            AppError::Conflict("msg".into()).to_string(),
            "Conflict: msg"
        );
        assert_eq!(
            AppError::MissingReference("msg".into()).to_string(),
            "Missing reference: msg"
        );
        assert_eq!(
            AppError::Arithmetic("msg".into()).to_string(),
            "Arithmetic error: msg"
        );
        assert_eq!(
            AppError::Database("msg".into()).to_string(),
            "Database error: msg"
        );
    }
}
