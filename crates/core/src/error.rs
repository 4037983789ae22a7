//! Domain error types shared by every core module.
//!
//! The four failure classes of the data model are represented here, plus a
//! write-time input check. Nothing in this crate retries; every error goes
//! back to the caller unchanged.

use esg_shared::AppError;
use thiserror::Error;

/// Result type alias using `DomainError`.
pub type DomainResult<T> = Result<T, DomainError>;

/// Errors raised by domain rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A write duplicates a unique key tuple or breaks a foreign key.
    #[error("Constraint violation on {entity}: {detail}")]
    ConstraintViolation {
        /// Entity (table) the write targeted.
        entity: &'static str,
        /// Human-readable description of the offending key.
        detail: String,
    },

    /// A field was set outside its closed vocabulary.
    #[error("Invalid value '{value}' for {field}")]
    InvalidEnumValue {
        /// Vocabulary name, e.g. `timescale`.
        field: &'static str,
        /// The rejected input.
        value: String,
    },

    /// Arithmetic that has no defined result.
    #[error("Arithmetic error: {0}")]
    Arithmetic(String),

    /// A required related record does not exist.
    #[error("Missing {entity}: {detail}")]
    MissingRequiredReference {
        /// Kind of record that was expected.
        entity: &'static str,
        /// What it was expected for.
        detail: String,
    },

    /// Input rejected before it reaches storage.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DomainError {
    /// Shorthand for a duplicate-key violation.
    #[must_use]
    pub fn duplicate(entity: &'static str, detail: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            entity,
            detail: detail.into(),
        }
    }

    /// Returns true if this is a constraint violation.
    #[must_use]
    pub const fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::ConstraintViolation { .. })
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::ConstraintViolation { .. } => Self::Conflict(err.to_string()),
            DomainError::InvalidEnumValue { .. } | DomainError::InvalidInput(_) => {
                Self::Validation(err.to_string())
            }
            DomainError::Arithmetic(_) => Self::Arithmetic(err.to_string()),
            DomainError::MissingRequiredReference { .. } => {
                Self::MissingReference(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            DomainError::duplicate("metric", "name=Revenue").to_string(),
            "Constraint violation on metric: name=Revenue"
        );
        assert_eq!(
            DomainError::InvalidEnumValue {
                field: "timescale",
                value: "yearly".into()
            }
            .to_string(),
            "Invalid value 'yearly' for timescale"
        );
        assert_eq!(
            DomainError::MissingRequiredReference {
                entity: "isin",
                detail: "firm Acme".into()
            }
            .to_string(),
            "Missing isin: firm Acme"
        );
    }

    #[test]
    fn test_into_app_error() {
        let conflict: AppError = DomainError::duplicate("firm", "name=Acme").into();
        assert_eq!(conflict.error_code(), "CONSTRAINT_VIOLATION");

        let invalid: AppError = DomainError::InvalidEnumValue {
            field: "scheme",
            value: "X".into(),
        }
        .into();
        assert_eq!(invalid.error_code(), "VALIDATION_ERROR");

        let arithmetic: AppError = DomainError::Arithmetic("coeff is zero".into()).into();
        assert_eq!(arithmetic.error_code(), "ARITHMETIC_ERROR");

        let missing: AppError = DomainError::MissingRequiredReference {
            entity: "isin",
            detail: String::new(),
        }
        .into();
        assert_eq!(missing.error_code(), "MISSING_REFERENCE");
    }
}
