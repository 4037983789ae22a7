//! Repository error type.
//!
//! Store-level unique and foreign-key failures are folded into
//! [`DomainError::ConstraintViolation`], so a duplicate caught by the
//! pre-check and one caught by the index look the same to callers.

use esg_core::DomainError;
use esg_shared::AppError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Result type alias using `RepositoryError`.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors returned by repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A domain rule rejected the operation.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The addressed record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record.
        entity: &'static str,
        /// Requested id.
        id: String,
    },

    /// Any other database failure.
    #[error("Database error: {0}")]
    Database(DbErr),
}

impl RepositoryError {
    /// Shorthand for a missing record.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns true if the error is a constraint violation.
    #[must_use]
    pub const fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::Domain(e) if e.is_constraint_violation())
    }

    /// The domain error, if that is what this is.
    #[must_use]
    pub const fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) => Some(e),
            _ => None,
        }
    }

    /// Maps a database error raised while writing `entity`.
    #[must_use]
    pub fn from_db(entity: &'static str, err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::warn!(entity, %detail, "unique index rejected write");
                Self::Domain(DomainError::ConstraintViolation { entity, detail })
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                tracing::warn!(entity, %detail, "foreign key rejected write");
                Self::Domain(DomainError::ConstraintViolation { entity, detail })
            }
            _ => Self::Database(err),
        }
    }
}

impl From<DbErr> for RepositoryError {
    fn from(err: DbErr) -> Self {
        Self::from_db("record", err)
    }
}

/// Closure form of [`RepositoryError::from_db`] for `map_err`.
pub(crate) fn on_write(entity: &'static str) -> impl FnOnce(DbErr) -> RepositoryError {
    move |err| RepositoryError::from_db(entity, err)
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Domain(e) => e.into(),
            RepositoryError::NotFound { .. } => Self::NotFound(err.to_string()),
            RepositoryError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_db_error_stays_database() {
        let err: RepositoryError = DbErr::Custom("boom".into()).into();
        assert!(matches!(err, RepositoryError::Database(_)));
        assert!(!err.is_constraint_violation());
        let app: AppError = err.into();
        assert_eq!(app.error_code(), "DATABASE_ERROR");
    }

    #[test]
    fn test_not_found_into_app_error() {
        let app: AppError = RepositoryError::not_found("firm", "42").into();
        assert_eq!(app.error_code(), "NOT_FOUND");
        assert!(app.to_string().contains("firm not found: 42"));
    }

    #[test]
    fn test_domain_passthrough() {
        let err: RepositoryError = DomainError::duplicate("metric", "name=Revenue").into();
        assert!(err.is_constraint_violation());
        assert_eq!(err.to_string(), "Constraint violation on metric: name=Revenue");
    }
}
