//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - The schema migration (Postgres and SQLite)
//! - Repositories that enforce uniqueness and reference rules

pub mod entities;
pub mod error;
pub mod migration;
pub mod repositories;

pub use error::{RepositoryError, RepositoryResult};
pub use repositories::{
    CurrencyRepository, FirmRepository, LocationRepository, MetricRepository,
    ObservationRepository, SourceRepository, TargetRepository, TaxonomyRepository,
    UnitRepository,
};

use std::time::Duration;

use esg_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a pooled connection from configuration.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(config.sqlx_logging);
    tracing::debug!(
        max_connections = config.max_connections,
        "connecting to database"
    );
    Database::connect(options).await
}
