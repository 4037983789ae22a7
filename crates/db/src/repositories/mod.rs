//! Repositories for database operations.
//!
//! Each repository owns a connection handle and enforces the write rules of
//! its table: uniqueness is checked before insert (treating unset key parts
//! as equal) and again by the store's unique indexes.

pub mod currency;
pub mod firm;
pub mod location;
pub mod metric;
pub mod observation;
pub mod source;
pub mod target;
pub mod taxonomy;
pub mod unit;

pub use currency::CurrencyRepository;
pub use firm::{CreateFirmInput, FirmRepository};
pub use location::{CreateLocationInput, LocationRepository};
pub use metric::MetricRepository;
pub use observation::{ObservationFilter, ObservationRepository};
pub use source::SourceRepository;
pub use target::TargetRepository;
pub use taxonomy::TaxonomyRepository;
pub use unit::{CreateUnitInput, UnitRepository};

use esg_core::DomainError;
use sea_orm::{ConnectionTrait, EntityTrait, PrimaryKeyTrait};
use uuid::Uuid;

use crate::error::{RepositoryError, RepositoryResult};

/// Loads a record the caller addressed directly.
pub(crate) async fn fetch<E, C>(conn: &C, entity: &'static str, id: Uuid) -> RepositoryResult<E::Model>
where
    E: EntityTrait,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = Uuid>,
    C: ConnectionTrait,
{
    E::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| RepositoryError::not_found(entity, id))
}

/// Loads a record another write refers to.
pub(crate) async fn require<E, C>(conn: &C, entity: &'static str, id: Uuid) -> RepositoryResult<E::Model>
where
    E: EntityTrait,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = Uuid>,
    C: ConnectionTrait,
{
    E::find_by_id(id).one(conn).await?.ok_or_else(|| {
        DomainError::MissingRequiredReference {
            entity,
            detail: id.to_string(),
        }
        .into()
    })
}

/// Builds the error for a duplicate caught by a pre-check.
pub(crate) fn duplicate(entity: &'static str, detail: impl Into<String>) -> RepositoryError {
    let detail = detail.into();
    tracing::warn!(entity, %detail, "duplicate key rejected before insert");
    DomainError::duplicate(entity, detail).into()
}
