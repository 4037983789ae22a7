//! Metric repository.

use esg_core::limits;
use esg_shared::types::{MetricId, UnitId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use super::{duplicate, fetch, require};
use crate::entities::{metric_units, metrics, units};
use crate::error::{RepositoryResult, on_write};

/// Metric repository.
#[derive(Debug, Clone)]
pub struct MetricRepository {
    db: DatabaseConnection,
}

impl MetricRepository {
    /// Creates a new metric repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a metric.
    ///
    /// # Errors
    ///
    /// `ConstraintViolation` if the name is taken, `InvalidInput` for an
    /// empty or over-long name or description.
    pub async fn create(&self, name: &str, description: &str) -> RepositoryResult<metrics::Model> {
        limits::check_name("metric name", name)?;
        limits::check_len("description", description, limits::DESCRIPTION_LEN)?;
        if self.find_by_name(name).await?.is_some() {
            return Err(duplicate("metric", format!("name={name}")));
        }

        let metric = metrics::ActiveModel {
            id: Set(MetricId::new().into_inner()),
            name: Set(name.to_string()),
            description: Set(description.to_string()),
        }
        .insert(&self.db)
        .await
        .map_err(on_write("metric"))?;

        tracing::debug!(id = %metric.id, name, "created metric");
        Ok(metric)
    }

    /// Gets a metric by ID.
    ///
    /// # Errors
    ///
    /// `NotFound` if the metric does not exist.
    pub async fn get(&self, id: MetricId) -> RepositoryResult<metrics::Model> {
        fetch::<metrics::Entity, _>(&self.db, "metric", id.into_inner()).await
    }

    /// Finds a metric by its unique name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<metrics::Model>> {
        Ok(metrics::Entity::find()
            .filter(metrics::Column::Name.eq(name))
            .one(&self.db)
            .await?)
    }

    /// All metrics, by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> RepositoryResult<Vec<metrics::Model>> {
        Ok(metrics::Entity::find()
            .order_by_asc(metrics::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Allows `unit` for values of `metric`.
    ///
    /// # Errors
    ///
    /// `MissingRequiredReference` if either side does not exist,
    /// `ConstraintViolation` if the unit is already allowed.
    pub async fn add_unit(&self, metric: MetricId, unit: UnitId) -> RepositoryResult<()> {
        require::<metrics::Entity, _>(&self.db, "metric", metric.into_inner()).await?;
        require::<units::Entity, _>(&self.db, "unit", unit.into_inner()).await?;

        let existing = metric_units::Entity::find()
            .filter(metric_units::Column::MetricId.eq(metric.into_inner()))
            .filter(metric_units::Column::UnitId.eq(unit.into_inner()))
            .count(&self.db)
            .await?;
        if existing > 0 {
            return Err(duplicate("metric_unit", format!("metric={metric}, unit={unit}")));
        }

        metric_units::ActiveModel {
            metric_id: Set(metric.into_inner()),
            unit_id: Set(unit.into_inner()),
        }
        .insert(&self.db)
        .await
        .map_err(on_write("metric_unit"))?;
        Ok(())
    }

    /// Units allowed for a metric. Empty means any unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn units_of(&self, metric: MetricId) -> RepositoryResult<Vec<UnitId>> {
        let ids: Vec<uuid::Uuid> = metric_units::Entity::find()
            .select_only()
            .column(metric_units::Column::UnitId)
            .filter(metric_units::Column::MetricId.eq(metric.into_inner()))
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(ids.into_iter().map(UnitId::from).collect())
    }

    /// Deletes a metric and, through the cascade, every fact row of it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete(&self, id: MetricId) -> RepositoryResult<bool> {
        let result = metrics::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
