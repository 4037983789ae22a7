//! Target repository.
//!
//! A target is unique per firm and `reference_number`. Its revisions are
//! append-only and never deduplicated.

use esg_core::target::{NewTargetRevision, Target, TargetRevision, latest_revision, newest_first};
use esg_shared::types::{FirmId, TargetDataId, TargetId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use super::{duplicate, fetch, require};
use crate::entities::{firms, target_data, targets};
use crate::error::{RepositoryResult, on_write};

/// Target repository.
#[derive(Debug, Clone)]
pub struct TargetRepository {
    db: DatabaseConnection,
}

impl TargetRepository {
    /// Creates a new target repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a target.
    ///
    /// # Errors
    ///
    /// - `ConstraintViolation` if the firm already has a target with the
    ///   same reference number
    /// - `MissingRequiredReference` if the firm does not exist
    /// - `InvalidInput` for an over-long scope 3 source
    pub async fn create(&self, target: Target) -> RepositoryResult<Target> {
        target.validate()?;
        require::<firms::Entity, _>(&self.db, "firm", target.firm.into_inner()).await?;

        let taken = targets::Entity::find()
            .filter(targets::Column::FirmId.eq(target.firm.into_inner()))
            .filter(targets::Column::ReferenceNumber.eq(target.reference_number))
            .count(&self.db)
            .await?;
        if taken > 0 {
            return Err(duplicate("target", target.key()));
        }

        targets::ActiveModel {
            id: Set(target.id.into_inner()),
            firm_id: Set(target.firm.into_inner()),
            reference_number: Set(target.reference_number),
            date_set: Set(target.date_set),
            status: Set(target.status.as_str().to_string()),
            scope: Set(target.scope.as_str().to_string()),
            scope2_scheme: Set(target.scope2_scheme.as_str().to_string()),
            scope3_source: Set(target.scope3_source.clone()),
        }
        .insert(&self.db)
        .await
        .map_err(on_write("target"))?;

        tracing::debug!(id = %target.id, key = %target.key(), "created target");
        Ok(target)
    }

    /// Gets a target by ID.
    ///
    /// # Errors
    ///
    /// `NotFound` if the target does not exist; `InvalidEnumValue` if a
    /// stored code is not recognised.
    pub async fn get(&self, id: TargetId) -> RepositoryResult<Target> {
        let model = fetch::<targets::Entity, _>(&self.db, "target", id.into_inner()).await?;
        to_domain(model)
    }

    /// A firm's targets, by reference number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn for_firm(&self, firm: FirmId) -> RepositoryResult<Vec<Target>> {
        targets::Entity::find()
            .filter(targets::Column::FirmId.eq(firm.into_inner()))
            .order_by_asc(targets::Column::ReferenceNumber)
            .all(&self.db)
            .await?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    /// Appends a revision to a target.
    ///
    /// # Errors
    ///
    /// `MissingRequiredReference` if the target does not exist,
    /// `InvalidInput` if a decimal does not fit its stored precision.
    pub async fn add_revision(
        &self,
        target: TargetId,
        revision: NewTargetRevision,
    ) -> RepositoryResult<TargetRevision> {
        require::<targets::Entity, _>(&self.db, "target", target.into_inner()).await?;
        let revision = revision.into_revision(target)?;

        target_data::ActiveModel {
            id: Set(revision.id.into_inner()),
            target_id: Set(target.into_inner()),
            publication_date: Set(revision.publication_date),
            base_year: Set(revision.base_year),
            target_year: Set(revision.target_year),
            covered_base: Set(revision.covered_base),
            targeted_reduction: Set(revision.targeted_reduction),
            covered_target: Set(revision.covered_target),
            covered_pubyear: Set(revision.covered_pubyear),
            percent_of_total: Set(revision.percent_of_total),
            description: Set(revision.description.clone()),
            status: Set(revision.status.as_str().to_string()),
        }
        .insert(&self.db)
        .await
        .map_err(on_write("target_data"))?;

        tracing::debug!(%target, id = %revision.id, "added target revision");
        Ok(revision)
    }

    /// Every revision of a target, newest publication first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn revisions(&self, target: TargetId) -> RepositoryResult<Vec<TargetRevision>> {
        let mut revisions = target_data::Entity::find()
            .filter(target_data::Column::TargetId.eq(target.into_inner()))
            .order_by_desc(target_data::Column::PublicationDate)
            .all(&self.db)
            .await?
            .into_iter()
            .map(revision_to_domain)
            .collect::<RepositoryResult<Vec<_>>>()?;
        newest_first(&mut revisions);
        Ok(revisions)
    }

    /// The most recently published revision, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn latest_revision(&self, target: TargetId) -> RepositoryResult<Option<TargetRevision>> {
        Ok(latest_revision(&self.revisions(target).await?).cloned())
    }

    /// Deletes a target and its revisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete(&self, id: TargetId) -> RepositoryResult<bool> {
        let result = targets::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

fn to_domain(model: targets::Model) -> RepositoryResult<Target> {
    Ok(Target {
        id: TargetId::from(model.id),
        firm: FirmId::from(model.firm_id),
        reference_number: model.reference_number,
        date_set: model.date_set,
        status: model.status.parse()?,
        scope: model.scope.parse()?,
        scope2_scheme: model.scope2_scheme.parse()?,
        scope3_source: model.scope3_source,
    })
}

fn revision_to_domain(model: target_data::Model) -> RepositoryResult<TargetRevision> {
    Ok(TargetRevision {
        id: TargetDataId::from(model.id),
        target: TargetId::from(model.target_id),
        publication_date: model.publication_date,
        base_year: model.base_year,
        target_year: model.target_year,
        covered_base: model.covered_base,
        targeted_reduction: model.targeted_reduction,
        covered_target: model.covered_target,
        covered_pubyear: model.covered_pubyear,
        percent_of_total: model.percent_of_total,
        description: model.description,
        status: model.status.parse()?,
    })
}
