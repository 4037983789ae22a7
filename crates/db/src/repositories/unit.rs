//! Unit repository.
//!
//! Deleting a unit leaves the fact rows that used it in place with their
//! values; only the unit reference is cleared.

use esg_core::DomainError;
use esg_core::limits;
use esg_core::units::{Unit, UnitBasis, UnitScale};
use esg_shared::types::UnitId;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use super::observation::rekey;
use super::{fetch, require};
use crate::entities::{observations, units};
use crate::error::{RepositoryResult, on_write};

/// Input for creating a unit.
#[derive(Debug, Clone)]
pub struct CreateUnitInput {
    /// Display name.
    pub name: String,
    /// Unit this one converts into, `None` for a default unit.
    pub default_unit: Option<UnitId>,
    /// Scale relative to the default unit.
    pub scale: UnitScale,
}

impl CreateUnitInput {
    /// A default unit with the identity scale.
    #[must_use]
    pub fn base(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_unit: None,
            scale: UnitScale::IDENTITY,
        }
    }

    /// A unit converting into `default_unit` through `scale`.
    #[must_use]
    pub fn derived(name: impl Into<String>, default_unit: UnitId, scale: UnitScale) -> Self {
        Self {
            name: name.into(),
            default_unit: Some(default_unit),
            scale,
        }
    }
}

/// Unit repository.
#[derive(Debug, Clone)]
pub struct UnitRepository {
    db: DatabaseConnection,
}

impl UnitRepository {
    /// Creates a new unit repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a unit.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a bad name, a zero coefficient, or a scale that
    ///   does not fit the stored precision
    /// - `MissingRequiredReference` if the default unit does not exist
    pub async fn create(&self, input: CreateUnitInput) -> RepositoryResult<Unit> {
        limits::check_name("unit name", &input.name)?;
        let scale = fit_scale(input.scale)?;
        if let Some(default_unit) = input.default_unit {
            require::<units::Entity, _>(&self.db, "unit", default_unit.into_inner()).await?;
        }

        let unit = Unit {
            id: UnitId::new(),
            name: input.name,
            default_unit: input.default_unit,
            scale,
        };
        units::ActiveModel {
            id: Set(unit.id.into_inner()),
            name: Set(unit.name.clone()),
            default_unit_id: Set(unit.default_unit.map(UnitId::into_inner)),
            coeff: Set(unit.scale.coeff),
            constant: Set(unit.scale.constant),
        }
        .insert(&self.db)
        .await
        .map_err(on_write("unit"))?;

        tracing::debug!(id = %unit.id, name = %unit.name, "created unit");
        Ok(unit)
    }

    /// Gets a unit by ID.
    ///
    /// # Errors
    ///
    /// `NotFound` if the unit does not exist.
    pub async fn get(&self, id: UnitId) -> RepositoryResult<Unit> {
        let model = fetch::<units::Entity, _>(&self.db, "unit", id.into_inner()).await?;
        Ok(to_domain(model))
    }

    /// All units, by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> RepositoryResult<Vec<Unit>> {
        Ok(units::Entity::find()
            .order_by_asc(units::Column::Name)
            .all(&self.db)
            .await?
            .into_iter()
            .map(to_domain)
            .collect())
    }

    /// Every unit with its default-unit links.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn basis(&self) -> RepositoryResult<UnitBasis> {
        Ok(self.list().await?.into_iter().collect())
    }

    /// Points a unit at a new default unit, or makes it a default unit.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the unit does not exist
    /// - `MissingRequiredReference` if the new default does not exist
    /// - `InvalidInput` if the link would make the chain loop
    pub async fn set_default_unit(&self, id: UnitId, default_unit: Option<UnitId>) -> RepositoryResult<Unit> {
        let model = fetch::<units::Entity, _>(&self.db, "unit", id.into_inner()).await?;
        if let Some(target) = default_unit {
            require::<units::Entity, _>(&self.db, "unit", target.into_inner()).await?;
            let basis = self.basis().await?;
            if target == id || basis.chain(target).nodes.contains(&id) {
                tracing::warn!(%id, %target, "rejected looping default unit");
                return Err(DomainError::InvalidInput(format!(
                    "unit {target} already converts through {id}"
                ))
                .into());
            }
        }

        let mut active: units::ActiveModel = model.into();
        active.default_unit_id = Set(default_unit.map(UnitId::into_inner));
        let model = active.update(&self.db).await.map_err(on_write("unit"))?;
        Ok(to_domain(model))
    }

    /// Replaces a unit's scale.
    ///
    /// # Errors
    ///
    /// `NotFound` if the unit does not exist, `InvalidInput` for a zero
    /// coefficient or a scale that does not fit.
    pub async fn update_scale(&self, id: UnitId, scale: UnitScale) -> RepositoryResult<Unit> {
        let scale = fit_scale(scale)?;
        let model = fetch::<units::Entity, _>(&self.db, "unit", id.into_inner()).await?;
        let mut active: units::ActiveModel = model.into();
        active.coeff = Set(scale.coeff);
        active.constant = Set(scale.constant);
        let model = active.update(&self.db).await?;
        Ok(to_domain(model))
    }

    /// Deletes a unit.
    ///
    /// Fact rows in the unit keep their values with the unit cleared, and
    /// units converting into it become default units.
    ///
    /// # Errors
    ///
    /// `NotFound` if the unit does not exist.
    pub async fn delete(&self, id: UnitId) -> RepositoryResult<()> {
        let txn = self.db.begin().await?;
        fetch::<units::Entity, _>(&txn, "unit", id.into_inner()).await?;

        let rows = observations::Entity::find()
            .filter(observations::Column::UnitId.eq(id.into_inner()))
            .all(&txn)
            .await?;
        let detached = rekey(&txn, rows, |o| o.detail.clear_unit()).await?;

        units::Entity::update_many()
            .col_expr(units::Column::DefaultUnitId, Expr::value(Option::<uuid::Uuid>::None))
            .filter(units::Column::DefaultUnitId.eq(id.into_inner()))
            .exec(&txn)
            .await?;
        units::Entity::delete_by_id(id.into_inner()).exec(&txn).await?;
        txn.commit().await?;

        tracing::debug!(%id, detached, "deleted unit");
        Ok(())
    }

    /// Converts between two units without checking they share a default.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown unit, `Arithmetic` for a zero target
    /// coefficient.
    pub async fn convert(&self, from: UnitId, value: Decimal, to: UnitId) -> RepositoryResult<Decimal> {
        let (source, target) = (self.get(from).await?, self.get(to).await?);
        Ok(source.convert(value, &target)?)
    }

    /// Converts between two units that resolve to the same default unit,
    /// through every hop of their chains.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the defaults differ or the chain loops, plus the
    /// errors of [`Self::convert`].
    pub async fn convert_checked(
        &self,
        from: UnitId,
        value: Decimal,
        to: UnitId,
    ) -> RepositoryResult<Decimal> {
        Ok(self.basis().await?.convert_checked(from, value, to)?)
    }
}

/// Rounds to the stored precision, then validates what would be stored.
fn fit_scale(scale: UnitScale) -> Result<UnitScale, DomainError> {
    let stored = UnitScale {
        coeff: limits::UNIT_SCALE.fit_opt("coeff", scale.coeff)?,
        constant: limits::UNIT_SCALE.fit_opt("const", scale.constant)?,
    };
    stored.validate()?;
    Ok(stored)
}

fn to_domain(model: units::Model) -> Unit {
    Unit {
        id: UnitId::from(model.id),
        name: model.name,
        default_unit: model.default_unit_id.map(UnitId::from),
        scale: UnitScale {
            coeff: model.coeff,
            constant: model.constant,
        },
    }
}
