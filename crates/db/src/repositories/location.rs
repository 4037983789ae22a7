//! Location repository.
//!
//! Locations form two independent structures: a parent tree and a
//! composite-membership relation. Neither is guaranteed acyclic in storage,
//! so both are walked in memory through the cycle-safe arenas of
//! `esg_core::hierarchy`.

use std::collections::BTreeSet;

use esg_core::DomainError;
use esg_core::hierarchy::{Ancestry, Composition, Hierarchy};
use esg_core::limits;
use esg_core::vocab::LocationType;
use esg_shared::types::{CurrencyId, LocationId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Set,
};

use super::{duplicate, fetch, require};
use crate::entities::{currencies, location_components, locations};
use crate::error::{RepositoryResult, on_write};

/// Input for creating a location.
#[derive(Debug, Clone, Default)]
pub struct CreateLocationInput {
    /// Unique name.
    pub name: String,
    /// Enclosing location.
    pub parent: Option<LocationId>,
    /// Short code, e.g. an ISO country code.
    pub code: Option<String>,
    /// Local currency.
    pub currency: Option<CurrencyId>,
    /// Kind of location.
    pub loctype: LocationType,
}

impl CreateLocationInput {
    /// A country with no parent, code or currency.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the parent.
    #[must_use]
    pub const fn within(mut self, parent: LocationId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Sets the kind.
    #[must_use]
    pub const fn of_type(mut self, loctype: LocationType) -> Self {
        self.loctype = loctype;
        self
    }
}

/// Location repository.
#[derive(Debug, Clone)]
pub struct LocationRepository {
    db: DatabaseConnection,
}

impl LocationRepository {
    /// Creates a new location repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a location.
    ///
    /// # Errors
    ///
    /// - `ConstraintViolation` if the name is taken
    /// - `MissingRequiredReference` for an unknown parent or currency
    /// - `InvalidInput` for a bad name or code
    pub async fn create(&self, input: CreateLocationInput) -> RepositoryResult<locations::Model> {
        limits::check_name("location name", &input.name)?;
        limits::check_len_opt("code", input.code.as_deref(), limits::CODE_LEN)?;

        let taken = locations::Entity::find()
            .filter(locations::Column::Name.eq(input.name.as_str()))
            .count(&self.db)
            .await?;
        if taken > 0 {
            return Err(duplicate("location", format!("name={}", input.name)));
        }
        if let Some(parent) = input.parent {
            require::<locations::Entity, _>(&self.db, "location", parent.into_inner()).await?;
        }
        if let Some(currency) = input.currency {
            require::<currencies::Entity, _>(&self.db, "currency", currency.into_inner()).await?;
        }

        let location = locations::ActiveModel {
            id: Set(LocationId::new().into_inner()),
            name: Set(input.name),
            parent_id: Set(input.parent.map(LocationId::into_inner)),
            code: Set(input.code),
            currency_id: Set(input.currency.map(CurrencyId::into_inner)),
            loctype: Set(input.loctype.as_str().to_string()),
        }
        .insert(&self.db)
        .await
        .map_err(on_write("location"))?;

        tracing::debug!(id = %location.id, name = %location.name, "created location");
        Ok(location)
    }

    /// Gets a location by ID.
    ///
    /// # Errors
    ///
    /// `NotFound` if the location does not exist.
    pub async fn get(&self, id: LocationId) -> RepositoryResult<locations::Model> {
        fetch::<locations::Entity, _>(&self.db, "location", id.into_inner()).await
    }

    /// Kind of a location, checked against the vocabulary.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown location, `InvalidEnumValue` if the stored
    /// code is not a known kind.
    pub async fn loctype(&self, id: LocationId) -> RepositoryResult<LocationType> {
        Ok(self.get(id).await?.loctype.parse()?)
    }

    /// Moves a location under a new parent, or makes it a root.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the location does not exist
    /// - `MissingRequiredReference` for an unknown parent
    /// - `InvalidInput` if the move would make the location its own ancestor
    pub async fn set_parent(
        &self,
        id: LocationId,
        parent: Option<LocationId>,
    ) -> RepositoryResult<locations::Model> {
        let model = self.get(id).await?;
        if let Some(parent) = parent {
            require::<locations::Entity, _>(&self.db, "location", parent.into_inner()).await?;
            if self.tree().await?.would_cycle(id, parent) {
                tracing::warn!(%id, %parent, "rejected looping location parent");
                return Err(DomainError::InvalidInput(format!(
                    "location {parent} is already below {id}"
                ))
                .into());
            }
        }

        let mut active: locations::ActiveModel = model.into();
        active.parent_id = Set(parent.map(LocationId::into_inner));
        active.update(&self.db).await.map_err(on_write("location"))
    }

    /// The parent tree over every location.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn tree(&self) -> RepositoryResult<Hierarchy<LocationId>> {
        let rows: Vec<(uuid::Uuid, Option<uuid::Uuid>)> = locations::Entity::find()
            .select_only()
            .column(locations::Column::Id)
            .column(locations::Column::ParentId)
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(id, parent)| (LocationId::from(id), parent.map(LocationId::from)))
            .collect())
    }

    /// The location followed by its ancestors, nearest first.
    ///
    /// Stops at the first repeated location if the stored parents loop.
    ///
    /// # Errors
    ///
    /// `NotFound` if the location does not exist.
    pub async fn ancestors(&self, id: LocationId) -> RepositoryResult<Ancestry<LocationId>> {
        self.get(id).await?;
        let ancestry = self.tree().await?.ancestors(id);
        if let Some(at) = ancestry.cycle_at {
            tracing::warn!(%id, cycle_at = %at, "location parents loop");
        }
        Ok(ancestry)
    }

    /// Records that `composite` is made up of, among others, `member`.
    ///
    /// # Errors
    ///
    /// - `MissingRequiredReference` if either location does not exist
    /// - `InvalidInput` if both are the same location
    /// - `ConstraintViolation` if the membership already exists
    pub async fn add_component(&self, composite: LocationId, member: LocationId) -> RepositoryResult<()> {
        if composite == member {
            return Err(DomainError::InvalidInput(format!(
                "location {composite} cannot be its own component"
            ))
            .into());
        }
        require::<locations::Entity, _>(&self.db, "location", composite.into_inner()).await?;
        require::<locations::Entity, _>(&self.db, "location", member.into_inner()).await?;

        let existing = location_components::Entity::find()
            .filter(location_components::Column::LocationId.eq(composite.into_inner()))
            .filter(location_components::Column::ComponentId.eq(member.into_inner()))
            .count(&self.db)
            .await?;
        if existing > 0 {
            return Err(duplicate(
                "location_component",
                format!("location={composite}, component={member}"),
            ));
        }

        location_components::ActiveModel {
            location_id: Set(composite.into_inner()),
            component_id: Set(member.into_inner()),
        }
        .insert(&self.db)
        .await
        .map_err(on_write("location_component"))?;
        Ok(())
    }

    /// Drops a membership. Returns false if it was not recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn remove_component(&self, composite: LocationId, member: LocationId) -> RepositoryResult<bool> {
        let result = location_components::Entity::delete_many()
            .filter(location_components::Column::LocationId.eq(composite.into_inner()))
            .filter(location_components::Column::ComponentId.eq(member.into_inner()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Direct members of a composite location.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn components(&self, composite: LocationId) -> RepositoryResult<BTreeSet<LocationId>> {
        Ok(self.composition().await?.components(composite))
    }

    /// Every location reachable through nested memberships.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn expand_components(&self, composite: LocationId) -> RepositoryResult<BTreeSet<LocationId>> {
        Ok(self.composition().await?.expand(composite))
    }

    async fn composition(&self) -> RepositoryResult<Composition<LocationId>> {
        Ok(location_components::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| (LocationId::from(row.location_id), LocationId::from(row.component_id)))
            .collect())
    }

    /// Deletes a location. Its fact rows and memberships go with it;
    /// children become roots.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete(&self, id: LocationId) -> RepositoryResult<bool> {
        let result = locations::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
