//! Taxonomy repository.
//!
//! Each taxonomy level is its own table. Nodes are addressed by
//! `(level, id)` and chains are resolved upward one level at a time.

use std::collections::HashMap;

use esg_core::DomainError;
use esg_core::limits;
use esg_core::taxonomy::{TaxonomyLevel, TaxonomyNode, TaxonomyPath, TaxonomyScheme, resolve_path};
use esg_shared::types::FirmId;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use super::fetch;
use super::firm::classification_of;
use crate::entities::{
    cdp_activities, cdp_industries, cdp_sectors, firms, industries, sectors, sub_industries,
    sub_sectors,
};
use crate::error::{RepositoryError, RepositoryResult, on_write};

/// Taxonomy repository.
#[derive(Debug, Clone)]
pub struct TaxonomyRepository {
    db: DatabaseConnection,
}

impl TaxonomyRepository {
    /// Creates a new taxonomy repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a node at `level`, optionally under a node of the level above.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a bad name or a parent on a root level
    /// - `MissingRequiredReference` if the parent does not exist at the
    ///   level above
    pub async fn create_node(
        &self,
        level: TaxonomyLevel,
        name: &str,
        parent: Option<Uuid>,
    ) -> RepositoryResult<TaxonomyNode> {
        limits::check_name(level.as_str(), name)?;
        if let Some(parent_id) = parent {
            let Some(parent_level) = level.parent_level() else {
                return Err(DomainError::InvalidInput(format!(
                    "{level} is a root level and takes no parent"
                ))
                .into());
            };
            if self.node(parent_level, parent_id).await?.is_none() {
                return Err(DomainError::MissingRequiredReference {
                    entity: parent_level.as_str(),
                    detail: parent_id.to_string(),
                }
                .into());
            }
        }

        let node = TaxonomyNode {
            id: Uuid::now_v7(),
            level,
            name: name.to_string(),
            parent,
        };
        self.insert(&node).await?;
        tracing::debug!(%level, id = %node.id, name, "created taxonomy node");
        Ok(node)
    }

    async fn insert(&self, node: &TaxonomyNode) -> RepositoryResult<()> {
        let (id, name, parent) = (Set(node.id), Set(node.name.clone()), Set(node.parent));
        let db = &self.db;
        let written = match node.level {
            TaxonomyLevel::Sector => sectors::ActiveModel { id, name }.insert(db).await.map(|_| ()),
            TaxonomyLevel::SubSector => sub_sectors::ActiveModel {
                id,
                name,
                parent_id: parent,
            }
            .insert(db)
            .await
            .map(|_| ()),
            TaxonomyLevel::Industry => industries::ActiveModel {
                id,
                name,
                parent_id: parent,
            }
            .insert(db)
            .await
            .map(|_| ()),
            TaxonomyLevel::SubIndustry => sub_industries::ActiveModel {
                id,
                name,
                parent_id: parent,
            }
            .insert(db)
            .await
            .map(|_| ()),
            TaxonomyLevel::CdpIndustry => cdp_industries::ActiveModel { id, name }
                .insert(db)
                .await
                .map(|_| ()),
            TaxonomyLevel::CdpSector => cdp_sectors::ActiveModel {
                id,
                name,
                parent_id: parent,
            }
            .insert(db)
            .await
            .map(|_| ()),
            TaxonomyLevel::CdpActivity => cdp_activities::ActiveModel {
                id,
                name,
                parent_id: parent,
            }
            .insert(db)
            .await
            .map(|_| ()),
        };
        written.map_err(on_write(node.level.as_str()))
    }

    /// Looks up a node of `level`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn node(&self, level: TaxonomyLevel, id: Uuid) -> RepositoryResult<Option<TaxonomyNode>> {
        let db = &self.db;
        let found = match level {
            TaxonomyLevel::Sector => sectors::Entity::find_by_id(id)
                .one(db)
                .await?
                .map(|m| (m.name, None)),
            TaxonomyLevel::SubSector => sub_sectors::Entity::find_by_id(id)
                .one(db)
                .await?
                .map(|m| (m.name, m.parent_id)),
            TaxonomyLevel::Industry => industries::Entity::find_by_id(id)
                .one(db)
                .await?
                .map(|m| (m.name, m.parent_id)),
            TaxonomyLevel::SubIndustry => sub_industries::Entity::find_by_id(id)
                .one(db)
                .await?
                .map(|m| (m.name, m.parent_id)),
            TaxonomyLevel::CdpIndustry => cdp_industries::Entity::find_by_id(id)
                .one(db)
                .await?
                .map(|m| (m.name, None)),
            TaxonomyLevel::CdpSector => cdp_sectors::Entity::find_by_id(id)
                .one(db)
                .await?
                .map(|m| (m.name, m.parent_id)),
            TaxonomyLevel::CdpActivity => cdp_activities::Entity::find_by_id(id)
                .one(db)
                .await?
                .map(|m| (m.name, m.parent_id)),
        };
        Ok(found.map(|(name, parent)| TaxonomyNode {
            id,
            level,
            name,
            parent,
        }))
    }

    /// The chain from a node up to the root of its scheme, most specific
    /// first. An unlinked parent ends the chain early.
    ///
    /// # Errors
    ///
    /// `NotFound` if the starting node does not exist.
    pub async fn chain(&self, level: TaxonomyLevel, id: Uuid) -> RepositoryResult<TaxonomyPath> {
        let start = self
            .node(level, id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(level.as_str(), id))?;

        // Each step moves one level up, so this runs at most depth times.
        let mut fetched = HashMap::new();
        let mut cursor = (start.level.parent_level(), start.parent);
        while let (Some(parent_level), Some(parent_id)) = cursor {
            let Some(parent) = self.node(parent_level, parent_id).await? else {
                break;
            };
            cursor = (parent.level.parent_level(), parent.parent);
            fetched.insert((parent_level, parent_id), parent);
        }

        Ok(resolve_path(start, |level, id| fetched.remove(&(level, id)))?)
    }

    /// A firm's chain in `scheme`, starting at the deepest level it
    /// references. `None` if it references no level of the scheme.
    ///
    /// # Errors
    ///
    /// `NotFound` if the firm or its referenced node does not exist.
    pub async fn firm_chain(
        &self,
        firm: FirmId,
        scheme: TaxonomyScheme,
    ) -> RepositoryResult<Option<TaxonomyPath>> {
        let model = fetch::<firms::Entity, _>(&self.db, "firm", firm.into_inner()).await?;
        let Some((level, id)) = classification_of(&model).most_specific(scheme) else {
            return Ok(None);
        };
        self.chain(level, id).await.map(Some)
    }
}
