//! Disclosure source repository.

use esg_core::limits;
use esg_shared::types::SourceId;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait};

use super::fetch;
use super::observation::rekey;
use crate::entities::{observations, sources};
use crate::error::{RepositoryResult, on_write};

/// Source repository.
#[derive(Debug, Clone)]
pub struct SourceRepository {
    db: DatabaseConnection,
}

impl SourceRepository {
    /// Creates a new source repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a source.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty name or over-long text.
    pub async fn create(
        &self,
        name: &str,
        url: Option<&str>,
        description: Option<&str>,
    ) -> RepositoryResult<sources::Model> {
        limits::check_name("source name", name)?;
        limits::check_len_opt("url", url, limits::DESCRIPTION_LEN)?;
        limits::check_len_opt("description", description, limits::DESCRIPTION_LEN)?;

        let source = sources::ActiveModel {
            id: Set(SourceId::new().into_inner()),
            name: Set(name.to_string()),
            url: Set(url.map(str::to_string)),
            description: Set(description.map(str::to_string)),
        }
        .insert(&self.db)
        .await
        .map_err(on_write("source"))?;

        tracing::debug!(id = %source.id, name, "created source");
        Ok(source)
    }

    /// Gets a source by ID.
    ///
    /// # Errors
    ///
    /// `NotFound` if the source does not exist.
    pub async fn get(&self, id: SourceId) -> RepositoryResult<sources::Model> {
        fetch::<sources::Entity, _>(&self.db, "source", id.into_inner()).await
    }

    /// All sources, by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> RepositoryResult<Vec<sources::Model>> {
        Ok(sources::Entity::find()
            .order_by_asc(sources::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Deletes a source. Fact rows citing it keep everything but the source.
    ///
    /// # Errors
    ///
    /// `NotFound` if the source does not exist.
    pub async fn delete(&self, id: SourceId) -> RepositoryResult<()> {
        let txn = self.db.begin().await?;
        fetch::<sources::Entity, _>(&txn, "source", id.into_inner()).await?;

        let rows = observations::Entity::find()
            .filter(observations::Column::SourceId.eq(id.into_inner()))
            .all(&txn)
            .await?;
        let detached = rekey(&txn, rows, |o| o.source = None).await?;

        sources::Entity::delete_by_id(id.into_inner()).exec(&txn).await?;
        txn.commit().await?;

        tracing::debug!(%id, detached, "deleted source");
        Ok(())
    }
}
