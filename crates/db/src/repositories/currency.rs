//! Currency repository.

use chrono::{DateTime, SubsecRound, Utc};
use esg_core::currency::Currency;
use esg_core::limits;
use esg_shared::types::CurrencyId;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use super::fetch;
use crate::entities::currencies;
use crate::error::{RepositoryResult, on_write};

/// Currency repository.
#[derive(Debug, Clone)]
pub struct CurrencyRepository {
    db: DatabaseConnection,
}

impl CurrencyRepository {
    /// Creates a new currency repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a currency without a rate.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty or over-long name.
    pub async fn create(&self, name: &str) -> RepositoryResult<Currency> {
        limits::check_name("currency name", name)?;
        let currency = Currency::new(name);
        currencies::ActiveModel {
            id: Set(currency.id.into_inner()),
            name: Set(currency.name.clone()),
            conversion_rate: Set(None),
            last_update: Set(None),
        }
        .insert(&self.db)
        .await
        .map_err(on_write("currency"))?;

        tracing::debug!(id = %currency.id, name, "created currency");
        Ok(currency)
    }

    /// Gets a currency by ID.
    ///
    /// # Errors
    ///
    /// `NotFound` if the currency does not exist.
    pub async fn get(&self, id: CurrencyId) -> RepositoryResult<Currency> {
        let model = fetch::<currencies::Entity, _>(&self.db, "currency", id.into_inner()).await?;
        Ok(to_domain(model))
    }

    /// All currencies, by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> RepositoryResult<Vec<Currency>> {
        Ok(currencies::Entity::find()
            .order_by_asc(currencies::Column::Name)
            .all(&self.db)
            .await?
            .into_iter()
            .map(to_domain)
            .collect())
    }

    /// Stores a new rate against the base currency and stamps `last_update`.
    ///
    /// # Errors
    ///
    /// `NotFound` if the currency does not exist, `InvalidInput` if the rate
    /// does not fit the stored precision.
    pub async fn set_rate(
        &self,
        id: CurrencyId,
        rate: Decimal,
        at: DateTime<Utc>,
    ) -> RepositoryResult<Currency> {
        let rate = limits::CONVERSION_RATE.fit("conversion_rate", rate)?;
        let model = fetch::<currencies::Entity, _>(&self.db, "currency", id.into_inner()).await?;

        let mut active: currencies::ActiveModel = model.into();
        active.conversion_rate = Set(Some(rate));
        active.last_update = Set(Some(at.trunc_subsecs(6)));
        let model = active.update(&self.db).await?;

        tracing::debug!(%id, %rate, "updated conversion rate");
        Ok(to_domain(model))
    }

    /// Converts an amount in a currency to the base currency.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown currency, `MissingRequiredReference` when
    /// its rate is unset.
    pub async fn to_base(&self, id: CurrencyId, amount: Decimal) -> RepositoryResult<Decimal> {
        Ok(self.get(id).await?.to_base(amount)?)
    }

    /// Converts an amount between two currencies through the base.
    ///
    /// # Errors
    ///
    /// As [`Self::to_base`], plus `Arithmetic` for a zero target rate.
    pub async fn convert(
        &self,
        from: CurrencyId,
        amount: Decimal,
        to: CurrencyId,
    ) -> RepositoryResult<Decimal> {
        let (source, target) = (self.get(from).await?, self.get(to).await?);
        Ok(source.convert(amount, &target)?)
    }
}

fn to_domain(model: currencies::Model) -> Currency {
    Currency {
        id: CurrencyId::from(model.id),
        name: model.name,
        conversion_rate: model.conversion_rate,
        last_update: model.last_update,
    }
}
