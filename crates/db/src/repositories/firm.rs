//! Firm repository, including the firm's ISINs and tickers.

use chrono::{DateTime, SubsecRound, Utc};
use esg_core::DomainError;
use esg_core::identifiers::{self, IsinRecord, Ticker};
use esg_core::limits;
use esg_core::observation::FirmCoverage;
use esg_core::taxonomy::{FirmClassification, TaxonomyLevel};
use esg_core::vocab::ObservationKind;
use esg_shared::types::{CurrencyId, FirmId, IsinId, LocationId, TickerId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::{TaxonomyRepository, duplicate, fetch, require};
use crate::entities::{currencies, firms, isins, locations, observations, targets, tickers};
use crate::error::{RepositoryResult, on_write};

/// Input for creating a firm.
#[derive(Debug, Clone, Default)]
pub struct CreateFirmInput {
    /// Unique name.
    pub name: String,
    /// Headquarters.
    pub hq_location: Option<LocationId>,
    /// Reporting currency.
    pub currency: Option<CurrencyId>,
    /// External account number.
    pub account_number: Option<i32>,
    /// Website.
    pub site: Option<String>,
}

impl CreateFirmInput {
    /// A firm with nothing but a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Firm repository.
#[derive(Debug, Clone)]
pub struct FirmRepository {
    db: DatabaseConnection,
}

impl FirmRepository {
    /// Creates a new firm repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a firm with every flag false and no classification.
    ///
    /// # Errors
    ///
    /// - `ConstraintViolation` if the name is taken
    /// - `MissingRequiredReference` for an unknown location or currency
    /// - `InvalidInput` for a bad name or site
    pub async fn create(&self, input: CreateFirmInput) -> RepositoryResult<firms::Model> {
        limits::check_name("firm name", &input.name)?;
        limits::check_len_opt("site", input.site.as_deref(), limits::SITE_LEN)?;
        if self.find_by_name(&input.name).await?.is_some() {
            return Err(duplicate("firm", format!("name={}", input.name)));
        }
        if let Some(location) = input.hq_location {
            require::<locations::Entity, _>(&self.db, "location", location.into_inner()).await?;
        }
        if let Some(currency) = input.currency {
            require::<currencies::Entity, _>(&self.db, "currency", currency.into_inner()).await?;
        }

        let firm = firms::ActiveModel {
            id: Set(FirmId::new().into_inner()),
            name: Set(input.name),
            hq_location_id: Set(input.hq_location.map(LocationId::into_inner)),
            account_number: Set(input.account_number),
            sector_id: Set(None),
            sub_sector_id: Set(None),
            industry_id: Set(None),
            sub_industry_id: Set(None),
            cdp_industry_id: Set(None),
            cdp_sector_id: Set(None),
            cdp_activity_id: Set(None),
            currency_id: Set(input.currency.map(CurrencyId::into_inner)),
            has_scope1: Set(false),
            has_scope2: Set(false),
            has_scope3: Set(false),
            has_targets: Set(false),
            site: Set(input.site),
        }
        .insert(&self.db)
        .await
        .map_err(on_write("firm"))?;

        tracing::debug!(id = %firm.id, name = %firm.name, "created firm");
        Ok(firm)
    }

    /// Gets a firm by ID.
    ///
    /// # Errors
    ///
    /// `NotFound` if the firm does not exist.
    pub async fn get(&self, id: FirmId) -> RepositoryResult<firms::Model> {
        fetch::<firms::Entity, _>(&self.db, "firm", id.into_inner()).await
    }

    /// Finds a firm by its unique name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<firms::Model>> {
        Ok(firms::Entity::find()
            .filter(firms::Column::Name.eq(name))
            .one(&self.db)
            .await?)
    }

    /// The firm's taxonomy references.
    ///
    /// # Errors
    ///
    /// `NotFound` if the firm does not exist.
    pub async fn classification(&self, id: FirmId) -> RepositoryResult<FirmClassification> {
        Ok(classification_of(&self.get(id).await?))
    }

    /// Replaces every taxonomy reference of a firm.
    ///
    /// The two schemes are not checked against each other, and a level need
    /// not agree with the level above it.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown firm, `MissingRequiredReference` for a
    /// reference to a node that does not exist at its level.
    pub async fn set_classification(
        &self,
        id: FirmId,
        classification: FirmClassification,
    ) -> RepositoryResult<firms::Model> {
        let model = self.get(id).await?;
        let taxonomy = TaxonomyRepository::new(self.db.clone());
        for level in ALL_LEVELS {
            let Some(node) = classification.get(level) else {
                continue;
            };
            if taxonomy.node(level, node).await?.is_none() {
                return Err(DomainError::MissingRequiredReference {
                    entity: level.as_str(),
                    detail: node.to_string(),
                }
                .into());
            }
        }

        let mut active: firms::ActiveModel = model.into();
        active.sector_id = Set(classification.sector);
        active.sub_sector_id = Set(classification.subsector);
        active.industry_id = Set(classification.industry);
        active.sub_industry_id = Set(classification.subindustry);
        active.cdp_industry_id = Set(classification.cdp_industry);
        active.cdp_sector_id = Set(classification.cdp_sector);
        active.cdp_activity_id = Set(classification.cdp_activity);
        Ok(active.update(&self.db).await?)
    }

    /// Records an ISIN for a firm.
    ///
    /// # Errors
    ///
    /// - `ConstraintViolation` if any firm already holds the ISIN
    /// - `MissingRequiredReference` if the firm does not exist
    /// - `InvalidInput` for an empty or over-long ISIN
    pub async fn add_isin(
        &self,
        firm: FirmId,
        name: &str,
        last_used: DateTime<Utc>,
    ) -> RepositoryResult<IsinRecord> {
        let record = IsinRecord::new(name, firm, last_used.trunc_subsecs(6))?;
        require::<firms::Entity, _>(&self.db, "firm", firm.into_inner()).await?;
        let taken = isins::Entity::find()
            .filter(isins::Column::Name.eq(name))
            .count(&self.db)
            .await?;
        if taken > 0 {
            return Err(duplicate("isin", format!("name={name}")));
        }

        isins::ActiveModel {
            id: Set(record.id.into_inner()),
            name: Set(record.name.clone()),
            firm_id: Set(firm.into_inner()),
            last_used: Set(record.last_used),
        }
        .insert(&self.db)
        .await
        .map_err(on_write("isin"))?;

        tracing::debug!(%firm, isin = name, "added isin");
        Ok(record)
    }

    /// A firm's ISINs, most recently used first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn isins(&self, firm: FirmId) -> RepositoryResult<Vec<IsinRecord>> {
        Ok(isins::Entity::find()
            .filter(isins::Column::FirmId.eq(firm.into_inner()))
            .order_by_desc(isins::Column::LastUsed)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| IsinRecord {
                id: IsinId::from(m.id),
                name: m.name,
                firm: FirmId::from(m.firm_id),
                last_used: m.last_used,
            })
            .collect())
    }

    /// The firm's current ISIN: the one with the latest `last_used`.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown firm, `MissingRequiredReference` if the
    /// firm has no ISIN.
    pub async fn current_isin(&self, firm: FirmId) -> RepositoryResult<IsinRecord> {
        let model = self.get(firm).await?;
        let records = self.isins(firm).await?;
        Ok(identifiers::current_isin(&model.name, &records)?.clone())
    }

    /// Records a ticker, optionally tied to a firm.
    ///
    /// # Errors
    ///
    /// - `ConstraintViolation` if the same name is already recorded for the
    ///   same firm (or for no firm)
    /// - `MissingRequiredReference` if the firm does not exist
    pub async fn add_ticker(&self, name: &str, firm: Option<FirmId>) -> RepositoryResult<Ticker> {
        limits::check_name("ticker", name)?;
        if let Some(firm) = firm {
            require::<firms::Entity, _>(&self.db, "firm", firm.into_inner()).await?;
        }

        let same_firm = match firm {
            Some(firm) => tickers::Column::FirmId.eq(firm.into_inner()),
            None => tickers::Column::FirmId.is_null(),
        };
        let taken = tickers::Entity::find()
            .filter(
                Condition::all()
                    .add(tickers::Column::Name.eq(name))
                    .add(same_firm),
            )
            .count(&self.db)
            .await?;
        if taken > 0 {
            let owner = firm.map_or_else(|| "none".to_string(), |f| f.to_string());
            return Err(duplicate("ticker", format!("name={name}, firm={owner}")));
        }

        let ticker = Ticker {
            id: TickerId::new(),
            name: name.to_string(),
            firm,
        };
        tickers::ActiveModel {
            id: Set(ticker.id.into_inner()),
            name: Set(ticker.name.clone()),
            firm_id: Set(firm.map(FirmId::into_inner)),
        }
        .insert(&self.db)
        .await
        .map_err(on_write("ticker"))?;
        Ok(ticker)
    }

    /// A firm's tickers, by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn tickers(&self, firm: FirmId) -> RepositoryResult<Vec<Ticker>> {
        Ok(tickers::Entity::find()
            .filter(tickers::Column::FirmId.eq(firm.into_inner()))
            .order_by_asc(tickers::Column::Name)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| Ticker {
                id: TickerId::from(m.id),
                name: m.name,
                firm: m.firm_id.map(FirmId::from),
            })
            .collect())
    }

    /// Recomputes `has_scope1/2/3` and `has_targets` from the firm's rows
    /// and stores them.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown firm; `InvalidEnumValue` if a stored row
    /// kind is not recognised.
    pub async fn refresh_coverage_flags(&self, id: FirmId) -> RepositoryResult<FirmCoverage> {
        let model = self.get(id).await?;
        let kinds: Vec<String> = observations::Entity::find()
            .select_only()
            .column(observations::Column::Kind)
            .distinct()
            .filter(observations::Column::FirmId.eq(id.into_inner()))
            .into_tuple()
            .all(&self.db)
            .await?;
        let kinds = kinds
            .iter()
            .map(|k| k.parse::<ObservationKind>())
            .collect::<Result<Vec<_>, _>>()?;
        let target_count = targets::Entity::find()
            .filter(targets::Column::FirmId.eq(id.into_inner()))
            .count(&self.db)
            .await?;
        let coverage = FirmCoverage::from_kinds(kinds, target_count > 0);

        let mut active: firms::ActiveModel = model.into();
        active.has_scope1 = Set(coverage.has_scope1);
        active.has_scope2 = Set(coverage.has_scope2);
        active.has_scope3 = Set(coverage.has_scope3);
        active.has_targets = Set(coverage.has_targets);
        active.update(&self.db).await?;

        tracing::debug!(%id, ?coverage, "refreshed coverage flags");
        Ok(coverage)
    }

    /// Deletes a firm with its identifiers, targets and fact rows. Tickers
    /// stay, detached.
    ///
    /// A ticker whose name is already held by a detached ticker is merged
    /// into it, so detached names stay unique.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete(&self, id: FirmId) -> RepositoryResult<bool> {
        let txn = self.db.begin().await?;

        let names: Vec<String> = tickers::Entity::find()
            .select_only()
            .column(tickers::Column::Name)
            .filter(tickers::Column::FirmId.eq(id.into_inner()))
            .into_tuple()
            .all(&txn)
            .await?;
        let clashing: Vec<String> = if names.is_empty() {
            Vec::new()
        } else {
            tickers::Entity::find()
                .select_only()
                .column(tickers::Column::Name)
                .filter(tickers::Column::FirmId.is_null())
                .filter(tickers::Column::Name.is_in(names))
                .into_tuple()
                .all(&txn)
                .await?
        };
        let merged = if clashing.is_empty() {
            0
        } else {
            tickers::Entity::delete_many()
                .filter(tickers::Column::FirmId.eq(id.into_inner()))
                .filter(tickers::Column::Name.is_in(clashing))
                .exec(&txn)
                .await?
                .rows_affected
        };

        let result = firms::Entity::delete_by_id(id.into_inner())
            .exec(&txn)
            .await?;
        txn.commit().await?;

        tracing::debug!(%id, merged, "deleted firm");
        Ok(result.rows_affected > 0)
    }
}

const ALL_LEVELS: [TaxonomyLevel; 7] = [
    TaxonomyLevel::Sector,
    TaxonomyLevel::SubSector,
    TaxonomyLevel::Industry,
    TaxonomyLevel::SubIndustry,
    TaxonomyLevel::CdpIndustry,
    TaxonomyLevel::CdpSector,
    TaxonomyLevel::CdpActivity,
];

/// Taxonomy references stored on a firm row.
pub(crate) const fn classification_of(model: &firms::Model) -> FirmClassification {
    FirmClassification {
        sector: model.sector_id,
        subsector: model.sub_sector_id,
        industry: model.industry_id,
        subindustry: model.sub_industry_id,
        cdp_industry: model.cdp_industry_id,
        cdp_sector: model.cdp_sector_id,
        cdp_activity: model.cdp_activity_id,
    }
}
