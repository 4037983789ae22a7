//! Observation repository.
//!
//! Every fact kind lives in the `observations` table. A row's `dedup_key`
//! holds the fingerprint of its kind's key tuple; the unique index on it is
//! what settles two concurrent writers of the same tuple.

use chrono::{DateTime, Utc};
use esg_core::observation::{
    KeyField, KeyPart, Measurement, Observation, ObservationDetail, Revision, Scope3Detail,
    recompute_recency,
};
use esg_core::vocab::{DataType, ObservationKind, Scope2Scheme};
use esg_core::DomainError;
use esg_shared::types::{
    CurrencyId, FirmId, LocationId, MetricId, ObservationId, PageRequest, PageResponse, SourceId,
    UnitId,
};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::{UnitRepository, duplicate, fetch, require};
use crate::entities::{currencies, firms, locations, metric_units, metrics, observations, sources, units};
use crate::error::{RepositoryResult, on_write};

/// Filter for [`ObservationRepository::list`]. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct ObservationFilter {
    /// Reporting firm.
    pub firm: Option<FirmId>,
    /// Fact kind.
    pub kind: Option<ObservationKind>,
    /// Metric.
    pub metric: Option<MetricId>,
    /// Location.
    pub location: Option<LocationId>,
    /// Earliest date, inclusive.
    pub from: Option<DateTime<Utc>>,
    /// Latest date, inclusive.
    pub until: Option<DateTime<Utc>>,
    /// Only rows flagged `most_recent`.
    pub most_recent_only: bool,
    /// Only rows flagged `last_available`.
    pub last_available_only: bool,
}

impl ObservationFilter {
    /// Rows of one firm.
    #[must_use]
    pub fn for_firm(firm: FirmId) -> Self {
        Self {
            firm: Some(firm),
            ..Self::default()
        }
    }

    fn condition(&self) -> Condition {
        use observations::Column;

        Condition::all()
            .add_option(self.firm.map(|f| Column::FirmId.eq(f.into_inner())))
            .add_option(self.kind.map(|k| Column::Kind.eq(k.as_str())))
            .add_option(self.metric.map(|m| Column::MetricId.eq(m.into_inner())))
            .add_option(self.location.map(|l| Column::LocationId.eq(l.into_inner())))
            .add_option(self.from.map(|d| Column::Date.gte(d)))
            .add_option(self.until.map(|d| Column::Date.lte(d)))
            .add_option(self.most_recent_only.then(|| Column::MostRecent.eq(true)))
            .add_option(self.last_available_only.then(|| Column::LastAvailable.eq(true)))
    }
}

/// Observation repository.
#[derive(Debug, Clone)]
pub struct ObservationRepository {
    db: DatabaseConnection,
}

impl ObservationRepository {
    /// Creates a new observation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a fact row.
    ///
    /// Decimals are rounded to their stored precision first and the recency
    /// flags start out false. Every referenced record must exist, and when
    /// the metric lists allowed units the row's unit must be one of them.
    ///
    /// # Errors
    ///
    /// - `ConstraintViolation` if a row with the same key tuple exists
    /// - `MissingRequiredReference` for a dangling reference
    /// - `InvalidInput` for text or decimals that do not fit, or a unit the
    ///   metric does not allow
    pub async fn insert(&self, observation: Observation) -> RepositoryResult<Observation> {
        let mut observation = observation.normalized()?;
        // Flags are derived; see `refresh_recency_flags`.
        observation.most_recent = false;
        observation.last_available = false;
        self.check_references(&observation).await?;

        let key = observation.key();
        let existing = observations::Entity::find()
            .filter(key_condition(&observation))
            .count(&self.db)
            .await?;
        if existing > 0 {
            return Err(duplicate("observation", key.to_string()));
        }

        to_active(&observation, key.fingerprint())
            .insert(&self.db)
            .await
            .map_err(on_write("observation"))?;

        tracing::debug!(id = %observation.id, kind = %observation.kind(), "inserted observation");
        Ok(observation)
    }

    async fn check_references(&self, observation: &Observation) -> RepositoryResult<()> {
        let detail = &observation.detail;
        require::<firms::Entity, _>(&self.db, "firm", observation.firm.into_inner()).await?;
        if let Some(location) = observation.location {
            require::<locations::Entity, _>(&self.db, "location", location.into_inner()).await?;
        }
        if let Some(source) = observation.source {
            require::<sources::Entity, _>(&self.db, "source", source.into_inner()).await?;
        }
        if let ObservationDetail::General {
            currency: Some(currency),
            ..
        } = detail
        {
            require::<currencies::Entity, _>(&self.db, "currency", currency.into_inner()).await?;
        }

        let Some(metric) = detail.metric() else {
            return Ok(());
        };
        require::<metrics::Entity, _>(&self.db, "metric", metric.into_inner()).await?;

        let Some(unit) = detail.unit() else {
            return Ok(());
        };
        require::<units::Entity, _>(&self.db, "unit", unit.into_inner()).await?;

        let allowed: Vec<uuid::Uuid> = metric_units::Entity::find()
            .select_only()
            .column(metric_units::Column::UnitId)
            .filter(metric_units::Column::MetricId.eq(metric.into_inner()))
            .into_tuple()
            .all(&self.db)
            .await?;
        if !allowed.is_empty() && !allowed.contains(&unit.into_inner()) {
            return Err(DomainError::InvalidInput(format!(
                "unit {unit} is not allowed for metric {metric}"
            ))
            .into());
        }
        Ok(())
    }

    /// Gets a row by ID.
    ///
    /// # Errors
    ///
    /// `NotFound` if the row does not exist.
    pub async fn get(&self, id: ObservationId) -> RepositoryResult<Observation> {
        let model =
            fetch::<observations::Entity, _>(&self.db, "observation", id.into_inner()).await?;
        to_domain(&model)
    }

    /// Lists rows matching `filter`, oldest date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: &ObservationFilter,
        page: PageRequest,
    ) -> RepositoryResult<PageResponse<Observation>> {
        let query = observations::Entity::find().filter(filter.condition());
        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_asc(observations::Column::Date)
            .order_by_asc(observations::Column::Id)
            .limit(page.limit())
            .offset(page.offset())
            .all(&self.db)
            .await?;

        let data = rows.iter().map(to_domain).collect::<RepositoryResult<Vec<_>>>()?;
        Ok(PageResponse::new(data, page, total))
    }

    /// Every row of a firm, unpaginated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn for_firm(&self, firm: FirmId) -> RepositoryResult<Vec<Observation>> {
        observations::Entity::find()
            .filter(observations::Column::FirmId.eq(firm.into_inner()))
            .order_by_asc(observations::Column::Date)
            .all(&self.db)
            .await?
            .iter()
            .map(to_domain)
            .collect()
    }

    /// Deletes a row. Returns false if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete(&self, id: ObservationId) -> RepositoryResult<bool> {
        let result = observations::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Recomputes `most_recent` and `last_available` over a firm's rows and
    /// stores the ones that changed. Returns how many rows were updated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn refresh_recency_flags(&self, firm: FirmId) -> RepositoryResult<usize> {
        let rows = self.for_firm(firm).await?;
        let updates = recompute_recency(&rows);
        if updates.is_empty() {
            return Ok(0);
        }

        let txn = self.db.begin().await?;
        for update in &updates {
            observations::Entity::update_many()
                .col_expr(observations::Column::MostRecent, Expr::value(update.most_recent))
                .col_expr(
                    observations::Column::LastAvailable,
                    Expr::value(update.last_available),
                )
                .filter(observations::Column::Id.eq(update.id.into_inner()))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;

        tracing::debug!(%firm, updated = updates.len(), "refreshed recency flags");
        Ok(updates.len())
    }

    /// A row's value expressed in `target`. The stored row is not touched.
    ///
    /// Returns `None` when the row has no value.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the row does not exist
    /// - `MissingRequiredReference` if the row has no unit
    /// - `InvalidInput` if the units do not share a default unit
    /// - `Arithmetic` for a zero target coefficient
    pub async fn converted_value(
        &self,
        id: ObservationId,
        target: UnitId,
    ) -> RepositoryResult<Option<Decimal>> {
        let observation = self.get(id).await?;
        let Some(value) = observation.detail.value() else {
            return Ok(None);
        };
        let from = observation
            .detail
            .unit()
            .ok_or_else(|| DomainError::MissingRequiredReference {
                entity: "unit",
                detail: format!("observation {id} has no unit"),
            })?;

        let basis = UnitRepository::new(self.db.clone()).basis().await?;
        Ok(Some(basis.convert_checked(from, value, target)?))
    }
}

/// Rewrites rows whose referenced record is going away.
///
/// `detach` clears the reference on the domain value; the row's unit and
/// source columns and its `dedup_key` are then written back. A row that now
/// duplicates another row's key keeps a suffixed key so the index still
/// holds.
pub(crate) async fn rekey<C, F>(
    conn: &C,
    rows: Vec<observations::Model>,
    mut detach: F,
) -> RepositoryResult<usize>
where
    C: ConnectionTrait,
    F: FnMut(&mut Observation),
{
    let mut rewritten = 0;
    for row in rows {
        let mut observation = to_domain(&row)?;
        detach(&mut observation);

        let mut key = observation.key().fingerprint();
        let taken = observations::Entity::find()
            .filter(observations::Column::DedupKey.eq(key.as_str()))
            .filter(observations::Column::Id.ne(row.id))
            .count(conn)
            .await?;
        if taken > 0 {
            tracing::warn!(id = %row.id, %key, "detached row duplicates another key tuple");
            key = format!("{key}#{}", row.id);
        }

        let mut active: observations::ActiveModel = row.into();
        active.unit_id = Set(observation.detail.unit().map(UnitId::into_inner));
        active.source_id = Set(observation.source.map(SourceId::into_inner));
        active.dedup_key = Set(key);
        active.update(conn).await?;
        rewritten += 1;
    }
    Ok(rewritten)
}

const fn column_of(field: KeyField) -> observations::Column {
    use observations::Column;

    match field {
        KeyField::Unit => Column::UnitId,
        KeyField::LocationBased => Column::LocationBased,
        KeyField::Metric => Column::MetricId,
        KeyField::Location => Column::LocationId,
        KeyField::Timescale => Column::Timescale,
        KeyField::Date => Column::Date,
        KeyField::Source => Column::SourceId,
        KeyField::PublicationDate => Column::PublicationDate,
        KeyField::Firm => Column::FirmId,
        KeyField::Scheme => Column::Scheme,
        KeyField::Numerator => Column::Numerator,
        KeyField::Denominator => Column::Denominator,
    }
}

fn part_matches(column: observations::Column, part: KeyPart) -> SimpleExpr {
    match part {
        KeyPart::Null => column.is_null(),
        KeyPart::Flag(flag) => column.eq(flag),
        KeyPart::Id(id) => column.eq(id),
        KeyPart::Code(code) => column.eq(code),
        KeyPart::Time(at) => column.eq(at),
    }
}

/// Rows of the same kind whose key parts all match, unset matching unset.
fn key_condition(observation: &Observation) -> Condition {
    observation.key().parts().iter().fold(
        Condition::all().add(observations::Column::Kind.eq(observation.kind().as_str())),
        |cond, (field, part)| cond.add(part_matches(column_of(*field), *part)),
    )
}

fn to_active(observation: &Observation, dedup_key: String) -> observations::ActiveModel {
    let detail = &observation.detail;
    let revision = detail.revision();
    let mut row = observations::ActiveModel {
        id: Set(observation.id.into_inner()),
        kind: Set(observation.kind().as_str().to_string()),
        firm_id: Set(observation.firm.into_inner()),
        date: Set(observation.date),
        location_id: Set(observation.location.map(LocationId::into_inner)),
        source_id: Set(observation.source.map(SourceId::into_inner)),
        timescale: Set(observation.timescale.as_str().to_string()),
        forecast: Set(observation.forecast),
        most_recent: Set(observation.most_recent),
        last_available: Set(observation.last_available),
        publication_date: Set(observation.publication_date),
        metric_id: Set(detail.metric().map(MetricId::into_inner)),
        value: Set(detail.value()),
        unit_id: Set(detail.unit().map(UnitId::into_inner)),
        datatype: Set(detail.measurement().map(|m| m.datatype.as_str().to_string())),
        location_based: Set(detail.location_based()),
        currency_id: Set(None),
        native_currency: Set(None),
        interpolation: Set(revision.map(|r| r.interpolation)),
        amendment: Set(revision.map(|r| r.amendment)),
        scheme: Set(None),
        scope_source: Set(None),
        calculation_method: Set(None),
        scope_source_cleaned: Set(None),
        most_common_scope_source: Set(None),
        scp3_pcnt_from_other_sources: Set(None),
        scp3_most_common_source: Set(None),
        numerator: Set(None),
        denominator: Set(None),
        text_value: Set(None),
        dedup_key: Set(dedup_key),
    };

    match detail {
        ObservationDetail::General {
            currency,
            native_currency,
            ..
        } => {
            row.currency_id = Set(currency.map(CurrencyId::into_inner));
            row.native_currency = Set(*native_currency);
        }
        ObservationDetail::Scope1 { .. } => {}
        ObservationDetail::Scope2 { scheme, .. } => {
            row.scheme = Set(Some(scheme.as_str().to_string()));
        }
        ObservationDetail::Scope3 { detail, .. } => {
            row.scope_source = Set(detail.scope_source.clone());
            row.calculation_method = Set(detail.calculation_method.clone());
            row.scope_source_cleaned = Set(detail.scope_source_cleaned.clone());
            row.most_common_scope_source = Set(Some(detail.most_common_scope_source));
            row.scp3_pcnt_from_other_sources = Set(detail.pcnt_from_other_sources);
            row.scp3_most_common_source = Set(Some(detail.most_common_source));
        }
        ObservationDetail::Intensity {
            numerator,
            denominator,
            ..
        } => {
            row.numerator = Set(Some(numerator.as_str().to_string()));
            row.denominator = Set(Some(denominator.as_str().to_string()));
        }
        ObservationDetail::Qualitative { text, .. } => {
            row.text_value = Set(text.clone());
        }
    }
    row
}

fn metric_of(model: &observations::Model) -> RepositoryResult<MetricId> {
    model.metric_id.map(MetricId::from).ok_or_else(|| {
        DomainError::MissingRequiredReference {
            entity: "metric",
            detail: format!("observation {}", model.id),
        }
        .into()
    })
}

fn measurement_of(model: &observations::Model) -> RepositoryResult<Measurement> {
    let datatype = match model.datatype.as_deref() {
        Some(code) => code.parse()?,
        None => DataType::default(),
    };
    Ok(Measurement {
        metric: metric_of(model)?,
        value: model.value,
        unit: model.unit_id.map(UnitId::from),
        datatype,
        location_based: model.location_based.unwrap_or(false),
    })
}

fn revision_of(model: &observations::Model) -> Revision {
    Revision {
        interpolation: model.interpolation.unwrap_or(false),
        amendment: model.amendment.unwrap_or(false),
    }
}

/// Maps a stored row back onto the domain type, checking its codes.
pub(crate) fn to_domain(model: &observations::Model) -> RepositoryResult<Observation> {
    let kind: ObservationKind = model.kind.parse()?;
    let detail = match kind {
        ObservationKind::General => ObservationDetail::General {
            measurement: measurement_of(model)?,
            currency: model.currency_id.map(CurrencyId::from),
            native_currency: model.native_currency,
        },
        ObservationKind::Scope1 => ObservationDetail::Scope1 {
            measurement: measurement_of(model)?,
            revision: revision_of(model),
        },
        ObservationKind::Scope2 => ObservationDetail::Scope2 {
            measurement: measurement_of(model)?,
            revision: revision_of(model),
            scheme: match model.scheme.as_deref() {
                Some(code) => code.parse()?,
                None => Scope2Scheme::default(),
            },
        },
        ObservationKind::Scope3 => ObservationDetail::Scope3 {
            measurement: measurement_of(model)?,
            revision: revision_of(model),
            detail: Scope3Detail {
                scope_source: model.scope_source.clone(),
                calculation_method: model.calculation_method.clone(),
                scope_source_cleaned: model.scope_source_cleaned.clone(),
                most_common_scope_source: model.most_common_scope_source.unwrap_or(false),
                pcnt_from_other_sources: model.scp3_pcnt_from_other_sources,
                most_common_source: model.scp3_most_common_source.unwrap_or(false),
            },
        },
        ObservationKind::Intensity => ObservationDetail::Intensity {
            numerator: model.numerator.as_deref().unwrap_or_default().parse()?,
            denominator: model.denominator.as_deref().unwrap_or_default().parse()?,
            value: model.value,
            location_based: model.location_based.unwrap_or(false),
        },
        ObservationKind::Qualitative => ObservationDetail::Qualitative {
            metric: metric_of(model)?,
            text: model.text_value.clone(),
        },
    };

    Ok(Observation {
        id: ObservationId::from(model.id),
        firm: FirmId::from(model.firm_id),
        date: model.date,
        location: model.location_id.map(LocationId::from),
        source: model.source_id.map(SourceId::from),
        timescale: model.timescale.parse()?,
        forecast: model.forecast,
        most_recent: model.most_recent,
        last_available: model.last_available,
        publication_date: model.publication_date,
        detail,
    })
}
