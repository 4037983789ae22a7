//! Fact tables: observations of every kind, targets and target revisions.

use sea_orm::DatabaseBackend;
use sea_orm_migration::prelude::*;

use super::m20260301_000001_reference::{Currencies, Firms, Locations, Metrics, Sources, Units};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Observations {
    Table,
    Id,
    Kind,
    FirmId,
    Date,
    LocationId,
    SourceId,
    Timescale,
    Forecast,
    MostRecent,
    LastAvailable,
    PublicationDate,
    MetricId,
    Value,
    UnitId,
    Datatype,
    LocationBased,
    CurrencyId,
    NativeCurrency,
    Interpolation,
    Amendment,
    Scheme,
    ScopeSource,
    CalculationMethod,
    ScopeSourceCleaned,
    MostCommonScopeSource,
    Scp3PcntFromOtherSources,
    Scp3MostCommonSource,
    Numerator,
    Denominator,
    TextValue,
    DedupKey,
}

#[derive(DeriveIden)]
enum Targets {
    Table,
    Id,
    FirmId,
    ReferenceNumber,
    DateSet,
    Status,
    Scope,
    Scope2Scheme,
    Scope3Source,
}

#[derive(DeriveIden)]
enum TargetData {
    Table,
    Id,
    TargetId,
    PublicationDate,
    BaseYear,
    TargetYear,
    CoveredBase,
    TargetedReduction,
    CoveredTarget,
    CoveredPubyear,
    PercentOfTotal,
    Description,
    Status,
}

fn fk(
    name: &str,
    from: (impl IntoIden + 'static, impl IntoIden + 'static),
    to: (impl IntoIden + 'static, impl IntoIden + 'static),
    on_delete: ForeignKeyAction,
) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(from.0, from.1)
        .to(to.0, to.1)
        .on_delete(on_delete)
        .to_owned()
}

/// Precision of reported quantities: `numeric(50, 2)`.
///
/// SQLite refuses declared precisions above 16 and stores every decimal with
/// REAL affinity anyway.
const fn value_precision(backend: DatabaseBackend) -> u32 {
    match backend {
        DatabaseBackend::Sqlite => 16,
        _ => 50,
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let value_len = value_precision(manager.get_database_backend());

        manager
            .create_table(
                Table::create()
                    .table(Observations::Table)
                    .col(ColumnDef::new(Observations::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Observations::Kind).string_len(20).not_null())
                    .col(ColumnDef::new(Observations::FirmId).uuid().not_null())
                    .col(ColumnDef::new(Observations::Date).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Observations::LocationId).uuid())
                    .col(ColumnDef::new(Observations::SourceId).uuid())
                    .col(
                        ColumnDef::new(Observations::Timescale)
                            .string_len(20)
                            .not_null()
                            .default("annual"),
                    )
                    .col(ColumnDef::new(Observations::Forecast).boolean().not_null().default(false))
                    .col(ColumnDef::new(Observations::MostRecent).boolean().not_null().default(false))
                    .col(
                        ColumnDef::new(Observations::LastAvailable)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Observations::PublicationDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(Observations::MetricId).uuid())
                    .col(ColumnDef::new(Observations::Value).decimal_len(value_len, 2))
                    .col(ColumnDef::new(Observations::UnitId).uuid())
                    .col(ColumnDef::new(Observations::Datatype).string_len(10))
                    .col(ColumnDef::new(Observations::LocationBased).boolean())
                    .col(ColumnDef::new(Observations::CurrencyId).uuid())
                    .col(ColumnDef::new(Observations::NativeCurrency).boolean())
                    .col(ColumnDef::new(Observations::Interpolation).boolean())
                    .col(ColumnDef::new(Observations::Amendment).boolean())
                    .col(ColumnDef::new(Observations::Scheme).string_len(10))
                    .col(ColumnDef::new(Observations::ScopeSource).string_len(100))
                    .col(ColumnDef::new(Observations::CalculationMethod).string_len(300))
                    .col(ColumnDef::new(Observations::ScopeSourceCleaned).string_len(100))
                    .col(ColumnDef::new(Observations::MostCommonScopeSource).boolean())
                    .col(ColumnDef::new(Observations::Scp3PcntFromOtherSources).decimal_len(10, 2))
                    .col(ColumnDef::new(Observations::Scp3MostCommonSource).boolean())
                    .col(ColumnDef::new(Observations::Numerator).string_len(100))
                    .col(ColumnDef::new(Observations::Denominator).string_len(100))
                    .col(ColumnDef::new(Observations::TextValue).string_len(2500))
                    .col(ColumnDef::new(Observations::DedupKey).text().not_null())
                    .foreign_key(&mut fk(
                        "fk_observations_firm",
                        (Observations::Table, Observations::FirmId),
                        (Firms::Table, Firms::Id),
                        ForeignKeyAction::Cascade,
                    ))
                    .foreign_key(&mut fk(
                        "fk_observations_location",
                        (Observations::Table, Observations::LocationId),
                        (Locations::Table, Locations::Id),
                        ForeignKeyAction::Cascade,
                    ))
                    .foreign_key(&mut fk(
                        "fk_observations_source",
                        (Observations::Table, Observations::SourceId),
                        (Sources::Table, Sources::Id),
                        ForeignKeyAction::SetNull,
                    ))
                    .foreign_key(&mut fk(
                        "fk_observations_metric",
                        (Observations::Table, Observations::MetricId),
                        (Metrics::Table, Metrics::Id),
                        ForeignKeyAction::Cascade,
                    ))
                    .foreign_key(&mut fk(
                        "fk_observations_unit",
                        (Observations::Table, Observations::UnitId),
                        (Units::Table, Units::Id),
                        ForeignKeyAction::SetNull,
                    ))
                    .foreign_key(&mut fk(
                        "fk_observations_currency",
                        (Observations::Table, Observations::CurrencyId),
                        (Currencies::Table, Currencies::Id),
                        ForeignKeyAction::SetNull,
                    ))
                    .to_owned(),
            )
            .await?;

        // Serializes concurrent writers of the same key tuple.
        manager
            .create_index(
                Index::create()
                    .name("uq_observations_dedup_key")
                    .table(Observations::Table)
                    .col(Observations::DedupKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        let lookups: [(&str, Vec<Observations>); 5] = [
            ("idx_observations_location", vec![Observations::LocationId]),
            ("idx_observations_metric", vec![Observations::MetricId]),
            ("idx_observations_date", vec![Observations::Date]),
            ("idx_observations_unit", vec![Observations::UnitId]),
            (
                "idx_observations_firm_kind",
                vec![Observations::FirmId, Observations::Kind],
            ),
        ];
        for (name, cols) in lookups {
            let mut stmt = Index::create();
            stmt.name(name).table(Observations::Table);
            for col in cols {
                stmt.col(col);
            }
            manager.create_index(stmt.to_owned()).await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(Targets::Table)
                    .col(ColumnDef::new(Targets::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Targets::FirmId).uuid().not_null())
                    .col(ColumnDef::new(Targets::ReferenceNumber).integer().not_null().default(1))
                    .col(ColumnDef::new(Targets::DateSet).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Targets::Status).string_len(10).not_null().default("NONE"))
                    .col(ColumnDef::new(Targets::Scope).string_len(10).not_null().default("NONE"))
                    .col(
                        ColumnDef::new(Targets::Scope2Scheme)
                            .string_len(10)
                            .not_null()
                            .default("NONE"),
                    )
                    .col(
                        ColumnDef::new(Targets::Scope3Source)
                            .string_len(100)
                            .not_null()
                            .default("NONE"),
                    )
                    .foreign_key(&mut fk(
                        "fk_targets_firm",
                        (Targets::Table, Targets::FirmId),
                        (Firms::Table, Firms::Id),
                        ForeignKeyAction::Cascade,
                    ))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("uq_targets_reference_number_firm")
                    .table(Targets::Table)
                    .col(Targets::ReferenceNumber)
                    .col(Targets::FirmId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TargetData::Table)
                    .col(ColumnDef::new(TargetData::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(TargetData::TargetId).uuid().not_null())
                    .col(
                        ColumnDef::new(TargetData::PublicationDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TargetData::BaseYear).integer().not_null())
                    .col(ColumnDef::new(TargetData::TargetYear).integer().not_null())
                    .col(ColumnDef::new(TargetData::CoveredBase).decimal_len(value_len, 2).not_null())
                    .col(ColumnDef::new(TargetData::TargetedReduction).decimal_len(10, 2).not_null())
                    .col(ColumnDef::new(TargetData::CoveredTarget).decimal_len(value_len, 2).not_null())
                    .col(ColumnDef::new(TargetData::CoveredPubyear).decimal_len(value_len, 2).not_null())
                    .col(
                        ColumnDef::new(TargetData::PercentOfTotal)
                            .decimal_len(5, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(TargetData::Description).text().not_null().default(""))
                    .col(ColumnDef::new(TargetData::Status).string_len(10).not_null().default("NONE"))
                    .foreign_key(&mut fk(
                        "fk_target_data_target",
                        (TargetData::Table, TargetData::TargetId),
                        (Targets::Table, Targets::Id),
                        ForeignKeyAction::Cascade,
                    ))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_target_data_publication_date")
                    .table(TargetData::Table)
                    .col(TargetData::PublicationDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TargetData::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Targets::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Observations::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
