//! Reference tables: sources, currencies, units, metrics, locations, the two
//! taxonomies, firms and their identifiers.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
pub(crate) enum Sources {
    Table,
    Id,
    Name,
    Url,
    Description,
}

#[derive(DeriveIden)]
pub(crate) enum Currencies {
    Table,
    Id,
    Name,
    ConversionRate,
    LastUpdate,
}

#[derive(DeriveIden)]
pub(crate) enum Units {
    Table,
    Id,
    Name,
    DefaultUnitId,
    Coeff,
    #[sea_orm(iden = "const")]
    Const,
}

#[derive(DeriveIden)]
pub(crate) enum Metrics {
    Table,
    Id,
    Name,
    Description,
}

#[derive(DeriveIden)]
enum MetricUnits {
    Table,
    MetricId,
    UnitId,
}

#[derive(DeriveIden)]
pub(crate) enum Locations {
    Table,
    Id,
    Name,
    ParentId,
    Code,
    CurrencyId,
    Loctype,
}

#[derive(DeriveIden)]
enum LocationComponents {
    Table,
    LocationId,
    ComponentId,
}

#[derive(DeriveIden)]
enum Taxonomy {
    Id,
    Name,
    ParentId,
}

#[derive(DeriveIden)]
pub(crate) enum Firms {
    Table,
    Id,
    Name,
    HqLocationId,
    AccountNumber,
    SectorId,
    SubSectorId,
    IndustryId,
    SubIndustryId,
    CdpIndustryId,
    CdpSectorId,
    CdpActivityId,
    CurrencyId,
    HasScope1,
    HasScope2,
    HasScope3,
    HasTargets,
    Site,
}

#[derive(DeriveIden)]
enum Isins {
    Table,
    Id,
    Name,
    FirmId,
    LastUsed,
}

#[derive(DeriveIden)]
enum Tickers {
    Table,
    Id,
    Name,
    FirmId,
}

/// Taxonomy tables, parent level first. `None` marks a root level.
const TAXONOMY_TABLES: &[(&str, Option<&str>)] = &[
    ("sectors", None),
    ("sub_sectors", Some("sectors")),
    ("industries", Some("sub_sectors")),
    ("sub_industries", Some("industries")),
    ("cdp_industries", None),
    ("cdp_sectors", Some("cdp_industries")),
    ("cdp_activities", Some("cdp_sectors")),
];

/// Detached tickers share one namespace. Postgres and SQLite both accept
/// partial indexes.
const DETACHED_TICKER_INDEX_SQL: &str =
    "CREATE UNIQUE INDEX uq_tickers_detached_name ON tickers (name) WHERE firm_id IS NULL";

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

fn index(name: &str, table: impl IntoIden + 'static, cols: &[&'static str]) -> IndexCreateStatement {
    let mut stmt = Index::create();
    stmt.name(name).table(table);
    for col in cols {
        stmt.col(Alias::new(*col));
    }
    stmt.to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Sources::Table)
                    .col(ColumnDef::new(Sources::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Sources::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Sources::Url).string_len(200))
                    .col(ColumnDef::new(Sources::Description).string_len(200))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Currencies::Table)
                    .col(ColumnDef::new(Currencies::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Currencies::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Currencies::ConversionRate).decimal_len(10, 6))
                    .col(ColumnDef::new(Currencies::LastUpdate).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Units::Table)
                    .col(ColumnDef::new(Units::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Units::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Units::DefaultUnitId).uuid())
                    .col(ColumnDef::new(Units::Coeff).decimal_len(10, 6).default(1))
                    .col(ColumnDef::new(Units::Const).decimal_len(10, 6).default(0))
                    .foreign_key(&mut fk(
                        "fk_units_default_unit",
                        (Units::Table, Units::DefaultUnitId),
                        (Units::Table, Units::Id),
                        ForeignKeyAction::SetNull,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Metrics::Table)
                    .col(ColumnDef::new(Metrics::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Metrics::Name).string_len(100).not_null().unique_key())
                    .col(
                        ColumnDef::new(Metrics::Description)
                            .string_len(200)
                            .not_null()
                            .default(""),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MetricUnits::Table)
                    .col(ColumnDef::new(MetricUnits::MetricId).uuid().not_null())
                    .col(ColumnDef::new(MetricUnits::UnitId).uuid().not_null())
                    .primary_key(Index::create().col(MetricUnits::MetricId).col(MetricUnits::UnitId))
                    .foreign_key(&mut fk(
                        "fk_metric_units_metric",
                        (MetricUnits::Table, MetricUnits::MetricId),
                        (Metrics::Table, Metrics::Id),
                        ForeignKeyAction::Cascade,
                    ))
                    .foreign_key(&mut fk(
                        "fk_metric_units_unit",
                        (MetricUnits::Table, MetricUnits::UnitId),
                        (Units::Table, Units::Id),
                        ForeignKeyAction::Cascade,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Locations::Table)
                    .col(ColumnDef::new(Locations::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Locations::Name).string_len(100).not_null().unique_key())
                    .col(ColumnDef::new(Locations::ParentId).uuid())
                    .col(ColumnDef::new(Locations::Code).string_len(10))
                    .col(ColumnDef::new(Locations::CurrencyId).uuid())
                    .col(
                        ColumnDef::new(Locations::Loctype)
                            .string_len(20)
                            .not_null()
                            .default("COUNTRY"),
                    )
                    .foreign_key(&mut fk(
                        "fk_locations_parent",
                        (Locations::Table, Locations::ParentId),
                        (Locations::Table, Locations::Id),
                        ForeignKeyAction::SetNull,
                    ))
                    .foreign_key(&mut fk(
                        "fk_locations_currency",
                        (Locations::Table, Locations::CurrencyId),
                        (Currencies::Table, Currencies::Id),
                        ForeignKeyAction::SetNull,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LocationComponents::Table)
                    .col(ColumnDef::new(LocationComponents::LocationId).uuid().not_null())
                    .col(ColumnDef::new(LocationComponents::ComponentId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(LocationComponents::LocationId)
                            .col(LocationComponents::ComponentId),
                    )
                    .foreign_key(&mut fk(
                        "fk_location_components_location",
                        (LocationComponents::Table, LocationComponents::LocationId),
                        (Locations::Table, Locations::Id),
                        ForeignKeyAction::Cascade,
                    ))
                    .foreign_key(&mut fk(
                        "fk_location_components_component",
                        (LocationComponents::Table, LocationComponents::ComponentId),
                        (Locations::Table, Locations::Id),
                        ForeignKeyAction::Cascade,
                    ))
                    .to_owned(),
            )
            .await?;

        for (table, parent) in TAXONOMY_TABLES {
            let mut stmt = Table::create();
            stmt.table(Alias::new(*table))
                .col(ColumnDef::new(Taxonomy::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Taxonomy::Name).string_len(100).not_null());
            if let Some(parent) = parent {
                stmt.col(ColumnDef::new(Taxonomy::ParentId).uuid())
                    .foreign_key(&mut fk(
                        &format!("fk_{table}_parent"),
                        (Alias::new(*table), Taxonomy::ParentId),
                        (Alias::new(*parent), Taxonomy::Id),
                        ForeignKeyAction::SetNull,
                    ));
            }
            manager.create_table(stmt.to_owned()).await?;
        }

        let mut firms = Table::create();
        firms
            .table(Firms::Table)
            .col(ColumnDef::new(Firms::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Firms::Name).string_len(100).not_null().unique_key())
            .col(ColumnDef::new(Firms::HqLocationId).uuid())
            .col(ColumnDef::new(Firms::AccountNumber).integer())
            .col(ColumnDef::new(Firms::SectorId).uuid())
            .col(ColumnDef::new(Firms::SubSectorId).uuid())
            .col(ColumnDef::new(Firms::IndustryId).uuid())
            .col(ColumnDef::new(Firms::SubIndustryId).uuid())
            .col(ColumnDef::new(Firms::CdpIndustryId).uuid())
            .col(ColumnDef::new(Firms::CdpSectorId).uuid())
            .col(ColumnDef::new(Firms::CdpActivityId).uuid())
            .col(ColumnDef::new(Firms::CurrencyId).uuid())
            .col(ColumnDef::new(Firms::HasScope1).boolean().not_null().default(false))
            .col(ColumnDef::new(Firms::HasScope2).boolean().not_null().default(false))
            .col(ColumnDef::new(Firms::HasScope3).boolean().not_null().default(false))
            .col(ColumnDef::new(Firms::HasTargets).boolean().not_null().default(false))
            .col(ColumnDef::new(Firms::Site).string_len(500))
            .foreign_key(&mut fk(
                "fk_firms_hq_location",
                (Firms::Table, Firms::HqLocationId),
                (Locations::Table, Locations::Id),
                ForeignKeyAction::SetNull,
            ))
            .foreign_key(&mut fk(
                "fk_firms_currency",
                (Firms::Table, Firms::CurrencyId),
                (Currencies::Table, Currencies::Id),
                ForeignKeyAction::SetNull,
            ));
        let taxonomy_refs = [
            (Firms::SectorId, "sectors"),
            (Firms::SubSectorId, "sub_sectors"),
            (Firms::IndustryId, "industries"),
            (Firms::SubIndustryId, "sub_industries"),
            (Firms::CdpIndustryId, "cdp_industries"),
            (Firms::CdpSectorId, "cdp_sectors"),
            (Firms::CdpActivityId, "cdp_activities"),
        ];
        for (column, table) in taxonomy_refs {
            firms.foreign_key(&mut fk(
                &format!("fk_firms_{table}"),
                (Firms::Table, column),
                (Alias::new(table), Taxonomy::Id),
                ForeignKeyAction::SetNull,
            ));
        }
        manager.create_table(firms.to_owned()).await?;

        manager
            .create_table(
                Table::create()
                    .table(Isins::Table)
                    .col(ColumnDef::new(Isins::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Isins::Name).string_len(100).not_null().unique_key())
                    .col(ColumnDef::new(Isins::FirmId).uuid().not_null())
                    .col(ColumnDef::new(Isins::LastUsed).timestamp_with_time_zone().not_null())
                    .foreign_key(&mut fk(
                        "fk_isins_firm",
                        (Isins::Table, Isins::FirmId),
                        (Firms::Table, Firms::Id),
                        ForeignKeyAction::Cascade,
                    ))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(index("idx_isins_firm_last_used", Isins::Table, &["firm_id", "last_used"]))
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tickers::Table)
                    .col(ColumnDef::new(Tickers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Tickers::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Tickers::FirmId).uuid())
                    .foreign_key(&mut fk(
                        "fk_tickers_firm",
                        (Tickers::Table, Tickers::FirmId),
                        (Firms::Table, Firms::Id),
                        ForeignKeyAction::SetNull,
                    ))
                    .to_owned(),
            )
            .await?;
        // NULL firms are distinct here; the partial index below covers them.
        manager
            .create_index(
                index("uq_tickers_name_firm", Tickers::Table, &["name", "firm_id"]).unique().to_owned(),
            )
            .await?;
        manager
            .get_connection()
            .execute_unprepared(DETACHED_TICKER_INDEX_SQL)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut tables: Vec<String> = vec![
            "tickers".into(),
            "isins".into(),
            "firms".into(),
        ];
        tables.extend(TAXONOMY_TABLES.iter().rev().map(|(t, _)| (*t).to_string()));
        tables.extend(
            [
                "location_components",
                "locations",
                "metric_units",
                "metrics",
                "units",
                "currencies",
                "sources",
            ]
            .map(String::from),
        );
        for table in tables {
            manager
                .drop_table(Table::drop().table(Alias::new(table)).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}
