//! Shared setup for the integration tests.
//!
//! Every test gets its own migrated in-memory SQLite database. The pool is
//! pinned to one connection because each SQLite memory connection is a
//! separate database.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use esg_core::units::UnitScale;
use esg_db::migration::{Migrator, MigratorTrait};
use esg_db::repositories::{
    CreateFirmInput, CreateLocationInput, CreateUnitInput, FirmRepository, LocationRepository,
    MetricRepository, SourceRepository, UnitRepository,
};
use esg_shared::types::{FirmId, LocationId, MetricId, SourceId, UnitId};
use rust_decimal_macros::dec;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Opens a fresh database and runs the migrations.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// Midnight UTC on 31 December of `year`.
pub fn year_end(year: i32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, 12, 31, 0, 0, 0).unwrap()
}

/// Midnight UTC on the given day.
pub fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// Reference data most tests need.
pub struct Fixture {
    pub db: DatabaseConnection,
    pub firm: FirmId,
    pub other_firm: FirmId,
    pub metric: MetricId,
    pub other_metric: MetricId,
    pub tonnes: UnitId,
    pub kilotonnes: UnitId,
    pub location: LocationId,
    pub source: SourceId,
}

impl Fixture {
    pub async fn new() -> Self {
        let db = setup_db().await;

        let firms = FirmRepository::new(db.clone());
        let firm = firms
            .create(CreateFirmInput::named("Acme Corp"))
            .await
            .expect("create firm");
        let other_firm = firms
            .create(CreateFirmInput::named("Globex"))
            .await
            .expect("create firm");

        let metrics = MetricRepository::new(db.clone());
        let metric = metrics
            .create("Emissions", "Greenhouse gas emissions")
            .await
            .expect("create metric");
        let other_metric = metrics
            .create("Energy use", "")
            .await
            .expect("create metric");

        let units = UnitRepository::new(db.clone());
        let tonnes = units
            .create(CreateUnitInput::base("tCO2e"))
            .await
            .expect("create unit");
        let kilotonnes = units
            .create(CreateUnitInput::derived(
                "ktCO2e",
                tonnes.id,
                UnitScale::linear(dec!(1000)),
            ))
            .await
            .expect("create unit");

        let location = LocationRepository::new(db.clone())
            .create(CreateLocationInput::named("France"))
            .await
            .expect("create location");
        let source = SourceRepository::new(db.clone())
            .create("Annual report", None, None)
            .await
            .expect("create source");

        Self {
            db,
            firm: firm.id.into(),
            other_firm: other_firm.id.into(),
            metric: metric.id.into(),
            other_metric: other_metric.id.into(),
            tonnes: tonnes.id,
            kilotonnes: kilotonnes.id,
            location: location.id.into(),
            source: source.id.into(),
        }
    }
}
