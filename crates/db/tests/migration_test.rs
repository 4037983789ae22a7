//! Integration tests for the schema migrations on the SQLite test store.

mod common;

use common::{Fixture, setup_db, year_end};
use esg_core::target::{NewTargetRevision, Target};
use esg_db::migration::{Migrator, MigratorTrait, SchemaManager};
use esg_db::TargetRepository;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_migrations_create_every_table() {
    let db = setup_db().await;
    let manager = SchemaManager::new(&db);
    for table in [
        "sources",
        "currencies",
        "units",
        "metrics",
        "locations",
        "firms",
        "isins",
        "tickers",
        "observations",
        "targets",
        "target_data",
    ] {
        assert!(manager.has_table(table).await.unwrap(), "missing table {table}");
    }
}

#[tokio::test]
async fn test_migrations_roll_back() {
    let db = setup_db().await;
    Migrator::down(&db, None).await.unwrap();
    let manager = SchemaManager::new(&db);
    assert!(!manager.has_table("observations").await.unwrap());
    assert!(!manager.has_table("firms").await.unwrap());
}

#[tokio::test]
async fn test_wide_quantity_columns_store_values() {
    let fx = Fixture::new().await;
    let targets = TargetRepository::new(fx.db.clone());
    let target = targets.create(Target::new(fx.firm, year_end(2020))).await.unwrap();

    let revision = targets
        .add_revision(
            target.id,
            NewTargetRevision {
                covered_base: dec!(123456789.5),
                covered_target: dec!(67890.25),
                covered_pubyear: dec!(98765.75),
                ..NewTargetRevision::new(year_end(2021), 2019, 2030, dec!(45.5))
            },
        )
        .await
        .unwrap();

    let latest = targets.latest_revision(target.id).await.unwrap().unwrap();
    assert_eq!(latest.id, revision.id);
    assert_eq!(latest.covered_base, dec!(123456789.5));
    assert_eq!(latest.covered_target, dec!(67890.25));
}
