//! `SeaORM` entity definitions, one module per table.

pub mod cdp_activities;
pub mod cdp_industries;
pub mod cdp_sectors;
pub mod currencies;
pub mod firms;
pub mod industries;
pub mod isins;
pub mod location_components;
pub mod locations;
pub mod metric_units;
pub mod metrics;
pub mod observations;
pub mod sectors;
pub mod sources;
pub mod sub_industries;
pub mod sub_sectors;
pub mod target_data;
pub mod targets;
pub mod tickers;
pub mod units;
