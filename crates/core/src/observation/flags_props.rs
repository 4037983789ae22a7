//! Property-based tests for recency flag recomputation.

use std::collections::HashMap;

use chrono::{TimeZone, Utc};
use esg_shared::types::{FirmId, MetricId, ObservationId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::flags::recompute_recency;
use super::types::{Measurement, Observation, ObservationDetail};

/// Rows of one firm across two metrics, several years and publications.
fn rows() -> impl Strategy<Value = Vec<Observation>> {
    let firm = FirmId::new();
    let metrics = [MetricId::new(), MetricId::new()];
    prop::collection::vec(
        (0usize..2, 2018i32..2024, prop::option::of(2019i32..2026), any::<bool>(), any::<bool>()),
        1..30,
    )
    .prop_map(move |specs| {
        specs
            .into_iter()
            .map(|(metric, year, published, forecast, has_value)| {
                let value = has_value.then(|| Decimal::from(year));
                let mut row = Observation::new(
                    firm,
                    Utc.with_ymd_and_hms(year, 12, 31, 0, 0, 0).unwrap(),
                    ObservationDetail::scope1(Measurement::new(metrics[metric], value)),
                );
                if let Some(p) = published {
                    row = row.published(Utc.with_ymd_and_hms(p, 6, 30, 0, 0, 0).unwrap());
                }
                if forecast {
                    row = row.as_forecast();
                }
                row
            })
            .collect()
    })
}

fn apply(rows: &[Observation]) -> Vec<Observation> {
    let updates: HashMap<ObservationId, (bool, bool)> = recompute_recency(rows)
        .into_iter()
        .map(|u| (u.id, (u.most_recent, u.last_available)))
        .collect();
    rows.iter()
        .cloned()
        .map(|mut row| {
            if let Some((most_recent, last_available)) = updates.get(&row.id) {
                row.most_recent = *most_recent;
                row.last_available = *last_available;
            }
            row
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Applying the updates reaches a fixed point.
    #[test]
    fn prop_recompute_is_idempotent(rows in rows()) {
        let once = apply(&rows);
        prop_assert!(recompute_recency(&once).is_empty());
    }

    /// Each series has at most one last_available row and it is a reported value.
    #[test]
    fn prop_one_last_available_per_series(rows in rows()) {
        let flagged = apply(&rows);
        let mut per_series: HashMap<String, usize> = HashMap::new();
        for row in flagged.iter().filter(|r| r.last_available) {
            prop_assert!(!row.forecast);
            prop_assert!(row.detail.value().is_some());
            *per_series.entry(row.key().series_fingerprint()).or_default() += 1;
        }
        prop_assert!(per_series.values().all(|n| *n == 1));
    }

    /// Every (series, date) group has exactly one most_recent row.
    #[test]
    fn prop_one_most_recent_per_date(rows in rows()) {
        let flagged = apply(&rows);
        let mut per_date: HashMap<String, usize> = HashMap::new();
        for row in &flagged {
            let count = per_date.entry(row.key().dated_series_fingerprint()).or_default();
            if row.most_recent {
                *count += 1;
            }
        }
        prop_assert!(per_date.values().all(|n| *n == 1));
    }
}
