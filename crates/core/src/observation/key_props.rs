//! Property-based tests for observation keys.

use chrono::{DateTime, TimeZone, Utc};
use esg_shared::types::{FirmId, LocationId, MetricId, SourceId, UnitId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::key::{KeyField, key_fields};
use super::types::{Measurement, Observation, ObservationDetail, Scope3Detail};
use crate::vocab::{ObservationKind, Scope2Scheme, Timescale};

fn timescale() -> impl Strategy<Value = Timescale> {
    prop::sample::select(Timescale::ALL.to_vec())
}

fn scheme() -> impl Strategy<Value = Scope2Scheme> {
    prop::sample::select(Scope2Scheme::ALL.to_vec())
}

fn year() -> impl Strategy<Value = DateTime<Utc>> {
    (1990i32..2060).prop_map(|y| Utc.with_ymd_and_hms(y, 12, 31, 0, 0, 0).unwrap())
}

fn value() -> impl Strategy<Value = Option<Decimal>> {
    prop::option::of((-1_000_000i64..1_000_000).prop_map(|c| Decimal::new(c, 2)))
}

/// An emissions row with every optional key part randomly set or unset.
fn emissions_row() -> impl Strategy<Value = Observation> {
    (
        0usize..3,
        year(),
        prop::option::of(year()),
        timescale(),
        scheme(),
        any::<bool>(),
        any::<(bool, bool, bool)>(),
        value(),
    )
        .prop_map(
            |(kind, date, published, timescale, scheme, location_based, (unit, location, source), value)| {
                let mut measurement = Measurement::new(MetricId::new(), value)
                    .with_location_based(location_based);
                if unit {
                    measurement = measurement.in_unit(UnitId::new());
                }
                let detail = match kind {
                    0 => ObservationDetail::scope1(measurement),
                    1 => ObservationDetail::scope2(measurement, scheme),
                    _ => ObservationDetail::scope3(measurement, Scope3Detail::default()),
                };
                let mut row = Observation::new(FirmId::new(), date, detail).with_timescale(timescale);
                if location {
                    row = row.at(LocationId::new());
                }
                if source {
                    row = row.from_source(SourceId::new());
                }
                if let Some(at) = published {
                    row = row.published(at);
                }
                row
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A copy with a new id, new value and flipped flags has the same key.
    #[test]
    fn prop_key_ignores_non_key_fields(row in emissions_row(), new_value in value()) {
        let mut copy = row.clone();
        copy.id = esg_shared::types::ObservationId::new();
        copy.forecast = !row.forecast;
        copy.most_recent = !row.most_recent;
        copy.last_available = !row.last_available;
        if let Some(m) = match &mut copy.detail {
            ObservationDetail::Scope1 { measurement, .. }
            | ObservationDetail::Scope2 { measurement, .. }
            | ObservationDetail::Scope3 { measurement, .. } => Some(measurement),
            _ => None,
        } {
            m.value = new_value;
        }
        prop_assert_eq!(row.key().fingerprint(), copy.key().fingerprint());
    }

    /// The key has exactly the kind's fields, in order.
    #[test]
    fn prop_key_has_kind_fields(row in emissions_row()) {
        let key = row.key();
        let fields: Vec<KeyField> = key.parts().iter().map(|(f, _)| *f).collect();
        prop_assert_eq!(fields.as_slice(), key_fields(row.kind()));
    }

    /// Changing the firm always changes the key of an emissions row.
    #[test]
    fn prop_firm_is_part_of_key(row in emissions_row()) {
        let mut other = row.clone();
        other.firm = FirmId::new();
        prop_assert_ne!(row.key().fingerprint(), other.key().fingerprint());
        prop_assert_ne!(row.key().series_fingerprint(), other.key().series_fingerprint());
    }

    /// Only scope 2 keys mention a scheme.
    #[test]
    fn prop_scheme_only_in_scope2(row in emissions_row()) {
        let has_scheme = row.key().get(KeyField::Scheme).is_some();
        prop_assert_eq!(has_scheme, row.kind() == ObservationKind::Scope2);
    }
}
