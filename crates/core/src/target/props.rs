//! Property-based tests for target revisions.

use chrono::{TimeZone, Utc};
use esg_shared::types::TargetId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::types::{NewTargetRevision, TargetRevision, latest_revision, newest_first};

fn revisions() -> impl Strategy<Value = Vec<TargetRevision>> {
    let target = TargetId::new();
    prop::collection::vec((2010i32..2030, 1u32..=12, 0i64..10_000), 0..20).prop_map(
        move |specs| {
            specs
                .into_iter()
                .map(|(year, month, reduction)| {
                    NewTargetRevision::new(
                        Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).unwrap(),
                        2015,
                        2035,
                        Decimal::new(reduction, 2),
                    )
                    .into_revision(target)
                    .unwrap()
                })
                .collect()
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Sorting keeps every revision and orders publication dates descending.
    #[test]
    fn prop_newest_first_is_a_descending_permutation(mut revs in revisions()) {
        let before = revs.len();
        let latest = latest_revision(&revs).cloned();
        newest_first(&mut revs);
        prop_assert_eq!(revs.len(), before);
        for pair in revs.windows(2) {
            prop_assert!(pair[0].publication_date >= pair[1].publication_date);
        }
        prop_assert_eq!(revs.first().cloned(), latest);
    }
}
