//! Recomputation of the summary flags.
//!
//! Firms carry `has_scope1/2/3` and `has_targets`; fact rows carry
//! `most_recent` and `last_available`. These are derived here from the fact
//! rows themselves instead of being trusted from whoever wrote last.

use std::collections::{HashMap, HashSet};

use esg_shared::types::ObservationId;
use serde::{Deserialize, Serialize};

use super::types::Observation;
use crate::vocab::ObservationKind;

/// Which kinds of data a firm has disclosed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmCoverage {
    /// At least one scope 1 row.
    pub has_scope1: bool,
    /// At least one scope 2 row.
    pub has_scope2: bool,
    /// At least one scope 3 row.
    pub has_scope3: bool,
    /// At least one target.
    pub has_targets: bool,
}

impl FirmCoverage {
    /// Derives coverage from the kinds of a firm's rows.
    #[must_use]
    pub fn from_kinds<I>(kinds: I, has_targets: bool) -> Self
    where
        I: IntoIterator<Item = ObservationKind>,
    {
        kinds.into_iter().fold(
            Self {
                has_targets,
                ..Self::default()
            },
            |mut acc, kind| {
                match kind {
                    ObservationKind::Scope1 => acc.has_scope1 = true,
                    ObservationKind::Scope2 => acc.has_scope2 = true,
                    ObservationKind::Scope3 => acc.has_scope3 = true,
                    _ => {}
                }
                acc
            },
        )
    }
}

/// New flag values for one row whose stored flags are out of date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecencyUpdate {
    /// Row to update.
    pub id: ObservationId,
    /// New `most_recent`.
    pub most_recent: bool,
    /// New `last_available`.
    pub last_available: bool,
}

/// Recomputes `most_recent` and `last_available` over a set of rows.
///
/// Rows are grouped into series by their key without date, source and
/// publication date:
///
/// - `most_recent` marks, for each series and date, the row with the latest
///   publication date (unpublished rows rank lowest, ties go to the highest
///   id).
/// - `last_available` marks, per series, the latest-dated non-forecast row
///   with a value, ties broken the same way.
///
/// Kinds that do not carry a flag keep it false. Only rows whose flags
/// change are returned.
#[must_use]
pub fn recompute_recency(rows: &[Observation]) -> Vec<RecencyUpdate> {
    let mut latest_publication: HashMap<String, &Observation> = HashMap::new();
    let mut latest_available: HashMap<String, &Observation> = HashMap::new();

    for row in rows {
        let kind = row.kind();
        let key = row.key();
        if kind.tracks_most_recent() {
            keep_max(
                &mut latest_publication,
                key.dated_series_fingerprint(),
                row,
                |r| (r.publication_date, r.id),
            );
        }
        if kind.tracks_last_available() && !row.forecast && row.detail.has_value() {
            keep_max(&mut latest_available, key.series_fingerprint(), row, |r| {
                (r.date, r.publication_date, r.id)
            });
        }
    }

    let most_recent: HashSet<ObservationId> = latest_publication.values().map(|r| r.id).collect();
    let last_available: HashSet<ObservationId> = latest_available.values().map(|r| r.id).collect();

    rows.iter()
        .filter_map(|row| {
            let update = RecencyUpdate {
                id: row.id,
                most_recent: most_recent.contains(&row.id),
                last_available: last_available.contains(&row.id),
            };
            (update.most_recent != row.most_recent || update.last_available != row.last_available)
                .then_some(update)
        })
        .collect()
}

fn keep_max<'a, K, F>(
    best: &mut HashMap<String, &'a Observation>,
    group: String,
    row: &'a Observation,
    rank: F,
) where
    K: Ord,
    F: Fn(&Observation) -> K,
{
    best.entry(group)
        .and_modify(|current| {
            if rank(row) > rank(*current) {
                *current = row;
            }
        })
        .or_insert(row);
}
