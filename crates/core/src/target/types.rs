//! Target types.
//!
//! A target is identified by its firm and `reference_number`. Each
//! disclosure of the target is appended as a [`TargetRevision`]; revisions
//! are never deduplicated, so the history keeps every snapshot.

use chrono::{DateTime, SubsecRound, Utc};
use esg_shared::types::{FirmId, TargetDataId, TargetId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DomainResult;
use crate::limits;
use crate::vocab::{TargetScheme, TargetScope, TargetStatus};

/// Default scope 3 source of a target.
pub const NO_SCOPE3_SOURCE: &str = "NONE";

/// An emission reduction target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Target ID.
    pub id: TargetId,
    /// Owning firm.
    pub firm: FirmId,
    /// Firm-scoped number. Unique per firm, otherwise opaque.
    pub reference_number: i32,
    /// When the target was set.
    pub date_set: DateTime<Utc>,
    /// Status.
    pub status: TargetStatus,
    /// Scopes covered.
    pub scope: TargetScope,
    /// Scope 2 accounting method.
    pub scope2_scheme: TargetScheme,
    /// Scope 3 category covered.
    pub scope3_source: String,
}

impl Target {
    /// A target with reference number 1 and every choice field unset.
    #[must_use]
    pub fn new(firm: FirmId, date_set: DateTime<Utc>) -> Self {
        Self {
            id: TargetId::new(),
            firm,
            reference_number: 1,
            date_set: date_set.trunc_subsecs(6),
            status: TargetStatus::default(),
            scope: TargetScope::default(),
            scope2_scheme: TargetScheme::default(),
            scope3_source: NO_SCOPE3_SOURCE.to_string(),
        }
    }

    /// Sets the reference number.
    #[must_use]
    pub fn numbered(mut self, reference_number: i32) -> Self {
        self.reference_number = reference_number;
        self
    }

    /// Sets the scope.
    #[must_use]
    pub fn covering(mut self, scope: TargetScope) -> Self {
        self.scope = scope;
        self
    }

    /// Checks the scope 3 source length.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when the source is too long.
    pub fn validate(&self) -> DomainResult<()> {
        limits::check_len("scope3_source", &self.scope3_source, limits::SCOPE_SOURCE_LEN)
    }

    /// Display key, e.g. `firm=..., reference_number=2`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("firm={}, reference_number={}", self.firm, self.reference_number)
    }
}

/// Input for a revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTargetRevision {
    /// When the snapshot was published.
    pub publication_date: DateTime<Utc>,
    /// Base year.
    pub base_year: i32,
    /// Target year.
    pub target_year: i32,
    /// Emissions covered in the base year.
    pub covered_base: Decimal,
    /// Reduction aimed for, in percent.
    pub targeted_reduction: Decimal,
    /// Emissions aimed for in the target year.
    pub covered_target: Decimal,
    /// Emissions covered in the publication year.
    pub covered_pubyear: Decimal,
    /// Share of total emissions covered, in percent.
    pub percent_of_total: Decimal,
    /// Free text.
    pub description: String,
    /// Status at publication.
    pub status: TargetStatus,
}

impl NewTargetRevision {
    /// A revision with zero percent of total, no description and no status.
    #[must_use]
    pub fn new(
        publication_date: DateTime<Utc>,
        base_year: i32,
        target_year: i32,
        targeted_reduction: Decimal,
    ) -> Self {
        Self {
            publication_date,
            base_year,
            target_year,
            covered_base: Decimal::ZERO,
            targeted_reduction,
            covered_target: Decimal::ZERO,
            covered_pubyear: Decimal::ZERO,
            percent_of_total: Decimal::ZERO,
            description: String::new(),
            status: TargetStatus::default(),
        }
    }

    /// Rounds every decimal to its stored precision.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when a decimal does not fit.
    pub fn into_revision(self, target: TargetId) -> DomainResult<TargetRevision> {
        Ok(TargetRevision {
            id: TargetDataId::new(),
            target,
            publication_date: self.publication_date.trunc_subsecs(6),
            base_year: self.base_year,
            target_year: self.target_year,
            covered_base: limits::VALUE.fit("covered_base", self.covered_base)?,
            targeted_reduction: limits::TARGETED_REDUCTION
                .fit("targeted_reduction", self.targeted_reduction)?,
            covered_target: limits::VALUE.fit("covered_target", self.covered_target)?,
            covered_pubyear: limits::VALUE.fit("covered_pubyear", self.covered_pubyear)?,
            percent_of_total: limits::PERCENT_OF_TOTAL
                .fit("percent_of_total", self.percent_of_total)?,
            description: self.description,
            status: self.status,
        })
    }
}

/// One disclosed snapshot of a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRevision {
    /// Row ID.
    pub id: TargetDataId,
    /// Target revised.
    pub target: TargetId,
    /// When the snapshot was published.
    pub publication_date: DateTime<Utc>,
    /// Base year.
    pub base_year: i32,
    /// Target year.
    pub target_year: i32,
    /// Emissions covered in the base year.
    pub covered_base: Decimal,
    /// Reduction aimed for, in percent.
    pub targeted_reduction: Decimal,
    /// Emissions aimed for in the target year.
    pub covered_target: Decimal,
    /// Emissions covered in the publication year.
    pub covered_pubyear: Decimal,
    /// Share of total emissions covered, in percent.
    pub percent_of_total: Decimal,
    /// Free text.
    pub description: String,
    /// Status at publication.
    pub status: TargetStatus,
}

/// Sorts revisions newest publication first. Ties keep the later-created
/// row first.
pub fn newest_first(revisions: &mut [TargetRevision]) {
    revisions.sort_by(|a, b| {
        b.publication_date
            .cmp(&a.publication_date)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// The most recently published revision.
#[must_use]
pub fn latest_revision(revisions: &[TargetRevision]) -> Option<&TargetRevision> {
    revisions
        .iter()
        .max_by_key(|r| (r.publication_date, r.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn published(year: i32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, 4, 1, 0, 0, 0).unwrap()
    }

    fn revision(target: TargetId, year: i32) -> TargetRevision {
        NewTargetRevision::new(published(year), 2019, 2030, dec!(50))
            .into_revision(target)
            .unwrap()
    }

    #[test]
    fn test_target_defaults() {
        let target = Target::new(FirmId::new(), published(2020));
        assert_eq!(target.reference_number, 1);
        assert_eq!(target.status, TargetStatus::Unspecified);
        assert_eq!(target.scope, TargetScope::Unspecified);
        assert_eq!(target.scope2_scheme, TargetScheme::Unspecified);
        assert_eq!(target.scope3_source, "NONE");
        assert!(target.validate().is_ok());
    }

    #[test]
    fn test_target_validate_scope3_source() {
        let mut target = Target::new(FirmId::new(), published(2020));
        target.scope3_source = "x".repeat(101);
        assert!(target.validate().is_err());
    }

    #[test]
    fn test_revision_defaults_and_rounding() {
        let mut input = NewTargetRevision::new(published(2022), 2019, 2030, dec!(42.125));
        input.percent_of_total = dec!(87.555);
        let rev = input.into_revision(TargetId::new()).unwrap();
        assert_eq!(rev.targeted_reduction, dec!(42.13));
        assert_eq!(rev.percent_of_total, dec!(87.56));
        assert_eq!(rev.description, "");
        assert_eq!(rev.status, TargetStatus::Unspecified);
    }

    #[test]
    fn test_revision_rejects_oversized_percent() {
        let mut input = NewTargetRevision::new(published(2022), 2019, 2030, dec!(10));
        input.percent_of_total = dec!(1000);
        assert!(input.into_revision(TargetId::new()).is_err());
    }

    #[test]
    fn test_newest_first() {
        let target = TargetId::new();
        let mut revisions = vec![
            revision(target, 2021),
            revision(target, 2023),
            revision(target, 2022),
        ];
        newest_first(&mut revisions);
        let years: Vec<i32> = revisions
            .iter()
            .map(|r| chrono::Datelike::year(&r.publication_date))
            .collect();
        assert_eq!(years, vec![2023, 2022, 2021]);
        assert_eq!(latest_revision(&revisions), revisions.first());
    }

    #[test]
    fn test_same_day_revisions_are_both_kept() {
        let target = TargetId::new();
        let mut revisions = vec![revision(target, 2022), revision(target, 2022)];
        newest_first(&mut revisions);
        assert_eq!(revisions.len(), 2);
        assert!(revisions[0].id > revisions[1].id);
    }
}
