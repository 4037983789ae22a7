//! Currency conversion logic.
//!
//! Every currency carries at most one rate, expressed against a single base
//! currency. Conversions between two non-base currencies go through the base.
//! Results are not rounded; stored rates are fitted by `limits`.

use chrono::{DateTime, Duration, Utc};
use esg_shared::types::CurrencyId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A currency and its rate against the base currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// Currency ID.
    pub id: CurrencyId,
    /// Name or ISO code.
    pub name: String,
    /// 1 unit of this currency = `conversion_rate` base units. `None` until
    /// first populated.
    pub conversion_rate: Option<Decimal>,
    /// When the rate was last refreshed.
    pub last_update: Option<DateTime<Utc>>,
}

impl Currency {
    /// Creates a currency with no rate yet.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CurrencyId::new(),
            name: name.into(),
            conversion_rate: None,
            last_update: None,
        }
    }

    /// Sets the rate and stamps `last_update`.
    #[must_use]
    pub fn with_rate(mut self, rate: Decimal, at: DateTime<Utc>) -> Self {
        self.conversion_rate = Some(rate);
        self.last_update = Some(at);
        self
    }

    fn rate(&self) -> DomainResult<Decimal> {
        self.conversion_rate
            .ok_or_else(|| DomainError::MissingRequiredReference {
                entity: "conversion_rate",
                detail: format!("currency {}", self.name),
            })
    }

    /// Converts an amount in this currency to the base currency.
    ///
    /// # Errors
    ///
    /// `MissingRequiredReference` when no rate is set, `Arithmetic` on
    /// overflow.
    pub fn to_base(&self, amount: Decimal) -> DomainResult<Decimal> {
        amount
            .checked_mul(self.rate()?)
            .ok_or_else(|| DomainError::Arithmetic(format!("{amount} {} overflows", self.name)))
    }

    /// Converts an amount in the base currency to this currency.
    ///
    /// # Errors
    ///
    /// `MissingRequiredReference` when no rate is set, `Arithmetic` when the
    /// rate is zero.
    pub fn from_base(&self, amount: Decimal) -> DomainResult<Decimal> {
        let rate = self.rate()?;
        if rate.is_zero() {
            return Err(DomainError::Arithmetic(format!(
                "currency {} has a zero conversion rate",
                self.name
            )));
        }
        amount
            .checked_div(rate)
            .ok_or_else(|| DomainError::Arithmetic(format!("{amount} / {rate} overflows")))
    }

    /// Converts an amount in this currency to `target` through the base.
    ///
    /// # Errors
    ///
    /// Same as [`Self::to_base`] and [`Self::from_base`].
    pub fn convert(&self, amount: Decimal, target: &Self) -> DomainResult<Decimal> {
        if self.id == target.id {
            return Ok(amount);
        }
        target.from_base(self.to_base(amount)?)
    }

    /// Time since the rate was last refreshed. Staleness is never enforced.
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.last_update.map(|at| now - at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_to_base() {
        let eur = Currency::new("EUR").with_rate(dec!(1.08), at());
        assert_eq!(eur.to_base(dec!(100)).unwrap(), dec!(108.00));
    }

    #[test]
    fn test_unset_rate_is_missing_reference() {
        let xyz = Currency::new("XYZ");
        assert!(matches!(
            xyz.to_base(dec!(1)),
            Err(DomainError::MissingRequiredReference {
                entity: "conversion_rate",
                ..
            })
        ));
        assert!(xyz.from_base(dec!(1)).is_err());
        assert_eq!(xyz.age(at()), None);
    }

    #[test]
    fn test_convert_through_base() {
        let eur = Currency::new("EUR").with_rate(dec!(1.10), at());
        let gbp = Currency::new("GBP").with_rate(dec!(1.25), at());
        // 100 EUR = 110 base = 88 GBP
        assert_eq!(eur.convert(dec!(100), &gbp).unwrap(), dec!(88));
    }

    #[test]
    fn test_convert_same_currency_skips_rate() {
        let xyz = Currency::new("XYZ");
        assert_eq!(xyz.convert(dec!(5), &xyz).unwrap(), dec!(5));
    }

    #[test]
    fn test_zero_rate_from_base() {
        let broken = Currency::new("ZZZ").with_rate(Decimal::ZERO, at());
        assert!(matches!(
            broken.from_base(dec!(1)),
            Err(DomainError::Arithmetic(_))
        ));
    }

    #[test]
    fn test_age() {
        let eur = Currency::new("EUR").with_rate(dec!(1.08), at());
        let later = at() + Duration::days(3);
        assert_eq!(eur.age(later), Some(Duration::days(3)));
    }
}
