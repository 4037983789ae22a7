//! Property-based tests for currency conversion.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::conversion::Currency;

/// Amounts from 0.01 to 1,000,000.00.
fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Rates from 0.0001 to 10000.0000.
fn rate() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

fn currency(name: &str, rate: Decimal) -> Currency {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    Currency::new(name).with_rate(rate, at)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Base and back returns the amount, up to rounding at 10 places.
    #[test]
    fn prop_base_round_trip(amount in amount(), rate in rate()) {
        let c = currency("C", rate);
        let back = c.from_base(c.to_base(amount).unwrap()).unwrap();
        prop_assert_eq!(back.round_dp(10), amount);
    }

    /// Cross conversion of a positive amount stays positive.
    #[test]
    fn prop_cross_conversion_is_positive(amount in amount(), a in rate(), b in rate()) {
        let from = currency("A", a);
        let to = currency("B", b);
        let converted = from.convert(amount, &to).unwrap();
        prop_assert!(converted > Decimal::ZERO);
    }
}
