//! Property-based tests for unit conversion.
//!
//! - Round trip through the default unit returns the input
//! - Round trip between two units sharing a default returns the input
//! - The identity scale leaves every value unchanged

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::conversion::{UnitScale, convert, from_default, to_default};

/// Strategy for measured values (-10,000,000.00 to 10,000,000.00).
fn value() -> impl Strategy<Value = Decimal> {
    (-1_000_000_000i64..1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for non-zero coefficients with up to 6 decimal places.
fn coeff() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000_000i64, any::<bool>()).prop_map(|(v, negative)| {
        let c = Decimal::new(v, 6);
        if negative { -c } else { c }
    })
}

/// Strategy for offsets with up to 6 decimal places.
fn constant() -> impl Strategy<Value = Decimal> {
    (-1_000_000_000i64..1_000_000_000i64).prop_map(|v| Decimal::new(v, 6))
}

fn scale() -> impl Strategy<Value = UnitScale> {
    (coeff(), constant()).prop_map(|(c, k)| UnitScale::new(c, k))
}

/// Absolute tolerance scaled to the magnitude of the input.
fn close(actual: Decimal, expected: Decimal) -> bool {
    let tolerance = Decimal::new(1, 12) * expected.abs().max(Decimal::ONE);
    (actual - expected).abs() <= tolerance
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// from_default(U, to_default(U, v)) == v.
    #[test]
    fn prop_default_round_trip(s in scale(), v in value()) {
        let back = from_default(&s, to_default(&s, v).unwrap()).unwrap();
        prop_assert!(close(back, v), "{} came back as {}", v, back);
    }

    /// convert(B, convert(A, v, B), A) == v for units sharing a default.
    #[test]
    fn prop_pairwise_round_trip(a in scale(), b in scale(), v in value()) {
        let there = convert(&a, v, &b).unwrap();
        let back = convert(&b, there, &a).unwrap();
        prop_assert!(close(back, v), "{} came back as {}", v, back);
    }

    /// coeff = 1, const = 0 is a true identity in both directions.
    #[test]
    fn prop_identity_scale(v in value()) {
        prop_assert_eq!(to_default(&UnitScale::IDENTITY, v).unwrap(), v);
        prop_assert_eq!(from_default(&UnitScale::IDENTITY, v).unwrap(), v);
    }

    /// Converting to the same unit is the identity up to rounding.
    #[test]
    fn prop_self_conversion(s in scale(), v in value()) {
        let same = convert(&s, v, &s).unwrap();
        prop_assert!(close(same, v), "{} became {}", v, same);
    }
}
