//! Affine unit conversion arithmetic.
//!
//! All arithmetic is checked `Decimal` arithmetic: an overflow or a zero
//! coefficient is reported as [`DomainError::Arithmetic`] instead of panicking.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Affine scale of a unit relative to its default unit.
///
/// Both parts are nullable in storage. A missing coefficient behaves as `1`
/// and a missing constant as `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnitScale {
    /// Multiplicative factor.
    pub coeff: Option<Decimal>,
    /// Additive offset, applied after the factor.
    #[serde(rename = "const")]
    pub constant: Option<Decimal>,
}

impl UnitScale {
    /// The identity scale (`coeff = 1`, `const = 0`).
    pub const IDENTITY: Self = Self {
        coeff: Some(Decimal::ONE),
        constant: Some(Decimal::ZERO),
    };

    /// Creates a scale with both parts set.
    #[must_use]
    pub const fn new(coeff: Decimal, constant: Decimal) -> Self {
        Self {
            coeff: Some(coeff),
            constant: Some(constant),
        }
    }

    /// Creates a purely multiplicative scale.
    #[must_use]
    pub const fn linear(coeff: Decimal) -> Self {
        Self::new(coeff, Decimal::ZERO)
    }

    /// Effective coefficient, `1` when unset.
    #[must_use]
    pub fn coeff(&self) -> Decimal {
        self.coeff.unwrap_or(Decimal::ONE)
    }

    /// Effective constant, `0` when unset.
    #[must_use]
    pub fn constant(&self) -> Decimal {
        self.constant.unwrap_or(Decimal::ZERO)
    }

    /// Returns true if converting through this scale leaves values unchanged.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.coeff() == Decimal::ONE && self.constant().is_zero()
    }

    /// Rejects scales that cannot be inverted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` if the coefficient is zero.
    pub fn validate(&self) -> DomainResult<()> {
        if self.coeff().is_zero() {
            return Err(DomainError::InvalidInput(
                "unit coefficient must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Converts `value` expressed in a unit with `scale` into its default unit.
///
/// Computes `coeff * value + const`.
///
/// # Errors
///
/// Returns `DomainError::Arithmetic` on decimal overflow.
pub fn to_default(scale: &UnitScale, value: Decimal) -> DomainResult<Decimal> {
    scale
        .coeff()
        .checked_mul(value)
        .and_then(|scaled| scaled.checked_add(scale.constant()))
        .ok_or_else(|| DomainError::Arithmetic(format!("overflow converting {value} to default unit")))
}

/// Converts a value expressed in the default unit back into a unit with `scale`.
///
/// Computes `(default_value - const) / coeff`, which is `(1 / coeff) *
/// (default_value - const)` without the intermediate rounding of `1 / coeff`.
///
/// # Errors
///
/// Returns `DomainError::Arithmetic` if the coefficient is zero or on overflow.
pub fn from_default(scale: &UnitScale, default_value: Decimal) -> DomainResult<Decimal> {
    let coeff = scale.coeff();
    if coeff.is_zero() {
        return Err(DomainError::Arithmetic(
            "cannot convert from default unit: coefficient is zero".to_string(),
        ));
    }

    default_value
        .checked_sub(scale.constant())
        .and_then(|shifted| shifted.checked_div(coeff))
        .ok_or_else(|| {
            DomainError::Arithmetic(format!("overflow converting {default_value} from default unit"))
        })
}

/// Converts `value` from one unit into another through their shared default.
///
/// Does not check that both units actually share a default unit; see
/// [`UnitBasis::convert_checked`](super::UnitBasis::convert_checked) for that.
///
/// # Errors
///
/// Returns `DomainError::Arithmetic` if the target coefficient is zero or on
/// overflow.
pub fn convert(from: &UnitScale, value: Decimal, to: &UnitScale) -> DomainResult<Decimal> {
    let default_value = to_default(from, value)?;
    from_default(to, default_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_default_is_affine() {
        // Celsius -> Kelvin
        let celsius = UnitScale::new(dec!(1), dec!(273.15));
        assert_eq!(to_default(&celsius, dec!(20)).unwrap(), dec!(293.15));

        // Fahrenheit -> Kelvin: K = 5/9 * F + 255.372222
        let fahrenheit = UnitScale::new(dec!(0.555556), dec!(255.372222));
        assert_eq!(to_default(&fahrenheit, dec!(0)).unwrap(), dec!(255.372222));
    }

    #[test]
    fn test_from_default_inverts_scale() {
        let kilotonnes = UnitScale::linear(dec!(1000));
        assert_eq!(from_default(&kilotonnes, dec!(2500)).unwrap(), dec!(2.5));

        let celsius = UnitScale::new(dec!(1), dec!(273.15));
        assert_eq!(from_default(&celsius, dec!(273.15)).unwrap(), dec!(0));
    }

    #[test]
    fn test_null_parts_behave_as_identity() {
        let unset = UnitScale::default();
        assert_eq!(unset.coeff(), Decimal::ONE);
        assert_eq!(unset.constant(), Decimal::ZERO);
        assert!(unset.is_identity());
        assert_eq!(to_default(&unset, dec!(42.5)).unwrap(), dec!(42.5));
        assert_eq!(from_default(&unset, dec!(42.5)).unwrap(), dec!(42.5));

        let only_coeff = UnitScale {
            coeff: Some(dec!(2)),
            constant: None,
        };
        assert_eq!(to_default(&only_coeff, dec!(3)).unwrap(), dec!(6));

        let only_const = UnitScale {
            coeff: None,
            constant: Some(dec!(10)),
        };
        assert_eq!(to_default(&only_const, dec!(3)).unwrap(), dec!(13));
    }

    #[test]
    fn test_identity_scale() {
        assert!(UnitScale::IDENTITY.is_identity());
        assert_eq!(to_default(&UnitScale::IDENTITY, dec!(-7.25)).unwrap(), dec!(-7.25));
        assert_eq!(from_default(&UnitScale::IDENTITY, dec!(-7.25)).unwrap(), dec!(-7.25));
    }

    #[test]
    fn test_zero_coefficient_is_arithmetic_error() {
        let broken = UnitScale::linear(Decimal::ZERO);
        assert!(matches!(
            from_default(&broken, dec!(1)),
            Err(DomainError::Arithmetic(_))
        ));
        assert!(matches!(
            convert(&UnitScale::IDENTITY, dec!(1), &broken),
            Err(DomainError::Arithmetic(_))
        ));
        // The forward direction is still defined.
        assert_eq!(to_default(&broken, dec!(5)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_validate_rejects_zero_coefficient() {
        assert!(UnitScale::linear(dec!(0.92)).validate().is_ok());
        assert!(UnitScale::default().validate().is_ok());
        assert!(matches!(
            UnitScale::linear(Decimal::ZERO).validate(),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_overflow_is_reported() {
        let huge = UnitScale::linear(Decimal::MAX);
        assert!(matches!(
            to_default(&huge, dec!(10)),
            Err(DomainError::Arithmetic(_))
        ));
    }

    #[test]
    fn test_eur_to_usd_example() {
        let usd = UnitScale::IDENTITY;
        let eur = UnitScale::linear(dec!(0.92));
        assert_eq!(convert(&eur, dec!(100), &usd).unwrap(), dec!(92));
        assert_eq!(convert(&usd, dec!(92), &eur).unwrap(), dec!(100));
    }
}
