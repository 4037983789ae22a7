//! Storage limits for decimal and text columns.
//!
//! Decimal columns have a fixed number of digits and decimal places. Values
//! are rounded half away from zero to the column's decimal places, the way a
//! fixed-point column stores them; values whose integer part does not fit
//! are rejected.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{DomainError, DomainResult};

/// Digits and decimal places of a fixed-point column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalSpec {
    /// Total significant digits.
    pub max_digits: u32,
    /// Digits after the decimal point.
    pub decimal_places: u32,
}

impl DecimalSpec {
    /// Creates a spec.
    #[must_use]
    pub const fn new(max_digits: u32, decimal_places: u32) -> Self {
        Self {
            max_digits,
            decimal_places,
        }
    }

    /// Digits allowed before the decimal point.
    #[must_use]
    pub const fn integer_digits(&self) -> u32 {
        self.max_digits.saturating_sub(self.decimal_places)
    }

    /// Rounds `value` to the column scale and checks its integer part fits.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when the integer part has too many digits.
    pub fn fit(&self, field: &str, value: Decimal) -> DomainResult<Decimal> {
        let rounded =
            value.round_dp_with_strategy(self.decimal_places, RoundingStrategy::MidpointAwayFromZero);
        let integer_digits = count_integer_digits(rounded);
        if integer_digits > self.integer_digits() {
            return Err(DomainError::InvalidInput(format!(
                "{field}: {value} exceeds {} integer digits",
                self.integer_digits()
            )));
        }
        Ok(rounded)
    }

    /// [`Self::fit`] for nullable columns.
    ///
    /// # Errors
    ///
    /// Same as [`Self::fit`].
    pub fn fit_opt(&self, field: &str, value: Option<Decimal>) -> DomainResult<Option<Decimal>> {
        value.map(|v| self.fit(field, v)).transpose()
    }
}

fn count_integer_digits(value: Decimal) -> u32 {
    let mut integer = value.trunc().abs();
    let mut digits = 0;
    let ten = Decimal::TEN;
    while !integer.is_zero() {
        integer = (integer / ten).trunc();
        digits += 1;
    }
    digits
}

/// Observation values.
pub const VALUE: DecimalSpec = DecimalSpec::new(50, 2);
/// Unit coefficient and offset.
pub const UNIT_SCALE: DecimalSpec = DecimalSpec::new(10, 6);
/// Currency conversion rate.
pub const CONVERSION_RATE: DecimalSpec = DecimalSpec::new(10, 6);
/// Scope 3 share computed from supplier data.
pub const PCNT_FROM_OTHER_SOURCES: DecimalSpec = DecimalSpec::new(10, 2);
/// Targeted reduction percentage.
pub const TARGETED_REDUCTION: DecimalSpec = DecimalSpec::new(10, 2);
/// Share of total emissions a target covers.
pub const PERCENT_OF_TOTAL: DecimalSpec = DecimalSpec::new(5, 2);

/// Names of sources, units, metrics, locations, firms, ISINs, tickers and
/// taxonomy nodes.
pub const NAME_LEN: usize = 100;
/// Source url and description, metric description.
pub const DESCRIPTION_LEN: usize = 200;
/// Location code.
pub const CODE_LEN: usize = 10;
/// Firm website.
pub const SITE_LEN: usize = 500;
/// Scope 3 source and its cleaned form, target scope 3 source.
pub const SCOPE_SOURCE_LEN: usize = 100;
/// Scope 3 calculation method.
pub const CALCULATION_METHOD_LEN: usize = 300;
/// Qualitative observation text.
pub const QUALITATIVE_TEXT_LEN: usize = 2500;

/// Rejects text longer than `max` characters.
///
/// # Errors
///
/// `InvalidInput` naming the field.
pub fn check_len(field: &str, value: &str, max: usize) -> DomainResult<()> {
    let len = value.chars().count();
    if len > max {
        return Err(DomainError::InvalidInput(format!(
            "{field} is {len} characters, at most {max} allowed"
        )));
    }
    Ok(())
}

/// [`check_len`] for nullable columns.
///
/// # Errors
///
/// Same as [`check_len`].
pub fn check_len_opt(field: &str, value: Option<&str>, max: usize) -> DomainResult<()> {
    value.map_or(Ok(()), |v| check_len(field, v, max))
}

/// Rejects empty or over-long names.
///
/// # Errors
///
/// `InvalidInput` naming the field.
pub fn check_name(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::InvalidInput(format!("{field} must not be empty")));
    }
    check_len(field, value, NAME_LEN)
}
