//! Currencies and conversion to the fixed base currency.

pub mod conversion;

#[cfg(test)]
mod props;

pub use conversion::Currency;
