//! Units of measure and affine conversion through a shared default unit.
//!
//! Every unit maps onto its default unit with `default = coeff * value + const`.
//! Two units that share a default can be converted into each other by going
//! through it.

pub mod basis;
pub mod conversion;

#[cfg(test)]
mod props;

pub use basis::{Unit, UnitBasis};
pub use conversion::{UnitScale, convert, from_default, to_default};
