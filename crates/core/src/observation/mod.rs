//! Fact rows.
//!
//! General metrics, the three emissions scopes, intensity ratios and
//! qualitative metrics share one [`Observation`] shape. What differs per kind
//! lives in [`ObservationDetail`], and each kind supplies its own uniqueness
//! key through [`ObservationKey`].

pub mod flags;
pub mod key;
pub mod types;

#[cfg(test)]
mod flags_props;
#[cfg(test)]
mod key_props;

pub use flags::{FirmCoverage, RecencyUpdate, recompute_recency};
pub use key::{KeyField, KeyPart, ObservationKey, key_fields};
pub use types::{
    Measurement, Observation, ObservationDetail, Revision, Scope3Detail,
};
