//! Core ESG domain logic.
//!
//! This crate contains pure domain logic with ZERO database dependencies.
//! Types, validation rules and calculations live here; persistence lives in
//! `esg-db`.
//!
//! # Modules
//!
//! - `units` - Affine unit conversion through a default unit
//! - `hierarchy` - Parent-linked trees and location components
//! - `taxonomy` - Sector and CDP classification chains
//! - `vocab` - Closed vocabularies of the schema
//! - `observation` - Fact rows, their uniqueness keys and summary flags
//! - `identifiers` - ISINs and tickers
//! - `target` - Reduction targets and their revisions
//! - `currency` - Conversion to the base currency
//! - `limits` - Decimal precision and text length limits

pub mod currency;
pub mod error;
pub mod hierarchy;
pub mod identifiers;
pub mod limits;
pub mod observation;
pub mod target;
pub mod taxonomy;
pub mod units;
pub mod vocab;

pub use error::{DomainError, DomainResult};
