//! Security identifiers of a firm.
//!
//! A firm may have held several ISINs over time. The current one is the
//! ISIN with the latest `last_used`.

use chrono::{DateTime, Utc};
use esg_shared::types::{FirmId, IsinId, TickerId};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::limits;

/// An ISIN held by a firm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsinRecord {
    /// Record ID.
    pub id: IsinId,
    /// The ISIN itself. Unique across all firms.
    pub name: String,
    /// Holder.
    pub firm: FirmId,
    /// Last time the ISIN was seen in use.
    pub last_used: DateTime<Utc>,
}

impl IsinRecord {
    /// Creates a record.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty or over-long name.
    pub fn new(name: impl Into<String>, firm: FirmId, last_used: DateTime<Utc>) -> DomainResult<Self> {
        let name = name.into();
        limits::check_name("isin", &name)?;
        Ok(Self {
            id: IsinId::new(),
            name,
            firm,
            last_used,
        })
    }
}

/// A ticker symbol, optionally tied to a firm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    /// Ticker ID.
    pub id: TickerId,
    /// Symbol. Unique together with `firm`.
    pub name: String,
    /// Firm, cleared if the firm is deleted.
    pub firm: Option<FirmId>,
}

/// The ISIN with the latest `last_used`. Ties go to the higher record id.
///
/// # Errors
///
/// `MissingRequiredReference` when the firm has no ISIN.
pub fn current_isin<'a, I>(firm: &str, records: I) -> DomainResult<&'a IsinRecord>
where
    I: IntoIterator<Item = &'a IsinRecord>,
{
    records
        .into_iter()
        .max_by_key(|r| (r.last_used, r.id))
        .ok_or_else(|| DomainError::MissingRequiredReference {
            entity: "isin",
            detail: format!("firm {firm} has no ISIN"),
        })
}
