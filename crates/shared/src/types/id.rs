//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `FirmId` where a `LocationId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(SourceId, "Unique identifier for a disclosure source.");
typed_id!(CurrencyId, "Unique identifier for a currency.");
typed_id!(UnitId, "Unique identifier for a unit of measure.");
typed_id!(MetricId, "Unique identifier for a metric.");
typed_id!(LocationId, "Unique identifier for a location.");
typed_id!(FirmId, "Unique identifier for a firm.");
typed_id!(IsinId, "Unique identifier for an ISIN record.");
typed_id!(TickerId, "Unique identifier for a ticker.");
typed_id!(SectorId, "Unique identifier for a sector.");
typed_id!(SubSectorId, "Unique identifier for a sub-sector.");
typed_id!(IndustryId, "Unique identifier for an industry.");
typed_id!(SubIndustryId, "Unique identifier for a sub-industry.");
typed_id!(CdpIndustryId, "Unique identifier for a CDP industry.");
typed_id!(CdpSectorId, "Unique identifier for a CDP sector.");
typed_id!(CdpActivityId, "Unique identifier for a CDP activity.");
typed_id!(ObservationId, "Unique identifier for a fact row.");
typed_id!(TargetId, "Unique identifier for a reduction target.");
typed_id!(TargetDataId, "Unique identifier for a target revision.");
