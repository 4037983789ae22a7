//! Closed vocabularies stored as short codes.
//!
//! Every choice field of the schema is one of these enums. Parsing is exact
//! on the stored code; anything else is rejected with
//! [`DomainError::InvalidEnumValue`] before it can reach storage.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Generates a vocabulary enum with its stored code, display label,
/// `FromStr`, `Display`, `Default` and serde impls.
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident as $field:literal, default = $default:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $code:literal, $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $code)] $variant, )+
        }

        impl $name {
            /// Every member, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Field name used in error messages.
            pub const FIELD: &'static str = $field;

            /// The code persisted in storage.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $code,)+
                }
            }

            /// Human-readable label.
            #[must_use]
            pub const fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok(Self::$variant),)+
                    _ => Err(DomainError::InvalidEnumValue {
                        field: $field,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

vocabulary! {
    /// Reporting period of an observation.
    Timescale as "timescale", default = Annual {
        /// Yearly figure.
        Annual => "annual", "annual",
        /// Quarterly figure.
        Quarterly => "quarterly", "quarterly",
        /// Monthly figure.
        Monthly => "monthly", "monthly",
        /// Weekly figure.
        Weekly => "weekly", "weekly",
        /// Daily figure.
        Daily => "daily", "daily",
        /// No fixed period.
        Irregular => "irregular", "irregular",
    }
}

vocabulary! {
    /// How a numeric value should be read.
    DataType as "datatype", default = Total {
        /// Percentage.
        Percent => "PERCENT", "%",
        /// Ratio.
        Ratio => "RATIO", ":",
        /// Absolute total.
        Total => "TOTAL", "total",
        /// Yes/no encoded as 1/0.
        Binary => "BINARY", "binary",
    }
}

vocabulary! {
    /// Scope 2 accounting method of an emissions figure.
    Scope2Scheme as "scheme", default = Unspecified {
        /// Location-based.
        Location => "LOC", "loc",
        /// Market-based.
        Market => "MKT", "mkt",
        /// Not stated.
        Unspecified => "NONE", "none",
    }
}

vocabulary! {
    /// Scope 2 accounting method a target is expressed in.
    TargetScheme as "scope2_scheme", default = Unspecified {
        /// Location-based.
        Location => "LOC", "loc",
        /// Market-based.
        Market => "MKT", "mkt",
        /// Both methods.
        Both => "LOC+MKT", "loc + mkt",
        /// Not stated.
        Unspecified => "NONE", "none",
    }
}

vocabulary! {
    /// Emission scopes a target covers.
    TargetScope as "scope", default = Unspecified {
        /// Scope 1.
        Scope1 => "1", "scope 1",
        /// Scope 2.
        Scope2 => "2", "scope 2",
        /// Scope 3.
        Scope3 => "3", "scope 3",
        /// Scopes 1 and 2.
        Scope12 => "1+2", "scope 1 and scope 2",
        /// Scopes 1 and 3.
        Scope13 => "1+3", "scope 1 and scope 3",
        /// Scopes 2 and 3.
        Scope23 => "2+3", "scope 2 and scope 3",
        /// All scopes.
        Scope123 => "1+2+3", "all scopes",
        /// Not stated.
        Unspecified => "NONE", "NONE",
    }
}

impl TargetScope {
    /// Scope numbers covered, ascending.
    #[must_use]
    pub const fn scopes(&self) -> &'static [u8] {
        match self {
            Self::Scope1 => &[1],
            Self::Scope2 => &[2],
            Self::Scope3 => &[3],
            Self::Scope12 => &[1, 2],
            Self::Scope13 => &[1, 3],
            Self::Scope23 => &[2, 3],
            Self::Scope123 => &[1, 2, 3],
            Self::Unspecified => &[],
        }
    }
}

vocabulary! {
    /// Lifecycle status of a target or one of its revisions.
    TargetStatus as "status", default = Unspecified {
        /// Reached.
        Achieved => "Achieved", "achieved",
        /// Lapsed without being reached.
        Expired => "Expired", "expired",
        /// Newly set.
        New => "New", "new",
        /// Superseded by another target.
        Replaced => "Replaced", "replaced",
        /// Withdrawn.
        Retired => "Retired", "retired",
        /// Changed since first set.
        Revised => "Revised", "revised",
        /// In progress.
        Underway => "Underway", "underway",
        /// Not stated.
        Unspecified => "NONE", "NONE",
    }
}

vocabulary! {
    /// Kind of location.
    LocationType as "loctype", default = Country {
        /// A country.
        Country => "COUNTRY", "country",
        /// A region within or across countries.
        Region => "REGION", "region",
        /// A grouping of several locations.
        Multi => "MULTI", "multi",
        /// Anything else.
        Other => "OTHER", "other",
        /// "Everywhere except" style grouping.
        Except => "EXCEPT", "except",
    }
}

vocabulary! {
    /// Emissions figure an intensity ratio is computed from.
    Numerator as "numerator", default = Hq1 {
        /// Scope 1, HQ based.
        Hq1 => "hq1", "scope 1 hq based",
        /// Scope 2, HQ based.
        Hq2 => "hq2", "scope 2 hq based",
        /// Scope 3, HQ based.
        Hq3 => "hq3", "scope 3 hq based",
        /// Scopes 1 and 2, HQ based.
        Hq12 => "hq12", "scope 1 and scope 2 hq based",
        /// Scopes 1 and 3, HQ based.
        Hq13 => "hq13", "scope 1 and scope 3 hq based",
        /// Scopes 2 and 3, HQ based.
        Hq23 => "hq23", "scope 2 and scope 3 hq based",
        /// All scopes, HQ based.
        Hq123 => "hq123", "all scopes hq based",
        /// Scope 1, location based.
        Loc1 => "loc1", "scope 1 location based",
        /// Scope 2, location based.
        Loc2 => "loc2", "scope 2 location based",
        /// Scope 3, location based.
        Loc3 => "loc3", "scope 3 location based",
        /// Scopes 1 and 2, location based.
        Loc12 => "loc12", "scope 1 and scope 2 location based",
        /// Scopes 1 and 3, location based.
        Loc13 => "loc13", "scope 1 and scope 3 location based",
        /// Scopes 2 and 3, location based.
        Loc23 => "loc23", "scope 2 and scope 3 location based",
        /// All scopes, location based.
        Loc123 => "loc123", "all scopes location based",
    }
}

impl Numerator {
    /// Returns true for the location-based variants.
    #[must_use]
    pub const fn is_location_based(&self) -> bool {
        matches!(
            self,
            Self::Loc1
                | Self::Loc2
                | Self::Loc3
                | Self::Loc12
                | Self::Loc13
                | Self::Loc23
                | Self::Loc123
        )
    }

    /// Scope numbers summed into the numerator, ascending.
    #[must_use]
    pub const fn scopes(&self) -> &'static [u8] {
        match self {
            Self::Hq1 | Self::Loc1 => &[1],
            Self::Hq2 | Self::Loc2 => &[2],
            Self::Hq3 | Self::Loc3 => &[3],
            Self::Hq12 | Self::Loc12 => &[1, 2],
            Self::Hq13 | Self::Loc13 => &[1, 3],
            Self::Hq23 | Self::Loc23 => &[2, 3],
            Self::Hq123 | Self::Loc123 => &[1, 2, 3],
        }
    }
}

vocabulary! {
    /// Activity measure an intensity ratio divides by.
    Denominator as "denominator", default = CurrentRevenue {
        /// Revenue of the reporting year.
        CurrentRevenue => "currentrevenue", "current revenue",
        /// Revenue of the base year.
        HistoricalRevenue => "historicalrevenue", "historical revenue",
        /// Headcount of the base year.
        HistoricalEmployees => "historicalemployees", "historical number of employees",
        /// Headcount of the reporting year.
        CurrentEmployees => "currentemployees", "current number of employees",
    }
}

vocabulary! {
    /// Which fact table an observation belongs to.
    ObservationKind as "kind", default = General {
        /// General quantitative metric.
        General => "general", "quantitative",
        /// Scope 1 emissions.
        Scope1 => "scope1", "scope 1",
        /// Scope 2 emissions.
        Scope2 => "scope2", "scope 2",
        /// Scope 3 emissions.
        Scope3 => "scope3", "scope 3",
        /// Emissions intensity ratio.
        Intensity => "intensity", "intensity",
        /// Free-text metric.
        Qualitative => "qualitative", "qualitative",
    }
}

impl ObservationKind {
    /// Returns true for the emissions scope tables.
    #[must_use]
    pub const fn is_emissions_scope(&self) -> bool {
        matches!(self, Self::Scope1 | Self::Scope2 | Self::Scope3)
    }

    /// Whether rows of this kind carry a `most_recent` flag.
    #[must_use]
    pub const fn tracks_most_recent(&self) -> bool {
        matches!(
            self,
            Self::General | Self::Scope1 | Self::Scope2 | Self::Scope3
        )
    }

    /// Whether rows of this kind carry a `last_available` flag.
    #[must_use]
    pub const fn tracks_last_available(&self) -> bool {
        !matches!(self, Self::Qualitative)
    }
}
