//! Per-kind uniqueness keys.
//!
//! Each fact table has its own key tuple:
//!
//! | kind | key |
//! |---|---|
//! | general, scope1, scope3 | unit, location_based, metric, location, timescale, date, source, publication_date, firm |
//! | scope2 | the above plus scheme |
//! | intensity | date, numerator, denominator, firm |
//! | qualitative | metric, location, timescale, date, source, publication_date |
//!
//! Missing parts compare equal to each other, so two rows that differ only
//! in which nullable parts are unset are still duplicates when those parts
//! are unset in both.

use std::fmt::{self, Write};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::{Observation, ObservationDetail};
use crate::vocab::ObservationKind;

/// A field that can take part in a key tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyField {
    /// Unit of the value.
    Unit,
    /// Location-based flag.
    LocationBased,
    /// Metric.
    Metric,
    /// Location.
    Location,
    /// Timescale.
    Timescale,
    /// Observation date.
    Date,
    /// Source.
    Source,
    /// Publication date.
    PublicationDate,
    /// Firm.
    Firm,
    /// Scope 2 scheme.
    Scheme,
    /// Intensity numerator.
    Numerator,
    /// Intensity denominator.
    Denominator,
}

impl KeyField {
    /// Column name of the field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::LocationBased => "location_based",
            Self::Metric => "metric",
            Self::Location => "location",
            Self::Timescale => "timescale",
            Self::Date => "date",
            Self::Source => "source",
            Self::PublicationDate => "publication_date",
            Self::Firm => "firm",
            Self::Scheme => "scheme",
            Self::Numerator => "numerator",
            Self::Denominator => "denominator",
        }
    }

    /// Fields that identify a publication rather than a series.
    #[must_use]
    pub const fn is_publication_field(&self) -> bool {
        matches!(self, Self::Date | Self::Source | Self::PublicationDate)
    }
}

const MEASUREMENT_KEY: &[KeyField] = &[
    KeyField::Unit,
    KeyField::LocationBased,
    KeyField::Metric,
    KeyField::Location,
    KeyField::Timescale,
    KeyField::Date,
    KeyField::Source,
    KeyField::PublicationDate,
    KeyField::Firm,
];

const SCOPE2_KEY: &[KeyField] = &[
    KeyField::Unit,
    KeyField::LocationBased,
    KeyField::Metric,
    KeyField::Location,
    KeyField::Timescale,
    KeyField::Date,
    KeyField::Source,
    KeyField::PublicationDate,
    KeyField::Firm,
    KeyField::Scheme,
];

const INTENSITY_KEY: &[KeyField] = &[
    KeyField::Date,
    KeyField::Numerator,
    KeyField::Denominator,
    KeyField::Firm,
];

const QUALITATIVE_KEY: &[KeyField] = &[
    KeyField::Metric,
    KeyField::Location,
    KeyField::Timescale,
    KeyField::Date,
    KeyField::Source,
    KeyField::PublicationDate,
];

/// Key tuple of a fact table.
#[must_use]
pub const fn key_fields(kind: ObservationKind) -> &'static [KeyField] {
    match kind {
        ObservationKind::General | ObservationKind::Scope1 | ObservationKind::Scope3 => {
            MEASUREMENT_KEY
        }
        ObservationKind::Scope2 => SCOPE2_KEY,
        ObservationKind::Intensity => INTENSITY_KEY,
        ObservationKind::Qualitative => QUALITATIVE_KEY,
    }
}

/// Value of one key field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPart {
    /// Unset.
    Null,
    /// A flag.
    Flag(bool),
    /// A reference.
    Id(Uuid),
    /// A vocabulary code.
    Code(&'static str),
    /// A timestamp.
    Time(DateTime<Utc>),
}

impl KeyPart {
    fn id<T: Into<Uuid>>(id: Option<T>) -> Self {
        id.map_or(Self::Null, |v| Self::Id(v.into()))
    }

    fn time(at: Option<DateTime<Utc>>) -> Self {
        at.map_or(Self::Null, Self::Time)
    }

    /// True when the part is unset.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("~"),
            Self::Flag(b) => f.write_str(if *b { "1" } else { "0" }),
            Self::Id(id) => write!(f, "{}", id.hyphenated()),
            Self::Code(code) => f.write_str(code),
            Self::Time(at) => f.write_str(&at.to_rfc3339_opts(SecondsFormat::Micros, true)),
        }
    }
}

/// The key tuple of one observation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObservationKey {
    kind: ObservationKind,
    parts: Vec<(KeyField, KeyPart)>,
}

impl ObservationKey {
    /// Builds the key of `observation` from its kind's key fields.
    #[must_use]
    pub fn of(observation: &Observation) -> Self {
        let kind = observation.kind();
        let parts = key_fields(kind)
            .iter()
            .map(|field| (*field, part(observation, *field)))
            .collect();
        Self { kind, parts }
    }

    /// Fact table of the key.
    #[must_use]
    pub const fn kind(&self) -> ObservationKind {
        self.kind
    }

    /// Field/value pairs in key order.
    #[must_use]
    pub fn parts(&self) -> &[(KeyField, KeyPart)] {
        &self.parts
    }

    /// Value of `field`, `None` if the field is not part of this key.
    #[must_use]
    pub fn get(&self, field: KeyField) -> Option<KeyPart> {
        self.parts
            .iter()
            .find_map(|(f, p)| (*f == field).then_some(*p))
    }

    /// Stable text form of the whole key. Equal keys give equal strings.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        self.render(|_| true)
    }

    /// Text form of the key without date, source and publication date.
    ///
    /// Rows sharing this identify one time series.
    #[must_use]
    pub fn series_fingerprint(&self) -> String {
        self.render(|field| !field.is_publication_field())
    }

    /// Series fingerprint plus the observation date.
    #[must_use]
    pub fn dated_series_fingerprint(&self) -> String {
        self.render(|field| !matches!(field, KeyField::Source | KeyField::PublicationDate))
    }

    fn render(&self, include: impl Fn(KeyField) -> bool) -> String {
        let mut out = String::from(self.kind.as_str());
        for (field, part) in self.parts.iter().filter(|(f, _)| include(*f)) {
            // Writing into a String cannot fail.
            let _ = write!(out, "|{}={part}", field.as_str());
        }
        out
    }
}

impl fmt::Display for ObservationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .parts
            .iter()
            .map(|(field, part)| format!("{}={part}", field.as_str()))
            .collect();
        write!(f, "{}({})", self.kind, rendered.join(", "))
    }
}

fn part(observation: &Observation, field: KeyField) -> KeyPart {
    let detail = &observation.detail;
    match field {
        KeyField::Unit => KeyPart::id(detail.unit()),
        KeyField::LocationBased => detail
            .location_based()
            .map_or(KeyPart::Null, KeyPart::Flag),
        KeyField::Metric => KeyPart::id(detail.metric()),
        KeyField::Location => KeyPart::id(observation.location),
        KeyField::Timescale => KeyPart::Code(observation.timescale.as_str()),
        KeyField::Date => KeyPart::Time(observation.date),
        KeyField::Source => KeyPart::id(observation.source),
        KeyField::PublicationDate => KeyPart::time(observation.publication_date),
        KeyField::Firm => KeyPart::Id(observation.firm.into()),
        KeyField::Scheme => match detail {
            ObservationDetail::Scope2 { scheme, .. } => KeyPart::Code(scheme.as_str()),
            _ => KeyPart::Null,
        },
        KeyField::Numerator => match detail {
            ObservationDetail::Intensity { numerator, .. } => KeyPart::Code(numerator.as_str()),
            _ => KeyPart::Null,
        },
        KeyField::Denominator => match detail {
            ObservationDetail::Intensity { denominator, .. } => {
                KeyPart::Code(denominator.as_str())
            }
            _ => KeyPart::Null,
        },
    }
}

impl Observation {
    /// Key tuple of this row.
    #[must_use]
    pub fn key(&self) -> ObservationKey {
        ObservationKey::of(self)
    }
}
