//! Observation types.

use chrono::{DateTime, SubsecRound, Utc};
use esg_shared::types::{CurrencyId, FirmId, LocationId, MetricId, ObservationId, SourceId, UnitId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DomainResult;
use crate::limits;
use crate::vocab::{DataType, Denominator, Numerator, ObservationKind, Scope2Scheme, Timescale};

/// A numeric value of a metric in some unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    /// Metric measured.
    pub metric: MetricId,
    /// Reported value. `None` when disclosed as unavailable.
    pub value: Option<Decimal>,
    /// Unit of `value`. Cleared when the unit is deleted.
    pub unit: Option<UnitId>,
    /// How to read `value`.
    pub datatype: DataType,
    /// Location-based rather than HQ-based accounting.
    pub location_based: bool,
}

impl Measurement {
    /// A total of `metric` with no unit yet.
    #[must_use]
    pub fn new(metric: MetricId, value: Option<Decimal>) -> Self {
        Self {
            metric,
            value,
            unit: None,
            datatype: DataType::default(),
            location_based: false,
        }
    }

    /// Sets the unit.
    #[must_use]
    pub const fn in_unit(mut self, unit: UnitId) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Sets the datatype.
    #[must_use]
    pub const fn with_datatype(mut self, datatype: DataType) -> Self {
        self.datatype = datatype;
        self
    }

    /// Marks the value as location-based.
    #[must_use]
    pub const fn with_location_based(mut self, location_based: bool) -> Self {
        self.location_based = location_based;
        self
    }
}

/// How an emissions figure was produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    /// Interpolated between disclosed figures.
    pub interpolation: bool,
    /// Restated after first publication.
    pub amendment: bool,
}

/// Scope 3 attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope3Detail {
    /// Upstream or downstream category as disclosed.
    pub scope_source: Option<String>,
    /// Calculation method as disclosed.
    pub calculation_method: Option<String>,
    /// `scope_source` mapped onto a standard category.
    pub scope_source_cleaned: Option<String>,
    /// The category is the firm's most common one.
    pub most_common_scope_source: bool,
    /// Share of emissions computed from supplier or value chain data.
    pub pcnt_from_other_sources: Option<Decimal>,
    /// The supplier-data share is the firm's most common source.
    pub most_common_source: bool,
}

/// Kind-specific part of an observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ObservationDetail {
    /// General quantitative metric.
    #[serde(rename = "general")]
    General {
        /// Value and unit.
        measurement: Measurement,
        /// Currency of a monetary value.
        currency: Option<CurrencyId>,
        /// Whether the value is in the firm's own currency.
        native_currency: Option<bool>,
    },
    /// Scope 1 emissions.
    #[serde(rename = "scope1")]
    Scope1 {
        /// Value and unit.
        measurement: Measurement,
        /// Interpolation and amendment flags.
        revision: Revision,
    },
    /// Scope 2 emissions.
    #[serde(rename = "scope2")]
    Scope2 {
        /// Value and unit.
        measurement: Measurement,
        /// Interpolation and amendment flags.
        revision: Revision,
        /// Location- or market-based method.
        scheme: Scope2Scheme,
    },
    /// Scope 3 emissions.
    #[serde(rename = "scope3")]
    Scope3 {
        /// Value and unit.
        measurement: Measurement,
        /// Interpolation and amendment flags.
        revision: Revision,
        /// Scope 3 attributes.
        detail: Scope3Detail,
    },
    /// Emissions per unit of activity.
    #[serde(rename = "intensity")]
    Intensity {
        /// Emissions figure.
        numerator: Numerator,
        /// Activity figure.
        denominator: Denominator,
        /// Ratio.
        value: Option<Decimal>,
        /// Location-based rather than HQ-based accounting.
        location_based: bool,
    },
    /// Free-text metric.
    #[serde(rename = "qualitative")]
    Qualitative {
        /// Metric described.
        metric: MetricId,
        /// Text, at most 2500 characters.
        text: Option<String>,
    },
}

impl ObservationDetail {
    /// A general metric without currency information.
    #[must_use]
    pub const fn general(measurement: Measurement) -> Self {
        Self::General {
            measurement,
            currency: None,
            native_currency: None,
        }
    }

    /// Scope 1 emissions.
    #[must_use]
    pub fn scope1(measurement: Measurement) -> Self {
        Self::Scope1 {
            measurement,
            revision: Revision::default(),
        }
    }

    /// Scope 2 emissions under `scheme`.
    #[must_use]
    pub fn scope2(measurement: Measurement, scheme: Scope2Scheme) -> Self {
        Self::Scope2 {
            measurement,
            revision: Revision::default(),
            scheme,
        }
    }

    /// Scope 3 emissions.
    #[must_use]
    pub fn scope3(measurement: Measurement, detail: Scope3Detail) -> Self {
        Self::Scope3 {
            measurement,
            revision: Revision::default(),
            detail,
        }
    }

    /// Which fact table this detail belongs to.
    #[must_use]
    pub const fn kind(&self) -> ObservationKind {
        match self {
            Self::General { .. } => ObservationKind::General,
            Self::Scope1 { .. } => ObservationKind::Scope1,
            Self::Scope2 { .. } => ObservationKind::Scope2,
            Self::Scope3 { .. } => ObservationKind::Scope3,
            Self::Intensity { .. } => ObservationKind::Intensity,
            Self::Qualitative { .. } => ObservationKind::Qualitative,
        }
    }

    /// The measurement of quantitative kinds.
    #[must_use]
    pub const fn measurement(&self) -> Option<&Measurement> {
        match self {
            Self::General { measurement, .. }
            | Self::Scope1 { measurement, .. }
            | Self::Scope2 { measurement, .. }
            | Self::Scope3 { measurement, .. } => Some(measurement),
            Self::Intensity { .. } | Self::Qualitative { .. } => None,
        }
    }

    fn measurement_mut(&mut self) -> Option<&mut Measurement> {
        match self {
            Self::General { measurement, .. }
            | Self::Scope1 { measurement, .. }
            | Self::Scope2 { measurement, .. }
            | Self::Scope3 { measurement, .. } => Some(measurement),
            Self::Intensity { .. } | Self::Qualitative { .. } => None,
        }
    }

    /// Interpolation and amendment flags of the emissions kinds.
    #[must_use]
    pub const fn revision(&self) -> Option<Revision> {
        match self {
            Self::Scope1 { revision, .. }
            | Self::Scope2 { revision, .. }
            | Self::Scope3 { revision, .. } => Some(*revision),
            _ => None,
        }
    }

    /// Metric, for every kind but intensity.
    #[must_use]
    pub fn metric(&self) -> Option<MetricId> {
        match self {
            Self::Qualitative { metric, .. } => Some(*metric),
            _ => self.measurement().map(|m| m.metric),
        }
    }

    /// Numeric value, if the kind has one and it is set.
    #[must_use]
    pub fn value(&self) -> Option<Decimal> {
        match self {
            Self::Intensity { value, .. } => *value,
            Self::Qualitative { .. } => None,
            _ => self.measurement().and_then(|m| m.value),
        }
    }

    /// Unit of the value.
    #[must_use]
    pub fn unit(&self) -> Option<UnitId> {
        self.measurement().and_then(|m| m.unit)
    }

    /// Location-based flag. Qualitative rows have none.
    #[must_use]
    pub fn location_based(&self) -> Option<bool> {
        match self {
            Self::Intensity { location_based, .. } => Some(*location_based),
            _ => self.measurement().map(|m| m.location_based),
        }
    }

    /// Whether the row carries anything worth reporting.
    #[must_use]
    pub fn has_value(&self) -> bool {
        match self {
            Self::Qualitative { text, .. } => text.as_deref().is_some_and(|t| !t.is_empty()),
            _ => self.value().is_some(),
        }
    }

    /// Clears the unit reference, leaving the value untouched.
    pub fn clear_unit(&mut self) {
        if let Some(m) = self.measurement_mut() {
            m.unit = None;
        }
    }

    /// Sets the interpolation and amendment flags. No-op for other kinds.
    #[must_use]
    pub fn with_revision(mut self, new: Revision) -> Self {
        if let Self::Scope1 { revision, .. }
        | Self::Scope2 { revision, .. }
        | Self::Scope3 { revision, .. } = &mut self
        {
            *revision = new;
        }
        self
    }
}

/// One fact row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Row ID.
    pub id: ObservationId,
    /// Reporting firm.
    pub firm: FirmId,
    /// Date the figure refers to.
    pub date: DateTime<Utc>,
    /// Location the figure covers.
    pub location: Option<LocationId>,
    /// Where the figure was published.
    pub source: Option<SourceId>,
    /// Reporting period.
    pub timescale: Timescale,
    /// Projected rather than reported.
    pub forecast: bool,
    /// Latest publication for its series and date.
    pub most_recent: bool,
    /// Latest non-forecast figure with a value in its series.
    pub last_available: bool,
    /// When the figure was published.
    pub publication_date: Option<DateTime<Utc>>,
    /// Kind-specific part.
    #[serde(flatten)]
    pub detail: ObservationDetail,
}

impl Observation {
    /// A new annual, non-forecast observation with no location or source.
    ///
    /// Timestamps are truncated to microseconds, the precision they are
    /// stored with.
    #[must_use]
    pub fn new(firm: FirmId, date: DateTime<Utc>, detail: ObservationDetail) -> Self {
        Self {
            id: ObservationId::new(),
            firm,
            date: date.trunc_subsecs(6),
            location: None,
            source: None,
            timescale: Timescale::default(),
            forecast: false,
            most_recent: false,
            last_available: false,
            publication_date: None,
            detail,
        }
    }

    /// Sets the location.
    #[must_use]
    pub fn at(mut self, location: LocationId) -> Self {
        self.location = Some(location);
        self
    }

    /// Sets the source.
    #[must_use]
    pub fn from_source(mut self, source: SourceId) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets the timescale.
    #[must_use]
    pub fn with_timescale(mut self, timescale: Timescale) -> Self {
        self.timescale = timescale;
        self
    }

    /// Sets the publication date.
    #[must_use]
    pub fn published(mut self, at: DateTime<Utc>) -> Self {
        self.publication_date = Some(at.trunc_subsecs(6));
        self
    }

    /// Marks the observation as a forecast.
    #[must_use]
    pub fn as_forecast(mut self) -> Self {
        self.forecast = true;
        self
    }

    /// Which fact table this row belongs to.
    #[must_use]
    pub const fn kind(&self) -> ObservationKind {
        self.detail.kind()
    }

    /// Checks text lengths and rounds decimals to their stored precision.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when a text is too long or a decimal does not fit.
    pub fn normalized(mut self) -> DomainResult<Self> {
        match &mut self.detail {
            ObservationDetail::General { measurement, .. }
            | ObservationDetail::Scope1 { measurement, .. }
            | ObservationDetail::Scope2 { measurement, .. } => {
                measurement.value = limits::VALUE.fit_opt("value", measurement.value)?;
            }
            ObservationDetail::Scope3 {
                measurement,
                detail,
                ..
            } => {
                measurement.value = limits::VALUE.fit_opt("value", measurement.value)?;
                limits::check_len_opt(
                    "scope_source",
                    detail.scope_source.as_deref(),
                    limits::SCOPE_SOURCE_LEN,
                )?;
                limits::check_len_opt(
                    "scope_source_cleaned",
                    detail.scope_source_cleaned.as_deref(),
                    limits::SCOPE_SOURCE_LEN,
                )?;
                limits::check_len_opt(
                    "calculation_method",
                    detail.calculation_method.as_deref(),
                    limits::CALCULATION_METHOD_LEN,
                )?;
                detail.pcnt_from_other_sources = limits::PCNT_FROM_OTHER_SOURCES
                    .fit_opt("scp3_pcnt_from_other_sources", detail.pcnt_from_other_sources)?;
            }
            ObservationDetail::Intensity { value, .. } => {
                *value = limits::VALUE.fit_opt("value", *value)?;
            }
            ObservationDetail::Qualitative { text, .. } => {
                limits::check_len_opt("value", text.as_deref(), limits::QUALITATIVE_TEXT_LEN)?;
            }
        }
        self.date = self.date.trunc_subsecs(6);
        self.publication_date = self.publication_date.map(|p| p.trunc_subsecs(6));
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainError;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 12, 31, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_defaults() {
        let obs = Observation::new(
            FirmId::new(),
            date(),
            ObservationDetail::general(Measurement::new(MetricId::new(), Some(dec!(1)))),
        );
        assert_eq!(obs.timescale, Timescale::Annual);
        assert!(!obs.forecast && !obs.most_recent && !obs.last_available);
        assert_eq!(obs.kind(), ObservationKind::General);
        assert_eq!(obs.detail.measurement().map(|m| m.datatype), Some(DataType::Total));
    }

    #[test]
    fn test_accessors_per_kind() {
        let metric = MetricId::new();
        let unit = UnitId::new();
        let scope2 = ObservationDetail::scope2(
            Measurement::new(metric, Some(dec!(5))).in_unit(unit),
            Scope2Scheme::Market,
        );
        assert_eq!(scope2.metric(), Some(metric));
        assert_eq!(scope2.unit(), Some(unit));
        assert_eq!(scope2.value(), Some(dec!(5)));
        assert_eq!(scope2.revision(), Some(Revision::default()));

        let intensity = ObservationDetail::Intensity {
            numerator: Numerator::Hq12,
            denominator: Denominator::CurrentRevenue,
            value: Some(dec!(0.4)),
            location_based: true,
        };
        assert_eq!(intensity.metric(), None);
        assert_eq!(intensity.unit(), None);
        assert_eq!(intensity.location_based(), Some(true));

        let qual = ObservationDetail::Qualitative {
            metric,
            text: Some(String::new()),
        };
        assert_eq!(qual.location_based(), None);
        assert!(!qual.has_value());
    }

    #[test]
    fn test_clear_unit_keeps_value() {
        let mut detail = ObservationDetail::scope1(
            Measurement::new(MetricId::new(), Some(dec!(42.5))).in_unit(UnitId::new()),
        );
        detail.clear_unit();
        assert_eq!(detail.unit(), None);
        assert_eq!(detail.value(), Some(dec!(42.5)));
    }

    #[test]
    fn test_with_revision() {
        let revision = Revision {
            interpolation: true,
            amendment: false,
        };
        let detail =
            ObservationDetail::scope1(Measurement::new(MetricId::new(), None)).with_revision(revision);
        assert_eq!(detail.revision(), Some(revision));
        let general =
            ObservationDetail::general(Measurement::new(MetricId::new(), None)).with_revision(revision);
        assert_eq!(general.revision(), None);
    }

    #[test]
    fn test_normalized_rounds_values() {
        let obs = Observation::new(
            FirmId::new(),
            date(),
            ObservationDetail::scope3(
                Measurement::new(MetricId::new(), Some(dec!(10.005))),
                Scope3Detail {
                    pcnt_from_other_sources: Some(dec!(33.333)),
                    ..Scope3Detail::default()
                },
            ),
        )
        .normalized()
        .unwrap();
        assert_eq!(obs.detail.value(), Some(dec!(10.01)));
        let ObservationDetail::Scope3 { detail, .. } = &obs.detail else {
            panic!("expected scope3");
        };
        assert_eq!(detail.pcnt_from_other_sources, Some(dec!(33.33)));
    }

    #[test]
    fn test_normalized_rejects_long_text() {
        let obs = Observation::new(
            FirmId::new(),
            date(),
            ObservationDetail::Qualitative {
                metric: MetricId::new(),
                text: Some("x".repeat(limits::QUALITATIVE_TEXT_LEN + 1)),
            },
        );
        assert!(matches!(obs.normalized(), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn test_serde_tags_kind() {
        let obs = Observation::new(
            FirmId::new(),
            date(),
            ObservationDetail::Intensity {
                numerator: Numerator::Loc1,
                denominator: Denominator::CurrentEmployees,
                value: None,
                location_based: true,
            },
        );
        let json = serde_json::to_value(&obs).unwrap();
        assert_eq!(json["kind"], "intensity");
        assert_eq!(json["numerator"], "loc1");
        let back: Observation = serde_json::from_value(json).unwrap();
        assert_eq!(back, obs);
    }
}
