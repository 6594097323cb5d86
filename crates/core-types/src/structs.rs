use crate::enums::SeriesKind;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

/// A single dated valuation. Values stored in a `Series` are always > 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: Decimal,
}

impl Observation {
    pub fn new(date: NaiveDate, value: Decimal) -> Self {
        Self { date, value }
    }
}

/// A named, date-ordered valuation series.
///
/// Observations are strictly ascending by date with no duplicates. The store is
/// the only producer of `Series`, so lookups below rely on that ordering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub kind: SeriesKind,
    observations: Vec<Observation>,
}

impl Series {
    /// Builds a series from observations that are already sorted and deduplicated.
    pub fn new(name: impl Into<String>, kind: SeriesKind, observations: Vec<Observation>) -> Self {
        debug_assert!(observations.windows(2).all(|w| w[0].date < w[1].date));
        Self {
            name: name.into(),
            kind,
            observations,
        }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    /// The most recent observation at or before `as_of`, or the last one when no cutoff is given.
    pub fn latest(&self, as_of: Option<NaiveDate>) -> Option<&Observation> {
        match as_of {
            Some(cutoff) => at_or_before(&self.observations, cutoff),
            None => self.last(),
        }
    }

    pub fn at_or_before(&self, date: NaiveDate) -> Option<&Observation> {
        at_or_before(&self.observations, date)
    }

    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> &[Observation] {
        window(&self.observations, start, end)
    }

    pub fn up_to(&self, cutoff: NaiveDate) -> &[Observation] {
        up_to(&self.observations, cutoff)
    }
}

/// Closest observation dated on or before `date`.
pub fn at_or_before(observations: &[Observation], date: NaiveDate) -> Option<&Observation> {
    let idx = observations.partition_point(|o| o.date <= date);
    idx.checked_sub(1).map(|i| &observations[i])
}

/// Observations inside the inclusive `[start, end]` window. Empty when `end < start`.
pub fn window(observations: &[Observation], start: NaiveDate, end: NaiveDate) -> &[Observation] {
    if end < start {
        return &[];
    }
    let lo = observations.partition_point(|o| o.date < start);
    let hi = observations.partition_point(|o| o.date <= end);
    &observations[lo..hi]
}

/// Observations dated on or before `cutoff`.
pub fn up_to(observations: &[Observation], cutoff: NaiveDate) -> &[Observation] {
    let hi = observations.partition_point(|o| o.date <= cutoff);
    &observations[..hi]
}

/// A value exactly as it arrives from an upstream collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Parses the raw value into a decimal. Returns `None` for anything non-numeric.
    ///
    /// Text may carry surrounding whitespace, thousands separators or scientific notation.
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            RawValue::Number(n) if n.is_finite() => Decimal::from_f64(*n),
            RawValue::Number(_) => None,
            RawValue::Text(text) => {
                let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
                if cleaned.is_empty() {
                    return None;
                }
                Decimal::from_str(&cleaned)
                    .or_else(|_| Decimal::from_scientific(&cleaned))
                    .ok()
            }
        }
    }
}

/// One unvalidated input row.
///
/// Deserialization never fails on a single row: an unparseable date, a value of the
/// wrong JSON type, or a row that is not an object at all leaves the affected fields
/// `None`, and the row is dropped later as invalid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRowRepr")]
pub struct RawRow {
    pub date: Option<NaiveDate>,
    pub value: Option<RawValue>,
}

impl RawRow {
    pub fn new(date: NaiveDate, value: RawValue) -> Self {
        Self {
            date: Some(date),
            value: Some(value),
        }
    }

    /// Converts the row into an observation if its date parsed and its value is numeric
    /// and strictly positive.
    pub fn to_observation(&self) -> Option<Observation> {
        let date = self.date?;
        let value = self.value.as_ref()?.to_decimal()?;
        if value <= Decimal::ZERO {
            return None;
        }
        Some(Observation::new(date, value))
    }
}

/// Any JSON value, kept only when it parses as `T`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Parsed(T),
    Unparsed(IgnoredAny),
}

impl<T> Lenient<T> {
    fn parsed(self) -> Option<T> {
        match self {
            Lenient::Parsed(value) => Some(value),
            Lenient::Unparsed(_) => None,
        }
    }
}

#[derive(Deserialize)]
struct RawRowFields {
    #[serde(default)]
    date: Option<Lenient<NaiveDate>>,
    #[serde(default)]
    value: Option<Lenient<RawValue>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRowRepr {
    Fields(RawRowFields),
    Malformed(IgnoredAny),
}

impl From<RawRowRepr> for RawRow {
    fn from(repr: RawRowRepr) -> Self {
        match repr {
            RawRowRepr::Fields(fields) => RawRow {
                date: fields.date.and_then(Lenient::parsed),
                value: fields.value.and_then(Lenient::parsed),
            },
            RawRowRepr::Malformed(_) => RawRow { date: None, value: None },
        }
    }
}
