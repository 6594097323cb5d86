use crate::period::PeriodCode;
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Rounds a percentage to the two decimals every reported metric carries.
pub fn round_pct(value: Decimal) -> Decimal {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    // Tiny negatives would otherwise round to a signed zero and print as "-0.00".
    if rounded.is_zero() { Decimal::ZERO } else { rounded }
}

/// A reported percentage, or the explicit marker that it could not be computed.
///
/// Serialized as a two-decimal string (`"10.00"`) or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    Value(Decimal),
    #[default]
    Unavailable,
}

impl Metric {
    /// Wraps a raw percentage, rounding it to two decimals.
    pub fn percent(value: Decimal) -> Self {
        Metric::Value(round_pct(value))
    }

    pub fn value(&self) -> Option<Decimal> {
        match self {
            Metric::Value(v) => Some(*v),
            Metric::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Metric::Value(_))
    }
}

impl From<Option<Decimal>> for Metric {
    fn from(value: Option<Decimal>) -> Self {
        value.map(Metric::percent).unwrap_or(Metric::Unavailable)
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Value(v) => write!(f, "{:.2}", v),
            Metric::Unavailable => f.write_str("N/A"),
        }
    }
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Metric::Value(v) => serializer.serialize_str(&format!("{:.2}", v)),
            Metric::Unavailable => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Metric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<Decimal> = Option::deserialize(deserializer)?;
        Ok(raw.map(Metric::Value).unwrap_or(Metric::Unavailable))
    }
}

/// The outcome of one catalog period for one series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnResult {
    pub period: PeriodCode,
    pub value: Metric,
    /// Date of the comparison (start) observation, when one was resolved.
    pub reference_date: Option<NaiveDate>,
    /// Date of the end observation, when one was resolved.
    pub end_date: Option<NaiveDate>,
}

impl ReturnResult {
    pub fn unavailable(period: PeriodCode) -> Self {
        Self {
            period,
            value: Metric::Unavailable,
            reference_date: None,
            end_date: None,
        }
    }
}

/// A drawdown measurement. `ratio` is a percentage in `[-100, 0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawdownResult {
    pub ratio: Decimal,
    pub peak_date: NaiveDate,
    pub trough_date: NaiveDate,
}

impl DrawdownResult {
    pub fn metric(&self) -> Metric {
        Metric::Value(self.ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_pct(dec!(1.005)), dec!(1.01));
        assert_eq!(round_pct(dec!(-25.005)), dec!(-25.01));
        assert_eq!(round_pct(dec!(13.6121335)), dec!(13.61));
        assert_eq!(Metric::percent(dec!(-0.001)).to_string(), "0.00");
    }

    #[test]
    fn serializes_as_two_decimal_string_or_null() {
        assert_eq!(serde_json::to_string(&Metric::percent(dec!(10))).unwrap(), "\"10.00\"");
        assert_eq!(serde_json::to_string(&Metric::Unavailable).unwrap(), "null");
        let back: Metric = serde_json::from_str("\"-3.25\"").unwrap();
        assert_eq!(back, Metric::Value(dec!(-3.25)));
    }

    #[test]
    fn displays_unavailable_marker() {
        assert_eq!(Metric::Unavailable.to_string(), "N/A");
        assert_eq!(Metric::percent(dec!(0.5)).to_string(), "0.50");
    }
}
