use crate::enums::ReturnMode;
use crate::error::CoreError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The fixed set of reporting periods. Ordering follows the catalog, shortest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PeriodCode {
    OneDay,
    TwoDays,
    ThreeDays,
    OneWeek,
    OneMonth,
    ThreeMonths,
    SixMonths,
    NineMonths,
    OneYear,
    TwoYears,
    ThreeYears,
    FourYears,
    FiveYears,
    SinceInception,
}

impl PeriodCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodCode::OneDay => "1D",
            PeriodCode::TwoDays => "2D",
            PeriodCode::ThreeDays => "3D",
            PeriodCode::OneWeek => "1W",
            PeriodCode::OneMonth => "1M",
            PeriodCode::ThreeMonths => "3M",
            PeriodCode::SixMonths => "6M",
            PeriodCode::NineMonths => "9M",
            PeriodCode::OneYear => "1Y",
            PeriodCode::TwoYears => "2Y",
            PeriodCode::ThreeYears => "3Y",
            PeriodCode::FourYears => "4Y",
            PeriodCode::FiveYears => "5Y",
            PeriodCode::SinceInception => "SinceInception",
        }
    }

    /// Looks up the catalog entry for this code.
    pub fn definition(&self) -> &'static PeriodDefinition {
        // Every code has exactly one catalog row, in declaration order.
        &PERIOD_CATALOG[*self as usize]
    }
}

impl fmt::Display for PeriodCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PERIOD_CATALOG
            .iter()
            .map(|def| def.code)
            .find(|code| code.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::UnknownPeriod(s.to_string()))
    }
}

impl Serialize for PeriodCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PeriodCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// How far back a period reaches from its latest observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodLength {
    /// N trading days on the reference calendar.
    TradingDays(u32),
    Months(u32),
    Years(u32),
    /// Back to the series' first observation.
    Inception,
}

/// One row of the period catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodDefinition {
    pub code: PeriodCode,
    pub length: PeriodLength,
    pub return_mode: ReturnMode,
    /// Endpoints snap to valid trading days for every series, whatever its kind.
    pub trading_day_aligned: bool,
}

impl PeriodDefinition {
    const fn new(
        code: PeriodCode,
        length: PeriodLength,
        return_mode: ReturnMode,
        trading_day_aligned: bool,
    ) -> Self {
        Self {
            code,
            length,
            return_mode,
            trading_day_aligned,
        }
    }
}

/// The process-wide period catalog.
pub static PERIOD_CATALOG: [PeriodDefinition; 14] = [
    PeriodDefinition::new(PeriodCode::OneDay, PeriodLength::TradingDays(1), ReturnMode::Simple, true),
    PeriodDefinition::new(PeriodCode::TwoDays, PeriodLength::TradingDays(2), ReturnMode::Simple, true),
    PeriodDefinition::new(PeriodCode::ThreeDays, PeriodLength::TradingDays(3), ReturnMode::Simple, true),
    PeriodDefinition::new(PeriodCode::OneWeek, PeriodLength::TradingDays(5), ReturnMode::Simple, true),
    PeriodDefinition::new(PeriodCode::OneMonth, PeriodLength::Months(1), ReturnMode::Simple, false),
    PeriodDefinition::new(PeriodCode::ThreeMonths, PeriodLength::Months(3), ReturnMode::Simple, false),
    PeriodDefinition::new(PeriodCode::SixMonths, PeriodLength::Months(6), ReturnMode::Simple, false),
    PeriodDefinition::new(PeriodCode::NineMonths, PeriodLength::Months(9), ReturnMode::Simple, false),
    PeriodDefinition::new(PeriodCode::OneYear, PeriodLength::Years(1), ReturnMode::Compounded, false),
    PeriodDefinition::new(PeriodCode::TwoYears, PeriodLength::Years(2), ReturnMode::Compounded, false),
    PeriodDefinition::new(PeriodCode::ThreeYears, PeriodLength::Years(3), ReturnMode::Compounded, false),
    PeriodDefinition::new(PeriodCode::FourYears, PeriodLength::Years(4), ReturnMode::Compounded, false),
    PeriodDefinition::new(PeriodCode::FiveYears, PeriodLength::Years(5), ReturnMode::Compounded, false),
    PeriodDefinition::new(PeriodCode::SinceInception, PeriodLength::Inception, ReturnMode::Auto, false),
];
