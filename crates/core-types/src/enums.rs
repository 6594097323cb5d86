use serde::{Deserialize, Serialize};

/// Which calendar days a series is expected to carry an observation for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    /// Valued on every calendar day, weekends and holidays included.
    CalendarEveryDay,
    /// Only meaningful on the trading days of the reference index.
    #[default]
    TradingDayRestricted,
}

impl SeriesKind {
    /// Returns true if only the trading calendar's dates are expected for this kind.
    pub fn is_trading_day_restricted(&self) -> bool {
        matches!(self, SeriesKind::TradingDayRestricted)
    }
}

/// How a period's return is computed from its two endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnMode {
    /// `(end / start - 1) * 100`, never annualized.
    Simple,
    /// CAGR once the holding period exceeds one year, simple otherwise.
    Compounded,
    /// Decided purely by the elapsed time between the endpoints.
    Auto,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_kind_deserializes_from_snake_case() {
        let kind: SeriesKind = serde_json::from_str("\"calendar_every_day\"").unwrap();
        assert_eq!(kind, SeriesKind::CalendarEveryDay);
        assert!(!kind.is_trading_day_restricted());
        assert!(SeriesKind::default().is_trading_day_restricted());
    }
}
