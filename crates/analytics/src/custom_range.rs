//! Custom Range Calculator: return and drawdown over an arbitrary `[start, end]` window,
//! gated on how much of the window the series actually covers.

use crate::drawdown::max_drawdown;
use crate::error::AnalyticsError;
use crate::returns::holding_period_return;
use calendar::{calendar_days_between, TradingCalendar};
use chrono::NaiveDate;
use configuration::CustomRangeSettings;
use core_types::{DrawdownResult, Metric, Observation, ReturnMode, Series};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Windows up to this many elapsed days resolve their endpoints on trading days.
const SHORT_WINDOW_DAYS: i64 = 7;

/// An inclusive, caller-supplied date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn elapsed_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    fn validate(&self) -> Result<(), AnalyticsError> {
        if self.end < self.start {
            return Err(AnalyticsError::InvalidDateRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

/// Outcome of a custom-range calculation for one series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CustomRangeResult {
    /// Simple or compounded return over the window.
    pub ret: Metric,
    /// Maximum drawdown restricted to the window.
    pub mdd: Option<DrawdownResult>,
    pub start: Option<Observation>,
    pub end: Option<Observation>,
    /// Share of expected dates that carry an observation.
    pub coverage: Option<Decimal>,
}

impl CustomRangeResult {
    fn unavailable() -> Self {
        Self {
            ret: Metric::Unavailable,
            mdd: None,
            start: None,
            end: None,
            coverage: None,
        }
    }

    pub fn mdd_metric(&self) -> Metric {
        self.mdd.map(|m| m.metric()).unwrap_or(Metric::Unavailable)
    }
}

/// Computes window returns and drawdowns, refusing results built from too-sparse data.
#[derive(Debug, Clone)]
pub struct CustomRangeCalculator {
    sufficiency_threshold: Decimal,
}

impl CustomRangeCalculator {
    pub fn new(settings: &CustomRangeSettings) -> Self {
        Self {
            sufficiency_threshold: settings.sufficiency_threshold,
        }
    }

    pub fn sufficiency_threshold(&self) -> Decimal {
        self.sufficiency_threshold
    }

    pub fn calculate(
        &self,
        series: &Series,
        calendar: &TradingCalendar,
        range: DateRange,
    ) -> CustomRangeResult {
        if let Err(e) = range.validate() {
            tracing::debug!(series = %series.name, reason = %e, "Custom range rejected.");
            return CustomRangeResult::unavailable();
        }

        let coverage = match coverage(series, calendar, range) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(series = %series.name, reason = %e, "Custom range coverage unavailable.");
                return CustomRangeResult::unavailable();
            }
        };

        let endpoints = resolve_range_endpoints(series, calendar, range);
        let (start, end) = match &endpoints {
            Ok((s, e)) => (Some(*s), Some(*e)),
            Err(_) => (None, None),
        };

        if coverage < self.sufficiency_threshold {
            tracing::debug!(
                series = %series.name,
                %coverage,
                threshold = %self.sufficiency_threshold,
                "Custom range data below sufficiency threshold."
            );
            return CustomRangeResult {
                start,
                end,
                coverage: Some(coverage),
                ..CustomRangeResult::unavailable()
            };
        }

        let ret = endpoints
            .and_then(|(s, e)| holding_period_return(ReturnMode::Auto, &s, &e))
            .map(Metric::percent)
            .unwrap_or_else(|e| {
                tracing::debug!(series = %series.name, reason = %e, "Custom range return unavailable.");
                Metric::Unavailable
            });

        let mdd = max_drawdown(series.window(range.start, range.end))
            .inspect_err(|e| {
                tracing::debug!(series = %series.name, reason = %e, "Custom range drawdown unavailable.");
            })
            .ok();

        CustomRangeResult {
            ret,
            mdd,
            start,
            end,
            coverage: Some(coverage),
        }
    }
}

/// Resolves the observations a custom range compares.
///
/// Windows of at most a week snap to the closest trading day with data at or before each
/// bound; longer windows take the closest observation at or before each bound.
pub fn resolve_range_endpoints(
    series: &Series,
    calendar: &TradingCalendar,
    range: DateRange,
) -> Result<(Observation, Observation), AnalyticsError> {
    range.validate()?;
    let lookup = |bound: NaiveDate| -> Result<Observation, AnalyticsError> {
        let found = if range.elapsed_days() <= SHORT_WINDOW_DAYS {
            calendar
                .nth_valid_day_at_or_before(bound, 0, series.observations())
                .and_then(|date| series.at_or_before(date))
        } else {
            series.at_or_before(bound)
        };
        found.copied().ok_or(AnalyticsError::UnresolvedEndpoint(bound))
    };

    let start = lookup(range.start)?;
    let end = lookup(range.end)?;
    if start.date >= end.date {
        return Err(AnalyticsError::InsufficientData(format!(
            "custom range {} -> {} resolves to a single observation",
            range.start, range.end
        )));
    }
    Ok((start, end))
}

/// Observations present in the window divided by the dates expected for the series' kind.
///
/// Trading-day restricted series expect the calendar's valid days and only count
/// observations on them; calendar-every-day series expect every day in the window.
pub fn coverage(
    series: &Series,
    calendar: &TradingCalendar,
    range: DateRange,
) -> Result<Decimal, AnalyticsError> {
    range.validate()?;
    let in_window = series.window(range.start, range.end);
    let (present, expected) = if series.kind.is_trading_day_restricted() {
        let present = in_window
            .iter()
            .filter(|o| calendar.is_valid_trading_day(o.date))
            .count();
        (present, calendar.count_valid_days(range.start, range.end))
    } else {
        (in_window.len(), calendar_days_between(range.start, range.end))
    };

    if expected == 0 {
        return Err(AnalyticsError::InsufficientData(format!(
            "no dates expected between {} and {}",
            range.start, range.end
        )));
    }
    Ok(Decimal::from(present) / Decimal::from(expected))
}
