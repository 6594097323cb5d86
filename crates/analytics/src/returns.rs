//! Period Return Calculator.
//!
//! Resolves each catalog period's endpoints for a series and applies the simple or
//! compounded formula. Every catalog code always gets a `ReturnResult`; a period whose
//! endpoints cannot be resolved is `Unavailable`, never zero and never omitted.

use crate::error::AnalyticsError;
use calendar::TradingCalendar;
use chrono::{Months, NaiveDate};
use core_types::{
    Metric, Observation, PeriodCode, PeriodDefinition, PeriodLength, ReturnMode, ReturnResult,
    Series, PERIOD_CATALOG,
};
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

/// Day-count basis for every annualization in the workspace.
pub const DAYS_PER_YEAR: Decimal = dec!(365.25);

const HUNDRED: Decimal = dec!(100);

/// Converts an elapsed day count into years.
pub fn year_fraction(days: i64) -> Decimal {
    Decimal::from(days) / DAYS_PER_YEAR
}

/// `(end / start - 1) * 100`, unrounded.
pub fn simple_return(start: Decimal, end: Decimal) -> Result<Decimal, AnalyticsError> {
    if start <= Decimal::ZERO {
        return Err(AnalyticsError::Calculation(format!(
            "start value must be positive, got {start}"
        )));
    }
    let ratio = end
        .checked_div(start)
        .ok_or_else(|| overflowed(format!("{end} / {start}")))?;
    to_percent(ratio)
}

/// `((end / start)^(1 / years) - 1) * 100`, unrounded.
pub fn compounded_return(
    start: Decimal,
    end: Decimal,
    years: Decimal,
) -> Result<Decimal, AnalyticsError> {
    if start <= Decimal::ZERO || end <= Decimal::ZERO {
        return Err(AnalyticsError::Calculation(format!(
            "CAGR endpoints must be positive, got {start} -> {end}"
        )));
    }
    if years <= Decimal::ZERO {
        return Err(AnalyticsError::Calculation(format!(
            "CAGR needs a positive holding period, got {years} years"
        )));
    }
    let growth = end
        .checked_div(start)
        .ok_or_else(|| overflowed(format!("{end} / {start}")))?;
    let annual = growth
        .checked_powd(Decimal::ONE / years)
        .ok_or_else(|| overflowed(format!("{growth}^(1/{years})")))?;
    to_percent(annual)
}

/// `(ratio - 1) * 100`.
fn to_percent(ratio: Decimal) -> Result<Decimal, AnalyticsError> {
    (ratio - Decimal::ONE)
        .checked_mul(HUNDRED)
        .ok_or_else(|| overflowed(format!("({ratio} - 1) * 100")))
}

fn overflowed(expr: String) -> AnalyticsError {
    AnalyticsError::Calculation(format!("{expr} overflowed"))
}

/// Return between two observations under `mode`.
///
/// Compounded and Auto both switch on the elapsed time: at most one year is reported
/// as a simple return, anything longer as CAGR.
pub fn holding_period_return(
    mode: ReturnMode,
    start: &Observation,
    end: &Observation,
) -> Result<Decimal, AnalyticsError> {
    let days = (end.date - start.date).num_days();
    if days <= 0 {
        return Err(AnalyticsError::InsufficientData(format!(
            "need two distinct observations, got {} -> {}",
            start.date, end.date
        )));
    }
    match mode {
        ReturnMode::Simple => simple_return(start.value, end.value),
        ReturnMode::Compounded | ReturnMode::Auto => {
            let years = year_fraction(days);
            if years > Decimal::ONE {
                compounded_return(start.value, end.value, years)
            } else {
                simple_return(start.value, end.value)
            }
        }
    }
}

/// Calculates every catalog period for one series.
pub fn period_returns(
    series: &Series,
    calendar: &TradingCalendar,
    as_of: Option<NaiveDate>,
) -> BTreeMap<PeriodCode, ReturnResult> {
    PERIOD_CATALOG
        .iter()
        .map(|def| {
            let result = period_return(def, series, calendar, as_of).unwrap_or_else(|e| {
                tracing::debug!(series = %series.name, period = %def.code, reason = %e, "Period return unavailable.");
                ReturnResult::unavailable(def.code)
            });
            (def.code, result)
        })
        .collect()
}

/// Calculates one catalog period for one series.
pub fn period_return(
    def: &PeriodDefinition,
    series: &Series,
    calendar: &TradingCalendar,
    as_of: Option<NaiveDate>,
) -> Result<ReturnResult, AnalyticsError> {
    let (start, end) = resolve_period_endpoints(def, series, calendar, as_of)?;
    let value = holding_period_return(def.return_mode, &start, &end)?;
    Ok(ReturnResult {
        period: def.code,
        value: Metric::percent(value),
        reference_date: Some(start.date),
        end_date: Some(end.date),
    })
}

/// Finds the `(start, end)` observations a period compares.
///
/// The end is the latest observation at or before `as_of`. Trading-day aligned periods
/// snap both endpoints onto valid trading days that carry data. That holds for every
/// series, including calendar-every-day ones with weekend values: a "1D" return is
/// always trading day over trading day.
pub fn resolve_period_endpoints(
    def: &PeriodDefinition,
    series: &Series,
    calendar: &TradingCalendar,
    as_of: Option<NaiveDate>,
) -> Result<(Observation, Observation), AnalyticsError> {
    let observations = series.observations();
    let latest = series.latest(as_of).copied().ok_or_else(|| match as_of {
        Some(cutoff) => AnalyticsError::UnresolvedEndpoint(cutoff),
        None => AnalyticsError::InsufficientData(format!("series '{}' is empty", series.name)),
    })?;

    let end = if def.trading_day_aligned {
        let date = calendar
            .nth_valid_day_at_or_before(latest.date, 0, observations)
            .ok_or(AnalyticsError::UnresolvedEndpoint(latest.date))?;
        observation_on(series, date)?
    } else {
        latest
    };

    let target = match def.length {
        PeriodLength::TradingDays(n) => calendar.shift_back(end.date, n),
        PeriodLength::Months(n) => end.date.checked_sub_months(Months::new(n)),
        PeriodLength::Years(n) => end.date.checked_sub_months(Months::new(n * 12)),
        PeriodLength::Inception => series.first().map(|o| o.date),
    }
    .ok_or_else(|| {
        AnalyticsError::InsufficientData(format!(
            "{} reaches back past the start of the calendar from {}",
            def.code, end.date
        ))
    })?;

    let start = if def.trading_day_aligned {
        let date = calendar
            .nth_valid_day_at_or_before(target, 0, observations)
            .ok_or(AnalyticsError::UnresolvedEndpoint(target))?;
        observation_on(series, date)?
    } else {
        series
            .at_or_before(target)
            .copied()
            .ok_or(AnalyticsError::UnresolvedEndpoint(target))?
    };

    if start.date >= end.date {
        return Err(AnalyticsError::InsufficientData(format!(
            "{} needs two distinct observations, only {} is available",
            def.code, end.date
        )));
    }
    Ok((start, end))
}

fn observation_on(series: &Series, date: NaiveDate) -> Result<Observation, AnalyticsError> {
    series
        .at_or_before(date)
        .filter(|o| o.date == date)
        .copied()
        .ok_or(AnalyticsError::UnresolvedEndpoint(date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Weekday};
    use core_types::SeriesKind;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn series(kind: SeriesKind, points: &[(NaiveDate, Decimal)]) -> Series {
        let obs = points.iter().map(|&(date, value)| Observation::new(date, value)).collect();
        Series::new("TEST", kind, obs)
    }

    /// Weekday reference calendar covering `[start, end]`.
    fn weekday_calendar(start: NaiveDate, end: NaiveDate) -> TradingCalendar {
        let reference: Vec<Observation> = start
            .iter_days()
            .take_while(|date| *date <= end)
            .filter(|date| !matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
            .map(|date| Observation::new(date, dec!(2500)))
            .collect();
        TradingCalendar::from_reference("KOSPI", Some(reference.as_slice()))
    }

    fn value(results: &BTreeMap<PeriodCode, ReturnResult>, code: PeriodCode) -> Metric {
        results[&code].value
    }

    #[test]
    fn year_fraction_uses_single_basis() {
        assert_eq!(year_fraction(365), dec!(365) / dec!(365.25));
        assert_eq!(year_fraction(1461), dec!(4));
    }

    #[test]
    fn simple_return_matches_formula() {
        assert_eq!(simple_return(dec!(100), dec!(110)).unwrap(), dec!(10));
        assert_eq!(simple_return(dec!(200), dec!(150)).unwrap(), dec!(-25));
        assert!(simple_return(Decimal::ZERO, dec!(1)).is_err());
    }

    #[test]
    fn extreme_value_ratios_are_unavailable_not_fatal() {
        let s = series(
            SeriesKind::CalendarEveryDay,
            &[(d(2024, 1, 1), dec!(0.0000000000000000000000000001)), (d(2024, 1, 2), dec!(100000))],
        );
        let results = period_returns(&s, &TradingCalendar::EveryDay, None);
        assert_eq!(results.len(), PERIOD_CATALOG.len());
        assert_eq!(value(&results, PeriodCode::OneDay), Metric::Unavailable);
        assert_eq!(value(&results, PeriodCode::SinceInception), Metric::Unavailable);

        assert!(matches!(
            simple_return(dec!(0.0000000000000000000000000001), Decimal::MAX),
            Err(AnalyticsError::Calculation(_))
        ));
        assert!(matches!(
            compounded_return(dec!(0.0000000000000000000000000001), dec!(100000), dec!(2)),
            Err(AnalyticsError::Calculation(_))
        ));
    }

    #[test]
    fn compounded_return_annualizes() {
        // Doubling over exactly four years is 2^(1/4) - 1 = 18.92%.
        let cagr = compounded_return(dec!(100), dec!(200), dec!(4)).unwrap();
        assert_eq!(core_types::round_pct(cagr), dec!(18.92));
    }

    #[test]
    fn one_week_example_on_weekday_calendar() {
        let cal = weekday_calendar(d(2024, 1, 1), d(2024, 1, 8));
        let s = series(
            SeriesKind::TradingDayRestricted,
            &[(d(2024, 1, 1), dec!(100)), (d(2024, 1, 8), dec!(110))],
        );
        let results = period_returns(&s, &cal, Some(d(2024, 1, 8)));
        assert_eq!(value(&results, PeriodCode::OneWeek), Metric::Value(dec!(10.00)));
        assert_eq!(results[&PeriodCode::OneWeek].reference_date, Some(d(2024, 1, 1)));
        // One trading day back is Friday the 5th; nothing at or before it except the 1st.
        assert_eq!(value(&results, PeriodCode::OneDay), Metric::Value(dec!(10.00)));
    }

    #[test]
    fn one_week_example_on_fallback_calendar() {
        let s = series(
            SeriesKind::CalendarEveryDay,
            &[(d(2024, 1, 1), dec!(100)), (d(2024, 1, 8), dec!(110))],
        );
        let results = period_returns(&s, &TradingCalendar::EveryDay, Some(d(2024, 1, 8)));
        assert_eq!(value(&results, PeriodCode::OneWeek), Metric::Value(dec!(10.00)));
    }

    #[test]
    fn short_periods_align_calendar_every_day_series_to_trading_days() {
        let cal = weekday_calendar(d(2024, 1, 1), d(2024, 1, 14));
        // Values on every day, weekend included; Sunday the 14th is the latest.
        let points: Vec<(NaiveDate, Decimal)> = (1..=14)
            .map(|day| (d(2024, 1, day), Decimal::from(100 + day)))
            .collect();
        let s = series(SeriesKind::CalendarEveryDay, &points);

        let results = period_returns(&s, &cal, None);
        let one_day = results[&PeriodCode::OneDay];
        // Friday the 12th over Thursday the 11th, not Sunday over Saturday.
        assert_eq!(one_day.end_date, Some(d(2024, 1, 12)));
        assert_eq!(one_day.reference_date, Some(d(2024, 1, 11)));
        assert_eq!(one_day.value, Metric::percent(dec!(112) / dec!(111) * dec!(100) - dec!(100)));

        let one_week = results[&PeriodCode::OneWeek];
        assert_eq!(one_week.reference_date, Some(d(2024, 1, 5)));
    }

    #[test]
    fn trading_day_lookup_falls_back_to_closest_prior_with_data() {
        let cal = weekday_calendar(d(2024, 1, 1), d(2024, 1, 12));
        // Strategy series missing Thursday the 11th.
        let s = series(
            SeriesKind::TradingDayRestricted,
            &[(d(2024, 1, 9), dec!(100)), (d(2024, 1, 10), dec!(104)), (d(2024, 1, 12), dec!(106))],
        );
        let results = period_returns(&s, &cal, None);
        assert_eq!(results[&PeriodCode::OneDay].reference_date, Some(d(2024, 1, 10)));
        assert_eq!(value(&results, PeriodCode::TwoDays), value(&results, PeriodCode::OneDay));
        assert_eq!(results[&PeriodCode::ThreeDays].reference_date, Some(d(2024, 1, 9)));
        assert_eq!(value(&results, PeriodCode::ThreeDays), Metric::Value(dec!(6.00)));
    }

    #[test]
    fn month_subtraction_clamps_to_month_end() {
        let s = series(
            SeriesKind::CalendarEveryDay,
            &[(d(2024, 2, 29), dec!(100)), (d(2024, 3, 30), dec!(90)), (d(2024, 3, 31), dec!(105))],
        );
        let results = period_returns(&s, &TradingCalendar::EveryDay, None);
        let one_month = results[&PeriodCode::OneMonth];
        assert_eq!(one_month.reference_date, Some(d(2024, 2, 29)));
        assert_eq!(one_month.value, Metric::Value(dec!(5.00)));
    }

    #[test]
    fn one_year_switches_formula_exactly_past_one_year() {
        // 365 elapsed days is <= 1 year on a 365.25 basis: simple.
        let short = series(
            SeriesKind::TradingDayRestricted,
            &[(d(2022, 3, 1), dec!(100)), (d(2023, 3, 1), dec!(120))],
        );
        let results = period_returns(&short, &TradingCalendar::EveryDay, None);
        assert_eq!(value(&results, PeriodCode::OneYear), Metric::Value(dec!(20.00)));

        // 366 elapsed days (across Feb 29) is > 1 year: CAGR.
        let long = series(
            SeriesKind::TradingDayRestricted,
            &[(d(2023, 3, 1), dec!(100)), (d(2024, 3, 1), dec!(120))],
        );
        let results = period_returns(&long, &TradingCalendar::EveryDay, None);
        assert_eq!(value(&results, PeriodCode::OneYear), Metric::Value(dec!(19.96)));
    }

    #[test]
    fn since_inception_is_simple_within_a_year_and_cagr_beyond() {
        let young = series(
            SeriesKind::CalendarEveryDay,
            &[(d(2024, 1, 1), dec!(100)), (d(2024, 6, 1), dec!(130))],
        );
        let results = period_returns(&young, &TradingCalendar::EveryDay, None);
        assert_eq!(value(&results, PeriodCode::SinceInception), Metric::Value(dec!(30.00)));

        let old = series(
            SeriesKind::CalendarEveryDay,
            &[(d(2020, 1, 1), dec!(100)), (d(2024, 1, 1), dec!(200))],
        );
        let results = period_returns(&old, &TradingCalendar::EveryDay, None);
        // 1461 days is exactly four years on the 365.25 basis.
        assert_eq!(value(&results, PeriodCode::SinceInception), Metric::Value(dec!(18.92)));
        assert_eq!(value(&results, PeriodCode::FourYears), Metric::Value(dec!(18.92)));
        assert_eq!(value(&results, PeriodCode::FiveYears), Metric::Unavailable);
    }

    #[test]
    fn single_observation_leaves_every_period_unavailable() {
        let s = series(SeriesKind::TradingDayRestricted, &[(d(2024, 1, 8), dec!(100))]);
        let results = period_returns(&s, &TradingCalendar::EveryDay, None);
        assert_eq!(results.len(), PERIOD_CATALOG.len());
        assert!(results.values().all(|r| r.value == Metric::Unavailable));
    }

    #[test]
    fn as_of_between_observations_uses_closest_earlier() {
        let s = series(
            SeriesKind::CalendarEveryDay,
            &[(d(2024, 1, 1), dec!(100)), (d(2024, 1, 3), dec!(102)), (d(2024, 1, 10), dec!(150))],
        );
        let results = period_returns(&s, &TradingCalendar::EveryDay, Some(d(2024, 1, 5)));
        assert_eq!(results[&PeriodCode::OneDay].end_date, Some(d(2024, 1, 3)));
        assert_eq!(value(&results, PeriodCode::SinceInception), Metric::Value(dec!(2.00)));
    }

    #[test]
    fn cutoff_before_first_observation_is_unavailable() {
        let s = series(
            SeriesKind::CalendarEveryDay,
            &[(d(2024, 1, 1), dec!(100)), (d(2024, 1, 3), dec!(102))],
        );
        let def = PeriodCode::SinceInception.definition();
        assert_eq!(
            period_return(def, &s, &TradingCalendar::EveryDay, Some(d(2023, 12, 1))),
            Err(AnalyticsError::UnresolvedEndpoint(d(2023, 12, 1)))
        );
    }
}
