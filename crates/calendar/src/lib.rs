//! # Meridian Trading Calendar
//!
//! Derives the set of valid trading dates from a single reference series and answers
//! every "which day counts" question the calculators ask. All trading-day arithmetic
//! in the workspace goes through [`TradingCalendar`]; callers never step over dates
//! themselves.
//!
//! When the reference series is absent or empty the calendar degrades to
//! [`TradingCalendar::EveryDay`], in which every calendar date is valid. The fallback
//! is logged and observable through [`TradingCalendar::is_fallback`].

use chrono::{Days, NaiveDate};
use core_types::Observation;
use core_types::structs::up_to;
use std::collections::BTreeSet;

/// The canonical set of valid trading dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradingCalendar {
    /// Trading days are exactly the observation dates of the reference series.
    Reference { valid_dates: BTreeSet<NaiveDate> },
    /// Reference data was missing: every calendar day is treated as valid.
    EveryDay,
}

impl TradingCalendar {
    /// Builds the calendar from the reference series' observations.
    pub fn from_reference(reference_name: &str, observations: Option<&[Observation]>) -> Self {
        match observations {
            Some(obs) if !obs.is_empty() => {
                let valid_dates: BTreeSet<NaiveDate> = obs.iter().map(|o| o.date).collect();
                tracing::debug!(
                    reference = reference_name,
                    trading_days = valid_dates.len(),
                    "Trading calendar built from reference series."
                );
                TradingCalendar::Reference { valid_dates }
            }
            _ => {
                tracing::warn!(
                    reference = reference_name,
                    "Reference series has no data; every calendar day is treated as a trading day."
                );
                TradingCalendar::EveryDay
            }
        }
    }

    /// True when the calendar fell back to treating every day as valid.
    pub fn is_fallback(&self) -> bool {
        matches!(self, TradingCalendar::EveryDay)
    }

    pub fn is_valid_trading_day(&self, date: NaiveDate) -> bool {
        match self {
            TradingCalendar::Reference { valid_dates } => valid_dates.contains(&date),
            TradingCalendar::EveryDay => true,
        }
    }

    /// Among valid dates `<= date` that carry an observation in `observations`, sorted
    /// descending, returns the one at 0-based position `n`.
    ///
    /// Position 0 is the closest prior trading day with data.
    pub fn nth_valid_day_at_or_before(
        &self,
        date: NaiveDate,
        n: usize,
        observations: &[Observation],
    ) -> Option<NaiveDate> {
        up_to(observations, date)
            .iter()
            .rev()
            .filter(|o| self.is_valid_trading_day(o.date))
            .nth(n)
            .map(|o| o.date)
    }

    /// Mirror of [`Self::nth_valid_day_at_or_before`]: valid dates `>= date` with data,
    /// sorted ascending.
    pub fn nth_valid_day_at_or_after(
        &self,
        date: NaiveDate,
        n: usize,
        observations: &[Observation],
    ) -> Option<NaiveDate> {
        let from = observations.partition_point(|o| o.date < date);
        observations[from..]
            .iter()
            .filter(|o| self.is_valid_trading_day(o.date))
            .nth(n)
            .map(|o| o.date)
    }

    /// The `n`-th valid trading date strictly before `date`, regardless of any series' data.
    ///
    /// `n == 0` returns `date` unchanged. Returns `None` when the calendar does not reach
    /// back far enough.
    pub fn shift_back(&self, date: NaiveDate, n: u32) -> Option<NaiveDate> {
        if n == 0 {
            return Some(date);
        }
        match self {
            TradingCalendar::Reference { valid_dates } => valid_dates
                .range(..date)
                .rev()
                .nth(n as usize - 1)
                .copied(),
            TradingCalendar::EveryDay => date.checked_sub_days(Days::new(u64::from(n))),
        }
    }

    /// Number of valid trading dates in the inclusive window. Zero when `end < start`.
    pub fn count_valid_days(&self, start: NaiveDate, end: NaiveDate) -> usize {
        if end < start {
            return 0;
        }
        match self {
            TradingCalendar::Reference { valid_dates } => valid_dates.range(start..=end).count(),
            TradingCalendar::EveryDay => calendar_days_between(start, end),
        }
    }
}

/// Inclusive count of calendar days in `[start, end]`. Zero when `end < start`.
pub fn calendar_days_between(start: NaiveDate, end: NaiveDate) -> usize {
    if end < start {
        return 0;
    }
    (end - start).num_days() as usize + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Weekday};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn obs(dates: &[NaiveDate], value: Decimal) -> Vec<Observation> {
        dates.iter().map(|date| Observation::new(*date, value)).collect()
    }

    /// Weekdays of the first two weeks of January 2024 (the 1st is a Monday).
    fn weekday_reference() -> Vec<Observation> {
        let dates: Vec<NaiveDate> = (1..=12)
            .map(|day| d(2024, 1, day))
            .filter(|date| !matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
            .collect();
        obs(&dates, dec!(2500))
    }

    #[test]
    fn validity_follows_reference_dates() {
        let reference = weekday_reference();
        let cal = TradingCalendar::from_reference("KOSPI", Some(reference.as_slice()));
        assert!(!cal.is_fallback());
        assert!(cal.is_valid_trading_day(d(2024, 1, 5)));
        assert!(!cal.is_valid_trading_day(d(2024, 1, 6)));
    }

    #[test]
    fn missing_reference_degrades_to_every_day() {
        let cal = TradingCalendar::from_reference("KOSPI", None);
        assert!(cal.is_fallback());
        assert!(cal.is_valid_trading_day(d(2024, 1, 6)));

        let empty: Vec<Observation> = Vec::new();
        assert!(TradingCalendar::from_reference("KOSPI", Some(empty.as_slice())).is_fallback());
    }

    #[test]
    fn nth_at_or_before_skips_non_trading_and_missing_days() {
        let reference = weekday_reference();
        let cal = TradingCalendar::from_reference("KOSPI", Some(reference.as_slice()));
        // A calendar-every-day series with a gap on the 4th.
        let series = obs(
            &[d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 5), d(2024, 1, 6), d(2024, 1, 7)],
            dec!(10),
        );
        assert_eq!(cal.nth_valid_day_at_or_before(d(2024, 1, 7), 0, &series), Some(d(2024, 1, 5)));
        assert_eq!(cal.nth_valid_day_at_or_before(d(2024, 1, 7), 1, &series), Some(d(2024, 1, 3)));
        assert_eq!(cal.nth_valid_day_at_or_before(d(2024, 1, 7), 2, &series), Some(d(2024, 1, 2)));
        assert_eq!(cal.nth_valid_day_at_or_before(d(2024, 1, 7), 3, &series), None);
    }

    #[test]
    fn nth_at_or_after_walks_forward() {
        let reference = weekday_reference();
        let cal = TradingCalendar::from_reference("KOSPI", Some(reference.as_slice()));
        let series = obs(&[d(2024, 1, 6), d(2024, 1, 8), d(2024, 1, 9)], dec!(10));
        assert_eq!(cal.nth_valid_day_at_or_after(d(2024, 1, 6), 0, &series), Some(d(2024, 1, 8)));
        assert_eq!(cal.nth_valid_day_at_or_after(d(2024, 1, 6), 1, &series), Some(d(2024, 1, 9)));
        assert_eq!(cal.nth_valid_day_at_or_after(d(2024, 1, 10), 0, &series), None);
    }

    #[test]
    fn shift_back_counts_trading_days_only() {
        let reference = weekday_reference();
        let cal = TradingCalendar::from_reference("KOSPI", Some(reference.as_slice()));
        // Monday the 8th, five trading days back is Monday the 1st.
        assert_eq!(cal.shift_back(d(2024, 1, 8), 1), Some(d(2024, 1, 5)));
        assert_eq!(cal.shift_back(d(2024, 1, 8), 5), Some(d(2024, 1, 1)));
        assert_eq!(cal.shift_back(d(2024, 1, 8), 6), None);
        assert_eq!(cal.shift_back(d(2024, 1, 8), 0), Some(d(2024, 1, 8)));

        let fallback = TradingCalendar::EveryDay;
        assert_eq!(fallback.shift_back(d(2024, 1, 8), 5), Some(d(2024, 1, 3)));
    }

    #[test]
    fn counts_valid_days_inclusively() {
        let reference = weekday_reference();
        let cal = TradingCalendar::from_reference("KOSPI", Some(reference.as_slice()));
        assert_eq!(cal.count_valid_days(d(2024, 1, 1), d(2024, 1, 12)), 10);
        assert_eq!(cal.count_valid_days(d(2024, 1, 6), d(2024, 1, 7)), 0);
        assert_eq!(cal.count_valid_days(d(2024, 1, 12), d(2024, 1, 1)), 0);
        assert_eq!(TradingCalendar::EveryDay.count_valid_days(d(2024, 1, 1), d(2024, 1, 12)), 12);
        assert_eq!(calendar_days_between(d(2024, 2, 28), d(2024, 3, 1)), 3);
    }
}
