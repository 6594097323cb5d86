//! # Meridian Series Normalizer
//!
//! Presentation-side helpers, kept apart from the return and drawdown calculators:
//!
//! - [`backfill`] carries values forward so a series has a point on every calendar day.
//! - [`rebase`] / [`rebase_window`] scale a series so it starts at a common base value.
//! - [`build_comparison`] does both for several series at once.

use chrono::NaiveDate;
use core_types::structs::window;
use core_types::{Observation, Series};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// One calendar day of a backfilled series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilledPoint {
    pub date: NaiveDate,
    pub value: Decimal,
    /// True when the value was carried over from another day.
    pub synthetic: bool,
}

/// Anything with a date and a value that can be rescaled.
pub trait DatedValue: Copy {
    fn date(&self) -> NaiveDate;
    fn value(&self) -> Decimal;
    fn with_value(self, value: Decimal) -> Self;
}

impl DatedValue for Observation {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn value(&self) -> Decimal {
        self.value
    }

    fn with_value(self, value: Decimal) -> Self {
        Observation { value, ..self }
    }
}

impl DatedValue for FilledPoint {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn value(&self) -> Decimal {
        self.value
    }

    fn with_value(self, value: Decimal) -> Self {
        FilledPoint { value, ..self }
    }
}

/// Produces one point per calendar day in `[start, end]`.
///
/// Days with an observation keep it. Other days take the most recent prior value, looking
/// before `start` if needed; days before the series' first observation take that first
/// value. Returns an empty vector for an empty series or an inverted window.
pub fn backfill(observations: &[Observation], start: NaiveDate, end: NaiveDate) -> Vec<FilledPoint> {
    let Some(first) = observations.first() else {
        return Vec::new();
    };
    if end < start {
        return Vec::new();
    }

    // Index of the first observation dated on or after `start`.
    let mut next = observations.partition_point(|o| o.date < start);
    let mut carried = next
        .checked_sub(1)
        .map(|i| observations[i].value)
        .unwrap_or(first.value);

    start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| match observations.get(next) {
            Some(obs) if obs.date == day => {
                next += 1;
                carried = obs.value;
                FilledPoint { date: day, value: obs.value, synthetic: false }
            }
            _ => FilledPoint { date: day, value: carried, synthetic: true },
        })
        .collect()
}

/// Scales `points` so the first maps to `base` and the rest keep their ratios to it.
///
/// Empty when the anchor is not positive or a rebased value would overflow.
pub fn rebase<P: DatedValue>(points: &[P], base: Decimal) -> Vec<P> {
    let Some(anchor) = points.first().map(DatedValue::value) else {
        return Vec::new();
    };
    if anchor <= Decimal::ZERO {
        tracing::warn!(%anchor, "Cannot rebase from a non-positive anchor value.");
        return Vec::new();
    }
    let rebased: Option<Vec<P>> = points
        .iter()
        .map(|p| {
            p.value()
                .checked_div(anchor)
                .and_then(|ratio| ratio.checked_mul(base))
                .map(|value| p.with_value(value))
        })
        .collect();
    rebased.unwrap_or_else(|| {
        tracing::warn!(%anchor, %base, "Rebased values overflow; leaving the series out.");
        Vec::new()
    })
}

/// Rebases the observations inside `[start, end]` so the first in-window value maps to `base`.
pub fn rebase_window(
    observations: &[Observation],
    start: NaiveDate,
    end: NaiveDate,
    base: Decimal,
) -> Vec<Observation> {
    rebase(window(observations, start, end), base)
}

/// Backfills then rebases each series over the same window for side-by-side comparison.
pub fn build_comparison(
    series: &[&Series],
    start: NaiveDate,
    end: NaiveDate,
    base: Decimal,
) -> BTreeMap<String, Vec<FilledPoint>> {
    series
        .iter()
        .map(|s| {
            let filled = backfill(s.observations(), start, end);
            (s.name.clone(), rebase(&filled, base))
        })
        .collect()
}
