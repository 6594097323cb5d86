//! Drawdown Calculator: peak-to-trough maximum drawdown and as-of-cutoff current drawdown.

use crate::error::AnalyticsError;
use chrono::NaiveDate;
use core_types::structs::up_to;
use core_types::{round_pct, DrawdownResult, Observation};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// One point of the underwater curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DrawdownPoint {
    pub date: NaiveDate,
    pub value: Decimal,
    /// Highest value seen up to and including this point.
    pub peak: Decimal,
    pub peak_date: NaiveDate,
    /// `(value / peak - 1) * 100`, rounded to two decimals. Always in `[-100, 0]`.
    pub ratio: Decimal,
}

/// Walks observations ascending, tracking the running peak.
struct PeakTracker {
    peak: Observation,
}

impl PeakTracker {
    fn new(first: Observation) -> Self {
        Self { peak: first }
    }

    /// Feeds the next observation; returns its unrounded drawdown percentage.
    fn observe(&mut self, obs: &Observation) -> Result<Decimal, AnalyticsError> {
        if obs.value > self.peak.value {
            self.peak = *obs;
        }
        obs.value
            .checked_div(self.peak.value)
            .and_then(|ratio| (ratio - Decimal::ONE).checked_mul(dec!(100)))
            .ok_or_else(|| {
                AnalyticsError::Calculation(format!(
                    "drawdown of {} against peak {} overflowed",
                    obs.value, self.peak.value
                ))
            })
    }
}

/// The full underwater curve of `observations`.
pub fn drawdown_series(observations: &[Observation]) -> Result<Vec<DrawdownPoint>, AnalyticsError> {
    let Some(first) = observations.first() else {
        return Ok(Vec::new());
    };
    let mut tracker = PeakTracker::new(*first);
    observations
        .iter()
        .map(|obs| {
            let ratio = tracker.observe(obs)?;
            Ok(DrawdownPoint {
                date: obs.date,
                value: obs.value,
                peak: tracker.peak.value,
                peak_date: tracker.peak.date,
                ratio: round_pct(ratio),
            })
        })
        .collect()
}

/// Most negative drawdown within `window`, with the peak that produced it.
///
/// The running peak starts at the first observation of the window. Needs at least two
/// observations. A window that never declines reports 0 at its first point.
pub fn max_drawdown(window: &[Observation]) -> Result<DrawdownResult, AnalyticsError> {
    let [first, _, ..] = window else {
        return Err(AnalyticsError::InsufficientData(format!(
            "maximum drawdown needs at least 2 observations, got {}",
            window.len()
        )));
    };

    let mut tracker = PeakTracker::new(*first);
    let mut worst = Decimal::ZERO;
    let mut peak_date = first.date;
    let mut trough_date = first.date;

    for obs in window {
        let ratio = tracker.observe(obs)?;
        if ratio < worst {
            worst = ratio;
            peak_date = tracker.peak.date;
            trough_date = obs.date;
        }
    }

    Ok(DrawdownResult {
        ratio: round_pct(worst),
        peak_date,
        trough_date,
    })
}

/// Drawdown of the last observation at or before `cutoff` against the peak seen up to it.
///
/// `cutoff = None` evaluates at the latest observation. This is not the window minimum:
/// a series that has fully recovered reports 0.
pub fn current_drawdown(
    observations: &[Observation],
    cutoff: Option<NaiveDate>,
) -> Result<DrawdownResult, AnalyticsError> {
    let history = match cutoff {
        Some(date) => up_to(observations, date),
        None => observations,
    };
    let (Some(first), Some(last)) = (history.first(), history.last()) else {
        return Err(AnalyticsError::InsufficientData(
            "current drawdown needs at least 1 observation at or before the cutoff".to_string(),
        ));
    };

    let mut tracker = PeakTracker::new(*first);
    let mut ratio = Decimal::ZERO;
    for obs in history {
        ratio = tracker.observe(obs)?;
    }

    Ok(DrawdownResult {
        ratio: round_pct(ratio),
        peak_date: tracker.peak.date,
        trough_date: last.date,
    })
}
