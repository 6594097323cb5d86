use crate::custom_range::CustomRangeCalculator;
use crate::drawdown::{current_drawdown, max_drawdown};
use crate::error::AnalyticsError;
use crate::report::{ReportRequest, ReturnsReport, SeriesReport};
use crate::returns::period_returns;
use configuration::CustomRangeSettings;
use rayon::prelude::*;
use series_store::Snapshot;
use std::collections::BTreeMap;

/// A stateless calculator for deriving return and drawdown metrics from a series snapshot.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    custom_range: CustomRangeCalculator,
}

impl AnalyticsEngine {
    pub fn new(settings: &CustomRangeSettings) -> Self {
        Self {
            custom_range: CustomRangeCalculator::new(settings),
        }
    }

    /// The main entry point for calculating metrics.
    ///
    /// # Arguments
    ///
    /// * `snapshot` - The store and trading calendar to compute against.
    /// * `request` - Optional series filter, as-of cutoff and custom range.
    ///
    /// # Returns
    ///
    /// A `ReturnsReport`. Nothing here fails as a whole: an unknown series maps to `None`
    /// and every metric that cannot be computed is `Unavailable`.
    pub fn calculate(&self, snapshot: &Snapshot, request: &ReportRequest) -> ReturnsReport {
        let names: Vec<String> = match &request.series {
            Some(names) => names.clone(),
            None => snapshot.store.all_series_names().into_iter().collect(),
        };

        // Series are independent; each one reads the shared, immutable snapshot.
        let series: BTreeMap<String, Option<SeriesReport>> = names
            .par_iter()
            .map(|name| {
                let report = self
                    .calculate_series(snapshot, name, request)
                    .inspect_err(|e| tracing::warn!(series = %name, reason = %e, "Series skipped."))
                    .ok();
                (name.clone(), report)
            })
            .collect();

        ReturnsReport {
            calendar_fallback: snapshot.calendar.is_fallback(),
            series,
        }
    }

    /// Calculates every metric for one series.
    pub fn calculate_series(
        &self,
        snapshot: &Snapshot,
        name: &str,
        request: &ReportRequest,
    ) -> Result<SeriesReport, AnalyticsError> {
        let series = snapshot
            .store
            .series(name)
            .ok_or_else(|| AnalyticsError::MissingSeries(name.to_string()))?;
        let calendar = &snapshot.calendar;

        let periods = period_returns(series, calendar, request.as_of);

        let history = match request.as_of {
            Some(cutoff) => series.up_to(cutoff),
            None => series.observations(),
        };
        let max_drawdown = max_drawdown(history)
            .inspect_err(|e| tracing::debug!(series = %name, reason = %e, "MDD unavailable."))
            .ok();
        let current_drawdown = current_drawdown(series.observations(), request.as_of)
            .inspect_err(|e| tracing::debug!(series = %name, reason = %e, "Drawdown unavailable."))
            .ok();

        let custom_range = request
            .custom_range
            .map(|range| self.custom_range.calculate(series, calendar, range));

        Ok(SeriesReport {
            periods,
            max_drawdown,
            current_drawdown,
            custom_range,
        })
    }
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new(&CustomRangeSettings::default())
    }
}
