use crate::custom_range::{CustomRangeResult, DateRange};
use chrono::NaiveDate;
use core_types::{DrawdownResult, Metric, PeriodCode, ReturnResult};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// What to compute. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportRequest {
    /// Restrict the report to these series. `None` means every known series.
    pub series: Option<Vec<String>>,
    /// Evaluate as of this date instead of each series' latest observation.
    pub as_of: Option<NaiveDate>,
    /// Also compute `CDR` / `CDR_MDD` over this window.
    pub custom_range: Option<DateRange>,
}

/// All metrics for a single series.
///
/// Serializes as one flat map: every period code, then `MDD`, `Drawdown` and, when a
/// custom range was requested, `CDR` and `CDR_MDD`.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesReport {
    pub periods: BTreeMap<PeriodCode, ReturnResult>,
    pub max_drawdown: Option<DrawdownResult>,
    pub current_drawdown: Option<DrawdownResult>,
    pub custom_range: Option<CustomRangeResult>,
}

impl SeriesReport {
    pub fn period(&self, code: PeriodCode) -> Metric {
        self.periods
            .get(&code)
            .map(|r| r.value)
            .unwrap_or(Metric::Unavailable)
    }

    pub fn mdd(&self) -> Metric {
        drawdown_metric(self.max_drawdown.as_ref())
    }

    pub fn drawdown(&self) -> Metric {
        drawdown_metric(self.current_drawdown.as_ref())
    }

    pub fn cdr(&self) -> Option<Metric> {
        self.custom_range.map(|r| r.ret)
    }

    pub fn cdr_mdd(&self) -> Option<Metric> {
        self.custom_range.map(|r| r.mdd_metric())
    }
}

fn drawdown_metric(result: Option<&DrawdownResult>) -> Metric {
    result.map(DrawdownResult::metric).unwrap_or(Metric::Unavailable)
}

impl Serialize for SeriesReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = if self.custom_range.is_some() { 4 } else { 2 };
        let mut map = serializer.serialize_map(Some(self.periods.len() + extra))?;
        for (code, result) in &self.periods {
            map.serialize_entry(code.as_str(), &result.value)?;
        }
        map.serialize_entry("MDD", &self.mdd())?;
        map.serialize_entry("Drawdown", &self.drawdown())?;
        if let (Some(cdr), Some(cdr_mdd)) = (self.cdr(), self.cdr_mdd()) {
            map.serialize_entry("CDR", &cdr)?;
            map.serialize_entry("CDR_MDD", &cdr_mdd)?;
        }
        map.end()
    }
}

/// The engine's complete answer to a `ReportRequest`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnsReport {
    /// True when the reference index had no data and every day was treated as a trading day.
    pub calendar_fallback: bool,
    /// Per-series metrics. A requested series the store does not know maps to `null`.
    pub series: BTreeMap<String, Option<SeriesReport>>,
}

impl ReturnsReport {
    pub fn get(&self, name: &str) -> Option<&SeriesReport> {
        self.series.get(name).and_then(Option::as_ref)
    }
}
