use crate::store::SeriesStore;
use chrono::NaiveDate;
use core_types::Observation;
use serde::Serialize;
use std::collections::BTreeMap;

/// Optional inclusive date bounds for an export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl ExportWindow {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

/// Filtered raw series handed to presentation/export collaborators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportBundle {
    pub series: BTreeMap<String, Vec<Observation>>,
    /// Latest date across every returned series.
    pub as_of: Option<NaiveDate>,
}

/// Returns the requested series filtered to `window`.
///
/// `names = None` exports every known series. Unknown names are skipped.
pub fn export(store: &SeriesStore, names: Option<&[String]>, window: ExportWindow) -> ExportBundle {
    let requested: Vec<String> = match names {
        Some(names) => names.to_vec(),
        None => store.all_series_names().into_iter().collect(),
    };

    let mut series = BTreeMap::new();
    for name in requested {
        let Some(observations) = store.observations_for(&name) else {
            tracing::warn!(series = %name, "Export requested an unknown series; skipping.");
            continue;
        };
        let filtered: Vec<Observation> = observations
            .iter()
            .filter(|o| window.contains(o.date))
            .copied()
            .collect();
        series.insert(name, filtered);
    }

    let as_of = series.values().filter_map(|obs| obs.last().map(|o| o.date)).max();
    ExportBundle { series, as_of }
}
