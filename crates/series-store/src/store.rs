use chrono::NaiveDate;
use configuration::SeriesSettings;
use core_types::{Observation, RawRow, Series};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

/// An immutable collection of cleaned series, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct SeriesStore {
    series: BTreeMap<String, Series>,
}

impl SeriesStore {
    /// Cleans raw rows into series.
    ///
    /// Rows whose value is non-numeric or not strictly positive are dropped. Surviving
    /// rows are sorted ascending by date; when a date repeats, the last row seen wins.
    /// A name whose rows are all dropped still yields an (empty) series.
    pub fn ingest<I>(raw: I, kinds: &SeriesSettings) -> Self
    where
        I: IntoIterator<Item = (String, Vec<RawRow>)>,
    {
        let mut grouped: BTreeMap<String, BTreeMap<NaiveDate, Decimal>> = BTreeMap::new();

        for (name, rows) in raw {
            let points = grouped.entry(name.clone()).or_default();
            let mut dropped = 0usize;
            for row in &rows {
                match row.to_observation() {
                    Some(obs) => {
                        points.insert(obs.date, obs.value);
                    }
                    None => dropped += 1,
                }
            }
            if dropped > 0 {
                tracing::debug!(series = %name, dropped, total = rows.len(), "Dropped invalid observations.");
            }
        }

        let series = grouped
            .into_iter()
            .map(|(name, points)| {
                let observations = points
                    .into_iter()
                    .map(|(date, value)| Observation::new(date, value))
                    .collect();
                let kind = kinds.kind_for(&name);
                (name.clone(), Series::new(name, kind, observations))
            })
            .collect();

        Self { series }
    }

    /// Builds a store directly from already-clean series.
    pub fn from_series(series: impl IntoIterator<Item = Series>) -> Self {
        Self {
            series: series.into_iter().map(|s| (s.name.clone(), s)).collect(),
        }
    }

    pub fn series(&self, name: &str) -> Option<&Series> {
        self.series.get(name)
    }

    pub fn observations_for(&self, name: &str) -> Option<&[Observation]> {
        self.series.get(name).map(Series::observations)
    }

    pub fn all_series_names(&self) -> BTreeSet<String> {
        self.series.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
