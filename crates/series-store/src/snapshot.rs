use crate::store::SeriesStore;
use calendar::TradingCalendar;
use configuration::Settings;
use core_types::RawRow;
use std::sync::{Arc, RwLock};

/// Everything a computation reads: the cleaned series and the calendar derived from them.
///
/// A snapshot is immutable once built and can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub store: SeriesStore,
    pub calendar: TradingCalendar,
}

impl Snapshot {
    /// Ingests raw rows and derives the trading calendar from the configured reference series.
    pub fn build<I>(raw: I, settings: &Settings) -> Self
    where
        I: IntoIterator<Item = (String, Vec<RawRow>)>,
    {
        let store = SeriesStore::ingest(raw, &settings.series);
        Self::from_store(store, &settings.calendar.reference_series)
    }

    pub fn from_store(store: SeriesStore, reference_series: &str) -> Self {
        let calendar =
            TradingCalendar::from_reference(reference_series, store.observations_for(reference_series));
        Self { store, calendar }
    }
}

/// Shared access to the current snapshot.
///
/// Readers clone the `Arc` and compute against it without holding the lock. A refresh
/// builds a complete new snapshot first and only then swaps the reference, so no reader
/// ever observes a half-built store or calendar.
#[derive(Debug)]
pub struct SnapshotHandle {
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotHandle {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The snapshot in effect right now.
    pub fn load(&self) -> Arc<Snapshot> {
        let guard = self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&*guard)
    }

    /// Installs `snapshot`, returning the one it replaced.
    pub fn replace(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let next = Arc::new(snapshot);
        let mut guard = self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::replace(&mut *guard, next)
    }

    /// Rebuilds store and calendar from fresh raw rows and swaps them in.
    pub fn refresh<I>(&self, raw: I, settings: &Settings) -> Arc<Snapshot>
    where
        I: IntoIterator<Item = (String, Vec<RawRow>)>,
    {
        let snapshot = Snapshot::build(raw, settings);
        tracing::info!(
            series = snapshot.store.len(),
            calendar_fallback = snapshot.calendar.is_fallback(),
            "Series snapshot refreshed."
        );
        self.replace(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::RawValue;

    fn rows(dates: &[(i32, u32, u32)]) -> Vec<RawRow> {
        dates
            .iter()
            .map(|&(y, m, d)| RawRow::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), RawValue::Number(100.0)))
            .collect()
    }

    #[test]
    fn calendar_comes_from_configured_reference() {
        let settings = Settings::default();
        let snapshot = Snapshot::build(
            vec![("KOSPI".to_string(), rows(&[(2024, 1, 2), (2024, 1, 3)]))],
            &settings,
        );
        assert!(!snapshot.calendar.is_fallback());
        assert!(snapshot.calendar.is_valid_trading_day(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()));
    }

    #[test]
    fn missing_reference_falls_back_without_failing() {
        let settings = Settings::default();
        let snapshot = Snapshot::build(vec![("ALPHA".to_string(), rows(&[(2024, 1, 2)]))], &settings);
        assert!(snapshot.calendar.is_fallback());
        assert_eq!(snapshot.store.len(), 1);
    }

    #[test]
    fn refresh_swaps_whole_snapshot() {
        let settings = Settings::default();
        let handle = SnapshotHandle::new(Snapshot::build(Vec::<(String, Vec<RawRow>)>::new(), &settings));
        let before = handle.load();
        assert!(before.store.is_empty());

        let old = handle.refresh(
            vec![("KOSPI".to_string(), rows(&[(2024, 1, 2)]))],
            &settings,
        );
        assert!(Arc::ptr_eq(&old, &before));
        // Readers holding the old snapshot keep a consistent view.
        assert!(before.store.is_empty());
        assert_eq!(handle.load().store.len(), 1);
        assert!(!handle.load().calendar.is_fallback());
    }
}
