//! # Meridian Series Store
//!
//! Turns raw `{date, value}` rows into clean, sorted, de-duplicated series and pairs
//! them with the trading calendar derived from the reference index.
//!
//! ## Public API
//!
//! - `SeriesStore`: the cleaned series, keyed by name.
//! - `Snapshot` / `SnapshotHandle`: store + calendar, swapped atomically on refresh.
//! - `export`: filtered series lists with an overall "as of" date.
//! - `load_raw_rows`: the JSON boundary used by the command-line front end.

pub mod error;
pub mod export;
pub mod loader;
pub mod snapshot;
pub mod store;

pub use error::StoreError;
pub use export::{export, ExportBundle, ExportWindow};
pub use loader::{load_raw_rows, parse_raw_rows, RawSeriesMap};
pub use snapshot::{Snapshot, SnapshotHandle};
pub use store::SeriesStore;
