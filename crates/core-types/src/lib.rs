//! # Meridian Core Types
//!
//! Layer 0 of the workspace: the plain data structures every other crate speaks.
//! Nothing in here performs I/O or knows about calendars or configuration.

pub mod enums;
pub mod error;
pub mod metric;
pub mod period;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{ReturnMode, SeriesKind};
pub use error::CoreError;
pub use metric::{round_pct, DrawdownResult, Metric, ReturnResult};
pub use period::{PeriodCode, PeriodDefinition, PeriodLength, PERIOD_CATALOG};
pub use structs::{Observation, RawRow, RawValue, Series};
