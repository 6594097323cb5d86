use chrono::NaiveDate;
use thiserror::Error;

/// Why a single metric could not be produced.
///
/// These never cross the engine boundary: the engine turns each one into an
/// `Unavailable` metric and logs the reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("Series '{0}' is not known to the store")]
    MissingSeries(String),

    #[error("Not enough data to perform calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid date range: end {end} is before start {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("No observation at or before {0} to anchor the calculation")]
    UnresolvedEndpoint(NaiveDate),

    #[error("Error in calculation: {0}")]
    Calculation(String),
}
