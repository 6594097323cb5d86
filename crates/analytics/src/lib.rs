//! # Meridian Analytics Engine
//!
//! This crate computes period returns, compound growth rates and drawdowns for named
//! valuation series.
//!
//! ## Architectural Principles
//!
//! - **Pure Calculation:** Every calculator is a deterministic function over an
//!   immutable, already-sorted `Snapshot`. There is no I/O and no shared mutation.
//! - **Localized Failure:** Each metric fails on its own. A missing endpoint or a too
//!   sparse window makes that one metric `Unavailable`; sibling metrics and other series
//!   are unaffected, and no error crosses `AnalyticsEngine::calculate`.
//! - **One Calendar:** All trading-day arithmetic goes through `calendar::TradingCalendar`.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: computes a `ReturnsReport` for a `ReportRequest`.
//! - `returns`, `drawdown`, `custom_range`: the individual calculators.
//! - `AnalyticsError`: why an individual metric was not produced.

// Declare the modules that constitute this crate.
pub mod custom_range;
pub mod drawdown;
pub mod engine;
pub mod error;
pub mod report;
pub mod returns;

// Re-export the key components to create a clean, public-facing API.
pub use custom_range::{CustomRangeCalculator, CustomRangeResult, DateRange};
pub use drawdown::{current_drawdown, drawdown_series, max_drawdown, DrawdownPoint};
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use report::{ReportRequest, ReturnsReport, SeriesReport};
pub use returns::{period_returns, year_fraction, DAYS_PER_YEAR};
