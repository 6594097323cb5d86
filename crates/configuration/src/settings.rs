use crate::error::ConfigError;
use core_types::SeriesKind;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::collections::HashMap;

/// The root configuration structure for the entire application.
///
/// Every section may be omitted from `config.toml`; omitted sections fall back to
/// their documented defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub calendar: CalendarSettings,
    pub series: SeriesSettings,
    pub custom_range: CustomRangeSettings,
    pub normalizer: NormalizerSettings,
}

impl Settings {
    /// Rejects values that would make the calculators meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.custom_range.sufficiency_threshold;
        if threshold <= Decimal::ZERO || threshold > Decimal::ONE {
            return Err(ConfigError::ValidationError(format!(
                "custom_range.sufficiency_threshold must be in (0, 1], got {threshold}"
            )));
        }
        if self.normalizer.rebase_base <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(format!(
                "normalizer.rebase_base must be greater than 0, got {}",
                self.normalizer.rebase_base
            )));
        }
        if self.calendar.reference_series.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "calendar.reference_series must name a series".to_string(),
            ));
        }
        Ok(())
    }
}

/// Which series defines the trading calendar.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// Name of the broad market index whose observation dates are the trading days.
    pub reference_series: String,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            reference_series: "KOSPI".to_string(),
        }
    }
}

/// Calendar kind assignment for every known series.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeriesSettings {
    /// Kind used for any series not listed in `kinds`.
    pub default_kind: SeriesKind,
    /// Per-series overrides, keyed by series name.
    pub kinds: HashMap<String, SeriesKind>,
}

impl SeriesSettings {
    /// Kind for `series_name`. Override keys match case-insensitively since some
    /// configuration sources fold key case.
    pub fn kind_for(&self, series_name: &str) -> SeriesKind {
        self.kinds
            .get(series_name)
            .or_else(|| {
                self.kinds
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(series_name))
                    .map(|(_, kind)| kind)
            })
            .copied()
            .unwrap_or(self.default_kind)
    }
}

/// Parameters for arbitrary start/end window calculations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CustomRangeSettings {
    /// Minimum share of expected dates that must carry an observation (0.8 = 80%).
    pub sufficiency_threshold: Decimal,
}

impl Default for CustomRangeSettings {
    fn default() -> Self {
        Self {
            sufficiency_threshold: dec!(0.8),
        }
    }
}

/// Parameters for the presentation-side comparison stage.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NormalizerSettings {
    /// Value the first in-window observation of every rebased series maps to.
    pub rebase_base: Decimal,
}

impl Default for NormalizerSettings {
    fn default() -> Self {
        Self {
            rebase_base: dec!(10),
        }
    }
}

/// Output rendering for the command-line front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}
