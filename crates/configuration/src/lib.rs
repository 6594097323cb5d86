use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use settings::{
    CalendarSettings, CustomRangeSettings, NormalizerSettings, OutputFormat, SeriesSettings,
    Settings,
};

/// Loads the application configuration from the `config.toml` file in the working directory.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from("config.toml")
}

/// Loads configuration from `path`, layered under `MERIDIAN__*` environment variables.
///
/// The file is optional: a missing file yields the built-in defaults. The result is
/// validated before it is returned.
pub fn load_config_from(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
    let path = path.as_ref();
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        // e.g. MERIDIAN__CALENDAR__REFERENCE_SERIES=KOSDAQ
        .add_source(config::Environment::with_prefix("MERIDIAN").separator("__"))
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    tracing::debug!(
        path = %path.display(),
        reference = %settings.calendar.reference_series,
        threshold = %settings.custom_range.sufficiency_threshold,
        "Configuration loaded."
    );
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::SeriesKind;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn reads_sections_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[calendar]
reference_series = "SPX"

[series]
default_kind = "trading_day_restricted"

[series.kinds]
ALPHA = "calendar_every_day"

[custom_range]
sufficiency_threshold = "0.64"
"#
        )
        .unwrap();

        let settings = load_config_from(file.path()).unwrap();
        assert_eq!(settings.calendar.reference_series, "SPX");
        assert_eq!(settings.series.kind_for("ALPHA"), SeriesKind::CalendarEveryDay);
        assert_eq!(settings.custom_range.sufficiency_threshold, dec!(0.64));
        assert_eq!(settings.normalizer.rebase_base, dec!(10));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_config_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings.calendar.reference_series, "KOSPI");
    }

    #[test]
    fn default_location_without_file_loads_defaults() {
        // Tests run from the crate directory, which carries no config.toml.
        let settings = load_config().unwrap();
        assert_eq!(settings.custom_range.sufficiency_threshold, dec!(0.8));
        assert_eq!(settings.normalizer.rebase_base, dec!(10));
    }
}
