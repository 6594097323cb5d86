use thiserror::Error;

/// Why `Settings` could not be produced.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file or `MERIDIAN__*` environment overrides could not be read or deserialized.
    #[error("Could not read settings from config.toml or MERIDIAN__* variables: {0}")]
    LoadError(#[from] config::ConfigError),

    /// The settings were read but describe an unusable calculation setup.
    #[error("Invalid settings: {0}")]
    ValidationError(String),
}
