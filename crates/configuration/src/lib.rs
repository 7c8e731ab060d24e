use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    AllocatorSettings, BacktestSettings, Config, LoggingSettings, OptimizerSettings,
    ZeroVariancePolicy,
};

/// Prefix for environment overrides, e.g. `ARENA__OPTIMIZER__SEED=7`.
pub const ENV_PREFIX: &str = "ARENA";

/// Loads the application configuration.
///
/// The TOML file at `path` is optional; every section falls back to its
/// defaults when absent. Environment variables prefixed with `ARENA__` are
/// layered on top, then the result is validated.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(path = %path.display(), "Configuration loaded.");
    Ok(config)
}

/// Parses configuration from an in-memory TOML string. No environment layering.
pub fn load_config_from_str(toml: &str) -> Result<Config, ConfigError> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?
        .try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}
