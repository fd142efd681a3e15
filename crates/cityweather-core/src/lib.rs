pub mod config;
pub mod error;
pub mod model;

pub use crate::config::{
    validate_http_url, AccountConfig, ApiConfig, Config, ConfigValidationError, InputConfig,
    Interval, SplunkConfig, ValidationError, ValidationResult,
};
pub use crate::error::{ConfigError, NetworkError, ReqwestErrorExt};
pub use crate::model::{CityRecord, WeatherReading};

use anyhow::Result;

/// Initialize logging for the modular input.
///
/// Logs go to stderr: stdout carries the event stream read by the host.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::debug!("City weather core initialized");
    Ok(())
}
