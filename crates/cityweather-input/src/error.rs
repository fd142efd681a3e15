//! Error types for one input invocation.

use cityweather_api::{GeocodeLookupError, WeatherLookupError};
use cityweather_core::{ConfigError, ValidationError};
use cityweather_kvstore::CacheStoreError;
use thiserror::Error;

/// Failure to hand an event to the host.
#[derive(Debug, Error)]
pub enum EmissionError {
    #[error("Failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write event: {0}")]
    Write(#[from] std::io::Error),

    #[error("Event writer rejected the event: {0}")]
    Rejected(String),
}

/// Every way one run of the input can fail.
#[derive(Debug, Error)]
pub enum CityWeatherError {
    #[error(transparent)]
    Geocode(#[from] GeocodeLookupError),

    #[error(transparent)]
    Weather(#[from] WeatherLookupError),

    #[error(transparent)]
    CacheStore(#[from] CacheStoreError),

    #[error(transparent)]
    Emission(#[from] EmissionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl CityWeatherError {
    /// Pipeline step the error came from, for log fields.
    pub fn step(&self) -> &'static str {
        match self {
            Self::Geocode(_) => "geocode",
            Self::Weather(_) => "weather",
            Self::CacheStore(_) => "cache",
            Self::Emission(_) => "emit",
            Self::Config(_) | Self::Validation(_) => "config",
        }
    }

    /// Message for the operator-facing log line.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Geocode(e) => e.user_message(),
            Self::Weather(e) => e.user_message(),
            Self::CacheStore(e) => e.user_message(),
            Self::Emission(_) => "The event could not be written to the index.",
            Self::Config(e) => e.user_message(),
            Self::Validation(_) => "Input settings are invalid.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_and_message() {
        let err: CityWeatherError = GeocodeLookupError::NotFound {
            city: "atlantis".into(),
            country_code: "CR".into(),
        }
        .into();
        assert_eq!(err.step(), "geocode");
        assert!(err.user_message().contains("City not found"));
        assert_eq!(err.to_string(), "No geocoding result for atlantis,CR");

        let err: CityWeatherError = CacheStoreError::CollectionNotFound("city_geo".into()).into();
        assert_eq!(err.step(), "cache");

        let err: CityWeatherError = EmissionError::Rejected("closed".into()).into();
        assert_eq!(err.step(), "emit");
    }
}
