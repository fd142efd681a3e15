//! Cache-aware city weather lookup.

use cityweather_api::{fetch_city_geo_data, fetch_weather_by_coordinates};
use cityweather_core::{CityRecord, WeatherReading};
use cityweather_kvstore::CacheStore;
use reqwest::Client;
use tracing::instrument;

use crate::error::CityWeatherError;

/// Provider location and credential for one run.
#[derive(Clone)]
pub struct ApiEndpoint {
    pub base_url: String,
    pub api_key: String,
}

impl ApiEndpoint {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

impl std::fmt::Debug for ApiEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiEndpoint")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Resolve coordinates for `city`,`country_code` and fetch current weather.
///
/// The cache is consulted first. On a miss the city is geocoded and the
/// result written back before any weather request is made, so weather is
/// only ever fetched for coordinates that are resolved and stored. A failed
/// weather fetch leaves the freshly cached record in place.
///
/// # Errors
/// The first failing step's error. Nothing after it runs.
#[instrument(skip(http, store, api), fields(backend = store.backend()))]
pub async fn process_city_weather<S: CacheStore + ?Sized>(
    http: &Client,
    store: &S,
    collection: &str,
    city: &str,
    country_code: &str,
    api: &ApiEndpoint,
) -> Result<(CityRecord, WeatherReading), CityWeatherError> {
    let record = resolve_city(http, store, collection, city, country_code, api)
        .await
        .map_err(|e| log_failure(e, city, country_code))?;

    let reading =
        fetch_weather_by_coordinates(http, record.lat, record.lon, &api.api_key, &api.base_url)
            .await
            .map_err(|e| log_failure(e.into(), city, country_code))?;

    tracing::debug!(
        city,
        country_code,
        step = "weather",
        temperature = ?reading.temperature(),
        "Fetched weather"
    );
    Ok((record, reading))
}

async fn resolve_city<S: CacheStore + ?Sized>(
    http: &Client,
    store: &S,
    collection: &str,
    city: &str,
    country_code: &str,
    api: &ApiEndpoint,
) -> Result<CityRecord, CityWeatherError> {
    if let Some(record) = store.check_cached_city(collection, city, country_code).await? {
        tracing::info!(
            city,
            country_code,
            step = "cache",
            lat = record.lat,
            lon = record.lon,
            "Cache hit"
        );
        return Ok(record);
    }

    let geocoded = fetch_city_geo_data(http, city, country_code, &api.api_key, &api.base_url).await?;
    let record = store.upsert_city(collection, &geocoded).await?;
    tracing::info!(
        city,
        country_code,
        step = "geocode",
        lat = record.lat,
        lon = record.lon,
        "Cache miss, geocoded and cached"
    );
    Ok(record)
}

fn log_failure(err: CityWeatherError, city: &str, country_code: &str) -> CityWeatherError {
    tracing::error!(
        city,
        country_code,
        step = err.step(),
        error = %err,
        "{}",
        err.user_message()
    );
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_debug_redacts_key() {
        let api = ApiEndpoint::new("https://api.openweathermap.org", "abc123");
        let debug = format!("{:?}", api);
        assert!(!debug.contains("abc123"));
        assert!(debug.contains("api.openweathermap.org"));
    }
}
