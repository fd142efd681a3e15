//! Current weather by coordinates.

use cityweather_core::WeatherReading;
use reqwest::Client;
use serde_json::Value;
use tracing::instrument;

use crate::http::{endpoint, read_body, transport_error, truncate_body, REQUEST_TIMEOUT};
use crate::types::WeatherLookupError;

const WEATHER_PATH: &str = "/data/2.5/weather";

/// Fetch the current weather at (`lat`, `lon`).
#[instrument(skip(client, api_key), level = "debug")]
pub async fn fetch_weather_by_coordinates(
    client: &Client,
    lat: f64,
    lon: f64,
    api_key: &str,
    base_url: &str,
) -> Result<WeatherReading, WeatherLookupError> {
    let url = endpoint(base_url, WEATHER_PATH);
    let lat = lat.to_string();
    let lon = lon.to_string();

    let response = client
        .get(&url)
        .query(&[("lat", lat.as_str()), ("lon", lon.as_str()), ("appid", api_key)])
        .timeout(REQUEST_TIMEOUT)
        .send()
        .await
        .map_err(transport_error)?;

    let (status, body) = read_body(response).await?;
    if !status.is_success() {
        tracing::debug!("Weather API returned status {}", status);
        return Err(WeatherLookupError::Status {
            status: status.as_u16(),
            message: truncate_body(&body),
        });
    }

    let payload: Value = serde_json::from_str(&body)
        .map_err(|e| WeatherLookupError::InvalidPayload(format!("body is not JSON: {}", e)))?;

    WeatherReading::from_value(payload).map_err(WeatherLookupError::InvalidPayload)
}
