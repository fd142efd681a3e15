//! Direct geocoding: resolve a city/country pair to coordinates.

use cityweather_core::CityRecord;
use reqwest::Client;
use serde_json::Value;
use tracing::instrument;

use crate::http::{endpoint, read_body, transport_error, truncate_body, REQUEST_TIMEOUT};
use crate::types::{GeoDirectEntry, GeocodeLookupError};

const GEOCODE_PATH: &str = "/geo/1.0/direct";

/// Geocode `city`,`country_code` and return the first match.
///
/// The returned record carries the caller's `city` and `country_code` so it can
/// be cached under the same key it was looked up with.
#[instrument(skip(client, api_key), level = "debug")]
pub async fn fetch_city_geo_data(
    client: &Client,
    city: &str,
    country_code: &str,
    api_key: &str,
    base_url: &str,
) -> Result<CityRecord, GeocodeLookupError> {
    let url = endpoint(base_url, GEOCODE_PATH);
    let query = format!("{},{}", city, country_code);

    let response = client
        .get(&url)
        .query(&[("q", query.as_str()), ("appid", api_key)])
        .timeout(REQUEST_TIMEOUT)
        .send()
        .await
        .map_err(transport_error)?;

    let (status, body) = read_body(response).await?;
    if !status.is_success() {
        tracing::debug!("Geocoding returned status {}", status);
        return Err(GeocodeLookupError::Status {
            status: status.as_u16(),
            message: truncate_body(&body),
        });
    }

    let payload: Value = serde_json::from_str(&body)
        .map_err(|e| GeocodeLookupError::InvalidPayload(format!("body is not JSON: {}", e)))?;

    let Value::Array(mut entries) = payload else {
        return Err(GeocodeLookupError::InvalidPayload(
            "expected a JSON array".to_string(),
        ));
    };

    if entries.is_empty() {
        return Err(GeocodeLookupError::NotFound {
            city: city.to_string(),
            country_code: country_code.to_string(),
        });
    }

    let first: GeoDirectEntry = serde_json::from_value(entries.swap_remove(0)).map_err(|e| {
        GeocodeLookupError::InvalidPayload(format!("first result lacks numeric lat/lon: {}", e))
    })?;

    if let Some(country) = first.country.as_deref() {
        if !country.eq_ignore_ascii_case(country_code) {
            tracing::warn!(
                "Geocoder matched {} in country {} for {},{}",
                first.name.as_deref().unwrap_or(city),
                country,
                city,
                country_code
            );
        }
    }

    tracing::debug!("Geocoded {},{} to ({}, {})", city, country_code, first.lat, first.lon);
    Ok(CityRecord::new(city, country_code, first.lat, first.lon))
}
