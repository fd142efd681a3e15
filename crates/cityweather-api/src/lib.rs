//! OpenWeather client wrappers for the city weather input.
//!
//! Two calls: direct geocoding of a city/country pair and current weather for
//! a coordinate pair. Both take the HTTP client from the caller and never retry.

pub mod geocode;
pub mod http;
pub mod provider;
pub mod types;

pub use geocode::fetch_city_geo_data;
pub use http::{build_client, REQUEST_TIMEOUT};
pub use provider::fetch_weather_by_coordinates;
pub use types::{GeocodeLookupError, WeatherLookupError};
