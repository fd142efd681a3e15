use cityweather_core::NetworkError;
use serde::Deserialize;

/// One entry of the `/geo/1.0/direct` response array.
#[derive(Debug, Deserialize)]
pub(crate) struct GeoDirectEntry {
    pub lat: f64,
    pub lon: f64,
    pub name: Option<String>,
    pub country: Option<String>,
}

/// Geocoding lookup errors
#[derive(Debug, thiserror::Error)]
pub enum GeocodeLookupError {
    #[error("Geocoding request failed: {0}")]
    Network(#[from] NetworkError),
    #[error("Geocoding API returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("No geocoding result for {city},{country_code}")]
    NotFound { city: String, country_code: String },
    #[error("Invalid geocoding payload: {0}")]
    InvalidPayload(String),
}

impl GeocodeLookupError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(e) => e.user_message(),
            Self::Status { status: 401, .. } => "Weather API key is invalid. Check the account settings.",
            Self::Status { .. } => "Geocoding service error. The next scheduled run will try again.",
            Self::NotFound { .. } => "City not found. Check the city and country code.",
            Self::InvalidPayload(_) => "Geocoding service returned unexpected data.",
        }
    }
}

/// Weather lookup errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherLookupError {
    #[error("Weather request failed: {0}")]
    Network(#[from] NetworkError),
    #[error("Weather API returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Invalid weather payload: {0}")]
    InvalidPayload(String),
}

impl WeatherLookupError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(e) => e.user_message(),
            Self::Status { status: 401, .. } => "Weather API key is invalid. Check the account settings.",
            Self::Status { .. } => "Weather service error. The next scheduled run will try again.",
            Self::InvalidPayload(_) => "Weather service returned unexpected data.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_entry_tolerates_extra_fields() {
        let entry: GeoDirectEntry = serde_json::from_value(serde_json::json!({
            "name": "Guanacaste",
            "local_names": {"es": "Guanacaste"},
            "lat": 10.5,
            "lon": -85.4,
            "country": "CR",
            "state": "Guanacaste"
        }))
        .unwrap();
        assert_eq!(entry.lat, 10.5);
        assert_eq!(entry.country.as_deref(), Some("CR"));
        assert_eq!(entry.name.as_deref(), Some("Guanacaste"));
    }

    #[test]
    fn test_unauthorized_user_message() {
        let err = WeatherLookupError::Status {
            status: 401,
            message: "Invalid API key".into(),
        };
        assert!(err.user_message().contains("API key"));

        let err = GeocodeLookupError::NotFound {
            city: "atlantis".into(),
            country_code: "CR".into(),
        };
        assert_eq!(err.to_string(), "No geocoding result for atlantis,CR");
    }
}
