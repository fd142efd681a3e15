use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Resolved coordinates for a (city, country code) pair.
///
/// The pair is the cache identity. `city` is kept exactly as supplied; the
/// geocoding provider expects lower case, so callers should pass it that way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub city: String,
    pub country_code: String,
    pub lat: f64,
    pub lon: f64,
}

impl CityRecord {
    pub fn new(city: impl Into<String>, country_code: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            city: city.into(),
            country_code: country_code.into(),
            lat,
            lon,
        }
    }

    /// Deterministic cache key, `{city}-{country_code}`.
    pub fn key(&self) -> String {
        Self::key_for(&self.city, &self.country_code)
    }

    pub fn key_for(city: &str, country_code: &str) -> String {
        format!("{}-{}", city, country_code)
    }

    pub fn matches(&self, city: &str, country_code: &str) -> bool {
        self.city == city && self.country_code == country_code
    }
}

/// One current-weather observation as returned by the provider.
///
/// The payload is kept verbatim. Construction through [`WeatherReading::from_value`]
/// guarantees a JSON object whose `main.temp` (if present) is numeric and whose
/// `weather` (if present) is an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherReading(Value);

impl WeatherReading {
    /// Validate the provider payload shape. Returns a description of the first
    /// violation on failure.
    pub fn from_value(value: Value) -> Result<Self, String> {
        let object = value
            .as_object()
            .ok_or_else(|| format!("expected a JSON object, got {}", json_kind(&value)))?;

        if let Some(main) = object.get("main") {
            let main = main
                .as_object()
                .ok_or_else(|| format!("`main` must be an object, got {}", json_kind(main)))?;
            if let Some(temp) = main.get("temp") {
                if !temp.is_number() {
                    return Err(format!("`main.temp` must be numeric, got {}", json_kind(temp)));
                }
            }
        }

        if let Some(weather) = object.get("weather") {
            if !weather.is_array() {
                return Err(format!("`weather` must be an array, got {}", json_kind(weather)));
            }
        }

        Ok(Self(value))
    }

    /// `main.temp`, in the provider's unit (Kelvin unless `units` was requested).
    pub fn temperature(&self) -> Option<f64> {
        self.0.pointer("/main/temp").and_then(Value::as_f64)
    }

    /// The `weather` condition list.
    pub fn conditions(&self) -> Option<&[Value]> {
        self.0.get("weather").and_then(Value::as_array).map(Vec::as_slice)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
