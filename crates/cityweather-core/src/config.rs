use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use url::Url;

/// Prefix for layered environment overrides, e.g. `CITYWEATHER_SPLUNK__HOST`.
pub const ENV_PREFIX: &str = "CITYWEATHER";

/// Name of the account used when only `API_KEY` is provided.
pub const DEFAULT_ACCOUNT: &str = "default";

pub const MIN_INTERVAL_SECS: f64 = 10.0;
pub const MAX_INTERVAL_SECS: f64 = 86_400.0;

#[allow(clippy::expect_used)]
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]\w*$").expect("input name pattern"));

#[allow(clippy::expect_used)]
static COUNTRY_CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").expect("country code pattern"));

#[allow(clippy::expect_used)]
static INDEX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_-]*$").expect("index pattern"));

// Either a number of seconds (-1 included, rejected later by the range check)
// or a five-field cron expression.
#[allow(clippy::expect_used)]
static INTERVAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(-1|\d+(?:\.\d+)?)|((?:[*\d,/-]+\s){4}[*\d,/-]+))$")
        .expect("interval pattern")
});

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Get a message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Turn the result into an error when it holds errors; warnings are returned otherwise.
    pub fn into_result(self) -> Result<Vec<ConfigValidationError>, ValidationError> {
        if self.is_valid() {
            Ok(self.warnings)
        } else {
            Err(ValidationError {
                errors: self.errors,
            })
        }
    }
}

/// Validation failure raised by `--validate-arguments` and before each run.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub errors: Vec<ConfigValidationError>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let summary = self
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "Configuration validation failed: {}", summary)
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Weather/geocoding provider settings
    pub api: ApiConfig,

    /// Splunk management endpoint and KV store settings
    pub splunk: SplunkConfig,

    /// Named provider credentials, referenced by `inputs[].account`
    pub accounts: BTreeMap<String, AccountConfig>,

    /// Configured input stanzas
    pub inputs: Vec<InputConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the OpenWeather-compatible API (no trailing path)
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplunkConfig {
    pub scheme: String,
    pub host: String,
    pub port: u16,

    /// App namespace owning the KV collection
    pub app: String,

    /// User scope for the KV store (`nobody` for app-wide)
    pub owner: String,

    /// KV collection caching geocoded cities
    pub collection: String,

    /// Session key; normally supplied through `SPLUNK_SESSION_KEY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_key: Option<String>,

    /// Accept the self-signed certificate of the management port.
    ///
    /// Only meant for local development instances.
    pub allow_invalid_certs: bool,
}

impl Default for SplunkConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            host: "localhost".to_string(),
            port: 8089,
            app: "ta_tdd_demo".to_string(),
            owner: "nobody".to_string(),
            collection: "city_geo".to_string(),
            session_key: None,
            allow_invalid_certs: false,
        }
    }
}

impl SplunkConfig {
    /// `{scheme}://{host}:{port}` of the management interface
    pub fn management_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub api_key: String,
}

impl AccountConfig {
    /// Check if the key is set (not a placeholder)
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.api_key.starts_with("YOUR_")
    }
}

/// One `city_weather_input://<name>` stanza.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub name: String,
    pub city: String,
    #[serde(default = "default_country_code")]
    pub country_code: String,
    pub account: String,
    #[serde(default = "default_index")]
    pub index: String,
    #[serde(default = "default_sourcetype")]
    pub sourcetype: String,
    /// Seconds between runs, or a cron expression
    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default)]
    pub disabled: bool,
}

fn default_country_code() -> String {
    "CR".to_string()
}

fn default_index() -> String {
    "default".to_string()
}

fn default_sourcetype() -> String {
    "weather:current".to_string()
}

fn default_interval() -> String {
    "86400".to_string()
}

impl InputConfig {
    pub fn new(
        name: impl Into<String>,
        city: impl Into<String>,
        country_code: impl Into<String>,
        account: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            city: city.into(),
            country_code: country_code.into(),
            account: account.into(),
            index: default_index(),
            sourcetype: default_sourcetype(),
            interval: default_interval(),
            disabled: false,
        }
    }

    /// Stanza name as the host reports it, e.g. `city_weather_input://guanacaste`
    pub fn stanza(&self) -> String {
        format!("city_weather_input://{}", self.name)
    }

    /// Validate the stanza's own fields
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();
        let prefix = format!("inputs.{}", self.name);

        let name_len = self.name.chars().count();
        if name_len == 0 || name_len > 100 {
            result.add_error(format!("{}.name", prefix), "Name must be 1-100 characters");
        } else if !NAME_PATTERN.is_match(&self.name) {
            result.add_error(
                format!("{}.name", prefix),
                "Name must start with a letter and contain only letters, digits and underscores",
            );
        }

        let city_len = self.city.chars().count();
        if city_len == 0 || city_len > 100 {
            result.add_error(format!("{}.city", prefix), "City must be 1-100 characters");
        } else if self.city.chars().any(char::is_uppercase) {
            result.add_warning(
                format!("{}.city", prefix),
                "City contains uppercase characters; cache keys are case-sensitive and the geocoder expects lower case",
            );
        }

        if !COUNTRY_CODE_PATTERN.is_match(&self.country_code) {
            result.add_error(
                format!("{}.country_code", prefix),
                "Country code must be two uppercase letters",
            );
        }

        if self.sourcetype.trim().is_empty() {
            result.add_error(format!("{}.sourcetype", prefix), "Sourcetype is required");
        }

        let index_len = self.index.chars().count();
        if index_len == 0 || index_len > 80 {
            result.add_error(format!("{}.index", prefix), "Index must be 1-80 characters");
        } else if !INDEX_PATTERN.is_match(&self.index) {
            result.add_error(
                format!("{}.index", prefix),
                "Index must start with a letter or digit and contain only letters, digits, '_' and '-'",
            );
        }

        if let Err(message) = Interval::parse(&self.interval) {
            result.add_error(format!("{}.interval", prefix), message);
        }

        if self.account.trim().is_empty() {
            result.add_error(format!("{}.account", prefix), "Account is required");
        }

        result
    }
}

/// Polling interval of an input.
#[derive(Debug, Clone, PartialEq)]
pub enum Interval {
    Seconds(f64),
    Cron(String),
}

impl Interval {
    pub fn parse(value: &str) -> Result<Self, String> {
        let value = value.trim();
        let captures = INTERVAL_PATTERN
            .captures(value)
            .ok_or_else(|| format!("Interval must be a number of seconds or a cron expression, got '{}'", value))?;

        if let Some(secs) = captures.get(1) {
            let secs: f64 = secs
                .as_str()
                .parse()
                .map_err(|e| format!("Invalid interval '{}': {}", value, e))?;
            if !(MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS).contains(&secs) {
                return Err(format!(
                    "Interval must be between {} and {} seconds, got {}",
                    MIN_INTERVAL_SECS, MAX_INTERVAL_SECS, secs
                ));
            }
            return Ok(Interval::Seconds(secs));
        }

        Ok(Interval::Cron(value.to_string()))
    }
}

/// Validate that `url_str` is an absolute http(s) URL with a host
pub fn validate_http_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
    match Url::parse(url_str) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                result.add_error(
                    field_name,
                    format!("URL must use http or https scheme, got: {}", url.scheme()),
                );
            }

            if url.host().is_none() {
                result.add_error(field_name, "URL must have a host");
            }

            if url.port() == Some(0) {
                result.add_error(field_name, "Port cannot be 0");
            }
        }
        Err(e) => {
            result.add_error(field_name, format!("Invalid URL: {}", e));
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// With `path`, the file must exist. Without it, the per-user default path is
    /// used and a default file is created when missing. Environment overrides are
    /// applied on top in both cases.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(crate::ConfigError::NotFound(p.display().to_string()).into());
                }
                p.to_path_buf()
            }
            None => {
                let p = Self::default_path()?;
                if !p.exists() {
                    tracing::info!("No configuration at {}, writing defaults", p.display());
                    Self::default().save(&p)?;
                }
                p
            }
        };

        let mut config = Self::load_layered(&config_path)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// File plus `CITYWEATHER_*` environment layering.
    fn load_layered(config_path: &Path) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(
                ::config::File::from(config_path)
                    .format(::config::FileFormat::Toml)
                    .required(true),
            )
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(crate::ConfigError::from)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(crate::ConfigError::from)
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Apply the variables used by the add-on's test harness and deployment
    /// scripts (`SPLUNK_SESSION_KEY`, `BASE_URL`, `API_KEY`, ...).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("SPLUNK_SESSION_KEY") {
            self.splunk.session_key = Some(v);
        }
        if let Some(v) = lookup("SPLUNK_APP") {
            self.splunk.app = v;
        }
        if let Some(v) = lookup("OWNER") {
            self.splunk.owner = v;
        }
        if let Some(v) = lookup("SPLUNK_HOST") {
            self.splunk.host = v;
        }
        if let Some(v) = lookup("SPLUNK_SCHEME") {
            self.splunk.scheme = v;
        }
        if let Some(v) = lookup("SPLUNK_PORT") {
            match v.parse() {
                Ok(port) => self.splunk.port = port,
                Err(e) => tracing::warn!("Ignoring SPLUNK_PORT={}: {}", v, e),
            }
        }
        if let Some(v) = lookup("KV_COLLECTION") {
            self.splunk.collection = v;
        }
        if let Some(v) = lookup("BASE_URL") {
            self.api.base_url = v;
        }
        if let Some(v) = lookup("API_KEY") {
            self.accounts.entry(DEFAULT_ACCOUNT.to_string()).or_default().api_key = v;
        }
    }

    /// Validate the whole configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        validate_http_url(&self.api.base_url, "api.base_url", &mut result);
        validate_http_url(&self.splunk.management_url(), "splunk", &mut result);

        if self.splunk.collection.trim().is_empty() {
            result.add_error("splunk.collection", "KV collection name is required");
        }
        if self.splunk.app.trim().is_empty() {
            result.add_error("splunk.app", "App namespace is required");
        }
        if self.splunk.owner.trim().is_empty() {
            result.add_error("splunk.owner", "Owner is required");
        }
        if self.splunk.session_key.is_none() {
            result.add_warning(
                "splunk.session_key",
                "No session key configured - set SPLUNK_SESSION_KEY before running inputs",
            );
        }
        if self.splunk.allow_invalid_certs {
            result.add_warning(
                "splunk.allow_invalid_certs",
                "Certificate verification is disabled for the management port",
            );
        }

        let mut seen = HashSet::new();
        for input in &self.inputs {
            if !seen.insert(input.name.as_str()) {
                result.add_error(
                    format!("inputs.{}.name", input.name),
                    "Input names must be unique",
                );
            }
            result.merge(self.validate_input(input));
        }

        if self.inputs.is_empty() {
            result.add_warning("inputs", "No inputs configured");
        }

        result
    }

    /// Validate one stanza, including its account reference
    pub fn validate_input(&self, input: &InputConfig) -> ValidationResult {
        let mut result = input.validate();

        if !input.account.trim().is_empty() {
            match self.accounts.get(&input.account) {
                None => result.add_error(
                    format!("inputs.{}.account", input.name),
                    format!("Unknown account '{}'", input.account),
                ),
                Some(account) if !account.is_configured() => result.add_error(
                    format!("accounts.{}.api_key", input.account),
                    "API key is not configured",
                ),
                Some(_) => {}
            }
        }

        result
    }

    /// Find an input stanza by name
    pub fn input(&self, name: &str) -> Option<&InputConfig> {
        self.inputs.iter().find(|i| i.name == name)
    }

    pub fn enabled_inputs(&self) -> impl Iterator<Item = &InputConfig> {
        self.inputs.iter().filter(|i| !i.disabled)
    }

    /// Save configuration to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Per-user default location of the configuration file
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("cityweather");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn configured() -> Config {
        let mut config = Config::default();
        config.splunk.session_key = Some("S".to_string());
        config.accounts.insert(
            "default".to_string(),
            AccountConfig {
                api_key: "K".to_string(),
            },
        );
        config
            .inputs
            .push(InputConfig::new("guanacaste", "guanacaste", "CR", "default"));
        config
    }

    #[test]
    fn test_valid_config() {
        let result = configured().validate();
        assert!(result.is_valid(), "Config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_default_config_is_valid_with_warnings() {
        let result = Config::default().validate();
        assert!(result.is_valid(), "{:?}", result.errors);
        assert!(result.warnings.iter().any(|w| w.field == "splunk.session_key"));
        assert!(result.warnings.iter().any(|w| w.field == "inputs"));
    }

    #[test]
    fn test_invalid_base_url_scheme() {
        let mut config = configured();
        config.api.base_url = "ftp://localhost:3000".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_invalid_name() {
        let mut input = InputConfig::new("1st", "guanacaste", "CR", "default");
        assert!(!input.validate().is_valid());
        input.name = "my-input".to_string();
        assert!(!input.validate().is_valid());
        input.name = "a".repeat(101);
        assert!(!input.validate().is_valid());
        input.name = "my_input2".to_string();
        assert!(input.validate().is_valid());
    }

    #[test]
    fn test_country_code_must_be_two_uppercase_letters() {
        for bad in ["cr", "CRI", "C", "", "C1"] {
            let input = InputConfig::new("city", "guanacaste", bad, "default");
            let result = input.validate();
            assert!(
                result.errors.iter().any(|e| e.field.ends_with("country_code")),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_city_length_and_case() {
        let mut input = InputConfig::new("city", "", "CR", "default");
        assert!(!input.validate().is_valid());

        input.city = "Guanacaste".to_string();
        let result = input.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field.ends_with("city")));
    }

    #[test]
    fn test_index_pattern() {
        let mut input = InputConfig::new("city", "guanacaste", "CR", "default");
        input.index = "weather_test-1".to_string();
        assert!(input.validate().is_valid());
        input.index = "_internal".to_string();
        assert!(!input.validate().is_valid());
        input.index = "a".repeat(81);
        assert!(!input.validate().is_valid());
    }

    #[test]
    fn test_interval_parse() {
        assert_eq!(Interval::parse("86400"), Ok(Interval::Seconds(86_400.0)));
        assert_eq!(Interval::parse("10"), Ok(Interval::Seconds(10.0)));
        assert_eq!(Interval::parse("300.5"), Ok(Interval::Seconds(300.5)));
        assert_eq!(
            Interval::parse("*/15 * * * *"),
            Ok(Interval::Cron("*/15 * * * *".to_string()))
        );
        assert!(Interval::parse("9").is_err());
        assert!(Interval::parse("86401").is_err());
        assert!(Interval::parse("-1").is_err());
        assert!(Interval::parse("hourly").is_err());
        assert!(Interval::parse("* * *").is_err());
    }

    #[test]
    fn test_unknown_account() {
        let mut config = configured();
        config.inputs[0].account = "missing".to_string();
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.message.contains("Unknown account")));
    }

    #[test]
    fn test_placeholder_api_key_is_error() {
        let mut config = configured();
        config.accounts.insert(
            "default".to_string(),
            AccountConfig {
                api_key: "YOUR_OPENWEATHER_API_KEY".to_string(),
            },
        );
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "accounts.default.api_key"));
    }

    #[test]
    fn test_duplicate_input_names() {
        let mut config = configured();
        config
            .inputs
            .push(InputConfig::new("guanacaste", "liberia", "CR", "default"));
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.message.contains("unique")));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SPLUNK_SESSION_KEY", "abc"),
            ("SPLUNK_PORT", "18089"),
            ("KV_COLLECTION", "city_geo_test"),
            ("BASE_URL", "http://mockoon:3000"),
            ("API_KEY", "K2"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.splunk.session_key.as_deref(), Some("abc"));
        assert_eq!(config.splunk.port, 18089);
        assert_eq!(config.splunk.collection, "city_geo_test");
        assert_eq!(config.api.base_url, "http://mockoon:3000");
        assert_eq!(config.accounts["default"].api_key, "K2");
    }

    #[test]
    fn test_invalid_port_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|name| (name == "SPLUNK_PORT").then(|| "http".to_string()));
        assert_eq!(config.splunk.port, 8089);
    }

    #[test]
    fn test_validation_result_into_result() {
        let mut result = ValidationResult::default();
        result.add_warning("a", "warn");
        assert_eq!(result.clone().into_result().unwrap().len(), 1);

        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let err = result.into_result().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("field1"));
        assert!(message.contains("field2"));
    }

    #[test]
    fn test_load_from_file_applies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[api]
base_url = "http://mockoon:3000"

[splunk]
host = "splunk"
session_key = "S"

[accounts.default]
api_key = "K"

[[inputs]]
name = "guanacaste"
city = "guanacaste"
account = "default"
"#,
        )
        .unwrap();

        let config = Config::load_layered(&path).unwrap();
        assert_eq!(config.api.base_url, "http://mockoon:3000");
        assert_eq!(config.splunk.host, "splunk");
        assert_eq!(config.splunk.port, 8089);
        assert_eq!(config.splunk.collection, "city_geo");

        let input = config.input("guanacaste").unwrap();
        assert_eq!(input.country_code, "CR");
        assert_eq!(input.index, "default");
        assert_eq!(input.sourcetype, "weather:current");
        assert_eq!(input.interval, "86400");
        assert!(!input.disabled);
        assert!(config.validate().is_valid());
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = configured();
        config.save(&path).unwrap();

        let loaded = Config::load_layered(&path).unwrap();
        assert_eq!(loaded.inputs.len(), 1);
        assert_eq!(loaded.inputs[0].city, "guanacaste");
        assert_eq!(loaded.accounts["default"].api_key, "K");
        assert_eq!(loaded.splunk.session_key.as_deref(), Some("S"));
    }

    #[test]
    fn test_enabled_inputs_skip_disabled() {
        let mut config = configured();
        let mut disabled = InputConfig::new("liberia", "liberia", "CR", "default");
        disabled.disabled = true;
        config.inputs.push(disabled);
        let names: Vec<_> = config.enabled_inputs().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["guanacaste"]);
    }

    #[test]
    fn test_stanza_name() {
        let input = InputConfig::new("guanacaste", "guanacaste", "CR", "default");
        assert_eq!(input.stanza(), "city_weather_input://guanacaste");
    }
}
