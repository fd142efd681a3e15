//! The `city_weather_input` modular input.

use std::sync::Arc;

use async_trait::async_trait;
use cityweather_core::{validate_http_url, Config, ConfigError, InputConfig, ValidationError};
use cityweather_kvstore::CacheStore;
use reqwest::Client;

use crate::error::CityWeatherError;
use crate::events::{index_weather_events_in_splunk, CityWeatherEvent, EventSink};
use crate::orchestrator::{process_city_weather, ApiEndpoint};
use crate::xml::escape;

/// Input kind as registered with the host.
pub const INPUT_NAME: &str = "city_weather_input";

/// One argument declared in the introspection scheme.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemeArgument {
    pub name: String,
    pub title: String,
    pub description: String,
    pub required_on_create: bool,
}

impl SchemeArgument {
    pub fn required(name: &str, title: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            required_on_create: true,
        }
    }
}

/// Introspection scheme printed for `--scheme`.
#[derive(Debug, Clone, PartialEq)]
pub struct Scheme {
    pub title: String,
    pub description: String,
    pub use_external_validation: bool,
    pub use_single_instance: bool,
    pub arguments: Vec<SchemeArgument>,
}

impl Scheme {
    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<scheme>");
        xml.push_str(&format!("<title>{}</title>", escape(&self.title)));
        xml.push_str(&format!("<description>{}</description>", escape(&self.description)));
        xml.push_str(&format!(
            "<use_external_validation>{}</use_external_validation>",
            self.use_external_validation
        ));
        xml.push_str(&format!(
            "<use_single_instance>{}</use_single_instance>",
            self.use_single_instance
        ));
        xml.push_str("<streaming_mode>xml</streaming_mode>");
        xml.push_str("<endpoint><args>");
        for arg in &self.arguments {
            xml.push_str(&format!("<arg name=\"{}\">", escape(&arg.name)));
            xml.push_str(&format!("<title>{}</title>", escape(&arg.title)));
            xml.push_str(&format!("<description>{}</description>", escape(&arg.description)));
            xml.push_str(&format!(
                "<required_on_create>{}</required_on_create>",
                arg.required_on_create
            ));
            xml.push_str("</arg>");
        }
        xml.push_str("</args></endpoint></scheme>");
        xml
    }
}

/// Everything one invocation needs: the stanza plus resolved provider
/// endpoint and cache collection.
#[derive(Debug, Clone)]
pub struct InputDefinition {
    pub input: InputConfig,
    pub api: ApiEndpoint,
    pub collection: String,
}

impl InputDefinition {
    /// Resolve the stanza called `name` against `config`.
    pub fn resolve(config: &Config, name: &str) -> Result<Self, ConfigError> {
        let input = config
            .input(name)
            .ok_or_else(|| ConfigError::UnknownInput(name.to_string()))?;
        Self::from_input(config, input)
    }

    pub fn from_input(config: &Config, input: &InputConfig) -> Result<Self, ConfigError> {
        let account = config
            .accounts
            .get(&input.account)
            .ok_or_else(|| ConfigError::UnknownAccount(input.account.clone()))?;

        Ok(Self {
            input: input.clone(),
            api: ApiEndpoint::new(&config.api.base_url, &account.api_key),
            collection: config.splunk.collection.clone(),
        })
    }
}

/// Host-independent modular input contract.
#[async_trait]
pub trait ModularInput: Send + Sync {
    fn scheme(&self) -> Scheme;

    /// Check a definition without touching the network.
    fn validate(&self, definition: &InputDefinition) -> Result<(), ValidationError>;

    /// Run once and write the resulting events to `sink`.
    async fn run(
        &self,
        definition: &InputDefinition,
        sink: &mut dyn EventSink,
    ) -> Result<(), CityWeatherError>;
}

/// Geocode-cached current weather for one city per stanza.
pub struct CityWeatherInput {
    http: Client,
    store: Arc<dyn CacheStore>,
}

impl CityWeatherInput {
    pub fn new(http: Client, store: Arc<dyn CacheStore>) -> Self {
        Self { http, store }
    }

    /// Scheme advertised to the host.
    pub fn describe() -> Scheme {
        Scheme {
            title: INPUT_NAME.to_string(),
            description: "City Weather Input".to_string(),
            use_external_validation: true,
            use_single_instance: false,
            arguments: vec![
                SchemeArgument::required("name", "Name", "Unique name of the input"),
                SchemeArgument::required("city", "City", "City to report weather for, in lower case"),
                SchemeArgument::required(
                    "country_code",
                    "Country code",
                    "Two-letter ISO 3166 country code",
                ),
                SchemeArgument::required("account", "Account", "Weather API account"),
            ],
        }
    }

    /// Validate a definition. Warnings are logged, errors returned.
    pub fn check(definition: &InputDefinition) -> Result<(), ValidationError> {
        let mut result = definition.input.validate();
        validate_http_url(&definition.api.base_url, "api.base_url", &mut result);

        if definition.api.api_key.trim().is_empty() {
            result.add_error(
                format!("accounts.{}.api_key", definition.input.account),
                "API key is not configured",
            );
        }
        if definition.collection.trim().is_empty() {
            result.add_error("splunk.collection", "KV collection name is required");
        }

        for warning in result.into_result()? {
            tracing::warn!("{}", warning);
        }
        Ok(())
    }
}

#[async_trait]
impl ModularInput for CityWeatherInput {
    fn scheme(&self) -> Scheme {
        Self::describe()
    }

    fn validate(&self, definition: &InputDefinition) -> Result<(), ValidationError> {
        Self::check(definition)
    }

    async fn run(
        &self,
        definition: &InputDefinition,
        sink: &mut dyn EventSink,
    ) -> Result<(), CityWeatherError> {
        self.validate(definition)?;

        let input = &definition.input;
        tracing::info!("Running {}", input.stanza());

        let (record, reading) = process_city_weather(
            &self.http,
            self.store.as_ref(),
            &definition.collection,
            &input.city,
            &input.country_code,
            &definition.api,
        )
        .await?;

        index_weather_events_in_splunk(
            &input.index,
            &CityWeatherEvent::new(&record, &reading),
            sink,
            &input.sourcetype,
            &input.stanza(),
        )
        .map_err(|e| {
            tracing::error!(
                city = %input.city,
                country_code = %input.country_code,
                step = "emit",
                error = %e,
                "Failed to emit weather event"
            );
            CityWeatherError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cityweather_core::AccountConfig;
    use cityweather_kvstore::MemoryCacheStore;

    fn config() -> Config {
        let mut config = Config::default();
        config.accounts.insert(
            "weather".to_string(),
            AccountConfig {
                api_key: "k".to_string(),
            },
        );
        config
            .inputs
            .push(InputConfig::new("guanacaste", "guanacaste", "CR", "weather"));
        config
    }

    fn input() -> CityWeatherInput {
        CityWeatherInput::new(Client::new(), Arc::new(MemoryCacheStore::with_collection("city_geo")))
    }

    #[test]
    fn test_resolve_definition() {
        let def = InputDefinition::resolve(&config(), "guanacaste").unwrap();
        assert_eq!(def.input.city, "guanacaste");
        assert_eq!(def.api.api_key, "k");
        assert_eq!(def.api.base_url, "https://api.openweathermap.org");
        assert_eq!(def.collection, "city_geo");
    }

    #[test]
    fn test_resolve_unknown_input() {
        let err = InputDefinition::resolve(&config(), "nope").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownInput(ref n) if n == "nope"));
    }

    #[test]
    fn test_resolve_unknown_account() {
        let mut config = config();
        config.inputs[0].account = "other".to_string();
        let err = InputDefinition::resolve(&config, "guanacaste").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownAccount(ref a) if a == "other"));
    }

    #[test]
    fn test_validate() {
        let input = input();
        let mut def = InputDefinition::resolve(&config(), "guanacaste").unwrap();
        assert!(input.validate(&def).is_ok());

        def.input.country_code = "cr".to_string();
        def.api.api_key = String::new();
        let err = input.validate(&def).unwrap_err();
        assert_eq!(err.errors.len(), 2);
    }

    #[test]
    fn test_scheme_xml() {
        let xml = input().scheme().to_xml();
        assert!(xml.starts_with("<scheme><title>city_weather_input</title>"));
        assert!(xml.contains("<description>City Weather Input</description>"));
        assert!(xml.contains("<use_external_validation>true</use_external_validation>"));
        assert!(xml.contains("<use_single_instance>false</use_single_instance>"));
        assert!(xml.contains("<streaming_mode>xml</streaming_mode>"));
        for arg in ["name", "city", "country_code", "account"] {
            assert!(xml.contains(&format!("<arg name=\"{}\">", arg)), "{}", arg);
        }
        assert!(xml.ends_with("</args></endpoint></scheme>"));
    }
}
