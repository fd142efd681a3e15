//! Splunk KV store adapter over the management REST API.
//!
//! Documents live under
//! `/servicesNS/{owner}/{app}/storage/collections/data/{collection}` and are
//! keyed by `{city}-{country_code}`.

use std::time::Duration;

use async_trait::async_trait;
use cityweather_core::{CityRecord, ConfigError, ReqwestErrorExt, SplunkConfig};
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

use crate::error::{CacheStoreError, CacheStoreResult, DuplicateRecordError};
use crate::store::CacheStore;

/// Fixed timeout for every KV store round-trip.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection context: where the store is and who is asking.
#[derive(Clone)]
pub struct KvStoreConnection {
    pub base_url: Url,
    pub owner: String,
    pub app: String,
    pub session_key: String,
}

impl KvStoreConnection {
    pub fn new(
        base_url: &str,
        owner: impl Into<String>,
        app: impl Into<String>,
        session_key: impl Into<String>,
    ) -> CacheStoreResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CacheStoreError::InvalidEndpoint(format!("{}: {}", base_url, e)))?;

        Ok(Self {
            base_url,
            owner: owner.into(),
            app: app.into(),
            session_key: session_key.into(),
        })
    }

    /// Build the context from `[splunk]` settings. A session key is required.
    pub fn from_config(splunk: &SplunkConfig) -> Result<Self, ConfigError> {
        let session_key = splunk
            .session_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingSetting("splunk.session_key".to_string()))?;

        Self::new(&splunk.management_url(), &splunk.owner, &splunk.app, session_key)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

impl std::fmt::Debug for KvStoreConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvStoreConnection")
            .field("base_url", &self.base_url.as_str())
            .field("owner", &self.owner)
            .field("app", &self.app)
            .field("session_key", &"<redacted>")
            .finish()
    }
}

/// Query document sent as the `query` parameter.
#[derive(Serialize)]
struct CityQuery<'a> {
    city: &'a str,
    country_code: &'a str,
}

/// Document body written on insert and update.
#[derive(Serialize)]
struct CityDocument<'a> {
    #[serde(rename = "_key")]
    key: &'a str,
    #[serde(flatten)]
    record: &'a CityRecord,
}

#[derive(Deserialize)]
struct KeyResponse {
    #[serde(rename = "_key")]
    key: String,
}

/// Error body returned by splunkd.
#[derive(Deserialize)]
struct SplunkMessages {
    #[serde(default)]
    messages: Vec<SplunkMessage>,
}

#[derive(Deserialize)]
struct SplunkMessage {
    #[serde(default)]
    text: String,
}

/// Splunk KV store client
#[derive(Debug, Clone)]
pub struct KvStoreClient {
    client: Client,
    connection: KvStoreConnection,
}

impl KvStoreClient {
    /// Create a client with its own HTTP client.
    ///
    /// `allow_invalid_certs` accepts the self-signed certificate most
    /// management ports ship with.
    pub fn new(connection: KvStoreConnection, allow_invalid_certs: bool) -> CacheStoreResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(allow_invalid_certs)
            .build()
            .map_err(|e| CacheStoreError::Network(e.into_network_error()))?;

        Ok(Self::with_client(client, connection))
    }

    /// Create a client around an existing HTTP client.
    pub fn with_client(client: Client, connection: KvStoreConnection) -> Self {
        Self { client, connection }
    }

    pub fn connection(&self) -> &KvStoreConnection {
        &self.connection
    }

    /// Delete every document in `collection`.
    ///
    /// Only used to reset test collections; normal operation never deletes.
    #[instrument(skip(self), level = "debug")]
    pub async fn clear_collection(&self, collection: &str) -> CacheStoreResult<()> {
        let url = self.collection_url(collection, None)?;
        let response = self.send(self.client.delete(url)).await?;
        self.check_response(response, collection).await?;
        tracing::info!("Cleared KV collection {}", collection);
        Ok(())
    }

    fn collection_url(&self, collection: &str, key: Option<&str>) -> CacheStoreResult<Url> {
        let conn = &self.connection;
        let mut url = conn.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                CacheStoreError::InvalidEndpoint(format!("{} cannot be a base URL", conn.base_url))
            })?;
            segments.pop_if_empty().extend([
                "servicesNS",
                conn.owner.as_str(),
                conn.app.as_str(),
                "storage",
                "collections",
                "data",
                collection,
            ]);
            if let Some(key) = key {
                segments.push(key);
            }
        }
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> CacheStoreResult<Response> {
        request
            .header(
                header::AUTHORIZATION,
                format!("Splunk {}", self.connection.session_key),
            )
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| CacheStoreError::Network(e.into_network_error()))
    }

    /// Map non-2xx statuses to store errors.
    async fn check_response(&self, response: Response, collection: &str) -> CacheStoreResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(CacheStoreError::Unauthorized(status.as_u16()))
            }
            StatusCode::NOT_FOUND => Err(CacheStoreError::CollectionNotFound(collection.to_string())),
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(CacheStoreError::Http {
                    status: status.as_u16(),
                    message: splunk_error_text(&body),
                })
            }
        }
    }

    async fn document_exists(&self, collection: &str, key: &str) -> CacheStoreResult<bool> {
        let url = self.collection_url(collection, Some(key))?;
        let response = self
            .send(self.client.get(url).query(&[("output_mode", "json")]))
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        self.check_response(response, collection).await?;
        Ok(true)
    }

    async fn write_document(
        &self,
        collection: &str,
        record: &CityRecord,
        exists: bool,
    ) -> CacheStoreResult<String> {
        let key = record.key();
        let url = if exists {
            self.collection_url(collection, Some(&key))?
        } else {
            self.collection_url(collection, None)?
        };
        let body = CityDocument {
            key: &key,
            record,
        };

        let response = self
            .send(self.client.post(url).query(&[("output_mode", "json")]).json(&body))
            .await?;
        let response = self.check_response(response, collection).await?;

        let written: KeyResponse = response
            .json()
            .await
            .map_err(|e| CacheStoreError::invalid_response(e.to_string()))?;
        if written.key != key {
            tracing::warn!("KV store wrote key {} for requested key {}", written.key, key);
        }
        Ok(written.key)
    }
}

#[async_trait]
impl CacheStore for KvStoreClient {
    #[instrument(skip(self), level = "debug")]
    async fn check_cached_city(
        &self,
        collection: &str,
        city: &str,
        country_code: &str,
    ) -> CacheStoreResult<Option<CityRecord>> {
        let query = serde_json::to_string(&CityQuery { city, country_code })
            .map_err(|e| CacheStoreError::invalid_response(e.to_string()))?;
        let url = self.collection_url(collection, None)?;

        let response = self
            .send(
                self.client
                    .get(url)
                    .query(&[("query", query.as_str()), ("output_mode", "json")]),
            )
            .await?;
        let response = self.check_response(response, collection).await?;

        let mut docs: Vec<CityRecord> = response
            .json()
            .await
            .map_err(|e| CacheStoreError::invalid_response(format!("unexpected documents: {}", e)))?;

        match docs.len() {
            0 => Ok(None),
            1 => Ok(docs.pop()),
            n => Err(DuplicateRecordError {
                city: city.to_string(),
                country_code: country_code.to_string(),
                matches: n,
            }
            .into()),
        }
    }

    #[instrument(skip(self, record), fields(key = %record.key()), level = "debug")]
    async fn upsert_city(&self, collection: &str, record: &CityRecord) -> CacheStoreResult<CityRecord> {
        let exists = self.document_exists(collection, &record.key()).await?;
        let key = self.write_document(collection, record, exists).await?;

        tracing::debug!(
            "{} KV document {} in {}",
            if exists { "Updated" } else { "Inserted" },
            key,
            collection
        );
        Ok(record.clone())
    }

    fn backend(&self) -> &'static str {
        "kvstore"
    }
}

/// First message text of a splunkd error body, or the raw body.
fn splunk_error_text(body: &str) -> String {
    serde_json::from_str::<SplunkMessages>(body)
        .ok()
        .and_then(|m| m.messages.into_iter().map(|m| m.text).find(|t| !t.is_empty()))
        .unwrap_or_else(|| body.trim().to_string())
}
