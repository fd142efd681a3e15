//! Cache store error types.

use cityweather_core::NetworkError;
use thiserror::Error;

/// More than one cached document matched a (city, country code) query.
///
/// Upserts write under a deterministic key, so this only happens when
/// something else wrote to the collection.
#[derive(Debug, Clone, Error)]
#[error("{matches} cached records match {city},{country_code}")]
pub struct DuplicateRecordError {
    pub city: String,
    pub country_code: String,
    pub matches: usize,
}

#[derive(Debug, Error)]
pub enum CacheStoreError {
    /// Transport failure talking to the store.
    #[error("KV store request failed: {0}")]
    Network(#[from] NetworkError),

    /// Session key missing, expired or lacking permission.
    #[error("KV store rejected the session (HTTP {0})")]
    Unauthorized(u16),

    /// The collection does not exist; it must be created by deployment.
    #[error("KV collection not found: {0}")]
    CollectionNotFound(String),

    /// The management URL or a path segment could not form a request URL.
    #[error("Invalid KV store endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("KV store returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Invalid KV store response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Duplicate(#[from] DuplicateRecordError),
}

impl CacheStoreError {
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(e) => e.user_message(),
            Self::Unauthorized(_) => "The Splunk session was rejected. Check the session key.",
            Self::CollectionNotFound(_) => "The KV collection is missing. Check the add-on deployment.",
            Self::InvalidEndpoint(_) => "The Splunk management address is invalid. Check the settings.",
            Self::Http { status, .. } if *status >= 500 => {
                "The KV store is failing. The next scheduled run will try again."
            }
            Self::Http { .. } => "The KV store rejected the request.",
            Self::InvalidResponse(_) => "The KV store returned unexpected data.",
            Self::Duplicate(_) => "The KV collection holds duplicate city records. Remove the extras.",
        }
    }
}

/// Result type for cache store operations.
pub type CacheStoreResult<T> = Result<T, CacheStoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_display() {
        let err: CacheStoreError = DuplicateRecordError {
            city: "guanacaste".into(),
            country_code: "CR".into(),
            matches: 2,
        }
        .into();
        assert_eq!(err.to_string(), "2 cached records match guanacaste,CR");
        assert!(err.user_message().contains("duplicate"));
    }

    #[test]
    fn test_http_user_message_by_status() {
        let failing = CacheStoreError::Http {
            status: 503,
            message: "x".into(),
        };
        let rejected = CacheStoreError::Http {
            status: 400,
            message: "x".into(),
        };
        assert_ne!(failing.user_message(), rejected.user_message());
    }
}
