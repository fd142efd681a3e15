//! Shared error types for the city weather input.
//!
//! Each lookup step has its own error kind in the crate that owns the step;
//! this module holds the pieces every crate needs:
//! - transport classification for outbound HTTP calls
//! - configuration errors
//! - operator-facing messages for the host's log

use thiserror::Error;

/// Transport-level failures (timeouts, refused connections, unreadable bodies).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check the endpoint address and network access."
            }
            NetworkError::Timeout => "The request timed out. The next scheduled run will try again.",
            NetworkError::InvalidResponse(_) => "Received an unexpected response.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),

    #[error("Unknown input: {0}")]
    UnknownInput(String),

    #[error("Unknown account: {0}")]
    UnknownAccount(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration file not found.",
            ConfigError::Invalid(_) => "Invalid configuration. Check the input settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed.",
            ConfigError::MissingSetting(_) => "A required setting is missing.",
            ConfigError::UnknownInput(_) => "No input with that name is configured.",
            ConfigError::UnknownAccount(_) => "The input references an account that does not exist.",
        }
    }
}

impl From<::config::ConfigError> for ConfigError {
    fn from(e: ::config::ConfigError) -> Self {
        match e {
            ::config::ConfigError::NotFound(key) => ConfigError::MissingSetting(key),
            other => ConfigError::ParseError(other.to_string()),
        }
    }
}

/// Extension trait for classifying reqwest errors.
///
/// HTTP status handling stays with the callers, which read the body first;
/// only failures to complete a request end up here.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if self.is_decode() || self.is_body() {
            NetworkError::InvalidResponse(self.to_string())
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
