use std::time::Duration;

use cityweather_core::{NetworkError, ReqwestErrorExt};
use reqwest::{Client, Response, StatusCode};

/// Fixed timeout applied to every outbound API request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

const USER_AGENT: &str = concat!("cityweather/", env!("CARGO_PKG_VERSION"));

/// Longest error body kept in error messages.
const MAX_ERROR_BODY: usize = 256;

/// Build the client handed to the wrappers.
pub fn build_client() -> Result<Client, NetworkError> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| e.without_url().into_network_error())
}

/// Join `base_url` and an absolute API path, tolerating a trailing slash.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Classify a transport error. The URL is dropped because it carries the API key.
pub(crate) fn transport_error(e: reqwest::Error) -> NetworkError {
    e.without_url().into_network_error()
}

/// Read the status and full body of a response.
pub(crate) async fn read_body(response: Response) -> Result<(StatusCode, String), NetworkError> {
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;
    Ok((status, body))
}

pub(crate) fn truncate_body(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let cut: String = body.chars().take(MAX_ERROR_BODY).collect();
    format!("{}...", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trailing_slash() {
        assert_eq!(
            endpoint("http://mockoon:3000/", "/geo/1.0/direct"),
            "http://mockoon:3000/geo/1.0/direct"
        );
        assert_eq!(
            endpoint("http://mockoon:3000", "/data/2.5/weather"),
            "http://mockoon:3000/data/2.5/weather"
        );
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("  short  "), "short");
        let long = "x".repeat(MAX_ERROR_BODY + 10);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), MAX_ERROR_BODY + 3);
    }

    #[test]
    fn test_build_client() {
        assert!(build_client().is_ok());
    }
}
