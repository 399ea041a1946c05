//! HTTP adapter for the monitoring REST API.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fleetwatch_adapters::http::HttpFleetClient;
//! use fleetwatch_adapters::FleetApi;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpFleetClient::builder()
//!         .endpoint("https://mro.example.com/api")
//!         .token("secret-token")
//!         .timeout(Duration::from_secs(5))
//!         .build()?;
//!
//!     let detail = client.fetch_aircraft("EC-MKA").await?;
//!     for alert in &detail.alerts {
//!         println!("{}: {}", alert.code_description, alert.state);
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use fleetwatch_types::{AircraftDetail, FleetSummary};

use crate::{ApiError, FleetApi};

/// Monitoring API client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFleetClient {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpFleetClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> HttpFleetClientBuilder {
        HttpFleetClientBuilder::default()
    }

    /// The base endpoint requests are issued against.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.endpoint, path);
        debug!("GET {}", url);

        let mut request = self.client.get(&url);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = check_status(request.send().await?).await?;

        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}

#[async_trait]
impl FleetApi for HttpFleetClient {
    async fn fetch_fleet_summary(&self) -> Result<FleetSummary, ApiError> {
        self.get_json("/monitoreo/flota").await
    }

    async fn fetch_aircraft(&self, registration: &str) -> Result<AircraftDetail, ApiError> {
        let path = format!("/monitoreo/aeronave/{}", urlencoded(registration));
        self.get_json(&path).await
    }

    fn description(&self) -> String {
        format!("api: {}", self.endpoint)
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = if body.is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_string()
    } else {
        body
    };
    Err(ApiError::from_status(status.as_u16(), message))
}

/// Builder for HttpFleetClient.
#[derive(Debug, Default)]
pub struct HttpFleetClientBuilder {
    endpoint: Option<String>,
    token: Option<String>,
    timeout: Option<Duration>,
}

impl HttpFleetClientBuilder {
    /// Set the API base URL (e.g., "http://localhost:3000/api").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set a bearer token sent with every request.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<HttpFleetClient, ApiError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| "http://localhost:3000/api".to_string());

        Ok(HttpFleetClient {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: self.token.filter(|t| !t.is_empty()),
        })
    }
}

// Percent-encode a registration for use as a single path segment
fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let client = HttpFleetClient::builder().build().unwrap();
        assert_eq!(client.endpoint, "http://localhost:3000/api");
        assert!(client.token.is_none());
    }

    #[test]
    fn test_builder_custom() {
        let client = HttpFleetClient::builder()
            .endpoint("https://mro.example.com/api/")
            .token("abc")
            .build()
            .unwrap();

        assert_eq!(client.endpoint, "https://mro.example.com/api");
        assert_eq!(client.token.as_deref(), Some("abc"));
        assert_eq!(client.description(), "api: https://mro.example.com/api");
    }

    #[test]
    fn test_empty_token_is_ignored() {
        let client = HttpFleetClient::builder().token("").build().unwrap();
        assert!(client.token.is_none());
    }

    #[test]
    fn test_urlencoded() {
        assert_eq!(urlencoded("EC-MKA"), "EC-MKA");
        assert_eq!(urlencoded("N 123/A"), "N%20123%2FA");
        assert_eq!(urlencoded("Ñ1"), "%C3%911");
    }
}
