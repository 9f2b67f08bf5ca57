//! HTTP client for the fan controller's REST API.
//!
//! The controller exposes a small JSON API:
//!
//! - `GET /api/history`: recent telemetry records, newest first
//! - `GET /api/config`: current threshold configuration
//! - `POST /api/config`: apply a new threshold; the response echoes the
//!   value the controller actually applied
//!
//! ## Example
//!
//! ```rust,no_run
//! use fanwatch::{ControllerApi, HttpApi};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = HttpApi::builder()
//!         .base_url("http://fan-controller.local")
//!         .build();
//!
//!     let history = api.fetch_history().await?;
//!     println!("{} records", history.len());
//!
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::DEFAULT_BASE_URL;
use crate::error::TransportError;

use super::api::{ControllerApi, TelemetryRecord, ThresholdConfig};

/// HTTP implementation of [`ControllerApi`].
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    /// Create a new builder for configuring the client.
    pub fn builder() -> HttpApiBuilder {
        HttpApiBuilder::default()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ControllerApi for HttpApi {
    async fn fetch_history(&self) -> Result<Vec<TelemetryRecord>, TransportError> {
        let response = self.client.get(self.endpoint("/api/history")).send().await?;

        if !response.status().is_success() {
            return Err(TransportError::Status(response.status().as_u16()));
        }

        let records: Vec<TelemetryRecord> = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        Ok(records)
    }

    async fn fetch_config(&self) -> Result<ThresholdConfig, TransportError> {
        let response = self.client.get(self.endpoint("/api/config")).send().await?;

        if !response.status().is_success() {
            return Err(TransportError::Status(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }

    async fn write_threshold(&self, threshold: f64) -> Result<f64, TransportError> {
        let response = self
            .client
            .post(self.endpoint("/api/config"))
            .json(&ThresholdConfig { threshold })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TransportError::Status(response.status().as_u16()));
        }

        let config: ThresholdConfig = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        Ok(config.threshold)
    }
}

/// Builder for [`HttpApi`].
#[derive(Debug, Default)]
pub struct HttpApiBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl HttpApiBuilder {
    /// Set the controller base URL (e.g., "http://fan-controller.local").
    ///
    /// A trailing slash is stripped so endpoint paths can be appended
    /// verbatim.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> HttpApi {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        HttpApi {
            client,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let api = HttpApi::builder().build();
        assert_eq!(api.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_builder_strips_trailing_slash() {
        let api = HttpApi::builder()
            .base_url("http://fan-controller.local/")
            .build();
        assert_eq!(api.base_url, "http://fan-controller.local");
    }

    #[test]
    fn test_endpoint_formatting() {
        let api = HttpApi::builder().base_url("http://10.0.0.7").build();
        assert_eq!(api.endpoint("/api/history"), "http://10.0.0.7/api/history");
        assert_eq!(api.endpoint("/api/config"), "http://10.0.0.7/api/config");
    }
}
