//! Connection settings.
//!
//! Settings come from an optional TOML file plus `FANWATCH_*`
//! environment variables, with built-in defaults for a controller on
//! localhost. Command line flags override both (see the binary).

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

/// Default controller address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// How to reach the fan controller.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectConfig {
    /// Base URL of the controller's REST interface.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Push channel URL; derived from `base_url` when absent.
    #[serde(default)]
    pub push_url: Option<String>,
    /// Timeout for a single request in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            push_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ConnectConfig {
    /// Load settings from the given file (if any) and the environment.
    ///
    /// Environment variables use the `FANWATCH_` prefix, for example
    /// `FANWATCH_BASE_URL=http://fan-controller.local:8080`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let settings = builder
            .add_source(Environment::with_prefix("FANWATCH"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// URL of the push channel.
    ///
    /// When no explicit `push_url` is configured this is the base URL
    /// with the scheme switched to websocket and `/ws` appended.
    pub fn push_url(&self) -> String {
        if let Some(url) = &self.push_url {
            return url.clone();
        }
        let base = self.base_url.trim_end_matches('/');
        let socket_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            base.to_string()
        };
        format!("{}/ws", socket_base)
    }
}
