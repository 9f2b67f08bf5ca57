//! Controller API abstraction.
//!
//! The engine talks to the fan controller through the [`ControllerApi`]
//! trait so tests can substitute a scripted implementation for the HTTP
//! client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::data::Sample;
use crate::error::TransportError;

/// One telemetry record as the controller reports it.
///
/// Field names follow the controller's JSON (camelCase). The history
/// endpoint returns these newest first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryRecord {
    pub temperature: f64,
    pub fan_speed: u8,
    pub timestamp: u64,
}

impl From<TelemetryRecord> for Sample {
    fn from(record: TelemetryRecord) -> Self {
        Sample {
            temperature: record.temperature,
            fan_speed: record.fan_speed,
            timestamp: record.timestamp,
        }
    }
}

/// Threshold configuration as stored on the controller.
///
/// Serves as the config fetch response, the write request body, and the
/// write confirmation (the controller echoes the value it actually
/// applied, which may differ from the one sent).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub threshold: f64,
}

/// Read and write operations against the fan controller.
#[async_trait]
pub trait ControllerApi: Send + Sync + std::fmt::Debug {
    /// Fetch the recent telemetry history, newest first.
    async fn fetch_history(&self) -> Result<Vec<TelemetryRecord>, TransportError>;

    /// Fetch the current threshold configuration.
    async fn fetch_config(&self) -> Result<ThresholdConfig, TransportError>;

    /// Write a new threshold, returning the value the controller applied.
    async fn write_threshold(&self, threshold: f64) -> Result<f64, TransportError>;
}
