//! Controller-facing input layer.
//!
//! This module covers everything that moves data between the fan
//! controller and the local model: the REST client, the push-event
//! subscription, and the synchronization logic that reconciles the two.

mod api;
mod http;
mod push;
mod telemetry;

pub use api::{ControllerApi, TelemetryRecord, ThresholdConfig};
pub use http::{HttpApi, HttpApiBuilder};
pub use push::{PushChannel, PushEvent, RECONNECT_DELAY};
pub use telemetry::TelemetrySource;

#[cfg(test)]
pub(crate) use api::mock;
