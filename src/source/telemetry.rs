//! Telemetry synchronization between the controller and the local model.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::data::{CurrentReading, Sample, SeriesBuffer};
use crate::threshold::ThresholdController;

use super::api::ControllerApi;
use super::push::PushEvent;

/// Reconciles bulk telemetry fetches and live push events into the local
/// series history and current-reading projection.
///
/// Read failures are logged and swallowed: stale data on screen beats a
/// blank dashboard, so state is only ever replaced by a successful fetch.
#[derive(Debug)]
pub struct TelemetrySource {
    api: Arc<dyn ControllerApi>,
    series: SeriesBuffer,
    current: CurrentReading,
}

impl TelemetrySource {
    /// Create a source backed by the given controller API.
    pub fn new(api: Arc<dyn ControllerApi>) -> Self {
        Self {
            api,
            series: SeriesBuffer::new(),
            current: CurrentReading::default(),
        }
    }

    /// Load the recent history from the controller.
    ///
    /// The controller returns records newest first; they are reversed
    /// into chronological order before replacing the buffer, and the
    /// current reading is taken from the newest sample when any exist.
    pub async fn load_initial(&mut self) {
        match self.api.fetch_history().await {
            Ok(records) => {
                let samples: Vec<Sample> = records.into_iter().rev().map(Sample::from).collect();
                self.series.insert_batch(samples);
                if let Some(newest) = self.series.newest() {
                    self.current.observe(newest);
                }
                debug!("Loaded {} history samples", self.series.len());
            }
            Err(e) => warn!("History fetch failed, keeping previous data: {}", e),
        }
    }

    /// Load the threshold configuration from the controller.
    ///
    /// On success both the applied and pending values are adopted; on
    /// failure the threshold state is left untouched.
    pub async fn load_config(&self, thresholds: &mut ThresholdController) {
        match self.api.fetch_config().await {
            Ok(config) => thresholds.apply_remote(config.threshold),
            Err(e) => warn!("Config fetch failed, keeping previous threshold: {}", e),
        }
    }

    /// Apply one push event.
    ///
    /// Data updates refresh the current reading and append to the series;
    /// config updates adopt the remote threshold, overriding any locally
    /// staged value.
    pub fn apply_push(&mut self, event: PushEvent, thresholds: &mut ThresholdController) {
        match event {
            PushEvent::DataUpdate(record) => {
                let sample = Sample::from(record);
                self.current.observe(sample);
                self.series.insert_one(sample);
            }
            PushEvent::ConfigUpdate(config) => thresholds.apply_remote(config.threshold),
        }
    }

    /// The bounded series history.
    pub fn series(&self) -> &SeriesBuffer {
        &self.series
    }

    /// The latest known reading.
    pub fn current(&self) -> CurrentReading {
        self.current
    }
}
