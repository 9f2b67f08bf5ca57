//! # fanwatch
//!
//! Client-side telemetry sync and threshold control for a small IoT fan
//! controller.
//!
//! This crate keeps a dashboard's view of a fan controller fresh: it
//! loads recent telemetry over REST, follows live updates over a push
//! channel, and manages the lifecycle of threshold changes (staging,
//! submitting, and surfacing the outcome). Renderers subscribe to a
//! single composed read model instead of talking to the controller
//! themselves.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     DashboardEngine (loop)                   │
//! │                                                              │
//! │  commands ──▶ ┌───────────┐      ┌─────────────────────┐     │
//! │               │ threshold │      │   TelemetrySource   │     │
//! │  push ──────▶ │ (control) │      │ (series + current)  │     │
//! │               └─────┬─────┘      └──────────┬──────────┘     │
//! │  resolutions        │                       │                │
//! │                     └──────┬────────────────┘                │
//! │                            ▼                                 │
//! │                    DashboardState ──▶ watch channel          │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!        HttpApi (REST)        ▼         PushChannel (websocket)
//!                          subscribers
//! ```
//!
//! - **[`engine`]**: The event loop composing everything; commands in,
//!   read-model snapshots out on a watch channel
//! - **[`source`]**: Controller transports; the [`ControllerApi`] trait with
//!   its HTTP implementation, the websocket [`PushChannel`], and the
//!   [`TelemetrySource`] reconciling both into local state
//! - **[`data`]**: The bounded chronological [`SeriesBuffer`] and the
//!   latest-reading sentinel
//! - **[`threshold`]**: Threshold staging, clamping, and the
//!   updating/success/error status lifecycle
//! - **[`config`]**: Connection settings from file and environment
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch a controller and print readings as they arrive
//! fanwatch --url http://fan-controller.local:8080
//!
//! # Change the fan threshold and wait for the confirmation
//! fanwatch --set-threshold 32.5
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::sync::Arc;
//! use fanwatch::{DashboardEngine, HttpApi, PushChannel};
//!
//! # tokio_test::block_on(async {
//! let api = Arc::new(
//!     HttpApi::builder()
//!         .base_url("http://fan-controller.local:8080")
//!         .build(),
//! );
//! let push = PushChannel::connect("ws://fan-controller.local:8080/ws");
//! let (dashboard, task) = DashboardEngine::spawn(api, push);
//!
//! dashboard.set_pending(32.5);
//! dashboard.submit();
//!
//! let state = dashboard.state();
//! println!("threshold {} ({:?})", state.threshold.applied, state.threshold.status);
//! # });
//! ```
//!
//! ### Feeding events without a socket
//!
//! For embedding (or tests) the push side can be a plain channel:
//!
//! ```
//! use fanwatch::PushChannel;
//!
//! let (tx, push) = PushChannel::pair("embedded");
//! // hand `push` to the engine, send events through `tx`
//! ```

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod source;
pub mod threshold;

// Re-export main types for convenience
pub use config::{ConnectConfig, DEFAULT_BASE_URL};
pub use data::{CurrentReading, Sample, SeriesBuffer, SERIES_CAPACITY};
pub use engine::{DashboardEngine, DashboardHandle, DashboardState};
pub use error::TransportError;
pub use source::{
    ControllerApi, HttpApi, HttpApiBuilder, PushChannel, PushEvent, TelemetryRecord,
    TelemetrySource, ThresholdConfig,
};
pub use threshold::{
    ThresholdController, ThresholdState, UpdateStatus, DEFAULT_THRESHOLD, STATUS_RESET_DELAY,
    THRESHOLD_MAX, THRESHOLD_MIN,
};
