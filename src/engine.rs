//! Dashboard engine: the composition of telemetry sync, threshold
//! control, and the push subscription behind one event loop.
//!
//! All state lives inside the loop task, so every mutation is applied
//! atomically between awaits and interleaved work is serialized in
//! completion order. Renderers never call into the engine for data; they
//! subscribe to the read model published on a watch channel.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::data::{CurrentReading, Sample};
use crate::error::TransportError;
use crate::source::{ControllerApi, PushChannel, TelemetrySource};
use crate::threshold::{ThresholdController, ThresholdState};

/// Commands accepted by the engine loop.
#[derive(Debug)]
enum Command {
    SetPending(f64),
    Submit,
    Refresh,
    Shutdown,
}

/// Composed read model, published after every mutation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardState {
    /// Latest known reading.
    pub current: CurrentReading,
    /// Chronological series history, oldest first.
    pub series: Vec<Sample>,
    /// Threshold values and update status.
    pub threshold: ThresholdState,
}

impl DashboardState {
    /// Time of the latest reading in epoch milliseconds, if known.
    pub fn last_update(&self) -> Option<u64> {
        self.current.timestamp
    }
}

/// Handle for driving the engine and observing its read model.
///
/// Clones share the same engine. The engine stops on
/// [`shutdown`](Self::shutdown) or when every handle has been dropped.
#[derive(Debug, Clone)]
pub struct DashboardHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<DashboardState>,
}

impl DashboardHandle {
    /// Stage a threshold value (clamped to the accepted range).
    pub fn set_pending(&self, value: f64) {
        let _ = self.commands.send(Command::SetPending(value));
    }

    /// Submit the staged threshold to the controller.
    ///
    /// Ignored while a previous submit is still in flight.
    pub fn submit(&self) {
        let _ = self.commands.send(Command::Submit);
    }

    /// Re-run the history and config fetch.
    pub fn refresh(&self) {
        let _ = self.commands.send(Command::Refresh);
    }

    /// Ask the engine loop to stop.
    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }

    /// The current read model.
    pub fn state(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    /// Subscribe to read-model updates.
    ///
    /// The engine publishes after every mutation; await
    /// [`changed`](watch::Receiver::changed) on the returned receiver to
    /// follow along.
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.clone()
    }
}

/// The dashboard core.
///
/// Composition only: telemetry reconciliation lives in
/// [`TelemetrySource`] and update rules in [`ThresholdController`]; the
/// engine routes commands, push events, write resolutions, and the
/// status-reversion deadline between them.
#[derive(Debug)]
pub struct DashboardEngine {
    api: Arc<dyn ControllerApi>,
    telemetry: TelemetrySource,
    thresholds: ThresholdController,
    push: PushChannel,
    commands: mpsc::UnboundedReceiver<Command>,
    resolutions: mpsc::UnboundedReceiver<Result<f64, TransportError>>,
    resolution_tx: mpsc::UnboundedSender<Result<f64, TransportError>>,
    state_tx: watch::Sender<DashboardState>,
}

impl DashboardEngine {
    /// Create an engine and its handle.
    ///
    /// The engine does nothing until [`run`](Self::run) is awaited (or
    /// use [`spawn`](Self::spawn) to run it on its own task).
    pub fn new(api: Arc<dyn ControllerApi>, push: PushChannel) -> (Self, DashboardHandle) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (resolution_tx, resolution_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(DashboardState::default());

        let engine = Self {
            telemetry: TelemetrySource::new(api.clone()),
            thresholds: ThresholdController::new(),
            api,
            push,
            commands: command_rx,
            resolutions: resolution_rx,
            resolution_tx,
            state_tx,
        };
        let handle = DashboardHandle {
            commands: command_tx,
            state: state_rx,
        };
        (engine, handle)
    }

    /// Create an engine and run it on a spawned task.
    pub fn spawn(
        api: Arc<dyn ControllerApi>,
        push: PushChannel,
    ) -> (DashboardHandle, JoinHandle<()>) {
        let (engine, handle) = Self::new(api, push);
        let task = tokio::spawn(engine.run());
        (handle, task)
    }

    /// Run the engine: load once, then serve events until shutdown.
    ///
    /// The initial load completes before the first publish, so
    /// subscribers never observe a half-initialized model. Events
    /// arriving during a load queue in their channels and are applied
    /// afterwards in arrival order.
    pub async fn run(mut self) {
        info!("Dashboard engine starting ({})", self.push.description());
        self.telemetry.load_initial().await;
        self.telemetry.load_config(&mut self.thresholds).await;
        self.publish();

        let mut push_open = true;
        loop {
            let reset = self.thresholds.reset_due();
            tokio::select! {
                command = self.commands.recv() => {
                    match command {
                        None | Some(Command::Shutdown) => break,
                        Some(Command::SetPending(value)) => {
                            self.thresholds.set_pending(value);
                            self.publish();
                        }
                        Some(Command::Submit) => self.start_submit(),
                        Some(Command::Refresh) => {
                            self.telemetry.load_initial().await;
                            self.telemetry.load_config(&mut self.thresholds).await;
                            self.publish();
                        }
                    }
                }
                event = self.push.recv(), if push_open => {
                    match event {
                        Some(event) => {
                            self.telemetry.apply_push(event, &mut self.thresholds);
                            self.publish();
                        }
                        // Feed ended; keep serving commands
                        None => push_open = false,
                    }
                }
                outcome = self.resolutions.recv() => {
                    // The engine keeps a sender half, so this arm only
                    // fires for real resolutions
                    if let Some(outcome) = outcome {
                        self.thresholds.complete_submit(outcome);
                        self.publish();
                    }
                }
                token = status_reset(reset) => {
                    self.thresholds.expire_status(token);
                    self.publish();
                }
            }
        }
        debug!("Dashboard engine stopped");
    }

    /// Begin a threshold write without blocking the loop.
    ///
    /// The request runs on its own task and reports back through the
    /// resolution channel, so pushes and slider adjustments keep flowing
    /// while it is in flight.
    fn start_submit(&mut self) {
        let Some(value) = self.thresholds.begin_submit() else {
            return;
        };
        self.publish();

        let api = self.api.clone();
        let resolutions = self.resolution_tx.clone();
        tokio::spawn(async move {
            let outcome = api.write_threshold(value).await;
            let _ = resolutions.send(outcome);
        });
    }

    /// Publish the composed read model.
    fn publish(&self) {
        let state = DashboardState {
            current: self.telemetry.current(),
            series: self.telemetry.series().snapshot(),
            threshold: self.thresholds.state(),
        };
        let _ = self.state_tx.send(state);
    }
}

/// Wait for an armed status reversion, or forever when none is armed.
async fn status_reset(reset: Option<(u64, Instant)>) -> u64 {
    match reset {
        Some((token, at)) => {
            tokio::time::sleep_until(at).await;
            token
        }
        None => std::future::pending().await,
    }
}
