//! Threshold update state machine.
//!
//! Threshold changes are optimistic: the new value is staged locally,
//! submitted to the controller, and the outcome is shown as a transient
//! status that reverts to idle after a fixed delay.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::TransportError;

/// Lowest threshold the controller accepts, degrees Celsius.
pub const THRESHOLD_MIN: f64 = 20.0;
/// Highest threshold the controller accepts, degrees Celsius.
pub const THRESHOLD_MAX: f64 = 40.0;
/// Threshold assumed before the first config fetch completes.
pub const DEFAULT_THRESHOLD: f64 = 30.0;
/// How long a submit outcome stays visible before reverting to idle.
pub const STATUS_RESET_DELAY: Duration = Duration::from_millis(3000);

/// Where a threshold update currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateStatus {
    /// No update in progress.
    #[default]
    Idle,
    /// A write request is in flight.
    Updating,
    /// The last write was accepted; reverts to idle shortly.
    Success,
    /// The last write failed; reverts to idle shortly.
    Error,
}

/// Threshold values and update status exposed to renderers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdState {
    /// Last value known to be accepted by the controller.
    pub applied: f64,
    /// Value staged locally, not yet (or not successfully) submitted.
    pub pending: f64,
    /// Where the current update stands.
    pub status: UpdateStatus,
}

impl Default for ThresholdState {
    fn default() -> Self {
        Self {
            applied: DEFAULT_THRESHOLD,
            pending: DEFAULT_THRESHOLD,
            status: UpdateStatus::Idle,
        }
    }
}

/// State machine driving optimistic threshold updates.
///
/// Transitions: idle → updating (submit), updating → success | error
/// (resolution), success/error → idle after [`STATUS_RESET_DELAY`].
/// Remote threshold changes (config fetch or push) rewrite the values in
/// any state without touching the status.
///
/// The timed reversion is an armed deadline plus a generation token:
/// every status transition bumps the token and rewrites the deadline, so
/// an expiry scheduled for an earlier status is recognized as stale and
/// ignored rather than stomping a newer state.
#[derive(Debug, Clone)]
pub struct ThresholdController {
    state: ThresholdState,
    generation: u64,
    reset_at: Option<Instant>,
}

impl Default for ThresholdController {
    fn default() -> Self {
        Self::new()
    }
}

impl ThresholdController {
    /// Create a controller at the defaults: 30.0 applied and pending, idle.
    pub fn new() -> Self {
        Self {
            state: ThresholdState::default(),
            generation: 0,
            reset_at: None,
        }
    }

    /// Current values and status.
    pub fn state(&self) -> ThresholdState {
        self.state
    }

    /// Stage a threshold value, clamped to the accepted range. NaN is
    /// ignored and the previous staged value kept.
    ///
    /// Allowed in every status, including while a write is in flight; the
    /// staged value simply becomes the next candidate.
    pub fn set_pending(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        self.state.pending = value.clamp(THRESHOLD_MIN, THRESHOLD_MAX);
    }

    /// Adopt a threshold confirmed out of band (config fetch or push).
    ///
    /// Rewrites both applied and pending; the status and any armed
    /// reversion stay as they are. If a write is in flight its resolution
    /// will overwrite these again: completion order wins.
    pub fn apply_remote(&mut self, threshold: f64) {
        self.state.applied = threshold;
        self.state.pending = threshold;
    }

    /// Start a submit.
    ///
    /// Returns the staged value to send, or `None` when a write is
    /// already in flight (at most one request at a time). Entering
    /// updating disarms any pending status reversion.
    pub fn begin_submit(&mut self) -> Option<f64> {
        if self.state.status == UpdateStatus::Updating {
            debug!("Submit ignored, an update is already in flight");
            return None;
        }
        self.transition(UpdateStatus::Updating);
        self.reset_at = None;
        Some(self.state.pending)
    }

    /// Resolve the in-flight submit.
    ///
    /// Success stores the controller-confirmed value into both applied
    /// and pending (the confirmation may differ from what was sent);
    /// failure leaves the values as they were. Either way the outcome
    /// status is armed to revert to idle after [`STATUS_RESET_DELAY`].
    pub fn complete_submit(&mut self, outcome: Result<f64, TransportError>) {
        if self.state.status != UpdateStatus::Updating {
            // Resolution with no matching submit, nothing to do
            return;
        }
        match outcome {
            Ok(confirmed) => {
                self.state.applied = confirmed;
                self.state.pending = confirmed;
                self.transition(UpdateStatus::Success);
            }
            Err(e) => {
                warn!("Threshold write failed: {}", e);
                self.transition(UpdateStatus::Error);
            }
        }
        self.reset_at = Some(Instant::now() + STATUS_RESET_DELAY);
    }

    /// The armed status reversion, if any: generation token plus deadline.
    pub fn reset_due(&self) -> Option<(u64, Instant)> {
        self.reset_at.map(|at| (self.generation, at))
    }

    /// Fire an armed reversion.
    ///
    /// The token must match the generation the deadline was armed with; a
    /// stale expiry (any transition happened since) is ignored.
    pub fn expire_status(&mut self, token: u64) {
        if self.reset_at.is_none() || token != self.generation {
            debug!("Ignoring stale status reset (token {})", token);
            return;
        }
        self.reset_at = None;
        self.transition(UpdateStatus::Idle);
    }

    fn transition(&mut self, status: UpdateStatus) {
        self.generation += 1;
        self.state.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let controller = ThresholdController::new();
        let state = controller.state();

        assert_eq!(state.applied, DEFAULT_THRESHOLD);
        assert_eq!(state.pending, DEFAULT_THRESHOLD);
        assert_eq!(state.status, UpdateStatus::Idle);
        assert!(controller.reset_due().is_none());
    }

    #[test]
    fn test_set_pending_clamps_to_range() {
        let mut controller = ThresholdController::new();

        controller.set_pending(45.0);
        assert_eq!(controller.state().pending, THRESHOLD_MAX);

        controller.set_pending(10.0);
        assert_eq!(controller.state().pending, THRESHOLD_MIN);

        controller.set_pending(32.5);
        assert_eq!(controller.state().pending, 32.5);
    }

    #[test]
    fn test_set_pending_ignores_nan() {
        let mut controller = ThresholdController::new();
        controller.set_pending(32.5);

        controller.set_pending(f64::NAN);

        assert_eq!(controller.state().pending, 32.5);
    }

    #[test]
    fn test_set_pending_allowed_while_updating() {
        let mut controller = ThresholdController::new();
        controller.set_pending(32.0);
        assert_eq!(controller.begin_submit(), Some(32.0));

        controller.set_pending(34.0);
        assert_eq!(controller.state().pending, 34.0);
        assert_eq!(controller.state().status, UpdateStatus::Updating);
    }

    #[test]
    fn test_begin_submit_enters_updating() {
        let mut controller = ThresholdController::new();
        controller.set_pending(33.0);

        assert_eq!(controller.begin_submit(), Some(33.0));
        assert_eq!(controller.state().status, UpdateStatus::Updating);
    }

    #[test]
    fn test_begin_submit_is_noop_while_updating() {
        let mut controller = ThresholdController::new();
        assert!(controller.begin_submit().is_some());
        assert!(controller.begin_submit().is_none());
        assert_eq!(controller.state().status, UpdateStatus::Updating);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_stores_confirmed_value() {
        let mut controller = ThresholdController::new();
        controller.set_pending(33.0);
        controller.begin_submit();

        // The controller may normalize the value it applies
        controller.complete_submit(Ok(33.5));

        let state = controller.state();
        assert_eq!(state.status, UpdateStatus::Success);
        assert_eq!(state.applied, 33.5);
        assert_eq!(state.pending, 33.5);

        let (_, at) = controller.reset_due().unwrap();
        assert_eq!(at, Instant::now() + STATUS_RESET_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_values() {
        let mut controller = ThresholdController::new();
        controller.set_pending(36.0);
        controller.begin_submit();

        controller.complete_submit(Err(TransportError::Timeout));

        let state = controller.state();
        assert_eq!(state.status, UpdateStatus::Error);
        assert_eq!(state.applied, DEFAULT_THRESHOLD);
        assert_eq!(state.pending, 36.0);
        assert!(controller.reset_due().is_some());
    }

    #[test]
    fn test_resolution_without_submit_is_ignored() {
        let mut controller = ThresholdController::new();
        controller.complete_submit(Ok(35.0));

        assert_eq!(controller.state().status, UpdateStatus::Idle);
        assert_eq!(controller.state().applied, DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_apply_remote_overrides_staged_value() {
        let mut controller = ThresholdController::new();
        controller.set_pending(38.0);

        controller.apply_remote(26.0);

        let state = controller.state();
        assert_eq!(state.applied, 26.0);
        assert_eq!(state.pending, 26.0);
        assert_eq!(state.status, UpdateStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_change_then_resolution_applies_in_completion_order() {
        let mut controller = ThresholdController::new();
        controller.set_pending(32.0);
        controller.begin_submit();

        // A config push lands while the write is in flight
        controller.apply_remote(35.0);
        assert_eq!(controller.state().applied, 35.0);
        assert_eq!(controller.state().status, UpdateStatus::Updating);

        // The write resolves afterwards and wins
        controller.complete_submit(Ok(32.0));
        assert_eq!(controller.state().applied, 32.0);
        assert_eq!(controller.state().pending, 32.0);
        assert_eq!(controller.state().status, UpdateStatus::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_reverts_to_idle() {
        let mut controller = ThresholdController::new();
        controller.begin_submit();
        controller.complete_submit(Ok(30.0));

        let (token, _) = controller.reset_due().unwrap();
        controller.expire_status(token);

        assert_eq!(controller.state().status, UpdateStatus::Idle);
        assert!(controller.reset_due().is_none());
        // Values survive the reversion
        assert_eq!(controller.state().applied, 30.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_expiry_never_stomps_newer_state() {
        let mut controller = ThresholdController::new();
        controller.begin_submit();
        controller.complete_submit(Ok(30.0));
        let (stale_token, _) = controller.reset_due().unwrap();

        // A new submit starts before the reversion fires
        controller.set_pending(31.0);
        assert!(controller.begin_submit().is_some());
        assert!(controller.reset_due().is_none());

        controller.expire_status(stale_token);
        assert_eq!(controller.state().status, UpdateStatus::Updating);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resubmit_disarms_previous_reversion() {
        let mut controller = ThresholdController::new();
        controller.begin_submit();
        controller.complete_submit(Err(TransportError::Timeout));
        assert!(controller.reset_due().is_some());

        controller.begin_submit();
        assert!(controller.reset_due().is_none());
    }
}
