use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{watch, Mutex};

use crate::application::{Clock, EmailRelay, NotificationCenter, SubmissionThrottle};
use crate::domain::{ContactForm, Notification, ThrottleDecision};

pub const SENT_MESSAGE: &str = "Message sent successfully!";
pub const FAILED_MESSAGE: &str = "Failed to send message. Please try again.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    Idle,
    Validating,
    Throttled,
    Sending,
    Sent,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Invalid { reason: String },
    Throttled { remaining_minutes: u64 },
    Sent,
    Failed { reason: String },
    /// Another submission was still in flight; nothing happened.
    Busy,
}

/// Validate, gate, send, record, report.
pub struct SubmitContactUseCase {
    throttle: SubmissionThrottle,
    relay: Arc<dyn EmailRelay>,
    notifications: Arc<NotificationCenter>,
    clock: Arc<dyn Clock>,
    state: watch::Sender<FlowState>,
    in_flight: Mutex<()>,
}

impl SubmitContactUseCase {
    pub fn new(
        throttle: SubmissionThrottle,
        relay: Arc<dyn EmailRelay>,
        notifications: Arc<NotificationCenter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (state, _) = watch::channel(FlowState::Idle);
        Self {
            throttle,
            relay,
            notifications,
            clock,
            state,
            in_flight: Mutex::new(()),
        }
    }

    pub fn state(&self) -> FlowState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<FlowState> {
        self.state.subscribe()
    }

    pub fn notifications(&self) -> &Arc<NotificationCenter> {
        &self.notifications
    }

    /// Runs one attempt and returns its outcome together with the notification
    /// this attempt showed (`None` for `Busy`). `form` is cleared on success and
    /// left untouched otherwise.
    pub async fn execute(
        &self,
        form: &mut ContactForm,
    ) -> (SubmissionOutcome, Option<Notification>) {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::warn!("submission already in flight, ignoring");
            return (SubmissionOutcome::Busy, None);
        };

        self.enter(FlowState::Validating);
        let message = match form.validate() {
            Ok(m) => m,
            Err(e) => {
                let reason = e.to_string();
                tracing::info!(%reason, "contact form rejected");
                let shown = self.notifications.warning(reason.clone());
                self.enter(FlowState::Idle);
                return (SubmissionOutcome::Invalid { reason }, Some(shown));
            }
        };

        if let ThrottleDecision::Denied {
            reason,
            remaining_minutes,
        } = self.throttle.check_allowed(self.clock.now_millis()).await
        {
            let shown = self.notifications.error(reason);
            self.finish(FlowState::Throttled);
            return (SubmissionOutcome::Throttled { remaining_minutes }, Some(shown));
        }

        self.enter(FlowState::Sending);
        match self.relay.send(&message).await {
            Ok(()) => {
                if let Err(e) = self.throttle.record_submission(self.clock.now_millis()).await {
                    tracing::warn!("failed to record submission: {e}");
                }
                tracing::info!(email = %message.email, "contact message sent");
                let shown = self.notifications.success(SENT_MESSAGE);
                form.clear();
                self.finish(FlowState::Sent);
                (SubmissionOutcome::Sent, Some(shown))
            }
            Err(e) => {
                tracing::error!("contact message failed: {e}");
                let shown = self.notifications.error(FAILED_MESSAGE);
                self.finish(FlowState::Failed);
                let outcome = SubmissionOutcome::Failed {
                    reason: e.to_string(),
                };
                (outcome, Some(shown))
            }
        }
    }

    fn enter(&self, next: FlowState) {
        self.state.send_replace(next);
    }

    fn finish(&self, terminal: FlowState) {
        self.enter(terminal);
        self.enter(FlowState::Idle);
    }
}
