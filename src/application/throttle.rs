use std::sync::Arc;

use crate::application::{AppError, AppResult, KeyValueStore};
use crate::domain::{EpochMillis, ThrottleDecision, ThrottlePolicy};

/// Storage key holding the JSON array of recent submission timestamps.
pub const HISTORY_KEY: &str = "contact_form_submissions";

/// Client-side submission limiter.
///
/// All state lives behind the injected [`KeyValueStore`]. Anything that cannot
/// be read back as a list of timestamps counts as an empty history, so a broken
/// store never blocks the form. This is a courtesy guard only: whoever controls
/// the store controls the limit.
#[derive(Clone)]
pub struct SubmissionThrottle {
    store: Arc<dyn KeyValueStore>,
    policy: ThrottlePolicy,
}

impl SubmissionThrottle {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            policy: ThrottlePolicy::CONTACT_FORM,
        }
    }

    pub fn policy(&self) -> &ThrottlePolicy {
        &self.policy
    }

    pub async fn check_allowed(&self, now: EpochMillis) -> ThrottleDecision {
        let recent = self.recent(now).await;
        if recent.len() < self.policy.max_attempts() {
            return ThrottleDecision::Allowed;
        }

        let Some(oldest) = recent.iter().copied().min() else {
            return ThrottleDecision::Allowed;
        };

        match self.policy.remaining_cooldown_minutes(oldest, now) {
            Some(minutes) => {
                tracing::warn!(
                    attempts = recent.len(),
                    remaining_minutes = minutes,
                    "submission throttled"
                );
                ThrottleDecision::denied(minutes)
            }
            None => {
                // cooldown served: start over
                if let Err(e) = self.store.remove_item(HISTORY_KEY).await {
                    tracing::warn!("failed to reset submission history: {e}");
                }
                ThrottleDecision::Allowed
            }
        }
    }

    pub async fn record_submission(&self, now: EpochMillis) -> AppResult<()> {
        let mut history = self.load().await;
        history.push(now);
        history.retain(|&ts| self.policy.in_window(ts, now));

        let raw = serde_json::to_string(&history).map_err(|e| AppError::Storage(e.to_string()))?;
        self.store.set_item(HISTORY_KEY, &raw).await
    }

    /// Timestamps that still count toward the limit at `now`.
    pub async fn recent(&self, now: EpochMillis) -> Vec<EpochMillis> {
        let mut history = self.load().await;
        history.retain(|&ts| self.policy.in_window(ts, now));
        history
    }

    async fn load(&self) -> Vec<EpochMillis> {
        let raw = match self.store.get_item(HISTORY_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return vec![],
            Err(e) => {
                tracing::warn!("submission history unreadable, treating as empty: {e}");
                return vec![];
            }
        };

        match serde_json::from_str::<Vec<EpochMillis>>(&raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("submission history corrupted, treating as empty: {e}");
                vec![]
            }
        }
    }
}
