use serde::Serialize;

use super::{EpochMillis, MINUTE_MILLIS};

/// Rolling-window submission limit followed by a cooldown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThrottlePolicy {
    max_attempts: usize,
    window_millis: EpochMillis,
    cooldown_millis: EpochMillis,
}

impl ThrottlePolicy {
    /// 3 submissions per rolling hour, then a 5 minute cooldown.
    pub const CONTACT_FORM: ThrottlePolicy = ThrottlePolicy {
        max_attempts: 3,
        window_millis: 60 * MINUTE_MILLIS,
        cooldown_millis: 5 * MINUTE_MILLIS,
    };

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn window_millis(&self) -> EpochMillis {
        self.window_millis
    }

    pub fn cooldown_millis(&self) -> EpochMillis {
        self.cooldown_millis
    }

    /// Whether `ts` falls inside `[now - window, now]`.
    pub fn in_window(&self, ts: EpochMillis, now: EpochMillis) -> bool {
        ts <= now && ts >= now.saturating_sub(self.window_millis)
    }

    /// Remaining cooldown rounded up to whole minutes, or `None` once it has elapsed.
    pub fn remaining_cooldown_minutes(&self, oldest: EpochMillis, now: EpochMillis) -> Option<u64> {
        let elapsed = now.saturating_sub(oldest);
        if elapsed >= self.cooldown_millis {
            return None;
        }
        let remaining = self.cooldown_millis - elapsed;
        Some(((remaining + MINUTE_MILLIS - 1) / MINUTE_MILLIS) as u64)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ThrottleDecision {
    Allowed,
    Denied {
        reason: String,
        remaining_minutes: u64,
    },
}

impl ThrottleDecision {
    pub fn denied(remaining_minutes: u64) -> Self {
        let unit = if remaining_minutes == 1 { "minute" } else { "minutes" };
        ThrottleDecision::Denied {
            reason: format!(
                "Too many messages sent. Please wait {remaining_minutes} {unit} before trying again."
            ),
            remaining_minutes,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, ThrottleDecision::Allowed)
    }
}
