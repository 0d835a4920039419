use std::time::Duration;

use async_trait::async_trait;

use crate::application::{AppResult, EmailRelay};
use crate::domain::ContactMessage;

/// How long a simulated send takes.
pub const SIMULATED_SEND_DELAY: Duration = Duration::from_millis(1500);

/// Stand-in relay used when no email credentials are configured.
/// Always succeeds after [`SIMULATED_SEND_DELAY`] and never touches the network.
pub struct SimulatedRelay {
    delay: Duration,
}

impl SimulatedRelay {
    pub fn new() -> Self {
        Self {
            delay: SIMULATED_SEND_DELAY,
        }
    }
}

impl Default for SimulatedRelay {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailRelay for SimulatedRelay {
    async fn send(&self, message: &ContactMessage) -> AppResult<()> {
        tracing::info!(
            name = %message.name,
            email = %message.email,
            "relay not configured, simulating send"
        );
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}
