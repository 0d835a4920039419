use async_trait::async_trait;

use crate::domain::{ContactMessage, EpochMillis};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("relay error: {0}")]
    Relay(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("invalid config: {0}")]
    Config(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// String key/value persistence, shaped like browser local storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> AppResult<Option<String>>;
    async fn set_item(&self, key: &str, value: &str) -> AppResult<()>;
    async fn remove_item(&self, key: &str) -> AppResult<()>;
}

/// Deliver a contact message to its recipient.
#[async_trait]
pub trait EmailRelay: Send + Sync {
    async fn send(&self, message: &ContactMessage) -> AppResult<()>;
}

/// Wall-clock source for submission timestamps.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> EpochMillis;
}
