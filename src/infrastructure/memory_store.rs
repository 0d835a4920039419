use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::application::{AppError, AppResult, KeyValueStore};

#[derive(Clone, Default)]
pub struct InMemoryKeyValueStore {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| AppError::Storage("lock poisoned".into()))?;
        Ok(inner.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| AppError::Storage("lock poisoned".into()))?;
        inner.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> AppResult<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| AppError::Storage("lock poisoned".into()))?;
        inner.remove(key);
        Ok(())
    }
}
