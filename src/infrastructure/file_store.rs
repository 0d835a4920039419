use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::application::{AppError, AppResult, KeyValueStore};

/// Key/value pairs kept as one JSON object in a file.
///
/// Every call goes back to disk, so edits made by another process are picked
/// up, but nothing stops two processes from overwriting each other.
pub struct JsonFileKeyValueStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_map(&self) -> AppResult<BTreeMap<String, String>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(AppError::Storage(e.to_string())),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw)
            .map_err(|e| AppError::Storage(format!("{}: {e}", self.path.display())))
    }

    /// Reads the map for a write; an unreadable file is replaced rather than kept.
    async fn read_map_for_write(&self) -> AppResult<BTreeMap<String, String>> {
        match self.read_map().await {
            Ok(map) => Ok(map),
            Err(AppError::Storage(e)) => {
                tracing::warn!("discarding unreadable store: {e}");
                Ok(BTreeMap::new())
            }
            Err(e) => Err(e),
        }
    }

    async fn write_map(&self, map: &BTreeMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(e.to_string()))?;
        }
        let raw = serde_json::to_string_pretty(map).map_err(|e| AppError::Storage(e.to_string()))?;

        // write a sibling file, then rename it over the original
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, raw)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileKeyValueStore {
    async fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        let map = self.read_map().await?;
        Ok(map.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_map_for_write().await?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map).await
    }

    async fn remove_item(&self, key: &str) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_map_for_write().await?;
        if map.remove(key).is_some() {
            self.write_map(&map).await?;
        }
        Ok(())
    }
}
