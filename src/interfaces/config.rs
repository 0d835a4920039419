use serde::Deserialize;

use crate::infrastructure::emailjs_relay::{EmailJsCredentials, DEFAULT_ENDPOINT};

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_STATE_FILE: &str = "contact_state.json";
pub const DEFAULT_SQLITE_URL: &str = "sqlite:contact_state.db?mode=rwc";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub relay: RelayCfg,
    #[serde(default)]
    pub storage: StorageCfg,
    #[serde(default)]
    pub http: HttpCfg,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RelayCfg {
    pub service_id: Option<String>,
    pub template_id: Option<String>,
    pub public_key: Option<String>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind")]
pub enum StorageCfg {
    #[serde(rename = "memory")]
    Memory,

    #[serde(rename = "file")]
    File { path: Option<String> },

    #[serde(rename = "sqlite")]
    Sqlite { url: Option<String> },
}

impl Default for StorageCfg {
    fn default() -> Self {
        StorageCfg::File { path: None }
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct HttpCfg {
    pub bind: Option<String>,
}

impl Config {
    pub fn load_from_file(path: &str) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        let raw = expand_env(raw);
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(&raw)?;
        Ok(cfg)
    }

    /// Loads `path` if it exists, then lets the environment override it.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let mut cfg = if std::path::Path::new(path).exists() {
            Self::load_from_file(path)?
        } else {
            tracing::info!("config {path} not found, using defaults");
            Self::default()
        };
        cfg.apply_env(|k| std::env::var(k).ok());
        Ok(cfg)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let relay = &mut self.relay;
        for (key, slot) in [
            ("EMAILJS_SERVICE_ID", &mut relay.service_id),
            ("EMAILJS_TEMPLATE_ID", &mut relay.template_id),
            ("EMAILJS_PUBLIC_KEY", &mut relay.public_key),
        ] {
            if let Some(v) = lookup(key) {
                *slot = Some(v);
            }
        }
    }

    /// All three identifiers, or `None` when any is missing and the relay must be simulated.
    pub fn relay_credentials(&self) -> Option<EmailJsCredentials> {
        Some(EmailJsCredentials {
            service_id: present(&self.relay.service_id)?,
            template_id: present(&self.relay.template_id)?,
            public_key: present(&self.relay.public_key)?,
        })
    }

    pub fn relay_endpoint(&self) -> String {
        present(&self.relay.endpoint).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    pub fn bind_addr(&self) -> String {
        present(&self.http.bind).unwrap_or_else(|| DEFAULT_BIND.to_string())
    }
}

/// Blank values and `${VAR}` placeholders left unexpanded count as unset.
fn present(v: &Option<String>) -> Option<String> {
    let v = v.as_deref()?.trim();
    if v.is_empty() || v.contains("${") {
        return None;
    }
    Some(v.to_string())
}

/// very small ${VAR} expansion to keep config simple
fn expand_env(s: &str) -> String {
    let mut out = s.to_string();
    for (k, v) in std::env::vars() {
        out = out.replace(&format!("${{{}}}", k), &v);
    }
    out
}
