use std::fmt;

use serde::{Deserialize, Serialize};

/// Milliseconds since the unix epoch.
pub type EpochMillis = i64;

pub const MINUTE_MILLIS: EpochMillis = 60 * 1000;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress {
    local: String,
    domain: String,
}

impl EmailAddress {
    pub fn parse(s: &str) -> Result<Self, EmailAddressError> {
        let s = s.trim();
        let Some((local, domain)) = s.split_once('@') else {
            return Err(EmailAddressError::InvalidFormat(s.to_string()));
        };
        if local.is_empty()
            || domain.is_empty()
            || domain.contains('@')
            || s.chars().any(char::is_whitespace)
        {
            return Err(EmailAddressError::InvalidFormat(s.to_string()));
        }
        Ok(Self {
            local: local.to_string(),
            domain: domain.to_string(),
        })
    }

    pub fn local_part(&self) -> &str {
        &self.local
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.local, self.domain)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = EmailAddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EmailAddressError {
    #[error("invalid email address: {0} (expected name@domain)")]
    InvalidFormat(String),
}
