use serde::{Deserialize, Serialize};

use super::{EmailAddress, EmailAddressError};

/// Shortest message (in characters, surrounding whitespace ignored) the form accepts.
pub const MIN_MESSAGE_CHARS: usize = 10;

/// The editable fields of the contact form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

impl ContactForm {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.email.is_empty() && self.message.is_empty()
    }

    pub fn clear(&mut self) {
        self.name.clear();
        self.email.clear();
        self.message.clear();
    }

    /// Checks the fields and builds the payload handed to the relay.
    pub fn validate(&self) -> Result<ContactMessage, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }

        let email = EmailAddress::parse(&self.email).map_err(ValidationError::Email)?;

        let message = self.message.trim();
        let len = message.chars().count();
        if len < MIN_MESSAGE_CHARS {
            return Err(ValidationError::MessageTooShort {
                min: MIN_MESSAGE_CHARS,
                actual: len,
            });
        }

        Ok(ContactMessage {
            name: name.to_string(),
            email,
            message: message.to_string(),
        })
    }
}

/// A validated contact message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: EmailAddress,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter your name.")]
    MissingName,
    #[error("Please enter a valid email address.")]
    Email(#[source] EmailAddressError),
    #[error("Message must be at least {min} characters long.")]
    MessageTooShort { min: usize, actual: usize },
}
