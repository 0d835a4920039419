use async_trait::async_trait;
use serde::Serialize;

use crate::application::{AppError, AppResult, EmailRelay};
use crate::domain::ContactMessage;

pub const DEFAULT_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// Account identifiers for the EmailJS REST API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailJsCredentials {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

pub struct EmailJsRelay {
    client: reqwest::Client,
    endpoint: String,
    credentials: EmailJsCredentials,
}

impl EmailJsRelay {
    pub fn new(credentials: EmailJsCredentials) -> Self {
        Self::with_endpoint(credentials, DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(credentials: EmailJsCredentials, endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            credentials,
        }
    }
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: TemplateParams<'a>,
}

#[derive(Debug, Serialize)]
struct TemplateParams<'a> {
    name: &'a str,
    email: String,
    message: &'a str,
}

#[async_trait]
impl EmailRelay for EmailJsRelay {
    async fn send(&self, message: &ContactMessage) -> AppResult<()> {
        let payload = SendRequest {
            service_id: &self.credentials.service_id,
            template_id: &self.credentials.template_id,
            user_id: &self.credentials.public_key,
            template_params: TemplateParams {
                name: &message.name,
                email: message.email.to_string(),
                message: &message.message,
            },
        };

        self.client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Relay(e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::Relay(e.to_string()))?;

        Ok(())
    }
}
