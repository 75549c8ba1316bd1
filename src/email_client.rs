use async_trait::async_trait;
use std::time::Duration;

use crate::notifications::{EmailMessage, Mailer, NotificationError, SentEmail};

/// Client for the Resend transactional-email API.
#[derive(Clone)]
pub struct ResendMailer {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ResendMailer {
    /// Creates a new `ResendMailer`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root, `https://api.resend.com` in production.
    /// * `api_key` - The API key sent as a bearer token.
    pub fn new(base_url: String, api_key: String) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                NotificationError::Transport(format!("Failed to create email client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    /// Sends one HTML email and returns the provider's message id.
    async fn send(&self, message: &EmailMessage) -> Result<SentEmail, NotificationError> {
        let url = format!("{}/emails", self.base_url);
        tracing::debug!("Sending email '{}' via {}", message.subject, url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(message)
            .send()
            .await
            .map_err(|e| NotificationError::Transport(format!("Email request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(NotificationError::Rejected { status, body });
        }

        let data: serde_json::Value = response.json().await.map_err(|e| {
            NotificationError::InvalidResponse(format!("Failed to parse email response: {}", e))
        })?;

        let message_id = data
            .get("id")
            .and_then(|id| id.as_str())
            .ok_or_else(|| {
                NotificationError::InvalidResponse("Email response missing 'id' field".to_string())
            })?
            .to_string();

        Ok(SentEmail { message_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let mailer = ResendMailer::new("https://api.resend.com/".to_string(), "re_key".to_string());
        assert!(mailer.is_ok());
        assert_eq!(mailer.unwrap().base_url, "https://api.resend.com");
    }
}
