use async_trait::async_trait;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::email_templates;
use crate::lead_forms::LeadForm;
use crate::models::StoredLead;
use crate::obs::email_fingerprint;

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("email transport error: {0}")]
    Transport(String),
    #[error("email provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("unexpected email provider response: {0}")]
    InvalidResponse(String),
}

/// An HTML email ready for the transactional-email provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub message_id: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<SentEmail, NotificationError>;
}

/// Outcome of one notification attempt. Never escalated into the HTTP
/// response: the lead row is already stored when these are produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationResult {
    Delivered { message_id: String },
    Failed(String),
}

impl NotificationResult {
    pub fn is_delivered(&self) -> bool {
        matches!(self, NotificationResult::Delivered { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationReport {
    pub internal: NotificationResult,
    pub confirmation: NotificationResult,
}

/// Fans a stored lead out to the operations inbox and the submitter.
#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    from: String,
    ops_recipients: Vec<String>,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, from: String, ops_recipients: Vec<String>) -> Self {
        Self {
            mailer,
            from,
            ops_recipients,
        }
    }

    /// Sends both emails concurrently. Only call after the row is stored so
    /// no email ever references a lead that does not exist.
    pub async fn notify<F: LeadForm>(&self, lead: &StoredLead, form: &F) -> NotificationReport {
        let internal = email_templates::internal_notification(
            F::KIND,
            lead,
            form.full_name(),
            &form.summary(),
        );
        let internal = EmailMessage {
            from: self.from.clone(),
            to: self.ops_recipients.clone(),
            subject: internal.subject,
            html: internal.html,
            reply_to: Some(form.email().trim().to_string()),
        };

        let confirmation =
            email_templates::confirmation(F::KIND, lead, form.full_name(), form.locale());
        let confirmation = EmailMessage {
            from: self.from.clone(),
            to: vec![form.email().trim().to_string()],
            subject: confirmation.subject,
            html: confirmation.html,
            reply_to: None,
        };

        let (internal, confirmation) = tokio::join!(
            self.deliver(&internal, "internal", lead),
            self.deliver(&confirmation, "confirmation", lead),
        );

        NotificationReport {
            internal,
            confirmation,
        }
    }

    async fn deliver(
        &self,
        message: &EmailMessage,
        channel: &'static str,
        lead: &StoredLead,
    ) -> NotificationResult {
        match self.mailer.send(message).await {
            Ok(sent) => {
                tracing::info!(
                    lead_id = %lead.id,
                    channel,
                    message_id = %sent.message_id,
                    "Notification delivered"
                );
                NotificationResult::Delivered {
                    message_id: sent.message_id,
                }
            }
            Err(e) => {
                let recipients: Vec<String> =
                    message.to.iter().map(|to| email_fingerprint(to)).collect();
                tracing::error!(
                    lead_id = %lead.id,
                    channel,
                    recipients = ?recipients,
                    "Notification failed: {}",
                    e
                );
                NotificationResult::Failed(e.to_string())
            }
        }
    }
}

/// Mailer that keeps messages in memory; used by tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    should_fail: Arc<AtomicBool>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_send_failure(self) -> Self {
        self.should_fail.store(true, Ordering::SeqCst);
        self
    }

    /// Messages accepted so far (failed sends are not recorded).
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<SentEmail, NotificationError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(NotificationError::Rejected {
                status: 503,
                body: "simulated provider outage".to_string(),
            });
        }

        let mut sent = self
            .sent
            .lock()
            .map_err(|_| NotificationError::Transport("mailer lock poisoned".to_string()))?;
        sent.push(message.clone());

        Ok(SentEmail {
            message_id: format!("recorded-{}", sent.len()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lead_forms::BusinessBuyerForm;
    use serde_json::json;

    fn form() -> BusinessBuyerForm {
        serde_json::from_value(json!({
            "full_name": "John Smith",
            "email": " john@example.com ",
            "investment_budget": "250k-500k",
            "consent": true
        }))
        .unwrap()
    }

    fn lead() -> StoredLead {
        StoredLead::from_row(json!({
            "id": "6f1c2a4e-3b7d-4c55-9a51-0c3e8d7f2b10",
            "status": "new",
            "created_at": "2026-10-16T14:03:11Z"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_notify_sends_internal_and_confirmation() {
        let mailer = RecordingMailer::new();
        let notifier = Notifier::new(
            Arc::new(mailer.clone()),
            "Leads <leads@example.com>".to_string(),
            vec!["ops@example.com".to_string()],
        );

        let report = notifier.notify(&lead(), &form()).await;

        assert!(report.internal.is_delivered());
        assert!(report.confirmation.is_delivered());

        let sent = mailer.sent();
        assert_eq!(sent.len(), 2);
        let internal = sent.iter().find(|m| m.to == vec!["ops@example.com"]).unwrap();
        assert_eq!(internal.reply_to.as_deref(), Some("john@example.com"));
        assert!(internal.subject.contains("John Smith"));
        let confirmation = sent.iter().find(|m| m.to == vec!["john@example.com"]).unwrap();
        assert!(confirmation.html.contains("6f1c2a4e-3b7d-4c55-9a51-0c3e8d7f2b10"));
    }

    #[tokio::test]
    async fn test_notify_reports_failures_without_panicking() {
        let notifier = Notifier::new(
            Arc::new(RecordingMailer::new().with_send_failure()),
            "leads@example.com".to_string(),
            vec!["ops@example.com".to_string()],
        );

        let report = notifier.notify(&lead(), &form()).await;

        assert!(matches!(report.internal, NotificationResult::Failed(_)));
        assert!(matches!(report.confirmation, NotificationResult::Failed(_)));
    }

    #[test]
    fn test_email_message_omits_empty_reply_to() {
        let message = EmailMessage {
            from: "a@example.com".into(),
            to: vec!["b@example.com".into()],
            subject: "s".into(),
            html: "<p>h</p>".into(),
            reply_to: None,
        };
        let value = serde_json::to_value(&message).unwrap();
        assert!(value.get("reply_to").is_none());
    }
}
