//! The lead-intake pipeline: parse, validate, persist, notify.

use serde_json::{json, Value};

use crate::errors::{AppError, ResultExt};
use crate::handlers::AppState;
use crate::lead_forms::LeadForm;
use crate::models::{LeadKind, LeadStatus, StoredLead};
use crate::notifications::NotificationReport;
use crate::obs::email_fingerprint;
use crate::validation;

#[derive(Debug)]
pub struct IntakeOutcome {
    pub kind: LeadKind,
    pub lead: StoredLead,
    pub notifications: NotificationReport,
}

impl IntakeOutcome {
    /// Success body. The id key depends on the endpoint (`id`, `leadId` or
    /// `submissionId`); notification results are deliberately not exposed.
    pub fn envelope(&self) -> Value {
        let mut body = json!({
            "success": true,
            "message": self.kind.success_message(),
        });
        body[self.kind.id_field()] = json!(self.lead.id.to_string());
        body
    }
}

/// Runs one submission through the pipeline.
///
/// Nothing is written unless validation passes, and no email is sent unless
/// the insert succeeded. Notification failures are recorded in the outcome
/// and the log but never turn into an error.
pub async fn submit<F: LeadForm>(state: &AppState, body: &[u8]) -> Result<IntakeOutcome, AppError> {
    let kind = F::KIND;

    let payload: Value = serde_json::from_slice(body).map_err(|e| {
        tracing::warn!("Malformed JSON for {} submission: {}", kind, e);
        AppError::BadRequest("Invalid JSON body".to_string())
    })?;

    let form: F = validation::validate(&payload)?;

    let mut record = form.columns();
    record.insert("status".to_string(), json!(LeadStatus::New.as_str()));

    let lead = state
        .store
        .insert(kind, record)
        .await
        .with_context(|| format!("Failed to store {} lead", kind))?;

    tracing::info!(
        lead_id = %lead.id,
        kind = %kind,
        email = %email_fingerprint(form.email()),
        "Lead stored"
    );

    let notifications = state.notifier.notify(&lead, &form).await;
    if !notifications.internal.is_delivered() || !notifications.confirmation.is_delivered() {
        tracing::warn!(
            lead_id = %lead.id,
            internal = ?notifications.internal,
            confirmation = ?notifications.confirmation,
            "Lead stored but not every notification was delivered"
        );
    }

    Ok(IntakeOutcome {
        kind,
        lead,
        notifications,
    })
}
