use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::lead_store::StoreError;

/// Every lead flow the site collects. Each kind owns one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadKind {
    Contact,
    BusinessBuyer,
    EstablishedBusinessBuyer,
    TexasBusinessBuyer,
    BusinessValuation,
    InterviewRequest,
    Appointment,
}

impl LeadKind {
    pub const ALL: [LeadKind; 7] = [
        LeadKind::Contact,
        LeadKind::BusinessBuyer,
        LeadKind::EstablishedBusinessBuyer,
        LeadKind::TexasBusinessBuyer,
        LeadKind::BusinessValuation,
        LeadKind::InterviewRequest,
        LeadKind::Appointment,
    ];

    /// Path segment used under `/api/leads/` and `/api/admin/leads/`.
    pub fn slug(self) -> &'static str {
        match self {
            LeadKind::Contact => "contact",
            LeadKind::BusinessBuyer => "business-buyer",
            LeadKind::EstablishedBusinessBuyer => "established-business-buyer",
            LeadKind::TexasBusinessBuyer => "texas-business-buyer",
            LeadKind::BusinessValuation => "business-valuation",
            LeadKind::InterviewRequest => "interview-request",
            LeadKind::Appointment => "appointment",
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            LeadKind::Contact => "contact_submissions",
            LeadKind::BusinessBuyer => "business_buyer_leads",
            LeadKind::EstablishedBusinessBuyer => "established_business_leads",
            LeadKind::TexasBusinessBuyer => "texas_business_leads",
            LeadKind::BusinessValuation => "business_valuations",
            LeadKind::InterviewRequest => "interview_requests",
            LeadKind::Appointment => "appointments",
        }
    }

    /// Key under which the generated identifier is returned to the caller.
    ///
    /// The website's forms were built at different times and each reads a
    /// different key, so the envelope keeps the per-endpoint name.
    pub fn id_field(self) -> &'static str {
        match self {
            LeadKind::BusinessBuyer | LeadKind::BusinessValuation => "submissionId",
            LeadKind::EstablishedBusinessBuyer | LeadKind::TexasBusinessBuyer => "leadId",
            LeadKind::Contact | LeadKind::InterviewRequest | LeadKind::Appointment => "id",
        }
    }

    /// Human label used in internal notification emails.
    pub fn label(self) -> &'static str {
        match self {
            LeadKind::Contact => "Contact Inquiry",
            LeadKind::BusinessBuyer => "Business Buyer",
            LeadKind::EstablishedBusinessBuyer => "Established Business Buyer",
            LeadKind::TexasBusinessBuyer => "Texas Business Buyer",
            LeadKind::BusinessValuation => "Business Valuation",
            LeadKind::InterviewRequest => "Interview Request",
            LeadKind::Appointment => "Appointment",
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            LeadKind::Contact => "Thank you for contacting us. We will be in touch shortly.",
            LeadKind::BusinessBuyer
            | LeadKind::EstablishedBusinessBuyer
            | LeadKind::TexasBusinessBuyer => {
                "Thank you for your interest. A business advisor will contact you soon."
            }
            LeadKind::BusinessValuation => {
                "Your valuation request has been received. We will follow up within two business days."
            }
            LeadKind::InterviewRequest => "Your interview request has been received.",
            LeadKind::Appointment => "Your appointment request has been received.",
        }
    }
}

impl fmt::Display for LeadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for LeadKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeadKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| format!("Unknown lead type '{}'", s))
    }
}

/// Lifecycle of a lead row. Intake only ever writes `New`; later states are
/// set by the CRM outside this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Closed,
}

impl LeadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Closed => "closed",
        }
    }
}

/// A row as returned by the store after insert or select.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredLead {
    pub id: Uuid,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    /// Remaining columns, keyed by column name.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl StoredLead {
    /// Splits a JSON row into the lifecycle columns and everything else.
    pub fn from_row(row: Value) -> Result<Self, StoreError> {
        let Value::Object(mut fields) = row else {
            return Err(StoreError::MalformedRow("row is not a JSON object".into()));
        };

        let id = fields
            .remove("id")
            .and_then(|v| v.as_str().and_then(|s| Uuid::parse_str(s).ok()))
            .ok_or_else(|| StoreError::MalformedRow("missing or invalid id".into()))?;

        let status = match fields.remove("status") {
            Some(raw) => serde_json::from_value(raw)
                .map_err(|e| StoreError::MalformedRow(format!("invalid status: {}", e)))?,
            None => LeadStatus::New,
        };

        let created_at = fields
            .remove("created_at")
            .and_then(|v| v.as_str().and_then(|s| DateTime::parse_from_rfc3339(s).ok()))
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| StoreError::MalformedRow("missing or invalid created_at".into()))?;

        Ok(Self {
            id,
            status,
            created_at,
            fields,
        })
    }

    pub fn field_str(&self, column: &str) -> Option<&str> {
        self.fields.get(column).and_then(Value::as_str)
    }
}
