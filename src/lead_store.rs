use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::models::{LeadKind, StoredLead};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("backend error: {0}")]
    Backend(String),
    #[error("store rejected insert ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("invalid column name '{0}'")]
    InvalidColumn(String),
    #[error("malformed row: {0}")]
    MalformedRow(String),
}

/// Single-row persistence for lead tables.
///
/// Rows are append-only from this service's side: there is no update or
/// delete path.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Inserts one row into `kind`'s table and returns it with its generated
    /// `id`, `status` and `created_at`.
    async fn insert(&self, kind: LeadKind, record: Map<String, Value>)
        -> Result<StoredLead, StoreError>;

    /// Newest rows first.
    async fn list(&self, kind: LeadKind, limit: i64) -> Result<Vec<StoredLead>, StoreError>;
}

/// Column names are interpolated into SQL and URLs, so they are limited to
/// lower-case identifiers.
pub fn check_column(name: &str) -> Result<&str, StoreError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());

    if valid {
        Ok(name)
    } else {
        Err(StoreError::InvalidColumn(name.to_string()))
    }
}

/// Process-local store used by tests and local runs without a database.
#[derive(Debug, Default)]
pub struct MemoryLeadStore {
    tables: Mutex<HashMap<LeadKind, Vec<StoredLead>>>,
    fail_inserts: AtomicBool,
}

impl MemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent insert fail with a backend error.
    pub fn with_insert_failure(self) -> Self {
        self.fail_inserts.store(true, Ordering::SeqCst);
        self
    }

    pub fn rows(&self, kind: LeadKind) -> Vec<StoredLead> {
        self.tables
            .lock()
            .map(|tables| tables.get(&kind).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn count(&self, kind: LeadKind) -> usize {
        self.rows(kind).len()
    }

    pub fn total(&self) -> usize {
        self.tables
            .lock()
            .map(|tables| tables.values().map(Vec::len).sum())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LeadStore for MemoryLeadStore {
    async fn insert(
        &self,
        kind: LeadKind,
        mut record: Map<String, Value>,
    ) -> Result<StoredLead, StoreError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("simulated insert failure".to_string()));
        }
        for column in record.keys() {
            check_column(column)?;
        }

        record.insert("id".to_string(), json!(Uuid::new_v4()));
        record
            .entry("created_at")
            .or_insert_with(|| json!(Utc::now().to_rfc3339()));
        let lead = StoredLead::from_row(Value::Object(record))?;

        let mut tables = self
            .tables
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))?;
        tables.entry(kind).or_default().push(lead.clone());

        Ok(lead)
    }

    async fn list(&self, kind: LeadKind, limit: i64) -> Result<Vec<StoredLead>, StoreError> {
        let mut rows = self.rows(kind);
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }
}
