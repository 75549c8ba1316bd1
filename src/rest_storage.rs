use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;

use crate::lead_store::{LeadStore, StoreError};
use crate::models::{LeadKind, StoredLead};

/// Client for a hosted PostgREST endpoint (`{base_url}/rest/v1/{table}`).
///
/// Authenticates with the project's service key, which bypasses row-level
/// security; the key must never reach the browser.
#[derive(Clone)]
pub struct RestLeadStore {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl RestLeadStore {
    pub fn new(base_url: String, service_key: String) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| StoreError::Backend(format!("Failed to create REST client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
        })
    }

    fn table_url(&self, kind: LeadKind) -> String {
        format!("{}/rest/v1/{}", self.base_url, kind.table())
    }

    async fn read_rows(response: reqwest::Response) -> Result<Vec<Value>, StoreError> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StoreError::Rejected { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::MalformedRow(format!("Failed to parse REST response: {}", e)))
    }
}

#[async_trait]
impl LeadStore for RestLeadStore {
    async fn insert(
        &self,
        kind: LeadKind,
        record: Map<String, Value>,
    ) -> Result<StoredLead, StoreError> {
        let url = self.table_url(kind);
        tracing::debug!("Inserting row via REST: {}", url);

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .header("Prefer", "return=representation")
            .json(&record)
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("REST insert failed: {}", e)))?;

        let row = Self::read_rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::MalformedRow("insert returned no rows".to_string()))?;

        StoredLead::from_row(row)
    }

    async fn list(&self, kind: LeadKind, limit: i64) -> Result<Vec<StoredLead>, StoreError> {
        let url = reqwest::Url::parse_with_params(
            &self.table_url(kind),
            &[
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .map_err(|e| StoreError::Backend(format!("Failed to build URL: {}", e)))?;

        let response = self
            .client
            .get(url)
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("REST select failed: {}", e)))?;

        Self::read_rows(response)
            .await?
            .into_iter()
            .map(StoredLead::from_row)
            .collect()
    }
}
