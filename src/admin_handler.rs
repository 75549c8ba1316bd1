use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::errors::{AppError, ResultExt};
use crate::handlers::AppState;
use crate::models::LeadKind;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

#[derive(Debug, Deserialize)]
pub struct ListLeadsQuery {
    pub limit: Option<i64>,
}

/// GET /api/admin/leads/:kind
///
/// Read-only listing of the newest leads of one kind for the CRM dashboard.
/// Requires `Authorization: Bearer <ADMIN_API_TOKEN>`.
pub async fn list_leads(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    query: Result<Query<ListLeadsQuery>, QueryRejection>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    // Auth first, before any path or query validation
    authorize(&state, &headers)?;

    let kind: LeadKind = kind.parse().map_err(AppError::NotFound)?;
    let Query(query) = query
        .map_err(|e| AppError::BadRequest(format!("Invalid query: {}", e.body_text())))?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let leads = state
        .store
        .list(kind, limit)
        .await
        .with_context(|| format!("Failed to list {} leads", kind))?;

    tracing::info!("Admin listed {} {} lead(s)", leads.len(), kind);

    Ok(Json(json!({
        "kind": kind.slug(),
        "count": leads.len(),
        "leads": leads,
    })))
}

/// Validate the admin bearer token.
fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let expected = state.config.admin_api_token.as_deref().ok_or_else(|| {
        AppError::Configuration("ADMIN_API_TOKEN not configured".to_string())
    })?;

    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    if !constant_time_compare(token.trim(), expected) {
        return Err(AppError::Unauthorized("Invalid admin token".to_string()));
    }

    Ok(())
}

/// Constant-time string comparison (length still leaks)
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.as_bytes()
        .iter()
        .zip(b.as_bytes().iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("secret-token", "secret-token"));
        assert!(!constant_time_compare("secret-token", "secret-tokeN"));
        assert!(!constant_time_compare("short", "longer-token"));
    }
}
