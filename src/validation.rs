use serde_json::{Map, Value};

use crate::errors::AppError;
use crate::lead_forms::LeadForm;

/// Whether a submitted value counts as "provided".
///
/// Mirrors how the website's forms treat input: null, blank strings, `false`
/// and `0` are all absent. A consent checkbox left unticked therefore fails
/// the same way a missing name does.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.trim().is_empty(),
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Required fields that are absent or falsy, in declaration order.
pub fn missing_fields(payload: &Map<String, Value>, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|field| !payload.get(**field).is_some_and(is_present))
        .map(|field| field.to_string())
        .collect()
}

/// Presence gate followed by typed decoding.
///
/// Only shape is checked here: email syntax and phone format are accepted
/// as submitted.
pub fn validate<F: LeadForm>(payload: &Value) -> Result<F, AppError> {
    let object = payload
        .as_object()
        .ok_or_else(|| AppError::BadRequest("Request body must be a JSON object".to_string()))?;

    let missing = missing_fields(object, F::REQUIRED);
    if !missing.is_empty() {
        return Err(AppError::Validation(missing));
    }

    serde_json::from_value(payload.clone()).map_err(|e| {
        AppError::BadRequest(format!("Invalid {} submission: {}", F::KIND.slug(), e))
    })
}
