use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::lead_store::StoreError;

/// Application-specific error types.
#[derive(Debug)]
pub enum AppError {
    /// One or more required submission fields are missing or falsy.
    Validation(Vec<String>),
    /// Bad request error (invalid input).
    BadRequest(String),
    /// Resource not found error.
    NotFound(String),
    /// Unauthorized access error.
    Unauthorized(String),
    /// A setting the request depends on is absent.
    Configuration(String),
    /// The lead store rejected or failed the operation.
    Storage(StoreError),
    /// Internal server error.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(missing) => {
                write!(f, "Missing required fields: {}", missing.join(", "))
            }
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(e) => write!(f, "Storage error: {}", e),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Maps each error variant to a status code and an `{ "error": ... }` body.
    ///
    /// Server-side failures are logged here and reported to the caller with a
    /// generic message so storage details never leak into the response.
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(missing) => {
                tracing::warn!("Rejected submission, missing fields: {:?}", missing);
                (
                    StatusCode::BAD_REQUEST,
                    json!({
                        "error": format!("Missing required fields: {}", missing.join(", ")),
                        "missing": missing,
                    }),
                )
            }
            AppError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, json!({ "error": msg }))
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized access: {}", msg);
                (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" }))
            }
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Server configuration error" }),
                )
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Failed to save submission" }),
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
            AppError::WithContext { source, context } => {
                tracing::error!("Error with context: {} -> {}", context, source);
                return source.into_response();
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Storage(err)
    }
}

/// Rewrites error responses produced outside the handlers (body limit, rate
/// limiter, unmatched routes) into the `{ "error": ... }` envelope. Headers
/// such as `retry-after` are kept.
pub async fn json_error_envelope(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let status = response.status();

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if !(status.is_client_error() || status.is_server_error()) || is_json {
        return response;
    }

    let message = match status {
        StatusCode::PAYLOAD_TOO_LARGE => "Request body too large",
        StatusCode::TOO_MANY_REQUESTS => "Too many requests",
        other => other.canonical_reason().unwrap_or("Request failed"),
    };
    tracing::warn!("{} response rewritten to JSON envelope", status);

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.remove(header::CONTENT_TYPE);

    let mut envelope = (status, Json(json!({ "error": message }))).into_response();
    for (name, value) in parts.headers.iter() {
        envelope.headers_mut().insert(name.clone(), value.clone());
    }
    envelope
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<AppError>,
{
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e.into()),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e.into()),
            context: f(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::Validation(vec!["email".into()]), 400),
            (AppError::BadRequest("x".into()), 400),
            (AppError::NotFound("x".into()), 404),
            (AppError::Unauthorized("x".into()), 401),
            (AppError::Configuration("x".into()), 500),
            (AppError::Storage(StoreError::Backend("down".into())), 500),
            (AppError::InternalError("x".into()), 500),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status().as_u16(), expected);
        }
    }

    #[test]
    fn test_context_delegates_to_source_status() {
        let result: Result<(), StoreError> = Err(StoreError::Backend("timeout".into()));
        let err = result.context("Failed to store contact lead").unwrap_err();

        assert_eq!(
            err.to_string(),
            "Failed to store contact lead: Storage error: backend error: timeout"
        );
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_plain_text_errors_get_the_envelope() {
        use axum::{body::Body, middleware, routing::get, Router};
        use http_body_util::BodyExt;
        use tower::ServiceExt;

        let app = Router::new()
            .route(
                "/limited",
                get(|| async {
                    (
                        StatusCode::TOO_MANY_REQUESTS,
                        [(header::RETRY_AFTER, "3")],
                        "Too Many Requests! Wait for 3s",
                    )
                }),
            )
            .route(
                "/json",
                get(|| async { AppError::BadRequest("nope".into()) }),
            )
            .layer(middleware::from_fn(json_error_envelope));

        let response = app
            .clone()
            .oneshot(axum::http::Request::get("/limited").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "3");
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "Too many requests" }));

        let response = app
            .oneshot(axum::http::Request::get("/json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "nope" }));
    }

    #[test]
    fn test_validation_display_lists_fields() {
        let err = AppError::Validation(vec!["full_name".into(), "consent".into()]);
        assert_eq!(err.to_string(), "Missing required fields: full_name, consent");
    }
}
