use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::admin_handler;
use crate::config::Config;
use crate::cors;
use crate::errors::{self, AppError};
use crate::intake;
use crate::lead_forms::{
    AppointmentForm, BusinessBuyerForm, BusinessValuationForm, ContactForm,
    EstablishedBusinessBuyerForm, InterviewRequestForm, LeadForm, TexasBusinessBuyerForm,
};
use crate::lead_store::LeadStore;
use crate::notifications::{Mailer, Notifier};

const OPENAPI_SPEC: &str = include_str!("../openapi.yml");

/// Shared application state injected into handlers.
///
/// Built once at startup; nothing in it changes while serving.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Where lead rows are written.
    pub store: Arc<dyn LeadStore>,
    /// Internal and confirmation email fan-out.
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn LeadStore>, mailer: Arc<dyn Mailer>) -> Self {
        let notifier = Notifier::new(
            mailer,
            config.email_from.clone(),
            config.ops_recipients.clone(),
        );
        Self {
            config,
            store,
            notifier,
        }
    }
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "brokerage-leads-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /api/leads/{slug}
///
/// One handler serves every lead type; the form type picks the required
/// fields, the table and the id key of the response. The body is taken raw
/// so that malformed JSON gets the same `{ "error": ... }` envelope as every
/// other failure.
pub async fn submit_lead<F: LeadForm>(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    tracing::info!("POST /api/leads/{}", F::KIND);

    let outcome = intake::submit::<F>(&state, &body).await?;

    Ok(Json(outcome.envelope()))
}

/// Serves the OpenAPI specification YAML file.
pub async fn serve_openapi_spec() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/yaml")],
        OPENAPI_SPEC,
    )
}

/// Serves a Swagger UI page that loads [`serve_openapi_spec`].
pub async fn serve_swagger_ui() -> impl IntoResponse {
    let html = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Brokerage Leads API - Swagger UI</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        body { margin: 0; padding: 0; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = function() {
            window.ui = SwaggerUIBundle({
                url: "/api-docs/openapi.yml",
                dom_id: '#swagger-ui',
                deepLinking: true
            });
        };
    </script>
</body>
</html>
"#;
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
}

/// Milliseconds between two replenished quota slots for a per-second rate.
/// Rates above 1000/s saturate at one slot per millisecond.
pub fn replenish_interval_ms(rate_per_second: u64) -> u64 {
    (1000 / rate_per_second.max(1)).max(1)
}

/// Builds the full application router.
///
/// Intake routes are rate limited per client IP when the configured rate is
/// non-zero; the limiter needs the peer address, so serve the router with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn app_router(state: Arc<AppState>) -> Router {
    let mut intake_routes = Router::new()
        .route("/api/leads/contact", post(submit_lead::<ContactForm>))
        .route(
            "/api/leads/business-buyer",
            post(submit_lead::<BusinessBuyerForm>),
        )
        .route(
            "/api/leads/established-business-buyer",
            post(submit_lead::<EstablishedBusinessBuyerForm>),
        )
        .route(
            "/api/leads/texas-business-buyer",
            post(submit_lead::<TexasBusinessBuyerForm>),
        )
        .route(
            "/api/leads/business-valuation",
            post(submit_lead::<BusinessValuationForm>),
        )
        .route(
            "/api/leads/interview-request",
            post(submit_lead::<InterviewRequestForm>),
        )
        .route("/api/leads/appointment", post(submit_lead::<AppointmentForm>));

    if state.config.rate_limit_per_second > 0 && state.config.rate_limit_burst > 0 {
        match GovernorConfigBuilder::default()
            .per_millisecond(replenish_interval_ms(state.config.rate_limit_per_second))
            .burst_size(state.config.rate_limit_burst)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
        {
            Some(governor_conf) => {
                intake_routes = intake_routes.layer(GovernorLayer {
                    config: Arc::new(governor_conf),
                });
            }
            None => tracing::warn!("Invalid rate limit settings, intake rate limiting disabled"),
        }
    }

    let max_body_bytes = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/docs", get(serve_swagger_ui))
        .route("/api-docs/openapi.yml", get(serve_openapi_spec))
        .route(
            "/api/admin/leads/:kind",
            get(admin_handler::list_leads),
        )
        .merge(intake_routes)
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(middleware::from_fn(errors::json_error_envelope))
        .layer(middleware::from_fn(cors::permissive_cors))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replenish_interval_ms() {
        assert_eq!(replenish_interval_ms(1), 1000);
        assert_eq!(replenish_interval_ms(2), 500);
        assert_eq!(replenish_interval_ms(5), 200);
        assert_eq!(replenish_interval_ms(5000), 1);
    }
}
