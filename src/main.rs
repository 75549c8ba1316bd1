use std::net::SocketAddr;
use std::sync::Arc;

use brokerage_leads_api::config::{Config, StorageBackend};
use brokerage_leads_api::db::Database;
use brokerage_leads_api::db_storage::PgLeadStore;
use brokerage_leads_api::email_client::ResendMailer;
use brokerage_leads_api::handlers::{app_router, AppState};
use brokerage_leads_api::lead_store::LeadStore;
use brokerage_leads_api::obs;
use brokerage_leads_api::rest_storage::RestLeadStore;

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - The lead store (PostgreSQL or hosted REST).
/// - The transactional-email client.
/// - HTTP routes and middleware (CORS, body limit, rate limiting).
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    obs::init_tracing();

    // Load configuration
    let config = Config::from_env()?;

    let store: Arc<dyn LeadStore> = match &config.storage {
        StorageBackend::Postgres { database_url } => {
            let db = Database::new(database_url).await?;
            tracing::info!("Database connection pool established");
            Arc::new(PgLeadStore::new(db.pool))
        }
        StorageBackend::Rest {
            base_url,
            service_key,
        } => {
            let store = RestLeadStore::new(base_url.clone(), service_key.clone())?;
            tracing::info!("✓ REST lead store initialized: {}", base_url);
            Arc::new(store)
        }
    };

    let mailer = ResendMailer::new(config.resend_base_url.clone(), config.resend_api_key.clone())?;
    tracing::info!("✓ Email client initialized: {}", config.resend_base_url);

    let port = config.port;
    let app_state = Arc::new(AppState::new(config, store, Arc::new(mailer)));
    let app = app_router(app_state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
