//! Brokerage Lead-Intake API Library
//!
//! Backend for the brokerage website's lead forms: each submission is
//! validated, stored as one row, and announced by email to the operations
//! inbox and to the submitter.
//!
//! # Modules
//!
//! - `api`: HTTP-facing components.
//! - `core`: Pipeline, validation and domain types.
//! - `data`: Data access layer.
//! - `integrations`: External service integrations.
//! - `obs`: Observability and logging.
//! - `admin_handler`: Token-gated lead listing.
//! - `config`: Configuration management.
//! - `cors`: Permissive CORS and preflight middleware.
//! - `db`: Database connection and pool management.
//! - `db_storage`: PostgreSQL lead store.
//! - `email_client`: Resend transactional-email client.
//! - `email_templates`: HTML notification bodies.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and router.
//! - `i18n`: Localized confirmation strings.
//! - `intake`: The validate → persist → notify pipeline.
//! - `lead_forms`: Typed submissions per lead kind.
//! - `lead_store`: Store trait and in-memory store.
//! - `models`: Core data models.
//! - `notifications`: Mailer trait and notification fan-out.
//! - `rest_storage`: Hosted REST (PostgREST) lead store.
//! - `validation`: Required-field checks.

pub mod api;
pub mod core;
pub mod data;
pub mod integrations;
pub mod obs;

// Re-export primary modules for shared use in tests and other binaries
pub mod admin_handler;
pub mod config;
pub mod cors;
pub mod db;
pub mod db_storage;
pub mod email_client;
pub mod email_templates;
pub mod errors;
pub mod handlers;
pub mod i18n;
pub mod intake;
pub mod lead_forms;
pub mod lead_store;
pub mod models;
pub mod notifications;
pub mod rest_storage;
pub mod validation;
