//! Observability helpers: tracing setup and PII-safe log fields.

use sha2::{Digest, Sha256};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brokerage_leads_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Short, stable fingerprint of an email address for log correlation.
///
/// Case and surrounding whitespace are ignored so the same person maps to
/// the same fingerprint across forms.
pub fn email_fingerprint(email: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.trim().to_lowercase().as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..12].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_normalized_and_short() {
        let a = email_fingerprint("John@Example.com ");
        let b = email_fingerprint("john@example.com");

        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert!(!a.contains('@'));
        assert_ne!(a, email_fingerprint("jane@example.com"));
    }
}
