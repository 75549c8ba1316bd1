/// Where lead rows are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Direct PostgreSQL connection through sqlx.
    Postgres { database_url: String },
    /// Hosted PostgREST-style endpoint authenticated with a service key.
    Rest { base_url: String, service_key: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub storage: StorageBackend,
    pub resend_api_key: String,
    pub resend_base_url: String,
    pub email_from: String,
    pub ops_recipients: Vec<String>,
    pub admin_api_token: Option<String>,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
    pub max_body_bytes: usize,
}

pub const DEFAULT_RESEND_BASE_URL: &str = "https://api.resend.com";

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        match &config.storage {
            StorageBackend::Postgres { database_url } => tracing::debug!(
                "Storage: postgres {}...",
                database_url.chars().take(20).collect::<String>()
            ),
            StorageBackend::Rest { base_url, .. } => {
                tracing::debug!("Storage: rest {}", base_url)
            }
        }
        tracing::debug!("Email API: {}", config.resend_base_url);
        tracing::debug!("Ops recipients: {}", config.ops_recipients.len());
        if config.admin_api_token.is_none() {
            tracing::warn!("ADMIN_API_TOKEN not set, admin lead listing is disabled");
        }
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let storage = if let Some(url) = non_empty("DATABASE_URL").or_else(|| non_empty("DB_URL"))
        {
            if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
            }
            StorageBackend::Postgres { database_url: url }
        } else if let Some(base_url) = non_empty("SUPABASE_URL") {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                anyhow::bail!("SUPABASE_URL must start with http:// or https://");
            }
            let service_key = non_empty("SUPABASE_SERVICE_ROLE_KEY").ok_or_else(|| {
                anyhow::anyhow!("SUPABASE_SERVICE_ROLE_KEY is required when SUPABASE_URL is set")
            })?;
            StorageBackend::Rest {
                base_url: base_url.trim_end_matches('/').to_string(),
                service_key,
            }
        } else {
            anyhow::bail!("DATABASE_URL or SUPABASE_URL environment variable required");
        };

        let resend_api_key = non_empty("RESEND_API_KEY")
            .ok_or_else(|| anyhow::anyhow!("RESEND_API_KEY environment variable required"))?;

        let resend_base_url = non_empty("RESEND_BASE_URL")
            .unwrap_or_else(|| DEFAULT_RESEND_BASE_URL.to_string());
        if !resend_base_url.starts_with("http://") && !resend_base_url.starts_with("https://") {
            anyhow::bail!("RESEND_BASE_URL must start with http:// or https://");
        }

        let email_from = non_empty("EMAIL_FROM")
            .ok_or_else(|| anyhow::anyhow!("EMAIL_FROM environment variable required"))?;

        let ops_recipients: Vec<String> = non_empty("OPS_NOTIFICATION_EMAILS")
            .ok_or_else(|| anyhow::anyhow!("OPS_NOTIFICATION_EMAILS environment variable required"))?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if ops_recipients.is_empty() {
            anyhow::bail!("OPS_NOTIFICATION_EMAILS must list at least one address");
        }

        Ok(Self {
            port: parse_or(&non_empty, "PORT", 3000)
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            storage,
            resend_api_key,
            resend_base_url: resend_base_url.trim_end_matches('/').to_string(),
            email_from,
            ops_recipients,
            admin_api_token: non_empty("ADMIN_API_TOKEN"),
            rate_limit_per_second: parse_or(&non_empty, "RATE_LIMIT_PER_SECOND", 5)
                .map_err(|_| anyhow::anyhow!("RATE_LIMIT_PER_SECOND must be a number"))?,
            rate_limit_burst: parse_or(&non_empty, "RATE_LIMIT_BURST", 10)
                .map_err(|_| anyhow::anyhow!("RATE_LIMIT_BURST must be a number"))?,
            max_body_bytes: parse_or(&non_empty, "MAX_BODY_BYTES", 64 * 1024)
                .map_err(|_| anyhow::anyhow!("MAX_BODY_BYTES must be a number"))?,
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, T::Err>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse(),
        None => Ok(default),
    }
}
