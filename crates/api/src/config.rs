/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Base URL of the upstream sports data provider.
    pub provider_base_url: String,
    /// API key sent to the provider, if it requires one.
    pub provider_api_key: Option<String>,
    /// Whether the recurring-job scheduler runs in this process.
    pub scheduler_enabled: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `PROVIDER_BASE_URL`    | `http://localhost:4010`    |
    /// | `PROVIDER_API_KEY`     | unset                      |
    /// | `SCHEDULER_ENABLED`    | `true`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let provider_base_url = std::env::var("PROVIDER_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:4010".into());

        let provider_api_key = std::env::var("PROVIDER_API_KEY").ok().filter(|k| !k.is_empty());

        let scheduler_enabled: bool = std::env::var("SCHEDULER_ENABLED")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("SCHEDULER_ENABLED must be true or false");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            provider_base_url,
            provider_api_key,
            scheduler_enabled,
        }
    }
}
