//! Environment configuration.

use std::time::Duration;

const DEFAULT_DATABASE_PATH: &str = "familiar.db";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
/// Unsaved drafts are kept for a week.
const DEFAULT_DRAFT_TTL_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub database_path: String,
    pub server_host: String,
    pub server_port: u16,
    /// `*` or a comma-separated origin list. `None` disables CORS.
    pub cors_allowed_origins: Option<String>,
    pub draft_ttl: Duration,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let server_port = non_empty("SERVER_PORT")
            .or_else(|| non_empty("PORT"))
            .map(|raw| {
                raw.parse().unwrap_or_else(|_| {
                    tracing::warn!(value = %raw, "Invalid server port, using {}", DEFAULT_PORT);
                    DEFAULT_PORT
                })
            })
            .unwrap_or(DEFAULT_PORT);

        let draft_ttl_secs = non_empty("DRAFT_TTL_SECS")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_DRAFT_TTL_SECS);

        Self {
            database_path: non_empty("DATABASE_PATH")
                .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            server_host: non_empty("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            server_port,
            cors_allowed_origins: non_empty("CORS_ALLOWED_ORIGINS"),
            draft_ttl: Duration::from_secs(draft_ttl_secs),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
