use std::path::PathBuf;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl Environment {
    /// Production logs go to collectors that do not render ANSI escapes.
    #[must_use]
    pub fn log_ansi(&self) -> bool {
        !matches!(self, Environment::Production)
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub data_dir: PathBuf,
    /// API keys in rotation order: `YOUTUBE_API_KEY` first, then the numbered
    /// variants. Never empty when a collection is started.
    pub youtube_api_keys: Vec<String>,
    pub youtube_base_url: String,
    pub daily_quota_limit: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub inter_category_delay_ms: u64,
    pub inter_region_delay_ms: u64,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl AppConfig {
    /// The configured API keys, or an error naming the primary key variable
    /// when there are none.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when no key is configured.
    pub fn require_api_keys(&self) -> Result<&[String], ConfigError> {
        if self.youtube_api_keys.is_empty() {
            return Err(ConfigError::MissingEnvVar("YOUTUBE_API_KEY".to_string()));
        }
        Ok(&self.youtube_api_keys)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &self.database_url)
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("data_dir", &self.data_dir)
            .field(
                "youtube_api_keys",
                &format!("[{} redacted]", self.youtube_api_keys.len()),
            )
            .field("youtube_base_url", &self.youtube_base_url)
            .field("daily_quota_limit", &self.daily_quota_limit)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("inter_category_delay_ms", &self.inter_category_delay_ms)
            .field("inter_region_delay_ms", &self.inter_region_delay_ms)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
