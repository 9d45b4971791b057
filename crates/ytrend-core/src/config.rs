use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Highest numbered key suffix read from the environment (`YOUTUBE_API_KEY_9`).
const MAX_NUMBERED_API_KEYS: u32 = 9;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing is decoupled from the process environment so it can be tested with
/// a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = or_default("DATABASE_URL", "sqlite://trending_data.db");
    let env = parse_environment(&or_default("YTREND_ENV", "development"))?;
    let log_level = or_default("YTREND_LOG_LEVEL", "info");
    let data_dir = PathBuf::from(or_default("YTREND_DATA_DIR", "./data/trending"));
    let youtube_api_keys = collect_api_keys(&lookup);
    let youtube_base_url = or_default(
        "YTREND_YOUTUBE_BASE_URL",
        "https://www.googleapis.com/youtube/v3/",
    );

    let daily_quota_limit = parse_u64("YTREND_DAILY_QUOTA_LIMIT", "10000")?;
    if daily_quota_limit == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "YTREND_DAILY_QUOTA_LIMIT".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let request_timeout_secs = parse_u64("YTREND_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("YTREND_USER_AGENT", "ytrend/0.1 (trending-collector)");
    let max_retries = parse_u32("YTREND_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("YTREND_RETRY_BACKOFF_BASE_MS", "1000")?;
    let inter_category_delay_ms = parse_u64("YTREND_INTER_CATEGORY_DELAY_MS", "500")?;
    let inter_region_delay_ms = parse_u64("YTREND_INTER_REGION_DELAY_MS", "1000")?;

    let db_max_connections = parse_u32("YTREND_DB_MAX_CONNECTIONS", "5")?;
    let db_acquire_timeout_secs = parse_u64("YTREND_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        data_dir,
        youtube_api_keys,
        youtube_base_url,
        daily_quota_limit,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        inter_category_delay_ms,
        inter_region_delay_ms,
        db_max_connections,
        db_acquire_timeout_secs,
    })
}

/// Gather API keys from `YOUTUBE_API_KEY` and `YOUTUBE_API_KEY_1..=9`.
///
/// Blank values are ignored and duplicates keep their first position, so the
/// same key exported under two names is only rotated through once.
fn collect_api_keys<F>(lookup: &F) -> Vec<String>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let names = std::iter::once("YOUTUBE_API_KEY".to_string())
        .chain((1..=MAX_NUMBERED_API_KEYS).map(|i| format!("YOUTUBE_API_KEY_{i}")));

    let mut keys: Vec<String> = Vec::new();
    for name in names {
        let Ok(raw) = lookup(&name) else {
            continue;
        };
        let key = raw.trim();
        if key.is_empty() || keys.iter().any(|k| k == key) {
            continue;
        }
        keys.push(key.to_string());
    }
    keys
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "YTREND_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
