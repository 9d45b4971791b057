//! Shared configuration, catalog, and domain types for the trending collector.

pub mod app_config;
pub mod catalog;
pub mod config;
pub mod trending;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use catalog::{category_name, is_known_category, is_known_region, CATEGORIES, REGIONS};
pub use config::{load_app_config, load_app_config_from_env};
pub use trending::{
    engagement_rate, truncate_chars, CollectionScope, CollectionSummary, TrendingItem,
    DESCRIPTION_MAX_CHARS,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
