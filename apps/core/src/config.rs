//! Runtime configuration, read from the environment (and an optional `.env` file).

use crate::error::AppError;
use crate::fs_manager::PortablePathManager;
use std::env;
use std::str::FromStr;

pub const DATABASE_URL_ENV: &str = "WELLNESS_DATABASE_URL";
pub const LOG_FORMAT_ENV: &str = "WELLNESS_LOG_FORMAT";
pub const SEED_CONTENT_ENV: &str = "WELLNESS_SEED_CONTENT";
pub const RNG_SEED_ENV: &str = "WELLNESS_RNG_SEED";
pub const USER_NAME_ENV: &str = "WELLNESS_USER_NAME";
pub const USER_EMAIL_ENV: &str = "WELLNESS_USER_EMAIL";

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Pretty,
    /// Bunyan-style JSON records.
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" | "bunyan" => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!(
                "{} must be 'pretty' or 'json', got '{}'",
                LOG_FORMAT_ENV, other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub log_format: LogFormat,
    /// Insert the starter content library when the content table is empty.
    pub seed_content: bool,
    /// Fixed seed for the response selector; entropy-seeded when absent.
    pub rng_seed: Option<u64>,
    pub user_name: String,
    pub user_email: String,
}

impl AppConfig {
    /// Loads `.env` (if any) and then reads the configuration from the environment.
    pub fn load() -> Result<Self, AppError> {
        // A missing .env file is the normal case.
        let _ = dotenv::dotenv();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, AppError> {
        let database_url = non_empty_var(DATABASE_URL_ENV)
            .unwrap_or_else(PortablePathManager::default_database_url);

        let log_format = match non_empty_var(LOG_FORMAT_ENV) {
            Some(value) => value.parse()?,
            None => LogFormat::Pretty,
        };

        let seed_content = match non_empty_var(SEED_CONTENT_ENV) {
            Some(value) => parse_bool(SEED_CONTENT_ENV, &value)?,
            None => true,
        };

        let rng_seed = match non_empty_var(RNG_SEED_ENV) {
            Some(value) => Some(value.trim().parse::<u64>().map_err(|e| {
                AppError::Config(format!("{} must be an unsigned integer: {}", RNG_SEED_ENV, e))
            })?),
            None => None,
        };

        Ok(Self {
            database_url,
            log_format,
            seed_content,
            rng_seed,
            user_name: non_empty_var(USER_NAME_ENV).unwrap_or_else(|| "Local User".to_string()),
            user_email: non_empty_var(USER_EMAIL_ENV)
                .unwrap_or_else(|| "local@wellness.local".to_string()),
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, AppError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(AppError::Config(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}
