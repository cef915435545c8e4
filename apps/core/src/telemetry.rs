//! Tracing subscriber setup.

use crate::config::LogFormat;
use crate::error::AppError;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

const APP_NAME: &str = "wellness";

/// Installs the global subscriber. Logs are written to stderr; stdout belongs to the chat loop.
pub fn init_tracing(format: LogFormat) -> Result<(), AppError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match format {
        LogFormat::Json => {
            let subscriber = Registry::default()
                .with(env_filter)
                .with(JsonStorageLayer)
                .with(BunyanFormattingLayer::new(APP_NAME.to_string(), std::io::stderr));
            tracing::subscriber::set_global_default(subscriber)
        }
        LogFormat::Pretty => {
            let subscriber = Registry::default()
                .with(env_filter)
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr));
            tracing::subscriber::set_global_default(subscriber)
        }
    };

    result.map_err(|e| AppError::Internal(format!("Failed to install tracing subscriber: {}", e)))
}
