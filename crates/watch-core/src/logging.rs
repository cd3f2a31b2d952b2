//! Logging initialization for trainwatch hosts

use serde::{Deserialize, Serialize};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter used when RUST_LOG is not set (e.g. "info")
    pub level: String,

    /// Output format: "pretty" or "json"
    pub format: String,

    /// Include the event's target module in output
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            show_target: false,
        }
    }
}

/// Initialize logging and tracing for the owning process.
///
/// RUST_LOG takes precedence over the configured level. Calling this more
/// than once is a no-op rather than a panic, so tests and shutdown-racing
/// callers can invoke it freely.
pub fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.show_target);

    let result = match config.format.as_str() {
        "json" => subscriber.json().try_init(),
        _ => subscriber.try_init(),
    };

    if let Err(e) = result {
        tracing::debug!("logging already initialized: {}", e);
    }
}
