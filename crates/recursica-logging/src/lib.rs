// ABOUTME: Public API for Recursica logging infrastructure using tokio-tracing
// ABOUTME: Provides centralized configuration and initialization for structured logging

pub mod config;
pub mod layers;
pub mod performance;
pub mod subscriber;


// Re-export tracing macros so downstream crates log through one facade
pub use tracing::{Level, Span, debug, error, info, instrument, span, trace, warn};

pub use config::{LogLevel, LoggingConfig};
pub use performance::PerfTimer;
pub use subscriber::init_subscriber;

use anyhow::Result;

/// Initialize logging with the default configuration plus environment overrides.
pub fn init_logging() -> Result<()> {
    init_subscriber(LoggingConfig::from_env()?)
}

/// Initialize logging with a custom configuration.
pub fn init_logging_with_config(config: LoggingConfig) -> Result<()> {
    init_subscriber(config)
}
