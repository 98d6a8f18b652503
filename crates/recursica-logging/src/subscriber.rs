// ABOUTME: Tracing subscriber initialization and layer composition
// ABOUTME: Stacks the filter with the configured console, file, and JSON layers

use anyhow::{Context, Result};
use parking_lot::Mutex;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{Layer, prelude::*, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::layers::{
    BoxedLayer, create_console_layer, create_env_filter, create_file_layer, create_json_layer,
};

/// Keeps the non-blocking file writer alive for the life of the process.
static FILE_GUARD: Mutex<Option<WorkerGuard>> = Mutex::new(None);

/// Assemble every layer the configuration asks for, filter first.
pub(crate) fn build_layers(config: &LoggingConfig) -> Result<(Vec<BoxedLayer>, Option<WorkerGuard>)> {
    let env_filter = create_env_filter(config).context("Failed to create environment filter")?;
    let mut layers: Vec<BoxedLayer> = vec![env_filter.boxed()];
    let mut guard = None;

    if let Some(console) = create_console_layer(&config.output) {
        layers.push(console);
    }

    if config.output.file {
        let (file_layer, file_guard) = create_file_layer(&config.file)?;
        layers.push(file_layer);
        guard = Some(file_guard);
    }

    if let Some(json) = create_json_layer(&config.output) {
        layers.push(json);
    }

    Ok((layers, guard))
}

/// Initialize the global tracing subscriber with the given configuration.
pub fn init_subscriber(config: LoggingConfig) -> Result<()> {
    let (layers, guard) = build_layers(&config)?;

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    if let Some(guard) = guard {
        *FILE_GUARD.lock() = Some(guard);
    }

    tracing::debug!(
        log_level = %config.level.0,
        console_output = config.output.console,
        file_output = config.output.file,
        json_output = config.output.json,
        file_path = %config.file.path.display(),
        "Recursica logging initialized"
    );

    Ok(())
}
