// ABOUTME: Layer constructors for the console, rolled file, and JSON outputs
// ABOUTME: Each constructor returns a boxed layer so the subscriber can stack any subset

use anyhow::{Context, Result};
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, format::FmtSpan},
};

use crate::config::{FileConfig, LoggingConfig, OutputConfig};

pub type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Create a console output layer. Console output goes to stderr.
pub fn create_console_layer(config: &OutputConfig) -> Option<BoxedLayer> {
    if !config.console {
        return None;
    }

    let layer = if config.pretty_console {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .pretty()
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .boxed()
    };

    Some(layer)
}

/// Create a daily-rolled file layer.
///
/// The returned guard flushes the non-blocking writer when dropped and must
/// outlive every log call.
pub fn create_file_layer(config: &FileConfig) -> Result<(BoxedLayer, WorkerGuard)> {
    let directory = config
        .path
        .parent()
        .context("Log file path has no parent directory")?;

    fs::create_dir_all(directory).context(format!(
        "Failed to create log directory: {}",
        directory.display()
    ))?;

    let file_name = config
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .context("Invalid log file path")?;

    let file_appender = rolling::daily(directory, file_name);
    let (writer, guard) = non_blocking(file_appender);

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .boxed();

    Ok((layer, guard))
}

/// Create a JSON output layer for structured logging.
pub fn create_json_layer(config: &OutputConfig) -> Option<BoxedLayer> {
    if !config.json {
        return None;
    }

    let layer = fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_current_span(true)
        .boxed();

    Some(layer)
}

/// Create an environment filter from the logging configuration.
pub fn create_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let mut filter = EnvFilter::new(config.level.0.to_string());

    for (module, level) in &config.module_levels {
        filter = filter.add_directive(
            format!("{}={}", module, level.0)
                .parse()
                .context(format!("Invalid filter directive for module '{module}'"))?,
        );
    }

    Ok(filter)
}
