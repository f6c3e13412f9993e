//! `tracing` initialization.
//!
//! Level precedence: `config.logging.level` > `RUST_LOG` env var > `"info"`.
//! Format (json/text) and an optional rolling file layer are selected from config.

use crate::config::{Config, LogFormat};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_with_config(config: &Config) {
    let filter = config
        .logging
        .level
        .clone()
        .map(EnvFilter::new)
        .unwrap_or_else(|| {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
        });

    match config.logging.format {
        LogFormat::Json => init_json_logging(filter, config),
        LogFormat::Text => init_text_logging(filter, config),
    }
}

fn init_json_logging(filter: EnvFilter, config: &Config) {
    let stdout_layer = fmt::layer()
        .json()
        .with_timer(UtcTime::rfc_3339())
        .with_target(true);

    if let Some(guard) = file_logging_guard(config) {
        let file_layer = fmt::layer()
            .json()
            .with_ansi(false)
            .with_timer(UtcTime::rfc_3339())
            .with_writer(guard.writer.clone());
        tracing_subscriber::registry()
            .with(filter)
            .with(stdout_layer)
            .with(file_layer)
            .init();
        Box::leak(Box::new(guard));
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stdout_layer)
            .init();
    }
}

fn init_text_logging(filter: EnvFilter, config: &Config) {
    let stdout_layer = fmt::layer().with_timer(UtcTime::rfc_3339()).with_target(true);

    if let Some(guard) = file_logging_guard(config) {
        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_timer(UtcTime::rfc_3339())
            .with_writer(guard.writer.clone());
        tracing_subscriber::registry()
            .with(filter)
            .with(stdout_layer)
            .with(file_layer)
            .init();
        Box::leak(Box::new(guard));
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stdout_layer)
            .init();
    }
}

struct FileLoggingGuard {
    writer: tracing_appender::non_blocking::NonBlocking,
    #[allow(dead_code)]
    guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Builds the non-blocking rolling-file writer when `logging.enable_file_logging` is
/// set. The returned guard must be leaked by the caller: it has to live for the
/// process lifetime, and `init_with_config` runs exactly once at startup.
fn file_logging_guard(config: &Config) -> Option<FileLoggingGuard> {
    if !config.logging.enable_file_logging {
        return None;
    }

    let rotation = match config.logging.rotation.as_str() {
        "minutely" => tracing_appender::rolling::Rotation::MINUTELY,
        "hourly" => tracing_appender::rolling::Rotation::HOURLY,
        "never" => tracing_appender::rolling::Rotation::NEVER,
        _ => tracing_appender::rolling::Rotation::DAILY,
    };

    let appender = tracing_appender::rolling::RollingFileAppender::new(
        rotation,
        &config.logging.log_dir,
        &config.logging.log_filename,
    );
    let (writer, guard) = tracing_appender::non_blocking(appender);
    Some(FileLoggingGuard { writer, guard })
}
