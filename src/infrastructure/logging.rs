use std::path::Path;

use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{
    Layer, Registry,
    filter::LevelFilter,
    fmt,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

use crate::config::{LogFormat, LoggingConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to create log directory {path}: {source}")]
    Directory {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to open log file: {0}")]
    Appender(#[from] InitError),

    #[error("Failed to install log subscriber: {0}")]
    Subscriber(#[from] TryInitError),
}

/// Keeps the background file writers alive; dropping it flushes the logs
#[derive(Debug, Default)]
pub struct LoggingGuard {
    _guards: Vec<WorkerGuard>,
}

/// Append-only, daily partitioned writers for the combined and error streams
pub struct FileWriters {
    pub combined: NonBlocking,
    pub errors: NonBlocking,
    guards: Vec<WorkerGuard>,
}

/// Open `combined.<date>.log` and `error.<date>.log` inside `directory`
pub fn open_file_writers(directory: &Path) -> Result<FileWriters, LoggingError> {
    std::fs::create_dir_all(directory).map_err(|source| LoggingError::Directory {
        path: directory.display().to_string(),
        source,
    })?;

    let (combined, combined_guard) = tracing_appender::non_blocking(daily_appender(directory, "combined")?);
    let (errors, errors_guard) = tracing_appender::non_blocking(daily_appender(directory, "error")?);

    Ok(FileWriters {
        combined,
        errors,
        guards: vec![combined_guard, errors_guard],
    })
}

fn daily_appender(directory: &Path, prefix: &str) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(directory)
}

pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut guard = LoggingGuard::default();

    if config.to_console {
        layers.push(match config.format {
            LogFormat::Json => fmt::layer().json().with_target(true).boxed(),
            LogFormat::Pretty => fmt::layer().pretty().with_target(true).boxed(),
        });
    }

    if config.to_file {
        let writers = open_file_writers(&config.directory)?;

        layers.push(
            fmt::layer()
                .with_writer(writers.combined)
                .with_ansi(false)
                .with_target(true)
                .boxed(),
        );
        layers.push(
            fmt::layer()
                .with_writer(writers.errors)
                .with_ansi(false)
                .with_target(true)
                .with_filter(LevelFilter::ERROR)
                .boxed(),
        );

        guard._guards = writers.guards;
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()?;

    tracing::info!(
        level = %config.level,
        to_console = config.to_console,
        to_file = config.to_file,
        directory = %config.directory.display(),
        "Logging initialized"
    );

    Ok(guard)
}
