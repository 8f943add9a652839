//! Logging setup
//!
//! Console output always. With `logging.dir` set, also writes daily-rolling
//! files under that directory, split by log type:
//! - main/ - everything, JSON
//! - error/ - WARN and above
//! - generator/ - generation cycles
//! - api/ - request handling

use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::infrastructure::config::LoggingConfig;

/// Log types with their own file when file logging is enabled
pub const LOG_TYPES: [&str; 4] = ["main", "error", "generator", "api"];

/// Initialize logging
///
/// Returns the appender guards, which must be kept alive for the duration
/// of the program. Empty when file logging is disabled. Fails if a global
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> std::io::Result<Vec<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let Some(dir) = &config.dir else {
        tracing_subscriber::registry()
            .with(filter)
            .with(console_layer())
            .try_init()
            .map_err(std::io::Error::other)?;
        return Ok(Vec::new());
    };

    create_log_dirs(dir)?;

    let mut guards = Vec::new();

    let (main_appender, main_guard) = create_appender(dir, "main");
    guards.push(main_guard);

    let (error_appender, error_guard) = create_appender(dir, "error");
    guards.push(error_guard);

    let (generator_appender, generator_guard) = create_appender(dir, "generator");
    guards.push(generator_guard);

    let (api_appender, api_guard) = create_appender(dir, "api");
    guards.push(api_guard);

    let main_layer = tracing_subscriber::fmt::layer()
        .with_writer(main_appender)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_thread_names(true)
        .json();

    let error_layer = tracing_subscriber::fmt::layer()
        .with_writer(error_appender)
        .with_ansi(false)
        .with_target(true)
        .with_filter(tracing_subscriber::filter::LevelFilter::WARN);

    let generator_layer = tracing_subscriber::fmt::layer()
        .with_writer(generator_appender)
        .with_ansi(false)
        .with_target(true)
        .with_filter(tracing_subscriber::filter::filter_fn(|metadata| {
            metadata.target().contains("generator")
        }));

    let api_layer = tracing_subscriber::fmt::layer()
        .with_writer(api_appender)
        .with_ansi(false)
        .with_target(true)
        .with_filter(tracing_subscriber::filter::filter_fn(|metadata| {
            metadata.target().contains("api") || metadata.target().contains("tower_http")
        }));

    tracing_subscriber::registry()
        .with(filter)
        .with(main_layer)
        .with(error_layer)
        .with(generator_layer)
        .with(api_layer)
        .with(console_layer())
        .try_init()
        .map_err(std::io::Error::other)?;

    tracing::info!("Logging initialized, log files in {}", dir.display());

    Ok(guards)
}

/// Stdout layer shared by both setups
fn console_layer<S>() -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true)
}

/// Create `dir` and one subdirectory per log type
pub fn create_log_dirs(dir: &Path) -> std::io::Result<()> {
    for log_type in LOG_TYPES {
        fs::create_dir_all(dir.join(log_type))?;
    }
    Ok(())
}

fn create_appender(dir: &Path, name: &str) -> (NonBlocking, WorkerGuard) {
    let appender = RollingFileAppender::new(Rotation::DAILY, dir.join(name), name);
    tracing_appender::non_blocking(appender)
}

/// Log macro helpers for specific log types
#[macro_export]
macro_rules! log_generator {
    ($level:expr, $($arg:tt)+) => {
        tracing::event!(target: "generator", $level, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_api {
    ($level:expr, $($arg:tt)+) => {
        tracing::event!(target: "api", $level, $($arg)+)
    };
}
