//! Console and file logging setup.
//!
//! # Configuration
//!
//! - `RUST_LOG`: Full filter directive; takes precedence when set
//! - `LOG_LEVEL`: Default level for Coursekit targets (default: "info")
//! - `LOG_FORMAT`: `compact` (default) or `json` for the console layer
//! - `LOG_DIR`: When set, structured JSON logs are also written to a daily
//!   rolling file `coursekit.json` in this directory

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Console output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
    pub dir: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            dir: None,
        }
    }
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self {
            level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match std::env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Compact,
            },
            dir: std::env::var("LOG_DIR")
                .ok()
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
        }
    }
}

/// Keeps the non-blocking file writer alive. Dropping it flushes pending
/// file logs.
pub struct LogGuard {
    _file: WorkerGuard,
}

/// Builds the filter for a layer, preferring `RUST_LOG` when present.
///
/// Noisy HTTP dependencies are held at `warn`.
pub fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{level},reqwest=warn,hyper=warn,hyper_util=warn,h2=warn"
        ))
    })
}

/// Installs the global tracing subscriber.
///
/// Returns a guard when file logging is active. If a subscriber is already
/// installed (tests, embedding hosts) the call leaves it in place.
pub fn init_tracing(config: &LogConfig) -> Option<LogGuard> {
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let console_layer = match config.format {
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(build_env_filter(&config.level))
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_filter(build_env_filter(&config.level))
            .boxed(),
    };
    layers.push(console_layer);

    let mut guard = None;
    if let Some(dir) = &config.dir {
        match std::fs::create_dir_all(dir) {
            Ok(()) => {
                let appender = RollingFileAppender::new(Rotation::DAILY, dir, "coursekit.json");
                let (writer, file_guard) = tracing_appender::non_blocking(appender);
                layers.push(
                    fmt::layer()
                        .json()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_current_span(true)
                        .with_span_list(true)
                        .with_filter(build_env_filter(&config.level))
                        .boxed(),
                );
                guard = Some(LogGuard { _file: file_guard });
            }
            Err(e) => {
                // Logging is not up yet; report on stderr and continue console-only.
                eprintln!(
                    "Failed to create log directory {}: {}. Continuing with console logging only",
                    dir.display(),
                    e
                );
            }
        }
    }

    if tracing_subscriber::registry().with(layers).try_init().is_err() {
        return None;
    }

    tracing::debug!(
        log.level = %config.level,
        log.file = config.dir.is_some(),
        "Tracing initialized"
    );

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Compact);
        assert!(config.dir.is_none());
    }

    #[test]
    fn test_second_init_is_harmless() {
        let config = LogConfig::default();
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_none());
    }
}
