//! Logging infrastructure.
//!
//! Structured logging over `tracing`, with a non-blocking file writer
//! and optional stdout mirroring. Filtering follows `RUST_LOG`, with
//! `info` as the default.

use std::fs;
use std::io;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Where log output goes.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directory for the log file; created if missing.
    pub dir: PathBuf,
    /// Log file name inside `dir`.
    pub file: String,
    /// Also mirror log lines to stdout.
    pub stdout: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            file: "tradepost.log".to_string(),
            stdout: false,
        }
    }
}

/// Keeps the non-blocking file writer alive.
///
/// Dropping the guard flushes and closes the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Install the global subscriber.
///
/// Truncates the previous session's log file, then logs to it through
/// a non-blocking writer (and to stdout when configured). May only be
/// called once per process.
///
/// # Errors
///
/// Returns an error when the log directory cannot be created or the
/// file cannot be truncated.
pub fn init(config: &LogConfig) -> Result<LoggingGuard, io::Error> {
    fs::create_dir_all(&config.dir)?;
    let path = config.dir.join(&config.file);
    fs::write(&path, "")?;

    let appender = tracing_appender::rolling::never(&config.dir, &config.file);
    let (file_writer, file_guard) = tracing_appender::non_blocking(appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .compact();

    let stdout_layer = config.stdout.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stdout)
            .compact()
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.dir, PathBuf::from("logs"));
        assert_eq!(config.file, "tradepost.log");
        assert!(!config.stdout);
    }

    // init() installs a process-global subscriber and can only run
    // once, so actual output is exercised manually / by the CLI.
}
