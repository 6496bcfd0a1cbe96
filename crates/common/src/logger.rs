use crate::error::CourseRecError;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Log file name inside the configured log directory
pub const LOG_FILE_NAME: &str = "courserec.log";

/// Build the filter: `RUST_LOG` takes precedence over the configured level
fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(parse_log_level(log_level).as_str()))
}

/// Initialize logging to console and to `<log_dir>/courserec.log`
///
/// Returns the path of the log file.
///
/// # Arguments
/// * `log_dir` - Directory where the log file is kept (created if missing)
/// * `log_level` - Log level (trace, debug, info, warn, error); `RUST_LOG` overrides it
///
/// # Errors
/// `Config` when the directory or file cannot be opened, or when a global
/// subscriber is already installed
pub fn setup_logging(log_dir: &Path, log_level: &str) -> Result<PathBuf, CourseRecError> {
    // Create log directory
    std::fs::create_dir_all(log_dir).map_err(|e| {
        CourseRecError::config(format!(
            "Failed to create log directory {}: {}",
            log_dir.display(),
            e
        ))
    })?;

    // Log file path (append across restarts)
    let log_file_path = log_dir.join(LOG_FILE_NAME);
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
        .map_err(|e| {
            CourseRecError::config(format!(
                "Failed to open log file {}: {}",
                log_file_path.display(),
                e
            ))
        })?;

    // Console output layer
    let console_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(env_filter(log_level));

    // File output layer
    let file_layer = fmt::layer()
        .with_writer(log_file)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_ansi(false) // no color codes in files
        .with_filter(env_filter(log_level));

    // Initialize subscriber
    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| CourseRecError::config(format!("Logging already initialized: {}", e)))?;

    tracing::info!(
        "Logging initialized: level={}, log_file={}",
        log_level,
        log_file_path.display()
    );

    Ok(log_file_path)
}

/// Console-only logging for CLI one-shot commands
///
/// Writes to stderr so command output on stdout stays machine readable.
///
/// # Arguments
/// * `log_level` - Log level (trace, debug, info, warn, error); `RUST_LOG` overrides it
pub fn setup_console_logging(log_level: &str) -> Result<(), CourseRecError> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(env_filter(log_level))
        .try_init()
        .map_err(|e| CourseRecError::config(format!("Logging already initialized: {}", e)))?;

    tracing::debug!("Console logging initialized: level={}", log_level);

    Ok(())
}

/// Parse string to tracing Level
pub fn parse_log_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to INFO", level);
            Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("trace"), Level::TRACE);
        assert_eq!(parse_log_level("debug"), Level::DEBUG);
        assert_eq!(parse_log_level("info"), Level::INFO);
        assert_eq!(parse_log_level("warn"), Level::WARN);
        assert_eq!(parse_log_level("error"), Level::ERROR);
        assert_eq!(parse_log_level("invalid"), Level::INFO);
    }

    #[test]
    fn test_parse_log_level_case_insensitive() {
        assert_eq!(parse_log_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_log_level("Warning"), Level::WARN);
    }

    #[test]
    fn test_setup_logging_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("log");

        // A global subscriber may already be installed by another test;
        // the log file is opened before installation either way.
        let _ = setup_logging(&log_dir, "debug");
        assert!(log_dir.join(LOG_FILE_NAME).exists());
    }
}
