//! Diagnostics output for the kiosk process.
//!
//! The console simulator owns the terminal, so it only ever logs to a file.
//! On the device the process usually runs under a service manager that
//! collects stderr, which is the fallback when no file is configured.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{HardwareMode, LoggingConfig};

/// Environment variable naming the log file. Takes precedence over
/// `logging.file`.
pub const LOG_ENV: &str = "VOUCHER_KIOSK_LOG";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to create log file '{path}': {source}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to install log subscriber: {0}")]
    Install(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    Off,
    Stderr,
    /// Already stamped with start time and PID.
    File(PathBuf),
}

impl LogSink {
    /// Picks the destination. `env_file` is the value of [`LOG_ENV`].
    pub fn choose(
        logging: &LoggingConfig,
        mode: HardwareMode,
        env_file: Option<PathBuf>,
        started: SystemTime,
    ) -> Self {
        match env_file.or_else(|| logging.file.clone()) {
            Some(base) => LogSink::File(stamped(&base, started, std::process::id())),
            None if mode == HardwareMode::Device => LogSink::Stderr,
            None => LogSink::Off,
        }
    }
}

/// `{base}.{unix seconds}.{pid}`, so restarts never truncate an earlier log.
pub fn stamped(base: &Path, started: SystemTime, pid: u32) -> PathBuf {
    let secs = started
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let mut name = base.as_os_str().to_os_string();
    name.push(format!(".{}.{}", secs, pid));
    PathBuf::from(name)
}

/// `RUST_LOG` wins over the configured directives.
fn filter(logging: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber and returns where it writes.
pub fn init_tracing(logging: &LoggingConfig, mode: HardwareMode) -> Result<LogSink, LoggingError> {
    let env_file = std::env::var_os(LOG_ENV).map(PathBuf::from);
    let sink = LogSink::choose(logging, mode, env_file, SystemTime::now());

    let writer = match &sink {
        LogSink::Off => None,
        LogSink::Stderr => Some(BoxMakeWriter::new(std::io::stderr)),
        LogSink::File(path) => {
            let file = File::create(path).map_err(|source| LoggingError::CreateFile {
                path: path.clone(),
                source,
            })?;
            Some(BoxMakeWriter::new(Mutex::new(file)))
        }
    };
    let Some(writer) = writer else {
        return Ok(sink);
    };

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter(logging))
        .with(layer)
        .try_init()
        .map_err(|e| LoggingError::Install(e.to_string()))?;
    Ok(sink)
}
