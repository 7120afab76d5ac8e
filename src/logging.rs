//! logging
//!
//! Structured logging setup.
//!
//! Log lines go to standard error with the time elapsed since startup.
//! Colours are used only when standard error is a terminal. An optional log
//! file receives the same events without colours.
//!
//! `RUST_LOG` overrides the configured level, e.g. `RUST_LOG=vrachos=trace`.

use std::fs::{self, File, OpenOptions};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::uptime;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Errors from installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to open log file '{path}': {source}")]
    OpenFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("logging is already initialized: {0}")]
    Init(#[from] TryInitError),
}

/// How logging should be set up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LevelFilter,
    /// Also append to this file
    pub file: Option<PathBuf>,
    /// Colours on standard error; `None` detects a terminal
    pub ansi: Option<bool>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: LevelFilter::WARN,
            file: None,
            ansi: None,
        }
    }
}

impl LogSettings {
    /// Level from the usual `--verbose`/`--debug` pair.
    pub fn from_flags(verbose: bool, debug: bool) -> Self {
        let level = if debug {
            LevelFilter::DEBUG
        } else if verbose {
            LevelFilter::INFO
        } else {
            LevelFilter::WARN
        };
        Self {
            level,
            ..Self::default()
        }
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails if the log file cannot be opened or a subscriber is already set.
pub fn init(settings: &LogSettings) -> Result<(), LoggingError> {
    let filter = EnvFilter::builder()
        .with_default_directive(settings.level.into())
        .from_env_lossy();

    let ansi = settings
        .ansi
        .unwrap_or_else(|| std::io::stderr().is_terminal());
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(uptime())
        .with_target(false)
        .with_ansi(ansi);

    let file_layer = match &settings.file {
        Some(path) => {
            let file = open_log_file(path)?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_timer(uptime())
                    .with_ansi(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    tracing::debug!(level = %settings.level, file = ?settings.file, "logging initialized");
    Ok(())
}

fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| LoggingError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::OpenFile {
            path: path.to_path_buf(),
            source,
        })
}
