//! Process-wide tracing setup, configured once from the command line.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Verbosity and sinks for the process logger.
///
/// `RUST_LOG` still wins over the level chosen here.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Turns on debug output, including raw HTTP error bodies.
    pub debug: bool,
    /// Optional JSON log file in addition to stderr.
    pub log_file: Option<PathBuf>,
}

impl LogConfig {
    /// Picks up the JSON log file from `LOG_FILE_PATH`, if set.
    pub fn from_env(debug: bool) -> Self {
        Self {
            debug,
            log_file: std::env::var_os("LOG_FILE_PATH").map(PathBuf::from),
        }
    }

    pub fn level(&self) -> LevelFilter {
        if self.debug {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::builder()
            .with_default_directive(self.level().into())
            .from_env_lossy()
    }

    /// Installs the global subscriber. Keep the returned guard alive until
    /// exit so buffered file output gets flushed.
    pub fn init(&self) -> Result<Option<WorkerGuard>> {
        let stderr_layer = fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(self.filter());

        let (json_layer, guard) = match &self.log_file {
            Some(path) => {
                let dir = path.parent().unwrap_or(Path::new("."));
                let file_name = path.file_name().unwrap_or(OsStr::new("aws-creds-sync.log"));
                let appender = tracing_appender::rolling::never(dir, file_name);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(writer)
                    .with_filter(self.filter());
                (Some(layer), Some(guard))
            }
            None => (None, None),
        };

        tracing_subscriber::registry()
            .with(stderr_layer)
            .with(json_layer)
            .try_init()?;

        Ok(guard)
    }
}
