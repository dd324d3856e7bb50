use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use chrono::Utc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Where log lines go.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LogKind {
    /// Standard error, so that reports printed on stdout stay parseable.
    Console,

    /// A file in the temp directory named `armlet-<timestamp>.log`.
    File,
}

pub fn log_file_path() -> PathBuf {
    let filename = format!("armlet-{}.log", Utc::now().timestamp());
    std::env::temp_dir().join(filename)
}

/// Installs the global subscriber. `RUST_LOG` overrides the default `info` filter.
///
/// The returned guard flushes the file writer on drop and must be kept alive
/// until the program exits.
pub fn init(kind: LogKind) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match kind {
        LogKind::Console => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow!("failed to install logger: {e}"))?;
            Ok(None)
        }
        LogKind::File => {
            let path = log_file_path();
            let file = File::create(&path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(writer)
                .try_init()
                .map_err(|e| anyhow!("failed to install logger: {e}"))?;

            eprintln!("Logging to file: {}", path.display());
            Ok(Some(guard))
        }
    }
}
