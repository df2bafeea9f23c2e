use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "launcher.log";
const LOG_FILTER: &str = "info";

pub fn logs_dir(root: &Path) -> PathBuf {
    root.join("logs")
}

/// Keeps the background log writer alive; dropping it flushes pending lines.
pub struct LogGuard {
    pub path: PathBuf,
    _worker: WorkerGuard,
}

pub fn init(root: &Path) -> Result<LogGuard> {
    let (writer, guard) = open_log_writer(root)?;
    // A subscriber may already be installed (tests); the file is still ours.
    let _ = tracing::subscriber::set_global_default(subscriber(writer));
    Ok(guard)
}

fn open_log_writer(root: &Path) -> Result<(NonBlocking, LogGuard)> {
    let dir = logs_dir(root);
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    let log_path = dir.join(LOG_FILE_NAME);
    let _file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("open {}", log_path.display()))?;

    let appender = tracing_appender::rolling::never(&dir, LOG_FILE_NAME);
    let (writer, worker) = tracing_appender::non_blocking(appender);
    Ok((
        writer,
        LogGuard {
            path: log_path,
            _worker: worker,
        },
    ))
}

/// Fixed `info` filter; the environment has no say in what gets logged.
fn subscriber(writer: NonBlocking) -> impl tracing::Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(LOG_FILTER))
        .with_writer(writer)
        .with_ansi(false)
        .finish()
}
