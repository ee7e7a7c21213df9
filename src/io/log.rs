use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::Dispatch;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "log";
const LOG_ENV: &str = "SIFT_LOG";
const DEFAULT_FILTER: &str = "sift=info";
/// Rotate to `log.1` once the log grows past this
const MAX_LOG_BYTES: u64 = 1024 * 1024;

pub fn log_path(log_dir: &Path) -> PathBuf {
    log_dir.join(LOG_FILE)
}

/// Build the logging dispatcher writing to `<log_dir>/log`.
///
/// The terminal belongs to the TUI, so nothing is ever written to stderr.
/// If the file can't be opened, logging is off.
pub fn build_dispatch(log_dir: &Path) -> Dispatch {
    match open_log(log_dir) {
        Ok(file) => {
            let filter = EnvFilter::try_from_env(LOG_ENV)
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false)
                .finish();
            Dispatch::new(subscriber)
        }
        Err(_) => Dispatch::none(),
    }
}

fn open_log(log_dir: &Path) -> Result<fs::File, std::io::Error> {
    fs::create_dir_all(log_dir)?;
    let path = log_path(log_dir);
    if fs::metadata(&path).is_ok_and(|m| m.len() > MAX_LOG_BYTES) {
        fs::rename(&path, log_dir.join(format!("{}.1", LOG_FILE)))?;
    }
    OpenOptions::new().create(true).append(true).open(&path)
}
