use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tauri::{App, Manager};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "chatshell.log";
/// Files above this are cut back to their newest `LOG_KEEP_BYTES`.
const LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;
const LOG_KEEP_BYTES: usize = 1024 * 1024;

/// Keeps the tail of an oversized log, starting at a line boundary.
fn cap_log_file(path: &Path, max: u64, keep: usize) -> io::Result<()> {
    let len = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };
    if len <= max {
        return Ok(());
    }
    let data = fs::read(path)?;
    let mut start = data.len().saturating_sub(keep);
    if start > 0 && data[start - 1] != b'\n' {
        start = match data[start..].iter().position(|b| *b == b'\n') {
            Some(pos) => start + pos + 1,
            None => data.len(),
        };
    }
    fs::write(path, &data[start..])
}

fn open_log_file(dir: &Path) -> anyhow::Result<(PathBuf, File)> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(LOG_FILE);
    if let Err(err) = cap_log_file(&path, LOG_MAX_BYTES, LOG_KEEP_BYTES) {
        eprintln!("failed to trim {}: {err}", path.display());
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    Ok((path, file))
}

/// File logging under the app log dir; returns the log path.
pub fn init_logging(app: &App) -> anyhow::Result<PathBuf> {
    let dir = app
        .path()
        .app_log_dir()
        .context("failed to resolve log directory")?;
    let (path, file) = open_log_file(&dir)?;

    // The writer lives for the whole process.
    let (writer, guard) = tracing_appender::non_blocking(file);
    std::mem::forget(guard);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(filter)
        .with_ansi(false)
        .try_init()
        .ok();

    std::panic::set_hook(Box::new(|panic| {
        error!("panic: {panic}");
    }));

    info!(path = %path.display(), "file logging ready");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_log_keeps_newest_whole_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(LOG_FILE);
        let mut data = String::new();
        for i in 0..200 {
            data.push_str(&format!("line {i:04}\n"));
        }
        fs::write(&path, &data).unwrap();

        cap_log_file(&path, 1000, 100).unwrap();
        let kept = fs::read_to_string(&path).unwrap();

        assert!(kept.len() <= 100);
        assert!(kept.starts_with("line "));
        assert!(kept.ends_with("line 0199\n"));
    }

    #[test]
    fn small_or_missing_log_is_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(LOG_FILE);
        cap_log_file(&path, 1000, 100).unwrap();
        assert!(!path.exists());

        fs::write(&path, "short\n").unwrap();
        cap_log_file(&path, 1000, 100).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "short\n");
    }

    #[test]
    fn log_file_is_created_with_its_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let (path, _file) = open_log_file(&tmp.path().join("logs")).unwrap();
        assert!(path.exists());
        assert!(path.ends_with(LOG_FILE));
    }
}
