//! Shared logging utilities for Tagpath binaries.
//!
//! Logs go to a size-rotated file under `~/.tagpath/logs` and to stderr. Stdout stays
//! free for command output (tables, JSON).

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "tagpath=info,tagpath_rules=info";
const QUIET_CONSOLE_FILTER: &str = "warn";
const MAX_LOG_FILES: usize = 5;
const MAX_LOG_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Logging configuration shared by Tagpath binaries.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
}

/// Initialize tracing with a size-rotated log file and stderr output.
///
/// When the log file cannot be opened only the stderr layer is installed, and the reason
/// is reported through it once the subscriber is live.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let env_or = |fallback: &str| {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
    };

    let console_filter = if config.verbose {
        env_or(DEFAULT_LOG_FILTER)
    } else {
        env_or(QUIET_CONSOLE_FILTER)
    };

    let (file_log, file_error) = match open_file_log(config.app_name) {
        Ok(log) => (Some(log), None),
        Err(err) => (None, Some(err)),
    };

    let file_layer = file_log.map(|log| {
        tracing_subscriber::fmt::layer()
            .with_writer(Mutex::new(log))
            .with_ansi(false)
            .with_filter(env_or(DEFAULT_LOG_FILTER))
    });

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if let Some(err) = file_error {
        tracing::warn!("File logging disabled: {:#}", err);
    }
    Ok(())
}

/// Get the Tagpath home directory: ~/.tagpath
///
/// `TAGPATH_HOME` overrides the location.
pub fn tagpath_home() -> PathBuf {
    if let Ok(override_path) = std::env::var("TAGPATH_HOME") {
        return PathBuf::from(override_path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".tagpath")
}

/// Get the logs directory: ~/.tagpath/logs
pub fn logs_dir() -> PathBuf {
    tagpath_home().join("logs")
}

/// Ensure the logs directory exists.
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir();
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}

fn open_file_log(app_name: &str) -> Result<SizeRotatingLog> {
    let dir = ensure_logs_dir()?;
    SizeRotatingLog::open(&dir, app_name, MAX_LOG_FILES, MAX_LOG_FILE_SIZE)
        .with_context(|| format!("Failed to open log file in {}", dir.display()))
}

/// Append-only log file that rolls over once it reaches `limit` bytes.
///
/// Generation 0 is `<stem>.log`; older generations are `<stem>.log.1` up to
/// `<stem>.log.{keep - 1}`.
struct SizeRotatingLog {
    dir: PathBuf,
    stem: String,
    keep: usize,
    limit: u64,
    active: File,
    written: u64,
}

impl SizeRotatingLog {
    fn open(dir: &Path, app_name: &str, keep: usize, limit: u64) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let stem = sanitize_name(app_name);
        let (active, written) = open_append(&generation_path(dir, &stem, 0))?;

        let mut log = Self {
            dir: dir.to_path_buf(),
            stem,
            keep: keep.max(1),
            limit,
            active,
            written,
        };
        if log.written > log.limit {
            log.roll()?;
        }
        Ok(log)
    }

    fn generation(&self, n: usize) -> PathBuf {
        generation_path(&self.dir, &self.stem, n)
    }

    /// Shift every generation up by one and start a fresh active file.
    fn roll(&mut self) -> io::Result<()> {
        self.active.flush()?;

        let oldest = self.generation(self.keep - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for n in (0..self.keep - 1).rev() {
            let from = self.generation(n);
            if from.exists() {
                fs::rename(&from, self.generation(n + 1))?;
            }
        }

        let (active, written) = open_append(&self.generation(0))?;
        self.active = active;
        self.written = written;
        Ok(())
    }
}

impl Write for SizeRotatingLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.limit {
            self.roll()?;
        }
        let bytes = self.active.write(buf)?;
        self.written += bytes as u64;
        Ok(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.active.flush()
    }
}

fn generation_path(dir: &Path, stem: &str, n: usize) -> PathBuf {
    if n == 0 {
        dir.join(format!("{}.log", stem))
    } else {
        dir.join(format!("{}.log.{}", stem, n))
    }
}

fn open_append(path: &Path) -> io::Result<(File, u64)> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let size = file.metadata()?.len();
    Ok((file, size))
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn sanitizes_app_names() {
        assert_eq!(sanitize_name("tagpath"), "tagpath");
        assert_eq!(sanitize_name("tag path/cli"), "tag_path_cli");
    }

    #[test]
    fn rolls_generations_when_limit_reached() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        let mut log = SizeRotatingLog::open(dir, "tagpath", 3, 16).unwrap();

        log.write_all(b"0123456789").unwrap();
        log.write_all(b"abcdefghij").unwrap();
        log.write_all(b"ABCDEFGHIJ").unwrap();
        log.flush().unwrap();

        assert_eq!(fs::read_to_string(dir.join("tagpath.log")).unwrap(), "ABCDEFGHIJ");
        assert_eq!(fs::read_to_string(dir.join("tagpath.log.1")).unwrap(), "abcdefghij");
        assert_eq!(fs::read_to_string(dir.join("tagpath.log.2")).unwrap(), "0123456789");
        assert!(!dir.join("tagpath.log.3").exists());
    }

    #[test]
    fn single_generation_truncates_in_place() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        let mut log = SizeRotatingLog::open(dir, "tagpath", 1, 8).unwrap();

        log.write_all(b"first!").unwrap();
        log.write_all(b"second").unwrap();
        log.flush().unwrap();

        assert_eq!(fs::read_to_string(dir.join("tagpath.log")).unwrap(), "second");
        assert!(!dir.join("tagpath.log.1").exists());
    }

    #[test]
    fn init_logging_falls_back_to_stderr_when_home_is_unwritable() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("not-a-directory");
        fs::write(&blocker, b"").unwrap();
        std::env::set_var("TAGPATH_HOME", blocker.join("home"));

        assert!(ensure_logs_dir().is_err());
        init_logging(LogConfig {
            app_name: "tagpath",
            verbose: false,
        })
        .unwrap();
        tracing::warn!("stderr logging still works");
    }
}
