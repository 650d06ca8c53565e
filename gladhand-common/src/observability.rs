//! Tracing initialisation shared by the bot binary and integration tests.
//!
//! Everything funnels into one daily-rolling log file; the interactive bot
//! additionally mirrors events to stderr so progress is visible while the
//! file keeps the full trail. Call [`init_logging`] once near process
//! start—additional callers are treated as no-ops and simply receive the
//! resolved log file path.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Output encoding for the log sinks.
#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Text,
    Json,
}

/// Configuration passed to [`init_logging`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Component name; names the log file and the default data directory.
    pub app_name: &'static str,
    /// Explicit log directory. When `None`, `GLADHAND_LOG_DIR` wins, then
    /// `~/.local/share/<app_name>`.
    pub log_dir: Option<PathBuf>,
    /// Mirror events to stderr. The bot enables this so the per-job progress
    /// lines reach the console.
    pub emit_stderr: bool,
    /// Encoding applied to every sink.
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is unset. The app maps the config's
    /// `verbose_logging` flag onto this.
    pub default_filter: &'static str,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "gladhand",
            log_dir: None,
            emit_stderr: false,
            format: LogFormat::Text,
            default_filter: "info",
        }
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Returns the concrete log file path for the current day. Subsequent calls
/// are cheap and simply hand back the originally resolved location.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = LOG_PATH.get() {
        return Ok(path.clone());
    }

    let dir = resolve_log_dir(config.app_name, config.log_dir.as_deref());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory: {}", dir.display()))?;

    let file_name = format!("{}.log", config.app_name);
    // rolling::daily appends the current date to the file name.
    let dated = dir.join(format!("{file_name}.{}", Local::now().format("%Y-%m-%d")));

    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&dir, &file_name));
    let _ = LOG_GUARD.set(guard);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.default_filter));

    let file_layer = match config.format {
        LogFormat::Text => fmt::layer().with_writer(writer).with_ansi(false).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    };
    let stderr_layer = config.emit_stderr.then(|| match config.format {
        LogFormat::Text => fmt::layer().with_writer(std::io::stderr).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    let _ = LOG_PATH.set(dated.clone());
    Ok(dated)
}

fn resolve_log_dir(app_name: &str, explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(expand_home)
        .or_else(|| {
            std::env::var("GLADHAND_LOG_DIR")
                .ok()
                .map(|dir| expand_home(Path::new(&dir)))
        })
        .unwrap_or_else(|| default_data_dir(app_name))
}

fn expand_home(path: &Path) -> PathBuf {
    match path.to_str().and_then(|s| s.strip_prefix("~/")) {
        Some(rest) => match std::env::var("HOME") {
            Ok(home) => PathBuf::from(home).join(rest),
            Err(_) => path.to_path_buf(),
        },
        None => path.to_path_buf(),
    }
}

fn default_data_dir(app_name: &str) -> PathBuf {
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(app_name),
        Err(_) => PathBuf::from(".").join(app_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_beats_the_environment() {
        temp_env::with_var("GLADHAND_LOG_DIR", Some("/tmp/from-env"), || {
            let dir = resolve_log_dir("gladhand", Some(Path::new("/tmp/explicit")));
            assert_eq!(dir, PathBuf::from("/tmp/explicit"));
        });
    }

    #[test]
    fn env_dir_beats_the_default() {
        temp_env::with_var("GLADHAND_LOG_DIR", Some("/tmp/from-env"), || {
            assert_eq!(
                resolve_log_dir("gladhand", None),
                PathBuf::from("/tmp/from-env")
            );
        });
    }

    #[test]
    fn tilde_paths_expand_against_home() {
        temp_env::with_var("HOME", Some("/home/recruit"), || {
            assert_eq!(
                expand_home(Path::new("~/gladhand-logs")),
                PathBuf::from("/home/recruit/gladhand-logs")
            );
            assert_eq!(expand_home(Path::new("/var/log")), PathBuf::from("/var/log"));
        });
    }

    #[test]
    fn default_dir_lands_in_local_share() {
        temp_env::with_var("HOME", Some("/home/recruit"), || {
            assert_eq!(
                default_data_dir("gladhand"),
                PathBuf::from("/home/recruit/.local/share/gladhand")
            );
        });
    }
}
