//! Where log files go.
use std::fs;
use std::path::PathBuf;

/// Environment variable naming the log directory outright.
pub const LOG_DIR_ENV: &str = "ARBOR_LOG_DIR";

/// Directory for log files, created on demand.
///
/// `ARBOR_LOG_DIR` wins; otherwise `$XDG_CACHE_HOME/arbor`, then
/// `~/.cache/arbor`. Returns `None` if the directory cannot be created.
pub(super) fn log_dir() -> Option<PathBuf> {
    let dir = non_empty_var(LOG_DIR_ENV).unwrap_or_else(|| {
        non_empty_var("XDG_CACHE_HOME")
            .or_else(|| non_empty_var("HOME").map(|home| home.join(".cache")))
            .or_else(|| non_empty_var("USERPROFILE").map(|home| home.join(".cache")))
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("arbor")
    });
    fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

/// Log file of one subcommand: `<log dir>/<command>.log`.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    Some(log_dir()?.join(format!("{command}.log")))
}

fn non_empty_var(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
