//! Structured logger with dry-run awareness and summary collection.
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use super::subscriber::{DRY_RUN, STAGE, STEP};
use super::types::{Level, Log, StepEntry, StepStatus};
use super::utils::log_file_path;

/// Structured logger with dry-run awareness and summary collection.
///
/// Every message becomes a [`tracing`] event. The subscriber installed by
/// [`init_subscriber`](super::subscriber::init_subscriber) decides where it
/// lands: the console (filtered by `--verbose`) and the persistent log file
/// under the log directory (`ARBOR_LOG_DIR`, else
/// `$XDG_CACHE_HOME/arbor`), which always receives `debug`.
#[derive(Debug)]
pub struct Logger {
    steps: Mutex<Vec<StepEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger for `command`.
    ///
    /// Only remembers the log file path for the summary; the file itself is
    /// opened by the subscriber.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            steps: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Return the log file path, if available.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded step entries.
    #[must_use]
    pub fn step_entries(&self) -> Vec<StepEntry> {
        self.steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Count the number of failed steps.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|s| s.status == StepStatus::Failed)
            .count()
    }

    /// Log the summary of all recorded steps.
    ///
    /// Each step becomes one event on the step target, carrying its name,
    /// status and detail as fields, so the console and the log file draw it
    /// in their own style.
    pub fn print_summary(&self) {
        let steps = self.step_entries();
        if steps.is_empty() {
            return;
        }

        self.stage("Summary");
        for step in &steps {
            match &step.message {
                Some(detail) => {
                    tracing::info!(
                        target: STEP,
                        step = %step.name,
                        status = step.status.label(),
                        detail = %detail
                    );
                }
                None => {
                    tracing::info!(target: STEP, step = %step.name, status = step.status.label());
                }
            }
        }

        let count = |status| steps.iter().filter(|s| s.status == status).count();
        self.info(&format!(
            "{} steps: {} ok, {} skipped, {} dry-run, {} failed",
            steps.len(),
            count(StepStatus::Ok),
            count(StepStatus::Skipped),
            count(StepStatus::DryRun),
            count(StepStatus::Failed),
        ));

        if let Some(path) = &self.log_file {
            self.debug(&format!("log: {}", path.display()));
        }
    }
}

impl Log for Logger {
    fn log(&self, level: Level, msg: &str) {
        match level {
            Level::Debug => tracing::debug!("{msg}"),
            Level::Info => tracing::info!("{msg}"),
            Level::Stage => tracing::info!(target: STAGE, "{msg}"),
            Level::DryRun => tracing::info!(target: DRY_RUN, "{msg}"),
            Level::Warn => tracing::warn!("{msg}"),
            Level::Error => tracing::error!("{msg}"),
        }
    }

    fn record_step(&self, name: &str, status: StepStatus, message: Option<&str>) {
        self.steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(StepEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::isolated_logger;
    use std::fs;

    #[test]
    fn logger_new() {
        let (log, _tmp, _guard) = isolated_logger();
        assert!(log.step_entries().is_empty(), "expected empty step list");
    }

    #[test]
    fn record_step_with_message() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record_step("directories", StepStatus::Skipped, Some("files only"));
        let steps = log.step_entries();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].name, "directories");
        assert_eq!(steps[0].message, Some("files only".to_string()));
    }

    #[test]
    fn failure_count_returns_correct_count() {
        let (log, _tmp, _guard) = isolated_logger();
        assert_eq!(log.failure_count(), 0);
        log.record_step("a", StepStatus::Ok, None);
        log.record_step("b", StepStatus::Failed, Some("error 1"));
        log.record_step("c", StepStatus::Failed, Some("error 2"));
        log.record_step("d", StepStatus::DryRun, None);
        assert_eq!(log.failure_count(), 2);
    }

    #[test]
    fn log_file_is_created_by_file_layer() {
        let (log, _tmp, _guard) = isolated_logger();
        let path = log.log_path().expect("log path should exist");
        assert!(path.exists(), "file layer should create the log file");
    }

    #[test]
    fn debug_always_written_to_file() {
        let (log, _tmp, _guard) = isolated_logger();
        let marker = format!("debug-marker-{}", std::process::id());
        log.debug(&marker);
        let contents = fs::read_to_string(log.log_path().unwrap()).unwrap();
        assert!(contents.contains("[debug]"));
        assert!(contents.contains(&marker));
    }

    #[test]
    fn warn_written_to_file() {
        let (log, _tmp, _guard) = isolated_logger();
        log.warn("cleared dangling parent");
        let contents = fs::read_to_string(log.log_path().unwrap()).unwrap();
        assert!(contents.contains("[warn] cleared dangling parent"));
    }

    #[test]
    fn stage_written_to_file_with_arrow() {
        let (log, _tmp, _guard) = isolated_logger();
        log.stage("Composing tree");
        let contents = fs::read_to_string(log.log_path().unwrap()).unwrap();
        assert!(contents.contains("==> Composing tree"));
    }

    #[test]
    fn dry_run_written_to_file() {
        let (log, _tmp, _guard) = isolated_logger();
        log.dry_run("would create directory /tmp/x");
        let contents = fs::read_to_string(log.log_path().unwrap()).unwrap();
        assert!(contents.contains("[dry run] would create directory /tmp/x"));
    }

    #[test]
    fn summary_writes_one_line_per_step() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record_step("Make files", StepStatus::Ok, Some("3 changed"));
        log.record_step("Make symlinks", StepStatus::Failed, None);
        log.print_summary();
        let contents = fs::read_to_string(log.log_path().unwrap()).unwrap();
        assert!(contents.contains("✓ Make files (3 changed)"));
        assert!(contents.contains("✗ Make symlinks"));
        assert!(contents.contains("2 steps: 1 ok, 0 skipped, 0 dry-run, 1 failed"));
        assert!(!contents.contains('\x1b'), "log file must stay uncolored");
    }

    #[test]
    fn log_file_starts_with_run_header() {
        let (log, _tmp, _guard) = isolated_logger();
        let contents = fs::read_to_string(log.log_path().unwrap()).unwrap();
        assert!(contents.starts_with("# arbor "), "got: {contents}");
        assert!(contents.lines().next().unwrap().contains(" test at "));
    }
}
