//! Core logging types: severity levels, step entries, and the [`Log`] trait.

/// Severity tag attached to every log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Diagnostic detail (suppressed on console unless verbose).
    Debug,
    /// Informational message.
    Info,
    /// Stage header (major section).
    Stage,
    /// Dry-run action preview.
    DryRun,
    /// Recoverable problem, e.g. a repaired inconsistency.
    Warn,
    /// Failure.
    Error,
}

/// Step execution result for summary reporting.
#[derive(Debug, Clone)]
pub struct StepEntry {
    /// Human-readable step name.
    pub name: String,
    /// Final status of the step.
    pub status: StepStatus,
    /// Optional detail message (e.g., counters or error description).
    pub message: Option<String>,
}

/// Status of a completed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Step completed successfully.
    Ok,
    /// Step was not run (filtered out by scope or nothing to do).
    Skipped,
    /// Step ran in dry-run mode; no changes were applied.
    DryRun,
    /// Step encountered an error and aborted the run.
    Failed,
}

impl StepStatus {
    /// Name carried in the `status` field of step events.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Skipped => "skipped",
            Self::DryRun => "dry-run",
            Self::Failed => "failed",
        }
    }

    /// Inverse of [`label`](Self::label).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "ok" => Some(Self::Ok),
            "skipped" => Some(Self::Skipped),
            "dry-run" => Some(Self::DryRun),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Logging capability injected into every component.
///
/// Implementors only provide [`log`](Self::log) and
/// [`record_step`](Self::record_step); the per-level helpers forward to
/// `log` so components can write `log.debug(..)` without caring about the
/// backend.
pub trait Log: Send + Sync {
    /// Emit `msg` at the given severity.
    fn log(&self, level: Level, msg: &str);

    /// Record a step result for the summary.
    fn record_step(&self, name: &str, status: StepStatus, message: Option<&str>);

    /// Log a stage header (major section).
    fn stage(&self, msg: &str) {
        self.log(Level::Stage, msg);
    }
    /// Log an informational message.
    fn info(&self, msg: &str) {
        self.log(Level::Info, msg);
    }
    /// Log a debug message.
    fn debug(&self, msg: &str) {
        self.log(Level::Debug, msg);
    }
    /// Log a warning message.
    fn warn(&self, msg: &str) {
        self.log(Level::Warn, msg);
    }
    /// Log an error message.
    fn error(&self, msg: &str) {
        self.log(Level::Error, msg);
    }
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str) {
        self.log(Level::DryRun, msg);
    }
}
