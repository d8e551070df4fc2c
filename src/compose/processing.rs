//! Generic check-then-apply loop shared by the composer steps.
use anyhow::Result;

use crate::logging::Log;
use crate::resources::{Resource, ResourceChange, ResourceState};

/// Counters for a step that processes many entries.
///
/// # Examples
///
/// ```
/// use arbor_cli::compose::StepStats;
///
/// let mut stats = StepStats::new();
/// stats.changed = 3;
/// stats.already_ok = 10;
///
/// assert_eq!(stats.summary(false), "3 changed, 10 already ok");
/// assert_eq!(stats.summary(true), "3 would change, 10 already ok");
/// ```
///
/// When entries are skipped, the summary includes the count:
///
/// ```
/// use arbor_cli::compose::StepStats;
///
/// let stats = StepStats { changed: 1, already_ok: 2, skipped: 3 };
/// assert_eq!(stats.summary(false), "1 changed, 2 already ok, 3 skipped");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StepStats {
    /// Number of entries created or updated.
    pub changed: u32,
    /// Number of entries already in the desired state.
    pub already_ok: u32,
    /// Number of entries that could not be handled.
    pub skipped: u32,
}

impl StepStats {
    /// Create a new empty stats counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Format the summary string (e.g. "3 changed, 10 already ok, 1 skipped").
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would change" } else { "changed" };
        if self.skipped > 0 {
            format!(
                "{} {verb}, {} already ok, {} skipped",
                self.changed, self.already_ok, self.skipped
            )
        } else {
            format!("{} {verb}, {} already ok", self.changed, self.already_ok)
        }
    }
}

impl std::ops::AddAssign for StepStats {
    fn add_assign(&mut self, other: Self) {
        self.changed += other.changed;
        self.already_ok += other.already_ok;
        self.skipped += other.skipped;
    }
}

/// Which resource states a step is allowed to act on.
///
/// # Examples
///
/// ```
/// use arbor_cli::compose::ProcessOpts;
///
/// let opts = ProcessOpts::create_missing("create");
/// assert!(opts.fix_missing && !opts.fix_incorrect);
///
/// let opts = ProcessOpts::apply_all("chmod");
/// assert!(opts.fix_missing && opts.fix_incorrect);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ProcessOpts<'a> {
    /// Verb for log messages (e.g. "create", "link", "chmod").
    pub verb: &'a str,
    /// Apply the change to `Incorrect` resources. If `false`, skip them.
    pub fix_incorrect: bool,
    /// Apply the change to `Missing` resources. If `false`, skip them.
    pub fix_missing: bool,
}

impl<'a> ProcessOpts<'a> {
    /// Fix both missing and incorrect resources.
    #[must_use]
    pub const fn apply_all(verb: &'a str) -> Self {
        Self {
            verb,
            fix_incorrect: true,
            fix_missing: true,
        }
    }

    /// Create missing resources; anything already present is left as is.
    #[must_use]
    pub const fn create_missing(verb: &'a str) -> Self {
        Self {
            verb,
            fix_incorrect: false,
            fix_missing: true,
        }
    }
}

/// Check each resource's state and apply it where needed.
///
/// Stops at the first failure; the error names the resource.
///
/// # Errors
///
/// Returns an error if a state check or an apply fails.
pub fn process_resources<R: Resource>(
    log: &dyn Log,
    dry_run: bool,
    resources: impl IntoIterator<Item = R>,
    opts: &ProcessOpts,
) -> Result<StepStats> {
    let mut stats = StepStats::new();
    for resource in resources {
        let current = resource.current_state()?;
        stats += process_single(log, dry_run, &resource, current, opts)?;
    }
    Ok(stats)
}

/// Process a single resource given its current state, returning a stats delta.
fn process_single<R: Resource>(
    log: &dyn Log,
    dry_run: bool,
    resource: &R,
    resource_state: ResourceState,
    opts: &ProcessOpts,
) -> Result<StepStats> {
    let desc = resource.description();
    let mut delta = StepStats::new();
    match resource_state {
        ResourceState::Correct => {
            log.debug(&format!("ok: {desc}"));
            delta.already_ok += 1;
        }
        ResourceState::Invalid { reason } => {
            log.debug(&format!("skipping {desc}: {reason}"));
            delta.skipped += 1;
        }
        ResourceState::Missing if !opts.fix_missing => {
            delta.skipped += 1;
        }
        ResourceState::Incorrect { .. } if !opts.fix_incorrect => {
            log.debug(&format!("skipping {desc} (unexpected state)"));
            delta.skipped += 1;
        }
        resource_state @ (ResourceState::Missing | ResourceState::Incorrect { .. }) => {
            if dry_run {
                let msg = if let ResourceState::Incorrect { ref current } = resource_state {
                    format!("would {} {desc} (currently {current})", opts.verb)
                } else {
                    format!("would {}: {desc}", opts.verb)
                };
                log.dry_run(&msg);
                delta.changed += 1;
                return Ok(delta);
            }
            delta += apply_resource(log, resource, opts)?;
        }
    }
    Ok(delta)
}

/// Apply a single resource change, returning a stats delta.
fn apply_resource<R: Resource>(
    log: &dyn Log,
    resource: &R,
    opts: &ProcessOpts,
) -> Result<StepStats> {
    let desc = resource.description();
    let mut delta = StepStats::new();
    match resource.apply()? {
        ResourceChange::Applied => {
            log.debug(&format!("{}: {desc}", opts.verb));
            delta.changed += 1;
        }
        ResourceChange::AlreadyCorrect => {
            delta.already_ok += 1;
        }
        ResourceChange::Skipped { reason } => {
            log.warn(&format!("failed to {} {desc}: {reason}", opts.verb));
            delta.skipped += 1;
        }
    }
    Ok(delta)
}
