//! Command: repair a snapshot in place.
use std::sync::Arc;

use anyhow::{Context as _, Result};

use super::{SessionPaths, open_session};
use crate::cli::{GlobalOpts, SanitizeOpts};
use crate::logging::{Log, Logger};

/// Run the sanitize command.
///
/// With `--replace`, the snapshot is first swapped for the given file and
/// the previous contents are kept as `<snapshot>.bak`; repairs written
/// afterwards leave that backup alone. In dry-run mode the swap is only
/// announced and nothing is written.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be read, replaced, repaired or
/// written back.
pub fn run(
    global: &GlobalOpts,
    opts: &SanitizeOpts,
    verbose: bool,
    log: &Arc<Logger>,
) -> Result<()> {
    let paths = SessionPaths {
        source: &opts.snapshot,
        target: None,
        snapshot: Some(opts.snapshot.as_path()),
    };
    let session = open_session(global, paths, verbose, log)?;

    log.stage("Loading snapshot");
    session.load_snapshot()?;

    let raw = match &opts.replace {
        Some(path) if global.dry_run => {
            log.dry_run(&format!("would replace snapshot with {}", path.display()));
            None
        }
        Some(path) => Some(
            std::fs::read(path).with_context(|| format!("read replacement: {}", path.display()))?,
        ),
        None => None,
    };

    log.stage("Sanitizing");
    let report = session.sanitize(raw.as_deref())?;

    log.stage("Writing snapshot");
    if session.save_repairs(&report)?.is_none() {
        log.info(if report.reloaded {
            "snapshot replaced, nothing to repair"
        } else {
            "snapshot is clean"
        });
    }
    Ok(())
}
