//! Command: parse a tree diagram straight into a snapshot file.
use std::sync::Arc;

use anyhow::Result;

use super::{SessionPaths, open_session};
use crate::cli::{GlobalOpts, SnapshotOpts};
use crate::logging::{Log, Logger};

/// Run the snapshot command.
///
/// # Errors
///
/// Returns an error if the source cannot be parsed or the snapshot cannot
/// be written.
pub fn run(
    global: &GlobalOpts,
    opts: &SnapshotOpts,
    verbose: bool,
    log: &Arc<Logger>,
) -> Result<()> {
    let paths = SessionPaths {
        source: &opts.source,
        target: None,
        snapshot: Some(&opts.output),
    };
    let session = open_session(global, paths, verbose, log)?;

    log.stage("Parsing tree");
    session.parse()?;

    log.stage("Writing snapshot");
    session.save_snapshot()?;
    Ok(())
}
