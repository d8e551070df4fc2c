//! Command: parse a tree diagram, then print it or save it.
use std::sync::Arc;

use anyhow::Result;

use super::{SessionPaths, open_session};
use crate::cli::{GlobalOpts, ParseOpts};
use crate::logging::{Log, Logger};

/// Run the parse command.
///
/// Prints the normalized tree unless only a snapshot was requested.
///
/// # Errors
///
/// Returns an error if the source cannot be parsed or the snapshot cannot
/// be written.
#[allow(clippy::print_stdout)]
pub fn run(global: &GlobalOpts, opts: &ParseOpts, verbose: bool, log: &Arc<Logger>) -> Result<()> {
    let paths = SessionPaths {
        source: &opts.source,
        target: None,
        snapshot: opts.snapshot.as_deref(),
    };
    let session = open_session(global, paths, verbose, log)?;

    log.stage("Parsing tree");
    session.parse()?;

    if opts.snapshot.is_some() {
        log.stage("Writing snapshot");
        session.save_snapshot()?;
    }

    if opts.print || opts.snapshot.is_none() {
        println!("{}", session.render());
    }
    Ok(())
}
