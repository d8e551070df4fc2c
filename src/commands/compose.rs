//! Command: create the tree on disk.
use std::sync::Arc;

use anyhow::Result;

use super::{SessionPaths, open_session};
use crate::cli::{ComposeArgs, GlobalOpts};
use crate::compose::{ComposeOpts, Scope};
use crate::logging::{Log, Logger};

/// Run the compose command.
///
/// The store is always sanitized before anything touches the target.
///
/// # Errors
///
/// Returns an error if the source cannot be loaded or any step fails.
pub fn run(global: &GlobalOpts, args: &ComposeArgs, verbose: bool, log: &Arc<Logger>) -> Result<()> {
    let snapshot = if args.from_snapshot {
        Some(args.source.as_path())
    } else {
        args.save.as_deref()
    };
    let paths = SessionPaths {
        source: &args.source,
        target: Some(args.target.as_path()),
        snapshot,
    };
    let session = open_session(global, paths, verbose, log)?;

    if args.from_snapshot {
        log.stage("Loading snapshot");
        session.load_snapshot()?;
    } else {
        log.stage("Parsing tree");
        session.parse()?;
    }

    let opts = ComposeOpts {
        scope: scope(args),
        dry_run: global.dry_run,
        apply_permissions: args.permissions,
        verify_checksums: args.verify_checksums,
    };
    let result = session.compose(&opts);
    log.print_summary();
    let stats = result?;
    log.info(&format!("total: {}", stats.summary(opts.dry_run)));

    if args.record_checksums {
        log.stage("Recording checksums");
        if global.dry_run {
            log.dry_run("would record checksums");
        } else {
            session.record_checksums()?;
        }
    }

    if snapshot.is_some() && (args.save.is_some() || args.record_checksums) {
        log.stage("Writing snapshot");
        session.save_snapshot()?;
    } else if args.record_checksums {
        log.warn("no snapshot to store checksums in; pass --save or --from-snapshot");
    }
    Ok(())
}

const fn scope(args: &ComposeArgs) -> Scope {
    if args.only_directories {
        Scope::DirectoriesOnly
    } else if args.only_files {
        Scope::FilesOnly
    } else {
        Scope::All
    }
}
