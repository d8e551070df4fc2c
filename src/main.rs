//! `arbor` command-line entry point.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use arbor_cli::cli::{Cli, Command};
use arbor_cli::commands;
use arbor_cli::logging::{Logger, RunHeader, init_subscriber};
use clap::Parser;

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    init_subscriber(
        args.verbose,
        &RunHeader {
            command: args.command.name().to_string(),
            source: args.command.source().map(Path::to_path_buf),
            target: args.command.target().map(Path::to_path_buf),
            dry_run: args.global.dry_run,
        },
    );
    let log = Arc::new(Logger::new(args.command.name()));

    match &args.command {
        Command::Parse(opts) => commands::parse::run(&args.global, opts, args.verbose, &log),
        Command::Compose(opts) => commands::compose::run(&args.global, opts, args.verbose, &log),
        Command::Sanitize(opts) => commands::sanitize::run(&args.global, opts, args.verbose, &log),
        Command::Snapshot(opts) => commands::snapshot::run(&args.global, opts, args.verbose, &log),
        Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
