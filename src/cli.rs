//! Command-line interface definitions.
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

/// Top-level CLI entry point for the tree composer.
#[derive(Parser, Debug)]
#[command(
    name = "arbor",
    about = "Turn drawn directory trees into real ones",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared across all subcommands.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// TOML file overriding the icon and drawing tables
    #[arg(long, global = true, value_name = "FILE")]
    pub glyphs: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a tree diagram and print or save the result
    Parse(ParseOpts),
    /// Create the tree on disk
    Compose(ComposeArgs),
    /// Repair a snapshot in place
    Sanitize(SanitizeOpts),
    /// Parse a tree diagram straight into a snapshot file
    Snapshot(SnapshotOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse",
            Self::Compose(_) => "compose",
            Self::Sanitize(_) => "sanitize",
            Self::Snapshot(_) => "snapshot",
            Self::Version => "version",
        }
    }

    /// File the command reads, if any.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        match self {
            Self::Parse(opts) => Some(opts.source.as_path()),
            Self::Compose(args) => Some(args.source.as_path()),
            Self::Sanitize(opts) => Some(opts.snapshot.as_path()),
            Self::Snapshot(opts) => Some(opts.source.as_path()),
            Self::Version => None,
        }
    }

    /// Path the command writes to, if any.
    #[must_use]
    pub fn target(&self) -> Option<&Path> {
        match self {
            Self::Compose(args) => Some(args.target.as_path()),
            Self::Snapshot(opts) => Some(opts.output.as_path()),
            Self::Parse(opts) => opts.snapshot.as_deref(),
            Self::Sanitize(_) | Self::Version => None,
        }
    }
}

/// Options for the `parse` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ParseOpts {
    /// Tree diagram to read
    pub source: PathBuf,

    /// Also write the parsed tree to this snapshot file
    #[arg(long, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Print the normalized tree
    #[arg(short, long)]
    pub print: bool,
}

/// Options for the `compose` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ComposeArgs {
    /// Tree diagram to read (or, with --from-snapshot, a snapshot file)
    pub source: PathBuf,

    /// Directory the tree is created in
    pub target: PathBuf,

    /// Treat SOURCE as a snapshot instead of a diagram
    #[arg(long)]
    pub from_snapshot: bool,

    /// Write the composed tree to this snapshot file
    #[arg(long, value_name = "FILE", conflicts_with = "from_snapshot")]
    pub save: Option<PathBuf>,

    /// Apply each entry's permission string
    #[arg(long)]
    pub permissions: bool,

    /// Compare recorded checksums with the files on disk
    #[arg(long)]
    pub verify_checksums: bool,

    /// Store the checksums of the composed files in the snapshot
    #[arg(long)]
    pub record_checksums: bool,

    /// Create directories only
    #[arg(long, conflicts_with = "only_files")]
    pub only_directories: bool,

    /// Create files and symlinks only
    #[arg(long)]
    pub only_files: bool,
}

/// Options for the `sanitize` subcommand.
#[derive(Args, Debug, Clone)]
pub struct SanitizeOpts {
    /// Snapshot file to repair
    pub snapshot: PathBuf,

    /// Replace the snapshot contents with this file before repairing
    #[arg(long, value_name = "FILE")]
    pub replace: Option<PathBuf>,
}

/// Options for the `snapshot` subcommand.
#[derive(Args, Debug, Clone)]
pub struct SnapshotOpts {
    /// Tree diagram to read
    pub source: PathBuf,

    /// Snapshot file to write
    pub output: PathBuf,
}
