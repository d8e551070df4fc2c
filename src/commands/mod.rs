//! Top-level subcommand orchestration.
pub mod compose;
pub mod parse;
pub mod sanitize;
pub mod snapshot;
pub mod version;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::config::{Config, GlyphTable};
use crate::logging::{Log, Logger};
use crate::session::Session;

/// Paths a command hands over to [`Config`].
#[derive(Debug, Clone, Copy)]
pub struct SessionPaths<'a> {
    /// Tree diagram or snapshot to read.
    pub source: &'a Path,
    /// Directory to compose into, if any.
    pub target: Option<&'a Path>,
    /// Snapshot file backing the session, if any.
    pub snapshot: Option<&'a Path>,
}

/// Build the configuration and session shared by every command.
///
/// # Errors
///
/// Returns an error if the glyph file cannot be loaded or a path fails
/// validation.
pub fn open_session(
    global: &GlobalOpts,
    paths: SessionPaths<'_>,
    verbose: bool,
    log: &Arc<Logger>,
) -> Result<Session> {
    let glyphs = match &global.glyphs {
        Some(path) => {
            log.debug(&format!("glyph tables: {}", path.display()));
            GlyphTable::load(path)?
        }
        None => GlyphTable::default(),
    };

    let mut config = Config::new(paths.source, paths.target, paths.target.is_none(), verbose)?
        .with_glyphs(glyphs)
        .with_dry_run(global.dry_run);
    if let Some(snapshot) = paths.snapshot {
        config = config.with_snapshot(snapshot)?;
    }
    log.debug(&format!("source: {}", config.source.display()));

    let log: Arc<dyn Log> = Arc::clone(log) as Arc<dyn Log>;
    Ok(Session::new(config, log))
}
