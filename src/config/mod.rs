//! Session configuration assembled from command-line arguments.
pub mod glyphs;
pub mod toml_loader;

use std::path::{Path, PathBuf};

use crate::error::{InputError, TreeError};

pub use glyphs::GlyphTable;

/// Everything a session needs to know before it touches the tree source.
#[derive(Debug, Clone)]
pub struct Config {
    /// Absolute path of the input document (tree diagram or snapshot).
    pub source: PathBuf,
    /// Absolute base directory to compose into; `None` when only printing.
    pub target: Option<PathBuf>,
    /// Snapshot file backing the session, if any.
    pub snapshot: Option<PathBuf>,
    /// Only render the tree, never touch the target.
    pub print_only: bool,
    /// Emit debug-level detail.
    pub debug: bool,
    /// Log intended filesystem changes without applying them.
    pub dry_run: bool,
    /// Icon and drawing tables.
    pub glyphs: GlyphTable,
}

impl Config {
    /// Validate the paths handed over by the command layer.
    ///
    /// `target` is only required when `print_only` is `false`.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::EmptyPath`] for an empty source (or an empty
    /// target when composing), [`InputError::SourceNotFound`] when the
    /// source does not exist, and an I/O error if a relative path cannot be
    /// made absolute.
    pub fn new(
        source: &Path,
        target: Option<&Path>,
        print_only: bool,
        debug: bool,
    ) -> Result<Self, TreeError> {
        if source.as_os_str().is_empty() {
            return Err(InputError::EmptyPath("source").into());
        }
        let source = absolute(source)?;
        if !source.exists() {
            return Err(InputError::SourceNotFound(source).into());
        }

        let target = match target {
            Some(t) if !t.as_os_str().is_empty() => Some(absolute(t)?),
            _ if print_only => None,
            _ => return Err(InputError::EmptyPath("target").into()),
        };

        Ok(Self {
            source,
            target,
            snapshot: None,
            print_only,
            debug,
            dry_run: false,
            glyphs: GlyphTable::default(),
        })
    }

    /// Attach a snapshot file to the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty or cannot be made absolute.
    pub fn with_snapshot(mut self, path: &Path) -> Result<Self, TreeError> {
        if path.as_os_str().is_empty() {
            return Err(InputError::EmptyPath("snapshot").into());
        }
        self.snapshot = Some(absolute(path)?);
        Ok(self)
    }

    /// Replace the default glyph tables.
    #[must_use]
    pub fn with_glyphs(mut self, glyphs: GlyphTable) -> Self {
        self.glyphs = glyphs;
        self
    }

    /// Toggle dry-run mode.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

fn absolute(path: &Path) -> Result<PathBuf, TreeError> {
    std::path::absolute(path).map_err(TreeError::io("resolve", path))
}
