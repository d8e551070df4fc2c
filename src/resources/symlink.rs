//! Symlink resource.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::fs::{ensure_parent_dir, path_exists};
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A symlink that must exist at `target` with link text `link_text`.
///
/// Only existence is checked: a link pointing elsewhere, or a dangling
/// link, is left alone.
#[derive(Debug, Clone)]
pub struct SymlinkResource {
    /// Link text written into the symlink.
    pub link_text: PathBuf,
    /// Where the symlink is created.
    pub target: PathBuf,
}

impl SymlinkResource {
    /// Create a new symlink resource.
    #[must_use]
    pub const fn new(link_text: PathBuf, target: PathBuf) -> Self {
        Self { link_text, target }
    }
}

impl Applicable for SymlinkResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.link_text.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        ensure_parent_dir(&self.target)?;
        create_symlink(&self.link_text, &self.target)
            .with_context(|| format!("create link: {}", self.target.display()))?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for SymlinkResource {
    fn current_state(&self) -> Result<ResourceState> {
        if path_exists(&self.target) {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }
}

/// Create a symlink at `link` whose text is `text`.
fn create_symlink(text: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(text, link).with_context(|| {
            format!("symlink {} -> {}", link.display(), text.display())
        })
    }

    #[cfg(windows)]
    {
        std::os::windows::fs::symlink_file(text, link).with_context(|| {
            format!("symlink {} -> {}", link.display(), text.display())
        })
    }
}
