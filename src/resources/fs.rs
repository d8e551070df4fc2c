//! File-system helpers shared by resources.
use anyhow::{Context as _, Result};
use std::path::{Component, Path};

/// Return `true` if anything exists at `path`, including a dangling symlink.
#[must_use]
pub fn path_exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Return `true` if joining `rel` onto any base stays below that base.
///
/// Only plain segments qualify; `..`, `.`, roots and prefixes do not.
#[must_use]
pub fn is_contained(rel: &Path) -> bool {
    rel.components().all(|c| matches!(c, Component::Normal(_)))
}

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}
