//! Regular file resource.
use anyhow::{Context as _, Result};
use std::path::PathBuf;

use super::fs::{ensure_parent_dir, path_exists};
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A file that must exist. Contents are never inspected.
#[derive(Debug, Clone)]
pub struct FileResource {
    /// File path (absolute).
    pub target: PathBuf,
}

impl FileResource {
    /// Create a new file resource.
    #[must_use]
    pub const fn new(target: PathBuf) -> Self {
        Self { target }
    }
}

impl Applicable for FileResource {
    fn description(&self) -> String {
        self.target.display().to_string()
    }

    fn apply(&self) -> Result<ResourceChange> {
        ensure_parent_dir(&self.target)?;
        std::fs::File::create(&self.target)
            .with_context(|| format!("create file: {}", self.target.display()))?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for FileResource {
    fn current_state(&self) -> Result<ResourceState> {
        if path_exists(&self.target) {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }
}
