//! Directory resource.
use anyhow::{Context as _, Result};
use std::path::PathBuf;

use super::fs::path_exists;
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A directory that must exist.
#[derive(Debug, Clone)]
pub struct DirectoryResource {
    /// Directory path (absolute).
    pub target: PathBuf,
}

impl DirectoryResource {
    /// Create a new directory resource.
    #[must_use]
    pub const fn new(target: PathBuf) -> Self {
        Self { target }
    }
}

impl Applicable for DirectoryResource {
    fn description(&self) -> String {
        format!("{}/", self.target.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        std::fs::create_dir_all(&self.target)
            .with_context(|| format!("create directory: {}", self.target.display()))?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for DirectoryResource {
    fn current_state(&self) -> Result<ResourceState> {
        if path_exists(&self.target) {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }
}
