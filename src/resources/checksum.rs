//! Content checksum resource (SHA-256).
use anyhow::{Context as _, Result, bail};
use sha2::{Digest, Sha256};
use std::io::Read as _;
use std::path::{Path, PathBuf};

use super::fs::path_exists;
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// Hex-encoded SHA-256 of the file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file =
        std::fs::File::open(path).with_context(|| format!("open: {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file
            .read(&mut buf)
            .with_context(|| format!("read: {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(buf.get(..n).unwrap_or_default());
    }
    Ok(hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect())
}

/// A file whose contents must hash to `expected`.
///
/// Checksums cannot be repaired: applying an incorrect one is an error.
#[derive(Debug, Clone)]
pub struct ChecksumResource {
    /// File path (absolute).
    pub target: PathBuf,
    /// Expected hex digest.
    pub expected: String,
}

impl ChecksumResource {
    /// Create a new checksum resource.
    #[must_use]
    pub const fn new(target: PathBuf, expected: String) -> Self {
        Self { target, expected }
    }
}

impl Applicable for ChecksumResource {
    fn description(&self) -> String {
        format!("sha256 {}", self.target.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        let actual = sha256_file(&self.target)?;
        if actual.eq_ignore_ascii_case(&self.expected) {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        bail!(
            "checksum mismatch for {}: expected {}, found {actual}",
            self.target.display(),
            self.expected
        )
    }
}

impl Resource for ChecksumResource {
    fn current_state(&self) -> Result<ResourceState> {
        if !path_exists(&self.target) {
            return Ok(ResourceState::Invalid {
                reason: format!("target does not exist: {}", self.target.display()),
            });
        }
        if !self.target.is_file() {
            return Ok(ResourceState::Invalid {
                reason: "not a regular file".to_string(),
            });
        }
        let actual = sha256_file(&self.target)?;
        if actual.eq_ignore_ascii_case(&self.expected) {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect { current: actual })
        }
    }
}
