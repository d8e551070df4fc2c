//! Permission resource and permission-string parsing.
use anyhow::{Context as _, Result, bail};
use std::path::PathBuf;

use super::fs::path_exists;
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// Parse a permission string into a mode.
///
/// Accepts symbolic `rwxr-xr-x` (nine characters, `-` for unset bits) and
/// octal `755` / `0644`.
///
/// # Errors
///
/// Returns an error for any other shape.
///
/// # Examples
///
/// ```
/// use arbor_cli::resources::chmod::parse_mode;
///
/// assert_eq!(parse_mode("rwxr-xr-x").unwrap(), 0o755);
/// assert_eq!(parse_mode("0644").unwrap(), 0o644);
/// assert!(parse_mode("rwz------").is_err());
/// ```
pub fn parse_mode(permissions: &str) -> Result<u32> {
    let s = permissions.trim();
    if !s.is_empty() && s.len() <= 4 && s.chars().all(|c| c.is_digit(8)) {
        return u32::from_str_radix(s, 8).with_context(|| format!("invalid octal mode: {s}"));
    }
    if s.chars().count() != 9 {
        bail!("invalid permission string: '{permissions}'");
    }
    let mut mode = 0u32;
    for (c, expected) in s.chars().zip(['r', 'w', 'x'].iter().cycle()) {
        let expected = *expected;
        mode <<= 1;
        if c == expected {
            mode |= 1;
        } else if c != '-' {
            bail!("invalid permission string: '{permissions}'");
        }
    }
    Ok(mode)
}

/// A permission mode that must be set on an existing path (Unix only).
#[derive(Debug, Clone)]
pub struct PermissionResource {
    /// Target path (absolute).
    pub target: PathBuf,
    /// Permission string, symbolic or octal.
    pub permissions: String,
}

impl PermissionResource {
    /// Create a new permission resource.
    #[must_use]
    pub const fn new(target: PathBuf, permissions: String) -> Self {
        Self {
            target,
            permissions,
        }
    }
}

impl Applicable for PermissionResource {
    fn description(&self) -> String {
        format!("{} {}", self.permissions, self.target.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mode = parse_mode(&self.permissions)?;
            std::fs::set_permissions(&self.target, std::fs::Permissions::from_mode(mode))
                .with_context(|| format!("set permissions: {}", self.target.display()))?;
            Ok(ResourceChange::Applied)
        }

        #[cfg(not(unix))]
        {
            Ok(ResourceChange::Skipped {
                reason: "chmod not supported on this platform".to_string(),
            })
        }
    }
}

impl Resource for PermissionResource {
    fn current_state(&self) -> Result<ResourceState> {
        if !path_exists(&self.target) {
            return Ok(ResourceState::Invalid {
                reason: format!("target does not exist: {}", self.target.display()),
            });
        }

        let desired = parse_mode(&self.permissions)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if self.target.symlink_metadata()?.file_type().is_symlink() {
                return Ok(ResourceState::Invalid {
                    reason: "permissions of a symlink are not managed".to_string(),
                });
            }
            let current = std::fs::metadata(&self.target)
                .with_context(|| format!("stat: {}", self.target.display()))?
                .permissions()
                .mode()
                & 0o7777;
            if current == desired {
                Ok(ResourceState::Correct)
            } else {
                Ok(ResourceState::Incorrect {
                    current: format!("{current:o}"),
                })
            }
        }

        #[cfg(not(unix))]
        {
            let _ = desired;
            Ok(ResourceState::Invalid {
                reason: "chmod not supported on this platform".to_string(),
            })
        }
    }
}
