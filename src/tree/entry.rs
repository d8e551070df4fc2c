//! The entry record: one file, directory or symlink drawn in the source.
use std::fmt;
use std::path::{Component, Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::metadata::Metadata;
use crate::error::InputError;

/// Default permission string for new entries.
pub const DEFAULT_PERMISSIONS: &str = "rwxr-xr-x";
/// Checksum sentinel meaning "nothing recorded".
pub const NO_CHECKSUM: &str = "none";
/// Comment sentinel meaning "the line had no comment".
pub const NO_COMMENTS: &str = "no comments";
/// Creator recorded on entries produced by the parser.
pub const DEFAULT_CREATOR: &str = "system";

/// Kind of filesystem artifact an entry stands for.
///
/// `Unknown` is a transient state; the resolver and the sanitizer turn it
/// into `File` or `Directory` before anything is composed. Unrecognised
/// strings in a snapshot decode as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
    /// Not yet resolved.
    Unknown,
}

impl EntryKind {
    /// Lower-case wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Symlink => "symlink",
            Self::Unknown => "unknown",
        }
    }
}

impl From<String> for EntryKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "file" => Self::File,
            "directory" => Self::Directory,
            "symlink" => Self::Symlink,
            _ => Self::Unknown,
        }
    }
}

impl From<EntryKind> for String {
    fn from(kind: EntryKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Return `true` if `name` is one plain path segment.
///
/// Empty names, `.`, `..`, and names holding a separator would make the
/// composed path leave its parent, so they are never valid.
#[must_use]
pub fn is_plain_name(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut parts = Path::new(name).components();
    matches!(
        (parts.next(), parts.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn default_permissions() -> String {
    DEFAULT_PERMISSIONS.to_string()
}

fn default_checksum() -> String {
    NO_CHECKSUM.to_string()
}

fn default_comments() -> String {
    NO_COMMENTS.to_string()
}

fn default_creator() -> String {
    DEFAULT_CREATOR.to_string()
}

/// One parsed artifact of the drawn tree.
///
/// Entries never own each other: `parent_id` is resolved through the
/// store's identity index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Identity; `Uuid::nil()` marks an entry the sanitizer will drop.
    #[serde(default)]
    pub id: Uuid,
    /// Containing entry, if any.
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    /// Artifact kind.
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Cleaned leaf name.
    pub name: String,
    /// The source line, trimmed.
    pub origin_name: String,
    /// Nesting level derived from branch glyphs.
    #[serde(default)]
    pub depth: usize,
    /// Size in bytes (informational).
    #[serde(default)]
    pub size: u64,
    /// Creation timestamp.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Creator.
    #[serde(default = "default_creator")]
    pub created_by: String,
    /// Last modification timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
    /// Last modifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<String>,
    /// Permission string, symbolic (`rwxr-xr-x`) or octal (`755`).
    #[serde(default = "default_permissions")]
    pub permissions: String,
    /// Hex SHA-256 of the file contents, or [`NO_CHECKSUM`].
    #[serde(default = "default_checksum")]
    pub checksum: String,
    /// Inline comment from the source line, or [`NO_COMMENTS`].
    #[serde(default = "default_comments")]
    pub comments: String,
    /// Opaque metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

impl Entry {
    /// Build an unparented depth-0 entry with a fresh identity.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::EmptyOrigin`] or [`InputError::EmptyName`] when
    /// either string is blank, and [`InputError::ReservedName`] for `.`,
    /// `..` or a name with a separator.
    pub fn new(
        kind: EntryKind,
        name: &str,
        origin: &str,
        comment: Option<&str>,
    ) -> Result<Self, InputError> {
        if origin.trim().is_empty() {
            return Err(InputError::EmptyOrigin);
        }
        if name.trim().is_empty() {
            return Err(InputError::EmptyName {
                origin: origin.to_string(),
            });
        }
        if !is_plain_name(name) {
            return Err(InputError::ReservedName {
                name: name.to_string(),
                origin: origin.to_string(),
            });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            parent_id: None,
            kind,
            name: name.to_string(),
            origin_name: origin.to_string(),
            depth: 0,
            size: 0,
            created_at: Utc::now(),
            created_by: default_creator(),
            modified_at: None,
            modified_by: None,
            permissions: default_permissions(),
            checksum: default_checksum(),
            comments: comment
                .filter(|c| !c.is_empty())
                .map_or_else(default_comments, String::from),
            metadata: Metadata::default(),
        })
    }

    /// Return `true` for directory entries.
    #[must_use]
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Return `true` if a real checksum has been recorded.
    #[must_use]
    pub fn has_checksum(&self) -> bool {
        self.checksum != NO_CHECKSUM
    }

    /// Stamp the entry as modified now by `who`.
    pub fn touch(&mut self, who: &str) {
        self.modified_at = Some(Utc::now());
        self.modified_by = Some(who.to_string());
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn new_applies_defaults() {
        let e = Entry::new(EntryKind::File, "main.go", "├── main.go", None).unwrap();
        assert_eq!(e.permissions, DEFAULT_PERMISSIONS);
        assert_eq!(e.checksum, NO_CHECKSUM);
        assert_eq!(e.comments, NO_COMMENTS);
        assert_eq!(e.created_by, DEFAULT_CREATOR);
        assert_eq!(e.depth, 0);
        assert!(e.parent_id.is_none());
        assert!(!e.id.is_nil());
    }

    #[test]
    fn new_keeps_comment() {
        let e = Entry::new(EntryKind::File, "a.rs", "a.rs # entry", Some("entry")).unwrap();
        assert_eq!(e.comments, "entry");
    }

    #[test]
    fn new_rejects_empty_origin() {
        let err = Entry::new(EntryKind::File, "a", "  ", None).unwrap_err();
        assert!(matches!(err, InputError::EmptyOrigin));
    }

    #[test]
    fn new_rejects_empty_name() {
        let err = Entry::new(EntryKind::File, "", "├── ", None).unwrap_err();
        assert!(matches!(err, InputError::EmptyName { .. }));
    }

    #[test]
    fn new_rejects_parent_and_current_dir_names() {
        for name in ["..", ".", "a/b", "a\\b"] {
            let err = Entry::new(EntryKind::Directory, name, "├── ../", None).unwrap_err();
            assert!(
                matches!(err, InputError::ReservedName { .. }),
                "{name} accepted"
            );
        }
    }

    #[test]
    fn plain_names() {
        assert!(is_plain_name("main.rs"));
        assert!(is_plain_name(".gitignore"));
        assert!(is_plain_name("..hidden"));
        assert!(!is_plain_name(""));
        assert!(!is_plain_name(".."));
        assert!(!is_plain_name("/etc"));
    }

    #[test]
    fn kind_wire_names() {
        assert_eq!(serde_json::to_string(&EntryKind::Symlink).unwrap(), "\"symlink\"");
        let k: EntryKind = serde_json::from_str("\"directory\"").unwrap();
        assert_eq!(k, EntryKind::Directory);
    }

    #[test]
    fn unrecognised_kind_decodes_as_unknown() {
        let k: EntryKind = serde_json::from_str("\"socket\"").unwrap();
        assert_eq!(k, EntryKind::Unknown);
    }

    #[test]
    fn sparse_json_fills_defaults() {
        let e: Entry = serde_json::from_str(
            r#"{"type":"file","name":"a.txt","originName":"a.txt"}"#,
        )
        .unwrap();
        assert!(e.id.is_nil());
        assert_eq!(e.permissions, DEFAULT_PERMISSIONS);
        assert_eq!(e.comments, NO_COMMENTS);
        assert!(!e.has_checksum());
    }

    #[test]
    fn serializes_camel_case_fields() {
        let e = Entry::new(EntryKind::Directory, "src", "src/", None).unwrap();
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["type"], "directory");
        assert_eq!(v["originName"], "src/");
        assert!(v.get("modifiedAt").is_none());
    }
}
