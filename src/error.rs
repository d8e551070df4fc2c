//! Domain-specific error types for the tree engine.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! The parsing core (`tree::*`) returns [`TreeError`] directly, while the
//! composer, resources and command handlers work in [`anyhow::Error`] and
//! convert via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! TreeError
//! ├── Input(InputError)             : empty paths, missing source, bad lines
//! ├── Structure(StructureError)     : no directory to anchor the tree
//! ├── Consistency(ConsistencyError) : duplicate ids, unresolved types/parents
//! ├── Snapshot(SnapshotError)       : JSON encode/decode, write verification
//! └── Io { op, path, source }       : any filesystem call, with its path
//! ```

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

/// Top-level error type for the tree engine.
#[derive(Error, Debug)]
pub enum TreeError {
    /// The caller supplied unusable input.
    #[error("input error: {0}")]
    Input(#[from] InputError),

    /// The parsed entries cannot form a tree.
    #[error("structural error: {0}")]
    Structure(#[from] StructureError),

    /// The store violates an invariant that could not be repaired.
    #[error("consistency error: {0}")]
    Consistency(#[from] ConsistencyError),

    /// A snapshot could not be written or read back.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// A filesystem call failed.
    #[error("failed to {op} '{}': {source}", .path.display())]
    Io {
        /// Short name of the failed operation (e.g. `"rename"`).
        op: &'static str,
        /// Path the operation was applied to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

impl TreeError {
    /// Build a `map_err` adapter that wraps an [`io::Error`] with the
    /// operation name and the path it touched.
    pub fn io(op: &'static str, path: &Path) -> impl FnOnce(io::Error) -> Self + use<> {
        let path = path.to_path_buf();
        move |source| Self::Io { op, path, source }
    }
}

/// Errors caused by the input handed to a parse session.
#[derive(Error, Debug)]
pub enum InputError {
    /// A required path argument was empty.
    #[error("{0} path cannot be empty")]
    EmptyPath(&'static str),

    /// The tree source file does not exist.
    #[error("tree source does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// An entry was constructed without its origin line.
    #[error("origin line cannot be empty")]
    EmptyOrigin,

    /// An entry was constructed with an empty cleaned name.
    #[error("entry name cannot be empty (origin '{origin}')")]
    EmptyName {
        /// The origin line the empty name came from.
        origin: String,
    },

    /// A name that is not a single plain path segment (`.`, `..`, or one
    /// containing a separator).
    #[error("'{name}' cannot be used as an entry name (origin '{origin}')")]
    ReservedName {
        /// The rejected name.
        name: String,
        /// The origin line the name came from.
        origin: String,
    },

    /// A source line could not be turned into an entry.
    #[error("line {number} '{line}': {reason}")]
    InvalidLine {
        /// One-based line number in the source file.
        number: usize,
        /// The offending line as read.
        line: String,
        /// Human-readable reason.
        reason: String,
    },
}

/// Errors about the overall shape of the parsed tree.
#[derive(Error, Debug)]
pub enum StructureError {
    /// No directory-typed entry exists to serve as root.
    #[error("no root directory found among {entries} entries")]
    NoRootDirectory {
        /// Number of entries inspected.
        entries: usize,
    },
}

/// Invariant violations inside an entry store.
#[derive(Error, Debug)]
pub enum ConsistencyError {
    /// Two entries share an identity.
    #[error("duplicate entry id {0}")]
    DuplicateId(Uuid),

    /// An entry still has the `unknown` type where a concrete one is required.
    #[error("entry '{name}' has an unresolved type")]
    UnresolvedType {
        /// Leaf name of the entry.
        name: String,
    },

    /// An entry name would step outside its parent once joined to a path.
    #[error("entry name '{name}' is not a plain file name")]
    InvalidName {
        /// The offending name.
        name: String,
    },

    /// An entry points at a parent that is not in the store.
    #[error("entry '{name}' references missing parent {parent}")]
    DanglingParent {
        /// Leaf name of the entry.
        name: String,
        /// The unresolvable parent id.
        parent: Uuid,
    },
}

/// Errors from the snapshot codec.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The store could not be serialized.
    #[error("cannot encode snapshot for '{}': {source}", .path.display())]
    Encode {
        /// Snapshot path being written.
        path: PathBuf,
        /// Underlying serializer error.
        source: serde_json::Error,
    },

    /// The snapshot file is not a valid document.
    #[error("cannot decode snapshot '{}': {source}", .path.display())]
    Decode {
        /// Snapshot path being read.
        path: PathBuf,
        /// Underlying deserializer error.
        source: serde_json::Error,
    },

    /// The write reported success but no file exists at the target path.
    #[error("snapshot was not written to '{}'", .0.display())]
    NotWritten(PathBuf),

    /// Saving failed and the `.bak` file could not be moved back either.
    #[error("{write}; failed to restore backup file '{}': {restore}", .backup.display())]
    RestoreFailed {
        /// Backup left behind for manual recovery.
        backup: PathBuf,
        /// Why the save failed.
        write: Box<TreeError>,
        /// Why the restore failed.
        restore: Box<TreeError>,
    },
}
