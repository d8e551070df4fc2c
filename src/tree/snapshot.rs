//! JSON snapshots of an entry store, with `.bak` backup and restore.
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entry::Entry;
use super::store::EntryStore;
use crate::config::GlyphTable;
use crate::error::{SnapshotError, TreeError};

/// Document format version written by [`SnapshotCodec::save`].
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotDocument {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    root_id: Option<Uuid>,
    #[serde(default)]
    max_depth: usize,
    #[serde(default)]
    entries: Vec<Entry>,
}

const fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

/// Append `suffix` to the file name of `path` (`tree.json` → `tree.json.bak`).
#[must_use]
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// Reads and writes one snapshot file.
#[derive(Debug, Clone)]
pub struct SnapshotCodec {
    path: PathBuf,
}

impl SnapshotCodec {
    /// Create a codec for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The snapshot path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where [`backup`](Self::backup) moves the current file.
    #[must_use]
    pub fn backup_path(&self) -> PathBuf {
        with_suffix(&self.path, ".bak")
    }

    /// Serialize `store` to the snapshot path.
    ///
    /// An existing file is first renamed to `.bak`. If the write fails, or
    /// leaves no file behind, the backup is moved back before returning the
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an encode error, a backup I/O error, the write error, or
    /// [`SnapshotError::NotWritten`]. When the backup cannot be moved back
    /// either, both causes come back as [`SnapshotError::RestoreFailed`].
    pub fn save(&self, store: &EntryStore) -> Result<(), TreeError> {
        let bytes = self.encode(store)?;

        let backed_up = if self.path.symlink_metadata().is_ok() {
            self.backup()?;
            true
        } else {
            false
        };

        let outcome = match fs::write(&self.path, &bytes) {
            Err(e) => Err(TreeError::io("write", &self.path)(e)),
            Ok(()) if !self.path.exists() => Err(SnapshotError::NotWritten(self.path.clone()).into()),
            Ok(()) => Ok(()),
        };

        match outcome {
            Err(write) if backed_up => match self.restore() {
                Ok(()) => Err(write),
                Err(restore) => Err(SnapshotError::RestoreFailed {
                    backup: self.backup_path(),
                    write: Box::new(write),
                    restore: Box::new(restore),
                }
                .into()),
            },
            outcome => outcome,
        }
    }

    /// Replace the snapshot with `store` without touching the `.bak` file.
    ///
    /// The document is staged next to the snapshot and renamed over it, so
    /// a failure leaves the current file as it was.
    ///
    /// # Errors
    ///
    /// Returns an encode error or the I/O error of the staging write or
    /// the rename.
    pub fn write_in_place(&self, store: &EntryStore) -> Result<(), TreeError> {
        let bytes = self.encode(store)?;
        let tmp = with_suffix(&self.path, ".tmp");
        let written = fs::write(&tmp, &bytes)
            .map_err(TreeError::io("write", &tmp))
            .and_then(|()| fs::rename(&tmp, &self.path).map_err(TreeError::io("rename", &tmp)));
        if written.is_err() && tmp.symlink_metadata().is_ok() {
            // The staged copy is useless once the rename has failed.
            let _ = fs::remove_file(&tmp);
        }
        written
    }

    fn encode(&self, store: &EntryStore) -> Result<Vec<u8>, TreeError> {
        let document = SnapshotDocument {
            version: SNAPSHOT_VERSION,
            root_id: store.root_id(),
            max_depth: store.max_depth(),
            entries: store.entries().to_vec(),
        };
        serde_json::to_vec_pretty(&document).map_err(|source| {
            SnapshotError::Encode {
                path: self.path.clone(),
                source,
            }
            .into()
        })
    }

    /// Decode the snapshot into a new store using `glyphs`.
    ///
    /// Identities are kept as written; indices are rebuilt.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read and
    /// [`SnapshotError::Decode`] if it is not a snapshot document.
    pub fn load(&self, glyphs: GlyphTable) -> Result<EntryStore, TreeError> {
        let bytes = fs::read(&self.path).map_err(TreeError::io("read", &self.path))?;
        let document: SnapshotDocument =
            serde_json::from_slice(&bytes).map_err(|source| SnapshotError::Decode {
                path: self.path.clone(),
                source,
            })?;
        Ok(EntryStore::from_parts(
            document.entries,
            document.root_id,
            document.max_depth,
            glyphs,
        ))
    }

    /// Rename the snapshot file to its `.bak` path.
    ///
    /// # Errors
    ///
    /// Fails if the snapshot file does not exist or cannot be renamed.
    pub fn backup(&self) -> Result<PathBuf, TreeError> {
        let bak = self.backup_path();
        fs::rename(&self.path, &bak).map_err(TreeError::io("back up", &self.path))?;
        Ok(bak)
    }

    /// Move the `.bak` file back over the snapshot path.
    ///
    /// # Errors
    ///
    /// Fails if there is no backup or it cannot be renamed.
    pub fn restore(&self) -> Result<(), TreeError> {
        let bak = self.backup_path();
        fs::rename(&bak, &self.path).map_err(TreeError::io("restore", &bak))
    }
}
