//! Repair pass over a loaded store.
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use uuid::Uuid;

use super::classifier::{ends_with_separator, has_extension, split_comment};
use super::entry::{EntryKind, is_plain_name};
use super::snapshot::{SnapshotCodec, with_suffix};
use super::store::EntryStore;
use crate::error::{InputError, StructureError, TreeError};
use crate::logging::Log;
use crate::resources::fs::path_exists;

/// What a sanitize run changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    /// Entries dropped for a nil or duplicated identity, or a name that is
    /// not one plain path segment.
    pub dropped: usize,
    /// Unknown entries given a concrete type.
    pub inferred: usize,
    /// Dangling parent references cleared.
    pub reparented: usize,
    /// Whether a new root had to be selected.
    pub root_reassigned: bool,
    /// Whether the store was reloaded from replacement bytes.
    pub reloaded: bool,
}

impl SanitizeReport {
    /// Return `true` if the run changed nothing.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.dropped == 0
            && self.inferred == 0
            && self.reparented == 0
            && !self.root_reassigned
            && !self.reloaded
    }
}

/// Repairs a store so it can be composed.
pub struct Sanitizer<'a> {
    log: &'a dyn Log,
    backing: Option<&'a Path>,
}

impl std::fmt::Debug for Sanitizer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sanitizer")
            .field("log", &"<dyn Log>")
            .field("backing", &self.backing)
            .finish()
    }
}

impl<'a> Sanitizer<'a> {
    /// Create a sanitizer without a backing snapshot.
    #[must_use]
    pub const fn new(log: &'a dyn Log) -> Self {
        Self { log, backing: None }
    }

    /// Use `path` as the snapshot rewritten by replacement bytes.
    #[must_use]
    pub const fn with_backing(mut self, path: &'a Path) -> Self {
        self.backing = Some(path);
        self
    }

    /// Run every repair step over `store`.
    ///
    /// When `raw` is given, it replaces the backing snapshot (the previous
    /// file is kept as `.bak`) and the store is reloaded from it.
    ///
    /// # Errors
    ///
    /// Returns an input error when `raw` is given without a backing path,
    /// an I/O or snapshot error from the replacement, and
    /// [`StructureError::NoRootDirectory`] when no directory is left.
    pub fn run(
        &self,
        store: &mut EntryStore,
        raw: Option<&[u8]>,
    ) -> Result<SanitizeReport, TreeError> {
        let mut report = SanitizeReport {
            dropped: self.drop_unusable(store),
            ..SanitizeReport::default()
        };

        if let Some(raw) = raw {
            let backing = self.backing.ok_or(InputError::EmptyPath("snapshot"))?;
            *store = self.replace_backing(backing, raw, store)?;
            self.log.info(&format!("reloaded store from {}", backing.display()));
            report.reloaded = true;
            report.dropped += self.drop_unusable(store);
        }

        report.inferred = self.infer_types(store);
        report.reparented = self.clear_dangling_parents(store);
        report.root_reassigned = self.ensure_root(store)?;
        store.reindex();
        Ok(report)
    }

    fn drop_unusable(&self, store: &mut EntryStore) -> usize {
        let mut seen = HashSet::new();
        let before = store.len();
        store.entries_mut().retain(|e| {
            if e.id.is_nil() {
                self.log.warn(&format!("dropping '{}': missing identity", e.name));
                false
            } else if !is_plain_name(&e.name) {
                self.log.warn(&format!("dropping '{}': not a plain file name", e.name));
                false
            } else if seen.insert(e.id) {
                true
            } else {
                self.log.warn(&format!("dropping '{}': duplicate identity {}", e.name, e.id));
                false
            }
        });
        let dropped = before - store.len();
        if dropped > 0 {
            store.reindex();
        }
        dropped
    }

    fn replace_backing(
        &self,
        backing: &Path,
        raw: &[u8],
        store: &EntryStore,
    ) -> Result<EntryStore, TreeError> {
        let tmp = with_suffix(backing, ".tmp");
        let codec = SnapshotCodec::new(backing);
        let swapped = fs::write(&tmp, raw)
            .map_err(TreeError::io("write", &tmp))
            .and_then(|()| codec.backup())
            .and_then(|_| fs::rename(&tmp, backing).map_err(TreeError::io("rename", &tmp)));
        if let Err(e) = swapped {
            if path_exists(&tmp)
                && let Err(rm) = fs::remove_file(&tmp)
            {
                self.log
                    .warn(&format!("could not remove {}: {rm}", tmp.display()));
            }
            return Err(e);
        }
        codec.load(store.glyphs().clone())
    }

    fn infer_types(&self, store: &mut EntryStore) -> usize {
        let mut inferred = 0;
        for entry in store.entries_mut() {
            if entry.kind != EntryKind::Unknown {
                continue;
            }
            let (origin, _) = split_comment(&entry.origin_name);
            entry.kind = if !has_extension(&entry.name)
                && (ends_with_separator(&entry.name) || ends_with_separator(origin))
            {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            self.log
                .debug(&format!("inferred {} for '{}'", entry.kind, entry.name));
            inferred += 1;
        }
        inferred
    }

    fn clear_dangling_parents(&self, store: &mut EntryStore) -> usize {
        let ids: HashSet<Uuid> = store.entries().iter().map(|e| e.id).collect();
        let mut cleared = 0;
        for entry in store.entries_mut() {
            if let Some(parent) = entry.parent_id
                && (parent == entry.id || !ids.contains(&parent))
            {
                self.log.warn(&format!(
                    "clearing parent {parent} of '{}': not in the store",
                    entry.name
                ));
                entry.parent_id = None;
                cleared += 1;
            }
        }
        cleared
    }

    fn ensure_root(&self, store: &mut EntryStore) -> Result<bool, TreeError> {
        if store.root().is_some_and(|r| r.is_directory()) {
            return Ok(false);
        }
        let Some(root) = store.entries().iter().find(|e| e.is_directory()).map(|e| e.id) else {
            return Err(StructureError::NoRootDirectory {
                entries: store.len(),
            }
            .into());
        };
        self.log.info(&format!("root set to {root}"));
        store.set_root_id(Some(root));
        Ok(true)
    }
}
