//! Flat, ordered entry collection with identity and name lookup.
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use uuid::Uuid;

use super::entry::{Entry, EntryKind, is_plain_name};
use crate::config::GlyphTable;
use crate::error::ConsistencyError;

/// Ordered collection of entries for one session.
///
/// Insertion order is source line order and drives parent inference. The
/// name and identity indices are derived; [`reindex`](Self::reindex)
/// rebuilds them after bulk edits.
#[derive(Debug, Clone, Default)]
pub struct EntryStore {
    entries: Vec<Entry>,
    name_index: HashMap<String, Uuid>,
    id_index: HashMap<Uuid, usize>,
    root_id: Option<Uuid>,
    max_depth: usize,
    glyphs: GlyphTable,
}

impl EntryStore {
    /// Create an empty store using `glyphs` for classification.
    #[must_use]
    pub fn new(glyphs: GlyphTable) -> Self {
        Self {
            glyphs,
            ..Self::default()
        }
    }

    /// Assemble a store from decoded parts, rebuilding every index.
    #[must_use]
    pub fn from_parts(
        entries: Vec<Entry>,
        root_id: Option<Uuid>,
        max_depth: usize,
        glyphs: GlyphTable,
    ) -> Self {
        let mut store = Self {
            entries,
            root_id,
            max_depth,
            glyphs,
            ..Self::default()
        };
        store.reindex();
        store
    }

    /// Append an entry.
    ///
    /// The first depth-0 directory becomes the root when none is set yet.
    pub fn add_entry(&mut self, entry: Entry) {
        self.name_index.insert(entry.name.clone(), entry.id);
        self.id_index.entry(entry.id).or_insert(self.entries.len());
        if self.root_id.is_none() && entry.depth == 0 && entry.is_directory() {
            self.root_id = Some(entry.id);
        }
        self.max_depth = self.max_depth.max(entry.depth);
        self.entries.push(entry);
    }

    /// Fetch by identity (first match for duplicated identities).
    #[must_use]
    pub fn entry(&self, id: Uuid) -> Option<&Entry> {
        self.id_index.get(&id).and_then(|&i| self.entries.get(i))
    }

    /// Fetch by leaf name; the last entry added under a name wins.
    #[must_use]
    pub fn entry_by_name(&self, name: &str) -> Option<&Entry> {
        self.name_index.get(name).and_then(|&id| self.entry(id))
    }

    /// Direct children of `id`, in store order.
    #[must_use]
    pub fn children(&self, id: Uuid) -> Vec<&Entry> {
        self.entries
            .iter()
            .filter(|e| e.parent_id == Some(id))
            .collect()
    }

    /// Identity of the root entry.
    #[must_use]
    pub const fn root_id(&self) -> Option<Uuid> {
        self.root_id
    }

    /// The root entry.
    #[must_use]
    pub fn root(&self) -> Option<&Entry> {
        self.root_id.and_then(|id| self.entry(id))
    }

    /// Deepest depth observed.
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Icon and drawing tables.
    #[must_use]
    pub const fn glyphs(&self) -> &GlyphTable {
        &self.glyphs
    }

    /// All entries in store order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` if the store holds no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve an entry's parent through the identity index.
    #[must_use]
    pub fn parent(&self, entry: &Entry) -> Option<&Entry> {
        entry.parent_id.and_then(|id| self.entry(id))
    }

    /// Path of names from the outermost ancestor down to `id`.
    ///
    /// Stops climbing at a missing parent or at the first repeated identity,
    /// so a corrupt parent cycle still yields a finite path.
    #[must_use]
    pub fn relative_path(&self, id: Uuid) -> Option<PathBuf> {
        let mut current = self.entry(id)?;
        let mut seen = HashSet::from([current.id]);
        let mut names = vec![current.name.as_str()];
        while let Some(parent) = self.parent(current) {
            if !seen.insert(parent.id) {
                break;
            }
            names.push(parent.name.as_str());
            current = parent;
        }
        Some(names.into_iter().rev().collect())
    }

    /// Check the invariants the composer depends on.
    ///
    /// # Errors
    ///
    /// Returns the first duplicated identity, non-plain name, unresolved type
    /// or dangling parent found, in store order.
    pub fn check_consistency(&self) -> Result<(), ConsistencyError> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.id) {
                return Err(ConsistencyError::DuplicateId(entry.id));
            }
            if !is_plain_name(&entry.name) {
                return Err(ConsistencyError::InvalidName {
                    name: entry.name.clone(),
                });
            }
            if entry.kind == EntryKind::Unknown {
                return Err(ConsistencyError::UnresolvedType {
                    name: entry.name.clone(),
                });
            }
            if let Some(parent) = entry.parent_id
                && !self.id_index.contains_key(&parent)
            {
                return Err(ConsistencyError::DanglingParent {
                    name: entry.name.clone(),
                    parent,
                });
            }
        }
        Ok(())
    }

    pub(super) fn entries_mut(&mut self) -> &mut Vec<Entry> {
        &mut self.entries
    }

    pub(crate) fn entry_mut(&mut self, id: Uuid) -> Option<&mut Entry> {
        let i = *self.id_index.get(&id)?;
        self.entries.get_mut(i)
    }

    pub(super) const fn set_root_id(&mut self, id: Option<Uuid>) {
        self.root_id = id;
    }

    /// Rebuild the name and identity indices and the max depth from the
    /// entry list.
    pub(super) fn reindex(&mut self) {
        self.name_index.clear();
        self.id_index.clear();
        self.max_depth = 0;
        for (i, entry) in self.entries.iter().enumerate() {
            self.name_index.insert(entry.name.clone(), entry.id);
            self.id_index.entry(entry.id).or_insert(i);
            self.max_depth = self.max_depth.max(entry.depth);
        }
    }
}
