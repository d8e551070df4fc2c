//! Depth, identity, parent and root resolution over a fully loaded store.
use std::collections::HashSet;

use uuid::Uuid;

use super::entry::EntryKind;
use super::store::EntryStore;
use crate::config::GlyphTable;
use crate::error::{StructureError, TreeError};
use crate::logging::Log;

/// Count the branch glyphs in the structural prefix of `origin`.
///
/// The prefix is the leading run of whitespace, branch glyphs and `─`.
#[must_use]
pub fn structural_depth(origin: &str, glyphs: &GlyphTable) -> usize {
    origin
        .chars()
        .take_while(|&c| c.is_whitespace() || c == '─' || glyphs.is_branch(c))
        .filter(|&c| glyphs.is_branch(c))
        .count()
}

/// Resolve the whole store in one pass.
///
/// 1. depth from each origin line, and the max depth;
/// 2. a fresh canonical identity for every entry;
/// 3. parents from a depth stack: the nearest preceding entry with a
///    smaller depth;
/// 4. `unknown`/`file` entries that turned out to have children become
///    directories;
/// 5. the root: first depth-0 directory, else the first directory;
/// 6. the indices.
///
/// # Errors
///
/// Returns [`StructureError::NoRootDirectory`] when no entry is a
/// directory.
pub fn resolve(store: &mut EntryStore, log: &dyn Log) -> Result<(), TreeError> {
    let glyphs = store.glyphs().clone();
    let entries = store.entries_mut();

    for entry in entries.iter_mut() {
        entry.depth = structural_depth(&entry.origin_name, &glyphs);
        entry.id = Uuid::new_v4();
    }

    let mut open: Vec<(usize, Uuid)> = Vec::new();
    for entry in entries.iter_mut() {
        while open.last().is_some_and(|&(depth, _)| depth >= entry.depth) {
            open.pop();
        }
        entry.parent_id = open.last().map(|&(_, id)| id);
        open.push((entry.depth, entry.id));
    }

    let parents: HashSet<Uuid> = entries.iter().filter_map(|e| e.parent_id).collect();
    for entry in entries.iter_mut() {
        if matches!(entry.kind, EntryKind::Unknown | EntryKind::File)
            && parents.contains(&entry.id)
        {
            log.debug(&format!(
                "{} '{}' has children, treating it as a directory",
                entry.kind, entry.name
            ));
            entry.kind = EntryKind::Directory;
        }
    }

    let root = entries
        .iter()
        .find(|e| e.is_directory() && e.depth == 0)
        .or_else(|| entries.iter().find(|e| e.is_directory()))
        .map(|e| e.id);
    let Some(root) = root else {
        return Err(StructureError::NoRootDirectory {
            entries: entries.len(),
        }
        .into());
    };

    store.set_root_id(Some(root));
    store.reindex();
    log.debug(&format!(
        "resolved {} entries, max depth {}, root {root}",
        store.len(),
        store.max_depth()
    ));
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::capturing_log;
    use crate::tree::classify_line;

    fn store_from(lines: &[&str]) -> EntryStore {
        let glyphs = GlyphTable::default();
        let mut store = EntryStore::new(glyphs.clone());
        for line in lines {
            if let Some(e) = classify_line(line, &glyphs).unwrap() {
                store.add_entry(e);
            }
        }
        store
    }

    fn resolved(lines: &[&str]) -> EntryStore {
        let (log, _) = capturing_log();
        let mut store = store_from(lines);
        resolve(&mut store, &*log).unwrap();
        store
    }

    // -----------------------------------------------------------------------
    // structural_depth
    // -----------------------------------------------------------------------

    #[test]
    fn depth_counts_branch_glyphs_not_columns() {
        let g = GlyphTable::default();
        assert_eq!(structural_depth("│   │   ├── x", &g), 3);
        assert_eq!(structural_depth("├── main.go", &g), 1);
        assert_eq!(structural_depth("    └── deep", &g), 1);
        assert_eq!(structural_depth("project/", &g), 0);
    }

    #[test]
    fn depth_stops_at_first_name_character() {
        let g = GlyphTable::default();
        assert_eq!(structural_depth("├── a│b", &g), 1);
    }

    // -----------------------------------------------------------------------
    // resolve
    // -----------------------------------------------------------------------

    #[test]
    fn parents_follow_depth_stack() {
        let store = resolved(&[
            "project/",
            "├── src/",
            "│   ├── util/",
            "│   │   └── mod.rs",
            "│   └── main.rs",
            "└── README.md",
        ]);
        let by = |n: &str| store.entry_by_name(n).unwrap();
        assert_eq!(by("src").parent_id, Some(by("project").id));
        assert_eq!(by("main.rs").parent_id, Some(by("src").id));
        assert_eq!(by("mod.rs").parent_id, Some(by("util").id));
        assert_eq!(by("README.md").parent_id, Some(by("project").id));
        assert!(by("project").parent_id.is_none());
        assert_eq!(store.max_depth(), 3);
    }

    #[test]
    fn identities_are_reassigned() {
        let mut store = store_from(&["project/", "├── a.txt"]);
        let before: Vec<Uuid> = store.entries().iter().map(|e| e.id).collect();
        let (log, _) = capturing_log();
        resolve(&mut store, &*log).unwrap();
        for (old, e) in before.iter().zip(store.entries()) {
            assert_ne!(*old, e.id);
            assert!(store.entry(e.id).is_some());
        }
    }

    #[test]
    fn unknown_with_children_becomes_directory() {
        let store = resolved(&["project/", "├── cmd", "│   └── main.go", "└── LICENSE"]);
        assert_eq!(store.entry_by_name("cmd").unwrap().kind, EntryKind::Directory);
        assert_eq!(store.entry_by_name("LICENSE").unwrap().kind, EntryKind::Unknown);
    }

    #[test]
    fn promotion_is_logged_at_debug() {
        let (log, seen) = capturing_log();
        let mut store = store_from(&["project/", "├── cmd", "│   └── main.go"]);
        resolve(&mut store, &*log).unwrap();
        let seen = seen.lock().unwrap();
        assert!(seen.iter().any(|(level, msg)| {
            *level == crate::logging::Level::Debug && msg.contains("'cmd' has children")
        }));
    }

    #[test]
    fn root_prefers_depth_zero_directory() {
        let store = resolved(&["notes.txt", "project/", "├── a/"]);
        assert_eq!(store.root().unwrap().name, "project");
    }

    #[test]
    fn root_falls_back_to_first_directory() {
        let store = resolved(&["├── a/", "└── b/"]);
        assert_eq!(store.root().unwrap().name, "a");
    }

    #[test]
    fn no_directory_is_fatal() {
        let (log, _) = capturing_log();
        let mut store = store_from(&["a.txt", "b.txt"]);
        let err = resolve(&mut store, &*log).unwrap_err();
        assert!(matches!(
            err,
            TreeError::Structure(StructureError::NoRootDirectory { entries: 2 })
        ));
    }
}
