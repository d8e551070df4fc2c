//! Render a resolved store back into a normalized tree diagram.
use std::collections::HashSet;

use uuid::Uuid;

use super::entry::{Entry, EntryKind};
use super::store::EntryStore;

/// Draw `store` as a tree diagram, one entry per line.
///
/// Top-level entries (no parent) are drawn flush left; directories get a
/// trailing `/` and symlinks show their link text. No trailing newline.
///
/// Below a last child the guide column is four spaces. Depth is read back
/// from branch glyphs only, so parsing the output again lifts the children
/// of a last child one level up, next to their former parent.
#[must_use]
pub fn render(store: &EntryStore) -> String {
    let mut lines = Vec::with_capacity(store.len());
    let mut seen = HashSet::new();
    for top in store.entries().iter().filter(|e| e.parent_id.is_none()) {
        seen.insert(top.id);
        lines.push(label(top));
        render_children(store, top.id, "", &mut seen, &mut lines);
    }
    lines.join("\n")
}

fn render_children(
    store: &EntryStore,
    id: Uuid,
    prefix: &str,
    seen: &mut HashSet<Uuid>,
    lines: &mut Vec<String>,
) {
    let children = store.children(id);
    let count = children.len();
    for (i, child) in children.into_iter().enumerate() {
        if !seen.insert(child.id) {
            continue;
        }
        let last = i + 1 == count;
        let (branch, continuation) = if last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        lines.push(format!("{prefix}{branch}{}", label(child)));
        render_children(store, child.id, &format!("{prefix}{continuation}"), seen, lines);
    }
}

fn label(entry: &Entry) -> String {
    match entry.kind {
        EntryKind::Directory => format!("{}/", entry.name),
        EntryKind::Symlink => format!("{} -> {}", entry.name, entry.origin_name),
        _ => entry.name.clone(),
    }
}
