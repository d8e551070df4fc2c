//! The parsing and reconstruction engine.
//!
//! A source diagram is read line by line through [`classify_line`] into an
//! [`EntryStore`], then [`resolve`] recovers depth, identities, parents and
//! the root in one batch. [`Sanitizer`] repairs loaded stores,
//! [`SnapshotCodec`] persists them and [`render`] draws them back.
mod classifier;
mod depth;
pub mod entry;
pub mod metadata;
mod render;
mod sanitize;
mod snapshot;
mod store;

use std::path::Path;

pub use classifier::classify_line;
pub use depth::{resolve, structural_depth};
pub use entry::{Entry, EntryKind};
pub use metadata::Metadata;
pub use render::render;
pub use sanitize::{SanitizeReport, Sanitizer};
pub use snapshot::{SNAPSHOT_VERSION, SnapshotCodec, with_suffix};
pub use store::EntryStore;

use crate::config::GlyphTable;
use crate::error::{InputError, TreeError};
use crate::logging::Log;

/// Read a tree diagram from `path` into an unresolved store.
///
/// Blank lines are skipped and invalid UTF-8 is dropped. The first line
/// that fails classification aborts the whole parse.
///
/// # Errors
///
/// Returns [`InputError::SourceNotFound`] for a missing file, an I/O error
/// if it cannot be read, and [`InputError::InvalidLine`] for a bad line.
pub fn parse_source(
    path: &Path,
    glyphs: &GlyphTable,
    log: &dyn Log,
) -> Result<EntryStore, TreeError> {
    if !path.exists() {
        return Err(InputError::SourceNotFound(path.to_path_buf()).into());
    }
    let bytes = std::fs::read(path).map_err(TreeError::io("read", path))?;

    let mut store = EntryStore::new(glyphs.clone());
    for (number, raw) in bytes.split(|&b| b == b'\n').enumerate() {
        let line = String::from_utf8_lossy(raw).replace(char::REPLACEMENT_CHARACTER, "");
        if line.trim().is_empty() {
            continue;
        }
        match classify_line(&line, glyphs) {
            Ok(Some(entry)) => store.add_entry(entry),
            Ok(None) => log.debug(&format!("line {}: no usable name, skipped", number + 1)),
            Err(e) => {
                return Err(InputError::InvalidLine {
                    number: number + 1,
                    line: line.trim().to_string(),
                    reason: e.to_string(),
                }
                .into());
            }
        }
    }
    log.debug(&format!(
        "read {} entries from {}",
        store.len(),
        path.display()
    ));
    Ok(store)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::capturing_log;

    #[test]
    fn parse_source_skips_blank_lines_and_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.txt");
        std::fs::write(&path, "project/\r\n\r\n├── main.go\n   \n└── README.md\n").unwrap();
        let (log, _) = capturing_log();
        let store = parse_source(&path, &GlyphTable::default(), &*log).unwrap();
        let names: Vec<&str> = store.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["project", "main.go", "README.md"]);
    }

    #[test]
    fn parse_source_drops_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.txt");
        std::fs::write(&path, b"dir/\n\xff\xfeok.txt\n").unwrap();
        let (log, _) = capturing_log();
        let store = parse_source(&path, &GlyphTable::default(), &*log).unwrap();
        assert_eq!(store.entry_by_name("ok.txt").unwrap().origin_name, "ok.txt");
    }

    #[test]
    fn parse_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let (log, _) = capturing_log();
        let err = parse_source(&dir.path().join("nope"), &GlyphTable::default(), &*log)
            .unwrap_err();
        assert!(matches!(err, TreeError::Input(InputError::SourceNotFound(_))));
    }

    #[test]
    fn parse_source_does_not_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.txt");
        std::fs::write(&path, "project/\n│   ├── x.rs\n").unwrap();
        let (log, _) = capturing_log();
        let store = parse_source(&path, &GlyphTable::default(), &*log).unwrap();
        assert!(store.entries().iter().all(|e| e.depth == 0 && e.parent_id.is_none()));
    }
}
