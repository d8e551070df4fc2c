//! Line classification: one drawn line → one typed, named entry.
use super::entry::{Entry, EntryKind};
use crate::config::GlyphTable;
use crate::error::InputError;

/// Classify one source line.
///
/// Returns `Ok(None)` for blank lines and for lines that reduce to an empty
/// name (pure decoration). The returned entry is unparented, at depth 0,
/// with a provisional identity.
///
/// # Errors
///
/// Propagates [`Entry::new`] precondition failures.
pub fn classify_line(line: &str, glyphs: &GlyphTable) -> Result<Option<Entry>, InputError> {
    let origin = line.trim();
    if origin.is_empty() {
        return Ok(None);
    }

    let (working, comment) = split_comment(origin);
    let kind = detect_kind(working, glyphs);

    let stripped = glyphs.strip_icons(working);
    let stripped = stripped.trim();
    let stripped = stripped.strip_suffix(['/', '\\']).unwrap_or(stripped);
    let filtered: String = stripped.chars().filter(|&c| is_name_char(c)).collect();
    let cleaned = glyphs.replace_drawing(&filtered);
    let cleaned = cleaned.trim();

    let name = leaf_name(cleaned);
    if name.is_empty() {
        return Ok(None);
    }

    Entry::new(kind, name, origin, comment).map(Some)
}

/// Split `line` at the first `#` that opens a comment.
///
/// A `#` opens a comment at the start of the line or after whitespace;
/// `a#b` stays part of the name.
pub(crate) fn split_comment(line: &str) -> (&str, Option<&str>) {
    let mut after_space = true;
    for (i, c) in line.char_indices() {
        if c == '#' && after_space {
            let (head, tail) = line.split_at(i);
            let comment = tail.strip_prefix('#').unwrap_or(tail).trim();
            return (head.trim(), Some(comment));
        }
        after_space = c.is_whitespace();
    }
    (line, None)
}

/// Return `true` if the last path segment of `s` has a non-empty extension.
pub(crate) fn has_extension(s: &str) -> bool {
    leaf_name(s)
        .rsplit_once('.')
        .is_some_and(|(_, ext)| !ext.trim().is_empty())
}

/// Return `true` if `s` ends in a path separator.
pub(crate) fn ends_with_separator(s: &str) -> bool {
    s.ends_with(['/', '\\'])
}

fn detect_kind(working: &str, glyphs: &GlyphTable) -> EntryKind {
    if glyphs.has_directory_icon(working) {
        EntryKind::Directory
    } else if glyphs.has_file_icon(working) {
        EntryKind::File
    } else if ends_with_separator(working) {
        EntryKind::Directory
    } else if has_extension(working) {
        EntryKind::File
    } else {
        EntryKind::Unknown
    }
}

const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '/' | '.' | '-')
}

fn leaf_name(s: &str) -> &str {
    s.rsplit(['/', '\\']).next().unwrap_or(s)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn classify(line: &str) -> Option<Entry> {
        classify_line(line, &GlyphTable::default()).unwrap()
    }

    fn kind(line: &str) -> EntryKind {
        classify(line).expect("line should classify").kind
    }

    // -----------------------------------------------------------------------
    // Type detection
    // -----------------------------------------------------------------------

    #[test]
    fn trailing_separator_is_directory() {
        assert_eq!(kind("project/"), EntryKind::Directory);
        assert_eq!(kind("├── assets\\"), EntryKind::Directory);
        assert_eq!(kind("│   └── v1.2/"), EntryKind::Directory);
    }

    #[test]
    fn file_icon_outranks_trailing_separator() {
        assert_eq!(kind("🔥 hot.d/"), EntryKind::File);
        assert_eq!(kind("├── 📜 notes/"), EntryKind::File);
    }

    #[test]
    fn directory_icon_wins_over_extension() {
        assert_eq!(kind("📂 archive.tar.gz"), EntryKind::Directory);
        assert_eq!(kind("📁 📜 mixed"), EntryKind::Directory);
    }

    #[test]
    fn file_icon_without_directory_icon_is_file() {
        assert_eq!(kind("├── 📜 Makefile"), EntryKind::File);
        assert_eq!(kind("✔ done"), EntryKind::File);
    }

    #[test]
    fn extension_is_file() {
        assert_eq!(kind("├── main.go"), EntryKind::File);
        assert_eq!(kind("└── .gitignore"), EntryKind::File);
    }

    #[test]
    fn no_hint_is_unknown() {
        assert_eq!(kind("├── Makefile"), EntryKind::Unknown);
        assert_eq!(kind("src"), EntryKind::Unknown);
        assert_eq!(kind("trailing."), EntryKind::Unknown);
    }

    // -----------------------------------------------------------------------
    // Name cleaning
    // -----------------------------------------------------------------------

    #[test]
    fn name_strips_glyphs_icons_and_separator() {
        assert_eq!(classify("│   ├── 📂 src/").unwrap().name, "src");
        assert_eq!(classify("└── README.md").unwrap().name, "README.md");
    }

    #[test]
    fn name_keeps_last_segment_only() {
        assert_eq!(classify("├── cmd/server/main.go").unwrap().name, "main.go");
        assert_eq!(classify("docs/guide/").unwrap().name, "guide");
    }

    #[test]
    fn name_drops_disallowed_characters() {
        assert_eq!(classify("├── my file (1).txt").unwrap().name, "myfile1.txt");
    }

    #[test]
    fn origin_is_trimmed_line() {
        let e = classify("   ├── main.go   ").unwrap();
        assert_eq!(e.origin_name, "├── main.go");
    }

    #[test]
    fn dot_segments_are_rejected() {
        let glyphs = GlyphTable::default();
        for line in ["├── ../", "│   └── ..", "./"] {
            let err = classify_line(line, &glyphs).unwrap_err();
            assert!(matches!(err, InputError::ReservedName { .. }), "{line}");
        }
        assert_eq!(classify("├── ../up.txt").unwrap().name, "up.txt");
    }

    // -----------------------------------------------------------------------
    // Comments
    // -----------------------------------------------------------------------

    #[test]
    fn inline_comment_is_extracted() {
        let e = classify("├── main.go  # entry point").unwrap();
        assert_eq!(e.name, "main.go");
        assert_eq!(e.comments, "entry point");
        assert_eq!(e.kind, EntryKind::File);
    }

    #[test]
    fn hash_inside_name_is_not_a_comment() {
        assert_eq!(split_comment("c#/"), ("c#/", None));
    }

    #[test]
    fn comment_only_line_is_skipped() {
        assert!(classify("# just a note").is_none());
    }

    // -----------------------------------------------------------------------
    // Skips
    // -----------------------------------------------------------------------

    #[test]
    fn blank_and_decorative_lines_are_skipped() {
        assert!(classify("").is_none());
        assert!(classify("   \t ").is_none());
        assert!(classify("│   │").is_none());
        assert!(classify("├── ").is_none());
        assert!(classify("📂").is_none());
    }

    #[test]
    fn classification_identity_is_fresh() {
        let a = classify("a.txt").unwrap();
        let b = classify("a.txt").unwrap();
        assert_ne!(a.id, b.id);
        assert!(a.parent_id.is_none());
        assert_eq!(a.depth, 0);
    }

    #[test]
    fn helpers() {
        assert!(has_extension("dir/file.rs"));
        assert!(!has_extension("v1.2/file"));
        assert!(ends_with_separator("a\\"));
        assert!(!ends_with_separator("a"));
    }
}
