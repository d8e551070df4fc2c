//! Glyph tables used to recognise icons and tree-drawing characters.
//!
//! The built-in defaults cover the output of common directory-listing tools.
//! A TOML file can override any of the four tables; absent keys keep their
//! defaults.
//!
//! ```toml
//! directory_icons = ["📂", "📁"]
//! file_icons = ["📜"]
//! branch_glyphs = ["│", "├", "└"]
//!
//! [drawing]
//! "├── " = "V_LINE_END"
//! ```
use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

/// Icon and drawing-glyph tables shared by the classifier and the depth
/// resolver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GlyphTable {
    /// Raw drawing sequence → canonical token.
    pub drawing: BTreeMap<String, String>,
    /// Icons that mark a line as a directory.
    pub directory_icons: Vec<String>,
    /// Icons that mark a line as a file.
    pub file_icons: Vec<String>,
    /// Structural glyphs counted when computing depth.
    pub branch_glyphs: Vec<char>,
}

impl Default for GlyphTable {
    fn default() -> Self {
        let drawing = [
            ("├─ ", "H_LINE"),
            ("── ", "H_LINE_END"),
            ("├── ", "V_LINE_END"),
            ("│   ", "V_LINE_CONT"),
            ("└── ", "V_LINE_LAST"),
            ("  ", "V_LINE_SPACE_2"),
            ("   ", "V_LINE_SPACE_3"),
            ("    ", "V_LINE_SPACE_4"),
            ("     ", "V_LINE_SPACE_5"),
            ("├", "V_LINE_INIT"),
            ("│", "V_LINE_CONT_SINGLE"),
            ("└", "V_LINE_LAST_SINGLE"),
            ("\t", "V_LINE_TAB"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            drawing,
            directory_icons: ["📂", "📁", "🗂"].map(String::from).to_vec(),
            file_icons: ["📜", "🔖", "🔥", "✔"].map(String::from).to_vec(),
            branch_glyphs: vec!['│', '├', '└'],
        }
    }
}

impl GlyphTable {
    /// Load a glyph table from a TOML file.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        super::toml_loader::load_config(path)
    }

    /// Return `true` if `c` is a structural branch glyph.
    #[must_use]
    pub fn is_branch(&self, c: char) -> bool {
        self.branch_glyphs.contains(&c)
    }

    /// Return `true` if `line` contains any directory icon.
    #[must_use]
    pub fn has_directory_icon(&self, line: &str) -> bool {
        self.directory_icons
            .iter()
            .any(|icon| !icon.is_empty() && line.contains(icon.as_str()))
    }

    /// Return `true` if `line` contains any file icon.
    #[must_use]
    pub fn has_file_icon(&self, line: &str) -> bool {
        self.file_icons
            .iter()
            .any(|icon| !icon.is_empty() && line.contains(icon.as_str()))
    }

    /// Remove every directory and file icon from `line`.
    #[must_use]
    pub fn strip_icons(&self, line: &str) -> String {
        self.directory_icons
            .iter()
            .chain(&self.file_icons)
            .filter(|icon| !icon.is_empty())
            .fold(line.to_string(), |acc, icon| acc.replace(icon.as_str(), ""))
    }

    /// Replace drawing sequences with their canonical tokens.
    ///
    /// Longer sequences are replaced first so that `"├── "` wins over
    /// `"├"`; equal lengths fall back to key order.
    #[must_use]
    pub fn replace_drawing(&self, line: &str) -> String {
        let mut keys: Vec<(&String, &String)> =
            self.drawing.iter().filter(|(k, _)| !k.is_empty()).collect();
        keys.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()).then(a.0.cmp(b.0)));
        keys.into_iter()
            .fold(line.to_string(), |acc, (seq, token)| acc.replace(seq.as_str(), token))
    }
}
