// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed workspace holding a tree diagram,
// an output directory and a snapshot path, plus a recording logger, so each
// integration test can set up an isolated environment without repeating
// filesystem boilerplate.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use arbor_cli::config::Config;
use arbor_cli::logging::{Level, Log, StepStatus};
use arbor_cli::session::Session;

/// Logger that keeps every message in memory.
#[derive(Debug, Default)]
pub struct RecordingLog {
    lines: Mutex<Vec<(Level, String)>>,
    steps: Mutex<Vec<(String, StepStatus)>>,
}

impl RecordingLog {
    /// Messages logged at `level`.
    pub fn at(&self, level: Level) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Recorded step names and statuses, in order.
    pub fn steps(&self) -> Vec<(String, StepStatus)> {
        self.steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Log for RecordingLog {
    fn log(&self, level: Level, msg: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, msg.to_string()));
    }

    fn record_step(&self, name: &str, status: StepStatus, _message: Option<&str>) {
        self.steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((name.to_string(), status));
    }
}

/// An isolated workspace backed by a [`tempfile::TempDir`].
pub struct Workspace {
    /// Temporary directory holding the source, snapshot and output.
    pub root: tempfile::TempDir,
    /// Logger shared with every session opened here.
    pub log: Arc<RecordingLog>,
}

impl Workspace {
    /// Path of the tree diagram.
    pub fn source(&self) -> PathBuf {
        self.root.path().join("tree.txt")
    }

    /// Directory the tree is composed into.
    pub fn target(&self) -> PathBuf {
        self.root.path().join("out")
    }

    /// Path of the snapshot file.
    pub fn snapshot(&self) -> PathBuf {
        self.root.path().join("tree.json")
    }

    /// Path below the output directory.
    pub fn out(&self, rel: &str) -> PathBuf {
        rel.split('/')
            .filter(|s| !s.is_empty())
            .fold(self.target(), |p, s| p.join(s))
    }

    /// Open a session that composes into [`target`](Self::target) and
    /// snapshots to [`snapshot`](Self::snapshot).
    pub fn session(&self) -> Session {
        self.session_with(|c| c)
    }

    /// Like [`session`](Self::session), with a final tweak to the config.
    pub fn session_with(&self, tweak: impl FnOnce(Config) -> Config) -> Session {
        let config = Config::new(&self.source(), Some(&self.target()), false, true)
            .expect("valid config")
            .with_snapshot(&self.snapshot())
            .expect("valid snapshot path");
        let log: Arc<dyn Log> = Arc::clone(&self.log) as Arc<dyn Log>;
        Session::new(tweak(config), log)
    }

    /// Snapshot contents as JSON.
    pub fn snapshot_json(&self) -> serde_json::Value {
        let text = std::fs::read_to_string(self.snapshot()).expect("read snapshot");
        serde_json::from_str(&text).expect("parse snapshot")
    }

    /// Overwrite the snapshot with `value`.
    pub fn write_snapshot_json(&self, value: &serde_json::Value) {
        let text = serde_json::to_string_pretty(value).expect("encode snapshot");
        std::fs::write(self.snapshot(), text).expect("write snapshot");
    }
}

/// Fluent builder for [`Workspace`].
pub struct WorkspaceBuilder {
    ws: Workspace,
}

impl WorkspaceBuilder {
    /// Begin building an empty workspace.
    pub fn new() -> Self {
        Self {
            ws: Workspace {
                root: tempfile::tempdir().expect("create temp dir"),
                log: Arc::new(RecordingLog::default()),
            },
        }
    }

    /// Write the tree diagram from `lines`, one per line.
    pub fn with_tree(self, lines: &[&str]) -> Self {
        let mut text = lines.join("\n");
        text.push('\n');
        std::fs::write(self.ws.source(), text).expect("write tree");
        self
    }

    /// Create a file below the output directory before composing.
    pub fn with_existing(self, rel: &str, content: &str) -> Self {
        let path = self.ws.out(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(&path, content).expect("write existing file");
        self
    }

    /// Finish building and return the workspace.
    pub fn build(self) -> Workspace {
        self.ws
    }
}

/// Return `true` if anything exists at `path`.
pub fn exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}
