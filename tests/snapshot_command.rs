#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for snapshots and the sanitize pass.

mod common;

use arbor_cli::compose::ComposeOpts;
use arbor_cli::error::{SnapshotError, TreeError};
use arbor_cli::logging::Level;
use arbor_cli::tree::{EntryKind, with_suffix};
use common::*;

const TREE: &[&str] = &[
    "service/",
    "├── src/",
    "│   ├── bin/",
    "│   │   └── cli.rs",
    "│   └── lib.rs",
    "└── Cargo.toml",
];

fn saved_workspace() -> Workspace {
    let ws = WorkspaceBuilder::new().with_tree(TREE).build();
    let session = ws.session();
    session.parse().unwrap();
    session.save_snapshot().unwrap();
    ws
}

type Shape = Vec<(uuid::Uuid, String, EntryKind, usize)>;

fn shape(session: &arbor_cli::session::Session) -> Shape {
    session
        .store_read()
        .entries()
        .iter()
        .map(|e| (e.id, e.name.clone(), e.kind, e.depth))
        .collect()
}

// ---------------------------------------------------------------------------
// Round trip
// ---------------------------------------------------------------------------

#[test]
fn round_trip_preserves_entries() {
    let ws = WorkspaceBuilder::new().with_tree(TREE).build();
    let first = ws.session();
    first.parse().unwrap();
    first.save_snapshot().unwrap();

    let second = ws.session();
    second.load_snapshot().unwrap();
    assert_eq!(shape(&first), shape(&second));
    assert_eq!(
        second.store_read().root_id(),
        first.store_read().root_id()
    );
}

#[test]
fn snapshot_document_layout() {
    let ws = saved_workspace();
    let doc = ws.snapshot_json();
    assert_eq!(doc["version"], 1);
    assert_eq!(doc["maxDepth"], 3);
    assert_eq!(doc["entries"].as_array().unwrap().len(), 6);
    let first = &doc["entries"][0];
    assert_eq!(first["type"], "directory");
    assert_eq!(first["name"], "service");
    assert_eq!(first["originName"], "service/");
    assert_eq!(first["permissions"], "rwxr-xr-x");
    assert_eq!(first["checksum"], "none");
}

#[test]
fn second_save_keeps_backup() {
    let ws = saved_workspace();
    let session = ws.session();
    session.load_snapshot().unwrap();
    session.save_snapshot().unwrap();
    assert!(with_suffix(&ws.snapshot(), ".bak").is_file());
}

#[test]
fn composing_from_snapshot_matches_diagram() {
    let ws = saved_workspace();
    let session = ws.session();
    session.load_snapshot().unwrap();
    session.compose(&ComposeOpts::default()).unwrap();
    assert!(ws.out("service/src/bin/cli.rs").is_file());
    assert!(ws.out("service/Cargo.toml").is_file());
}

#[test]
fn garbage_snapshot_is_a_decode_error() {
    let ws = saved_workspace();
    std::fs::write(ws.snapshot(), "{ not json").unwrap();
    let err = ws.session().load_snapshot().unwrap_err();
    assert!(matches!(
        err,
        TreeError::Snapshot(SnapshotError::Decode { .. })
    ));
}

// ---------------------------------------------------------------------------
// Sanitize
// ---------------------------------------------------------------------------

#[test]
fn duplicate_identity_keeps_one() {
    let ws = saved_workspace();
    let mut doc = ws.snapshot_json();
    let lib_id = doc["entries"][4]["id"].clone();
    doc["entries"][5]["id"] = lib_id;
    ws.write_snapshot_json(&doc);

    let session = ws.session();
    session.load_snapshot().unwrap();
    let report = session.sanitize(None).unwrap();

    assert_eq!(report.dropped, 1);
    assert_eq!(session.store_read().len(), 5);
    assert_eq!(ws.log.at(Level::Warn).len(), 1);
}

#[test]
fn sanitize_is_a_fixed_point() {
    let ws = saved_workspace();
    let mut doc = ws.snapshot_json();
    doc["entries"][5]["type"] = "mystery".into();
    ws.write_snapshot_json(&doc);

    let session = ws.session();
    session.load_snapshot().unwrap();
    let first = session.sanitize(None).unwrap();
    assert_eq!(first.inferred, 1);
    let after_first = shape(&session);

    let second = session.sanitize(None).unwrap();
    assert!(second.is_clean());
    assert_eq!(shape(&session), after_first);
}

#[test]
fn unknown_types_are_inferred() {
    let ws = saved_workspace();
    let mut doc = ws.snapshot_json();
    doc["entries"][1]["type"] = "unknown".into();
    doc["entries"][5]["type"] = "unknown".into();
    ws.write_snapshot_json(&doc);

    let session = ws.session();
    session.load_snapshot().unwrap();
    session.sanitize(None).unwrap();
    let store = session.store_read();
    assert_eq!(store.entry_by_name("src").unwrap().kind, EntryKind::Directory);
    assert_eq!(store.entry_by_name("Cargo.toml").unwrap().kind, EntryKind::File);
}

#[test]
fn replacement_bytes_swap_the_backing_file() {
    let ws = saved_workspace();
    let original = std::fs::read(ws.snapshot()).unwrap();

    let other = WorkspaceBuilder::new()
        .with_tree(&["docs/", "└── index.md"])
        .build();
    let other_session = other.session();
    other_session.parse().unwrap();
    other_session.save_snapshot().unwrap();
    let replacement = std::fs::read(other.snapshot()).unwrap();

    let session = ws.session();
    session.load_snapshot().unwrap();
    let report = session.sanitize(Some(&replacement)).unwrap();

    assert!(report.reloaded);
    assert_eq!(session.store_read().len(), 2);
    assert_eq!(session.store_read().root().unwrap().name, "docs");
    assert_eq!(
        std::fs::read(with_suffix(&ws.snapshot(), ".bak")).unwrap(),
        original
    );
}

#[test]
fn repairs_after_replacement_keep_the_backup() {
    let ws = saved_workspace();
    let original = std::fs::read(ws.snapshot()).unwrap();

    let mut doc = ws.snapshot_json();
    doc["entries"][5]["type"] = "unknown".into();
    let replacement = serde_json::to_vec_pretty(&doc).unwrap();

    let session = ws.session();
    session.load_snapshot().unwrap();
    let report = session.sanitize(Some(&replacement)).unwrap();
    assert!(report.reloaded);
    assert_eq!(report.inferred, 1);

    let written = session.save_repairs(&report).unwrap();
    assert_eq!(written, Some(ws.snapshot()));
    assert_eq!(
        std::fs::read(with_suffix(&ws.snapshot(), ".bak")).unwrap(),
        original
    );
    assert_eq!(ws.snapshot_json()["entries"][5]["type"], "file");
}

#[test]
fn clean_sanitize_writes_nothing() {
    let ws = saved_workspace();
    let session = ws.session();
    session.load_snapshot().unwrap();
    let report = session.sanitize(None).unwrap();
    assert_eq!(session.save_repairs(&report).unwrap(), None);
    assert!(!with_suffix(&ws.snapshot(), ".bak").exists());
}
